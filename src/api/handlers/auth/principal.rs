//! Bearer token authentication for protected routes.
//!
//! Flow Overview: read the `Authorization` header, verify the token, and
//! attach a principal to the request's extensions. This middleware is the
//! single authentication checkpoint; handlers downstream never re-validate.

use axum::{
    extract::{Extension, Request},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use super::{
    state::AuthState,
    token::{TokenError, TokenSigner},
};

/// Authenticated user context derived from a verified bearer token.
#[derive(Clone, Debug)]
pub struct Principal {
    pub user_id: Uuid,
    pub email: String,
}

/// Reject a request before its handler runs, or attach a [`Principal`].
///
/// Missing header, wrong scheme, and every token failure collapse into the
/// same 401; the distinction is kept in logs only.
pub async fn require_auth(
    Extension(auth_state): Extension<Arc<AuthState>>,
    mut request: Request,
    next: Next,
) -> Response {
    match authenticate(request.headers(), auth_state.tokens()) {
        Ok(principal) => {
            request.extensions_mut().insert(principal);
            next.run(request).await
        }
        Err(rejection) => {
            debug!("Rejected request: {rejection:?}");
            StatusCode::UNAUTHORIZED.into_response()
        }
    }
}

#[derive(Debug)]
pub(crate) enum AuthRejection {
    MissingBearer,
    Token(TokenError),
    BadSubject,
}

pub(crate) fn authenticate(
    headers: &HeaderMap,
    tokens: &TokenSigner,
) -> Result<Principal, AuthRejection> {
    let token = extract_bearer_token(headers).ok_or(AuthRejection::MissingBearer)?;
    let claims = tokens.verify(&token).map_err(AuthRejection::Token)?;
    let user_id = Uuid::parse_str(&claims.sub).map_err(|_| AuthRejection::BadSubject)?;

    Ok(Principal {
        user_id,
        email: claims.email,
    })
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let trimmed = value.trim();
    let token = trimmed
        .strip_prefix("Bearer ")
        .or_else(|| trimmed.strip_prefix("bearer "))?
        .trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn signer() -> TokenSigner {
        TokenSigner::new(b"test-secret", 1800)
    }

    fn bearer(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
        );
        headers
    }

    #[test]
    fn missing_header_is_rejected() {
        let headers = HeaderMap::new();
        assert!(matches!(
            authenticate(&headers, &signer()),
            Err(AuthRejection::MissingBearer)
        ));
    }

    #[test]
    fn wrong_scheme_is_rejected() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic dXNlcg=="));
        assert!(matches!(
            authenticate(&headers, &signer()),
            Err(AuthRejection::MissingBearer)
        ));
    }

    #[test]
    fn empty_bearer_is_rejected() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert!(matches!(
            authenticate(&headers, &signer()),
            Err(AuthRejection::MissingBearer)
        ));
    }

    #[test]
    fn garbage_token_is_rejected_as_invalid() {
        let headers = bearer("garbage");
        assert!(matches!(
            authenticate(&headers, &signer()),
            Err(AuthRejection::Token(TokenError::Invalid))
        ));
    }

    #[test]
    fn valid_token_yields_principal() {
        let signer = signer();
        let user_id = Uuid::new_v4();
        let token = signer.issue(user_id, "a@test.com").unwrap();

        let principal = authenticate(&bearer(&token), &signer).unwrap();
        assert_eq!(principal.user_id, user_id);
        assert_eq!(principal.email, "a@test.com");
    }

    #[test]
    fn lowercase_scheme_is_accepted() {
        let signer = signer();
        let token = signer.issue(Uuid::new_v4(), "a@test.com").unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("bearer {token}")).unwrap(),
        );

        assert!(authenticate(&headers, &signer).is_ok());
    }
}
