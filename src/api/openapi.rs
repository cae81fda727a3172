//! OpenAPI document assembled from the `#[utoipa::path]` annotations.

use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};

use super::handlers::{
    auth::types::{LoginRequest, SignupRequest, TokenResponse, UserResponse},
    health::Health,
    resources::{CreateResourceRequest, ResourceResponse, UpdateResourceRequest},
    users::UserUpdateRequest,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::api::handlers::health::health,
        crate::api::handlers::auth::signup::signup,
        crate::api::handlers::auth::login::login,
        crate::api::handlers::users::get_me,
        crate::api::handlers::users::patch_users,
        crate::api::handlers::resources::create_resource,
        crate::api::handlers::resources::list_resources,
        crate::api::handlers::resources::get_resource,
        crate::api::handlers::resources::update_resource,
        crate::api::handlers::resources::delete_resource,
    ),
    components(schemas(
        SignupRequest,
        LoginRequest,
        TokenResponse,
        UserResponse,
        UserUpdateRequest,
        CreateResourceRequest,
        UpdateResourceRequest,
        ResourceResponse,
        Health,
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "auth", description = "Signup and login"),
        (name = "users", description = "Authenticated profile endpoints"),
        (name = "resources", description = "Owner-scoped bookmarks"),
        (name = "health", description = "Service health"),
    )
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_covers_every_route() {
        let spec = ApiDoc::openapi();
        for path in [
            "/health",
            "/auth/signup",
            "/auth/login",
            "/users/me",
            "/users",
            "/resources",
            "/resources/{id}",
        ] {
            assert!(spec.paths.paths.contains_key(path), "missing {path}");
        }
    }

    #[test]
    fn bearer_scheme_is_registered() {
        let spec = ApiDoc::openapi();
        let components = spec.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer"));
    }
}
