use crate::auth::KeycloakClaims;
use axum::{Extension, Json};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct MeResponse {
    pub name: String,
    pub roles: Vec<String>,
    pub can_submit: bool,
    pub is_secretariat: bool,
}

/// Returns the caller's name and catalogue privileges from their JWT claims
#[utoipa::path(
    get,
    path = "/me",
    responses(
        (status = 200, description = "Successfully authenticated", body = MeResponse),
        (status = 401, description = "Unauthorized - invalid or missing JWT")
    ),
    security(
        ("jwt" = [])
    ),
    tag = "Authentication"
)]
pub async fn me(Extension(claims): Extension<KeycloakClaims>) -> Json<MeResponse> {
    let principal = claims.principal();
    let mut roles: Vec<String> = principal.roles.iter().cloned().collect();
    roles.sort();

    Json(MeResponse {
        can_submit: principal.can_submit(),
        is_secretariat: principal.is_secretariat(),
        name: principal.name,
        roles,
    })
}
