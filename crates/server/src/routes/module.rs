use crate::{
    auth::{KeycloakClaims, require_submitter},
    dtos::module::{ModuleResponse, SearchQuery, module_responses},
    error::{AppError, ErrorResponse},
    state::AppState,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use database::ModuleService;
use models::{CatalogError, semester::Semester};
use std::str::FromStr;

/// List every visible module
#[utoipa::path(
    get,
    path = "/modules",
    responses(
        (status = 200, description = "Visible modules, ordered by German title", body = Vec<ModuleResponse>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Modules"
)]
pub async fn list_modules(
    State(state): State<AppState>,
) -> Result<Json<Vec<ModuleResponse>>, AppError> {
    let modules = ModuleService::find_all_visible(&state.db).await?;
    Ok(Json(module_responses(&modules)))
}

/// Get a visible module by ID
#[utoipa::path(
    get,
    path = "/modules/{id}",
    params(
        ("id" = i64, Path, description = "Module ID")
    ),
    responses(
        (status = 200, description = "Module found", body = ModuleResponse),
        (status = 404, description = "Module not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Modules"
)]
pub async fn get_module(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ModuleResponse>, AppError> {
    match ModuleService::find_by_id(&state.db, id).await? {
        Some(module) if module.visible => Ok(Json((&module).into())),
        _ => Err(CatalogError::module_not_found(id).into()),
    }
}

/// List visible modules offered in a semester
#[utoipa::path(
    get,
    path = "/modules/semester/{semester}",
    params(
        ("semester" = String, Path, description = "Semester label, e.g. SoSe2020")
    ),
    responses(
        (status = 200, description = "Modules with at least one course in the semester", body = Vec<ModuleResponse>),
        (status = 400, description = "Malformed semester label", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Modules"
)]
pub async fn modules_by_semester(
    State(state): State<AppState>,
    Path(semester): Path<String>,
) -> Result<Json<Vec<ModuleResponse>>, AppError> {
    let semester = Semester::from_str(&semester).map_err(|e| AppError::BadRequest(e.to_string()))?;

    let modules = ModuleService::find_by_semester(&state.db, &semester.to_string()).await?;
    Ok(Json(module_responses(&modules)))
}

/// Search visible modules by title and course content
#[utoipa::path(
    get,
    path = "/modules/search",
    params(SearchQuery),
    responses(
        (status = 200, description = "Matching visible modules", body = Vec<ModuleResponse>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Modules"
)]
pub async fn search_modules(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<ModuleResponse>>, AppError> {
    let modules =
        ModuleService::search_visible(&state.db, query.q.as_deref().unwrap_or_default()).await?;
    Ok(Json(module_responses(&modules)))
}

/// List all modules, including hidden ones
#[utoipa::path(
    get,
    path = "/admin/modules",
    responses(
        (status = 200, description = "All modules", body = Vec<ModuleResponse>),
        (status = 401, description = "Unauthorized - invalid or missing JWT"),
        (status = 403, description = "Caller may not edit modules", body = ErrorResponse)
    ),
    security(
        ("jwt" = [])
    ),
    tag = "Administration"
)]
pub async fn list_all_modules(
    State(state): State<AppState>,
    Extension(claims): Extension<KeycloakClaims>,
) -> Result<Json<Vec<ModuleResponse>>, AppError> {
    require_submitter(&claims)?;

    let modules = ModuleService::find_all(&state.db).await?;
    Ok(Json(module_responses(&modules)))
}
