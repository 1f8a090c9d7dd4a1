use crate::{
    auth::{KeycloakClaims, require_submitter},
    dtos::{
        form::{BlankFormQuery, ModuleForm},
        module::ModuleResponse,
    },
    error::{AppError, ErrorResponse},
    state::AppState,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use database::ModuleService;
use models::{
    CatalogError,
    form::{MAX_COURSES, ModuleWrapper, marshal, unmarshal},
};

/// Blank module form for the given number of courses
#[utoipa::path(
    get,
    path = "/modules/form",
    params(BlankFormQuery),
    responses(
        (status = 200, description = "Blank form", body = ModuleForm),
        (status = 400, description = "Too many courses", body = ErrorResponse),
        (status = 403, description = "Caller may not edit modules", body = ErrorResponse)
    ),
    security(
        ("jwt" = [])
    ),
    tag = "Forms"
)]
pub async fn blank_form(
    Extension(claims): Extension<KeycloakClaims>,
    Query(query): Query<BlankFormQuery>,
) -> Result<Json<ModuleForm>, AppError> {
    require_submitter(&claims)?;

    if query.courses > MAX_COURSES {
        return Err(AppError::BadRequest(format!(
            "a module has at most {MAX_COURSES} courses"
        )));
    }

    Ok(Json(ModuleWrapper::empty(query.courses).to_form_data().into()))
}

/// Module form prefilled with the current version of a module
#[utoipa::path(
    get,
    path = "/modules/{id}/form",
    params(
        ("id" = i64, Path, description = "Module ID")
    ),
    responses(
        (status = 200, description = "Prefilled form", body = ModuleForm),
        (status = 403, description = "Caller may not edit modules", body = ErrorResponse),
        (status = 404, description = "Module not found", body = ErrorResponse)
    ),
    security(
        ("jwt" = [])
    ),
    tag = "Forms"
)]
pub async fn module_form(
    State(state): State<AppState>,
    Extension(claims): Extension<KeycloakClaims>,
    Path(id): Path<i64>,
) -> Result<Json<ModuleForm>, AppError> {
    require_submitter(&claims)?;

    let module = ModuleService::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| CatalogError::module_not_found(id))?;

    Ok(Json(marshal(&module).to_form_data().into()))
}

/// Validate a form and show the module it describes, without saving anything
#[utoipa::path(
    post,
    path = "/modules/preview",
    request_body = ModuleForm,
    responses(
        (status = 200, description = "The module the form describes", body = ModuleResponse),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 403, description = "Caller may not edit modules", body = ErrorResponse)
    ),
    security(
        ("jwt" = [])
    ),
    tag = "Forms"
)]
pub async fn preview_module(
    Extension(claims): Extension<KeycloakClaims>,
    Json(form): Json<ModuleForm>,
) -> Result<Json<ModuleResponse>, AppError> {
    require_submitter(&claims)?;

    let module = unmarshal(&form.into())?;
    Ok(Json((&module).into()))
}
