use crate::{
    auth::{KeycloakClaims, require_submitter},
    dtos::module::CourseResponse,
    error::{AppError, ErrorResponse},
    state::AppState,
};
use axum::{
    Extension, Json,
    extract::{Path, State},
};
use database::CourseService;
use models::{CatalogError, semester::Semester};
use std::str::FromStr;

/// Get a course by ID, including hidden modules' courses
#[utoipa::path(
    get,
    path = "/courses/{id}",
    params(
        ("id" = i64, Path, description = "Course ID")
    ),
    responses(
        (status = 200, description = "Course found", body = CourseResponse),
        (status = 403, description = "Caller may not edit modules", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse)
    ),
    security(
        ("jwt" = [])
    ),
    tag = "Administration"
)]
pub async fn get_course(
    State(state): State<AppState>,
    Extension(claims): Extension<KeycloakClaims>,
    Path(id): Path<i64>,
) -> Result<Json<CourseResponse>, AppError> {
    require_submitter(&claims)?;

    let course = CourseService::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| CatalogError::course_not_found(id))?;

    Ok(Json((&course).into()))
}

/// List every course tagged with a semester, ordered by title
#[utoipa::path(
    get,
    path = "/courses/semester/{semester}",
    params(
        ("semester" = String, Path, description = "Semester label, e.g. WiSe2020")
    ),
    responses(
        (status = 200, description = "Tagged courses", body = Vec<CourseResponse>),
        (status = 400, description = "Malformed semester label", body = ErrorResponse),
        (status = 403, description = "Caller may not edit modules", body = ErrorResponse)
    ),
    security(
        ("jwt" = [])
    ),
    tag = "Administration"
)]
pub async fn courses_by_semester(
    State(state): State<AppState>,
    Extension(claims): Extension<KeycloakClaims>,
    Path(semester): Path<String>,
) -> Result<Json<Vec<CourseResponse>>, AppError> {
    require_submitter(&claims)?;
    let semester = Semester::from_str(&semester).map_err(|e| AppError::BadRequest(e.to_string()))?;

    let courses = CourseService::find_by_semester(&state.db, &semester.to_string()).await?;
    Ok(Json(courses.iter().map(Into::into).collect()))
}
