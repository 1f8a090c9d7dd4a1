use crate::{
    auth::{KeycloakClaims, require_secretariat},
    dtos::semester::{DropSemesterResponse, SemesterTagRequest, SemestersResponse, TagResponse},
    error::{AppError, ErrorResponse},
    state::{AppState, now},
};
use axum::{
    Extension, Json,
    extract::{Path, State},
};
use database::SemesterTagService;
use models::semester::Semester;
use std::str::FromStr;

fn parse_semester(label: &str) -> Result<Semester, AppError> {
    Semester::from_str(label).map_err(|e| AppError::BadRequest(format!("{label:?}: {e}")))
}

fn labels(semesters: Vec<Semester>) -> Vec<String> {
    semesters.into_iter().map(|s| s.to_string()).collect()
}

/// Semester choices for tagging and browsing
#[utoipa::path(
    get,
    path = "/semesters",
    responses(
        (status = 200, description = "Semester windows and labels in use", body = SemestersResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Semesters"
)]
pub async fn get_semesters(
    State(state): State<AppState>,
) -> Result<Json<SemestersResponse>, AppError> {
    let today = now().date();
    let used = SemesterTagService::used_semesters(&state.db).await?;

    Ok(Json(SemestersResponse {
        current: Semester::containing(today).to_string(),
        tagging: labels(Semester::tagging_window(today)),
        search: labels(Semester::search_window(today)),
        used: used.into_iter().collect(),
    }))
}

/// Tag a course with a semester
#[utoipa::path(
    post,
    path = "/semester-tags",
    request_body = SemesterTagRequest,
    responses(
        (status = 200, description = "Tag applied; `changed` is false if it was already present", body = TagResponse),
        (status = 400, description = "Malformed semester label", body = ErrorResponse),
        (status = 403, description = "Caller is not in the secretariat", body = ErrorResponse),
        (status = 404, description = "Module or course not found", body = ErrorResponse)
    ),
    security(
        ("jwt" = [])
    ),
    tag = "Semesters"
)]
pub async fn tag_course(
    State(state): State<AppState>,
    Extension(claims): Extension<KeycloakClaims>,
    Json(body): Json<SemesterTagRequest>,
) -> Result<Json<TagResponse>, AppError> {
    require_secretariat(&claims)?;
    let semester = parse_semester(&body.semester)?;

    let changed = SemesterTagService::tag(
        &state.db,
        &semester.to_string(),
        body.course_id,
        body.module_id,
    )
    .await?;

    Ok(Json(TagResponse { changed }))
}

/// Remove a semester tag from a course
#[utoipa::path(
    post,
    path = "/semester-tags/delete",
    request_body = SemesterTagRequest,
    responses(
        (status = 200, description = "Tag removed; `changed` is false if it was absent", body = TagResponse),
        (status = 403, description = "Caller is not in the secretariat", body = ErrorResponse),
        (status = 404, description = "Module or course not found", body = ErrorResponse)
    ),
    security(
        ("jwt" = [])
    ),
    tag = "Semesters"
)]
pub async fn untag_course(
    State(state): State<AppState>,
    Extension(claims): Extension<KeycloakClaims>,
    Json(body): Json<SemesterTagRequest>,
) -> Result<Json<TagResponse>, AppError> {
    require_secretariat(&claims)?;

    // Malformed labels can still be removed
    let changed = SemesterTagService::untag(
        &state.db,
        body.semester.trim(),
        body.course_id,
        body.module_id,
    )
    .await?;

    Ok(Json(TagResponse { changed }))
}

/// Remove a semester from every course
#[utoipa::path(
    delete,
    path = "/semesters/{semester}",
    params(
        ("semester" = String, Path, description = "Semester label, e.g. SoSe2020")
    ),
    responses(
        (status = 200, description = "Semester removed", body = DropSemesterResponse),
        (status = 403, description = "Caller is not in the secretariat", body = ErrorResponse)
    ),
    security(
        ("jwt" = [])
    ),
    tag = "Semesters"
)]
pub async fn drop_semester(
    State(state): State<AppState>,
    Extension(claims): Extension<KeycloakClaims>,
    Path(semester): Path<String>,
) -> Result<Json<DropSemesterResponse>, AppError> {
    let principal = require_secretariat(&claims)?;

    let courses_changed = SemesterTagService::drop_semester(&state.db, semester.trim()).await?;
    log::info!("{} dropped semester {semester}", principal.name);

    Ok(Json(DropSemesterResponse {
        semester,
        courses_changed,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_semester_rejects_garbage() {
        assert!(parse_semester("SoSe2020").is_ok());
        assert!(matches!(
            parse_semester("Sommer 2020"),
            Err(AppError::BadRequest(_))
        ));
    }
}
