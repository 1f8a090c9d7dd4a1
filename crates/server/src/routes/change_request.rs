use crate::{
    auth::{KeycloakClaims, require_secretariat, require_submitter},
    dtos::{
        change_request::{
            ApproveRequest, ChangeRequestDetails, ChangeRequestResponse, SubmissionResponse,
        },
        form::ModuleForm,
        module::ModuleResponse,
    },
    error::{AppError, ErrorResponse},
    state::{AppState, now},
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use database::{ChangeRequestService, ModuleService};
use models::{
    CatalogError,
    change_request::{ChangeRequest, ChangeRequestKind},
    form::unmarshal,
};

/// Submit a new module
#[utoipa::path(
    post,
    path = "/modules",
    request_body = ModuleForm,
    responses(
        (status = 201, description = "Request stored; approved immediately for the secretariat", body = SubmissionResponse),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 403, description = "Caller may not edit modules", body = ErrorResponse)
    ),
    security(
        ("jwt" = [])
    ),
    tag = "Change Requests"
)]
pub async fn submit_creation(
    State(state): State<AppState>,
    Extension(claims): Extension<KeycloakClaims>,
    Json(form): Json<ModuleForm>,
) -> Result<(StatusCode, Json<SubmissionResponse>), AppError> {
    let principal = require_submitter(&claims)?;

    let module = unmarshal(&form.into())?;
    let now = now();
    let request = ChangeRequest::creation(&module, principal.name.as_str(), now)?;
    let outcome = ChangeRequestService::submit(&state.db, request, &principal, now).await?;

    Ok((StatusCode::CREATED, Json(outcome.into())))
}

/// Submit changes to an existing module
#[utoipa::path(
    post,
    path = "/modules/{id}",
    params(
        ("id" = i64, Path, description = "Module ID")
    ),
    request_body = ModuleForm,
    responses(
        (status = 201, description = "Request stored; approved immediately for the secretariat", body = SubmissionResponse),
        (status = 200, description = "The form does not change the module", body = SubmissionResponse),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 403, description = "Caller may not edit modules", body = ErrorResponse),
        (status = 404, description = "Module not found", body = ErrorResponse)
    ),
    security(
        ("jwt" = [])
    ),
    tag = "Change Requests"
)]
pub async fn submit_modification(
    State(state): State<AppState>,
    Extension(claims): Extension<KeycloakClaims>,
    Path(id): Path<i64>,
    Json(form): Json<ModuleForm>,
) -> Result<(StatusCode, Json<SubmissionResponse>), AppError> {
    let principal = require_submitter(&claims)?;

    let live = ModuleService::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| CatalogError::module_not_found(id))?;

    let mut proposed = unmarshal(&form.into())?;
    proposed.carry_over(&live);

    let now = now();
    let Some(request) = ChangeRequest::modification(&live, &proposed, principal.name.as_str(), now)?
    else {
        log::debug!("Submission for module {id} by {} changes nothing", principal.name);
        return Ok((
            StatusCode::OK,
            Json(SubmissionResponse {
                request: None,
                module: None,
            }),
        ));
    };

    let outcome = ChangeRequestService::submit(&state.db, request, &principal, now).await?;
    Ok((StatusCode::CREATED, Json(outcome.into())))
}

/// List requests awaiting review
#[utoipa::path(
    get,
    path = "/change-requests",
    responses(
        (status = 200, description = "Pending requests, oldest first", body = Vec<ChangeRequestResponse>),
        (status = 403, description = "Caller is not in the secretariat", body = ErrorResponse)
    ),
    security(
        ("jwt" = [])
    ),
    tag = "Change Requests"
)]
pub async fn list_pending(
    State(state): State<AppState>,
    Extension(claims): Extension<KeycloakClaims>,
) -> Result<Json<Vec<ChangeRequestResponse>>, AppError> {
    require_secretariat(&claims)?;

    let requests = ChangeRequestService::find_pending(&state.db).await?;
    Ok(Json(requests.iter().map(Into::into).collect()))
}

/// Show a request next to the module it would produce
#[utoipa::path(
    get,
    path = "/change-requests/{id}",
    params(
        ("id" = i64, Path, description = "Change request ID")
    ),
    responses(
        (status = 200, description = "Request details", body = ChangeRequestDetails),
        (status = 403, description = "Caller is not in the secretariat", body = ErrorResponse),
        (status = 404, description = "Request or its module not found", body = ErrorResponse)
    ),
    security(
        ("jwt" = [])
    ),
    tag = "Change Requests"
)]
pub async fn get_change_request(
    State(state): State<AppState>,
    Extension(claims): Extension<KeycloakClaims>,
    Path(id): Path<i64>,
) -> Result<Json<ChangeRequestDetails>, AppError> {
    require_secretariat(&claims)?;

    let request = ChangeRequestService::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| CatalogError::change_request_not_found(id))?;

    let (live, changed_fields, changes_courses) = match request.kind() {
        ChangeRequestKind::Creation => (None, vec![], true),
        ChangeRequestKind::Modification { module_id } => {
            let changes = request.changes()?;
            let fields = changes
                .diff
                .changed_fields()
                .into_iter()
                .map(|field| field.name().to_string())
                .collect();
            let live = ModuleService::find_by_id(&state.db, module_id).await?;
            (live, fields, changes.courses.is_some())
        }
    };

    let proposed = request.preview(live.as_ref())?;

    Ok(Json(ChangeRequestDetails {
        request: (&request).into(),
        changed_fields,
        changes_courses,
        live: live.as_ref().map(ModuleResponse::from),
        proposed: (&proposed).into(),
    }))
}

/// Approve a pending request and publish the result
#[utoipa::path(
    post,
    path = "/change-requests/{id}/approve",
    params(
        ("id" = i64, Path, description = "Change request ID")
    ),
    request_body = ApproveRequest,
    responses(
        (status = 200, description = "Request approved and module saved", body = SubmissionResponse),
        (status = 400, description = "Edited form failed validation", body = ErrorResponse),
        (status = 403, description = "Caller is not in the secretariat", body = ErrorResponse),
        (status = 404, description = "Request or its module not found", body = ErrorResponse),
        (status = 409, description = "Request is not pending", body = ErrorResponse)
    ),
    security(
        ("jwt" = [])
    ),
    tag = "Change Requests"
)]
pub async fn approve(
    State(state): State<AppState>,
    Extension(claims): Extension<KeycloakClaims>,
    Path(id): Path<i64>,
    Json(body): Json<ApproveRequest>,
) -> Result<Json<SubmissionResponse>, AppError> {
    let principal = require_secretariat(&claims)?;

    let edited = body.edited.map(|form| unmarshal(&form.into())).transpose()?;
    let outcome =
        ChangeRequestService::approve(&state.db, id, edited.as_ref(), &principal, now()).await?;

    Ok(Json(outcome.into()))
}

/// Approved requests of a module, newest first
#[utoipa::path(
    get,
    path = "/modules/{id}/history",
    params(
        ("id" = i64, Path, description = "Module ID")
    ),
    responses(
        (status = 200, description = "Approved requests", body = Vec<ChangeRequestResponse>),
        (status = 403, description = "Caller is not in the secretariat", body = ErrorResponse)
    ),
    security(
        ("jwt" = [])
    ),
    tag = "Change Requests"
)]
pub async fn module_history(
    State(state): State<AppState>,
    Extension(claims): Extension<KeycloakClaims>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<ChangeRequestResponse>>, AppError> {
    require_secretariat(&claims)?;

    let requests = ChangeRequestService::history(&state.db, id).await?;
    Ok(Json(requests.iter().map(Into::into).collect()))
}
