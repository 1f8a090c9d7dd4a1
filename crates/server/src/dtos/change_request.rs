use crate::dtos::{form::ModuleForm, module::ModuleResponse};
use chrono::NaiveDateTime;
use database::Outcome;
use models::change_request::{ChangeRequest, ChangeRequestKind};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct ChangeRequestResponse {
    pub id: Option<i64>,
    /// Target module, absent for creation requests
    pub module_id: Option<i64>,
    /// `creation` or `modification`
    pub kind: String,
    pub submitter: String,
    /// `pending` or `approved`
    pub status: String,
    pub created_at: NaiveDateTime,
    pub approved_at: Option<NaiveDateTime>,
}

impl From<&ChangeRequest> for ChangeRequestResponse {
    fn from(request: &ChangeRequest) -> Self {
        let kind = match request.kind() {
            ChangeRequestKind::Creation => "creation",
            ChangeRequestKind::Modification { .. } => "modification",
        };

        Self {
            id: request.id,
            module_id: request.module_id,
            kind: kind.to_string(),
            submitter: request.submitter.clone(),
            status: request.status.as_str().to_owned(),
            created_at: request.created_at,
            approved_at: request.approved_at,
        }
    }
}

/// Review view of one request
#[derive(Debug, Serialize, ToSchema)]
pub struct ChangeRequestDetails {
    pub request: ChangeRequestResponse,
    /// Module attributes the request changes
    pub changed_fields: Vec<String>,
    /// Whether the request replaces the course list
    pub changes_courses: bool,
    /// The module as currently published, for modification requests
    pub live: Option<ModuleResponse>,
    /// The module as it would look once approved
    pub proposed: ModuleResponse,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SubmissionResponse {
    /// Absent when the submission did not change anything
    pub request: Option<ChangeRequestResponse>,
    /// The saved module once the request has been approved
    pub module: Option<ModuleResponse>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ApproveRequest {
    /// Reviewer's edited version of the proposal
    #[serde(default)]
    pub edited: Option<ModuleForm>,
}

impl From<Outcome> for SubmissionResponse {
    fn from(outcome: Outcome) -> Self {
        Self {
            request: Some((&outcome.request).into()),
            module: outcome.module.as_ref().map(Into::into),
        }
    }
}
