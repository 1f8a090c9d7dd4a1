use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct SemestersResponse {
    /// The semester running today, e.g. `SoSe2020`
    pub current: String,
    /// Choices when tagging courses
    pub tagging: Vec<String>,
    /// Choices when browsing the catalogue
    pub search: Vec<String>,
    /// Labels currently carried by at least one course
    pub used: Vec<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SemesterTagRequest {
    pub semester: String,
    pub course_id: i64,
    pub module_id: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TagResponse {
    /// Whether anything was changed
    pub changed: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DropSemesterResponse {
    pub semester: String,
    pub courses_changed: u64,
}
