use chrono::NaiveDateTime;
use models::module::{Course, DeliveryForm, ExtraField, Module};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Serialize, ToSchema)]
pub struct ModuleResponse {
    pub id: Option<i64>,
    pub title_de: String,
    pub title_en: String,
    pub responsible: Vec<String>,
    pub total_credit_points: String,
    pub degree_program: String,
    /// Stable category identifier, e.g. `BACHELOR_MANDATORY`
    pub category: Option<String>,
    /// German display label of the category
    pub category_label: Option<String>,
    pub visible: bool,
    pub created_at: Option<NaiveDateTime>,
    pub modified_at: Option<NaiveDateTime>,
    pub courses: Vec<CourseResponse>,
    pub extra_fields: Vec<ExtraFieldResponse>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CourseResponse {
    pub id: Option<i64>,
    pub title: String,
    pub credit_points: String,
    pub admission_prerequisites: String,
    pub semesters: Vec<String>,
    pub description: DescriptionResponse,
    pub delivery_forms: Vec<DeliveryFormResponse>,
    pub extra_fields: Vec<ExtraFieldResponse>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DescriptionResponse {
    pub content: String,
    pub learning_outcomes: String,
    pub literature: String,
    pub applicability: String,
    pub prerequisites_to_pass: String,
    pub frequency: String,
    pub language: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DeliveryFormResponse {
    pub form: String,
    pub weekly_hours: Option<u32>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ExtraFieldResponse {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct SearchQuery {
    /// Free text matched against module and course titles
    pub q: Option<String>,
}

impl From<&ExtraField> for ExtraFieldResponse {
    fn from(field: &ExtraField) -> Self {
        Self {
            title: field.title.clone(),
            content: field.content.clone(),
        }
    }
}

impl From<&DeliveryForm> for DeliveryFormResponse {
    fn from(form: &DeliveryForm) -> Self {
        Self {
            form: form.form.clone(),
            weekly_hours: form.weekly_hours,
        }
    }
}

impl From<&Course> for CourseResponse {
    fn from(course: &Course) -> Self {
        let description = &course.description;
        Self {
            id: course.id,
            title: course.title.clone(),
            credit_points: course.credit_points.clone(),
            admission_prerequisites: course.admission_prerequisites.clone(),
            semesters: course.semesters.iter().cloned().collect(),
            description: DescriptionResponse {
                content: description.content.clone(),
                learning_outcomes: description.learning_outcomes.clone(),
                literature: description.literature.clone(),
                applicability: description.applicability.clone(),
                prerequisites_to_pass: description.prerequisites_to_pass.clone(),
                frequency: description.frequency.clone(),
                language: description.language.clone(),
            },
            delivery_forms: course.delivery_forms.iter().map(Into::into).collect(),
            extra_fields: course.extra_fields.iter().map(Into::into).collect(),
        }
    }
}

impl From<&Module> for ModuleResponse {
    fn from(module: &Module) -> Self {
        Self {
            id: module.id,
            title_de: module.title_de.clone(),
            title_en: module.title_en.clone(),
            responsible: module.responsible.iter().cloned().collect(),
            total_credit_points: module.total_credit_points.clone(),
            degree_program: module.degree_program.clone(),
            category: module.category.map(|c| c.as_str().to_owned()),
            category_label: module.category.map(|c| c.label().to_owned()),
            visible: module.visible,
            created_at: module.created_at,
            modified_at: module.modified_at,
            courses: module.courses.iter().map(Into::into).collect(),
            extra_fields: module.extra_fields.iter().map(Into::into).collect(),
        }
    }
}

pub fn module_responses(modules: &[Module]) -> Vec<ModuleResponse> {
    modules.iter().map(Into::into).collect()
}
