//! Conversions between table rows and the catalogue model

use crate::entities::{change_requests, courses, delivery_forms, extra_fields, modules};
use models::{
    category::ModuleCategory,
    change_request::{ChangeRequest, ChangeRequestStatus},
    module::{Course, DeliveryForm, Description, ExtraField, Module},
};
use sea_orm::{
    ActiveValue::{NotSet, Set},
    prelude::Json,
};
use std::{collections::BTreeSet, str::FromStr};

pub fn string_set(value: Json, column: &str) -> BTreeSet<String> {
    serde_json::from_value(value).unwrap_or_else(|e| {
        log::warn!("Ignoring malformed {column} column: {e}");
        BTreeSet::new()
    })
}

fn json_list(items: &BTreeSet<String>) -> Json {
    Json::from(items.iter().cloned().collect::<Vec<_>>())
}

/// Builds a module without its children
pub fn module_from_row(row: modules::Model) -> Module {
    let category = row.category.as_deref().and_then(|value| {
        ModuleCategory::from_str(value)
            .inspect_err(|_| log::warn!("Module {} has unknown category {value}", row.id))
            .ok()
    });

    Module {
        id: Some(row.id),
        title_de: row.title_de,
        title_en: row.title_en,
        courses: Vec::new(),
        responsible: string_set(row.responsible, "responsible"),
        total_credit_points: row.total_credit_points,
        degree_program: row.degree_program,
        category,
        visible: row.visible,
        created_at: row.created_at,
        modified_at: row.modified_at,
        extra_fields: Vec::new(),
    }
}

pub fn module_to_active(module: &Module) -> modules::ActiveModel {
    modules::ActiveModel {
        id: module.id.map_or(NotSet, Set),
        title_de: Set(module.title_de.clone()),
        title_en: Set(module.title_en.clone()),
        responsible: Set(json_list(&module.responsible)),
        total_credit_points: Set(module.total_credit_points.clone()),
        degree_program: Set(module.degree_program.clone()),
        category: Set(module.category.map(|c| c.as_str().to_owned())),
        visible: Set(module.visible),
        created_at: Set(module.created_at),
        modified_at: Set(module.modified_at),
    }
}

/// Builds a course without its delivery forms and extra fields
pub fn course_from_row(row: courses::Model) -> Course {
    Course {
        id: Some(row.id),
        module_id: Some(row.module_id),
        title: row.title,
        credit_points: row.credit_points,
        admission_prerequisites: row.admission_prerequisites,
        semesters: string_set(row.semesters, "semesters"),
        description: Description {
            content: row.content,
            learning_outcomes: row.learning_outcomes,
            literature: row.literature,
            applicability: row.applicability,
            prerequisites_to_pass: row.prerequisites_to_pass,
            frequency: row.frequency,
            language: row.language,
        },
        delivery_forms: Vec::new(),
        extra_fields: Vec::new(),
    }
}

pub fn course_to_active(course: &Course, module_id: i64) -> courses::ActiveModel {
    let description = &course.description;
    courses::ActiveModel {
        id: course.id.map_or(NotSet, Set),
        module_id: Set(module_id),
        title: Set(course.title.clone()),
        credit_points: Set(course.credit_points.clone()),
        admission_prerequisites: Set(course.admission_prerequisites.clone()),
        semesters: Set(json_list(&course.semesters)),
        content: Set(description.content.clone()),
        learning_outcomes: Set(description.learning_outcomes.clone()),
        literature: Set(description.literature.clone()),
        applicability: Set(description.applicability.clone()),
        prerequisites_to_pass: Set(description.prerequisites_to_pass.clone()),
        frequency: Set(description.frequency.clone()),
        language: Set(description.language.clone()),
    }
}

/// Tag column update for a single course
pub fn semesters_update(course_id: i64, semesters: &BTreeSet<String>) -> courses::ActiveModel {
    courses::ActiveModel {
        id: Set(course_id),
        semesters: Set(json_list(semesters)),
        ..Default::default()
    }
}

pub fn delivery_form_from_row(row: delivery_forms::Model) -> DeliveryForm {
    DeliveryForm {
        id: Some(row.id),
        form: row.form,
        weekly_hours: row.weekly_hours.and_then(|h| u32::try_from(h).ok()),
        course_id: Some(row.course_id),
    }
}

pub fn delivery_form_to_active(form: &DeliveryForm, course_id: i64) -> delivery_forms::ActiveModel {
    delivery_forms::ActiveModel {
        id: NotSet,
        course_id: Set(course_id),
        form: Set(form.form.clone()),
        weekly_hours: Set(form.weekly_hours.and_then(|h| i32::try_from(h).ok())),
    }
}

pub fn extra_field_from_row(row: extra_fields::Model) -> ExtraField {
    ExtraField {
        id: Some(row.id),
        title: row.title,
        content: row.content,
        owner: None,
    }
}

pub fn extra_field_to_active(
    field: &ExtraField,
    module_id: Option<i64>,
    course_id: Option<i64>,
) -> extra_fields::ActiveModel {
    extra_fields::ActiveModel {
        id: NotSet,
        module_id: Set(module_id),
        course_id: Set(course_id),
        title: Set(field.title.clone()),
        content: Set(field.content.clone()),
    }
}

pub fn change_request_from_row(row: change_requests::Model) -> ChangeRequest {
    let status = ChangeRequestStatus::from_str(&row.status).unwrap_or_else(|_| {
        log::warn!(
            "Change request {} has unknown status {}, treating it as pending",
            row.id,
            row.status
        );
        ChangeRequestStatus::Pending
    });

    ChangeRequest {
        id: Some(row.id),
        module_id: row.module_id,
        payload: row.payload,
        submitter: row.submitter,
        status,
        created_at: row.created_at,
        approved_at: row.approved_at,
    }
}

pub fn change_request_to_active(request: &ChangeRequest) -> change_requests::ActiveModel {
    change_requests::ActiveModel {
        id: request.id.map_or(NotSet, Set),
        module_id: Set(request.module_id),
        payload: Set(request.payload.clone()),
        submitter: Set(request.submitter.clone()),
        status: Set(request.status.as_str().to_owned()),
        created_at: Set(request.created_at),
        approved_at: Set(request.approved_at),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use sea_orm::ActiveValue;
    use serde_json::json;

    fn module_row() -> modules::Model {
        modules::Model {
            id: 42,
            title_de: "Algorithmen".to_string(),
            title_en: "Algorithms".to_string(),
            responsible: json!(["Prof. Dr. Schmidt", "Dr. Weber"]),
            total_credit_points: "10".to_string(),
            degree_program: "Bachelor-Studiengang Informatik".to_string(),
            category: Some("SEMINAR".to_string()),
            visible: true,
            created_at: None,
            modified_at: None,
        }
    }

    fn course_row() -> courses::Model {
        courses::Model {
            id: 7,
            module_id: 42,
            title: "Algorithmen und Datenstrukturen".to_string(),
            credit_points: "5".to_string(),
            admission_prerequisites: "Keine".to_string(),
            semesters: json!(["WiSe2020", "SoSe2020"]),
            content: "Sortieren".to_string(),
            learning_outcomes: "Laufzeiten".to_string(),
            literature: "Cormen".to_string(),
            applicability: "Bachelor".to_string(),
            prerequisites_to_pass: "Klausur".to_string(),
            frequency: "Jedes Wintersemester".to_string(),
            language: None,
        }
    }

    #[test]
    fn test_module_row_round_trip() {
        let module = module_from_row(module_row());
        assert_eq!(module.category, Some(ModuleCategory::Seminar));
        assert_eq!(module.responsible.len(), 2);

        let active = module_to_active(&module);
        assert_eq!(active.id, ActiveValue::Set(42));
        assert_eq!(active.category, ActiveValue::Set(Some("SEMINAR".to_string())));
        assert_eq!(
            active.responsible,
            ActiveValue::Set(json!(["Dr. Weber", "Prof. Dr. Schmidt"]))
        );
    }

    #[test]
    fn test_new_module_leaves_id_unset() {
        let mut module = module_from_row(module_row());
        module.id = None;
        assert_eq!(module_to_active(&module).id, ActiveValue::NotSet);
    }

    #[test]
    fn test_malformed_columns_are_tolerated() {
        let mut row = module_row();
        row.category = Some("UNKNOWN".to_string());
        row.responsible = json!({"name": "Schmidt"});

        let module = module_from_row(row);
        assert_eq!(module.category, None);
        assert!(module.responsible.is_empty());
    }

    #[test]
    fn test_course_row_carries_description_and_tags() {
        let course = course_from_row(course_row());
        assert_eq!(course.module_id, Some(42));
        assert_eq!(course.description.literature, "Cormen");
        assert!(course.semesters.contains("SoSe2020"));

        let active = course_to_active(&course, 43);
        assert_eq!(active.module_id, ActiveValue::Set(43));
        assert_eq!(active.semesters, ActiveValue::Set(json!(["SoSe2020", "WiSe2020"])));
    }

    #[test]
    fn test_negative_weekly_hours_are_dropped() {
        let form = delivery_form_from_row(delivery_forms::Model {
            id: 1,
            course_id: 7,
            form: "Vorlesung".to_string(),
            weekly_hours: Some(-2),
        });
        assert_eq!(form.weekly_hours, None);
        assert_eq!(form.course_id, Some(7));
    }

    #[test]
    fn test_change_request_status_mapping() {
        let created_at = NaiveDate::from_ymd_opt(2020, 4, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let row = change_requests::Model {
            id: 3,
            module_id: Some(42),
            payload: "{}".to_string(),
            submitter: "schmidt".to_string(),
            status: "approved".to_string(),
            created_at,
            approved_at: Some(created_at),
        };

        let request = change_request_from_row(row);
        assert!(request.is_approved());

        let active = change_request_to_active(&request);
        assert_eq!(active.status, ActiveValue::Set("approved".to_string()));
        assert_eq!(active.id, ActiveValue::Set(3));
    }
}
