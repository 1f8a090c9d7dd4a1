use crate::{
    category::ModuleCategory,
    error::{CatalogError, CatalogResult},
};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Owner of an [`ExtraField`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtraFieldOwner {
    Module(i64),
    Course(i64),
}

/// A free-form title/content pair attached to a module or a course
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtraField {
    pub id: Option<i64>,
    pub title: String,
    pub content: String,
    #[serde(skip)]
    pub owner: Option<ExtraFieldOwner>,
}

impl ExtraField {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            ..Default::default()
        }
    }
}

// Extra fields are replaced wholesale on save, so they compare by value only
impl PartialEq for ExtraField {
    fn eq(&self, other: &Self) -> bool {
        self.title == other.title && self.content == other.content
    }
}

/// A teaching format of a course, e.g. "Vorlesung" with 4 weekly hours
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeliveryForm {
    pub id: Option<i64>,
    pub form: String,
    pub weekly_hours: Option<u32>,
    #[serde(skip)]
    pub course_id: Option<i64>,
}

impl DeliveryForm {
    pub fn new(form: impl Into<String>, weekly_hours: Option<u32>) -> Self {
        Self {
            form: form.into(),
            weekly_hours,
            ..Default::default()
        }
    }
}

impl PartialEq for DeliveryForm {
    fn eq(&self, other: &Self) -> bool {
        self.form == other.form && self.weekly_hours == other.weekly_hours
    }
}

/// Long-form description embedded in every course
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Description {
    pub content: String,
    pub learning_outcomes: String,
    pub literature: String,
    pub applicability: String,
    pub prerequisites_to_pass: String,
    pub frequency: String,
    pub language: Option<String>,
}

/// A teaching unit owned by a [`Module`]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Course {
    pub id: Option<i64>,
    /// Owning module; not part of equality or the JSON snapshot
    #[serde(skip)]
    pub module_id: Option<i64>,
    pub title: String,
    pub credit_points: String,
    pub admission_prerequisites: String,
    #[serde(default)]
    pub semesters: BTreeSet<String>,
    pub description: Description,
    #[serde(default)]
    pub delivery_forms: Vec<DeliveryForm>,
    #[serde(default)]
    pub extra_fields: Vec<ExtraField>,
}

impl Course {
    pub fn new(
        title: impl Into<String>,
        credit_points: impl Into<String>,
        description: Description,
        admission_prerequisites: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            credit_points: credit_points.into(),
            description,
            admission_prerequisites: admission_prerequisites.into(),
            ..Default::default()
        }
    }

    pub fn attach_delivery_form(&mut self, mut form: DeliveryForm) {
        form.course_id = self.id;
        self.delivery_forms.push(form);
    }

    pub fn attach_extra_field(&mut self, mut field: ExtraField) {
        field.owner = self.id.map(ExtraFieldOwner::Course);
        self.extra_fields.push(field);
    }

    /// Points every owned delivery form and extra field back at this course
    pub fn relink(&mut self) {
        for form in &mut self.delivery_forms {
            form.course_id = self.id;
        }
        for field in &mut self.extra_fields {
            field.owner = self.id.map(ExtraFieldOwner::Course);
        }
    }

    pub fn links_consistent(&self) -> bool {
        self.delivery_forms.iter().all(|f| f.course_id == self.id)
            && self
                .extra_fields
                .iter()
                .all(|f| f.owner == self.id.map(ExtraFieldOwner::Course))
    }
}

impl PartialEq for Course {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.title == other.title
            && self.credit_points == other.credit_points
            && self.admission_prerequisites == other.admission_prerequisites
            && self.semesters == other.semesters
            && self.description == other.description
            && same_elements(&self.delivery_forms, &other.delivery_forms)
            && same_elements(&self.extra_fields, &other.extra_fields)
    }
}

/// Order-insensitive comparison for the set-like child collections
pub fn same_elements<T: PartialEq>(a: &[T], b: &[T]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut used = vec![false; b.len()];
    a.iter().all(|item| {
        let found = b
            .iter()
            .enumerate()
            .position(|(idx, candidate)| !used[idx] && candidate == item);

        match found {
            Some(idx) => {
                used[idx] = true;
                true
            }
            None => false,
        }
    })
}

/// One version of a catalogue module
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Module {
    pub id: Option<i64>,
    pub title_de: String,
    pub title_en: String,
    #[serde(default)]
    pub courses: Vec<Course>,
    #[serde(default)]
    pub responsible: BTreeSet<String>,
    pub total_credit_points: String,
    pub degree_program: String,
    pub category: Option<ModuleCategory>,
    pub visible: bool,
    pub created_at: Option<NaiveDateTime>,
    pub modified_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub extra_fields: Vec<ExtraField>,
}

impl Module {
    /// Adds a course and points it (and its children) at this module
    pub fn attach_course(&mut self, mut course: Course) {
        course.module_id = self.id;
        course.relink();
        self.courses.push(course);
    }

    pub fn attach_extra_field(&mut self, mut field: ExtraField) {
        field.owner = self.id.map(ExtraFieldOwner::Module);
        self.extra_fields.push(field);
    }

    /// Re-establishes every owner link below this module, e.g. after an id was assigned
    pub fn relink(&mut self) {
        for course in &mut self.courses {
            course.module_id = self.id;
            course.relink();
        }
        for field in &mut self.extra_fields {
            field.owner = self.id.map(ExtraFieldOwner::Module);
        }
    }

    /// Takes over what a form cannot carry from the stored version of this module:
    /// id, timestamps and module-level extra fields
    pub fn carry_over(&mut self, live: &Module) {
        self.id = live.id;
        self.created_at = live.created_at;
        self.modified_at = live.modified_at;
        self.extra_fields = live.extra_fields.clone();
        self.relink();
    }

    pub fn links_consistent(&self) -> bool {
        self.courses
            .iter()
            .all(|c| c.module_id == self.id && c.links_consistent())
            && self
                .extra_fields
                .iter()
                .all(|f| f.owner == self.id.map(ExtraFieldOwner::Module))
    }

    pub fn course(&self, course_id: i64) -> Option<&Course> {
        self.courses.iter().find(|c| c.id == Some(course_id))
    }

    pub fn course_mut(&mut self, course_id: i64) -> Option<&mut Course> {
        self.courses.iter_mut().find(|c| c.id == Some(course_id))
    }

    /// Adds `semester` to the tags of the given course.
    /// Returns `false` if the course already carried the tag.
    pub fn tag_course_semester(&mut self, semester: &str, course_id: i64) -> CatalogResult<bool> {
        let course = self
            .course_mut(course_id)
            .ok_or_else(|| CatalogError::course_not_found(course_id))?;

        Ok(course.semesters.insert(semester.to_string()))
    }

    /// Removes `semester` from the tags of the given course.
    /// Returns `false` if the tag was not present.
    pub fn untag_course_semester(
        &mut self,
        semester: &str,
        course_id: i64,
    ) -> CatalogResult<bool> {
        let course = self
            .course_mut(course_id)
            .ok_or_else(|| CatalogError::course_not_found(course_id))?;

        Ok(course.semesters.remove(semester))
    }

    pub fn is_offered_in(&self, semester: &str) -> bool {
        self.courses.iter().any(|c| c.semesters.contains(semester))
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    pub fn description(topic: &str) -> Description {
        Description {
            content: format!("{topic} content"),
            learning_outcomes: format!("{topic} outcomes"),
            literature: "Cormen et al.".to_string(),
            applicability: "Bachelor Informatik".to_string(),
            prerequisites_to_pass: "Written exam".to_string(),
            frequency: "Every winter semester".to_string(),
            language: Some("Deutsch".to_string()),
        }
    }

    pub fn course(id: i64, title: &str) -> Course {
        let mut course = Course::new(title, "5", description(title), "None");
        course.id = Some(id);
        course.attach_delivery_form(DeliveryForm::new("Vorlesung", Some(4)));
        course.attach_delivery_form(DeliveryForm::new("Übung", Some(2)));
        course
    }

    pub fn module() -> Module {
        let mut module = Module {
            id: Some(42),
            title_de: "Algorithmen".to_string(),
            title_en: "Algorithms".to_string(),
            responsible: BTreeSet::from(["Prof. Dr. Schmidt".to_string()]),
            total_credit_points: "10".to_string(),
            degree_program: "Bachelor-Studiengang Informatik".to_string(),
            category: Some(ModuleCategory::BachelorMandatory),
            visible: true,
            ..Default::default()
        };
        module.attach_course(course(1, "Algorithmen und Datenstrukturen"));
        module.attach_course(course(2, "Übung Algorithmen"));
        module
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn test_attach_course_sets_owner() {
        let module = module();
        assert!(module.courses.iter().all(|c| c.module_id == Some(42)));
        assert!(module.links_consistent());
    }

    #[test]
    fn test_relink_after_id_assignment() {
        let mut module = module();
        module.id = None;
        module.relink();
        assert!(module.links_consistent());

        module.id = Some(99);
        assert!(!module.links_consistent());
        module.relink();
        assert!(module.links_consistent());
        assert_eq!(module.courses[0].module_id, Some(99));
    }

    #[test]
    fn test_course_relink_reaches_children() {
        let mut course = course(5, "Compilerbau");
        course.attach_extra_field(ExtraField::new("Hinweis", "Wichtig"));
        course.id = Some(6);
        assert!(!course.links_consistent());

        course.relink();
        assert!(course.links_consistent());
        assert_eq!(course.delivery_forms[0].course_id, Some(6));
        assert_eq!(
            course.extra_fields[0].owner,
            Some(ExtraFieldOwner::Course(6))
        );
    }

    #[test]
    fn test_module_extra_field_owner() {
        let mut module = module();
        module.attach_extra_field(ExtraField::new("Anmerkung", "Nur im Wintersemester"));
        assert_eq!(
            module.extra_fields[0].owner,
            Some(ExtraFieldOwner::Module(42))
        );
        assert!(module.links_consistent());
    }

    #[test]
    fn test_tag_semester_is_idempotent() {
        let mut module = module();
        assert!(module.tag_course_semester("SoSe2020", 1).unwrap());
        assert!(!module.tag_course_semester("SoSe2020", 1).unwrap());

        let course = module.course(1).unwrap();
        assert_eq!(course.semesters.len(), 1);
        assert!(course.semesters.contains("SoSe2020"));
        assert!(module.is_offered_in("SoSe2020"));
        assert!(!module.is_offered_in("WiSe2020"));
    }

    #[test]
    fn test_untag_absent_semester_is_noop() {
        let mut module = module();
        module.tag_course_semester("WiSe2019", 2).unwrap();
        let before = module.course(2).unwrap().semesters.clone();

        assert!(!module.untag_course_semester("SoSe2020", 2).unwrap());
        assert_eq!(module.course(2).unwrap().semesters, before);

        assert!(module.untag_course_semester("WiSe2019", 2).unwrap());
        assert!(module.course(2).unwrap().semesters.is_empty());
    }

    #[test]
    fn test_tag_unknown_course() {
        let mut module = module();
        let err = module.tag_course_semester("SoSe2020", 77).unwrap_err();
        assert!(matches!(
            err,
            CatalogError::NotFound {
                entity: "Course",
                id: 77
            }
        ));
    }

    #[test]
    fn test_course_equality_ignores_owner_and_child_order() {
        let mut a = course(1, "Algorithmen");
        let mut b = a.clone();
        b.module_id = Some(1234);
        b.delivery_forms.reverse();
        assert_eq!(a, b);

        a.semesters.insert("SoSe2020".to_string());
        assert_ne!(a, b);
    }

    #[test]
    fn test_same_elements_counts_duplicates() {
        assert!(same_elements(&[1, 1, 2], &[2, 1, 1]));
        assert!(!same_elements(&[1, 1, 2], &[1, 2, 2]));
        assert!(!same_elements(&[1], &[1, 1]));
    }

    #[test]
    fn test_snapshot_skips_back_references() {
        let module = module();
        let json = serde_json::to_value(&module).unwrap();
        let course = &json["courses"][0];
        assert!(course.get("module_id").is_none());
        assert!(course["delivery_forms"][0].get("course_id").is_none());
        assert_eq!(course["description"]["literature"], "Cormen et al.");
        assert_eq!(json["category"], "BACHELOR_MANDATORY");
    }
}
