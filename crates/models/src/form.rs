//! Conversion between the flat module form and the nested entity graph.
//!
//! Module scalars use plain keys (`titel_deutsch`, `modulkategorie`, ...).
//! Every course `i` (1-based) uses the prefix `veranstaltung{i}_`, and
//! `veranstaltungsanzahl` holds the number of courses. Checkboxes are only
//! present in a submission when checked.

use crate::{
    category::ModuleCategory,
    error::{CatalogError, CatalogResult},
    module::{Course, DeliveryForm, Description, ExtraField, Module},
};
use serde::{Deserialize, Serialize};
use std::{
    collections::{BTreeSet, HashMap},
    str::FromStr,
};

/// Teaching formats offered as checkboxes, in form order (`form1` .. `form5`)
pub const DELIVERY_FORM_LABELS: [&str; 5] = ["Vorlesung", "Übung", "Praktikum", "Seminar", "Projekt"];

/// Number of extra-field slots per course
pub const EXTRA_FIELD_SLOTS: usize = 2;

/// Upper bound for `veranstaltungsanzahl`
pub const MAX_COURSES: usize = 20;

pub const KEY_COURSE_COUNT: &str = "veranstaltungsanzahl";
pub const KEY_MODULE_ID: &str = "modul_id";
pub const KEY_TITLE_DE: &str = "titel_deutsch";
pub const KEY_TITLE_EN: &str = "titel_englisch";
pub const KEY_RESPONSIBLE: &str = "modulverantwortliche";
pub const KEY_TOTAL_CREDIT_POINTS: &str = "gesamtleistungspunkte";
pub const KEY_DEGREE_PROGRAM: &str = "studiengang";
pub const KEY_CATEGORY: &str = "modulkategorie";
pub const KEY_VISIBLE: &str = "sichtbar";

const CHECKED: &str = "on";

/// A flat `name -> value` form submission
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormData(HashMap<String, String>);

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    /// Trimmed value of `key`, `None` when missing or blank
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .get(key)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }

    pub fn is_checked(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> HashMap<String, String> {
        self.0
    }
}

impl From<HashMap<String, String>> for FormData {
    fn from(map: HashMap<String, String>) -> Self {
        Self(map)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormData {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

fn course_key(index: usize, field: &str) -> String {
    format!("veranstaltung{index}_{field}")
}

fn is_credit_points(value: &str) -> bool {
    value
        .replace(',', ".")
        .parse::<f64>()
        .is_ok_and(|points| points.is_finite() && points >= 0.0)
}

fn split_list(value: &str) -> BTreeSet<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn join_list(items: &BTreeSet<String>) -> String {
    items.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
}

/// Reads typed values out of a [`FormData`] while collecting every problem
struct FormReader<'a> {
    form: &'a FormData,
    errors: Vec<String>,
}

impl<'a> FormReader<'a> {
    fn new(form: &'a FormData) -> Self {
        Self {
            form,
            errors: Vec::new(),
        }
    }

    fn optional(&self, key: &str) -> String {
        self.form.get(key).unwrap_or_default().to_string()
    }

    fn required(&mut self, key: &str) -> String {
        let form = self.form;
        match form.get(key) {
            Some(value) => value.to_string(),
            None => {
                self.errors.push(format!("{key} is required"));
                String::new()
            }
        }
    }

    fn credit_points(&mut self, key: &str) -> String {
        let value = self.required(key);
        if !value.is_empty() && !is_credit_points(&value) {
            self.errors.push(format!("{key} must be a number, got '{value}'"));
        }
        value
    }

    fn hours(&mut self, key: &str) -> Option<u32> {
        let form = self.form;
        let value = form.get(key)?;
        match value.parse() {
            Ok(hours) => Some(hours),
            Err(_) => {
                self.errors
                    .push(format!("{key} must be a whole number of hours, got '{value}'"));
                None
            }
        }
    }

    fn id(&mut self, key: &str) -> Option<i64> {
        let form = self.form;
        let value = form.get(key)?;
        match value.parse() {
            Ok(id) => Some(id),
            Err(_) => {
                self.errors.push(format!("{key} is not a valid id"));
                None
            }
        }
    }

    fn category(&mut self) -> Option<ModuleCategory> {
        let value = self.required(KEY_CATEGORY);
        if value.is_empty() {
            return None;
        }
        match ModuleCategory::from_str(&value) {
            Ok(category) => Some(category),
            Err(_) => {
                self.errors
                    .push(format!("{KEY_CATEGORY} has unknown value '{value}'"));
                None
            }
        }
    }

    fn course_count(&mut self) -> usize {
        let form = self.form;
        let Some(value) = form.get(KEY_COURSE_COUNT) else {
            self.errors.push(format!("{KEY_COURSE_COUNT} is required"));
            return 0;
        };
        match value.parse::<usize>() {
            Ok(count) if count > MAX_COURSES => {
                self.errors.push(format!(
                    "{KEY_COURSE_COUNT} must be at most {MAX_COURSES}, got '{value}'"
                ));
                0
            }
            Ok(count) if count >= 1 => count,
            _ => {
                self.errors.push(format!(
                    "{KEY_COURSE_COUNT} must be a positive number, got '{value}'"
                ));
                0
            }
        }
    }

    /// A slot only counts when both title and content are filled in
    fn extra_field(&self, index: usize, slot: usize) -> Option<ExtraField> {
        let title = self.form.get(&course_key(index, &format!("zusatzfeld{slot}_titel")))?;
        let content = self.form.get(&course_key(index, &format!("zusatzfeld{slot}_inhalt")))?;
        Some(ExtraField::new(title, content))
    }

    fn delivery_forms(&mut self, index: usize) -> Vec<DeliveryForm> {
        let mut forms = Vec::new();
        for (slot, label) in DELIVERY_FORM_LABELS.iter().enumerate() {
            let checked = course_key(index, &format!("form{}_checked", slot + 1));
            if self.form.is_checked(&checked) {
                let hours = self.hours(&course_key(index, &format!("form{}_sws", slot + 1)));
                forms.push(DeliveryForm::new(*label, hours));
            }
        }

        if self
            .form
            .is_checked(&course_key(index, "form_sonstige_checked"))
        {
            let name = self.required(&course_key(index, "form_sonstige_name"));
            let hours = self.hours(&course_key(index, "form_sonstige_sws"));
            if !name.is_empty() {
                forms.push(DeliveryForm::new(name, hours));
            }
        }

        forms
    }

    fn course(&mut self, index: usize) -> Course {
        let key = |field: &str| course_key(index, field);

        let description = Description {
            content: self.required(&key("inhalte")),
            learning_outcomes: self.required(&key("lernergebnisse")),
            literature: self.optional(&key("literatur")),
            applicability: self.optional(&key("verwendbarkeit")),
            prerequisites_to_pass: self.optional(&key("voraussetzungen_bestehen")),
            frequency: self.optional(&key("haeufigkeit")),
            language: self.form.get(&key("sprache")).map(str::to_string),
        };

        let mut course = Course::new(
            self.required(&key("titel")),
            self.credit_points(&key("leistungspunkte")),
            description,
            self.optional(&key("voraussetzungen_teilnahme")),
        );
        course.id = self.id(&key("id"));
        course.semesters = split_list(&self.optional(&key("semester")));

        for form in self.delivery_forms(index) {
            course.attach_delivery_form(form);
        }
        for slot in 1..=EXTRA_FIELD_SLOTS {
            if let Some(field) = self.extra_field(index, slot) {
                course.attach_extra_field(field);
            }
        }

        course
    }

    fn module(&mut self) -> Module {
        let responsible = split_list(&self.required(KEY_RESPONSIBLE));

        let mut module = Module {
            id: self.id(KEY_MODULE_ID),
            title_de: self.required(KEY_TITLE_DE),
            title_en: self.required(KEY_TITLE_EN),
            responsible,
            total_credit_points: self.credit_points(KEY_TOTAL_CREDIT_POINTS),
            degree_program: self.required(KEY_DEGREE_PROGRAM),
            category: self.category(),
            visible: self.form.is_checked(KEY_VISIBLE),
            ..Default::default()
        };

        for index in 1..=self.course_count() {
            let course = self.course(index);
            module.attach_course(course);
        }

        module
    }
}

/// Builds a module from a form submission.
///
/// Every validation problem is reported at once in
/// [`CatalogError::ValidationFailed`].
pub fn unmarshal(form: &FormData) -> CatalogResult<Module> {
    let mut reader = FormReader::new(form);
    let module = reader.module();

    if reader.errors.is_empty() {
        Ok(module)
    } else {
        Err(CatalogError::ValidationFailed(reader.errors))
    }
}

/// One course together with the children that are edited alongside it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CourseSlot {
    pub course: Course,
    pub delivery_forms: Vec<DeliveryForm>,
    pub extra_fields: Vec<ExtraField>,
}

/// Form-friendly view of a module: the courses are split out into slots
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModuleWrapper {
    pub module: Module,
    pub courses: Vec<CourseSlot>,
}

/// Splits a module into its form representation
pub fn marshal(module: &Module) -> ModuleWrapper {
    let mut module = module.clone();
    let courses = std::mem::take(&mut module.courses)
        .into_iter()
        .map(|mut course| CourseSlot {
            delivery_forms: std::mem::take(&mut course.delivery_forms),
            extra_fields: std::mem::take(&mut course.extra_fields),
            course,
        })
        .collect();

    ModuleWrapper { module, courses }
}

impl ModuleWrapper {
    /// A blank form for `course_count` courses
    pub fn empty(course_count: usize) -> Self {
        Self {
            module: Module {
                visible: true,
                ..Default::default()
            },
            courses: vec![CourseSlot::default(); course_count.max(1)],
        }
    }

    /// Reassembles the module, wiring every owner link
    pub fn into_module(self) -> Module {
        let mut module = self.module;
        module.courses.clear();

        for slot in self.courses {
            let mut course = slot.course;
            course.delivery_forms.clear();
            course.extra_fields.clear();
            for form in slot.delivery_forms {
                course.attach_delivery_form(form);
            }
            for field in slot.extra_fields {
                course.attach_extra_field(field);
            }
            module.attach_course(course);
        }

        module.relink();
        module
    }

    /// The flat representation used to prefill the form.
    ///
    /// Delivery forms outside [`DELIVERY_FORM_LABELS`] go into the free-text
    /// slot; only the first of them fits. Likewise only the first
    /// [`EXTRA_FIELD_SLOTS`] extra fields of a course are rendered.
    pub fn to_form_data(&self) -> FormData {
        let module = &self.module;
        let mut form = FormData::new();

        if let Some(id) = module.id {
            form.insert(KEY_MODULE_ID, id.to_string());
        }
        form.insert(KEY_TITLE_DE, module.title_de.as_str());
        form.insert(KEY_TITLE_EN, module.title_en.as_str());
        form.insert(KEY_RESPONSIBLE, join_list(&module.responsible));
        form.insert(KEY_TOTAL_CREDIT_POINTS, module.total_credit_points.as_str());
        form.insert(KEY_DEGREE_PROGRAM, module.degree_program.as_str());
        if let Some(category) = module.category {
            form.insert(KEY_CATEGORY, category.as_str());
        }
        if module.visible {
            form.insert(KEY_VISIBLE, CHECKED);
        }
        form.insert(KEY_COURSE_COUNT, self.courses.len().to_string());

        for (offset, slot) in self.courses.iter().enumerate() {
            write_course(&mut form, offset + 1, slot);
        }

        form
    }
}

fn write_course(form: &mut FormData, index: usize, slot: &CourseSlot) {
    let course = &slot.course;
    let description = &course.description;
    let mut put = |field: &str, value: &str| form.insert(course_key(index, field), value);

    if let Some(id) = course.id {
        put("id", &id.to_string());
    }
    put("titel", &course.title);
    put("leistungspunkte", &course.credit_points);
    put("voraussetzungen_teilnahme", &course.admission_prerequisites);
    put("semester", &join_list(&course.semesters));
    put("inhalte", &description.content);
    put("lernergebnisse", &description.learning_outcomes);
    put("literatur", &description.literature);
    put("verwendbarkeit", &description.applicability);
    put("voraussetzungen_bestehen", &description.prerequisites_to_pass);
    put("haeufigkeit", &description.frequency);
    if let Some(language) = &description.language {
        put("sprache", language);
    }

    let mut other_written = false;
    for delivery in &slot.delivery_forms {
        let hours = delivery.weekly_hours.map(|h| h.to_string());
        match DELIVERY_FORM_LABELS.iter().position(|l| *l == delivery.form) {
            Some(k) => {
                put(&format!("form{}_checked", k + 1), CHECKED);
                if let Some(hours) = &hours {
                    put(&format!("form{}_sws", k + 1), hours);
                }
            }
            None if !other_written => {
                other_written = true;
                put("form_sonstige_checked", CHECKED);
                put("form_sonstige_name", &delivery.form);
                if let Some(hours) = &hours {
                    put("form_sonstige_sws", hours);
                }
            }
            None => {}
        }
    }

    for (slot_index, field) in slot.extra_fields.iter().take(EXTRA_FIELD_SLOTS).enumerate() {
        put(&format!("zusatzfeld{}_titel", slot_index + 1), &field.title);
        put(&format!("zusatzfeld{}_inhalt", slot_index + 1), &field.content);
    }
}
