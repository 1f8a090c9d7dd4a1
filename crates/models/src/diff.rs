//! Field-level differences between two versions of a [`Module`].
//!
//! The set of diffable attributes is a fixed table generated by
//! `diffable_fields!`. The owned collections (courses, extra fields), the id and
//! the last-modified timestamp are not part of it: course edits travel through
//! the form wrapper instead.

use crate::{
    category::ModuleCategory,
    error::{CatalogError, CatalogResult},
    module::Module,
};
use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeSet;

/// A single field of a [`ModuleDiff`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change<T> {
    /// The field keeps its current value
    Unchanged,
    /// The field is overwritten with this value, which may itself be empty
    Set(T),
}

impl<T> Default for Change<T> {
    fn default() -> Self {
        Self::Unchanged
    }
}

impl<T> Change<T> {
    pub fn is_unchanged(&self) -> bool {
        matches!(self, Self::Unchanged)
    }

    pub fn is_set(&self) -> bool {
        matches!(self, Self::Set(_))
    }

    pub fn as_set(&self) -> Option<&T> {
        match self {
            Self::Set(value) => Some(value),
            Self::Unchanged => None,
        }
    }
}

// Unchanged fields are skipped on the struct, so a present key is always a `Set`
impl<T: Serialize> Serialize for Change<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Set(value) => value.serialize(serializer),
            Self::Unchanged => serializer.serialize_none(),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Change<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        T::deserialize(deserializer).map(Self::Set)
    }
}

macro_rules! diffable_fields {
    ($($variant:ident => $field:ident : $ty:ty),+ $(,)?) => {
        /// Attributes of [`Module`] that take part in change requests
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum ModuleField {
            $($variant,)+
        }

        impl ModuleField {
            /// Every diffable field, in evaluation order
            pub const ALL: &'static [ModuleField] = &[$(ModuleField::$variant,)+];

            /// Property name in the JSON snapshot
            pub fn name(self) -> &'static str {
                match self {
                    $(ModuleField::$variant => stringify!($field),)+
                }
            }

            fn differs(self, old: &Module, new: &Module) -> bool {
                match self {
                    $(ModuleField::$variant => old.$field != new.$field,)+
                }
            }

            fn record(self, new: &Module, diff: &mut ModuleDiff) {
                match self {
                    $(ModuleField::$variant => diff.$field = Change::Set(new.$field.clone()),)+
                }
            }

            fn apply(self, diff: &ModuleDiff, target: &mut Module) -> bool {
                match self {
                    $(ModuleField::$variant => match &diff.$field {
                        Change::Set(value) => {
                            target.$field = value.clone();
                            true
                        }
                        Change::Unchanged => false,
                    },)+
                }
            }

            fn is_set(self, diff: &ModuleDiff) -> bool {
                match self {
                    $(ModuleField::$variant => diff.$field.is_set(),)+
                }
            }
        }

        /// The changes a modification request proposes for one module
        #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
        pub struct ModuleDiff {
            /// Id of the module the diff was computed against
            pub id: Option<i64>,
            $(
                #[serde(default, skip_serializing_if = "Change::is_unchanged")]
                pub $field: Change<$ty>,
            )+
        }
    };
}

diffable_fields! {
    TitleDe => title_de: String,
    TitleEn => title_en: String,
    Responsible => responsible: BTreeSet<String>,
    TotalCreditPoints => total_credit_points: String,
    DegreeProgram => degree_program: String,
    Category => category: Option<ModuleCategory>,
    Visible => visible: bool,
    CreatedAt => created_at: Option<NaiveDateTime>,
}

impl ModuleDiff {
    /// Records every field in which `new` differs from `old`.
    /// Returns `None` when the two modules agree on all diffable fields.
    pub fn between(old: &Module, new: &Module) -> Option<Self> {
        let mut diff = ModuleDiff {
            id: old.id,
            ..Default::default()
        };

        let mut found = false;
        for field in ModuleField::ALL {
            if field.differs(old, new) {
                field.record(new, &mut diff);
                found = true;
            }
        }

        found.then_some(diff)
    }

    /// Overwrites the fields of `target` that this diff sets.
    /// Returns the number of fields written.
    pub fn apply_to(&self, target: &mut Module) -> usize {
        ModuleField::ALL
            .iter()
            .filter(|field| field.apply(self, target))
            .count()
    }

    pub fn changed_fields(&self) -> Vec<ModuleField> {
        ModuleField::ALL
            .iter()
            .copied()
            .filter(|field| field.is_set(self))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.changed_fields().is_empty()
    }

    pub fn to_json(&self) -> CatalogResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> CatalogResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Computes the diff between two module snapshots.
///
/// Both snapshots must be present; `Ok(None)` means nothing changed.
pub fn compute_diff(old: Option<&Module>, new: Option<&Module>) -> CatalogResult<Option<ModuleDiff>> {
    match (old, new) {
        (Some(old), Some(new)) => Ok(ModuleDiff::between(old, new)),
        _ => Err(CatalogError::InvalidArgument(
            "both module snapshots are required to compute a diff".to_string(),
        )),
    }
}

/// Applies `diff` onto `target`, returning the number of fields written
pub fn apply_diff(target: Option<&mut Module>, diff: Option<&ModuleDiff>) -> CatalogResult<usize> {
    match (target, diff) {
        (Some(target), Some(diff)) => Ok(diff.apply_to(target)),
        _ => Err(CatalogError::InvalidArgument(
            "a target module and a diff are required".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::test_support::module;
    use chrono::NaiveDate;

    fn timestamp(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2020, 4, day)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_identical_modules_have_no_diff() {
        let a = module();
        assert!(compute_diff(Some(&a), Some(&a.clone())).unwrap().is_none());
    }

    #[test]
    fn test_title_change_scenario() {
        let old = module();
        let mut new = old.clone();
        new.title_de = "Algorithmen II".to_string();

        let diff = compute_diff(Some(&old), Some(&new)).unwrap().unwrap();
        assert_eq!(diff.id, Some(42));
        assert_eq!(diff.title_de, Change::Set("Algorithmen II".to_string()));
        assert_eq!(diff.changed_fields(), vec![ModuleField::TitleDe]);

        let mut target = old.clone();
        assert_eq!(diff.apply_to(&mut target), 1);
        assert_eq!(target.title_de, "Algorithmen II");

        target.title_de = old.title_de.clone();
        assert_eq!(target, old);
    }

    #[test]
    fn test_each_field_is_detected_alone() {
        let old = module();
        let variants: Vec<(ModuleField, Box<dyn Fn(&mut Module)>)> = vec![
            (ModuleField::TitleDe, Box::new(|m: &mut Module| m.title_de = "Neu".into())),
            (ModuleField::TitleEn, Box::new(|m: &mut Module| m.title_en = "New".into())),
            (
                ModuleField::Responsible,
                Box::new(|m: &mut Module| {
                    m.responsible.insert("Dr. Weber".into());
                }),
            ),
            (
                ModuleField::TotalCreditPoints,
                Box::new(|m: &mut Module| m.total_credit_points = "15".into()),
            ),
            (
                ModuleField::DegreeProgram,
                Box::new(|m: &mut Module| m.degree_program = "Master-Studiengang Informatik".into()),
            ),
            (
                ModuleField::Category,
                Box::new(|m: &mut Module| m.category = Some(ModuleCategory::Seminar)),
            ),
            (ModuleField::Visible, Box::new(|m: &mut Module| m.visible = false)),
            (
                ModuleField::CreatedAt,
                Box::new(|m: &mut Module| m.created_at = Some(timestamp(1))),
            ),
        ];
        assert_eq!(variants.len(), ModuleField::ALL.len());

        for (field, mutate) in variants {
            let mut new = old.clone();
            mutate(&mut new);

            let diff = ModuleDiff::between(&old, &new).unwrap();
            assert_eq!(diff.changed_fields(), vec![field], "field {}", field.name());
            assert_eq!(diff.id, old.id);

            let mut target = old.clone();
            diff.apply_to(&mut target);
            assert_eq!(target, new, "field {}", field.name());
        }
    }

    #[test]
    fn test_modified_timestamp_and_courses_are_ignored() {
        let old = module();
        let mut new = old.clone();
        new.modified_at = Some(timestamp(2));
        new.courses.pop();
        new.id = Some(7);

        assert!(ModuleDiff::between(&old, &new).is_none());
    }

    #[test]
    fn test_diff_keeps_old_id() {
        let mut old = module();
        old.id = None;
        let mut new = module();
        new.title_en = "Algorithms II".to_string();

        let diff = ModuleDiff::between(&old, &new).unwrap();
        assert_eq!(diff.id, None);
    }

    #[test]
    fn test_clearing_a_field_is_a_change() {
        let old = module();
        let mut new = old.clone();
        new.category = None;
        new.title_en = String::new();

        let diff = ModuleDiff::between(&old, &new).unwrap();
        assert_eq!(diff.category, Change::Set(None));
        assert_eq!(diff.title_en, Change::Set(String::new()));

        let mut target = old.clone();
        diff.apply_to(&mut target);
        assert_eq!(target.category, None);
        assert!(target.title_en.is_empty());
    }

    #[test]
    fn test_apply_is_idempotent() {
        let old = module();
        let mut new = old.clone();
        new.title_de = "Algorithmen II".to_string();
        new.visible = false;
        new.responsible.insert("Dr. Weber".to_string());
        let diff = ModuleDiff::between(&old, &new).unwrap();

        let mut once = old.clone();
        diff.apply_to(&mut once);
        let mut twice = once.clone();
        diff.apply_to(&mut twice);

        assert_eq!(once, twice);
    }

    #[test]
    fn test_missing_snapshots_are_rejected() {
        let a = module();
        assert!(matches!(
            compute_diff(None, Some(&a)),
            Err(CatalogError::InvalidArgument(_))
        ));
        assert!(matches!(
            compute_diff(Some(&a), None),
            Err(CatalogError::InvalidArgument(_))
        ));

        let mut target = module();
        let err = apply_diff(Some(&mut target), None).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidArgument(_)));
        assert_eq!(target, module());
    }

    #[test]
    fn test_json_omits_unchanged_fields() {
        let old = module();
        let mut new = old.clone();
        new.title_de = "Algorithmen II".to_string();
        new.category = None;
        let diff = ModuleDiff::between(&old, &new).unwrap();

        let value: serde_json::Value = serde_json::from_str(&diff.to_json().unwrap()).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), 3);
        assert_eq!(object["id"], 42);
        assert_eq!(object["title_de"], "Algorithmen II");
        assert!(object["category"].is_null());

        let decoded = ModuleDiff::from_json(&diff.to_json().unwrap()).unwrap();
        assert_eq!(decoded, diff);
    }

    #[test]
    fn test_corrupt_json_is_a_serialization_error() {
        let err = ModuleDiff::from_json("{\"title_de\": 5").unwrap_err();
        assert!(matches!(err, CatalogError::Serialization(_)));
    }
}
