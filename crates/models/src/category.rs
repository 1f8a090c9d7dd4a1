use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumIter, EnumProperty, EnumString, IntoEnumIterator};

/// Category a module is listed under in the catalogue
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    EnumIter,
    AsRefStr,
    EnumProperty,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ModuleCategory {
    #[strum(props(label = "Pflichtmodul Bachelor"))]
    BachelorMandatory,
    #[strum(props(label = "Wahlpflichtmodul Bachelor"))]
    BachelorElective,
    #[strum(props(label = "Wahlpflichtmodul Master"))]
    MasterElective,
    #[strum(props(label = "Seminar"))]
    Seminar,
    #[strum(props(label = "Praktikum"))]
    Practical,
    #[strum(props(label = "Abschlussarbeit"))]
    Thesis,
    #[strum(props(label = "Nebenfach"))]
    MinorSubject,
}

impl ModuleCategory {
    /// Stable identifier used in forms, JSON and the database
    pub fn as_str(&self) -> &str {
        self.as_ref()
    }

    /// Human-readable label shown in the catalogue
    pub fn label(&self) -> &'static str {
        self.get_str("label").unwrap_or_default()
    }

    pub fn all() -> Vec<ModuleCategory> {
        ModuleCategory::iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_category_as_str() {
        assert_eq!(ModuleCategory::BachelorMandatory.as_str(), "BACHELOR_MANDATORY");
        assert_eq!(ModuleCategory::MinorSubject.as_str(), "MINOR_SUBJECT");
    }

    #[test]
    fn test_category_label() {
        assert_eq!(ModuleCategory::Thesis.label(), "Abschlussarbeit");
        assert_eq!(ModuleCategory::MasterElective.label(), "Wahlpflichtmodul Master");
    }

    #[test]
    fn test_category_round_trip() {
        for category in ModuleCategory::all() {
            assert_eq!(ModuleCategory::from_str(category.as_str()).unwrap(), category);
        }
    }

    #[test]
    fn test_category_serde_matches_as_str() {
        let json = serde_json::to_string(&ModuleCategory::Seminar).unwrap();
        assert_eq!(json, "\"SEMINAR\"");
    }

    #[test]
    fn test_category_all() {
        assert_eq!(ModuleCategory::all().len(), 7);
    }
}
