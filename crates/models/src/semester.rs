use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};
use strum::{AsRefStr, EnumProperty, EnumString};
use thiserror::Error;

/// Largest year a four digit label can hold
const MAX_YEAR: u16 = 9999;

/// Custom error type for parsing semester labels
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseSemesterError {
    #[error("Semester must start with SoSe or WiSe")]
    UnknownTerm,
    #[error("Semester must end with a four digit year")]
    InvalidYear,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, EnumString, AsRefStr,
    EnumProperty,
)]
pub enum Term {
    #[strum(serialize = "SoSe", props(full = "Sommersemester"))]
    Summer,
    #[strum(serialize = "WiSe", props(full = "Wintersemester"))]
    Winter,
}

impl Term {
    pub fn as_full_str(&self) -> &'static str {
        self.get_str("full").unwrap_or_default()
    }
}

/// A semester such as `SoSe2020` (April to September) or `WiSe2020`
/// (October 2020 to March 2021)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Semester {
    pub year: u16,
    pub term: Term,
}

impl Semester {
    pub fn new(term: Term, year: u16) -> Self {
        Self { year, term }
    }

    /// The semester running on `date`, with the year clamped to `0..=9999`
    pub fn containing(date: NaiveDate) -> Self {
        let year = u16::try_from(date.year()).map_or(0, |year| year.min(MAX_YEAR));
        match date.month() {
            1..=3 => Self::new(Term::Winter, year.saturating_sub(1)),
            4..=9 => Self::new(Term::Summer, year),
            _ => Self::new(Term::Winter, year),
        }
    }

    pub fn next(self) -> Self {
        match self.term {
            Term::Summer => Self::new(Term::Winter, self.year),
            Term::Winter if self.year >= MAX_YEAR => self,
            Term::Winter => Self::new(Term::Summer, self.year + 1),
        }
    }

    pub fn previous(self) -> Self {
        match self.term {
            Term::Summer if self.year == 0 => self,
            Term::Summer => Self::new(Term::Winter, self.year - 1),
            Term::Winter => Self::new(Term::Summer, self.year),
        }
    }

    /// `past` semesters before the current one, the current one and `upcoming` after it
    pub fn window(date: NaiveDate, past: usize, upcoming: usize) -> Vec<Semester> {
        let current = Self::containing(date);

        let mut earlier = Vec::with_capacity(past);
        let mut cursor = current;
        for _ in 0..past {
            cursor = cursor.previous();
            earlier.push(cursor);
        }
        earlier.reverse();

        let mut result = earlier;
        let mut cursor = current;
        result.push(cursor);
        for _ in 0..upcoming {
            cursor = cursor.next();
            result.push(cursor);
        }

        result
    }

    /// Choices offered when tagging courses
    pub fn tagging_window(date: NaiveDate) -> Vec<Semester> {
        Self::window(date, 2, 3)
    }

    /// Choices offered when browsing the catalogue by semester
    pub fn search_window(date: NaiveDate) -> Vec<Semester> {
        Self::window(date, 0, 3)
    }
}

impl FromStr for Semester {
    type Err = ParseSemesterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.len() != 8 || !s.is_char_boundary(4) {
            return Err(if s.len() < 4 {
                ParseSemesterError::UnknownTerm
            } else {
                ParseSemesterError::InvalidYear
            });
        }

        let (term, year) = s.split_at(4);
        let term = Term::from_str(term).map_err(|_| ParseSemesterError::UnknownTerm)?;
        if !year.chars().all(|c| c.is_ascii_digit()) {
            return Err(ParseSemesterError::InvalidYear);
        }
        let year = year.parse().map_err(|_| ParseSemesterError::InvalidYear)?;

        Ok(Self::new(term, year))
    }
}

impl Display for Semester {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}{:04}", self.term.as_ref(), self.year)
    }
}

impl Serialize for Semester {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn test_semester_from_str() {
        assert_eq!(
            Semester::from_str("SoSe2020").unwrap(),
            Semester::new(Term::Summer, 2020)
        );
        assert_eq!(
            Semester::from_str("WiSe1995").unwrap(),
            Semester::new(Term::Winter, 1995)
        );
    }

    #[test]
    fn test_semester_from_str_errors() {
        assert_eq!(
            Semester::from_str("Herbst20").unwrap_err(),
            ParseSemesterError::UnknownTerm
        );
        assert_eq!(
            Semester::from_str("SoSe20x0").unwrap_err(),
            ParseSemesterError::InvalidYear
        );
        assert_eq!(
            Semester::from_str("SoSe20").unwrap_err(),
            ParseSemesterError::InvalidYear
        );
        assert_eq!(Semester::from_str("").unwrap_err(), ParseSemesterError::UnknownTerm);
    }

    #[test]
    fn test_semester_display_round_trip() {
        for label in ["SoSe2020", "WiSe2019"] {
            assert_eq!(Semester::from_str(label).unwrap().to_string(), label);
        }
    }

    #[test]
    fn test_semester_containing() {
        assert_eq!(Semester::containing(date(2020, 2, 1)).to_string(), "WiSe2019");
        assert_eq!(Semester::containing(date(2020, 4, 1)).to_string(), "SoSe2020");
        assert_eq!(Semester::containing(date(2020, 9, 30)).to_string(), "SoSe2020");
        assert_eq!(Semester::containing(date(2020, 10, 1)).to_string(), "WiSe2020");
    }

    #[test]
    fn test_semester_years_stay_in_label_range() {
        assert_eq!(Semester::containing(date(0, 2, 1)).to_string(), "WiSe0000");
        assert_eq!(Semester::containing(date(-40, 6, 1)).to_string(), "SoSe0000");
        assert_eq!(Semester::containing(date(12000, 6, 1)).to_string(), "SoSe9999");

        let last = Semester::new(Term::Winter, 9999);
        assert_eq!(last.next(), last);
        let first = Semester::new(Term::Summer, 0);
        assert_eq!(first.previous(), first);
        assert_eq!(Semester::from_str(&first.to_string()).unwrap(), first);
    }

    #[test]
    fn test_parse_error_is_std_error() {
        let err: Box<dyn std::error::Error> = Box::new(ParseSemesterError::InvalidYear);
        assert_eq!(err.to_string(), "Semester must end with a four digit year");
    }

    #[test]
    fn test_semester_ordering() {
        let summer = Semester::new(Term::Summer, 2020);
        assert!(summer < summer.next());
        assert!(summer.previous() < summer);
        assert_eq!(summer.next().previous(), summer);
    }

    #[test]
    fn test_tagging_window() {
        let labels: Vec<String> = Semester::tagging_window(date(2020, 5, 4))
            .into_iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(
            labels,
            ["SoSe2019", "WiSe2019", "SoSe2020", "WiSe2020", "SoSe2021", "WiSe2021"]
        );
    }

    #[test]
    fn test_search_window_starts_at_current() {
        let window = Semester::search_window(date(2020, 11, 2));
        assert_eq!(window.len(), 4);
        assert_eq!(window[0].to_string(), "WiSe2020");
    }

    #[test]
    fn test_term_full_name() {
        assert_eq!(Term::Winter.as_full_str(), "Wintersemester");
    }

    #[test]
    fn test_semester_serializes_as_label() {
        let json = serde_json::to_string(&Semester::new(Term::Summer, 2021)).unwrap();
        assert_eq!(json, "\"SoSe2021\"");
    }
}
