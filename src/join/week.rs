use chrono::{Datelike, Local, NaiveDate};

use super::derive::leading_int;
use crate::error::JoinError;

/// The week whose column is read from the week-labelled reference sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WeekSelector(u32);

impl WeekSelector {
    pub const FIRST: u32 = 1;
    pub const LAST: u32 = 52;

    pub fn new(week: u32) -> Result<Self, JoinError> {
        if (Self::FIRST..=Self::LAST).contains(&week) {
            Ok(Self(week))
        } else {
            Err(JoinError::InvalidWeek(week))
        }
    }

    /// Simple day-of-year week: days 1..=7 are week 1, and so on. The last
    /// day or two of the year fold into week 52.
    pub fn from_day_of_year(day: u32) -> Self {
        Self(((day + 6) / 7).clamp(Self::FIRST, Self::LAST))
    }

    pub fn for_date(date: NaiveDate) -> Self {
        Self::from_day_of_year(date.ordinal())
    }

    pub fn current() -> Self {
        Self::for_date(Local::now().date_naive())
    }

    pub fn number(self) -> u32 {
        self.0
    }

    /// Reads a header label as a week number: leading integer in 1..=52.
    pub fn parse_label(label: &str) -> Option<u32> {
        leading_int(label)
            .and_then(|n| u32::try_from(n).ok())
            .filter(|n| (Self::FIRST..=Self::LAST).contains(n))
    }
}

impl std::fmt::Display for WeekSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_of_year_buckets() {
        assert_eq!(WeekSelector::from_day_of_year(1).number(), 1);
        assert_eq!(WeekSelector::from_day_of_year(7).number(), 1);
        assert_eq!(WeekSelector::from_day_of_year(8).number(), 2);
        assert_eq!(WeekSelector::from_day_of_year(364).number(), 52);
        assert_eq!(WeekSelector::from_day_of_year(366).number(), 52);
    }

    #[test]
    fn for_date_uses_ordinal() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 20).unwrap();
        // 2025-03-20 is day 79
        assert_eq!(WeekSelector::for_date(date).number(), 12);
    }

    #[test]
    fn rejects_out_of_range() {
        assert!(WeekSelector::new(0).is_err());
        assert!(WeekSelector::new(53).is_err());
        assert_eq!(WeekSelector::new(52).unwrap().number(), 52);
    }

    #[test]
    fn labels() {
        assert_eq!(WeekSelector::parse_label("12"), Some(12));
        assert_eq!(WeekSelector::parse_label(" 7"), Some(7));
        assert_eq!(WeekSelector::parse_label("0"), None);
        assert_eq!(WeekSelector::parse_label("53"), None);
        assert_eq!(WeekSelector::parse_label("2024"), None);
        assert_eq!(WeekSelector::parse_label("REF"), None);
    }
}
