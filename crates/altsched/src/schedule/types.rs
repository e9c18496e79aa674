//! Value types for the parsed timetable tree.
//!
//! The tree is assembled bottom-up (Session → Day → Week → Schedule) and
//! never mutated after the extractor hands it out.

use chrono::{DateTime, NaiveDate, Utc};

/// One scheduled class, exam, or one-off occurrence.
///
/// Every field except the flags is optional in the source markup; an empty
/// string means "absent", which is distinct from a parse failure (the field
/// parser never fails, see [`crate::schedule::fields`]).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    /// Raw time range, `HH:MM-HH:MM` when present.
    pub time_range: String,
    /// Full subject name as published; abbreviation happens at render time.
    pub subject_name: String,
    /// Parenthesized session kind, parentheses included, e.g. `(Лекция)`.
    pub session_type: String,
    /// Room designation, digits plus a letter suffix.
    pub room: String,
    /// Instructor in `Фамилия И. О.` form.
    pub instructor: String,
    /// Leftover text that matched none of the patterns.
    pub note: String,
    /// Marked with the exam/pass class in the source.
    pub is_exam: bool,
    /// Marked as a non-recurring session.
    pub is_one_off: bool,
}

/// One calendar day within a week block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Day {
    /// Date as published, `DD.MM.YY` or occasionally `DD.MM.YYYY`.
    pub date: String,
    /// Weekday label in the source language.
    pub weekday: String,
    /// Sessions in document order, which is chronological within the day.
    pub sessions: Vec<Session>,
}

impl Day {
    pub fn new(date: impl Into<String>, weekday: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            weekday: weekday.into(),
            sessions: Vec::new(),
        }
    }

    /// Calendar date of this day, if the published string is parseable.
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        parse_flex_date(&self.date)
    }
}

/// A numbered week of the timetable.
///
/// Days keep document order; it is not guaranteed chronological, so query
/// code sorts by date where ordering matters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Week {
    pub number: u32,
    pub days: Vec<Day>,
}

impl Week {
    pub fn new(number: u32) -> Self {
        Self {
            number,
            days: Vec::new(),
        }
    }
}

/// A full parsed timetable for one study group.
#[derive(Debug, Clone)]
pub struct Schedule {
    pub group: String,
    /// Weeks in heading-encounter order. Numbers are unique but not
    /// necessarily contiguous or sorted.
    pub weeks: Vec<Week>,
    /// When this tree was parsed; drives cache freshness.
    pub created_at: DateTime<Utc>,
}

impl Schedule {
    pub fn new(group: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            weeks: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Finds a week by its published number.
    pub fn week(&self, number: u32) -> Option<&Week> {
        self.weeks.iter().find(|w| w.number == number)
    }

    /// First day anywhere in the schedule matching the given calendar date.
    pub fn day_on(&self, target: NaiveDate) -> Option<&Day> {
        self.weeks
            .iter()
            .flat_map(|w| w.days.iter())
            .find(|d| d.parsed_date() == Some(target))
    }
}

/// Parses a published date string, trying the short year form first.
///
/// The source is inconsistent between `DD.MM.YY` and `DD.MM.YYYY`; both must
/// compare equal for the same calendar date.
pub fn parse_flex_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%d.%m.%y")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%d.%m.%Y"))
        .ok()
}
