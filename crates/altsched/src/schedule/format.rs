//! Display rendering for the schedule tree.
//!
//! Output targets a chat surface with `*bold*` markup, so lines are kept
//! compact: abbreviated subject names, no instructor, subgroup labels
//! shortened to a single letter. Exams get a 📝 prefix, one-off sessions ⚠️.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use super::types::{Day, Schedule, Session, Week};

static WHITESPACE_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Subgroup labels collapsed to their letter in compact lines.
const SUBGROUP_LABELS: [(&str, &str); 4] = [
    ("подгруппа А", "А"),
    ("подгруппа Б", "Б"),
    ("подгруппа В", "В"),
    ("подгруппа Г", "Г"),
];

/// Renders schedule entities to display text.
pub struct Formatter {
    abbreviations: HashMap<String, String>,
}

impl Formatter {
    /// Creates a formatter with the given subject abbreviation table.
    pub fn new(abbreviations: HashMap<String, String>) -> Self {
        Self { abbreviations }
    }

    /// Short display name for a subject; unknown subjects pass through.
    pub fn short_subject_name<'a>(&'a self, name: &'a str) -> &'a str {
        self.abbreviations
            .get(name)
            .map(String::as_str)
            .unwrap_or(name)
    }

    /// One compact line for a session.
    pub fn session_line(&self, session: &Session) -> String {
        let short_name = self.short_subject_name(&session.subject_name);
        let room = if session.room.is_empty() {
            String::new()
        } else {
            format!("- {}", session.room)
        };

        let mut line = format!(
            "*{}* - *{}* {} {}",
            session.time_range, short_name, session.session_type, room
        );

        for (label, letter) in SUBGROUP_LABELS {
            line = line.replace(label, letter);
        }
        line = WHITESPACE_REGEX.replace_all(&line, " ").trim().to_string();
        line = line.replace("- -", "-");

        if session.is_exam {
            format!("📝 {line}")
        } else if session.is_one_off {
            format!("⚠️ {line}")
        } else {
            line
        }
    }

    /// Separator-style header used above a day in query output.
    pub fn day_header(&self, day: &Day) -> String {
        format!("----- *{} {}* -----", day.date, day.weekday)
    }

    /// A day with its sessions, `Занятий нет` when empty.
    pub fn day_block(&self, day: &Day) -> String {
        let mut out = format!("*{} {}*\n", day.date, day.weekday);
        if day.sessions.is_empty() {
            out.push_str("Занятий нет");
            return out;
        }
        for session in &day.sessions {
            out.push_str(&self.session_line(session));
            out.push('\n');
        }
        out
    }

    /// A full week, days in stored order.
    pub fn week_block(&self, week: &Week) -> String {
        let mut out = format!("*Неделя {}*\n\n", week.number);
        for day in &week.days {
            out.push_str(&self.day_block(day));
            out.push('\n');
        }
        out
    }

    /// The whole schedule tree.
    pub fn schedule_block(&self, schedule: &Schedule) -> String {
        let mut out = format!("*Расписание группы {}*\n\n", schedule.group);
        for week in &schedule.weeks {
            out.push_str(&self.week_block(week));
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_abbreviations;

    fn formatter() -> Formatter {
        Formatter::new(default_abbreviations())
    }

    fn session(time: &str, name: &str, kind: &str, room: &str) -> Session {
        Session {
            time_range: time.to_string(),
            subject_name: name.to_string(),
            session_type: kind.to_string(),
            room: room.to_string(),
            ..Session::default()
        }
    }

    #[test]
    fn test_abbreviated_subject() {
        let line = formatter().session_line(&session(
            "08:15-09:50",
            "Математический анализ",
            "(Лекция)",
            "404 ГК",
        ));
        assert_eq!(line, "*08:15-09:50* - *Матан* (Лекция) - 404 ГК");
    }

    #[test]
    fn test_unknown_subject_passes_through() {
        let line = formatter().session_line(&session("08:15-09:50", "Квантовая химия", "", ""));
        assert!(line.contains("*Квантовая химия*"));
    }

    #[test]
    fn test_subgroup_label_collapsed() {
        let line = formatter().session_line(&session(
            "10:00-11:35",
            "Иностранный язык",
            "(подгруппа А)",
            "203 ГК",
        ));
        assert!(line.contains("(А)"));
        assert!(!line.contains("подгруппа"));
    }

    #[test]
    fn test_missing_room_collapses_dashes() {
        let line = formatter().session_line(&session("08:15-09:50", "История России", "", ""));
        assert!(!line.contains("- -"));
        assert!(line.ends_with("*История*"));
    }

    #[test]
    fn test_exam_marker_wins_over_one_off() {
        let mut s = session("09:00-10:30", "История России", "(Экзамен)", "311 ГК");
        s.is_exam = true;
        s.is_one_off = true;
        let line = formatter().session_line(&s);
        assert!(line.starts_with("📝 "));
    }

    #[test]
    fn test_one_off_marker() {
        let mut s = session("09:00-10:30", "Физика", "", "");
        s.is_one_off = true;
        assert!(formatter().session_line(&s).starts_with("⚠️ "));
    }

    #[test]
    fn test_empty_day_block() {
        let day = Day::new("01.09.25", "Понедельник");
        let block = formatter().day_block(&day);
        assert!(block.contains("Занятий нет"));
    }
}
