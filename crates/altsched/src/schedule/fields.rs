//! Free-text session line decomposition.
//!
//! One `list-group-item` flattens to a single line like
//! `08:15-09:50 Математический анализ (Лекция) 404 ГК Иванов И. И. доцент`.
//! Fields are pulled out in a fixed order, and every successful match is
//! removed from the working text before the next pattern runs, so a room
//! number can never be re-read as part of a time and vice versa. No step is
//! allowed to fail the whole line: an unmatched pattern just leaves its
//! field empty.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use super::types::Session;

// Patterns compiled once, in extraction order.
static TIME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{2}:\d{2}-\d{2}:\d{2}").unwrap());
static TYPE_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\([^)]+\)").unwrap());
static ROOM_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+\s*[А-Я]+").unwrap());
static INSTRUCTOR_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[А-Яа-я]+\s+[А-Я]\.\s*[А-Я]\.").unwrap());

/// Parses one normalized session line into structured fields.
///
/// `title` is the text of the item's explicit title node (`<strong>`) when
/// the markup provides one; without it the subject name stays empty and the
/// whole remainder lands in `note`.
pub fn parse_session_line(
    raw: &str,
    title: Option<&str>,
    is_exam: bool,
    is_one_off: bool,
) -> Session {
    let mut rest = raw.trim().to_string();
    let mut session = Session {
        is_exam,
        is_one_off,
        ..Session::default()
    };

    // 1. Leading time range, anchored so digits elsewhere never match.
    if let Some(m) = TIME_REGEX.find(&rest) {
        session.time_range = m.as_str().to_string();
        let end = m.end();
        rest = rest[end..].trim().to_string();
    }

    // 2. Subject name comes from the title node, not from pattern matching.
    if let Some(name) = title {
        let name = name.trim();
        if !name.is_empty() {
            session.subject_name = name.to_string();
            rest = rest.replacen(name, "", 1).trim().to_string();
        }
    }

    // 3. Session kind: first parenthesized group, parentheses kept.
    if let Some(m) = TYPE_REGEX.find(&rest) {
        let matched = m.as_str().to_string();
        rest = rest.replacen(&matched, "", 1).trim().to_string();
        session.session_type = matched;
    }

    // 4. Room: digits followed by an uppercase suffix.
    if let Some(m) = ROOM_REGEX.find(&rest) {
        let matched = m.as_str().to_string();
        rest = rest.replacen(&matched, "", 1).trim().to_string();
        session.room = matched;
    }

    // 5. Instructor: surname plus two period-terminated initials.
    if let Some(m) = INSTRUCTOR_REGEX.find(&rest) {
        let matched = m.as_str().to_string();
        rest = rest.replacen(&matched, "", 1).trim().to_string();
        session.instructor = matched.trim().to_string();
    }

    // 6. Whatever is left, minus decorative dashes, is the note.
    session.note = rest
        .trim_matches(|c: char| c == '-' || c.is_whitespace())
        .to_string();

    debug!(
        time = %session.time_range,
        subject = %session.subject_name,
        kind = %session.session_type,
        room = %session.room,
        "parsed session line"
    );

    session
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_line() {
        let session = parse_session_line(
            "08:15-09:50 Математический анализ (Лекция) 404 ГК Иванов И. И. доцент",
            Some("Математический анализ"),
            false,
            false,
        );
        assert_eq!(session.time_range, "08:15-09:50");
        assert_eq!(session.subject_name, "Математический анализ");
        assert_eq!(session.session_type, "(Лекция)");
        assert_eq!(session.room, "404 ГК");
        assert_eq!(session.instructor, "Иванов И. И.");
        assert_eq!(session.note, "доцент");
    }

    #[test]
    fn test_no_parenthesized_type() {
        let session = parse_session_line(
            "10:00-11:35 Физическая культура и спорт 12 СК",
            Some("Физическая культура и спорт"),
            false,
            false,
        );
        assert_eq!(session.session_type, "");
        assert_eq!(session.room, "12 СК");
    }

    #[test]
    fn test_second_parenthesized_group_stays_in_note() {
        let session = parse_session_line(
            "10:00-11:35 Иностранный язык (Практика) (подгруппа А) 203 ГК",
            Some("Иностранный язык"),
            false,
            false,
        );
        assert_eq!(session.session_type, "(Практика)");
        assert!(session.note.contains("(подгруппа А)"));
    }

    #[test]
    fn test_missing_title_leaves_everything_in_note() {
        let session = parse_session_line("какой-то непонятный текст", None, false, false);
        assert_eq!(session.time_range, "");
        assert_eq!(session.subject_name, "");
        assert_eq!(session.session_type, "");
        assert_eq!(session.room, "");
        assert_eq!(session.note, "какой-то непонятный текст");
    }

    #[test]
    fn test_note_trimmed_of_dashes() {
        let session = parse_session_line(
            "08:15-09:50 История России (Семинар) - 311 ГК -",
            Some("История России"),
            false,
            false,
        );
        assert_eq!(session.room, "311 ГК");
        assert_eq!(session.note, "");
    }

    #[test]
    fn test_room_digits_not_mistaken_for_time() {
        // No leading time: the room must still be found, and the time must
        // stay empty because the time pattern is anchored.
        let session = parse_session_line(
            "Дискретная математика и теория чисел (Лекция) 404 ГК",
            Some("Дискретная математика и теория чисел"),
            false,
            false,
        );
        assert_eq!(session.time_range, "");
        assert_eq!(session.room, "404 ГК");
    }

    #[test]
    fn test_flags_pass_through() {
        let session = parse_session_line("09:00-10:30", None, true, true);
        assert!(session.is_exam);
        assert!(session.is_one_off);
    }
}
