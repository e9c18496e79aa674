//! HTML document extraction.
//!
//! Walks the published page and assembles the Week/Day/Session tree. The
//! page is server-rendered and only loosely structured: week headings are
//! plain `h4` elements, and each day lives in a `div.block-index` sibling
//! between one heading and the next. Extraction is tolerant per item - a
//! malformed day or session is skipped with a warning - and only a document
//! with zero week headings fails outright.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::{info, warn};

use super::error::ExtractError;
use super::fields::parse_session_line;
use super::types::{Day, Schedule, Week};

// Selectors compiled once.
static HEADING_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h4").unwrap());
static DAY_HEADER_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h2").unwrap());
static SESSION_LIST_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.list-group").unwrap());
static SESSION_ITEM_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.list-group-item").unwrap());
static TITLE_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("strong").unwrap());

static WEEK_HEADING_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Неделя\s+(\d+)").unwrap());
static WHITESPACE_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Structural marker class on day containers.
const DAY_BLOCK_CLASS: &str = "block-index";
/// Marker class for non-recurring sessions.
const ONE_OFF_CLASS: &str = "once";
/// Marker class for exams and pass tests.
const EXAM_CLASS: &str = "once-exam";

/// Extracts schedule trees from raw markup.
pub struct Extractor {
    week_heading: Regex,
}

impl Extractor {
    /// Creates an extractor with the stock week-heading pattern.
    pub fn new() -> Self {
        Self {
            week_heading: WEEK_HEADING_REGEX.clone(),
        }
    }

    /// Creates an extractor with a custom heading pattern.
    ///
    /// The pattern must expose the week number as capture group 1.
    pub fn with_heading_pattern(week_heading: Regex) -> Self {
        Self { week_heading }
    }

    /// Parses raw markup into a schedule for `group`.
    ///
    /// Fails only when the document contains no week headings at all.
    pub fn extract(&self, group: &str, html: &str) -> Result<Schedule, ExtractError> {
        let document = Html::parse_document(html);

        let headings: Vec<ElementRef> = document
            .select(&HEADING_SELECTOR)
            .filter(|h| self.week_heading.is_match(&element_text(*h)))
            .collect();

        if headings.is_empty() {
            warn!(group, "no week headings found");
            return Err(ExtractError::NoWeeksFound);
        }

        info!(group, weeks = headings.len(), "found week headings");

        let mut schedule = Schedule::new(group);
        for (i, heading) in headings.iter().enumerate() {
            let heading_text = element_text(*heading);
            let number = self
                .week_heading
                .captures(&heading_text)
                .and_then(|caps| caps.get(1))
                .and_then(|m| m.as_str().parse::<u32>().ok());
            let Some(number) = number else {
                warn!(
                    error = %ExtractError::MalformedHeading {
                        text: heading_text.clone()
                    },
                    "skipping week heading"
                );
                continue;
            };

            let next_heading_id = headings.get(i + 1).map(|h| h.id());
            let mut week = Week::new(number);

            // Day blocks are siblings between this heading and the next one
            // (or the end of the document for the last week).
            for sibling in heading.next_siblings() {
                if Some(sibling.id()) == next_heading_id {
                    break;
                }
                let Some(element) = ElementRef::wrap(sibling) else {
                    continue;
                };
                if element.value().name() == "div"
                    && element.value().classes().any(|c| c == DAY_BLOCK_CLASS)
                {
                    if let Some(day) = extract_day(element) {
                        week.days.push(day);
                    }
                }
            }

            info!(group, week = number, days = week.days.len(), "extracted week");
            schedule.weeks.push(week);
        }

        Ok(schedule)
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Extracts one day block, or skips it when the header is unusable.
fn extract_day(block: ElementRef) -> Option<Day> {
    let Some(header) = block.select(&DAY_HEADER_SELECTOR).next() else {
        warn!("day block has no header, skipping");
        return None;
    };

    let header_text = element_text(header);
    let mut tokens = header_text.split_whitespace();
    let (Some(date), Some(weekday)) = (tokens.next(), tokens.next()) else {
        warn!(header = %header_text, "malformed day header, skipping");
        return None;
    };

    let mut day = Day::new(date, weekday);

    // A day without a session list is a valid empty day.
    let Some(list) = block.select(&SESSION_LIST_SELECTOR).next() else {
        return Some(day);
    };

    for item in list.select(&SESSION_ITEM_SELECTOR) {
        let is_one_off = item.value().classes().any(|c| c == ONE_OFF_CLASS);
        let is_exam = item.value().classes().any(|c| c == EXAM_CLASS);

        let text = WHITESPACE_REGEX
            .replace_all(&element_text(item), " ")
            .trim()
            .to_string();
        let title = item
            .select(&TITLE_SELECTOR)
            .next()
            .map(|t| element_text(t));

        day.sessions.push(parse_session_line(
            &text,
            title.as_deref(),
            is_exam,
            is_one_off,
        ));
    }

    Some(day)
}

fn element_text(element: ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}
