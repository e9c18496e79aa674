//! Query operations over cached schedules.
//!
//! Every public operation returns a display string; failures degrade to
//! user-facing messages and never cross this boundary as errors.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Days, Local, NaiveDate};
use tracing::{error, info, warn};

use crate::config::AppConfig;

use super::cache::ScheduleCache;
use super::error::ExtractError;
use super::extract::Extractor;
use super::fetcher::ScheduleFetcher;
use super::format::Formatter;
use super::types::{Day, Schedule};

/// Answers today/tomorrow/week queries for configured groups.
///
/// Owns the whole pipeline: cache in front, fetcher and extractor behind it.
pub struct ScheduleService {
    config: Arc<AppConfig>,
    fetcher: ScheduleFetcher,
    extractor: Extractor,
    cache: ScheduleCache,
    formatter: Formatter,
}

impl ScheduleService {
    /// Creates a service for the given configuration.
    pub fn new(config: Arc<AppConfig>) -> Result<Self, super::error::FetchError> {
        let fetcher = ScheduleFetcher::new()?;
        let cache = ScheduleCache::new(Duration::from_secs(config.cache_ttl_secs));
        let formatter = Formatter::new(config.abbreviations.clone());
        Ok(Self {
            config,
            fetcher,
            extractor: Extractor::new(),
            cache,
            formatter,
        })
    }

    /// Schedule for today's calendar date.
    pub async fn today(&self, group: &str) -> String {
        let Some(schedule) = self.load(group).await else {
            return unavailable_message(group);
        };
        let target = Local::now().date_naive();
        info!(group, %target, "looking up today's schedule");
        render_day_for_date(&self.formatter, &schedule, target, "сегодня")
    }

    /// Schedule for tomorrow's calendar date.
    pub async fn tomorrow(&self, group: &str) -> String {
        let Some(schedule) = self.load(group).await else {
            return unavailable_message(group);
        };
        let target = Local::now().date_naive() + Days::new(1);
        info!(group, %target, "looking up tomorrow's schedule");
        render_day_for_date(&self.formatter, &schedule, target, "завтра")
    }

    /// Schedule for a numbered week, truncated to the three earliest days.
    pub async fn week(&self, group: &str, number: u32) -> String {
        let Some(schedule) = self.load(group).await else {
            return unavailable_message(group);
        };
        info!(group, week = number, "looking up week schedule");
        render_week(&self.formatter, &schedule, number, Local::now().date_naive())
    }

    /// Runs the cache→fetch→extract chain for a group.
    async fn load(&self, group: &str) -> Option<Arc<Schedule>> {
        let Some(url) = self.config.group_url(group) else {
            // Unknown groups never reach the network.
            error!(
                error = %ExtractError::UnknownGroup {
                    group: group.to_string()
                },
                "group lookup failed"
            );
            return None;
        };

        self.cache
            .get_or_refresh(group, || async {
                let html = self.fetcher.fetch(group, url).await?;
                let schedule = self.extractor.extract(group, &html)?;
                Ok(schedule)
            })
            .await
    }
}

fn unavailable_message(group: &str) -> String {
    format!("Не удалось получить расписание для группы {group}")
}

/// Renders the first day matching `target`, searching weeks in stored order.
pub(crate) fn render_day_for_date(
    formatter: &Formatter,
    schedule: &Schedule,
    target: NaiveDate,
    label: &str,
) -> String {
    for week in &schedule.weeks {
        for day in &week.days {
            let Some(date) = day.parsed_date() else {
                warn!(date = %day.date, "unrecognized date format");
                continue;
            };
            if date != target {
                continue;
            }

            let mut out = format!(
                "*Расписание группы {} на {}*\n\n{}\n\n",
                schedule.group,
                label,
                formatter.day_header(day)
            );
            if day.sessions.is_empty() {
                out.push_str("Занятий нет");
                return out;
            }
            for session in &day.sessions {
                out.push_str(&formatter.session_line(session));
                out.push('\n');
            }
            return out;
        }
    }

    format!(
        "Расписание на {label} для группы {} не найдено",
        schedule.group
    )
}

/// Renders a numbered week: days sorted by date ascending, capped at three.
///
/// A day whose date parses under neither format sorts as `now`. That keeps
/// the reference behavior; a malformed date therefore lands among the most
/// recent days rather than last.
pub(crate) fn render_week(
    formatter: &Formatter,
    schedule: &Schedule,
    number: u32,
    now: NaiveDate,
) -> String {
    let Some(week) = schedule.week(number) else {
        return format!(
            "Расписание на неделю {number} для группы {} не найдено",
            schedule.group
        );
    };

    if week.days.is_empty() {
        return format!(
            "*Расписание группы {} на неделю {number}*\n\nНет данных о занятиях",
            schedule.group
        );
    }

    let mut days: Vec<&Day> = week.days.iter().collect();
    days.sort_by_key(|d| d.parsed_date().unwrap_or(now));

    // Only the first three days, to bound message length.
    let mut out = format!(
        "*Расписание группы {} на неделю {number}*\n\n",
        schedule.group
    );
    for day in days.iter().take(3) {
        out.push_str(&formatter.day_header(day));
        out.push('\n');
        if day.sessions.is_empty() {
            out.push_str("Занятий нет\n");
        } else {
            for session in &day.sessions {
                out.push_str(&formatter.session_line(session));
                out.push('\n');
            }
        }
        out.push('\n');
    }
    out
}
