//! Schedule acquisition and query pipeline.
//!
//! Flow: [`ScheduleService`] asks the [`ScheduleCache`]; on miss or expiry
//! the cache runs the [`ScheduleFetcher`] → [`Extractor`] chain and keeps
//! the result, falling back to a stale entry when a refresh fails. Rendering
//! goes through the [`Formatter`].

mod cache;
mod error;
mod extract;
mod fetcher;
mod fields;
mod format;
mod query;
mod types;

pub use cache::{ScheduleCache, DEFAULT_TTL};
pub use error::{ExtractError, FetchError, ScheduleError};
pub use extract::Extractor;
pub use fetcher::{FetcherConfig, ScheduleFetcher};
pub use format::Formatter;
pub use query::ScheduleService;
pub use types::{parse_flex_date, Day, Schedule, Session, Week};
