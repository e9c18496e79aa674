//! Fetches, parses, caches, and serves AltSTU study-group timetables.
//!
//! The published schedule is a server-rendered HTML page; this crate turns
//! it into a Week/Day/Session tree and answers today/tomorrow/week queries
//! against it through a TTL cache with stale-on-error fallback.

pub mod config;
pub mod schedule;
pub mod store;
