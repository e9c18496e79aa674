//! Command-line query surface.
//!
//! The chat front-end talks to [`altsched::schedule::ScheduleService`]
//! directly; this binary is the same narrow interface for a terminal:
//!
//! ```text
//! altsched [--config <path>] <group> today
//! altsched [--config <path>] <group> tomorrow
//! altsched [--config <path>] <group> week <n>
//! ```

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};

use altsched::config::AppConfig;
use altsched::schedule::ScheduleService;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let mut args: Vec<String> = std::env::args().skip(1).collect();

    let config = if args.first().map(String::as_str) == Some("--config") {
        if args.len() < 2 {
            bail!("--config requires a path");
        }
        let path = args.remove(1);
        args.remove(0);
        AppConfig::load_from_file(Path::new(&path))
            .map_err(|e| anyhow::anyhow!("{e}"))
            .with_context(|| format!("failed to load config from {path}"))?
    } else {
        AppConfig::builtin()
    };

    let [group, command, rest @ ..] = args.as_slice() else {
        bail!(
            "usage: altsched [--config <path>] <group> <today|tomorrow|week N>\n\
             known groups: {}",
            config.group_names().join(", ")
        );
    };

    let service = ScheduleService::new(Arc::new(config))?;

    let output = match (command.as_str(), rest) {
        ("today", []) => service.today(group).await,
        ("tomorrow", []) => service.tomorrow(group).await,
        ("week", [n]) => {
            let number: u32 = n.parse().context("week number must be a positive integer")?;
            service.week(group, number).await
        }
        _ => bail!("unknown command: {command} {}", rest.join(" ")),
    };

    println!("{output}");
    Ok(())
}
