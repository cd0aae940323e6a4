use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Parser};
use humantime::parse_duration;
use url::Url;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Headless page showing server push notifications",
    long_about = None
)]
pub struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Page address (e.g. "http://localhost:4567/"). The notification
    /// channel is derived from its host and protocol.
    #[arg(long, value_name = "URL")]
    pub url: Option<Url>,

    /// Toast present when the page loads (repeatable).
    #[arg(long = "toast", value_name = "TEXT")]
    pub toasts: Vec<String>,

    /// Overrides the delay before toasts hide (e.g. "4s").
    #[arg(long, value_parser = parse_duration)]
    pub hide_after: Option<Duration>,

    /// Mirrors every dialog message to a desktop notification (Linux).
    #[arg(long, action = ArgAction::SetTrue)]
    pub desktop: bool,

    /// Emits JSON logs (needs `--features json-logs`).
    #[arg(long, action = ArgAction::SetTrue)]
    pub json_logs: bool,

    /// Explicit log filter (e.g. "page_notify=debug").
    #[arg(long, value_name = "FILTER")]
    pub log_filter: Option<String>,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
