use std::path::PathBuf;

use clap::Parser;

/// Watches the backend for new orders and rings the bell.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "cff-bell", author, version, about)]
pub struct Cli {
    /// Configuration file to use instead of the per-user one.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Backend base URL, e.g. https://api.calcuttafreshfoods.com
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,

    /// How notifications are received: polling or push.
    #[arg(long, value_name = "KIND")]
    pub transport: Option<String>,
}
