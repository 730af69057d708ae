use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(
    name = "doku",
    version,
    about = "A terminal dashboard for Docker disk usage."
)]
pub struct CliArgs {
    /// Base URL of the disk usage API (for example: http://localhost:9090/api)
    #[arg(long)]
    pub api_url: Option<String>,

    /// Serve the bundled sample data instead of calling the API
    #[arg(long)]
    pub mock: bool,

    /// Fall back to the sample data when an API request fails
    #[arg(long)]
    pub fallback_to_mock: bool,

    /// Simulated latency for sample data, in milliseconds
    #[arg(long, default_value_t = 0)]
    pub mock_latency_ms: u64,

    /// Read settings from this file instead of searching for doku.yaml
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Page to open at startup (for example: containers, img, cache)
    #[arg(short, long)]
    pub page: Option<String>,

    /// tracing filter (for example: info,debug,trace)
    #[arg(long, default_value = "info")]
    pub log_filter: String,

    /// Append log output to this file; logs are discarded otherwise
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}
