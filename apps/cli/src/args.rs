use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "codex-uptime")]
#[command(version, about = "Estimate Codex active time, tokens and cost from session logs")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Sessions directory to scan. Repeatable; defaults to the configured roots.
    #[arg(long = "root", value_name = "DIR")]
    pub roots: Vec<String>,

    #[arg(long, value_parser = ["all", "1d", "1w", "1m", "3m", "1y"], default_value = "all")]
    pub window: String,

    /// Bucket size for the timeseries (default: picked from the window span).
    #[arg(long, value_parser = ["hour", "day", "week", "month"])]
    pub granularity: Option<String>,

    /// Override start time (ISO 8601, e.g. 2026-01-15T12:00:00Z).
    #[arg(long)]
    pub start: Option<String>,

    /// Override end time (ISO 8601, e.g. 2026-02-01T12:00:00Z).
    #[arg(long)]
    pub end: Option<String>,

    #[arg(long, help = "Output as JSON")]
    pub json: bool,

    #[arg(long, global = true, help = "Enable debug logging")]
    pub debug: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Serve the uptime API over local HTTP.
    Serve(ServeArgs),
}

#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Override the configured host for this run only.
    #[arg(long)]
    pub host: Option<String>,

    /// Override the configured port for this run only.
    #[arg(long)]
    pub port: Option<u16>,
}
