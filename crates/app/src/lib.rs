pub mod app;
pub mod config;
pub mod error;
pub mod pricing;
pub mod services;
pub mod sources;
pub mod startup;
pub mod util;

pub use app::{AppConfig, AppState};
pub use config::UptimeParams;
pub use error::{ApiError, AppError, Result};
pub use pricing::load_pricing_table;
pub use services::{AppServices, UsageQuery, compute_usage};
pub use sources::{SourceRecord, SourceSummary, SourcesSnapshot, load_sources, session_roots};
pub use startup::ensure_app_data_dir;
pub use util::time::{non_empty, parse_datetime_input};
