use serde::{Deserialize, Serialize};

/// Raw uptime request parameters as they arrive from a query string or CLI.
/// Empty strings are treated the same as missing values.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct UptimeParams {
    pub window: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub granularity: Option<String>,
}
