use serde::Deserialize;
use uptime_app::UptimeParams;

#[derive(Debug, Deserialize, Default)]
pub struct EmptyRequest {}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct UptimeRequest {
    pub window: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub granularity: Option<String>,
}

impl From<UptimeRequest> for UptimeParams {
    fn from(req: UptimeRequest) -> Self {
        Self {
            window: req.window,
            start: req.start,
            end: req.end,
            granularity: req.granularity,
        }
    }
}
