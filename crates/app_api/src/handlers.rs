use uptime_app::Result;
use uptime_core::UsageReport;

use crate::{AppContext, EmptyRequest, SourcesResponse, UptimeRequest, expand_home_path};

/// Report over the configured session roots.
pub fn uptime(ctx: &AppContext, req: UptimeRequest) -> Result<UsageReport> {
    ctx.app_state.services.uptime.compute(&req.into())
}

/// Report over caller-supplied roots. `~` is expanded against `HOME`.
pub fn uptime_for_roots(
    ctx: &AppContext,
    roots: &[String],
    req: UptimeRequest,
) -> Result<UsageReport> {
    let roots = roots
        .iter()
        .map(|root| expand_home_path(root))
        .collect::<Vec<_>>();
    ctx.app_state
        .services
        .uptime
        .compute_for_roots(&roots, &req.into())
}

pub fn sources(ctx: &AppContext, _req: EmptyRequest) -> Result<SourcesResponse> {
    Ok(ctx.app_state.services.sources.list().into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;
    use uptime_app::{AppConfig, AppError, AppState};

    fn context(dir: &std::path::Path) -> AppContext {
        AppContext::new(AppState::new(AppConfig::new(
            dir.join("sessions"),
            true,
            dir.join("data"),
        )))
    }

    #[test]
    fn uptime_for_roots_uses_given_roots() {
        let dir = tempdir().expect("temp dir");
        let root = dir.path().join("elsewhere");
        fs::create_dir_all(&root).expect("root");
        fs::write(
            root.join("a.jsonl"),
            concat!(
                r#"{"timestamp":"2025-03-01T08:00:00Z","type":"event_msg","payload":{"type":"user_message"}}"#,
                "\n",
                r#"{"timestamp":"2025-03-01T09:00:00Z","type":"event_msg","payload":{"type":"agent_message"}}"#,
            ),
        )
        .expect("write");

        let ctx = context(dir.path());
        let req = UptimeRequest {
            start: Some("2025-03-01T00:00:00Z".to_string()),
            end: Some("2025-03-02T00:00:00Z".to_string()),
            ..UptimeRequest::default()
        };
        let report = uptime_for_roots(&ctx, &[root.to_string_lossy().to_string()], req)
            .expect("report");
        assert_eq!(report.active_seconds_any_instance, 3600.0);

        let err = uptime(&ctx, UptimeRequest::default()).expect_err("no local sessions");
        assert!(matches!(err, AppError::NoSessionRoots));
    }

    #[test]
    fn sources_hide_passwords() {
        let dir = tempdir().expect("temp dir");
        fs::create_dir_all(dir.path().join("data")).expect("data");
        fs::write(
            dir.path().join("data/sources.json"),
            r#"{"sources":[{"id":"x1","label":"laptop","host":"10.0.0.2","user":"me","port":22,"path":"~/.codex/sessions","password":"hunter2","last_sync":null,"last_error":null}]}"#,
        )
        .expect("registry");

        let response = sources(&context(dir.path()), EmptyRequest::default()).expect("sources");
        assert_eq!(response.sources.len(), 1);
        assert_eq!(response.sources[0].label, "laptop");
        let json = serde_json::to_string(&response).expect("serialize");
        assert!(!json.contains("hunter2"));
    }
}
