use std::fmt::Write;

use uptime_core::UsageReport;

/// `1h 2m 3s`, dropping leading zero units.
pub fn format_duration(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;
    if hours > 0 {
        format!("{hours}h {minutes}m {secs}s")
    } else if minutes > 0 {
        format!("{minutes}m {secs}s")
    } else {
        format!("{secs}s")
    }
}

pub fn render_text(report: &UsageReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Window: {}", report.window);
    let _ = writeln!(out, "Start:  {}", report.window_start);
    let _ = writeln!(out, "End:    {}", report.window_end);
    let _ = writeln!(out, "Files:  {}", report.files_scanned);
    let _ = writeln!(out, "Raw intervals:    {}", report.intervals_raw);
    let _ = writeln!(out, "Merged intervals: {}", report.intervals_merged);
    let _ = writeln!(
        out,
        "Active (any):     {} ({:.3}%)",
        format_duration(report.active_seconds_any_instance),
        report.percent_any_instance
    );
    let _ = writeln!(
        out,
        "Active (summed):  {} ({:.3}%)",
        format_duration(report.active_seconds_summed),
        report.percent_summed
    );
    let _ = writeln!(out, "Tokens: {}", report.tokens_total);
    if report.cost_partial {
        let _ = writeln!(
            out,
            "Cost:   ${:.2} (partial; unpriced: {})",
            report.cost_total_usd,
            report.unknown_models.join(", ")
        );
    } else {
        let _ = writeln!(out, "Cost:   ${:.2}", report.cost_total_usd);
    }
    if report.bad_lines > 0 {
        let _ = writeln!(out, "Bad lines: {}", report.bad_lines);
    }
    out
}
