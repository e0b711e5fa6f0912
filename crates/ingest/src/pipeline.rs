use std::path::PathBuf;
use std::time::Instant;

use rayon::prelude::*;

use crate::extract::extract_file;
use crate::paths::discover_all;
use crate::types::ScanOutput;

/// Discovers and extracts every session log under `roots`. Files are parsed
/// in parallel and folded back in discovery order.
pub fn scan_roots(roots: &[PathBuf]) -> ScanOutput {
    let started = Instant::now();
    let files = discover_all(roots);
    let extracts = files
        .par_iter()
        .map(|path| extract_file(path))
        .collect::<Vec<_>>();

    let mut output = ScanOutput::default();
    for extract in extracts {
        output.absorb(extract);
    }
    tracing::debug!(
        roots = roots.len(),
        files = output.files_scanned,
        intervals = output.intervals.len(),
        token_events = output.token_events.len(),
        bad_lines = output.bad_lines,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "scanned session roots"
    );
    output
}
