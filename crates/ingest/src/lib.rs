mod extract;
mod parser;
mod paths;
mod pipeline;
mod types;

pub use extract::{extract_file, extract_from_reader};
pub use paths::{LEGACY_DIR_NAME, default_sessions_dir, discover_all, discover_log_files};
pub use pipeline::scan_roots;
pub use types::{FileExtract, ScanOutput};
