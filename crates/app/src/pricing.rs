use std::fs;
use std::io::BufReader;
use std::path::Path;

use crate::error::{AppError, Result};
use uptime_core::PricingTable;

/// Loads the pricing override at `path`, falling back to the built-in table
/// when the file is missing or unreadable.
pub fn load_pricing_table(path: &Path) -> PricingTable {
    if !path.exists() {
        return PricingTable::builtin();
    }
    match read_pricing_table(path) {
        Ok(table) => {
            tracing::debug!(?path, version = %table.version, "loaded pricing override");
            table
        }
        Err(err) => {
            tracing::warn!(?path, error = %err, "failed to read pricing override, using built-in rates");
            PricingTable::builtin()
        }
    }
}

fn read_pricing_table(path: &Path) -> Result<PricingTable> {
    let file = fs::File::open(path)?;
    let reader = BufReader::new(file);
    serde_json::from_reader(reader).map_err(AppError::from)
}
