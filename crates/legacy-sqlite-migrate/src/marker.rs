//! Marker file recording that a migration attempt occurred.
//!
//! The marker is the only persisted record of an attempt: present means an
//! attempt was made (successful or not), absent means none has occurred.
//! This engine never deletes it.

use crate::error::Result;
use chrono::Utc;
use std::path::Path;

/// True if the marker file exists.
pub fn exists(path: &Path) -> bool {
    path.exists()
}

/// Create the marker file, stamping the attempt time.
pub fn write(path: &Path) -> Result<()> {
    std::fs::write(path, format!("{}\n", Utc::now().to_rfc3339()))?;
    Ok(())
}
