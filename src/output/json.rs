//! `info.json` persistence
//!
//! The record is written to a temp file in the target directory and renamed
//! into place, so a cancelled or crashed run never leaves a torn
//! `info.json` behind.

use crate::model::PostRecord;
use crate::Result;
use std::path::Path;

/// Name of the per-post metadata artifact
pub const RECORD_FILE: &str = "info.json";

/// Serializes a post record into `<dir>/info.json`, atomically
pub fn write_record(dir: &Path, record: &PostRecord) -> Result<()> {
    let data = serde_json::to_vec(record)?;

    let tmp = dir.join(format!("{RECORD_FILE}.tmp"));
    std::fs::write(&tmp, data)?;
    std::fs::rename(&tmp, dir.join(RECORD_FILE))?;

    Ok(())
}
