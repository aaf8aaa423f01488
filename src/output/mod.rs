//! Post materialization: directories, JSON artifacts, failure logging
//!
//! This module owns everything that touches the download root:
//! - collision-free per-post directory allocation
//! - atomic `info.json` persistence
//! - the append-only failure log the orchestrator reports into

mod dirs;
mod faillog;
mod json;

pub use dirs::{allocate_dir, sanitize_title};
pub use faillog::{FailureCategory, FailureSink, FileFailureLog, MemoryFailureLog};
pub use json::write_record;
