//! Download directory allocation
//!
//! Titles are reduced to filesystem-safe names by deleting unsafe characters
//! outright (no replacement character), so distinct titles may collapse to
//! the same name. The allocator therefore claims a directory by creating it:
//! `fs::create_dir` either succeeds exactly once or reports `AlreadyExists`,
//! which makes allocation safe under concurrent post processing.

use std::io;
use std::path::{Path, PathBuf};

/// Characters deleted from titles before they become directory names
const UNSAFE_CHARS: &[char] = &['\\', ':', '?', '*', '"', '<', '>', '|', '/', '.'];

/// Deletes filesystem-unsafe characters from a post title
///
/// Pure deletion: `"A/B: Test?"` becomes `"AB Test"`.
pub fn sanitize_title(title: &str) -> String {
    title.chars().filter(|c| !UNSAFE_CHARS.contains(c)).collect()
}

/// Allocates and creates a fresh directory for a post under `base`
///
/// Probes `<sanitized>`, `<sanitized>-1`, `<sanitized>-2`, ... until a name
/// is free; the returned path exists as a directory on return. A title that
/// sanitizes to nothing falls back to `untitled`.
pub fn allocate_dir(base: &Path, title: &str) -> io::Result<PathBuf> {
    std::fs::create_dir_all(base)?;

    let sanitized = sanitize_title(title);
    let stem = if sanitized.is_empty() {
        "untitled"
    } else {
        sanitized.as_str()
    };

    let mut attempt: u32 = 0;
    loop {
        let name = if attempt == 0 {
            stem.to_string()
        } else {
            format!("{stem}-{attempt}")
        };
        let candidate = base.join(name);

        match std::fs::create_dir(&candidate) {
            Ok(()) => return Ok(candidate),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => attempt += 1,
            Err(e) => return Err(e),
        }
    }
}
