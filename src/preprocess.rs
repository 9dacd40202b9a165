//! Input normalization run before a file reaches the engine.

use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Curly apostrophe as it appears when UTF-8 text was decoded as Windows-1252.
const MOJIBAKE_APOSTROPHE: &str = "\u{e2}\u{20ac}\u{2122}";
const CURLY_APOSTROPHE: char = '\u{2019}';

pub fn replace_apostrophes_in(text: &str) -> String {
    text.replace(MOJIBAKE_APOSTROPHE, "'")
        .replace(CURLY_APOSTROPHE, "'")
}

/// Write a copy of `path` with apostrophes straightened to
/// `processed_<name>` next to it, and return the new path.
///
/// The copy is written to a temporary file and renamed into place, so a
/// task still reading an earlier copy never sees a truncated file.
pub fn replace_apostrophes(path: &Path) -> Result<PathBuf> {
    let bytes =
        fs::read(path).with_context(|| format!("Failed to read file: {}", path.display()))?;
    let content = String::from_utf8_lossy(&bytes);

    let file_name = path
        .file_name()
        .with_context(|| format!("Not a file path: {}", path.display()))?;
    let output = path.with_file_name(format!("processed_{}", file_name.to_string_lossy()));

    let dir = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut staged = NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temporary file in {}", dir.display()))?;
    staged
        .write_all(replace_apostrophes_in(&content).as_bytes())
        .with_context(|| format!("Failed to write file: {}", output.display()))?;
    staged
        .persist(&output)
        .with_context(|| format!("Failed to write file: {}", output.display()))?;

    log::debug!("preprocessed {} into {}", path.display(), output.display());
    Ok(output)
}
