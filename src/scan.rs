//! Discovers the markup documents under a content directory.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// The extension (without the leading `.`) of markup source documents.
pub const MARKUP_EXTENSION: &str = "adoc";

/// Recursively searches `content_directory` for markup documents (extension =
/// `.adoc`) and returns their paths sorted lexicographically. An empty result
/// is not an error; a missing or unreadable directory is.
pub fn scan_sources(content_directory: &Path) -> Result<Vec<PathBuf>, walkdir::Error> {
    let mut sources = Vec::new();
    for result in WalkDir::new(content_directory).follow_links(true) {
        let entry = result?;
        if entry.file_type().is_file() && is_markup(entry.path()) {
            sources.push(entry.into_path());
        }
    }
    sources.sort();
    Ok(sources)
}

fn is_markup(path: &Path) -> bool {
    path.extension()
        .map_or(false, |extension| extension == MARKUP_EXTENSION)
}
