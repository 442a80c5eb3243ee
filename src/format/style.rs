//! Style configuration persistence.

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::FormatError;

/// Flag introducing the style file on the formatter command line.
pub const STYLE_FLAG: &str = "-s";

/// Write `content` verbatim to `path`, replacing any previous file atomically.
pub fn write_style_file(path: &Path, content: &str) -> Result<(), FormatError> {
    let write_failed = |source| FormatError::StyleWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent).map_err(write_failed)?;

    let mut tmp = NamedTempFile::new_in(parent).map_err(write_failed)?;
    tmp.write_all(content.as_bytes()).map_err(write_failed)?;
    tmp.persist(path).map_err(|e| write_failed(e.error))?;

    Ok(())
}

/// Argument prefix passing the style file to every invocation.
pub fn style_args(path: &Path) -> Vec<String> {
    vec![STYLE_FLAG.to_string(), path.to_string_lossy().to_string()]
}
