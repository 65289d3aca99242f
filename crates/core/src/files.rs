//! File helpers for caption input and output.

use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, trace};

/// Read a caption file as UTF-8 text.
pub fn read_captions(path: &Path) -> Result<String> {
    trace!("read_captions path={}", path.display());
    fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

/// `dir/stem.srt` becomes `dir/stem_<suffix>.srt`.
pub fn sibling_path(input: &Path, suffix: &str) -> PathBuf {
    input.with_file_name(format!(
        "{}_{}.srt",
        input.file_stem().unwrap_or_default().to_string_lossy(),
        suffix
    ))
}

/// Write `content` to `path` through a temporary file in the same directory.
/// The temporary file is removed if anything fails before the final rename.
pub fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)
        .with_context(|| format!("creating temporary file in {}", dir.display()))?;
    tmp.write_all(content.as_bytes())?;
    tmp.persist(path)
        .with_context(|| format!("writing {}", path.display()))?;
    debug!("persisted {} bytes to {}", content.len(), path.display());
    Ok(())
}
