//! Local file helpers used around the pipeline.
//!
//! Outputs are written through a temporary file in the destination directory
//! and renamed into place, so a failed run never leaves a partial file behind.

use crate::error::Result;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Directory a path will be written into (`.` for bare file names)
fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Make sure the output directory exists before any work starts
pub fn prepare_output_dir(path: &Path) -> Result<()> {
    std::fs::create_dir_all(parent_dir(path))?;
    Ok(())
}

/// Write `data` to `path` atomically (temp file + rename)
pub fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    let dir = parent_dir(path);
    std::fs::create_dir_all(&dir)?;
    let mut tmp = NamedTempFile::new_in(&dir)?;
    tmp.write_all(data)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
