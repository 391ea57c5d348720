use crate::codec::decode;
use crate::error::Result;
use crate::fsio::{prepare_output_dir, write_atomic};
use std::path::{Path, PathBuf};

/// Options for the decompress command
#[derive(Debug, Clone)]
pub struct DecompressOptions {
    pub passphrase: String,
}

/// What the decompress command restored
#[derive(Debug, Clone)]
pub struct DecompressReport {
    pub output: PathBuf,
    pub bytes: usize,
    pub mime: String,
}

/// Restore target from the header's `orig_name`.
///
/// Only the final path component is honoured so a crafted header cannot
/// point outside the working directory.
pub fn restore_path(orig_name: &str, container_path: &Path) -> PathBuf {
    match Path::new(orig_name).file_name() {
        Some(name) => PathBuf::from(name),
        None => {
            let stem = container_path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "restored".into());
            PathBuf::from(format!("{}.out", stem))
        }
    }
}

/// Decrypt + decompress a container back to its original file.
///
/// Nothing is written unless the whole decode succeeds.
pub fn decompress_file(
    container_path: &Path,
    output_path: Option<&Path>,
    options: &DecompressOptions,
) -> Result<DecompressReport> {
    let blob = std::fs::read(container_path)?;
    if let Some(output) = output_path {
        prepare_output_dir(output)?;
    }

    let (data, header) = decode(&blob, &options.passphrase)?;

    let output = match output_path {
        Some(p) => p.to_path_buf(),
        None => restore_path(&header.orig_name, container_path),
    };
    write_atomic(&output, &data)?;
    tracing::info!(output = %output.display(), bytes = data.len(), "restored");

    Ok(DecompressReport {
        output,
        bytes: data.len(),
        mime: header.mime,
    })
}
