use crate::codec::{encode, EncodeOptions};
use crate::container::EXTENSION;
use crate::detect::detect_mime;
use crate::error::Result;
use crate::fsio::{prepare_output_dir, write_atomic};
use crate::pipeline::{check_level, KdfParams, DEFAULT_LEVEL};
use crate::remote::{Backend, RemoteConfig};
use std::path::{Path, PathBuf};

/// Default notes stamped into new containers
pub const DEFAULT_NOTES: &str = "PPC-1: Universal container ready for AI compression.";

/// Options for the compress command
#[derive(Debug, Clone)]
pub struct CompressOptions {
    pub passphrase: String,
    pub level: i32,
    /// Override the original filename recorded in the header
    pub name: Option<String>,
    pub notes: Option<String>,
    pub upload: Option<Backend>,
    pub remote: RemoteConfig,
    pub kdf: KdfParams,
}

impl Default for CompressOptions {
    fn default() -> Self {
        Self {
            passphrase: String::new(),
            level: DEFAULT_LEVEL,
            name: None,
            notes: Some(DEFAULT_NOTES.into()),
            upload: None,
            remote: RemoteConfig::default(),
            kdf: KdfParams::default(),
        }
    }
}

/// Result of an upload after compression
#[derive(Debug, Clone)]
pub struct UploadReport {
    pub backend: &'static str,
    pub cid: String,
    pub url: String,
}

/// What the compress command did
#[derive(Debug, Clone)]
pub struct CompressReport {
    pub output: PathBuf,
    pub original_bytes: usize,
    pub container_bytes: usize,
    pub mime: String,
    pub mime_source: &'static str,
    pub level: i32,
    pub upload: Option<UploadReport>,
}

/// `input.ext` → `input.ppc`, never the input itself
pub fn default_output_path(input: &Path) -> PathBuf {
    let candidate = input.with_extension(EXTENSION);
    if candidate == input {
        let mut os = input.as_os_str().to_os_string();
        os.push(".");
        os.push(EXTENSION);
        PathBuf::from(os)
    } else {
        candidate
    }
}

/// Compress + encrypt a file into a container, optionally uploading it
pub fn compress_file(
    input_path: &Path,
    output_path: Option<&Path>,
    options: &CompressOptions,
) -> Result<CompressReport> {
    check_level(options.level)?;

    // Local I/O and credentials are checked before the pipeline runs
    let data = std::fs::read(input_path)?;
    let (mime, mime_source) = detect_mime(input_path)?;
    let output = output_path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_output_path(input_path));
    prepare_output_dir(&output)?;
    let service = options
        .upload
        .map(|backend| options.remote.service(backend))
        .transpose()?;

    let orig_name = match &options.name {
        Some(name) => name.clone(),
        None => input_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
    };
    let encode_options = EncodeOptions {
        mime: mime.clone(),
        orig_name,
        level: options.level,
        notes: options.notes.clone(),
        kdf: options.kdf,
    };
    let blob = encode(&data, &options.passphrase, &encode_options)?;
    write_atomic(&output, &blob)?;
    tracing::info!(output = %output.display(), bytes = blob.len(), "container written");

    let upload = match service {
        Some(service) => {
            let filename = output
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let cid = service.upload(&blob, &filename)?;
            Some(UploadReport {
                backend: service.name(),
                url: service.gateway_url(&cid),
                cid,
            })
        }
        None => None,
    };

    Ok(CompressReport {
        output,
        original_bytes: data.len(),
        container_bytes: blob.len(),
        mime,
        mime_source,
        level: options.level,
        upload,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::read_container_header;
    use crate::error::PpcError;
    use tempfile::tempdir;

    fn fast_options() -> CompressOptions {
        CompressOptions {
            passphrase: "pass".into(),
            kdf: KdfParams { n: 1 << 4, r: 8, p: 1 },
            ..Default::default()
        }
    }

    #[test]
    fn test_compress_default_output() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("hello.txt");
        std::fs::write(&input, b"hello pied piper").unwrap();

        let report = compress_file(&input, None, &fast_options()).unwrap();
        assert_eq!(report.output, dir.path().join("hello.ppc"));
        assert_eq!(report.original_bytes, 16);
        assert_eq!(report.mime, "text/plain");
        assert!(report.upload.is_none());

        let info = read_container_header(&report.output).unwrap();
        assert_eq!(info.header.orig_name, "hello.txt");
        assert_eq!(info.header.notes.as_deref(), Some(DEFAULT_NOTES));
        assert_eq!(info.header.comp.level, DEFAULT_LEVEL);
    }

    #[test]
    fn test_compress_name_override() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("scan.bin");
        let output = dir.path().join("out/custom.ppc");
        std::fs::write(&input, [0u8; 64]).unwrap();

        let options = CompressOptions {
            name: Some("report.pdf".into()),
            ..fast_options()
        };
        compress_file(&input, Some(&output), &options).unwrap();
        let info = read_container_header(&output).unwrap();
        assert_eq!(info.header.orig_name, "report.pdf");
    }

    #[test]
    fn test_default_output_never_overwrites_input() {
        assert_eq!(
            default_output_path(Path::new("dir/a.txt")),
            PathBuf::from("dir/a.ppc")
        );
        assert_eq!(
            default_output_path(Path::new("dir/a.ppc")),
            PathBuf::from("dir/a.ppc.ppc")
        );
    }

    #[test]
    fn test_missing_input_is_io_error() {
        let dir = tempdir().unwrap();
        let err = compress_file(&dir.path().join("nope"), None, &fast_options()).unwrap_err();
        assert!(matches!(err, PpcError::Io(_)));
    }

    #[test]
    fn test_missing_credential_writes_nothing() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("hello.txt");
        std::fs::write(&input, b"hello").unwrap();

        let options = CompressOptions {
            upload: Some(Backend::Pinata),
            ..fast_options()
        };
        let err = compress_file(&input, None, &options).unwrap_err();
        assert!(matches!(err, PpcError::CredentialMissing { backend: "pinata", .. }));
        assert!(!dir.path().join("hello.ppc").exists());
    }

    #[test]
    fn test_invalid_level_writes_nothing() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("hello.txt");
        std::fs::write(&input, b"hello").unwrap();

        let options = CompressOptions {
            level: 30,
            ..fast_options()
        };
        assert!(matches!(
            compress_file(&input, None, &options),
            Err(PpcError::InvalidLevel(30))
        ));
        assert!(!dir.path().join("hello.ppc").exists());
    }
}
