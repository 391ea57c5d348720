use crate::container::{read_container_header, VERSION};
use crate::error::Result;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::path::Path;

/// Display the header of a container without decrypting it
pub fn show_info(path: &Path) -> Result<String> {
    let info = read_container_header(path)?;
    let digest = file_sha256(path)?;

    let mut output = String::new();

    output.push_str("PPC Container Header\n");
    output.push_str("====================\n\n");

    output.push_str(&format!("File: {}\n", path.display()));
    output.push_str(&format!("Version: {}\n", VERSION));
    output.push('\n');

    let width = info
        .header
        .fields()
        .iter()
        .map(|(k, _)| k.len())
        .max()
        .unwrap_or(0);
    for (field, value) in info.header.fields() {
        output.push_str(&format!("  {:<width$}  {}\n", field, value, width = width));
    }
    output.push('\n');

    output.push_str("Storage:\n");
    output.push_str(&format!("  Header size: {} bytes\n", info.header_len));
    output.push_str(&format!("  Payload bytes: {}\n", info.payload_len));
    output.push_str(&format!("  Payload size: {}\n", format_size(info.payload_len)));
    output.push_str(&format!("  SHA-256: {}\n", digest));

    Ok(output)
}

fn file_sha256(path: &Path) -> Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    std::io::copy(&mut file, &mut hasher)?;
    Ok(hex::encode(hasher.finalize()))
}

fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else if bytes < 1024 * 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else {
        format!("{:.1} GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::compress::{compress_file, CompressOptions};
    use crate::error::PpcError;
    use crate::pipeline::KdfParams;
    use tempfile::tempdir;

    #[test]
    fn test_show_info() {
        let dir = tempdir().unwrap();
        let input_path = dir.path().join("input.txt");
        std::fs::write(&input_path, b"Test data").unwrap();

        let options = CompressOptions {
            passphrase: "secret".into(),
            kdf: KdfParams { n: 1 << 4, r: 8, p: 1 },
            ..Default::default()
        };
        let report = compress_file(&input_path, None, &options).unwrap();

        let info = show_info(&report.output).unwrap();
        assert!(info.contains("Version: 1"));
        assert!(info.contains("orig_name"));
        assert!(info.contains("input.txt"));
        assert!(info.contains("text/plain"));
        assert!(info.contains("\"name\":\"scrypt\""));
        assert!(info.contains("aes-256-gcm"));
        assert!(info.contains("Payload bytes:"));
        assert!(info.contains("SHA-256:"));
        assert!(!info.contains("Test data"));
    }

    #[test]
    fn test_show_info_rejects_non_container() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("plain.txt");
        std::fs::write(&path, b"just text").unwrap();
        assert!(matches!(show_info(&path), Err(PpcError::NotAContainer)));
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(500), "500 B");
        assert_eq!(format_size(1024), "1.0 KB");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(1048576), "1.0 MB");
    }
}
