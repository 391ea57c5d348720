use crate::error::{PpcError, Result};
use crate::header::Header;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Magic bytes for the PPC file format
pub const MAGIC: &[u8; 4] = b"PPC1";
/// The single supported format version
pub const VERSION: u8 = 1;
/// Default file extension for containers
pub const EXTENSION: &str = "ppc";

/// magic + version + header length
const PREFIX_LEN: usize = 4 + 1 + 4;

/// Header-only view of a container file
#[derive(Debug, Clone)]
pub struct ContainerInfo {
    pub header: Header,
    /// Serialized header size in bytes
    pub header_len: usize,
    /// Ciphertext (including tag) size in bytes
    pub payload_len: u64,
}

/// Serialize header + ciphertext into a single blob.
///
/// Layout: `MAGIC || VERSION || header_len (u32 LE) || header JSON || ciphertext`
pub fn pack(header: &Header, ciphertext: &[u8]) -> Result<Vec<u8>> {
    let header_bytes = header.to_wire()?;
    let header_len = u32::try_from(header_bytes.len())
        .map_err(|_| PpcError::InvalidHeader("header exceeds 4 GiB".into()))?;

    let mut blob = Vec::with_capacity(PREFIX_LEN + header_bytes.len() + ciphertext.len());
    blob.extend_from_slice(MAGIC);
    blob.push(VERSION);
    blob.extend_from_slice(&header_len.to_le_bytes());
    blob.extend_from_slice(&header_bytes);
    blob.extend_from_slice(ciphertext);
    Ok(blob)
}

/// Parse a blob back into its header and ciphertext.
///
/// The ciphertext region has no length of its own: everything after the
/// header belongs to it, so appended bytes only show up when the tag fails.
pub fn unpack(blob: &[u8]) -> Result<(Header, &[u8])> {
    let header_len = parse_prefix(blob)? as usize;
    let header_end = PREFIX_LEN
        .checked_add(header_len)
        .ok_or(PpcError::Truncated {
            needed: usize::MAX,
            available: blob.len(),
        })?;
    if blob.len() < header_end {
        return Err(PpcError::Truncated {
            needed: header_end,
            available: blob.len(),
        });
    }

    let header = Header::from_wire(&blob[PREFIX_LEN..header_end])?;
    tracing::trace!(header_len, "header parsed");

    let ciphertext = &blob[header_end..];
    if ciphertext.len() < header.cipher.tag_len {
        return Err(PpcError::Truncated {
            needed: header_end + header.cipher.tag_len,
            available: blob.len(),
        });
    }
    Ok((header, ciphertext))
}

/// Validate magic and version, return the declared header length.
/// `prefix` may be shorter than `PREFIX_LEN` (a truncated file).
fn parse_prefix(prefix: &[u8]) -> Result<u32> {
    let truncated = PpcError::Truncated {
        needed: PREFIX_LEN,
        available: prefix.len(),
    };

    if prefix.len() < MAGIC.len() {
        return if MAGIC.starts_with(prefix) {
            Err(truncated)
        } else {
            Err(PpcError::NotAContainer)
        };
    }
    if &prefix[..MAGIC.len()] != MAGIC {
        return Err(PpcError::NotAContainer);
    }
    tracing::trace!("magic checked");

    let version = match prefix.get(MAGIC.len()) {
        Some(v) => *v,
        None => return Err(truncated),
    };
    if version != VERSION {
        return Err(PpcError::UnsupportedVersion(version));
    }
    tracing::trace!(version, "version checked");

    let len_bytes = match prefix.get(MAGIC.len() + 1..PREFIX_LEN) {
        Some(b) => b,
        None => return Err(truncated),
    };
    let mut buf = [0u8; 4];
    buf.copy_from_slice(len_bytes);
    Ok(u32::from_le_bytes(buf))
}

/// Read just the header from a container file (without loading the payload)
pub fn read_container_header(path: &Path) -> Result<ContainerInfo> {
    let file = File::open(path)?;
    let file_len = file.metadata()?.len();
    let mut reader = BufReader::new(file);

    let mut prefix = Vec::with_capacity(PREFIX_LEN);
    reader
        .by_ref()
        .take(PREFIX_LEN as u64)
        .read_to_end(&mut prefix)?;
    let header_len = parse_prefix(&prefix)? as usize;

    let mut header_bytes = Vec::new();
    reader
        .by_ref()
        .take(header_len as u64)
        .read_to_end(&mut header_bytes)?;
    if header_bytes.len() < header_len {
        return Err(PpcError::Truncated {
            needed: PREFIX_LEN + header_len,
            available: PREFIX_LEN + header_bytes.len(),
        });
    }
    let header = Header::from_wire(&header_bytes)?;

    let payload_len = file_len.saturating_sub((PREFIX_LEN + header_len) as u64);
    if payload_len < header.cipher.tag_len as u64 {
        return Err(PpcError::Truncated {
            needed: PREFIX_LEN + header_len + header.cipher.tag_len,
            available: file_len as usize,
        });
    }

    Ok(ContainerInfo {
        header,
        header_len,
        payload_len,
    })
}

/// Whether a file starts with the container magic
pub fn has_magic(path: &Path) -> Result<bool> {
    let mut file = File::open(path)?;
    let mut magic = Vec::with_capacity(MAGIC.len());
    file.by_ref()
        .take(MAGIC.len() as u64)
        .read_to_end(&mut magic)?;
    Ok(magic.as_slice() == MAGIC)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::{Cipher, CipherInfo, CompInfo, Compression, Kdf, KdfInfo};
    use tempfile::tempdir;

    fn sample_header() -> Header {
        Header {
            mime: "text/plain".into(),
            orig_name: "notes.txt".into(),
            created: "2024-05-01T12:00:00Z".into(),
            kdf: KdfInfo {
                name: Kdf::Scrypt,
                salt: "c2FsdHNhbHRzYWx0c2FsdA==".into(),
                n: 16384,
                r: 8,
                p: 1,
            },
            cipher: CipherInfo {
                name: Cipher::Aes256Gcm,
                nonce: "bm9uY2Vub25jZTEy".into(),
                tag_len: 16,
            },
            comp: CompInfo {
                name: Compression::Zstd,
                level: 7,
            },
            notes: Some("test".into()),
        }
    }

    fn sample_blob() -> (Header, Vec<u8>, Vec<u8>) {
        let header = sample_header();
        let ciphertext: Vec<u8> = (0..48).collect();
        let blob = pack(&header, &ciphertext).unwrap();
        (header, ciphertext, blob)
    }

    #[test]
    fn test_pack_layout() {
        let (header, ciphertext, blob) = sample_blob();
        let header_bytes = header.to_wire().unwrap();

        assert_eq!(&blob[0..4], b"PPC1");
        assert_eq!(blob[4], 1);
        assert_eq!(
            u32::from_le_bytes(blob[5..9].try_into().unwrap()) as usize,
            header_bytes.len()
        );
        assert_eq!(&blob[9..9 + header_bytes.len()], &header_bytes[..]);
        assert_eq!(&blob[9 + header_bytes.len()..], &ciphertext[..]);
    }

    #[test]
    fn test_unpack_roundtrip() {
        let (header, ciphertext, blob) = sample_blob();
        let (parsed, payload) = unpack(&blob).unwrap();
        assert_eq!(parsed, header);
        assert_eq!(payload, &ciphertext[..]);
        assert_eq!(pack(&parsed, payload).unwrap(), blob);
    }

    #[test]
    fn test_invalid_magic() {
        let (_, _, mut blob) = sample_blob();
        blob[0] = b'X';
        assert!(matches!(unpack(&blob), Err(PpcError::NotAContainer)));
        assert!(matches!(unpack(b"INVALID"), Err(PpcError::NotAContainer)));
        assert!(matches!(unpack(b"ZZ"), Err(PpcError::NotAContainer)));
    }

    #[test]
    fn test_unsupported_version() {
        let (_, _, mut blob) = sample_blob();
        blob[4] = 2;
        assert!(matches!(
            unpack(&blob),
            Err(PpcError::UnsupportedVersion(2))
        ));
        assert!(matches!(
            unpack(b"PPC1\x00garbage"),
            Err(PpcError::UnsupportedVersion(0))
        ));
    }

    #[test]
    fn test_truncated_prefix() {
        let cases: [&[u8]; 6] = [b"", b"P", b"PPC", b"PPC1", b"PPC1\x01", b"PPC1\x01\x10\x00"];
        for blob in cases {
            assert!(
                matches!(unpack(blob), Err(PpcError::Truncated { .. })),
                "{:?} should be truncated",
                blob
            );
        }
    }

    #[test]
    fn test_truncated_header() {
        let (_, _, blob) = sample_blob();
        let err = unpack(&blob[..20]).unwrap_err();
        assert!(matches!(err, PpcError::Truncated { available: 20, .. }));
    }

    #[test]
    fn test_header_length_larger_than_blob() {
        let mut blob = b"PPC1\x01".to_vec();
        blob.extend_from_slice(&u32::MAX.to_le_bytes());
        blob.extend_from_slice(b"{}");
        assert!(matches!(unpack(&blob), Err(PpcError::Truncated { .. })));
    }

    #[test]
    fn test_ciphertext_shorter_than_tag() {
        let header = sample_header();
        let blob = pack(&header, &[0u8; 15]).unwrap();
        assert!(matches!(unpack(&blob), Err(PpcError::Truncated { .. })));
    }

    #[test]
    fn test_malformed_header_json() {
        let mut blob = b"PPC1\x01".to_vec();
        blob.extend_from_slice(&5u32.to_le_bytes());
        blob.extend_from_slice(b"{oops");
        blob.extend_from_slice(&[0u8; 16]);
        assert!(matches!(unpack(&blob), Err(PpcError::InvalidHeader(_))));
    }

    #[test]
    fn test_read_header_only() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sample.ppc");
        let (header, ciphertext, blob) = sample_blob();
        std::fs::write(&path, &blob).unwrap();

        let info = read_container_header(&path).unwrap();
        assert_eq!(info.header, header);
        assert_eq!(info.header_len, header.to_wire().unwrap().len());
        assert_eq!(info.payload_len, ciphertext.len() as u64);
        assert!(has_magic(&path).unwrap());
    }

    #[test]
    fn test_read_header_truncated_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("short.ppc");
        let (_, _, blob) = sample_blob();
        std::fs::write(&path, &blob[..30]).unwrap();
        assert!(matches!(
            read_container_header(&path),
            Err(PpcError::Truncated { .. })
        ));
    }

    #[test]
    fn test_has_magic_rejects_other_files() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("plain.txt");
        std::fs::write(&path, b"hello").unwrap();
        assert!(!has_magic(&path).unwrap());
        std::fs::write(&path, b"PP").unwrap();
        assert!(!has_magic(&path).unwrap());
    }
}
