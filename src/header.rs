use crate::error::{PpcError, Result};
use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Creation timestamp layout, always UTC
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// AEAD tag length in bytes (AES-256-GCM)
pub const TAG_LEN: usize = 16;

/// Compression algorithm options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Compression {
    #[default]
    Zstd,
}

/// Key derivation function options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Kdf {
    #[default]
    Scrypt,
}

/// Cipher options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Cipher {
    #[default]
    #[serde(rename = "aes-256-gcm")]
    Aes256Gcm,
}

/// Everything needed to re-derive the key from a passphrase
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KdfInfo {
    pub name: Kdf,
    #[serde(rename = "salt_b64", alias = "salt")]
    pub salt: String,
    pub n: u64,
    pub r: u32,
    pub p: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CipherInfo {
    pub name: Cipher,
    #[serde(rename = "nonce_b64", alias = "nonce")]
    pub nonce: String,
    pub tag_len: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompInfo {
    pub name: Compression,
    pub level: i32,
}

/// PPC container header - plaintext JSON describing how to undo the
/// compression and encryption and where the payload came from.
/// Only the passphrase is kept out of band.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Header {
    /// Best-effort content type of the original file
    pub mime: String,
    /// Original filename, default restore target
    pub orig_name: String,
    /// Creation time, `YYYY-MM-DDTHH:MM:SSZ`
    pub created: String,
    pub kdf: KdfInfo,
    pub cipher: CipherInfo,
    pub comp: CompInfo,
    pub notes: Option<String>,
}

impl Header {
    /// Build a header stamped with the current UTC time
    pub fn new(
        mime: impl Into<String>,
        orig_name: impl Into<String>,
        kdf: KdfInfo,
        cipher: CipherInfo,
        comp: CompInfo,
        notes: Option<String>,
    ) -> Self {
        Self {
            mime: mime.into(),
            orig_name: orig_name.into(),
            created: now_timestamp(),
            kdf,
            cipher,
            comp,
            notes,
        }
    }

    /// Serialize header to compact JSON bytes
    pub fn to_wire(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Deserialize and validate header from JSON bytes
    pub fn from_wire(data: &[u8]) -> Result<Self> {
        let header: Header = serde_json::from_slice(data)?;
        header.validate()?;
        Ok(header)
    }

    fn validate(&self) -> Result<()> {
        NaiveDateTime::parse_from_str(&self.created, TIMESTAMP_FORMAT).map_err(|_| {
            PpcError::InvalidHeader(format!("created: bad timestamp {:?}", self.created))
        })?;
        if self.cipher.tag_len != TAG_LEN {
            return Err(PpcError::InvalidHeader(format!(
                "cipher.tag_len must be {}, got {}",
                TAG_LEN, self.cipher.tag_len
            )));
        }
        Ok(())
    }

    /// Header fields in display order
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("mime", self.mime.clone()),
            ("orig_name", self.orig_name.clone()),
            ("created", self.created.clone()),
            ("kdf", to_json_string(&self.kdf)),
            ("cipher", to_json_string(&self.cipher)),
            ("comp", to_json_string(&self.comp)),
            ("notes", self.notes.clone().unwrap_or_else(|| "-".into())),
        ]
    }
}

fn to_json_string<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_default()
}

/// Current UTC time in the header timestamp format
pub fn now_timestamp() -> String {
    Utc::now().format(TIMESTAMP_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Header {
        Header {
            mime: "text/plain".into(),
            orig_name: "hello.txt".into(),
            created: "2024-05-01T12:00:00Z".into(),
            kdf: KdfInfo {
                name: Kdf::Scrypt,
                salt: "AAAAAAAAAAAAAAAAAAAAAA==".into(),
                n: 16384,
                r: 8,
                p: 1,
            },
            cipher: CipherInfo {
                name: Cipher::Aes256Gcm,
                nonce: "AAAAAAAAAAAAAAAA".into(),
                tag_len: 16,
            },
            comp: CompInfo {
                name: Compression::Zstd,
                level: 7,
            },
            notes: None,
        }
    }

    #[test]
    fn test_wire_roundtrip() {
        let header = sample();
        let bytes = header.to_wire().unwrap();
        assert_eq!(Header::from_wire(&bytes).unwrap(), header);
    }

    #[test]
    fn test_wire_field_names() {
        let json = String::from_utf8(sample().to_wire().unwrap()).unwrap();
        assert!(json.contains("\"salt_b64\""));
        assert!(json.contains("\"nonce_b64\""));
        assert!(json.contains("\"name\":\"aes-256-gcm\""));
        assert!(json.contains("\"name\":\"scrypt\""));
        assert!(json.contains("\"name\":\"zstd\""));
        assert!(json.contains("\"notes\":null"));
    }

    #[test]
    fn test_accepts_short_field_aliases_and_missing_notes() {
        let json = br#"{"mime":"a/b","orig_name":"x","created":"2024-01-01T00:00:00Z",
            "kdf":{"name":"scrypt","salt":"AA==","n":16384,"r":8,"p":1},
            "cipher":{"name":"aes-256-gcm","nonce":"AA==","tag_len":16},
            "comp":{"name":"zstd","level":3}}"#;
        let header = Header::from_wire(json).unwrap();
        assert_eq!(header.kdf.salt, "AA==");
        assert_eq!(header.cipher.nonce, "AA==");
        assert_eq!(header.notes, None);
    }

    #[test]
    fn test_missing_required_field() {
        let json = br#"{"mime":"a/b","created":"2024-01-01T00:00:00Z",
            "kdf":{"name":"scrypt","salt":"AA==","n":16384,"r":8,"p":1},
            "cipher":{"name":"aes-256-gcm","nonce":"AA==","tag_len":16},
            "comp":{"name":"zstd","level":3}}"#;
        assert!(matches!(
            Header::from_wire(json),
            Err(PpcError::InvalidHeader(_))
        ));
    }

    #[test]
    fn test_rejects_garbage_and_unknown_algorithms() {
        assert!(Header::from_wire(b"not json").is_err());
        assert!(Header::from_wire(&[0xff, 0xfe]).is_err());

        let mut value: serde_json::Value = serde_json::to_value(sample()).unwrap();
        value["cipher"]["name"] = "chacha20".into();
        let bytes = serde_json::to_vec(&value).unwrap();
        assert!(Header::from_wire(&bytes).is_err());
    }

    #[test]
    fn test_rejects_bad_timestamp_and_tag_len() {
        let mut header = sample();
        header.created = "yesterday".into();
        let bytes = header.to_wire().unwrap();
        assert!(Header::from_wire(&bytes).is_err());

        let mut header = sample();
        header.cipher.tag_len = 12;
        let bytes = header.to_wire().unwrap();
        assert!(Header::from_wire(&bytes).is_err());
    }

    #[test]
    fn test_fields_are_enumerated() {
        let names: Vec<_> = sample().fields().into_iter().map(|(k, _)| k).collect();
        assert_eq!(
            names,
            ["mime", "orig_name", "created", "kdf", "cipher", "comp", "notes"]
        );
    }

    #[test]
    fn test_now_timestamp_format() {
        let ts = now_timestamp();
        assert_eq!(ts.len(), 20);
        assert!(ts.ends_with('Z'));
        assert!(NaiveDateTime::parse_from_str(&ts, TIMESTAMP_FORMAT).is_ok());
    }
}
