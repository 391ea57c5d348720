use crate::container::{pack, unpack};
use crate::detect::FALLBACK_MIME;
use crate::error::Result;
use crate::header::{CompInfo, Compression, Header};
use crate::pipeline::{check_level, compress, decompress, decrypt, encrypt_with, KdfParams, DEFAULT_LEVEL};

/// Caller-supplied metadata for [`encode`]
#[derive(Debug, Clone)]
pub struct EncodeOptions {
    pub mime: String,
    pub orig_name: String,
    /// zstd level, 1..=22
    pub level: i32,
    pub notes: Option<String>,
    /// scrypt cost recorded in the header
    pub kdf: KdfParams,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            mime: FALLBACK_MIME.into(),
            orig_name: String::new(),
            level: DEFAULT_LEVEL,
            notes: None,
            kdf: KdfParams::default(),
        }
    }
}

/// Compress, encrypt and frame `data` into a container blob.
///
/// Pipeline: Input → Compress → Encrypt (scrypt + AES-256-GCM) → Header → Pack
pub fn encode(data: &[u8], passphrase: &str, options: &EncodeOptions) -> Result<Vec<u8>> {
    check_level(options.level)?;

    let compressed = compress(data, Compression::Zstd, options.level)?;
    tracing::debug!(
        original = data.len(),
        compressed = compressed.len(),
        level = options.level,
        "compressed"
    );

    let sealed = encrypt_with(&compressed, passphrase, &options.kdf)?;
    tracing::debug!(ciphertext = sealed.ciphertext.len(), "encrypted");

    let header = Header::new(
        options.mime.clone(),
        options.orig_name.clone(),
        sealed.kdf,
        sealed.cipher,
        CompInfo {
            name: Compression::Zstd,
            level: options.level,
        },
        options.notes.clone(),
    );
    let blob = pack(&header, &sealed.ciphertext)?;
    tracing::debug!(container = blob.len(), "packed");
    Ok(blob)
}

/// Unpack, decrypt and decompress a container blob.
///
/// Any failure aborts the whole decode; [`crate::PpcError::stage`] tells
/// framing, authentication and decompression failures apart.
pub fn decode(blob: &[u8], passphrase: &str) -> Result<(Vec<u8>, Header)> {
    let (header, ciphertext) = unpack(blob)?;
    tracing::debug!(
        orig_name = %header.orig_name,
        ciphertext = ciphertext.len(),
        "unpacked"
    );

    let compressed = decrypt(ciphertext, passphrase, &header.kdf, &header.cipher)?;
    tracing::debug!(compressed = compressed.len(), "decrypted");

    let data = decompress(&compressed, header.comp.name)?;
    tracing::debug!(restored = data.len(), "decompressed");
    Ok((data, header))
}
