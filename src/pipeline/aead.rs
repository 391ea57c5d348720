//! AES-256-GCM sealing under a passphrase-derived key
//!
//! Every call to [`encrypt_with`] draws a fresh salt and nonce from the OS
//! CSPRNG, so two containers sealed with the same passphrase never share a key.
//! Tag failures from a wrong passphrase and from tampered bytes are reported
//! identically as [`PpcError::AuthenticationFailed`].

use crate::error::{PpcError, Result};
use crate::header::{Cipher, CipherInfo, Kdf, KdfInfo, TAG_LEN};
use crate::pipeline::kdf::{derive_key, KdfParams, SALT_LEN};
use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use rand::{rngs::OsRng, RngCore};

/// AES-GCM nonce size in bytes
pub const NONCE_LEN: usize = 12;

/// Ciphertext plus the header records needed to open it again
#[derive(Debug, Clone)]
pub struct Sealed {
    /// Ciphertext with the 16-byte tag appended
    pub ciphertext: Vec<u8>,
    pub kdf: KdfInfo,
    pub cipher: CipherInfo,
}

/// Encrypt with the default scrypt cost
pub fn encrypt(plaintext: &[u8], passphrase: &str) -> Result<Sealed> {
    encrypt_with(plaintext, passphrase, &KdfParams::default())
}

/// Encrypt with explicit scrypt cost parameters
pub fn encrypt_with(plaintext: &[u8], passphrase: &str, params: &KdfParams) -> Result<Sealed> {
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);
    let mut nonce = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce);

    let key = derive_key(passphrase, &salt, params)?;
    let cipher = Aes256Gcm::new_from_slice(&key[..])
        .map_err(|e| PpcError::EncryptionError(format!("aes-256-gcm key: {}", e)))?;
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce), plaintext)
        .map_err(|e| PpcError::EncryptionError(format!("aes-256-gcm: {}", e)))?;

    Ok(Sealed {
        ciphertext,
        kdf: KdfInfo {
            name: Kdf::Scrypt,
            salt: STANDARD.encode(salt),
            n: params.n,
            r: params.r,
            p: params.p,
        },
        cipher: CipherInfo {
            name: Cipher::Aes256Gcm,
            nonce: STANDARD.encode(nonce),
            tag_len: TAG_LEN,
        },
    })
}

/// Decrypt using the salt, nonce and KDF cost recorded in the header
pub fn decrypt(
    ciphertext: &[u8],
    passphrase: &str,
    kdf: &KdfInfo,
    cipher_info: &CipherInfo,
) -> Result<Vec<u8>> {
    let salt = decode_b64("kdf.salt", &kdf.salt)?;
    if salt.is_empty() {
        return Err(PpcError::InvalidHeader("kdf.salt is empty".into()));
    }
    let nonce = decode_b64("cipher.nonce", &cipher_info.nonce)?;
    if nonce.len() != NONCE_LEN {
        return Err(PpcError::InvalidHeader(format!(
            "cipher.nonce must be {} bytes, got {}",
            NONCE_LEN,
            nonce.len()
        )));
    }

    let key = derive_key(passphrase, &salt, &KdfParams::from_info(kdf))?;
    let cipher = Aes256Gcm::new_from_slice(&key[..])
        .map_err(|e| PpcError::EncryptionError(format!("aes-256-gcm key: {}", e)))?;
    cipher
        .decrypt(Nonce::from_slice(&nonce), ciphertext)
        .map_err(|_| PpcError::AuthenticationFailed)
}

fn decode_b64(field: &str, value: &str) -> Result<Vec<u8>> {
    STANDARD
        .decode(value)
        .map_err(|e| PpcError::InvalidHeader(format!("{}: {}", field, e)))
}
