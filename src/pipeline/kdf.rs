//! Passphrase → AES key via scrypt
//!
//! Cost parameters travel in the header, so decoding always re-derives with
//! whatever `n`/`r`/`p` the container was sealed with.

use crate::error::{PpcError, Result};
use crate::header::KdfInfo;
use zeroize::Zeroizing;

/// Derived key size in bytes (AES-256)
pub const KEY_LEN: usize = 32;
/// Random salt size in bytes
pub const SALT_LEN: usize = 16;
/// Upper bound on scrypt working memory (`128 * r * n`, and `128 * r * p`)
/// accepted from a header
pub const MAX_MEMORY_BYTES: u64 = 1 << 30;
/// Upper bound on scrypt parallelism accepted from a header
pub const MAX_PARALLELISM: u32 = 16;

/// scrypt cost parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfParams {
    /// CPU/memory cost, power of two
    pub n: u64,
    /// Block size
    pub r: u32,
    /// Parallelism
    pub p: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            n: 1 << 14,
            r: 8,
            p: 1,
        }
    }
}

impl KdfParams {
    pub fn from_info(info: &KdfInfo) -> Self {
        Self {
            n: info.n,
            r: info.r,
            p: info.p,
        }
    }

    /// Check bounds and convert to scrypt's `log_n` form
    fn to_scrypt(self) -> Result<scrypt::Params> {
        if self.n < 2 || !self.n.is_power_of_two() {
            return Err(PpcError::InvalidHeader(format!(
                "kdf.n must be a power of two >= 2, got {}",
                self.n
            )));
        }
        if self.r == 0 || self.p == 0 {
            return Err(PpcError::InvalidHeader(format!(
                "kdf.r and kdf.p must be positive, got r={} p={}",
                self.r, self.p
            )));
        }
        if self.p > MAX_PARALLELISM {
            return Err(PpcError::InvalidHeader(format!(
                "kdf.p must be at most {}, got {}",
                MAX_PARALLELISM, self.p
            )));
        }
        let block = 128u128 * self.r as u128;
        let memory = block * self.n as u128;
        let buffer = block * self.p as u128;
        if memory.max(buffer) > MAX_MEMORY_BYTES as u128 {
            return Err(PpcError::InvalidHeader(format!(
                "kdf parameters need {} bytes of memory (limit {})",
                memory.max(buffer),
                MAX_MEMORY_BYTES
            )));
        }
        let log_n = self.n.trailing_zeros() as u8;
        scrypt::Params::new(log_n, self.r, self.p, KEY_LEN)
            .map_err(|e| PpcError::InvalidHeader(format!("kdf: {}", e)))
    }
}

/// Derive a 256-bit key from a passphrase and salt.
///
/// Deterministic for identical inputs; the returned buffer is wiped on drop.
pub fn derive_key(
    passphrase: &str,
    salt: &[u8],
    params: &KdfParams,
) -> Result<Zeroizing<[u8; KEY_LEN]>> {
    let scrypt_params = params.to_scrypt()?;
    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    scrypt::scrypt(passphrase.as_bytes(), salt, &scrypt_params, &mut key[..])
        .map_err(|e| PpcError::InvalidHeader(format!("kdf: {}", e)))?;
    Ok(key)
}
