use crate::error::{PpcError, Result};
use crate::header::Compression;

/// Lowest accepted zstd level
pub const MIN_LEVEL: i32 = 1;
/// Highest accepted zstd level
pub const MAX_LEVEL: i32 = 22;
/// Level used when the caller does not pick one
pub const DEFAULT_LEVEL: i32 = 7;

/// Reject levels outside `MIN_LEVEL..=MAX_LEVEL`
pub fn check_level(level: i32) -> Result<()> {
    if (MIN_LEVEL..=MAX_LEVEL).contains(&level) {
        Ok(())
    } else {
        Err(PpcError::InvalidLevel(level))
    }
}

/// Compress data using the specified algorithm
pub fn compress(data: &[u8], algorithm: Compression, level: i32) -> Result<Vec<u8>> {
    check_level(level)?;
    match algorithm {
        Compression::Zstd => compress_zstd(data, level),
    }
}

/// Decompress data using the specified algorithm
pub fn decompress(data: &[u8], algorithm: Compression) -> Result<Vec<u8>> {
    match algorithm {
        Compression::Zstd => decompress_zstd(data),
    }
}

fn compress_zstd(data: &[u8], level: i32) -> Result<Vec<u8>> {
    zstd::encode_all(data, level)
        .map_err(|e| PpcError::CompressionError(format!("zstd: {}", e)))
}

fn decompress_zstd(data: &[u8]) -> Result<Vec<u8>> {
    zstd::decode_all(data)
        .map_err(|e| PpcError::DecompressionError(format!("zstd: {}", e)))
}
