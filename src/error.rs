use thiserror::Error;

/// Pipeline stage that produced a decode failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Framing,
    Authentication,
    Decompression,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Framing => f.write_str("framing"),
            Stage::Authentication => f.write_str("authentication"),
            Stage::Decompression => f.write_str("decompression"),
        }
    }
}

#[derive(Error, Debug)]
pub enum PpcError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Not a PPC container")]
    NotAContainer,

    #[error("Unsupported PPC version: {0}")]
    UnsupportedVersion(u8),

    #[error("Container is truncated or header length is corrupt (need {needed} bytes, have {available})")]
    Truncated { needed: usize, available: usize },

    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    #[error("Decryption failed. Invalid passphrase or corrupted data")]
    AuthenticationFailed,

    #[error("Encryption error: {0}")]
    EncryptionError(String),

    #[error("Compression error: {0}")]
    CompressionError(String),

    #[error("Decompression error: {0}")]
    DecompressionError(String),

    #[error("Invalid compression level: {0}. Must be between 1 and 22")]
    InvalidLevel(i32),

    #[error("Unknown storage backend: {0} (web3, pinata or daemon)")]
    UnknownBackend(String),

    #[error("{backend}: credential missing (set {env_var})")]
    CredentialMissing {
        backend: &'static str,
        env_var: &'static str,
    },

    #[error("Invalid content id: {0:?}")]
    InvalidContentId(String),

    #[error("{backend}: network failure: {message}")]
    Network {
        backend: &'static str,
        message: String,
    },
}

impl PpcError {
    /// Decode stage this error belongs to, if it came out of the container pipeline
    pub fn stage(&self) -> Option<Stage> {
        match self {
            PpcError::NotAContainer
            | PpcError::UnsupportedVersion(_)
            | PpcError::Truncated { .. }
            | PpcError::InvalidHeader(_) => Some(Stage::Framing),
            PpcError::AuthenticationFailed => Some(Stage::Authentication),
            PpcError::DecompressionError(_) => Some(Stage::Decompression),
            _ => None,
        }
    }

    pub fn is_authentication(&self) -> bool {
        matches!(self, PpcError::AuthenticationFailed)
    }
}

impl From<serde_json::Error> for PpcError {
    fn from(e: serde_json::Error) -> Self {
        PpcError::InvalidHeader(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PpcError>;
