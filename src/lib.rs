//! PPC - Pied Piper universal container
//!
//! Wraps an arbitrary file in a single self-describing envelope: the
//! payload is zstd-compressed, then encrypted with AES-256-GCM under a key
//! stretched from a passphrase with scrypt. A plaintext JSON header records
//! everything needed to reverse the process except the passphrase.
//!
//! ## Layout
//!
//! ```text
//! "PPC1" | version (u8) | header_len (u32 LE) | header JSON | ciphertext ‖ tag
//! ```
//!
//! ## Pipeline
//!
//! ```text
//! Input → Compress (zstd) → Encrypt (scrypt + AES-256-GCM) → Header → Pack → Output
//! ```
//!
//! Decoding runs the same steps backwards and fails closed: a wrong
//! passphrase and a tampered blob are indistinguishable, and no plaintext
//! is returned unless the authentication tag verifies.
//!
//! ## Example
//!
//! ```no_run
//! use ppc::{decode, encode, EncodeOptions};
//!
//! let options = EncodeOptions {
//!     mime: "text/plain".into(),
//!     orig_name: "hello.txt".into(),
//!     ..Default::default()
//! };
//! let blob = encode(b"hello pied piper", "pass", &options).unwrap();
//!
//! let (data, header) = decode(&blob, "pass").unwrap();
//! assert_eq!(data, b"hello pied piper");
//! assert_eq!(header.orig_name, "hello.txt");
//! ```

pub mod cli;
pub mod codec;
pub mod container;
pub mod detect;
pub mod error;
pub mod fsio;
pub mod header;
pub mod pipeline;
pub mod remote;

pub use codec::{decode, encode, EncodeOptions};
pub use container::{pack, unpack};
pub use error::{PpcError, Result, Stage};
pub use header::Header;
