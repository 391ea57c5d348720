pub mod aead;
pub mod compress;
pub mod kdf;

pub use aead::*;
pub use compress::*;
pub use kdf::*;
