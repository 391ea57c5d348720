pub mod compress;
pub mod decompress;
pub mod inspect;
pub mod remote;

pub use compress::*;
pub use decompress::*;
pub use inspect::*;
pub use remote::*;
