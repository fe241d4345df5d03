pub mod crypto;
pub mod util;

pub use crypto::*;
pub use util::*;
