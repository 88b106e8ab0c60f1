pub mod error;
pub mod key;

pub use error::{Result, WardenError};
pub use key::{Key, KeyId};
