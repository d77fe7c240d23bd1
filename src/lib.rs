pub mod banker;
pub mod config;
pub mod error;
pub mod safety;
pub mod worker;

pub use banker::{Banker, Snapshot};
pub use error::BankError;
pub use safety::{is_safe, safe_sequence};
