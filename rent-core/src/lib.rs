pub mod calculations;
pub mod db;
pub mod directory;
pub mod error;
pub mod export;
pub mod history;
pub mod models;
pub mod session;
pub mod validation;

pub use db::store::{KeyValueStore, MemoryStore, StoreError};
pub use directory::SuburbDirectory;
pub use error::QuoteError;
pub use models::*;
