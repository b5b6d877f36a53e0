pub mod factory;
pub mod store;

pub use factory::{MemoryStoreFactory, StoreConfig, StoreFactory, StoreRegistry};
pub use store::{KeyValueStore, MemoryStore, StoreError};
