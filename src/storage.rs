pub mod directory;
/// JSON file persistence.
pub mod json;
mod memory;
mod store;

pub use directory::{Directory, DirectoryError};
pub use json::JsonFileStore;
pub use memory::MemoryStore;
pub use store::{RequestStore, StoreError};
