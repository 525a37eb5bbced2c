// File I/O operations

pub mod discovery;
pub mod error;
pub mod native;
pub mod store;

pub use error::StoreError;
pub use store::ConfigStore;
