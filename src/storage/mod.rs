//! # Photo Storage
//!
//! Durable state of the camera: one storage unit (directory) per roll, and
//! the registry listing every roll ever created.

pub mod photo_store;
pub mod registry;

pub use photo_store::{DirectoryStore, PhotoNames, PhotoStore, StorageUnit};
pub use registry::{RegistryEntry, RollRegistry};
