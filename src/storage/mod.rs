//! Storage module
//!
//! Collaborator interfaces for reading source images and persisting the
//! derived variants:
//! - `MemoryStore`: HashMap-backed store for tests and embedding
//! - `FsStore`: directory-backed store used by the CLI

pub mod fs;
pub mod keys;
pub mod memory;
pub mod traits;

pub use fs::FsStore;
pub use keys::{content_type_for_key, derived_key, is_image_key, normalize_key};
pub use memory::MemoryStore;
pub use traits::{ObjectSource, ObjectStore, StoredObject};
