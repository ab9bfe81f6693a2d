//! Backends for typed settings.
//!
//! - `MemoryBackend`: a map, with staged writes and a commit counter
//! - `FileBackend`: one file per key under a root directory
//! - `JsonFileBackend`: every key in a single JSON document

pub mod in_memory;
pub mod json_file;
pub mod local_disk;

pub use in_memory::MemoryBackend;
pub use json_file::JsonFileBackend;
pub use local_disk::FileBackend;

pub use typed_settings_backend::{Backend, BackendError, NativeKind, NativeValue};

fn check_key(key: &str) -> Result<(), BackendError> {
    if key.is_empty() {
        return Err(BackendError::InvalidKey {
            key: key.to_string(),
            message: "key must not be empty".to_string(),
        });
    }
    Ok(())
}
