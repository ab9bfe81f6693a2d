#![allow(dead_code)]

use serde::{Deserialize, Serialize};
use tempfile::TempDir;

use typed_settings::{Backend, Setting, SettingsService};
use typed_settings_stores::{FileBackend, JsonFileBackend, MemoryBackend};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub name: String,
    pub age: u32,
}

impl Setting for Person {}

pub fn ada() -> Person {
    Person {
        name: "Ada".to_string(),
        age: 36,
    }
}

pub fn nobody() -> Person {
    Person {
        name: String::new(),
        age: 0,
    }
}

/// A service over one kind of backend, plus whatever keeps it alive.
pub struct Fixture {
    pub name: &'static str,
    pub service: SettingsService<Box<dyn Backend>>,
    _dir: Option<TempDir>,
}

impl Fixture {
    fn new(name: &'static str, backend: Box<dyn Backend>, dir: Option<TempDir>) -> Self {
        Fixture {
            name,
            service: SettingsService::new(backend),
            _dir: dir,
        }
    }
}

pub fn memory() -> Fixture {
    Fixture::new("memory", Box::new(MemoryBackend::new()), None)
}

pub fn memory_strings() -> Fixture {
    Fixture::new("memory-strings", Box::new(MemoryBackend::string_only()), None)
}

pub fn files() -> Fixture {
    let dir = TempDir::new().unwrap();
    let backend = FileBackend::new(dir.path()).unwrap();
    Fixture::new("files", Box::new(backend), Some(dir))
}

pub fn json_file() -> Fixture {
    let dir = TempDir::new().unwrap();
    let backend = JsonFileBackend::open(dir.path().join("settings.json")).unwrap();
    Fixture::new("json-file", Box::new(backend), Some(dir))
}

/// One fixture per backend flavour.
pub fn fixtures() -> Vec<Fixture> {
    vec![memory(), memory_strings(), files(), json_file()]
}
