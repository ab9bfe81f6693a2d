//! Every key in one JSON document.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use typed_settings_backend::{Backend, BackendError, NativeKind, NativeValue};

use crate::check_key;

/// A backend keeping all settings in a single JSON file.
///
/// Every native kind is stored as-is, tagged so an integer and a double
/// with the same value stay distinct:
///
/// ```json
/// {
///   "age": { "kind": "int", "value": 42 },
///   "ratio": { "kind": "float", "value": 3.14 }
/// }
/// ```
///
/// The document is loaded when the backend opens. `commit` rewrites the
/// whole file through a temporary sibling and a rename.
#[derive(Debug)]
pub struct JsonFileBackend {
    path: PathBuf,
    values: BTreeMap<String, NativeValue>,
    dirty: bool,
}

impl JsonFileBackend {
    /// Open the document at `path`. A missing file is an empty store; a
    /// file that is not a settings document is an error.
    pub fn open(path: impl Into<PathBuf>) -> Result<JsonFileBackend, BackendError> {
        let path = path.into();
        let values = load(&path)?;
        tracing::debug!(path = %path.display(), count = values.len(), "opened JSON settings file");
        Ok(JsonFileBackend {
            path,
            values,
            dirty: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Re-read the file, dropping uncommitted changes.
    pub fn reload(&mut self) -> Result<(), BackendError> {
        self.values = load(&self.path)?;
        self.dirty = false;
        Ok(())
    }

    /// Whether there are uncommitted changes.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }
}

fn load(path: &Path) -> Result<BTreeMap<String, NativeValue>, BackendError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
        Err(e) => return Err(e.into()),
    };
    if text.trim().is_empty() {
        return Ok(BTreeMap::new());
    }
    serde_json::from_str(&text).map_err(|e| {
        BackendError::unavailable(format!(
            "{} is not a settings document: {}",
            path.display(),
            e
        ))
    })
}

impl Backend for JsonFileBackend {
    fn native_kinds(&self) -> &[NativeKind] {
        &NativeKind::ALL
    }

    fn get_native(
        &mut self,
        key: &str,
        _kind: NativeKind,
    ) -> Result<Option<NativeValue>, BackendError> {
        check_key(key)?;
        Ok(self.values.get(key).cloned())
    }

    fn get_string(&mut self, key: &str) -> Result<Option<String>, BackendError> {
        check_key(key)?;
        Ok(self.values.get(key).map(NativeValue::to_canonical_string))
    }

    fn put_native(&mut self, key: &str, value: NativeValue) -> Result<(), BackendError> {
        check_key(key)?;
        // JSON has no NaN or infinity
        let value = match value {
            NativeValue::Float(f) if !f.is_finite() => NativeValue::String(f.to_string()),
            NativeValue::Double(d) if !d.is_finite() => NativeValue::String(d.to_string()),
            other => other,
        };
        self.values.insert(key.to_string(), value);
        self.dirty = true;
        Ok(())
    }

    fn put_string(&mut self, key: &str, value: &str) -> Result<(), BackendError> {
        self.put_native(key, NativeValue::String(value.to_string()))
    }

    fn contains_key(&mut self, key: &str) -> Result<bool, BackendError> {
        check_key(key)?;
        Ok(self.values.contains_key(key))
    }

    fn remove(&mut self, key: &str) -> Result<bool, BackendError> {
        check_key(key)?;
        let existed = self.values.remove(key).is_some();
        self.dirty |= existed;
        Ok(existed)
    }

    fn keys(&mut self) -> Result<Vec<String>, BackendError> {
        Ok(self.values.keys().cloned().collect())
    }

    fn commit(&mut self) -> Result<(), BackendError> {
        if !self.dirty {
            return Ok(());
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let text = serde_json::to_string_pretty(&self.values)
            .map_err(|e| BackendError::Unavailable(Box::new(e)))?;

        let mut temp = self.path.clone().into_os_string();
        temp.push(".tmp");
        let temp = PathBuf::from(temp);

        tracing::debug!(path = %self.path.display(), "writing JSON settings file");
        fs::write(&temp, text)?;
        if let Err(e) = fs::rename(&temp, &self.path) {
            let _ = fs::remove_file(&temp);
            return Err(e.into());
        }

        self.dirty = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store() -> (TempDir, JsonFileBackend) {
        let dir = TempDir::new().unwrap();
        let backend = JsonFileBackend::open(dir.path().join("settings.json")).unwrap();
        (dir, backend)
    }

    #[test]
    fn missing_file_is_empty() {
        let (_dir, mut backend) = store();
        assert!(backend.keys().unwrap().is_empty());
        assert_eq!(backend.get_string("any").unwrap(), None);
    }

    #[test]
    fn kinds_survive_reopen() {
        let (dir, mut backend) = store();
        backend.put_native("int", NativeValue::Int(1)).unwrap();
        backend.put_native("double", NativeValue::Double(1.0)).unwrap();
        backend.put_native("flag", NativeValue::Bool(true)).unwrap();
        backend.put_string("name", "ada").unwrap();
        backend.commit().unwrap();

        let mut reopened = JsonFileBackend::open(dir.path().join("settings.json")).unwrap();
        assert_eq!(
            reopened.get_native("int", NativeKind::Int).unwrap(),
            Some(NativeValue::Int(1))
        );
        assert_eq!(
            reopened.get_native("double", NativeKind::Double).unwrap(),
            Some(NativeValue::Double(1.0))
        );
        assert_eq!(
            reopened.get_native("flag", NativeKind::Bool).unwrap(),
            Some(NativeValue::Bool(true))
        );
        assert_eq!(reopened.get_string("name").unwrap().as_deref(), Some("ada"));
    }

    #[test]
    fn file_uses_tagged_values() {
        let (dir, mut backend) = store();
        backend.put_native("age", NativeValue::Int(42)).unwrap();
        backend.commit().unwrap();

        let text = fs::read_to_string(dir.path().join("settings.json")).unwrap();
        let document: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(document["age"]["kind"], "int");
        assert_eq!(document["age"]["value"], 42);
    }

    #[test]
    fn uncommitted_changes_are_lost_on_reload() {
        let (_dir, mut backend) = store();
        backend.put_string("k", "v").unwrap();
        assert!(backend.is_dirty());

        backend.reload().unwrap();
        assert!(!backend.is_dirty());
        assert!(!backend.contains_key("k").unwrap());
    }

    #[test]
    fn remove_then_commit() {
        let (dir, mut backend) = store();
        backend.put_string("k", "v").unwrap();
        backend.commit().unwrap();

        assert!(backend.remove("k").unwrap());
        backend.commit().unwrap();

        let mut reopened = JsonFileBackend::open(dir.path().join("settings.json")).unwrap();
        assert!(!reopened.contains_key("k").unwrap());
    }

    #[test]
    fn non_finite_floats_are_stored_as_strings() {
        let (dir, mut backend) = store();
        backend.put_native("nan", NativeValue::Double(f64::NAN)).unwrap();
        backend.put_native("inf", NativeValue::Float(f32::INFINITY)).unwrap();
        backend.commit().unwrap();

        let mut reopened = JsonFileBackend::open(dir.path().join("settings.json")).unwrap();
        assert_eq!(reopened.get_string("nan").unwrap().as_deref(), Some("NaN"));
        assert_eq!(reopened.get_string("inf").unwrap().as_deref(), Some("inf"));
    }

    #[test]
    fn corrupt_file_is_unavailable() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            JsonFileBackend::open(&path),
            Err(BackendError::Unavailable(_))
        ));
    }

    #[test]
    fn commit_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let mut backend = JsonFileBackend::open(&path).unwrap();
        backend.put_string("k", "v").unwrap();
        backend.commit().unwrap();
        assert!(path.exists());
        assert!(!dir.path().join("nested").join("settings.json.tmp").exists());
    }
}
