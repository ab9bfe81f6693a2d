//! One file per key.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use typed_settings_backend::{Backend, BackendError, NativeKind, NativeValue};

use crate::check_key;

/// Longest file name most filesystems accept, in bytes.
const MAX_FILE_NAME: usize = 255;

const TEMP_PREFIX: &str = ".pending-";

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// A backend storing each key's value in its own file.
///
/// Only strings are native. Keys become file names: ASCII letters, digits,
/// `_`, `-` and non-leading `.` are kept, every other byte is written as
/// `%XX`. Writes are staged in memory and flushed on `commit`, each file
/// through a temporary file and a rename.
#[derive(Debug)]
pub struct FileBackend {
    root: PathBuf,
    // None marks a staged removal
    pending: BTreeMap<String, Option<String>>,
}

impl FileBackend {
    /// Open (creating if needed) a store rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Result<FileBackend, BackendError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| {
            BackendError::unavailable(format!(
                "cannot create settings directory {}: {}",
                root.display(),
                e
            ))
        })?;

        let attr = fs::metadata(&root)?;
        if !attr.is_dir() {
            return Err(BackendError::unavailable(format!(
                "settings root {} is not a directory",
                root.display()
            )));
        }
        if attr.permissions().readonly() {
            return Err(BackendError::unavailable(format!(
                "settings root {} is not writable",
                root.display()
            )));
        }

        let root = root.canonicalize()?;
        tracing::debug!(root = %root.display(), "opened file settings store");
        Ok(FileBackend {
            root,
            pending: BTreeMap::new(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn file_path(&self, key: &str) -> Result<PathBuf, BackendError> {
        check_key(key)?;
        let name = escape_key(key);
        if name.len() > MAX_FILE_NAME {
            return Err(BackendError::InvalidKey {
                key: key.to_string(),
                message: format!(
                    "escaped file name is {} bytes, maximum is {}",
                    name.len(),
                    MAX_FILE_NAME
                ),
            });
        }
        Ok(self.root.join(name))
    }

    fn read_file(&self, key: &str) -> Result<Option<String>, BackendError> {
        let path = self.file_path(key)?;
        tracing::debug!(path = %path.display(), "reading setting");
        match fs::read_to_string(&path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn flush(&self, key: &str, value: Option<&str>) -> Result<(), BackendError> {
        let path = self.file_path(key)?;
        match value {
            Some(text) => {
                let temp = self.root.join(format!(
                    "{}{}-{}",
                    TEMP_PREFIX,
                    std::process::id(),
                    TEMP_COUNTER.fetch_add(1, Ordering::Relaxed)
                ));
                tracing::debug!(path = %path.display(), "writing setting");
                fs::write(&temp, text)?;
                if let Err(e) = fs::rename(&temp, &path) {
                    let _ = fs::remove_file(&temp);
                    return Err(e.into());
                }
            }
            None => {
                tracing::debug!(path = %path.display(), "removing setting");
                match fs::remove_file(&path) {
                    Ok(()) => {}
                    Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                    Err(e) => return Err(e.into()),
                }
            }
        }
        Ok(())
    }
}

impl Backend for FileBackend {
    fn native_kinds(&self) -> &[NativeKind] {
        &[NativeKind::String]
    }

    fn get_native(
        &mut self,
        key: &str,
        _kind: NativeKind,
    ) -> Result<Option<NativeValue>, BackendError> {
        Ok(self.get_string(key)?.map(NativeValue::String))
    }

    fn get_string(&mut self, key: &str) -> Result<Option<String>, BackendError> {
        if let Some(staged) = self.pending.get(key) {
            return Ok(staged.clone());
        }
        self.read_file(key)
    }

    fn put_native(&mut self, key: &str, value: NativeValue) -> Result<(), BackendError> {
        self.put_string(key, &value.to_canonical_string())
    }

    fn put_string(&mut self, key: &str, value: &str) -> Result<(), BackendError> {
        // fail on unrepresentable keys now rather than at commit
        self.file_path(key)?;
        self.pending.insert(key.to_string(), Some(value.to_string()));
        Ok(())
    }

    fn contains_key(&mut self, key: &str) -> Result<bool, BackendError> {
        Ok(self.get_string(key)?.is_some())
    }

    fn remove(&mut self, key: &str) -> Result<bool, BackendError> {
        let existed = self.contains_key(key)?;
        self.pending.insert(key.to_string(), None);
        Ok(existed)
    }

    fn keys(&mut self) -> Result<Vec<String>, BackendError> {
        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            if name.starts_with('.') {
                continue;
            }
            match unescape_key(name) {
                Some(key) if !self.pending.contains_key(&key) => keys.push(key),
                Some(_) => {}
                None => tracing::debug!(name, "skipping foreign file in settings directory"),
            }
        }
        keys.extend(
            self.pending
                .iter()
                .filter(|(_, staged)| staged.is_some())
                .map(|(key, _)| key.clone()),
        );
        Ok(keys)
    }

    fn commit(&mut self) -> Result<(), BackendError> {
        while let Some((key, value)) = self.pending.pop_first() {
            if let Err(e) = self.flush(&key, value.as_deref()) {
                self.pending.insert(key, value);
                return Err(e);
            }
        }
        Ok(())
    }
}

fn is_plain(byte: u8, first: bool) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_' || byte == b'-' || (byte == b'.' && !first)
}

fn escape_key(key: &str) -> String {
    let mut name = String::with_capacity(key.len());
    for (i, byte) in key.bytes().enumerate() {
        if is_plain(byte, i == 0) {
            name.push(char::from(byte));
        } else {
            name.push_str(&format!("%{:02X}", byte));
        }
    }
    name
}

fn unescape_key(name: &str) -> Option<String> {
    let bytes = name.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = name.get(i + 1..i + 3)?;
            out.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).ok()
}
