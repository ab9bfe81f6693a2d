//! In-memory backend.

use std::collections::HashMap;

use typed_settings_backend::{Backend, BackendError, NativeKind, NativeValue};

use crate::check_key;

/// A backend holding everything in a map.
///
/// Writes and removals are staged until `commit`, but reads see staged
/// changes immediately. Native kinds are configurable so one type can stand
/// in for a rich preference store or a strings-only one.
///
/// # Example
///
/// ```rust
/// use typed_settings_stores::{Backend, MemoryBackend, NativeKind, NativeValue};
///
/// let mut backend = MemoryBackend::with_native_kinds(&[NativeKind::Bool]);
/// backend.put_native("enabled", NativeValue::Bool(true)).unwrap();
/// assert_eq!(backend.get_string("enabled").unwrap().as_deref(), Some("true"));
///
/// backend.commit().unwrap();
/// assert_eq!(backend.commit_count(), 1);
/// ```
#[derive(Clone, Debug)]
pub struct MemoryBackend {
    native_kinds: Vec<NativeKind>,
    committed: HashMap<String, NativeValue>,
    // None marks a staged removal
    pending: HashMap<String, Option<NativeValue>>,
    commits: usize,
}

impl MemoryBackend {
    /// A backend storing every native kind.
    pub fn new() -> Self {
        Self::with_native_kinds(&NativeKind::ALL)
    }

    /// A backend storing only strings natively.
    pub fn string_only() -> Self {
        Self::with_native_kinds(&[NativeKind::String])
    }

    pub fn with_native_kinds(kinds: &[NativeKind]) -> Self {
        let mut native_kinds = kinds.to_vec();
        if !native_kinds.contains(&NativeKind::String) {
            native_kinds.push(NativeKind::String);
        }
        MemoryBackend {
            native_kinds,
            committed: HashMap::new(),
            pending: HashMap::new(),
            commits: 0,
        }
    }

    /// Number of successful commits.
    pub fn commit_count(&self) -> usize {
        self.commits
    }

    /// Number of staged, uncommitted changes.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Drop staged changes.
    pub fn discard(&mut self) {
        self.pending.clear();
    }

    /// The committed value at `key`, ignoring staged changes.
    pub fn committed(&self, key: &str) -> Option<&NativeValue> {
        self.committed.get(key)
    }

    fn lookup(&self, key: &str) -> Option<&NativeValue> {
        match self.pending.get(key) {
            Some(staged) => staged.as_ref(),
            None => self.committed.get(key),
        }
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl Backend for MemoryBackend {
    fn native_kinds(&self) -> &[NativeKind] {
        &self.native_kinds
    }

    fn get_native(
        &mut self,
        key: &str,
        _kind: NativeKind,
    ) -> Result<Option<NativeValue>, BackendError> {
        check_key(key)?;
        Ok(self.lookup(key).cloned())
    }

    fn get_string(&mut self, key: &str) -> Result<Option<String>, BackendError> {
        check_key(key)?;
        Ok(self.lookup(key).map(NativeValue::to_canonical_string))
    }

    fn put_native(&mut self, key: &str, value: NativeValue) -> Result<(), BackendError> {
        check_key(key)?;
        let value = if self.is_native(value.kind()) {
            value
        } else {
            NativeValue::String(value.to_canonical_string())
        };
        self.pending.insert(key.to_string(), Some(value));
        Ok(())
    }

    fn put_string(&mut self, key: &str, value: &str) -> Result<(), BackendError> {
        check_key(key)?;
        self.pending
            .insert(key.to_string(), Some(NativeValue::String(value.to_string())));
        Ok(())
    }

    fn contains_key(&mut self, key: &str) -> Result<bool, BackendError> {
        check_key(key)?;
        Ok(self.lookup(key).is_some())
    }

    fn remove(&mut self, key: &str) -> Result<bool, BackendError> {
        check_key(key)?;
        let existed = self.lookup(key).is_some();
        self.pending.insert(key.to_string(), None);
        Ok(existed)
    }

    fn keys(&mut self) -> Result<Vec<String>, BackendError> {
        let mut keys: Vec<String> = self
            .committed
            .keys()
            .filter(|key| !self.pending.contains_key(*key))
            .cloned()
            .collect();
        keys.extend(
            self.pending
                .iter()
                .filter(|(_, staged)| staged.is_some())
                .map(|(key, _)| key.clone()),
        );
        Ok(keys)
    }

    fn commit(&mut self) -> Result<(), BackendError> {
        tracing::debug!(changes = self.pending.len(), "committing in-memory settings");
        for (key, staged) in self.pending.drain() {
            match staged {
                Some(value) => {
                    self.committed.insert(key, value);
                }
                None => {
                    self.committed.remove(&key);
                }
            }
        }
        self.commits += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_are_staged_until_commit() {
        let mut backend = MemoryBackend::new();
        backend.put_native("n", NativeValue::Int(1)).unwrap();

        assert_eq!(backend.get_native("n", NativeKind::Int).unwrap(), Some(NativeValue::Int(1)));
        assert_eq!(backend.committed("n"), None);
        assert_eq!(backend.pending_count(), 1);

        backend.commit().unwrap();
        assert_eq!(backend.committed("n"), Some(&NativeValue::Int(1)));
        assert_eq!(backend.pending_count(), 0);
    }

    #[test]
    fn discard_drops_staged_changes() {
        let mut backend = MemoryBackend::new();
        backend.put_string("s", "kept").unwrap();
        backend.commit().unwrap();

        backend.put_string("s", "dropped").unwrap();
        backend.discard();
        assert_eq!(backend.get_string("s").unwrap().as_deref(), Some("kept"));
    }

    #[test]
    fn non_native_values_are_stored_as_strings() {
        let mut backend = MemoryBackend::string_only();
        backend.put_native("n", NativeValue::Long(5)).unwrap();
        assert_eq!(
            backend.get_native("n", NativeKind::Long).unwrap(),
            Some(NativeValue::String("5".to_string()))
        );
    }

    #[test]
    fn get_returns_whatever_kind_is_stored() {
        let mut backend = MemoryBackend::new();
        backend.put_native("n", NativeValue::Int(999)).unwrap();
        assert_eq!(
            backend.get_native("n", NativeKind::Double).unwrap(),
            Some(NativeValue::Int(999))
        );
        assert_eq!(backend.get_string("n").unwrap().as_deref(), Some("999"));
    }

    #[test]
    fn remove_is_staged() {
        let mut backend = MemoryBackend::new();
        backend.put_string("k", "v").unwrap();
        backend.commit().unwrap();

        assert!(backend.remove("k").unwrap());
        assert!(!backend.contains_key("k").unwrap());
        assert!(backend.committed("k").is_some());

        backend.commit().unwrap();
        assert!(backend.committed("k").is_none());
        assert!(!backend.remove("k").unwrap());
    }

    #[test]
    fn keys_merge_staged_changes() {
        let mut backend = MemoryBackend::new();
        backend.put_string("a", "1").unwrap();
        backend.put_string("b", "2").unwrap();
        backend.commit().unwrap();

        backend.remove("a").unwrap();
        backend.put_string("c", "3").unwrap();

        let mut keys = backend.keys().unwrap();
        keys.sort();
        assert_eq!(keys, vec!["b", "c"]);
    }

    #[test]
    fn empty_key_is_rejected() {
        let mut backend = MemoryBackend::new();
        assert!(matches!(
            backend.put_string("", "v"),
            Err(BackendError::InvalidKey { .. })
        ));
    }

    #[test]
    fn string_is_always_native() {
        let backend = MemoryBackend::with_native_kinds(&[NativeKind::Bool]);
        assert!(backend.is_native(NativeKind::String));
        assert!(backend.is_native(NativeKind::Bool));
        assert!(!backend.is_native(NativeKind::Int));
    }

    #[test]
    fn commits_are_counted() {
        let mut backend = MemoryBackend::new();
        backend.commit().unwrap();
        backend.commit().unwrap();
        assert_eq!(backend.commit_count(), 2);
    }
}
