//! Validated setting keys.

use std::fmt;
use std::str::FromStr;

/// Maximum key length, in characters.
pub const MAX_KEY_LENGTH: usize = 255;

/// Errors related to key validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyError {
    /// The key is the empty string.
    #[error("key must not be empty")]
    Empty,
    /// The key exceeds `MAX_KEY_LENGTH` characters.
    #[error("key is {length} characters long, maximum is {max}")]
    TooLong { length: usize, max: usize },
}

/// A validated settings key.
///
/// Keys are flat: no hierarchy, no reserved characters. The only rules are
/// that a key is non-empty and at most 255 characters (Unicode scalar
/// values, not bytes).
///
/// ```rust
/// use typed_settings::Key;
///
/// let key = Key::new("window.width").unwrap();
/// assert_eq!(key.as_str(), "window.width");
///
/// assert!(Key::new("").is_err());
/// assert!(Key::new("x".repeat(256)).is_err());
/// ```
#[derive(Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Key(String);

impl Key {
    /// Validate and wrap a key.
    pub fn new(key: impl Into<String>) -> Result<Self, KeyError> {
        let key = key.into();
        Self::validate(&key)?;
        Ok(Key(key))
    }

    /// Check a key without taking ownership.
    pub fn validate(key: &str) -> Result<(), KeyError> {
        if key.is_empty() {
            return Err(KeyError::Empty);
        }

        let length = key.chars().count();
        if length > MAX_KEY_LENGTH {
            return Err(KeyError::TooLong {
                length,
                max: MAX_KEY_LENGTH,
            });
        }

        Ok(())
    }

    /// Wrap a key produced internally that is known to be valid.
    pub(crate) fn from_generated(key: String) -> Self {
        debug_assert!(Self::validate(&key).is_ok());
        Key(key)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Key {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for Key {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Key::new(s)
    }
}

impl TryFrom<String> for Key {
    type Error = KeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Key::new(value)
    }
}

impl TryFrom<&str> for Key {
    type Error = KeyError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Key::new(value)
    }
}
