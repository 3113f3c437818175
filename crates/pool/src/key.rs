//! Consumer keys.
//!
//! A [`PlayerKey`] names the consumer a pooled player is bound to (a list
//! item, a feed entry). Keys are never empty: an empty key is how a handle
//! reports "unbound", so the type rules it out at construction.

use std::borrow::Borrow;
use std::fmt;

use crate::error::{Error, Result};

/// Non-empty consumer key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "String", into = "String"))]
pub struct PlayerKey(String);

impl PlayerKey {
    /// Create a key, rejecting empty input.
    pub fn new(key: impl Into<String>) -> Result<Self> {
        let key = key.into();
        if key.is_empty() {
            return Err(Error::invalid_argument("player key must not be empty"));
        }
        Ok(Self(key))
    }

    /// Borrow the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PlayerKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for PlayerKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for PlayerKey {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl TryFrom<&str> for PlayerKey {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        Self::new(value)
    }
}

impl From<PlayerKey> for String {
    fn from(key: PlayerKey) -> Self {
        key.0
    }
}
