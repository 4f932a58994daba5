//! Error types for context values.
//!
//! Looking up a value is total: absence is reported through `Option` or a
//! `(value, found)` pair. [`MissingValue`] exists for callers which treat
//! absence as an error and want to propagate it with `?`.

use std::{error::Error as StdError, fmt};

use crate::key::Key;

/// Alias for a type-erased error type.
pub type BoxError = Box<dyn StdError + Send + Sync>;

/// No value was bound for the requested [`Key`].
///
/// This covers a value that was never stored, a value that was hidden,
/// and a binding whose value is not of the requested type.
#[derive(Debug, Clone)]
pub struct MissingValue {
    key: Key,
}

impl MissingValue {
    pub(crate) fn new(key: Key) -> Self {
        Self { key }
    }

    /// The [`Key`] for which no value was found.
    #[must_use]
    pub fn key(&self) -> &Key {
        &self.key
    }

    /// Convert this error into a [`BoxError`].
    #[must_use]
    pub fn into_box_error(self) -> BoxError {
        Box::new(self)
    }
}

impl fmt::Display for MissingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "missing context value of type {}", self.key)
    }
}

impl StdError for MissingValue {}
