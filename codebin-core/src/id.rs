use std::fmt;

use serde::{Deserialize, Serialize};

use crate::CoreError;

/// Caller-supplied identifier of a snippet, unique within its namespace.
///
/// The id is opaque: any non-empty string is accepted verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SnippetId(String);

impl SnippetId {
    /// Creates a `SnippetId` from any string-like value.
    ///
    /// # Errors
    /// Returns [`CoreError::EmptySnippetId`] if the id is empty.
    pub fn new(id: impl Into<String>) -> Result<Self, CoreError> {
        let id = id.into();
        if id.is_empty() {
            return Err(CoreError::EmptySnippetId);
        }
        Ok(Self(id))
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SnippetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SnippetId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for SnippetId {
    type Error = CoreError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl TryFrom<&str> for SnippetId {
    type Error = CoreError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<SnippetId> for String {
    fn from(id: SnippetId) -> Self {
        id.0
    }
}

/// First segment of a two-level store key `(namespace, id)`.
///
/// Namespace names double as directory names in the file backend, so they
/// may not contain path separators or `..`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Namespace(String);

impl Namespace {
    /// Name of the namespace every snippet lives under.
    pub const CODES: &'static str = "codes";

    /// Creates a validated namespace.
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidNamespace`] if the name is empty or
    /// contains `/`, `\` or `..`.
    pub fn new(name: impl Into<String>) -> Result<Self, CoreError> {
        let name = name.into();
        let reason = if name.is_empty() {
            Some("must not be empty")
        } else if name.contains('/') || name.contains('\\') {
            Some("must not contain path separators")
        } else if name.contains("..") {
            Some("must not contain '..'")
        } else {
            None
        };
        match reason {
            Some(reason) => Err(CoreError::InvalidNamespace { name, reason: reason.to_owned() }),
            None => Ok(Self(name)),
        }
    }

    /// The fixed `"codes"` namespace used for snippets.
    #[must_use]
    pub fn codes() -> Self {
        Self(Self::CODES.to_owned())
    }

    /// Returns the namespace name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Namespace {
    fn default() -> Self {
        Self::codes()
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Namespace {
    type Error = CoreError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<Namespace> for String {
    fn from(ns: Namespace) -> Self {
        ns.0
    }
}
