use std::fmt;

use serde::{Deserialize, Serialize};

use crate::id::SnippetId;

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// A stored source snippet.
///
/// Snippets are write-once: a later save at the same id replaces the whole
/// record, including `created_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct Snippet {
    /// Key of the snippet within its namespace.
    pub id: SnippetId,
    /// Source text, stored verbatim.
    #[serde(rename = "code")]
    pub content: String,
    /// Creation time in milliseconds since the Unix epoch.
    #[serde(rename = "timestamp")]
    pub created_at: i64,
}

impl Snippet {
    /// Create a snippet stamped with `created_at` (ms since epoch).
    #[must_use]
    pub fn new(id: SnippetId, content: impl Into<String>, created_at: i64) -> Self {
        Self { id, content: content.into(), created_at }
    }

    /// Age of the snippet at `now`, in milliseconds.
    ///
    /// A `created_at` in the future counts as age zero.
    #[must_use]
    pub fn age_at(&self, now: i64) -> i64 {
        now.saturating_sub(self.created_at).max(0)
    }
}

/// Retention window after which a snippet is expired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ttl(i64);

impl Ttl {
    /// 30 days.
    pub const DEFAULT: Ttl = Ttl(30 * MILLIS_PER_DAY);

    /// A TTL of `millis` milliseconds. Negative values clamp to zero.
    #[must_use]
    pub const fn from_millis(millis: i64) -> Self {
        if millis < 0 {
            Self(0)
        } else {
            Self(millis)
        }
    }

    /// A TTL of whole days, saturating on overflow.
    #[must_use]
    pub fn from_days(days: u32) -> Self {
        Self(i64::from(days).saturating_mul(MILLIS_PER_DAY))
    }

    /// The window in milliseconds.
    #[must_use]
    pub const fn as_millis(self) -> i64 {
        self.0
    }

    /// `true` when `now - created_at > ttl`.
    ///
    /// An entry exactly `ttl` old is still live.
    #[must_use]
    pub fn is_expired(self, snippet: &Snippet, now: i64) -> bool {
        snippet.age_at(now) > self.0
    }
}

impl Default for Ttl {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for Ttl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}
