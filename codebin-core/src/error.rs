/// Errors produced by the `codebin-core` crate.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum CoreError {
    /// A snippet id was the empty string.
    #[error("snippet id must not be empty")]
    EmptySnippetId,

    /// A namespace name failed validation.
    #[error("invalid namespace '{name}': {reason}")]
    InvalidNamespace { name: String, reason: String },
}
