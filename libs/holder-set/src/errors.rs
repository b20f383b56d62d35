//! Error types for holder resolution

use std::time::Duration;

/// Typed failure of a holder query.
///
/// No variant is ever produced for an empty result: zero holders is returned
/// as an empty [`crate::HolderSet`].
#[derive(Debug)]
pub enum ResolverError {
    /// Contract identifier is not `0x` followed by 40 hex digits
    InvalidAddress { input: String, reason: String },
    /// Event retrieval or decoding failed
    FetchError(String),
    /// A read-only contract call failed or returned an unexpected value
    CallError { method: String, reason: String },
    /// A remote call did not complete within the configured timeout
    Timeout { operation: String, after: Duration },
    /// The query was cancelled through the resolver's cancellation token
    Cancelled,
    /// The selected strategy needs a capability that was not supplied
    MissingCapability(&'static str),
}

impl std::fmt::Display for ResolverError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolverError::InvalidAddress { input, reason } => {
                write!(f, "Invalid address '{}': {}", input, reason)
            }
            ResolverError::FetchError(msg) => write!(f, "Failed to fetch events: {}", msg),
            ResolverError::CallError { method, reason } => {
                write!(f, "Call to {} failed: {}", method, reason)
            }
            ResolverError::Timeout { operation, after } => {
                write!(f, "{} timed out after {:?}", operation, after)
            }
            ResolverError::Cancelled => write!(f, "Query cancelled"),
            ResolverError::MissingCapability(name) => {
                write!(f, "No {} configured for the selected strategy", name)
            }
        }
    }
}

impl std::error::Error for ResolverError {}

impl ResolverError {
    pub(crate) fn call(method: &str, reason: impl std::fmt::Display) -> Self {
        ResolverError::CallError {
            method: method.to_string(),
            reason: reason.to_string(),
        }
    }
}
