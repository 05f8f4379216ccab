//! Error types surfaced by host collaborators.

use thiserror::Error;

/// Failure reported by a host persistence call.
///
/// The audit layer never produces these itself; the interceptor decorator
/// passes them through from the wrapped persistence implementation
/// untouched.
#[derive(Error, Debug)]
pub enum HostError {
    /// The underlying persistence operation failed.
    #[error("persistence failure: {0}")]
    Persistence(String),

    /// The host rejected the mutation payload.
    #[error("invalid mutation: {0}")]
    InvalidMutation(String),
}

impl HostError {
    /// Create a new persistence failure.
    pub fn persistence(msg: impl Into<String>) -> Self {
        Self::Persistence(msg.into())
    }
}
