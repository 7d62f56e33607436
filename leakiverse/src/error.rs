//! The error surface of the leakage simulator.

use thiserror::Error;

/// Errors produced by channel construction, circuit parsing and execution.
///
/// Every failure aborts the operation that raised it; no partial state is
/// committed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LeakyError {
    /// A malformed request: bad channel arity, an unsupported measurement
    /// basis, a malformed `leaky<...>` tag, a channel index out of range, a
    /// circuit that exceeds the simulator capacity, or unparseable text.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Adding a transition would push an initial status's cumulative
    /// probability above 1.
    #[error(
        "probability overflow: adding {probability} to initial status {initial_status} \
         brings the cumulative probability to {cumulative}"
    )]
    ProbabilityOverflow {
        initial_status: String,
        probability: f64,
        cumulative: f64,
    },

    /// A channel failed its safety check: a non-normalised row, or a
    /// non-identity Pauli attached to a qubit that does not stay in the
    /// computational subspace.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),
}

impl LeakyError {
    pub(crate) fn invalid_argument(message: impl Into<String>) -> Self {
        LeakyError::InvalidArgument(message.into())
    }

    pub(crate) fn invariant_violation(message: impl Into<String>) -> Self {
        LeakyError::InvariantViolation(message.into())
    }
}
