use crate::id::AlgorithmId;
use crate::status::AlgorithmStatus;

/// Errors produced by the `algomarket-core` crate.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum CoreError {
    /// A rejection was requested without a usable reason.
    #[error("rejection reason must not be empty")]
    EmptyRejectionReason,

    /// A verdict was applied to an algorithm that already left `pending`.
    #[error("algorithm {id} was already moderated (status: {status})")]
    AlreadyModerated { id: AlgorithmId, status: AlgorithmStatus },

    /// A record received from the backend violates the moderation invariants.
    #[error("inconsistent record for algorithm {id}: {reason}")]
    InconsistentRecord { id: AlgorithmId, reason: String },

    /// A submission form field failed validation.
    #[error("submission validation failed for field '{field}': {reason}")]
    InvalidSubmission { field: &'static str, reason: String },
}
