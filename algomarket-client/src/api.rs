//! Moderation API abstraction trait.
//!
//! The workflow manager talks to the backend only through
//! [`ModerationApi`], so tests and alternative transports can stand in for
//! the HTTP implementation.

use async_trait::async_trait;

use algomarket_core::{AlgorithmId, DecisionRequest, ModeratedAlgorithm, NewAlgorithm, SubmissionForm};

use crate::error::{ModerationError, Operation};
use crate::ApiError;

/// Which subset of algorithms a load targets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Scope {
    /// Only algorithms awaiting a verdict.
    #[default]
    PendingOnly,
    /// Every algorithm, whatever its status.
    All,
}

/// Remote collaborator that stores algorithms and accepts verdicts.
///
/// Implementations must be `Send + Sync` to allow use across async tasks.
#[async_trait]
pub trait ModerationApi: Send + Sync {
    /// Fetch the algorithms in `scope`, in backend order.
    ///
    /// # Errors
    /// Returns [`ApiError::Status`] for non-success responses and
    /// [`ApiError::Transport`] / [`ApiError::Timeout`] when the backend is unreachable.
    async fn list(&self, scope: Scope) -> Result<Vec<ModeratedAlgorithm>, ApiError>;

    /// Record a verdict for one algorithm. The response body is ignored.
    ///
    /// # Errors
    /// Same classes as [`ModerationApi::list`].
    async fn moderate(&self, id: &AlgorithmId, request: &DecisionRequest) -> Result<(), ApiError>;

    /// Submit a new algorithm; the backend stores it as pending.
    ///
    /// # Errors
    /// Same classes as [`ModerationApi::list`].
    async fn submit(&self, algorithm: &NewAlgorithm) -> Result<ModeratedAlgorithm, ApiError>;
}

/// Validate `form` and submit it. The backend stores the result as pending.
///
/// # Errors
/// Returns [`ModerationError::Validation`] without contacting the backend if
/// the form is invalid, or the classified backend failure.
pub async fn submit_form<A: ModerationApi + ?Sized>(
    api: &A,
    form: &SubmissionForm,
) -> Result<ModeratedAlgorithm, ModerationError> {
    let algorithm = form.validate()?;
    match api.submit(&algorithm).await {
        Ok(created) => {
            tracing::info!(algorithm = %created.id, title = %created.title, "algorithm submitted for moderation");
            Ok(created)
        }
        Err(e) => {
            tracing::warn!(error = %e, "algorithm submission failed");
            Err(ModerationError::classify(&e, Operation::Submit))
        }
    }
}
