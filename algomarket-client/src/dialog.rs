//! The decision dialog shown when a moderator acts on one algorithm.

use algomarket_core::{CoreError, ModeratedAlgorithm, Verdict};

use crate::api::ModerationApi;
use crate::error::ModerationError;
use crate::workflow::ModerationWorkflow;

/// An open decision dialog for one pending algorithm.
///
/// The dialog is an owned value: a failed [`submit`](Self::submit) hands it
/// back unchanged so the moderator can retry, a successful one consumes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecisionDialog {
    algorithm: ModeratedAlgorithm,
    reason: String,
}

impl DecisionDialog {
    /// Open a dialog for `algorithm` with an empty reason.
    ///
    /// # Errors
    /// Returns [`CoreError::AlreadyModerated`] if the algorithm is not pending.
    pub fn open(algorithm: ModeratedAlgorithm) -> Result<Self, CoreError> {
        if !algorithm.is_pending() {
            return Err(CoreError::AlreadyModerated {
                id: algorithm.id.clone(),
                status: algorithm.status,
            });
        }
        Ok(Self { algorithm, reason: String::new() })
    }

    #[must_use]
    pub fn algorithm(&self) -> &ModeratedAlgorithm {
        &self.algorithm
    }

    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn set_reason(&mut self, text: impl Into<String>) {
        self.reason = text.into();
    }

    /// Whether the reject action is enabled: the reason must not be blank.
    #[must_use]
    pub fn can_reject(&self) -> bool {
        !self.reason.trim().is_empty()
    }

    /// Send `verdict` for the selected algorithm through `workflow`.
    ///
    /// The typed reason is sent only when rejecting.
    ///
    /// # Errors
    /// Returns the dialog, still open, together with the workflow error.
    pub async fn submit<A: ModerationApi>(
        self,
        workflow: &ModerationWorkflow<A>,
        verdict: Verdict,
    ) -> Result<(), (Self, ModerationError)> {
        let reason = match verdict {
            Verdict::Approved => None,
            Verdict::Rejected => Some(self.reason.as_str()),
        };
        let result = workflow.decide(&self.algorithm.id, verdict, reason).await;
        match result {
            Ok(()) => Ok(()),
            Err(e) => Err((self, e)),
        }
    }
}
