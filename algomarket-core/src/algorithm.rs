use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::id::AlgorithmId;
use crate::status::{AlgorithmStatus, Decision};

/// A submitted algorithm as seen by the moderation workflow.
///
/// Field names follow the backend's JSON representation, including the
/// camel-cased `createdAt`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeratedAlgorithm {
    /// Backend-assigned identifier.
    pub id: AlgorithmId,
    pub title: String,
    pub description: String,
    /// Display name of the submitter.
    pub author_name: String,
    /// Tags in display order. Duplicates are allowed.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Source text. Only its length is shown to moderators.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub status: AlgorithmStatus,
    /// Present only when `status` is `Rejected`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    /// Who issued the verdict. Absent while pending.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub moderated_by: Option<String>,
    /// When the verdict was issued. Absent while pending.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub moderated_at: Option<DateTime<Utc>>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl ModeratedAlgorithm {
    /// Creates a freshly submitted, pending algorithm.
    #[must_use]
    pub fn pending(
        id: AlgorithmId,
        title: impl Into<String>,
        description: impl Into<String>,
        author_name: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            description: description.into(),
            author_name: author_name.into(),
            tags: Vec::new(),
            code: None,
            status: AlgorithmStatus::Pending,
            rejection_reason: None,
            moderated_by: None,
            moderated_at: None,
            created_at,
        }
    }

    /// Returns `true` while the algorithm awaits a verdict.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.status == AlgorithmStatus::Pending
    }

    /// Length of the source text in characters, `0` when absent.
    #[must_use]
    pub fn code_len(&self) -> usize {
        self.code.as_deref().map_or(0, |c| c.chars().count())
    }

    /// Moves the algorithm out of `pending` according to `decision`.
    ///
    /// Sets `moderated_by` and `moderated_at`; on rejection also records the reason.
    /// The record is left untouched on error.
    ///
    /// # Errors
    /// Returns [`CoreError::AlreadyModerated`] if the algorithm is not pending.
    pub fn apply(
        &mut self,
        decision: &Decision,
        moderator: impl Into<String>,
        at: DateTime<Utc>,
    ) -> Result<(), CoreError> {
        if self.status.is_terminal() {
            return Err(CoreError::AlreadyModerated {
                id: self.id.clone(),
                status: self.status,
            });
        }
        self.status = decision.verdict().into();
        self.rejection_reason = decision.reason().map(|r| r.as_str().to_owned());
        self.moderated_by = Some(moderator.into());
        self.moderated_at = Some(at);
        Ok(())
    }

    /// Verifies the status-dependent fields are consistent.
    ///
    /// # Errors
    /// Returns [`CoreError::InconsistentRecord`] describing the first violation found.
    pub fn check_invariants(&self) -> Result<(), CoreError> {
        let violation = match self.status {
            AlgorithmStatus::Pending
                if self.moderated_by.is_some() || self.moderated_at.is_some() =>
            {
                Some("pending algorithm carries moderation metadata")
            }
            AlgorithmStatus::Rejected
                if self.rejection_reason.as_deref().is_none_or(|r| r.trim().is_empty()) =>
            {
                Some("rejected algorithm has no rejection reason")
            }
            AlgorithmStatus::Approved | AlgorithmStatus::Rejected
                if self.moderated_by.is_none() || self.moderated_at.is_none() =>
            {
                Some("moderated algorithm is missing moderator or timestamp")
            }
            _ => None,
        };
        match violation {
            Some(reason) => Err(CoreError::InconsistentRecord {
                id: self.id.clone(),
                reason: reason.to_owned(),
            }),
            None => Ok(()),
        }
    }
}

/// A public catalog entry, as listed on the marketplace home page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Algorithm {
    pub id: AlgorithmId,
    pub title: String,
    pub description: String,
    /// Display name of the author.
    pub author: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub is_paid: bool,
    /// Price in whole currency units; absent for free algorithms.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub language: String,
    pub compiler: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
