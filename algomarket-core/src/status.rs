use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Position of an algorithm in the moderation lifecycle.
///
/// `Pending` is the only non-terminal state; an algorithm leaves it exactly
/// once, through a [`Decision`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlgorithmStatus {
    /// Submitted and waiting for a moderator.
    Pending,
    /// Accepted into the public catalog.
    Approved,
    /// Refused, with a recorded reason.
    Rejected,
}

impl AlgorithmStatus {
    /// Returns `true` for `Approved` and `Rejected`.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Wire spelling of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for AlgorithmStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A moderator's terminal decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Approved,
    Rejected,
}

impl From<Verdict> for AlgorithmStatus {
    fn from(verdict: Verdict) -> Self {
        match verdict {
            Verdict::Approved => Self::Approved,
            Verdict::Rejected => Self::Rejected,
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        AlgorithmStatus::from(*self).fmt(f)
    }
}

/// A non-blank explanation attached to a rejection.
///
/// Surrounding whitespace is trimmed on construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct RejectionReason(String);

impl RejectionReason {
    /// Creates a reason from user input.
    ///
    /// # Errors
    /// Returns [`CoreError::EmptyRejectionReason`] if `text` is empty or whitespace only.
    pub fn new(text: impl AsRef<str>) -> Result<Self, CoreError> {
        let trimmed = text.as_ref().trim();
        if trimmed.is_empty() {
            return Err(CoreError::EmptyRejectionReason);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the reason text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A validated verdict, ready to be sent to the backend or applied to a record.
///
/// A rejection cannot be constructed without a [`RejectionReason`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Approve,
    Reject(RejectionReason),
}

impl Decision {
    /// Builds a decision from a verdict and the optional reason typed by the moderator.
    ///
    /// The reason is ignored when approving.
    ///
    /// # Errors
    /// Returns [`CoreError::EmptyRejectionReason`] when rejecting without a non-blank reason.
    pub fn new(verdict: Verdict, reason: Option<&str>) -> Result<Self, CoreError> {
        match verdict {
            Verdict::Approved => Ok(Self::Approve),
            Verdict::Rejected => RejectionReason::new(reason.unwrap_or_default()).map(Self::Reject),
        }
    }

    /// The verdict this decision carries.
    #[must_use]
    pub fn verdict(&self) -> Verdict {
        match self {
            Self::Approve => Verdict::Approved,
            Self::Reject(_) => Verdict::Rejected,
        }
    }

    /// The rejection reason, if any.
    #[must_use]
    pub fn reason(&self) -> Option<&RejectionReason> {
        match self {
            Self::Approve => None,
            Self::Reject(reason) => Some(reason),
        }
    }
}

/// Wire body of a moderation decision: `{"status": ..., "rejection_reason": ...}`.
///
/// `rejection_reason` is an empty string when approving.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionRequest {
    pub status: Verdict,
    #[serde(default)]
    pub rejection_reason: String,
}

impl From<&Decision> for DecisionRequest {
    fn from(decision: &Decision) -> Self {
        Self {
            status: decision.verdict(),
            rejection_reason: decision
                .reason()
                .map(|r| r.as_str().to_owned())
                .unwrap_or_default(),
        }
    }
}

impl TryFrom<DecisionRequest> for Decision {
    type Error = CoreError;

    fn try_from(request: DecisionRequest) -> Result<Self, Self::Error> {
        Self::new(request.status, Some(&request.rejection_reason))
    }
}
