//! Moderation access control.
//!
//! [`can_moderate`] is the single authorization predicate. Any one matching
//! signal grants access; the only hard refusal is an absent user.

use crate::user::{AuthorizationProfile, Role, User};

/// Decides whether a user may view and act on the moderation queue.
///
/// Access is granted when any of the following holds:
/// - the role is [`Role::Moderator`] or [`Role::Admin`];
/// - any [`ElevatedFlags`](crate::user::ElevatedFlags) flag is set;
/// - the user belongs to a moderator or administrator group.
///
/// `None` (unauthenticated) is always refused. Pure and cheap; call it on
/// every request.
#[must_use]
pub fn can_moderate(profile: Option<&AuthorizationProfile>) -> bool {
    let Some(profile) = profile else {
        return false;
    };
    matches!(profile.role, Some(Role::Moderator | Role::Admin))
        || profile.flags.any()
        || profile.groups.iter().any(|g| g.is_privileged())
}

/// What the session collaborator currently knows about the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// The session is still being restored.
    Loading,
    /// Restoration finished; `None` means nobody is signed in.
    Resolved(Option<User>),
}

impl SessionState {
    /// The signed-in user, if the session has resolved to one.
    #[must_use]
    pub fn user(&self) -> Option<&User> {
        match self {
            Self::Loading | Self::Resolved(None) => None,
            Self::Resolved(Some(user)) => Some(user),
        }
    }
}

/// Outcome of guarding the moderation panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessGate {
    /// Session not resolved yet; show nothing.
    Loading,
    /// Nobody is signed in; prompt for login.
    SignInRequired,
    /// Signed in without moderation rights. Carries the role for display.
    Forbidden { role: Option<Role> },
    /// The moderation panel may be shown.
    Granted,
}

/// Guards the moderation panel for the given session.
#[must_use]
pub fn gate(session: &SessionState) -> AccessGate {
    match session {
        SessionState::Loading => AccessGate::Loading,
        SessionState::Resolved(None) => AccessGate::SignInRequired,
        SessionState::Resolved(Some(user)) if user.can_moderate() => AccessGate::Granted,
        SessionState::Resolved(Some(user)) => AccessGate::Forbidden { role: user.role },
    }
}
