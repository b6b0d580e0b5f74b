//! Users and their normalized authorization profile.
//!
//! Backends disagree on how they describe privileges: some send a `role`,
//! some Django-style `is_staff`/`is_superuser` flags, some group names in
//! either Russian or English. [`User::profile`] folds all of these into one
//! [`AuthorizationProfile`] so that access checks never probe raw fields.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::id::UserId;

/// Marketplace role as reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Author,
    Consumer,
    Moderator,
    Admin,
    /// Any role name this crate does not know about.
    #[serde(other)]
    Unknown,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Author => "author",
            Self::Consumer => "consumer",
            Self::Moderator => "moderator",
            Self::Admin => "admin",
            Self::Unknown => "unknown",
        })
    }
}

/// A user record as held by the session collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(default)]
    pub is_staff: bool,
    #[serde(default)]
    pub is_superuser: bool,
    #[serde(default)]
    pub is_moderator: bool,
    /// Raw group names, in whatever language the backend uses.
    #[serde(default)]
    pub groups: Vec<String>,
}

impl User {
    /// Creates a user with the given role and no flags or groups.
    pub fn new(id: impl Into<String>, username: impl Into<String>, role: Role) -> Self {
        Self {
            id: UserId::new(id),
            username: username.into(),
            email: String::new(),
            role: Some(role),
            is_staff: false,
            is_superuser: false,
            is_moderator: false,
            groups: Vec::new(),
        }
    }

    /// Normalizes this record into an [`AuthorizationProfile`].
    #[must_use]
    pub fn profile(&self) -> AuthorizationProfile {
        AuthorizationProfile {
            role: self.role,
            flags: ElevatedFlags {
                staff: self.is_staff,
                superuser: self.is_superuser,
                moderator: self.is_moderator,
            },
            groups: self.groups.iter().map(|g| Group::parse(g)).collect(),
        }
    }

    /// Shorthand for `can_moderate(Some(&self.profile()))`.
    #[must_use]
    pub fn can_moderate(&self) -> bool {
        crate::access::can_moderate(Some(&self.profile()))
    }
}

/// Boolean privilege flags some backends attach to users.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ElevatedFlags {
    pub staff: bool,
    pub superuser: bool,
    pub moderator: bool,
}

impl ElevatedFlags {
    /// Returns `true` if any flag is set.
    #[must_use]
    pub const fn any(self) -> bool {
        self.staff || self.superuser || self.moderator
    }
}

/// A group membership, with the recognized groups resolved from either spelling.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Group {
    Moderators,
    Administrators,
    Other(String),
}

impl Group {
    /// Resolves a raw group name. Both the Russian and English names are accepted.
    #[must_use]
    pub fn parse(name: &str) -> Self {
        match name {
            "Moderators" | "Модераторы" => Self::Moderators,
            "Administrators" | "Администраторы" => Self::Administrators,
            other => Self::Other(other.to_owned()),
        }
    }

    /// Returns `true` for the groups that grant moderation access.
    #[must_use]
    pub fn is_privileged(&self) -> bool {
        matches!(self, Self::Moderators | Self::Administrators)
    }
}

/// Everything the access evaluator needs to know about a user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorizationProfile {
    pub role: Option<Role>,
    pub flags: ElevatedFlags,
    pub groups: Vec<Group>,
}
