//! Core types for the algorithm marketplace moderation workflow.
//!
//! Defines the moderation state machine (pending → approved | rejected),
//! the normalized user authorization profile and its access predicate,
//! and the submission and catalog models that surround them.

#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]

pub mod access;
pub mod algorithm;
pub mod catalog;
pub mod error;
pub mod id;
pub mod samples;
pub mod status;
pub mod submission;
pub mod user;

pub use access::{can_moderate, gate, AccessGate, SessionState};
pub use algorithm::{Algorithm, ModeratedAlgorithm};
pub use catalog::{CatalogFilter, PriceFilter};
pub use error::CoreError;
pub use id::{AlgorithmId, UserId};
pub use status::{AlgorithmStatus, Decision, DecisionRequest, RejectionReason, Verdict};
pub use submission::{parse_tags, Compiler, Language, NewAlgorithm, Pricing, SubmissionForm};
pub use user::{AuthorizationProfile, ElevatedFlags, Group, Role, User};
