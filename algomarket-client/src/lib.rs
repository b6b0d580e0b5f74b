//! Moderation workflow manager for the algorithm marketplace.
//!
//! [`ModerationWorkflow`] keeps one view's moderation queue in sync with the
//! backend through the [`ModerationApi`] trait; [`HttpModerationApi`] is the
//! HTTP implementation of that trait.

#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]

pub mod api;
pub mod config;
pub mod dialog;
pub mod error;
pub mod http;
pub mod workflow;

pub use api::{submit_form, ModerationApi, Scope};
pub use config::ClientConfig;
pub use dialog::DecisionDialog;
pub use error::{ApiError, ModerationError, Operation};
pub use http::HttpModerationApi;
pub use workflow::{LoadOutcome, LoadState, ModerationWorkflow, QueueSnapshot};
