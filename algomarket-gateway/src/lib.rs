//! Development backend for the algorithm marketplace.
//!
//! Serves the moderation, submission and catalog endpoints over an
//! in-memory [`store::MarketStore`] with bearer-token sessions.

#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]

pub mod error;
pub mod routes;
pub mod store;
