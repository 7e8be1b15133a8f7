//!
//! Common types and utilities shared by the rate scraper and its client.
//!
//! This crate aggregates:
//! - `error` — unified error type `RateError` used across the workspace.
//! - `result` — handy `Result<T, RateError>` alias.
//! - `model` — `RateEntry` rows and the `RateSnapshot` handed to output.
//! - `numeric` — locale-aware exact decimal parsing for price cells.
//! - `user_agent` — the browser identity pool rotated per fetch.
#![warn(missing_docs)]
pub mod error;
pub mod model;
pub mod numeric;
pub mod result;
pub mod user_agent;

pub use error::RateError;
pub use model::{RateEntry, RateSnapshot};
pub use numeric::NumberFormat;
pub use result::Result;
pub use user_agent::{USER_AGENTS, UserAgentPool};
