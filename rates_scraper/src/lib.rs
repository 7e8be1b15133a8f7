//!
//! Fetch-validate-extract pipeline for the live rates page.
//!
//! This crate aggregates:
//! - `source` — the `DocumentSource` seam, HTTP session and script renderer.
//! - `validator` — page readiness checks (`Validator`, `PriceCellValidator`).
//! - `wait` — cancellable backoff pauses (`Wait`, `CancelToken`).
//! - `fetcher` — the retry loop tying source, validator and backoff together.
//! - `extractor` — structural conversion of the rates table into `RateEntry` rows.
#![warn(missing_docs)]
pub mod dom;
pub mod extractor;
pub mod fetcher;
pub mod source;
pub mod validator;
pub mod wait;

pub use extractor::{RateExtractor, RowPolicy, TableLayout};
pub use fetcher::{Backoff, FetchOptions, Fetcher};
pub use source::{ChromiumRenderer, DocumentSource, HttpSource, Renderer};
pub use validator::{PriceCellValidator, Validator};
pub use wait::{CancelToken, Wait};
