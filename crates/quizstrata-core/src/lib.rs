//! quizstrata Core
//!
//! Core types shared across the quizstrata curation pipeline.
//!
//! This crate provides:
//! - The normalized corpus `Record`
//! - Stratum labels and per-record stratum assignments
//! - Error types and result handling

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::{Record, Stratum, StratumSet, FULL_TEXT_SEPARATOR};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::types::{Record, Stratum, StratumSet};
}
