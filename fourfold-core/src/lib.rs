//! Shared primitives, traits, and table types for fourfold.
//!
//! `fourfold-core` provides the foundation the analysis crates build on:
//!
//! - **Error types** — [`FourfoldError`] and [`Result`] for structured error handling
//! - **Traits** — [`Scored`] and [`Summarizable`] for result types
//! - **Tables** — [`ObservedTable`], [`ExpectedTable`], and [`RiskTable`] for 2×2 counts

pub mod error;
pub mod table;
pub mod traits;

pub use error::{FourfoldError, Result};
pub use table::{Cell, ExpectedTable, ObservedTable, RiskTable, TableLabels};
pub use traits::*;
