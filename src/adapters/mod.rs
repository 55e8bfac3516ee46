//! Adapters layer: Concrete implementations of ports.
//!
//! - `artifact`: JSON model artifacts loaded from disk
//! - `sanitize`: identifier filtering for logs

pub mod artifact;
pub mod sanitize;

pub use artifact::{ExportedModel, FileModelProvider};
