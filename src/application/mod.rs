//! Application layer: Use cases and services.
//!
//! This module orchestrates domain logic with ports to implement
//! the screening use cases.

mod assessment;
pub mod report;
mod scoring;

pub use assessment::AssessmentService;
pub use scoring::RiskScorer;
