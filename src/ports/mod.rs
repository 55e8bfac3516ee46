//! Ports layer: Trait definitions for external operations.
//!
//! The pre-trained classifier is the only external collaborator of the
//! scoring pipeline; these traits keep it swappable for tests.

mod predictor;

pub use predictor::{InferenceError, ModelError, ModelProvider, Predictor};
