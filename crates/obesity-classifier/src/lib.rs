//! obesity-classifier: encoders and a gradient-boosted tree classifier for
//! the obesity-level dataset.
//!
//! The crate covers the whole training pipeline (CSV loading, cleaning,
//! categorical encoding, one-vs-rest GBDT training) and the artifact consumed
//! by the inference service: a [`model::Model`] bundling the fitted encoders
//! with the classifier, serialised as JSON.
pub mod config;
pub mod data_handling;
pub mod error;
pub mod features;
pub mod io;
pub mod model;
pub mod models;
pub mod preprocessing;
pub mod stats;

pub use error::{ModelError, Result};
pub use model::{EncoderTarget, Model, Trainer};
