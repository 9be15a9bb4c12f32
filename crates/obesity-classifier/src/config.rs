use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{ModelError, Result};

/// Loss functions the gbdt backend can train natively.
pub const SUPPORTED_LOSSES: [&str; 3] = ["LogLikelyhood", "SquaredError", "LAD"];

/// Central configuration for models in the crate.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ModelConfig {
    pub learning_rate: f32,

    #[serde(flatten)]
    pub model_type: ModelType,
}

/// Supported model types and their hyper-parameters.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub enum ModelType {
    GBDT {
        max_depth: u32,
        num_boost_round: u32,
        debug: bool,
        training_optimization_level: u8,
        loss_type: String,
        /// Fraction of rows sampled for each boosting round.
        subsample: f64,
    },
}

impl Default for ModelType {
    fn default() -> Self {
        ModelType::GBDT {
            max_depth: 8,
            num_boost_round: 2000,
            debug: false,
            training_optimization_level: 2,
            loss_type: "LogLikelyhood".to_string(),
            subsample: 0.8,
        }
    }
}

impl ModelType {
    pub fn name(&self) -> &'static str {
        match self {
            ModelType::GBDT { .. } => "gbdt",
        }
    }
}

impl FromStr for ModelType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gbdt" => Ok(ModelType::default()),
            _ => Err(format!("Unknown model type: {}. Supported: gbdt", s)),
        }
    }
}

impl ModelConfig {
    pub fn new(learning_rate: f32, model_type: ModelType) -> Self {
        Self {
            learning_rate,
            model_type,
        }
    }

    /// Reject hyper-parameters the backend would panic on.
    pub fn validate(&self) -> Result<()> {
        if !(self.learning_rate > 0.0 && self.learning_rate.is_finite()) {
            return Err(ModelError::InvalidConfig(format!(
                "learning_rate must be positive, got {}",
                self.learning_rate
            )));
        }
        match &self.model_type {
            ModelType::GBDT {
                max_depth,
                num_boost_round,
                loss_type,
                subsample,
                ..
            } => {
                if *max_depth == 0 {
                    return Err(ModelError::InvalidConfig("max_depth must be at least 1".into()));
                }
                if *num_boost_round == 0 {
                    return Err(ModelError::InvalidConfig(
                        "num_boost_round must be at least 1".into(),
                    ));
                }
                if !SUPPORTED_LOSSES.contains(&loss_type.as_str()) {
                    return Err(ModelError::InvalidConfig(format!(
                        "unsupported loss_type '{}', expected one of {:?}",
                        loss_type, SUPPORTED_LOSSES
                    )));
                }
                if !(*subsample > 0.0 && *subsample <= 1.0) {
                    return Err(ModelError::InvalidConfig(format!(
                        "subsample must be in (0, 1], got {}",
                        subsample
                    )));
                }
            }
        }
        Ok(())
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.02,
            model_type: ModelType::default(),
        }
    }
}
