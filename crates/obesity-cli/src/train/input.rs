use anyhow::{Context, Result};
use clap::ArgMatches;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use obesity_classifier::config::ModelConfig;
use obesity_classifier::features::TARGET_COLUMN;

use crate::util::validate_tsv_or_csv_file;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    pub train_data: String,
    pub output_file: String,
    pub target_column: String,
    /// Share of the cleaned rows held out for evaluation; 0 disables it.
    pub holdout_fraction: f32,
    pub seed: u64,
    pub model: ModelConfig,
}

impl Default for TrainConfig {
    fn default() -> Self {
        TrainConfig {
            train_data: String::new(),
            output_file: String::from("model/model.json"),
            target_column: TARGET_COLUMN.to_string(),
            holdout_fraction: 0.0,
            seed: 42,
            model: ModelConfig::default(),
        }
    }
}

impl TrainConfig {
    pub fn from_arguments(config_path: &PathBuf, matches: &ArgMatches) -> Result<Self> {
        let config_json = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {:?}", config_path))?;

        let config: TrainConfig = serde_json::from_str(&config_json)
            .with_context(|| format!("Failed to parse config file: {:?}", config_path))?;

        config.with_overrides(matches)
    }

    /// Apply `--train_data` / `--output_file` and validate the data path.
    pub fn with_overrides(mut self, matches: &ArgMatches) -> Result<Self> {
        if let Some(train_data) = matches.get_one::<String>("train_data") {
            self.train_data = train_data.clone();
        }
        validate_tsv_or_csv_file(&self.train_data)?;

        if let Some(output_file) = matches.get_one::<String>("output_file") {
            self.output_file = output_file.clone();
        }

        if !(0.0..1.0).contains(&self.holdout_fraction) {
            anyhow::bail!(
                "holdout_fraction must be in [0, 1), got {}",
                self.holdout_fraction
            );
        }

        Ok(self)
    }
}
