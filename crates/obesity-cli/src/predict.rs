use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use obesity_classifier::features::ModelInput;
use obesity_classifier::Model;

/// Classify the record(s) in `input_path`: either one JSON object or an array.
pub fn run_prediction(model_path: &Path, input_path: &Path) -> Result<Vec<String>> {
    let model = Model::load(model_path)
        .with_context(|| format!("Failed to load model: {}", model_path.display()))?;

    let text = fs::read_to_string(input_path)
        .with_context(|| format!("Failed to read input file: {}", input_path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse input file: {}", input_path.display()))?;

    let records: Vec<ModelInput> = match value {
        serde_json::Value::Array(_) => serde_json::from_value(value)?,
        other => vec![serde_json::from_value(other)?],
    };
    log::info!("Classifying {} record(s)", records.len());

    records
        .iter()
        .map(|record| model.predict_one(record).map_err(anyhow::Error::from))
        .collect()
}
