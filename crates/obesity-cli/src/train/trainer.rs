use anyhow::{Context, Result};

use obesity_classifier::data_handling::{clean_dataset, Table};
use obesity_classifier::features::{register_default_encoders, ModelInput};
use obesity_classifier::io::read_table;
use obesity_classifier::stats::{accuracy, confusion_matrix};
use obesity_classifier::{Model, Trainer};

use super::input::TrainConfig;

pub fn run_training(config: &TrainConfig) -> Result<Model> {
    let mut table = read_table(&config.train_data)
        .with_context(|| format!("Failed to read training data: {}", config.train_data))?;
    log::info!(
        "Loaded {} rows x {} columns from {}",
        table.nrows(),
        table.ncols(),
        config.train_data
    );

    clean_dataset(&mut table)?;

    let (train, holdout) = if config.holdout_fraction > 0.0 {
        let (train, holdout) = table.split(1.0 - config.holdout_fraction, config.seed);
        log::info!(
            "Holding out {} of {} rows (seed {})",
            holdout.nrows(),
            table.nrows(),
            config.seed
        );
        (train, Some(holdout))
    } else {
        (table, None)
    };

    let mut trainer = Trainer::from_table(train, &config.target_column, config.model.clone())
        .context("Failed to set up trainer")?;
    register_default_encoders(&mut trainer).context("Failed to register encoders")?;
    let encoded = trainer.fit_transform_encoders()?;
    log::info!(
        "Encoded {} rows into {} features",
        encoded.x.nrows(),
        encoded.x.ncols()
    );

    log::info!(
        "Training {} model: learning rate {}",
        config.model.model_type.name(),
        config.model.learning_rate
    );
    let model = trainer.train().context("Training failed")?;

    model
        .save(&config.output_file)
        .with_context(|| format!("Failed to save model: {}", config.output_file))?;
    log::info!("Model saved to {}", config.output_file);

    match model.predict_one(&ModelInput::sample()) {
        Ok(sample) => log::info!("Sample record classified as {}", sample),
        Err(e) => log::warn!("Sanity prediction failed: {}", e),
    }

    if let Some(holdout) = holdout.filter(|t| !t.is_empty()) {
        match evaluate(&model, &holdout) {
            Ok(report) => report.log(model.classes()),
            Err(e) => log::warn!("Hold-out evaluation failed: {:#}", e),
        }
    }

    Ok(model)
}

/// Outcome of scoring the hold-out rows.
#[derive(Debug, Clone, PartialEq)]
pub struct HoldoutReport {
    /// `None` when no row could be scored.
    pub accuracy: Option<f64>,
    pub evaluated: usize,
    /// Rows the model could not encode, e.g. a category never seen in training.
    pub skipped: usize,
    /// Indexed `[expected][predicted]` over the model's classes.
    pub confusion: Vec<Vec<usize>>,
}

impl HoldoutReport {
    fn log(&self, classes: &[String]) {
        match self.accuracy {
            Some(acc) => log::info!(
                "Hold-out accuracy: {:.4} on {} rows ({} skipped)",
                acc,
                self.evaluated,
                self.skipped
            ),
            None => log::warn!("No hold-out row could be scored ({} skipped)", self.skipped),
        }
        for (class, row) in classes.iter().zip(&self.confusion) {
            log::debug!("{:>22} {:?}", class, row);
        }
    }
}

/// Score the model on rows not seen in training.
///
/// Rows that fail to encode are skipped with a warning.
pub fn evaluate(model: &Model, holdout: &Table) -> Result<HoldoutReport> {
    let labels = holdout.column_values(model.target_column())?;
    let features = holdout.without_column(model.target_column())?;

    let mut predicted = Vec::with_capacity(labels.len());
    let mut expected = Vec::with_capacity(labels.len());
    for (i, label) in labels.iter().enumerate() {
        match model.predict(&features.select_rows(&[i])) {
            Ok(mut row) => {
                if let Some(p) = row.pop() {
                    predicted.push(p);
                    expected.push(label.to_string());
                }
            }
            Err(e) => log::warn!("Skipping hold-out row {}: {}", i + 1, e),
        }
    }

    let confusion = confusion_matrix(&predicted, &expected, model.classes());
    Ok(HoldoutReport {
        accuracy: accuracy(&predicted, &expected),
        evaluated: predicted.len(),
        skipped: labels.len() - predicted.len(),
        confusion,
    })
}
