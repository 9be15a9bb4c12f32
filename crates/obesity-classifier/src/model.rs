//! The encoder/classifier wrapper.
//!
//! [`Trainer`] owns the training table and walks it through cleaning,
//! encoder registration, encoding and fitting. The result is a [`Model`]:
//! the immutable artifact holding the fitted encoders and the classifier,
//! which is all the serving path needs.
use std::fmt;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use chrono::{DateTime, Utc};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::config::ModelConfig;
use crate::data_handling::{clean_dataset, CleaningSummary, Table};
use crate::error::{ModelError, Result};
use crate::features::ModelInput;
use crate::io::read_table;
use crate::models::{ClassifierModel, GBDTClassifier};
use crate::preprocessing::{Encoder, EncoderKey, EncoderRegistry, EncoderType};

const ARTIFACT_FORMAT: &str = "obesity-classifier/model";
const ARTIFACT_VERSION: u32 = 1;

/// Which column(s) an encoder registration applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncoderTarget {
    Columns(Vec<String>),
    /// The label column given to [`Trainer::new`].
    Target,
}

impl EncoderTarget {
    pub fn columns<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        EncoderTarget::Columns(columns.into_iter().map(Into::into).collect())
    }
}

/// Encoded training data.
#[derive(Debug, Clone)]
pub struct EncodedData {
    pub feature_names: Vec<String>,
    pub x: Array2<f32>,
    pub y: Vec<usize>,
}

/// Build the feature matrix for `features` (a table without the target column).
///
/// Columns without an encoder come first, parsed as numbers and kept in
/// table order. Encoded columns follow in encoder registration order.
fn encode_features(features: &Table, encoders: &EncoderRegistry) -> Result<(Vec<String>, Array2<f32>)> {
    let headers = features.headers();
    let numeric: Vec<usize> = headers
        .iter()
        .enumerate()
        .filter(|(_, h)| !encoders.encodes_column(h))
        .map(|(i, _)| i)
        .collect();

    let mut encoded = Vec::new();
    for (column, encoder) in encoders.columns() {
        let idx = features
            .column_index(column)
            .ok_or_else(|| ModelError::UnknownColumn(column.to_string()))?;
        encoded.push((column, idx, encoder));
    }

    let mut names: Vec<String> = numeric.iter().map(|&i| headers[i].clone()).collect();
    for (column, _, encoder) in &encoded {
        names.extend(encoder.output_names(column)?);
    }

    let width = names.len();
    let mut data = Vec::with_capacity(features.nrows() * width);
    for (row_idx, row) in features.rows().iter().enumerate() {
        for &i in &numeric {
            let cell = row[i].trim();
            let value = cell.parse::<f32>().map_err(|_| ModelError::InvalidNumber {
                column: headers[i].clone(),
                row: row_idx + 1,
                value: cell.to_string(),
            })?;
            data.push(value);
        }
        for (column, idx, encoder) in &encoded {
            encoder.encode_into(column, &row[*idx], &mut data)?;
        }
    }

    let n_values = data.len();
    let x = Array2::from_shape_vec((features.nrows(), width), data).map_err(|_| {
        ModelError::FeatureWidth {
            expected: features.nrows() * width,
            found: n_values,
        }
    })?;
    Ok((names, x))
}

#[derive(Debug)]
pub struct Trainer {
    table: Table,
    target_column: String,
    config: ModelConfig,
    encoders: EncoderRegistry,
    encoded: Option<EncodedData>,
}

impl Trainer {
    /// Load the dataset at `dataset_path`; `target_column` must be one of its columns.
    pub fn new<P: AsRef<Path>>(dataset_path: P, target_column: &str, config: ModelConfig) -> Result<Self> {
        let table = read_table(dataset_path)?;
        Self::from_table(table, target_column, config)
    }

    pub fn from_table(table: Table, target_column: &str, config: ModelConfig) -> Result<Self> {
        if !table.has_column(target_column) {
            return Err(ModelError::UnknownColumn(target_column.to_string()));
        }
        config.validate()?;
        Ok(Trainer {
            table,
            target_column: target_column.to_string(),
            config,
            encoders: EncoderRegistry::new(),
            encoded: None,
        })
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn target_column(&self) -> &str {
        &self.target_column
    }

    pub fn encoders(&self) -> &EncoderRegistry {
        &self.encoders
    }

    pub fn encoded(&self) -> Option<&EncodedData> {
        self.encoded.as_ref()
    }

    /// Drop rows with missing values and duplicate rows, then reduce `Age`
    /// (when present) to its leading digits.
    pub fn clean_data(&mut self) -> Result<CleaningSummary> {
        let summary = clean_dataset(&mut self.table)?;
        self.encoded = None;
        Ok(summary)
    }

    /// Register an encoder of `kind` for each listed column, or for the target.
    ///
    /// Either every column is registered or none is.
    pub fn add_encoder(
        &mut self,
        target: EncoderTarget,
        kind: EncoderType,
        categories: Option<Vec<String>>,
    ) -> Result<()> {
        let encoder = Encoder::new(kind, categories)?;

        let keys = match target {
            EncoderTarget::Target => vec![EncoderKey::Target],
            EncoderTarget::Columns(columns) => {
                if columns.is_empty() {
                    return Err(ModelError::EmptyColumns);
                }
                let mut keys = Vec::with_capacity(columns.len());
                for column in columns {
                    if column == self.target_column {
                        return Err(ModelError::TargetAsFeature(column));
                    }
                    if !self.table.has_column(&column) {
                        return Err(ModelError::UnknownColumn(column));
                    }
                    let key = EncoderKey::Column(column);
                    if keys.contains(&key) {
                        return Err(ModelError::DuplicateEncoder(key.to_string()));
                    }
                    keys.push(key);
                }
                keys
            }
        };

        if let Some(existing) = keys.iter().find(|k| self.encoders.contains(k)) {
            return Err(ModelError::DuplicateEncoder(existing.to_string()));
        }
        for key in keys {
            log::debug!("Registered {} encoder for '{}'", kind, key);
            self.encoders.insert(key, encoder.clone())?;
        }
        self.encoded = None;
        Ok(())
    }

    /// Fit every registered encoder on the training table and build `X` and `y`.
    pub fn fit_transform_encoders(&mut self) -> Result<&EncodedData> {
        match self.encoders.target().map(Encoder::kind) {
            None => return Err(ModelError::MissingTargetEncoder),
            Some(EncoderType::OneHot) => {
                return Err(ModelError::InvalidTargetEncoder(EncoderType::OneHot.to_string()))
            }
            Some(_) => {}
        }
        if self.table.is_empty() {
            return Err(ModelError::EmptyTrainingData);
        }

        let target_column = self.target_column.clone();
        for (key, encoder) in self.encoders.iter_mut() {
            let column = match key {
                EncoderKey::Column(name) => name.as_str(),
                EncoderKey::Target => target_column.as_str(),
            };
            let values = self.table.column_values(column)?;
            encoder.fit(column, &values)?;
        }

        let target = self
            .encoders
            .target()
            .ok_or(ModelError::MissingTargetEncoder)?;
        let y = self
            .table
            .column_values(&target_column)?
            .into_iter()
            .map(|v| target.index_of(&target_column, v))
            .collect::<Result<Vec<_>>>()?;

        let features = self.table.without_column(&target_column)?;
        let (feature_names, x) = encode_features(&features, &self.encoders)?;
        log::info!(
            "Encoded {} rows into {} feature columns",
            x.nrows(),
            x.ncols()
        );

        Ok(self.encoded.insert(EncodedData {
            feature_names,
            x,
            y,
        }))
    }

    /// Fit the classifier on the encoded data and package the model artifact.
    pub fn train(&self) -> Result<Model> {
        let encoded = self
            .encoded
            .as_ref()
            .ok_or(ModelError::NotFitted("fit_transform_encoders"))?;
        let n_classes = self
            .encoders
            .target()
            .and_then(Encoder::categories)
            .map(<[String]>::len)
            .ok_or(ModelError::MissingTargetEncoder)?;

        let mut classifier = GBDTClassifier::new(self.config.clone());
        classifier.fit(&encoded.x, &encoded.y, n_classes)?;

        let feature_columns = self
            .table
            .headers()
            .iter()
            .filter(|h| **h != self.target_column)
            .cloned()
            .collect();

        Ok(Model {
            format: ARTIFACT_FORMAT.to_string(),
            version: ARTIFACT_VERSION,
            target_column: self.target_column.clone(),
            feature_columns,
            encoded_columns: encoded.feature_names.clone(),
            encoders: self.encoders.clone(),
            classifier,
            trained_at: Utc::now(),
        })
    }
}

#[derive(Deserialize)]
struct ArtifactHeader {
    #[serde(default)]
    format: String,
    #[serde(default)]
    version: u32,
}

/// Fitted encoders plus classifier; read-only once trained.
#[derive(Serialize, Deserialize)]
pub struct Model {
    format: String,
    version: u32,
    target_column: String,
    feature_columns: Vec<String>,
    encoded_columns: Vec<String>,
    encoders: EncoderRegistry,
    classifier: GBDTClassifier,
    trained_at: DateTime<Utc>,
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Model")
            .field("target_column", &self.target_column)
            .field("feature_columns", &self.feature_columns)
            .field("classes", &self.classes())
            .field("classifier", &self.classifier.name())
            .field("trained_at", &self.trained_at)
            .finish()
    }
}

impl Model {
    pub fn target_column(&self) -> &str {
        &self.target_column
    }

    /// Raw feature columns a prediction table must carry, in order.
    pub fn feature_columns(&self) -> &[String] {
        &self.feature_columns
    }

    pub fn encoded_columns(&self) -> &[String] {
        &self.encoded_columns
    }

    pub fn trained_at(&self) -> DateTime<Utc> {
        self.trained_at
    }

    pub fn config(&self) -> &ModelConfig {
        self.classifier.params()
    }

    /// Target labels in class-index order.
    pub fn classes(&self) -> &[String] {
        self.encoders
            .target()
            .and_then(Encoder::categories)
            .unwrap_or_default()
    }

    /// Predict one label per row of `values`.
    ///
    /// The columns of `values` must match the training feature columns
    /// exactly, including order.
    pub fn predict(&self, values: &Table) -> Result<Vec<String>> {
        if values.headers() != self.feature_columns.as_slice() {
            return Err(ModelError::ColumnMismatch {
                expected: self.feature_columns.clone(),
                found: values.headers().to_vec(),
            });
        }
        let (_, x) = encode_features(values, &self.encoders)?;
        let target = self
            .encoders
            .target()
            .ok_or(ModelError::MissingTargetEncoder)?;

        self.classifier
            .predict(&x)?
            .into_iter()
            .map(|class| target.inverse_transform(&self.target_column, class))
            .collect()
    }

    pub fn predict_one(&self, input: &ModelInput) -> Result<String> {
        let table = input.to_table()?;
        let mut labels = self.predict(&table)?;
        labels.pop().ok_or(ModelError::LabelLength { labels: 0, rows: 1 })
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let io_err = |source| ModelError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let file = File::create(path).map_err(io_err)?;
        serde_json::to_writer(BufWriter::new(file), self)?;
        log::info!("Saved model to {}", path.display());
        Ok(())
    }

    /// Load an artifact written by [`Model::save`], rejecting any other JSON document.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| ModelError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let header: ArtifactHeader = serde_json::from_slice(&bytes)?;
        if header.format != ARTIFACT_FORMAT || header.version != ARTIFACT_VERSION {
            return Err(ModelError::WrongArtifact {
                expected: ARTIFACT_FORMAT,
                expected_version: ARTIFACT_VERSION,
                found: header.format,
                found_version: header.version,
            });
        }

        let model: Model = serde_json::from_slice(&bytes)?;
        log::info!(
            "Loaded model from {} (trained {}, {} classes)",
            path.display(),
            model.trained_at.to_rfc3339(),
            model.classes().len()
        );
        Ok(model)
    }
}
