use gbdt::config::Config;
use gbdt::decision_tree::{Data, DataVec};
use gbdt::gradient_boost::GBDT;
use ndarray::Array2;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::{ModelConfig, ModelType};
use crate::error::{ModelError, Result};
use crate::models::classifier_trait::ClassifierModel;

/// One binary model of the one-vs-rest ensemble.
///
/// Every variant serialises to finite JSON values; JSON has no infinities.
#[derive(Serialize, Deserialize)]
enum ClassModel {
    Trained(GBDT),
    /// Class with no training rows; scores negative infinity so it never wins.
    Absent,
    /// Class covering every training row.
    Constant(f32),
}

impl ClassModel {
    fn scores(&self, data: &DataVec) -> Vec<f32> {
        match self {
            ClassModel::Trained(gbdt) => gbdt.predict(data),
            ClassModel::Absent => vec![f32::NEG_INFINITY; data.len()],
            ClassModel::Constant(score) => vec![*score; data.len()],
        }
    }
}

/// Gradient Boosting Decision Tree (GBDT) classifier.
///
/// Multi-class problems are solved one-vs-rest: one binary gbdt model per
/// class, trained with labels `1` (this class) and `-1` (any other class).
/// The predicted class is the one whose model scores highest.
#[derive(Serialize, Deserialize)]
pub struct GBDTClassifier {
    params: ModelConfig,
    feature_size: Option<usize>,
    models: Vec<ClassModel>,
}

impl GBDTClassifier {
    pub fn new(params: ModelConfig) -> Self {
        GBDTClassifier {
            params,
            feature_size: None,
            models: Vec::new(),
        }
    }

    pub fn params(&self) -> &ModelConfig {
        &self.params
    }

    pub fn n_classes(&self) -> usize {
        self.models.len()
    }

    pub fn is_fitted(&self) -> bool {
        self.feature_size.is_some()
    }

    fn gbdt_config(&self, feature_size: usize) -> Config {
        let ModelType::GBDT {
            max_depth,
            num_boost_round,
            debug,
            training_optimization_level,
            loss_type,
            subsample,
        } = &self.params.model_type;

        let mut config = Config::new();
        config.set_feature_size(feature_size);
        config.set_shrinkage(self.params.learning_rate);
        config.set_max_depth(*max_depth);
        config.set_iterations(*num_boost_round as usize);
        config.set_debug(*debug);
        config.set_training_optimization_level(*training_optimization_level);
        config.set_loss(loss_type);
        config.set_data_sample_ratio(*subsample);
        config
    }

    fn to_data(x: &Array2<f32>, labels: Option<Vec<f32>>) -> DataVec {
        let mut data = DataVec::with_capacity(x.nrows());
        for (i, row) in x.rows().into_iter().enumerate() {
            let label = labels.as_ref().map_or(0.0, |l| l[i]);
            data.push(Data::new_training_data(row.to_vec(), 1.0, label, None));
        }
        data
    }

    fn check_width(&self, x: &Array2<f32>) -> Result<()> {
        let expected = self.feature_size.ok_or(ModelError::NotFitted("fit"))?;
        if x.ncols() != expected {
            return Err(ModelError::FeatureWidth {
                expected,
                found: x.ncols(),
            });
        }
        Ok(())
    }

    /// Raw per-class scores, one row per sample.
    pub fn decision_function(&self, x: &Array2<f32>) -> Result<Array2<f32>> {
        self.check_width(x)?;
        let data = Self::to_data(x, None);
        let per_class: Vec<Vec<f32>> = self.models.iter().map(|m| m.scores(&data)).collect();

        let n_rows = x.nrows();
        let n_classes = self.models.len();
        Ok(Array2::from_shape_fn((n_rows, n_classes), |(r, k)| {
            per_class[k][r]
        }))
    }
}

impl ClassifierModel for GBDTClassifier {
    fn fit(&mut self, x: &Array2<f32>, y: &[usize], n_classes: usize) -> Result<()> {
        if x.nrows() == 0 {
            return Err(ModelError::EmptyTrainingData);
        }
        if y.len() != x.nrows() {
            return Err(ModelError::LabelLength {
                labels: y.len(),
                rows: x.nrows(),
            });
        }
        if let Some(&bad) = y.iter().find(|&&k| k >= n_classes) {
            return Err(ModelError::UnknownClass(bad));
        }
        self.params.validate()?;

        let feature_size = x.ncols();
        let config = self.gbdt_config(feature_size);
        log::info!(
            "Training {} one-vs-rest gbdt models on {} rows x {} features",
            n_classes,
            x.nrows(),
            feature_size
        );

        self.models = (0..n_classes)
            .into_par_iter()
            .map(|class| {
                let positives = y.iter().filter(|&&k| k == class).count();
                if positives == 0 {
                    log::warn!("Class {} has no training rows; it will never be predicted", class);
                    return ClassModel::Absent;
                }
                if positives == y.len() {
                    return ClassModel::Constant(1.0);
                }

                let labels = y
                    .iter()
                    .map(|&k| if k == class { 1.0 } else { -1.0 })
                    .collect();
                let mut train_x = Self::to_data(x, Some(labels));
                let mut gbdt = GBDT::new(&config);
                gbdt.fit(&mut train_x);
                log::debug!("Finished class {} ({} positive rows)", class, positives);
                ClassModel::Trained(gbdt)
            })
            .collect();

        self.feature_size = Some(feature_size);
        Ok(())
    }

    fn predict(&self, x: &Array2<f32>) -> Result<Vec<usize>> {
        let scores = self.decision_function(x)?;
        Ok(scores
            .rows()
            .into_iter()
            .map(|row| {
                row.iter()
                    .enumerate()
                    .fold((0usize, f32::NEG_INFINITY), |best, (k, &s)| {
                        if s > best.1 {
                            (k, s)
                        } else {
                            best
                        }
                    })
                    .0
            })
            .collect())
    }

    fn predict_proba(&self, x: &Array2<f32>) -> Result<Array2<f32>> {
        let mut scores = self.decision_function(x)?;
        let n_classes = scores.ncols().max(1) as f32;
        for mut row in scores.rows_mut() {
            row.mapv_inplace(|s| if s.is_finite() { s.max(0.0) } else { 0.0 });
            let total: f32 = row.sum();
            if total > 0.0 {
                row.mapv_inplace(|s| s / total);
            } else {
                row.fill(1.0 / n_classes);
            }
        }
        Ok(scores)
    }

    fn name(&self) -> &str {
        self.params.model_type.name()
    }
}
