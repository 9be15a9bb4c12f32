use ndarray::Array2;

use crate::error::Result;

/// Contract for multi-class classifiers trained on an encoded feature matrix.
///
/// Labels are class indices in `0..n_classes`, as produced by the target
/// encoder.
pub trait ClassifierModel {
    /// Fit the model on rows of `x` labelled with `y`.
    fn fit(&mut self, x: &Array2<f32>, y: &[usize], n_classes: usize) -> Result<()>;

    /// Predict the most likely class index for every row.
    fn predict(&self, x: &Array2<f32>) -> Result<Vec<usize>>;

    /// Per-class scores normalised to sum to one, one row per sample.
    fn predict_proba(&self, x: &Array2<f32>) -> Result<Array2<f32>>;

    /// Optional human readable name for the model
    fn name(&self) -> &str {
        "classifier"
    }
}
