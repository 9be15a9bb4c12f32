//! Evaluation helpers for label predictions.

/// Fraction of positions where `predicted` equals `expected`.
///
/// Returns `None` when the slices are empty or have different lengths.
pub fn accuracy<T: PartialEq>(predicted: &[T], expected: &[T]) -> Option<f64> {
    if predicted.is_empty() || predicted.len() != expected.len() {
        return None;
    }
    let hits = predicted
        .iter()
        .zip(expected)
        .filter(|(p, e)| p == e)
        .count();
    Some(hits as f64 / predicted.len() as f64)
}

/// Confusion counts indexed `[expected][predicted]` over `classes`.
///
/// Labels not found in `classes` are skipped.
pub fn confusion_matrix<S: AsRef<str>>(
    predicted: &[S],
    expected: &[S],
    classes: &[String],
) -> Vec<Vec<usize>> {
    let mut matrix = vec![vec![0usize; classes.len()]; classes.len()];
    let position = |label: &str| classes.iter().position(|c| c == label);
    for (p, e) in predicted.iter().zip(expected) {
        if let (Some(pi), Some(ei)) = (position(p.as_ref()), position(e.as_ref())) {
            matrix[ei][pi] += 1;
        }
    }
    matrix
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accuracy_counts_matches() {
        assert_eq!(accuracy(&["a", "b", "c", "d"], &["a", "b", "x", "d"]), Some(0.75));
        assert_eq!(accuracy::<&str>(&[], &[]), None);
        assert_eq!(accuracy(&["a"], &["a", "b"]), None);
    }

    #[test]
    fn confusion_rows_are_expected_labels() {
        let classes = vec!["low".to_string(), "high".to_string()];
        let m = confusion_matrix(&["low", "high", "low", "other"], &["low", "low", "high", "low"], &classes);
        assert_eq!(m, vec![vec![1, 1], vec![1, 0]]);
    }
}
