//! Integration tests for the training pipeline and the model artifact.

use std::path::PathBuf;

use obesity_classifier::config::{ModelConfig, ModelType};
use obesity_classifier::data_handling::Table;
use obesity_classifier::features::{
    register_default_encoders, ModelInput, FEATURE_COLUMNS, TARGET_CLASSES, TARGET_COLUMN,
};
use obesity_classifier::stats::accuracy;
use obesity_classifier::{Model, ModelError, Trainer};

fn fixture() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/data/obesity_sample.csv")
}

fn small_config() -> ModelConfig {
    ModelConfig::new(
        0.3,
        ModelType::GBDT {
            max_depth: 4,
            num_boost_round: 60,
            debug: false,
            training_optimization_level: 2,
            loss_type: "LogLikelyhood".to_string(),
            subsample: 1.0,
        },
    )
}

fn prepared_trainer() -> Trainer {
    let mut trainer = Trainer::new(fixture(), TARGET_COLUMN, small_config()).unwrap();
    trainer.clean_data().unwrap();
    register_default_encoders(&mut trainer).unwrap();
    trainer.fit_transform_encoders().unwrap();
    trainer
}

// ---------------------------------------------------------------------------
// Cleaning and encoding
// ---------------------------------------------------------------------------

#[test]
fn cleaning_drops_null_and_duplicate_rows() {
    let mut trainer = Trainer::new(fixture(), TARGET_COLUMN, small_config()).unwrap();
    assert_eq!(trainer.table().nrows(), 44);

    let summary = trainer.clean_data().unwrap();
    assert_eq!(summary.missing, 1);
    assert_eq!(summary.duplicates, 1);
    assert_eq!(summary.no_digits, 0);
    assert_eq!(summary.remaining, 42);

    let ages = trainer.table().column_values("Age").unwrap();
    assert!(ages.iter().all(|a| a.chars().all(|c| c.is_ascii_digit())));
}

#[test]
fn encoded_matrix_has_expected_layout() {
    let trainer = prepared_trainer();
    let encoded = trainer.encoded().unwrap();

    // 8 numeric columns, then Gender (2), MTRANS (5), 4 label, 2 ordinal
    assert_eq!(encoded.x.ncols(), 21);
    assert_eq!(encoded.x.nrows(), 42);
    assert_eq!(encoded.y.len(), 42);
    assert_eq!(
        &encoded.feature_names[..8],
        &["Age", "Height", "Weight", "FCVC", "NCP", "CH2O", "FAF", "TUE"]
    );
    assert_eq!(encoded.feature_names[8], "Gender_Female");
    assert_eq!(encoded.feature_names[10], "MTRANS_Automobile");
    assert_eq!(encoded.feature_names[19], "CAEC");
    assert_eq!(encoded.feature_names[20], "CALC");
    assert!(encoded.y.iter().all(|&k| k < TARGET_CLASSES.len()));
}

#[test]
fn missing_dataset_errors() {
    let err = Trainer::new("/nonexistent/data.csv", TARGET_COLUMN, small_config()).unwrap_err();
    assert!(matches!(err, ModelError::Csv { .. }));
}

// ---------------------------------------------------------------------------
// Training and prediction
// ---------------------------------------------------------------------------

#[test]
fn trained_model_recovers_training_labels() {
    let trainer = prepared_trainer();
    let model = trainer.train().unwrap();

    let features = trainer.table().without_column(TARGET_COLUMN).unwrap();
    let expected: Vec<String> = trainer
        .table()
        .column_values(TARGET_COLUMN)
        .unwrap()
        .into_iter()
        .map(str::to_string)
        .collect();

    let predicted = model.predict(&features).unwrap();
    assert_eq!(predicted.len(), expected.len());
    let acc = accuracy(&predicted, &expected).unwrap();
    assert!(acc >= 0.8, "training accuracy too low: {}", acc);
}

#[test]
fn predict_one_returns_a_known_label() {
    let model = prepared_trainer().train().unwrap();
    let label = model.predict_one(&ModelInput::sample()).unwrap();
    assert!(TARGET_CLASSES.contains(&label.as_str()), "unexpected label {}", label);
    assert_eq!(model.classes().len(), 7);
    assert_eq!(model.feature_columns(), &FEATURE_COLUMNS.map(String::from));
}

#[test]
fn predict_rejects_reordered_columns() {
    let model = prepared_trainer().train().unwrap();
    let input = ModelInput::sample();

    let mut headers: Vec<String> = FEATURE_COLUMNS.iter().map(|c| c.to_string()).collect();
    let mut row = input.to_row();
    headers.swap(0, 1);
    row.swap(0, 1);
    let table = Table::new(headers, vec![row]).unwrap();

    let err = model.predict(&table).unwrap_err();
    assert!(matches!(err, ModelError::ColumnMismatch { .. }));
    assert!(err.to_string().contains("Predictor must have these columns"));
}

#[test]
fn predict_rejects_unseen_category() {
    let model = prepared_trainer().train().unwrap();
    let mut row = ModelInput::sample().to_row();
    row[0] = "Other".to_string();
    let table = Table::new(FEATURE_COLUMNS.iter().map(|c| c.to_string()).collect(), vec![row]).unwrap();

    assert!(matches!(
        model.predict(&table),
        Err(ModelError::UnknownCategory { .. })
    ));
}

// ---------------------------------------------------------------------------
// Artifact persistence
// ---------------------------------------------------------------------------

#[test]
fn saved_model_reloads_with_identical_predictions() {
    let trainer = prepared_trainer();
    let model = trainer.train().unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model").join("model.json");
    model.save(&path).unwrap();
    let loaded = Model::load(&path).unwrap();

    let features = trainer.table().without_column(TARGET_COLUMN).unwrap();
    assert_eq!(model.predict(&features).unwrap(), loaded.predict(&features).unwrap());
    assert_eq!(loaded.encoded_columns(), model.encoded_columns());
    assert_eq!(loaded.config(), model.config());
}

#[test]
fn model_without_a_class_saves_and_reloads() {
    let mut table = obesity_classifier::io::read_table(fixture()).unwrap();
    obesity_classifier::data_handling::clean_dataset(&mut table).unwrap();
    let target = table.column_index(TARGET_COLUMN).unwrap();
    let kept: Vec<usize> = (0..table.nrows())
        .filter(|&i| table.rows()[i][target] != "Obesity_Type_III")
        .collect();
    let table = table.select_rows(&kept);

    let mut trainer = Trainer::from_table(table, TARGET_COLUMN, small_config()).unwrap();
    register_default_encoders(&mut trainer).unwrap();
    trainer.fit_transform_encoders().unwrap();
    let model = trainer.train().unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.json");
    model.save(&path).unwrap();
    let loaded = Model::load(&path).unwrap();

    assert_eq!(loaded.classes().len(), 7);
    let features = trainer.table().without_column(TARGET_COLUMN).unwrap();
    let predicted = loaded.predict(&features).unwrap();
    assert_eq!(predicted, model.predict(&features).unwrap());
    assert!(predicted.iter().all(|label| label != "Obesity_Type_III"));
}

#[test]
fn load_rejects_foreign_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("other.json");
    std::fs::write(&path, r#"{"format": "something-else", "version": 1}"#).unwrap();

    let err = Model::load(&path).unwrap_err();
    assert!(matches!(err, ModelError::WrongArtifact { .. }));
}

#[test]
fn load_rejects_missing_file() {
    assert!(matches!(
        Model::load("/nonexistent/model.json"),
        Err(ModelError::Io { .. })
    ));
}
