//! Integration tests for the training run and hold-out evaluation.

use std::path::{Path, PathBuf};

use obesity_classifier::config::{ModelConfig, ModelType};
use obesity_classifier::data_handling::{clean_dataset, Table};
use obesity_classifier::features::{register_default_encoders, TARGET_COLUMN};
use obesity_classifier::io::read_table;
use obesity_classifier::{Model, Trainer};

use obesity_cli::train::input::TrainConfig;
use obesity_cli::train::trainer::{evaluate, run_training};

fn fixture() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../obesity-classifier/tests/data/obesity_sample.csv")
}

fn small_model() -> ModelConfig {
    ModelConfig::new(
        0.3,
        ModelType::GBDT {
            max_depth: 4,
            num_boost_round: 30,
            debug: false,
            training_optimization_level: 2,
            loss_type: "LogLikelyhood".to_string(),
            subsample: 1.0,
        },
    )
}

fn cleaned_fixture() -> Table {
    let mut table = read_table(fixture()).unwrap();
    clean_dataset(&mut table).unwrap();
    table
}

/// Same rows with the transport of row `index` replaced by a mode never seen in training.
fn with_unseen_transport(table: &Table, index: usize) -> Table {
    let mtrans = table.column_index("MTRANS").unwrap();
    let mut rows = table.rows().to_vec();
    rows[index][mtrans] = "Bus".to_string();
    Table::new(table.headers().to_vec(), rows).unwrap()
}

fn train_on(table: Table) -> Model {
    let mut trainer = Trainer::from_table(table, TARGET_COLUMN, small_model()).unwrap();
    register_default_encoders(&mut trainer).unwrap();
    trainer.fit_transform_encoders().unwrap();
    trainer.train().unwrap()
}

fn write_csv(table: &Table, path: &Path) {
    let mut text = table.headers().join(",");
    text.push('\n');
    for row in table.rows() {
        text.push_str(&row.join(","));
        text.push('\n');
    }
    std::fs::write(path, text).unwrap();
}

// ---------------------------------------------------------------------------
// evaluate
// ---------------------------------------------------------------------------

#[test]
fn evaluate_skips_rows_with_unseen_categories() {
    let table = cleaned_fixture();
    let model = train_on(table.clone());

    let holdout = with_unseen_transport(&table.select_rows(&[0, 1, 2, 3, 4]), 2);
    let report = evaluate(&model, &holdout).unwrap();

    assert_eq!(report.evaluated, 4);
    assert_eq!(report.skipped, 1);
    let acc = report.accuracy.unwrap();
    assert!((0.0..=1.0).contains(&acc));
    let counted: usize = report.confusion.iter().flatten().sum();
    assert_eq!(counted, 4);
}

#[test]
fn evaluate_with_no_scorable_rows_has_no_accuracy() {
    let table = cleaned_fixture();
    let model = train_on(table.clone());

    let holdout = with_unseen_transport(&table.select_rows(&[7]), 0);
    let report = evaluate(&model, &holdout).unwrap();
    assert_eq!(report.accuracy, None);
    assert_eq!(report.evaluated, 0);
    assert_eq!(report.skipped, 1);
}

// ---------------------------------------------------------------------------
// run_training
// ---------------------------------------------------------------------------

#[test]
fn unseen_holdout_category_does_not_block_saving() {
    let dir = tempfile::tempdir().unwrap();
    let table = with_unseen_transport(&cleaned_fixture(), 10);
    let data = dir.path().join("data.csv");
    write_csv(&table, &data);

    // Pick a seed whose split puts the only "Bus" row in the hold-out.
    let fraction = 0.2;
    let seed = (0..500)
        .find(|&seed| {
            let (_, holdout) = table.split(1.0 - fraction, seed);
            holdout
                .column_values("MTRANS")
                .unwrap()
                .contains(&"Bus")
        })
        .unwrap();

    let output = dir.path().join("model").join("model.json");
    let config = TrainConfig {
        train_data: data.to_str().unwrap().to_string(),
        output_file: output.to_str().unwrap().to_string(),
        holdout_fraction: fraction,
        seed,
        model: small_model(),
        ..TrainConfig::default()
    };

    let model = run_training(&config).unwrap();
    assert!(output.exists());
    assert_eq!(Model::load(&output).unwrap().classes(), model.classes());
}
