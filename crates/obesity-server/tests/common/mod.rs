use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

use obesity_classifier::config::{ModelConfig, ModelType};
use obesity_classifier::features::{register_default_encoders, TARGET_COLUMN};
use obesity_classifier::Trainer;
use obesity_server::ApiState;

fn training_data() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../obesity-classifier/tests/data/obesity_sample.csv")
}

/// A small model trained once per test binary.
pub fn api_state() -> Arc<ApiState> {
    static STATE: OnceLock<Arc<ApiState>> = OnceLock::new();
    STATE
        .get_or_init(|| {
            let config = ModelConfig::new(
                0.3,
                ModelType::GBDT {
                    max_depth: 4,
                    num_boost_round: 40,
                    debug: false,
                    training_optimization_level: 2,
                    loss_type: "LogLikelyhood".to_string(),
                    subsample: 1.0,
                },
            );
            let mut trainer = Trainer::new(training_data(), TARGET_COLUMN, config).unwrap();
            trainer.clean_data().unwrap();
            register_default_encoders(&mut trainer).unwrap();
            trainer.fit_transform_encoders().unwrap();
            Arc::new(ApiState::new(trainer.train().unwrap()))
        })
        .clone()
}

#[allow(dead_code)]
pub fn request_json() -> serde_json::Value {
    serde_json::json!({
        "gender": "Female",
        "age": 24,
        "height": 1.58,
        "weight": 56.0,
        "family_history_with_overweight": "yes",
        "favc": "no",
        "fcvc": 2.0,
        "ncp": 2.15,
        "caec": "Sometimes",
        "smoke": "no",
        "ch20": 1.9,
        "scc": "no",
        "faf": 1.1,
        "tue": 1.9,
        "calc": "Sometimes",
        "mtrans": "Public_Transportation"
    })
}
