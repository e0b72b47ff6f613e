//! Shared fixtures for integration tests

#![allow(dead_code)]

use epilepsy_screen::model::{ModelArtifact, ScreeningModel};

/// Two-feature forest: symptomatic when the first feature is above 10
pub const FOREST_JSON: &str = r#"{
    "kind": "random_forest",
    "n_features": 2,
    "classes": [0, 1],
    "trees": [
        {"feature_idx": 0, "threshold": 0.0, "left": {"value": 0}, "right": {"value": 1}},
        {"feature_idx": 0, "threshold": 0.5, "left": {"value": 0}, "right": {"value": 1}},
        {"feature_idx": 1, "threshold": 100.0, "left": {"value": 0}, "right": {"value": 1}}
    ],
    "scaler": {"mean": [10.0, 0.0], "scale": [1.0, 1.0]}
}"#;

/// Linear SVM on the first feature, without a persisted scaler
pub const SVM_JSON: &str = r#"{
    "kind": "svm",
    "n_features": 2,
    "classes": [0, 1],
    "kernel": {"type": "linear"},
    "support_vectors": [[1.0, 0.0]],
    "dual_coef": [1.0],
    "intercept": 0.0
}"#;

pub fn forest_model() -> ScreeningModel {
    ScreeningModel::from_artifact(ModelArtifact::from_json(FOREST_JSON).unwrap()).unwrap()
}

pub fn svm_model() -> ScreeningModel {
    ScreeningModel::from_artifact(ModelArtifact::from_json(SVM_JSON).unwrap()).unwrap()
}

pub const SYMPTOMATIC_CSV: &str = "f1,f2\n15.0,1.0\n5.0,2.0\n";
pub const CLEAR_CSV: &str = "f1,f2\n5.0,1.0\n20.0,2.0\n";
