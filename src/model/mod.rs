//! Classifier adapter
//!
//! Loads one externally trained binary classifier from a JSON artifact and
//! exposes a single `classify` operation over feature matrices. Two model
//! families are supported:
//! - [`RandomForest`] - leaf probabilities averaged over decision trees
//! - [`SvmClassifier`] - kernel SVM evaluated from its support vectors
//!
//! An artifact may also carry the standardization parameters used at
//! training time; without them the upload is scaled on itself.

mod forest;
mod svm;

pub use forest::{LeafValue, RandomForest, TreeNode};
pub use svm::{KernelType, SvmArtifact, SvmClassifier};

use crate::error::{Result, ScreenError};
use crate::preprocessing::{ScalingMode, StandardScaler};
use crate::utils::FeatureMatrix;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tracing::{debug, info};

/// Binary screening outcome for one sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Label {
    /// 0: no epilepsy symptoms detected
    Clear,
    /// 1: epilepsy symptoms detected
    Symptomatic,
}

impl Label {
    pub fn as_u8(self) -> u8 {
        match self {
            Label::Clear => 0,
            Label::Symptomatic => 1,
        }
    }
}

impl TryFrom<f64> for Label {
    type Error = ScreenError;

    fn try_from(value: f64) -> Result<Self> {
        if value == 0.0 {
            Ok(Label::Clear)
        } else if value == 1.0 {
            Ok(Label::Symptomatic)
        } else {
            Err(ScreenError::UnknownLabel(value))
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

/// A fitted binary classifier
pub trait Classifier: Send + Sync {
    /// Column count the model was trained on
    fn n_features(&self) -> usize;

    /// Raw class values, one per row
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>>;

    /// One label per row. A column count other than [`Classifier::n_features`]
    /// is rejected before any prediction is made.
    fn classify(&self, x: &Array2<f64>) -> Result<Vec<Label>> {
        if x.ncols() != self.n_features() {
            return Err(ScreenError::FeatureMismatch {
                expected: self.n_features(),
                actual: x.ncols(),
            });
        }
        self.predict(x)?
            .iter()
            .map(|&v| Label::try_from(v))
            .collect()
    }
}

pub(crate) fn validate_classes(classes: &[f64]) -> Result<()> {
    if classes.len() != 2 {
        return Err(ScreenError::InvalidArtifact(format!(
            "expected exactly 2 classes, got {}",
            classes.len()
        )));
    }
    for &class in classes {
        Label::try_from(class)
            .map_err(|_| ScreenError::InvalidArtifact(format!("class {} is not 0 or 1", class)))?;
    }
    if classes[0] >= classes[1] {
        return Err(ScreenError::InvalidArtifact(
            "classes must be listed lower first".to_string(),
        ));
    }
    Ok(())
}

/// Model family stored in an artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassifierModel {
    RandomForest(RandomForest),
    Svm(SvmClassifier),
}

impl ClassifierModel {
    pub fn kind(&self) -> &'static str {
        match self {
            ClassifierModel::RandomForest(_) => "random_forest",
            ClassifierModel::Svm(_) => "svm",
        }
    }

    fn as_classifier(&self) -> &dyn Classifier {
        match self {
            ClassifierModel::RandomForest(m) => m,
            ClassifierModel::Svm(m) => m,
        }
    }
}

/// Training-time standardization parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalerParams {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

/// Serialized model artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    #[serde(flatten)]
    pub model: ClassifierModel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scaler: Option<ScalerParams>,
}

impl ModelArtifact {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| ScreenError::InvalidArtifact(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// A loaded classifier together with its normalization step
#[derive(Debug, Clone)]
pub struct ScreeningModel {
    model: ClassifierModel,
    scaling: ScalingMode,
}

impl ScreeningModel {
    /// Load an artifact from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            ScreenError::InvalidArtifact(format!("cannot read {}: {}", path.display(), e))
        })?;
        let model = Self::from_artifact(ModelArtifact::from_json(&json)?)?;
        info!(
            path = %path.display(),
            kind = model.kind(),
            n_features = model.n_features(),
            scaling = model.scaling.name(),
            "Loaded classifier artifact"
        );
        Ok(model)
    }

    pub fn from_artifact(artifact: ModelArtifact) -> Result<Self> {
        // SVM parameters are checked while deserializing, forests here
        if let ClassifierModel::RandomForest(forest) = &artifact.model {
            forest.validate()?;
        }
        let n_features = artifact.model.as_classifier().n_features();
        let scaling = match artifact.scaler {
            Some(params) => {
                let scaler = StandardScaler::from_params(
                    Array1::from_vec(params.mean),
                    Array1::from_vec(params.scale),
                )?;
                if scaler.n_features() != n_features {
                    return Err(ScreenError::InvalidArtifact(format!(
                        "scaler has {} columns but the classifier has {} features",
                        scaler.n_features(),
                        n_features
                    )));
                }
                ScalingMode::Persisted(scaler)
            }
            None => ScalingMode::BatchFit,
        };
        Ok(Self { model: artifact.model, scaling })
    }

    pub fn kind(&self) -> &'static str {
        self.model.kind()
    }

    pub fn n_features(&self) -> usize {
        self.model.as_classifier().n_features()
    }

    pub fn scaling(&self) -> &ScalingMode {
        &self.scaling
    }

    pub fn model(&self) -> &ClassifierModel {
        &self.model
    }

    /// Normalize and classify an uploaded matrix, one label per row
    pub fn screen(&self, features: &FeatureMatrix) -> Result<Vec<Label>> {
        let expected = self.n_features();
        if features.n_cols() != expected {
            return Err(ScreenError::FeatureMismatch {
                expected,
                actual: features.n_cols(),
            });
        }
        let scaled = self.scaling.apply(features.values())?;
        let labels = self.model.as_classifier().classify(&scaled)?;
        debug!(rows = labels.len(), kind = self.kind(), "Classified upload");
        Ok(labels)
    }
}
