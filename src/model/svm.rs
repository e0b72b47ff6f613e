//! Support Vector Machine inference
//!
//! Evaluates a pre-trained binary SVM from its support vectors:
//! `f(x) = Σ dual_coef_i · K(sv_i, x) + intercept`, with `f(x) > 0`
//! selecting the upper class. A score of exactly zero gives the lower class.

use crate::error::{Result, ScreenError};
use ndarray::{Array1, Array2, ArrayView1};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::Classifier;

/// Kernel function type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum KernelType {
    /// Linear kernel: K(x, y) = x · y
    Linear,
    /// Polynomial kernel: K(x, y) = (γ * x · y + r)^d
    Polynomial { degree: u32, gamma: f64, coef0: f64 },
    /// Radial Basis Function (Gaussian): K(x, y) = exp(-γ * ||x - y||²)
    Rbf { gamma: f64 },
    /// Sigmoid kernel: K(x, y) = tanh(γ * x · y + r)
    Sigmoid { gamma: f64, coef0: f64 },
}

impl KernelType {
    fn apply(&self, x1: &ArrayView1<f64>, x2: &ArrayView1<f64>) -> f64 {
        match self {
            KernelType::Linear => x1.dot(x2),
            KernelType::Polynomial { degree, gamma, coef0 } => {
                (gamma * x1.dot(x2) + coef0).powi((*degree).min(i32::MAX as u32) as i32)
            }
            KernelType::Rbf { gamma } => {
                let norm_sq: f64 = x1.iter().zip(x2.iter()).map(|(a, b)| (a - b) * (a - b)).sum();
                (-gamma * norm_sq).exp()
            }
            KernelType::Sigmoid { gamma, coef0 } => (gamma * x1.dot(x2) + coef0).tanh(),
        }
    }
}

/// On-disk layout of an SVM artifact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SvmArtifact {
    pub n_features: usize,
    pub classes: Vec<f64>,
    pub kernel: KernelType,
    /// One row per support vector
    pub support_vectors: Vec<Vec<f64>>,
    /// `alpha_i * y_i` per support vector
    pub dual_coef: Vec<f64>,
    pub intercept: f64,
}

/// Support Vector Classifier loaded from an artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SvmArtifact", into = "SvmArtifact")]
pub struct SvmClassifier {
    n_features: usize,
    classes: Vec<f64>,
    kernel: KernelType,
    support_vectors: Array2<f64>,
    dual_coef: Array1<f64>,
    intercept: f64,
}

impl TryFrom<SvmArtifact> for SvmClassifier {
    type Error = ScreenError;

    fn try_from(artifact: SvmArtifact) -> Result<Self> {
        super::validate_classes(&artifact.classes)?;

        let n_sv = artifact.support_vectors.len();
        if n_sv == 0 {
            return Err(ScreenError::InvalidArtifact("SVM has no support vectors".to_string()));
        }
        if artifact.dual_coef.len() != n_sv {
            return Err(ScreenError::InvalidArtifact(format!(
                "{} dual coefficients for {} support vectors",
                artifact.dual_coef.len(),
                n_sv
            )));
        }
        if let Some(row) = artifact.support_vectors.iter().find(|sv| sv.len() != artifact.n_features) {
            return Err(ScreenError::InvalidArtifact(format!(
                "support vector has {} values but the model has {} features",
                row.len(),
                artifact.n_features
            )));
        }
        let all_finite = artifact
            .support_vectors
            .iter()
            .flatten()
            .chain(artifact.dual_coef.iter())
            .all(|v| v.is_finite())
            && artifact.intercept.is_finite();
        if !all_finite {
            return Err(ScreenError::InvalidArtifact("SVM parameters must be finite".to_string()));
        }

        let flat: Vec<f64> = artifact.support_vectors.into_iter().flatten().collect();
        let support_vectors = Array2::from_shape_vec((n_sv, artifact.n_features), flat)?;

        Ok(Self {
            n_features: artifact.n_features,
            classes: artifact.classes,
            kernel: artifact.kernel,
            support_vectors,
            dual_coef: Array1::from_vec(artifact.dual_coef),
            intercept: artifact.intercept,
        })
    }
}

impl From<SvmClassifier> for SvmArtifact {
    fn from(svm: SvmClassifier) -> Self {
        Self {
            n_features: svm.n_features,
            classes: svm.classes,
            kernel: svm.kernel,
            support_vectors: svm.support_vectors.rows().into_iter().map(|r| r.to_vec()).collect(),
            dual_coef: svm.dual_coef.to_vec(),
            intercept: svm.intercept,
        }
    }
}

impl SvmClassifier {
    pub fn classes(&self) -> &[f64] {
        &self.classes
    }

    pub fn kernel(&self) -> &KernelType {
        &self.kernel
    }

    pub fn n_support_vectors(&self) -> usize {
        self.support_vectors.nrows()
    }

    fn score_sample(&self, sample: &ArrayView1<f64>) -> f64 {
        self.support_vectors
            .rows()
            .into_iter()
            .zip(self.dual_coef.iter())
            .map(|(sv, coef)| coef * self.kernel.apply(&sv, sample))
            .sum::<f64>()
            + self.intercept
    }

    /// Signed distance-like score per sample
    pub fn decision_function(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if x.ncols() != self.n_features {
            return Err(ScreenError::FeatureMismatch {
                expected: self.n_features,
                actual: x.ncols(),
            });
        }
        let rows: Vec<ArrayView1<f64>> = x.rows().into_iter().collect();
        let scores: Vec<f64> = rows.par_iter().map(|row| self.score_sample(row)).collect();
        Ok(Array1::from_vec(scores))
    }
}

impl Classifier for SvmClassifier {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let (lower, upper) = (self.classes[0], self.classes[1]);
        Ok(self
            .decision_function(x)?
            .mapv(|score| if score > 0.0 { upper } else { lower }))
    }
}
