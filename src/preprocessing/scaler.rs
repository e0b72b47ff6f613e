//! Feature scaling implementations

use crate::error::{Result, ScreenError};
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

/// Standardization parameters: `(x - mean) / scale` per column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    mean: Array1<f64>,
    scale: Array1<f64>,
}

impl StandardScaler {
    /// Create a scaler from stored parameters.
    /// Zero scales are replaced with 1.0 so constant columns map to 0.
    pub fn from_params(mean: Array1<f64>, scale: Array1<f64>) -> Result<Self> {
        if mean.len() != scale.len() {
            return Err(ScreenError::ShapeError {
                expected: format!("scale length = {}", mean.len()),
                actual: format!("scale length = {}", scale.len()),
            });
        }
        if mean.iter().chain(scale.iter()).any(|v| !v.is_finite()) {
            return Err(ScreenError::InvalidArtifact(
                "scaler parameters must be finite".to_string(),
            ));
        }
        let scale = scale.mapv(|s| if s == 0.0 { 1.0 } else { s });
        Ok(Self { mean, scale })
    }

    /// Fit mean and population standard deviation (ddof = 0) per column
    pub fn fit(x: &Array2<f64>) -> Result<Self> {
        if x.nrows() == 0 {
            return Err(ScreenError::DataError("Cannot fit scaler on zero rows".to_string()));
        }
        let mean = x
            .mean_axis(Axis(0))
            .ok_or_else(|| ScreenError::DataError("Cannot fit scaler on zero rows".to_string()))?;
        let scale = x.std_axis(Axis(0), 0.0);
        Self::from_params(mean, scale)
    }

    pub fn n_features(&self) -> usize {
        self.mean.len()
    }

    pub fn mean(&self) -> &Array1<f64> {
        &self.mean
    }

    pub fn scale(&self) -> &Array1<f64> {
        &self.scale
    }

    /// Transform the data; output has the same shape as the input
    pub fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        if x.ncols() != self.n_features() {
            return Err(ScreenError::FeatureMismatch {
                expected: self.n_features(),
                actual: x.ncols(),
            });
        }
        Ok((x - &self.mean) / &self.scale)
    }

    /// Fit and transform in one step
    pub fn fit_transform(x: &Array2<f64>) -> Result<(Self, Array2<f64>)> {
        let scaler = Self::fit(x)?;
        let scaled = scaler.transform(x)?;
        Ok((scaler, scaled))
    }
}

/// Where the normalization parameters for a request come from
#[derive(Debug, Clone, PartialEq)]
pub enum ScalingMode {
    /// Training-time parameters shipped with the classifier artifact
    Persisted(StandardScaler),
    /// Parameters fitted on the uploaded batch itself. Predictions then
    /// depend on what else was uploaded alongside each row.
    BatchFit,
}

impl ScalingMode {
    pub fn name(&self) -> &'static str {
        match self {
            ScalingMode::Persisted(_) => "persisted",
            ScalingMode::BatchFit => "batch_fit",
        }
    }

    /// Normalize one uploaded batch
    pub fn apply(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        match self {
            ScalingMode::Persisted(scaler) => scaler.transform(x),
            ScalingMode::BatchFit => {
                tracing::warn!(
                    rows = x.nrows(),
                    "Scaler fitted on the uploaded batch; results are not reproducible across uploads"
                );
                StandardScaler::fit_transform(x).map(|(_, scaled)| scaled)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_standard_scaler() {
        let x = array![[1.0, 10.0], [2.0, 20.0], [3.0, 30.0], [4.0, 40.0], [5.0, 50.0]];
        let (scaler, scaled) = StandardScaler::fit_transform(&x).unwrap();

        assert_eq!(scaled.dim(), x.dim());
        for col in scaled.columns() {
            assert!(col.mean().unwrap().abs() < 1e-10);
            assert!((col.std(0.0) - 1.0).abs() < 1e-10);
        }
        assert!((scaler.scale()[0] - 2.0_f64.sqrt()).abs() < 1e-10);
    }

    #[test]
    fn test_constant_column_maps_to_zero() {
        let x = array![[7.0, 1.0], [7.0, 2.0]];
        let (scaler, scaled) = StandardScaler::fit_transform(&x).unwrap();
        assert_eq!(scaler.scale()[0], 1.0);
        assert_eq!(scaled.column(0).to_vec(), vec![0.0, 0.0]);
    }

    #[test]
    fn test_single_row_batch() {
        let x = array![[3.0, -2.0, 8.0]];
        let (_, scaled) = StandardScaler::fit_transform(&x).unwrap();
        assert!(scaled.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_fit_transform_centers_columns() {
        let x = array![[1.0, 4.0], [2.0, 8.0], [6.0, 5.0]];
        let (_, scaled) = StandardScaler::fit_transform(&x).unwrap();
        for column in scaled.columns() {
            assert!(column.sum().abs() < 1e-10);
            assert!((column.std(0.0) - 1.0).abs() < 1e-10);
        }
    }

    #[test]
    fn test_persisted_params_ignore_batch() {
        let scaler = StandardScaler::from_params(array![1.0, 2.0], array![2.0, 0.5]).unwrap();
        let mode = ScalingMode::Persisted(scaler);

        let one = mode.apply(&array![[3.0, 3.0]]).unwrap();
        let many = mode.apply(&array![[3.0, 3.0], [100.0, -100.0]]).unwrap();
        assert_eq!(one.row(0), many.row(0));
        assert_eq!(one.row(0).to_vec(), vec![1.0, 2.0]);
    }

    #[test]
    fn test_batch_fit_depends_on_batch() {
        let mode = ScalingMode::BatchFit;
        let a = mode.apply(&array![[1.0], [3.0]]).unwrap();
        let b = mode.apply(&array![[1.0], [5.0]]).unwrap();
        assert_eq!(a[[0, 0]], -1.0);
        assert_eq!(b[[0, 0]], -1.0);
        let c = mode.apply(&array![[1.0], [3.0], [5.0]]).unwrap();
        assert!((c[[0, 0]] + 1.224744871391589).abs() < 1e-12);
    }

    #[test]
    fn test_transform_width_mismatch() {
        let scaler = StandardScaler::from_params(array![0.0, 0.0], array![1.0, 1.0]).unwrap();
        let err = scaler.transform(&array![[1.0, 2.0, 3.0]]).unwrap_err();
        assert!(matches!(err, ScreenError::FeatureMismatch { expected: 2, actual: 3 }));
    }
}
