//! Data preprocessing module
//!
//! Standardizes uploaded feature matrices before classification, either with
//! the training-time parameters stored in the model artifact or, for
//! artifacts that carry none, with parameters fitted on the upload itself.

mod scaler;

pub use scaler::{ScalingMode, StandardScaler};
