//! Epilepsy screening front-end
//!
//! Classifies uploaded EEG feature tables with an externally trained
//! binary model and presents the outcome to the patient:
//! - web form with result page, and a PDF report for the forest variant
//! - JSON API for scripted use
//! - offline CLI screening
//!
//! # Modules
//!
//! ## Pipeline
//! - [`utils`] - CSV ingestion into feature matrices
//! - [`preprocessing`] - Standardization of features
//! - [`model`] - Classifier artifacts (random forest, SVM)
//! - [`screening`] - One screening pass over an upload
//!
//! ## Presentation
//! - [`narrative`] - Fixed result text
//! - [`report`] - PDF report document
//! - [`server`] - HTTP front-end
//! - [`cli`] - Command-line interface

// Core error handling
pub mod error;
pub mod config;

// Pipeline
pub mod patient;
pub mod utils;
pub mod preprocessing;
pub mod model;
pub mod screening;

// Presentation
pub mod narrative;
pub mod report;

// Services
pub mod server;
pub mod cli;

pub use error::{Result, ScreenError};

/// Re-export commonly used types
pub mod prelude {
    // Error handling
    pub use crate::error::{Result, ScreenError};

    // Configuration
    pub use crate::config::{AppConfig, Variant};

    // Pipeline
    pub use crate::patient::{Age, Gender, PatientRecord};
    pub use crate::utils::{DataLoader, FeatureMatrix};
    pub use crate::preprocessing::{ScalingMode, StandardScaler};
    pub use crate::model::{Classifier, ClassifierModel, Label, ModelArtifact, ScreeningModel};
    pub use crate::screening::{screen, ScreeningOutcome};

    // Presentation
    pub use crate::narrative::Narrative;
    pub use crate::report::ReportDocument;
}
