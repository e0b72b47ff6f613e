//! Runtime configuration
//!
//! Defaults come from environment variables; CLI flags override them.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::ScreenError;

/// Which of the two screening front-ends to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    /// Tree-ensemble classifier; writes a PDF report for every prediction
    Forest,
    /// Margin classifier; shows the uploaded data and the verdict on screen
    Svm,
}

impl Variant {
    /// Artifact filename used when no model path is configured
    pub fn default_model_path(self) -> &'static str {
        match self {
            Variant::Forest => "pipelinemodel.json",
            Variant::Svm => "svmmodel.json",
        }
    }

    pub fn writes_report(self) -> bool {
        matches!(self, Variant::Forest)
    }

    pub fn shows_upload_preview(self) -> bool {
        matches!(self, Variant::Svm)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Variant::Forest => "forest",
            Variant::Svm => "svm",
        }
    }
}

impl FromStr for Variant {
    type Err = ScreenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "forest" | "random_forest" | "rf" => Ok(Variant::Forest),
            "svm" => Ok(Variant::Svm),
            other => Err(ScreenError::ValidationError(format!(
                "Unknown variant '{}', expected forest or svm",
                other
            ))),
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub variant: Variant,
    pub host: String,
    pub port: u16,
    pub model_path: PathBuf,
    pub report_path: PathBuf,
    pub static_dir: PathBuf,
    pub max_upload_size: usize,
    pub preview_rows: usize,
}

impl AppConfig {
    /// Defaults for a variant, read from the environment where set
    pub fn from_env(variant: Variant) -> Self {
        Self {
            variant,
            host: std::env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env_parse("API_PORT").unwrap_or(8501),
            model_path: std::env::var("MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(variant.default_model_path())),
            report_path: std::env::var("REPORT_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("epilepsy_report.pdf")),
            static_dir: std::env::var("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("static")),
            max_upload_size: env_parse("MAX_UPLOAD_SIZE").unwrap_or(10 * 1024 * 1024),
            preview_rows: env_parse("PREVIEW_ROWS").unwrap_or(20),
        }
    }
}

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}
