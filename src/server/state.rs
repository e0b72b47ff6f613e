//! Application state management

use std::sync::Arc;
use tokio::sync::Mutex;

use crate::config::AppConfig;
use crate::model::ScreeningModel;

use super::pages::PageContext;

/// Application state shared across handlers
pub struct AppState {
    pub config: AppConfig,
    pub model: Arc<ScreeningModel>,
    /// Serializes writes to the shared report path
    pub report_lock: Mutex<()>,
    pub started_at: chrono::DateTime<chrono::Utc>,
    show_images: bool,
}

impl AppState {
    pub fn new(config: AppConfig, model: ScreeningModel) -> Self {
        let show_images = config.static_dir.is_dir();
        Self {
            config,
            model: Arc::new(model),
            report_lock: Mutex::new(()),
            started_at: chrono::Utc::now(),
            show_images,
        }
    }

    pub fn page_context(&self) -> PageContext {
        PageContext {
            variant: self.config.variant,
            show_images: self.show_images,
        }
    }
}
