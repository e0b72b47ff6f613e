//! Utility functions and types

pub mod data_loader;

pub use data_loader::{frame_to_matrix, DataLoader, FeatureMatrix};

/// Escape text for inclusion in HTML markup
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
