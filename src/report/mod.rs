//! Screening report document
//!
//! The report combines the patient record with the selected narrative:
//! a title, a "Patient Information" section and an "Epilepsy Prediction"
//! section. It renders to plain text or to a paginated PDF.

mod pdf;

use crate::error::{Result, ScreenError};
use crate::narrative::Narrative;
use crate::patient::PatientRecord;
use serde::Serialize;
use std::path::Path;
use tracing::info;

pub use pdf::{wrap_text, PageLayout};

pub const REPORT_TITLE: &str = "Epilepsy Prediction Report";
pub const PATIENT_SECTION: &str = "Patient Information";
pub const PREDICTION_SECTION: &str = "Epilepsy Prediction";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportSection {
    pub title: String,
    pub lines: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportDocument {
    pub title: String,
    pub sections: Vec<ReportSection>,
}

impl ReportDocument {
    pub fn new(patient: &PatientRecord, narrative: Narrative) -> Self {
        Self {
            title: REPORT_TITLE.to_string(),
            sections: vec![
                ReportSection {
                    title: PATIENT_SECTION.to_string(),
                    lines: vec![
                        format!("Name: {}", patient.name),
                        format!("Age: {} years", patient.age),
                        format!("Gender: {}", patient.gender),
                    ],
                },
                ReportSection {
                    title: PREDICTION_SECTION.to_string(),
                    lines: narrative.lines(),
                },
            ],
        }
    }

    /// Plain-text rendering with the same content and order as the PDF
    pub fn to_text(&self) -> String {
        let mut out = format!("{}\n", self.title);
        for section in &self.sections {
            out.push('\n');
            out.push_str(&section.title);
            out.push('\n');
            for line in &section.lines {
                out.push_str(line);
                out.push('\n');
            }
        }
        out
    }

    pub fn render_pdf(&self) -> Result<Vec<u8>> {
        pdf::render(self, &PageLayout::default())
    }

    /// Render and write the PDF to `path`, replacing any previous report.
    /// Nothing is written if rendering fails.
    pub fn write_pdf(&self, path: impl AsRef<Path>) -> Result<usize> {
        let path = path.as_ref();
        let bytes = self.render_pdf()?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, &bytes).map_err(|e| {
            ScreenError::ReportError(format!("cannot write {}: {}", path.display(), e))
        })?;
        info!(path = %path.display(), bytes = bytes.len(), "Report written");
        Ok(bytes.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Label;
    use crate::patient::{Age, Gender};

    fn patient() -> PatientRecord {
        PatientRecord::new("Jane Doe", Age::clamped(42), Gender::Female)
    }

    #[test]
    fn test_patient_lines_interpolated() {
        let report = ReportDocument::new(&patient(), Narrative::Clear);
        assert_eq!(report.title, REPORT_TITLE);
        assert_eq!(
            report.sections[0].lines,
            vec!["Name: Jane Doe", "Age: 42 years", "Gender: Female"]
        );
        assert_eq!(report.sections[1].title, PREDICTION_SECTION);
    }

    #[test]
    fn test_symptomatic_report_lists_tips() {
        let report = ReportDocument::new(&patient(), Narrative::for_label(Label::Symptomatic));
        let text = report.to_text();
        for n in 1..=7 {
            assert!(text.contains(&format!("\n{}. ", n)), "missing tip {}", n);
        }
        assert!(text.contains("Please approach a doctor"));
    }

    #[test]
    fn test_identical_inputs_identical_text() {
        let a = ReportDocument::new(&patient(), Narrative::Symptomatic).to_text();
        let b = ReportDocument::new(&patient(), Narrative::Symptomatic).to_text();
        assert_eq!(a, b);
    }

    #[test]
    fn test_write_pdf_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reports").join("epilepsy_report.pdf");

        ReportDocument::new(&patient(), Narrative::Symptomatic).write_pdf(&path).unwrap();
        let first = std::fs::read(&path).unwrap();
        assert!(first.starts_with(b"%PDF"));

        let written = ReportDocument::new(&patient(), Narrative::Clear).write_pdf(&path).unwrap();
        assert_eq!(std::fs::metadata(&path).unwrap().len() as usize, written);
    }
}
