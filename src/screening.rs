//! One screening pass: normalize, classify, pick the narrative

use crate::error::{Result, ScreenError};
use crate::model::{Label, ScreeningModel};
use crate::narrative::Narrative;
use crate::patient::PatientRecord;
use crate::report::ReportDocument;
use crate::utils::FeatureMatrix;
use serde::Serialize;
use tracing::info;

/// Result of screening one upload
#[derive(Debug, Clone, Serialize)]
pub struct ScreeningOutcome {
    pub patient: PatientRecord,
    /// One label per uploaded row
    pub labels: Vec<Label>,
    /// Selected from the first row's label
    pub narrative: Narrative,
}

impl ScreeningOutcome {
    pub fn label(&self) -> Label {
        self.narrative.label()
    }

    pub fn rows(&self) -> usize {
        self.labels.len()
    }

    /// Rows labelled symptomatic
    pub fn flagged(&self) -> usize {
        self.labels.iter().filter(|l| **l == Label::Symptomatic).count()
    }

    pub fn report(&self) -> ReportDocument {
        ReportDocument::new(&self.patient, self.narrative)
    }
}

/// Classify every row; the first row decides the narrative
pub fn screen(
    model: &ScreeningModel,
    patient: PatientRecord,
    features: &FeatureMatrix,
) -> Result<ScreeningOutcome> {
    let labels = model.screen(features)?;
    let first = *labels
        .first()
        .ok_or_else(|| ScreenError::DataError("Upload has no rows to classify".to_string()))?;
    let narrative = Narrative::for_label(first);

    let outcome = ScreeningOutcome { patient, labels, narrative };
    info!(
        rows = outcome.rows(),
        flagged = outcome.flagged(),
        label = %first,
        scaling = model.scaling().name(),
        "Screening complete"
    );
    Ok(outcome)
}
