//! Canned result text selected by the screening outcome

use crate::model::Label;
use serde::Serialize;

pub const SYMPTOMATIC_HEADLINE: &str = "You have symptoms of Epilepsy.";
pub const REFERRAL: &str = "Please approach a doctor for further screening and diagnosis.";
pub const PREVENTION_HEADING: &str = "Prevention Measures:";
pub const CLEAR_HEADLINE: &str = "You are safe and have no symptoms of Epilepsy.";
pub const CLEAR_NOTE: &str = "Take care of your health.";

pub const PREVENTION_TIPS: [&str; 7] = [
    "Get enough sleep and maintain a regular sleep schedule.",
    "Manage stress through relaxation techniques.",
    "Avoid excessive alcohol consumption.",
    "Follow a balanced diet and stay hydrated.",
    "Take medication as prescribed.",
    "Wear a medical alert bracelet.",
    "Avoid seizure triggers.",
];

/// One of the two fixed result templates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Narrative {
    Symptomatic,
    Clear,
}

impl Narrative {
    pub fn for_label(label: Label) -> Self {
        match label {
            Label::Symptomatic => Narrative::Symptomatic,
            Label::Clear => Narrative::Clear,
        }
    }

    pub fn label(self) -> Label {
        match self {
            Narrative::Symptomatic => Label::Symptomatic,
            Narrative::Clear => Label::Clear,
        }
    }

    pub fn headline(self) -> &'static str {
        match self {
            Narrative::Symptomatic => SYMPTOMATIC_HEADLINE,
            Narrative::Clear => CLEAR_HEADLINE,
        }
    }

    /// Follow-up sentence shown under the headline
    pub fn advice(self) -> &'static str {
        match self {
            Narrative::Symptomatic => REFERRAL,
            Narrative::Clear => CLEAR_NOTE,
        }
    }

    /// Numbered prevention tips ("1. ..." to "7. ..."); empty when clear
    pub fn prevention_tips(self) -> Vec<String> {
        match self {
            Narrative::Symptomatic => PREVENTION_TIPS
                .iter()
                .enumerate()
                .map(|(i, tip)| format!("{}. {}", i + 1, tip))
                .collect(),
            Narrative::Clear => Vec::new(),
        }
    }

    /// Report body lines, in order
    pub fn lines(self) -> Vec<String> {
        match self {
            Narrative::Symptomatic => {
                let mut lines = vec![
                    SYMPTOMATIC_HEADLINE.to_string(),
                    REFERRAL.to_string(),
                    PREVENTION_HEADING.to_string(),
                ];
                lines.extend(self.prevention_tips());
                lines
            }
            Narrative::Clear => vec![format!("{} {}", CLEAR_HEADLINE, CLEAR_NOTE)],
        }
    }
}
