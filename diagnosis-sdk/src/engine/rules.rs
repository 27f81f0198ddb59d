//! Deterministic offline rules keyed on symptom names

use std::collections::HashSet;

use async_trait::async_trait;

use super::{BackendOutput, DiagnosisBackend, ScoreRequest, SeveritySignal};
use crate::error::Result;
use crate::triage::SeverityTier;

struct Rule {
    requires: &'static [&'static str],
    label: &'static str,
    confidence: f64,
    severity: SeverityTier,
    recommendations: &'static [&'static str],
}

/// Checked in order; the first rule whose symptoms are all present wins
const RULES: &[Rule] = &[
    Rule {
        requires: &["fever", "cough", "shortness of breath"],
        label: "Possible Pneumonia",
        confidence: 0.75,
        severity: SeverityTier::High,
        recommendations: &["Seek medical attention", "Rest", "Stay hydrated"],
    },
    Rule {
        requires: &["fever", "cough"],
        label: "Common Cold or Influenza",
        confidence: 0.85,
        severity: SeverityTier::Medium,
        recommendations: &["Rest", "Fluids", "Over-the-counter medication"],
    },
    Rule {
        requires: &["headache", "nausea"],
        label: "Possible Migraine",
        confidence: 0.70,
        severity: SeverityTier::Medium,
        recommendations: &["Rest in dark room", "Stay hydrated", "Pain relievers"],
    },
];

static FALLBACK: Rule = Rule {
    requires: &[],
    label: "Unspecified Condition",
    confidence: 0.50,
    severity: SeverityTier::Low,
    recommendations: &["Monitor symptoms", "Consult with healthcare provider if symptoms persist"],
};

/// Backend for kiosks running without a model or network; selected explicitly
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleBasedBackend;

impl RuleBasedBackend {
    pub fn new() -> Self {
        Self
    }

    /// Evaluate the rules against case-insensitive symptom names
    pub fn evaluate(&self, symptoms: &[String]) -> BackendOutput {
        let present: HashSet<String> = symptoms.iter().map(|name| name.trim().to_lowercase()).collect();

        let rule = RULES
            .iter()
            .find(|rule| rule.requires.iter().all(|name| present.contains(*name)))
            .unwrap_or(&FALLBACK);

        BackendOutput {
            label: rule.label.to_string(),
            confidence: rule.confidence,
            signal: SeveritySignal::Tier(rule.severity),
            recommendations: rule.recommendations.iter().map(|r| r.to_string()).collect(),
        }
    }
}

#[async_trait]
impl DiagnosisBackend for RuleBasedBackend {
    fn name(&self) -> &'static str {
        "rule_based"
    }

    async fn load(&self) -> Result<()> {
        Ok(())
    }

    async fn score(&self, request: &ScoreRequest) -> Result<BackendOutput> {
        Ok(self.evaluate(&request.symptoms))
    }
}
