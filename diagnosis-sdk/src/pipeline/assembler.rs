//! Final diagnostic record

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::engine::RawScore;
use crate::symptoms::SymptomSet;
use crate::triage::{ActionPlan, ReferralDecision, SeverityTier};

/// One immutable diagnosis, as shown to the patient and stored in history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticResult {
    pub diagnosis: String,
    pub confidence: f64,
    pub severity: SeverityTier,
    pub timestamp: DateTime<Utc>,
    pub symptoms: SymptomSet,
    pub required_actions: ActionPlan,
    #[serde(default)]
    pub specialist_referral: ReferralDecision,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recommendations: Vec<String>,
}

/// Combine the pipeline outputs, stamped with the current UTC time
pub fn assemble(
    raw: RawScore,
    symptoms: &SymptomSet,
    actions: ActionPlan,
    referral: ReferralDecision,
) -> DiagnosticResult {
    assemble_at(raw, symptoms, actions, referral, Utc::now())
}

/// [`assemble`] with an explicit timestamp
pub fn assemble_at(
    raw: RawScore,
    symptoms: &SymptomSet,
    actions: ActionPlan,
    referral: ReferralDecision,
    timestamp: DateTime<Utc>,
) -> DiagnosticResult {
    DiagnosticResult {
        diagnosis: raw.diagnosis_label,
        confidence: raw.confidence,
        severity: raw.severity_tier,
        timestamp,
        symptoms: symptoms.clone(),
        required_actions: actions,
        specialist_referral: referral,
        recommendations: raw.recommendations,
    }
}
