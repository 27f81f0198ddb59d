//! Triage policy: severity tier to action plan and specialist referral
//!
//! Both derivations are pure and match exhaustively on [`SeverityTier`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DiagnosisError;

/// Signal above which a score is high severity
pub const HIGH_SEVERITY_THRESHOLD: f64 = 0.7;

/// Signal above which a score is at least medium severity
pub const MEDIUM_SEVERITY_THRESHOLD: f64 = 0.3;

/// Coarse triage bucket driving actions and referral
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeverityTier {
    Low,
    Medium,
    High,
}

impl SeverityTier {
    pub const ALL: [SeverityTier; 3] = [SeverityTier::Low, SeverityTier::Medium, SeverityTier::High];

    /// Bucket a raw severity signal: `s > 0.7` high, `0.3 < s <= 0.7` medium, else low
    pub fn from_signal(signal: f64) -> Self {
        if signal > HIGH_SEVERITY_THRESHOLD {
            SeverityTier::High
        } else if signal > MEDIUM_SEVERITY_THRESHOLD {
            SeverityTier::Medium
        } else {
            SeverityTier::Low
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            SeverityTier::Low => "low",
            SeverityTier::Medium => "medium",
            SeverityTier::High => "high",
        }
    }
}

impl fmt::Display for SeverityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SeverityTier {
    type Err = DiagnosisError;

    /// Labels outside the policy table are a referral policy gap
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(SeverityTier::Low),
            "medium" => Ok(SeverityTier::Medium),
            "high" => Ok(SeverityTier::High),
            _ => Err(DiagnosisError::referral_policy_gap(s)),
        }
    }
}

/// What the patient should do now and afterwards
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionPlan {
    pub immediate: Vec<String>,
    pub follow_up: Vec<String>,
}

impl ActionPlan {
    fn from_static(immediate: &[&str], follow_up: &[&str]) -> Self {
        Self {
            immediate: immediate.iter().map(|action| action.to_string()).collect(),
            follow_up: follow_up.iter().map(|action| action.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Routine,
    Urgent,
    Emergency,
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Urgency::Routine => write!(f, "routine"),
            Urgency::Urgent => write!(f, "urgent"),
            Urgency::Emergency => write!(f, "emergency"),
        }
    }
}

/// Whether the patient must be routed to a specialist, and how fast
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferralDecision {
    pub required: bool,
    pub urgency: Urgency,
}

impl Default for ReferralDecision {
    fn default() -> Self {
        Self {
            required: false,
            urgency: Urgency::Routine,
        }
    }
}

/// Action plan for a severity tier
pub fn derive_actions(severity: SeverityTier) -> ActionPlan {
    match severity {
        SeverityTier::Low => ActionPlan::from_static(&["Rest", "Stay hydrated"], &["Monitor symptoms"]),
        SeverityTier::Medium => ActionPlan::from_static(
            &["Rest", "Stay hydrated", "Take prescribed medication"],
            &["Schedule follow-up in 48 hours"],
        ),
        SeverityTier::High => ActionPlan::from_static(
            &["Seek immediate medical attention", "Take prescribed medication"],
            &["Urgent medical review required"],
        ),
    }
}

/// Referral decision for a severity tier: only high severity is referred, as an emergency
pub fn derive_referral(severity: SeverityTier) -> ReferralDecision {
    match severity {
        SeverityTier::High => ReferralDecision {
            required: true,
            urgency: Urgency::Emergency,
        },
        SeverityTier::Low | SeverityTier::Medium => ReferralDecision {
            required: false,
            urgency: Urgency::Routine,
        },
    }
}
