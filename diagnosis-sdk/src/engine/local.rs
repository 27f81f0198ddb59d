//! In-process scoring from a versioned JSON artifact
//!
//! The artifact is a linear softmax classifier over the feature vector plus a
//! logistic severity head:
//!
//! ```json
//! {
//!   "name": "kiosk-triage",
//!   "version": "1.0.0",
//!   "input_size": 100,
//!   "conditions": [{"label": "Flu", "weights": [...], "bias": 0.1, "recommendations": ["Rest"]}],
//!   "severity_head": {"weights": [...], "bias": -0.5}
//! }
//! ```

use std::path::PathBuf;

use async_trait::async_trait;
use log::{debug, info};
use once_cell::sync::OnceCell;
use serde::Deserialize;

use super::{BackendOutput, DiagnosisBackend, ScoreRequest, SeveritySignal};
use crate::config::DiagnosisConfig;
use crate::error::{DiagnosisError, Result};

#[derive(Debug, Clone, Deserialize)]
pub struct ConditionHead {
    pub label: String,
    pub weights: Vec<f32>,
    pub bias: f32,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeverityHead {
    pub weights: Vec<f32>,
    pub bias: f32,
}

/// Parsed scoring artifact
#[derive(Debug, Clone, Deserialize)]
pub struct ScoringArtifact {
    pub name: String,
    pub version: String,
    pub input_size: usize,
    pub conditions: Vec<ConditionHead>,
    pub severity_head: SeverityHead,
}

impl ScoringArtifact {
    /// Check the artifact against the expected version and input size
    pub fn verify(&self, expected_version: &str, feature_length: usize) -> Result<()> {
        if self.version != expected_version {
            return Err(DiagnosisError::init(format!(
                "Model version mismatch: artifact is {}, expected {}",
                self.version, expected_version
            )));
        }

        if self.input_size != feature_length {
            return Err(DiagnosisError::init(format!(
                "Model input size {} does not match feature length {}",
                self.input_size, feature_length
            )));
        }

        if self.conditions.is_empty() {
            return Err(DiagnosisError::init("Model defines no conditions"));
        }

        for condition in &self.conditions {
            if condition.weights.len() != self.input_size {
                return Err(DiagnosisError::init(format!(
                    "Condition '{}' has {} weights, expected {}",
                    condition.label,
                    condition.weights.len(),
                    self.input_size
                )));
            }
        }

        if self.severity_head.weights.len() != self.input_size {
            return Err(DiagnosisError::init(format!(
                "Severity head has {} weights, expected {}",
                self.severity_head.weights.len(),
                self.input_size
            )));
        }

        Ok(())
    }

    /// Top condition and severity signal for `features`
    pub fn evaluate(&self, features: &[f32]) -> Result<BackendOutput> {
        if features.len() != self.input_size {
            return Err(DiagnosisError::inference(format!(
                "Feature vector has {} entries, model expects {}",
                features.len(),
                self.input_size
            )));
        }

        let logits: Vec<f64> = self
            .conditions
            .iter()
            .map(|condition| dot(&condition.weights, features) + f64::from(condition.bias))
            .collect();
        let probabilities = softmax(&logits);

        let (best, confidence) = probabilities
            .iter()
            .copied()
            .enumerate()
            .fold(None, |best: Option<(usize, f64)>, (index, p)| match best {
                Some((_, top)) if top >= p => best,
                _ => Some((index, p)),
            })
            .ok_or_else(|| DiagnosisError::inference("Model produced no probabilities"))?;

        let condition = &self.conditions[best];
        let signal = sigmoid(dot(&self.severity_head.weights, features) + f64::from(self.severity_head.bias));

        Ok(BackendOutput {
            label: condition.label.clone(),
            confidence,
            signal: SeveritySignal::Score(signal),
            recommendations: condition.recommendations.clone(),
        })
    }
}

fn dot(weights: &[f32], features: &[f32]) -> f64 {
    weights
        .iter()
        .zip(features)
        .map(|(w, x)| f64::from(*w) * f64::from(*x))
        .sum()
}

fn softmax(logits: &[f64]) -> Vec<f64> {
    let max = logits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = logits.iter().map(|logit| (logit - max).exp()).collect();
    let total: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / total).collect()
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Backend that scores with an artifact loaded once from disk
#[derive(Debug)]
pub struct LocalBackend {
    path: PathBuf,
    expected_version: String,
    feature_length: usize,
    artifact: OnceCell<ScoringArtifact>,
}

impl LocalBackend {
    pub fn new(path: impl Into<PathBuf>, expected_version: impl Into<String>, feature_length: usize) -> Self {
        Self {
            path: path.into(),
            expected_version: expected_version.into(),
            feature_length,
            artifact: OnceCell::new(),
        }
    }

    pub fn from_config(config: &DiagnosisConfig) -> Self {
        Self::new(&config.model_path, &config.model_version, config.feature_length)
    }

    /// The loaded artifact, if `load` has succeeded
    pub fn artifact(&self) -> Option<&ScoringArtifact> {
        self.artifact.get()
    }
}

#[async_trait]
impl DiagnosisBackend for LocalBackend {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn load(&self) -> Result<()> {
        if self.artifact.get().is_some() {
            return Ok(());
        }

        debug!("Loading scoring artifact from {}", self.path.display());
        let raw = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            DiagnosisError::init(format!("Cannot read model at {}: {}", self.path.display(), e))
        })?;

        let artifact: ScoringArtifact = serde_json::from_str(&raw)
            .map_err(|e| DiagnosisError::init(format!("Malformed model at {}: {}", self.path.display(), e)))?;
        artifact.verify(&self.expected_version, self.feature_length)?;

        info!(
            "Loaded model '{}' v{} with {} conditions",
            artifact.name,
            artifact.version,
            artifact.conditions.len()
        );

        // Ignored when a concurrent load of the same file got there first
        let _ = self.artifact.set(artifact);
        Ok(())
    }

    async fn score(&self, request: &ScoreRequest) -> Result<BackendOutput> {
        let artifact = self
            .artifact
            .get()
            .ok_or_else(|| DiagnosisError::inference("Scoring artifact is not loaded"))?;
        artifact.evaluate(request.features.as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artifact() -> ScoringArtifact {
        ScoringArtifact {
            name: "test".to_string(),
            version: "1.0.0".to_string(),
            input_size: 2,
            conditions: vec![
                ConditionHead {
                    label: "Flu".to_string(),
                    weights: vec![2.0, 0.0],
                    bias: 0.0,
                    recommendations: vec!["Rest".to_string()],
                },
                ConditionHead {
                    label: "Migraine".to_string(),
                    weights: vec![0.0, 2.0],
                    bias: 0.0,
                    recommendations: Vec::new(),
                },
            ],
            severity_head: SeverityHead {
                weights: vec![0.0, 0.0],
                bias: 0.0,
            },
        }
    }

    #[test]
    fn test_evaluate_picks_top_condition() {
        let output = artifact().evaluate(&[1.0, 0.0]).unwrap();
        assert_eq!(output.label, "Flu");
        assert!(output.confidence > 0.5 && output.confidence < 1.0);
        assert_eq!(output.signal, SeveritySignal::Score(0.5));
        assert_eq!(output.recommendations, vec!["Rest".to_string()]);
    }

    #[test]
    fn test_verify_rejects_mismatches() {
        assert!(artifact().verify("1.0.0", 2).is_ok());
        assert!(artifact().verify("2.0.0", 2).unwrap_err().is_init());
        assert!(artifact().verify("1.0.0", 100).unwrap_err().is_init());

        let mut ragged = artifact();
        ragged.conditions[1].weights.pop();
        assert!(ragged.verify("1.0.0", 2).unwrap_err().is_init());
    }

    #[test]
    fn test_evaluate_rejects_wrong_length() {
        assert!(artifact().evaluate(&[1.0]).unwrap_err().is_inference());
    }
}
