//! Symptom-to-diagnosis pipeline
//!
//! validate -> normalize -> score -> derive actions/referral -> assemble.
//! Every stage produces a new value; only engine readiness is shared state.

mod assembler;
mod normalizer;

pub use assembler::{assemble, assemble_at, DiagnosticResult};
pub use normalizer::{FeatureVector, Normalizer};

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use log::{debug, info};

use crate::config::{BackendKind, DiagnosisConfig, ServiceConfig};
use crate::engine::{
    DiagnosisBackend, DiagnosisEngine, LocalBackend, RemoteBackend, RuleBasedBackend, ScoreRequest,
};
use crate::error::{DiagnosisError, Result};
use crate::symptoms::SymptomSet;
use crate::triage::{derive_actions, derive_referral};

/// What became of a [`DiagnosisPipeline::submit`] call
#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionOutcome {
    Completed(DiagnosticResult),
    /// A newer submission was made while this one was in flight; its result was discarded
    Superseded,
}

impl SubmissionOutcome {
    pub fn into_result(self) -> Option<DiagnosticResult> {
        match self {
            SubmissionOutcome::Completed(result) => Some(result),
            SubmissionOutcome::Superseded => None,
        }
    }
}

/// Wires validation, normalization, the engine and triage together
#[derive(Debug)]
pub struct DiagnosisPipeline {
    config: DiagnosisConfig,
    normalizer: Normalizer,
    engine: Arc<DiagnosisEngine>,
    latest_submission: AtomicU64,
}

impl DiagnosisPipeline {
    /// Pipeline over an existing engine
    pub fn new(config: DiagnosisConfig, engine: Arc<DiagnosisEngine>) -> Self {
        Self {
            normalizer: Normalizer::new(config.feature_length),
            config,
            engine,
            latest_submission: AtomicU64::new(0),
        }
    }

    /// Pipeline with the backend selected by `config.backend`
    pub fn from_config(config: DiagnosisConfig) -> Result<Self> {
        config.validate()?;

        let backend: Arc<dyn DiagnosisBackend> = match config.backend {
            BackendKind::Remote => Arc::new(RemoteBackend::from_config(config.clone())?),
            BackendKind::Local => Arc::new(LocalBackend::from_config(&config)),
            BackendKind::RuleBased => Arc::new(RuleBasedBackend::new()),
        };
        info!("Diagnosis pipeline using {} backend", config.backend);

        Ok(Self::new(config, Arc::new(DiagnosisEngine::new(backend))))
    }

    pub fn config(&self) -> &DiagnosisConfig {
        &self.config
    }

    pub fn engine(&self) -> &Arc<DiagnosisEngine> {
        &self.engine
    }

    /// Bring the engine to ready; see [`DiagnosisEngine::initialize`]
    pub async fn initialize(&self) -> Result<()> {
        self.engine.initialize().await
    }

    /// Reject submissions the engine must never see
    pub fn validate(&self, symptoms: &SymptomSet, language: &str) -> Result<()> {
        if symptoms.is_empty() {
            return Err(DiagnosisError::validation("Please select at least one symptom"));
        }

        if symptoms.len() > self.config.max_symptoms {
            return Err(DiagnosisError::validation(format!(
                "At most {} symptoms may be submitted, got {}",
                self.config.max_symptoms,
                symptoms.len()
            )));
        }

        if !self.config.supports_language(language) {
            return Err(DiagnosisError::validation(format!("Unsupported language '{}'", language)));
        }

        Ok(())
    }

    /// Run one submission through the whole pipeline
    pub async fn diagnose(&self, symptoms: &SymptomSet, language: &str) -> Result<DiagnosticResult> {
        self.validate(symptoms, language)?;
        self.run(symptoms, language).await
    }

    async fn run(&self, symptoms: &SymptomSet, language: &str) -> Result<DiagnosticResult> {
        let request = ScoreRequest {
            features: self.normalizer.normalize(symptoms),
            symptoms: symptoms.names(),
            language: language.to_lowercase(),
        };

        let raw = self.engine.score(&request).await?;
        let severity = raw.severity_tier;
        let result = assemble(raw, symptoms, derive_actions(severity), derive_referral(severity));

        info!(
            "Diagnosis '{}' ({}, confidence {:.2}) for {} symptoms",
            result.diagnosis,
            result.severity,
            result.confidence,
            result.symptoms.len()
        );
        Ok(result)
    }

    /// Like [`diagnose`](Self::diagnose), but only the latest submission is reported.
    ///
    /// Rejected submissions never take a ticket, so they cannot supersede one
    /// already in flight. A superseded call still runs to completion; its result
    /// or error is dropped.
    pub async fn submit(&self, symptoms: &SymptomSet, language: &str) -> Result<SubmissionOutcome> {
        self.validate(symptoms, language)?;
        let ticket = self.latest_submission.fetch_add(1, Ordering::SeqCst) + 1;

        let outcome = self.run(symptoms, language).await;

        if self.latest_submission.load(Ordering::SeqCst) != ticket {
            debug!("Submission {} superseded, discarding its outcome", ticket);
            return Ok(SubmissionOutcome::Superseded);
        }

        outcome.map(SubmissionOutcome::Completed)
    }
}
