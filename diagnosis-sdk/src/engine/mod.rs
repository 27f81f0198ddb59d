//! Diagnosis engine: readiness state machine over an interchangeable backend
//!
//! A [`DiagnosisEngine`] owns one [`DiagnosisBackend`] and moves through
//! `Uninitialized -> Initializing -> Ready | Failed`. Loads are serialized;
//! concurrent `initialize` callers all observe the outcome of the single load
//! that ran. `Failed` stays put until `initialize` is called again.
//!
//! Backends report a label, a confidence and either a tier label or a raw
//! severity signal. The engine turns that into a [`RawScore`]: validation,
//! confidence clamping and signal thresholding.

pub mod local;
pub mod remote;
pub mod rules;

pub use local::LocalBackend;
pub use remote::RemoteBackend;
pub use rules::RuleBasedBackend;

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};

use crate::error::{DiagnosisError, Result};
use crate::pipeline::FeatureVector;
use crate::triage::SeverityTier;

/// Everything a backend may need to score one submission
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreRequest {
    /// Fixed-length encoding used by in-process scorers
    pub features: FeatureVector,
    /// Canonical symptom names used by the remote and rule-based backends
    pub symptoms: Vec<String>,
    /// Language code of the submission
    pub language: String,
}

/// How a backend expresses severity
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SeveritySignal {
    /// Backend already picked a tier
    Tier(SeverityTier),
    /// Raw signal, bucketed by [`SeverityTier::from_signal`]
    Score(f64),
}

/// Unnormalized backend answer
#[derive(Debug, Clone, PartialEq)]
pub struct BackendOutput {
    pub label: String,
    pub confidence: f64,
    pub signal: SeveritySignal,
    pub recommendations: Vec<String>,
}

/// Normalized engine output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawScore {
    pub diagnosis_label: String,
    /// Always within `[0, 1]`
    pub confidence: f64,
    pub severity_tier: SeverityTier,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recommendations: Vec<String>,
}

/// A source of raw scores
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DiagnosisBackend: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Acquire whatever the backend needs before scoring. Called at most once
    /// per `initialize` attempt.
    async fn load(&self) -> Result<()>;

    /// Score one submission
    async fn score(&self, request: &ScoreRequest) -> Result<BackendOutput>;
}

/// Engine readiness
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineState {
    Uninitialized,
    Initializing,
    Ready,
    /// Last load failed; holds the failure message
    Failed(String),
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineState::Uninitialized => write!(f, "uninitialized"),
            EngineState::Initializing => write!(f, "initializing"),
            EngineState::Ready => write!(f, "ready"),
            EngineState::Failed(reason) => write!(f, "failed ({})", reason),
        }
    }
}

/// Explicitly constructed, shareable diagnosis engine
pub struct DiagnosisEngine {
    backend: Arc<dyn DiagnosisBackend>,
    state: RwLock<EngineState>,
    init_lock: tokio::sync::Mutex<()>,
    /// Completed load attempts
    attempts: AtomicU64,
}

impl fmt::Debug for DiagnosisEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiagnosisEngine")
            .field("backend", &self.backend.name())
            .field("state", &self.state())
            .finish()
    }
}

impl DiagnosisEngine {
    pub fn new(backend: Arc<dyn DiagnosisBackend>) -> Self {
        Self {
            backend,
            state: RwLock::new(EngineState::Uninitialized),
            init_lock: tokio::sync::Mutex::new(()),
            attempts: AtomicU64::new(0),
        }
    }

    /// Name of the wrapped backend
    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Snapshot of the current state
    pub fn state(&self) -> EngineState {
        self.state.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state(), EngineState::Ready)
    }

    fn set_state(&self, state: EngineState) {
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = state;
    }

    /// Bring the engine to `Ready`.
    ///
    /// Idempotent once ready. Callers that queued behind an in-flight load get
    /// that load's result instead of starting another; a caller arriving after
    /// a failure starts a fresh attempt.
    pub async fn initialize(&self) -> Result<()> {
        let observed = self.attempts.load(Ordering::SeqCst);
        let _guard = self.init_lock.lock().await;

        match self.state() {
            EngineState::Ready => return Ok(()),
            EngineState::Failed(reason) if self.attempts.load(Ordering::SeqCst) != observed => {
                return Err(DiagnosisError::init(reason));
            }
            _ => {}
        }

        self.set_state(EngineState::Initializing);
        info!("Initializing {} diagnosis backend", self.backend.name());

        let outcome = self.backend.load().await;
        self.attempts.fetch_add(1, Ordering::SeqCst);

        match outcome {
            Ok(()) => {
                self.set_state(EngineState::Ready);
                info!("{} diagnosis backend ready", self.backend.name());
                Ok(())
            }
            Err(e) => {
                let reason = e.message().to_string();
                error!("{} diagnosis backend failed to load: {}", self.backend.name(), e);
                self.set_state(EngineState::Failed(reason.clone()));
                Err(DiagnosisError::init(reason))
            }
        }
    }

    /// Score one submission; fails fast without touching the backend unless `Ready`
    pub async fn score(&self, request: &ScoreRequest) -> Result<RawScore> {
        let state = self.state();
        if state != EngineState::Ready {
            warn!("Score requested while engine is {}", state);
            return Err(DiagnosisError::inference(format!(
                "Diagnosis engine is not ready (state: {})",
                state
            )));
        }

        let output = self
            .backend
            .score(request)
            .await
            .map_err(DiagnosisError::into_inference)?;

        let score = normalize_output(output)?;
        debug!(
            "{} scored '{}' at {:.2} ({})",
            self.backend.name(),
            score.diagnosis_label,
            score.confidence,
            score.severity_tier
        );
        Ok(score)
    }
}

/// Validate a backend answer and bucket its severity
fn normalize_output(output: BackendOutput) -> Result<RawScore> {
    let label = output.label.trim();
    if label.is_empty() {
        return Err(DiagnosisError::inference("Backend returned an empty diagnosis label"));
    }

    if !output.confidence.is_finite() {
        return Err(DiagnosisError::inference(format!(
            "Backend returned a non-finite confidence: {}",
            output.confidence
        )));
    }

    let severity_tier = match output.signal {
        SeveritySignal::Tier(tier) => tier,
        SeveritySignal::Score(signal) if signal.is_finite() => SeverityTier::from_signal(signal),
        SeveritySignal::Score(signal) => {
            return Err(DiagnosisError::inference(format!(
                "Backend returned a non-finite severity signal: {}",
                signal
            )));
        }
    };

    Ok(RawScore {
        diagnosis_label: label.to_string(),
        confidence: output.confidence.clamp(0.0, 1.0),
        severity_tier,
        recommendations: output.recommendations,
    })
}
