//! # Diagnosis SDK
//!
//! The symptom-to-diagnosis pipeline of the AI Health Diagnosis kiosk.
//!
//! This crate provides:
//!
//! - Symptom records, the session symptom set and the built-in catalog
//! - Deterministic symptom normalization into a fixed-length feature vector
//! - A diagnosis engine over interchangeable backends (remote, local, rules)
//! - Triage policy: severity tier to action plan and specialist referral
//! - Result assembly into an immutable, timestamped diagnostic record
//! - Backend clients for diagnosis history and health polling
//! - Configuration management and a single error type
//!
//! ## Architecture
//!
//! - `DiagnosisPipeline`: validate, normalize, score, derive, assemble
//! - `DiagnosisEngine`: readiness state machine around a `DiagnosisBackend`
//! - `ServiceClient` / `RequestExecutor`: the REST boundary, built by `ClientBuilder`
//! - `DiagnosisError`: categorized errors with request context
//!
//! ```no_run
//! use diagnosis_sdk::{DiagnosisConfig, DiagnosisPipeline, SymptomCatalog, SymptomSet};
//!
//! # async fn run() -> diagnosis_sdk::Result<()> {
//! let pipeline = DiagnosisPipeline::from_config(DiagnosisConfig::from_env()?)?;
//! pipeline.initialize().await?;
//!
//! let catalog = SymptomCatalog::standard();
//! let symptoms = SymptomSet::try_from_symptoms(catalog.entries().iter().take(2).map(|e| e.to_symptom()))?;
//! let result = pipeline.diagnose(&symptoms, "en").await?;
//! println!("{} ({})", result.diagnosis, result.severity);
//! # Ok(())
//! # }
//! ```

// Re-export core modules
pub mod core;
pub use core::{ClientBuilder, RequestExecutor, ServiceClient};

// Re-export error handling
pub mod error;
pub use error::{DiagnosisError, ErrorContext, ErrorKind, Result};

// Re-export configuration management
pub mod config;
pub use config::{BackendKind, ConfigProvider, DiagnosisConfig, Language, ServiceConfig};

pub mod symptoms;
pub use symptoms::{Symptom, SymptomCatalog, SymptomSet, SymptomSeverity};

pub mod triage;
pub use triage::{derive_actions, derive_referral, ActionPlan, ReferralDecision, SeverityTier, Urgency};

pub mod engine;
pub use engine::{DiagnosisBackend, DiagnosisEngine, EngineState, RawScore};

pub mod pipeline;
pub use pipeline::{DiagnosisPipeline, DiagnosticResult, FeatureVector, Normalizer, SubmissionOutcome};

// Backend clients
pub mod services;
pub use services::{ApiClient, ConnectionStatus, HealthProbe, HistoryClient};

// Utility module for common functionality
mod util;

#[cfg(test)]
mod tests;

/// Create a new default client builder
pub fn client() -> core::ClientBuilder {
    core::ClientBuilder::new()
}
