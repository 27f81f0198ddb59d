//! Kiosk Session Example
//!
//! Runs one symptom submission through the diagnosis pipeline while a health
//! poller watches the backend.
//!
//! To run this example against a local backend:
//! ```
//! KIOSK_API_URL=http://localhost:5000 cargo run --example kiosk_session -- 1 2
//! ```
//!
//! Without a backend, use the offline rules:
//! ```
//! KIOSK_BACKEND=rule_based cargo run --example kiosk_session -- 1 2
//! ```
//!
//! Arguments are catalog symptom ids; set `KIOSK_PATIENT_ID` to also list past
//! diagnoses and `KIOSK_LANGUAGE` to submit in another supported language.

use std::env;

use anyhow::{bail, Context};
use diagnosis_sdk::{
    DiagnosisConfig, DiagnosisPipeline, HealthProbe, HistoryClient, SubmissionOutcome, SymptomCatalog,
    SymptomSet,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = DiagnosisConfig::from_env().context("invalid KIOSK_* configuration")?;
    let language = env::var("KIOSK_LANGUAGE").unwrap_or_else(|_| config.default_language().to_string());

    // Catalog selection, as on the intake screen
    let catalog = SymptomCatalog::standard();
    let mut symptoms = SymptomSet::new();
    for id in env::args().skip(1) {
        let Some(entry) = catalog.get(&id) else {
            bail!("unknown symptom id '{}'", id);
        };
        if !symptoms.insert(entry.to_symptom()) {
            println!("{} is already selected", entry.name);
        }
    }

    for symptom in &symptoms {
        println!("- {} ({})", symptom.display_name(&language), symptom.severity);
    }

    let (status, poller) = HealthProbe::from_config(&config)?.spawn_poller(config.health_poll_interval);

    let pipeline = DiagnosisPipeline::from_config(config.clone())?;
    pipeline.initialize().await.context("diagnosis engine failed to start")?;

    match pipeline.submit(&symptoms, &language).await? {
        SubmissionOutcome::Completed(result) => {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        SubmissionOutcome::Superseded => println!("Submission was superseded"),
    }

    if let Ok(patient_id) = env::var("KIOSK_PATIENT_ID") {
        let history = HistoryClient::from_config(&config)?.fetch(&patient_id).await?;
        for past in history {
            println!("{}  {} ({})", past.timestamp.to_rfc3339(), past.diagnosis, past.severity);
        }
    }

    println!("Backend status: {}", *status.borrow());
    drop(status);
    poller.await?;

    Ok(())
}
