//! Past diagnostic results for a patient

use log::{debug, info};
use url::Url;

use super::ApiClient;
use crate::config::DiagnosisConfig;
use crate::core::{ClientBuilder, RequestExecutor};
use crate::error::{DiagnosisError, Result};
use crate::pipeline::DiagnosticResult;

const HISTORY_ENDPOINT: &str = "api/diagnose/history/";

/// Client for `GET /api/diagnose/history/{patientId}`
#[derive(Debug, Clone)]
pub struct HistoryClient {
    api: ApiClient,
}

impl HistoryClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Build a dedicated client from the pipeline configuration
    pub fn from_config(config: &DiagnosisConfig) -> Result<Self> {
        let api = ClientBuilder::from_config(config).service_name("history").build()?;
        Ok(Self::new(api))
    }

    /// All stored results for `patient_id`, in the order the backend returns them
    pub async fn fetch(&self, patient_id: &str) -> Result<Vec<DiagnosticResult>> {
        let endpoint = history_endpoint(patient_id)?;
        debug!("Fetching diagnosis history from {}", endpoint);

        let history: Vec<DiagnosticResult> = self.api.get(&endpoint).await?;
        info!("Loaded {} past diagnoses", history.len());
        Ok(history)
    }
}

/// Endpoint with `patient_id` percent-encoded as exactly one path segment
fn history_endpoint(patient_id: &str) -> Result<String> {
    if patient_id.trim().is_empty() {
        return Err(DiagnosisError::validation("Patient id is required"));
    }

    let mut scratch = Url::parse("http://history.invalid/")
        .map_err(|e| DiagnosisError::configuration(format!("Invalid history URL: {}", e)))?;
    scratch
        .path_segments_mut()
        .map_err(|_| DiagnosisError::configuration("History URL cannot be a base"))?
        .pop_if_empty()
        .push(patient_id);

    Ok(format!(
        "{}{}",
        HISTORY_ENDPOINT,
        scratch.path().trim_start_matches('/')
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patient_id_is_one_segment() {
        assert_eq!(history_endpoint("P-1001").unwrap(), "api/diagnose/history/P-1001");
        assert_eq!(
            history_endpoint("ward 3/bed?7").unwrap(),
            "api/diagnose/history/ward%203%2Fbed%3F7"
        );
    }

    #[test]
    fn test_empty_patient_id_is_rejected() {
        assert!(history_endpoint("").unwrap_err().is_validation());
        assert!(history_endpoint("   ").unwrap_err().is_validation());
    }
}
