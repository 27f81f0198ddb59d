//! Remote inference over `POST /api/diagnose`

use async_trait::async_trait;
use log::debug;
use serde::{Deserialize, Serialize};

use super::{BackendOutput, DiagnosisBackend, ScoreRequest, SeveritySignal};
use crate::config::{DiagnosisConfig, ServiceConfig};
use crate::core::{ClientBuilder, RequestExecutor, ServiceClient};
use crate::error::{DiagnosisError, Result};
use crate::services::ApiClient;
use crate::triage::SeverityTier;

const DIAGNOSE_ENDPOINT: &str = "api/diagnose";

#[derive(Debug, Serialize)]
struct DiagnoseRequest<'a> {
    symptoms: &'a [String],
    language: &'a str,
}

#[derive(Debug, Deserialize)]
struct Prediction {
    diagnosis: Option<String>,
    confidence: Option<f64>,
    severity: Option<String>,
    #[serde(default)]
    recommendations: Vec<String>,
}

/// The backend answers with either one prediction or a ranked list of them
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DiagnoseResponse {
    Single(Prediction),
    Ranked(Vec<Prediction>),
}

impl DiagnoseResponse {
    fn into_top(self) -> Result<Prediction> {
        match self {
            DiagnoseResponse::Single(prediction) => Ok(prediction),
            DiagnoseResponse::Ranked(predictions) => predictions
                .into_iter()
                .next()
                .ok_or_else(|| DiagnosisError::inference("Backend returned an empty prediction list")),
        }
    }
}

impl Prediction {
    fn into_output(self) -> Result<BackendOutput> {
        let label = self
            .diagnosis
            .ok_or_else(|| DiagnosisError::inference("Backend response is missing 'diagnosis'"))?;
        let confidence = self
            .confidence
            .ok_or_else(|| DiagnosisError::inference("Backend response is missing 'confidence'"))?;

        // Without an explicit tier the confidence doubles as the severity signal
        let signal = match self.severity {
            Some(tier) => SeveritySignal::Tier(tier.parse::<SeverityTier>()?),
            None => SeveritySignal::Score(confidence),
        };

        Ok(BackendOutput {
            label,
            confidence,
            signal,
            recommendations: self.recommendations,
        })
    }
}

/// Backend that delegates scoring to the kiosk server
#[derive(Debug, Clone)]
pub struct RemoteBackend {
    config: DiagnosisConfig,
    api: ApiClient,
}

impl RemoteBackend {
    pub fn new(config: DiagnosisConfig, api: ApiClient) -> Self {
        Self { config, api }
    }

    /// Build the REST client from `config`
    pub fn from_config(config: DiagnosisConfig) -> Result<Self> {
        let api = ClientBuilder::from_config(&config).service_name("diagnosis").build()?;
        Ok(Self::new(config, api))
    }
}

#[async_trait]
impl DiagnosisBackend for RemoteBackend {
    fn name(&self) -> &'static str {
        "remote"
    }

    /// Configuration check only; the first request is the first network contact
    async fn load(&self) -> Result<()> {
        self.config.validate()?;
        debug!("Remote diagnosis backend at {}", self.api.base_url());
        Ok(())
    }

    async fn score(&self, request: &ScoreRequest) -> Result<BackendOutput> {
        let body = DiagnoseRequest {
            symptoms: &request.symptoms,
            language: &request.language,
        };

        let response: DiagnoseResponse = self
            .api
            .post(DIAGNOSE_ENDPOINT, &body)
            .await
            .map_err(DiagnosisError::into_inference)?;

        response
            .into_top()
            .and_then(Prediction::into_output)
            .map_err(DiagnosisError::into_inference)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Result<BackendOutput> {
        serde_json::from_str::<DiagnoseResponse>(json)
            .map_err(DiagnosisError::from)
            .and_then(DiagnoseResponse::into_top)
            .and_then(Prediction::into_output)
    }

    #[test]
    fn test_single_prediction() {
        let output = parse(r#"{"diagnosis": "Flu", "confidence": 0.82, "severity": "medium"}"#).unwrap();
        assert_eq!(output.label, "Flu");
        assert_eq!(output.signal, SeveritySignal::Tier(SeverityTier::Medium));
        assert!(output.recommendations.is_empty());
    }

    #[test]
    fn test_ranked_list_takes_first() {
        let output = parse(
            r#"[{"diagnosis": "Common Cold or Influenza", "confidence": 0.85, "severity": "medium"},
                {"diagnosis": "Possible Pneumonia", "confidence": 0.4, "severity": "high"}]"#,
        )
        .unwrap();
        assert_eq!(output.label, "Common Cold or Influenza");
    }

    #[test]
    fn test_missing_severity_uses_confidence() {
        let output = parse(r#"{"diagnosis": "Flu", "confidence": 0.9}"#).unwrap();
        assert_eq!(output.signal, SeveritySignal::Score(0.9));
    }

    #[test]
    fn test_malformed_predictions() {
        assert!(parse("[]").unwrap_err().is_inference());
        assert!(parse(r#"{"confidence": 0.5}"#).unwrap_err().is_inference());
        assert!(parse(r#"{"diagnosis": "Flu"}"#).unwrap_err().is_inference());
        assert!(parse(r#"{"diagnosis": "Flu", "confidence": 0.5, "severity": "critical"}"#)
            .unwrap_err()
            .is_inference());
    }
}
