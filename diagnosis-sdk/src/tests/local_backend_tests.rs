//! Tests for the in-process scoring backend
//!
//! Artifacts are written to temporary files so every test loads from disk the
//! same way a kiosk does.

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Arc;

    use serde_json::{json, Value};
    use tempfile::NamedTempFile;

    use crate::config::{BackendKind, DiagnosisConfig};
    use crate::engine::{DiagnosisBackend, DiagnosisEngine, EngineState, LocalBackend};
    use crate::pipeline::DiagnosisPipeline;
    use crate::symptoms::{SymptomCatalog, SymptomSet, SymptomSeverity};
    use crate::triage::SeverityTier;

    const INPUT_SIZE: usize = 100;

    /// Weight vector with `value` at the given slots
    fn weights(slots: &[(usize, f32)]) -> Vec<f32> {
        let mut weights = vec![0.0; INPUT_SIZE];
        for (slot, value) in slots {
            weights[*slot] = *value;
        }
        weights
    }

    fn artifact(version: &str) -> Value {
        json!({
            "name": "kiosk-triage",
            "version": version,
            "input_size": INPUT_SIZE,
            "conditions": [
                {
                    "label": "Influenza",
                    "weights": weights(&[(0, 4.0), (1, 4.0)]),
                    "bias": 0.0,
                    "recommendations": ["Rest", "Fluids"]
                },
                {
                    "label": "Tension Headache",
                    "weights": weights(&[(2, 4.0), (3, 1.0)]),
                    "bias": 0.0
                }
            ],
            "severity_head": {
                "weights": weights(&[(0, 3.0), (1, 1.0), (2, 1.0)]),
                "bias": -1.5
            }
        })
    }

    fn write_artifact(document: &Value) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", document).unwrap();
        file
    }

    fn config_for(file: &NamedTempFile) -> DiagnosisConfig {
        DiagnosisConfig {
            backend: BackendKind::Local,
            model_path: file.path().to_path_buf(),
            ..DiagnosisConfig::default()
        }
    }

    fn symptoms(entries: &[(&str, SymptomSeverity)]) -> SymptomSet {
        let catalog = SymptomCatalog::standard();
        SymptomSet::try_from_symptoms(
            entries
                .iter()
                .map(|(id, severity)| catalog.get(id).unwrap().to_symptom_with(severity.clone())),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_load_and_score() {
        let file = write_artifact(&artifact("1.0.0"));
        let backend = LocalBackend::from_config(&config_for(&file));

        backend.load().await.unwrap();
        assert_eq!(backend.artifact().unwrap().conditions.len(), 2);

        let pipeline = DiagnosisPipeline::new(
            config_for(&file),
            Arc::new(DiagnosisEngine::new(Arc::new(backend))),
        );
        pipeline.initialize().await.unwrap();

        let result = pipeline
            .diagnose(
                &symptoms(&[("1", SymptomSeverity::Severe), ("2", SymptomSeverity::Moderate)]),
                "en",
            )
            .await
            .unwrap();

        assert_eq!(result.diagnosis, "Influenza");
        assert!(result.confidence > 0.5 && result.confidence <= 1.0);
        // sigmoid(3.0 * 1.0 + 1.0 * 0.6 - 1.5) is about 0.89
        assert_eq!(result.severity, SeverityTier::High);
        assert!(result.specialist_referral.required);
        assert_eq!(result.recommendations, vec!["Rest", "Fluids"]);
    }

    #[tokio::test]
    async fn test_low_signal_is_low_severity() {
        let file = write_artifact(&artifact("1.0.0"));
        let pipeline = DiagnosisPipeline::from_config(config_for(&file)).unwrap();
        pipeline.initialize().await.unwrap();

        let result = pipeline
            .diagnose(&symptoms(&[("4", SymptomSeverity::Mild)]), "en")
            .await
            .unwrap();

        // sigmoid(-1.5) is about 0.18
        assert_eq!(result.severity, SeverityTier::Low);
        assert!(!result.specialist_referral.required);
    }

    #[tokio::test]
    async fn test_version_mismatch_is_init_error() {
        let file = write_artifact(&artifact("0.9.0"));
        let engine = DiagnosisEngine::new(Arc::new(LocalBackend::from_config(&config_for(&file))));

        let err = engine.initialize().await.unwrap_err();
        assert!(err.is_init());
        assert!(matches!(engine.state(), EngineState::Failed(_)));
    }

    #[tokio::test]
    async fn test_input_size_mismatch_is_init_error() {
        let file = write_artifact(&artifact("1.0.0"));
        let config = DiagnosisConfig {
            feature_length: 64,
            ..config_for(&file)
        };

        let backend = LocalBackend::from_config(&config);
        assert!(backend.load().await.unwrap_err().is_init());
        assert!(backend.artifact().is_none());
    }

    #[tokio::test]
    async fn test_missing_or_corrupt_artifact_is_init_error() {
        let backend = LocalBackend::new("/nonexistent/kiosk/model.json", "1.0.0", INPUT_SIZE);
        assert!(backend.load().await.unwrap_err().is_init());

        let mut corrupt = NamedTempFile::new().unwrap();
        write!(corrupt, "{{\"name\": \"truncated").unwrap();
        let backend = LocalBackend::new(corrupt.path(), "1.0.0", INPUT_SIZE);
        assert!(backend.load().await.unwrap_err().is_init());
    }
}
