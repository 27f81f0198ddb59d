//! Tests for configuration management functionality
//!
//! These tests verify that the configuration providers and the typed
//! diagnosis configuration work correctly.

#[cfg(test)]
mod tests {
    use std::env;
    use std::path::PathBuf;
    use std::time::Duration;

    use crate::config::{
        BackendKind, CompositeConfigProvider, ConfigProvider, ConfigProviderExt, DiagnosisConfig,
        EnvConfigProvider, GenericConfigProvider, Language, MemoryConfigProvider, ServiceConfig,
    };
    use crate::error::ErrorKind;

    #[test]
    fn test_memory_config_provider() {
        let mut provider = MemoryConfigProvider::new();
        provider.set("api_url", "http://kiosk-backend:8000");
        provider.set("max_symptoms", "12");
        provider.set("supported_languages", "en, hi ,, ta");

        assert_eq!(provider.get_string("api_url").unwrap(), "http://kiosk-backend:8000");
        assert_eq!(provider.get::<usize>("max_symptoms").unwrap(), 12);
        assert_eq!(provider.get_list("supported_languages").unwrap(), vec!["en", "hi", "ta"]);

        // Defaults
        assert_eq!(provider.get_string_or("missing", "default"), "default");

        // Error cases
        assert!(provider.get_string("missing").is_err());
        assert!(provider.get::<usize>("api_url").is_err());
    }

    #[test]
    fn test_env_config_provider() {
        env::set_var("KIOSKTEST_DIAG_API_URL", "http://10.0.0.5:5000");
        env::set_var("KIOSKTEST_DIAG_FEATURE_LENGTH", "64");

        let provider = EnvConfigProvider::new().with_prefix("KIOSKTEST").with_namespace("DIAG");

        assert_eq!(provider.get_string("api_url").unwrap(), "http://10.0.0.5:5000");
        assert_eq!(provider.get::<usize>("feature-length").unwrap(), 64);
        assert!(provider.get_string("model_path").is_err());

        env::remove_var("KIOSKTEST_DIAG_API_URL");
        env::remove_var("KIOSKTEST_DIAG_FEATURE_LENGTH");
    }

    #[test]
    fn test_composite_config_provider() {
        let mut overrides = MemoryConfigProvider::new();
        overrides.set("backend", "rule_based");

        let mut base = MemoryConfigProvider::new();
        base.set("backend", "remote");
        base.set("model_version", "2.1.0");

        let composite = CompositeConfigProvider::new()
            .with_provider(overrides)
            .with_provider(base);

        assert_eq!(composite.get::<BackendKind>("backend").unwrap(), BackendKind::RuleBased);
        assert_eq!(composite.get_string("model_version").unwrap(), "2.1.0");
        assert!(composite.get_string("missing").is_err());
    }

    #[test]
    fn test_config_from_provider_uses_defaults() {
        let config = DiagnosisConfig::from_provider(&MemoryConfigProvider::new()).unwrap();

        assert_eq!(config.base_url, "http://localhost:5000");
        assert_eq!(config.max_symptoms, 10);
        assert_eq!(config.model_version, "1.0.0");
        assert_eq!(config.feature_length, 100);
        assert_eq!(config.backend, BackendKind::Remote);
        assert_eq!(config.health_poll_interval, Duration::from_secs(30));
        let codes: Vec<&str> = config.supported_languages.iter().map(|l| l.code.as_str()).collect();
        assert_eq!(codes, vec!["en", "hi", "bn", "te", "ta"]);
    }

    #[test]
    fn test_config_from_provider_overrides() {
        let mut provider = MemoryConfigProvider::new();
        provider.set("api_url", "https://diag.example.org");
        provider.set("supported_languages", "hi:Hindi,en:English");
        provider.set("max_symptoms", "5");
        provider.set("model_path", "/opt/kiosk/model.json");
        provider.set("backend", "local");
        provider.set("health_poll_interval", "2m");

        let config = DiagnosisConfig::from_provider(&provider).unwrap();

        assert_eq!(config.base_url, "https://diag.example.org");
        assert_eq!(config.default_language(), "hi");
        assert_eq!(config.supported_languages[1], Language::new("en", "English"));
        assert_eq!(config.max_symptoms, 5);
        assert_eq!(config.model_path, PathBuf::from("/opt/kiosk/model.json"));
        assert_eq!(config.backend, BackendKind::Local);
        assert_eq!(config.health_poll_interval, Duration::from_secs(120));
    }

    #[test]
    fn test_config_rejects_malformed_values() {
        let mut provider = MemoryConfigProvider::new();
        provider.set("max_symptoms", "many");
        assert!(DiagnosisConfig::from_provider(&provider).is_err());

        let mut provider = MemoryConfigProvider::new();
        provider.set("backend", "quantum");
        assert!(DiagnosisConfig::from_provider(&provider).is_err());

        let mut provider = MemoryConfigProvider::new();
        provider.set("api_url", "not a url");
        assert!(DiagnosisConfig::from_provider(&provider).is_err());
    }

    #[test]
    fn test_config_rejects_overflowing_poll_interval() {
        let mut provider = MemoryConfigProvider::new();
        provider.set("health_poll_interval", "999999999999999999h");

        let err = DiagnosisConfig::from_provider(&provider).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(err.message().contains("health_poll_interval"));
    }

    #[test]
    fn test_config_validation() {
        let config = DiagnosisConfig {
            max_symptoms: 0,
            ..DiagnosisConfig::default()
        };
        assert!(config.validate().is_err());

        let config = DiagnosisConfig {
            supported_languages: Vec::new(),
            ..DiagnosisConfig::default()
        };
        assert!(config.validate().is_err());

        let config = DiagnosisConfig {
            feature_length: 0,
            ..DiagnosisConfig::default()
        };
        assert!(config.validate().is_err());

        assert_eq!(DiagnosisConfig::default().service_name(), "diagnosis");
    }

    #[test]
    fn test_config_serde_roundtrip() {
        let config = DiagnosisConfig::default();
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["backend"], "remote");
        assert_eq!(json["health_poll_interval"], 30);

        let back: DiagnosisConfig = serde_json::from_value(json).unwrap();
        assert_eq!(back.health_poll_interval, config.health_poll_interval);
    }
}
