//! Configuration management for the diagnosis pipeline
//!
//! This module provides utilities for loading and validating the kiosk's
//! diagnosis configuration, with support for environment variables.

use std::collections::HashMap;
use std::env;
use std::fmt::{self, Debug};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::{DiagnosisError, Result};
use crate::util::parse_duration;

/// Base trait for configuration providers
pub trait ConfigProvider: Send + Sync {
    /// Get a string configuration value
    fn get_string(&self, key: &str) -> Result<String>;
}

/// Extension methods for configuration providers
pub trait ConfigProviderExt: ConfigProvider {
    /// Get a comma separated list, skipping empty entries
    fn get_list(&self, key: &str) -> Result<Vec<String>> {
        let value = self.get_string(key)?;
        Ok(value
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect())
    }

    /// Get a duration value such as "30s" or "5m"
    fn get_duration(&self, key: &str) -> Result<Duration> {
        let value = self.get_string(key)?;
        parse_duration(&value)
            .ok_or_else(|| DiagnosisError::configuration(format!("Invalid duration for key {}: {}", key, value)))
    }

    /// Get a string configuration value with a default
    fn get_string_or(&self, key: &str, default: &str) -> String {
        self.get_string(key).unwrap_or_else(|_| default.to_string())
    }
}

impl<T: ConfigProvider + ?Sized> ConfigProviderExt for T {}

/// Generic configuration provider trait
pub trait GenericConfigProvider: ConfigProvider {
    /// Get a typed configuration value by parsing from string
    fn get<T>(&self, key: &str) -> Result<T>
    where
        T: FromStr,
        <T as FromStr>::Err: fmt::Display,
    {
        let value = self.get_string(key)?;
        value
            .trim()
            .parse::<T>()
            .map_err(|e| DiagnosisError::configuration(format!("Invalid value for key {}: {}", key, e)))
    }

    /// Get a typed configuration with a default value
    fn get_or<T>(&self, key: &str, default: T) -> T
    where
        T: FromStr,
        <T as FromStr>::Err: fmt::Display,
    {
        self.get::<T>(key).unwrap_or(default)
    }
}

impl<T: ConfigProvider + ?Sized> GenericConfigProvider for T {}

/// Environment variable based configuration provider
#[derive(Debug, Clone, Default)]
pub struct EnvConfigProvider {
    /// Optional prefix for environment variables
    prefix: Option<String>,

    /// Optional namespace for variables (e.g., "DIAGNOSIS")
    namespace: Option<String>,
}

impl EnvConfigProvider {
    /// Create a new environment variable config provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a prefix for environment variables
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Set a namespace for environment variables
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Format a configuration key as an environment variable
    pub(crate) fn format_key(&self, key: &str) -> String {
        let mut env_key = String::new();

        if let Some(ref prefix) = self.prefix {
            env_key.push_str(prefix);
            env_key.push('_');
        }

        if let Some(ref namespace) = self.namespace {
            env_key.push_str(namespace);
            env_key.push('_');
        }

        // Uppercase, non-alphanumerics become underscores
        env_key.push_str(&key.to_uppercase().replace(|c: char| !c.is_ascii_alphanumeric(), "_"));

        env_key
    }
}

impl ConfigProvider for EnvConfigProvider {
    fn get_string(&self, key: &str) -> Result<String> {
        let env_key = self.format_key(key);

        env::var(&env_key).map_err(|e| match e {
            env::VarError::NotPresent => {
                DiagnosisError::configuration(format!("Environment variable not set: {}", env_key))
            }
            env::VarError::NotUnicode(_) => DiagnosisError::configuration(format!(
                "Environment variable is not valid unicode: {}",
                env_key
            )),
        })
    }
}

/// In-memory config provider for testing or static configuration
#[derive(Debug, Clone, Default)]
pub struct MemoryConfigProvider {
    values: HashMap<String, String>,
}

impl MemoryConfigProvider {
    /// Create a new empty memory config provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a memory config provider with initial values
    pub fn with_values(values: HashMap<String, String>) -> Self {
        Self { values }
    }

    /// Set a configuration value
    pub fn set<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: ToString,
    {
        self.values.insert(key.into(), value.to_string());
    }
}

impl ConfigProvider for MemoryConfigProvider {
    fn get_string(&self, key: &str) -> Result<String> {
        self.values
            .get(key)
            .cloned()
            .ok_or_else(|| DiagnosisError::configuration(format!("Configuration key not found: {}", key)))
    }
}

/// A composite config provider that tries multiple providers in order
#[derive(Default)]
pub struct CompositeConfigProvider {
    providers: Vec<Box<dyn ConfigProvider>>,
}

impl CompositeConfigProvider {
    /// Create a new composite config provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a provider to the end of the chain
    pub fn add_provider(&mut self, provider: impl ConfigProvider + 'static) {
        self.providers.push(Box::new(provider));
    }

    /// Builder-style variant of [`add_provider`](Self::add_provider)
    pub fn with_provider(mut self, provider: impl ConfigProvider + 'static) -> Self {
        self.add_provider(provider);
        self
    }
}

impl ConfigProvider for CompositeConfigProvider {
    fn get_string(&self, key: &str) -> Result<String> {
        self.providers
            .iter()
            .find_map(|provider| provider.get_string(key).ok())
            .ok_or_else(|| {
                DiagnosisError::configuration(format!("Configuration key not found in any provider: {}", key))
            })
    }
}

/// Global default configuration provider (`KIOSK_*` environment variables)
pub static DEFAULT_PROVIDER: Lazy<Arc<EnvConfigProvider>> =
    Lazy::new(|| Arc::new(EnvConfigProvider::new().with_prefix("KIOSK")));

/// Trait for service-specific configuration
pub trait ServiceConfig: Debug + Send + Sync {
    /// Validate this configuration
    fn validate(&self) -> Result<()>;

    /// Service name
    fn service_name(&self) -> &str;
}

/// Which engine backend produces raw scores
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// Remote inference endpoint (`POST /api/diagnose`)
    Remote,
    /// In-process scoring artifact loaded from `model_path`
    Local,
    /// Fixed offline rules
    RuleBased,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Remote => write!(f, "remote"),
            BackendKind::Local => write!(f, "local"),
            BackendKind::RuleBased => write!(f, "rule_based"),
        }
    }
}

impl FromStr for BackendKind {
    type Err = DiagnosisError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "remote" => Ok(BackendKind::Remote),
            "local" => Ok(BackendKind::Local),
            "rule_based" | "rules" => Ok(BackendKind::RuleBased),
            other => Err(DiagnosisError::configuration(format!("Unknown backend kind: {}", other))),
        }
    }
}

/// A language the kiosk accepts symptom submissions in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Language {
    /// ISO 639-1 code sent to the backend
    pub code: String,
    /// Human readable name
    pub name: String,
}

impl Language {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
        }
    }
}

impl FromStr for Language {
    type Err = DiagnosisError;

    /// Parses `code` or `code:Name`
    fn from_str(s: &str) -> Result<Self> {
        let (code, name) = match s.split_once(':') {
            Some((code, name)) => (code.trim(), name.trim()),
            None => (s.trim(), s.trim()),
        };
        if code.is_empty() {
            return Err(DiagnosisError::configuration(format!("Invalid language entry: '{}'", s)));
        }
        Ok(Language::new(code.to_lowercase(), name))
    }
}

fn default_languages() -> Vec<Language> {
    vec![
        Language::new("en", "English"),
        Language::new("hi", "Hindi"),
        Language::new("bn", "Bengali"),
        Language::new("te", "Telugu"),
        Language::new("ta", "Tamil"),
    ]
}

const DEFAULT_API_URL: &str = "http://localhost:5000";
const DEFAULT_MODEL_VERSION: &str = "1.0.0";
const DEFAULT_MODEL_PATH: &str = "models/diagnostic_model.json";

/// Configuration for the symptom-to-diagnosis pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosisConfig {
    /// Backend base URL (without the `/api/...` suffix)
    pub base_url: String,

    /// Languages accepted for submissions; the first entry is the default
    pub supported_languages: Vec<Language>,

    /// Maximum number of symptoms per submission
    pub max_symptoms: usize,

    /// Expected version of the local scoring artifact
    pub model_version: String,

    /// Location of the local scoring artifact
    pub model_path: PathBuf,

    /// Length of the feature vector fed to the scorer
    pub feature_length: usize,

    /// HTTP timeout in seconds
    pub timeout_seconds: u64,

    /// Engine backend selection
    pub backend: BackendKind,

    /// Interval between health probes
    #[serde(with = "duration_secs")]
    pub health_poll_interval: Duration,
}

impl Default for DiagnosisConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            supported_languages: default_languages(),
            max_symptoms: 10,
            model_version: DEFAULT_MODEL_VERSION.to_string(),
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            feature_length: 100,
            timeout_seconds: 30,
            backend: BackendKind::Remote,
            health_poll_interval: Duration::from_secs(30),
        }
    }
}

impl DiagnosisConfig {
    /// Load configuration from a config provider
    ///
    /// Missing keys fall back to defaults; malformed values are errors.
    pub fn from_provider<P: ConfigProvider + ?Sized>(provider: &P) -> Result<Self> {
        let defaults = Self::default();

        let supported_languages = match provider.get_list("supported_languages") {
            Ok(entries) => entries
                .iter()
                .map(|entry| entry.parse::<Language>())
                .collect::<Result<Vec<_>>>()?,
            Err(_) => defaults.supported_languages,
        };

        let config = Self {
            base_url: provider.get_string_or("api_url", DEFAULT_API_URL),
            supported_languages,
            max_symptoms: optional(provider, "max_symptoms")?.unwrap_or(defaults.max_symptoms),
            model_version: provider.get_string_or("model_version", DEFAULT_MODEL_VERSION),
            model_path: provider
                .get_string("model_path")
                .map(PathBuf::from)
                .unwrap_or(defaults.model_path),
            feature_length: optional(provider, "feature_length")?.unwrap_or(defaults.feature_length),
            timeout_seconds: optional(provider, "timeout_seconds")?.unwrap_or(defaults.timeout_seconds),
            backend: optional(provider, "backend")?.unwrap_or(defaults.backend),
            health_poll_interval: match provider.get_string("health_poll_interval") {
                Ok(_) => provider.get_duration("health_poll_interval")?,
                Err(_) => defaults.health_poll_interval,
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from `KIOSK_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_provider(&**DEFAULT_PROVIDER)
    }

    /// Language used when the caller does not pick one
    pub fn default_language(&self) -> &str {
        self.supported_languages
            .first()
            .map(|language| language.code.as_str())
            .unwrap_or("en")
    }

    /// Whether `code` is one of the supported language codes
    pub fn supports_language(&self, code: &str) -> bool {
        self.supported_languages
            .iter()
            .any(|language| language.code.eq_ignore_ascii_case(code))
    }

    /// HTTP timeout as a duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// Present-and-parseable, absent, or an error for present-but-malformed
fn optional<P, T>(provider: &P, key: &str) -> Result<Option<T>>
where
    P: ConfigProvider + ?Sized,
    T: FromStr,
    <T as FromStr>::Err: fmt::Display,
{
    match provider.get_string(key) {
        Ok(_) => provider.get::<T>(key).map(Some),
        Err(_) => Ok(None),
    }
}

impl ServiceConfig for DiagnosisConfig {
    fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(DiagnosisError::configuration("Diagnosis backend URL is required"));
        }

        url::Url::parse(&self.base_url).map_err(|e| {
            DiagnosisError::configuration(format!("Invalid backend URL '{}': {}", self.base_url, e))
        })?;

        if self.supported_languages.is_empty() {
            return Err(DiagnosisError::configuration("At least one supported language is required"));
        }

        if self.max_symptoms == 0 {
            return Err(DiagnosisError::configuration("max_symptoms must be greater than zero"));
        }

        if self.feature_length == 0 {
            return Err(DiagnosisError::configuration("feature_length must be greater than zero"));
        }

        if self.model_version.trim().is_empty() {
            return Err(DiagnosisError::configuration("Model version is required"));
        }

        if self.timeout_seconds == 0 {
            return Err(DiagnosisError::configuration("timeout_seconds must be greater than zero"));
        }

        if self.health_poll_interval.is_zero() {
            return Err(DiagnosisError::configuration("health_poll_interval must be greater than zero"));
        }

        Ok(())
    }

    fn service_name(&self) -> &str {
        "diagnosis"
    }
}

mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_config_provider() {
        let mut provider = MemoryConfigProvider::new();
        provider.set("key1", "value1");
        provider.set("key2", "123");

        assert_eq!(provider.get_string("key1").unwrap(), "value1");
        assert_eq!(provider.get::<i64>("key2").unwrap(), 123);
        assert!(provider.get_string("key3").is_err());
    }

    #[test]
    fn test_env_config_provider_key_format() {
        let provider = EnvConfigProvider::new().with_prefix("KIOSK").with_namespace("TEST");

        assert_eq!(provider.format_key("api_url"), "KIOSK_TEST_API_URL");
        assert_eq!(provider.format_key("max-symptoms"), "KIOSK_TEST_MAX_SYMPTOMS");
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = DiagnosisConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.default_language(), "en");
        assert!(config.supports_language("HI"));
        assert!(!config.supports_language("fr"));
    }
}
