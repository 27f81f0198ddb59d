//! Backend connectivity probe and background poller
//!
//! The probe never fails: every outcome is folded into a [`ConnectionStatus`]
//! so the kiosk can show connectivity without touching the diagnosis path.

use std::fmt;
use std::time::Duration;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::ApiClient;
use crate::config::DiagnosisConfig;
use crate::core::{ClientBuilder, RequestExecutor};
use crate::error::Result;

const HEALTH_ENDPOINT: &str = "api/health";

/// Backend connectivity as shown to the operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    /// No probe has completed yet
    Checking,
    /// Backend answered `{"status": "ok"}`
    Connected,
    /// Backend unreachable or answered with an error status
    Disconnected,
    /// Backend reachable but reported itself unhealthy
    Error,
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionStatus::Checking => write!(f, "checking"),
            ConnectionStatus::Connected => write!(f, "connected"),
            ConnectionStatus::Disconnected => write!(f, "disconnected"),
            ConnectionStatus::Error => write!(f, "error"),
        }
    }
}

#[derive(Debug, Deserialize)]
struct HealthResponse {
    status: String,
}

/// Client for `GET /api/health`
#[derive(Debug, Clone)]
pub struct HealthProbe {
    api: ApiClient,
}

impl HealthProbe {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Build a dedicated client from the pipeline configuration
    pub fn from_config(config: &DiagnosisConfig) -> Result<Self> {
        let api = ClientBuilder::from_config(config).service_name("health").build()?;
        Ok(Self::new(api))
    }

    /// Probe the backend once
    pub async fn check(&self) -> ConnectionStatus {
        match self.api.get::<HealthResponse>(HEALTH_ENDPOINT).await {
            Ok(health) if health.status == "ok" => ConnectionStatus::Connected,
            Ok(health) => {
                warn!("Backend reported status '{}'", health.status);
                ConnectionStatus::Error
            }
            Err(e) => {
                debug!("Health probe failed: {}", e);
                ConnectionStatus::Disconnected
            }
        }
    }

    /// Probe every `interval` and publish the latest status.
    ///
    /// The receiver starts at [`ConnectionStatus::Checking`]. The task ends once
    /// every receiver has been dropped.
    pub fn spawn_poller(self, interval: Duration) -> (watch::Receiver<ConnectionStatus>, JoinHandle<()>) {
        let (tx, rx) = watch::channel(ConnectionStatus::Checking);

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = tx.closed() => break,
                    _ = ticker.tick() => {
                        let status = self.check().await;
                        let changed = *tx.borrow() != status;
                        if tx.send(status).is_err() {
                            break;
                        }
                        if changed {
                            info!("Backend connection status: {}", status);
                        }
                    }
                }
            }

            debug!("Health poller stopped");
        });

        (rx, handle)
    }
}
