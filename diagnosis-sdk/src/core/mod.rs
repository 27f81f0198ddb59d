//! Core abstractions for talking to the diagnosis backend
//!
//! - `ServiceClient`: identity of a backend client
//! - `RequestExecutor`: typed JSON requests against the backend
//! - `ClientBuilder`: builder pattern for creating clients

pub mod builder;
pub use builder::ClientBuilder;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};

use crate::error::Result;

/// Base trait for all backend clients
pub trait ServiceClient: Send + Sync {
    /// The client name/identifier used in logs and error context
    fn name(&self) -> &str;

    /// The base URL for the service
    fn base_url(&self) -> &str;
}

/// Trait responsible for executing HTTP requests with strong typing
#[async_trait]
pub trait RequestExecutor: Send + Sync {
    /// Execute a GET request
    async fn get<R>(&self, endpoint: &str) -> Result<R>
    where
        R: DeserializeOwned + Send;

    /// Execute a POST request with a JSON body
    async fn post<T, R>(&self, endpoint: &str, body: &T) -> Result<R>
    where
        T: Serialize + Send + Sync,
        R: DeserializeOwned + Send;
}
