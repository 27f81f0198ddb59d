//! Unit tests for the Diagnosis SDK
//!
//! This module contains tests for various components of the SDK.

pub mod config_tests;
pub mod local_backend_tests;
pub mod normalizer_tests;
pub mod triage_tests;
