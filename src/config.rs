//! Converter configuration.
//!
//! The converter binary resolution chain (highest priority first):
//! 1. `INGRESS2GATEWAY_BIN` environment variable, when non-empty
//! 2. `ingress2gateway`, looked up on `PATH` when the process is spawned
//!
//! The optional deadline on the converter comes from `--timeout-secs` or
//! `INGRESS_MODERNIZR_TIMEOUT_SECS`; both are read by the CLI layer.

use std::time::Duration;

/// Environment variable overriding the converter binary
pub const CONVERTER_BIN_ENV: &str = "INGRESS2GATEWAY_BIN";

/// Converter binary used when no override is set
pub const DEFAULT_CONVERTER_BIN: &str = "ingress2gateway";

/// Environment variable for the converter deadline, in seconds
pub const TIMEOUT_ENV: &str = "INGRESS_MODERNIZR_TIMEOUT_SECS";

/// How the external converter is invoked
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConverterConfig {
    /// Binary name or path
    pub binary: String,
    /// Deadline for the converter process; `None` waits indefinitely
    pub timeout: Option<Duration>,
}

impl ConverterConfig {
    /// Config for an explicit binary with no deadline
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            timeout: None,
        }
    }

    /// Resolve the binary from the environment
    pub fn from_env() -> Self {
        Self::new(resolve_converter_bin(std::env::var(CONVERTER_BIN_ENV).ok()))
    }

    /// Set or clear the deadline
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Pick the converter binary from an override value.
///
/// Returns the override unless it is missing or empty.
pub fn resolve_converter_bin(env_override: Option<String>) -> String {
    match env_override {
        Some(bin) if !bin.is_empty() => bin,
        _ => DEFAULT_CONVERTER_BIN.to_string(),
    }
}
