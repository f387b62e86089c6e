//! Delegation to the external Ingress converter
//!
//! The converter is an opaque executable (`ingress2gateway` by default). It is
//! reached only through a staged input file, its stdout and its exit status:
//!
//! ```text
//! <binary> print --input-file <staged-path> [forwarded-args...]
//! ```
//!
//! The [`Converter`] trait is the seam; [`CommandConverter`] is the real
//! subprocess implementation.

pub mod staging;

use std::ffi::OsString;
use std::path::Path;
use std::process::{Output, Stdio};

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use tokio::process::Command;
use tracing::{debug, info};

use crate::config::ConverterConfig;
use crate::manifest::codec;
use crate::manifest::Manifest;
use crate::{Error, Result};

pub use staging::StagedManifests;

/// Sub-command of the converter that prints converted resources
pub const PRIMARY_ACTION: &str = "print";

/// Flag the converter reads its input file from
pub const INPUT_FILE_FLAG: &str = "--input-file";

/// Trait for converting a manifest set into Gateway API resources
///
/// This trait abstracts the converter process for testability.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Converter: Send + Sync {
    /// Convert `manifests`, forwarding `args` to the converter
    ///
    /// The full original set is passed; the converter picks the resources it
    /// understands. An empty set converts to an empty set.
    async fn convert(&self, manifests: &[Manifest], args: &[String]) -> Result<Vec<Manifest>>;
}

/// Strip a redundant leading `print` from forwarded arguments
///
/// Only an exact leading token is removed; `--output=print` or a later
/// `print` are left alone.
pub fn normalize_args(args: &[String]) -> &[String] {
    match args.split_first() {
        Some((first, rest)) if first == PRIMARY_ACTION => rest,
        _ => args,
    }
}

/// Full argument list for one converter invocation
pub fn command_args(input_file: &Path, args: &[String]) -> Vec<OsString> {
    let forwarded = normalize_args(args);
    let mut command = Vec::with_capacity(forwarded.len() + 3);
    command.push(OsString::from(PRIMARY_ACTION));
    command.push(OsString::from(INPUT_FILE_FLAG));
    command.push(input_file.as_os_str().to_os_string());
    command.extend(forwarded.iter().map(OsString::from));
    command
}

// =============================================================================
// Real Implementation
// =============================================================================

/// Converter that runs the external binary
#[derive(Debug, Clone)]
pub struct CommandConverter {
    config: ConverterConfig,
}

impl CommandConverter {
    /// Create a converter with the given configuration
    pub fn new(config: ConverterConfig) -> Self {
        Self { config }
    }

    /// Run the binary to completion, capturing stdout and stderr
    async fn execute(&self, args: &[OsString]) -> Result<Output> {
        let binary = self.config.binary.as_str();

        let child = Command::new(binary)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| Error::converter(binary, format!("failed to start: {}", e), ""))?;

        let wait = child.wait_with_output();
        let waited = match self.config.timeout {
            // Dropping the future kills the child
            Some(limit) => tokio::time::timeout(limit, wait)
                .await
                .map_err(|_| Error::converter(binary, format!("timed out after {:?}", limit), ""))?,
            None => wait.await,
        };
        let output = waited
            .map_err(|e| Error::converter(binary, format!("failed to wait: {}", e), ""))?;

        if !output.status.success() {
            return Err(Error::converter(
                binary,
                output.status.to_string(),
                String::from_utf8_lossy(&output.stderr),
            ));
        }

        if !output.stderr.is_empty() {
            debug!(
                binary,
                stderr = %String::from_utf8_lossy(&output.stderr).trim_end(),
                "converter diagnostics"
            );
        }
        Ok(output)
    }
}

#[async_trait]
impl Converter for CommandConverter {
    async fn convert(&self, manifests: &[Manifest], args: &[String]) -> Result<Vec<Manifest>> {
        if manifests.is_empty() {
            debug!("nothing to convert");
            return Ok(Vec::new());
        }

        let staged = StagedManifests::write(manifests)?;
        let command = command_args(staged.path(), args);
        debug!(binary = %self.config.binary, args = ?command, "running converter");

        let output = self.execute(&command).await?;
        let converted = codec::decode(&output.stdout)
            .map_err(|e| Error::decode(format!("{} output", self.config.binary), e))?;

        info!(
            input = manifests.len(),
            converted = converted.len(),
            "converter finished"
        );
        Ok(converted)
    }
}
