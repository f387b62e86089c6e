//! Command-line surface
//!
//! Only `--input-file` and `--timeout-secs` belong to this tool; every other
//! argument is forwarded to the converter untouched.

use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tracing::{debug, warn};

use crate::config::{ConverterConfig, TIMEOUT_ENV};
use crate::convert::CommandConverter;
use crate::pipeline::{Outcome, Pipeline};
use crate::{Error, Result};

const EXAMPLES: &str = "\
Examples:
  # As Helm post-renderer (reads from stdin)
  helm template myapp ./chart | ingress-modernizr --providers=ingress-nginx

  # From a file
  ingress-modernizr --input-file=manifests.yaml --providers=ingress-nginx

  # With kubectl apply
  kubectl apply -k . --dry-run=client -o yaml | ingress-modernizr --providers=ingress-nginx | kubectl apply -f -

All arguments after the flags are passed directly to ingress2gateway.
A provider is mandatory (e.g., --providers=ingress-nginx).
Set INGRESS2GATEWAY_BIN to use a different ingress2gateway binary.";

/// ingress-modernizr - Convert Kubernetes Ingress to Gateway API resources
///
/// Reads Kubernetes manifests (rendered by Helm or any other tool), converts
/// Ingress resources to Gateway API resources using ingress2gateway, and
/// outputs the transformed manifests.
#[derive(Parser, Debug)]
#[command(name = "ingress-modernizr", version, after_help = EXAMPLES)]
pub struct Cli {
    /// Path to input manifest file (default: read from stdin)
    #[arg(long = "input-file", value_name = "PATH")]
    pub input_file: Option<PathBuf>,

    /// Kill ingress2gateway if it runs longer than this many seconds
    #[arg(long, env = TIMEOUT_ENV, value_name = "SECS")]
    pub timeout_secs: Option<u64>,

    /// Arguments passed through to ingress2gateway
    #[arg(
        value_name = "INGRESS2GATEWAY_ARGS",
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    pub converter_args: Vec<String>,
}

impl Cli {
    /// Run the pipeline, writing manifests to stdout
    pub async fn run(self) -> Result<()> {
        validate_converter_args(&self.converter_args)?;

        let source = InputSource::from(self.input_file);
        let input = source.open()?;

        let config = ConverterConfig::from_env()
            .with_timeout(self.timeout_secs.map(Duration::from_secs));
        debug!(binary = %config.binary, timeout = ?config.timeout, "resolved converter");
        let converter = CommandConverter::new(config);

        let stdout = std::io::stdout();
        let outcome = Pipeline::new(&converter, &self.converter_args)
            .run(&source.to_string(), input, stdout.lock())
            .await?;

        if let (Outcome::Empty, InputSource::File(path)) = (outcome, &source) {
            warn!("no objects found in {}", path.display());
        }
        Ok(())
    }
}

/// Require a provider selector among the forwarded arguments
///
/// Accepts `--providers=<name>` or `--providers <name>`.
pub fn validate_converter_args(args: &[String]) -> Result<()> {
    let has_providers = args
        .iter()
        .any(|arg| arg == "--providers" || arg.starts_with("--providers="));
    if has_providers {
        Ok(())
    } else {
        Err(Error::usage(
            "error: --providers flag is required for ingress2gateway (e.g., --providers=ingress-nginx)",
        ))
    }
}

/// Where manifests are read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    /// Standard input
    Stdin,
    /// A named file
    File(PathBuf),
}

impl InputSource {
    /// Open the source for reading
    pub fn open(&self) -> Result<Box<dyn Read>> {
        match self {
            Self::Stdin => Ok(Box::new(std::io::stdin().lock())),
            Self::File(path) => {
                let file = File::open(path).map_err(|e| {
                    Error::usage(format!(
                        "failed to open input file {}: {}",
                        path.display(),
                        e
                    ))
                })?;
                Ok(Box::new(file))
            }
        }
    }
}

impl From<Option<PathBuf>> for InputSource {
    fn from(path: Option<PathBuf>) -> Self {
        match path {
            Some(path) => Self::File(path),
            None => Self::Stdin,
        }
    }
}

impl fmt::Display for InputSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdin => f.write_str("stdin"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}
