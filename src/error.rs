//! Error types for ingress-modernizr

use thiserror::Error;

use crate::manifest::codec::CodecError;

/// Main error type for a pipeline run
///
/// Every variant is fatal to the run; nothing is retried.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// A manifest stream could not be decoded (input or converter output)
    #[error("failed to decode manifests from {origin}: {source}")]
    Decode {
        /// Where the stream came from ("stdin", a path, or the converter)
        origin: String,
        /// Underlying parse failure
        #[source]
        source: CodecError,
    },

    /// A manifest could not be serialized or written
    #[error("failed to write output manifests: {0}")]
    Encode(#[source] CodecError),

    /// The staging file for the converter could not be created or written
    #[error("failed to stage manifests for conversion: {0}")]
    Staging(String),

    /// The converter failed to start, timed out, or exited non-zero
    #[error("{binary} failed: {reason}\nstderr:\n{stderr}")]
    Converter {
        /// Binary that was invoked
        binary: String,
        /// Spawn error, exit status, or timeout description
        reason: String,
        /// Captured standard error of the converter
        stderr: String,
    },

    /// Invalid invocation, reported before any input is processed
    #[error("{0}")]
    Usage(String),

    /// The input stream could not be read
    #[error("failed to read input manifests from {origin}: {source}")]
    Input {
        /// Where the stream came from
        origin: String,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Create a usage error with the given message
    pub fn usage(msg: impl Into<String>) -> Self {
        Self::Usage(msg.into())
    }

    /// Create a staging error with the given message
    pub fn staging(msg: impl Into<String>) -> Self {
        Self::Staging(msg.into())
    }

    /// Create a converter error for `binary`
    pub fn converter(
        binary: impl Into<String>,
        reason: impl Into<String>,
        stderr: impl Into<String>,
    ) -> Self {
        Self::Converter {
            binary: binary.into(),
            reason: reason.into(),
            stderr: stderr.into(),
        }
    }

    /// Wrap a codec failure with the origin of the stream being decoded
    pub fn decode(origin: impl Into<String>, source: CodecError) -> Self {
        Self::Decode {
            origin: origin.into(),
            source,
        }
    }
}
