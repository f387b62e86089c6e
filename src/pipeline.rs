//! Manifest pipeline
//!
//! One run is strictly sequential:
//!
//! 1. Read and decode the whole input
//! 2. Empty input: emit nothing
//! 3. No Ingress: re-encode the input unchanged
//! 4. Otherwise convert the full original set, drop the original Ingress
//!    documents and append the converted ones
//! 5. Encode the final set
//!
//! Nothing is written until decoding and conversion have both succeeded.

use std::io::{BufWriter, Read, Write};

use tracing::{info, warn};

use crate::convert::Converter;
use crate::manifest::{self, codec, Manifest, INGRESS_KIND};
use crate::{Error, Result};

/// What a run did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The input held no documents; nothing was written
    Empty,
    /// No Ingress was found; the input was re-encoded unchanged
    Passthrough {
        /// Number of documents written
        manifests: usize,
    },
    /// Ingress documents were replaced with converter output
    Converted {
        /// Non-Ingress documents carried over
        kept: usize,
        /// Ingress documents removed
        replaced: usize,
        /// Documents appended from the converter
        converted: usize,
    },
}

/// A configured pipeline run
pub struct Pipeline<'a, C: Converter + ?Sized> {
    converter: &'a C,
    args: &'a [String],
}

impl<'a, C: Converter + ?Sized> Pipeline<'a, C> {
    /// Create a pipeline that forwards `args` to `converter`
    pub fn new(converter: &'a C, args: &'a [String]) -> Self {
        Self { converter, args }
    }

    /// Build the final manifest set from an already decoded one
    pub async fn process(&self, manifests: Vec<Manifest>) -> Result<(Vec<Manifest>, Outcome)> {
        if manifests.is_empty() {
            return Ok((manifests, Outcome::Empty));
        }

        if !manifest::has_any(&manifests, INGRESS_KIND) {
            warn!("no Ingress resources found in input");
            let count = manifests.len();
            return Ok((manifests, Outcome::Passthrough { manifests: count }));
        }

        // The converter sees the whole set so it can use provider-specific
        // resources alongside the Ingresses
        let converted = self.converter.convert(&manifests, self.args).await?;

        let (mut result, replaced) = manifest::without_kind(manifests, INGRESS_KIND);
        let outcome = Outcome::Converted {
            kept: result.len(),
            replaced,
            converted: converted.len(),
        };
        result.extend(converted);

        info!(?outcome, "rebuilt manifest set");
        Ok((result, outcome))
    }

    /// Read manifests from `input`, process them, and write the result to `output`
    ///
    /// `origin` names the input in error messages.
    pub async fn run<R: Read, W: Write>(
        &self,
        origin: &str,
        mut input: R,
        output: W,
    ) -> Result<Outcome> {
        let mut raw = Vec::new();
        input.read_to_end(&mut raw).map_err(|e| Error::Input {
            origin: origin.to_string(),
            source: e,
        })?;

        let manifests = codec::decode(&raw).map_err(|e| Error::decode(origin, e))?;
        let (result, outcome) = self.process(manifests).await?;

        if outcome != Outcome::Empty {
            let mut writer = BufWriter::new(output);
            codec::encode(&result, &mut writer).map_err(Error::Encode)?;
            writer
                .flush()
                .map_err(|e| Error::Encode(codec::CodecError::Io(e)))?;
        }
        Ok(outcome)
    }
}
