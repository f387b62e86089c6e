//! Schema-less Kubernetes manifests
//!
//! A [`Manifest`] is one decoded document of a manifest stream, kept as an
//! ordered JSON-style object. Nothing here validates resource schemas; the
//! only field ever interpreted is the `kind` discriminator.

pub mod codec;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Kind of the resources handed to the converter for replacement
pub const INGRESS_KIND: &str = "Ingress";

/// One decoded manifest document
///
/// Key order is preserved from decode to encode. The document is read-only
/// once decoded; pipeline stages build new sets instead of editing in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Manifest(Map<String, Value>);

impl Manifest {
    /// Borrow the underlying object
    pub fn as_object(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Look up a top-level field
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// The `kind` discriminator, if present and a string
    pub fn kind(&self) -> Option<&str> {
        self.0.get("kind").and_then(Value::as_str)
    }

}

impl From<Map<String, Value>> for Manifest {
    fn from(object: Map<String, Value>) -> Self {
        Self(object)
    }
}

impl TryFrom<Value> for Manifest {
    /// The rejected value, returned unchanged
    type Error = Value;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(object) => Ok(Self(object)),
            other => Err(other),
        }
    }
}

// =============================================================================
// Classification
// =============================================================================

/// Read a manifest's discriminator
///
/// Never fails: a missing or non-string `kind` is `None`.
pub fn classify(manifest: &Manifest) -> Option<&str> {
    manifest.kind()
}

/// True if the manifest is an Ingress
pub fn is_ingress(manifest: &Manifest) -> bool {
    classify(manifest) == Some(INGRESS_KIND)
}

/// True if any manifest in the set has the given kind
pub fn has_any(manifests: &[Manifest], kind: &str) -> bool {
    manifests.iter().any(|m| classify(m) == Some(kind))
}

/// Drop every manifest of the given kind, keeping the rest in order
///
/// Returns the retained manifests and how many were removed.
pub fn without_kind(manifests: Vec<Manifest>, kind: &str) -> (Vec<Manifest>, usize) {
    let total = manifests.len();
    let kept: Vec<Manifest> = manifests
        .into_iter()
        .filter(|m| classify(m) != Some(kind))
        .collect();
    let removed = total - kept.len();
    (kept, removed)
}
