//! Multi-document manifest codec
//!
//! Decodes a stream of YAML documents separated by `---`, or a stream of
//! concatenated JSON objects, into [`Manifest`]s. Encodes back to
//! multi-document YAML. Blank segments are dropped on decode; anything that
//! is not a mapping fails the whole stream.

use std::io::Write;

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use super::Manifest;

/// Separator written between encoded documents
pub const DOCUMENT_SEPARATOR: &str = "---\n";

/// Codec failures
#[derive(Debug, Error)]
pub enum CodecError {
    /// Malformed YAML segment
    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Malformed JSON value
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A document decoded to something other than a mapping
    #[error("document {index} is a {found}, expected a mapping")]
    NotAMapping {
        /// Zero-based position of the segment in the stream
        index: usize,
        /// JSON type name of what was found
        found: &'static str,
    },

    /// Reading or writing the underlying stream failed
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Decode every manifest in `input`
///
/// Empty input yields an empty set.
pub fn decode(input: &[u8]) -> Result<Vec<Manifest>, CodecError> {
    if looks_like_json(input) {
        decode_json(input)
    } else {
        decode_yaml(input)
    }
}

/// Write `manifests` as multi-document YAML
///
/// A failure on any document aborts the encode; bytes already written stay
/// written.
pub fn encode<W: Write>(manifests: &[Manifest], mut writer: W) -> Result<(), CodecError> {
    for (i, manifest) in manifests.iter().enumerate() {
        if i > 0 {
            writer.write_all(DOCUMENT_SEPARATOR.as_bytes())?;
        }
        let yaml = serde_yaml::to_string(manifest)?;
        writer.write_all(yaml.as_bytes())?;
    }
    Ok(())
}

/// Encode `manifests` into a string
pub fn to_yaml(manifests: &[Manifest]) -> Result<String, CodecError> {
    let mut buf = Vec::new();
    encode(manifests, &mut buf)?;
    // serde_yaml only emits UTF-8
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

fn looks_like_json(input: &[u8]) -> bool {
    input
        .iter()
        .find(|b| !b.is_ascii_whitespace())
        .is_some_and(|b| *b == b'{')
}

fn decode_yaml(input: &[u8]) -> Result<Vec<Manifest>, CodecError> {
    let mut manifests = Vec::new();
    for (index, document) in serde_yaml::Deserializer::from_slice(input).enumerate() {
        let value = Value::deserialize(document)?;
        if let Some(manifest) = into_manifest(index, value)? {
            manifests.push(manifest);
        }
    }
    Ok(manifests)
}

fn decode_json(input: &[u8]) -> Result<Vec<Manifest>, CodecError> {
    let mut manifests = Vec::new();
    let stream = serde_json::Deserializer::from_slice(input).into_iter::<Value>();
    for (index, value) in stream.enumerate() {
        if let Some(manifest) = into_manifest(index, value?)? {
            manifests.push(manifest);
        }
    }
    Ok(manifests)
}

/// Blank segments decode to null and empty mappings are treated the same way
fn into_manifest(index: usize, value: Value) -> Result<Option<Manifest>, CodecError> {
    match value {
        Value::Null => Ok(None),
        Value::Object(object) if object.is_empty() => Ok(None),
        Value::Object(object) => Ok(Some(Manifest::from(object))),
        other => Err(CodecError::NotAMapping {
            index,
            found: type_name(&other),
        }),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "mapping",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::fixtures::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn kinds(manifests: &[Manifest]) -> Vec<&str> {
        manifests.iter().filter_map(Manifest::kind).collect()
    }

    // ==========================================================================
    // Story: Decoding rendered chart output
    // ==========================================================================

    #[test]
    fn decodes_multi_document_yaml_in_order() {
        let yaml = r#"
apiVersion: v1
kind: ConfigMap
metadata:
  name: first
---
apiVersion: networking.k8s.io/v1
kind: Ingress
metadata:
  name: second
---
apiVersion: v1
kind: Service
metadata:
  name: third
"#;
        let manifests = decode(yaml.as_bytes()).unwrap();
        assert_eq!(kinds(&manifests), vec!["ConfigMap", "Ingress", "Service"]);
        assert_eq!(manifests[1].get("metadata").unwrap()["name"], "second");
    }

    #[test]
    fn helm_style_leading_and_trailing_separators_are_ignored() {
        let yaml = "---\n# Source: chart/templates/cm.yaml\nkind: ConfigMap\n---\n---\n# only a comment\n---\n";
        let manifests = decode(yaml.as_bytes()).unwrap();
        assert_eq!(kinds(&manifests), vec!["ConfigMap"]);
    }

    #[test]
    fn empty_mappings_are_dropped() {
        let manifests = decode(b"kind: A\n---\n{}\n---\nkind: B\n---\n{}\n").unwrap();
        assert_eq!(kinds(&manifests), vec!["A", "B"]);
    }

    #[test]
    fn empty_and_whitespace_input_yield_nothing() {
        assert!(decode(b"").unwrap().is_empty());
        assert!(decode(b"  \n\n  \n").unwrap().is_empty());
        assert!(decode(b"---\n").unwrap().is_empty());
    }

    #[test]
    fn flow_style_documents_mix_with_block_style() {
        let yaml = "kind: A\n---\n{\"kind\": \"B\", \"spec\": {\"replicas\": 2}}\n";
        let manifests = decode(yaml.as_bytes()).unwrap();
        assert_eq!(kinds(&manifests), vec!["A", "B"]);
        assert_eq!(manifests[1].get("spec").unwrap()["replicas"], 2);
    }

    #[test]
    fn concatenated_json_objects_are_a_stream() {
        let input = br#"{"kind": "A", "metadata": {"name": "a"}}
{"kind": "B"} {}
{"kind": "C"}"#;
        let manifests = decode(input).unwrap();
        assert_eq!(kinds(&manifests), vec!["A", "B", "C"]);
    }

    // ==========================================================================
    // Story: Malformed input fails the whole stream
    // ==========================================================================

    #[test]
    fn unterminated_flow_mapping_fails() {
        let yaml = "kind: A\n---\nmetadata: {name: broken\n";
        assert!(matches!(decode(yaml.as_bytes()), Err(CodecError::Yaml(_))));
    }

    #[test]
    fn malformed_json_fails() {
        let input = br#"{"kind": "A"} {"kind": "#;
        assert!(matches!(decode(input), Err(CodecError::Json(_))));
    }

    #[test]
    fn bad_indentation_fails() {
        let yaml = "kind: A\nmetadata:\n  name: x\n bad: indent\n";
        assert!(decode(yaml.as_bytes()).is_err());
    }

    #[test]
    fn non_mapping_documents_fail_with_position() {
        let err = decode(b"kind: A\n---\n- one\n- two\n").unwrap_err();
        match err {
            CodecError::NotAMapping { index, found } => {
                assert_eq!(index, 1);
                assert_eq!(found, "sequence");
            }
            other => panic!("Expected NotAMapping, got {other:?}"),
        }

        assert!(matches!(
            decode(b"just a string\n"),
            Err(CodecError::NotAMapping { found: "string", .. })
        ));
    }

    // ==========================================================================
    // Story: Encoding
    // ==========================================================================

    #[test]
    fn separator_only_between_documents() {
        let yaml = to_yaml(&[resource("A", "a"), resource("B", "b")]).unwrap();
        assert!(!yaml.starts_with("---"));
        assert_eq!(yaml.matches(DOCUMENT_SEPARATOR).count(), 1);
        assert!(yaml.contains("kind: A\n"));
        assert!(yaml.contains("---\napiVersion: v1\nkind: B\n"));
    }

    #[test]
    fn single_document_has_no_separator() {
        let yaml = to_yaml(&[config_map("only")]).unwrap();
        assert!(!yaml.contains("---"));
    }

    #[test]
    fn empty_set_writes_nothing() {
        assert_eq!(to_yaml(&[]).unwrap(), "");
    }

    #[test]
    fn encode_keeps_key_order() {
        let m = Manifest::try_from(json!({"metadata": {"name": "x"}, "kind": "K", "apiVersion": "v1"}))
            .unwrap();
        let yaml = to_yaml(&[m]).unwrap();
        assert_eq!(yaml, "metadata:\n  name: x\nkind: K\napiVersion: v1\n");
    }

    #[test]
    fn ambiguous_strings_survive_encoding() {
        let m = Manifest::try_from(json!({
            "kind": "ConfigMap",
            "data": { "enabled": "true", "port": "8080", "empty": "", "nothing": "null" },
        }))
        .unwrap();
        let decoded = decode(to_yaml(&[m.clone()]).unwrap().as_bytes()).unwrap();
        assert_eq!(decoded, vec![m]);
    }

    #[test]
    fn encode_reports_write_failures() {
        struct Broken;
        impl Write for Broken {
            fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
                Err(std::io::Error::new(std::io::ErrorKind::Other, "sink closed"))
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let err = encode(&[config_map("x")], Broken).unwrap_err();
        assert!(matches!(err, CodecError::Io(_)));
    }

    #[test]
    fn realistic_manifests_round_trip() {
        let set = vec![config_map("cfg"), ingress("web"), http_route("web")];
        let decoded = decode(to_yaml(&set).unwrap().as_bytes()).unwrap();
        assert_eq!(decoded, set);
    }

    // ==========================================================================
    // Property: decode(encode(D)) == D
    // ==========================================================================

    fn leaf() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(|n| json!(n)),
            "[a-zA-Z0-9 :#'\"-]{0,12}".prop_map(Value::String),
        ]
    }

    fn tree() -> impl Strategy<Value = Value> {
        leaf().prop_recursive(3, 24, 4, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
                prop::collection::vec(("[a-z][a-zA-Z0-9.-]{0,8}", inner), 0..4)
                    .prop_map(|entries| Value::Object(entries.into_iter().collect())),
            ]
        })
    }

    fn document() -> impl Strategy<Value = Manifest> {
        ("[A-Z][a-zA-Z]{0,10}", prop::collection::vec(("[a-z][a-zA-Z]{0,8}", tree()), 0..4))
            .prop_map(|(kind, fields)| {
                let mut object = serde_json::Map::new();
                object.insert("kind".to_string(), Value::String(kind));
                for (key, value) in fields {
                    object.insert(key, value);
                }
                Manifest::from(object)
            })
    }

    proptest! {
        #[test]
        fn round_trip_preserves_documents(set in prop::collection::vec(document(), 0..6)) {
            let yaml = to_yaml(&set).unwrap();
            let decoded = decode(yaml.as_bytes()).unwrap();
            prop_assert_eq!(decoded, set);
        }
    }
}
