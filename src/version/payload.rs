//! Decoding of manifest payloads returned by the contents API
//!
//! The API answers either with the raw file (when raw content negotiation is
//! honored) or with a JSON envelope whose `content` field holds the file
//! base64-encoded.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Fields of interest in a package manifest
///
/// Only `version` must be well-formed. The other fields are informational and
/// read as `None` when they have an unexpected shape, so lockfiles and other
/// JSON files carrying a `version` still decode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    pub version: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub dependencies: Option<IndexMap<String, String>>,
    #[serde(default, deserialize_with = "lenient")]
    pub dev_dependencies: Option<IndexMap<String, String>>,
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Decode a response body into a manifest
///
/// Returns a human-readable reason on failure; callers attach repository and
/// path context.
pub fn decode_manifest(body: &str) -> Result<Manifest, String> {
    let value: Value =
        serde_json::from_str(body).map_err(|e| format!("response is not valid JSON: {}", e))?;

    let manifest = match value.get("content").and_then(Value::as_str) {
        Some(encoded) => {
            let decoded = decode_content(encoded)?;
            serde_json::from_str::<Value>(&decoded)
                .map_err(|e| format!("decoded content is not valid JSON: {}", e))?
        }
        None => value,
    };

    if !manifest.is_object() {
        return Err("manifest is not a JSON object".to_string());
    }

    serde_json::from_value(manifest).map_err(|e| format!("unexpected manifest shape: {}", e))
}

fn decode_content(encoded: &str) -> Result<String, String> {
    // The contents API wraps base64 at 60 columns
    let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();

    let bytes = STANDARD
        .decode(compact)
        .map_err(|e| format!("failed to decode base64 content: {}", e))?;

    String::from_utf8(bytes).map_err(|e| format!("decoded content is not UTF-8: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = r#"{
        "name": "my-app",
        "version": "1.2.3",
        "dependencies": {"react": "^18.2.0", "axios": "^1.6.0"},
        "devDependencies": {"typescript": "~5.3.0"}
    }"#;

    #[test]
    fn decode_manifest_reads_direct_json() {
        let manifest = decode_manifest(MANIFEST).unwrap();

        assert_eq!(manifest.name.as_deref(), Some("my-app"));
        assert_eq!(manifest.version.as_deref(), Some("1.2.3"));

        let dependencies = manifest.dependencies.unwrap();
        assert_eq!(
            dependencies.keys().collect::<Vec<_>>(),
            vec!["react", "axios"]
        );
        assert_eq!(
            manifest.dev_dependencies.unwrap().get("typescript").map(String::as_str),
            Some("~5.3.0")
        );
    }

    #[test]
    fn decode_manifest_unwraps_base64_envelope_with_line_breaks() {
        let encoded = STANDARD.encode(MANIFEST);
        let wrapped = encoded
            .as_bytes()
            .chunks(60)
            .map(|chunk| std::str::from_utf8(chunk).unwrap())
            .collect::<Vec<_>>()
            .join("\n");
        let body = serde_json::json!({
            "name": "package.json",
            "encoding": "base64",
            "content": wrapped,
        })
        .to_string();

        assert_eq!(
            decode_manifest(&body).unwrap(),
            decode_manifest(MANIFEST).unwrap()
        );
    }

    #[test]
    fn decode_manifest_allows_missing_optional_fields() {
        let manifest = decode_manifest(r#"{"version": "0.1.0"}"#).unwrap();

        assert_eq!(
            manifest,
            Manifest {
                version: Some("0.1.0".to_string()),
                ..Default::default()
            }
        );
    }

    #[test]
    fn decode_manifest_ignores_malformed_optional_fields() {
        let lockfile = r#"{
            "name": "app",
            "version": "1.2.3",
            "lockfileVersion": 3,
            "dependencies": {"left-pad": {"version": "1.3.0"}}
        }"#;

        let manifest = decode_manifest(lockfile).unwrap();
        assert_eq!(manifest.version.as_deref(), Some("1.2.3"));
        assert_eq!(manifest.name.as_deref(), Some("app"));
        assert_eq!(manifest.dependencies, None);

        let manifest = decode_manifest(r#"{"version": "1.2.3", "name": {"full": "app"}}"#).unwrap();
        assert_eq!(manifest.version.as_deref(), Some("1.2.3"));
        assert_eq!(manifest.name, None);
    }

    #[test]
    fn decode_manifest_rejects_non_string_version() {
        let err = decode_manifest(r#"{"version": 1}"#).unwrap_err();
        assert!(err.contains("unexpected manifest shape"), "unexpected reason: {}", err);
    }

    #[test]
    fn decode_manifest_rejects_invalid_json() {
        assert!(decode_manifest("{not json").is_err());
    }

    #[test]
    fn decode_manifest_rejects_invalid_base64() {
        let body = r#"{"content": "!!!not base64!!!", "encoding": "base64"}"#;

        let err = decode_manifest(body).unwrap_err();
        assert!(err.contains("base64"), "unexpected reason: {}", err);
    }

    #[test]
    fn decode_manifest_rejects_non_object_manifest() {
        assert!(decode_manifest("[1, 2, 3]").is_err());
    }
}
