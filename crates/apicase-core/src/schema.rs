//! On-disk store document and its JSON Schema
//!
//! The store is a key-value text document; the single key `testCases` holds
//! the serialized test case array.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::model::TestCase;

/// Key under which the test case array is stored.
pub const STORE_KEY: &str = "testCases";

/// Top-level store document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct StoreDocument {
    #[serde(rename = "testCases", default)]
    pub test_cases: Vec<TestCase>,
}

/// Generate JSON Schema for the store document.
#[must_use]
pub fn generate_schema() -> String {
    let schema = schemars::schema_for!(StoreDocument);
    serde_json::to_string_pretty(&schema).expect("schema serialization should not fail")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_document() {
        let json = r#"{"testCases": [{"id": "a", "caseName": "A", "url": "http://a"}]}"#;
        let doc: StoreDocument = serde_json::from_str(json).unwrap();
        assert_eq!(doc.test_cases.len(), 1);
        assert_eq!(doc.test_cases[0].case_name, "A");
    }

    #[test]
    fn empty_object_is_empty_store() {
        let doc: StoreDocument = serde_json::from_str("{}").unwrap();
        assert!(doc.test_cases.is_empty());
    }

    #[test]
    fn store_key_matches_serialization() {
        let value = serde_json::to_value(StoreDocument::default()).unwrap();
        assert!(value.get(STORE_KEY).is_some());
    }

    #[test]
    fn schema_generation_produces_valid_json() {
        let schema = generate_schema();
        let parsed: serde_json::Value = serde_json::from_str(&schema).unwrap();
        assert_eq!(
            parsed.get("title").and_then(|v| v.as_str()),
            Some("StoreDocument")
        );
    }
}
