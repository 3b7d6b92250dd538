//! Readers for transport responses.
//!
//! The transport's result shape is its own business; the executor only reads
//! a handful of documented fields. Each reader accepts the common spellings
//! of those fields and ignores everything else.
//!
//! | Reader | Looks for |
//! |--------|-----------|
//! | [`extract_candidates`] | array, or `results` / `candidates` / `items` / `matches` / `data` |
//! | [`extract_claims`] | array, or `claims` / `records` / `statements`, as list or property map |
//! | [`extract_result_count`] | `count`, `results.bindings`, `bindings`, `rows`, `results`, array |

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const CANDIDATE_LIST_KEYS: &[&str] = &["results", "candidates", "items", "matches", "data"];
const CANDIDATE_ID_KEYS: &[&str] = &["id", "entityId", "entity_id", "qid", "QID"];
const LABEL_KEYS: &[&str] = &["label", "name", "title"];
const SCORE_KEYS: &[&str] = &["score", "similarity", "relevance"];

const CLAIM_LIST_KEYS: &[&str] = &["claims", "records", "statements"];
const CLAIM_ID_KEYS: &[&str] = &["id", "claimId", "claim_id", "statementId", "guid"];
const PROPERTY_KEYS: &[&str] = &["property", "propertyId", "pid", "predicate"];
const VALUE_KEYS: &[&str] = &["value", "object", "datavalue"];

/// One ranked discovery hit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

/// One structured record returned by corroboration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

fn first_field<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|k| obj.get(*k))
}

fn as_identifier(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn string_field(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    first_field(obj, keys)
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn list_under<'a>(response: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    match response {
        Value::Array(_) => Some(response),
        Value::Object(obj) => first_field(obj, keys),
        _ => None,
    }
}

/// Ranked candidates in transport order. Items without an identifier are dropped.
pub fn extract_candidates(response: &Value) -> Vec<Candidate> {
    let Some(Value::Array(items)) = list_under(response, CANDIDATE_LIST_KEYS) else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| match item {
            Value::Object(obj) => {
                let id = first_field(obj, CANDIDATE_ID_KEYS).and_then(as_identifier)?;
                Some(Candidate {
                    id,
                    label: string_field(obj, LABEL_KEYS),
                    description: string_field(obj, &["description"]),
                    score: first_field(obj, SCORE_KEYS).and_then(Value::as_f64),
                })
            }
            other => as_identifier(other).map(|id| Candidate {
                id,
                label: None,
                description: None,
                score: None,
            }),
        })
        .collect()
}

fn claim_from_object(obj: &Map<String, Value>, property: Option<&str>) -> Claim {
    Claim {
        id: first_field(obj, CLAIM_ID_KEYS).and_then(as_identifier),
        property: property
            .map(str::to_string)
            .or_else(|| first_field(obj, PROPERTY_KEYS).and_then(as_identifier)),
        value: first_field(obj, VALUE_KEYS).cloned(),
    }
}

fn claims_from_items(items: &[Value], property: Option<&str>) -> Vec<Claim> {
    items
        .iter()
        .map(|item| match item {
            Value::Object(obj) => claim_from_object(obj, property),
            other => Claim {
                id: None,
                property: property.map(str::to_string),
                value: Some(other.clone()),
            },
        })
        .collect()
}

/// Claims in transport order.
///
/// Accepts a flat list of claim objects, or a property map
/// (`{"P61": [{...}, ...]}`) where each key names the property.
pub fn extract_claims(response: &Value) -> Vec<Claim> {
    match list_under(response, CLAIM_LIST_KEYS) {
        Some(Value::Array(items)) => claims_from_items(items, None),
        Some(Value::Object(by_property)) => by_property
            .iter()
            .flat_map(|(property, values)| match values {
                Value::Array(items) => claims_from_items(items, Some(property)),
                single => claims_from_items(std::slice::from_ref(single), Some(property)),
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// Number of rows in a structured-query result.
pub fn extract_result_count(response: &Value) -> usize {
    match response {
        Value::Array(items) => items.len(),
        Value::Object(obj) => {
            if let Some(n) = obj.get("count").and_then(Value::as_u64) {
                return n as usize;
            }
            let bindings = obj
                .get("results")
                .and_then(|r| r.get("bindings"))
                .or_else(|| obj.get("bindings"))
                .or_else(|| obj.get("rows"))
                .or_else(|| obj.get("results"));
            match bindings {
                Some(Value::Array(items)) => items.len(),
                _ => 0,
            }
        }
        _ => 0,
    }
}

/// Render a claim value for display: strings verbatim, objects by their
/// `id` / `label` / `value` field, anything else as JSON.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Object(obj) => first_field(obj, &["label", "id", "value", "text"])
            .map(display_value)
            .unwrap_or_else(|| value.to_string()),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_candidates_from_results_key() {
        let response = json!({
            "results": [
                {"id": "Q34743", "label": "Alexander Graham Bell", "score": 0.93},
                {"label": "no id, dropped"},
                {"entityId": "Q11035", "name": "telephone", "score": 0.81}
            ]
        });
        let candidates = extract_candidates(&response);

        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].id, "Q34743");
        assert_eq!(candidates[0].label.as_deref(), Some("Alexander Graham Bell"));
        assert_eq!(candidates[0].score, Some(0.93));
        assert_eq!(candidates[1].id, "Q11035");
    }

    #[test]
    fn test_candidates_from_bare_array_of_ids() {
        let candidates = extract_candidates(&json!(["Q1", 42, ""]));
        let ids: Vec<_> = candidates.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["Q1", "42"]);
    }

    #[test]
    fn test_candidates_from_unexpected_shape() {
        assert!(extract_candidates(&json!("text")).is_empty());
        assert!(extract_candidates(&json!({"other": []})).is_empty());
    }

    #[test]
    fn test_claims_flat_list() {
        let claims = extract_claims(&json!({
            "claims": [
                {"claimId": "Q34743$abc", "property": "P61", "value": {"id": "Q11035", "label": "telephone"}},
                {"id": "Q34743$def", "pid": "P19", "value": "Edinburgh"}
            ]
        }));

        assert_eq!(claims.len(), 2);
        assert_eq!(claims[0].id.as_deref(), Some("Q34743$abc"));
        assert_eq!(claims[0].property.as_deref(), Some("P61"));
        assert_eq!(claims[1].property.as_deref(), Some("P19"));
        assert_eq!(display_value(claims[0].value.as_ref().unwrap()), "telephone");
    }

    #[test]
    fn test_claims_property_map() {
        let claims = extract_claims(&json!({
            "claims": {
                "P61": [{"id": "s1", "value": "telephone"}],
                "P19": {"id": "s2", "value": "Edinburgh"}
            }
        }));

        assert_eq!(claims.len(), 2);
        assert!(claims.iter().any(|c| c.property.as_deref() == Some("P61")
            && c.id.as_deref() == Some("s1")));
        assert!(claims.iter().any(|c| c.property.as_deref() == Some("P19")));
    }

    #[test]
    fn test_result_count_shapes() {
        assert_eq!(extract_result_count(&json!({"count": 7})), 7);
        assert_eq!(
            extract_result_count(&json!({"results": {"bindings": [{}, {}, {}]}})),
            3
        );
        assert_eq!(extract_result_count(&json!({"rows": [{}]})), 1);
        assert_eq!(extract_result_count(&json!([1, 2])), 2);
        assert_eq!(extract_result_count(&json!("nothing")), 0);
    }
}
