//! Canonicalization of Engine-Native Description Trees
//!
//! `describe_collection` responses from a real binding are built from
//! protocol-buffer objects: nested messages, repeated containers, and
//! leaves with no natural JSON form. [`RawValue`] is the tagged
//! intermediate a binding produces, and [`canonicalize`] converts it to
//! plain `serde_json::Value`.
//!
//! The walk is budgeted by total node count and depth, not recursion
//! alone, so it terminates on pathologically deep or self-referential
//! inputs; whatever exceeds a bound degrades to its string rendering.

use std::fmt;

use serde_json::Value;

/// Maximum nesting depth before a subtree degrades to a string.
pub const MAX_CANONICAL_DEPTH: usize = 64;

/// Maximum total nodes visited before remaining subtrees degrade.
pub const MAX_CANONICAL_NODES: usize = 16384;

// ============================================================================
// RAW VALUE
// ============================================================================

/// Tagged engine-native value tree: scalar, sequence, mapping, or an
/// opaque object carrying a type name and whatever fields could be
/// extracted from it.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Seq(Vec<RawValue>),
    Map(Vec<(String, RawValue)>),
    Opaque {
        type_name: String,
        fields: Vec<(String, RawValue)>,
    },
}

impl fmt::Display for RawValue {
    /// String fallback rendering used when a bound is exceeded or an
    /// opaque leaf has no extractable fields.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Null => write!(f, "null"),
            RawValue::Bool(b) => write!(f, "{}", b),
            RawValue::Int(i) => write!(f, "{}", i),
            RawValue::Float(x) => write!(f, "{}", x),
            RawValue::Text(s) => write!(f, "{}", s),
            RawValue::Seq(items) => write!(f, "<sequence of {} items>", items.len()),
            RawValue::Map(entries) => write!(f, "<mapping of {} entries>", entries.len()),
            RawValue::Opaque { type_name, .. } => write!(f, "<{}>", type_name),
        }
    }
}

// ============================================================================
// CANONICALIZER
// ============================================================================

struct Budget {
    nodes_left: usize,
}

/// Convert a [`RawValue`] tree to plain JSON.
///
/// Opaque objects become mappings of their extracted fields; opaque
/// leaves with no fields fall back to `"<TypeName>"`. Non-finite floats
/// fall back to their string form since JSON cannot carry them.
pub fn canonicalize(raw: &RawValue) -> Value {
    let mut budget = Budget {
        nodes_left: MAX_CANONICAL_NODES,
    };
    walk(raw, 0, &mut budget)
}

fn walk(raw: &RawValue, depth: usize, budget: &mut Budget) -> Value {
    if depth >= MAX_CANONICAL_DEPTH || budget.nodes_left == 0 {
        return Value::String(raw.to_string());
    }
    budget.nodes_left -= 1;

    match raw {
        RawValue::Null => Value::Null,
        RawValue::Bool(b) => Value::Bool(*b),
        RawValue::Int(i) => Value::Number((*i).into()),
        RawValue::Float(x) => match serde_json::Number::from_f64(*x) {
            Some(n) => Value::Number(n),
            None => Value::String(x.to_string()),
        },
        RawValue::Text(s) => Value::String(s.clone()),
        RawValue::Seq(items) => Value::Array(
            items
                .iter()
                .map(|item| walk(item, depth + 1, budget))
                .collect(),
        ),
        RawValue::Map(entries) => {
            let mut map = serde_json::Map::with_capacity(entries.len());
            for (key, value) in entries {
                map.insert(key.clone(), walk(value, depth + 1, budget));
            }
            Value::Object(map)
        }
        RawValue::Opaque { type_name, fields } => {
            if fields.is_empty() {
                return Value::String(format!("<{}>", type_name));
            }
            let mut map = serde_json::Map::with_capacity(fields.len());
            for (key, value) in fields {
                map.insert(key.clone(), walk(value, depth + 1, budget));
            }
            Value::Object(map)
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalars_pass_through() {
        assert_eq!(canonicalize(&RawValue::Null), json!(null));
        assert_eq!(canonicalize(&RawValue::Bool(true)), json!(true));
        assert_eq!(canonicalize(&RawValue::Int(42)), json!(42));
        assert_eq!(canonicalize(&RawValue::Text("x".into())), json!("x"));
    }

    #[test]
    fn test_nested_structure() {
        let raw = RawValue::Map(vec![
            ("name".to_string(), RawValue::Text("docs".to_string())),
            (
                "fields".to_string(),
                RawValue::Seq(vec![RawValue::Map(vec![(
                    "dim".to_string(),
                    RawValue::Int(128),
                )])]),
            ),
        ]);
        assert_eq!(
            canonicalize(&raw),
            json!({"name": "docs", "fields": [{"dim": 128}]})
        );
    }

    #[test]
    fn test_opaque_with_fields_becomes_mapping() {
        let raw = RawValue::Opaque {
            type_name: "FieldSchema".to_string(),
            fields: vec![("name".to_string(), RawValue::Text("vector".to_string()))],
        };
        assert_eq!(canonicalize(&raw), json!({"name": "vector"}));
    }

    #[test]
    fn test_opaque_leaf_falls_back_to_string() {
        let raw = RawValue::Opaque {
            type_name: "google.protobuf.Any".to_string(),
            fields: vec![],
        };
        assert_eq!(canonicalize(&raw), json!("<google.protobuf.Any>"));
    }

    #[test]
    fn test_non_finite_float_falls_back_to_string() {
        assert_eq!(canonicalize(&RawValue::Float(f64::NAN)), json!("NaN"));
    }

    #[test]
    fn test_pathological_depth_terminates() {
        let mut raw = RawValue::Int(0);
        for _ in 0..(MAX_CANONICAL_DEPTH * 4) {
            raw = RawValue::Seq(vec![raw]);
        }
        // Must not overflow the stack; deep remainder degrades to a string
        let value = canonicalize(&raw);
        let mut cursor = &value;
        let mut depth = 0;
        while let Value::Array(items) = cursor {
            cursor = &items[0];
            depth += 1;
        }
        assert!(depth <= MAX_CANONICAL_DEPTH);
        assert!(matches!(cursor, Value::String(_)));
    }

    #[test]
    fn test_node_budget_bounds_wide_trees() {
        let wide = RawValue::Seq(vec![RawValue::Int(1); MAX_CANONICAL_NODES * 2]);
        let value = canonicalize(&wide);
        let items = value.as_array().unwrap();
        // Every element is present, but past the budget they are string
        // renderings instead of numbers
        assert_eq!(items.len(), MAX_CANONICAL_NODES * 2);
        assert!(items.iter().any(|v| v.is_string()));
    }
}
