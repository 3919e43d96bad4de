//! Deterministic In-Memory Engine
//!
//! A complete [`Connection`] implementation backed by plain maps. It
//! mirrors the remote engine's observable behavior closely enough to
//! exercise every facade path without a live service: auto-assigned
//! int64 ids, cosine scoring on dense fields, server-side BM25 scoring
//! on the sparse field, and equality filters.
//!
//! Filter support is intentionally the `field == literal` subset the
//! facade's own callers use.

use std::collections::HashMap;

use serde_json::Value;

use crate::client::{
    Connection, DeleteOutcome, InsertOutcome, RawHit, RawSearch, RawValue, Record, SearchData,
};
use crate::error::{ClientError, Result};
use crate::schema::{CollectionPlan, DataType, PRIMARY_FIELD};

// BM25 shape parameters, the common defaults
const BM25_K1: f32 = 1.2;
const BM25_B: f32 = 0.75;

// ============================================================================
// STORAGE
// ============================================================================

struct StoredCollection {
    plan: CollectionPlan,
    rows: Vec<Record>,
    next_id: i64,
}

/// In-memory engine. One instance per test; state lives for the
/// lifetime of the connection.
#[derive(Default)]
pub struct MemoryConnection {
    collections: HashMap<String, StoredCollection>,
}

impl MemoryConnection {
    pub fn new() -> Self {
        Self::default()
    }

    fn collection(&mut self, name: &str) -> Result<&mut StoredCollection> {
        self.collections.get_mut(name).ok_or_else(|| {
            ClientError::Engine(format!("collection '{}' does not exist", name))
        })
    }
}

// ============================================================================
// FILTER EVALUATION
// ============================================================================

/// Parse a `field == literal` expression. Literals may be integers,
/// floats, or single/double quoted strings.
fn parse_filter(filter: &str) -> Result<(String, Value)> {
    let (field, literal) = filter.split_once("==").ok_or_else(|| {
        ClientError::Engine(format!("unsupported filter expression: '{}'", filter))
    })?;
    let field = field.trim();
    let literal = literal.trim();
    if field.is_empty() || literal.is_empty() {
        return Err(ClientError::Engine(format!(
            "unsupported filter expression: '{}'",
            filter
        )));
    }

    let value = if (literal.starts_with('"') && literal.ends_with('"') && literal.len() >= 2)
        || (literal.starts_with('\'') && literal.ends_with('\'') && literal.len() >= 2)
    {
        Value::String(literal[1..literal.len() - 1].to_string())
    } else if let Ok(i) = literal.parse::<i64>() {
        Value::Number(i.into())
    } else if let Ok(x) = literal.parse::<f64>() {
        serde_json::Number::from_f64(x)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    } else {
        Value::String(literal.to_string())
    };

    Ok((field.to_string(), value))
}

fn row_matches(row: &Record, field: &str, expected: &Value) -> bool {
    match row.get(field) {
        Some(actual) => match (actual, expected) {
            // Compare numerics by value so 1 == 1.0
            (Value::Number(a), Value::Number(b)) => {
                a.as_f64().unwrap_or(f64::NAN) == b.as_f64().unwrap_or(f64::NAN)
            }
            (a, b) => a == b,
        },
        None => false,
    }
}

fn apply_filter<'a>(rows: &'a [Record], filter: Option<&str>) -> Result<Vec<&'a Record>> {
    match filter.map(str::trim).filter(|f| !f.is_empty()) {
        None => Ok(rows.iter().collect()),
        Some(expr) => {
            let (field, value) = parse_filter(expr)?;
            Ok(rows
                .iter()
                .filter(|row| row_matches(row, &field, &value))
                .collect())
        }
    }
}

// ============================================================================
// SCORING
// ============================================================================

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let mut dot = 0.0_f32;
    let mut norm_a = 0.0_f32;
    let mut norm_b = 0.0_f32;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .collect()
}

/// Okapi BM25 over the analyzed text field of each row.
fn bm25_scores(query: &str, documents: &[(usize, Vec<String>)]) -> Vec<(usize, f32)> {
    let n = documents.len();
    if n == 0 {
        return Vec::new();
    }
    let avgdl =
        documents.iter().map(|(_, terms)| terms.len()).sum::<usize>() as f32 / n as f32;
    let avgdl = avgdl.max(1.0);

    let query_terms = tokenize(query);
    let mut scores = Vec::new();
    for (row_index, terms) in documents {
        let dl = terms.len() as f32;
        let mut score = 0.0_f32;
        for term in &query_terms {
            let df = documents
                .iter()
                .filter(|(_, doc)| doc.contains(term))
                .count() as f32;
            if df == 0.0 {
                continue;
            }
            let tf = terms.iter().filter(|t| *t == term).count() as f32;
            if tf == 0.0 {
                continue;
            }
            let idf = (1.0 + (n as f32 - df + 0.5) / (df + 0.5)).ln();
            score += idf * tf * (BM25_K1 + 1.0)
                / (tf + BM25_K1 * (1.0 - BM25_B + BM25_B * dl / avgdl));
        }
        if score > 0.0 {
            scores.push((*row_index, score));
        }
    }
    scores
}

fn vector_from_value(value: &Value) -> Option<Vec<f32>> {
    value.as_array().map(|items| {
        items
            .iter()
            .filter_map(|v| v.as_f64().map(|x| x as f32))
            .collect()
    })
}

fn project(row: &Record, output_fields: &[String]) -> Record {
    let mut entity = Record::new();
    for field in output_fields {
        if field == "*" {
            return row.clone();
        }
        if let Some(value) = row.get(field) {
            entity.insert(field.clone(), value.clone());
        }
    }
    entity
}

// ============================================================================
// CONNECTION IMPLEMENTATION
// ============================================================================

impl Connection for MemoryConnection {
    fn list_collections(&mut self) -> Result<Vec<String>> {
        let mut names: Vec<String> = self.collections.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    fn has_collection(&mut self, name: &str) -> Result<bool> {
        Ok(self.collections.contains_key(name))
    }

    fn create_collection(&mut self, plan: &CollectionPlan) -> Result<()> {
        if self.collections.contains_key(&plan.name) {
            return Err(ClientError::Engine(format!(
                "collection '{}' already exists",
                plan.name
            )));
        }
        self.collections.insert(
            plan.name.clone(),
            StoredCollection {
                plan: plan.clone(),
                rows: Vec::new(),
                next_id: 1,
            },
        );
        Ok(())
    }

    fn drop_collection(&mut self, name: &str) -> Result<()> {
        // Dropping an absent collection is a no-op, as on the engine
        self.collections.remove(name);
        Ok(())
    }

    fn describe_collection(&mut self, name: &str) -> Result<RawValue> {
        let stored = self.collection(name)?;
        let fields = stored
            .plan
            .fields
            .iter()
            .map(|f| {
                // Shaped like the binding's protobuf-derived field objects
                RawValue::Opaque {
                    type_name: "FieldSchema".to_string(),
                    fields: vec![
                        ("name".to_string(), RawValue::Text(f.name.clone())),
                        (
                            "type".to_string(),
                            RawValue::Text(format!("{:?}", f.data_type)),
                        ),
                        (
                            "params".to_string(),
                            RawValue::Map(
                                f.dim
                                    .map(|d| vec![("dim".to_string(), RawValue::Int(d as i64))])
                                    .unwrap_or_default(),
                            ),
                        ),
                    ],
                }
            })
            .collect();

        Ok(RawValue::Map(vec![
            (
                "collection_name".to_string(),
                RawValue::Text(stored.plan.name.clone()),
            ),
            ("auto_id".to_string(), RawValue::Bool(stored.plan.auto_id)),
            ("fields".to_string(), RawValue::Seq(fields)),
            (
                "num_rows".to_string(),
                RawValue::Int(stored.rows.len() as i64),
            ),
        ]))
    }

    fn insert(&mut self, collection: &str, rows: Vec<Record>) -> Result<InsertOutcome> {
        let stored = self.collection(collection)?;

        let dims: Vec<(String, u32)> = stored
            .plan
            .fields
            .iter()
            .filter(|f| f.data_type == DataType::FloatVector)
            .filter_map(|f| f.dim.map(|d| (f.name.clone(), d)))
            .collect();

        let mut ids = Vec::with_capacity(rows.len());
        let mut accepted = Vec::with_capacity(rows.len());
        for mut row in rows {
            for (field, dim) in &dims {
                let length = row
                    .get(field)
                    .and_then(vector_from_value)
                    .map(|v| v.len())
                    .unwrap_or(0);
                if length != *dim as usize {
                    return Err(ClientError::Engine(format!(
                        "vector field '{}' expects dimension {}, got {}",
                        field, dim, length
                    )));
                }
            }
            let id = stored.next_id;
            stored.next_id += 1;
            row.insert(PRIMARY_FIELD.to_string(), Value::Number(id.into()));
            ids.push(id);
            accepted.push(row);
        }
        // All rows validated before any mutation becomes visible
        stored.rows.extend(accepted);

        Ok(InsertOutcome {
            inserted_count: ids.len(),
            ids,
        })
    }

    fn query(
        &mut self,
        collection: &str,
        filter: &str,
        limit: Option<usize>,
        output_fields: &[String],
    ) -> Result<Vec<Record>> {
        let stored = self.collection(collection)?;
        let matched = apply_filter(&stored.rows, Some(filter))?;
        let limit = limit.unwrap_or(usize::MAX);
        Ok(matched
            .into_iter()
            .take(limit)
            .map(|row| {
                if output_fields.is_empty() {
                    row.clone()
                } else {
                    let mut record = project(row, output_fields);
                    record.insert(
                        PRIMARY_FIELD.to_string(),
                        row.get(PRIMARY_FIELD).cloned().unwrap_or(Value::Null),
                    );
                    record
                }
            })
            .collect())
    }

    fn delete(&mut self, collection: &str, filter: &str) -> Result<DeleteOutcome> {
        if filter.trim().is_empty() {
            // Engine-side guard; the facade rejects this earlier
            return Err(ClientError::Engine(
                "delete requires a filter expression".to_string(),
            ));
        }
        let stored = self.collection(collection)?;
        let (field, value) = parse_filter(filter)?;
        let before = stored.rows.len();
        stored.rows.retain(|row| !row_matches(row, &field, &value));
        Ok(DeleteOutcome {
            deleted_count: before - stored.rows.len(),
        })
    }

    fn search(&mut self, collection: &str, request: &RawSearch) -> Result<Vec<Vec<RawHit>>> {
        let stored = self.collection(collection)?;
        let plan = stored.plan.clone();

        let candidates = apply_filter(&stored.rows, request.filter.as_deref())?;

        let scored_groups: Vec<Vec<(usize, f32)>> = match &request.data {
            SearchData::Vectors(queries) => {
                let field = plan
                    .field(&request.anns_field)
                    .filter(|f| f.data_type == DataType::FloatVector)
                    .ok_or_else(|| {
                        ClientError::Engine(format!(
                            "vector field '{}' does not exist in collection '{}'",
                            request.anns_field, collection
                        ))
                    })?;
                let field_name = field.name.clone();
                queries
                    .iter()
                    .map(|query| {
                        let mut scores: Vec<(usize, f32)> = candidates
                            .iter()
                            .enumerate()
                            .filter_map(|(i, row)| {
                                row.get(&field_name)
                                    .and_then(vector_from_value)
                                    .map(|v| (i, cosine_similarity(query, &v)))
                            })
                            .collect();
                        scores.sort_by(|a, b| {
                            b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal)
                        });
                        scores
                    })
                    .collect()
            }
            SearchData::Text(query) => {
                // The sparse field is produced by the BM25 function; score
                // against its input text field, as the engine does
                let function = plan
                    .functions
                    .iter()
                    .find(|f| f.output_field_names.contains(&request.anns_field))
                    .ok_or_else(|| {
                        ClientError::Engine(format!(
                            "sparse field '{}' does not exist in collection '{}'",
                            request.anns_field, collection
                        ))
                    })?;
                let text_field = function
                    .input_field_names
                    .first()
                    .cloned()
                    .ok_or_else(|| {
                        ClientError::Engine(format!(
                            "BM25 function '{}' has no input field",
                            function.name
                        ))
                    })?;
                let documents: Vec<(usize, Vec<String>)> = candidates
                    .iter()
                    .enumerate()
                    .map(|(i, row)| {
                        let text = row.get(&text_field).and_then(Value::as_str).unwrap_or("");
                        (i, tokenize(text))
                    })
                    .collect();
                let mut scores = bm25_scores(query, &documents);
                scores.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
                vec![scores]
            }
        };

        Ok(scored_groups
            .into_iter()
            .map(|scores| {
                scores
                    .into_iter()
                    .take(request.limit)
                    .map(|(i, score)| {
                        let row = candidates[i];
                        RawHit {
                            id: row
                                .get(PRIMARY_FIELD)
                                .and_then(Value::as_i64)
                                .unwrap_or_default(),
                            score,
                            entity: project(row, &request.output_fields),
                        }
                    })
                    .collect()
            })
            .collect())
    }
}

// ============================================================================
// TESTS
// ============================================================================
