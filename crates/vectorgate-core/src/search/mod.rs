//! Unified Search Dispatcher
//!
//! Routes a request to the dense, BM25-sparse, or hybrid retrieval
//! primitive and normalizes the heterogeneous per-hit shapes into one
//! response contract. Hybrid executes both branches and fuses them by
//! weighted combination of max-normalized scores; it never silently
//! drops the text branch.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::client::{Connection, RawHit, RawSearch, Record, SearchData};
use crate::error::{ClientError, Result};
use crate::schema::{MetricType, DEFAULT_VECTOR_FIELD, SPARSE_VECTOR_FIELD};

/// Default number of hits returned when the caller does not say.
pub const DEFAULT_LIMIT: usize = 10;

/// Default weights for hybrid fusion, dense-leaning.
pub const DEFAULT_VECTOR_WEIGHT: f32 = 0.7;
pub const DEFAULT_TEXT_WEIGHT: f32 = 0.3;

// ============================================================================
// REQUEST SHAPE
// ============================================================================

/// The three retrieval modalities.
#[derive(Debug, Clone)]
pub enum SearchQuery {
    /// Dense-vector similarity against a float-vector field.
    Dense {
        vectors: Vec<Vec<f32>>,
        /// Defaults to [`DEFAULT_VECTOR_FIELD`]
        anns_field: Option<String>,
    },
    /// BM25 keyword ranking; tokenization happens server-side.
    Sparse { query_text: String },
    /// Both branches, fused by weighted score combination.
    Hybrid {
        vector: Vec<f32>,
        query_text: String,
        vector_weight: f32,
        text_weight: f32,
    },
}

/// A unified search request.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub collection: String,
    pub query: SearchQuery,
    pub limit: usize,
    pub output_fields: Vec<String>,
    pub filter: Option<String>,
    /// Drop hits whose converted similarity falls below this value.
    pub min_similarity: Option<f32>,
    /// Metric of the collection's dense index; governs score-to-
    /// similarity conversion. COSINE by default.
    pub metric: MetricType,
}

impl SearchRequest {
    pub fn dense(collection: impl Into<String>, vector: Vec<f32>) -> Self {
        Self {
            collection: collection.into(),
            query: SearchQuery::Dense {
                vectors: vec![vector],
                anns_field: None,
            },
            limit: DEFAULT_LIMIT,
            output_fields: Vec::new(),
            filter: None,
            min_similarity: None,
            metric: MetricType::Cosine,
        }
    }

    pub fn sparse(collection: impl Into<String>, query_text: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            query: SearchQuery::Sparse {
                query_text: query_text.into(),
            },
            limit: DEFAULT_LIMIT,
            output_fields: Vec::new(),
            filter: None,
            min_similarity: None,
            metric: MetricType::Bm25,
        }
    }

    pub fn hybrid(
        collection: impl Into<String>,
        vector: Vec<f32>,
        query_text: impl Into<String>,
    ) -> Self {
        Self {
            collection: collection.into(),
            query: SearchQuery::Hybrid {
                vector,
                query_text: query_text.into(),
                vector_weight: DEFAULT_VECTOR_WEIGHT,
                text_weight: DEFAULT_TEXT_WEIGHT,
            },
            limit: DEFAULT_LIMIT,
            output_fields: Vec::new(),
            filter: None,
            min_similarity: None,
            metric: MetricType::Cosine,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_output_fields(mut self, fields: Vec<String>) -> Self {
        self.output_fields = fields;
        self
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn with_min_similarity(mut self, min_similarity: f32) -> Self {
        self.min_similarity = Some(min_similarity);
        self
    }
}

/// One normalized hit. `entity` carries only the requested output
/// fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: i64,
    pub score: f32,
    pub entity: Record,
}

// ============================================================================
// SIMILARITY CONVERSION
// ============================================================================

/// Convert a raw score to a comparable similarity.
///
/// COSINE and BM25 already rank higher-is-closer and pass through; L2
/// distances invert via `1 / (1 + d)`.
pub fn score_to_similarity(score: f32, metric: MetricType) -> f32 {
    match metric {
        MetricType::Cosine | MetricType::Bm25 => score,
        MetricType::L2 => 1.0 / (1.0 + score.max(0.0)),
    }
}

fn apply_threshold(hits: Vec<SearchHit>, min_similarity: Option<f32>, metric: MetricType) -> Vec<SearchHit> {
    match min_similarity {
        None => hits,
        Some(threshold) => hits
            .into_iter()
            .filter(|hit| score_to_similarity(hit.score, metric) >= threshold)
            .collect(),
    }
}

// ============================================================================
// HYBRID FUSION
// ============================================================================

/// Fuse two ranked lists by weighted sum of max-normalized scores.
///
/// Each branch is normalized by its own top score so the weights mean
/// the same thing regardless of scoring scale; entities are merged with
/// the dense branch taking precedence on field collisions.
pub fn fuse_weighted(
    dense: &[RawHit],
    sparse: &[RawHit],
    dense_weight: f32,
    sparse_weight: f32,
) -> Vec<RawHit> {
    let mut scores: HashMap<i64, f32> = HashMap::new();
    let mut entities: HashMap<i64, Record> = HashMap::new();

    let max_dense = dense
        .iter()
        .map(|h| h.score)
        .fold(f32::MIN, f32::max)
        .max(0.001);
    for hit in dense {
        *scores.entry(hit.id).or_default() += (hit.score / max_dense) * dense_weight;
        entities.entry(hit.id).or_insert_with(|| hit.entity.clone());
    }

    let max_sparse = sparse
        .iter()
        .map(|h| h.score)
        .fold(f32::MIN, f32::max)
        .max(0.001);
    for hit in sparse {
        *scores.entry(hit.id).or_default() += (hit.score / max_sparse) * sparse_weight;
        entities.entry(hit.id).or_insert_with(|| hit.entity.clone());
    }

    let mut fused: Vec<RawHit> = scores
        .into_iter()
        .map(|(id, score)| RawHit {
            id,
            score,
            entity: entities.remove(&id).unwrap_or_default(),
        })
        .collect();
    fused.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    fused
}

// ============================================================================
// DISPATCH
// ============================================================================

/// Execute a unified search request against a connection.
///
/// The collection's existence is checked first so a miss surfaces as
/// `ResourceNotFound` rather than an opaque engine error.
pub fn dispatch(connection: &mut dyn Connection, request: &SearchRequest) -> Result<Vec<SearchHit>> {
    if !connection.has_collection(&request.collection)? {
        return Err(ClientError::NotFound {
            kind: "collection",
            name: request.collection.clone(),
        });
    }

    let hits = match &request.query {
        SearchQuery::Dense { vectors, anns_field } => {
            if vectors.is_empty() {
                return Err(ClientError::invalid("dense search requires at least one query vector"));
            }
            debug!(collection = %request.collection, queries = vectors.len(), "dense search");
            let groups = connection.search(
                &request.collection,
                &RawSearch {
                    anns_field: anns_field
                        .clone()
                        .unwrap_or_else(|| DEFAULT_VECTOR_FIELD.to_string()),
                    data: SearchData::Vectors(vectors.clone()),
                    limit: request.limit,
                    output_fields: request.output_fields.clone(),
                    filter: request.filter.clone(),
                },
            )?;
            normalize_groups(groups)
        }
        SearchQuery::Sparse { query_text } => {
            if query_text.trim().is_empty() {
                return Err(ClientError::invalid("sparse search requires query text"));
            }
            debug!(collection = %request.collection, "BM25 sparse search");
            let groups = connection.search(
                &request.collection,
                &RawSearch {
                    anns_field: SPARSE_VECTOR_FIELD.to_string(),
                    data: SearchData::Text(query_text.clone()),
                    limit: request.limit,
                    output_fields: request.output_fields.clone(),
                    filter: request.filter.clone(),
                },
            )?;
            normalize_groups(groups)
        }
        SearchQuery::Hybrid {
            vector,
            query_text,
            vector_weight,
            text_weight,
        } => {
            debug!(
                collection = %request.collection,
                vector_weight, text_weight,
                "hybrid search"
            );
            let dense_groups = connection.search(
                &request.collection,
                &RawSearch {
                    anns_field: DEFAULT_VECTOR_FIELD.to_string(),
                    data: SearchData::Vectors(vec![vector.clone()]),
                    limit: request.limit,
                    output_fields: request.output_fields.clone(),
                    filter: request.filter.clone(),
                },
            )?;
            let sparse_groups = connection.search(
                &request.collection,
                &RawSearch {
                    anns_field: SPARSE_VECTOR_FIELD.to_string(),
                    data: SearchData::Text(query_text.clone()),
                    limit: request.limit,
                    output_fields: request.output_fields.clone(),
                    filter: request.filter.clone(),
                },
            )?;
            let dense = dense_groups.into_iter().next().unwrap_or_default();
            let sparse = sparse_groups.into_iter().next().unwrap_or_default();
            let fused = fuse_weighted(&dense, &sparse, *vector_weight, *text_weight);
            fused
                .into_iter()
                .take(request.limit)
                .map(|hit| SearchHit {
                    id: hit.id,
                    score: hit.score,
                    entity: hit.entity,
                })
                .collect()
        }
    };

    Ok(apply_threshold(hits, request.min_similarity, request.metric))
}

fn normalize_groups(groups: Vec<Vec<RawHit>>) -> Vec<SearchHit> {
    groups
        .into_iter()
        .flatten()
        .map(|hit| SearchHit {
            id: hit.id,
            score: hit.score,
            entity: hit.entity,
        })
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================
