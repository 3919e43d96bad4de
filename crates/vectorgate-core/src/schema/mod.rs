//! Schema Builder
//!
//! Turns a declarative collection description into the concrete field,
//! function and index definitions the remote engine requires. Field
//! ordering is an engine-facing invariant: the implicit primary key
//! comes first, the implicit sparse output field last.

use serde::{Deserialize, Serialize};

use crate::error::{ClientError, Result};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Implicit primary key field, always present and always first.
pub const PRIMARY_FIELD: &str = "id";

/// Default dense vector field name.
pub const DEFAULT_VECTOR_FIELD: &str = "vector";

/// Implicit sparse output field for BM25.
pub const SPARSE_VECTOR_FIELD: &str = "sparse_vector";

/// Name of the BM25 transform binding text to the sparse field.
pub const BM25_FUNCTION_NAME: &str = "text_bm25_emb";

/// Upper bound on dense vector dimensionality.
pub const MAX_DIMENSION: u32 = 32768;

/// Upper bound on collection name length.
pub const MAX_COLLECTION_NAME_LEN: usize = 255;

// ============================================================================
// PRIMITIVE DEFINITIONS
// ============================================================================

/// Engine field data types used by the facade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataType {
    Int64,
    VarChar,
    FloatVector,
    SparseFloatVector,
}

/// Vector index strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IndexType {
    #[serde(rename = "AUTOINDEX")]
    AutoIndex,
    #[serde(rename = "SPARSE_INVERTED_INDEX")]
    SparseInvertedIndex,
}

/// Scoring metrics. COSINE and BM25 rank higher-is-closer; L2 ranks
/// lower-is-closer, so callers comparing similarities must convert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MetricType {
    #[serde(rename = "COSINE")]
    Cosine,
    #[serde(rename = "L2")]
    L2,
    #[serde(rename = "BM25")]
    Bm25,
}

/// A concrete field definition sent to the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    pub data_type: DataType,
    #[serde(default)]
    pub is_primary: bool,
    #[serde(default)]
    pub auto_id: bool,
    /// Dense vector dimensionality
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dim: Option<u32>,
    /// VarChar capacity
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u32>,
    /// Tokenization required for BM25 to operate over the field
    #[serde(default)]
    pub enable_analyzer: bool,
}

/// A server-side transform. Only BM25 today: text field in, sparse
/// vector field out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionDef {
    pub name: String,
    pub function_type: String,
    pub input_field_names: Vec<String>,
    pub output_field_names: Vec<String>,
}

/// One index per vector-bearing field, created together with the
/// collection rather than as a separate lifecycle step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexSpec {
    pub field_name: String,
    pub index_type: IndexType,
    pub metric_type: MetricType,
}

// ============================================================================
// DECLARATIVE CONFIGURATION
// ============================================================================

/// Declared dense vector field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorFieldConfig {
    pub name: String,
    pub dim: u32,
}

/// Declared text field (required when BM25 is enabled).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextFieldConfig {
    pub name: String,
    pub max_length: u32,
}

/// Declarative collection description supplied by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionConfig {
    pub name: String,
    #[serde(default = "default_auto_id")]
    pub auto_id: bool,
    pub vector_field: VectorFieldConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_field: Option<TextFieldConfig>,
    #[serde(default)]
    pub enable_bm25: bool,
}

fn default_auto_id() -> bool {
    true
}

impl CollectionConfig {
    /// A dense-only collection with the default vector field name.
    pub fn dense(name: impl Into<String>, dim: u32) -> Self {
        Self {
            name: name.into(),
            auto_id: true,
            vector_field: VectorFieldConfig {
                name: DEFAULT_VECTOR_FIELD.to_string(),
                dim,
            },
            text_field: None,
            enable_bm25: false,
        }
    }

    /// A collection with both a dense field and a BM25-indexed text field.
    pub fn with_bm25(name: impl Into<String>, dim: u32, text_field: TextFieldConfig) -> Self {
        Self {
            name: name.into(),
            auto_id: true,
            vector_field: VectorFieldConfig {
                name: DEFAULT_VECTOR_FIELD.to_string(),
                dim,
            },
            text_field: Some(text_field),
            enable_bm25: true,
        }
    }
}

/// Fully-built schema: everything the engine needs to create the
/// collection in one call. Value object, never mutated after build.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionPlan {
    pub name: String,
    pub auto_id: bool,
    pub fields: Vec<FieldDef>,
    pub functions: Vec<FunctionDef>,
    pub indexes: Vec<IndexSpec>,
}

impl CollectionPlan {
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }
}

// ============================================================================
// VALIDATION
// ============================================================================

/// Collection names: `^[A-Za-z_][A-Za-z0-9_]*$`, at most 255 chars.
/// Case-sensitive; hyphens, dots and spaces are all rejected.
pub fn validate_collection_name(name: &str) -> bool {
    if name.is_empty() || name.len() > MAX_COLLECTION_NAME_LEN {
        return false;
    }
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Reject an invalid collection name with the standard message.
pub fn require_valid_collection_name(name: &str) -> Result<()> {
    if validate_collection_name(name) {
        Ok(())
    } else {
        Err(ClientError::invalid(format!(
            "invalid collection name '{}': must match [A-Za-z_][A-Za-z0-9_]* and be at most {} characters",
            name, MAX_COLLECTION_NAME_LEN
        )))
    }
}

// ============================================================================
// SCHEMA BUILDER
// ============================================================================

/// Builds a [`CollectionPlan`] from a [`CollectionConfig`].
pub struct SchemaBuilder;

impl SchemaBuilder {
    /// Validate the config and emit fields, functions and indexes.
    ///
    /// Field order: `id`, declared text field, dense vector field,
    /// implicit `sparse_vector` (BM25 only). Exactly one BM25 function
    /// is emitted, and only when both BM25 is enabled and a text field
    /// exists; BM25 without a text field is a configuration error.
    pub fn build(config: &CollectionConfig) -> Result<CollectionPlan> {
        require_valid_collection_name(&config.name)?;
        if config.vector_field.dim == 0 || config.vector_field.dim > MAX_DIMENSION {
            return Err(ClientError::invalid(format!(
                "dimension must be between 1 and {}, got {}",
                MAX_DIMENSION, config.vector_field.dim
            )));
        }
        if config.enable_bm25 && config.text_field.is_none() {
            return Err(ClientError::invalid(
                "enable_bm25 requires a text field to tokenize",
            ));
        }

        let mut fields = vec![FieldDef {
            name: PRIMARY_FIELD.to_string(),
            data_type: DataType::Int64,
            is_primary: true,
            auto_id: config.auto_id,
            dim: None,
            max_length: None,
            enable_analyzer: false,
        }];

        if let Some(text) = &config.text_field {
            fields.push(FieldDef {
                name: text.name.clone(),
                data_type: DataType::VarChar,
                is_primary: false,
                auto_id: false,
                dim: None,
                max_length: Some(text.max_length),
                enable_analyzer: true,
            });
        }

        fields.push(FieldDef {
            name: config.vector_field.name.clone(),
            data_type: DataType::FloatVector,
            is_primary: false,
            auto_id: false,
            dim: Some(config.vector_field.dim),
            max_length: None,
            enable_analyzer: false,
        });

        let mut functions = Vec::new();
        let mut indexes = vec![IndexSpec {
            field_name: config.vector_field.name.clone(),
            index_type: IndexType::AutoIndex,
            metric_type: MetricType::Cosine,
        }];

        if config.enable_bm25 {
            fields.push(FieldDef {
                name: SPARSE_VECTOR_FIELD.to_string(),
                data_type: DataType::SparseFloatVector,
                is_primary: false,
                auto_id: false,
                dim: None,
                max_length: None,
                enable_analyzer: false,
            });
            // Presence of the text field was checked above
            if let Some(text) = &config.text_field {
                functions.push(FunctionDef {
                    name: BM25_FUNCTION_NAME.to_string(),
                    function_type: "BM25".to_string(),
                    input_field_names: vec![text.name.clone()],
                    output_field_names: vec![SPARSE_VECTOR_FIELD.to_string()],
                });
            }
            indexes.push(IndexSpec {
                field_name: SPARSE_VECTOR_FIELD.to_string(),
                index_type: IndexType::SparseInvertedIndex,
                metric_type: MetricType::Bm25,
            });
        }

        Ok(CollectionPlan {
            name: config.name.clone(),
            auto_id: config.auto_id,
            fields,
            functions,
            indexes,
        })
    }
}

// ============================================================================
// TESTS
// ============================================================================
