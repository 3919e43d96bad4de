//! Embedding Seam
//!
//! The facade never computes embeddings. Callers that want to search
//! with text over a dense field inject an [`Embedder`]; the platform's
//! embedding model is one implementation, a fixed-output fake is
//! another.

use crate::error::Result;

/// Text to dense vector, injected by the caller.
pub trait Embedder: Send + Sync {
    fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

impl<F> Embedder for F
where
    F: Fn(&str) -> Result<Vec<f32>> + Send + Sync,
{
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self(text)
    }
}
