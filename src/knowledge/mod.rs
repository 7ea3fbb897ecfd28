//! Document store and retrieval over the vector index.
//!
//! A [`KnowledgeBase`] owns the index and the documents together; row `i` of
//! the index is always document `i`. Serving code reads through a
//! [`SharedKnowledgeBase`], which swaps in rebuilt knowledge bases whole.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::index::{IndexError, VectorIndex};
use crate::semantic::Embedder;

mod corpus;
mod store;

pub use corpus::{build_corpus, symptom_band};
pub use store::KNOWLEDGE_FORMAT_VERSION;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Description,
    Symptoms,
    Precautions,
    Severity,
}

impl DocumentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Description => "description",
            Self::Symptoms => "symptoms",
            Self::Precautions => "precautions",
            Self::Severity => "severity",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub text: String,
    pub kind: DocumentKind,
    /// Disease name for disease documents, symptom name for severity ones.
    pub subject: String,
    #[serde(default)]
    pub extra: BTreeMap<String, Value>,
}

impl Document {
    pub fn new(
        text: String,
        kind: DocumentKind,
        subject: &str,
        extra: BTreeMap<String, Value>,
    ) -> Self {
        Self {
            text,
            kind,
            subject: subject.to_string(),
            extra,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetrievedDocument {
    pub rank: usize,
    pub row_id: usize,
    pub score: f64,
    pub document: Document,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct KnowledgeBase {
    index: VectorIndex,
    documents: Vec<Document>,
}

impl KnowledgeBase {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_parts(index: VectorIndex, documents: Vec<Document>) -> Result<Self, IndexError> {
        if index.len() != documents.len() {
            return Err(IndexError::RowCountMismatch {
                vectors: index.len(),
                documents: documents.len(),
            });
        }
        Ok(Self { index, documents })
    }

    /// Embeds every document and builds a fresh index over them.
    pub fn build(documents: Vec<Document>, embedder: &dyn Embedder) -> Result<Self, IndexError> {
        let embeddings = documents
            .iter()
            .map(|document| embedder.embed(&document.text))
            .collect::<Vec<Vec<f32>>>();
        let index = VectorIndex::build(&embeddings)?;

        info!(
            rows = index.len(),
            dimensions = index.dimensions(),
            "knowledge index built"
        );
        Self::from_parts(index, documents)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn index(&self) -> &VectorIndex {
        &self.index
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    /// Top-`top_k` documents for `query_text`, best first. Hits scoring below
    /// `min_score` are dropped. An empty knowledge base yields nothing.
    pub fn query_context(
        &self,
        embedder: &dyn Embedder,
        query_text: &str,
        top_k: usize,
        min_score: Option<f64>,
    ) -> Result<Vec<RetrievedDocument>, IndexError> {
        if self.is_empty() || top_k == 0 {
            return Ok(Vec::new());
        }

        let query = embedder.embed(query_text);
        let hits = self.index.search(&query, top_k)?;

        let results = hits
            .into_iter()
            .filter(|hit| min_score.is_none_or(|threshold| hit.score >= threshold))
            .filter_map(|hit| {
                self.documents
                    .get(hit.row_id)
                    .map(|document| (hit, document.clone()))
            })
            .enumerate()
            .map(|(position, (hit, document))| RetrievedDocument {
                rank: position + 1,
                row_id: hit.row_id,
                score: hit.score,
                document,
            })
            .collect::<Vec<RetrievedDocument>>();

        debug!(
            top_k,
            returned = results.len(),
            "knowledge retrieval complete"
        );
        Ok(results)
    }

    /// Count of documents per kind, in kind order.
    pub fn kind_counts(&self) -> BTreeMap<DocumentKind, usize> {
        let mut counts = BTreeMap::<DocumentKind, usize>::new();
        for document in &self.documents {
            *counts.entry(document.kind).or_insert(0) += 1;
        }
        counts
    }
}

/// Renders retrieved documents as a numbered context block. No documents
/// means no context: the result is the empty string.
pub fn format_context(results: &[RetrievedDocument]) -> String {
    if results.is_empty() {
        return String::new();
    }

    let mut parts = vec!["Here is relevant medical information from the knowledge base:\n".to_string()];
    for result in results {
        parts.push(format!("\n{}. {}", result.rank, result.document.text));
    }
    parts.push(
        "\n\nPlease use this information to provide an accurate and helpful response."
            .to_string(),
    );
    parts.join("\n")
}

/// Published knowledge base for concurrent readers. Readers hold an `Arc`
/// snapshot; a rebuild is published by replacing the whole value.
#[derive(Debug, Default)]
pub struct SharedKnowledgeBase {
    current: RwLock<Arc<KnowledgeBase>>,
}

impl SharedKnowledgeBase {
    pub fn new(knowledge: KnowledgeBase) -> Self {
        Self {
            current: RwLock::new(Arc::new(knowledge)),
        }
    }

    pub fn snapshot(&self) -> Arc<KnowledgeBase> {
        Arc::clone(&self.current.read())
    }

    /// Replaces the published knowledge base and returns the previous one.
    pub fn publish(&self, knowledge: KnowledgeBase) -> Arc<KnowledgeBase> {
        let next = Arc::new(knowledge);
        let previous = std::mem::replace(&mut *self.current.write(), next);
        debug!(
            previous_rows = previous.len(),
            rows = self.current.read().len(),
            "knowledge index published"
        );
        previous
    }
}
