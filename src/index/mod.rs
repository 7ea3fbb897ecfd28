//! Exact nearest-neighbour index over unit-normalized embeddings.
//!
//! Rows are stored in one flat `f32` buffer. Every stored row and every query
//! is L2-normalized, so the inner product is the cosine similarity and scores
//! stay within `[-1, 1]`.

use thiserror::Error;

use crate::semantic::{decode_embedding_blob, dot_product, encode_embedding_blob, normalize_vector};

pub(crate) mod format;
#[cfg(test)]
mod tests;

use format::{ByteReader, read_header, write_header};

const VECTOR_MAGIC: &[u8; 4] = b"MRVX";
pub const VECTOR_FORMAT_VERSION: u16 = 1;
const MIN_DIMENSIONS: usize = 1;

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("row count mismatch: {vectors} vectors for {documents} documents")]
    RowCountMismatch { vectors: usize, documents: usize },

    #[error("unsupported index format: {0}")]
    UnsupportedFormat(String),

    #[error("corrupt index: {0}")]
    CorruptIndex(String),

    #[error("index i/o failed: {0}")]
    Io(#[from] std::io::Error),
}

impl IndexError {
    /// True for failures that a fresh rebuild from source data resolves.
    pub fn is_recoverable_by_rebuild(&self) -> bool {
        matches!(self, Self::UnsupportedFormat(_) | Self::CorruptIndex(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchHit {
    pub row_id: usize,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct VectorIndex {
    dimensions: usize,
    rows: usize,
    values: Vec<f32>,
}

impl VectorIndex {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Normalizes and stores every embedding. The dimension is taken from the
    /// first row; an empty first row or any row of a different length fails
    /// the whole build.
    pub fn build<V: AsRef<[f32]>>(embeddings: &[V]) -> Result<Self, IndexError> {
        let Some(first) = embeddings.first() else {
            return Ok(Self::empty());
        };

        let dimensions = first.as_ref().len();
        if dimensions == 0 {
            return Err(IndexError::DimensionMismatch {
                expected: MIN_DIMENSIONS,
                actual: 0,
            });
        }
        let mut values = Vec::<f32>::with_capacity(dimensions * embeddings.len());

        for embedding in embeddings {
            let embedding = embedding.as_ref();
            if embedding.len() != dimensions {
                return Err(IndexError::DimensionMismatch {
                    expected: dimensions,
                    actual: embedding.len(),
                });
            }

            let start = values.len();
            values.extend_from_slice(embedding);
            normalize_vector(&mut values[start..]);
        }

        Ok(Self {
            dimensions,
            rows: embeddings.len(),
            values,
        })
    }

    pub fn len(&self) -> usize {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    pub fn row(&self, row_id: usize) -> Option<&[f32]> {
        if row_id >= self.rows {
            return None;
        }
        let start = row_id * self.dimensions;
        Some(&self.values[start..start + self.dimensions])
    }

    /// Exhaustive top-`k` search. Results are ordered by score descending,
    /// equal scores by ascending row id. An empty index yields no hits.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchHit>, IndexError> {
        if self.is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        if query.len() != self.dimensions {
            return Err(IndexError::DimensionMismatch {
                expected: self.dimensions,
                actual: query.len(),
            });
        }

        let mut normalized = query.to_vec();
        normalize_vector(&mut normalized);

        let mut hits = self
            .values
            .chunks_exact(self.dimensions)
            .enumerate()
            .map(|(row_id, row)| SearchHit {
                row_id,
                score: dot_product(row, &normalized),
            })
            .collect::<Vec<SearchHit>>();

        sort_hits(&mut hits);
        hits.truncate(k);
        Ok(hits)
    }

    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::<u8>::with_capacity(24 + self.values.len() * 4);
        write_header(&mut out, VECTOR_MAGIC, VECTOR_FORMAT_VERSION);
        self.write_body(&mut out);
        out
    }

    /// Dimension, row count and the row-major value blob, without a header.
    pub(crate) fn write_body(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&(self.dimensions as u32).to_le_bytes());
        out.extend_from_slice(&(self.rows as u64).to_le_bytes());
        out.extend_from_slice(&encode_embedding_blob(&self.values));
    }

    pub fn deserialize(bytes: &[u8]) -> Result<Self, IndexError> {
        let mut reader = ByteReader::new(bytes);
        read_header(&mut reader, VECTOR_MAGIC, VECTOR_FORMAT_VERSION)?;
        let index = Self::read_body(&mut reader)?;
        reader.finish()?;
        Ok(index)
    }

    pub(crate) fn read_body(reader: &mut ByteReader<'_>) -> Result<Self, IndexError> {
        let dimensions = reader.read_u32()? as usize;
        let rows = reader.read_len("row count")?;

        if dimensions == 0 && rows > 0 {
            return Err(IndexError::CorruptIndex(format!(
                "{rows} rows declared with zero dimensions"
            )));
        }

        let value_count = rows.checked_mul(dimensions).ok_or_else(|| {
            IndexError::CorruptIndex(format!("{rows} rows of {dimensions} values overflow"))
        })?;
        let byte_len = value_count.checked_mul(4).ok_or_else(|| {
            IndexError::CorruptIndex(format!("{value_count} values overflow the byte length"))
        })?;

        let blob = reader.take(byte_len)?;
        let values = decode_embedding_blob(blob, value_count).ok_or_else(|| {
            IndexError::CorruptIndex("vector payload length does not match header".to_string())
        })?;

        Ok(Self {
            dimensions,
            rows,
            values,
        })
    }
}

fn sort_hits(hits: &mut [SearchHit]) {
    hits.sort_by(|left, right| {
        right
            .score
            .total_cmp(&left.score)
            .then(left.row_id.cmp(&right.row_id))
    });
}
