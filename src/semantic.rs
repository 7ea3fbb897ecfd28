use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

pub const DEFAULT_MODEL_ID: &str = "hash-embed-v1";
pub const DEFAULT_MODEL_NAME: &str = "local hashed bag-of-words";
pub const DEFAULT_EMBEDDING_DIM: usize = 384;
pub const DEFAULT_NORMALIZATION: &str = "l2";
pub const DEFAULT_BACKEND: &str = "local-hash-v1";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SemanticModelConfig {
    pub model_id: String,
    pub model_name: String,
    pub dimensions: usize,
    pub normalization: String,
    pub backend: String,
}

pub fn resolve_model_config(model_id: &str) -> SemanticModelConfig {
    let trimmed = model_id.trim();
    let resolved_id = if trimmed.is_empty() {
        DEFAULT_MODEL_ID
    } else {
        trimmed
    };

    let model_name = if resolved_id == DEFAULT_MODEL_ID {
        DEFAULT_MODEL_NAME
    } else {
        resolved_id
    };

    SemanticModelConfig {
        model_id: resolved_id.to_string(),
        model_name: model_name.to_string(),
        dimensions: DEFAULT_EMBEDDING_DIM,
        normalization: DEFAULT_NORMALIZATION.to_string(),
        backend: DEFAULT_BACKEND.to_string(),
    }
}

/// Text to vector capability. The embedding model itself lives outside the
/// retrieval core; anything that can turn text into a fixed-width vector
/// plugs in here.
pub trait Embedder: Send + Sync {
    fn dimensions(&self) -> usize;
    fn embed(&self, text: &str) -> Vec<f32>;
}

/// Deterministic offline embedder: hashed unigrams and bigrams projected
/// into a fixed number of buckets, then L2-normalized.
#[derive(Debug, Clone)]
pub struct LocalHashEmbedder {
    dimensions: usize,
}

impl LocalHashEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(8),
        }
    }

    pub fn from_config(config: &SemanticModelConfig) -> Self {
        Self::new(config.dimensions)
    }
}

impl Embedder for LocalHashEmbedder {
    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn embed(&self, text: &str) -> Vec<f32> {
        embed_text_local(text, self.dimensions)
    }
}

pub fn normalize_whitespace(input: &str) -> String {
    input.split_whitespace().collect::<Vec<&str>>().join(" ")
}

pub fn embed_text_local(payload: &str, dimensions: usize) -> Vec<f32> {
    let dims = dimensions.max(8);
    let mut vector = vec![0_f32; dims];
    let mut tokens = tokenize_payload(payload);

    if tokens.is_empty() {
        return vector;
    }

    for token in tokens.drain(..) {
        let hash = stable_hash(&token);
        let index = (hash as usize) % dims;
        let sign = if (hash >> 63) & 1 == 0 { 1.0 } else { -1.0 };
        let weight = 1.0 + (((hash >> 48) & 0xFF) as f32 / 255.0);
        vector[index] += sign * weight;
    }

    normalize_vector(&mut vector);
    vector
}

/// Inner product accumulated in f64. Equals cosine similarity when both
/// sides are unit length.
pub fn dot_product(left: &[f32], right: &[f32]) -> f64 {
    left.iter()
        .zip(right.iter())
        .map(|(left_value, right_value)| f64::from(*left_value) * f64::from(*right_value))
        .sum::<f64>()
}

pub fn l2_norm(values: &[f32]) -> f64 {
    values
        .iter()
        .map(|value| f64::from(*value) * f64::from(*value))
        .sum::<f64>()
        .sqrt()
}

/// Scales `values` to unit L2 length in place. Zero vectors are left as is.
pub fn normalize_vector(values: &mut [f32]) {
    let norm = l2_norm(values);
    if norm <= 0.0 || !norm.is_finite() {
        return;
    }

    let norm = norm as f32;
    if norm == 0.0 {
        return;
    }

    for value in values {
        *value /= norm;
    }
}

pub fn encode_embedding_blob(values: &[f32]) -> Vec<u8> {
    let mut out = Vec::<u8>::with_capacity(values.len() * 4);
    for value in values {
        out.extend_from_slice(&value.to_le_bytes());
    }
    out
}

pub fn decode_embedding_blob(blob: &[u8], expected_len: usize) -> Option<Vec<f32>> {
    if blob.len() != expected_len.saturating_mul(4) {
        return None;
    }

    let out = blob
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect::<Vec<f32>>();

    if out.len() == expected_len {
        Some(out)
    } else {
        None
    }
}

/// First eight bytes of the sha256 digest, little endian. Persisted indexes
/// depend on this value never changing between builds.
fn stable_hash(value: &str) -> u64 {
    let digest = Sha256::digest(value.as_bytes());
    let mut prefix = [0_u8; 8];
    prefix.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(prefix)
}

fn tokenize_payload(payload: &str) -> Vec<String> {
    let normalized = normalize_whitespace(payload);
    if normalized.is_empty() {
        return Vec::new();
    }

    let words = normalized
        .split(' ')
        .map(|value| {
            value
                .chars()
                .filter(|character| character.is_ascii_alphanumeric())
                .collect::<String>()
                .to_ascii_lowercase()
        })
        .filter(|value| !value.is_empty())
        .collect::<Vec<String>>();

    if words.is_empty() {
        return Vec::new();
    }

    let mut features = Vec::<String>::with_capacity(words.len() * 2);
    for (index, word) in words.iter().enumerate() {
        features.push(format!("w:{word}"));
        if let Some(next) = words.get(index + 1) {
            features.push(format!("b:{word}_{next}"));
        }
    }
    features
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_embeddings_are_unit_length_and_deterministic() {
        let embedder = LocalHashEmbedder::new(64);
        let first = embedder.embed("High fever and chills");
        let second = embedder.embed("high   fever and chills");

        assert_eq!(first.len(), 64);
        assert!((l2_norm(&first) - 1.0).abs() < 1e-5);
        assert_eq!(first, second);
    }

    #[test]
    fn feature_hash_is_pinned() {
        assert_eq!(stable_hash("w:fever"), 5_217_568_468_232_732_712);
    }

    #[test]
    fn empty_text_embeds_to_zero_vector() {
        let vector = embed_text_local("  ", 16);
        assert!(vector.iter().all(|value| *value == 0.0));
    }

    #[test]
    fn normalize_vector_leaves_zero_vector_untouched() {
        let mut values = vec![0.0_f32; 4];
        normalize_vector(&mut values);
        assert_eq!(values, vec![0.0; 4]);

        let mut values = vec![3.0_f32, 4.0];
        normalize_vector(&mut values);
        assert!((values[0] - 0.6).abs() < 1e-6);
        assert!((values[1] - 0.8).abs() < 1e-6);
    }

    #[test]
    fn embedding_blob_rejects_wrong_length() {
        let blob = encode_embedding_blob(&[1.0, -2.5, 0.125]);
        assert_eq!(decode_embedding_blob(&blob, 3), Some(vec![1.0, -2.5, 0.125]));
        assert_eq!(decode_embedding_blob(&blob, 2), None);
        assert_eq!(decode_embedding_blob(&blob[..5], 1), None);
    }

    #[test]
    fn resolve_model_config_defaults_blank_ids() {
        let config = resolve_model_config("   ");
        assert_eq!(config.model_id, DEFAULT_MODEL_ID);
        assert_eq!(config.dimensions, DEFAULT_EMBEDDING_DIM);

        let custom = resolve_model_config("custom-model");
        assert_eq!(custom.model_id, "custom-model");
        assert_eq!(custom.model_name, "custom-model");
    }
}
