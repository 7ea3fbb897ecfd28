use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::semantic::SemanticModelConfig;

pub const INDEX_BUILD_MANIFEST_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactPaths {
    pub cache_root: String,
    pub manifest_dir: String,
    pub reference_path: String,
    pub model_path: String,
    pub index_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexBuildManifest {
    pub manifest_version: u32,
    pub run_id: String,
    pub generated_at: String,
    pub embedding_model: SemanticModelConfig,
    pub paths: ArtifactPaths,
    pub reference_sha256: String,
    pub index_sha256: String,
    pub index_format_version: u16,
    pub rows: usize,
    pub dimensions: usize,
    pub document_counts: BTreeMap<String, usize>,
    pub duration_ms: f64,
}
