use std::collections::BTreeMap;

use anyhow::Result;
use chrono::Utc;
use tracing::info;

use super::output::write_json;
use crate::cli::BuildIndexArgs;
use crate::engine::Engine;
use crate::knowledge::KNOWLEDGE_FORMAT_VERSION;
use crate::model::{ArtifactPaths, INDEX_BUILD_MANIFEST_VERSION, IndexBuildManifest};
use crate::util::{now_utc_string, sha256_file, utc_compact_string, write_json_pretty};

pub fn run(args: BuildIndexArgs) -> Result<()> {
    let engine = Engine::open(&args.engine)?;
    let summary = engine.rebuild_index()?;
    let paths = engine.paths();

    let manifest = IndexBuildManifest {
        manifest_version: INDEX_BUILD_MANIFEST_VERSION,
        run_id: format!("index-{}", utc_compact_string(Utc::now())),
        generated_at: now_utc_string(),
        embedding_model: engine.model_config().clone(),
        paths: ArtifactPaths {
            cache_root: paths.cache_root.display().to_string(),
            manifest_dir: paths.manifest_dir.display().to_string(),
            reference_path: paths.reference_path.display().to_string(),
            model_path: paths.model_path.display().to_string(),
            index_path: paths.index_path.display().to_string(),
        },
        reference_sha256: sha256_file(&paths.reference_path)?,
        index_sha256: sha256_file(&paths.index_path)?,
        index_format_version: KNOWLEDGE_FORMAT_VERSION,
        rows: summary.rows,
        dimensions: summary.dimensions,
        document_counts: summary
            .document_counts
            .iter()
            .map(|(kind, count)| (kind.as_str().to_string(), *count))
            .collect::<BTreeMap<String, usize>>(),
        duration_ms: summary.duration_ms,
    };

    let manifest_path = args.manifest_path.unwrap_or_else(|| {
        paths
            .manifest_dir
            .join(format!("index_build_{}.json", utc_compact_string(Utc::now())))
    });
    write_json_pretty(&manifest_path, &manifest)?;
    info!(path = %manifest_path.display(), "wrote index build manifest");

    if args.json {
        write_json(&manifest)?;
    } else {
        info!(
            rows = manifest.rows,
            dimensions = manifest.dimensions,
            index = %paths.index_path.display(),
            "index build completed"
        );
    }

    Ok(())
}
