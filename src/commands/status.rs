use std::path::Path;

use anyhow::Result;
use serde::Serialize;
use tracing::{info, warn};

use super::output::{write_json, write_lines};
use crate::cli::StatusArgs;
use crate::engine::EnginePaths;
use crate::knowledge::KnowledgeBase;
use crate::ranking::{ProbabilityModel, SoftmaxModel};
use crate::reference::ReferenceData;
use crate::semantic::l2_norm;

const UNIT_NORM_TOLERANCE: f64 = 1e-3;

#[derive(Debug, Default, Serialize)]
struct StatusReport {
    cache_root: String,
    reference: ArtifactStatus,
    model: ArtifactStatus,
    index: ArtifactStatus,
    symptoms: Option<usize>,
    diseases: Option<usize>,
    model_classes: Option<usize>,
    model_features: Option<usize>,
    index_rows: Option<usize>,
    index_dimensions: Option<usize>,
    /// Rows whose norm is neither 1 nor 0. Always zero for a healthy index.
    index_non_unit_rows: Option<usize>,
}

#[derive(Debug, Default, Serialize)]
struct ArtifactStatus {
    path: String,
    present: bool,
    error: Option<String>,
}

impl ArtifactStatus {
    fn probe(path: &Path) -> Self {
        Self {
            path: path.display().to_string(),
            present: path.exists(),
            error: None,
        }
    }
}

pub fn run(args: StatusArgs) -> Result<()> {
    let paths = EnginePaths::resolve(&args.engine);
    info!(cache_root = %paths.cache_root.display(), "status requested");

    let mut report = StatusReport {
        cache_root: paths.cache_root.display().to_string(),
        reference: ArtifactStatus::probe(&paths.reference_path),
        model: ArtifactStatus::probe(&paths.model_path),
        index: ArtifactStatus::probe(&paths.index_path),
        ..StatusReport::default()
    };

    if report.reference.present {
        match ReferenceData::load(&paths.reference_path) {
            Ok(reference) => {
                report.symptoms = Some(reference.catalog.len());
                report.diseases = Some(reference.diseases.len());
            }
            Err(err) => report.reference.error = Some(err.to_string()),
        }
    } else {
        warn!(path = %paths.reference_path.display(), "reference artifact missing");
    }

    if report.model.present {
        match SoftmaxModel::load(&paths.model_path) {
            Ok(model) => {
                report.model_classes = Some(model.classes().len());
                report.model_features = Some(model.feature_count());
            }
            Err(err) => report.model.error = Some(err.to_string()),
        }
    } else {
        warn!(path = %paths.model_path.display(), "probability model missing");
    }

    if report.index.present {
        match KnowledgeBase::load(&paths.index_path) {
            Ok(knowledge) => {
                let index = knowledge.index();
                let non_unit = (0..index.len())
                    .filter_map(|row_id| index.row(row_id))
                    .map(l2_norm)
                    .filter(|norm| *norm != 0.0 && (norm - 1.0).abs() > UNIT_NORM_TOLERANCE)
                    .count();
                report.index_rows = Some(index.len());
                report.index_dimensions = Some(index.dimensions());
                report.index_non_unit_rows = Some(non_unit);
            }
            Err(err) => report.index.error = Some(err.to_string()),
        }
    } else {
        warn!(path = %paths.index_path.display(), "knowledge index missing");
    }

    if args.json {
        return write_json(&report);
    }

    let mut lines = vec![format!("Cache root: {}", report.cache_root)];
    for (label, artifact) in [
        ("reference", &report.reference),
        ("model", &report.model),
        ("index", &report.index),
    ] {
        let state = match (&artifact.error, artifact.present) {
            (Some(error), _) => format!("error: {error}"),
            (None, true) => "ok".to_string(),
            (None, false) => "missing".to_string(),
        };
        lines.push(format!("{label}\t{state}\t{}", artifact.path));
    }
    if let (Some(symptoms), Some(diseases)) = (report.symptoms, report.diseases) {
        lines.push(format!("catalog: {symptoms} symptoms, {diseases} diseases"));
    }
    if let (Some(classes), Some(features)) = (report.model_classes, report.model_features) {
        lines.push(format!("model: {classes} classes over {features} features"));
    }
    if let (Some(rows), Some(dimensions), Some(non_unit)) = (
        report.index_rows,
        report.index_dimensions,
        report.index_non_unit_rows,
    ) {
        lines.push(format!(
            "index: {rows} rows x {dimensions} dimensions, {non_unit} non-unit rows"
        ));
    }
    write_lines(lines)
}
