//! Reference data artifact: symptom catalog, disease descriptions,
//! precautions, aggregate severity and the feature-importance table.
//!
//! The artifact is produced offline alongside the trained model and loaded
//! once at startup. Nothing here is mutated after load.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::symptoms::{SymptomCatalog, SymptomEntry};
use crate::util::round_to;

mod diseases;

pub use diseases::{DEFAULT_DESCRIPTION, DiseaseInfo, DiseaseRecord, DiseaseTable, MAX_PRECAUTIONS};

pub const REFERENCE_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum ReferenceError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("unsupported reference format version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("invalid reference data: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceArtifact {
    pub format_version: u32,
    pub symptoms: Vec<SymptomWeight>,
    pub diseases: Vec<DiseaseEntry>,
    #[serde(default)]
    pub feature_importance: Vec<FeatureImportance>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymptomWeight {
    pub name: String,
    #[serde(default)]
    pub weight: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiseaseEntry {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub precautions: Vec<String>,
    #[serde(default)]
    pub severity_score: Option<f64>,
    #[serde(default)]
    pub symptoms: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportance {
    pub symptom: String,
    pub importance: f64,
}

/// Read-only reference tables shared by every request.
#[derive(Debug, Clone, Default)]
pub struct ReferenceData {
    pub catalog: SymptomCatalog,
    pub diseases: DiseaseTable,
    pub feature_importance: Vec<FeatureImportance>,
}

impl ReferenceData {
    pub fn load(path: &Path) -> Result<Self, ReferenceError> {
        let raw = fs::read(path).map_err(|source| ReferenceError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let artifact: ReferenceArtifact =
            serde_json::from_slice(&raw).map_err(|source| ReferenceError::Parse {
                path: path.display().to_string(),
                source,
            })?;

        let data = Self::from_artifact(artifact)?;
        debug!(
            path = %path.display(),
            symptoms = data.catalog.len(),
            diseases = data.diseases.len(),
            "reference data loaded"
        );
        Ok(data)
    }

    pub fn from_artifact(artifact: ReferenceArtifact) -> Result<Self, ReferenceError> {
        if artifact.format_version != REFERENCE_FORMAT_VERSION {
            return Err(ReferenceError::UnsupportedVersion {
                found: artifact.format_version,
                expected: REFERENCE_FORMAT_VERSION,
            });
        }

        if let Some(bad) = artifact
            .symptoms
            .iter()
            .find(|symptom| !symptom.weight.is_finite() || symptom.weight < 0.0)
        {
            return Err(ReferenceError::Invalid(format!(
                "symptom '{}' has invalid weight {}",
                bad.name, bad.weight
            )));
        }

        let catalog = SymptomCatalog::new(artifact.symptoms.into_iter().map(|symptom| {
            SymptomEntry {
                name: symptom.name,
                weight: symptom.weight,
            }
        }));

        let mut records = Vec::<DiseaseRecord>::with_capacity(artifact.diseases.len());
        for entry in artifact.diseases {
            records.push(disease_record(entry, &catalog)?);
        }

        let mut feature_importance = artifact.feature_importance;
        feature_importance.sort_by(|left, right| right.importance.total_cmp(&left.importance));

        Ok(Self {
            catalog,
            diseases: DiseaseTable::new(records),
            feature_importance,
        })
    }

    /// First `n` rows of the descending feature-importance table.
    pub fn top_important_symptoms(&self, n: usize) -> &[FeatureImportance] {
        &self.feature_importance[..n.min(self.feature_importance.len())]
    }
}

fn disease_record(
    entry: DiseaseEntry,
    catalog: &SymptomCatalog,
) -> Result<DiseaseRecord, ReferenceError> {
    let name = entry.name.trim().to_string();
    if name.is_empty() {
        return Err(ReferenceError::Invalid("disease with empty name".to_string()));
    }

    let precautions = entry
        .precautions
        .into_iter()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .collect::<Vec<String>>();
    if precautions.len() > MAX_PRECAUTIONS {
        return Err(ReferenceError::Invalid(format!(
            "disease '{name}' lists {} precautions (at most {MAX_PRECAUTIONS})",
            precautions.len()
        )));
    }

    let mut symptoms = Vec::<String>::new();
    for symptom in entry.symptoms {
        let symptom = symptom.trim().to_string();
        if !symptom.is_empty() && !symptoms.contains(&symptom) {
            symptoms.push(symptom);
        }
    }

    let severity_score = match entry.severity_score {
        Some(score) if score.is_finite() => score,
        Some(score) => {
            return Err(ReferenceError::Invalid(format!(
                "disease '{name}' has invalid severity score {score}"
            )));
        }
        None => {
            let derived = aggregate_severity(&symptoms, catalog);
            debug!(
                disease = %name,
                severity_score = derived,
                "severity score missing from artifact; derived from symptom weights"
            );
            derived
        }
    };

    Ok(DiseaseRecord {
        name,
        description: entry
            .description
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty()),
        precautions,
        severity_score,
        symptoms,
    })
}

/// Mean weight of the disease's symptoms that carry a catalog weight,
/// rounded to two decimals. Zero when none do.
pub fn aggregate_severity(symptoms: &[String], catalog: &SymptomCatalog) -> f64 {
    let weights = symptoms
        .iter()
        .filter_map(|symptom| catalog.symptom_severity(symptom))
        .collect::<Vec<f64>>();

    if weights.is_empty() {
        return 0.0;
    }

    let mean = weights.iter().sum::<f64>() / weights.len() as f64;
    round_to(mean, 2)
}
