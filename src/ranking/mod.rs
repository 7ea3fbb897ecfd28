//! Disease ranking: encoded symptoms in, probability-ranked and
//! reference-enriched predictions out.
//!
//! The classifier is an injected [`ProbabilityModel`]; this module only
//! orders its output, joins it with the disease reference table and buckets
//! severity.

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::reference::{DiseaseTable, ReferenceData};
use crate::symptoms::{FeatureVector, encode};
use crate::util::round_to;

mod classifier;
mod severity;

pub use classifier::{ExclusiveModel, ProbabilityModel, Serialized, SoftmaxModel};
pub use severity::SeverityLevel;

pub const NO_SYMPTOMS_MATCHED: &str = "NoSymptomsMatched";

#[derive(Debug, Error, PartialEq)]
pub enum RankError {
    #[error("no symptoms matched the catalog")]
    NoSymptomsMatched,

    #[error("feature vector has {actual} positions, model expects {expected}")]
    FeatureLengthMismatch { expected: usize, actual: usize },

    #[error("model returned {probabilities} probabilities for {classes} classes")]
    ModelOutputMismatch { classes: usize, probabilities: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub disease: String,
    pub probability: f64,
    /// `probability × 100`, rounded to two decimals.
    pub confidence: f64,
    pub severity_score: f64,
    pub severity_level: SeverityLevel,
    pub description: String,
    pub precautions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedPredictions {
    pub predictions: Vec<Prediction>,
    pub matched: Vec<String>,
    pub unmatched: Vec<String>,
    pub total_symptoms_provided: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnmatchedSymptoms {
    pub error: &'static str,
    pub matched: Vec<String>,
    pub unmatched: Vec<String>,
}

/// Result of a prediction request. Nothing matching the catalog is an
/// expected outcome of user input and is reported as a value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PredictionOutcome {
    Ranked(RankedPredictions),
    NoSymptomsMatched(UnmatchedSymptoms),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankOptions {
    pub top_n: usize,
    /// Predictions whose confidence percentage falls below this are dropped
    /// after the top-`n` cut.
    pub min_confidence: Option<f64>,
}

impl Default for RankOptions {
    fn default() -> Self {
        Self {
            top_n: 3,
            min_confidence: None,
        }
    }
}

/// Ranks model labels for `features`. An all-zero vector is rejected before
/// the model is consulted.
pub fn rank(
    features: &FeatureVector,
    model: &dyn ProbabilityModel,
    diseases: &DiseaseTable,
    options: RankOptions,
) -> Result<Vec<Prediction>, RankError> {
    if features.is_all_zero() {
        return Err(RankError::NoSymptomsMatched);
    }

    if features.len() != model.feature_count() {
        return Err(RankError::FeatureLengthMismatch {
            expected: model.feature_count(),
            actual: features.len(),
        });
    }

    if options.top_n == 0 {
        return Ok(Vec::new());
    }

    let classes = model.classes();
    let probabilities = model.predict_proba(features);
    if probabilities.len() != classes.len() {
        return Err(RankError::ModelOutputMismatch {
            classes: classes.len(),
            probabilities: probabilities.len(),
        });
    }

    let mut order = (0..classes.len()).collect::<Vec<usize>>();
    // stable: equal probabilities keep the model's label order
    order.sort_by(|left, right| probabilities[*right].total_cmp(&probabilities[*left]));
    order.truncate(options.top_n);

    let predictions = order
        .into_iter()
        .map(|position| {
            let disease = &classes[position];
            let probability = probabilities[position];
            let severity_score = diseases.severity_score_or_default(disease);
            Prediction {
                disease: disease.clone(),
                probability,
                confidence: round_to(probability * 100.0, 2),
                severity_score,
                severity_level: SeverityLevel::from_score(severity_score),
                description: diseases.description_or_default(disease).to_string(),
                precautions: diseases.precautions_or_default(disease).to_vec(),
            }
        })
        .filter(|prediction| {
            options
                .min_confidence
                .is_none_or(|threshold| prediction.confidence >= threshold)
        })
        .collect::<Vec<Prediction>>();

    Ok(predictions)
}

/// Encodes `symptom_names` against the catalog and ranks the result.
pub fn predict_disease<S: AsRef<str>>(
    reference: &ReferenceData,
    model: &dyn ProbabilityModel,
    symptom_names: &[S],
    options: RankOptions,
) -> Result<PredictionOutcome, RankError> {
    let encoding = encode(&reference.catalog, symptom_names);

    if !encoding.has_matches() {
        debug!(
            provided = symptom_names.len(),
            unmatched = encoding.unmatched.len(),
            "no symptoms matched the catalog"
        );
        return Ok(PredictionOutcome::NoSymptomsMatched(UnmatchedSymptoms {
            error: NO_SYMPTOMS_MATCHED,
            matched: encoding.matched,
            unmatched: encoding.unmatched,
        }));
    }

    let predictions = rank(&encoding.features, model, &reference.diseases, options)?;
    debug!(
        matched = encoding.matched.len(),
        unmatched = encoding.unmatched.len(),
        predictions = predictions.len(),
        "disease ranking complete"
    );

    Ok(PredictionOutcome::Ranked(RankedPredictions {
        predictions,
        matched: encoding.matched,
        unmatched: encoding.unmatched,
        total_symptoms_provided: symptom_names.len(),
    }))
}
