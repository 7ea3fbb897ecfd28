use std::fs;
use std::path::Path;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::reference::ReferenceError;
use crate::symptoms::FeatureVector;

/// A trained classifier seen from the outside: a fixed label order and a
/// probability per label for a presence vector.
pub trait ProbabilityModel: Send + Sync {
    fn classes(&self) -> &[String];
    fn feature_count(&self) -> usize;
    fn predict_proba(&self, features: &FeatureVector) -> Vec<f64>;
}

/// Linear model with a softmax head, `softmax(W·x + b)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoftmaxModel {
    classes: Vec<String>,
    weights: Vec<Vec<f64>>,
    bias: Vec<f64>,
}

impl SoftmaxModel {
    pub fn new(
        classes: Vec<String>,
        weights: Vec<Vec<f64>>,
        bias: Vec<f64>,
    ) -> Result<Self, ReferenceError> {
        let model = Self {
            classes,
            weights,
            bias,
        };
        model.validate()?;
        Ok(model)
    }

    pub fn load(path: &Path) -> Result<Self, ReferenceError> {
        let raw = fs::read(path).map_err(|source| ReferenceError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let model: Self = serde_json::from_slice(&raw).map_err(|source| ReferenceError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        model.validate()?;

        debug!(
            path = %path.display(),
            classes = model.classes.len(),
            features = model.width(),
            "probability model loaded"
        );
        Ok(model)
    }

    /// Fails when the model was trained on a different number of symptoms
    /// than the catalog it is paired with.
    pub fn ensure_feature_count(&self, expected: usize) -> Result<(), ReferenceError> {
        if self.width() != expected {
            return Err(ReferenceError::Invalid(format!(
                "model expects {} features but the symptom catalog has {expected}",
                self.width()
            )));
        }
        Ok(())
    }

    fn width(&self) -> usize {
        self.weights.first().map(Vec::len).unwrap_or(0)
    }

    fn validate(&self) -> Result<(), ReferenceError> {
        if self.classes.is_empty() {
            return Err(ReferenceError::Invalid("model has no classes".to_string()));
        }
        if self.weights.len() != self.classes.len() || self.bias.len() != self.classes.len() {
            return Err(ReferenceError::Invalid(format!(
                "model has {} classes, {} weight rows and {} bias terms",
                self.classes.len(),
                self.weights.len(),
                self.bias.len()
            )));
        }

        let width = self.width();
        if let Some(position) = self.weights.iter().position(|row| row.len() != width) {
            return Err(ReferenceError::Invalid(format!(
                "weight row {position} has {} features, expected {width}",
                self.weights[position].len()
            )));
        }

        let all_finite = self
            .weights
            .iter()
            .flatten()
            .chain(self.bias.iter())
            .all(|value| value.is_finite());
        if !all_finite {
            return Err(ReferenceError::Invalid(
                "model parameters contain non-finite values".to_string(),
            ));
        }

        Ok(())
    }
}

impl ProbabilityModel for SoftmaxModel {
    fn classes(&self) -> &[String] {
        &self.classes
    }

    fn feature_count(&self) -> usize {
        self.width()
    }

    fn predict_proba(&self, features: &FeatureVector) -> Vec<f64> {
        let logits = self
            .weights
            .iter()
            .zip(&self.bias)
            .map(|(row, bias)| {
                row.iter()
                    .zip(features.values())
                    .map(|(weight, value)| weight * f64::from(*value))
                    .sum::<f64>()
                    + bias
            })
            .collect::<Vec<f64>>();

        let max = logits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let exps = logits
            .iter()
            .map(|logit| (logit - max).exp())
            .collect::<Vec<f64>>();
        let total = exps.iter().sum::<f64>();

        exps.into_iter().map(|value| value / total).collect()
    }
}

/// Non-reentrant model inference, serialized behind a mutex so the model can
/// be shared across threads. Label order is cached outside the lock.
pub struct Serialized<M> {
    classes: Vec<String>,
    feature_count: usize,
    inner: Mutex<M>,
}

/// Inference that needs exclusive access to the model.
pub trait ExclusiveModel: Send {
    fn classes(&self) -> &[String];
    fn feature_count(&self) -> usize;
    fn predict_proba_mut(&mut self, features: &FeatureVector) -> Vec<f64>;
}

impl<M: ExclusiveModel> Serialized<M> {
    pub fn new(model: M) -> Self {
        Self {
            classes: model.classes().to_vec(),
            feature_count: model.feature_count(),
            inner: Mutex::new(model),
        }
    }
}

impl<M: ExclusiveModel> ProbabilityModel for Serialized<M> {
    fn classes(&self) -> &[String] {
        &self.classes
    }

    fn feature_count(&self) -> usize {
        self.feature_count
    }

    fn predict_proba(&self, features: &FeatureVector) -> Vec<f64> {
        self.inner.lock().predict_proba_mut(features)
    }
}
