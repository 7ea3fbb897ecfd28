//! Process-wide context: every loaded artifact plus the embedder, built once
//! and handed to each command.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result, bail};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::cli::EngineArgs;
use crate::index::IndexError;
use crate::intent::{IntentSignals, extract_symptoms};
use crate::knowledge::{
    DocumentKind, KnowledgeBase, RetrievedDocument, SharedKnowledgeBase, build_corpus,
    format_context,
};
use crate::ranking::{
    PredictionOutcome, ProbabilityModel, RankOptions, SoftmaxModel, predict_disease,
};
use crate::reference::{DiseaseInfo, FeatureImportance, ReferenceData};
use crate::semantic::{Embedder, LocalHashEmbedder, SemanticModelConfig, resolve_model_config};

mod render;
#[cfg(test)]
mod tests;

pub use render::render_prediction_text;

#[derive(Debug, Clone)]
pub struct EnginePaths {
    pub cache_root: PathBuf,
    pub manifest_dir: PathBuf,
    pub reference_path: PathBuf,
    pub model_path: PathBuf,
    pub index_path: PathBuf,
}

impl EnginePaths {
    pub fn resolve(args: &EngineArgs) -> Self {
        let cache_root = args.cache_root.clone();
        Self {
            manifest_dir: cache_root.join("manifests"),
            reference_path: args
                .reference_path
                .clone()
                .unwrap_or_else(|| cache_root.join("reference.json")),
            model_path: args
                .model_path
                .clone()
                .unwrap_or_else(|| cache_root.join("model.json")),
            index_path: args
                .index_path
                .clone()
                .unwrap_or_else(|| cache_root.join("index").join("knowledge.mrag")),
            cache_root,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexSource {
    Loaded,
    Rebuilt,
}

#[derive(Debug, Clone, Serialize)]
pub struct IndexBuildSummary {
    pub rows: usize,
    pub dimensions: usize,
    pub document_counts: Vec<(DocumentKind, usize)>,
    pub duration_ms: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageAnalysis {
    pub message: String,
    pub signals: IntentSignals,
    pub should_predict: bool,
    pub extracted_symptoms: Vec<String>,
    pub prediction: Option<PredictionOutcome>,
    pub prediction_text: String,
    pub context: String,
}

#[derive(Debug, Clone, Copy)]
pub struct ChatOptions {
    pub top_k: usize,
    pub min_score: Option<f64>,
    pub rank: RankOptions,
}

pub struct Engine {
    paths: EnginePaths,
    model_config: SemanticModelConfig,
    embedder: LocalHashEmbedder,
    reference: ReferenceData,
    model: Option<Box<dyn ProbabilityModel>>,
    knowledge: SharedKnowledgeBase,
}

impl Engine {
    /// Loads the reference artifact and, when present, the probability model.
    /// The knowledge index is loaded separately by [`Engine::ensure_knowledge`].
    pub fn open(args: &EngineArgs) -> Result<Self> {
        let paths = EnginePaths::resolve(args);
        let reference = ReferenceData::load(&paths.reference_path).with_context(|| {
            format!(
                "failed to load reference data from {}",
                paths.reference_path.display()
            )
        })?;

        let model = if paths.model_path.exists() {
            let model = SoftmaxModel::load(&paths.model_path).with_context(|| {
                format!(
                    "failed to load probability model from {}",
                    paths.model_path.display()
                )
            })?;
            model.ensure_feature_count(reference.catalog.len())?;
            Some(Box::new(model) as Box<dyn ProbabilityModel>)
        } else {
            warn!(
                path = %paths.model_path.display(),
                "probability model missing; disease prediction disabled"
            );
            None
        };

        Ok(Self::from_parts(
            paths,
            resolve_model_config(&args.embedding_model_id),
            reference,
            model,
        ))
    }

    pub fn from_parts(
        paths: EnginePaths,
        model_config: SemanticModelConfig,
        reference: ReferenceData,
        model: Option<Box<dyn ProbabilityModel>>,
    ) -> Self {
        info!(
            symptoms = reference.catalog.len(),
            diseases = reference.diseases.len(),
            model_loaded = model.is_some(),
            embedding_model = %model_config.model_id,
            "engine ready"
        );

        Self {
            embedder: LocalHashEmbedder::from_config(&model_config),
            paths,
            model_config,
            reference,
            model,
            knowledge: SharedKnowledgeBase::default(),
        }
    }

    pub fn paths(&self) -> &EnginePaths {
        &self.paths
    }

    pub fn model_config(&self) -> &SemanticModelConfig {
        &self.model_config
    }

    pub fn reference(&self) -> &ReferenceData {
        &self.reference
    }

    pub fn has_model(&self) -> bool {
        self.model.is_some()
    }

    pub fn model_classes(&self) -> &[String] {
        self.model
            .as_deref()
            .map(|model| model.classes())
            .unwrap_or(&[])
    }

    pub fn knowledge(&self) -> &SharedKnowledgeBase {
        &self.knowledge
    }

    /// Loads the persisted index, or rebuilds and re-saves it when the file is
    /// missing, unreadable as this format, or built with another dimension.
    pub fn ensure_knowledge(&self) -> Result<IndexSource> {
        let path = &self.paths.index_path;
        match KnowledgeBase::load(path) {
            Ok(knowledge)
                if knowledge.is_empty()
                    || knowledge.index().dimensions() == self.embedder.dimensions() =>
            {
                self.knowledge.publish(knowledge);
                return Ok(IndexSource::Loaded);
            }
            Ok(knowledge) => warn!(
                path = %path.display(),
                found = knowledge.index().dimensions(),
                expected = self.embedder.dimensions(),
                "knowledge index dimension differs from embedder; rebuilding"
            ),
            Err(IndexError::Io(err)) if err.kind() == ErrorKind::NotFound => {
                info!(path = %path.display(), "knowledge index missing; building")
            }
            Err(err) if err.is_recoverable_by_rebuild() => warn!(
                path = %path.display(),
                error = %err,
                "knowledge index unusable; rebuilding from reference data"
            ),
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("failed to load knowledge index {}", path.display()));
            }
        }

        self.rebuild_index()?;
        Ok(IndexSource::Rebuilt)
    }

    /// Builds a complete knowledge base from the reference artifact, saves it
    /// and only then publishes it to readers.
    pub fn rebuild_index(&self) -> Result<IndexBuildSummary> {
        let started = Instant::now();
        let documents = build_corpus(&self.reference);
        let knowledge = KnowledgeBase::build(documents, &self.embedder)
            .context("failed to build knowledge index")?;

        save_knowledge(&knowledge, &self.paths.index_path)?;

        let summary = IndexBuildSummary {
            rows: knowledge.len(),
            dimensions: knowledge.index().dimensions(),
            document_counts: knowledge.kind_counts().into_iter().collect(),
            duration_ms: started.elapsed().as_secs_f64() * 1000.0,
        };
        self.knowledge.publish(knowledge);

        info!(
            path = %self.paths.index_path.display(),
            rows = summary.rows,
            dimensions = summary.dimensions,
            duration_ms = summary.duration_ms,
            "knowledge index rebuilt"
        );
        Ok(summary)
    }

    pub fn query_context(
        &self,
        query_text: &str,
        top_k: usize,
        min_score: Option<f64>,
    ) -> Result<Vec<RetrievedDocument>> {
        let knowledge = self.knowledge.snapshot();
        knowledge
            .query_context(&self.embedder, query_text, top_k, min_score)
            .context("knowledge retrieval failed")
    }

    /// Numbered context block for `query_text`, or the empty string when
    /// nothing is retrieved.
    pub fn context_for_query(
        &self,
        query_text: &str,
        top_k: usize,
        min_score: Option<f64>,
    ) -> Result<String> {
        let results = self.query_context(query_text, top_k, min_score)?;
        Ok(format_context(&results))
    }

    pub fn predict_disease<S: AsRef<str>>(
        &self,
        symptom_names: &[S],
        options: RankOptions,
    ) -> Result<PredictionOutcome> {
        let Some(model) = self.model.as_deref() else {
            bail!(
                "probability model not loaded (expected at {})",
                self.paths.model_path.display()
            );
        };

        predict_disease(&self.reference, model, symptom_names, options)
            .context("disease ranking failed")
    }

    pub fn all_symptoms(&self) -> Vec<String> {
        self.reference.catalog.names()
    }

    pub fn search_symptoms(&self, query: &str) -> Vec<String> {
        self.reference.catalog.search_by_substring(query)
    }

    pub fn symptom_severity(&self, name: &str) -> Option<f64> {
        self.reference.catalog.symptom_severity(name)
    }

    pub fn disease_info(&self, name: &str) -> DiseaseInfo {
        self.reference.diseases.info(name.trim())
    }

    pub fn top_important_symptoms(&self, n: usize) -> &[FeatureImportance] {
        self.reference.top_important_symptoms(n)
    }

    /// Runs the intent rules over a chat message. Symptom reports are ranked
    /// when a model is loaded; retrieval context is gathered either way.
    pub fn analyze_message(&self, message: &str, options: ChatOptions) -> Result<MessageAnalysis> {
        let message = message.trim();
        if message.is_empty() {
            bail!("message cannot be empty");
        }

        let signals = IntentSignals::analyze(message);
        let should_predict = signals.should_predict();
        debug!(
            has_comma = signals.has_comma,
            has_keywords = signals.has_keywords,
            has_indicators = signals.has_indicators,
            is_question = signals.is_question,
            should_predict,
            "intent analyzed"
        );

        let mut extracted_symptoms = Vec::<String>::new();
        let mut prediction = None;
        if should_predict {
            if self.model.is_some() {
                extracted_symptoms = extract_symptoms(message, &self.reference.catalog);
                if !extracted_symptoms.is_empty() {
                    prediction = Some(self.predict_disease(&extracted_symptoms, options.rank)?);
                }
            } else {
                debug!("symptom report detected but no probability model is loaded");
            }
        }

        let prediction_text = prediction
            .as_ref()
            .map(render_prediction_text)
            .unwrap_or_default();
        let context = self.context_for_query(message, options.top_k, options.min_score)?;

        Ok(MessageAnalysis {
            message: message.to_string(),
            signals,
            should_predict,
            extracted_symptoms,
            prediction,
            prediction_text,
            context,
        })
    }
}

fn save_knowledge(knowledge: &KnowledgeBase, path: &Path) -> Result<()> {
    knowledge
        .save(path)
        .with_context(|| format!("failed to save knowledge index {}", path.display()))
}
