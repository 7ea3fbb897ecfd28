use std::path::Path;

use super::*;
use crate::ranking::{RankedPredictions, SeverityLevel};
use crate::test_support::{sample_model, sample_reference};

fn paths_in(root: &Path) -> EnginePaths {
    EnginePaths::resolve(&EngineArgs {
        cache_root: root.to_path_buf(),
        reference_path: None,
        model_path: None,
        index_path: None,
        embedding_model_id: String::new(),
    })
}

fn engine_in(root: &Path, with_model: bool) -> Engine {
    let model = with_model.then(|| Box::new(sample_model()) as Box<dyn ProbabilityModel>);
    let mut config = resolve_model_config("");
    config.dimensions = 64;
    Engine::from_parts(paths_in(root), config, sample_reference(), model)
}

fn chat_options() -> ChatOptions {
    ChatOptions {
        top_k: 3,
        min_score: None,
        rank: RankOptions {
            top_n: 3,
            min_confidence: None,
        },
    }
}

#[test]
fn default_paths_live_under_cache_root() {
    let paths = paths_in(Path::new("/tmp/medrag"));
    assert_eq!(paths.reference_path, Path::new("/tmp/medrag/reference.json"));
    assert_eq!(paths.model_path, Path::new("/tmp/medrag/model.json"));
    assert_eq!(
        paths.index_path,
        Path::new("/tmp/medrag/index/knowledge.mrag")
    );
    assert_eq!(paths.manifest_dir, Path::new("/tmp/medrag/manifests"));
}

#[test]
fn missing_index_is_built_then_reused() {
    let dir = tempfile::tempdir().expect("tempdir");

    let first = engine_in(dir.path(), true);
    assert_eq!(first.ensure_knowledge().expect("ensure"), IndexSource::Rebuilt);
    assert!(first.paths().index_path.exists());
    assert_eq!(first.knowledge().snapshot().len(), 14);

    let second = engine_in(dir.path(), true);
    assert_eq!(second.ensure_knowledge().expect("ensure"), IndexSource::Loaded);
    assert_eq!(
        *second.knowledge().snapshot(),
        *first.knowledge().snapshot()
    );
}

#[test]
fn corrupt_index_falls_back_to_rebuild() {
    let dir = tempfile::tempdir().expect("tempdir");
    let engine = engine_in(dir.path(), true);
    let index_path = &engine.paths().index_path;
    std::fs::create_dir_all(index_path.parent().expect("parent")).expect("mkdir");
    std::fs::write(index_path, b"definitely not an index").expect("write");

    assert_eq!(engine.ensure_knowledge().expect("ensure"), IndexSource::Rebuilt);
    assert!(KnowledgeBase::load(index_path).is_ok());
}

#[test]
fn index_with_other_dimension_is_rebuilt() {
    let dir = tempfile::tempdir().expect("tempdir");
    let engine = engine_in(dir.path(), true);
    let other = KnowledgeBase::build(
        build_corpus(engine.reference()),
        &LocalHashEmbedder::new(16),
    )
    .expect("build");
    other.save(&engine.paths().index_path).expect("save");

    assert_eq!(engine.ensure_knowledge().expect("ensure"), IndexSource::Rebuilt);
    assert_eq!(engine.knowledge().snapshot().index().dimensions(), 64);
}

#[test]
fn retrieval_without_index_is_empty() {
    let dir = tempfile::tempdir().expect("tempdir");
    let engine = engine_in(dir.path(), true);
    assert_eq!(
        engine.context_for_query("itching", 5, None).expect("context"),
        ""
    );
}

#[test]
fn predict_requires_a_model() {
    let dir = tempfile::tempdir().expect("tempdir");
    let engine = engine_in(dir.path(), false);
    assert!(!engine.has_model());
    assert!(engine.model_classes().is_empty());
    assert!(
        engine
            .predict_disease(&["itching"], RankOptions::default())
            .is_err()
    );
}

#[test]
fn symptom_report_is_ranked_and_rendered() {
    let dir = tempfile::tempdir().expect("tempdir");
    let engine = engine_in(dir.path(), true);
    engine.ensure_knowledge().expect("ensure");

    let analysis = engine
        .analyze_message("I have itching, skin_rash", chat_options())
        .expect("analyze");

    assert!(analysis.should_predict);
    assert_eq!(analysis.extracted_symptoms, vec!["I have itching", "skin_rash"]);
    let Some(PredictionOutcome::Ranked(ranked)) = &analysis.prediction else {
        panic!("expected ranked predictions");
    };
    assert_eq!(ranked.predictions[0].disease, "Fungal infection");
    assert_eq!(ranked.unmatched, vec!["i_have_itching"]);
    assert!(
        analysis
            .prediction_text
            .starts_with("Based on your symptoms, here are the top predictions:\n\n1. **Fungal infection**\n")
    );
    assert!(
        analysis
            .prediction_text
            .ends_with("Note: Some symptoms were not recognized: i_have_itching\n\n")
    );
    assert!(analysis.context.starts_with("Here is relevant medical information"));
}

#[test]
fn chat_keeps_low_confidence_predictions_by_default() {
    let dir = tempfile::tempdir().expect("tempdir");
    let engine = engine_in(dir.path(), true);

    let analysis = engine
        .analyze_message("itching, skin_rash, nodal_skin_eruptions", chat_options())
        .expect("analyze");
    let Some(PredictionOutcome::Ranked(ranked)) = &analysis.prediction else {
        panic!("expected ranked predictions");
    };
    assert_eq!(ranked.predictions.len(), 3);
    assert_eq!(ranked.predictions[0].disease, "Fungal infection");
    assert!(ranked.predictions[1].confidence < 1.0);

    let mut thresholded = chat_options();
    thresholded.rank.min_confidence = Some(1.0);
    let analysis = engine
        .analyze_message("itching, skin_rash, nodal_skin_eruptions", thresholded)
        .expect("analyze");
    let Some(PredictionOutcome::Ranked(ranked)) = &analysis.prediction else {
        panic!("expected ranked predictions");
    };
    assert_eq!(ranked.predictions.len(), 1);
}

#[test]
fn questions_skip_prediction_but_keep_context() {
    let dir = tempfile::tempdir().expect("tempdir");
    let engine = engine_in(dir.path(), true);
    engine.ensure_knowledge().expect("ensure");

    let analysis = engine
        .analyze_message("What are the symptoms of GERD?", chat_options())
        .expect("analyze");

    assert!(!analysis.should_predict);
    assert!(analysis.prediction.is_none());
    assert_eq!(analysis.prediction_text, "");
    assert!(!analysis.context.is_empty());
    assert!(engine.analyze_message("   ", chat_options()).is_err());
}

#[test]
fn unmatched_report_renders_an_explanation() {
    let dir = tempfile::tempdir().expect("tempdir");
    let engine = engine_in(dir.path(), true);

    let analysis = engine
        .analyze_message("headache, back pain", chat_options())
        .expect("analyze");

    assert!(matches!(
        analysis.prediction,
        Some(PredictionOutcome::NoSymptomsMatched(_))
    ));
    assert_eq!(
        analysis.prediction_text,
        "Could not predict disease: No matching symptoms found\n\n"
    );
}

#[test]
fn rendered_prediction_lists_precautions_when_present() {
    let outcome = PredictionOutcome::Ranked(RankedPredictions {
        predictions: vec![crate::ranking::Prediction {
            disease: "Allergy".to_string(),
            probability: 0.5,
            confidence: 50.0,
            severity_score: 3.75,
            severity_level: SeverityLevel::Severe,
            description: "An immune response.".to_string(),
            precautions: vec!["apply calamine".to_string(), "use ice".to_string()],
        }],
        matched: vec!["chills".to_string()],
        unmatched: Vec::new(),
        total_symptoms_provided: 1,
    });

    assert_eq!(
        render_prediction_text(&outcome),
        "Based on your symptoms, here are the top predictions:\n\n\
         1. **Allergy**\n   - Confidence: 50.0%\n   - Severity: Severe\n   \
         - Description: An immune response.\n   - Precautions: apply calamine, use ice\n\n"
    );
}

#[test]
fn lookups_delegate_to_reference_data() {
    let dir = tempfile::tempdir().expect("tempdir");
    let engine = engine_in(dir.path(), true);

    assert_eq!(engine.all_symptoms().len(), 7);
    assert_eq!(engine.search_symptoms("SKIN"), vec!["skin_rash", "nodal_skin_eruptions"]);
    assert_eq!(engine.symptom_severity("Skin Rash"), Some(3.0));
    assert_eq!(engine.symptom_severity("headache"), None);
    assert_eq!(engine.disease_info(" Allergy ").severity_level, SeverityLevel::Severe);
    assert_eq!(engine.top_important_symptoms(1)[0].symptom, "itching");
    assert_eq!(engine.model_classes().len(), 3);
}
