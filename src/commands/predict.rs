use anyhow::Result;

use super::output::{write_json, write_lines};
use crate::cli::PredictArgs;
use crate::engine::Engine;
use crate::ranking::{PredictionOutcome, RankOptions};

pub fn run(args: PredictArgs) -> Result<()> {
    let engine = Engine::open(&args.engine)?;
    let outcome = engine.predict_disease(
        &args.symptoms,
        RankOptions {
            top_n: args.top_n,
            min_confidence: Some(args.min_confidence),
        },
    )?;

    if args.json {
        return write_json(&outcome);
    }

    let mut lines = Vec::<String>::new();
    match &outcome {
        PredictionOutcome::Ranked(ranked) => {
            lines.push(format!(
                "Matched {} of {} symptoms: {}",
                ranked.matched.len(),
                ranked.total_symptoms_provided,
                ranked.matched.join(", ")
            ));
            if !ranked.unmatched.is_empty() {
                lines.push(format!(
                    "Unmatched symptoms: {}",
                    ranked.unmatched.join(", ")
                ));
            }
            for (position, prediction) in ranked.predictions.iter().enumerate() {
                lines.push(format!(
                    "{}.\t{}\tconfidence={}%\tseverity={} ({})",
                    position + 1,
                    prediction.disease,
                    prediction.confidence,
                    prediction.severity_level,
                    prediction.severity_score
                ));
                lines.push(format!("\t{}", prediction.description));
                if !prediction.precautions.is_empty() {
                    lines.push(format!(
                        "\tprecautions: {}",
                        prediction.precautions.join(", ")
                    ));
                }
            }
        }
        PredictionOutcome::NoSymptomsMatched(report) => {
            lines.push("Error: No matching symptoms found".to_string());
            if !report.unmatched.is_empty() {
                lines.push(format!(
                    "Unmatched symptoms: {}",
                    report.unmatched.join(", ")
                ));
            }
        }
    }
    write_lines(lines)
}
