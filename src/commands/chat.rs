use anyhow::Result;
use tracing::info;

use super::output::{write_json, write_lines};
use crate::cli::ChatArgs;
use crate::engine::{ChatOptions, Engine};
use crate::ranking::RankOptions;

pub fn run(args: ChatArgs) -> Result<()> {
    let engine = Engine::open(&args.engine)?;
    let index_source = engine.ensure_knowledge()?;
    info!(?index_source, "knowledge index ready");

    let analysis = engine.analyze_message(
        &args.message,
        ChatOptions {
            top_k: args.top_k,
            min_score: args.min_score,
            rank: RankOptions {
                top_n: args.top_n,
                min_confidence: args.min_confidence,
            },
        },
    )?;

    if args.json {
        return write_json(&analysis);
    }

    let mut lines = vec![format!(
        "Route: {}",
        if analysis.should_predict {
            "symptom report"
        } else {
            "general question"
        }
    )];
    if !analysis.prediction_text.is_empty() {
        lines.push(analysis.prediction_text.trim_end().to_string());
    }
    if !analysis.context.is_empty() {
        lines.push(String::new());
        lines.push(analysis.context.clone());
    }
    write_lines(lines)
}
