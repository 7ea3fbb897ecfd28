use anyhow::{Result, bail};
use serde::Serialize;

use super::output::{write_json, write_lines};
use crate::cli::QueryArgs;
use crate::engine::{Engine, IndexSource};
use crate::knowledge::{RetrievedDocument, format_context};

#[derive(Debug, Serialize)]
struct QueryResponse<'a> {
    query: &'a str,
    top_k: usize,
    min_score: Option<f64>,
    index_source: IndexSource,
    returned: usize,
    results: &'a [RetrievedDocument],
}

pub fn run(args: QueryArgs) -> Result<()> {
    let query_text = args.query.trim();
    if query_text.is_empty() {
        bail!("--query must not be empty");
    }

    let engine = Engine::open(&args.engine)?;
    let index_source = engine.ensure_knowledge()?;
    let results = engine.query_context(query_text, args.top_k, args.min_score)?;

    if args.json {
        return write_json(&QueryResponse {
            query: query_text,
            top_k: args.top_k,
            min_score: args.min_score,
            index_source,
            returned: results.len(),
            results: &results,
        });
    }

    if args.context {
        return write_lines([format_context(&results)]);
    }

    let mut lines = vec![
        format!("Query: {query_text}"),
        format!("Results: {}", results.len()),
    ];
    for result in &results {
        lines.push(format!(
            "{}.\tscore={:.6}\t{}\t{}",
            result.rank,
            result.score,
            result.document.kind.as_str(),
            result.document.subject
        ));
        lines.extend(
            result
                .document
                .text
                .lines()
                .map(|line| format!("\t{line}")),
        );
    }
    write_lines(lines)
}
