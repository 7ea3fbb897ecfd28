use anyhow::Result;

use super::output::{write_json, write_lines};
use crate::cli::ImportanceArgs;
use crate::engine::Engine;

pub fn run(args: ImportanceArgs) -> Result<()> {
    let engine = Engine::open(&args.engine)?;
    let rows = engine.top_important_symptoms(args.limit);

    if args.json {
        return write_json(&rows);
    }

    write_lines(
        rows.iter()
            .enumerate()
            .map(|(position, row)| {
                format!("{}.\t{}\t{:.6}", position + 1, row.symptom, row.importance)
            }),
    )
}
