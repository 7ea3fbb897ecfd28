use anyhow::Result;

use super::output::{write_json, write_lines};
use crate::cli::DiseaseArgs;
use crate::engine::Engine;

pub fn run(args: DiseaseArgs) -> Result<()> {
    let engine = Engine::open(&args.engine)?;
    let info = engine.disease_info(&args.name);

    if args.json {
        return write_json(&info);
    }

    let mut lines = vec![
        format!("Disease: {}", info.disease),
        format!("Description: {}", info.description),
        format!(
            "Severity: {} ({})",
            info.severity_level, info.severity_score
        ),
    ];
    if !info.precautions.is_empty() {
        lines.push(format!("Precautions: {}", info.precautions.join(", ")));
    }
    write_lines(lines)
}
