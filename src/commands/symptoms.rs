use anyhow::{Result, bail};
use serde::Serialize;

use super::output::{write_json, write_lines};
use crate::cli::SymptomsArgs;
use crate::engine::Engine;

#[derive(Debug, Serialize)]
struct SymptomListing {
    query: Option<String>,
    count: usize,
    symptoms: Vec<String>,
}

#[derive(Debug, Serialize)]
struct SymptomSeverity {
    symptom: String,
    weight: f64,
}

pub fn run(args: SymptomsArgs) -> Result<()> {
    let engine = Engine::open(&args.engine)?;

    if let Some(name) = args.severity {
        let Some(weight) = engine.symptom_severity(&name) else {
            bail!("unknown symptom: {name}");
        };
        if args.json {
            return write_json(&SymptomSeverity {
                symptom: name,
                weight,
            });
        }
        return write_lines([format!("{name}\t{weight}")]);
    }

    let symptoms = match args.search.as_deref() {
        Some(query) => engine.search_symptoms(query),
        None => engine.all_symptoms(),
    };

    if args.json {
        return write_json(&SymptomListing {
            query: args.search,
            count: symptoms.len(),
            symptoms,
        });
    }
    write_lines(symptoms)
}
