use std::collections::BTreeMap;

use serde_json::{Value, json};

use super::{Document, DocumentKind};
use crate::reference::ReferenceData;

/// Severity band used in symptom documents. Coarser than the disease-level
/// severity buckets and kept separate from them.
pub fn symptom_band(weight: f64) -> &'static str {
    if weight < 3.0 {
        "mild"
    } else if weight < 5.0 {
        "moderate"
    } else {
        "severe"
    }
}

/// Materializes the knowledge documents for a reference artifact: disease
/// descriptions, then disease symptoms, then precautions, then one severity
/// document per catalog symptom.
pub fn build_corpus(reference: &ReferenceData) -> Vec<Document> {
    let mut documents = Vec::<Document>::new();
    let records = reference.diseases.records();

    for record in records {
        let Some(description) = record.description.as_deref() else {
            continue;
        };
        documents.push(Document::new(
            format!("Disease: {}\nDescription: {description}", record.name),
            DocumentKind::Description,
            &record.name,
            BTreeMap::new(),
        ));
    }

    for record in records.iter().filter(|record| !record.symptoms.is_empty()) {
        documents.push(Document::new(
            format!(
                "Disease: {}\nSymptoms: {}",
                record.name,
                record.symptoms.join(", ")
            ),
            DocumentKind::Symptoms,
            &record.name,
            BTreeMap::from([("symptoms".to_string(), json!(record.symptoms))]),
        ));
    }

    for record in records.iter().filter(|record| !record.precautions.is_empty()) {
        documents.push(Document::new(
            format!(
                "Disease: {}\nPrecautions: {}",
                record.name,
                record.precautions.join(", ")
            ),
            DocumentKind::Precautions,
            &record.name,
            BTreeMap::from([("precautions".to_string(), json!(record.precautions))]),
        ));
    }

    for entry in reference.catalog.entries() {
        let band = symptom_band(entry.weight);
        documents.push(Document::new(
            format!(
                "Symptom: {}\nSeverity: {band} (weight: {})",
                entry.name, entry.weight
            ),
            DocumentKind::Severity,
            &entry.name,
            BTreeMap::from([
                ("weight".to_string(), json!(entry.weight)),
                ("severity_level".to_string(), Value::from(band)),
            ]),
        ));
    }

    documents
}
