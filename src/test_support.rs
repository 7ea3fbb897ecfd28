use crate::ranking::SoftmaxModel;
use crate::reference::{
    DiseaseEntry, FeatureImportance, REFERENCE_FORMAT_VERSION, ReferenceArtifact, ReferenceData,
    SymptomWeight,
};

pub(crate) fn symptom(name: &str, weight: f64) -> SymptomWeight {
    SymptomWeight {
        name: name.to_string(),
        weight,
    }
}

pub(crate) fn disease(
    name: &str,
    description: Option<&str>,
    precautions: &[&str],
    severity_score: Option<f64>,
    symptoms: &[&str],
) -> DiseaseEntry {
    DiseaseEntry {
        name: name.to_string(),
        description: description.map(str::to_string),
        precautions: precautions.iter().map(|value| value.to_string()).collect(),
        severity_score,
        symptoms: symptoms.iter().map(|value| value.to_string()).collect(),
    }
}

/// Catalog order: itching, skin_rash, nodal_skin_eruptions,
/// continuous_sneezing, shivering, chills, vomiting.
pub(crate) fn sample_artifact() -> ReferenceArtifact {
    ReferenceArtifact {
        format_version: REFERENCE_FORMAT_VERSION,
        symptoms: vec![
            symptom("itching", 1.0),
            symptom("skin_rash", 3.0),
            symptom("nodal_skin_eruptions", 4.0),
            symptom("continuous_sneezing", 4.0),
            symptom("shivering", 5.0),
            symptom("chills", 3.0),
            symptom("vomiting", 5.0),
        ],
        diseases: vec![
            disease(
                "Fungal infection",
                Some("A fungal infection of the skin."),
                &["bath twice", "use detol or neem in bathing water", "keep infected area dry"],
                Some(2.67),
                &["itching", "skin_rash", "nodal_skin_eruptions"],
            ),
            disease(
                "Allergy",
                Some("An immune response to a foreign substance."),
                &["apply calamine", "cover area with bandage", "use ice to compress itching"],
                Some(3.75),
                &["continuous_sneezing", "shivering", "chills"],
            ),
            disease(
                "GERD",
                None,
                &[],
                None,
                &["vomiting", "chills"],
            ),
        ],
        feature_importance: vec![
            FeatureImportance {
                symptom: "chills".to_string(),
                importance: 0.05,
            },
            FeatureImportance {
                symptom: "itching".to_string(),
                importance: 0.2,
            },
            FeatureImportance {
                symptom: "vomiting".to_string(),
                importance: 0.1,
            },
        ],
    }
}

pub(crate) fn sample_reference() -> ReferenceData {
    ReferenceData::from_artifact(sample_artifact()).expect("sample artifact is valid")
}

/// Three classes over the seven sample symptoms. Each class puts weight on
/// its own symptoms so an encoded vector favours the matching disease.
pub(crate) fn sample_model() -> SoftmaxModel {
    SoftmaxModel::new(
        vec![
            "Allergy".to_string(),
            "Fungal infection".to_string(),
            "GERD".to_string(),
        ],
        vec![
            vec![0.0, 0.0, 0.0, 3.0, 2.0, 1.0, 0.0],
            vec![2.0, 2.0, 2.0, 0.0, 0.0, 0.0, 0.0],
            vec![0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 3.0],
        ],
        vec![0.0, 0.0, 0.0],
    )
    .expect("sample model is valid")
}
