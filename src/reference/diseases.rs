use std::collections::HashMap;

use serde::Serialize;

use crate::ranking::SeverityLevel;

pub const DEFAULT_DESCRIPTION: &str = "No description available";
pub const DEFAULT_SEVERITY_SCORE: f64 = 0.0;
pub const MAX_PRECAUTIONS: usize = 4;

#[derive(Debug, Clone, PartialEq)]
pub struct DiseaseRecord {
    pub name: String,
    pub description: Option<String>,
    pub precautions: Vec<String>,
    pub severity_score: f64,
    pub symptoms: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiseaseInfo {
    pub disease: String,
    pub description: String,
    pub precautions: Vec<String>,
    pub severity_score: f64,
    pub severity_level: SeverityLevel,
}

/// Disease reference records keyed by exact disease name. Unknown names are
/// not an error; every accessor documents the value it falls back to.
#[derive(Debug, Clone, Default)]
pub struct DiseaseTable {
    records: Vec<DiseaseRecord>,
    by_name: HashMap<String, usize>,
}

impl DiseaseTable {
    /// Later records with an already seen name replace the earlier record in
    /// place, keeping its position.
    pub fn new<I>(records: I) -> Self
    where
        I: IntoIterator<Item = DiseaseRecord>,
    {
        let mut table = Self::default();
        for record in records {
            match table.by_name.get(&record.name) {
                Some(position) => table.records[*position] = record,
                None => {
                    table.by_name.insert(record.name.clone(), table.records.len());
                    table.records.push(record);
                }
            }
        }
        table
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn records(&self) -> &[DiseaseRecord] {
        &self.records
    }

    pub fn get(&self, name: &str) -> Option<&DiseaseRecord> {
        self.by_name
            .get(name)
            .and_then(|position| self.records.get(*position))
    }

    /// Falls back to [`DEFAULT_DESCRIPTION`].
    pub fn description_or_default(&self, name: &str) -> &str {
        self.get(name)
            .and_then(|record| record.description.as_deref())
            .unwrap_or(DEFAULT_DESCRIPTION)
    }

    /// Falls back to an empty list.
    pub fn precautions_or_default(&self, name: &str) -> &[String] {
        self.get(name)
            .map(|record| record.precautions.as_slice())
            .unwrap_or(&[])
    }

    /// Falls back to [`DEFAULT_SEVERITY_SCORE`].
    pub fn severity_score_or_default(&self, name: &str) -> f64 {
        self.get(name)
            .map(|record| record.severity_score)
            .unwrap_or(DEFAULT_SEVERITY_SCORE)
    }

    pub fn info(&self, name: &str) -> DiseaseInfo {
        let severity_score = self.severity_score_or_default(name);
        DiseaseInfo {
            disease: name.to_string(),
            description: self.description_or_default(name).to_string(),
            precautions: self.precautions_or_default(name).to_vec(),
            severity_score,
            severity_level: SeverityLevel::from_score(severity_score),
        }
    }
}
