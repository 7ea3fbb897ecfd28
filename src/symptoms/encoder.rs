use serde::Serialize;

use super::catalog::SymptomCatalog;

/// Comparison key for catalog membership: trimmed, lowercased, spaces
/// replaced by underscores.
pub fn canonicalize(name: &str) -> String {
    name.trim().to_lowercase().replace(' ', "_")
}

/// Presence vector aligned with catalog order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeatureVector(Vec<u8>);

impl FeatureVector {
    pub fn zeros(len: usize) -> Self {
        Self(vec![0; len])
    }

    pub fn from_values(values: Vec<u8>) -> Self {
        Self(values.into_iter().map(|value| u8::from(value != 0)).collect())
    }

    pub fn set(&mut self, position: usize) {
        if let Some(slot) = self.0.get_mut(position) {
            *slot = 1;
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn values(&self) -> &[u8] {
        &self.0
    }

    pub fn active_count(&self) -> usize {
        self.0.iter().filter(|value| **value != 0).count()
    }

    pub fn is_all_zero(&self) -> bool {
        self.active_count() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Encoding {
    pub features: FeatureVector,
    pub matched: Vec<String>,
    pub unmatched: Vec<String>,
}

impl Encoding {
    pub fn has_matches(&self) -> bool {
        !self.features.is_all_zero()
    }
}

/// Encodes free-form symptom names against the catalog. Hits record the
/// catalog spelling, misses record the canonicalized input, both in input
/// order.
pub fn encode<S: AsRef<str>>(catalog: &SymptomCatalog, raw_names: &[S]) -> Encoding {
    let mut features = FeatureVector::zeros(catalog.len());
    let mut matched = Vec::<String>::new();
    let mut unmatched = Vec::<String>::new();

    for raw in raw_names {
        let canonical = canonicalize(raw.as_ref());
        let hit = catalog
            .position_of(&canonical)
            .and_then(|position| catalog.entries().get(position).map(|entry| (position, entry)));

        match hit {
            Some((position, entry)) => {
                features.set(position);
                matched.push(entry.name.clone());
            }
            None => unmatched.push(canonical),
        }
    }

    Encoding {
        features,
        matched,
        unmatched,
    }
}
