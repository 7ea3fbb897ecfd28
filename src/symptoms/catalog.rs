use std::collections::{HashMap, HashSet};

use super::encoder::canonicalize;

#[derive(Debug, Clone, PartialEq)]
pub struct SymptomEntry {
    pub name: String,
    pub weight: f64,
}

/// Ordered, de-duplicated symptom universe. Position `i` in the catalog is
/// feature `i` for every encoded vector and for the trained model.
#[derive(Debug, Clone, Default)]
pub struct SymptomCatalog {
    entries: Vec<SymptomEntry>,
    by_canonical: HashMap<String, usize>,
    spaced_lowercase: HashSet<String>,
}

impl SymptomCatalog {
    /// Keeps the first occurrence of each trimmed name. When two names share
    /// a canonical form, lookups resolve to the earlier position.
    pub fn new<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = SymptomEntry>,
    {
        let mut seen = HashSet::<String>::new();
        let mut catalog = Self::default();

        for entry in entries {
            let name = entry.name.trim().to_string();
            if name.is_empty() || !seen.insert(name.clone()) {
                continue;
            }

            let position = catalog.entries.len();
            catalog
                .by_canonical
                .entry(canonicalize(&name))
                .or_insert(position);
            catalog
                .spaced_lowercase
                .insert(name.to_lowercase().replace('_', " "));
            catalog.entries.push(SymptomEntry {
                name,
                weight: entry.weight.max(0.0),
            });
        }

        catalog
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> Vec<String> {
        self.entries.iter().map(|entry| entry.name.clone()).collect()
    }

    pub fn entries(&self) -> &[SymptomEntry] {
        &self.entries
    }

    /// Exact lookup on the canonical form of `name`.
    pub fn position_of(&self, name: &str) -> Option<usize> {
        self.by_canonical.get(&canonicalize(name)).copied()
    }

    /// Severity weight of a symptom given in any case/separator variant.
    pub fn symptom_severity(&self, name: &str) -> Option<f64> {
        self.position_of(name)
            .and_then(|position| self.entries.get(position))
            .map(|entry| entry.weight)
    }

    /// Case-insensitive substring match over catalog names, catalog order.
    pub fn search_by_substring(&self, query: &str) -> Vec<String> {
        let needle = query.to_lowercase();
        self.entries
            .iter()
            .filter(|entry| entry.name.to_lowercase().contains(&needle))
            .map(|entry| entry.name.clone())
            .collect()
    }

    /// True when `token`, lowercased, equals some catalog name lowercased with
    /// underscores turned into spaces. Multi-word names can never match a
    /// single whitespace-free token.
    pub(crate) fn matches_spaced_token(&self, token: &str) -> bool {
        self.spaced_lowercase.contains(&token.to_lowercase())
    }
}
