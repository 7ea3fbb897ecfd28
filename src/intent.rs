use serde::Serialize;

use crate::symptoms::SymptomCatalog;

const DOMAIN_KEYWORDS: [&str; 4] = ["symptoms", "symptom", "predict", "disease"];
const REPORT_INDICATORS: [&str; 5] = [
    "i have",
    "my symptoms",
    "symptoms are",
    "symptoms:",
    "predict from",
];
const QUESTION_WORDS: [&str; 8] = ["what", "how", "why", "when", "where", "who", "can", "do"];
const QUESTION_WINDOW: usize = 3;

/// Inputs of the routing decision, kept so callers can log why a message was
/// or was not treated as a symptom report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IntentSignals {
    pub has_comma: bool,
    pub comma_parts: usize,
    pub has_keywords: bool,
    pub has_indicators: bool,
    pub is_question: bool,
}

impl IntentSignals {
    pub fn analyze(message: &str) -> Self {
        let lowered = message.to_lowercase();
        let leading = lowered
            .split_whitespace()
            .take(QUESTION_WINDOW)
            .collect::<Vec<&str>>();

        Self {
            has_comma: message.contains(','),
            comma_parts: message.split(',').count(),
            has_keywords: DOMAIN_KEYWORDS
                .iter()
                .any(|keyword| lowered.contains(keyword)),
            has_indicators: REPORT_INDICATORS
                .iter()
                .any(|phrase| lowered.contains(phrase)),
            is_question: QUESTION_WORDS
                .iter()
                .any(|word| leading.contains(word)),
        }
    }

    /// A leading question word vetoes every other signal.
    pub fn should_predict(&self) -> bool {
        let report = (self.has_comma && self.has_keywords)
            || self.has_indicators
            || (self.has_comma && self.comma_parts > 1);
        report && !self.is_question
    }
}

pub fn should_predict(message: &str) -> bool {
    IntentSignals::analyze(message).should_predict()
}

/// Pulls symptom names out of a chat message. A comma list yields its
/// non-empty trimmed parts verbatim. Otherwise only single words equal to a
/// catalog name (underscores read as spaces, any case) are kept.
pub fn extract_symptoms(message: &str, catalog: &SymptomCatalog) -> Vec<String> {
    let parts = message
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect::<Vec<String>>();

    if parts.len() > 1 {
        return parts;
    }

    message
        .to_lowercase()
        .split_whitespace()
        .filter(|token| catalog.matches_spaced_token(token))
        .map(str::to_string)
        .collect()
}
