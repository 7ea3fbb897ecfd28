use std::fmt::Write;

use crate::ranking::PredictionOutcome;

const NO_MATCH_MESSAGE: &str = "No matching symptoms found";

/// Chat-facing summary of a prediction outcome. Ranked outcomes without any
/// prediction left after filtering render as the empty string.
pub fn render_prediction_text(outcome: &PredictionOutcome) -> String {
    let mut text = String::new();

    match outcome {
        PredictionOutcome::Ranked(ranked) => {
            if ranked.predictions.is_empty() {
                return text;
            }

            text.push_str("Based on your symptoms, here are the top predictions:\n\n");
            for (position, prediction) in ranked.predictions.iter().enumerate() {
                let _ = writeln!(text, "{}. **{}**", position + 1, prediction.disease);
                let _ = writeln!(
                    text,
                    "   - Confidence: {}%",
                    format_confidence(prediction.confidence)
                );
                let _ = writeln!(text, "   - Severity: {}", prediction.severity_level);
                let _ = writeln!(text, "   - Description: {}", prediction.description);
                if !prediction.precautions.is_empty() {
                    let _ = writeln!(
                        text,
                        "   - Precautions: {}",
                        prediction.precautions.join(", ")
                    );
                }
                text.push('\n');
            }

            if !ranked.unmatched.is_empty() {
                let _ = write!(
                    text,
                    "Note: Some symptoms were not recognized: {}\n\n",
                    ranked.unmatched.join(", ")
                );
            }
        }
        PredictionOutcome::NoSymptomsMatched(_) => {
            let _ = write!(text, "Could not predict disease: {NO_MATCH_MESSAGE}\n\n");
        }
    }

    text
}

/// Whole percentages keep one decimal place (`50.0`); others print as stored.
fn format_confidence(confidence: f64) -> String {
    if confidence.is_finite() && confidence.fract() == 0.0 {
        format!("{confidence:.1}")
    } else {
        confidence.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::format_confidence;

    #[test]
    fn whole_confidences_keep_a_decimal() {
        assert_eq!(format_confidence(50.0), "50.0");
        assert_eq!(format_confidence(100.0), "100.0");
        assert_eq!(format_confidence(98.5), "98.5");
        assert_eq!(format_confidence(33.33), "33.33");
    }
}
