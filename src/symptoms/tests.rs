use super::*;

fn entry(name: &str, weight: f64) -> SymptomEntry {
    SymptomEntry {
        name: name.to_string(),
        weight,
    }
}

fn catalog() -> SymptomCatalog {
    SymptomCatalog::new(vec![
        entry("itching", 1.0),
        entry("skin_rash", 3.0),
        entry("nodal_skin_eruptions", 4.0),
        entry("Continuous_Sneezing", 4.0),
        entry("itching", 9.0),
        entry("chills", 3.0),
    ])
}

#[test]
fn canonicalize_folds_case_whitespace_and_separators() {
    let expected = "skin_rash";
    assert_eq!(canonicalize("Skin Rash"), expected);
    assert_eq!(canonicalize("skin_rash"), expected);
    assert_eq!(canonicalize(" SKIN_RASH "), expected);
    assert_eq!(canonicalize("  High  fever"), "high__fever");
}

#[test]
fn catalog_drops_duplicate_names_and_keeps_first_weight() {
    let catalog = catalog();
    assert_eq!(catalog.len(), 5);
    assert_eq!(
        catalog.names(),
        vec![
            "itching",
            "skin_rash",
            "nodal_skin_eruptions",
            "Continuous_Sneezing",
            "chills"
        ]
    );
    assert_eq!(catalog.symptom_severity("itching"), Some(1.0));
}

#[test]
fn encode_marks_positions_and_reports_catalog_spelling() {
    let catalog = catalog();
    let encoding = encode(
        &catalog,
        &["Skin Rash", " continuous sneezing ", "headache", "CHILLS"],
    );

    assert_eq!(encoding.features.values(), &[0, 1, 0, 1, 1]);
    assert_eq!(
        encoding.matched,
        vec!["skin_rash", "Continuous_Sneezing", "chills"]
    );
    assert_eq!(encoding.unmatched, vec!["headache"]);
    assert!(encoding.has_matches());
}

#[test]
fn encode_of_nothing_is_all_zero_with_empty_reports() {
    let catalog = catalog();
    let encoding = encode::<&str>(&catalog, &[]);

    assert_eq!(encoding.features.len(), catalog.len());
    assert!(encoding.features.is_all_zero());
    assert!(encoding.matched.is_empty());
    assert!(encoding.unmatched.is_empty());
}

#[test]
fn encode_of_unknown_symptom_lists_it_as_unmatched() {
    let catalog = catalog();
    let encoding = encode(&catalog, &["Not A Real Symptom"]);

    assert!(encoding.features.is_all_zero());
    assert!(!encoding.has_matches());
    assert!(encoding.matched.is_empty());
    assert_eq!(encoding.unmatched, vec!["not_a_real_symptom"]);
}

#[test]
fn encode_uses_exact_match_not_substring() {
    let catalog = catalog();
    let encoding = encode(&catalog, &["rash", "itch"]);
    assert!(encoding.features.is_all_zero());
    assert_eq!(encoding.unmatched, vec!["rash", "itch"]);
}

#[test]
fn repeated_symptom_sets_one_position_but_is_reported_each_time() {
    let catalog = catalog();
    let encoding = encode(&catalog, &["itching", "Itching"]);
    assert_eq!(encoding.features.active_count(), 1);
    assert_eq!(encoding.matched, vec!["itching", "itching"]);
}

#[test]
fn substring_search_is_case_insensitive_and_catalog_ordered() {
    let catalog = catalog();
    assert_eq!(
        catalog.search_by_substring("SKIN"),
        vec!["skin_rash", "nodal_skin_eruptions"]
    );
    assert_eq!(catalog.search_by_substring("sneez"), vec!["Continuous_Sneezing"]);
    assert!(catalog.search_by_substring("fever").is_empty());
    assert_eq!(catalog.search_by_substring("").len(), catalog.len());
}

#[test]
fn symptom_severity_accepts_variants_and_misses_cleanly() {
    let catalog = catalog();
    assert_eq!(catalog.symptom_severity("Nodal Skin Eruptions"), Some(4.0));
    assert_eq!(catalog.symptom_severity("fever"), None);
}

#[test]
fn spaced_token_match_only_recognizes_single_word_names() {
    let catalog = catalog();
    assert!(catalog.matches_spaced_token("Itching"));
    assert!(catalog.matches_spaced_token("chills"));
    assert!(!catalog.matches_spaced_token("skin_rash"));
    assert!(!catalog.matches_spaced_token("rash"));
}

#[test]
fn feature_vector_from_values_clamps_to_presence_bits() {
    let features = FeatureVector::from_values(vec![0, 3, 1, 0]);
    assert_eq!(features.values(), &[0, 1, 1, 0]);
    assert_eq!(features.active_count(), 2);
}
