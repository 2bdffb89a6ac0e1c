use ctm_features::{
    FeatureError, FeatureExtractor, TfidfConfig, TfidfVectorizer, VectorizerState,
    cosine_similarity,
};
use proptest::prelude::*;

fn documents() -> Vec<Vec<String>> {
    [
        "patient_name age year_old female type diabetes hypertension",
        "age year_old male cancer type diabetes",
        "adult type diabetes cardiovascular disease cancer",
        "age year_old person asthma copd",
    ]
    .iter()
    .map(|doc| doc.split(' ').map(str::to_string).collect())
    .collect()
}

#[test]
fn state_survives_json_round_trip() {
    let fitted = TfidfVectorizer::default().fit(&documents()).unwrap();
    let json = serde_json::to_string(&fitted.to_state()).unwrap();
    let state: VectorizerState = serde_json::from_str(&json).unwrap();
    let restored = TfidfVectorizer::from_state(state).unwrap();

    assert_eq!(restored.fingerprint(), fitted.fingerprint());
    for document in documents() {
        assert_eq!(restored.transform(&document), fitted.transform(&document));
    }
}

#[test]
fn tampered_state_is_rejected() {
    let fitted = TfidfVectorizer::default().fit(&documents()).unwrap();
    let mut state = fitted.to_state();
    state.idf[0] += 0.5;

    assert!(matches!(
        TfidfVectorizer::from_state(state),
        Err(FeatureError::FingerprintMismatch { .. })
    ));
}

#[test]
fn truncated_idf_is_a_dimension_error() {
    let fitted = TfidfVectorizer::default().fit(&documents()).unwrap();
    let mut state = fitted.to_state();
    state.idf.pop();

    assert!(matches!(
        FeatureExtractor::from_state(state),
        Err(FeatureError::DimensionMismatch { .. })
    ));
}

#[test]
fn related_texts_are_more_similar() {
    let fitted = TfidfVectorizer::default().fit(&documents()).unwrap();
    let docs = documents();
    let vectors = fitted.transform_batch(&docs);

    let near = cosine_similarity(&vectors[0], &vectors[1]).unwrap();
    let far = cosine_similarity(&vectors[0], &vectors[3]).unwrap();
    assert!(near > far, "{near} <= {far}");
    assert!((0.0..=1.0).contains(&near));
}

#[test]
fn vectors_from_different_fits_do_not_mix() {
    let first = TfidfVectorizer::default().fit(&documents()).unwrap();
    let second = TfidfVectorizer::new(TfidfConfig::default().with_ngram_range(1, 1))
        .fit(&documents())
        .unwrap();
    let tokens = ["type", "diabetes"];

    assert_ne!(first.fingerprint(), second.fingerprint());
    assert!(cosine_similarity(&first.transform(&tokens), &second.transform(&tokens)).is_err());
}

#[test]
fn fit_transform_matches_separate_calls() {
    let (fitted, vectors) = TfidfVectorizer::default()
        .fit_transform(&documents())
        .unwrap();
    assert_eq!(vectors, fitted.transform_batch(&documents()));
}

fn token() -> impl Strategy<Value = String> {
    prop::sample::select(vec![
        "age", "adult", "asthma", "cancer", "copd", "diabetes", "female", "type", "zebra",
    ])
    .prop_map(str::to_string)
}

proptest! {
    #[test]
    fn transform_is_deterministic_with_constant_dimension(
        tokens in prop::collection::vec(token(), 0..20),
    ) {
        let fitted = TfidfVectorizer::default().fit(&documents()).unwrap();
        let first = fitted.transform(&tokens);
        let second = fitted.transform(&tokens);

        prop_assert_eq!(first.dimension(), fitted.dimension());
        prop_assert!(first.entries().windows(2).all(|w| w[0].0 < w[1].0));
        prop_assert!(first.is_zero() || (first.norm() - 1.0).abs() < 1e-9);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn refitting_same_corpus_gives_same_fingerprint(extra in prop::collection::vec(token(), 1..8)) {
        let mut corpus = documents();
        corpus.push(extra);
        let a = TfidfVectorizer::default().fit(&corpus).unwrap();
        let b = TfidfVectorizer::default().fit(&corpus).unwrap();
        prop_assert_eq!(a.fingerprint(), b.fingerprint());
        prop_assert_eq!(a.terms(), b.terms());
    }
}
