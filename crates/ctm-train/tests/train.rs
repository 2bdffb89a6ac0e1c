//! Training, selection, and artifact persistence.

use std::sync::Arc;

use ctm_features::{FeatureVector, Fitted, TfidfVectorizer};
use ctm_model::Label;
use ctm_train::{
    ARTIFACT_FORMAT_VERSION, ArtifactError, ArtifactFile, ArtifactHandle, Classifier,
    ModelArtifact, MultinomialNaiveBayes, TrainConfig, TrainError, TrainedModel,
    train_and_select,
};

fn corpus() -> (Vec<Vec<String>>, Vec<Label>) {
    let mut documents = Vec::new();
    let mut labels = Vec::new();
    for i in 0..40 {
        let eligible = i % 2 == 0;
        let words: Vec<String> = if eligible {
            vec!["type", "diabetes", "adult"]
        } else {
            vec!["cancer", "child", "history"]
        }
        .into_iter()
        .map(str::to_string)
        .chain([format!("note{}", i % 5)])
        .collect();
        documents.push(words);
        labels.push(Label::from_bool(eligible));
    }
    (documents, labels)
}

fn fitted() -> (TfidfVectorizer<Fitted>, Vec<FeatureVector>, Vec<Label>) {
    let (documents, labels) = corpus();
    let (vectorizer, features) = TfidfVectorizer::default()
        .fit_transform(&documents)
        .unwrap();
    (vectorizer, features, labels)
}

fn trained() -> ModelArtifact {
    let (vectorizer, features, labels) = fitted();
    train_and_select(&vectorizer, &features, &labels, &TrainConfig::default()).unwrap()
}

#[test]
fn separable_data_is_learned() {
    let artifact = trained();

    assert_eq!(artifact.candidates().len(), 2);
    for report in artifact.candidates() {
        assert_eq!(report.metrics.f1, 1.0, "{}", report.model_name);
    }
    assert_eq!(artifact.model_name(), "logistic_regression");
    assert_eq!(artifact.selected_metrics().f1, 1.0);
    assert_eq!(artifact.training().test_samples, 8);
    assert_eq!(artifact.training().train_samples, 32);

    let eligible = artifact
        .predict_tokens(&["type", "diabetes", "adult"])
        .unwrap();
    let ineligible = artifact.predict_tokens(&["cancer", "child"]).unwrap();
    assert_eq!(eligible.label, Label::Eligible);
    assert_eq!(ineligible.label, Label::NotEligible);
    assert!(eligible.probability > ineligible.probability);
}

#[test]
fn training_is_deterministic() {
    let first = trained();
    let second = trained();
    assert_eq!(first.classifier(), second.classifier());
    assert_eq!(first.candidates(), second.candidates());
}

#[test]
fn mismatched_lengths_are_rejected() {
    let (vectorizer, features, mut labels) = fitted();
    labels.pop();
    let err = train_and_select(&vectorizer, &features, &labels, &TrainConfig::default())
        .unwrap_err();
    assert!(matches!(
        err,
        TrainError::LengthMismatch {
            features: 40,
            labels: 39
        }
    ));
}

#[test]
fn single_class_is_insufficient() {
    let (vectorizer, features, _) = fitted();
    let labels = vec![Label::Eligible; features.len()];
    let err = train_and_select(&vectorizer, &features, &labels, &TrainConfig::default())
        .unwrap_err();
    assert!(matches!(err, TrainError::InsufficientData { .. }));
}

#[test]
fn vectors_from_another_vocabulary_are_rejected() {
    let (vectorizer, _, labels) = fitted();
    let other = TfidfVectorizer::default()
        .fit(&[vec!["unrelated", "words"]])
        .unwrap();
    let features: Vec<FeatureVector> = (0..labels.len())
        .map(|_| other.transform(&["words"]))
        .collect();
    let err = train_and_select(&vectorizer, &features, &labels, &TrainConfig::default())
        .unwrap_err();
    assert!(matches!(err, TrainError::Feature(_)));
}

#[test]
fn artifact_round_trips_through_disk() {
    let artifact = trained();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("models").join("model.json");

    artifact.save(&path).unwrap();
    assert!(!path.with_extension("json.tmp").exists());
    let loaded = ModelArtifact::load(&path).unwrap();

    assert_eq!(loaded.fingerprint(), artifact.fingerprint());
    assert_eq!(loaded.to_file(), artifact.to_file());
    assert_eq!(loaded.selected_metrics(), artifact.selected_metrics());
    let (documents, _) = corpus();
    for document in &documents {
        assert_eq!(
            loaded.predict_tokens(document).unwrap(),
            artifact.predict_tokens(document).unwrap()
        );
    }
}

fn json_without(field: &str) -> String {
    let mut value = serde_json::to_value(trained().to_file()).unwrap();
    value.as_object_mut().unwrap().remove(field);
    value.to_string()
}

#[test]
fn missing_field_is_named() {
    for field in ["classifier", "vectorizer", "feature_dimension"] {
        match ModelArtifact::from_json(&json_without(field)) {
            Err(ArtifactError::MissingField { field: missing }) => assert_eq!(missing, field),
            other => panic!("expected missing {field}, got {other:?}"),
        }
    }
}

#[test]
fn inconsistent_dimension_is_incompatible() {
    let mut file = trained().to_file();
    file.feature_dimension += 1;
    assert!(matches!(
        ModelArtifact::from_file(file),
        Err(ArtifactError::Incompatible {
            context: "feature dimension",
            ..
        })
    ));
}

#[test]
fn truncated_classifier_is_incompatible() {
    let mut file = trained().to_file();
    if let TrainedModel::LogisticRegression(model) = &mut file.classifier {
        model.weights.pop();
    }
    assert!(matches!(
        ModelArtifact::from_file(file),
        Err(ArtifactError::Incompatible {
            context: "classifier dimension",
            ..
        })
    ));
}

fn naive_bayes_file(feature_log_prob: [Vec<f64>; 2], alpha: f64) -> ArtifactFile {
    let mut file = trained().to_file();
    file.classifier = TrainedModel::NaiveBayes(MultinomialNaiveBayes {
        alpha,
        class_log_prior: [0.5f64.ln(); 2],
        feature_log_prob,
    });
    file.model_name = MultinomialNaiveBayes::NAME.to_string();
    file
}

#[test]
fn short_naive_bayes_class_row_is_incompatible() {
    let dimension = trained().feature_dimension();
    let file = naive_bayes_file([vec![-1.0; dimension], vec![-1.0; 1]], 1.0);
    match ModelArtifact::from_file(file) {
        Err(ArtifactError::Incompatible {
            context: "classifier dimension",
            expected,
            actual,
        }) => {
            assert_eq!(expected, dimension.to_string());
            assert_eq!(actual, "1");
        }
        other => panic!("expected classifier dimension error, got {other:?}"),
    }
}

#[test]
fn naive_bayes_without_smoothing_is_incompatible() {
    let dimension = trained().feature_dimension();
    let file = naive_bayes_file([vec![-1.0; dimension], vec![-1.0; dimension]], 0.0);
    assert!(matches!(
        ModelArtifact::from_file(file),
        Err(ArtifactError::Incompatible {
            context: "classifier parameters",
            ..
        })
    ));
}

#[test]
fn consistent_naive_bayes_artifact_loads() {
    let dimension = trained().feature_dimension();
    let file = naive_bayes_file([vec![-1.0; dimension], vec![-2.0; dimension]], 1.0);
    let artifact = ModelArtifact::from_file(file).unwrap();

    assert_eq!(artifact.model_name(), "naive_bayes");
    let prediction = artifact.predict_tokens(&["type", "diabetes"]).unwrap();
    assert_eq!(prediction.label, Label::NotEligible);
}

#[test]
fn artifact_without_candidates_is_incompatible() {
    let mut file = trained().to_file();
    file.candidates.clear();
    match ModelArtifact::from_file(file) {
        Err(ArtifactError::Incompatible {
            context: "candidate metrics",
            expected,
            actual,
        }) => {
            assert_eq!(expected, "logistic_regression");
            assert_eq!(actual, "no candidates");
        }
        other => panic!("expected candidate metrics error, got {other:?}"),
    }
}

#[test]
fn chosen_model_must_have_candidate_metrics() {
    let mut file = trained().to_file();
    file.candidates.retain(|report| report.model_name != "logistic_regression");
    assert!(matches!(
        ModelArtifact::from_file(file),
        Err(ArtifactError::Incompatible {
            context: "candidate metrics",
            ..
        })
    ));
}

#[test]
fn altered_vocabulary_fails_fingerprint() {
    let mut file = trained().to_file();
    let last = file.vectorizer.vocabulary.len() - 1;
    file.vectorizer.vocabulary[last].push('x');
    assert!(matches!(
        ModelArtifact::from_file(file),
        Err(ArtifactError::Incompatible {
            context: "vectorizer fingerprint",
            ..
        })
    ));
}

#[test]
fn future_format_is_unsupported() {
    let mut file = trained().to_file();
    file.format_version = ARTIFACT_FORMAT_VERSION + 1;
    assert!(matches!(
        ModelArtifact::from_file(file),
        Err(ArtifactError::UnsupportedVersion { .. })
    ));
}

#[test]
fn garbage_is_a_parse_error() {
    assert!(matches!(
        ModelArtifact::from_json("{ not json"),
        Err(ArtifactError::Parse { .. })
    ));
}

#[test]
fn handle_swaps_without_disturbing_readers() {
    let handle = ArtifactHandle::new(trained());
    let before = handle.current();

    let (vectorizer, features, labels) = fitted();
    let config = TrainConfig::default().with_seed(7);
    let next = train_and_select(&vectorizer, &features, &labels, &config).unwrap();
    let replaced = handle.swap(next);

    assert!(Arc::ptr_eq(&before, &replaced));
    assert_eq!(handle.current().training().seed, 7);
    assert_eq!(before.training().seed, 42);
    assert_eq!(before.classifier().dimension(), before.feature_dimension());
}
