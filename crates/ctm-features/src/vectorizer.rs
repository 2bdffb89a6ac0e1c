//! TF-IDF vectorizer with a compile-time fit state.
//!
//! `TfidfVectorizer<Unfit>` only offers [`TfidfVectorizer::fit`], which
//! consumes it and returns a `TfidfVectorizer<Fitted>`. Only the fitted
//! form can transform, so transforming before fitting does not compile.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::config::{TfidfConfig, ngrams};
use crate::error::{FeatureError, Result};
use crate::vector::FeatureVector;

/// Fit state of a vectorizer that has not seen a corpus.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Unfit;

/// Frozen vocabulary and idf weights.
#[derive(Debug, Clone, PartialEq)]
pub struct Fitted {
    terms: Vec<String>,
    index: HashMap<String, usize>,
    idf: Vec<f64>,
    document_count: usize,
    fingerprint: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TfidfVectorizer<S> {
    config: TfidfConfig,
    state: S,
}

/// Serializable form of a fitted vectorizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorizerState {
    pub config: TfidfConfig,
    /// Terms in index order.
    pub vocabulary: Vec<String>,
    pub idf: Vec<f64>,
    pub document_count: usize,
    pub fingerprint: String,
}

impl<S> TfidfVectorizer<S> {
    pub fn config(&self) -> &TfidfConfig {
        &self.config
    }
}

impl TfidfVectorizer<Unfit> {
    pub fn new(config: TfidfConfig) -> Self {
        Self {
            config,
            state: Unfit,
        }
    }

    /// Learn vocabulary and idf weights from tokenized documents.
    pub fn fit<D, S>(self, corpus: &[D]) -> Result<TfidfVectorizer<Fitted>>
    where
        D: AsRef<[S]>,
        S: AsRef<str>,
    {
        self.config.validate()?;
        if corpus.is_empty() {
            return Err(FeatureError::EmptyCorpus);
        }

        let mut term_counts: HashMap<String, usize> = HashMap::new();
        let mut document_frequency: HashMap<String, usize> = HashMap::new();
        for document in corpus {
            let terms = ngrams(document.as_ref(), self.config.ngram_range);
            let mut seen: Vec<&String> = Vec::with_capacity(terms.len());
            for term in &terms {
                *term_counts.entry(term.clone()).or_default() += 1;
                seen.push(term);
            }
            seen.sort_unstable();
            seen.dedup();
            for term in seen {
                *document_frequency.entry(term.clone()).or_default() += 1;
            }
        }

        let mut ranked: Vec<(&String, usize)> = term_counts
            .iter()
            .filter(|(term, _)| document_frequency[*term] >= self.config.min_df)
            .map(|(term, count)| (term, *count))
            .collect();
        ranked.sort_by(|(a_term, a_count), (b_term, b_count)| {
            b_count.cmp(a_count).then_with(|| a_term.cmp(b_term))
        });
        ranked.truncate(self.config.max_features);

        let mut terms: Vec<String> = ranked.into_iter().map(|(term, _)| term.clone()).collect();
        if terms.is_empty() {
            return Err(FeatureError::EmptyVocabulary);
        }
        terms.sort_unstable();

        let n = corpus.len() as f64;
        let idf: Vec<f64> = terms
            .iter()
            .map(|term| smooth_idf(n, document_frequency[term] as f64))
            .collect();
        let fingerprint = fingerprint(&self.config, &terms, &idf);
        info!(
            documents = corpus.len(),
            vocabulary = terms.len(),
            fingerprint = %&fingerprint[..12],
            "fitted tf-idf vectorizer"
        );
        Ok(TfidfVectorizer {
            config: self.config,
            state: Fitted::new(terms, idf, corpus.len(), fingerprint),
        })
    }

    /// Fit on the corpus and transform every document of it.
    pub fn fit_transform<D, S>(
        self,
        corpus: &[D],
    ) -> Result<(TfidfVectorizer<Fitted>, Vec<FeatureVector>)>
    where
        D: AsRef<[S]>,
        S: AsRef<str>,
    {
        let fitted = self.fit(corpus)?;
        let vectors = corpus
            .iter()
            .map(|document| fitted.transform(document.as_ref()))
            .collect();
        Ok((fitted, vectors))
    }
}

impl Default for TfidfVectorizer<Unfit> {
    fn default() -> Self {
        Self::new(TfidfConfig::default())
    }
}

impl Fitted {
    fn new(terms: Vec<String>, idf: Vec<f64>, document_count: usize, fingerprint: String) -> Self {
        let index = terms
            .iter()
            .enumerate()
            .map(|(i, term)| (term.clone(), i))
            .collect();
        Self {
            terms,
            index,
            idf,
            document_count,
            fingerprint,
        }
    }
}

impl TfidfVectorizer<Fitted> {
    /// Rebuild a fitted vectorizer, checking internal consistency.
    pub fn from_state(state: VectorizerState) -> Result<Self> {
        state.config.validate()?;
        if state.vocabulary.is_empty() {
            return Err(FeatureError::EmptyVocabulary);
        }
        if state.vocabulary.len() != state.idf.len() {
            return Err(FeatureError::DimensionMismatch {
                expected: state.vocabulary.len(),
                actual: state.idf.len(),
            });
        }
        if state.vocabulary.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(FeatureError::InvalidState {
                message: "vocabulary must be sorted and unique".to_string(),
            });
        }
        if state.idf.iter().any(|w| !w.is_finite() || *w <= 0.0) {
            return Err(FeatureError::InvalidState {
                message: "idf weights must be finite and positive".to_string(),
            });
        }
        let recomputed = fingerprint(&state.config, &state.vocabulary, &state.idf);
        if recomputed != state.fingerprint {
            return Err(FeatureError::FingerprintMismatch {
                expected: state.fingerprint,
                actual: recomputed,
            });
        }
        debug!(vocabulary = state.vocabulary.len(), "restored tf-idf vectorizer");
        Ok(Self {
            config: state.config,
            state: Fitted::new(
                state.vocabulary,
                state.idf,
                state.document_count,
                state.fingerprint,
            ),
        })
    }

    pub fn to_state(&self) -> VectorizerState {
        VectorizerState {
            config: self.config,
            vocabulary: self.state.terms.clone(),
            idf: self.state.idf.clone(),
            document_count: self.state.document_count,
            fingerprint: self.state.fingerprint.clone(),
        }
    }

    /// Vocabulary size; every transformed vector has this dimension.
    pub fn dimension(&self) -> usize {
        self.state.terms.len()
    }

    pub fn terms(&self) -> &[String] {
        &self.state.terms
    }

    pub fn idf(&self) -> &[f64] {
        &self.state.idf
    }

    pub fn document_count(&self) -> usize {
        self.state.document_count
    }

    pub fn fingerprint(&self) -> &str {
        &self.state.fingerprint
    }

    pub fn term_index(&self, term: &str) -> Option<usize> {
        self.state.index.get(term).copied()
    }

    /// L2-normalized TF-IDF vector; out-of-vocabulary terms are ignored.
    pub fn transform<S: AsRef<str>>(&self, tokens: &[S]) -> FeatureVector {
        let mut counts: BTreeMap<usize, usize> = BTreeMap::new();
        for term in ngrams(tokens, self.config.ngram_range) {
            if let Some(i) = self.term_index(&term) {
                *counts.entry(i).or_default() += 1;
            }
        }

        let mut entries: Vec<(usize, f64)> = counts
            .into_iter()
            .map(|(i, count)| {
                let tf = if self.config.sublinear_tf {
                    1.0 + (count as f64).ln()
                } else {
                    count as f64
                };
                (i, tf * self.state.idf[i])
            })
            .collect();
        let norm = entries.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
        if norm > 0.0 {
            for (_, weight) in &mut entries {
                *weight /= norm;
            }
        }
        FeatureVector::new(self.dimension(), entries, self.state.fingerprint.clone())
    }

    pub fn transform_batch<D, S>(&self, documents: &[D]) -> Vec<FeatureVector>
    where
        D: AsRef<[S]>,
        S: AsRef<str>,
    {
        documents
            .iter()
            .map(|document| self.transform(document.as_ref()))
            .collect()
    }
}

fn smooth_idf(documents: f64, document_frequency: f64) -> f64 {
    ((1.0 + documents) / (1.0 + document_frequency)).ln() + 1.0
}

/// SHA-256 over config, terms, and idf bits, hex-encoded.
pub fn fingerprint(config: &TfidfConfig, terms: &[String], idf: &[f64]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(b"ctm-tfidf-v1\n");
    hasher.update((config.max_features as u64).to_le_bytes());
    hasher.update((config.ngram_range.0 as u64).to_le_bytes());
    hasher.update((config.ngram_range.1 as u64).to_le_bytes());
    hasher.update((config.min_df as u64).to_le_bytes());
    hasher.update([u8::from(config.sublinear_tf)]);
    for term in terms {
        hasher.update(term.as_bytes());
        hasher.update(b"\n");
    }
    for weight in idf {
        hasher.update(weight.to_bits().to_le_bytes());
    }
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> Vec<Vec<&'static str>> {
        vec![
            vec!["type", "diabetes", "adult"],
            vec!["type", "diabetes", "hypertension"],
            vec!["asthma", "adult"],
        ]
    }

    #[test]
    fn vocabulary_is_sorted_with_bigrams() {
        let fitted = TfidfVectorizer::default().fit(&corpus()).unwrap();
        assert_eq!(
            fitted.terms(),
            [
                "adult",
                "asthma",
                "asthma adult",
                "diabetes",
                "diabetes adult",
                "diabetes hypertension",
                "hypertension",
                "type",
                "type diabetes",
            ]
        );
    }

    #[test]
    fn idf_uses_smoothing() {
        let fitted = TfidfVectorizer::default().fit(&corpus()).unwrap();
        let type_idf = fitted.idf()[fitted.term_index("type").unwrap()];
        let asthma_idf = fitted.idf()[fitted.term_index("asthma").unwrap()];
        assert!((type_idf - ((4.0f64 / 3.0).ln() + 1.0)).abs() < 1e-12);
        assert!((asthma_idf - (2.0f64.ln() + 1.0)).abs() < 1e-12);
    }

    #[test]
    fn max_features_keeps_most_frequent() {
        let config = TfidfConfig::default().with_max_features(3);
        let fitted = TfidfVectorizer::new(config).fit(&corpus()).unwrap();
        assert_eq!(fitted.terms(), ["adult", "diabetes", "type"]);
    }

    #[test]
    fn transform_is_unit_length() {
        let fitted = TfidfVectorizer::default().fit(&corpus()).unwrap();
        let vector = fitted.transform(&["type", "diabetes", "unknown"]);
        assert_eq!(vector.dimension(), fitted.dimension());
        assert!((vector.norm() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn unknown_text_is_zero_vector() {
        let fitted = TfidfVectorizer::default().fit(&corpus()).unwrap();
        assert!(fitted.transform(&["zebra"]).is_zero());
    }

    #[test]
    fn empty_corpus_is_rejected() {
        let empty: Vec<Vec<String>> = Vec::new();
        assert_eq!(
            TfidfVectorizer::default().fit(&empty).unwrap_err(),
            FeatureError::EmptyCorpus
        );
    }

    #[test]
    fn corpus_of_empty_documents_has_no_vocabulary() {
        let blank: Vec<Vec<String>> = vec![Vec::new(), Vec::new()];
        assert_eq!(
            TfidfVectorizer::default().fit(&blank).unwrap_err(),
            FeatureError::EmptyVocabulary
        );
    }
}
