//! Vectorizer configuration.

use serde::{Deserialize, Serialize};

use crate::error::{FeatureError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TfidfConfig {
    /// Cap on vocabulary size across all n-gram orders.
    pub max_features: usize,
    /// Inclusive `(min, max)` n-gram order.
    pub ngram_range: (usize, usize),
    /// Minimum number of documents a term must appear in.
    pub min_df: usize,
    /// Use `1 + ln(count)` instead of raw counts.
    pub sublinear_tf: bool,
}

impl Default for TfidfConfig {
    fn default() -> Self {
        Self {
            max_features: 5000,
            ngram_range: (1, 2),
            min_df: 1,
            sublinear_tf: false,
        }
    }
}

impl TfidfConfig {
    #[must_use]
    pub fn with_max_features(mut self, max_features: usize) -> Self {
        self.max_features = max_features;
        self
    }

    #[must_use]
    pub fn with_ngram_range(mut self, min: usize, max: usize) -> Self {
        self.ngram_range = (min, max);
        self
    }

    #[must_use]
    pub fn with_min_df(mut self, min_df: usize) -> Self {
        self.min_df = min_df;
        self
    }

    #[must_use]
    pub fn with_sublinear_tf(mut self, sublinear_tf: bool) -> Self {
        self.sublinear_tf = sublinear_tf;
        self
    }

    pub fn validate(&self) -> Result<()> {
        let (min, max) = self.ngram_range;
        if min == 0 || min > max {
            return Err(FeatureError::InvalidConfig {
                field: "ngram_range",
                message: format!("({min}, {max}) must satisfy 1 <= min <= max"),
            });
        }
        if self.max_features == 0 {
            return Err(FeatureError::InvalidConfig {
                field: "max_features",
                message: "must be at least 1".to_string(),
            });
        }
        if self.min_df == 0 {
            return Err(FeatureError::InvalidConfig {
                field: "min_df",
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Every n-gram of `tokens` within `range`, unigrams first.
pub(crate) fn ngrams<S: AsRef<str>>(tokens: &[S], (min, max): (usize, usize)) -> Vec<String> {
    let mut terms = Vec::new();
    for n in min..=max {
        if n > tokens.len() {
            break;
        }
        for window in tokens.windows(n) {
            let parts: Vec<&str> = window.iter().map(AsRef::as_ref).collect();
            terms.push(parts.join(" "));
        }
    }
    terms
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unigrams_and_bigrams() {
        let tokens = ["type", "diabetes", "adult"];
        assert_eq!(
            ngrams(&tokens, (1, 2)),
            vec!["type", "diabetes", "adult", "type diabetes", "diabetes adult"]
        );
    }

    #[test]
    fn short_documents_skip_long_orders() {
        assert_eq!(ngrams(&["asthma"], (1, 3)), vec!["asthma"]);
        assert!(ngrams::<&str>(&[], (1, 2)).is_empty());
    }

    #[test]
    fn inverted_range_is_rejected() {
        let config = TfidfConfig::default().with_ngram_range(2, 1);
        assert!(matches!(
            config.validate(),
            Err(FeatureError::InvalidConfig {
                field: "ngram_range",
                ..
            })
        ));
    }
}
