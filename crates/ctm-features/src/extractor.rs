//! Runtime-checked vectorizer for state that is only known dynamically.

use std::sync::Arc;

use crate::config::TfidfConfig;
use crate::error::{FeatureError, Result};
use crate::vector::FeatureVector;
use crate::vectorizer::{Fitted, TfidfVectorizer, Unfit, VectorizerState};

/// A vectorizer whose fit state is checked at call time.
#[derive(Debug, Clone)]
pub enum FeatureExtractor {
    Unfit(TfidfVectorizer<Unfit>),
    Fitted(Arc<TfidfVectorizer<Fitted>>),
}

impl FeatureExtractor {
    pub fn new(config: TfidfConfig) -> Self {
        Self::Unfit(TfidfVectorizer::new(config))
    }

    pub fn from_state(state: VectorizerState) -> Result<Self> {
        Ok(Self::Fitted(Arc::new(TfidfVectorizer::from_state(state)?)))
    }

    pub fn is_fitted(&self) -> bool {
        matches!(self, Self::Fitted(_))
    }

    pub fn fit<D, S>(&mut self, corpus: &[D]) -> Result<()>
    where
        D: AsRef<[S]>,
        S: AsRef<str>,
    {
        let Self::Unfit(vectorizer) = self else {
            return Err(FeatureError::AlreadyFitted);
        };
        let fitted = vectorizer.clone().fit(corpus)?;
        *self = Self::Fitted(Arc::new(fitted));
        Ok(())
    }

    pub fn fitted(&self) -> Result<&Arc<TfidfVectorizer<Fitted>>> {
        match self {
            Self::Fitted(vectorizer) => Ok(vectorizer),
            Self::Unfit(_) => Err(FeatureError::NotFitted),
        }
    }

    pub fn transform<S: AsRef<str>>(&self, tokens: &[S]) -> Result<FeatureVector> {
        Ok(self.fitted()?.transform(tokens))
    }
}
