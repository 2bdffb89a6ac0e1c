use crate::ValidationError;
use crate::condition::ConditionSet;
use crate::ids::TrialId;

/// Structured eligibility criteria of a trial.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Criteria {
    min_age: u32,
    max_age: u32,
    required_conditions: ConditionSet,
    excluded_conditions: ConditionSet,
}

impl Criteria {
    pub fn new(
        min_age: u32,
        max_age: u32,
        required_conditions: ConditionSet,
        excluded_conditions: ConditionSet,
    ) -> Result<Self, ValidationError> {
        if min_age > max_age {
            return Err(ValidationError::AgeRange { min_age, max_age });
        }
        Ok(Self {
            min_age,
            max_age,
            required_conditions,
            excluded_conditions,
        })
    }

    pub fn min_age(&self) -> u32 {
        self.min_age
    }

    pub fn max_age(&self) -> u32 {
        self.max_age
    }

    pub fn required_conditions(&self) -> &ConditionSet {
        &self.required_conditions
    }

    pub fn excluded_conditions(&self) -> &ConditionSet {
        &self.excluded_conditions
    }

    pub fn age_in_range(&self, age: u32) -> bool {
        (self.min_age..=self.max_age).contains(&age)
    }
}

/// A clinical trial: free-text eligibility plus structured criteria.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trial {
    id: TrialId,
    title: Option<String>,
    eligibility_text: String,
    criteria: Criteria,
}

impl Trial {
    pub fn new(id: TrialId, eligibility_text: impl Into<String>, criteria: Criteria) -> Self {
        Self {
            id,
            title: None,
            eligibility_text: eligibility_text.into(),
            criteria,
        }
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn id(&self) -> &TrialId {
        &self.id
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn eligibility_text(&self) -> &str {
        &self.eligibility_text
    }

    pub fn criteria(&self) -> &Criteria {
        &self.criteria
    }
}
