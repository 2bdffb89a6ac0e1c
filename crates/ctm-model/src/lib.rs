pub mod condition;
pub mod error;
pub mod ids;
pub mod label;
pub mod patient;
pub mod records;
pub mod trial;

pub use condition::{ConditionName, ConditionSet, condition_set, join_conditions};
pub use error::{Result, ValidationError};
pub use ids::{PatientId, TrialId, pair_id};
pub use label::{Label, Labeled};
pub use patient::{Gender, Patient, PatientBuilder};
pub use records::{CriteriaRecord, PairRecord, PatientMetadata, PatientRecord, TrialRecord};
pub use trial::{Criteria, Trial};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_serializes_as_integer() {
        let json = serde_json::to_string(&Label::Eligible).expect("serialize label");
        assert_eq!(json, "1");
        let round: Label = serde_json::from_str("0").expect("deserialize label");
        assert_eq!(round, Label::NotEligible);
        assert!(serde_json::from_str::<Label>("2").is_err());
    }

    #[test]
    fn criteria_reject_inverted_range() {
        let err = Criteria::new(65, 18, ConditionSet::new(), ConditionSet::new()).unwrap_err();
        assert_eq!(
            err,
            ValidationError::AgeRange {
                min_age: 65,
                max_age: 18
            }
        );
    }
}
