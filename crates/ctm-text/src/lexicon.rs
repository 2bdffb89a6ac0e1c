//! Word lists used by the anonymizer and the preprocessor.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

/// Capitalized words that are never treated as person names.
const KNOWN_CAPITALIZED: &[&str] = &[
    // narrative and grammar
    "A", "About", "Adult", "Adults", "After", "Age", "Aged", "All", "Also", "An", "And", "Any",
    "Are", "As", "At", "Be", "Before", "Both", "But", "By", "Can", "Case", "Currently", "Denies",
    "Diagnosed", "Diagnosis", "Does", "During", "Each", "Either", "Eligible", "Eligibility",
    "Exclusion", "Excluded", "Female", "Following", "For", "From", "Had", "Has", "Have", "He",
    "Her", "His", "History", "However", "If", "In", "Inclusion", "Is", "It", "Its", "Known",
    "Male", "Man", "May", "Men", "Must", "Neither", "No", "None", "Nor", "Not", "Of", "Old", "On",
    "Only", "Or", "Other", "Participant", "Participants", "Patient", "Patients", "Person",
    "Presents", "Presented", "Prior", "Recent", "Reports", "Required", "She", "Should", "Since",
    "Study", "Subject", "Subjects", "That", "The", "Their", "There", "These", "They", "This",
    "Those", "To", "Trial", "Under", "Up", "Was", "Were", "When", "Which", "While", "Who", "With",
    "Within", "Without", "Woman", "Women", "Year", "Years", "Yes",
    // titles and charting verbs
    "Admitted", "Advised", "Call", "Called", "Complains", "Contact", "Discharged", "Doctor", "Dr",
    "Followed", "Miss", "Mr", "Mrs", "Ms", "Noted", "Nurse", "Plan", "Please", "Prof", "Referred",
    "Returned", "Returns", "Saw", "Seen", "Today", "Treated", "Visit", "Visited",
    // calendar
    "January", "February", "March", "April", "June", "July", "August", "September", "October",
    "November", "December", "Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday",
    "Sunday",
    // clinical vocabulary that is often capitalized
    "Acute", "Alzheimer", "Anxiety", "Arthritis", "Asthma", "Autism", "Autoimmune", "Bipolar",
    "Bronchitis", "Cancer", "Cardiovascular", "Chronic", "Clinic", "Condition", "Conditions",
    "Constipation", "Crohn", "Depression", "Diabetes", "Diarrhea", "Disease", "Diseases",
    "Disorder", "Disorders", "Dizziness", "Down", "Epilepsy", "Fatigue", "Heart", "Hepatitis",
    "Hodgkin", "Hospital", "Hyperlipidemia", "Hypertension", "Infection", "Infections", "Kidney",
    "Liver", "Migraine", "Multiple", "Nausea", "Obesity", "Osteoarthritis", "Osteoporosis", "Pain",
    "Parkinson", "Pneumonia", "Schizophrenia", "Sclerosis", "Severe", "Sinus", "Stage", "Syndrome",
    "Thyroid", "Tuberculosis", "Type", "Vitamin", "Vomiting",
];

/// English stopwords removed before vectorization.
const STOPWORDS: &[&str] = &[
    "about", "above", "after", "again", "against", "all", "also", "and", "any", "are", "because",
    "been", "before", "being", "below", "between", "both", "but", "can", "could", "did", "does",
    "doing", "down", "during", "each", "either", "few", "for", "from", "further", "had", "has",
    "have", "having", "her", "here", "hers", "herself", "him", "himself", "his", "how", "into",
    "its", "itself", "just", "may", "might", "more", "most", "must", "neither", "nor", "not",
    "now", "off", "once", "only", "other", "ought", "our", "ours", "ourselves", "out", "over",
    "own", "same", "she", "should", "since", "some", "such", "than", "that", "the", "their",
    "theirs", "them", "themselves", "then", "there", "these", "they", "this", "those", "through",
    "too", "under", "until", "upon", "very", "was", "were", "what", "when", "where", "which",
    "while", "who", "whom", "why", "will", "with", "within", "without", "would", "yet", "you",
    "your", "yours", "yourself",
];

/// Irregular forms mapped straight to their lemma.
const IRREGULAR_LEMMAS: &[(&str, &str)] = &[
    ("adults", "adult"),
    ("children", "child"),
    ("diagnosed", "diagnose"),
    ("diagnoses", "diagnosis"),
    ("feet", "foot"),
    ("men", "man"),
    ("mice", "mouse"),
    ("teeth", "tooth"),
    ("women", "woman"),
    ("years", "year"),
];

/// Words ending in `s` that are already their own lemma.
const INVARIANT_PLURALS: &[&str] = &[
    "aids", "diabetes", "herpes", "measles", "mumps", "pcos", "rabies", "scabies", "series",
    "species", "status",
];

static KNOWN_CAPITALIZED_SET: LazyLock<BTreeSet<&'static str>> =
    LazyLock::new(|| KNOWN_CAPITALIZED.iter().copied().collect());

static STOPWORD_SET: LazyLock<BTreeSet<&'static str>> =
    LazyLock::new(|| STOPWORDS.iter().copied().collect());

static IRREGULAR_MAP: LazyLock<BTreeMap<&'static str, &'static str>> =
    LazyLock::new(|| IRREGULAR_LEMMAS.iter().copied().collect());

static INVARIANT_SET: LazyLock<BTreeSet<&'static str>> =
    LazyLock::new(|| INVARIANT_PLURALS.iter().copied().collect());

pub fn is_known_capitalized(word: &str) -> bool {
    KNOWN_CAPITALIZED_SET.contains(word)
}

pub fn is_stopword(token: &str) -> bool {
    STOPWORD_SET.contains(token)
}

pub(crate) fn irregular_lemma(token: &str) -> Option<&'static str> {
    IRREGULAR_MAP.get(token).copied()
}

pub(crate) fn is_invariant_plural(token: &str) -> bool {
    INVARIANT_SET.contains(token)
}
