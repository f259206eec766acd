//! Rule-based feature extractor.
//!
//! Counts distinct clinical-activity terms in a case-study narrative, one
//! lexicon per recognized attribute, and pulls out the patient's age and
//! gender when stated. No model calls; the same text always yields the same
//! map.
//!
//! Case studies submitted through the web form arrive as a JSON object
//! (`title`, `description`, `learning_outcomes`, ...). Its string fields are
//! joined and scanned as one narrative.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use super::error::PipelineError;
use super::grading::{
    IDENTIFICATION_OF_DIAGNOSES, MEDICATIONS_ADMINISTERED, PAIN_MANAGEMENT_STRATEGIES,
    PROCEDURES_PERFORMED,
};
use super::traits::FeatureExtractor;
use crate::models::{CaseStudy, FeatureMap, FeatureValue};

pub const AGE: &str = "Age";
pub const GENDER: &str = "Gender";

const MEDICATION_TERMS: &[&str] = &[
    "paracetamol", "acetaminophen", "ibuprofen", "diclofenac", "aspirin", "morphine",
    "tramadol", "fentanyl", "codeine", "amoxicillin", "ceftriaxone", "cefazolin",
    "vancomycin", "metronidazole", "ciprofloxacin", "gentamicin", "metformin", "insulin",
    "heparin", "enoxaparin", "warfarin", "clopidogrel", "furosemide", "digoxin",
    "amlodipine", "metoprolol", "atorvastatin", "nitroglycerin", "adrenaline", "epinephrine",
    "salbutamol", "ondansetron", "omeprazole", "pantoprazole", "ranitidine", "prednisolone",
    "hydrocortisone", "dexamethasone", "lorazepam", "diazepam", "oxytocin",
    "magnesium sulfate", "potassium chloride", "normal saline",
];

const PROCEDURE_TERMS: &[&str] = &[
    "intubation", "tracheostomy", "cannulation", "venipuncture", "catheterization",
    "catheterisation", "nasogastric tube", "chest tube", "suturing", "wound dressing",
    "debridement", "ecg", "electrocardiogram", "x-ray", "ct scan", "mri", "ultrasound",
    "biopsy", "endoscopy", "colonoscopy", "lumbar puncture", "blood culture",
    "blood transfusion", "dialysis", "nebulization", "nebulisation", "thoracentesis",
    "paracentesis", "appendectomy", "laparotomy", "caesarean section", "cesarean section",
    "cpr", "defibrillation",
];

const PAIN_MANAGEMENT_TERMS: &[&str] = &[
    "analgesia", "analgesic", "pain assessment", "pain score", "repositioning",
    "cold compress", "warm compress", "ice pack", "heat therapy", "massage",
    "deep breathing", "relaxation", "guided imagery", "distraction", "splinting",
    "elevation", "epidural", "nerve block", "acupressure", "music therapy",
];

const DIAGNOSIS_TERMS: &[&str] = &[
    "pneumonia", "hypertension", "diabetes", "sepsis", "asthma", "copd", "heart failure",
    "myocardial infarction", "angina", "stroke", "fracture", "appendicitis", "cholecystitis",
    "pancreatitis", "gastroenteritis", "cellulitis", "urinary tract infection",
    "tuberculosis", "meningitis", "malaria", "dengue", "anemia", "anaemia", "dehydration",
    "hypoglycemia", "hypoglycaemia", "deep vein thrombosis", "pulmonary embolism",
    "renal failure", "kidney injury", "pre-eclampsia", "preeclampsia", "epilepsy",
    "bronchiolitis", "covid-19",
];

static CATEGORY_PATTERNS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    vec![
        (MEDICATIONS_ADMINISTERED, lexicon_regex(MEDICATION_TERMS)),
        (PROCEDURES_PERFORMED, lexicon_regex(PROCEDURE_TERMS)),
        (PAIN_MANAGEMENT_STRATEGIES, lexicon_regex(PAIN_MANAGEMENT_TERMS)),
        (IDENTIFICATION_OF_DIAGNOSES, lexicon_regex(DIAGNOSIS_TERMS)),
    ]
});

static AGE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:(\d{1,3})[\s-]*(?:years?|yrs?)[\s-]*old|aged\s+(\d{1,3}))\b").unwrap()
});

static GENDER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(male|female|man|woman|boy|girl|gentleman|lady)\b").unwrap()
});

/// Oldest plausible age; larger numbers are treated as noise.
const MAX_AGE: u32 = 130;

fn lexicon_regex(terms: &[&str]) -> Regex {
    let alternation: Vec<String> = terms.iter().map(|t| regex::escape(t)).collect();
    Regex::new(&format!(r"(?i)\b(?:{})\b", alternation.join("|"))).unwrap()
}

/// Keyword-lexicon extractor.
pub struct KeywordFeatureExtractor;

impl KeywordFeatureExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for KeywordFeatureExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FeatureExtractor for KeywordFeatureExtractor {
    fn extract(&self, case_study: &CaseStudy) -> Result<FeatureMap, PipelineError> {
        let narrative = narrative_text(&case_study.text);
        if narrative.trim().is_empty() {
            return Err(PipelineError::ExtractionFailed {
                case_study_id: case_study.id,
                reason: "case study has no narrative text".into(),
            });
        }

        let mut features = FeatureMap::new();
        for (name, pattern) in CATEGORY_PATTERNS.iter() {
            let count = count_distinct_terms(pattern, &narrative);
            features.insert(name.to_string(), FeatureValue::from(count));
        }

        if let Some(age) = detect_age(&narrative) {
            features.insert(AGE.into(), FeatureValue::from(age));
        }
        if let Some(gender) = detect_gender(&narrative) {
            features.insert(GENDER.into(), FeatureValue::from(gender));
        }

        Ok(features)
    }
}

/// Number of different lexicon terms present (repeats count once).
fn count_distinct_terms(pattern: &Regex, text: &str) -> u32 {
    let found: HashSet<String> = pattern
        .find_iter(text)
        .map(|m| m.as_str().to_lowercase())
        .collect();
    found.len() as u32
}

fn detect_age(text: &str) -> Option<u32> {
    AGE_PATTERN.captures_iter(text).find_map(|caps| {
        caps.get(1)
            .or_else(|| caps.get(2))
            .and_then(|m| m.as_str().parse::<u32>().ok())
            .filter(|age| *age <= MAX_AGE)
    })
}

fn detect_gender(text: &str) -> Option<&'static str> {
    GENDER_PATTERN.captures(text).map(|caps| {
        match caps[1].to_lowercase().as_str() {
            "female" | "woman" | "girl" | "lady" => "female",
            _ => "male",
        }
    })
}

/// Plain text to scan. JSON-object submissions contribute their string fields.
fn narrative_text(raw: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(serde_json::Value::Object(fields)) => fields
            .values()
            .filter_map(|v| v.as_str())
            .collect::<Vec<_>>()
            .join("\n"),
        _ => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::grading;
    use crate::models::Grade;

    const SAMPLE: &str = "A 67-year-old female was admitted to the ward. She was diagnosed \
        with pneumonia, hypertension, diabetes and sepsis. Nursing staff administered \
        paracetamol, ceftriaxone, insulin, heparin and omeprazole. Procedures included an ECG, \
        a chest x-ray, IV cannulation, blood culture collection and urinary catheterization. \
        Pain was managed with repositioning, a cold compress and deep breathing exercises.";

    fn count(map: &FeatureMap, key: &str) -> f64 {
        map.get(key).and_then(|v| v.as_number()).unwrap_or(-1.0)
    }

    #[test]
    fn counts_each_category() {
        let features = KeywordFeatureExtractor::new()
            .extract(&CaseStudy::new(SAMPLE))
            .unwrap();

        assert_eq!(count(&features, MEDICATIONS_ADMINISTERED), 5.0);
        assert_eq!(count(&features, PROCEDURES_PERFORMED), 5.0);
        assert_eq!(count(&features, PAIN_MANAGEMENT_STRATEGIES), 3.0);
        assert_eq!(count(&features, IDENTIFICATION_OF_DIAGNOSES), 4.0);
        assert_eq!(grading::grade(&features), Grade::O);
    }

    #[test]
    fn demographics_are_extracted_but_not_scored() {
        let features = KeywordFeatureExtractor::new()
            .extract(&CaseStudy::new(SAMPLE))
            .unwrap();

        assert_eq!(features.get(AGE), Some(&FeatureValue::Number(67.0)));
        assert_eq!(features.get(GENDER), Some(&FeatureValue::Text("female".into())));
        assert_eq!(grading::feature_score(&features), 17.0);
    }

    #[test]
    fn repeated_terms_count_once() {
        let text = "Morphine given. Morphine repeated at 2am. MORPHINE again at 6am.";
        let features = KeywordFeatureExtractor::new()
            .extract(&CaseStudy::new(text))
            .unwrap();
        assert_eq!(count(&features, MEDICATIONS_ADMINISTERED), 1.0);
    }

    #[test]
    fn terms_match_on_word_boundaries() {
        // "ultrasound" must not match inside "ultrasounds", "stroke" not inside "strokes"
        let text = "She liked the ultrasounds exhibit after several strokes of luck.";
        let features = KeywordFeatureExtractor::new()
            .extract(&CaseStudy::new(text))
            .unwrap();
        assert_eq!(count(&features, PROCEDURES_PERFORMED), 0.0);
        assert_eq!(count(&features, IDENTIFICATION_OF_DIAGNOSES), 0.0);
    }

    #[test]
    fn all_recognized_keys_present_even_when_zero() {
        let features = KeywordFeatureExtractor::new()
            .extract(&CaseStudy::new("Routine observation shift, nothing notable."))
            .unwrap();
        for key in grading::RECOGNIZED_KEYS {
            assert_eq!(count(&features, key), 0.0, "{key}");
        }
        assert_eq!(grading::grade(&features), Grade::B);
    }

    #[test]
    fn empty_text_fails_extraction() {
        let case = CaseStudy::new("   \n ");
        let err = KeywordFeatureExtractor::new().extract(&case).unwrap_err();
        match err {
            PipelineError::ExtractionFailed { case_study_id, .. } => {
                assert_eq!(case_study_id, case.id)
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn json_form_submission_is_scanned() {
        let text = r#"{"title":"Post-op care","description":"Patient aged 45 recovering from appendectomy, given tramadol.","department":"Surgery","learning_outcomes":"Pain score charting"}"#;
        let features = KeywordFeatureExtractor::new()
            .extract(&CaseStudy::new(text))
            .unwrap();

        assert_eq!(count(&features, PROCEDURES_PERFORMED), 1.0);
        assert_eq!(count(&features, MEDICATIONS_ADMINISTERED), 1.0);
        assert_eq!(count(&features, PAIN_MANAGEMENT_STRATEGIES), 1.0);
        assert_eq!(features.get(AGE), Some(&FeatureValue::Number(45.0)));
    }

    #[test]
    fn json_without_text_fields_fails() {
        let case = CaseStudy::new(r#"{"score": 3}"#);
        assert!(KeywordFeatureExtractor::new().extract(&case).is_err());
    }

    #[test]
    fn implausible_age_ignored() {
        assert_eq!(detect_age("a 999 year old artefact"), None);
        assert_eq!(detect_age("a 4 yr old boy"), Some(4));
    }

    #[test]
    fn gender_normalized() {
        assert_eq!(detect_gender("The Gentleman presented"), Some("male"));
        assert_eq!(detect_gender("a young girl"), Some("female"));
        assert_eq!(detect_gender("the patient"), None);
    }
}
