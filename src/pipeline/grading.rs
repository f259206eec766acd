//! Grading Rule Engine.
//!
//! Sums the four recognized clinical-activity counts and maps the score onto
//! three ordered bands:
//!
//! ```text
//!   score < 8        → B
//!   8 ≤ score ≤ 15   → A
//!   score > 15       → O
//! ```
//!
//! Pure and total: attributes outside the recognized set are ignored, missing
//! or non-numeric recognized attributes count as zero.

use crate::models::{FeatureMap, Grade};

pub const MEDICATIONS_ADMINISTERED: &str = "Medications Administered";
pub const PROCEDURES_PERFORMED: &str = "Procedures Performed";
pub const PAIN_MANAGEMENT_STRATEGIES: &str = "Pain Management Strategies";
pub const IDENTIFICATION_OF_DIAGNOSES: &str = "Identification of Diagnoses";

/// Attributes that contribute to the score.
pub const RECOGNIZED_KEYS: [&str; 4] = [
    MEDICATIONS_ADMINISTERED,
    PROCEDURES_PERFORMED,
    PAIN_MANAGEMENT_STRATEGIES,
    IDENTIFICATION_OF_DIAGNOSES,
];

/// Lower bound of the `A` band (inclusive).
pub const A_BAND_MIN: f64 = 8.0;
/// Upper bound of the `A` band (inclusive); anything above grades `O`.
pub const A_BAND_MAX: f64 = 15.0;

/// Sum of the recognized attributes.
pub fn feature_score(features: &FeatureMap) -> f64 {
    RECOGNIZED_KEYS
        .iter()
        .filter_map(|key| features.get(*key))
        .filter_map(|value| value.as_number())
        .filter(|n| n.is_finite())
        .sum()
}

/// Band for a score.
pub fn grade_for_score(score: f64) -> Grade {
    if score > A_BAND_MAX {
        Grade::O
    } else if score >= A_BAND_MIN {
        Grade::A
    } else {
        Grade::B
    }
}

/// Grade a feature map.
pub fn grade(features: &FeatureMap) -> Grade {
    grade_for_score(feature_score(features))
}

impl Grade {
    pub fn for_score(score: f64) -> Self {
        grade_for_score(score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FeatureValue;

    fn features(counts: [u32; 4]) -> FeatureMap {
        RECOGNIZED_KEYS
            .iter()
            .zip(counts)
            .map(|(key, n)| (key.to_string(), FeatureValue::from(n)))
            .collect()
    }

    #[test]
    fn band_boundaries() {
        assert_eq!(grade_for_score(16.0), Grade::O);
        assert_eq!(grade_for_score(15.0), Grade::A);
        assert_eq!(grade_for_score(8.0), Grade::A);
        assert_eq!(grade_for_score(7.0), Grade::B);
        assert_eq!(grade_for_score(0.0), Grade::B);
        assert_eq!(Grade::for_score(16.0), Grade::O);
    }

    #[test]
    fn fractional_scores_fall_in_one_band() {
        assert_eq!(grade_for_score(15.5), Grade::O);
        assert_eq!(grade_for_score(7.999), Grade::B);
        assert_eq!(grade_for_score(8.0001), Grade::A);
    }

    #[test]
    fn empty_map_grades_b() {
        assert_eq!(feature_score(&FeatureMap::new()), 0.0);
        assert_eq!(grade(&FeatureMap::new()), Grade::B);
    }

    #[test]
    fn sums_only_recognized_keys() {
        let mut map = features([5, 5, 3, 4]);
        map.insert("Age".into(), 82u32.into());
        map.insert("Gender".into(), "male".into());
        map.insert("Vitals Recorded".into(), 40u32.into());

        assert_eq!(feature_score(&map), 17.0);
        assert_eq!(grade(&map), Grade::O);
    }

    #[test]
    fn missing_keys_count_as_zero() {
        let mut map = FeatureMap::new();
        map.insert(MEDICATIONS_ADMINISTERED.into(), 4u32.into());
        map.insert(PROCEDURES_PERFORMED.into(), 4u32.into());
        assert_eq!(grade(&map), Grade::A);
    }

    #[test]
    fn text_value_under_recognized_key_counts_as_zero() {
        let mut map = features([3, 3, 1, 0]);
        map.insert(IDENTIFICATION_OF_DIAGNOSES.into(), "several".into());
        assert_eq!(feature_score(&map), 7.0);
        assert_eq!(grade(&map), Grade::B);
    }

    #[test]
    fn non_finite_values_are_ignored() {
        let mut map = features([2, 2, 2, 2]);
        map.insert(PAIN_MANAGEMENT_STRATEGIES.into(), f64::NAN.into());
        assert_eq!(feature_score(&map), 6.0);
        assert_eq!(grade(&map), Grade::B);
    }

    #[test]
    fn every_integer_score_maps_to_exactly_one_band() {
        for score in 0..=40u32 {
            let g = grade_for_score(f64::from(score));
            let expected = match score {
                0..=7 => Grade::B,
                8..=15 => Grade::A,
                _ => Grade::O,
            };
            assert_eq!(g, expected, "score {score}");
        }
    }

    #[test]
    fn grading_is_deterministic() {
        let map = features([4, 2, 1, 1]);
        let first = grade(&map);
        for _ in 0..10 {
            assert_eq!(grade(&map), first);
        }
        assert_eq!(first, Grade::A);
    }
}
