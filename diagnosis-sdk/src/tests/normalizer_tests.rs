//! Tests for symptom normalization
//!
//! The feature vector must depend only on the set's content, never on the
//! order symptoms were selected in.

#[cfg(test)]
mod tests {
    use crate::pipeline::{FeatureVector, Normalizer};
    use crate::symptoms::{Symptom, SymptomCatalog, SymptomSet, SymptomSeverity};

    fn set(symptoms: Vec<Symptom>) -> SymptomSet {
        SymptomSet::try_from_symptoms(symptoms).unwrap()
    }

    #[test]
    fn test_empty_set_is_zero_vector() {
        let features = Normalizer::new(100).normalize(&SymptomSet::new());
        assert_eq!(features, FeatureVector::zeros(100));
        assert!(features.is_zero());
        assert_eq!(features.len(), 100);
    }

    #[test]
    fn test_same_set_same_vector() {
        let normalizer = Normalizer::new(100);
        let symptoms = set(vec![
            Symptom::new("1", "Fever", SymptomSeverity::Severe),
            Symptom::new("2", "Cough", SymptomSeverity::Mild),
        ]);

        assert_eq!(normalizer.normalize(&symptoms), normalizer.normalize(&symptoms.clone()));
    }

    #[test]
    fn test_order_independence() {
        let normalizer = Normalizer::new(100);
        let forward = set(vec![
            Symptom::new("1", "Fever", SymptomSeverity::Moderate),
            Symptom::new("3", "Headache", SymptomSeverity::Severe),
            Symptom::new("rash", "Rash", SymptomSeverity::Mild),
        ]);
        let backward = set(vec![
            Symptom::new("rash", "Rash", SymptomSeverity::Mild),
            Symptom::new("3", "Headache", SymptomSeverity::Severe),
            Symptom::new("1", "Fever", SymptomSeverity::Moderate),
        ]);

        assert_eq!(normalizer.normalize(&forward), normalizer.normalize(&backward));
    }

    #[test]
    fn test_severity_scores_land_in_catalog_slots() {
        let normalizer = Normalizer::new(100);
        let symptoms = set(vec![
            Symptom::new("1", "Fever", SymptomSeverity::Severe),
            Symptom::new("2", "Cough", SymptomSeverity::Mild),
            Symptom::new("3", "Headache", SymptomSeverity::Moderate),
            Symptom::new("4", "Fatigue", SymptomSeverity::Unrecognized("exhausting".to_string())),
        ]);

        let features = normalizer.normalize(&symptoms);
        let values = features.as_slice();
        assert_eq!(values[0], 1.0);
        assert_eq!(values[1], 0.3);
        assert_eq!(values[2], 0.6);
        assert_eq!(values[3], 0.3);
        assert_eq!(values.iter().filter(|v| **v != 0.0).count(), 4);
    }

    #[test]
    fn test_collisions_keep_the_larger_score() {
        // With a single slot every symptom collides
        let normalizer = Normalizer::new(1);
        let symptoms = set(vec![
            Symptom::new("1", "Fever", SymptomSeverity::Mild),
            Symptom::new("2", "Cough", SymptomSeverity::Severe),
            Symptom::new("x", "Other", SymptomSeverity::Moderate),
        ]);

        assert_eq!(normalizer.normalize(&symptoms).as_slice(), &[1.0_f32]);
    }

    #[test]
    fn test_unknown_ids_are_stable() {
        let a = Normalizer::new(100);
        let b = Normalizer::with_catalog(100, SymptomCatalog::standard());
        assert_eq!(a.slot_for("chest-pain"), b.slot_for("chest-pain"));
        assert_eq!(a.feature_length(), 100);
    }
}
