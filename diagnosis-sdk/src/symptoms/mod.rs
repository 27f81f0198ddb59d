//! Symptom records and the per-session symptom set

mod catalog;
pub use catalog::{CatalogEntry, SymptomCatalog};

use std::collections::btree_map::{self, BTreeMap};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DiagnosisError;

/// Patient-reported severity of a single symptom
///
/// Known labels match case-insensitively. Anything else is kept as
/// [`SymptomSeverity::Unrecognized`] with the caller's label, so a record
/// serializes back exactly as it came in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SymptomSeverity {
    Mild,
    Moderate,
    Severe,
    /// Any label the intake form did not recognize
    Unrecognized(String),
}

impl SymptomSeverity {
    /// Score fed into the feature vector; unrecognized labels score as mild
    pub fn score(&self) -> f32 {
        match self {
            SymptomSeverity::Mild => 0.3,
            SymptomSeverity::Moderate => 0.6,
            SymptomSeverity::Severe => 1.0,
            SymptomSeverity::Unrecognized(_) => 0.3,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            SymptomSeverity::Mild => "mild",
            SymptomSeverity::Moderate => "moderate",
            SymptomSeverity::Severe => "severe",
            SymptomSeverity::Unrecognized(label) => label,
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, SymptomSeverity::Unrecognized(_))
    }
}

impl fmt::Display for SymptomSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for SymptomSeverity {
    fn from(label: String) -> Self {
        match label.trim().to_lowercase().as_str() {
            "mild" => SymptomSeverity::Mild,
            "moderate" => SymptomSeverity::Moderate,
            "severe" => SymptomSeverity::Severe,
            _ => SymptomSeverity::Unrecognized(label),
        }
    }
}

impl From<SymptomSeverity> for String {
    fn from(severity: SymptomSeverity) -> Self {
        match severity {
            SymptomSeverity::Unrecognized(label) => label,
            known => known.as_str().to_string(),
        }
    }
}

impl FromStr for SymptomSeverity {
    type Err = std::convert::Infallible;

    /// Never fails: unknown labels become [`SymptomSeverity::Unrecognized`]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(SymptomSeverity::from(s.to_string()))
    }
}

/// A single reported symptom
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Symptom {
    /// Unique within a session
    pub id: String,

    pub name: String,

    pub severity: SymptomSeverity,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Display names keyed by language code
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub localized_names: BTreeMap<String, String>,
}

impl Symptom {
    pub fn new(id: impl Into<String>, name: impl Into<String>, severity: SymptomSeverity) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            severity,
            duration: None,
            description: None,
            localized_names: BTreeMap::new(),
        }
    }

    pub fn with_duration(mut self, duration: impl Into<String>) -> Self {
        self.duration = Some(duration.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_localized_name(mut self, language: impl Into<String>, name: impl Into<String>) -> Self {
        self.localized_names.insert(language.into(), name.into());
        self
    }

    /// Name in `language`, falling back to the canonical name
    pub fn display_name(&self, language: &str) -> &str {
        self.localized_names
            .get(language)
            .map(String::as_str)
            .unwrap_or(&self.name)
    }
}

/// The symptoms selected in one session, keyed (and ordered) by id
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(into = "Vec<Symptom>", try_from = "Vec<Symptom>")]
pub struct SymptomSet {
    symptoms: BTreeMap<String, Symptom>,
}

impl SymptomSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from a list, rejecting duplicate ids
    pub fn try_from_symptoms<I>(symptoms: I) -> crate::Result<Self>
    where
        I: IntoIterator<Item = Symptom>,
    {
        let mut set = Self::new();
        for symptom in symptoms {
            let id = symptom.id.clone();
            if !set.insert(symptom) {
                return Err(DiagnosisError::validation(format!("duplicate symptom id '{}'", id)));
            }
        }
        Ok(set)
    }

    /// Add a symptom; returns `false` and leaves the set untouched if the id is taken
    pub fn insert(&mut self, symptom: Symptom) -> bool {
        match self.symptoms.entry(symptom.id.clone()) {
            btree_map::Entry::Occupied(_) => false,
            btree_map::Entry::Vacant(slot) => {
                slot.insert(symptom);
                true
            }
        }
    }

    pub fn remove(&mut self, id: &str) -> Option<Symptom> {
        self.symptoms.remove(id)
    }

    pub fn get(&self, id: &str) -> Option<&Symptom> {
        self.symptoms.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.symptoms.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.symptoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symptoms.is_empty()
    }

    /// Symptoms in id order
    pub fn iter(&self) -> impl Iterator<Item = &Symptom> + '_ {
        self.symptoms.values()
    }

    /// Canonical names in id order, as sent to the remote backend
    pub fn names(&self) -> Vec<String> {
        self.iter().map(|symptom| symptom.name.clone()).collect()
    }
}

impl From<SymptomSet> for Vec<Symptom> {
    fn from(set: SymptomSet) -> Self {
        set.symptoms.into_values().collect()
    }
}

impl TryFrom<Vec<Symptom>> for SymptomSet {
    type Error = DiagnosisError;

    fn try_from(symptoms: Vec<Symptom>) -> Result<Self, Self::Error> {
        SymptomSet::try_from_symptoms(symptoms)
    }
}

impl<'a> IntoIterator for &'a SymptomSet {
    type Item = &'a Symptom;
    type IntoIter = btree_map::Values<'a, String, Symptom>;

    fn into_iter(self) -> Self::IntoIter {
        self.symptoms.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_severity_deserializes_permissively() {
        let symptom: Symptom =
            serde_json::from_str(r#"{"id": "9", "name": "Chills", "severity": "unbearable"}"#).unwrap();
        assert_eq!(symptom.severity, SymptomSeverity::Unrecognized("unbearable".to_string()));
        assert!(!symptom.severity.is_recognized());
        assert_eq!(symptom.severity.score(), 0.3);
        assert_eq!("SEVERE".parse::<SymptomSeverity>().unwrap(), SymptomSeverity::Severe);
    }

    #[test]
    fn test_unrecognized_severity_label_survives_round_trip() {
        let raw = r#"{"id":"9","name":"Chills","severity":"unbearable"}"#;
        let symptom: Symptom = serde_json::from_str(raw).unwrap();
        assert_eq!(serde_json::to_string(&symptom).unwrap(), raw);
        assert_eq!(symptom.severity.to_string(), "unbearable");

        let set: SymptomSet = serde_json::from_str(&format!("[{}]", raw)).unwrap();
        let json = serde_json::to_value(&set).unwrap();
        assert_eq!(json[0]["severity"], "unbearable");
    }

    #[test]
    fn test_insert_refuses_duplicate_ids() {
        let mut set = SymptomSet::new();
        assert!(set.insert(Symptom::new("1", "Fever", SymptomSeverity::Moderate)));
        assert!(!set.insert(Symptom::new("1", "Fever again", SymptomSeverity::Severe)));
        assert_eq!(set.len(), 1);
        assert_eq!(set.get("1").unwrap().name, "Fever");
    }

    #[test]
    fn test_duplicate_ids_in_list_are_rejected() {
        let err = SymptomSet::try_from_symptoms(vec![
            Symptom::new("1", "Fever", SymptomSeverity::Moderate),
            Symptom::new("1", "Fever", SymptomSeverity::Mild),
        ])
        .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_set_serializes_as_array_in_id_order() {
        let set = SymptomSet::try_from_symptoms(vec![
            Symptom::new("2", "Cough", SymptomSeverity::Mild),
            Symptom::new("1", "Fever", SymptomSeverity::Moderate).with_duration("2 days"),
        ])
        .unwrap();

        let json = serde_json::to_value(&set).unwrap();
        assert_eq!(json[0]["id"], "1");
        assert_eq!(json[0]["duration"], "2 days");
        assert_eq!(json[1]["name"], "Cough");
        assert!(json[1].get("localizedNames").is_none());

        let back: SymptomSet = serde_json::from_value(json).unwrap();
        assert_eq!(back, set);
    }

    #[test]
    fn test_display_name_falls_back_to_canonical() {
        let fever = Symptom::new("1", "Fever", SymptomSeverity::Moderate).with_localized_name("hi", "बुखार");
        assert_eq!(fever.display_name("hi"), "बुखार");
        assert_eq!(fever.display_name("ta"), "Fever");
    }
}
