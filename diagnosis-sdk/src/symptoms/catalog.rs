//! Static reference list of symptoms offered on the intake screen

use super::{Symptom, SymptomSeverity};

/// One selectable symptom with its default severity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub id: &'static str,
    pub name: &'static str,
    pub default_severity: SymptomSeverity,
    /// (language code, display name)
    pub localized_names: &'static [(&'static str, &'static str)],
}

impl CatalogEntry {
    /// A fresh symptom record at the default severity
    pub fn to_symptom(&self) -> Symptom {
        self.localized_names.iter().fold(
            Symptom::new(self.id, self.name, self.default_severity.clone()),
            |symptom, (language, name)| symptom.with_localized_name(*language, *name),
        )
    }

    /// A fresh symptom record at a caller-chosen severity
    pub fn to_symptom_with(&self, severity: SymptomSeverity) -> Symptom {
        Symptom {
            severity,
            ..self.to_symptom()
        }
    }
}

const ENTRIES: &[CatalogEntry] = &[
    CatalogEntry {
        id: "1",
        name: "Fever",
        default_severity: SymptomSeverity::Moderate,
        localized_names: &[("hi", "बुखार"), ("bn", "জ্বর"), ("te", "జ్వరం"), ("ta", "காய்ச்சல்")],
    },
    CatalogEntry {
        id: "2",
        name: "Cough",
        default_severity: SymptomSeverity::Mild,
        localized_names: &[("hi", "खांसी"), ("bn", "কাশি"), ("te", "దగ్గు"), ("ta", "இருமல்")],
    },
    CatalogEntry {
        id: "3",
        name: "Headache",
        default_severity: SymptomSeverity::Moderate,
        localized_names: &[("hi", "सिरदर्द"), ("bn", "মাথাব্যথা"), ("te", "తలనొప్పి"), ("ta", "தலைவலி")],
    },
    CatalogEntry {
        id: "4",
        name: "Fatigue",
        default_severity: SymptomSeverity::Mild,
        localized_names: &[("hi", "थकान"), ("bn", "ক্লান্তি"), ("te", "అలసట"), ("ta", "சோர்வு")],
    },
    CatalogEntry {
        id: "5",
        name: "Body Pain",
        default_severity: SymptomSeverity::Moderate,
        localized_names: &[("hi", "शरीर दर्द"), ("bn", "শরীর ব্যথা"), ("te", "ఒళ్ళు నొప్పులు"), ("ta", "உடல் வலி")],
    },
];

/// The kiosk's built-in symptom catalog
#[derive(Debug)]
pub struct SymptomCatalog {
    entries: &'static [CatalogEntry],
}

static STANDARD: SymptomCatalog = SymptomCatalog { entries: ENTRIES };

impl SymptomCatalog {
    /// The standard catalog shown on the intake form
    pub fn standard() -> &'static SymptomCatalog {
        &STANDARD
    }

    pub fn entries(&self) -> &'static [CatalogEntry] {
        self.entries
    }

    pub fn get(&self, id: &str) -> Option<&'static CatalogEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    /// Fixed position of `id` in the catalog, used as its feature slot
    pub fn position(&self, id: &str) -> Option<usize> {
        self.entries.iter().position(|entry| entry.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
