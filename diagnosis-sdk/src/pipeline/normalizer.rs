//! Symptom set to fixed-length feature vector
//!
//! The slot layout is a placeholder until a real scoring artifact ships its
//! own symptom mapping: catalog symptoms take fixed slots in catalog order,
//! every other id is hashed (FNV-1a, stable across processes) into a slot.
//! Colliding symptoms keep the larger score so the result never depends on
//! iteration order.

use serde::{Deserialize, Serialize};

use crate::symptoms::{SymptomCatalog, SymptomSet};

/// Fixed-length numeric encoding of a symptom set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureVector(Vec<f32>);

impl FeatureVector {
    /// All-zero vector of `len` features
    pub fn zeros(len: usize) -> Self {
        Self(vec![0.0; len])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    /// True when no symptom contributed to the vector
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|value| *value == 0.0)
    }
}

impl From<Vec<f32>> for FeatureVector {
    fn from(values: Vec<f32>) -> Self {
        Self(values)
    }
}

/// Builds feature vectors of one configured length
#[derive(Debug, Clone, Copy)]
pub struct Normalizer {
    feature_length: usize,
    catalog: &'static SymptomCatalog,
}

impl Normalizer {
    pub fn new(feature_length: usize) -> Self {
        Self::with_catalog(feature_length, SymptomCatalog::standard())
    }

    pub fn with_catalog(feature_length: usize, catalog: &'static SymptomCatalog) -> Self {
        Self {
            feature_length,
            catalog,
        }
    }

    pub fn feature_length(&self) -> usize {
        self.feature_length
    }

    /// Slot a symptom id writes to
    pub fn slot_for(&self, id: &str) -> usize {
        if self.feature_length == 0 {
            return 0;
        }
        match self.catalog.position(id) {
            Some(position) => position % self.feature_length,
            None => (fnv1a_64(id.as_bytes()) % self.feature_length as u64) as usize,
        }
    }

    /// Encode `symptoms`; the empty set yields the all-zero vector
    pub fn normalize(&self, symptoms: &SymptomSet) -> FeatureVector {
        let mut features = FeatureVector::zeros(self.feature_length);
        if self.feature_length == 0 {
            return features;
        }

        for symptom in symptoms {
            let slot = self.slot_for(&symptom.id);
            let score = symptom.severity.score();
            if score > features.0[slot] {
                features.0[slot] = score;
            }
        }

        features
    }
}

fn fnv1a_64(bytes: &[u8]) -> u64 {
    const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;

    bytes
        .iter()
        .fold(OFFSET_BASIS, |hash, byte| (hash ^ u64::from(*byte)).wrapping_mul(PRIME))
}
