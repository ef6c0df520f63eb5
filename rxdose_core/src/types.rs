//! Core domain types for the dosage recommendation engine.
//!
//! This module defines the fundamental types used throughout the system:
//! - Drug records as loaded from the registry
//! - Patient parameters supplied per request
//! - Dosing rules and their computed recommendations
//! - Extraction and recommendation results

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

// ============================================================================
// Drug Types
// ============================================================================

/// One row of the drug registry
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DrugRecord {
    pub generic_name: String,
    pub drug_class: Option<String>,
    pub common_uses: Option<String>,
    pub side_effects: Option<String>,
    pub contraindications: Option<String>,
    /// Free-text adult dose, e.g. "2-10 mg" or "500mg twice daily"
    pub adult_dose: Option<String>,
}

impl DrugRecord {
    /// Create a record with only a generic name set.
    pub fn new(generic_name: impl Into<String>) -> Self {
        Self {
            generic_name: generic_name.into(),
            drug_class: None,
            common_uses: None,
            side_effects: None,
            contraindications: None,
            adult_dose: None,
        }
    }

    pub fn with_adult_dose(mut self, dose: impl Into<String>) -> Self {
        self.adult_dose = Some(dose.into());
        self
    }
}

/// A registry drug name found in free text
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExtractedDrug {
    pub name: String,
}

// ============================================================================
// Patient Types
// ============================================================================

/// Per-request patient parameters
///
/// Values are taken as given. Out-of-range values suppress the affected
/// dosing rule instead of failing the request.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct PatientParameters {
    /// Age in years
    pub age: f64,
    /// Body weight in kilograms
    pub weight_kg: f64,
}

impl PatientParameters {
    pub fn new(age: f64, weight_kg: f64) -> Self {
        Self { age, weight_kg }
    }
}

// ============================================================================
// Dosage Types
// ============================================================================

/// Pediatric dose scaling heuristic
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DosingRule {
    /// Weight-based: (weight / 70 kg) x adult dose
    Clark,
    /// Age-based: (age / (age + 12)) x adult dose
    Young,
}

impl DosingRule {
    /// Human-readable label used when rendering recommendations
    pub fn label(&self) -> &'static str {
        match self {
            DosingRule::Clark => "Clark's Rule (weight-based)",
            DosingRule::Young => "Young's Rule (age-based)",
        }
    }
}

impl fmt::Display for DosingRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Ordered mapping from dosing rule to dose in mg
///
/// Holds zero, one or two entries. When both are present Clark's Rule
/// always precedes Young's Rule.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DosageRecommendation {
    entries: Vec<(DosingRule, f64)>,
}

impl DosageRecommendation {
    pub(crate) fn push(&mut self, rule: DosingRule, dose_mg: f64) {
        self.entries.push((rule, dose_mg));
    }

    /// Dose for a rule, if that rule's preconditions held
    pub fn get(&self, rule: DosingRule) -> Option<f64> {
        self.entries
            .iter()
            .find(|(r, _)| *r == rule)
            .map(|(_, dose)| *dose)
    }

    pub fn iter(&self) -> impl Iterator<Item = (DosingRule, f64)> + '_ {
        self.entries.iter().copied()
    }

    pub fn rules(&self) -> Vec<DosingRule> {
        self.entries.iter().map(|(rule, _)| *rule).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for DosageRecommendation {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (rule, dose) in &self.entries {
            map.serialize_entry(rule.label(), dose)?;
        }
        map.end()
    }
}

// ============================================================================
// Recommendation Types
// ============================================================================

/// Outcome of a single-drug recommendation request
#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RecommendationResult {
    /// Drug resolved; metadata plus whatever estimates could be computed
    Found {
        drug: DrugRecord,
        adult_dose_mg: f64,
        recommendations: DosageRecommendation,
    },
    /// Registry lookup missed
    NotFound { name: String },
}

impl RecommendationResult {
    /// The name this result refers to (registry spelling when found)
    pub fn name(&self) -> &str {
        match self {
            RecommendationResult::Found { drug, .. } => &drug.generic_name,
            RecommendationResult::NotFound { name } => name,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, RecommendationResult::Found { .. })
    }

    pub fn recommendations(&self) -> Option<&DosageRecommendation> {
        match self {
            RecommendationResult::Found {
                recommendations, ..
            } => Some(recommendations),
            RecommendationResult::NotFound { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recommendation_serializes_in_rule_order() {
        let mut recs = DosageRecommendation::default();
        recs.push(DosingRule::Clark, 50.0);
        recs.push(DosingRule::Young, 33.33);

        let json = serde_json::to_string(&recs).unwrap();
        assert_eq!(
            json,
            r#"{"Clark's Rule (weight-based)":50.0,"Young's Rule (age-based)":33.33}"#
        );
    }

    #[test]
    fn test_not_found_result_serializes_with_status() {
        let result = RecommendationResult::NotFound {
            name: "Unobtainium".into(),
        };
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["status"], "not_found");
        assert_eq!(value["name"], "Unobtainium");
        assert!(!result.is_found());
        assert!(result.recommendations().is_none());
    }

    #[test]
    fn test_get_missing_rule() {
        let mut recs = DosageRecommendation::default();
        recs.push(DosingRule::Young, 10.0);
        assert_eq!(recs.get(DosingRule::Young), Some(10.0));
        assert_eq!(recs.get(DosingRule::Clark), None);
        assert_eq!(recs.rules(), vec![DosingRule::Young]);
    }
}
