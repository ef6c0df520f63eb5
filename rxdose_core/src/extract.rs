//! Drug name extraction from free prescription text.
//!
//! Matching is unanchored, case-insensitive substring containment against
//! every registry name. There is no word-boundary check, so "Cortisone" is
//! reported for text mentioning only "Hydrocortisone".

use crate::{DrugRegistry, ExtractedDrug};

/// Example prescription text for demos
pub const SAMPLE_PRESCRIPTION: &str =
    "Metformin 500mg twice daily with meals\nLisinopril 10mg once daily\nAspirin 81mg daily";

/// Registry names that occur anywhere in `text`
///
/// Results follow registry order, not the order of appearance in the text.
/// Duplicate registry entries are each reported.
pub fn extract_drugs(registry: &DrugRegistry, text: Option<&str>) -> Vec<ExtractedDrug> {
    let text = match text {
        Some(t) if !t.is_empty() => t,
        _ => return Vec::new(),
    };

    let haystack = text.to_uppercase();
    let drugs: Vec<ExtractedDrug> = registry
        .records()
        .iter()
        .filter(|record| haystack.contains(&record.generic_name.to_uppercase()))
        .map(|record| ExtractedDrug {
            name: record.generic_name.clone(),
        })
        .collect();

    tracing::debug!("Extracted {} drug names from text", drugs.len());
    drugs
}

impl DrugRegistry {
    /// See [`extract_drugs`]
    pub fn extract(&self, text: Option<&str>) -> Vec<ExtractedDrug> {
        extract_drugs(self, text)
    }
}
