//! Recommendation facade over the registry, dose parser and calculator.
//!
//! Patient parameters are passed per call; nothing is cached between calls,
//! so a single `Recommender` can be shared across threads.

use crate::{
    parse_adult_dose, recommend_dosage, DrugRegistry, PatientParameters, RecommendationResult,
};

/// Resolves drug names against a registry and computes dose estimates
#[derive(Clone, Copy, Debug)]
pub struct Recommender<'a> {
    registry: &'a DrugRegistry,
}

impl<'a> Recommender<'a> {
    pub fn new(registry: &'a DrugRegistry) -> Self {
        Self { registry }
    }

    /// Recommendation for a single drug name
    ///
    /// An unknown name yields [`RecommendationResult::NotFound`].
    pub fn recommend_for(&self, drug_name: &str, patient: &PatientParameters) -> RecommendationResult {
        let Some(drug) = self.registry.lookup(drug_name) else {
            return RecommendationResult::NotFound {
                name: drug_name.to_string(),
            };
        };

        let adult_dose_mg = parse_adult_dose(drug.adult_dose.as_deref());
        let recommendations = recommend_dosage(patient.age, patient.weight_kg, adult_dose_mg);

        tracing::debug!(
            "{}: baseline {} mg, {} recommendation(s)",
            drug.generic_name,
            adult_dose_mg,
            recommendations.len()
        );

        RecommendationResult::Found {
            drug: drug.clone(),
            adult_dose_mg,
            recommendations,
        }
    }

    /// One independent recommendation per selected name, in selection order
    ///
    /// No interaction analysis is performed between the drugs.
    pub fn recommend_for_each<S: AsRef<str>>(
        &self,
        drug_names: &[S],
        patient: &PatientParameters,
    ) -> Vec<RecommendationResult> {
        drug_names
            .iter()
            .map(|name| self.recommend_for(name.as_ref(), patient))
            .collect()
    }

    /// Recommendations for every registry drug found in free text
    pub fn recommend_for_text(
        &self,
        text: Option<&str>,
        patient: &PatientParameters,
    ) -> Vec<RecommendationResult> {
        self.registry
            .extract(text)
            .iter()
            .map(|drug| self.recommend_for(&drug.name, patient))
            .collect()
    }
}
