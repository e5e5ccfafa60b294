//! Stage-1 screening.
//!
//! Runs the three stage-1 classifiers over a vitals record and ranks the
//! diseases by positive-class probability.

use crate::disease::Disease;
use crate::error::ModelError;
use crate::model::Stage;
use crate::records::VitalsRecord;
use crate::registry::ModelRegistry;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::sync::Arc;

/// A disease and its stage-1 probability.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RankedDisease {
    pub disease: Disease,
    pub probability: f64,
}

/// Outcome of stage-1 screening.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScreeningResult {
    /// The highest-probability disease; ties go to the earliest in canonical order.
    pub top_disease: Disease,
    /// All three diseases, sorted by descending probability (stable on ties).
    pub ranking: Vec<RankedDisease>,
}

impl ScreeningResult {
    /// Build a result from per-disease scores given in canonical order.
    pub fn from_scores(scores: [(Disease, f64); 3]) -> Self {
        let mut top = scores[0];
        for candidate in &scores[1..] {
            if candidate.1 > top.1 {
                top = *candidate;
            }
        }

        let mut ranking: Vec<RankedDisease> = scores
            .iter()
            .map(|&(disease, probability)| RankedDisease {
                disease,
                probability,
            })
            .collect();
        // Same comparison as the argmax above, so -0.0 and 0.0 tie in both.
        ranking.sort_by(|a, b| {
            b.probability
                .partial_cmp(&a.probability)
                .unwrap_or(Ordering::Equal)
        });

        Self {
            top_disease: top.0,
            ranking,
        }
    }

    pub fn probability(&self, disease: Disease) -> Option<f64> {
        self.ranking
            .iter()
            .find(|r| r.disease == disease)
            .map(|r| r.probability)
    }
}

/// Runs the stage-1 classifiers.
#[derive(Clone)]
pub struct Stage1Screener {
    registry: Arc<ModelRegistry>,
}

impl Stage1Screener {
    pub fn new(registry: Arc<ModelRegistry>) -> Self {
        Self { registry }
    }

    /// Screen `vitals` against all three diseases.
    ///
    /// # Errors
    ///
    /// Returns the first `ModelError` raised by a classifier; there is no retry.
    pub fn screen(&self, vitals: &VitalsRecord) -> Result<ScreeningResult, ModelError> {
        let row = vitals.to_feature_row();
        let score = |disease: Disease| -> Result<(Disease, f64), ModelError> {
            let p = self
                .registry
                .classifier(disease, Stage::Screening)
                .positive_probability(&row)?;
            Ok((disease, p))
        };

        let scores = [
            score(Disease::Heart)?,
            score(Disease::Diabetes)?,
            score(Disease::Hypertension)?,
        ];
        let result = ScreeningResult::from_scores(scores);
        tracing::debug!(
            top = %result.top_disease,
            heart = scores[0].1,
            diabetes = scores[1].1,
            hypertension = scores[2].1,
            "stage-1 screening complete"
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::Gender;
    use crate::test_support::registry_with;

    fn scenario_vitals() -> VitalsRecord {
        VitalsRecord {
            age: 55,
            gender: Gender::Male,
            systolic_bp: 140.0,
            diastolic_bp: 90.0,
            glucose: 110,
            cholesterol: 220.0,
            bmi: 27.0,
            smoking: 1,
            alcohol: 0,
            family_history: 1,
        }
    }

    #[test]
    fn ranks_descending_and_picks_argmax() {
        let screener = Stage1Screener::new(registry_with([0.2, 0.7, 0.4], [0.0; 3]));
        let result = screener.screen(&scenario_vitals()).expect("screen");

        assert_eq!(result.top_disease, Disease::Diabetes);
        let order: Vec<Disease> = result.ranking.iter().map(|r| r.disease).collect();
        assert_eq!(
            order,
            vec![Disease::Diabetes, Disease::Hypertension, Disease::Heart]
        );
        for r in &result.ranking {
            assert!((0.0..=1.0).contains(&r.probability));
        }
        assert_eq!(result.ranking[0].disease, result.top_disease);
    }

    #[test]
    fn ties_go_to_first_in_canonical_order() {
        let result = ScreeningResult::from_scores([
            (Disease::Heart, 0.5),
            (Disease::Diabetes, 0.5),
            (Disease::Hypertension, 0.5),
        ]);
        assert_eq!(result.top_disease, Disease::Heart);
        let order: Vec<Disease> = result.ranking.iter().map(|r| r.disease).collect();
        assert_eq!(order, Disease::ALL.to_vec());
    }

    #[test]
    fn tie_between_later_diseases_keeps_first_seen() {
        let result = ScreeningResult::from_scores([
            (Disease::Heart, 0.1),
            (Disease::Diabetes, 0.6),
            (Disease::Hypertension, 0.6),
        ]);
        assert_eq!(result.top_disease, Disease::Diabetes);
        assert_eq!(result.ranking[1].disease, Disease::Hypertension);
    }

    #[test]
    fn signed_zeros_tie_and_keep_first_seen() {
        let result = ScreeningResult::from_scores([
            (Disease::Heart, -0.0),
            (Disease::Diabetes, 0.0),
            (Disease::Hypertension, 0.0),
        ]);
        assert_eq!(result.top_disease, Disease::Heart);
        assert_eq!(result.ranking[0].disease, result.top_disease);
        let order: Vec<Disease> = result.ranking.iter().map(|r| r.disease).collect();
        assert_eq!(order, Disease::ALL.to_vec());
    }

    #[test]
    fn probability_lookup_by_disease() {
        let result = ScreeningResult::from_scores([
            (Disease::Heart, 0.3),
            (Disease::Diabetes, 0.2),
            (Disease::Hypertension, 0.1),
        ]);
        assert_eq!(result.probability(Disease::Diabetes), Some(0.2));
    }

    #[test]
    fn classifier_failure_propagates() {
        let screener = Stage1Screener::new(registry_with([0.2, 1.7, 0.4], [0.0; 3]));
        let err = screener.screen(&scenario_vitals()).expect_err("bad model");
        assert!(matches!(err, ModelError::ProbabilityOutOfRange { .. }));
    }
}
