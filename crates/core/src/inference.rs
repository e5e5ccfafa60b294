//! Immutable inference context shared by request handlers.

use crate::disease::{resolve_route_segment, Disease};
use crate::records::{DiseaseFeatureRecord, VitalsRecord};
use crate::registry::ModelRegistry;
use crate::risk::{RiskAssessment, Stage2Estimator};
use crate::screening::{ScreeningResult, Stage1Screener};
use crate::ClinriskResult;
use std::collections::HashMap;
use std::sync::Arc;

/// Everything a request needs to run either workflow stage.
///
/// Built once at startup from a loaded [`ModelRegistry`]; cloning is cheap.
#[derive(Clone)]
pub struct InferenceContext {
    registry: Arc<ModelRegistry>,
    screener: Stage1Screener,
    estimator: Stage2Estimator,
    strict_disease_routes: bool,
}

impl InferenceContext {
    pub fn new(registry: ModelRegistry, strict_disease_routes: bool) -> Self {
        Self::from_shared(Arc::new(registry), strict_disease_routes)
    }

    pub fn from_shared(registry: Arc<ModelRegistry>, strict_disease_routes: bool) -> Self {
        Self {
            screener: Stage1Screener::new(Arc::clone(&registry)),
            estimator: Stage2Estimator::new(Arc::clone(&registry)),
            registry,
            strict_disease_routes,
        }
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    /// Resolve a `/stage2/{disease}` path segment.
    ///
    /// # Errors
    ///
    /// Returns `ClinriskError::UnknownDisease` for an unknown segment in strict mode.
    pub fn resolve_disease(&self, segment: &str) -> ClinriskResult<Disease> {
        resolve_route_segment(segment, self.strict_disease_routes)
    }

    /// Stage 1 from an already-typed record.
    ///
    /// # Errors
    ///
    /// Returns `ClinriskError::Model` if a classifier fails.
    pub fn screen(&self, vitals: &VitalsRecord) -> ClinriskResult<ScreeningResult> {
        Ok(self.screener.screen(vitals)?)
    }

    /// Stage 2 from an already-typed record.
    ///
    /// # Errors
    ///
    /// Returns `ClinriskError::Model` if the classifier fails.
    pub fn assess(&self, record: &DiseaseFeatureRecord) -> ClinriskResult<RiskAssessment> {
        Ok(self.estimator.assess(record)?)
    }

    /// Coerce a submitted intake form and screen it.
    ///
    /// # Errors
    ///
    /// Returns `ClinriskError::Validation` for malformed input or
    /// `ClinriskError::Model` if a classifier fails.
    pub fn screen_form(
        &self,
        fields: &HashMap<String, String>,
    ) -> ClinriskResult<(VitalsRecord, ScreeningResult)> {
        let vitals = VitalsRecord::from_form(fields)?;
        let screening = self.screen(&vitals)?;
        Ok((vitals, screening))
    }

    /// Resolve the disease, coerce its stage-2 form and assess it.
    ///
    /// # Errors
    ///
    /// Returns `ClinriskError::UnknownDisease` (strict mode only),
    /// `ClinriskError::Validation` or `ClinriskError::Model`.
    pub fn assess_form(
        &self,
        segment: &str,
        fields: &HashMap<String, String>,
    ) -> ClinriskResult<RiskAssessment> {
        let disease = self.resolve_disease(segment)?;
        let record = DiseaseFeatureRecord::from_form(disease, fields)?;
        self.assess(&record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::risk::RiskTier;
    use crate::test_support::registry_with;
    use crate::ClinriskError;

    fn form(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn diabetes_form() -> HashMap<String, String> {
        form(&[
            ("Pregnancies", "0"),
            ("Glucose", "120"),
            ("BloodPressure", "80"),
            ("SkinThickness", "20"),
            ("Insulin", "85"),
            ("BMI", "30.1"),
            ("DPF", "0.35"),
            ("Age", "40"),
        ])
    }

    #[test]
    fn screens_scenario_form() {
        let ctx = InferenceContext::from_shared(registry_with([0.62, 0.41, 0.55], [0.0; 3]), false);
        let (vitals, screening) = ctx
            .screen_form(&form(&[
                ("age", "55"),
                ("gender", "Male"),
                ("systolic_bp", "140"),
                ("diastolic_bp", "90"),
                ("glucose", "110"),
                ("cholesterol", "220"),
                ("bmi", "27"),
                ("smoking", "1"),
                ("alcohol", "0"),
                ("family_history", "1"),
            ]))
            .expect("screen");

        assert_eq!(vitals.age, 55);
        assert_eq!(screening.top_disease, Disease::Heart);
        let probabilities: Vec<f64> = screening.ranking.iter().map(|r| r.probability).collect();
        assert_eq!(probabilities, vec![0.62, 0.55, 0.41]);
    }

    #[test]
    fn unknown_route_uses_diabetes_schema_and_model() {
        let ctx = InferenceContext::from_shared(registry_with([0.0; 3], [0.9, 0.1, 0.5]), false);
        let assessment = ctx
            .assess_form("unknown_disease", &diabetes_form())
            .expect("fallthrough");
        assert_eq!(assessment.disease, Disease::Diabetes);
        assert_eq!(assessment.tier, RiskTier::Low);
    }

    #[test]
    fn strict_mode_rejects_unknown_route() {
        let ctx = InferenceContext::from_shared(registry_with([0.0; 3], [0.9, 0.1, 0.5]), true);
        let err = ctx
            .assess_form("unknown_disease", &diabetes_form())
            .expect_err("strict");
        assert!(matches!(err, ClinriskError::UnknownDisease(_)));
    }

    #[test]
    fn stage2_schema_follows_route_not_screening() {
        let registry = registry_with([0.9, 0.1, 0.1], [0.2, 0.2, 0.2]);
        let ctx = InferenceContext::from_shared(registry, false);
        let err = ctx
            .assess_form("heart", &diabetes_form())
            .expect_err("diabetes fields do not satisfy the heart schema");
        match err {
            ClinriskError::Validation(errors) => assert!(errors.has_field("chest_pain_type")),
            other => panic!("expected Validation error, got {other:?}"),
        }
    }

    #[test]
    fn bundled_artifacts_score_every_form() {
        let dir = crate::config::resolve_model_dir(None).expect("bundled models directory");
        let ctx = InferenceContext::new(ModelRegistry::load(&dir).expect("load"), false);

        let (_, screening) = ctx
            .screen_form(&form(&[
                ("age", "55"),
                ("gender", "Male"),
                ("systolic_bp", "140"),
                ("diastolic_bp", "90"),
                ("glucose", "110"),
                ("cholesterol", "220"),
                ("bmi", "27"),
                ("smoking", "1"),
                ("alcohol", "0"),
                ("family_history", "1"),
            ]))
            .expect("screen");
        assert!(screening
            .ranking
            .windows(2)
            .all(|w| w[0].probability >= w[1].probability));
        assert_eq!(screening.top_disease, screening.ranking[0].disease);

        let heart = form(&[
            ("age", "55"),
            ("sex", "Male"),
            ("chest_pain_type", "Asymptomatic"),
            ("resting_blood_pressure", "140"),
            ("cholestoral", "220"),
            ("fasting_blood_sugar", "<=120 mg/ml"),
            ("rest_ecg", "Normal"),
            ("Max_heart_rate", "150"),
            ("exercise_induced_angina", "No"),
            ("oldpeak", "1.2"),
            ("slope", "Flat"),
            ("vessels", "Zero"),
            ("thalassemia", "Normal"),
        ]);
        let hypertension = form(&[
            ("Age", "55"),
            ("Salt_Intake", "9.5"),
            ("Stress_Score", "6"),
            ("BP_History", "Prehypertension"),
            ("Sleep_Duration", "6.5"),
            ("BMI", "27"),
            ("Medication", "None"),
            ("Family_History", "Yes"),
            ("Exercise_Level", "Low"),
            ("Smoking_Status", "Current"),
        ]);
        for (segment, fields) in [
            ("heart", heart),
            ("hypertension", hypertension),
            ("diabetes", diabetes_form()),
        ] {
            let assessment = ctx.assess_form(segment, &fields).expect(segment);
            assert!((0.0..=1.0).contains(&assessment.probability), "{segment}");
        }
    }
}
