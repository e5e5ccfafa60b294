//! Wire types for the JSON API.
//!
//! These mirror the core domain types but stay flat and string-typed where a
//! client would expect it, and carry OpenAPI schemas.

use clinrisk_core::{
    FieldError, RankedDisease, RiskAssessment, ScreeningResult, ValidationErrors,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

/// Stage-1 vitals as documented for JSON clients.
///
/// The endpoint reads the body as [`FormFieldsReq`] so that a bad value is
/// reported per field rather than rejected as a whole.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct VitalsReq {
    pub age: i64,
    /// `Male`; any other value is recorded as female.
    pub gender: String,
    pub systolic_bp: f64,
    pub diastolic_bp: f64,
    pub glucose: i64,
    pub cholesterol: f64,
    pub bmi: f64,
    pub smoking: i64,
    pub alcohol: i64,
    pub family_history: i64,
}

/// A JSON object of form fields, keyed by the same names the HTML forms use.
///
/// Values may be strings, numbers or booleans. They are coerced exactly like
/// a form submission, so `{"Age": 45}` and `{"Age": "45"}` are equivalent.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FormFieldsReq(#[schema(value_type = Object)] pub HashMap<String, Value>);

impl FormFieldsReq {
    /// Flatten into form text. `null` counts as a missing field.
    pub fn into_form(self) -> HashMap<String, String> {
        self.0
            .into_iter()
            .filter_map(|(key, value)| {
                let text = match value {
                    Value::Null => return None,
                    Value::String(s) => s,
                    other => other.to_string(),
                };
                Some((key, text))
            })
            .collect()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RankedDiseaseRes {
    pub disease: String,
    pub probability: f64,
}

impl From<&RankedDisease> for RankedDiseaseRes {
    fn from(r: &RankedDisease) -> Self {
        Self {
            disease: r.disease.as_str().to_string(),
            probability: r.probability,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ScreeningRes {
    pub top_disease: String,
    /// Sorted by descending probability.
    pub ranking: Vec<RankedDiseaseRes>,
}

impl From<&ScreeningResult> for ScreeningRes {
    fn from(result: &ScreeningResult) -> Self {
        Self {
            top_disease: result.top_disease.as_str().to_string(),
            ranking: result.ranking.iter().map(RankedDiseaseRes::from).collect(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AssessmentRes {
    pub disease: String,
    /// Rounded to three decimal places.
    pub probability: f64,
    pub risk: String,
    pub note: String,
    pub disclaimer: String,
}

impl From<&RiskAssessment> for AssessmentRes {
    fn from(a: &RiskAssessment) -> Self {
        Self {
            disease: a.disease.as_str().to_string(),
            probability: a.probability,
            risk: a.tier.label().to_string(),
            note: a.note.clone(),
            disclaimer: a.disclaimer.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FieldErrorRes {
    pub field: String,
    pub message: String,
}

impl From<&FieldError> for FieldErrorRes {
    fn from(e: &FieldError) -> Self {
        Self {
            field: e.field.clone(),
            message: e.message.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ValidationErrorRes {
    pub errors: Vec<FieldErrorRes>,
}

impl From<&ValidationErrors> for ValidationErrorRes {
    fn from(errors: &ValidationErrors) -> Self {
        Self {
            errors: errors.errors().iter().map(FieldErrorRes::from).collect(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ErrorRes {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clinrisk_core::Disease;

    #[test]
    fn screening_res_keeps_ranking_order() {
        let result = ScreeningResult::from_scores([
            (Disease::Heart, 0.1),
            (Disease::Diabetes, 0.8),
            (Disease::Hypertension, 0.3),
        ]);
        let res = ScreeningRes::from(&result);
        assert_eq!(res.top_disease, "diabetes");
        let names: Vec<&str> = res.ranking.iter().map(|r| r.disease.as_str()).collect();
        assert_eq!(names, vec!["diabetes", "hypertension", "heart"]);
    }

    #[test]
    fn assessment_res_uses_tier_label() {
        let assessment = RiskAssessment::from_probability(Disease::Heart, 0.65);
        let res = AssessmentRes::from(&assessment);
        assert_eq!(res.risk, "High");
        assert_eq!(res.probability, 0.65);

        let json = serde_json::to_value(&res).expect("serialise");
        assert_eq!(json["disease"], "heart");
    }

    #[test]
    fn form_fields_accept_strings_and_numbers() {
        let req: FormFieldsReq = serde_json::from_str(
            r#"{"Glucose": 120, "DPF": "0.35", "BMI": 31.5, "Smoker": true, "Insulin": null}"#,
        )
        .expect("parse");
        let form = req.into_form();
        assert_eq!(form.get("Glucose").map(String::as_str), Some("120"));
        assert_eq!(form.get("DPF").map(String::as_str), Some("0.35"));
        assert_eq!(form.get("BMI").map(String::as_str), Some("31.5"));
        assert_eq!(form.get("Smoker").map(String::as_str), Some("true"));
        assert!(!form.contains_key("Insulin"));
    }

    #[test]
    fn badly_typed_vitals_surface_as_field_errors() {
        let req: FormFieldsReq =
            serde_json::from_str(r#"{"age": "fifty", "bmi": 27}"#).expect("parse");
        let errors = clinrisk_core::VitalsRecord::from_form(&req.into_form())
            .expect_err("invalid vitals");
        let res = ValidationErrorRes::from(&errors);
        let fields: Vec<&str> = res.errors.iter().map(|e| e.field.as_str()).collect();
        assert!(fields.contains(&"age"));
        assert!(fields.contains(&"gender"));
        assert!(!fields.contains(&"bmi"));
    }
}
