//! Typed input records for both workflow stages.
//!
//! Responsibilities:
//! - Define the fixed stage-1 vitals record and the three disjoint stage-2 schemas
//! - Coerce submitted form maps into those records
//! - Flatten records into the single-row [`FeatureRow`] handed to classifiers
//!
//! Feature names in rows are the model-side column names, which do not always
//! match the form field names (`vessels` and `DPF` are renamed).

use crate::disease::Disease;
use crate::validation::{FormReader, ValidationErrors};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ============================================================================
// Feature rows
// ============================================================================

/// A single cell of a feature row.
#[derive(Clone, Debug, PartialEq)]
pub enum FeatureValue {
    Number(f64),
    Category(String),
}

/// An ordered single-row input for a classifier.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FeatureRow {
    columns: Vec<(String, FeatureValue)>,
}

impl FeatureRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn number(mut self, name: &str, value: f64) -> Self {
        self.columns
            .push((name.to_string(), FeatureValue::Number(value)));
        self
    }

    pub fn category(mut self, name: &str, value: impl Into<String>) -> Self {
        self.columns
            .push((name.to_string(), FeatureValue::Category(value.into())));
        self
    }

    pub fn get(&self, name: &str) -> Option<&FeatureValue> {
        self.columns
            .iter()
            .find(|(column, _)| column == name)
            .map(|(_, value)| value)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

fn flag(value: bool) -> f64 {
    if value {
        1.0
    } else {
        0.0
    }
}

// ============================================================================
// Stage 1
// ============================================================================

/// Binary gender as captured on the intake form.
///
/// The form submits `Male`; any other value is recorded as `Female`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn from_form_value(value: &str) -> Self {
        if value == "Male" {
            Gender::Male
        } else {
            Gender::Female
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
        }
    }

    fn as_flag(self) -> f64 {
        flag(self == Gender::Male)
    }
}

/// Stage-1 vital signs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VitalsRecord {
    pub age: i64,
    pub gender: Gender,
    pub systolic_bp: f64,
    pub diastolic_bp: f64,
    pub glucose: i64,
    pub cholesterol: f64,
    pub bmi: f64,
    pub smoking: i64,
    pub alcohol: i64,
    pub family_history: i64,
}

impl VitalsRecord {
    /// Names of the intake form fields, in column order.
    pub const FIELDS: [&'static str; 10] = [
        "age",
        "gender",
        "systolic_bp",
        "diastolic_bp",
        "glucose",
        "cholesterol",
        "bmi",
        "smoking",
        "alcohol",
        "family_history",
    ];

    /// Coerce a submitted intake form.
    ///
    /// # Errors
    ///
    /// Returns `ValidationErrors` naming every missing or malformed field.
    pub fn from_form(fields: &HashMap<String, String>) -> Result<Self, ValidationErrors> {
        let mut form = FormReader::new(fields);
        let record = VitalsRecord {
            age: form.integer("age"),
            gender: Gender::from_form_value(&form.text("gender")),
            systolic_bp: form.float("systolic_bp"),
            diastolic_bp: form.float("diastolic_bp"),
            glucose: form.integer("glucose"),
            cholesterol: form.float("cholesterol"),
            bmi: form.float("bmi"),
            smoking: form.integer("smoking"),
            alcohol: form.integer("alcohol"),
            family_history: form.integer("family_history"),
        };
        form.finish(record)
    }

    pub fn to_feature_row(&self) -> FeatureRow {
        FeatureRow::new()
            .number("age", self.age as f64)
            .number("gender", self.gender.as_flag())
            .number("systolic_bp", self.systolic_bp)
            .number("diastolic_bp", self.diastolic_bp)
            .number("glucose", self.glucose as f64)
            .number("cholesterol", self.cholesterol)
            .number("bmi", self.bmi)
            .number("smoking", self.smoking as f64)
            .number("alcohol", self.alcohol as f64)
            .number("family_history", self.family_history as f64)
    }
}

// ============================================================================
// Stage 2
// ============================================================================

/// Heart stage-2 inputs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HeartRecord {
    pub age: i64,
    pub sex: Gender,
    pub chest_pain_type: String,
    pub resting_blood_pressure: f64,
    pub cholestoral: f64,
    pub fasting_blood_sugar_high: bool,
    pub rest_ecg: String,
    pub max_heart_rate: f64,
    pub exercise_induced_angina: bool,
    pub oldpeak: f64,
    pub slope: String,
    pub vessels: String,
    pub thalassemia: String,
}

impl HeartRecord {
    pub const FIELDS: [&'static str; 13] = [
        "age",
        "sex",
        "chest_pain_type",
        "resting_blood_pressure",
        "cholestoral",
        "fasting_blood_sugar",
        "rest_ecg",
        "Max_heart_rate",
        "exercise_induced_angina",
        "oldpeak",
        "slope",
        "vessels",
        "thalassemia",
    ];

    /// Form value marking fasting blood sugar above 120 mg/ml.
    pub const HIGH_FASTING_BLOOD_SUGAR: &'static str = ">120 mg/ml";

    pub fn from_form(fields: &HashMap<String, String>) -> Result<Self, ValidationErrors> {
        let mut form = FormReader::new(fields);
        let record = HeartRecord {
            age: form.integer("age"),
            sex: Gender::from_form_value(&form.text("sex")),
            chest_pain_type: form.text("chest_pain_type"),
            resting_blood_pressure: form.float("resting_blood_pressure"),
            cholestoral: form.float("cholestoral"),
            fasting_blood_sugar_high: form
                .matches("fasting_blood_sugar", Self::HIGH_FASTING_BLOOD_SUGAR),
            rest_ecg: form.text("rest_ecg"),
            max_heart_rate: form.float("Max_heart_rate"),
            exercise_induced_angina: form.matches("exercise_induced_angina", "Yes"),
            oldpeak: form.float("oldpeak"),
            slope: form.text("slope"),
            vessels: form.text("vessels"),
            thalassemia: form.text("thalassemia"),
        };
        form.finish(record)
    }

    pub fn to_feature_row(&self) -> FeatureRow {
        FeatureRow::new()
            .number("age", self.age as f64)
            .number("sex", self.sex.as_flag())
            .category("chest_pain_type", &self.chest_pain_type)
            .number("resting_blood_pressure", self.resting_blood_pressure)
            .number("cholestoral", self.cholestoral)
            .number("fasting_blood_sugar", flag(self.fasting_blood_sugar_high))
            .category("rest_ecg", &self.rest_ecg)
            .number("Max_heart_rate", self.max_heart_rate)
            .number(
                "exercise_induced_angina",
                flag(self.exercise_induced_angina),
            )
            .number("oldpeak", self.oldpeak)
            .category("slope", &self.slope)
            .category("vessels_colored_by_flourosopy", &self.vessels)
            .category("thalassemia", &self.thalassemia)
    }
}

/// Hypertension stage-2 inputs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HypertensionRecord {
    pub age: i64,
    pub salt_intake: f64,
    pub stress_score: i64,
    pub bp_history: String,
    pub sleep_duration: f64,
    pub bmi: f64,
    pub medication: String,
    pub family_history: String,
    pub exercise_level: String,
    pub smoking_status: String,
}

impl HypertensionRecord {
    pub const FIELDS: [&'static str; 10] = [
        "Age",
        "Salt_Intake",
        "Stress_Score",
        "BP_History",
        "Sleep_Duration",
        "BMI",
        "Medication",
        "Family_History",
        "Exercise_Level",
        "Smoking_Status",
    ];

    pub fn from_form(fields: &HashMap<String, String>) -> Result<Self, ValidationErrors> {
        let mut form = FormReader::new(fields);
        let record = HypertensionRecord {
            age: form.integer("Age"),
            salt_intake: form.float("Salt_Intake"),
            stress_score: form.integer("Stress_Score"),
            bp_history: form.text("BP_History"),
            sleep_duration: form.float("Sleep_Duration"),
            bmi: form.float("BMI"),
            medication: form.text("Medication"),
            family_history: form.text("Family_History"),
            exercise_level: form.text("Exercise_Level"),
            smoking_status: form.text("Smoking_Status"),
        };
        form.finish(record)
    }

    pub fn to_feature_row(&self) -> FeatureRow {
        FeatureRow::new()
            .number("Age", self.age as f64)
            .number("Salt_Intake", self.salt_intake)
            .number("Stress_Score", self.stress_score as f64)
            .category("BP_History", &self.bp_history)
            .number("Sleep_Duration", self.sleep_duration)
            .number("BMI", self.bmi)
            .category("Medication", &self.medication)
            .category("Family_History", &self.family_history)
            .category("Exercise_Level", &self.exercise_level)
            .category("Smoking_Status", &self.smoking_status)
    }
}

/// Diabetes stage-2 inputs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DiabetesRecord {
    pub pregnancies: i64,
    pub glucose: f64,
    pub blood_pressure: f64,
    pub skin_thickness: f64,
    pub insulin: f64,
    pub bmi: f64,
    pub diabetes_pedigree_function: f64,
    pub age: i64,
}

impl DiabetesRecord {
    pub const FIELDS: [&'static str; 8] = [
        "Pregnancies",
        "Glucose",
        "BloodPressure",
        "SkinThickness",
        "Insulin",
        "BMI",
        "DPF",
        "Age",
    ];

    pub fn from_form(fields: &HashMap<String, String>) -> Result<Self, ValidationErrors> {
        let mut form = FormReader::new(fields);
        let record = DiabetesRecord {
            pregnancies: form.integer("Pregnancies"),
            glucose: form.float("Glucose"),
            blood_pressure: form.float("BloodPressure"),
            skin_thickness: form.float("SkinThickness"),
            insulin: form.float("Insulin"),
            bmi: form.float("BMI"),
            diabetes_pedigree_function: form.float("DPF"),
            age: form.integer("Age"),
        };
        form.finish(record)
    }

    pub fn to_feature_row(&self) -> FeatureRow {
        FeatureRow::new()
            .number("Pregnancies", self.pregnancies as f64)
            .number("Glucose", self.glucose)
            .number("BloodPressure", self.blood_pressure)
            .number("SkinThickness", self.skin_thickness)
            .number("Insulin", self.insulin)
            .number("BMI", self.bmi)
            .number("DiabetesPedigreeFunction", self.diabetes_pedigree_function)
            .number("Age", self.age as f64)
    }
}

/// A stage-2 record for exactly one disease.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "disease", rename_all = "lowercase")]
pub enum DiseaseFeatureRecord {
    Heart(HeartRecord),
    Diabetes(DiabetesRecord),
    Hypertension(HypertensionRecord),
}

impl DiseaseFeatureRecord {
    /// Coerce a stage-2 form using the schema of `disease`.
    ///
    /// # Errors
    ///
    /// Returns `ValidationErrors` naming every missing or malformed field.
    pub fn from_form(
        disease: Disease,
        fields: &HashMap<String, String>,
    ) -> Result<Self, ValidationErrors> {
        Ok(match disease {
            Disease::Heart => DiseaseFeatureRecord::Heart(HeartRecord::from_form(fields)?),
            Disease::Hypertension => {
                DiseaseFeatureRecord::Hypertension(HypertensionRecord::from_form(fields)?)
            }
            Disease::Diabetes => {
                DiseaseFeatureRecord::Diabetes(DiabetesRecord::from_form(fields)?)
            }
        })
    }

    /// Form field names expected for `disease`.
    pub fn form_fields(disease: Disease) -> &'static [&'static str] {
        match disease {
            Disease::Heart => &HeartRecord::FIELDS,
            Disease::Hypertension => &HypertensionRecord::FIELDS,
            Disease::Diabetes => &DiabetesRecord::FIELDS,
        }
    }

    pub fn disease(&self) -> Disease {
        match self {
            DiseaseFeatureRecord::Heart(_) => Disease::Heart,
            DiseaseFeatureRecord::Diabetes(_) => Disease::Diabetes,
            DiseaseFeatureRecord::Hypertension(_) => Disease::Hypertension,
        }
    }

    pub fn to_feature_row(&self) -> FeatureRow {
        match self {
            DiseaseFeatureRecord::Heart(r) => r.to_feature_row(),
            DiseaseFeatureRecord::Diabetes(r) => r.to_feature_row(),
            DiseaseFeatureRecord::Hypertension(r) => r.to_feature_row(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn vitals_form() -> HashMap<String, String> {
        form(&[
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
        ])
    }

    #[test]
    fn vitals_are_coerced_from_form() {
        let vitals = VitalsRecord::from_form(&vitals_form()).expect("valid vitals");
        assert_eq!(vitals.age, 55);
        assert_eq!(vitals.gender, Gender::Male);
        assert_eq!(vitals.systolic_bp, 140.0);
        assert_eq!(vitals.glucose, 110);
        assert_eq!(vitals.family_history, 1);
    }

    #[test]
    fn vitals_row_has_ten_numeric_columns_in_form_order() {
        let vitals = VitalsRecord::from_form(&vitals_form()).unwrap();
        let row = vitals.to_feature_row();
        assert_eq!(row.len(), 10);
        assert_eq!(row.names().collect::<Vec<_>>(), VitalsRecord::FIELDS.to_vec());
        assert_eq!(row.get("gender"), Some(&FeatureValue::Number(1.0)));
    }

    #[test]
    fn non_male_gender_is_recorded_as_female() {
        let mut fields = vitals_form();
        fields.insert("gender".into(), "Other".into());
        let vitals = VitalsRecord::from_form(&fields).unwrap();
        assert_eq!(vitals.gender, Gender::Female);
        assert_eq!(
            vitals.to_feature_row().get("gender"),
            Some(&FeatureValue::Number(0.0))
        );
    }

    #[test]
    fn non_numeric_age_is_a_validation_error() {
        let mut fields = vitals_form();
        fields.insert("age".into(), "old".into());
        let err = VitalsRecord::from_form(&fields).expect_err("invalid age");
        assert!(err.has_field("age"));
        assert_eq!(err.errors().len(), 1);
    }

    #[test]
    fn heart_form_maps_renamed_and_flag_fields() {
        let fields = form(&[
            ("age", "61"),
            ("sex", "Male"),
            ("chest_pain_type", "Asymptomatic"),
            ("resting_blood_pressure", "150"),
            ("cholestoral", "260"),
            ("fasting_blood_sugar", ">120 mg/ml"),
            ("rest_ecg", "Normal"),
            ("Max_heart_rate", "120"),
            ("exercise_induced_angina", "Yes"),
            ("oldpeak", "2.3"),
            ("slope", "Flat"),
            ("vessels", "Two"),
            ("thalassemia", "Reversable Defect"),
        ]);
        let record = DiseaseFeatureRecord::from_form(Disease::Heart, &fields).unwrap();
        assert_eq!(record.disease(), Disease::Heart);
        let row = record.to_feature_row();
        assert_eq!(row.len(), 13);
        assert_eq!(
            row.get("vessels_colored_by_flourosopy"),
            Some(&FeatureValue::Category("Two".into()))
        );
        assert_eq!(row.get("fasting_blood_sugar"), Some(&FeatureValue::Number(1.0)));
        assert_eq!(
            row.get("exercise_induced_angina"),
            Some(&FeatureValue::Number(1.0))
        );
        assert!(row.get("vessels").is_none());
    }

    #[test]
    fn diabetes_form_renames_pedigree_function() {
        let fields = form(&[
            ("Pregnancies", "2"),
            ("Glucose", "148"),
            ("BloodPressure", "72"),
            ("SkinThickness", "35"),
            ("Insulin", "0"),
            ("BMI", "33.6"),
            ("DPF", "0.627"),
            ("Age", "50"),
        ]);
        let record = DiseaseFeatureRecord::from_form(Disease::Diabetes, &fields).unwrap();
        let row = record.to_feature_row();
        assert_eq!(row.len(), 8);
        assert_eq!(
            row.get("DiabetesPedigreeFunction"),
            Some(&FeatureValue::Number(0.627))
        );
    }

    #[test]
    fn hypertension_form_reports_all_missing_fields() {
        let fields = form(&[("Age", "45"), ("BMI", "31")]);
        let err = DiseaseFeatureRecord::from_form(Disease::Hypertension, &fields)
            .expect_err("incomplete form");
        assert_eq!(err.errors().len(), 8);
        assert!(err.has_field("Stress_Score"));
        assert!(err.has_field("Smoking_Status"));
    }

    #[test]
    fn schemas_are_disjoint_in_size() {
        assert_eq!(DiseaseFeatureRecord::form_fields(Disease::Heart).len(), 13);
        assert_eq!(DiseaseFeatureRecord::form_fields(Disease::Hypertension).len(), 10);
        assert_eq!(DiseaseFeatureRecord::form_fields(Disease::Diabetes).len(), 8);
    }
}
