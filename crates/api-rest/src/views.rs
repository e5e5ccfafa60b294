//! Server-rendered HTML pages.
//!
//! Pages are assembled with `format!` from small helpers. Every value that
//! originates outside this module goes through [`escape`].

use clinrisk_core::{Disease, RiskAssessment, ScreeningResult, ValidationErrors};
use std::collections::BTreeMap;
use std::fmt::Write;

// ============================================================================
// Form field definitions
// ============================================================================

/// How a form field is entered.
#[derive(Clone, Copy, Debug)]
pub(crate) enum Input {
    Integer,
    Decimal,
    /// `(submitted value, label)` pairs.
    Choice(&'static [(&'static str, &'static str)]),
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub input: Input,
}

const fn field(name: &'static str, label: &'static str, input: Input) -> FieldSpec {
    FieldSpec { name, label, input }
}

const NO_YES_FLAG: &[(&str, &str)] = &[("0", "No"), ("1", "Yes")];
const YES_NO: &[(&str, &str)] = &[("Yes", "Yes"), ("No", "No")];
const SEX: &[(&str, &str)] = &[("Male", "Male"), ("Female", "Female")];

pub(crate) const INTAKE_FIELDS: &[FieldSpec] = &[
    field("age", "Age (years)", Input::Integer),
    field("gender", "Gender", Input::Choice(SEX)),
    field("systolic_bp", "Systolic blood pressure (mmHg)", Input::Decimal),
    field("diastolic_bp", "Diastolic blood pressure (mmHg)", Input::Decimal),
    field("glucose", "Glucose (mg/dL)", Input::Integer),
    field("cholesterol", "Cholesterol (mg/dL)", Input::Decimal),
    field("bmi", "BMI", Input::Decimal),
    field("smoking", "Smoker", Input::Choice(NO_YES_FLAG)),
    field("alcohol", "Drinks alcohol", Input::Choice(NO_YES_FLAG)),
    field("family_history", "Family history of disease", Input::Choice(NO_YES_FLAG)),
];

const HEART_FIELDS: &[FieldSpec] = &[
    field("age", "Age (years)", Input::Integer),
    field("sex", "Sex", Input::Choice(SEX)),
    field(
        "chest_pain_type",
        "Chest pain type",
        Input::Choice(&[
            ("Typical angina", "Typical angina"),
            ("Atypical angina", "Atypical angina"),
            ("Non-anginal pain", "Non-anginal pain"),
            ("Asymptomatic", "Asymptomatic"),
        ]),
    ),
    field("resting_blood_pressure", "Resting blood pressure (mmHg)", Input::Decimal),
    field("cholestoral", "Serum cholesterol (mg/dL)", Input::Decimal),
    field(
        "fasting_blood_sugar",
        "Fasting blood sugar",
        Input::Choice(&[("<=120 mg/ml", "<=120 mg/ml"), (">120 mg/ml", ">120 mg/ml")]),
    ),
    field(
        "rest_ecg",
        "Resting ECG",
        Input::Choice(&[
            ("Normal", "Normal"),
            ("ST-T wave abnormality", "ST-T wave abnormality"),
            ("Left ventricular hypertrophy", "Left ventricular hypertrophy"),
        ]),
    ),
    field("Max_heart_rate", "Maximum heart rate achieved", Input::Decimal),
    field("exercise_induced_angina", "Exercise induced angina", Input::Choice(YES_NO)),
    field("oldpeak", "ST depression (oldpeak)", Input::Decimal),
    field(
        "slope",
        "Slope of peak exercise ST segment",
        Input::Choice(&[
            ("Upsloping", "Upsloping"),
            ("Flat", "Flat"),
            ("Downsloping", "Downsloping"),
        ]),
    ),
    field(
        "vessels",
        "Major vessels coloured by fluoroscopy",
        Input::Choice(&[
            ("Zero", "Zero"),
            ("One", "One"),
            ("Two", "Two"),
            ("Three", "Three"),
            ("Four", "Four"),
        ]),
    ),
    field(
        "thalassemia",
        "Thalassemia",
        Input::Choice(&[
            ("Normal", "Normal"),
            ("Fixed Defect", "Fixed defect"),
            ("Reversable Defect", "Reversible defect"),
            ("No", "None recorded"),
        ]),
    ),
];

const HYPERTENSION_FIELDS: &[FieldSpec] = &[
    field("Age", "Age (years)", Input::Integer),
    field("Salt_Intake", "Salt intake (g/day)", Input::Decimal),
    field("Stress_Score", "Stress score (0-10)", Input::Integer),
    field(
        "BP_History",
        "Blood pressure history",
        Input::Choice(&[
            ("Normal", "Normal"),
            ("Prehypertension", "Prehypertension"),
            ("Hypertension", "Hypertension"),
        ]),
    ),
    field("Sleep_Duration", "Sleep duration (hours)", Input::Decimal),
    field("BMI", "BMI", Input::Decimal),
    field(
        "Medication",
        "Current medication",
        Input::Choice(&[
            ("None", "None"),
            ("ACE Inhibitor", "ACE inhibitor"),
            ("Beta Blocker", "Beta blocker"),
            ("Diuretic", "Diuretic"),
            ("Other", "Other"),
        ]),
    ),
    field("Family_History", "Family history of hypertension", Input::Choice(YES_NO)),
    field(
        "Exercise_Level",
        "Exercise level",
        Input::Choice(&[("Low", "Low"), ("Moderate", "Moderate"), ("High", "High")]),
    ),
    field(
        "Smoking_Status",
        "Smoking status",
        Input::Choice(&[("Never", "Never"), ("Former", "Former"), ("Current", "Current")]),
    ),
];

const DIABETES_FIELDS: &[FieldSpec] = &[
    field("Pregnancies", "Pregnancies", Input::Integer),
    field("Glucose", "Plasma glucose (mg/dL)", Input::Decimal),
    field("BloodPressure", "Diastolic blood pressure (mmHg)", Input::Decimal),
    field("SkinThickness", "Triceps skin fold thickness (mm)", Input::Decimal),
    field("Insulin", "2-hour serum insulin (mu U/ml)", Input::Decimal),
    field("BMI", "BMI", Input::Decimal),
    field("DPF", "Diabetes pedigree function", Input::Decimal),
    field("Age", "Age (years)", Input::Integer),
];

/// Stage-2 form fields for `disease`, in submission order.
pub(crate) fn stage2_fields(disease: Disease) -> &'static [FieldSpec] {
    match disease {
        Disease::Heart => HEART_FIELDS,
        Disease::Hypertension => HYPERTENSION_FIELDS,
        Disease::Diabetes => DIABETES_FIELDS,
    }
}

fn display_name(disease: Disease) -> &'static str {
    match disease {
        Disease::Heart => "Heart disease",
        Disease::Diabetes => "Diabetes",
        Disease::Hypertension => "Hypertension",
    }
}

// ============================================================================
// Rendering helpers
// ============================================================================

/// Escape text for use in HTML element content and quoted attributes.
pub(crate) fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

fn page(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} | Clinical Risk Engine</title>
<style>
body {{ font-family: system-ui, sans-serif; max-width: 42rem; margin: 2rem auto; padding: 0 1rem; }}
label {{ display: block; margin-top: 0.75rem; }}
input, select {{ width: 100%; padding: 0.3rem; }}
.top {{ font-weight: bold; }}
.risk-low {{ color: #1b7f3b; }}
.risk-moderate {{ color: #b36b00; }}
.risk-high {{ color: #b00020; }}
.disclaimer {{ font-size: 0.9rem; color: #555; }}
</style>
</head>
<body>
<h1>{title}</h1>
{body}
</body>
</html>
"#,
        title = escape(title),
    )
}

fn render_fields(fields: &[FieldSpec], prefill: &BTreeMap<&'static str, String>) -> String {
    let mut out = String::new();
    for spec in fields {
        let name = escape(spec.name);
        let current = prefill.get(spec.name).map(String::as_str);
        let _ = writeln!(out, r#"<label for="{name}">{}</label>"#, escape(spec.label));
        match spec.input {
            Input::Integer | Input::Decimal => {
                let step = if matches!(spec.input, Input::Integer) { "1" } else { "any" };
                let value = current
                    .map(|v| format!(r#" value="{}""#, escape(v)))
                    .unwrap_or_default();
                let _ = writeln!(
                    out,
                    concat!(
                        r#"<input type="number" step="{step}" id="{name}" "#,
                        r#"name="{name}"{value} required>"#
                    ),
                    step = step,
                    name = name,
                    value = value,
                );
            }
            Input::Choice(options) => {
                let _ = writeln!(out, r#"<select id="{name}" name="{name}" required>"#);
                for (value, label) in options {
                    let selected = if current == Some(*value) { " selected" } else { "" };
                    let _ = writeln!(
                        out,
                        r#"<option value="{}"{selected}>{}</option>"#,
                        escape(value),
                        escape(label)
                    );
                }
                out.push_str("</select>\n");
            }
        }
    }
    out
}

// ============================================================================
// Pages
// ============================================================================

/// Stage-1 intake form.
pub(crate) fn intake_form() -> String {
    let body = format!(
        r#"<p>Enter the patient's vitals to screen for heart disease, diabetes and hypertension.</p>
<form method="post" action="/">
{fields}<p><button type="submit">Screen</button></p>
</form>"#,
        fields = render_fields(INTAKE_FIELDS, &BTreeMap::new()),
    );
    page("Stage 1: Screening", &body)
}

/// Ranked stage-1 result with links into stage 2.
pub(crate) fn stage1_result(screening: &ScreeningResult) -> String {
    let mut rows = String::new();
    for ranked in &screening.ranking {
        let class = if ranked.disease == screening.top_disease {
            r#" class="top""#
        } else {
            ""
        };
        let _ = writeln!(
            rows,
            r#"<tr{class}><td>{}</td><td>{:.3}</td><td><a href="/stage2/{}">Assess</a></td></tr>"#,
            display_name(ranked.disease),
            ranked.probability,
            ranked.disease.as_str(),
        );
    }

    let body = format!(
        r#"<p>Highest screening probability: <strong>{top}</strong>.</p>
<table>
<thead><tr><th>Condition</th><th>Probability</th><th></th></tr></thead>
<tbody>
{rows}</tbody>
</table>
<p><a href="/">Start again</a></p>"#,
        top = display_name(screening.top_disease),
    );
    page("Stage 1: Result", &body)
}

/// Disease-specific stage-2 form, pre-filled where values are known.
pub(crate) fn stage2_form(disease: Disease, prefill: &BTreeMap<&'static str, String>) -> String {
    let body = format!(
        r#"<form method="post" action="/stage2/{slug}">
{fields}<p><button type="submit">Estimate risk</button></p>
</form>
<p><a href="/">Back to screening</a></p>"#,
        slug = disease.as_str(),
        fields = render_fields(stage2_fields(disease), prefill),
    );
    page(&format!("Stage 2: {}", display_name(disease)), &body)
}

/// Stage-2 risk estimate, headed by the route segment as the visitor typed it.
pub(crate) fn stage2_result(heading: &str, assessment: &RiskAssessment) -> String {
    let tier = assessment.tier.label();
    let body = format!(
        r#"<h2>{disease}</h2>
<p>Probability: <strong>{probability}</strong></p>
<p>Risk level: <strong class="risk-{class}">{tier}</strong></p>
<p>{note}</p>
<p class="disclaimer">{disclaimer}</p>
<p><a href="/stage2/{slug}">Assess again</a> | <a href="/">Back to screening</a></p>"#,
        disease = escape(&heading.to_uppercase()),
        probability = assessment.probability,
        class = tier.to_ascii_lowercase(),
        note = escape(&assessment.note),
        disclaimer = escape(&assessment.disclaimer),
        slug = assessment.disease.as_str(),
    );
    page("Stage 2: Result", &body)
}

/// Every offending field from a rejected submission.
pub(crate) fn validation_errors(errors: &ValidationErrors) -> String {
    let mut items = String::new();
    for error in errors.errors() {
        let _ = writeln!(
            items,
            "<li><code>{}</code>: {}</li>",
            escape(&error.field),
            escape(&error.message)
        );
    }
    let body = format!(
        r#"<p>The form could not be processed:</p>
<ul>
{items}</ul>
<p>Go back and correct the fields above.</p>"#
    );
    page("Invalid submission", &body)
}

pub(crate) fn not_found(message: &str) -> String {
    page(
        "Not found",
        &format!(r#"<p>{}</p><p><a href="/">Back to screening</a></p>"#, escape(message)),
    )
}

pub(crate) fn internal_error() -> String {
    page(
        "Something went wrong",
        r#"<p>The risk estimate could not be produced. Please try again later.</p>"#,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use clinrisk_core::{DiseaseFeatureRecord, VitalsRecord};

    #[test]
    fn stage2_forms_cover_every_record_field() {
        for disease in Disease::ALL {
            let names: Vec<&str> = stage2_fields(disease).iter().map(|f| f.name).collect();
            assert_eq!(names, DiseaseFeatureRecord::form_fields(disease), "{disease}");
        }
    }

    #[test]
    fn intake_form_covers_every_vitals_field() {
        let names: Vec<&str> = INTAKE_FIELDS.iter().map(|f| f.name).collect();
        assert_eq!(names, VitalsRecord::FIELDS.to_vec());
    }

    #[test]
    fn escape_neutralises_markup() {
        assert_eq!(
            escape(r#"<b onclick="x">'&'</b>"#),
            "&lt;b onclick=&quot;x&quot;&gt;&#x27;&amp;&#x27;&lt;/b&gt;"
        );
    }

    #[test]
    fn prefill_sets_input_values_and_selected_options() {
        let mut prefill = BTreeMap::new();
        prefill.insert("age", "55".to_string());
        prefill.insert("sex", "Male".to_string());
        let html = stage2_form(Disease::Heart, &prefill);
        assert!(html.contains(r#"name="age" value="55""#));
        assert!(html.contains(r#"<option value="Male" selected>"#));
        assert!(!html.contains(r#"<option value="Female" selected>"#));
    }

    #[test]
    fn validation_page_lists_each_field() {
        let errors = DiseaseFeatureRecord::from_form(Disease::Diabetes, &Default::default())
            .expect_err("empty form");
        let html = validation_errors(&errors);
        for name in DiseaseFeatureRecord::form_fields(Disease::Diabetes) {
            assert!(html.contains(&format!("<code>{name}</code>")), "{name}");
        }
    }
}
