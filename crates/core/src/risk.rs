//! Stage-2 risk estimation.
//!
//! A single classify-then-bucket step: run the disease's stage-2 classifier,
//! map the positive-class probability onto a fixed risk tier and attach the
//! tier's advisory note plus the standard disclaimer.

use crate::constants::{
    DISCLAIMER, HIGH_RISK_NOTE, LOW_RISK_NOTE, LOW_RISK_UPPER_BOUND, MODERATE_RISK_NOTE,
    MODERATE_RISK_UPPER_BOUND,
};
use crate::disease::Disease;
use crate::error::ModelError;
use crate::model::Stage;
use crate::records::DiseaseFeatureRecord;
use crate::registry::ModelRegistry;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Discrete risk bucket.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskTier {
    Low,
    Moderate,
    High,
}

impl RiskTier {
    /// Bucket a probability. Each range includes its lower bound.
    pub fn from_probability(p: f64) -> Self {
        if p < LOW_RISK_UPPER_BOUND {
            RiskTier::Low
        } else if p < MODERATE_RISK_UPPER_BOUND {
            RiskTier::Moderate
        } else {
            RiskTier::High
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RiskTier::Low => "Low",
            RiskTier::Moderate => "Moderate",
            RiskTier::High => "High",
        }
    }

    pub fn note(self) -> &'static str {
        match self {
            RiskTier::Low => LOW_RISK_NOTE,
            RiskTier::Moderate => MODERATE_RISK_NOTE,
            RiskTier::High => HIGH_RISK_NOTE,
        }
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Round a probability to three decimal places for display.
///
/// Exact halves after scaling go to the even neighbour.
pub fn round_probability(p: f64) -> f64 {
    (p * 1000.0).round_ties_even() / 1000.0
}

/// Result of a stage-2 estimate.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub disease: Disease,
    /// Positive-class probability rounded to three decimals.
    pub probability: f64,
    pub tier: RiskTier,
    pub note: String,
    pub disclaimer: String,
}

impl RiskAssessment {
    /// Build an assessment from an unrounded probability.
    ///
    /// The tier is decided before rounding.
    pub fn from_probability(disease: Disease, p: f64) -> Self {
        let tier = RiskTier::from_probability(p);
        Self {
            disease,
            probability: round_probability(p),
            tier,
            note: tier.note().to_string(),
            disclaimer: DISCLAIMER.to_string(),
        }
    }
}

/// Runs the stage-2 classifiers.
#[derive(Clone)]
pub struct Stage2Estimator {
    registry: Arc<ModelRegistry>,
}

impl Stage2Estimator {
    pub fn new(registry: Arc<ModelRegistry>) -> Self {
        Self { registry }
    }

    /// Estimate risk for the disease the record was built for.
    ///
    /// # Errors
    ///
    /// Returns the `ModelError` raised by the classifier; there is no retry.
    pub fn assess(&self, record: &DiseaseFeatureRecord) -> Result<RiskAssessment, ModelError> {
        let disease = record.disease();
        let p = self
            .registry
            .classifier(disease, Stage::Assessment)
            .positive_probability(&record.to_feature_row())?;
        let assessment = RiskAssessment::from_probability(disease, p);
        tracing::debug!(
            %disease,
            probability = p,
            tier = %assessment.tier,
            "stage-2 assessment complete"
        );
        Ok(assessment)
    }
}
