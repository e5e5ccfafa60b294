//! Classifier capability and the bundled artifact backend.
//!
//! Every model is consumed through the [`Classifier`] trait, which mirrors the
//! `predict_proba` contract of a fitted binary estimator: one row in, the pair
//! `[P(class = 0), P(class = 1)]` out. Any inference backend can sit behind it.
//!
//! The bundled backend, [`LogisticModel`], is a serialised logistic pipeline:
//! numeric columns are standardised and weighted, categorical columns are
//! one-hot encoded (unknown categories contribute nothing), and the sum plus
//! intercept goes through a sigmoid.

use crate::error::ModelError;
use crate::records::{FeatureRow, FeatureValue};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::path::Path;

/// Which workflow stage a classifier serves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Stage {
    /// Stage 1: screening from common vitals.
    Screening,
    /// Stage 2: disease-specific risk estimation.
    Assessment,
}

impl Stage {
    pub const ALL: [Stage; 2] = [Stage::Screening, Stage::Assessment];

    pub fn number(self) -> u8 {
        match self {
            Stage::Screening => 1,
            Stage::Assessment => 2,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "stage-{}", self.number())
    }
}

/// An opaque fitted binary classifier.
///
/// Implementations must be free of per-call side effects so one instance can
/// serve concurrent requests without locking.
pub trait Classifier: Send + Sync {
    /// Human-readable model name, used in logs and errors.
    fn name(&self) -> &str;

    /// Class probabilities `[P(0), P(1)]` for a single row.
    fn predict_proba(&self, row: &FeatureRow) -> Result<[f64; 2], ModelError>;

    /// Column names this model reads, if known.
    fn feature_names(&self) -> Vec<&str> {
        Vec::new()
    }

    /// Positive-class probability, checked to lie in `[0, 1]`.
    fn positive_probability(&self, row: &FeatureRow) -> Result<f64, ModelError> {
        let [_, positive] = self.predict_proba(row)?;
        if !(0.0..=1.0).contains(&positive) {
            return Err(ModelError::ProbabilityOutOfRange {
                model: self.name().to_string(),
                probability: positive,
            });
        }
        Ok(positive)
    }
}

/// A classifier that ignores its input and always returns the same probability.
///
/// Useful for smoke-testing a deployment without real artifacts.
#[derive(Clone, Debug)]
pub struct ConstantClassifier {
    name: String,
    positive: f64,
}

impl ConstantClassifier {
    pub fn new(name: impl Into<String>, positive: f64) -> Self {
        Self {
            name: name.into(),
            positive,
        }
    }
}

impl Classifier for ConstantClassifier {
    fn name(&self) -> &str {
        &self.name
    }

    fn predict_proba(&self, _row: &FeatureRow) -> Result<[f64; 2], ModelError> {
        Ok([1.0 - self.positive, self.positive])
    }
}

// ============================================================================
// Logistic artifact
// ============================================================================

/// One term of a [`LogisticModel`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeatureTerm {
    Numeric {
        name: String,
        #[serde(default)]
        mean: f64,
        #[serde(default = "unit_scale")]
        scale: f64,
        weight: f64,
    },
    Categorical {
        name: String,
        weights: BTreeMap<String, f64>,
    },
}

fn unit_scale() -> f64 {
    1.0
}

impl FeatureTerm {
    pub fn name(&self) -> &str {
        match self {
            FeatureTerm::Numeric { name, .. } | FeatureTerm::Categorical { name, .. } => name,
        }
    }
}

/// Serialised logistic pipeline loaded from a JSON artifact.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogisticModel {
    name: String,
    intercept: f64,
    features: Vec<FeatureTerm>,
}

impl LogisticModel {
    /// Build a model from its parts, validating it as if it had been loaded.
    ///
    /// # Errors
    ///
    /// Returns `ModelError::InvalidArtifact` if the model is malformed.
    pub fn new(
        name: impl Into<String>,
        intercept: f64,
        features: Vec<FeatureTerm>,
    ) -> Result<Self, ModelError> {
        let model = Self {
            name: name.into(),
            intercept,
            features,
        };
        model.validate()?;
        Ok(model)
    }

    /// Load and validate an artifact from disk.
    ///
    /// # Errors
    ///
    /// Returns a `ModelError` if the file cannot be read, is not a valid
    /// artifact, or describes a malformed model.
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ModelError::ArtifactRead {
            path: path.to_path_buf(),
            source,
        })?;
        let model: LogisticModel =
            serde_json::from_str(&contents).map_err(|source| ModelError::ArtifactParse {
                path: path.to_path_buf(),
                source,
            })?;
        model.validate()?;
        Ok(model)
    }

    fn validate(&self) -> Result<(), ModelError> {
        let invalid = |reason: String| ModelError::InvalidArtifact {
            name: self.name.clone(),
            reason,
        };

        if self.name.trim().is_empty() {
            return Err(invalid("model name cannot be empty".into()));
        }
        if !self.intercept.is_finite() {
            return Err(invalid("intercept must be finite".into()));
        }

        let mut seen = HashSet::new();
        for term in &self.features {
            if !seen.insert(term.name()) {
                return Err(invalid(format!("feature `{}` is listed twice", term.name())));
            }
            match term {
                FeatureTerm::Numeric {
                    name,
                    mean,
                    scale,
                    weight,
                } => {
                    if !(mean.is_finite() && weight.is_finite()) {
                        return Err(invalid(format!("feature `{name}` has a non-finite term")));
                    }
                    if !scale.is_finite() || *scale == 0.0 {
                        return Err(invalid(format!(
                            "feature `{name}` must have a finite, non-zero scale"
                        )));
                    }
                }
                FeatureTerm::Categorical { name, weights } => {
                    if weights.values().any(|w| !w.is_finite()) {
                        return Err(invalid(format!(
                            "feature `{name}` has a non-finite category weight"
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    fn linear_score(&self, row: &FeatureRow) -> Result<f64, ModelError> {
        let mut score = self.intercept;
        for term in &self.features {
            let value = row
                .get(term.name())
                .ok_or_else(|| ModelError::MissingFeature {
                    model: self.name.clone(),
                    feature: term.name().to_string(),
                })?;
            score += match (term, value) {
                (
                    FeatureTerm::Numeric {
                        mean,
                        scale,
                        weight,
                        ..
                    },
                    FeatureValue::Number(x),
                ) => (x - mean) / scale * weight,
                (FeatureTerm::Categorical { weights, .. }, FeatureValue::Category(label)) => {
                    weights.get(label).copied().unwrap_or(0.0)
                }
                (FeatureTerm::Numeric { name, .. }, FeatureValue::Category(_)) => {
                    return Err(ModelError::FeatureKind {
                        model: self.name.clone(),
                        feature: name.clone(),
                        expected: "numeric",
                    })
                }
                (FeatureTerm::Categorical { name, .. }, FeatureValue::Number(_)) => {
                    return Err(ModelError::FeatureKind {
                        model: self.name.clone(),
                        feature: name.clone(),
                        expected: "categorical",
                    })
                }
            };
        }
        Ok(score)
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

impl Classifier for LogisticModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn predict_proba(&self, row: &FeatureRow) -> Result<[f64; 2], ModelError> {
        let positive = sigmoid(self.linear_score(row)?);
        Ok([1.0 - positive, positive])
    }

    fn feature_names(&self) -> Vec<&str> {
        self.features.iter().map(FeatureTerm::name).collect()
    }
}
