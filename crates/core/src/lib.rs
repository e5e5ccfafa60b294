//! # Clinrisk Core
//!
//! Core logic for the two-stage clinical risk workflow.
//!
//! This crate contains the domain and nothing else:
//! - Typed stage-1 vitals and stage-2 disease records, coerced from submitted forms
//! - The [`Classifier`] capability and the bundled logistic artifact backend
//! - The six-model [`ModelRegistry`], loaded once at startup
//! - Stage-1 screening and stage-2 risk estimation
//! - The pluggable [`SessionStore`] that carries stage-1 data into stage 2
//!
//! **No API concerns**: HTTP routing, cookies and page rendering belong in `api-rest`.

pub mod config;
pub mod constants;
pub mod disease;
pub mod error;
pub mod inference;
pub mod model;
pub mod records;
pub mod registry;
pub mod risk;
pub mod screening;
pub mod session;
pub mod validation;

#[cfg(test)]
mod test_support;

pub use config::{resolve_model_dir, AppConfig};
pub use disease::Disease;
pub use error::{ClinriskError, ClinriskResult, ModelError};
pub use inference::InferenceContext;
pub use model::{Classifier, ConstantClassifier, LogisticModel, Stage};
pub use records::{
    DiabetesRecord, DiseaseFeatureRecord, FeatureRow, FeatureValue, Gender, HeartRecord,
    HypertensionRecord, VitalsRecord,
};
pub use registry::ModelRegistry;
pub use risk::{RiskAssessment, RiskTier};
pub use screening::{RankedDisease, ScreeningResult};
pub use session::{MemorySessionStore, SessionId, SessionState, SessionStore};
pub use validation::{FieldError, ValidationErrors};
