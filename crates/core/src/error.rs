use crate::disease::Disease;
use crate::model::Stage;
use crate::validation::ValidationErrors;
use std::path::PathBuf;

/// Failures raised while loading or invoking a classifier.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("model directory does not exist: {path}", path = path.display())]
    ModelDirMissing { path: PathBuf },
    #[error("failed to read model artifact {path}: {source}", path = path.display())]
    ArtifactRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to deserialise model artifact {path}: {source}", path = path.display())]
    ArtifactParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid model artifact {name}: {reason}")]
    InvalidArtifact { name: String, reason: String },
    #[error("no {stage} classifier registered for {disease}")]
    MissingClassifier { disease: Disease, stage: Stage },

    #[error("model {model} requires feature `{feature}` which is missing from the input row")]
    MissingFeature { model: String, feature: String },
    #[error("model {model} expected a {expected} value for feature `{feature}`")]
    FeatureKind {
        model: String,
        feature: String,
        expected: &'static str,
    },
    #[error("model {model} returned probability {probability} outside [0, 1]")]
    ProbabilityOutOfRange { model: String, probability: f64 },
}

#[derive(Debug, thiserror::Error)]
pub enum ClinriskError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error("unknown disease: {0}")]
    UnknownDisease(String),
    #[error("failed to serialise session value: {0}")]
    SessionSerialization(serde_json::Error),
    #[error("failed to deserialise session value: {0}")]
    SessionDeserialization(serde_json::Error),
}

pub type ClinriskResult<T> = std::result::Result<T, ClinriskError>;
