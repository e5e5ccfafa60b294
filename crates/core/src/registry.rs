//! Model registry.
//!
//! Holds exactly six classifiers: one per disease per stage. The registry is
//! built once at startup, fails if any artifact is missing or malformed, and is
//! read-only afterwards. It is shared between requests behind an `Arc`.

use crate::constants::MODEL_FILE_EXTENSION;
use crate::disease::Disease;
use crate::error::ModelError;
use crate::model::{Classifier, LogisticModel, Stage};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// File name of the artifact for `disease` at `stage`, e.g. `Heart_Stage1_Model.json`.
pub fn artifact_file_name(disease: Disease, stage: Stage) -> String {
    format!(
        "{}_Stage{}_Model.{}",
        disease.artifact_stem(),
        stage.number(),
        MODEL_FILE_EXTENSION
    )
}

#[derive(Clone)]
struct StageModels {
    heart: Arc<dyn Classifier>,
    diabetes: Arc<dyn Classifier>,
    hypertension: Arc<dyn Classifier>,
}

impl StageModels {
    fn get(&self, disease: Disease) -> &dyn Classifier {
        match disease {
            Disease::Heart => self.heart.as_ref(),
            Disease::Diabetes => self.diabetes.as_ref(),
            Disease::Hypertension => self.hypertension.as_ref(),
        }
    }
}

/// The six loaded classifiers.
#[derive(Clone)]
pub struct ModelRegistry {
    screening: StageModels,
    assessment: StageModels,
}

impl ModelRegistry {
    /// Start an empty builder.
    pub fn builder() -> ModelRegistryBuilder {
        ModelRegistryBuilder::default()
    }

    /// Load all six artifacts from `model_dir`.
    ///
    /// Artifacts are loaded in a fixed order (stage 1 then stage 2, heart,
    /// diabetes, hypertension) and the first failure aborts the load.
    ///
    /// # Errors
    ///
    /// Returns a `ModelError` naming the directory or artifact that could not be loaded.
    pub fn load(model_dir: &Path) -> Result<Self, ModelError> {
        if !model_dir.is_dir() {
            return Err(ModelError::ModelDirMissing {
                path: model_dir.to_path_buf(),
            });
        }

        let mut builder = Self::builder();
        for stage in Stage::ALL {
            for disease in Disease::ALL {
                let path = artifact_path(model_dir, disease, stage);
                let model = LogisticModel::load(&path)?;
                tracing::info!(
                    %disease,
                    %stage,
                    model = model.name(),
                    path = %path.display(),
                    "loaded classifier"
                );
                builder = builder.with(disease, stage, Arc::new(model));
            }
        }
        builder.build()
    }

    /// The classifier for `disease` at `stage`.
    pub fn classifier(&self, disease: Disease, stage: Stage) -> &dyn Classifier {
        match stage {
            Stage::Screening => self.screening.get(disease),
            Stage::Assessment => self.assessment.get(disease),
        }
    }

    /// Every registered classifier in load order.
    pub fn entries(&self) -> impl Iterator<Item = (Disease, Stage, &dyn Classifier)> + '_ {
        Stage::ALL.into_iter().flat_map(move |stage| {
            Disease::ALL
                .into_iter()
                .map(move |disease| (disease, stage, self.classifier(disease, stage)))
        })
    }
}

fn artifact_path(model_dir: &Path, disease: Disease, stage: Stage) -> PathBuf {
    model_dir.join(artifact_file_name(disease, stage))
}

/// Collects classifiers until all six slots are filled.
#[derive(Default)]
pub struct ModelRegistryBuilder {
    slots: Vec<(Disease, Stage, Arc<dyn Classifier>)>,
}

impl ModelRegistryBuilder {
    /// Register `classifier` for `disease` at `stage`, replacing any earlier entry.
    pub fn with(mut self, disease: Disease, stage: Stage, classifier: Arc<dyn Classifier>) -> Self {
        self.slots.retain(|(d, s, _)| !(*d == disease && *s == stage));
        self.slots.push((disease, stage, classifier));
        self
    }

    fn take(&self, disease: Disease, stage: Stage) -> Result<Arc<dyn Classifier>, ModelError> {
        self.slots
            .iter()
            .find(|(d, s, _)| *d == disease && *s == stage)
            .map(|(_, _, c)| Arc::clone(c))
            .ok_or(ModelError::MissingClassifier { disease, stage })
    }

    fn stage(&self, stage: Stage) -> Result<StageModels, ModelError> {
        Ok(StageModels {
            heart: self.take(Disease::Heart, stage)?,
            diabetes: self.take(Disease::Diabetes, stage)?,
            hypertension: self.take(Disease::Hypertension, stage)?,
        })
    }

    /// Finish the registry.
    ///
    /// # Errors
    ///
    /// Returns `ModelError::MissingClassifier` for the first empty slot.
    pub fn build(self) -> Result<ModelRegistry, ModelError> {
        Ok(ModelRegistry {
            screening: self.stage(Stage::Screening)?,
            assessment: self.stage(Stage::Assessment)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ConstantClassifier;
    use crate::records::FeatureRow;
    use tempfile::TempDir;

    fn write_artifact(dir: &Path, disease: Disease, stage: Stage, intercept: f64) {
        let body = format!(
            r#"{{"name": "{}-{}", "intercept": {}, "features": []}}"#,
            disease, stage, intercept
        );
        std::fs::write(dir.join(artifact_file_name(disease, stage)), body)
            .expect("write artifact");
    }

    fn write_all(dir: &Path) {
        for stage in Stage::ALL {
            for disease in Disease::ALL {
                write_artifact(dir, disease, stage, 0.0);
            }
        }
    }

    #[test]
    fn artifact_names_follow_convention() {
        assert_eq!(
            artifact_file_name(Disease::Heart, Stage::Screening),
            "Heart_Stage1_Model.json"
        );
        assert_eq!(
            artifact_file_name(Disease::Hypertension, Stage::Assessment),
            "Hypertension_Stage2_Model.json"
        );
    }

    #[test]
    fn loads_all_six_artifacts() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        write_all(temp_dir.path());

        let registry = ModelRegistry::load(temp_dir.path()).expect("load registry");
        assert_eq!(registry.entries().count(), 6);
        assert_eq!(
            registry
                .classifier(Disease::Diabetes, Stage::Assessment)
                .name(),
            "diabetes-stage-2"
        );
    }

    #[test]
    fn missing_artifact_fails_the_load() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        write_all(temp_dir.path());
        std::fs::remove_file(
            temp_dir
                .path()
                .join(artifact_file_name(Disease::Hypertension, Stage::Assessment)),
        )
        .expect("remove artifact");

        let err = ModelRegistry::load(temp_dir.path())
            .err()
            .expect("load should fail");
        match err {
            ModelError::ArtifactRead { path, .. } => {
                assert!(path.ends_with("Hypertension_Stage2_Model.json"));
            }
            other => panic!("expected ArtifactRead error, got {other:?}"),
        }
    }

    #[test]
    fn corrupt_artifact_fails_the_load() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        write_all(temp_dir.path());
        std::fs::write(
            temp_dir
                .path()
                .join(artifact_file_name(Disease::Heart, Stage::Screening)),
            "not json",
        )
        .expect("corrupt artifact");

        let err = ModelRegistry::load(temp_dir.path())
            .err()
            .expect("load should fail");
        assert!(matches!(err, ModelError::ArtifactParse { .. }));
    }

    #[test]
    fn missing_directory_fails_the_load() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let err = ModelRegistry::load(&temp_dir.path().join("absent"))
            .err()
            .expect("load should fail");
        assert!(matches!(err, ModelError::ModelDirMissing { .. }));
    }

    #[test]
    fn builder_requires_every_slot() {
        let err = ModelRegistry::builder()
            .with(
                Disease::Heart,
                Stage::Screening,
                Arc::new(ConstantClassifier::new("h1", 0.1)),
            )
            .build()
            .err()
            .expect("incomplete registry");
        assert!(matches!(
            err,
            ModelError::MissingClassifier {
                disease: Disease::Diabetes,
                stage: Stage::Screening
            }
        ));
    }

    #[test]
    fn later_registration_replaces_earlier() {
        let mut builder = ModelRegistry::builder();
        for stage in Stage::ALL {
            for disease in Disease::ALL {
                builder = builder.with(disease, stage, Arc::new(ConstantClassifier::new("a", 0.1)));
            }
        }
        let registry = builder
            .with(
                Disease::Heart,
                Stage::Assessment,
                Arc::new(ConstantClassifier::new("b", 0.9)),
            )
            .build()
            .expect("complete registry");

        let heart = registry.classifier(Disease::Heart, Stage::Assessment);
        assert_eq!(heart.name(), "b");
        assert_eq!(heart.positive_probability(&FeatureRow::new()).unwrap(), 0.9);
    }
}
