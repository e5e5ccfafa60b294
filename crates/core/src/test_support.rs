//! Shared fixtures for unit tests.

use crate::disease::Disease;
use crate::model::{ConstantClassifier, Stage};
use crate::registry::ModelRegistry;
use std::sync::Arc;

/// A registry of constant classifiers; probabilities are given in canonical disease order.
pub(crate) fn registry_with(stage1: [f64; 3], stage2: [f64; 3]) -> Arc<ModelRegistry> {
    let mut builder = ModelRegistry::builder();
    for (i, disease) in Disease::ALL.into_iter().enumerate() {
        builder = builder
            .with(
                disease,
                Stage::Screening,
                Arc::new(ConstantClassifier::new(format!("{disease}-1"), stage1[i])),
            )
            .with(
                disease,
                Stage::Assessment,
                Arc::new(ConstantClassifier::new(format!("{disease}-2"), stage2[i])),
            );
    }
    Arc::new(builder.build().expect("complete registry"))
}
