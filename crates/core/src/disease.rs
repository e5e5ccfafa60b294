//! Disease identifiers and route resolution.

use crate::{ClinriskError, ClinriskResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the three screened conditions.
///
/// The declaration order is the canonical order used for ties during
/// stage-1 screening: heart, diabetes, hypertension.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Disease {
    Heart,
    Diabetes,
    Hypertension,
}

impl Disease {
    /// All diseases in canonical order.
    pub const ALL: [Disease; 3] = [Disease::Heart, Disease::Diabetes, Disease::Hypertension];

    /// Lower-case identifier used in URLs and session data.
    pub fn as_str(self) -> &'static str {
        match self {
            Disease::Heart => "heart",
            Disease::Diabetes => "diabetes",
            Disease::Hypertension => "hypertension",
        }
    }

    /// Capitalised stem used in artifact file names.
    pub(crate) fn artifact_stem(self) -> &'static str {
        match self {
            Disease::Heart => "Heart",
            Disease::Diabetes => "Diabetes",
            Disease::Hypertension => "Hypertension",
        }
    }
}

impl fmt::Display for Disease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Disease {
    type Err = ClinriskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "heart" => Ok(Disease::Heart),
            "diabetes" => Ok(Disease::Diabetes),
            "hypertension" => Ok(Disease::Hypertension),
            other => Err(ClinriskError::UnknownDisease(other.to_string())),
        }
    }
}

/// Resolve the disease named by a `/stage2/{disease}` path segment.
///
/// Matching is exact and case-sensitive. Unrecognised segments fall through to
/// [`Disease::Diabetes`] unless `strict` is set, in which case they are rejected.
///
/// # Errors
///
/// Returns `ClinriskError::UnknownDisease` for an unrecognised segment in strict mode.
pub fn resolve_route_segment(segment: &str, strict: bool) -> ClinriskResult<Disease> {
    match segment.parse::<Disease>() {
        Ok(disease) => Ok(disease),
        Err(err) if strict => Err(err),
        Err(_) => {
            tracing::warn!(
                requested = segment,
                "unknown disease in stage-2 route, falling through to diabetes"
            );
            Ok(Disease::Diabetes)
        }
    }
}
