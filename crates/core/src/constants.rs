//! Constants used throughout the clinical risk core crate.
//!
//! This module contains file names, session keys and defaults so that the
//! REST layer, the CLI and the core agree on a single spelling.

/// Default directory holding the six classifier artifacts.
pub const DEFAULT_MODEL_DIR: &str = "models";

/// Default socket address for the HTTP server.
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5000";

/// Default session cookie name.
pub const DEFAULT_SESSION_COOKIE: &str = "clinrisk_session";

/// Default session lifetime in minutes, measured from the last stage-1 submission.
pub const DEFAULT_SESSION_TTL_MINUTES: i64 = 24 * 60;

/// Session key holding the submitted stage-1 vitals.
pub const STAGE1_DATA_KEY: &str = "stage1_data";

/// Session key holding the ordered stage-1 ranking.
pub const RANKING_KEY: &str = "ranking";

/// Extension of serialised classifier artifacts.
pub const MODEL_FILE_EXTENSION: &str = "json";

/// Probability below which a stage-2 result is low risk.
pub const LOW_RISK_UPPER_BOUND: f64 = 0.30;

/// Probability below which a stage-2 result is moderate risk.
pub const MODERATE_RISK_UPPER_BOUND: f64 = 0.60;

/// Advisory note for low-risk results.
pub const LOW_RISK_NOTE: &str = "Risk is low. Maintain a healthy lifestyle and routine check-ups.";

/// Advisory note for moderate-risk results.
pub const MODERATE_RISK_NOTE: &str =
    "Risk is moderate. Consider consulting a doctor and reviewing lifestyle habits.";

/// Advisory note for high-risk results.
pub const HIGH_RISK_NOTE: &str =
    "Risk is high. Immediate medical attention and follow-up recommended.";

/// Disclaimer appended to every stage-2 result.
pub const DISCLAIMER: &str =
    "This prediction is for informational purposes only and is not a medical diagnosis.";
