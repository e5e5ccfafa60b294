//! Runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into the
//! services that need it. Request handlers never read process-wide
//! environment variables, which keeps behaviour consistent across threads and
//! test harnesses.

use crate::constants::{
    DEFAULT_BIND_ADDR, DEFAULT_MODEL_DIR, DEFAULT_SESSION_COOKIE, DEFAULT_SESSION_TTL_MINUTES,
};
use crate::{ClinriskError, ClinriskResult};
use chrono::Duration;
use std::path::{Path, PathBuf};

/// Environment variable names read by [`AppConfig::from_env`].
pub mod env {
    pub const ADDR: &str = "CLINRISK_ADDR";
    pub const MODEL_DIR: &str = "CLINRISK_MODEL_DIR";
    pub const SESSION_TTL_MINUTES: &str = "CLINRISK_SESSION_TTL_MINUTES";
    pub const SESSION_COOKIE: &str = "CLINRISK_SESSION_COOKIE";
    pub const SECURE_COOKIE: &str = "CLINRISK_SECURE_COOKIE";
    pub const STRICT_DISEASE_ROUTES: &str = "CLINRISK_STRICT_DISEASE_ROUTES";
}

/// Application configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct AppConfig {
    bind_addr: String,
    model_dir_override: Option<PathBuf>,
    session_ttl: Duration,
    session_cookie: String,
    secure_cookie: bool,
    strict_disease_routes: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.into(),
            model_dir_override: None,
            session_ttl: Duration::minutes(DEFAULT_SESSION_TTL_MINUTES),
            session_cookie: DEFAULT_SESSION_COOKIE.into(),
            secure_cookie: false,
            strict_disease_routes: false,
        }
    }
}

impl AppConfig {
    /// Resolve configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `ClinriskError::InvalidConfig` if any variable holds an invalid value.
    pub fn from_env() -> ClinriskResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve configuration from an arbitrary key lookup.
    ///
    /// Unset or blank values take their defaults.
    ///
    /// # Errors
    ///
    /// Returns `ClinriskError::InvalidConfig` if any value is invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ClinriskResult<Self> {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mut cfg = Self::default();

        if let Some(addr) = get(env::ADDR) {
            cfg.bind_addr = addr;
        }
        cfg.model_dir_override = get(env::MODEL_DIR).map(PathBuf::from);

        if let Some(minutes) = get(env::SESSION_TTL_MINUTES) {
            let minutes: i64 = minutes.parse().map_err(|_| {
                ClinriskError::InvalidConfig(format!(
                    "{} must be a whole number of minutes, got {minutes:?}",
                    env::SESSION_TTL_MINUTES
                ))
            })?;
            cfg = cfg.with_session_ttl_minutes(minutes)?;
        }

        if let Some(name) = get(env::SESSION_COOKIE) {
            validate_cookie_name(&name)?;
            cfg.session_cookie = name;
        }

        if let Some(value) = get(env::SECURE_COOKIE) {
            cfg.secure_cookie = parse_bool(env::SECURE_COOKIE, &value)?;
        }
        if let Some(value) = get(env::STRICT_DISEASE_ROUTES) {
            cfg.strict_disease_routes = parse_bool(env::STRICT_DISEASE_ROUTES, &value)?;
        }

        Ok(cfg)
    }

    /// Override the session lifetime.
    ///
    /// # Errors
    ///
    /// Returns `ClinriskError::InvalidConfig` unless `minutes` is positive.
    pub fn with_session_ttl_minutes(mut self, minutes: i64) -> ClinriskResult<Self> {
        if minutes <= 0 || minutes > i64::from(u32::MAX) {
            return Err(ClinriskError::InvalidConfig(format!(
                "session TTL must be a positive number of minutes, got {minutes}"
            )));
        }
        self.session_ttl = Duration::minutes(minutes);
        Ok(self)
    }

    pub fn with_model_dir(mut self, dir: PathBuf) -> Self {
        self.model_dir_override = Some(dir);
        self
    }

    pub fn with_strict_disease_routes(mut self, strict: bool) -> Self {
        self.strict_disease_routes = strict;
        self
    }

    pub fn bind_addr(&self) -> &str {
        &self.bind_addr
    }

    pub fn model_dir_override(&self) -> Option<&Path> {
        self.model_dir_override.as_deref()
    }

    pub fn session_ttl(&self) -> Duration {
        self.session_ttl
    }

    pub fn session_cookie(&self) -> &str {
        &self.session_cookie
    }

    pub fn secure_cookie(&self) -> bool {
        self.secure_cookie
    }

    pub fn strict_disease_routes(&self) -> bool {
        self.strict_disease_routes
    }
}

fn parse_bool(key: &str, value: &str) -> ClinriskResult<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ClinriskError::InvalidConfig(format!(
            "{key} must be a boolean, got {value:?}"
        ))),
    }
}

fn validate_cookie_name(name: &str) -> ClinriskResult<()> {
    let ok = name
        .bytes()
        .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'z' | b'A'..=b'Z' | b'-' | b'_' | b'.'));
    if !ok {
        return Err(ClinriskError::InvalidConfig(format!(
            "session cookie name contains invalid characters: {name:?}"
        )));
    }
    Ok(())
}

/// Resolve the model directory without reading environment variables.
///
/// If `override_dir` is provided it must be an existing directory. Otherwise
/// this looks for `models/` relative to the current working directory and then
/// walks up from `CARGO_MANIFEST_DIR`.
///
/// # Errors
///
/// Returns `ClinriskError::InvalidConfig` if no model directory can be found.
pub fn resolve_model_dir(override_dir: Option<&Path>) -> ClinriskResult<PathBuf> {
    if let Some(dir) = override_dir {
        if dir.is_dir() {
            return Ok(dir.to_path_buf());
        }
        return Err(ClinriskError::InvalidConfig(format!(
            "{} override is not a directory: {}",
            env::MODEL_DIR,
            dir.display()
        )));
    }

    let cwd_relative = PathBuf::from(DEFAULT_MODEL_DIR);
    if cwd_relative.is_dir() {
        return Ok(cwd_relative);
    }

    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    for ancestor in manifest_dir.ancestors() {
        let candidate = ancestor.join(DEFAULT_MODEL_DIR);
        if candidate.is_dir() {
            return Ok(candidate);
        }
    }

    Err(ClinriskError::InvalidConfig(format!(
        "could not locate a {DEFAULT_MODEL_DIR}/ directory"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let cfg = AppConfig::from_lookup(lookup(&[])).expect("defaults");
        assert_eq!(cfg.bind_addr(), "0.0.0.0:5000");
        assert_eq!(cfg.model_dir_override(), None);
        assert_eq!(cfg.session_ttl(), Duration::minutes(24 * 60));
        assert_eq!(cfg.session_cookie(), "clinrisk_session");
        assert!(!cfg.secure_cookie());
        assert!(!cfg.strict_disease_routes());
    }

    #[test]
    fn reads_every_variable() {
        let cfg = AppConfig::from_lookup(lookup(&[
            (env::ADDR, "127.0.0.1:8080"),
            (env::MODEL_DIR, "/opt/models"),
            (env::SESSION_TTL_MINUTES, "30"),
            (env::SESSION_COOKIE, "triage"),
            (env::SECURE_COOKIE, "true"),
            (env::STRICT_DISEASE_ROUTES, "1"),
        ]))
        .expect("valid config");

        assert_eq!(cfg.bind_addr(), "127.0.0.1:8080");
        assert_eq!(cfg.model_dir_override(), Some(Path::new("/opt/models")));
        assert_eq!(cfg.session_ttl(), Duration::minutes(30));
        assert_eq!(cfg.session_cookie(), "triage");
        assert!(cfg.secure_cookie());
        assert!(cfg.strict_disease_routes());
    }

    #[test]
    fn blank_values_take_defaults() {
        let cfg = AppConfig::from_lookup(lookup(&[(env::ADDR, "   ")])).expect("defaults");
        assert_eq!(cfg.bind_addr(), "0.0.0.0:5000");
    }

    #[test]
    fn rejects_invalid_values() {
        for (key, value) in [
            (env::SESSION_TTL_MINUTES, "soon"),
            (env::SESSION_TTL_MINUTES, "0"),
            (env::SECURE_COOKIE, "maybe"),
            (env::SESSION_COOKIE, "bad cookie;"),
        ] {
            let err = AppConfig::from_lookup(lookup(&[(key, value)])).expect_err(key);
            assert!(matches!(err, ClinriskError::InvalidConfig(_)), "{key}={value}");
        }
    }

    #[test]
    fn model_dir_override_must_exist() {
        let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
        let resolved = resolve_model_dir(Some(temp_dir.path())).expect("existing dir");
        assert_eq!(resolved, temp_dir.path().to_path_buf());

        let err = resolve_model_dir(Some(&temp_dir.path().join("missing"))).expect_err("missing");
        assert!(matches!(err, ClinriskError::InvalidConfig(_)));
    }
}
