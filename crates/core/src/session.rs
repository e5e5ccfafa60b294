//! Per-user session state.
//!
//! The workflow carries stage-1 data across two request/response cycles in a
//! key/value session addressed by an opaque identifier (held in a cookie by
//! the HTTP layer). The store is an explicit, pluggable interface rather than
//! ambient global state.
//!
//! ## Lifecycle
//!
//! - Created or overwritten on every stage-1 submission
//! - Read, never mutated, when rendering a stage-2 form
//! - Never explicitly cleared; it lapses after the configured time-to-live

use crate::constants::{RANKING_KEY, STAGE1_DATA_KEY};
use crate::disease::Disease;
use crate::records::{Gender, HeartRecord, VitalsRecord};
use crate::screening::{RankedDisease, ScreeningResult};
use crate::{ClinriskError, ClinriskResult};
use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use uuid::Uuid;

// ============================================================================
// Session identity and store
// ============================================================================

/// Opaque session identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Generate a fresh random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an identifier previously issued by [`SessionId::new`].
    pub fn parse(input: &str) -> Option<Self> {
        Uuid::parse_str(input.trim()).ok().map(Self)
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

/// Key/value session storage.
///
/// Writes are last-write-wins; there is no cross-request coordination.
pub trait SessionStore: Send + Sync {
    /// Value stored under `key`, or `None` if the session or key is absent or expired.
    fn get(&self, session: &SessionId, key: &str) -> Option<Value>;

    /// Store `value` under `key`, creating the session if needed.
    fn set(&self, session: &SessionId, key: &str, value: Value);

    /// True if the session exists and has not expired.
    fn contains(&self, session: &SessionId) -> bool;
}

struct SessionEntry {
    values: HashMap<String, Value>,
    updated_at: DateTime<Utc>,
}

/// In-process session store with a time-to-live measured from the last write.
pub struct MemorySessionStore {
    ttl: Duration,
    sessions: RwLock<HashMap<SessionId, SessionEntry>>,
}

impl MemorySessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    fn is_live(&self, entry: &SessionEntry, now: DateTime<Utc>) -> bool {
        now - entry.updated_at < self.ttl
    }

    pub(crate) fn get_at(
        &self,
        session: &SessionId,
        key: &str,
        now: DateTime<Utc>,
    ) -> Option<Value> {
        let sessions = self.sessions.read();
        let entry = sessions.get(session)?;
        if !self.is_live(entry, now) {
            return None;
        }
        entry.values.get(key).cloned()
    }

    pub(crate) fn set_at(&self, session: &SessionId, key: &str, value: Value, now: DateTime<Utc>) {
        let mut sessions = self.sessions.write();

        let before = sessions.len();
        sessions.retain(|id, entry| id == session || now - entry.updated_at < self.ttl);
        let purged = before - sessions.len();
        if purged > 0 {
            tracing::debug!(purged, "purged expired sessions");
        }

        let entry = sessions.entry(*session).or_insert_with(|| SessionEntry {
            values: HashMap::new(),
            updated_at: now,
        });
        if now - entry.updated_at >= self.ttl {
            entry.values.clear();
        }
        entry.values.insert(key.to_string(), value);
        entry.updated_at = now;
    }

    pub(crate) fn contains_at(&self, session: &SessionId, now: DateTime<Utc>) -> bool {
        self.sessions
            .read()
            .get(session)
            .is_some_and(|entry| self.is_live(entry, now))
    }

    /// Number of sessions held, including expired ones not yet purged.
    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, session: &SessionId, key: &str) -> Option<Value> {
        self.get_at(session, key, Utc::now())
    }

    fn set(&self, session: &SessionId, key: &str, value: Value) {
        self.set_at(session, key, value, Utc::now())
    }

    fn contains(&self, session: &SessionId) -> bool {
        self.contains_at(session, Utc::now())
    }
}

// ============================================================================
// Typed workflow state
// ============================================================================

/// Stage-1 data carried into stage 2.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SessionState {
    pub stage1_data: Option<VitalsRecord>,
    pub ranking: Vec<RankedDisease>,
}

impl SessionState {
    /// Read the workflow state for `session`; absent entries yield an empty state.
    ///
    /// # Errors
    ///
    /// Returns `ClinriskError::SessionDeserialization` if a stored value is malformed.
    pub fn load(store: &dyn SessionStore, session: &SessionId) -> ClinriskResult<Self> {
        let stage1_data: Option<VitalsRecord> = store
            .get(session, STAGE1_DATA_KEY)
            .map(serde_json::from_value)
            .transpose()
            .map_err(ClinriskError::SessionDeserialization)?;
        let ranking: Vec<RankedDisease> = store
            .get(session, RANKING_KEY)
            .map(serde_json::from_value)
            .transpose()
            .map_err(ClinriskError::SessionDeserialization)?
            .unwrap_or_default();
        Ok(Self {
            stage1_data,
            ranking,
        })
    }

    /// Record a stage-1 submission, overwriting any earlier one.
    ///
    /// # Errors
    ///
    /// Returns `ClinriskError::SessionSerialization` if a value cannot be serialised.
    pub fn save_stage1(
        store: &dyn SessionStore,
        session: &SessionId,
        vitals: &VitalsRecord,
        screening: &ScreeningResult,
    ) -> ClinriskResult<()> {
        let vitals = serde_json::to_value(vitals).map_err(ClinriskError::SessionSerialization)?;
        let ranking = serde_json::to_value(&screening.ranking)
            .map_err(ClinriskError::SessionSerialization)?;
        store.set(session, STAGE1_DATA_KEY, vitals);
        store.set(session, RANKING_KEY, ranking);
        Ok(())
    }
}

/// Stage-2 form values derived from earlier vitals, keyed by form field name.
///
/// Returns an empty map when there are no vitals.
pub fn stage2_prefill(
    disease: Disease,
    vitals: Option<&VitalsRecord>,
) -> BTreeMap<&'static str, String> {
    let mut prefill = BTreeMap::new();
    let Some(v) = vitals else {
        return prefill;
    };

    let yes_no = |flag: i64| (if flag != 0 { "Yes" } else { "No" }).to_string();

    match disease {
        Disease::Heart => {
            prefill.insert("age", v.age.to_string());
            prefill.insert("sex", v.gender.as_str().to_string());
            prefill.insert("resting_blood_pressure", v.systolic_bp.to_string());
            prefill.insert("cholestoral", v.cholesterol.to_string());
            let fbs = if v.glucose > 120 {
                HeartRecord::HIGH_FASTING_BLOOD_SUGAR
            } else {
                "<=120 mg/ml"
            };
            prefill.insert("fasting_blood_sugar", fbs.to_string());
        }
        Disease::Hypertension => {
            prefill.insert("Age", v.age.to_string());
            prefill.insert("BMI", v.bmi.to_string());
            let smoking = if v.smoking != 0 { "Current" } else { "Never" };
            prefill.insert("Smoking_Status", smoking.to_string());
            prefill.insert("Family_History", yes_no(v.family_history));
        }
        Disease::Diabetes => {
            prefill.insert("Age", v.age.to_string());
            prefill.insert("Glucose", v.glucose.to_string());
            prefill.insert("BloodPressure", v.diastolic_bp.to_string());
            prefill.insert("BMI", v.bmi.to_string());
            if v.gender == Gender::Male {
                prefill.insert("Pregnancies", "0".to_string());
            }
        }
    }

    prefill
}
