//! Session state store.
//!
//! `StateStore` is the single source of truth for one intake session.
//! Readers get an `Arc` snapshot that never changes underneath them;
//! writers go through `apply`, which runs the mutation on a private copy,
//! validates the result, and swaps it in only when every invariant holds.
//! A rejected mutation leaves the published state untouched.

use std::sync::{Arc, Mutex, PoisonError, RwLock};

use serde::Serialize;

use crate::models::{ConversationLog, ConversationMessage, DiagnosisData, Medication, UserProfile};

// ═══════════════════════════════════════════════════════════
// SessionState: one immutable snapshot
// ═══════════════════════════════════════════════════════════

/// Everything the dashboard renders for the session.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SessionState {
    /// Bumped by one on every successful `apply`.
    pub version: u64,
    pub conversation: ConversationLog,
    pub user_profile: UserProfile,
    pub diagnosis: DiagnosisData,
    /// Active high-risk alert. `None` means no active warning.
    pub warning: Option<String>,
    pub medications: Vec<Medication>,
    /// System-authored notice from a failed or cancelled turn.
    /// Rendered after the log, not part of it.
    pub notice: Option<ConversationMessage>,
}

impl SessionState {
    /// Check the data-model invariants.
    pub fn validate(&self) -> Result<(), StoreError> {
        if !UserProfile::age_in_range(i64::from(self.user_profile.age)) {
            return Err(StoreError::InvalidMutation(format!(
                "age {} outside 1..=100",
                self.user_profile.age
            )));
        }
        if let Some(value) = self.diagnosis.out_of_range_value() {
            return Err(StoreError::InvalidMutation(format!(
                "diagnosis value {value} outside [0, 1]"
            )));
        }
        if let Some(med) = self.medications.iter().find(|m| !m.is_valid()) {
            return Err(StoreError::InvalidMutation(format!(
                "invalid reminder {:?} at {:?}",
                med.name, med.time
            )));
        }
        if matches!(&self.warning, Some(w) if w.trim().is_empty()) {
            return Err(StoreError::InvalidMutation(
                "warning must be absent rather than blank".into(),
            ));
        }
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════
// StateStore
// ═══════════════════════════════════════════════════════════

pub struct StateStore {
    current: RwLock<Arc<SessionState>>,
    /// Serializes writers. Mutations run under this lock only, so readers
    /// are never blocked by a running mutation.
    writer: Mutex<()>,
}

impl StateStore {
    pub fn new() -> Self {
        Self::with_state(SessionState::default())
    }

    pub fn with_state(state: SessionState) -> Self {
        Self {
            current: RwLock::new(Arc::new(state)),
            writer: Mutex::new(()),
        }
    }

    /// Current snapshot (read-only).
    pub fn get(&self) -> Result<Arc<SessionState>, StoreError> {
        self.current
            .read()
            .map(|guard| Arc::clone(&guard))
            .map_err(|_| StoreError::LockPoisoned)
    }

    /// Apply an atomic mutation.
    ///
    /// The closure edits a copy of the current state. If it returns an
    /// error, panics, or the edited state fails `validate()`, nothing is
    /// published. The published state is only locked for the final swap.
    pub fn apply<T, E, F>(&self, mutation: F) -> Result<T, E>
    where
        F: FnOnce(&mut SessionState) -> Result<T, E>,
        E: From<StoreError>,
    {
        // A writer that panicked published nothing, so the lock is still sound.
        let _writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);

        let base = self.get()?;
        let mut next = (*base).clone();
        let out = mutation(&mut next)?;
        next.validate().map_err(E::from)?;
        next.version = base.version + 1;

        let mut current = self
            .current
            .write()
            .map_err(|_| E::from(StoreError::LockPoisoned))?;
        tracing::debug!(version = next.version, "Session state updated");
        *current = Arc::new(next);
        Ok(out)
    }
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new()
    }
}

// ═══════════════════════════════════════════════════════════
// Error types
// ═══════════════════════════════════════════════════════════

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Invalid mutation: {0}")]
    InvalidMutation(String),
    #[error("Internal lock error")]
    LockPoisoned,
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════
