//! Conversation pipeline: one user turn, applied atomically.
//!
//! validate → ask backend → map → publish. The user message, the system
//! answer, the diagnosis data and the warning are published in a single
//! `StateStore::apply`, so readers never see a half-finished turn.
//! Backend failures and cancellations are recovered here: the user
//! message is still logged, a system notice explains what happened, and
//! diagnosis data and warning keep their previous values.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, TryLockError};

use super::backend::DiagnosisBackend;
use super::mapper::{map_response, MappedResponse};
use super::{BackendError, PipelineError};
use crate::models::ConversationMessage;
use crate::store::StateStore;

/// Notice shown when the backend could not produce a usable answer.
pub const BACKEND_FAILURE_NOTICE: &str = "抱歉，诊断服务暂时不可用，请稍后重试。";
/// Notice shown when the user cancelled the request.
pub const CANCELLED_NOTICE: &str = "本次问诊请求已取消。";

// ═══════════════════════════════════════════════════════════
// TurnGate: one turn at a time
// ═══════════════════════════════════════════════════════════

/// Serializes turns. A second `submit_turn` while one is in flight is
/// rejected with `TurnInProgress` instead of waiting.
pub struct TurnGate {
    lock: Mutex<()>,
}

impl TurnGate {
    pub fn new() -> Self {
        Self {
            lock: Mutex::new(()),
        }
    }

    /// Claim the session for one turn. `None` if a turn is already running.
    pub fn try_acquire(&self) -> Option<TurnGuard<'_>> {
        match self.lock.try_lock() {
            Ok(guard) => Some(TurnGuard { _guard: guard }),
            // A panicked turn published nothing; the gate itself is still usable.
            Err(TryLockError::Poisoned(poisoned)) => Some(TurnGuard {
                _guard: poisoned.into_inner(),
            }),
            Err(TryLockError::WouldBlock) => None,
        }
    }

    pub fn is_busy(&self) -> bool {
        matches!(self.lock.try_lock(), Err(TryLockError::WouldBlock))
    }
}

impl Default for TurnGate {
    fn default() -> Self {
        Self::new()
    }
}

/// Held for the whole turn; dropping it frees the session.
pub struct TurnGuard<'a> {
    _guard: MutexGuard<'a, ()>,
}

// ═══════════════════════════════════════════════════════════
// CancelToken
// ═══════════════════════════════════════════════════════════

/// Shared flag the UI sets to abandon an in-flight backend call.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

// ═══════════════════════════════════════════════════════════
// Pipeline
// ═══════════════════════════════════════════════════════════

/// Result of a turn that was accepted (input non-empty, session free).
#[derive(Debug, Clone, PartialEq)]
pub enum TurnOutcome {
    /// Backend answered; log grew by two, diagnosis and warning replaced.
    Answered {
        answer: String,
        warning: Option<String>,
    },
    /// Backend failed; log grew by one, notice set, diagnosis untouched.
    BackendFailed { notice: String, reason: String },
    /// Cancelled mid-call; same state effect as a backend failure.
    Cancelled { notice: String },
}

/// Why a turn fell back to the recovery path.
enum TurnFailure {
    Backend(BackendError),
    Malformed(PipelineError),
    Cancelled,
}

pub struct ConversationPipeline<'a, B: DiagnosisBackend + ?Sized> {
    store: &'a StateStore,
    backend: &'a B,
    gate: &'a TurnGate,
}

impl<'a, B: DiagnosisBackend + ?Sized> ConversationPipeline<'a, B> {
    pub fn new(store: &'a StateStore, backend: &'a B, gate: &'a TurnGate) -> Self {
        Self {
            store,
            backend,
            gate,
        }
    }

    /// Execute one user turn.
    pub fn submit_turn(&self, raw_text: &str) -> Result<TurnOutcome, PipelineError> {
        self.submit_turn_with_cancel(raw_text, &CancelToken::new())
    }

    /// Execute one user turn that the caller may cancel through `cancel`.
    pub fn submit_turn_with_cancel(
        &self,
        raw_text: &str,
        cancel: &CancelToken,
    ) -> Result<TurnOutcome, PipelineError> {
        // Step 1: Reject blank input before touching anything
        if raw_text.trim().is_empty() {
            return Err(PipelineError::EmptyInput);
        }

        // Step 2: Claim the session
        let _turn = self.gate.try_acquire().ok_or(PipelineError::TurnInProgress)?;
        let user_message = ConversationMessage::user(raw_text);

        // Step 3: Ask the backend and map its answer
        let result = self.ask_and_map(raw_text, cancel);

        // Step 4: Publish the whole turn at once
        match result {
            Ok(mapped) => self.publish_answer(user_message, mapped),
            Err(failure) => self.publish_failure(user_message, failure),
        }
    }

    fn ask_and_map(
        &self,
        raw_text: &str,
        cancel: &CancelToken,
    ) -> Result<MappedResponse, TurnFailure> {
        if cancel.is_cancelled() {
            return Err(TurnFailure::Cancelled);
        }
        let raw = self.backend.ask(raw_text);
        if cancel.is_cancelled() {
            return Err(TurnFailure::Cancelled);
        }
        let raw = raw.map_err(TurnFailure::Backend)?;
        map_response(&raw).map_err(TurnFailure::Malformed)
    }

    fn publish_answer(
        &self,
        user_message: ConversationMessage,
        mapped: MappedResponse,
    ) -> Result<TurnOutcome, PipelineError> {
        let MappedResponse {
            answer_text,
            diagnosis,
            warning,
        } = mapped;
        let outcome = TurnOutcome::Answered {
            answer: answer_text.clone(),
            warning: warning.clone(),
        };

        let messages = self.store.apply(|s| {
            s.conversation.append(user_message);
            s.conversation.append(ConversationMessage::system(&answer_text));
            s.diagnosis = diagnosis;
            s.warning = warning;
            s.notice = None;
            Ok::<_, PipelineError>(s.conversation.len())
        })?;

        tracing::info!(
            messages,
            warning = matches!(&outcome, TurnOutcome::Answered { warning: Some(_), .. }),
            "Turn completed"
        );
        Ok(outcome)
    }

    fn publish_failure(
        &self,
        user_message: ConversationMessage,
        failure: TurnFailure,
    ) -> Result<TurnOutcome, PipelineError> {
        let (outcome, notice_text) = match failure {
            TurnFailure::Cancelled => {
                tracing::info!("Turn cancelled, diagnosis left unchanged");
                let outcome = TurnOutcome::Cancelled {
                    notice: CANCELLED_NOTICE.to_string(),
                };
                (outcome, CANCELLED_NOTICE)
            }
            TurnFailure::Backend(e) => {
                tracing::warn!(error = %e, "Diagnosis backend failed, diagnosis left unchanged");
                let outcome = TurnOutcome::BackendFailed {
                    notice: BACKEND_FAILURE_NOTICE.to_string(),
                    reason: e.to_string(),
                };
                (outcome, BACKEND_FAILURE_NOTICE)
            }
            TurnFailure::Malformed(e) => {
                tracing::warn!(error = %e, "Unusable backend response, diagnosis left unchanged");
                let outcome = TurnOutcome::BackendFailed {
                    notice: BACKEND_FAILURE_NOTICE.to_string(),
                    reason: e.to_string(),
                };
                (outcome, BACKEND_FAILURE_NOTICE)
            }
        };
        let notice = ConversationMessage::system(notice_text);

        self.store.apply(|s| {
            s.conversation.append(user_message);
            s.notice = Some(notice);
            Ok::<_, PipelineError>(())
        })?;
        Ok(outcome)
    }
}
