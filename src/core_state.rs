//! Owned session state shared by every front-end event.
//!
//! `CoreState` wires the store, the voice accumulator, the turn gate and
//! the two collaborators together. UI events call these methods and
//! nothing else; rendering reads a `snapshot()`.

use std::sync::Arc;

use crate::audio::{AudioAccumulator, AudioError, CaptureState};
use crate::config::{self, BackendConfig};
use crate::medications::{MedicationTracker, ReminderError};
use crate::models::{ConversationMessage, Medication, ProfileUpdate, UserProfile};
use crate::pipeline::backend::{DiagnosisBackend, MockDiagnosisBackend};
use crate::pipeline::conversation::{CancelToken, ConversationPipeline, TurnGate, TurnOutcome};
use crate::pipeline::transcription::{clean_transcript, Transcriber, UnconfiguredTranscriber};
use crate::pipeline::{BackendError, PipelineError};
use crate::profile::ProfileManager;
use crate::store::{SessionState, StateStore, StoreError};

/// Notice shown when speech could not be turned into text.
pub const TRANSCRIPTION_FAILED_NOTICE: &str = "语音识别失败，请重试或直接输入文字。";

// ═══════════════════════════════════════════════════════════
// CoreState
// ═══════════════════════════════════════════════════════════

pub struct CoreState {
    store: StateStore,
    /// Voice capture buffer. Fed from the capture thread.
    audio: AudioAccumulator,
    /// Held for the duration of a conversation turn.
    turn_gate: TurnGate,
    backend: Box<dyn DiagnosisBackend>,
    transcriber: Box<dyn Transcriber>,
}

/// What happened when a voice capture was stopped.
#[derive(Debug, Clone, PartialEq)]
pub enum VoiceOutcome {
    /// Transcript was non-empty and went through a normal turn.
    Submitted {
        transcript: String,
        outcome: TurnOutcome,
    },
    /// Another turn was in flight. Nothing was submitted; the caller
    /// resubmits `transcript` once the session is free.
    Deferred { transcript: String },
    /// Nothing intelligible was said. No turn was submitted.
    NoSpeech,
    /// The speech-to-text service failed. A notice was set instead.
    TranscriptionFailed { notice: String, reason: String },
}

impl CoreState {
    pub fn new(backend: Box<dyn DiagnosisBackend>, transcriber: Box<dyn Transcriber>) -> Self {
        Self {
            store: StateStore::new(),
            audio: AudioAccumulator::new(),
            turn_gate: TurnGate::new(),
            backend,
            transcriber,
        }
    }

    /// Built-in mock backend, no speech-to-text.
    pub fn with_mock_backend() -> Self {
        Self::new(
            Box::new(MockDiagnosisBackend::new()),
            Box::new(UnconfiguredTranscriber),
        )
    }

    /// Backend chosen by environment configuration.
    pub fn from_config(backend_config: &BackendConfig) -> Result<Self, CoreError> {
        let backend = config::build_backend(backend_config)?;
        Ok(Self::new(backend, Box::new(UnconfiguredTranscriber)))
    }

    // ── Read path ───────────────────────────────────────────

    pub fn snapshot(&self) -> Result<Arc<SessionState>, CoreError> {
        Ok(self.store.get()?)
    }

    /// True while a conversation turn is in flight.
    pub fn is_busy(&self) -> bool {
        self.turn_gate.is_busy()
    }

    pub fn capture_state(&self) -> Result<CaptureState, CoreError> {
        Ok(self.audio.state()?)
    }

    /// Chunks collected so far in the current capture.
    pub fn captured_chunks(&self) -> Result<usize, CoreError> {
        Ok(self.audio.chunk_count()?)
    }

    // ── Conversation ────────────────────────────────────────

    pub fn submit_text(&self, text: &str) -> Result<TurnOutcome, CoreError> {
        self.submit_text_with_cancel(text, &CancelToken::new())
    }

    pub fn submit_text_with_cancel(
        &self,
        text: &str,
        cancel: &CancelToken,
    ) -> Result<TurnOutcome, CoreError> {
        let pipeline = ConversationPipeline::new(&self.store, self.backend.as_ref(), &self.turn_gate);
        Ok(pipeline.submit_turn_with_cancel(text, cancel)?)
    }

    // ── Voice ───────────────────────────────────────────────

    pub fn start_recording(&self) -> Result<(), CoreError> {
        Ok(self.audio.start()?)
    }

    /// Called by the capture stream for every chunk.
    pub fn push_audio(&self, chunk: &[f32]) -> Result<(), CoreError> {
        Ok(self.audio.on_chunk(chunk)?)
    }

    /// Stop capturing, transcribe, and submit the transcript as a turn.
    ///
    /// Safe while a turn is in flight: the capture is still drained and the
    /// transcript comes back as `VoiceOutcome::Deferred`.
    /// An empty capture is returned as `AudioError::EmptyCapture` without
    /// calling the transcriber.
    pub fn stop_recording(&self) -> Result<VoiceOutcome, CoreError> {
        let samples = self.audio.stop_and_drain()?;

        let transcript = match self.transcriber.transcribe(&samples) {
            Ok(text) => clean_transcript(text),
            Err(e) => {
                tracing::warn!(error = %e, samples = samples.len(), "Transcription failed");
                let notice = ConversationMessage::system(TRANSCRIPTION_FAILED_NOTICE);
                self.store.apply(|s| {
                    s.notice = Some(notice);
                    Ok::<_, StoreError>(())
                })?;
                return Ok(VoiceOutcome::TranscriptionFailed {
                    notice: TRANSCRIPTION_FAILED_NOTICE.to_string(),
                    reason: e.to_string(),
                });
            }
        };

        match transcript {
            None => {
                tracing::info!(samples = samples.len(), "No speech recognized");
                Ok(VoiceOutcome::NoSpeech)
            }
            Some(transcript) => {
                tracing::debug!(chars = transcript.chars().count(), "Submitting transcript");
                match self.submit_text(&transcript) {
                    Ok(outcome) => Ok(VoiceOutcome::Submitted {
                        transcript,
                        outcome,
                    }),
                    Err(CoreError::Pipeline(PipelineError::TurnInProgress)) => {
                        tracing::info!("Turn in progress, transcript handed back to caller");
                        Ok(VoiceOutcome::Deferred { transcript })
                    }
                    Err(e) => Err(e),
                }
            }
        }
    }

    // ── Reminders ───────────────────────────────────────────

    pub fn add_reminder(&self, name: &str, time: &str) -> Result<usize, CoreError> {
        Ok(MedicationTracker::new(&self.store).add_reminder(name, time)?)
    }

    pub fn mark_reminder_done(&self, index: usize) -> Result<(), CoreError> {
        Ok(MedicationTracker::new(&self.store).mark_done(index)?)
    }

    pub fn reminders(&self) -> Result<Vec<Medication>, CoreError> {
        Ok(MedicationTracker::new(&self.store).list()?)
    }

    pub fn pending_reminders(&self) -> Result<usize, CoreError> {
        Ok(MedicationTracker::new(&self.store).pending_count()?)
    }

    // ── Profile ─────────────────────────────────────────────

    /// Rejected with `TurnInProgress` while a turn is in flight.
    pub fn update_profile(&self, update: ProfileUpdate) -> Result<UserProfile, CoreError> {
        let _turn = self
            .turn_gate
            .try_acquire()
            .ok_or(PipelineError::TurnInProgress)?;
        Ok(ProfileManager::new(&self.store).update(update)?)
    }

    /// Append one medical history entry. Same turn rule as `update_profile`.
    pub fn add_history_entry(&self, entry: &str) -> Result<UserProfile, CoreError> {
        let _turn = self
            .turn_gate
            .try_acquire()
            .ok_or(PipelineError::TurnInProgress)?;
        let manager = ProfileManager::new(&self.store);
        manager.add_history_entry(entry)?;
        Ok(manager.current()?)
    }
}

impl Default for CoreState {
    fn default() -> Self {
        Self::with_mock_backend()
    }
}

/// Errors from core state operations.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("State error: {0}")]
    Store(#[from] StoreError),
    #[error("Voice capture error: {0}")]
    Audio(#[from] AudioError),
    #[error("{0}")]
    Pipeline(#[from] PipelineError),
    #[error("{0}")]
    Reminder(#[from] ReminderError),
    #[error("Backend setup error: {0}")]
    Backend(#[from] BackendError),
}
