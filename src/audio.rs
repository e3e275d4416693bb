//! Voice capture accumulator.
//!
//! Two-state machine: `Idle → Capturing → Idle`. Chunks arrive from the
//! capture stream on its own thread, so the buffer sits behind its own
//! mutex and never touches the session store.

use std::sync::Mutex;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureState {
    Idle,
    Capturing,
}

struct AudioBuffer {
    state: CaptureState,
    chunks: Vec<Vec<f32>>,
}

pub struct AudioAccumulator {
    inner: Mutex<AudioBuffer>,
}

impl AudioAccumulator {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(AudioBuffer {
                state: CaptureState::Idle,
                chunks: Vec::new(),
            }),
        }
    }

    /// `Idle → Capturing`. Clears leftovers from any earlier session.
    pub fn start(&self) -> Result<(), AudioError> {
        let mut buf = self.inner.lock().map_err(|_| AudioError::LockPoisoned)?;
        buf.chunks.clear();
        buf.state = CaptureState::Capturing;
        tracing::debug!("Voice capture started");
        Ok(())
    }

    /// Append one chunk. Only valid while capturing.
    pub fn on_chunk(&self, chunk: &[f32]) -> Result<(), AudioError> {
        let mut buf = self.inner.lock().map_err(|_| AudioError::LockPoisoned)?;
        if buf.state != CaptureState::Capturing {
            return Err(AudioError::NotCapturing);
        }
        buf.chunks.push(chunk.to_vec());
        Ok(())
    }

    /// `Capturing → Idle`. Returns all chunks concatenated in arrival order.
    ///
    /// The buffer is emptied whatever the outcome. Fails with `EmptyCapture`
    /// when nothing was collected; callers must not transcribe in that case.
    pub fn stop_and_drain(&self) -> Result<Vec<f32>, AudioError> {
        let mut buf = self.inner.lock().map_err(|_| AudioError::LockPoisoned)?;
        buf.state = CaptureState::Idle;
        let chunks = std::mem::take(&mut buf.chunks);
        drop(buf);

        let samples: Vec<f32> = chunks.concat();
        if samples.is_empty() {
            return Err(AudioError::EmptyCapture);
        }
        tracing::debug!(
            chunks = chunks.len(),
            samples = samples.len(),
            "Voice capture drained"
        );
        Ok(samples)
    }

    pub fn state(&self) -> Result<CaptureState, AudioError> {
        let buf = self.inner.lock().map_err(|_| AudioError::LockPoisoned)?;
        Ok(buf.state)
    }

    /// Number of chunks currently buffered.
    pub fn chunk_count(&self) -> Result<usize, AudioError> {
        let buf = self.inner.lock().map_err(|_| AudioError::LockPoisoned)?;
        Ok(buf.chunks.len())
    }
}

impl Default for AudioAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    #[error("Voice capture is not running")]
    NotCapturing,
    #[error("No audio was captured")]
    EmptyCapture,
    #[error("Internal lock error")]
    LockPoisoned,
}
