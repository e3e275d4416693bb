use super::TranscriptionError;

/// Speech-to-text collaborator.
///
/// `Ok(None)` (or an empty string) means nothing intelligible was said;
/// no turn is submitted in that case.
pub trait Transcriber: Send + Sync {
    fn transcribe(&self, samples: &[f32]) -> Result<Option<String>, TranscriptionError>;
}

/// Default when no ASR service is configured: never produces text.
#[derive(Debug, Default, Clone)]
pub struct UnconfiguredTranscriber;

impl Transcriber for UnconfiguredTranscriber {
    fn transcribe(&self, samples: &[f32]) -> Result<Option<String>, TranscriptionError> {
        tracing::warn!(
            samples = samples.len(),
            "No speech-to-text service configured, dropping capture"
        );
        Ok(None)
    }
}

/// Normalize a transcript: trimmed, `None` when blank.
pub fn clean_transcript(text: Option<String>) -> Option<String> {
    text.map(|t| t.trim().to_string()).filter(|t| !t.is_empty())
}
