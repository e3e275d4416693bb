//! Voice capture commands.

use crate::audio::CaptureState;
use crate::core_state::{CoreState, VoiceOutcome};

use super::chat::describe_outcome;

pub fn start_voice_capture(state: &CoreState) -> Result<String, String> {
    state.start_recording().map_err(|e| e.to_string())?;
    Ok("🎙️ 正在录音…".to_string())
}

/// Feed samples typed as a comma-separated list (terminal stand-in for a microphone).
pub fn push_voice_samples(state: &CoreState, raw: &str) -> Result<String, String> {
    let samples = raw
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<f32>().map_err(|_| format!("Not a sample value: {s:?}")))
        .collect::<Result<Vec<f32>, String>>()?;
    state.push_audio(&samples).map_err(|e| e.to_string())?;
    Ok(format!("已接收 {} 个采样", samples.len()))
}

pub fn stop_voice_capture(state: &CoreState) -> Result<String, String> {
    match state.stop_recording().map_err(|e| e.to_string())? {
        VoiceOutcome::Submitted {
            transcript,
            outcome,
        } => Ok(format!("🗣️ {transcript}\n{}", describe_outcome(&outcome))),
        VoiceOutcome::Deferred { transcript } => Ok(format!(
            "🗣️ {transcript}\n上一条消息仍在处理中，请稍后重新发送"
        )),
        VoiceOutcome::NoSpeech => Ok("未识别到语音内容".to_string()),
        VoiceOutcome::TranscriptionFailed { notice, .. } => Ok(notice),
    }
}

/// "idle", or "capturing (N chunks)" while a recording is open.
pub fn voice_status(state: &CoreState) -> Result<String, String> {
    match state.capture_state().map_err(|e| e.to_string())? {
        CaptureState::Idle => Ok("idle".to_string()),
        CaptureState::Capturing => {
            let chunks = state.captured_chunks().map_err(|e| e.to_string())?;
            Ok(format!("capturing ({chunks} chunks)"))
        }
    }
}
