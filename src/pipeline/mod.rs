pub mod types;
pub mod mapper;
pub mod backend;
pub mod transcription;
pub mod conversation;

use thiserror::Error;

use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Input is empty")]
    EmptyInput,

    #[error("Another turn is still in progress")]
    TurnInProgress,

    #[error("Malformed backend response: {0}")]
    MalformedResponse(String),

    #[error("State error: {0}")]
    Store(#[from] StoreError),
}

/// Failures of the diagnosis backend. Recovered inside the pipeline.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Backend connection failed: {0}")]
    Connection(String),

    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("Backend returned error (status {status}): {body}")]
    Status { status: u16, body: String },

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Response parsing error: {0}")]
    ResponseParsing(String),
}

/// Failures of the speech-to-text collaborator. Recovered inside the pipeline.
#[derive(Error, Debug)]
pub enum TranscriptionError {
    #[error("Transcription service unavailable: {0}")]
    Unavailable(String),

    #[error("Transcription failed: {0}")]
    Failed(String),
}
