use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while locating, loading or running a voice
#[derive(Error, Debug)]
pub enum SpeechError {
    /// No `<voice>.onnx` in any searched directory
    #[error("Voice model '{voice}' not found\nSearched: {}", display_paths(.searched))]
    ModelNotFound {
        voice: String,
        searched: Vec<PathBuf>,
    },

    /// Voice id cannot be used as a file stem
    #[error("Invalid voice identifier: '{0}'")]
    InvalidVoice(String),

    /// ONNX session could not be created
    #[error("Model load failed: {0}")]
    ModelLoad(String),

    /// Voice config (`.onnx.json`) missing or malformed
    #[error("Invalid voice config: {0}\nPath: {1}")]
    InvalidConfig(String, PathBuf),

    #[error("Phonemization failed: {0}")]
    Phonemize(String),

    #[error("Model inference failed: {0}")]
    Inference(String),

    #[error("Invalid audio: {0}")]
    InvalidAudio(String),

    #[error("WAV encoding error: {0}")]
    Wav(#[from] hound::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Blocking worker panicked or was cancelled
    #[error("Background task failed: {0}")]
    Task(String),
}

fn display_paths(paths: &[PathBuf]) -> String {
    if paths.is_empty() {
        return "<none>".to_string();
    }
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result type for speech operations
pub type SpeechResult<T> = Result<T, SpeechError>;
