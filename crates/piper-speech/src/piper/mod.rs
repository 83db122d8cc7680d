//! Piper voices on ONNX Runtime.
//!
//! A Piper voice is a pair of files: `<voice>.onnx` (the VITS graph) and
//! `<voice>.onnx.json` (sample rate, phonemizer settings, phoneme id map).

mod config;
mod loader;
mod phonemizer;
mod session;
mod voice;

pub use config::{AudioConfig, EspeakConfig, InferenceConfig, PhonemeType, PiperConfig};
pub use loader::PiperLoader;
pub use phonemizer::Phonemizer;
pub use voice::PiperVoice;

use std::path::PathBuf;

/// Engine settings shared by every voice a loader creates.
#[derive(Debug, Clone)]
pub struct PiperOptions {
    /// Program used for `espeak` phonemization
    pub espeak_program: PathBuf,
    /// ONNX Runtime intra-op threads; `None` lets the runtime decide
    pub intra_threads: Option<usize>,
    /// Speaker for multi-speaker voices
    pub speaker_id: u32,
    /// Silence inserted between sentences, in seconds
    pub sentence_silence_secs: f32,
}

impl Default for PiperOptions {
    fn default() -> Self {
        Self {
            espeak_program: PathBuf::from("espeak-ng"),
            intra_threads: None,
            speaker_id: 0,
            sentence_silence_secs: 0.2,
        }
    }
}

/// Path of the JSON config that accompanies a model file.
pub fn config_path_for(model_path: &std::path::Path) -> PathBuf {
    let mut path = model_path.as_os_str().to_owned();
    path.push(".json");
    PathBuf::from(path)
}
