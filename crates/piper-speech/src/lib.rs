//! # Piper Speech
//!
//! Voice loading, caching and WAV synthesis for Piper text-to-speech voices.
//!
//! ## Architecture
//!
//! - `VoiceModel`: a loaded voice bound to a sample rate, turning text into PCM
//! - `VoiceLoader`: turns a `VoiceId` into a `VoiceModel`
//! - `VoiceCache`: get-or-load cache of voices, one load per voice
//! - `ModelLocator`: finds `<voice>.onnx` across a fixed list of directories
//! - `encode_wav`: wraps PCM in a mono 16-bit WAV container
//!
//! The `piper` module provides the ONNX Runtime backed implementation.
//!
//! ## Example
//!
//! ```no_run
//! use piper_speech::{ModelLocator, PiperLoader, PiperOptions, VoiceCache, VoiceId, synthesize_wav};
//! use std::sync::Arc;
//!
//! async fn speak(text: &str) -> Option<Vec<u8>> {
//!     let loader = PiperLoader::new(ModelLocator::standard("voices"), PiperOptions::default());
//!     let cache = VoiceCache::new(Arc::new(loader));
//!
//!     let voice = cache.get_or_load(&VoiceId::new("en_US-lessac-medium")).await?;
//!     synthesize_wav(voice.as_ref(), text).ok()
//! }
//! ```

pub mod cache;
pub mod error;
mod model;
pub mod model_source;
pub mod piper;
pub mod types;
pub mod wav;

pub use cache::VoiceCache;
pub use error::{SpeechError, SpeechResult};
pub use model::{VoiceLoader, VoiceModel, synthesize_wav};
pub use model_source::ModelLocator;
pub use piper::{PiperConfig, PiperLoader, PiperOptions, PiperVoice};
pub use types::{DEFAULT_VOICE, PcmBuffer, VoiceId};
pub use wav::encode_wav;
