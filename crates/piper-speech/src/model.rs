use crate::error::SpeechResult;
use crate::types::{PcmBuffer, VoiceId};
use crate::wav::encode_wav;
use std::sync::Arc;

/// A loaded voice, ready to synthesize.
///
/// Implementations are CPU-bound and blocking; async callers should run them
/// on a blocking thread.
pub trait VoiceModel: Send + Sync {
    /// Sample rate of the PCM produced by `synthesize`
    fn sample_rate(&self) -> u32;

    /// Synthesize `text` into mono 16-bit PCM
    fn synthesize(&self, text: &str) -> SpeechResult<PcmBuffer>;
}

/// Creates voice models on cache misses.
pub trait VoiceLoader: Send + Sync {
    fn load(&self, voice: &VoiceId) -> SpeechResult<Arc<dyn VoiceModel>>;
}

/// Synthesize `text` and wrap the result in a WAV container at the model's rate.
pub fn synthesize_wav(model: &dyn VoiceModel, text: &str) -> SpeechResult<Vec<u8>> {
    let pcm = model.synthesize(text)?;
    encode_wav(&pcm, model.sample_rate())
}
