use super::PiperOptions;
use super::voice::PiperVoice;
use crate::error::SpeechResult;
use crate::model::{VoiceLoader, VoiceModel};
use crate::model_source::ModelLocator;
use crate::types::VoiceId;
use std::sync::Arc;

/// Loads Piper voices found by a `ModelLocator`.
#[derive(Debug, Clone)]
pub struct PiperLoader {
    locator: ModelLocator,
    options: PiperOptions,
}

impl PiperLoader {
    pub fn new(locator: ModelLocator, options: PiperOptions) -> Self {
        Self { locator, options }
    }
}

impl VoiceLoader for PiperLoader {
    fn load(&self, voice: &VoiceId) -> SpeechResult<Arc<dyn VoiceModel>> {
        let model_path = self.locator.locate(voice)?;
        log::info!("Loading voice '{}' from {}", voice, model_path.display());
        let model = PiperVoice::load(&model_path, &self.options)?;
        Ok(Arc::new(model))
    }
}
