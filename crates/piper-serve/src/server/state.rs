use piper_speech::{VoiceCache, VoiceId};
use std::sync::Arc;

/// State shared by all handlers.
#[derive(Clone)]
pub struct AppState {
    pub voices: Arc<VoiceCache>,
    pub default_voice: VoiceId,
}

impl AppState {
    pub fn new(voices: Arc<VoiceCache>, default_voice: VoiceId) -> Self {
        Self {
            voices,
            default_voice,
        }
    }

    /// The requested voice, or the default when absent or empty.
    pub fn resolve_voice(&self, requested: Option<&str>) -> VoiceId {
        match requested {
            Some(name) if !name.is_empty() => VoiceId::new(name),
            _ => self.default_voice.clone(),
        }
    }
}
