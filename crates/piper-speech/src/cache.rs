//! Get-or-load cache of voice models.
//!
//! Entries are created lazily and held for the life of the cache. Concurrent
//! misses for the same voice wait on a single load; a failed load leaves the
//! entry empty so the next request retries.

use crate::error::{SpeechError, SpeechResult};
use crate::model::{VoiceLoader, VoiceModel};
use crate::types::VoiceId;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{OnceCell, RwLock};

type VoiceSlot = Arc<OnceCell<Arc<dyn VoiceModel>>>;

pub struct VoiceCache {
    loader: Arc<dyn VoiceLoader>,
    voices: RwLock<HashMap<VoiceId, VoiceSlot>>,
}

impl VoiceCache {
    pub fn new(loader: Arc<dyn VoiceLoader>) -> Self {
        Self {
            loader,
            voices: RwLock::new(HashMap::new()),
        }
    }

    /// Return the cached model for `voice`, loading it on first use.
    ///
    /// Load failures are logged and reported as `None`.
    pub async fn get_or_load(&self, voice: &VoiceId) -> Option<Arc<dyn VoiceModel>> {
        match self.try_get_or_load(voice).await {
            Ok(model) => Some(model),
            Err(e) => {
                log::error!("Failed to load voice model '{}': {}", voice, e);
                None
            }
        }
    }

    /// Like `get_or_load`, but returns the load error.
    pub async fn try_get_or_load(&self, voice: &VoiceId) -> SpeechResult<Arc<dyn VoiceModel>> {
        let slot = self.slot(voice).await;
        if let Some(model) = slot.get() {
            return Ok(Arc::clone(model));
        }

        // Detached, so a caller that goes away still leaves the loaded model behind.
        let loader = Arc::clone(&self.loader);
        let voice = voice.clone();
        tokio::spawn(async move {
            let model = slot
                .get_or_try_init(|| async {
                    log::info!("Loading voice model '{}'", voice);
                    let loader = Arc::clone(&loader);
                    let voice = voice.clone();
                    tokio::task::spawn_blocking(move || loader.load(&voice))
                        .await
                        .map_err(|e| SpeechError::Task(format!("voice load task failed: {e}")))?
                })
                .await?;
            Ok::<_, SpeechError>(Arc::clone(model))
        })
        .await
        .map_err(|e| SpeechError::Task(format!("voice load task failed: {e}")))?
    }

    async fn slot(&self, voice: &VoiceId) -> VoiceSlot {
        {
            let voices = self.voices.read().await;
            if let Some(slot) = voices.get(voice) {
                return Arc::clone(slot);
            }
        }

        let mut voices = self.voices.write().await;
        Arc::clone(voices.entry(voice.clone()).or_default())
    }

    /// Whether `voice` is loaded.
    pub async fn contains(&self, voice: &VoiceId) -> bool {
        let voices = self.voices.read().await;
        voices
            .get(voice)
            .is_some_and(|slot| slot.initialized())
    }

    /// Number of loaded voices.
    pub async fn len(&self) -> usize {
        let voices = self.voices.read().await;
        voices.values().filter(|slot| slot.initialized()).count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Loaded voices, sorted by name.
    pub async fn loaded_voices(&self) -> Vec<VoiceId> {
        let voices = self.voices.read().await;
        let mut loaded: Vec<VoiceId> = voices
            .iter()
            .filter(|(_, slot)| slot.initialized())
            .map(|(voice, _)| voice.clone())
            .collect();
        loaded.sort();
        loaded
    }
}
