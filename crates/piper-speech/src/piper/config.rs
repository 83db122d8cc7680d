use crate::error::{SpeechError, SpeechResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

const PAD: &str = "_";
const BOS: &str = "^";
const EOS: &str = "$";

/// Contents of a Piper `<voice>.onnx.json` file. Unknown keys are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PiperConfig {
    pub audio: AudioConfig,

    #[serde(default)]
    pub espeak: EspeakConfig,

    #[serde(default)]
    pub phoneme_type: PhonemeType,

    #[serde(default)]
    pub inference: InferenceConfig,

    #[serde(default = "default_num_speakers")]
    pub num_speakers: u32,

    pub phoneme_id_map: HashMap<String, Vec<i64>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    pub sample_rate: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EspeakConfig {
    pub voice: String,
}

impl Default for EspeakConfig {
    fn default() -> Self {
        Self {
            voice: "en-us".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PhonemeType {
    #[default]
    Espeak,
    Text,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceConfig {
    #[serde(default = "default_noise_scale")]
    pub noise_scale: f32,
    #[serde(default = "default_length_scale")]
    pub length_scale: f32,
    #[serde(default = "default_noise_w")]
    pub noise_w: f32,
}

fn default_num_speakers() -> u32 {
    1
}

fn default_noise_scale() -> f32 {
    0.667
}

fn default_length_scale() -> f32 {
    1.0
}

fn default_noise_w() -> f32 {
    0.8
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            noise_scale: default_noise_scale(),
            length_scale: default_length_scale(),
            noise_w: default_noise_w(),
        }
    }
}

impl InferenceConfig {
    /// Values for the model's `scales` input.
    pub fn scales(&self) -> [f32; 3] {
        [self.noise_scale, self.length_scale, self.noise_w]
    }
}

impl PiperConfig {
    pub fn from_file(path: &Path) -> SpeechResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            SpeechError::InvalidConfig(format!("cannot read config: {e}"), path.to_path_buf())
        })?;
        let config: Self = serde_json::from_str(&raw)
            .map_err(|e| SpeechError::InvalidConfig(e.to_string(), path.to_path_buf()))?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> SpeechResult<()> {
        if self.audio.sample_rate == 0 {
            return Err(SpeechError::InvalidConfig(
                "audio.sample_rate must be greater than zero".to_string(),
                path.to_path_buf(),
            ));
        }
        for symbol in [PAD, BOS, EOS] {
            if !self.phoneme_id_map.contains_key(symbol) {
                return Err(SpeechError::InvalidConfig(
                    format!("phoneme_id_map has no entry for '{symbol}'"),
                    path.to_path_buf(),
                ));
            }
        }
        Ok(())
    }

    pub fn is_multi_speaker(&self) -> bool {
        self.num_speakers > 1
    }

    /// Phoneme ids for one sentence: BOS, then every known phoneme followed
    /// by the pad id, then EOS.
    pub fn phoneme_ids(&self, phonemes: &str) -> Vec<i64> {
        let pad = self.ids(PAD);
        let mut ids = Vec::with_capacity(phonemes.chars().count() * 2 + 3);
        ids.extend_from_slice(self.ids(BOS));
        ids.extend_from_slice(pad);

        let mut buf = [0u8; 4];
        for phoneme in phonemes.chars() {
            let key: &str = phoneme.encode_utf8(&mut buf);
            match self.phoneme_id_map.get(key) {
                Some(phoneme_ids) => {
                    ids.extend_from_slice(phoneme_ids);
                    ids.extend_from_slice(pad);
                }
                None => log::debug!("Skipping phoneme without id: {:?}", phoneme),
            }
        }

        ids.extend_from_slice(self.ids(EOS));
        ids
    }

    fn ids(&self, symbol: &str) -> &[i64] {
        self.phoneme_id_map
            .get(symbol)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}
