use crate::error::{SpeechError, SpeechResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Voice used when a request does not name one
pub const DEFAULT_VOICE: &str = "en_US-lessac-medium";

/// Voice identifier: the model filename without the `.onnx` extension
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct VoiceId {
    name: String,
}

impl VoiceId {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Model filename for this voice, e.g. `en_US-lessac-medium.onnx`
    pub fn model_file_name(&self) -> String {
        format!("{}.onnx", self.name)
    }

    /// Whether the name can be joined onto a directory without escaping it.
    pub fn is_file_stem(&self) -> bool {
        !self.name.is_empty()
            && self.name != "."
            && self.name != ".."
            && !self
                .name
                .chars()
                .any(|c| c == '/' || c == '\\' || c == '\0')
    }
}

impl Default for VoiceId {
    fn default() -> Self {
        Self::new(DEFAULT_VOICE)
    }
}

impl fmt::Display for VoiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl From<String> for VoiceId {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

impl From<&str> for VoiceId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Raw little-endian signed 16-bit mono PCM
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PcmBuffer {
    bytes: Vec<u8>,
}

impl PcmBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(samples: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(samples * 2),
        }
    }

    /// Wrap raw PCM bytes. The length must be a whole number of samples.
    pub fn from_bytes(bytes: Vec<u8>) -> SpeechResult<Self> {
        if bytes.len() % 2 != 0 {
            return Err(SpeechError::InvalidAudio(format!(
                "PCM buffer of {} bytes is not a whole number of 16-bit samples",
                bytes.len()
            )));
        }
        Ok(Self { bytes })
    }

    pub fn from_samples(samples: &[i16]) -> Self {
        let mut buffer = Self::with_capacity(samples.len());
        buffer.extend_samples(samples);
        buffer
    }

    pub fn push_sample(&mut self, sample: i16) {
        self.bytes.extend_from_slice(&sample.to_le_bytes());
    }

    pub fn extend_samples(&mut self, samples: &[i16]) {
        self.bytes.reserve(samples.len() * 2);
        for &sample in samples {
            self.push_sample(sample);
        }
    }

    pub fn append(&mut self, other: &PcmBuffer) {
        self.bytes.extend_from_slice(&other.bytes);
    }

    /// Append `count` zero samples.
    pub fn push_silence(&mut self, count: usize) {
        self.bytes.resize(self.bytes.len() + count * 2, 0);
    }

    pub fn samples(&self) -> impl Iterator<Item = i16> + '_ {
        self.bytes
            .chunks_exact(2)
            .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
    }

    pub fn sample_count(&self) -> usize {
        self.bytes.len() / 2
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}
