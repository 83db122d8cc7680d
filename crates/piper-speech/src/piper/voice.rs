use super::config::PiperConfig;
use super::phonemizer::Phonemizer;
use super::session::create_session;
use super::{PiperOptions, config_path_for};
use crate::error::{SpeechError, SpeechResult};
use crate::model::VoiceModel;
use crate::types::PcmBuffer;
use ndarray::{Array1, Array2};
use ort::session::Session;
use ort::value::Value;
use std::path::Path;
use std::sync::Mutex;

/// Peak normalisation floor, so near-silent output is not amplified to full scale.
const MIN_PEAK: f32 = 0.01;

/// A Piper voice backed by an ONNX Runtime session.
pub struct PiperVoice {
    session: Mutex<Session>,
    config: PiperConfig,
    phonemizer: Phonemizer,
    speaker_id: i64,
    sentence_silence_samples: usize,
}

impl PiperVoice {
    /// Load `<voice>.onnx` and its `<voice>.onnx.json` config.
    pub fn load(model_path: &Path, options: &PiperOptions) -> SpeechResult<Self> {
        let config = PiperConfig::from_file(&config_path_for(model_path))?;
        let session = create_session(model_path, options.intra_threads)?;
        let phonemizer = Phonemizer::for_config(&config, options.espeak_program.clone());
        let sentence_silence_samples =
            (options.sentence_silence_secs.max(0.0) * config.audio.sample_rate as f32) as usize;

        log::debug!(
            "Loaded {} ({} Hz, {} speaker(s), {:?} phonemes)",
            model_path.display(),
            config.audio.sample_rate,
            config.num_speakers,
            config.phoneme_type
        );

        Ok(Self {
            session: Mutex::new(session),
            config,
            phonemizer,
            speaker_id: i64::from(options.speaker_id),
            sentence_silence_samples,
        })
    }

    fn infer(&self, phoneme_ids: Vec<i64>) -> SpeechResult<Vec<f32>> {
        let len = phoneme_ids.len();
        let input = Array2::from_shape_vec((1, len), phoneme_ids)
            .map_err(|err| SpeechError::Inference(err.to_string()))?;
        let input_value =
            Value::from_array(input).map_err(|err| SpeechError::Inference(err.to_string()))?;
        let lengths_value = Value::from_array(Array1::from_elem(1, len as i64))
            .map_err(|err| SpeechError::Inference(err.to_string()))?;
        let scales_value = Value::from_array(Array1::from_vec(
            self.config.inference.scales().to_vec(),
        ))
        .map_err(|err| SpeechError::Inference(err.to_string()))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| SpeechError::Inference("session lock poisoned".to_string()))?;

        let result = if self.config.is_multi_speaker() {
            let sid_value = Value::from_array(Array1::from_elem(1, self.speaker_id))
                .map_err(|err| SpeechError::Inference(err.to_string()))?;
            session.run(ort::inputs![
                "input" => input_value,
                "input_lengths" => lengths_value,
                "scales" => scales_value,
                "sid" => sid_value
            ])
        } else {
            session.run(ort::inputs![
                "input" => input_value,
                "input_lengths" => lengths_value,
                "scales" => scales_value
            ])
        }
        .map_err(|err| SpeechError::Inference(err.to_string()))?;

        let output = result
            .get("output")
            .ok_or_else(|| SpeechError::Inference("missing output 'output'".to_string()))?
            .try_extract_tensor::<f32>()
            .map_err(|err| SpeechError::Inference(err.to_string()))?;

        Ok(output.1.to_vec())
    }
}

impl VoiceModel for PiperVoice {
    fn sample_rate(&self) -> u32 {
        self.config.audio.sample_rate
    }

    fn synthesize(&self, text: &str) -> SpeechResult<PcmBuffer> {
        let audio = self
            .phonemizer
            .phonemize(text)?
            .iter()
            .map(|phonemes| self.infer(self.config.phoneme_ids(phonemes)))
            .collect::<SpeechResult<Vec<_>>>()?;

        let pcm = join_sentences(&audio, self.sentence_silence_samples);
        log::debug!(
            "Synthesized {} sentence(s) into {} samples",
            audio.len(),
            pcm.sample_count()
        );
        Ok(pcm)
    }
}

/// Convert each sentence to PCM, with `silence_samples` of silence between sentences.
pub(crate) fn join_sentences(sentences: &[Vec<f32>], silence_samples: usize) -> PcmBuffer {
    let mut pcm = PcmBuffer::new();
    for (idx, audio) in sentences.iter().enumerate() {
        if idx > 0 {
            pcm.push_silence(silence_samples);
        }
        pcm.append(&audio_to_pcm(audio));
    }
    pcm
}

/// Scale float audio to 16-bit PCM by its peak.
pub(crate) fn audio_to_pcm(audio: &[f32]) -> PcmBuffer {
    let peak = audio
        .iter()
        .fold(0.0f32, |peak, sample| peak.max(sample.abs()))
        .max(MIN_PEAK);
    let scale = i16::MAX as f32 / peak;

    let mut pcm = PcmBuffer::with_capacity(audio.len());
    for &sample in audio {
        let scaled = (sample * scale).clamp(i16::MIN as f32, i16::MAX as f32);
        pcm.push_sample(scaled as i16);
    }
    pcm
}
