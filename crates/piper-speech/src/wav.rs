//! WAV container assembly.

use crate::error::{SpeechError, SpeechResult};
use crate::types::PcmBuffer;
use hound::{SampleFormat, WavSpec, WavWriter};
use std::io::Cursor;

const WAV_HEADER_LEN: usize = 44;

/// Wrap mono 16-bit PCM in a WAV container.
pub fn encode_wav(pcm: &PcmBuffer, sample_rate: u32) -> SpeechResult<Vec<u8>> {
    if sample_rate == 0 {
        return Err(SpeechError::InvalidAudio(
            "sample rate must be greater than zero".to_string(),
        ));
    }

    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::with_capacity(WAV_HEADER_LEN + pcm.as_bytes().len()));
    let mut writer = WavWriter::new(&mut cursor, spec)?;
    for sample in pcm.samples() {
        writer.write_sample(sample)?;
    }
    writer.finalize()?;

    Ok(cursor.into_inner())
}
