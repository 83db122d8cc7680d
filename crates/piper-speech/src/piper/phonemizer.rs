use super::config::{PhonemeType, PiperConfig};
use crate::error::{SpeechError, SpeechResult};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;

/// Turns text into phoneme strings, one per sentence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phonemizer {
    /// IPA phonemes from an `espeak-ng` process
    Espeak { program: PathBuf, voice: String },
    /// Characters of the text are the phonemes
    Text,
}

impl Phonemizer {
    pub fn for_config(config: &PiperConfig, espeak_program: impl Into<PathBuf>) -> Self {
        match config.phoneme_type {
            PhonemeType::Espeak => Phonemizer::Espeak {
                program: espeak_program.into(),
                voice: config.espeak.voice.clone(),
            },
            PhonemeType::Text => Phonemizer::Text,
        }
    }

    pub fn phonemize(&self, text: &str) -> SpeechResult<Vec<String>> {
        match self {
            Phonemizer::Espeak { program, voice } => {
                let output = run_espeak(program, voice, text)?;
                Ok(split_sentences(&output))
            }
            Phonemizer::Text => Ok(split_sentences(text)),
        }
    }
}

fn run_espeak(program: &Path, voice: &str, text: &str) -> SpeechResult<String> {
    let mut child = Command::new(program)
        .args(["-q", "--ipa", "-v", voice, "--stdin"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| {
            SpeechError::Phonemize(format!("failed to start '{}': {e}", program.display()))
        })?;

    // stdin is fed from its own thread so a full stdout pipe cannot stall the write.
    let stdin = child.stdin.take();
    let (written, output) = thread::scope(|scope| {
        let writer = scope.spawn(move || match stdin {
            Some(mut stdin) => stdin.write_all(text.as_bytes()),
            None => Ok(()),
        });
        let output = child.wait_with_output();
        (writer.join(), output)
    });

    let output =
        output.map_err(|e| SpeechError::Phonemize(format!("espeak did not finish: {e}")))?;

    if !output.status.success() {
        return Err(SpeechError::Phonemize(format!(
            "'{}' exited with {}: {}",
            program.display(),
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }

    match written {
        Ok(Ok(())) => {}
        Ok(Err(e)) => {
            return Err(SpeechError::Phonemize(format!("failed to write text: {e}")));
        }
        Err(_) => {
            return Err(SpeechError::Phonemize(
                "stdin writer thread panicked".to_string(),
            ));
        }
    }

    String::from_utf8(output.stdout)
        .map_err(|e| SpeechError::Phonemize(format!("espeak output is not UTF-8: {e}")))
}

fn split_sentences(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
