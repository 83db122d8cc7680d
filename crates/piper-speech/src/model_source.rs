use crate::error::{SpeechError, SpeechResult};
use crate::types::VoiceId;
use std::path::{Path, PathBuf};

/// Finds voice model files by probing a fixed list of directories in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelLocator {
    search_dirs: Vec<PathBuf>,
}

impl ModelLocator {
    /// Probe exactly `search_dirs`, in order. Repeated directories are probed once.
    pub fn new<I, P>(search_dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let mut dirs: Vec<PathBuf> = Vec::new();
        for dir in search_dirs {
            let dir = dir.into();
            if !dirs.contains(&dir) {
                dirs.push(dir);
            }
        }
        Self { search_dirs: dirs }
    }

    /// The voices directory, then the executable's directory, then the
    /// current working directory.
    pub fn standard(voices_dir: impl Into<PathBuf>) -> Self {
        let mut dirs = vec![voices_dir.into()];
        if let Some(app_dir) = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
        {
            dirs.push(app_dir);
        }
        match std::env::current_dir() {
            Ok(cwd) => dirs.push(cwd),
            Err(_) => dirs.push(PathBuf::from(".")),
        }
        Self::new(dirs)
    }

    pub fn search_dirs(&self) -> &[PathBuf] {
        &self.search_dirs
    }

    /// Every path that would be probed for `voice`, in priority order.
    pub fn candidates(&self, voice: &VoiceId) -> Vec<PathBuf> {
        let file_name = voice.model_file_name();
        self.search_dirs
            .iter()
            .map(|dir| dir.join(&file_name))
            .collect()
    }

    /// Resolve the model path for `voice`; the first existing file wins.
    pub fn locate(&self, voice: &VoiceId) -> SpeechResult<PathBuf> {
        if !voice.is_file_stem() {
            return Err(SpeechError::InvalidVoice(voice.name().to_string()));
        }

        let candidates = self.candidates(voice);
        for path in &candidates {
            if path.is_file() {
                log::debug!("Found voice '{}' at {}", voice, path.display());
                return Ok(path.clone());
            }
        }

        Err(SpeechError::ModelNotFound {
            voice: voice.name().to_string(),
            searched: candidates,
        })
    }
}
