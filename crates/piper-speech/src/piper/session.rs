use crate::error::{SpeechError, SpeechResult};
use ort::session::{Session, builder::GraphOptimizationLevel};
use std::path::Path;

pub fn create_session(path: &Path, intra_threads: Option<usize>) -> SpeechResult<Session> {
    let mut builder = Session::builder()
        .map_err(|err| SpeechError::ModelLoad(err.to_string()))?
        .with_optimization_level(GraphOptimizationLevel::Level3)
        .map_err(|err| SpeechError::ModelLoad(err.to_string()))?;

    if let Some(threads) = intra_threads {
        builder = builder
            .with_intra_threads(threads)
            .map_err(|err| SpeechError::ModelLoad(err.to_string()))?;
    }

    let session = builder
        .commit_from_file(path)
        .map_err(|err| SpeechError::ModelLoad(format!("{}: {err}", path.display())))?;
    Ok(session)
}
