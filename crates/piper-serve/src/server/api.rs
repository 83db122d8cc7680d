use super::state::AppState;
use axum::{
    Router,
    extract::{Query, State, rejection::QueryRejection},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Json, Response},
    routing::get,
};
use piper_speech::{SpeechError, synthesize_wav};
use serde::{Deserialize, Serialize};
use std::time::Instant;

const TEXT_REQUIRED: &str = "Text to synthesize is required.";
const SYNTHESIS_FAILED: &str = "Failed to synthesize audio.";
const DOWNLOAD_NAME: &str = "output.wav";

const INDEX_HTML: &str = include_str!("../../static/index.html");

#[derive(Debug, Default, PartialEq, Eq)]
pub struct TtsQuery {
    pub text: Option<String>,
    pub voice: Option<String>,
}

impl TtsQuery {
    /// Pick `text` and `voice` out of query pairs. The first value of a repeated key wins.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        let mut query = Self::default();
        for (key, value) in pairs {
            let field = match key.as_str() {
                "text" => &mut query.text,
                "voice" => &mut query.voice,
                _ => continue,
            };
            field.get_or_insert(value);
        }
        query
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub voices_loaded: usize,
}

pub fn create_router(state: AppState) -> Router {
    log::debug!("Creating API router with endpoints: GET /, GET /health, GET /api/tts");

    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/api/tts", get(synthesize_audio))
        .with_state(state)
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    log::debug!("Health check endpoint called");
    Json(HealthResponse {
        status: "healthy".to_string(),
        voices_loaded: state.voices.len().await,
    })
}

async fn synthesize_audio(
    State(state): State<AppState>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Response, AppError> {
    let Query(pairs) = query.map_err(|e| {
        log::debug!("Rejected query string: {}", e);
        AppError::BadRequest(TEXT_REQUIRED.to_string())
    })?;
    let query = TtsQuery::from_pairs(pairs);

    let text = match query.text {
        Some(text) if !text.is_empty() => text,
        _ => return Err(AppError::BadRequest(TEXT_REQUIRED.to_string())),
    };
    let voice = state.resolve_voice(query.voice.as_deref());

    let model = state.voices.get_or_load(&voice).await.ok_or_else(|| {
        AppError::Internal(format!("Could not load voice model for '{}'.", voice))
    })?;

    let start = Instant::now();
    let text_len = text.len();
    let wav = tokio::task::spawn_blocking(move || synthesize_wav(model.as_ref(), &text))
        .await
        .map_err(|e| SpeechError::Task(format!("synthesis task failed: {e}")))
        .and_then(|result| result)
        .map_err(|e| {
            log::error!(
                "Error during synthesis with voice '{}': {}",
                voice,
                error_chain(&e)
            );
            AppError::Internal(SYNTHESIS_FAILED.to_string())
        })?;

    log::info!(
        "Synthesized {} chars with voice '{}' into {} bytes in {:.2}s",
        text_len,
        voice,
        wav.len(),
        start.elapsed().as_secs_f64()
    );

    Ok(wav_attachment(wav))
}

fn wav_attachment(wav: Vec<u8>) -> Response {
    let disposition = format!("attachment; filename=\"{}\"", DOWNLOAD_NAME);
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "audio/wav".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        wav,
    )
        .into_response()
}

/// Render an error with its sources, outermost first.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(&format!("\n  caused by: {}", cause));
        source = cause.source();
    }
    message
}

// Error handling
#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        (status, Json(ErrorResponse { error })).into_response()
    }
}
