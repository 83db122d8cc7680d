//! # Piper Serve
//!
//! HTTP front-end that synthesizes speech with cached Piper voices.
//!
//! Endpoints:
//! - `GET /`: static demo page
//! - `GET /health`: liveness and number of loaded voices
//! - `GET /api/tts?text=..&voice=..`: WAV attachment named `output.wav`

pub mod error;
mod server;

pub use error::{Result, ServeError};
pub use server::api::{AppError, ErrorResponse, HealthResponse, TtsQuery, create_router};
pub use server::state::AppState;
pub use server::{ServerConfig, serve};
