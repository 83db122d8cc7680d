pub mod api;
pub mod state;

use crate::error::{Result, ServeError};
use api::create_router;
use piper_speech::{DEFAULT_VOICE, VoiceCache, VoiceId};
use state::AppState;
use std::sync::Arc;
use tokio::signal;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Voice used when a request does not name one
    pub default_voice: VoiceId,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5001,
            default_voice: VoiceId::new(DEFAULT_VOICE),
        }
    }
}

impl ServerConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Serve the TTS API until Ctrl+C or SIGTERM.
///
/// # Example
///
/// ```no_run
/// use piper_serve::{serve, ServerConfig};
/// use piper_speech::{ModelLocator, PiperLoader, PiperOptions, VoiceCache};
/// use std::sync::Arc;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let loader = PiperLoader::new(ModelLocator::standard("voices"), PiperOptions::default());
///     let voices = Arc::new(VoiceCache::new(Arc::new(loader)));
///
///     serve(ServerConfig::default(), voices).await?;
///     Ok(())
/// }
/// ```
pub async fn serve(config: ServerConfig, voices: Arc<VoiceCache>) -> Result<()> {
    log::info!("Initializing Piper TTS HTTP server");
    log::debug!("Server configuration: {:?}", config);

    let state = AppState::new(voices, config.default_voice.clone());

    let app = create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await.map_err(|e| {
        log::error!("Failed to bind to {}: {}", addr, e);
        ServeError::BindError {
            addr: addr.clone(),
            source: e,
        }
    })?;

    log::info!("Listening on http://{}", addr);
    log::info!("  - GET  http://{}/", addr);
    log::info!("  - GET  http://{}/health", addr);
    log::info!("  - GET  http://{}/api/tts?text=...&voice=...", addr);
    log::info!("Default voice: {}", config.default_voice);

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        log::error!("Server error: {}", e);
        return Err(e.into());
    }

    log::info!("Server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            log::warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                log::warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    log::info!("Shutdown signal received");
}
