use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use piper_serve::{AppState, ErrorResponse, HealthResponse, create_router};
use piper_speech::{
    ModelLocator, PcmBuffer, PiperLoader, PiperOptions, SpeechError, SpeechResult, VoiceCache,
    VoiceId, VoiceLoader, VoiceModel,
};
use std::io::Cursor;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tower::ServiceExt;

/// Deterministic stand-in for a neural voice: one sample per input byte.
struct ToneVoice {
    sample_rate: u32,
}

impl VoiceModel for ToneVoice {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn synthesize(&self, text: &str) -> SpeechResult<PcmBuffer> {
        let samples: Vec<i16> = text.bytes().map(|b| i16::from(b) * 100).collect();
        Ok(PcmBuffer::from_samples(&samples))
    }
}

struct BrokenVoice;

impl VoiceModel for BrokenVoice {
    fn sample_rate(&self) -> u32 {
        22_050
    }

    fn synthesize(&self, _text: &str) -> SpeechResult<PcmBuffer> {
        Err(SpeechError::Inference(
            "secret internal detail".to_string(),
        ))
    }
}

struct PanickingVoice;

impl VoiceModel for PanickingVoice {
    fn sample_rate(&self) -> u32 {
        22_050
    }

    fn synthesize(&self, _text: &str) -> SpeechResult<PcmBuffer> {
        panic!("model crashed");
    }
}

#[derive(Default)]
struct FakeLoader {
    loads: AtomicUsize,
}

impl FakeLoader {
    fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

impl VoiceLoader for FakeLoader {
    fn load(&self, voice: &VoiceId) -> SpeechResult<Arc<dyn VoiceModel>> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        match voice.name() {
            "en_US-lessac-medium" => Ok(Arc::new(ToneVoice {
                sample_rate: 22_050,
            })),
            "en_US-amy-low" => Ok(Arc::new(ToneVoice {
                sample_rate: 16_000,
            })),
            "broken" => Ok(Arc::new(BrokenVoice)),
            "panicky" => Ok(Arc::new(PanickingVoice)),
            other => Err(SpeechError::ModelNotFound {
                voice: other.to_string(),
                searched: vec![],
            }),
        }
    }
}

fn app_with(loader: Arc<dyn VoiceLoader>) -> Router {
    let _ = env_logger::builder().is_test(true).try_init();
    let voices = Arc::new(VoiceCache::new(loader));
    create_router(AppState::new(voices, VoiceId::default()))
}

async fn get(app: &Router, uri: &str) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, headers, body.to_vec())
}

fn error_of(body: &[u8]) -> String {
    let parsed: ErrorResponse = serde_json::from_slice(body).unwrap();
    parsed.error
}

#[tokio::test]
async fn tts_returns_wav_attachment() {
    let app = app_with(Arc::new(FakeLoader::default()));

    let (status, headers, body) = get(
        &app,
        "/api/tts?text=Hello%20world&voice=en_US-lessac-medium",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::CONTENT_TYPE], "audio/wav");
    assert_eq!(
        headers[header::CONTENT_DISPOSITION],
        "attachment; filename=\"output.wav\""
    );

    assert_eq!(&body[0..4], b"RIFF");
    assert_eq!(&body[8..12], b"WAVE");
    assert_eq!(&body[12..16], b"fmt ");

    let reader = hound::WavReader::new(Cursor::new(body)).unwrap();
    let spec = reader.spec();
    assert_eq!(spec.channels, 1);
    assert_eq!(spec.bits_per_sample, 16);
    assert_eq!(spec.sample_format, hound::SampleFormat::Int);
    assert_eq!(spec.sample_rate, 22_050);
    assert_eq!(reader.len(), "Hello world".len() as u32);
}

#[tokio::test]
async fn sample_rate_follows_the_voice() {
    let app = app_with(Arc::new(FakeLoader::default()));

    let (status, _, body) = get(&app, "/api/tts?text=hi&voice=en_US-amy-low").await;

    assert_eq!(status, StatusCode::OK);
    let reader = hound::WavReader::new(Cursor::new(body)).unwrap();
    assert_eq!(reader.spec().sample_rate, 16_000);
}

#[tokio::test]
async fn missing_voice_uses_default() {
    let loader = Arc::new(FakeLoader::default());
    let app = app_with(loader.clone());

    let (status, _, _) = get(&app, "/api/tts?text=hi").await;
    assert_eq!(status, StatusCode::OK);

    let (status, _, _) = get(&app, "/api/tts?text=hi&voice=").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(loader.loads(), 1);
}

#[tokio::test]
async fn repeated_parameters_use_first_value() {
    let app = app_with(Arc::new(FakeLoader::default()));

    let (status, _, body) = get(
        &app,
        "/api/tts?text=hi&text=there&voice=en_US-amy-low&voice=nope",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let reader = hound::WavReader::new(Cursor::new(body)).unwrap();
    assert_eq!(reader.spec().sample_rate, 16_000);
    assert_eq!(reader.len(), 2);
}

#[tokio::test]
async fn missing_text_is_bad_request() {
    let app = app_with(Arc::new(FakeLoader::default()));

    let (status, headers, body) = get(&app, "/api/tts?voice=en_US-lessac-medium").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(
        headers[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("application/json")
    );
    assert_eq!(body, br#"{"error":"Text to synthesize is required."}"#);
}

#[tokio::test]
async fn empty_text_is_bad_request_for_any_voice() {
    let loader = Arc::new(FakeLoader::default());
    let app = app_with(loader.clone());

    for uri in [
        "/api/tts?text=",
        "/api/tts?text=&voice=en_US-lessac-medium",
        "/api/tts?text=&voice=does-not-exist",
        "/api/tts",
    ] {
        let (status, _, body) = get(&app, uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(error_of(&body), "Text to synthesize is required.");
    }
    assert_eq!(loader.loads(), 0);
}

#[tokio::test]
async fn unknown_voice_is_server_error() {
    let app = app_with(Arc::new(FakeLoader::default()));

    let (status, _, body) = get(&app, "/api/tts?text=hi&voice=nope").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(error_of(&body), "Could not load voice model for 'nope'.");
}

#[tokio::test]
async fn unknown_voice_with_piper_loader() {
    let voices_dir = tempfile::tempdir().unwrap();
    let loader = PiperLoader::new(
        ModelLocator::new([voices_dir.path()]),
        PiperOptions::default(),
    );
    let app = app_with(Arc::new(loader));

    let (status, _, body) = get(&app, "/api/tts?text=hi&voice=en_US-lessac-medium").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(error_of(&body).contains("en_US-lessac-medium"));

    let (status, _, _) = get(&app, "/api/tts?text=hi&voice=..%2Fescape").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn repeated_voice_is_loaded_once() {
    let loader = Arc::new(FakeLoader::default());
    let app = app_with(loader.clone());

    for _ in 0..3 {
        let (status, _, _) = get(&app, "/api/tts?text=again&voice=en_US-lessac-medium").await;
        assert_eq!(status, StatusCode::OK);
    }
    assert_eq!(loader.loads(), 1);
}

#[tokio::test]
async fn failed_load_is_retried() {
    let loader = Arc::new(FakeLoader::default());
    let app = app_with(loader.clone());

    get(&app, "/api/tts?text=hi&voice=nope").await;
    get(&app, "/api/tts?text=hi&voice=nope").await;
    assert_eq!(loader.loads(), 2);
}

#[tokio::test]
async fn same_request_gives_identical_audio() {
    let app = app_with(Arc::new(FakeLoader::default()));
    let uri = "/api/tts?text=The%20quick%20brown%20fox&voice=en_US-lessac-medium";

    let (_, _, first) = get(&app, uri).await;
    let (_, _, second) = get(&app, uri).await;

    assert!(!first.is_empty());
    assert_eq!(first, second);
}

#[tokio::test]
async fn synthesis_failure_does_not_leak_details() {
    let app = app_with(Arc::new(FakeLoader::default()));

    let (status, _, body) = get(&app, "/api/tts?text=hi&voice=broken").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(error_of(&body), "Failed to synthesize audio.");
    assert!(!String::from_utf8_lossy(&body).contains("secret"));
}

#[tokio::test]
async fn synthesis_panic_is_server_error() {
    let app = app_with(Arc::new(FakeLoader::default()));

    let (status, _, body) = get(&app, "/api/tts?text=hi&voice=panicky").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(error_of(&body), "Failed to synthesize audio.");
}

#[tokio::test]
async fn index_serves_html() {
    let app = app_with(Arc::new(FakeLoader::default()));

    let (status, headers, body) = get(&app, "/").await;

    assert_eq!(status, StatusCode::OK);
    assert!(
        headers[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/html")
    );
    assert!(String::from_utf8_lossy(&body).contains("/api/tts"));
}

#[tokio::test]
async fn health_counts_loaded_voices() {
    let app = app_with(Arc::new(FakeLoader::default()));

    let (_, _, body) = get(&app, "/health").await;
    let health: HealthResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(health.status, "healthy");
    assert_eq!(health.voices_loaded, 0);

    get(&app, "/api/tts?text=hi").await;
    get(&app, "/api/tts?text=hi&voice=nope").await;

    let (_, _, body) = get(&app, "/health").await;
    let health: HealthResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(health.voices_loaded, 1);
}
