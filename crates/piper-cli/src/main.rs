use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use piper_serve::{ServerConfig, serve};
use piper_speech::{
    DEFAULT_VOICE, ModelLocator, PiperLoader, PiperOptions, VoiceCache, VoiceId, synthesize_wav,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "piper-serve")]
#[command(about = "Piper TTS - serve voices over HTTP or synthesize to a file", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the TTS API over HTTP
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "5001")]
        port: u16,

        /// Voice used when a request does not name one
        #[arg(long, default_value = DEFAULT_VOICE)]
        default_voice: String,

        #[command(flatten)]
        engine: EngineArgs,
    },
    /// Synthesize text to a WAV file
    Synth {
        /// Text to synthesize
        #[arg(short, long)]
        text: String,

        /// Voice to use
        #[arg(short, long, default_value = DEFAULT_VOICE)]
        voice: String,

        /// Output WAV file
        #[arg(short, long, default_value = "output.wav")]
        output: PathBuf,

        #[command(flatten)]
        engine: EngineArgs,
    },
}

#[derive(Args)]
struct EngineArgs {
    /// Directory searched first for `<voice>.onnx`
    #[arg(long, default_value = "voices")]
    voices_dir: PathBuf,

    /// espeak-ng program used for phonemization
    #[arg(long, default_value = "espeak-ng")]
    espeak_bin: PathBuf,

    /// ONNX Runtime intra-op threads
    #[arg(long)]
    threads: Option<usize>,

    /// Speaker for multi-speaker voices
    #[arg(long, default_value = "0")]
    speaker_id: u32,

    /// Seconds of silence between sentences
    #[arg(long, default_value = "0.2")]
    sentence_silence: f32,
}

impl EngineArgs {
    fn voice_cache(self) -> Arc<VoiceCache> {
        let locator = ModelLocator::standard(self.voices_dir);
        log::debug!("Voice search path: {:?}", locator.search_dirs());

        let options = PiperOptions {
            espeak_program: self.espeak_bin,
            intra_threads: self.threads,
            speaker_id: self.speaker_id,
            sentence_silence_secs: self.sentence_silence,
        };
        Arc::new(VoiceCache::new(Arc::new(PiperLoader::new(locator, options))))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            host,
            port,
            default_voice,
            engine,
        } => {
            let config = ServerConfig {
                host,
                port,
                default_voice: VoiceId::new(default_voice),
            };
            serve(config, engine.voice_cache())
                .await
                .context("HTTP server failed")?;
        }
        Commands::Synth {
            text,
            voice,
            output,
            engine,
        } => {
            synth_to_file(engine.voice_cache(), VoiceId::new(voice), text, output).await?;
        }
    }

    Ok(())
}

async fn synth_to_file(
    voices: Arc<VoiceCache>,
    voice: VoiceId,
    text: String,
    output: PathBuf,
) -> Result<()> {
    let model = voices
        .try_get_or_load(&voice)
        .await
        .with_context(|| format!("Could not load voice model for '{}'", voice))?;

    log::info!("Synthesizing {} chars with voice '{}'", text.len(), voice);
    let wav = tokio::task::spawn_blocking(move || synthesize_wav(model.as_ref(), &text))
        .await
        .context("Synthesis task failed")?
        .context("Failed to synthesize audio")?;

    tokio::fs::write(&output, &wav)
        .await
        .with_context(|| format!("Failed to write {}", output.display()))?;

    log::info!("Wrote {} bytes to {}", wav.len(), output.display());
    Ok(())
}
