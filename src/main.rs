use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, ValueEnum};
use futures::StreamExt;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use readit::domain::tts::{TtsOptions, TtsService, TtsServiceApi};
use readit::error::{AppError, AppResult};
use readit::infrastructure::config::{Config, LogFormat};
use readit::infrastructure::repositories::{create_tts_repository, LanguageDetectionMode};

/// readit - read text from stdin and write synthesized speech to stdout
#[derive(Parser, Debug)]
#[command(name = "readit", version, about)]
struct Cli {
    /// TTS provider (openai, google, polly); overrides TTS_PROVIDER
    #[arg(long)]
    provider: Option<String>,

    /// Conversion mode
    #[arg(long, value_enum, default_value_t = Mode::Large)]
    mode: Mode,

    /// Provider model (e.g. tts-1, Neural2, neural)
    #[arg(long)]
    model: Option<String>,

    /// Provider voice
    #[arg(long)]
    voice: Option<String>,

    /// Audio format (mp3, opus, aac, flac, wav, pcm, ogg)
    #[arg(long)]
    response_format: Option<String>,

    /// Speaking rate
    #[arg(long)]
    speed: Option<f32>,

    /// Language tag (e.g. en, es-ES); detected when omitted and detection is enabled
    #[arg(long)]
    language: Option<String>,

    /// Voice pitch (Google only)
    #[arg(long, allow_negative_numbers = true)]
    pitch: Option<f32>,

    /// Treat the input as SSML
    #[arg(long)]
    ssml: bool,

    /// Maximum characters per provider call
    #[arg(long)]
    chunk_size: Option<usize>,

    /// Language detection (off, local, cloud); overrides LANGUAGE_DETECTION
    #[arg(long)]
    language_detection: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Single provider call, text must fit the provider limit
    Small,
    /// Chunked conversion, audio written once at the end
    Medium,
    /// Chunked conversion, audio written chunk by chunk
    Large,
}

impl Cli {
    fn tts_options(&self) -> TtsOptions {
        TtsOptions {
            model: self.model.clone(),
            voice: self.voice.clone(),
            response_format: self.response_format.clone(),
            speed: self.speed,
            language: self.language.clone(),
            pitch: self.pitch,
            is_ssml: self.ssml.then_some(true),
            chunk_size: self.chunk_size,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "readit failed");
            eprintln!("readit: {}", e);
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run(cli: Cli) -> AppResult<()> {
    // Load configuration
    let mut config = Config::from_env()?;
    if let Some(mode) = &cli.language_detection {
        config.language_detection = mode
            .parse::<LanguageDetectionMode>()
            .map_err(AppError::Config)?;
    }
    if cli.provider.is_some() {
        config.provider = cli.provider.clone();
    }

    // Initialize logging
    init_logging(&config);

    let provider = config.provider.as_deref();
    let tts_repo = create_tts_repository(provider, None, &config.provider_options(provider))?;
    tracing::info!(
        provider = tts_repo.name(),
        max_input_length = tts_repo.max_input_length(),
        mode = ?cli.mode,
        "TTS provider ready"
    );
    let tts_service = TtsService::new(Arc::clone(&tts_repo));

    let mut text = String::new();
    tokio::io::stdin().read_to_string(&mut text).await?;

    let options = cli.tts_options();
    let mut stdout = tokio::io::stdout();

    match cli.mode {
        Mode::Small => {
            let audio = tts_service.small_text_to_speech(&text, &options).await?;
            stdout.write_all(&audio).await?;
        }
        Mode::Medium => {
            let audio = tts_service.medium_text_to_speech(&text, &options).await?;
            stdout.write_all(&audio).await?;
        }
        Mode::Large => {
            let mut audio_stream = tts_service.large_text_to_speech(&text, &options);
            while let Some(audio) = audio_stream.next().await {
                stdout.write_all(&audio?).await?;
                stdout.flush().await?;
            }
        }
    }

    stdout.flush().await?;
    Ok(())
}

fn init_logging(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "readit=info".into());

    if config.log_format == LogFormat::Json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().pretty().with_writer(std::io::stderr))
            .init();
    }
}
