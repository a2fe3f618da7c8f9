//! Speech synthesis.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_polly::types::{Engine, OutputFormat, VoiceId};
use aws_sdk_polly::Client;
use tracing::debug;

use kada_media::probe_duration_ms;

use crate::error::{SpeechError, SpeechResult};

/// Default Polly engine.
pub const DEFAULT_ENGINE: &str = "generative";

/// An audio file produced for one cue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesizedSpeech {
    pub path: PathBuf,
    /// Playable length of the audio
    pub duration_ms: u64,
}

/// Text-to-speech seam.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize `text` with `voice` into an MP3 at `output`.
    async fn synthesize(&self, text: &str, voice: &str, output: &Path) -> SpeechResult<SynthesizedSpeech>;
}

/// Polly settings.
#[derive(Debug, Clone)]
pub struct PollyConfig {
    /// Engine name (`generative`, `neural`, `standard`, `long-form`)
    pub engine: String,
    /// Timeout for probing each synthesized file
    pub probe_timeout: Duration,
}

impl Default for PollyConfig {
    fn default() -> Self {
        Self {
            engine: DEFAULT_ENGINE.to_string(),
            probe_timeout: Duration::from_secs(30),
        }
    }
}

impl PollyConfig {
    /// Load from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            engine: std::env::var("POLLY_ENGINE").unwrap_or(defaults.engine),
            probe_timeout: std::env::var("PROBE_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.probe_timeout),
        }
    }
}

/// Amazon Polly backed synthesizer.
#[derive(Clone)]
pub struct PollySynthesizer {
    client: Client,
    config: PollyConfig,
}

impl PollySynthesizer {
    pub fn new(sdk_config: &aws_types::SdkConfig, config: PollyConfig) -> Self {
        Self {
            client: Client::new(sdk_config),
            config,
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for PollySynthesizer {
    async fn synthesize(&self, text: &str, voice: &str, output: &Path) -> SpeechResult<SynthesizedSpeech> {
        let resp = self
            .client
            .synthesize_speech()
            .engine(Engine::from(self.config.engine.as_str()))
            .output_format(OutputFormat::Mp3)
            .text(text.trim())
            .voice_id(VoiceId::from(voice))
            .send()
            .await
            .map_err(|e| SpeechError::synthesis(format!("{} ({})", e, voice)))?;

        let audio = resp
            .audio_stream
            .collect()
            .await
            .map_err(|e| SpeechError::synthesis(format!("reading audio stream: {}", e)))?
            .into_bytes();

        tokio::fs::write(output, &audio).await?;
        let duration_ms = probe_duration_ms(output, self.config.probe_timeout).await?;
        debug!("Synthesized {} bytes, {} ms into {}", audio.len(), duration_ms, output.display());

        Ok(SynthesizedSpeech {
            path: output.to_path_buf(),
            duration_ms,
        })
    }
}
