use crate::config::Config;
use anyhow::{anyhow, Result};
use async_trait::async_trait;

#[async_trait]
pub trait TtsClient: Send + Sync {
    /// Synthesizes one narration text into a complete binary audio payload.
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>>;
}

pub fn create_tts_client(config: &Config) -> Result<Box<dyn TtsClient>> {
    match config.tts.provider.as_str() {
        "elevenlabs" => Ok(Box::new(elevenlabs::ElevenLabsClient::new(config)?)),
        _ => Err(anyhow!("Unknown TTS provider: {}", config.tts.provider)),
    }
}

pub mod elevenlabs;
