use crate::config::{Config, ElevenLabsConfig};
use crate::tts::TtsClient;
use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use url::Url;

/// Error bodies are truncated to this many characters before logging.
const ERROR_BODY_LIMIT: usize = 200;

#[derive(Debug, Serialize)]
struct SynthesisRequest<'a> {
    text: &'a str,
    model_id: &'a str,
    voice_settings: VoiceSettings,
}

#[derive(Debug, Serialize)]
struct VoiceSettings {
    stability: f32,
    similarity_boost: f32,
}

pub struct ElevenLabsClient {
    config: ElevenLabsConfig,
    endpoint: Url,
    client: reqwest::Client,
}

impl ElevenLabsClient {
    pub fn new(config: &Config) -> Result<Self> {
        let eleven = config
            .tts
            .elevenlabs
            .clone()
            .ok_or_else(|| anyhow!("ElevenLabs config missing"))?;

        if eleven.api_key.trim().is_empty() {
            bail!("ElevenLabs API key is empty. Set ELEVENLABS_API_KEY.");
        }

        let endpoint = build_endpoint(&eleven.base_url, &eleven.voice_id)?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(eleven.timeout_secs))
            .build()?;

        Ok(Self {
            config: eleven,
            endpoint,
            client,
        })
    }
}

fn build_endpoint(base_url: &str, voice_id: &str) -> Result<Url> {
    let mut url = Url::parse(base_url).context("Invalid ElevenLabs base URL")?;
    url.path_segments_mut()
        .map_err(|_| anyhow!("ElevenLabs base URL cannot be a base"))?
        .pop_if_empty()
        .extend(["text-to-speech", voice_id]);
    Ok(url)
}

fn truncate(body: &str, limit: usize) -> &str {
    match body.char_indices().nth(limit) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}

#[async_trait]
impl TtsClient for ElevenLabsClient {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        let payload = SynthesisRequest {
            text,
            model_id: &self.config.model_id,
            voice_settings: VoiceSettings {
                stability: self.config.stability,
                similarity_boost: self.config.similarity_boost,
            },
        };

        let resp = self
            .client
            .post(self.endpoint.clone())
            .header("xi-api-key", &self.config.api_key)
            .json(&payload)
            .send()
            .await
            .context("ElevenLabs request failed")?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(anyhow!(
                "ElevenLabs synthesis failed: {}: {}",
                status,
                truncate(&body, ERROR_BODY_LIMIT)
            ));
        }

        let bytes = resp.bytes().await.context("Failed to read audio body")?;
        Ok(bytes.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_endpoint() {
        let url = build_endpoint("https://api.elevenlabs.io/v1", "iP95p4xoKVk53GoZ742B").unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.elevenlabs.io/v1/text-to-speech/iP95p4xoKVk53GoZ742B"
        );

        // A trailing slash on the base must not double up.
        let url = build_endpoint("https://api.elevenlabs.io/v1/", "voice").unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.elevenlabs.io/v1/text-to-speech/voice"
        );

        assert!(build_endpoint("not a url", "voice").is_err());
    }

    #[test]
    fn test_request_body_shape() {
        let payload = SynthesisRequest {
            text: "Hello there.",
            model_id: "eleven_flash_v2_5",
            voice_settings: VoiceSettings {
                stability: 0.5,
                similarity_boost: 0.75,
            },
        };

        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["text"], "Hello there.");
        assert_eq!(value["model_id"], "eleven_flash_v2_5");
        assert_eq!(value["voice_settings"]["stability"], 0.5);
        assert_eq!(value["voice_settings"]["similarity_boost"], 0.75);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 200), "short");
        let long = "x".repeat(300);
        assert_eq!(truncate(&long, 200).len(), 200);
        // Must cut on a char boundary, not a byte offset.
        let cjk = "語".repeat(300);
        assert_eq!(truncate(&cjk, 200).chars().count(), 200);
    }
}
