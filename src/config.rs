use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_steps_file")]
    pub steps_file: String,

    #[serde(default = "default_output")]
    pub output_folder: String,

    /// Pause between successive steps, in milliseconds. Applied after every
    /// step regardless of outcome; this is the only throttle against the
    /// service's rate limit.
    #[serde(default = "default_step_delay_ms")]
    pub step_delay_ms: u64,

    #[serde(default)]
    pub tts: TtsConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TtsConfig {
    #[serde(default = "default_tts_provider")]
    pub provider: String,

    pub elevenlabs: Option<ElevenLabsConfig>,
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            provider: default_tts_provider(),
            elevenlabs: Some(ElevenLabsConfig::default()),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ElevenLabsConfig {
    #[serde(default = "default_elevenlabs_base_url")]
    pub base_url: String,

    #[serde(default = "default_voice_id")]
    pub voice_id: String,

    #[serde(default = "default_model_id")]
    pub model_id: String,

    #[serde(default = "default_stability")]
    pub stability: f32,

    #[serde(default = "default_similarity_boost")]
    pub similarity_boost: f32,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Resolved from the environment at startup. Never read from or written
    /// to config.yml.
    #[serde(skip)]
    pub api_key: String,
}

impl Default for ElevenLabsConfig {
    fn default() -> Self {
        Self {
            base_url: default_elevenlabs_base_url(),
            voice_id: default_voice_id(),
            model_id: default_model_id(),
            stability: default_stability(),
            similarity_boost: default_similarity_boost(),
            timeout_secs: default_timeout_secs(),
            api_key: String::new(),
        }
    }
}

fn default_steps_file() -> String {
    "steps.yml".to_string()
}
fn default_output() -> String {
    "public/audio".to_string()
}
fn default_step_delay_ms() -> u64 {
    1000
}
fn default_tts_provider() -> String {
    "elevenlabs".to_string()
}

fn default_elevenlabs_base_url() -> String {
    "https://api.elevenlabs.io/v1".to_string()
}

// Chris, conversational American. Matches the explainer's in-app narrator.
fn default_voice_id() -> String {
    "iP95p4xoKVk53GoZ742B".to_string()
}
fn default_model_id() -> String {
    "eleven_flash_v2_5".to_string()
}
fn default_stability() -> f32 {
    0.5
}
fn default_similarity_boost() -> f32 {
    0.75
}
fn default_timeout_secs() -> u64 {
    60
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            anyhow::bail!("{} not found. Please create one.", path.display());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Config = serde_yaml_ng::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(config)
    }

    /// Injects the API credential read from the environment. Must run before
    /// any TTS client is constructed; an absent or blank value aborts the
    /// whole batch with zero network calls made.
    pub fn resolve_credential(&mut self, api_key: Option<String>) -> Result<()> {
        let key = api_key.unwrap_or_default();
        if key.trim().is_empty() {
            anyhow::bail!("ELEVENLABS_API_KEY is not set. Export it before running.");
        }
        self.tts
            .elevenlabs
            .get_or_insert_with(Default::default)
            .api_key = key;
        Ok(())
    }

    pub fn ensure_directories(&self) -> Result<()> {
        fs::create_dir_all(&self.output_folder)
            .with_context(|| format!("Failed to create output folder {}", self.output_folder))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_config() {
        let yaml = "tts:\n  provider: elevenlabs\n";
        let config: Config = serde_yaml_ng::from_str(yaml).unwrap();

        assert_eq!(config.steps_file, "steps.yml");
        assert_eq!(config.output_folder, "public/audio");
        assert_eq!(config.step_delay_ms, 1000);
        assert_eq!(config.tts.provider, "elevenlabs");
        assert!(config.tts.elevenlabs.is_none());
    }

    #[test]
    fn test_elevenlabs_defaults() {
        let yaml = "tts:\n  elevenlabs: {}\n";
        let config: Config = serde_yaml_ng::from_str(yaml).unwrap();

        let eleven = config.tts.elevenlabs.unwrap();
        assert_eq!(eleven.base_url, "https://api.elevenlabs.io/v1");
        assert_eq!(eleven.voice_id, "iP95p4xoKVk53GoZ742B");
        assert_eq!(eleven.model_id, "eleven_flash_v2_5");
        assert_eq!(eleven.stability, 0.5);
        assert_eq!(eleven.similarity_boost, 0.75);
        assert_eq!(eleven.timeout_secs, 60);
        assert!(eleven.api_key.is_empty());
    }

    #[test]
    fn test_resolve_credential_missing() {
        let mut config = Config {
            steps_file: default_steps_file(),
            output_folder: default_output(),
            step_delay_ms: 0,
            tts: TtsConfig::default(),
        };

        assert!(config.resolve_credential(None).is_err());
        assert!(config.resolve_credential(Some("   ".to_string())).is_err());

        config.resolve_credential(Some("sk-test".to_string())).unwrap();
        assert_eq!(config.tts.elevenlabs.unwrap().api_key, "sk-test");
    }

    #[test]
    fn test_credential_never_serialized() {
        let mut config = Config {
            steps_file: default_steps_file(),
            output_folder: default_output(),
            step_delay_ms: 1000,
            tts: TtsConfig::default(),
        };
        config.resolve_credential(Some("sk-secret".to_string())).unwrap();

        let yaml = serde_yaml_ng::to_string(&config).unwrap();
        assert!(!yaml.contains("sk-secret"));
    }
}
