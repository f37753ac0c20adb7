use crate::config::Config;
use crate::steps::Step;
use crate::tts::TtsClient;
use anyhow::{Context, Result};
use log::error;
use std::path::{Path, PathBuf};
use tokio::time::{sleep, Duration};

#[derive(Debug, Default)]
pub struct BatchSummary {
    pub generated: Vec<u32>,
    pub failed: Vec<u32>,
}

pub struct BatchRunner {
    config: Config,
    tts: Box<dyn TtsClient>,
}

impl BatchRunner {
    pub fn new(config: Config, tts: Box<dyn TtsClient>) -> Self {
        Self { config, tts }
    }

    fn artifact_path(&self, step: &Step) -> PathBuf {
        Path::new(&self.config.output_folder).join(step.artifact_name())
    }

    /// Runs the batch over `steps`, already sorted ascending by id. One
    /// step's failure never aborts the rest; the summary records what needs
    /// regeneration.
    pub async fn run(&self, steps: &[Step]) -> Result<BatchSummary> {
        let mut summary = BatchSummary::default();

        for step in steps {
            match self.generate(step).await {
                Ok(()) => summary.generated.push(step.id),
                Err(e) => {
                    error!("Step {} failed: {:#}", step.id, e);
                    summary.failed.push(step.id);
                }
            }

            // Unconditional pause, success or failure. Rate-limit contract
            // with the external service.
            sleep(Duration::from_millis(self.config.step_delay_ms)).await;
        }

        if summary.failed.is_empty() {
            println!("\nDone! All audio files generated.");
        } else {
            println!(
                "\nDone with failures. Generated: {:?}, failed: {:?}",
                summary.generated, summary.failed
            );
        }

        Ok(summary)
    }

    async fn generate(&self, step: &Step) -> Result<()> {
        let text = step.narration();
        println!("Step {}: {} chars, generating...", step.id, text.len());

        let audio = self.tts.synthesize(&text).await?;

        // Full overwrite, last write wins. Nothing is written on a failed
        // synthesis, so a prior artifact survives a failed regeneration.
        let path = self.artifact_path(step);
        tokio::fs::write(&path, &audio)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;

        println!("  Saved {} ({} KB)", path.display(), audio.len() / 1024);
        Ok(())
    }
}
