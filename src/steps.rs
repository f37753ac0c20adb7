use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Pause marker inserted between narration lines so the synthesized speech
/// breathes between sentences.
const LINE_SEPARATOR: &str = " ... ";

/// One unit of narration content. `lines` is ordered; order survives into the
/// synthesized audio.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Step {
    pub id: u32,
    pub lines: Vec<String>,
}

impl Step {
    pub fn narration(&self) -> String {
        self.lines.join(LINE_SEPARATOR)
    }

    pub fn artifact_name(&self) -> String {
        format!("step-{}.mp3", self.id)
    }
}

/// The full content table, loaded once at startup and immutable afterwards.
/// Steps are kept sorted ascending by id.
#[derive(Debug, Clone)]
pub struct StepTable {
    steps: Vec<Step>,
}

impl StepTable {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read steps file {}", path.display()))?;
        let steps: Vec<Step> = serde_yaml_ng::from_str(&content)
            .with_context(|| format!("Failed to parse steps file {}", path.display()))?;
        Self::new(steps)
    }

    pub fn new(mut steps: Vec<Step>) -> Result<Self> {
        if steps.is_empty() {
            bail!("Steps file contains no steps");
        }

        steps.sort_by_key(|s| s.id);
        for pair in steps.windows(2) {
            if pair[0].id == pair[1].id {
                bail!("Duplicate step id {}", pair[0].id);
            }
        }

        for step in &steps {
            if step.lines.is_empty() {
                bail!("Step {} has no narration lines", step.id);
            }
            if step.lines.iter().any(|line| line.trim().is_empty()) {
                bail!("Step {} contains an empty narration line", step.id);
            }
        }

        Ok(Self { steps })
    }

    pub fn all(&self) -> Vec<Step> {
        self.steps.clone()
    }

    /// Selects an explicit subset for targeted regeneration. Unknown ids are
    /// an error rather than a silent no-op.
    pub fn select(&self, ids: &[u32]) -> Result<Vec<Step>> {
        let mut selected = Vec::with_capacity(ids.len());
        for id in ids {
            match self.steps.iter().find(|s| s.id == *id) {
                Some(step) => selected.push(step.clone()),
                None => bail!("Unknown step id {}", id),
            }
        }
        selected.sort_by_key(|s| s.id);
        selected.dedup_by_key(|s| s.id);
        Ok(selected)
    }
}
