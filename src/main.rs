mod batch;
mod config;
mod steps;
mod tts;

use anyhow::{Context, Result};
use batch::BatchRunner;
use config::Config;
use steps::StepTable;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let mut config = match Config::load("config.yml") {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            eprintln!("Please ensure 'config.yml' exists with valid TTS settings.");
            return Err(e);
        }
    };

    // Credential check happens up front; a missing key must abort before any
    // network activity.
    if let Err(e) = config.resolve_credential(std::env::var("ELEVENLABS_API_KEY").ok()) {
        eprintln!("ERROR: {}", e);
        return Err(e);
    }

    let table = StepTable::load(&config.steps_file)?;
    let steps = match parse_step_args(std::env::args().skip(1))? {
        Some(ids) => table.select(&ids)?,
        None => table.all(),
    };

    config.ensure_directories()?;

    let tts = tts::create_tts_client(&config)?;
    let runner = BatchRunner::new(config, tts);
    runner.run(&steps).await?;

    Ok(())
}

/// No flags. Bare invocation runs every step; positional integers run a
/// targeted subset, e.g. `steps2narration 5 6 7 8`.
fn parse_step_args(args: impl Iterator<Item = String>) -> Result<Option<Vec<u32>>> {
    let ids = args
        .map(|arg| {
            arg.parse::<u32>()
                .with_context(|| format!("Invalid step id '{}', expected an integer", arg))
        })
        .collect::<Result<Vec<u32>>>()?;

    if ids.is_empty() {
        Ok(None)
    } else {
        Ok(Some(ids))
    }
}
