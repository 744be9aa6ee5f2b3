use crate::audio;
use crate::batch::runner::{discover_channels, BatchRunner};
use crate::batch::speaker::resolve_speaker;
use crate::batch::{ChannelId, FailurePolicy};
use crate::cli::commands::*;
use crate::config;
use crate::error::{ChoraleError, Result};
use crate::merge;
use crate::transcription::channel::{transcribe_channel, TranscribeOptions};
use crate::transcription::models::{ModelManager, WhisperModel};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub async fn handle_command(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Merge {
            session_dir,
            output,
            policy,
        } => handle_merge(session_dir, output, policy).await,
        Commands::Transcribe {
            file,
            speaker,
            offset,
            save_dir,
        } => handle_transcribe(file, speaker, offset, save_dir).await,
        Commands::Show { artifact } => handle_show(&artifact),
        Commands::Config { action } => handle_config(action),
        Commands::Models { action } => handle_models(action),
    }
}

async fn handle_merge(
    session_dir: PathBuf,
    output: Option<PathBuf>,
    policy: Option<String>,
) -> Result<()> {
    let mut config = config::loader::load_config_with_env()?;
    if let Some(p) = policy {
        config.batch.failure_policy = FailurePolicy::from_str(&p).map_err(ChoraleError::Config)?;
    }

    let channels = discover_channels(&session_dir)?;
    if channels.is_empty() {
        eprintln!("No WAV files found in {}", session_dir.display());
        return Err(ChoraleError::EmptyBatch);
    }

    let output = output.unwrap_or_else(|| default_artifact_path(&config, &session_dir));
    let engine = crate::transcription::build_engine(&config.transcription)?;

    let runner = BatchRunner::new(engine, config.batch.clone());
    let outcome = runner.run(channels, &output).await?;

    println!(
        "Merged {} chunks from {} channels into {}",
        outcome.chunk_count,
        outcome.channels_merged,
        outcome.artifact_path.display()
    );
    if !outcome.channels_failed.is_empty() {
        println!(
            "Skipped {} failed channel(s): {}",
            outcome.channels_failed.len(),
            outcome
                .channels_failed
                .iter()
                .map(|id| id.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }
    Ok(())
}

fn default_artifact_path(
    config: &config::settings::ChoraleConfig,
    session_dir: &Path,
) -> PathBuf {
    match &config.storage.output_dir {
        Some(dir) => {
            let session = session_dir
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("session");
            dir.join(format!("{}.json", session))
        }
        None => session_dir.join("output.json"),
    }
}

async fn handle_transcribe(
    file: PathBuf,
    speaker: Option<String>,
    offset: u64,
    save_dir: Option<PathBuf>,
) -> Result<()> {
    let config = config::loader::load_config_with_env()?;
    let engine = crate::transcription::build_engine(&config.transcription)?;

    let filename = file
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string();
    let stem = file
        .file_stem()
        .and_then(|n| n.to_str())
        .unwrap_or("channel")
        .to_string();

    let speaker = match speaker {
        Some(s) => s,
        None => resolve_speaker(&filename)?,
    };

    let samples = audio::load_samples(&file)?;
    let options = TranscribeOptions::new(speaker, offset as f64);
    let id = ChannelId::from_string(stem.clone());
    let transcript = tokio::task::spawn_blocking(move || {
        transcribe_channel(engine.as_ref(), &samples, id, &options)
    })
    .await
    .map_err(|e| ChoraleError::Transcription(format!("Transcription task panicked: {}", e)))??;

    let chunks: Vec<merge::ArtifactChunk> = transcript
        .chunks
        .iter()
        .map(|c| merge::ArtifactChunk {
            text: c.text.clone(),
            speaker: c.speaker.clone(),
            start: c.global_start,
            end: c.global_end,
        })
        .collect();

    println!("{}", serde_json::to_string_pretty(&chunks)?);

    if let Some(dir) = save_dir {
        std::fs::create_dir_all(&dir)?;
        let path = dir.join(format!("{}-off{}.json", stem, offset));
        let document = serde_json::json!({ "output": chunks });
        std::fs::write(&path, serde_json::to_string_pretty(&document)?)?;
        eprintln!("Saved {}", path.display());
    }

    Ok(())
}

fn handle_show(artifact: &Path) -> Result<()> {
    let chunks = merge::read_artifact(artifact)?;
    if chunks.is_empty() {
        println!("(empty transcript)");
        return Ok(());
    }
    for chunk in &chunks {
        println!(
            "[{}] {}: {}",
            chunk.format_timestamp(),
            chunk.speaker,
            chunk.text
        );
    }
    Ok(())
}

fn handle_config(action: ConfigCommands) -> Result<()> {
    match action {
        ConfigCommands::Show => {
            let config = config::loader::load_config()?;
            println!("{}", toml::to_string_pretty(&config)?);
        }
        ConfigCommands::Path => {
            println!("{}", config::loader::config_path()?.display());
        }
        ConfigCommands::Init => {
            let config = config::settings::ChoraleConfig::default();
            config::loader::save_config(&config)?;
            println!("Wrote {}", config::loader::config_path()?.display());
        }
    }
    Ok(())
}

fn handle_models(action: ModelCommands) -> Result<()> {
    let manager = ModelManager::new(config::loader::models_dir()?);

    match action {
        ModelCommands::List => {
            for (model, present, size_mb) in manager.list_all() {
                let status = if present { "downloaded" } else { "-" };
                println!("{:>16}  {:>5} MB  {}", model.to_string(), size_mb, status);
            }
        }
        ModelCommands::Download { model } => {
            let model = parse_model(&model)?;
            println!("Downloading {} ({} MB)...", model, model.size_mb());
            let path = manager.download_model(model, |done, total| {
                if total > 0 {
                    print!("\r{:.0}%", done as f64 / total as f64 * 100.0);
                    let _ = std::io::stdout().flush();
                }
            })?;
            println!("\nSaved {}", path.display());
        }
        ModelCommands::Delete { model } => {
            let model = parse_model(&model)?;
            manager.delete_model(model)?;
            println!("Deleted {}", model);
        }
    }
    Ok(())
}

fn parse_model(name: &str) -> Result<WhisperModel> {
    WhisperModel::from_str(name)
        .ok_or_else(|| ChoraleError::Config(format!("Unknown whisper model: {}", name)))
}
