mod command;

use std::{
    io::{self, BufRead, BufReader},
    path::PathBuf,
};

use broadcast_switcher_core::{
    AppConfig, JsonFileStorage, MemoryStorage, NoCamera, RenderSurface, SceneStore, Scope, Storage,
    Switcher,
};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::command::Command;

fn main() -> broadcast_switcher_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    match cli.command {
        Commands::Session { script } => run_session(config, script.as_ref()),
        Commands::Scenes => list_scenes(config),
    }
}

fn load_config(cli: &Cli) -> broadcast_switcher_core::Result<AppConfig> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    if let Some(state) = &cli.state {
        config.storage_path = Some(state.clone());
    }
    Ok(config)
}

fn run_session(config: AppConfig, script: Option<&PathBuf>) -> broadcast_switcher_core::Result<()> {
    tracing::info!(?script, storage = ?config.storage_path, "starting switcher session");

    let mut switcher = Switcher::from_config(config, Box::new(NoCamera), RenderSurface::new());
    let reader: Box<dyn BufRead> = match script {
        Some(path) => Box::new(BufReader::new(std::fs::File::open(path)?)),
        None => Box::new(BufReader::new(io::stdin())),
    };

    for (number, line) in reader.lines().enumerate() {
        let line = line?;
        match Command::parse(&line) {
            Ok(Some(command)) => execute(&mut switcher, command),
            Ok(None) => {}
            Err(err) => tracing::warn!(line = number + 1, error = %err, "skipping command"),
        }
    }

    switcher.shutdown();
    Ok(())
}

fn execute(switcher: &mut Switcher, command: Command) {
    match command {
        Command::Set { key, value } => switcher.set_field(&key, &value),
        Command::Overlay(variant) => switcher.select_overlay(variant),
        Command::Video(source) => switcher.select_video(source),
        Command::Key(press) => {
            let dispatch = switcher.handle_key(&press);
            tracing::debug!(?press, ?dispatch, "key handled");
        }
        Command::Save(slot) => {
            switcher.save_scene(slot);
        }
        Command::Recall(slot) => {
            switcher.recall_scene(slot);
        }
        Command::Rename { slot, name } => {
            switcher.rename_scene(slot, &name);
        }
        Command::Take => switcher.take_live(),
        Command::Wait(ms) => switcher.advance(ms),
        Command::Theme => switcher.toggle_theme(),
        Command::Sample => switcher.load_sample_data(),
        Command::Camera => switcher.start_camera(),
        Command::Show => print_state(switcher),
    }
}

fn print_state(switcher: &Switcher) {
    let surface = switcher.surface();
    for (label, scope, snapshot) in [
        ("PREVIEW", Scope::Preview, switcher.staged_snapshot()),
        ("PROGRAM", Scope::Live, switcher.live_snapshot()),
    ] {
        let shown: Vec<_> = surface
            .active_overlays(scope)
            .iter()
            .map(ToString::to_string)
            .collect();
        println!(
            "{label}: overlay={} (showing: {}) video={}",
            snapshot.overlay,
            if shown.is_empty() { "none".to_string() } else { shown.join(",") },
            snapshot.video,
        );
        for (key, value) in snapshot.fields.iter().filter(|(_, value)| !value.is_empty()) {
            println!("  {key}: {value}");
        }
    }
    if surface.cue_active() {
        println!("cue: running");
    }
    if let Some(help) = surface.help_text() {
        println!("help: {help}");
    }
    for notice in surface.notices() {
        println!("notice: {notice}");
    }
}

fn list_scenes(config: AppConfig) -> broadcast_switcher_core::Result<()> {
    for slot in load_scenes(&config)?.slots() {
        let state = if slot.is_empty() { "empty" } else { "saved" };
        println!(
            "{}: {} [{state}] overlay={} video={} fields={}",
            slot.id,
            slot.display_name(),
            slot.overlay_variant,
            slot.video_source,
            slot.fields.len(),
        );
    }
    Ok(())
}

/// Reads the stored slots without starting a switcher, so listing never
/// rewrites the state file.
fn load_scenes(config: &AppConfig) -> broadcast_switcher_core::Result<SceneStore> {
    let storage: Box<dyn Storage> = match &config.storage_path {
        Some(path) => Box::new(JsonFileStorage::open(path)?),
        None => Box::new(MemoryStorage::new()),
    };
    Ok(SceneStore::load(
        storage.as_ref(),
        config.default_overlay,
        config.default_video,
    ))
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .try_init();
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Preview/program broadcast graphics switcher", long_about = None)]
struct Cli {
    /// JSON configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    /// Persisted state file, overriding the configured one.
    #[arg(short, long, global = true)]
    state: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Drive a headless switcher from operator commands.
    Session {
        /// Command script to run instead of reading stdin.
        script: Option<PathBuf>,
    },
    /// List the stored scene slots.
    Scenes,
}

#[cfg(test)]
mod tests {
    use super::*;
    use broadcast_switcher_core::OverlayVariant;

    #[test]
    fn listing_scenes_leaves_state_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("switcher-state.json");
        let config = AppConfig {
            storage_path: Some(path.clone()),
            ..AppConfig::default()
        };
        let mut switcher =
            Switcher::from_config(config.clone(), Box::new(NoCamera), RenderSurface::new());
        switcher.select_overlay(OverlayVariant::Desk);
        switcher.save_scene(1);
        drop(switcher);
        let before = std::fs::read_to_string(&path).unwrap();

        let scenes = load_scenes(&config).unwrap();

        assert_eq!(scenes.slot(1).unwrap().overlay_variant, OverlayVariant::Desk);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
    }

    #[test]
    fn listing_scenes_without_state_file_creates_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.json");
        let config = AppConfig {
            storage_path: Some(path.clone()),
            ..AppConfig::default()
        };

        let scenes = load_scenes(&config).unwrap();

        assert!(scenes.slots().iter().all(|slot| slot.is_empty()));
        assert!(!path.exists());
    }
}
