/// Novella Player: presentation engine of a visual-novel chat client
///
/// Architecture:
///   assets/:   background / sprite / sound resolution and asset probing
///   engine/:   timers, fades, audio mixer, headless frame loop
///   game/:     scene queue, emotion animation, presentation facade
mod assets;
mod engine;
mod game;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use novella_common::PlayerConfig;
use tracing_subscriber::EnvFilter;

use crate::engine::output::{AudioOutput, RodioOutput, SilentOutput};
use crate::game::presentation::PresentationFacade;
use crate::game::script::Script;

#[derive(Parser)]
#[command(
    name = "novella",
    about = "Novella: scene, animation and audio playback for visual-novel chats",
    version,
    propagate_version = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a recorded session script
    Play {
        /// Session script (JSON)
        script: PathBuf,

        /// Player configuration (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Asset root holding characters/, backgrounds/ and sounds/
        #[arg(short, long)]
        assets: Option<PathBuf>,

        /// Start muted
        #[arg(long)]
        mute: bool,

        /// Master volume (0.0 - 1.0)
        #[arg(long)]
        volume: Option<f32>,

        /// Advance automatically once a scene has been shown this long (ms)
        #[arg(long)]
        auto_advance: Option<u32>,

        /// Pace frames in real time
        #[arg(long)]
        realtime: bool,
    },

    /// Parse a session script and print a summary
    Check {
        /// Session script (JSON)
        script: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("novella=debug".parse()?))
        .init();

    tracing::info!("Novella Player v{}", env!("CARGO_PKG_VERSION"));

    let cli = Cli::parse();
    match cli.command {
        Commands::Play {
            script,
            config,
            assets,
            mute,
            volume,
            auto_advance,
            realtime,
        } => {
            let mut config = load_config(config.as_deref())?;
            if let Some(root) = assets {
                config.assets.root = root;
            }
            if let Some(volume) = volume {
                config.audio.master_volume = volume;
            }
            config.audio.muted |= mute;
            config.validate().context("Invalid player settings")?;

            let options = engine::RunOptions {
                auto_advance_ms: auto_advance,
                realtime,
            };
            play(&script, &config, &options)
        }
        Commands::Check { script } => check(&script),
    }
}

fn load_config(path: Option<&Path>) -> Result<PlayerConfig> {
    match path {
        Some(path) => {
            let config = PlayerConfig::load(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?;
            tracing::info!("Config: {}", path.display());
            Ok(config)
        }
        None => Ok(PlayerConfig::default()),
    }
}

fn play(script_path: &Path, config: &PlayerConfig, options: &engine::RunOptions) -> Result<()> {
    let script = Script::load(script_path)
        .with_context(|| format!("Failed to load script {}", script_path.display()))?;

    let store = assets::AssetStore::load(&config.assets.root)
        .with_context(|| format!("Failed to index assets under {}", config.assets.root.display()))?;
    tracing::info!("Assets: {} files under {}", store.total_files(), store.root.display());

    // Fall back to silence when there is no audio device
    let output: Box<dyn AudioOutput> = match RodioOutput::new(store.sound_dir()) {
        Some(output) => Box::new(output),
        None => {
            tracing::warn!("Continuing without audio");
            Box::new(SilentOutput)
        }
    };

    let mut facade = PresentationFacade::new(config, output, Box::new(store));
    let stats = engine::run(&mut facade, &script, options)?;

    println!(
        "Played {} scene(s) in {} frames: {} punch(es), {} auto-advance(s), {} background change(s)",
        stats.scenes_shown, stats.frames, stats.punches, stats.auto_advances, stats.background_changes
    );
    Ok(())
}

fn check(script_path: &Path) -> Result<()> {
    let script = Script::load(script_path)
        .with_context(|| format!("Failed to load script {}", script_path.display()))?;
    let summary = script.summary();

    println!("{}", script_path.display());
    println!("  steps:         {}", summary.steps);
    println!("  scenes:        {}", summary.scenes);
    println!("  events:        {}", summary.events);
    println!("  failures:      {}", summary.failures);
    println!("  world changes: {}", summary.world_changes);
    println!("  clicks:        {}", summary.advances);
    println!("  waits:         {} ms", summary.wait_ms);
    Ok(())
}
