//! Space Fighter entry point
//!
//! Runs a session on the headless platform: autopilot or scripted input,
//! JSON-lines frame snapshots and logged audio cues.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;

use space_fighter::platform::InputAdapter;
use space_fighter::platform::headless::{Autopilot, JsonRenderer, LogAudio, ScriptedInput};
use space_fighter::sim::GameState;
use space_fighter::{ControlScheme, ExitReason, Game, GameConfig, Pacing};

#[derive(Parser)]
#[command(name = "space-fighter")]
#[command(about = "Headless runner for the Space Fighter arcade core")]
struct Cli {
    /// JSON config file; missing fields use defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Use the classic rule set (fixed roster, direct movement)
    #[arg(long)]
    classic: bool,

    /// Control scheme override: discrete or momentum
    #[arg(long)]
    scheme: Option<String>,

    /// RNG seed (random if omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Stop after this many frames
    #[arg(long, default_value_t = 3600)]
    frames: u64,

    /// JSON input script to replay instead of the autopilot
    #[arg(long)]
    script: Option<PathBuf>,

    /// Autopilot presses restart every N frames
    #[arg(long, default_value_t = 180)]
    restart_every: u64,

    /// Write frame snapshots here ("-" for stdout)
    #[arg(long)]
    output: Option<PathBuf>,

    /// Write every Nth frame snapshot
    #[arg(long, default_value_t = 60)]
    stride: u64,

    /// Pace frames against the wall clock
    #[arg(long)]
    realtime: bool,

    /// Start with audio muted
    #[arg(long)]
    mute: bool,
}

fn main() -> Result<()> {
    #[cfg(not(target_arch = "wasm32"))]
    env_logger::init();

    let cli = Cli::parse();
    log::info!("Space Fighter (headless) starting...");

    let config = load_config(&cli)?;
    let seed = cli.seed.unwrap_or_else(rand::random);
    let state = GameState::new(config, seed);

    let out: Box<dyn Write> = match &cli.output {
        None => Box::new(io::sink()),
        Some(path) if path.as_os_str() == "-" => Box::new(io::stdout().lock()),
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("creating {}", path.display()))?,
        )),
    };
    let renderer = JsonRenderer::new(out).with_stride(cli.stride);

    match &cli.script {
        Some(path) => run(&cli, state, renderer, ScriptedInput::load(path)?),
        None => {
            let pilot = Autopilot::new(Some(cli.frames)).with_restart_every(cli.restart_every);
            run(&cli, state, renderer, pilot)
        }
    }
}

fn load_config(cli: &Cli) -> Result<GameConfig> {
    let mut config = match (&cli.config, cli.classic) {
        (Some(path), _) => GameConfig::load(path)?,
        (None, true) => GameConfig::classic(),
        (None, false) => GameConfig::default(),
    };
    if let Some(name) = &cli.scheme {
        let Some(scheme) = ControlScheme::from_str(name) else {
            bail!("unknown control scheme '{name}' (expected discrete or momentum)");
        };
        config.control_scheme = scheme;
    }
    config.validate()?;
    Ok(config)
}

fn run<I: InputAdapter>(
    cli: &Cli,
    state: GameState,
    renderer: JsonRenderer<Box<dyn Write>>,
    input: I,
) -> Result<()> {
    let pacing = if cli.realtime {
        Pacing::RealTime
    } else {
        Pacing::Unthrottled
    };
    // The autopilot quits on its own; leave one frame for the quit press
    let mut game = Game::new(state, renderer, input, LogAudio::new())
        .with_pacing(pacing)
        .with_frame_limit(cli.frames + 1);
    game.audio_mut().set_muted(cli.mute);

    let reason = game.run()?;
    let state = game.state();
    match reason {
        ExitReason::Quit => log::info!("Player quit"),
        ExitReason::InputClosed => log::info!("Input script finished"),
        ExitReason::FrameLimit => log::info!("Frame limit reached"),
    }
    log::info!(
        "Final score {} (difficulty level {}, seed {})",
        state.score,
        state.spawner.difficulty_level,
        state.seed
    );
    Ok(())
}
