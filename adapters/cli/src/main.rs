#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a tilecrawl level in the terminal.
//!
//! Player commands are read one per line from a script file or standard
//! input, and a text frame is printed after every tick.

mod frame;
mod level_file;
mod session;

use std::{
    fs::File,
    io::{self, BufRead, BufReader, Write},
    path::PathBuf,
};

use anyhow::{bail, Context, Result};
use clap::Parser;
use tilecrawl_core::PlayerCommand;
use tilecrawl_simulation::Simulation;

use crate::session::Session;

/// Runs a tilecrawl dungeon level headlessly.
#[derive(Debug, Parser)]
#[command(name = "tilecrawl", version)]
struct Args {
    /// Level file made of glyph rows or comma-separated tile codes.
    #[arg(long)]
    level: PathBuf,
    /// TOML file describing the player, enemies and simulation tuning.
    #[arg(long)]
    session: Option<PathBuf>,
    /// Overrides the seed from the session file.
    #[arg(long)]
    seed: Option<u64>,
    /// Reads commands from this file instead of standard input.
    #[arg(long)]
    script: Option<PathBuf>,
    /// Draws planned enemy routes.
    #[arg(long)]
    show_paths: bool,
}

/// Entry point for the tilecrawl command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("tilecrawl=info")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let grid = level_file::load(&args.level)?;
    let mut session = match &args.session {
        Some(path) => Session::load(path)?,
        None => Session::default(),
    };
    if let Some(seed) = args.seed {
        session.simulation.seed = seed;
    }

    let mut simulation = Simulation::new(
        grid,
        session.player_profile(),
        session.enemy_profiles(),
        session.placement(),
        session.simulation,
    )
    .context("failed to populate level")?;

    let input: Box<dyn BufRead> = match &args.script {
        Some(path) => Box::new(BufReader::new(File::open(path).with_context(|| {
            format!("failed to open command script at {}", path.display())
        })?)),
        None => Box::new(io::stdin().lock()),
    };

    run(&mut simulation, input, args.show_paths)
}

fn run(simulation: &mut Simulation, input: impl BufRead, show_paths: bool) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    out.write_all(frame::render(&simulation.level(), show_paths).as_bytes())?;

    for line in input.lines() {
        let line = line.context("failed to read command")?;
        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(error) => {
                tracing::warn!(%error, "skipping command");
                continue;
            }
        };

        let outcome = simulation.advance_tick(command);
        if command != PlayerCommand::Quit {
            out.write_all(frame::render(&simulation.level(), show_paths).as_bytes())?;
        }
        if !outcome.should_continue {
            break;
        }
    }

    out.flush()?;
    Ok(())
}

fn parse_command(line: &str) -> Result<PlayerCommand> {
    let command = match line.trim().to_ascii_lowercase().as_str() {
        "w" | "up" | "k" => PlayerCommand::Up,
        "s" | "down" | "j" => PlayerCommand::Down,
        "a" | "left" | "h" => PlayerCommand::Left,
        "d" | "right" | "l" => PlayerCommand::Right,
        "e" | "interact" => PlayerCommand::Interact,
        "q" | "quit" => PlayerCommand::Quit,
        "" | "." | "wait" => PlayerCommand::Idle,
        other => bail!("unknown command `{other}`"),
    };
    Ok(command)
}
