//! Uga-Buga headless runner
//!
//! Loads a level, drives it with a scripted input pattern at the fixed tick
//! rate and reports the outcome. Useful for smoke-testing layouts and tuning.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use uga_platformer::flow::{MenuAction, NavChoice, Screen};
use uga_platformer::Settings;
use uga_platformer::sim::{
    FrameSnapshot, GameEvent, LevelId, LevelSession, LevelSpec, Outcome, TickInput, tick,
};

#[derive(Parser)]
#[command(name = "uga-platformer")]
#[command(about = "Run a platformer level headlessly with scripted input")]
struct Args {
    /// Built-in level (level_01, level_02)
    #[arg(long, default_value = "level_01")]
    level: String,

    /// Load the layout from a JSON file instead of a built-in level
    #[arg(long)]
    level_file: Option<PathBuf>,

    /// Tuning overrides as JSON
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Stop after this many ticks if the level is still running
    #[arg(long, default_value_t = 3600)]
    ticks: u64,

    /// RNG seed
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Press jump every N ticks while holding right (0 = never)
    #[arg(long, default_value_t = 40)]
    jump_every: u64,

    /// Print the final frame snapshot as JSON
    #[arg(long)]
    dump_snapshot: bool,

    /// Results screen choice after a win or loss (restart, level_select, quit)
    #[arg(long, default_value = "quit", value_parser = parse_nav_choice)]
    on_finish: NavChoice,

    /// Upper bound on attempts when `--on-finish restart`
    #[arg(long, default_value_t = 3)]
    max_runs: u32,
}

fn parse_nav_choice(s: &str) -> Result<NavChoice, String> {
    NavChoice::from_str(s).ok_or_else(|| format!("unknown choice '{s}'"))
}

fn load_spec(args: &Args) -> Result<LevelSpec> {
    match &args.level_file {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("reading level file {}", path.display()))?;
            LevelSpec::from_json(&json)
                .with_context(|| format!("parsing level file {}", path.display()))
        }
        None => Ok(LevelSpec::builtin(LevelId::parse_or_default(&args.level))),
    }
}

/// Hold right, tapping jump on a fixed cadence
fn scripted_input(tick: u64, jump_every: u64) -> TickInput {
    TickInput {
        move_right: true,
        jump: jump_every > 0 && tick % jump_every == 0,
        ..Default::default()
    }
}

/// Play one attempt until an outcome or the tick limit
fn play(session: &mut LevelSession, args: &Args) {
    for t in 0..args.ticks {
        for event in tick(session, &scripted_input(t, args.jump_every)) {
            match event {
                GameEvent::OutcomeChanged(_) => {}
                other => log::debug!("tick {}: {:?}", session.time_ticks, other),
            }
        }
        if session.outcome != Outcome::Running {
            return;
        }
    }
    log::info!("Tick limit reached after {} ticks", session.time_ticks);
}

fn report(session: &LevelSession, run: u32) {
    println!(
        "{} (run {run}): {:?} after {} ticks, score {}, health {}/{}",
        session.spec.name,
        session.outcome,
        session.time_ticks,
        session.player.score,
        session.player.health,
        session.player.max_health
    );
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let settings = match &args.settings {
        Some(path) => Settings::load_from_path(path),
        None => Settings::default(),
    };
    let spec = load_spec(&args)?;
    log::info!("Uga-Buga headless run: '{}', seed {}", spec.name, args.seed);

    // Walk the menus the way a player would
    let level_id = LevelId::parse_or_default(&args.level);
    let mut screen = Screen::default()
        .next(MenuAction::Start)
        .next(MenuAction::Select(level_id));

    let mut session = LevelSession::new(spec, &settings, args.seed);
    let mut run = 1;
    loop {
        play(&mut session, &args);
        report(&session, run);

        screen = screen.after_outcome(session.outcome, args.on_finish);
        if !matches!(screen, Screen::Running(_)) || run >= args.max_runs {
            break;
        }
        run += 1;
        log::info!("Restarting '{}' (run {run})", session.spec.name);
        session.restart();
    }
    log::info!("Leaving to {screen:?}");

    if args.dump_snapshot {
        let json = FrameSnapshot::capture(&session)
            .to_json()
            .context("serializing frame snapshot")?;
        println!("{json}");
    }
    Ok(())
}
