//! AquaVision headless runner
//!
//! Plays one mission with the autopilot and prints the outcome.
//!
//! Usage: `aquavision [MISSION] [--ticks N] [--settings PATH] [--realtime]`

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use aquavision::consts::*;
use aquavision::persistence::JsonFileBackend;
use aquavision::sim::{Autopilot, Command, GameEvent, InputEvent, MissionOutcome};
use aquavision::{ProgressStore, Session, Settings};

/// Roughly 15 phases of a minute each
const DEFAULT_TICK_LIMIT: u64 = 60_000;

struct Args {
    mission: u32,
    ticks: u64,
    settings: Option<PathBuf>,
    realtime: bool,
}

fn parse_args() -> Result<Args, String> {
    let mut args = Args {
        mission: 1,
        ticks: DEFAULT_TICK_LIMIT,
        settings: None,
        realtime: false,
    };
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--ticks" => {
                let value = it.next().ok_or("--ticks needs a value")?;
                args.ticks = value
                    .parse()
                    .map_err(|_| format!("invalid tick count: {value}"))?;
            }
            "--settings" => {
                let value = it.next().ok_or("--settings needs a path")?;
                args.settings = Some(PathBuf::from(value));
            }
            "--realtime" => args.realtime = true,
            other => {
                args.mission = other
                    .parse()
                    .ok()
                    .filter(|m| (1..=MISSION_COUNT).contains(m))
                    .ok_or_else(|| format!("mission must be 1-{MISSION_COUNT}, got {other}"))?;
            }
        }
    }
    Ok(args)
}

fn main() -> ExitCode {
    env_logger::init();

    let args = match parse_args() {
        Ok(args) => args,
        Err(msg) => {
            eprintln!("{msg}");
            eprintln!("usage: aquavision [MISSION] [--ticks N] [--settings PATH] [--realtime]");
            return ExitCode::from(2);
        }
    };

    let settings = args
        .settings
        .as_deref()
        .map(Settings::load)
        .unwrap_or_default();
    log::info!(
        "AquaVision starting: mission {}, {} eye, seed {:#x}",
        args.mission,
        settings.eye_side.as_str(),
        settings.seed
    );

    let store = ProgressStore::open(Box::new(JsonFileBackend::new(&settings.progress_path)));
    let mut session = Session::start(&settings, store, args.mission);
    let mut pilot = Autopilot::new();
    let mut outcome: Option<MissionOutcome> = None;

    for _ in 0..args.ticks {
        for event in pilot.plan(session.state()) {
            session.push_input(event);
        }
        for event in session.tick() {
            if let GameEvent::MissionEnded(ended) = event {
                outcome = Some(ended);
            }
        }
        if outcome.is_some() {
            break;
        }
        if args.realtime {
            std::thread::sleep(Duration::from_millis(TICK_MS));
        }
    }

    if outcome.is_none() {
        log::warn!("Tick limit reached, abandoning mission");
        session.push_input(InputEvent::Command(Command::Abandon));
        session.tick();
    }

    for record in &session.state().phase_records {
        println!("{record}");
    }
    match &outcome {
        Some(outcome) => match serde_json::to_string_pretty(outcome) {
            Ok(json) => println!("{json}"),
            Err(err) => log::error!("Could not encode outcome: {}", err),
        },
        None => println!("Mission {} abandoned", args.mission),
    }
    println!("Mission {}: {}", args.mission, session.report());

    ExitCode::SUCCESS
}
