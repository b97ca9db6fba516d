//! Scripted demo match: the default lineup fights itself with every
//! character scheduler-driven, printing the event stream as it happens.
//!
//! Usage: grid-skirmish [--seed N] [--fast] [--json]

use grid_skirmish::{CombatOrchestrator, Control, MatchConfig, SetupError};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::process::ExitCode;
use std::thread;
use std::time::{Duration, Instant};

struct DemoOptions {
    seed: u64,
    fast: bool,
    json: bool,
}

fn parse_args() -> Result<DemoOptions, String> {
    let mut options = DemoOptions {
        seed: rand::rng().random(),
        fast: false,
        json: false,
    };

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--seed" => {
                let value = args.next().ok_or("--seed requires a value")?;
                options.seed = value
                    .parse()
                    .map_err(|_| format!("invalid seed: {}", value))?;
            }
            "--fast" => options.fast = true,
            "--json" => options.json = true,
            "--help" | "-h" => {
                println!("Usage: grid-skirmish [--seed N] [--fast] [--json]");
                std::process::exit(0);
            }
            other => return Err(format!("unknown argument: {}", other)),
        }
    }
    Ok(options)
}

fn run(options: &DemoOptions) -> Result<(), SetupError> {
    let config = MatchConfig {
        ai_turn_delay: if options.fast {
            Duration::ZERO
        } else {
            Duration::from_millis(400)
        },
        ..MatchConfig::default()
    };
    let mut rng = StdRng::seed_from_u64(options.seed);
    let mut game = CombatOrchestrator::with_default_setup(&config, &mut rng, Control::Ai)?;

    if !options.json {
        println!("grid-skirmish demo (seed {})", options.seed);
        for character in game.roster().iter() {
            println!(
                "  {} at {} ({} hp, speed {})",
                character.name,
                character.position,
                character.current_health,
                character.stats.speed
            );
        }
        println!();
    }

    game.start_game(Instant::now());
    loop {
        game.poll(Instant::now());
        for event in game.drain_events() {
            if options.json {
                match serde_json::to_string(&event) {
                    Ok(line) => println!("{}", line),
                    Err(err) => eprintln!("event serialization failed: {}", err),
                }
            } else if let Some(line) = event.format(game.roster()) {
                println!("{}", line);
            }
        }
        if game.is_over() {
            break;
        }
        if !options.fast {
            thread::sleep(Duration::from_millis(50));
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let options = match parse_args() {
        Ok(options) => options,
        Err(message) => {
            eprintln!("{}", message);
            eprintln!("Usage: grid-skirmish [--seed N] [--fast] [--json]");
            return ExitCode::FAILURE;
        }
    };

    match run(&options) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("failed to set up the match: {}", err);
            ExitCode::FAILURE
        }
    }
}
