//! Guard Watch - Entry Point
//!
//! Loads a scenario (default `town_square`) and drives it from stdin: the
//! user moves the target around and advances ticks while guards react.

use guard_watch::core::config::{Command, SimulationConfig};
use guard_watch::core::error::Result;
use guard_watch::core::types::{Direction, GuardId};
use guard_watch::guard::collaborators::{Effect, EffectLog};
use guard_watch::loader::scenario::{load_named_scenario, load_scenario};
use guard_watch::simulation::tick::{run_guard_tick, GuardEvent};
use guard_watch::simulation::world::GuardWorld;

use std::io::{self, Write};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("guard_watch=debug")
        .init();

    tracing::info!("Guard Watch starting...");

    let scenario = match std::env::args().nth(1) {
        Some(path) => load_scenario(path)?,
        None => load_named_scenario("town_square")?,
    };
    let mut world = scenario.build_world()?;
    let mut sim = scenario.simulation.clone();
    let mut effects = EffectLog::new();

    println!("\n=== GUARD WATCH: {} ===", scenario.name);
    println!();
    println!("Commands:");
    println!("  tick / t              - Advance one tick");
    println!("  run <n>               - Run n ticks");
    println!("  up/down/left/right    - Move the target one tile");
    println!("  dash / stealth        - Toggle target dashing / stealth status");
    println!("  status / s            - Show guard status");
    println!("  overlay / o           - Print the vision overlay");
    println!("  ai on|off|toggle      - Global AI switch");
    println!("  vision on|off         - Debug overlay every tick");
    println!("  start|stop <id>       - Enable / disable a guard");
    println!("  patrol on|off <id>    - Resume / pause a guard's patrol");
    println!("  quit / q              - Exit");
    println!();

    loop {
        print!("[tick {}] > ", world.current_tick);
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let words: Vec<&str> = input.split_whitespace().collect();

        match words.as_slice() {
            [] => continue,
            ["quit"] | ["q"] => break,
            ["tick"] | ["t"] => advance(&mut world, &sim, &mut effects, 1),
            ["run", n] => match n.parse::<u32>() {
                Ok(n) => advance(&mut world, &sim, &mut effects, n),
                Err(_) => println!("Usage: run <number>"),
            },
            [dir @ ("up" | "down" | "left" | "right")] => {
                let dir = parse_direction(dir);
                if world.map.move_target(dir) {
                    advance(&mut world, &sim, &mut effects, 1);
                } else {
                    println!("Blocked.");
                }
            }
            ["dash"] => {
                world.map.dashing = !world.map.dashing;
                println!("Dashing: {}", world.map.dashing);
            }
            ["stealth"] => {
                world.map.stealth = !world.map.stealth;
                println!("Stealth: {}", world.map.stealth);
            }
            ["status"] | ["s"] => display_status(&world, &sim),
            ["overlay"] | ["o"] => println!("{}", world.render_overlay(&sim)),
            ["ai", "on"] => apply(&mut world, &mut sim, Command::EnableAi),
            ["ai", "off"] => apply(&mut world, &mut sim, Command::DisableAi),
            ["ai", "toggle"] => apply(&mut world, &mut sim, Command::ToggleAi),
            ["vision", "on"] => apply(&mut world, &mut sim, Command::SetDebugVision(true)),
            ["vision", "off"] => apply(&mut world, &mut sim, Command::SetDebugVision(false)),
            ["start", id] => with_id(id, |id| apply(&mut world, &mut sim, Command::StartGuard(id))),
            ["stop", id] => with_id(id, |id| apply(&mut world, &mut sim, Command::StopGuard(id))),
            ["patrol", "on", id] => {
                with_id(id, |id| apply(&mut world, &mut sim, Command::StartPatrol(id)))
            }
            ["patrol", "off", id] => {
                with_id(id, |id| apply(&mut world, &mut sim, Command::StopPatrol(id)))
            }
            _ => println!("Unknown command: {}", input.trim()),
        }
    }

    println!("Goodbye.");
    Ok(())
}

fn parse_direction(word: &str) -> Direction {
    match word {
        "up" => Direction::Up,
        "left" => Direction::Left,
        "right" => Direction::Right,
        _ => Direction::Down,
    }
}

fn with_id(raw: &str, f: impl FnOnce(GuardId)) {
    match raw.parse::<u32>() {
        Ok(id) => f(GuardId(id)),
        Err(_) => println!("Guard ids are numbers"),
    }
}

fn apply(world: &mut GuardWorld, sim: &mut SimulationConfig, command: Command) {
    if world.apply_command(sim, command) {
        println!("OK: {:?}", command);
    } else {
        println!("Rejected: {:?}", command);
    }
}

fn advance(world: &mut GuardWorld, sim: &SimulationConfig, effects: &mut EffectLog, ticks: u32) {
    for _ in 0..ticks {
        for event in run_guard_tick(world, sim, effects) {
            print_event(&event);
        }
        for effect in effects.drain() {
            if let Effect::Notification { text } = effect {
                println!("  \"{}\"", text);
            }
        }
    }
    if let Some(overlay) = &world.last_overlay {
        println!("{}", overlay);
    }
}

fn print_event(event: &GuardEvent) {
    match event {
        GuardEvent::StateChanged {
            guard,
            tick,
            from,
            to,
        } => println!("  [{}] {} {:?} -> {:?}", tick, guard, from, to),
        GuardEvent::Warned {
            guard,
            tick,
            suspicion,
        } => println!("  [{}] {} warns (suspicion {:.1})", tick, guard, suspicion),
        GuardEvent::Detained { guard, tick, cause } => {
            println!("  [{}] {} detains ({:?})", tick, guard, cause)
        }
        GuardEvent::FriendlyIgnored { .. } => {}
    }
}

fn display_status(world: &GuardWorld, sim: &SimulationConfig) {
    let target = world.map.target;
    println!("\n--- Tick {} ---", world.current_tick);
    println!(
        "AI: {}  Target: ({}, {}) facing {:?}{}{}",
        if sim.enabled { "on" } else { "off" },
        target.position.x,
        target.position.y,
        target.facing,
        if world.map.dashing { " [dashing]" } else { "" },
        if world.map.stealth { " [stealth]" } else { "" },
    );
    for guard in &world.guards {
        println!(
            "  {} {:<12} ({:>2},{:>2}) {:?}  {:?}  suspicion {:>5.1}{}{}",
            guard.id,
            guard.name(),
            guard.position.x,
            guard.position.y,
            guard.facing,
            guard.state.alert_state,
            guard.state.suspicion,
            if guard.state.warned { " [warned]" } else { "" },
            if guard.state.active { "" } else { " [inactive]" },
        );
    }
    println!();
}
