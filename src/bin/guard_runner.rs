//! Headless Guard Runner
//!
//! Runs a scenario for a fixed number of ticks with its scripted target and
//! prints a JSON summary of escalation events per guard.

use clap::Parser;
use serde::Serialize;

use guard_watch::core::types::{GuardId, Tick};
use guard_watch::guard::collaborators::{Effect, EffectLog};
use guard_watch::guard::runtime::AlertState;
use guard_watch::loader::scenario::{load_named_scenario, load_scenario};
use guard_watch::simulation::tick::{run_guard_tick, GuardEvent};

/// Headless Guard Runner - scripted scenarios with JSON output
#[derive(Parser, Debug)]
#[command(name = "guard_runner")]
#[command(about = "Run a guard scenario headless and print a JSON event summary")]
struct Args {
    /// Scenario name (loaded from data/scenarios/)
    #[arg(long, default_value = "town_square")]
    scenario: String,

    /// Scenario file path; overrides --scenario
    #[arg(long)]
    file: Option<String>,

    /// Ticks to simulate
    #[arg(long, default_value_t = 1800)]
    ticks: u64,

    /// Override the scenario seed
    #[arg(long)]
    seed: Option<u64>,

    /// Hold the target still instead of following its path
    #[arg(long)]
    static_target: bool,

    /// Target dashes for the whole run
    #[arg(long)]
    dash: bool,

    /// Include every event in the output
    #[arg(long, short = 'v')]
    verbose: bool,
}

/// Per-guard summary
#[derive(Serialize)]
struct GuardSummary {
    id: GuardId,
    authority: String,
    warns: usize,
    detains: usize,
    chases: usize,
    first_warn: Option<Tick>,
    first_detain: Option<Tick>,
    final_state: AlertState,
    final_suspicion: f32,
}

/// JSON output structure
#[derive(Serialize)]
struct RunResult {
    scenario: String,
    seed: u64,
    ticks: u64,
    guards: Vec<GuardSummary>,
    notifications: Vec<String>,
    follow_ups: Vec<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    events: Option<Vec<GuardEvent>>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter("guard_watch=info")
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let loaded = match &args.file {
        Some(path) => load_scenario(path),
        None => load_named_scenario(&args.scenario),
    };
    let mut scenario = match loaded {
        Ok(scenario) => scenario,
        Err(e) => {
            eprintln!("Failed to load scenario: {}", e);
            std::process::exit(1);
        }
    };
    if let Some(seed) = args.seed {
        scenario.seed = seed;
    }

    let mut world = match scenario.build_world() {
        Ok(world) => world,
        Err(e) => {
            eprintln!("Failed to build scenario: {}", e);
            std::process::exit(1);
        }
    };
    if args.dash {
        world.map.dashing = true;
    }

    let sim = scenario.simulation.clone();
    let mut script = scenario.target_script();
    let mut effects = EffectLog::new();
    let mut events = Vec::new();

    for _ in 0..args.ticks {
        if !args.static_target {
            script.advance(&mut world.map, world.current_tick);
        }
        events.extend(run_guard_tick(&mut world, &sim, &mut effects));
    }

    let guards = world
        .guards
        .iter()
        .map(|guard| {
            let mine = || events.iter().filter(move |e| event_guard(e) == guard.id);
            GuardSummary {
                id: guard.id,
                authority: guard.config.authority.clone(),
                warns: mine().filter(|e| matches!(e, GuardEvent::Warned { .. })).count(),
                detains: mine()
                    .filter(|e| matches!(e, GuardEvent::Detained { .. }))
                    .count(),
                chases: mine()
                    .filter(|e| {
                        matches!(
                            e,
                            GuardEvent::StateChanged {
                                to: AlertState::Chase,
                                ..
                            }
                        )
                    })
                    .count(),
                first_warn: mine().find_map(|e| match e {
                    GuardEvent::Warned { tick, .. } => Some(*tick),
                    _ => None,
                }),
                first_detain: mine().find_map(|e| match e {
                    GuardEvent::Detained { tick, .. } => Some(*tick),
                    _ => None,
                }),
                final_state: guard.state.alert_state,
                final_suspicion: guard.state.suspicion,
            }
        })
        .collect();

    let notifications = effects.notifications().map(str::to_string).collect();
    let follow_ups = effects
        .effects
        .iter()
        .filter_map(|e| match e {
            Effect::FollowUpAction { action } => Some(*action),
            _ => None,
        })
        .collect();

    let result = RunResult {
        scenario: scenario.name.clone(),
        seed: scenario.seed,
        ticks: args.ticks,
        guards,
        notifications,
        follow_ups,
        events: args.verbose.then_some(events),
    };

    match serde_json::to_string_pretty(&result) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Failed to serialize result: {}", e);
            std::process::exit(1);
        }
    }
}

fn event_guard(event: &GuardEvent) -> GuardId {
    match event {
        GuardEvent::StateChanged { guard, .. }
        | GuardEvent::Warned { guard, .. }
        | GuardEvent::Detained { guard, .. }
        | GuardEvent::FriendlyIgnored { guard, .. } => *guard,
    }
}
