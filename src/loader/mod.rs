//! Guard definitions from disk: TOML scenarios and legacy tag text

pub mod scenario;
pub mod tags;

pub use scenario::{load_named_scenario, load_scenario, Scenario, TargetScript};
pub use tags::parse_guard_tags;
