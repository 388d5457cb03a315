//! Escalation dispatcher
//!
//! Turns warn and detain crossings into fire-and-forget requests on the
//! host's `GuardEffects`. Nothing here waits on or inspects the outcome.

use crate::core::config::SimulationConfig;
use crate::core::types::{ActionId, Tick};
use crate::guard::collaborators::{GuardEffects, Notification};
use crate::guard::Guard;

pub const DEFAULT_WARN_TEXT: &str = "Halt! {name} suspects you ({wanted}).";
pub const DEFAULT_DETAIN_TEXT: &str = "{name} demands you settle your charges.";
pub const FRIENDLY_NOTICE_TEXT: &str = "{name}: Friendly ({rep}) - ignoring";

/// Guard override first, then the global id; 0 means none
fn follow_up(guard_override: Option<ActionId>, global: ActionId) -> Option<ActionId> {
    guard_override.filter(|&id| id > 0).or(Some(global).filter(|&id| id > 0))
}

fn notify(effects: &mut impl GuardEffects, sim: &SimulationConfig, notification: Notification) {
    if !sim.mute_notifications {
        effects.request_notification(notification);
    }
}

/// Warn threshold crossed
///
/// The report follow-up has its own per-guard cooldown, independent of the
/// alert cooldown.
pub fn on_warn(
    guard: &mut Guard,
    sim: &SimulationConfig,
    wanted: i32,
    effects: &mut impl GuardEffects,
    now: Tick,
) {
    tracing::info!("{} ({}) warns at tick {}", guard.id, guard.name(), now);

    if sim.warn_signal > 0 {
        effects.request_visual_signal(guard.id, sim.warn_signal);
    }

    let escalation = &guard.config.escalation;
    let template = escalation.warn_text.as_deref().unwrap_or(DEFAULT_WARN_TEXT);
    notify(
        effects,
        sim,
        Notification::new(template)
            .param("name", &guard.config.authority)
            .param("wanted", wanted),
    );

    if let Some(action) = follow_up(escalation.on_warn, sim.warn_action) {
        effects.reserve_follow_up_action(action);
    }

    if let Some(report) = follow_up(escalation.report, sim.report_action) {
        if now >= guard.state.report_until {
            effects.reserve_follow_up_action(report);
            guard.state.report_until = now + sim.report_cooldown;
        } else {
            tracing::debug!("{}: report suppressed until tick {}", guard.id, guard.state.report_until);
        }
    }
}

/// Detain fired (suspicion threshold or wanted-level override)
///
/// Called exactly once per Cooldown entry.
pub fn on_detain(
    guard: &Guard,
    sim: &SimulationConfig,
    wanted: i32,
    effects: &mut impl GuardEffects,
    now: Tick,
) {
    tracing::info!("{} ({}) detains at tick {}", guard.id, guard.name(), now);

    if sim.detain_signal > 0 {
        effects.request_visual_signal(guard.id, sim.detain_signal);
    }

    let escalation = &guard.config.escalation;
    let template = escalation.detain_text.as_deref().unwrap_or(DEFAULT_DETAIN_TEXT);
    notify(
        effects,
        sim,
        Notification::new(template)
            .param("name", &guard.config.authority)
            .param("wanted", wanted),
    );

    if escalation.open_detain_flow {
        effects.invoke_detain_flow(&guard.config.authority, guard.config.scope);
    }

    if let Some(action) = follow_up(escalation.on_detain, sim.detain_action) {
        effects.reserve_follow_up_action(action);
    }

    if escalation.allow_encounter && wanted >= escalation.hunt_threshold {
        tracing::info!("{}: wanted {} reached hunt threshold", guard.id, wanted);
        effects.request_encounter(escalation.encounter_troop);
    }
}

/// Throttled notice while a guard ignores a friendly target
pub fn friendly_notice(
    guard: &mut Guard,
    sim: &SimulationConfig,
    reputation: i32,
    effects: &mut impl GuardEffects,
    now: Tick,
) {
    if !sim.friendly_notice {
        return;
    }
    let due = guard
        .state
        .last_friendly_notice
        .map_or(true, |last| now.saturating_sub(last) >= sim.friendly_notice_cooldown.max(1));
    if due {
        guard.state.last_friendly_notice = Some(now);
        notify(
            effects,
            sim,
            Notification::new(FRIENDLY_NOTICE_TEXT)
                .param("name", &guard.config.authority)
                .param("rep", reputation),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{GuardId, Scope, TilePos};
    use crate::guard::collaborators::{Effect, EffectLog};
    use crate::guard::config::GuardConfig;

    fn guard() -> Guard {
        Guard::new(GuardId(7), TilePos::new(0, 0), GuardConfig::new("TownGuards"), 0)
    }

    #[test]
    fn test_warn_effects_in_order() {
        let mut guard = guard();
        guard.config.escalation.on_warn = Some(12);
        let mut log = EffectLog::new();
        on_warn(&mut guard, &SimulationConfig::default(), 40, &mut log, 100);

        assert_eq!(
            log.effects,
            vec![
                Effect::VisualSignal { guard: GuardId(7), signal: 1 },
                Effect::Notification {
                    text: "Halt! TownGuards suspects you (40).".into()
                },
                Effect::FollowUpAction { action: 12 },
            ]
        );
    }

    #[test]
    fn test_report_has_own_cooldown() {
        let mut guard = guard();
        let sim = SimulationConfig {
            report_action: 9,
            ..Default::default()
        };
        let mut log = EffectLog::new();

        on_warn(&mut guard, &sim, 0, &mut log, 100);
        on_warn(&mut guard, &sim, 0, &mut log, 399);
        on_warn(&mut guard, &sim, 0, &mut log, 400);

        let reports = log
            .effects
            .iter()
            .filter(|e| matches!(e, Effect::FollowUpAction { action: 9 }))
            .count();
        assert_eq!(reports, 2);
    }

    #[test]
    fn test_detain_hands_off_and_uses_custom_text() {
        let mut guard = guard();
        guard.config.escalation.detain_text = Some("{name} arrests you! ({wanted})".into());
        let sim = SimulationConfig {
            detain_action: 5,
            ..Default::default()
        };
        let mut log = EffectLog::new();
        on_detain(&guard, &sim, 80, &mut log, 10);

        assert_eq!(log.detain_count(), 1);
        assert!(log.effects.contains(&Effect::DetainFlow {
            authority: "TownGuards".into(),
            scope: Scope::Faction
        }));
        assert!(log.effects.contains(&Effect::FollowUpAction { action: 5 }));
        assert_eq!(log.notifications().next(), Some("TownGuards arrests you! (80)"));
    }

    #[test]
    fn test_hunt_encounter_needs_threshold() {
        let mut guard = guard();
        guard.config.escalation.allow_encounter = true;
        guard.config.escalation.encounter_troop = 4;
        let mut log = EffectLog::new();

        on_detain(&guard, &SimulationConfig::default(), 149, &mut log, 0);
        assert!(!log.effects.contains(&Effect::Encounter { troop: 4 }));

        on_detain(&guard, &SimulationConfig::default(), 150, &mut log, 0);
        assert!(log.effects.contains(&Effect::Encounter { troop: 4 }));
    }

    #[test]
    fn test_muted_notifications() {
        let mut guard = guard();
        let sim = SimulationConfig {
            mute_notifications: true,
            ..Default::default()
        };
        let mut log = EffectLog::new();
        on_warn(&mut guard, &sim, 0, &mut log, 0);
        assert_eq!(log.notifications().count(), 0);
    }

    #[test]
    fn test_friendly_notice_throttled() {
        let mut guard = guard();
        let sim = SimulationConfig {
            friendly_notice: true,
            ..Default::default()
        };
        let mut log = EffectLog::new();
        friendly_notice(&mut guard, &sim, 70, &mut log, 0);
        friendly_notice(&mut guard, &sim, 70, &mut log, 119);
        friendly_notice(&mut guard, &sim, 70, &mut log, 120);
        assert_eq!(log.notifications().count(), 2);
        assert_eq!(log.notifications().next(), Some("TownGuards: Friendly (70) - ignoring"));
    }
}
