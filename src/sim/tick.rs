//! Per-frame simulation tick and run transitions
//!
//! READY → PLAYING → (miss → continue pending → PLAYING | ENDED)
//! and PLAYING/ENDED → RESETTING → READY.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::metrics::GameMetrics;
use super::state::{ContinueTicket, GameEvent, GameState, PendingContinue, RunState};
use crate::continues::ContinueOutcome;

/// Player gestures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    Start,
    Place,
    Restart,
}

/// Input for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// One-shot action (click/tap/space)
    pub action: Option<Action>,
    /// Host clock in milliseconds
    pub now_ms: u64,
}

impl TickInput {
    pub fn idle(now_ms: u64) -> Self {
        Self {
            action: None,
            now_ms,
        }
    }

    pub fn action(action: Action, now_ms: u64) -> Self {
        Self {
            action: Some(action),
            now_ms,
        }
    }
}

/// Advance the engine by one display frame
pub fn tick(state: &mut GameState, input: &TickInput) {
    if let Some(action) = input.action {
        handle_action(state, action, input.now_ms);
    }

    match state.run_state {
        RunState::Resetting if input.now_ms >= state.reset_until => enter_ready(state),
        RunState::Playing if !state.is_continue_pending() => state.tower.tick(),
        _ => {}
    }
}

/// Dispatch an action; returns whether it was accepted
pub fn handle_action(state: &mut GameState, action: Action, now_ms: u64) -> bool {
    if !state.accepts_action_at(now_ms) {
        log::debug!("Ignoring {:?} at {}ms: inside debounce window", action, now_ms);
        return false;
    }

    let accepted = match (action, state.run_state) {
        (Action::Restart, RunState::Playing | RunState::Ended) => {
            restart(state, now_ms);
            true
        }
        (Action::Restart, _) => false,
        (_, RunState::Ready) => {
            start_run(state, now_ms);
            true
        }
        (Action::Place, RunState::Playing) => place_block(state, now_ms),
        (Action::Start, RunState::Playing) => false,
        (_, RunState::Ended) => {
            restart(state, now_ms);
            true
        }
        (_, RunState::Resetting) => false,
    };

    if accepted {
        state.last_action_at = Some(now_ms);
    }
    accepted
}

fn start_run(state: &mut GameState, now_ms: u64) {
    state.run_id += 1;
    state.attempt_index = 0;
    state.pending_continue = None;
    state.last_summary = None;
    state.metrics = GameMetrics::new(now_ms);
    state.run_started_at = now_ms;

    if state.tower.is_empty() {
        let color_offset = state.rng.random_range(0..=100);
        let dimension = state.settings.foundation_dimension();
        state.tower.lay_foundation(dimension, color_offset);
    } else {
        state.tower.truncate_to_foundation();
    }
    spawn_next(state);

    state.run_state = RunState::Playing;
    log::info!("Run {} started (seed {})", state.run_id, state.seed);
    state.push_event(GameEvent::Started {
        run_id: state.run_id,
    });
    state.push_event(GameEvent::LevelChanged { level: 0 });
}

fn spawn_next(state: &mut GameState) {
    let start_high = state.rng.random_bool(0.5);
    state.tower.spawn_next(start_high, state.settings.move_amount);
}

/// Place the moving block. Rolls the tower back if the result is inconsistent.
fn place_block(state: &mut GameState, now_ms: u64) -> bool {
    if state.is_continue_pending() || state.tower.active().is_none() {
        return false;
    }

    let before = state.tower.clone();
    let Some(result) = state.tower.place_active(state.settings.snap_threshold) else {
        return false;
    };
    if result.is_success() {
        spawn_next(state);
    }
    if let Err(err) = state.tower.validate() {
        log::error!("Placement of block {} discarded: {}", result.index, err);
        state.tower = before;
        state.push_event(GameEvent::Fault {
            message: err.to_string(),
        });
        return false;
    }

    state.metrics.record(&result, now_ms);
    let success = result.is_success();
    let index = result.index;
    state.push_event(GameEvent::Placed(result));

    if success {
        let level = state.level();
        log::debug!("Level {}", level);
        state.push_event(GameEvent::LevelChanged { level });
    } else {
        let ticket = ContinueTicket {
            run_id: state.run_id,
            attempt_index: state.attempt_index,
        };
        let cost = state.pricing.cost_for(state.attempt_index);
        state.pending_continue = Some(PendingContinue {
            ticket,
            cost,
            level: state.level(),
        });
        log::info!(
            "Missed block {} at level {}; continue #{} costs {}",
            index,
            state.level(),
            state.attempt_index + 1,
            cost
        );
        state.push_event(GameEvent::Missed { index });
        state.push_event(GameEvent::ContinueRequested {
            ticket,
            attempt_index: state.attempt_index,
            cost,
        });
    }
    true
}

/// Apply a continue outcome.
///
/// Outcomes for a ticket that is no longer pending (run restarted, ended or
/// already resolved) are ignored. Returns whether the outcome was applied.
pub fn resolve_continue(
    state: &mut GameState,
    ticket: ContinueTicket,
    outcome: ContinueOutcome,
    now_ms: u64,
) -> bool {
    let pending = match state.pending_continue.take() {
        Some(pending) if pending.ticket == ticket && state.run_state == RunState::Playing => {
            pending
        }
        other => {
            log::debug!("Ignoring stale continue outcome for {:?}", ticket);
            state.pending_continue = other;
            return false;
        }
    };

    state.push_event(GameEvent::ContinueResolved {
        accepted: outcome.accepted,
        cost: outcome.cost,
    });

    if outcome.accepted {
        state.attempt_index += 1;
        spawn_next(state);
        log::info!("Continue accepted at level {}", pending.level);
    } else {
        end_run(state, now_ms);
    }
    true
}

/// Leave the run (navigate away). Valid while PLAYING, pending or not.
pub fn abandon(state: &mut GameState, now_ms: u64) -> bool {
    if state.run_state != RunState::Playing {
        return false;
    }
    end_run(state, now_ms);
    true
}

fn end_run(state: &mut GameState, now_ms: u64) {
    state.pending_continue = None;
    state.tower.active = None;
    state.run_state = RunState::Ended;

    let duration = now_ms.saturating_sub(state.run_started_at);
    let summary = state
        .metrics
        .finalize(state.level(), duration, state.attempt_index);
    log::info!(
        "Run {} over: level {}, score {}, accuracy {:.1}%",
        state.run_id,
        summary.final_level,
        summary.score,
        summary.average_accuracy
    );
    state.last_summary = Some(summary.clone());
    state.push_event(GameEvent::GameOver(summary));
}

fn restart(state: &mut GameState, now_ms: u64) {
    if state.pending_continue.take().is_some() {
        log::debug!("Restart discards pending continue");
    }
    let removed = state.tower.truncate_to_foundation();
    state.reset_until = now_ms + state.settings.reset_duration_ms(removed);
    state.run_state = RunState::Resetting;
    state.push_event(GameEvent::ResetStarted { removed });
}

fn enter_ready(state: &mut GameState) {
    state.run_state = RunState::Ready;
    state.metrics = GameMetrics::default();
    state.push_event(GameEvent::Ready);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::sim::block::BlockState;

    fn started(seed: u64) -> GameState {
        let mut state = GameState::new(seed, Settings::default());
        tick(&mut state, &TickInput::action(Action::Start, 0));
        state
    }

    /// Park the moving block `offset` units from the top along its axis
    fn aim(state: &mut GameState, offset: f32) {
        let top = state.tower.top().unwrap().position;
        let active = state.tower.active_mut().unwrap();
        let axis = active.axis;
        active.position.x = top.x;
        active.position.z = top.z;
        axis.set_component(&mut active.position, axis.component(top) + offset);
    }

    fn place_at(state: &mut GameState, offset: f32, now_ms: u64) -> bool {
        aim(state, offset);
        handle_action(state, Action::Place, now_ms)
    }

    fn pending_ticket(state: &GameState) -> ContinueTicket {
        state.pending_continue.unwrap().ticket
    }

    #[test]
    fn test_start_lays_foundation_and_spawns() {
        let mut state = started(1);
        assert_eq!(state.run_state, RunState::Playing);
        assert_eq!(state.tower.placed.len(), 1);
        assert_eq!(state.tower.active().unwrap().index, 1);

        let events = state.drain_events();
        assert_eq!(events[0], GameEvent::Started { run_id: 1 });
        assert_eq!(events[1], GameEvent::LevelChanged { level: 0 });
    }

    #[test]
    fn test_tick_moves_active_block() {
        let mut state = started(1);
        let before = state.tower.active().unwrap().position;
        tick(&mut state, &TickInput::idle(16));
        assert_ne!(state.tower.active().unwrap().position, before);
    }

    #[test]
    fn test_scenario_full_overlap() {
        let mut state = started(2);
        assert!(place_at(&mut state, 0.0, 1000));

        let placed = state.drain_events().into_iter().find_map(|e| match e {
            GameEvent::Placed(result) => Some(result),
            _ => None,
        });
        let result = placed.unwrap();
        assert_eq!(result.overlap_ratio, 1.0);
        assert_eq!(result.precision_score, 1000);
        assert!(result.is_perfect);
        assert_eq!(state.level(), 1);
    }

    #[test]
    fn test_scenario_half_overlap() {
        let mut state = started(3);
        assert!(place_at(&mut state, 5.0, 1000));

        let kept = &state.tower.placed[1];
        assert_eq!(kept.dimension.x, 5.0);
        assert_eq!(kept.state, BlockState::Stopped);
        let chopped = state.drain_events().into_iter().find_map(|e| match e {
            GameEvent::Placed(result) => result.chopped_geometry,
            _ => None,
        });
        assert_eq!(chopped.unwrap().dimension.x, 5.0);
        assert_eq!(state.metrics.total_precision_score, 500);
    }

    #[test]
    fn test_scenario_miss_enters_continue_pending() {
        let mut state = started(4);
        place_at(&mut state, 0.0, 1000);
        assert!(place_at(&mut state, 11.0, 2000));

        assert_eq!(state.run_state, RunState::Playing);
        assert!(state.is_continue_pending());
        assert_eq!(state.metrics.consecutive_success_streak, 0);
        assert_eq!(state.tower.missed.as_ref().unwrap().state, BlockState::Missed);
        assert_eq!(state.tower.placed.len(), 2);
        assert!(state.drain_events().contains(&GameEvent::ContinueRequested {
            ticket: ContinueTicket {
                run_id: 1,
                attempt_index: 0
            },
            attempt_index: 0,
            cost: 20,
        }));

        // Suspended: no motion, no placements
        tick(&mut state, &TickInput::idle(3000));
        assert!(!handle_action(&mut state, Action::Place, 4000));
    }

    #[test]
    fn test_scenario_continue_then_recover() {
        let mut state = started(5);
        for i in 1..=3 {
            assert!(place_at(&mut state, 0.0, i * 1000));
        }
        place_at(&mut state, 11.0, 4000);
        let ticket = pending_ticket(&state);
        assert!(resolve_continue(&mut state, ticket, ContinueOutcome::accepted(20), 4500));

        let replacement = state.tower.active().unwrap();
        assert_eq!(replacement.index, 4);
        assert_eq!(replacement.state, BlockState::Active);
        assert_eq!(state.attempt_index, 1);

        assert!(place_at(&mut state, 3.0, 5000));
        assert_eq!(state.level(), 4);
        assert_eq!(state.metrics.max_consecutive_streak, 3);
        assert_eq!(state.metrics.perfect_placements, 3);

        // Next miss is priced at the second step
        place_at(&mut state, 11.0, 6000);
        assert_eq!(state.pending_continue.unwrap().cost, 30);
    }

    #[test]
    fn test_declined_continue_ends_run() {
        let mut state = started(6);
        place_at(&mut state, 0.0, 1000);
        place_at(&mut state, 2.0, 2000);
        place_at(&mut state, -11.0, 3000);
        let ticket = pending_ticket(&state);
        state.drain_events();

        assert!(resolve_continue(&mut state, ticket, ContinueOutcome::declined(20), 3500));
        assert_eq!(state.run_state, RunState::Ended);
        assert_eq!(state.tower.placed.len(), 3);

        let summary = state.last_summary.clone().unwrap();
        assert_eq!(summary.final_level, 2);
        assert_eq!(summary.duration_ms, 3500);
        assert!(state.drain_events().contains(&GameEvent::GameOver(summary)));
    }

    #[test]
    fn test_stale_continue_is_ignored() {
        let mut state = started(7);
        place_at(&mut state, 11.0, 1000);
        let ticket = pending_ticket(&state);

        assert!(handle_action(&mut state, Action::Restart, 2000));
        assert_eq!(state.run_state, RunState::Resetting);
        assert!(!resolve_continue(&mut state, ticket, ContinueOutcome::accepted(20), 2100));
        assert_eq!(state.run_state, RunState::Resetting);
        assert!(state.tower.active().is_none());
    }

    #[test]
    fn test_wrong_ticket_keeps_offer() {
        let mut state = started(8);
        place_at(&mut state, 11.0, 1000);
        let ticket = pending_ticket(&state);
        let bogus = ContinueTicket {
            run_id: ticket.run_id + 1,
            ..ticket
        };

        assert!(!resolve_continue(&mut state, bogus, ContinueOutcome::accepted(20), 1100));
        assert_eq!(state.pending_continue.unwrap().ticket, ticket);
    }

    #[test]
    fn test_debounce_swallows_double_tap() {
        let mut state = started(9);
        aim(&mut state, 0.0);
        assert!(handle_action(&mut state, Action::Place, 1000));
        aim(&mut state, 0.0);
        assert!(!handle_action(&mut state, Action::Place, 1150));
        assert_eq!(state.level(), 1);
        assert!(handle_action(&mut state, Action::Place, 1200));
        assert_eq!(state.level(), 2);
    }

    #[test]
    fn test_restart_returns_to_ready_after_animation() {
        let mut state = started(10);
        for i in 1..=4 {
            place_at(&mut state, 0.0, i * 1000);
        }
        state.drain_events();

        tick(&mut state, &TickInput::action(Action::Restart, 5000));
        assert_eq!(state.run_state, RunState::Resetting);
        assert_eq!(state.tower.placed.len(), 1);
        assert_eq!(state.reset_until, 5000 + 400 + 4 * 20);

        tick(&mut state, &TickInput::idle(5100));
        assert_eq!(state.run_state, RunState::Resetting);
        tick(&mut state, &TickInput::idle(5480));
        assert_eq!(state.run_state, RunState::Ready);
        assert_eq!(state.metrics, GameMetrics::default());
        assert_eq!(
            state.drain_events(),
            vec![GameEvent::ResetStarted { removed: 4 }, GameEvent::Ready]
        );

        // Foundation survives; the next run reuses it
        let foundation = state.tower.placed[0].clone();
        tick(&mut state, &TickInput::action(Action::Start, 6000));
        assert_eq!(state.run_id, 2);
        assert_eq!(state.tower.placed[0].color_offset, foundation.color_offset);
        assert_eq!(state.attempt_index, 0);
    }

    #[test]
    fn test_actions_ignored_while_resetting() {
        let mut state = started(11);
        handle_action(&mut state, Action::Restart, 1000);
        assert!(!handle_action(&mut state, Action::Place, 1300));
        assert!(!handle_action(&mut state, Action::Start, 1350));
        assert_eq!(state.run_state, RunState::Resetting);
    }

    #[test]
    fn test_abandon_while_pending() {
        let mut state = started(12);
        place_at(&mut state, 0.0, 1000);
        place_at(&mut state, 11.0, 2000);
        let ticket = pending_ticket(&state);

        assert!(abandon(&mut state, 2500));
        assert_eq!(state.run_state, RunState::Ended);
        assert_eq!(state.last_summary.as_ref().unwrap().final_level, 1);
        assert!(!resolve_continue(&mut state, ticket, ContinueOutcome::accepted(20), 2600));
        assert_eq!(state.run_state, RunState::Ended);
    }

    #[test]
    fn test_action_after_game_over_restarts() {
        let mut state = started(13);
        place_at(&mut state, 11.0, 1000);
        abandon(&mut state, 1100);
        assert!(handle_action(&mut state, Action::Place, 2000));
        assert_eq!(state.run_state, RunState::Resetting);
    }

    #[test]
    fn test_broken_tower_rolls_back() {
        let mut state = started(14);
        place_at(&mut state, 0.0, 1000);
        state.tower.placed[1].index = 9;
        aim(&mut state, 0.0);

        assert!(!handle_action(&mut state, Action::Place, 2000));
        assert_eq!(state.tower.placed.len(), 2);
        assert_eq!(state.tower.active().unwrap().index, 2);
        assert_eq!(state.metrics.block_areas.len(), 1);
        assert!(matches!(state.drain_events().last(), Some(GameEvent::Fault { .. })));
    }

    #[test]
    fn test_determinism() {
        let mut a = started(99999);
        let mut b = started(99999);
        for frame in 1..300u64 {
            let input = if frame % 50 == 0 {
                TickInput::action(Action::Place, frame * 16)
            } else {
                TickInput::idle(frame * 16)
            };
            tick(&mut a, &input);
            tick(&mut b, &input);
        }
        assert_eq!(a.level(), b.level());
        assert_eq!(a.snapshot(), b.snapshot());
        assert_eq!(a.metrics, b.metrics);
    }
}
