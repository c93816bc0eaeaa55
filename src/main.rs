//! Tower Block headless driver
//!
//! Plays autopilot runs against an in-memory wallet and prints each finished
//! run as a JSON line. Usage: `tower-block [seed] [skill 0..1] [coins]`

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;

    use tower_block::sim::{Action, GameState, RunState, TickInput};
    use tower_block::{Economy, JsonLinesRecorder, RunSession, Settings, Wallet};

    /// One display frame at 60 Hz
    const FRAME_MS: u64 = 16;
    /// Give up on a run that never ends
    const MAX_FRAMES: u64 = 500_000;

    env_logger::init();

    let mut args = std::env::args().skip(1);
    let seed: u64 = args.next().and_then(|s| s.parse().ok()).unwrap_or(12345);
    let skill: f32 = args
        .next()
        .and_then(|s| s.parse().ok())
        .unwrap_or(0.8f32)
        .clamp(0.0, 1.0);
    let coins: u64 = args.next().and_then(|s| s.parse().ok()).unwrap_or(100);

    let settings = Settings::load("tower-block.json");
    log::info!("Tower Block (native) seed={} skill={:.2} coins={}", seed, skill, coins);

    let game = GameState::new(seed, settings);
    let recorder = JsonLinesRecorder::new(std::io::stdout());
    let mut session = RunSession::new(game, Wallet::new(coins), recorder);
    let mut hand = Pcg32::seed_from_u64(seed ^ 0x5eed);

    let mut now = 0;
    if let Err(err) = session.begin(now) {
        log::error!("Could not start: {}", err);
        return;
    }

    // Distance from the target at which the autopilot commits
    let patience = |hand: &mut Pcg32| hand.random_range(0.0..(1.0 - skill) * 6.0 + 0.05);
    let mut commit_gap = patience(&mut hand);
    let mut last_offset: Option<f32> = None;

    for _ in 0..MAX_FRAMES {
        now += FRAME_MS;

        if let Some(offer) = session.offer().copied() {
            if offer.affordable {
                if let Err(err) = session.accept_continue(now) {
                    log::warn!("Could not buy continue: {}", err);
                }
            } else if let Err(err) = session.decline_continue(now) {
                log::warn!("Could not decline continue: {}", err);
            }
            last_offset = None;
            continue;
        }
        if session.game.run_state == RunState::Ended {
            break;
        }

        let offset = match (session.game.tower.active(), session.game.tower.top()) {
            (Some(active), Some(top)) => {
                Some(active.axis.component(active.position) - active.axis.component(top.position))
            }
            _ => None,
        };
        let crossed = matches!(
            (last_offset, offset),
            (Some(a), Some(b)) if a.signum() != b.signum()
        );
        let place = offset.is_some_and(|o| o.abs() <= commit_gap || crossed);

        let input = if place {
            TickInput::action(Action::Place, now)
        } else {
            TickInput::idle(now)
        };
        let level_before = session.game.level();
        session.frame(&input);
        if session.game.level() != level_before {
            commit_gap = patience(&mut hand);
            last_offset = None;
        } else {
            last_offset = offset;
        }
    }

    if session.game.run_state != RunState::Ended {
        log::warn!("Run did not finish within {} frames, abandoning", MAX_FRAMES);
        session.abandon(now);
    }
    log::info!(
        "Finished at level {} with {} coins left",
        session.game.level(),
        session.economy().balance()
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Hosts embed the library directly on the web
}
