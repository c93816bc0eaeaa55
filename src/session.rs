//! Host glue around one engine
//!
//! Charges the entry fee, turns continue requests into offers the player can
//! accept or decline, and records finished runs. Recording is fire-and-forget:
//! failures are logged and never hold up game over.

use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::continues::{ContinueOutcome, Economy, charge, settle_continue};
use crate::error::SessionError;
use crate::highscores::Leaderboard;
use crate::sim::{
    Action, ContinueTicket, GameEvent, GameState, GameSummary, RunState, TickInput, abandon,
    handle_action, resolve_continue, tick,
};

/// What gets persisted for a finished run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub run_id: u32,
    pub seed: u64,
    pub level: u32,
    pub score: u64,
    pub duration_ms: u64,
    pub started_at: u64,
    pub summary: GameSummary,
}

/// Destination for finished runs
pub trait SessionRecorder {
    fn record(&mut self, record: &SessionRecord) -> Result<(), SessionError>;
}

/// Keeps records in memory
impl SessionRecorder for Vec<SessionRecord> {
    fn record(&mut self, record: &SessionRecord) -> Result<(), SessionError> {
        self.push(record.clone());
        Ok(())
    }
}

/// Writes one JSON object per line
pub struct JsonLinesRecorder<W: Write> {
    writer: W,
}

impl<W: Write> JsonLinesRecorder<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> SessionRecorder for JsonLinesRecorder<W> {
    fn record(&mut self, record: &SessionRecord) -> Result<(), SessionError> {
        serde_json::to_writer(&mut self.writer, record)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }
}

/// A continue the player may buy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContinueOffer {
    pub ticket: ContinueTicket,
    pub attempt_index: u32,
    pub cost: u64,
    /// Balance covered the cost when the offer was made
    pub affordable: bool,
}

/// One engine plus its economy, recorder and leaderboard
pub struct RunSession<E: Economy, R: SessionRecorder> {
    pub game: GameState,
    pub leaderboard: Leaderboard,
    economy: E,
    recorder: R,
    offer: Option<ContinueOffer>,
    outbox: Vec<GameEvent>,
}

impl<E: Economy, R: SessionRecorder> RunSession<E, R> {
    pub fn new(game: GameState, economy: E, recorder: R) -> Self {
        Self {
            game,
            leaderboard: Leaderboard::new(),
            economy,
            recorder,
            offer: None,
            outbox: Vec::new(),
        }
    }

    pub fn economy(&self) -> &E {
        &self.economy
    }

    pub fn economy_mut(&mut self) -> &mut E {
        &mut self.economy
    }

    pub fn recorder(&self) -> &R {
        &self.recorder
    }

    /// The continue currently offered, if any
    pub fn offer(&self) -> Option<&ContinueOffer> {
        self.offer.as_ref()
    }

    /// Pay the entry fee and start a run
    pub fn begin(&mut self, now_ms: u64) -> Result<(), SessionError> {
        if self.game.run_state != RunState::Ready || !self.game.accepts_action_at(now_ms) {
            return Err(SessionError::AlreadyRunning);
        }
        charge(&mut self.economy, self.game.settings.entry_fee)?;
        handle_action(&mut self.game, Action::Start, now_ms);
        self.collect();
        Ok(())
    }

    /// Advance one display frame. Returns events since the last call.
    ///
    /// Actions while READY are dropped; runs start through `begin`.
    pub fn frame(&mut self, input: &TickInput) -> Vec<GameEvent> {
        if input.action.is_some() && self.game.run_state == RunState::Ready {
            log::debug!("Ignoring action in READY; start runs with begin()");
            tick(&mut self.game, &TickInput::idle(input.now_ms));
        } else {
            tick(&mut self.game, input);
        }
        self.collect();
        self.take_events()
    }

    /// Events collected outside `frame` (continue resolution, abandon)
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.outbox)
    }

    /// Try to buy the offered continue at the price it was offered at
    pub fn accept_continue(&mut self, now_ms: u64) -> Result<ContinueOutcome, SessionError> {
        let offer = self.offer.take().ok_or(SessionError::NoContinueOffered)?;
        let outcome = settle_continue(offer.attempt_index, offer.cost, &mut self.economy);
        resolve_continue(&mut self.game, offer.ticket, outcome, now_ms);
        self.collect();
        Ok(outcome)
    }

    /// Turn down the offered continue; the run ends
    pub fn decline_continue(&mut self, now_ms: u64) -> Result<(), SessionError> {
        let offer = self.offer.take().ok_or(SessionError::NoContinueOffered)?;
        resolve_continue(
            &mut self.game,
            offer.ticket,
            ContinueOutcome::declined(offer.cost),
            now_ms,
        );
        self.collect();
        Ok(())
    }

    /// Navigate away mid-run
    pub fn abandon(&mut self, now_ms: u64) -> bool {
        self.offer = None;
        let ended = abandon(&mut self.game, now_ms);
        self.collect();
        ended
    }

    fn collect(&mut self) {
        for event in self.game.drain_events() {
            match &event {
                GameEvent::ContinueRequested {
                    ticket,
                    attempt_index,
                    cost,
                } => {
                    self.offer = Some(ContinueOffer {
                        ticket: *ticket,
                        attempt_index: *attempt_index,
                        cost: *cost,
                        affordable: self.economy.balance() >= *cost,
                    });
                }
                GameEvent::GameOver(summary) => {
                    self.offer = None;
                    self.record(summary);
                }
                GameEvent::ResetStarted { .. } => self.offer = None,
                _ => {}
            }
            self.outbox.push(event);
        }
    }

    fn record(&mut self, summary: &GameSummary) {
        let record = SessionRecord {
            run_id: self.game.run_id,
            seed: self.game.seed,
            level: summary.final_level,
            score: summary.score,
            duration_ms: summary.duration_ms,
            started_at: self.game.run_started_at,
            summary: summary.clone(),
        };
        if let Err(err) = self.recorder.record(&record) {
            log::warn!("Failed to record run {}: {}", record.run_id, err);
        }

        let finished_at = self.game.run_started_at + summary.duration_ms;
        if let Some(rank) = self.leaderboard.add_run(summary, finished_at) {
            log::info!("Run {} placed #{} on the leaderboard", record.run_id, rank);
        }
    }
}
