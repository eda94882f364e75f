//! Timeline demo player
//!
//! Replays a [`Timeline`] on the tokio timer: stages become current one after
//! another, bids and log lines get revealed while their stage runs.
//!
//! Each run is driven by a single task walking the precomputed schedule.
//! Every mutation the task makes is checked against the run generation
//! under the state lock, so anything left over from a reset or superseded
//! run can never touch the state, even if aborting the task races with it.
use super::TaskHandle;
use crate::{
    event::{Event, RunId},
    event_log,
    timeline::{Bid, Cue, CueAction, LogEntry, ScenarioId, Timeline},
};
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::{Arc, Weak};
use tokio::time::Instant;
use tracing::{debug, info, warn};

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerState {
    /// Index into the timeline stages, `None` while idle
    pub current_stage: Option<usize>,
    pub is_running: bool,
    pub revealed_bids: Vec<Bid>,
    pub revealed_log: Vec<LogEntry>,
    pub selected_scenario: ScenarioId,
    /// The run the state belongs to, if any
    pub run: Option<RunId>,
}

impl PlayerState {
    fn idle(selected_scenario: ScenarioId) -> Self {
        Self {
            selected_scenario,
            ..Default::default()
        }
    }
}

struct Inner {
    state: PlayerState,
    generation: RunId,
    driver: Option<TaskHandle>,
}

impl Inner {
    /// Invalidate whatever the current run has still scheduled
    fn cancel(&mut self) {
        self.generation += 1;
        if let Some(mut driver) = self.driver.take() {
            driver.abort();
        }
    }
}

struct Shared {
    timeline: Timeline,
    event_writer: event_log::SharedWriter,
    inner: Mutex<Inner>,
}

impl Shared {
    fn record(&self, event: Event) {
        if let Err(e) = self.event_writer.write(&[event]) {
            warn!(%e, "failed to record player event");
        }
    }

    /// Apply a cue of run `run`; returns `false` if the run is gone
    fn apply(&self, run: RunId, action: CueAction) -> bool {
        let mut inner = self.inner.lock();
        if inner.generation != run {
            debug!(run, current = inner.generation, ?action, "dropping stale cue");
            return false;
        }

        let event = match action {
            CueAction::EnterStage(stage) => {
                inner.state.current_stage = Some(stage);
                debug!(run, stage, name = %self.timeline.stages()[stage].name, "stage entered");
                Event::StageEntered { run, stage }
            }
            CueAction::RevealBid(i) => {
                let bid = self.timeline.bids()[i].clone();
                debug!(run, agent = %bid.agent, "bid revealed");
                inner.state.revealed_bids.push(bid.clone());
                Event::BidRevealed { run, bid }
            }
            CueAction::RevealLog(i) => {
                let entry = self.timeline.log()[i].clone();
                debug!(run, action = %entry.action, "log revealed");
                inner.state.revealed_log.push(entry.clone());
                Event::LogRevealed { run, entry }
            }
            CueAction::Finish => {
                inner.state.is_running = false;
                info!(run, "demo run finished");
                Event::RunFinished { run }
            }
        };

        self.record(event);
        true
    }
}

async fn drive(shared: Weak<Shared>, run: RunId, started_at: Instant, cues: Vec<Cue>) {
    for cue in cues {
        tokio::time::sleep_until(started_at + cue.at).await;

        let Some(player) = shared.upgrade() else {
            return;
        };
        if !player.apply(run, cue.action) {
            return;
        }
    }
}

/// The demo player
///
/// Dropping it cancels everything the current run still has scheduled.
pub struct DemoPlayer {
    shared: Arc<Shared>,
}

pub type SharedDemoPlayer = Arc<DemoPlayer>;

impl DemoPlayer {
    pub fn new(timeline: Timeline, event_writer: event_log::SharedWriter) -> Self {
        Self {
            shared: Arc::new(Shared {
                timeline,
                event_writer,
                inner: Mutex::new(Inner {
                    state: PlayerState::default(),
                    generation: 0,
                    driver: None,
                }),
            }),
        }
    }

    pub fn new_shared(timeline: Timeline, event_writer: event_log::SharedWriter) -> SharedDemoPlayer {
        Arc::new(Self::new(timeline, event_writer))
    }

    pub fn timeline(&self) -> &Timeline {
        &self.shared.timeline
    }

    pub fn state(&self) -> PlayerState {
        self.shared.inner.lock().state.clone()
    }

    /// Only changes what is highlighted; the timeline is the same for all
    pub fn select_scenario(&self, scenario: ScenarioId) {
        let mut inner = self.shared.inner.lock();
        inner.state.selected_scenario = scenario;
        debug!(%scenario, "scenario selected");
        self.shared.record(Event::ScenarioSelected { scenario });
    }

    /// Start a new run, restarting if one is in progress
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&self) -> RunId {
        let mut inner = self.shared.inner.lock();
        inner.cancel();

        let run = inner.generation;
        let selected = inner.state.selected_scenario;
        inner.state = PlayerState {
            is_running: true,
            run: Some(run),
            ..PlayerState::idle(selected)
        };
        self.shared.record(Event::RunStarted { run });

        let cues = self.shared.timeline.schedule();
        info!(
            run,
            cues = cues.len(),
            total_ms = u64::try_from(self.shared.timeline.total_duration().as_millis())
                .unwrap_or(u64::MAX),
            "demo run started"
        );
        inner.driver = Some(TaskHandle::spawn(drive(
            Arc::downgrade(&self.shared),
            run,
            Instant::now(),
            cues,
        )));

        run
    }

    /// Back to idle, dropping anything still scheduled
    pub fn reset(&self) {
        let mut inner = self.shared.inner.lock();
        inner.cancel();
        let selected = inner.state.selected_scenario;
        inner.state = PlayerState::idle(selected);
        debug!("demo reset");
        self.shared.record(Event::Reset);
    }
}

impl Drop for DemoPlayer {
    fn drop(&mut self) {
        self.shared.inner.lock().cancel();
    }
}
