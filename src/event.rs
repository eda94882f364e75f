use crate::timeline::{Bid, LogEntry, ScenarioId};
use serde::Serialize;

/// Identifies a single run of the player; never reused
pub type RunId = u64;

/// Everything the player does, in the order it did it
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    ScenarioSelected { scenario: ScenarioId },
    RunStarted { run: RunId },
    StageEntered { run: RunId, stage: usize },
    BidRevealed { run: RunId, bid: Bid },
    LogRevealed { run: RunId, entry: LogEntry },
    RunFinished { run: RunId },
    Reset,
}

impl Event {
    #[cfg(test)]
    pub fn run(&self) -> Option<RunId> {
        match self {
            Event::RunStarted { run }
            | Event::StageEntered { run, .. }
            | Event::BidRevealed { run, .. }
            | Event::LogRevealed { run, .. }
            | Event::RunFinished { run } => Some(*run),
            Event::ScenarioSelected { .. } | Event::Reset => None,
        }
    }
}
