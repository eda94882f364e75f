//! Timeline data
//!
//! The stages, bids and log lines replayed by the demo player, and the
//! computation of when each of them becomes visible during a run.
use serde::{Deserialize, Serialize};
use std::{collections::BTreeSet, fmt, str::FromStr, time::Duration};
use thiserror::Error;

/// Price in cents
pub type Amount = u64;
pub type StageId = String;
pub type StageIdRef<'a> = &'a str;

/// Stage whose start triggers the bid reveals
pub const BIDDING_STAGE_ID: StageIdRef<'static> = "bids";
/// Stage whose start triggers the log reveals
pub const EXECUTION_STAGE_ID: StageIdRef<'static> = "execute";

pub const BID_REVEAL_INTERVAL: Duration = Duration::from_millis(800);
pub const LOG_REVEAL_INTERVAL: Duration = Duration::from_millis(1000);

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stage {
    pub id: StageId,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub duration_ms: u64,
}

impl Stage {
    pub fn new(id: &str, name: &str, description: &str, icon: &str, duration_ms: u64) -> Self {
        Self {
            id: id.to_owned(),
            name: name.to_owned(),
            description: description.to_owned(),
            icon: icon.to_owned(),
            duration_ms,
        }
    }

    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bid {
    pub id: u32,
    pub agent: String,
    /// Sent as a decimal number of dollars
    #[serde(serialize_with = "serialize_decimal")]
    pub price: Amount,
    pub rating: f32,
    pub response_time: String,
}

impl Bid {
    pub fn new(id: u32, agent: &str, price: Amount, rating: f32, response_time: &str) -> Self {
        Self {
            id,
            agent: agent.to_owned(),
            price,
            rating,
            response_time: response_time.to_owned(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: String,
    pub action: String,
    pub details: String,
}

impl LogEntry {
    pub fn new(timestamp: &str, action: &str, details: &str) -> Self {
        Self {
            timestamp: timestamp.to_owned(),
            action: action.to_owned(),
            details: details.to_owned(),
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScenarioId {
    #[default]
    Legal,
    Sales,
    Data,
}

impl ScenarioId {
    pub const ALL: [ScenarioId; 3] = [ScenarioId::Legal, ScenarioId::Sales, ScenarioId::Data];

    pub fn as_str(self) -> &'static str {
        match self {
            ScenarioId::Legal => "legal",
            ScenarioId::Sales => "sales",
            ScenarioId::Data => "data",
        }
    }
}

impl fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown scenario: {0}")]
pub struct ScenarioParseError(pub String);

impl FromStr for ScenarioId {
    type Err = ScenarioParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ScenarioId::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| ScenarioParseError(s.to_owned()))
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Complexity {
    Low,
    Medium,
    High,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    pub id: ScenarioId,
    pub name: &'static str,
    pub description: &'static str,
    pub estimated_duration: &'static str,
    pub complexity: Complexity,
}

pub fn scenarios() -> [Scenario; 3] {
    [
        Scenario {
            id: ScenarioId::Legal,
            name: "Legal Review",
            description: "Contract analysis and legal compliance check",
            estimated_duration: "2-3 minutes",
            complexity: Complexity::Medium,
        },
        Scenario {
            id: ScenarioId::Sales,
            name: "Sales Brief",
            description: "Market research and competitive analysis",
            estimated_duration: "1-2 minutes",
            complexity: Complexity::Low,
        },
        Scenario {
            id: ScenarioId::Data,
            name: "Data Cleaning",
            description: "Dataset preprocessing and validation",
            estimated_duration: "3-4 minutes",
            complexity: Complexity::High,
        },
    ]
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimelineError {
    #[error("timeline has no stages")]
    NoStages,
    #[error("duplicate stage id: {0}")]
    DuplicateStage(StageId),
}

/// What a cue does when its time comes
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CueAction {
    EnterStage(usize),
    RevealBid(usize),
    RevealLog(usize),
    Finish,
}

/// A single scheduled transition, at an offset from the run start
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Cue {
    pub at: Duration,
    pub action: CueAction,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Timeline {
    stages: Vec<Stage>,
    bids: Vec<Bid>,
    log: Vec<LogEntry>,
}

impl Timeline {
    #[cfg(test)]
    pub fn new(stages: Vec<Stage>, bids: Vec<Bid>, log: Vec<LogEntry>) -> Result<Self, TimelineError> {
        let timeline = Self { stages, bids, log };
        timeline.validate()?;
        Ok(timeline)
    }

    /// At least one stage, and stage ids must be unique
    pub fn validate(&self) -> Result<(), TimelineError> {
        if self.stages.is_empty() {
            return Err(TimelineError::NoStages);
        }

        let mut seen = BTreeSet::new();
        for stage in &self.stages {
            if !seen.insert(stage.id.as_str()) {
                return Err(TimelineError::DuplicateStage(stage.id.clone()));
            }
        }

        Ok(())
    }

    /// The transaction shown on the demo page
    pub fn canned() -> Self {
        Self {
            stages: vec![
                Stage::new("discover", "Discovery", "Publishing task requirements", "🔍", 2000),
                Stage::new("bids", "Bidding", "Receiving agent proposals", "💰", 3000),
                Stage::new("escrow", "Escrow", "Securing payment", "🔒", 1500),
                Stage::new("execute", "Execution", "Processing the task", "⚡", 4000),
                Stage::new("complete", "Completion", "Verifying and releasing payment", "✅", 1500),
            ],
            bids: vec![
                Bid::new(1, "legal-bot-v1", 4500, 4.8, "2s"),
                Bid::new(2, "contract-ai-pro", 5200, 4.9, "1s"),
                Bid::new(3, "law-gpt-legal", 3800, 4.6, "3s"),
            ],
            log: vec![
                LogEntry::new("10:30:15", "Task published", "Legal review requested for contract ABC-123"),
                LogEntry::new("10:30:16", "Agent discovered", "Found 3 qualified agents"),
                LogEntry::new("10:30:18", "Bids received", "3 competitive bids ranging $38-$52"),
                LogEntry::new("10:30:20", "Agent selected", "contract-ai-pro selected (best rating)"),
                LogEntry::new("10:30:21", "Escrow created", "$52 held securely"),
                LogEntry::new("10:32:45", "Task completed", "Review finished, results verified"),
                LogEntry::new("10:32:46", "Payment released", "$52 transferred to contract-ai-pro"),
            ],
        }
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn bids(&self) -> &[Bid] {
        &self.bids
    }

    pub fn log(&self) -> &[LogEntry] {
        &self.log
    }

    /// Offset from the run start at which stage `index` becomes current
    pub fn stage_start(&self, index: usize) -> Duration {
        self.stages.iter().take(index).map(Stage::duration).sum()
    }

    pub fn total_duration(&self) -> Duration {
        self.stage_start(self.stages.len())
    }

    /// The bid that wins the auction: best rating, first one on ties
    pub fn selected_bid(&self) -> Option<&Bid> {
        self.bids.iter().fold(None, |best: Option<&Bid>, bid| match best {
            Some(b) if b.rating >= bid.rating => Some(b),
            _ => Some(bid),
        })
    }

    /// Every transition of a run, ordered by offset
    ///
    /// Offsets are absolute from the run start, so the order does not depend
    /// on how the cues get registered. Cues sharing an offset keep the order
    /// they are generated in: a stage entry first, then the reveals it
    /// starts, the finish marker last.
    pub fn schedule(&self) -> Vec<Cue> {
        let mut cues = Vec::with_capacity(self.stages.len() + self.bids.len() + self.log.len() + 1);
        let mut offset = Duration::ZERO;

        for (i, stage) in self.stages.iter().enumerate() {
            cues.push(Cue {
                at: offset,
                action: CueAction::EnterStage(i),
            });

            if stage.id == BIDDING_STAGE_ID {
                cues.extend(reveals(offset, BID_REVEAL_INTERVAL, self.bids.len(), CueAction::RevealBid));
            }
            if stage.id == EXECUTION_STAGE_ID {
                cues.extend(reveals(offset, LOG_REVEAL_INTERVAL, self.log.len(), CueAction::RevealLog));
            }

            offset += stage.duration();
        }

        cues.push(Cue {
            at: offset,
            action: CueAction::Finish,
        });

        // stable, so ties keep generation order
        cues.sort_by_key(|cue| cue.at);
        cues
    }
}

impl Default for Timeline {
    fn default() -> Self {
        Self::canned()
    }
}

fn reveals(
    start: Duration,
    interval: Duration,
    count: usize,
    action: fn(usize) -> CueAction,
) -> impl Iterator<Item = Cue> {
    (0..count).map(move |k| Cue {
        at: start + interval * u32::try_from(k).unwrap_or(u32::MAX),
        action: action(k),
    })
}

fn serialize_decimal<S: serde::Serializer>(amount: &Amount, s: S) -> Result<S::Ok, S::Error> {
    // cents are far below 2^53, so this is exact to the cent
    s.serialize_f64(*amount as f64 / 100.0)
}

pub fn format_amount(amount: Amount) -> String {
    format!("${}.{:02}", amount / 100, amount % 100)
}
