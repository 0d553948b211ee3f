use std::fmt;

use serde::{Deserialize, Serialize};

use super::Speaker;
use crate::error::CorpusError;

/// Raw labels that normalize to [`TurnTransitionType::Ambiguous`].
pub const AMBIGUOUS_ALIASES: [&str; 4] = ["L", "L-SIM", "N", "N-SIM"];

/// Closed taxonomy of turn-taking transition labels.
///
/// `HoldTurn` is defined by the annotation guidelines but never appears in
/// the turn files: holds are derivable from the time-aligned transcriptions
/// and were not manually annotated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TurnTransitionType {
    // Regular transitions
    HoldTurn,
    SmoothSwitch,
    Backchannel,
    PausedInterruption,

    // Overlapped transitions
    OverlappedSwitch,
    OverlappedBackchannel,
    OverlappedInterruption,
    OverlappedButtIn,

    // Special transitions
    FirstTurn,
    BackchannelContinuation,
    OverlappedBackchannelContinuation,
    SimultaneousStart,

    Ambiguous,
}

impl TurnTransitionType {
    /// The label code used in the turn files.
    pub fn code(self) -> &'static str {
        match self {
            TurnTransitionType::HoldTurn => "H",
            TurnTransitionType::SmoothSwitch => "S",
            TurnTransitionType::Backchannel => "BC",
            TurnTransitionType::PausedInterruption => "PI",
            TurnTransitionType::OverlappedSwitch => "O",
            TurnTransitionType::OverlappedBackchannel => "BC_O",
            TurnTransitionType::OverlappedInterruption => "I",
            TurnTransitionType::OverlappedButtIn => "BI",
            TurnTransitionType::FirstTurn => "X1",
            TurnTransitionType::BackchannelContinuation => "X2",
            TurnTransitionType::OverlappedBackchannelContinuation => "X2_O",
            TurnTransitionType::SimultaneousStart => "X3",
            TurnTransitionType::Ambiguous => "A",
        }
    }

    /// Parse a raw label, normalizing the documented alias set
    /// {L, L-SIM, N, N-SIM} to `Ambiguous`. Anything outside the taxonomy
    /// is a hard error.
    pub fn parse(label: &str) -> Result<Self, CorpusError> {
        let label = label.trim().to_uppercase();
        let label = if AMBIGUOUS_ALIASES.contains(&label.as_str()) {
            "A"
        } else {
            label.as_str()
        };
        match label {
            "H" => Ok(TurnTransitionType::HoldTurn),
            "S" => Ok(TurnTransitionType::SmoothSwitch),
            "BC" => Ok(TurnTransitionType::Backchannel),
            "PI" => Ok(TurnTransitionType::PausedInterruption),
            "O" => Ok(TurnTransitionType::OverlappedSwitch),
            "BC_O" => Ok(TurnTransitionType::OverlappedBackchannel),
            "I" => Ok(TurnTransitionType::OverlappedInterruption),
            "BI" => Ok(TurnTransitionType::OverlappedButtIn),
            "X1" => Ok(TurnTransitionType::FirstTurn),
            "X2" => Ok(TurnTransitionType::BackchannelContinuation),
            "X2_O" => Ok(TurnTransitionType::OverlappedBackchannelContinuation),
            "X3" => Ok(TurnTransitionType::SimultaneousStart),
            "A" => Ok(TurnTransitionType::Ambiguous),
            other => Err(CorpusError::UnknownTransitionLabel(other.to_string())),
        }
    }
}

impl fmt::Display for TurnTransitionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Deterministic turn identity from its declaring coordinates. Transitions
/// reference turns through this id, decoupling the two parse passes over
/// the turn files.
pub fn turn_id(session_id: u32, task_id: u32, speaker: Speaker, start: f64, end: f64) -> String {
    format!(
        "turn_{:02}_{:02}_{}_{:.2}_{:.2}",
        session_id, task_id, speaker, start, end
    )
}

/// A maximal sequence of one speaker's IPUs, declared externally by a
/// `[start, end]` interval in the turn file. Member IPUs are referenced by
/// id; the turn does not own them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub turn_id: String,
    pub session_id: u32,
    pub task_id: u32,
    pub speaker: Speaker,
    pub start: f64,
    pub end: f64,
    pub ipu_ids: Vec<String>,
}

impl Turn {
    pub fn new(
        session_id: u32,
        task_id: u32,
        speaker: Speaker,
        start: f64,
        end: f64,
        ipu_ids: Vec<String>,
    ) -> Self {
        Self {
            turn_id: turn_id(session_id, task_id, speaker, start, end),
            session_id,
            task_id,
            speaker,
            start,
            end,
            ipu_ids,
        }
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Directed edge between two turns of opposite speakers, carrying the
/// annotated transition label. `turn_id_from` is `None` for first turns
/// (X1) and simultaneous starts (X3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnTransition {
    pub label: String,
    pub label_type: TurnTransitionType,
    pub turn_id_from: Option<String>,
    pub turn_id_to: String,
    /// Destination's first IPU start minus source's last IPU end; 0 when
    /// there is no source turn.
    pub transition_duration: f64,
    /// Destination speech began before the source speech ended.
    pub overlapped_transition: bool,
}

impl TurnTransition {
    pub fn new(
        label: impl Into<String>,
        label_type: TurnTransitionType,
        turn_id_from: Option<String>,
        turn_id_to: String,
        transition_duration: f64,
    ) -> Self {
        Self {
            label: label.into(),
            label_type,
            turn_id_from,
            turn_id_to,
            transition_duration,
            overlapped_transition: transition_duration < 0.0,
        }
    }
}
