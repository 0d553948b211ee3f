use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CorpusError;

/// Which of the two independently recorded sub-corpora a session belongs
/// to. The batches use different file naming and temporal scoping: batch 1
/// has one file per session covering all tasks, batch 2 has one file per
/// task with self-relative timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Batch {
    One,
    Two,
}

impl Batch {
    pub fn from_number(n: u32) -> Result<Self, CorpusError> {
        match n {
            1 => Ok(Batch::One),
            2 => Ok(Batch::Two),
            other => Err(CorpusError::UnknownBatch(other)),
        }
    }

    pub fn number(self) -> u32 {
        match self {
            Batch::One => 1,
            Batch::Two => 2,
        }
    }
}

impl fmt::Display for Batch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

/// One of the two dialogue participants in a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Speaker {
    A,
    B,
}

impl Speaker {
    pub const BOTH: [Speaker; 2] = [Speaker::A, Speaker::B];

    pub fn as_str(self) -> &'static str {
        match self {
            Speaker::A => "A",
            Speaker::B => "B",
        }
    }

    /// The other participant in the dialogue.
    pub fn interlocutor(self) -> Self {
        match self {
            Speaker::A => Speaker::B,
            Speaker::B => Speaker::A,
        }
    }

    pub fn parse(s: &str) -> Result<Self, CorpusError> {
        match s.trim() {
            "A" => Ok(Speaker::A),
            "B" => Ok(Speaker::B),
            other => Err(CorpusError::UnknownSpeaker(other.to_string())),
        }
    }
}

impl fmt::Display for Speaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static dev / held-out partition for one batch. Built once, never
/// mutated; used only to split tasks into development and evaluation
/// subsets.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub batch: Batch,
    held_out_tasks: HashSet<(u32, u32)>,
    held_out_sessions: HashSet<u32>,
}

impl BatchConfig {
    pub fn for_batch(batch: Batch) -> Self {
        match batch {
            Batch::One => Self::batch1(),
            Batch::Two => Self::batch2(),
        }
    }

    /// Batch 1: tasks 13 and 14 of every session are held out, plus
    /// sessions 7, 12 and 13 entirely.
    pub fn batch1() -> Self {
        Self {
            batch: Batch::One,
            held_out_tasks: (1..=14).flat_map(|s| [(s, 13), (s, 14)]).collect(),
            held_out_sessions: [7, 12, 13].into_iter().collect(),
        }
    }

    /// Batch 2: tasks 13 and 14 of every session are held out, plus
    /// sessions 21, 22 and 28 entirely.
    pub fn batch2() -> Self {
        Self {
            batch: Batch::Two,
            held_out_tasks: (15..=28).flat_map(|s| [(s, 13), (s, 14)]).collect(),
            held_out_sessions: [21, 22, 28].into_iter().collect(),
        }
    }

    pub fn is_held_out_task(&self, session_id: u32, task_id: u32) -> bool {
        self.held_out_tasks.contains(&(session_id, task_id))
    }

    pub fn is_held_out_session(&self, session_id: u32) -> bool {
        self.held_out_sessions.contains(&session_id)
    }
}
