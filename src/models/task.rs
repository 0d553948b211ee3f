use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::{Batch, Ipu, Speaker, Turn, TurnTransition};

/// One game round: metadata from the tasks file plus the discourse
/// structure reconstructed for its time interval. Owns its IPUs, turns and
/// transitions; nothing is mutated after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub task_id: u32,
    pub session_id: u32,
    pub images: Vec<String>,
    pub describer: Speaker,
    pub target: String,
    pub score: f64,
    pub time_used: f64,
    /// Task start: the declared interval start for batch 1, otherwise the
    /// first IPU's start (batch 2 files are self-relative and start at 0).
    pub start: f64,
    pub turn_transitions: Vec<TurnTransition>,
    pub turns: Vec<Turn>,
    pub ipus: Vec<Ipu>,
    /// Per-speaker audio file paths, when audio was fetched.
    pub wavs: HashMap<Speaker, PathBuf>,
    pub text: String,
}

impl Task {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        task_id: u32,
        session_id: u32,
        images: Vec<String>,
        describer: Speaker,
        target: String,
        score: f64,
        time_used: f64,
        declared_start: Option<f64>,
        turn_transitions: Vec<TurnTransition>,
        turns: Vec<Turn>,
        mut ipus: Vec<Ipu>,
        wavs: HashMap<Speaker, PathBuf>,
    ) -> Self {
        ipus.sort_by(|a, b| a.start.total_cmp(&b.start));
        let start = declared_start
            .or_else(|| ipus.first().map(|ipu| ipu.start))
            .unwrap_or(0.0);
        let text = build_text(&ipus);
        Self {
            task_id,
            session_id,
            images,
            describer,
            target,
            score,
            time_used,
            start,
            turn_transitions,
            turns,
            ipus,
            wavs,
            text,
        }
    }

    /// Declared completion time, which may differ from the annotated
    /// interval length.
    pub fn duration(&self) -> f64 {
        self.time_used
    }

    pub fn ipu(&self, ipu_id: &str) -> Option<&Ipu> {
        self.ipus.iter().find(|ipu| ipu.ipu_id == ipu_id)
    }

    pub fn turn(&self, turn_id: &str) -> Option<&Turn> {
        self.turns.iter().find(|turn| turn.turn_id == turn_id)
    }

    /// Space-joined text of a turn's member IPUs.
    pub fn turn_text(&self, turn: &Turn) -> String {
        turn.ipu_ids
            .iter()
            .filter_map(|id| self.ipu(id))
            .map(|ipu| ipu.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn build_text(ipus: &[Ipu]) -> String {
    if ipus.is_empty() {
        return String::new();
    }
    let lines: Vec<String> = ipus.iter().map(|ipu| ipu.to_string()).collect();
    format!("\n\t{}", lines.join("\n\t"))
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[Task {:02} ({}) {:.2}:{:.2} ] Turns {} IPUs {}",
            self.task_id,
            self.describer,
            self.start,
            self.start + self.duration(),
            self.turns.len(),
            self.ipus.len()
        )?;
        for turn in &self.turns {
            write!(
                f,
                "\n\t[Turn ({}) {:.2}:{:.2} ] \t {}",
                turn.speaker,
                turn.start,
                turn.end,
                self.turn_text(turn)
            )?;
        }
        for ipu in &self.ipus {
            write!(f, "\n\t{}", ipu)?;
        }
        writeln!(f)
    }
}

/// One recording session: two subjects playing a series of game tasks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub session_id: u32,
    pub batch: Batch,
    pub subject_a: String,
    pub subject_b: String,
    pub tasks: Vec<Task>,
}
