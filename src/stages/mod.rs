pub mod assemble;
pub mod diagnostics;
pub mod transitions;
pub mod turns;

pub use assemble::*;
pub use diagnostics::*;
pub use transitions::*;
pub use turns::*;

use std::collections::HashMap;

use crate::models::{Ipu, Turn};

/// Id→entity arena for one corpus load.
///
/// Turns must be fully reconstructed before transitions are linked: the
/// linker resolves turns by deterministic id across both speakers' files
/// without re-traversing them. Scoping the maps to a single load (a fresh
/// context per `GamesCorpus::load`) keeps repeated loads from colliding on
/// those deterministic ids.
#[derive(Debug, Default)]
pub struct BuildContext {
    ipus: HashMap<String, Ipu>,
    turns: HashMap<String, Turn>,
}

impl BuildContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_ipus(&mut self, ipus: &[Ipu]) {
        for ipu in ipus {
            self.ipus.insert(ipu.ipu_id.clone(), ipu.clone());
        }
    }

    pub fn ipu(&self, ipu_id: &str) -> Option<&Ipu> {
        self.ipus.get(ipu_id)
    }

    pub fn register_turn(&mut self, turn: Turn) {
        self.turns.insert(turn.turn_id.clone(), turn);
    }

    pub fn turn(&self, turn_id: &str) -> Option<&Turn> {
        self.turns.get(turn_id)
    }

    pub fn contains_turn(&self, turn_id: &str) -> bool {
        self.turns.contains_key(turn_id)
    }

    /// Start of a turn's first member IPU.
    pub fn turn_first_ipu_start(&self, turn_id: &str) -> Option<f64> {
        let turn = self.turn(turn_id)?;
        let first = turn.ipu_ids.first()?;
        self.ipu(first).map(|ipu| ipu.start)
    }

    /// End of a turn's last member IPU.
    pub fn turn_last_ipu_end(&self, turn_id: &str) -> Option<f64> {
        let turn = self.turn(turn_id)?;
        let last = turn.ipu_ids.last()?;
        self.ipu(last).map(|ipu| ipu.end)
    }
}
