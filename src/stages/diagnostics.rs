//! Post-hoc data-quality checks.
//!
//! The reconstructor only uses a timing-tolerance window; it does not
//! enforce that turns are well-formed with respect to the interlocutor's
//! speech. These checks report where noisy annotations violate the
//! intended structure, without rejecting the corpus.

use crate::models::{Task, TurnTransitionType};

/// X3 (simultaneous start) destinations must begin within this window of
/// the interlocutor turn they start alongside. From the annotation
/// guidelines.
pub const SIMULTANEOUS_START_TOLERANCE: f64 = 0.21;

/// Run every check against one task, returning human-readable violation
/// descriptions.
pub fn check_task(task: &Task) -> Vec<String> {
    let mut problems = turn_contiguity(task);
    problems.extend(same_speaker_separation(task));
    problems.extend(simultaneous_start_timing(task));
    problems
}

fn intersects(a_start: f64, a_end: f64, b_start: f64, b_end: f64) -> bool {
    a_start < b_end && b_start < a_end
}

/// No interlocutor IPU may intersect the span between two consecutive
/// member IPUs of a turn — otherwise the turn should have been split.
pub fn turn_contiguity(task: &Task) -> Vec<String> {
    let mut problems = Vec::new();
    for turn in &task.turns {
        let members: Vec<_> = turn.ipu_ids.iter().filter_map(|id| task.ipu(id)).collect();
        for pair in members.windows(2) {
            for ipu in task.ipus.iter().filter(|i| i.speaker != turn.speaker) {
                if intersects(pair[0].start, pair[1].end, ipu.start, ipu.end) {
                    problems.push(format!(
                        "turn {} contains interlocutor speech at [{:.3}, {:.3}]",
                        turn.turn_id, ipu.start, ipu.end
                    ));
                }
            }
        }
    }
    problems
}

/// Consecutive turns by the same speaker must be separated by interlocutor
/// speech — otherwise they should have been one turn.
pub fn same_speaker_separation(task: &Task) -> Vec<String> {
    let mut problems = Vec::new();
    for pair in task.turns.windows(2) {
        if pair[0].speaker != pair[1].speaker {
            continue;
        }
        let separated = task
            .ipus
            .iter()
            .filter(|ipu| ipu.speaker != pair[0].speaker)
            .any(|ipu| intersects(pair[0].end, pair[1].start, ipu.start, ipu.end));
        if !separated {
            problems.push(format!(
                "turns {} and {} by the same speaker have no interlocutor speech between them",
                pair[0].turn_id, pair[1].turn_id
            ));
        }
    }
    problems
}

/// An X3 destination must start within [`SIMULTANEOUS_START_TOLERANCE`] of
/// the immediately preceding interlocutor turn's start.
pub fn simultaneous_start_timing(task: &Task) -> Vec<String> {
    let mut problems = Vec::new();
    for transition in &task.turn_transitions {
        if transition.label_type != TurnTransitionType::SimultaneousStart {
            continue;
        }
        let Some(dest) = task.turn(&transition.turn_id_to) else {
            continue;
        };
        let companion = task
            .turns
            .iter()
            .filter(|t| t.speaker != dest.speaker && t.start <= dest.start)
            .last();
        match companion {
            Some(other) if (dest.start - other.start).abs() <= SIMULTANEOUS_START_TOLERANCE => {}
            _ => problems.push(format!(
                "simultaneous start {} has no interlocutor turn within {:.0}ms",
                dest.turn_id,
                SIMULTANEOUS_START_TOLERANCE * 1000.0
            )),
        }
    }
    problems
}
