use anyhow::Result;
use tracing::{debug, warn};

use super::BuildContext;
use crate::models::{Speaker, Turn, TurnTransition, TurnTransitionType, turn_id};
use crate::parsers::SpeakerTurnRecords;

/// Raw labels kept in the turn files for annotator bookkeeping only; they
/// do not describe discourse transitions and are filtered before linking.
pub const INFORMATIONAL_LABELS: [&str; 5] = ["L", "L-SIM", "N", "N-SIM", "A"];

/// Link each declared turn to the interlocutor turn it transitions from.
///
/// For every non-silence record, the source is the most recently *started*
/// turn of the other speaker with start ≤ the new turn's start (reverse
/// chronological scan, first match) — except X1 and X3 turns, which have
/// no source by definition. A transition is dropped with a warning when no
/// predecessor resolves or when its destination turn was never
/// reconstructed. An unknown label is a hard error. The result is sorted
/// by destination first-IPU start, giving a canonical task-level order
/// even though it is assembled from two independent per-speaker scans.
pub fn link_transitions(
    session_id: u32,
    task_id: u32,
    task_bounds: (f64, f64),
    turn_records: &SpeakerTurnRecords,
    turns: &[Turn],
    ctx: &BuildContext,
) -> Result<Vec<TurnTransition>> {
    let (task_start, task_end) = task_bounds;
    let mut transitions = Vec::new();
    if turns.is_empty() {
        return Ok(transitions);
    }

    for (speaker, records) in turn_records {
        let interlocutor = speaker.interlocutor();
        for record in records {
            if record.start > task_end {
                break;
            }
            if record.end < task_start {
                continue;
            }
            if record.is_silence() {
                continue;
            }

            let upper = record.label.to_uppercase();
            if INFORMATIONAL_LABELS.contains(&upper.as_str()) {
                debug!("Skipping informational label {}", record.label);
                continue;
            }

            let label_type = TurnTransitionType::parse(&record.label)?;

            let turn_id_from = if matches!(
                label_type,
                TurnTransitionType::FirstTurn | TurnTransitionType::SimultaneousStart
            ) {
                None
            } else {
                match previous_interlocutor_turn(turns, interlocutor, record.start) {
                    Some(turn) => Some(turn.turn_id.clone()),
                    None => {
                        warn!(
                            "No interlocutor turn precedes {} turn at {:.3}. Skipping transition",
                            speaker, record.start
                        );
                        continue;
                    }
                }
            };

            let turn_id_to = turn_id(session_id, task_id, *speaker, record.start, record.end);
            if !ctx.contains_turn(&turn_id_to) {
                warn!(
                    "Turn {} was never reconstructed. Skipping transition",
                    turn_id_to
                );
                continue;
            }

            let transition_duration = match &turn_id_from {
                Some(from) => {
                    let to_start = ctx.turn_first_ipu_start(&turn_id_to).unwrap_or(record.start);
                    let from_end = ctx.turn_last_ipu_end(from).unwrap_or(record.start);
                    to_start - from_end
                }
                None => 0.0,
            };

            transitions.push(TurnTransition::new(
                record.label.clone(),
                label_type,
                turn_id_from,
                turn_id_to,
                transition_duration,
            ));
        }
    }

    transitions.sort_by(|a, b| {
        let a_start = ctx.turn_first_ipu_start(&a.turn_id_to).unwrap_or(0.0);
        let b_start = ctx.turn_first_ipu_start(&b.turn_id_to).unwrap_or(0.0);
        a_start.total_cmp(&b_start)
    });
    Ok(transitions)
}

/// The most recently started turn of `speaker` at or before
/// `starting_before`.
pub fn previous_interlocutor_turn(
    turns: &[Turn],
    speaker: Speaker,
    starting_before: f64,
) -> Option<&Turn> {
    turns
        .iter()
        .rev()
        .find(|turn| turn.speaker == speaker && turn.start <= starting_before)
}
