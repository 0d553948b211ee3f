use std::collections::HashMap;

use tracing::warn;

use super::BuildContext;
use crate::models::{Ipu, Speaker, Turn, turn_id};
use crate::parsers::SpeakerTurnRecords;

/// Slop allowed between the turn file and the transcription layer when
/// matching IPUs to a declared turn interval. The annotation layers were
/// authored independently and their boundaries disagree by up to ~100ms.
pub const IPU_MATCH_TOLERANCE: f64 = 0.1;

/// IPUs whose start or end falls within `[turn_start - max_diff,
/// turn_end + max_diff]`. IPUs that merely overlap the interval without
/// either endpoint inside the widened window are excluded.
pub fn find_turn_ipus<'a>(
    speaker_ipus: &[&'a Ipu],
    turn_start: f64,
    turn_end: f64,
    max_diff: f64,
) -> Vec<&'a Ipu> {
    let lo = turn_start - max_diff;
    let hi = turn_end + max_diff;
    speaker_ipus
        .iter()
        .filter(|ipu| (lo <= ipu.start && ipu.start <= hi) || (lo <= ipu.end && ipu.end <= hi))
        .copied()
        .collect()
}

/// Reconstruct the turns of one task from both speakers' turn files.
///
/// Each declared non-silence interval inside the task boundaries becomes a
/// turn holding the ids of that speaker's matching IPUs. A declared turn
/// with no matching IPUs is an annotation/alignment mismatch: it is
/// dropped with a warning, not an error. Every reconstructed turn is
/// registered in the context so the transition linker can resolve it by
/// id. The result is sorted by start time across both speakers.
pub fn reconstruct_turns(
    session_id: u32,
    task_id: u32,
    task_bounds: (f64, f64),
    turn_records: &SpeakerTurnRecords,
    ipus: &[Ipu],
    ctx: &mut BuildContext,
) -> Vec<Turn> {
    let (task_start, task_end) = task_bounds;
    let mut turns = Vec::new();
    if ipus.is_empty() {
        return turns;
    }

    let mut by_speaker: HashMap<Speaker, Vec<&Ipu>> = HashMap::new();
    for ipu in ipus {
        by_speaker.entry(ipu.speaker).or_default().push(ipu);
    }
    for speaker_ipus in by_speaker.values_mut() {
        speaker_ipus.sort_by(|a, b| a.start.total_cmp(&b.start));
    }
    let empty = Vec::new();

    for (speaker, records) in turn_records {
        let speaker_ipus = by_speaker.get(speaker).unwrap_or(&empty);
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

            let members = find_turn_ipus(speaker_ipus, record.start, record.end, IPU_MATCH_TOLERANCE);
            let id = turn_id(session_id, task_id, *speaker, record.start, record.end);
            if members.is_empty() {
                warn!("Cannot find IPUs for turn {}. Skipping turn", id);
                continue;
            }

            let turn = Turn::new(
                session_id,
                task_id,
                *speaker,
                record.start,
                record.end,
                members.iter().map(|ipu| ipu.ipu_id.clone()).collect(),
            );
            ctx.register_turn(turn.clone());
            turns.push(turn);
        }
    }

    turns.sort_by(|a, b| a.start.total_cmp(&b.start));
    turns
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Word;
    use crate::parsers::TurnRecord;

    fn ipu(start: f64, end: f64, text: &str, speaker: Speaker) -> Ipu {
        Ipu::new(vec![Word::new(start, end, text, speaker)])
    }

    fn record(start: f64, end: f64, label: &str) -> TurnRecord {
        TurnRecord {
            start,
            end,
            label: label.to_string(),
        }
    }

    #[test]
    fn test_find_turn_ipus_tolerance() {
        // Starts 50ms before the declared turn, ends well past it: the
        // start endpoint is inside the 100ms window.
        let near = ipu(1.05, 5.0, "hola", Speaker::A);
        let refs: Vec<&Ipu> = vec![&near];
        let found = find_turn_ipus(&refs, 1.1, 2.0, IPU_MATCH_TOLERANCE);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].text, "hola");

        // 250ms off on the start, end still past the interval: excluded.
        let far = ipu(0.85, 5.0, "hola", Speaker::A);
        let refs: Vec<&Ipu> = vec![&far];
        let found = find_turn_ipus(&refs, 1.1, 2.0, IPU_MATCH_TOLERANCE);
        assert!(found.is_empty());
    }

    #[test]
    fn test_reconstruct_registers_and_sorts() {
        let ipus = vec![
            ipu(0.0, 1.0, "hello", Speaker::A),
            ipu(2.0, 3.0, "world", Speaker::B),
        ];
        let records = vec![
            (Speaker::B, vec![record(2.0, 3.0, "BC")]),
            (Speaker::A, vec![record(0.0, 1.0, "X1")]),
        ];
        let mut ctx = BuildContext::new();
        ctx.register_ipus(&ipus);

        let turns = reconstruct_turns(1, 1, (0.0, 10.0), &records, &ipus, &mut ctx);
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].speaker, Speaker::A); // sorted by start
        assert_eq!(turns[1].speaker, Speaker::B);
        assert!(ctx.contains_turn(&turns[0].turn_id));
        assert_eq!(turns[1].ipu_ids, vec![ipus[1].ipu_id.clone()]);
    }

    #[test]
    fn test_unmatched_turn_is_dropped() {
        let ipus = vec![ipu(0.0, 1.0, "hello", Speaker::A)];
        // Declared turn nowhere near any IPU of this speaker.
        let records = vec![(Speaker::A, vec![record(7.0, 8.0, "S")])];
        let mut ctx = BuildContext::new();
        ctx.register_ipus(&ipus);

        let turns = reconstruct_turns(1, 1, (0.0, 10.0), &records, &ipus, &mut ctx);
        assert!(turns.is_empty());
    }

    #[test]
    fn test_boundary_filtering() {
        let ipus = vec![
            ipu(1.0, 2.0, "uno", Speaker::A),
            ipu(20.0, 21.0, "dos", Speaker::A),
        ];
        let records = vec![(
            Speaker::A,
            vec![
                record(1.0, 2.0, "X1"),    // before the task: skipped
                record(20.0, 21.0, "S"),   // inside
                record(40.0, 41.0, "S"),   // past the end: scan stops
            ],
        )];
        let mut ctx = BuildContext::new();
        ctx.register_ipus(&ipus);

        let turns = reconstruct_turns(1, 2, (15.0, 30.0), &records, &ipus, &mut ctx);
        assert_eq!(turns.len(), 1);
        assert!((turns[0].start - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_no_ipus_yields_no_turns() {
        let records = vec![(Speaker::A, vec![record(0.0, 1.0, "X1")])];
        let mut ctx = BuildContext::new();
        let turns = reconstruct_turns(1, 1, (0.0, 10.0), &records, &[], &mut ctx);
        assert!(turns.is_empty());
    }
}
