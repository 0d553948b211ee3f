use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use super::{BuildContext, link_transitions, reconstruct_turns};
use crate::error::CorpusError;
use crate::io::{
    BatchLayout, CorpusStore, SessionRecord, phrases_file_name, tasks_file_name, turns_file_name,
    wav_file_name, words_file_name,
};
use crate::models::{Batch, Ipu, Session, Speaker, Task};
use crate::parsers::{
    SpeakerTurnRecords, TaskInfo, parse_phrase_file, parse_tasks_file, parse_turn_file,
    parse_word_file,
};

/// Assemble one session from the store: parse its tasks file, then build
/// each task bottom-up (IPUs, then turns, then transitions).
pub fn build_session(
    store: &CorpusStore,
    record: &SessionRecord,
    ctx: &mut BuildContext,
) -> Result<Session> {
    let layout = BatchLayout::for_batch(record.batch);
    let tasks_name = tasks_file_name(record.session_id, record.batch);
    let tasks_path = store
        .file(layout.tasks, &tasks_name)
        .ok_or(CorpusError::MissingTasksFile(tasks_name))?;
    let infos = parse_tasks_file(tasks_path, record.batch)
        .with_context(|| format!("Failed to parse tasks of session {}", record.session_id))?;

    info!(
        "Building session {:02} (batch {}, {} tasks)",
        record.session_id,
        record.batch,
        infos.len()
    );

    let mut tasks = Vec::with_capacity(infos.len());
    for info in &infos {
        tasks.push(build_task(store, record, &layout, info, ctx)?);
    }

    Ok(Session {
        session_id: record.session_id,
        batch: record.batch,
        subject_a: record.subject_a.clone(),
        subject_b: record.subject_b.clone(),
        tasks,
    })
}

fn build_task(
    store: &CorpusStore,
    record: &SessionRecord,
    layout: &BatchLayout,
    info: &TaskInfo,
    ctx: &mut BuildContext,
) -> Result<Task> {
    let session_id = record.session_id;
    let batch = record.batch;
    let bounds = (info.start, info.end);

    let ipus = load_task_ipus(store, session_id, info, batch, layout)?;
    ctx.register_ipus(&ipus);

    let turn_records = load_turn_records(store, session_id, info.task_id, batch, layout)?;
    let turns = reconstruct_turns(session_id, info.task_id, bounds, &turn_records, &ipus, ctx);
    let transitions =
        link_transitions(session_id, info.task_id, bounds, &turn_records, &turns, ctx)?;

    // Task start is the declared interval start for batch 1; batch 2 files
    // are per task and self-relative, so the first IPU anchors it instead.
    let declared_start = match batch {
        Batch::One => Some(info.start),
        Batch::Two => None,
    };

    Ok(Task::new(
        info.task_id,
        session_id,
        info.images.clone(),
        info.describer,
        info.target.clone(),
        info.score,
        info.time_used,
        declared_start,
        transitions,
        turns,
        ipus,
        resolve_wavs(store, session_id, info.task_id, batch, layout),
    ))
}

/// Load both speakers' IPUs for one task. Batch 1 word files cover the
/// whole session and must exist; batch 2 phrase files are per task and a
/// missing one only silences that speaker.
fn load_task_ipus(
    store: &CorpusStore,
    session_id: u32,
    info: &TaskInfo,
    batch: Batch,
    layout: &BatchLayout,
) -> Result<Vec<Ipu>> {
    let mut ipus = Vec::new();
    for speaker in Speaker::BOTH {
        match batch {
            Batch::One => {
                let folder = layout.words.expect("batch 1 layout has a words folder");
                let name = words_file_name(session_id, speaker);
                let path = store.file(folder, &name).ok_or(
                    CorpusError::MissingWordsFile(name),
                )?;
                ipus.extend(parse_word_file(path, speaker, info.start, info.end)?);
            }
            Batch::Two => {
                let name = phrases_file_name(session_id, info.task_id, speaker, batch);
                let Some(path) = store.file(layout.phrases, &name) else {
                    warn!("Phrases file {} not found. Skipping speaker", name);
                    continue;
                };
                ipus.extend(parse_phrase_file(path, speaker)?);
            }
        }
    }
    Ok(ipus)
}

/// Load both speakers' turn files. A missing file leaves that speaker
/// without declared turns rather than failing the session.
fn load_turn_records(
    store: &CorpusStore,
    session_id: u32,
    task_id: u32,
    batch: Batch,
    layout: &BatchLayout,
) -> Result<SpeakerTurnRecords> {
    let mut records = Vec::new();
    for speaker in Speaker::BOTH {
        let name = turns_file_name(session_id, task_id, speaker, batch);
        let Some(path) = store.file(layout.turns, &name) else {
            warn!("Turns file {} not found. Assuming no turns", name);
            records.push((speaker, Vec::new()));
            continue;
        };
        records.push((speaker, parse_turn_file(path)?));
    }
    Ok(records)
}

fn resolve_wavs(
    store: &CorpusStore,
    session_id: u32,
    task_id: u32,
    batch: Batch,
    layout: &BatchLayout,
) -> HashMap<Speaker, PathBuf> {
    let mut wavs = HashMap::new();
    for speaker in Speaker::BOTH {
        let name = wav_file_name(session_id, task_id, speaker, batch);
        match store.file(layout.wavs, &name) {
            Some(path) => {
                wavs.insert(speaker, path.to_path_buf());
            }
            None => debug!("No audio for {}", name),
        }
    }
    wavs
}
