//! End-to-end loading against a miniature on-disk corpus.

use std::path::Path;

use games_corpus::{Batch, GamesCorpus, Speaker, TurnTransitionType};

fn write(root: &Path, folder: &str, name: &str, content: &str) {
    let dir = root.join(folder);
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join(name), content).unwrap();
}

/// Two batch 1 sessions (one held out), one banned session, and one batch 2
/// session.
fn fixture_corpus() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();

    std::fs::write(
        root.join("sessions-info.csv"),
        "session,batch,subject_a,subject_b\n\
         3,1,s03a,s03b\n\
         7,1,s07a,s07b\n\
         21,2,s21a,s21b\n\
         28,2,s28a,s28b\n",
    )
    .unwrap();

    let b1_tasks = "\
0.000000 34.949000 Images:i1,i2;Describer:A;Target:i1;Score:99;Time-used:34.9
34.949000 80.618000 Images:i3,i4;Describer:B;Target:i3;Score:97;Time-used:45.669
";
    let b1_words_a = "\
0.000000 1.000000 #
1.000000 2.000000 hola
2.000000 3.000000 #
35.000000 36.000000 mira
36.000000 36.500000 #
";
    let b1_words_b = "\
3.000000 4.000000 si
4.000000 5.000000 #
37.900195 39.000000 la
39.000000 41.897241 bruja
41.897241 42.000000 #
";
    let b1_turns_a = "\
1.000000 2.000000 X1
35.000000 36.000000 X1
";
    let b1_turns_b = "\
3.000000 4.000000 BC
37.900195 41.897241 S
";
    for session in ["s03", "s07"] {
        write(
            root,
            "b1-dialogue-tasks",
            &format!("{session}.objects.1.tasks"),
            b1_tasks,
        );
        write(
            root,
            "b1-dialogue-words",
            &format!("{session}.objects.1.A.words"),
            b1_words_a,
        );
        write(
            root,
            "b1-dialogue-words",
            &format!("{session}.objects.1.B.words"),
            b1_words_b,
        );
        write(
            root,
            "b1-dialogue-turns",
            &format!("{session}.objects.1.A.turns"),
            b1_turns_a,
        );
        write(
            root,
            "b1-dialogue-turns",
            &format!("{session}.objects.1.B.turns"),
            b1_turns_b,
        );
    }

    write(
        root,
        "b2-dialogue-tasks",
        "s21.objects.tasks",
        "01 Images:eye;Describer:A;Target:eye;Score:94;Time-used:10.0\n",
    );
    write(
        root,
        "b2-dialogue-phrases",
        "s21.objects.01.channel1.phrases",
        "0.00\t0.41\t#\n0.41\t1.00\thola\n1.00\t1.20\t#\n",
    );
    write(
        root,
        "b2-dialogue-phrases",
        "s21.objects.01.channel2.phrases",
        "1.59\t2.50\tdale\n2.50\t2.60\t#\n",
    );
    write(
        root,
        "b2-dialogue-turns",
        "s21.objects.01.channel1.turns",
        "0.41 1.00 X1\n",
    );
    write(
        root,
        "b2-dialogue-turns",
        "s21.objects.01.channel2.turns",
        "1.59 2.50 S\n",
    );
    // Session 28 has no files: the loader must never look for them.

    dir
}

#[test]
fn test_load_full_fixture() {
    let dir = fixture_corpus();
    let corpus = GamesCorpus::load(dir.path()).unwrap();

    // Banned session 28 is listed in the index but not loaded.
    assert!(corpus.session(28).is_none());
    assert_eq!(corpus.sessions().count(), 3);

    let session = corpus.session(3).unwrap();
    assert_eq!(session.batch, Batch::One);
    assert_eq!(session.subject_a, "s03a");
    assert_eq!(session.tasks.len(), 2);
}

#[test]
fn test_batch1_task_structure() {
    let dir = fixture_corpus();
    let corpus = GamesCorpus::load(dir.path()).unwrap();
    let session = corpus.session(3).unwrap();

    let first = &session.tasks[0];
    assert_eq!(first.task_id, 1);
    assert_eq!(first.describer, Speaker::A);
    assert_eq!(first.ipus.len(), 2);
    assert_eq!(first.turns.len(), 2);
    assert_eq!(first.turn_transitions.len(), 2);

    let bc = &first.turn_transitions[1];
    assert_eq!(bc.label_type, TurnTransitionType::Backchannel);
    assert!((bc.transition_duration - 1.0).abs() < 1e-9);
    assert!(!bc.overlapped_transition);

    // Batch 1 task start is the declared interval start, not the first IPU.
    let second = &session.tasks[1];
    assert!((second.start - 34.949).abs() < 1e-6);
    assert!((second.duration() - 45.669).abs() < 1e-6);
    assert!(second.turn("turn_03_02_B_37.90_41.90").is_some());
}

#[test]
fn test_batch2_task_structure() {
    let dir = fixture_corpus();
    let corpus = GamesCorpus::load(dir.path()).unwrap();
    let session = corpus.session(21).unwrap();
    assert_eq!(session.batch, Batch::Two);

    let task = &session.tasks[0];
    assert_eq!(task.ipus.len(), 2);
    assert_eq!(task.turns.len(), 2);

    // Batch 2 task start anchors on the first IPU.
    assert!((task.start - 0.41).abs() < 1e-9);

    let switch = task
        .turn_transitions
        .iter()
        .find(|t| t.label_type == TurnTransitionType::SmoothSwitch)
        .unwrap();
    assert!((switch.transition_duration - 0.59).abs() < 1e-9);
    assert!(switch.turn_id_from.is_some());
}

#[test]
fn test_dev_held_out_partition() {
    let dir = fixture_corpus();
    let corpus = GamesCorpus::load(dir.path()).unwrap();

    // Session 7 is a held-out session; session 3's tasks 1 and 2 are dev.
    let dev = corpus.dev_tasks(Batch::One);
    let held_out = corpus.held_out_tasks(Batch::One);
    assert_eq!(dev.len(), 2);
    assert_eq!(held_out.len(), 2);
    assert!(dev.iter().all(|t| t.session_id == 3));
    assert!(held_out.iter().all(|t| t.session_id == 7));

    // Partition is exhaustive and disjoint.
    let total: usize = corpus
        .sessions_by_batch(Batch::One)
        .map(|s| s.tasks.len())
        .sum();
    assert_eq!(dev.len() + held_out.len(), total);

    // Session 21 is held out for batch 2.
    assert!(corpus.dev_tasks(Batch::Two).is_empty());
    assert_eq!(corpus.held_out_tasks(Batch::Two).len(), 1);
}
