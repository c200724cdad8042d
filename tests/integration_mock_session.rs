use std::time::Duration;

use certquiz::config::Config;
use certquiz::controller::{Controller, Intent};
use certquiz::preferences::{PreferenceStore, MOCK_SNAPSHOT_KEY};
use certquiz::question::{Answer, Question, QuestionKind};
use certquiz::session::{Mode, Phase, QuizSession, SessionConfig, TickOutcome};
use certquiz::storage::{SqliteStorage, Storage};
use tempfile::tempdir;

fn pool(n: usize) -> Vec<Question> {
    (0..n)
        .map(|i| Question {
            id: format!("m{i}"),
            question: format!("mock question {i}"),
            options: vec!["A".into(), "B".into(), "C".into()],
            kind: QuestionKind::Single,
            answer: Answer::One("C".into()),
        })
        .collect()
}

#[test]
fn mock_draws_at_most_the_pool() {
    let mut session = QuizSession::seeded(SessionConfig::default(), 4);
    session.start(Mode::Mock, &pool(40));
    assert_eq!(session.sequence().len(), 40);
    assert_eq!(session.max_score(), 40);
}

#[test]
fn empty_pool_start_changes_nothing() {
    let mut session = QuizSession::seeded(SessionConfig::default(), 4);
    session.start(Mode::Mock, &[]);
    assert_eq!(session.phase(), Phase::NotStarted);
    assert_eq!(session.time_left(), None);
    assert!(!session.begin());
}

#[test]
fn timer_forces_exactly_one_finish() {
    let config = SessionConfig {
        mock_duration_secs: 2,
        ..SessionConfig::default()
    };
    let mut session = QuizSession::seeded(config, 4);
    session.start(Mode::Mock, &pool(5));
    session.begin();

    let outcomes: Vec<TickOutcome> = (0..6).map(|_| session.tick()).collect();
    assert_eq!(
        outcomes
            .iter()
            .filter(|o| **o == TickOutcome::Expired)
            .count(),
        1
    );
    assert!(session.is_finished());
}

#[test]
fn restart_rearms_timer_and_clears_attempt() {
    let config = SessionConfig {
        mock_duration_secs: 60,
        mock_question_count: 3,
        ..SessionConfig::default()
    };
    let mut session = QuizSession::seeded(config, 4);
    session.start(Mode::Mock, &pool(10));
    session.begin();
    session.select_option("C");
    session.confirm_answer();
    session.tick();
    session.finish();

    session.restart();
    assert_eq!(session.phase(), Phase::NotStarted);
    assert_eq!(session.time_left(), Some(60));
    assert_eq!(session.score(), 0.0);
    assert!(session.answers().is_empty());
    assert_eq!(session.sequence().len(), 3);
}

#[test]
fn snapshot_survives_process_restart_on_disk() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("state.db");
    let config = Config {
        mock_question_count: 5,
        mock_duration_secs: 300,
        ..Config::default()
    };

    {
        let storage = SqliteStorage::open(&db).unwrap();
        let session = QuizSession::seeded(config.session_config(), 8);
        let mut controller = Controller::new(pool(10), session, storage, &config);
        controller.enter(Mode::Mock);
        controller.dispatch(Intent::Begin);
        controller.dispatch(Intent::Select("C".into()));
        controller.dispatch(Intent::Confirm);
        controller.dispatch(Intent::ToggleMark);
        controller.on_elapsed(Duration::from_secs(30));
        assert!(controller.storage().load(MOCK_SNAPSHOT_KEY).unwrap().is_some());
        controller.on_elapsed(Duration::from_secs(5));
        controller.shutdown();
    }

    let storage = SqliteStorage::open(&db).unwrap();
    let snapshot = PreferenceStore::new(&storage).load_snapshot().unwrap();
    assert_eq!(snapshot.time_left, 265);
    assert_eq!(snapshot.question_ids.len(), 5);

    let session = QuizSession::seeded(config.session_config(), 99);
    let mut controller = Controller::new(pool(10), session, storage, &config);
    controller.enter(Mode::Mock);

    let session = controller.session();
    assert_eq!(session.phase(), Phase::InProgress);
    assert_eq!(session.time_left(), Some(265));
    assert_eq!(session.score(), 1.0);
    assert_eq!(session.current_index(), 1);
    assert_eq!(session.marked().len(), 1);
    assert_eq!(
        session.sequence().iter().map(|q| q.id.clone()).collect::<Vec<_>>(),
        snapshot.question_ids
    );
}

#[test]
fn stale_snapshot_is_discarded() {
    let dir = tempdir().unwrap();
    let storage = SqliteStorage::open(dir.path().join("state.db")).unwrap();
    let config = Config::default();

    {
        let session = QuizSession::seeded(config.session_config(), 8);
        let mut controller = Controller::new(pool(10), session, &storage, &config);
        controller.enter(Mode::Mock);
        controller.dispatch(Intent::Begin);
        controller.shutdown();
    }

    // the bank changed underneath the saved exam
    let renamed: Vec<Question> = pool(10)
        .into_iter()
        .map(|mut q| {
            q.id = format!("new-{}", q.id);
            q
        })
        .collect();
    let session = QuizSession::seeded(config.session_config(), 8);
    let mut controller = Controller::new(renamed, session, &storage, &config);
    controller.enter(Mode::Mock);

    assert_eq!(controller.session().phase(), Phase::NotStarted);
    assert!(storage.load(MOCK_SNAPSHOT_KEY).unwrap().is_none());
}
