use std::collections::BTreeSet;

use assert_matches::assert_matches;
use certquiz::question::{Answer, Question, QuestionBank, QuestionKind};
use certquiz::results::ResultsSummary;
use certquiz::scoring::Points;
use certquiz::session::{ConfirmOutcome, GridStatus, Mode, Phase, QuizSession, SessionConfig};

fn question(id: &str, kind: QuestionKind, answer: &[&str]) -> Question {
    let answer = match kind {
        QuestionKind::Single => Answer::One(answer[0].to_string()),
        QuestionKind::Multi => Answer::Many(answer.iter().map(|s| s.to_string()).collect()),
    };
    Question {
        id: id.to_string(),
        question: format!("{id}?"),
        options: ["A", "B", "C", "D"].iter().map(|s| s.to_string()).collect(),
        kind,
        answer,
    }
}

fn index_of(session: &QuizSession, id: &str) -> usize {
    session
        .sequence()
        .iter()
        .position(|q| q.id == id)
        .expect("question is in the sequence")
}

#[test]
fn single_correct_answer_scores_one() {
    let mut session = QuizSession::seeded(SessionConfig::default(), 1);
    session.start(Mode::Practice, &[question("s", QuestionKind::Single, &["B"])]);

    session.select_option("B");
    assert_matches!(
        session.confirm_answer(),
        ConfirmOutcome::Recorded(r) if r.points == Points::Full && r.fully_correct
    );
    assert_eq!(session.score(), 1.0);
}

#[test]
fn multi_scenarios_score_partial_and_zero() {
    let pool = vec![
        question("partial", QuestionKind::Multi, &["B", "C"]),
        question("wrong", QuestionKind::Multi, &["B", "C"]),
    ];
    let mut session = QuizSession::seeded(SessionConfig::default(), 1);
    session.start(Mode::Practice, &pool);

    session.jump_to(index_of(&session, "partial"));
    session.select_option("B");
    session.confirm_answer();

    session.jump_to(index_of(&session, "wrong"));
    session.select_option("B");
    session.select_option("D");
    session.confirm_answer();

    let partial = session.recorded(index_of(&session, "partial")).unwrap();
    let wrong = session.recorded(index_of(&session, "wrong")).unwrap();
    assert_eq!(partial.points, Points::Half);
    assert_eq!(wrong.points, Points::Zero);
    assert_eq!(session.score(), 0.5);
    assert_eq!(
        session.grid_status(index_of(&session, "partial")),
        GridStatus::Incorrect
    );
}

#[test]
fn score_equals_sum_of_recorded_points() {
    let bank = QuestionBank::bundled().unwrap();
    let mut session = QuizSession::seeded(SessionConfig::default(), 77);
    session.start(Mode::Practice, bank.questions());

    for _ in 0..bank.len() {
        let first = session.current_question().unwrap().options[0].clone();
        session.select_option(&first);
        session.confirm_answer();
        session.advance();
    }

    let sum: f64 = session.answers().values().map(|r| r.points.value()).sum();
    assert_eq!(session.score(), sum);
    assert!(session.score() <= session.max_score() as f64);
    assert!(session.is_finished());
}

#[test]
fn practice_wraps_until_ten_answered_then_finishes() {
    let pool: Vec<Question> = (0..12)
        .map(|i| question(&format!("q{i}"), QuestionKind::Single, &["A"]))
        .collect();
    let mut session = QuizSession::seeded(SessionConfig::default(), 3);
    session.start(Mode::Practice, &pool);

    // walk to the end without answering: wraps around
    for _ in 0..12 {
        session.advance();
    }
    assert_eq!(session.current_index(), 0);
    assert_eq!(session.phase(), Phase::InProgress);

    for _ in 0..10 {
        session.select_option("A");
        session.confirm_answer();
        session.advance();
    }
    session.jump_to(11);
    session.advance();
    assert!(session.is_finished());
}

#[test]
fn marks_survive_restart_and_show_in_results() {
    let pool: Vec<Question> = (0..3)
        .map(|i| question(&format!("q{i}"), QuestionKind::Single, &["A"]))
        .collect();
    let mut session = QuizSession::seeded(SessionConfig::default(), 3);
    session.start(Mode::Practice, &pool);
    session.toggle_mark("q1");
    session.restart();
    session.finish();

    let summary = ResultsSummary::from_session(&session, 70.0);
    let marked: BTreeSet<_> = summary.marked.iter().map(|m| m.question_id.clone()).collect();
    assert_eq!(marked, ["q1".to_string()].into_iter().collect());
    assert_eq!(summary.unattempted.len(), 3);
    assert_eq!(summary.percentage, 0.0);
}
