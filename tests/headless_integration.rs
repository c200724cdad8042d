use std::time::Duration;

use certquiz::app::{Action, App, AppState};
use certquiz::config::Config;
use certquiz::runtime::{FixedTicker, QuizEvent, Runner, TestEventSource};
use certquiz::session::QuizSession;
use certquiz::storage::MemoryStorage;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

fn key(code: KeyCode) -> QuizEvent {
    QuizEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
}

fn app(config: Config) -> App {
    let session = QuizSession::seeded(config.session_config(), 2024);
    App::new(config, session, Box::new(MemoryStorage::new()))
}

/// Drives `app` until it quits, `done` holds, or the step budget runs out
fn drive(app: &mut App, events: Vec<QuizEvent>, tick: Duration, done: fn(&App) -> bool) {
    let mut runner = Runner::new(TestEventSource::scripted(events), FixedTicker::new(tick));
    for _ in 0..500u32 {
        if done(app) {
            return;
        }
        let step = runner.step();
        app.on_tick(step.elapsed);
        if let QuizEvent::Key(k) = step.event {
            if app.handle_key(k) == Action::Quit {
                return;
            }
        }
    }
}

// Headless practice run through the real runtime without a TTY
#[test]
fn headless_practice_flow_answers_and_submits() {
    let mut app = app(Config::default());

    let mut events = vec![key(KeyCode::Char('1'))];
    for _ in 0..3 {
        events.push(key(KeyCode::Char('1')));
        events.push(key(KeyCode::Enter));
        events.push(key(KeyCode::Enter));
    }
    events.push(key(KeyCode::Char('s')));
    events.push(key(KeyCode::Char('q')));

    drive(&mut app, events, Duration::from_millis(1), |_| false);

    assert_eq!(app.state, AppState::Results);
    let summary = app.controller.results().expect("finished session has results");
    assert_eq!(summary.answered, 3);
    assert_eq!(summary.total, 24);
    assert_eq!(summary.unattempted.len(), 21);
    assert!(summary.passed.is_none());
}

#[test]
fn headless_mock_exam_expires_on_wall_time() {
    let config = Config {
        mock_question_count: 4,
        mock_duration_secs: 1,
        ..Config::default()
    };
    let mut app = app(config);

    drive(
        &mut app,
        vec![key(KeyCode::Char('2')), key(KeyCode::Enter)],
        Duration::from_millis(10),
        |app| app.state == AppState::Results,
    );

    assert_eq!(app.state, AppState::Results);
    assert!(app.session().is_finished());
    assert_eq!(app.session().time_left(), Some(0));
    assert_eq!(app.controller.results().unwrap().passed, Some(false));
}

#[test]
fn headless_escape_returns_to_menu_and_quits() {
    let mut app = app(Config::default());
    drive(
        &mut app,
        vec![
            key(KeyCode::Char('1')),
            key(KeyCode::Esc),
            key(KeyCode::Char('q')),
        ],
        Duration::from_millis(1),
        |_| false,
    );
    assert_eq!(app.state, AppState::Menu);
}
