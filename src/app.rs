use crate::config::Config;
use crate::controller::{Controller, Intent};
use crate::question::QuestionBank;
use crate::session::{Mode, Phase, QuizSession};
use crate::storage::Storage;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum AppState {
    Menu,
    Instructions,
    Quiz,
    ConfirmSubmit,
    Results,
    LoadFailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Continue,
    Quit,
}

/// Screen state wrapped around the controller
pub struct App {
    pub state: AppState,
    pub controller: Controller<Box<dyn Storage>>,
    pub config: Config,
    pub load_error: Option<String>,
    /// Pending `g<number>` jump typed on the quiz screen
    pub jump_buffer: Option<String>,
    pub results_scroll: u16,
}

impl App {
    pub fn new(config: Config, session: QuizSession, storage: Box<dyn Storage>) -> Self {
        let (pool, load_error) = match QuestionBank::load(config.questions_path.as_deref()) {
            Ok(bank) => (bank.questions().to_vec(), None),
            Err(e) => {
                tracing::error!(error = %e, "question bank failed to load");
                (Vec::new(), Some(e.to_string()))
            }
        };
        let state = if load_error.is_some() {
            AppState::LoadFailed
        } else {
            AppState::Menu
        };

        Self {
            state,
            controller: Controller::new(pool, session, storage, &config),
            config,
            load_error,
            jump_buffer: None,
            results_scroll: 0,
        }
    }

    pub fn dark_mode(&self) -> bool {
        self.controller.preferences().dark_mode
    }

    pub fn session(&self) -> &QuizSession {
        self.controller.session()
    }

    /// Skips the menu straight into `mode`
    pub fn start(&mut self, mode: Mode) {
        if self.state == AppState::LoadFailed {
            return;
        }
        self.controller.enter(mode);
        self.jump_buffer = None;
        self.results_scroll = 0;
        self.state = match self.session().phase() {
            Phase::NotStarted if self.session().sequence().is_empty() => AppState::Menu,
            Phase::NotStarted => AppState::Instructions,
            Phase::InProgress => AppState::Quiz,
            Phase::Finished => AppState::Results,
        };
    }

    pub fn reload(&mut self) {
        match QuestionBank::load(self.config.questions_path.as_deref()) {
            Ok(bank) => {
                tracing::info!(count = bank.len(), "question bank reloaded");
                self.controller.set_pool(bank.questions().to_vec());
                self.load_error = None;
                self.state = AppState::Menu;
            }
            Err(e) => {
                tracing::error!(error = %e, "question bank reload failed");
                self.load_error = Some(e.to_string());
                self.state = AppState::LoadFailed;
            }
        }
    }

    pub fn on_tick(&mut self, elapsed: Duration) {
        self.controller.on_elapsed(elapsed);
        self.follow_session();
    }

    /// Persists whatever is in flight before the process exits
    pub fn shutdown(&mut self) {
        self.controller.shutdown();
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Action {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Action::Quit;
        }

        let action = match self.state {
            AppState::Menu => self.on_menu_key(key.code),
            AppState::Instructions => self.on_instructions_key(key.code),
            AppState::Quiz => self.on_quiz_key(key.code),
            AppState::ConfirmSubmit => self.on_confirm_key(key.code),
            AppState::Results => self.on_results_key(key.code),
            AppState::LoadFailed => self.on_load_failed_key(key.code),
        };
        self.follow_session();
        action
    }

    fn on_menu_key(&mut self, code: KeyCode) -> Action {
        match code {
            KeyCode::Char('1') | KeyCode::Char('p') => self.start(Mode::Practice),
            KeyCode::Char('2') | KeyCode::Char('m') => self.start(Mode::Mock),
            KeyCode::Char('d') => self.controller.dispatch(Intent::ToggleDarkMode),
            KeyCode::Char('q') | KeyCode::Esc => return Action::Quit,
            _ => {}
        }
        Action::Continue
    }

    fn on_instructions_key(&mut self, code: KeyCode) -> Action {
        match code {
            KeyCode::Enter | KeyCode::Char('s') => {
                self.controller.dispatch(Intent::Begin);
                if self.session().phase() == Phase::InProgress {
                    self.state = AppState::Quiz;
                }
            }
            KeyCode::Esc | KeyCode::Char('b') => self.state = AppState::Menu,
            KeyCode::Char('d') => self.controller.dispatch(Intent::ToggleDarkMode),
            _ => {}
        }
        Action::Continue
    }

    fn on_quiz_key(&mut self, code: KeyCode) -> Action {
        if let Some(buffer) = self.jump_buffer.as_mut() {
            match code {
                KeyCode::Char(c) if c.is_ascii_digit() => buffer.push(c),
                KeyCode::Backspace => {
                    buffer.pop();
                }
                KeyCode::Enter => {
                    if let Ok(n) = buffer.parse::<usize>() {
                        if n > 0 {
                            self.controller.dispatch(Intent::JumpTo(n - 1));
                        }
                    }
                    self.jump_buffer = None;
                }
                _ => self.jump_buffer = None,
            }
            return Action::Continue;
        }

        let mode = self.session().mode();
        match code {
            KeyCode::Char(c @ '1'..='9') => {
                let nth = c as usize - '1' as usize;
                let option = self
                    .session()
                    .current_question()
                    .and_then(|q| q.options.get(nth))
                    .cloned();
                if let Some(option) = option {
                    self.controller.dispatch(Intent::Select(option));
                }
            }
            KeyCode::Enter => {
                if self.session().is_confirmed() {
                    self.controller.dispatch(Intent::Next);
                } else {
                    self.controller.dispatch(Intent::Confirm);
                }
            }
            KeyCode::Right | KeyCode::Char('n') => self.controller.dispatch(Intent::Next),
            KeyCode::Left | KeyCode::Char('p') => self.controller.dispatch(Intent::Previous),
            KeyCode::Home => self.controller.dispatch(Intent::JumpTo(0)),
            KeyCode::End => {
                let last = self.session().sequence().len().saturating_sub(1);
                self.controller.dispatch(Intent::JumpTo(last));
            }
            KeyCode::Char('g') => self.jump_buffer = Some(String::new()),
            KeyCode::Char('c') => self.controller.dispatch(Intent::ClearSelection),
            KeyCode::Char('m') => self.controller.dispatch(Intent::ToggleMark),
            KeyCode::Char('e') => self.controller.dispatch(Intent::Reopen),
            KeyCode::Char('d') => self.controller.dispatch(Intent::ToggleDarkMode),
            KeyCode::Char('s') => match mode {
                Mode::Mock => self.state = AppState::ConfirmSubmit,
                Mode::Practice => self.controller.dispatch(Intent::Finish),
            },
            KeyCode::Char('r') if mode == Mode::Practice => {
                self.controller.dispatch(Intent::Restart)
            }
            KeyCode::Esc => {
                self.controller.shutdown();
                self.state = AppState::Menu;
            }
            _ => {}
        }
        Action::Continue
    }

    fn on_confirm_key(&mut self, code: KeyCode) -> Action {
        match code {
            KeyCode::Enter | KeyCode::Char('y') => self.controller.dispatch(Intent::Finish),
            KeyCode::Esc | KeyCode::Char('n') => self.state = AppState::Quiz,
            _ => {}
        }
        Action::Continue
    }

    fn on_results_key(&mut self, code: KeyCode) -> Action {
        match code {
            KeyCode::Char('r') => {
                self.controller.dispatch(Intent::Restart);
                self.results_scroll = 0;
                self.state = match self.session().phase() {
                    Phase::NotStarted => AppState::Instructions,
                    _ => AppState::Quiz,
                };
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.results_scroll = self.results_scroll.saturating_sub(1)
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.results_scroll = self.results_scroll.saturating_add(1)
            }
            KeyCode::Char('d') => self.controller.dispatch(Intent::ToggleDarkMode),
            KeyCode::Esc | KeyCode::Char('h') => self.state = AppState::Menu,
            KeyCode::Char('q') => return Action::Quit,
            _ => {}
        }
        Action::Continue
    }

    fn on_load_failed_key(&mut self, code: KeyCode) -> Action {
        match code {
            KeyCode::Char('r') | KeyCode::Enter => self.reload(),
            KeyCode::Char('q') | KeyCode::Esc => return Action::Quit,
            _ => {}
        }
        Action::Continue
    }

    /// Moves to the results screen whenever the session ends underneath us
    fn follow_session(&mut self) {
        let in_quiz = matches!(self.state, AppState::Quiz | AppState::ConfirmSubmit);
        if in_quiz && self.session().is_finished() {
            self.jump_buffer = None;
            self.results_scroll = 0;
            self.state = AppState::Results;
        }
    }
}
