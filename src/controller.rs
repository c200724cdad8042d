use crate::config::Config;
use crate::preferences::{PreferenceStore, Preferences};
use crate::question::Question;
use crate::results::ResultsSummary;
use crate::scheduler::{Scheduler, Task};
use crate::session::{Mode, Phase, QuizSession, TickOutcome};
use crate::storage::Storage;
use std::time::Duration;

/// Everything the presentation layer may ask of a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Begin,
    Select(String),
    ClearSelection,
    Confirm,
    Next,
    Previous,
    JumpTo(usize),
    Reopen,
    ToggleMark,
    Finish,
    Restart,
    ToggleDarkMode,
}

/// Single owner of the session, its persistence and its timers
pub struct Controller<S: Storage> {
    pool: Vec<Question>,
    session: QuizSession,
    store: PreferenceStore<S>,
    preferences: Preferences,
    scheduler: Scheduler,
    /// Set by `shutdown`; keeps timers off until the next `enter`
    suspended: bool,
    pass_percentage: f64,
}

impl<S: Storage> Controller<S> {
    pub fn new(pool: Vec<Question>, mut session: QuizSession, storage: S, config: &Config) -> Self {
        let store = PreferenceStore::new(storage);
        let preferences = store.load_preferences();
        session.set_marked(preferences.marked_questions.clone());

        Self {
            pool,
            session,
            store,
            preferences,
            scheduler: Scheduler::new(Duration::from_secs(1), config.snapshot_interval()),
            suspended: false,
            pass_percentage: config.pass_percentage,
        }
    }

    /// Read-only view for rendering
    pub fn session(&self) -> &QuizSession {
        &self.session
    }

    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    pub fn storage(&self) -> &S {
        self.store.storage()
    }

    pub fn pool(&self) -> &[Question] {
        &self.pool
    }

    /// Swaps in a freshly loaded bank; the next `enter` draws from it
    pub fn set_pool(&mut self, pool: Vec<Question>) {
        self.pool = pool;
    }

    pub fn pass_percentage(&self) -> f64 {
        self.pass_percentage
    }

    pub fn is_armed(&self, task: Task) -> bool {
        self.scheduler.is_armed(task)
    }

    /// Starts `mode`, resuming a saved mock exam when one lines up with the pool
    pub fn enter(&mut self, mode: Mode) {
        self.scheduler.cancel_all();
        self.suspended = false;

        let resumed = mode == Mode::Mock
            && match self.store.load_snapshot() {
                Some(snapshot) => {
                    let ok = self.session.restore(snapshot, &self.pool);
                    if !ok {
                        self.store.clear_snapshot();
                    }
                    ok
                }
                None => false,
            };

        if resumed {
            self.session
                .set_marked(self.preferences.marked_questions.clone());
        } else {
            self.session.start(mode, &self.pool);
        }
        self.sync_tasks();
    }

    pub fn dispatch(&mut self, intent: Intent) {
        let before = self.session.phase();
        tracing::debug!(?intent, "dispatch");

        match intent {
            Intent::Begin => {
                self.session.begin();
            }
            Intent::Select(choice) => self.session.select_option(&choice),
            Intent::ClearSelection => self.session.clear_selection(),
            Intent::Confirm => {
                self.session.confirm_answer();
            }
            Intent::Next => self.session.advance(),
            Intent::Previous => self.session.retreat(),
            Intent::JumpTo(index) => self.session.jump_to(index),
            Intent::Reopen => {
                self.session.reopen();
            }
            Intent::ToggleMark => {
                if let Some(id) = self.session.current_question().map(|q| q.id.clone()) {
                    self.session.toggle_mark(&id);
                    self.preferences.marked_questions = self.session.marked().clone();
                    self.store.save_preferences(&self.preferences);
                }
            }
            Intent::Finish => {
                self.session.finish();
            }
            Intent::Restart => {
                self.session.restart();
                if self.session.mode() == Mode::Mock {
                    self.store.clear_snapshot();
                }
            }
            Intent::ToggleDarkMode => {
                self.preferences.dark_mode = !self.preferences.dark_mode;
                self.store.save_preferences(&self.preferences);
            }
        }

        self.after_transition(before);
    }

    /// Feeds wall time into the countdown and snapshot tasks
    pub fn on_elapsed(&mut self, elapsed: Duration) {
        let before = self.session.phase();
        for task in self.scheduler.advance(elapsed) {
            match task {
                Task::Countdown => {
                    if self.session.tick() == TickOutcome::Expired {
                        tracing::info!("mock exam auto-submitted");
                    }
                }
                Task::Snapshot => self.save_snapshot(),
            }
        }
        self.after_transition(before);
    }

    /// Persists an in-flight mock exam and stops all timers until the next `enter`
    pub fn shutdown(&mut self) {
        self.save_snapshot();
        self.suspended = true;
        self.scheduler.cancel_all();
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended
    }

    pub fn results(&self) -> Option<ResultsSummary> {
        self.session
            .is_finished()
            .then(|| ResultsSummary::from_session(&self.session, self.pass_percentage))
    }

    fn save_snapshot(&self) {
        if let Some(snapshot) = self.session.snapshot() {
            self.store.save_snapshot(&snapshot);
        }
    }

    fn after_transition(&mut self, before: Phase) {
        let now = self.session.phase();
        if before == Phase::InProgress && now == Phase::Finished && self.session.mode() == Mode::Mock
        {
            self.store.clear_snapshot();
        }
        self.sync_tasks();
    }

    fn sync_tasks(&mut self) {
        if !self.suspended
            && self.session.mode() == Mode::Mock
            && self.session.phase() == Phase::InProgress
        {
            self.scheduler.arm(Task::Countdown);
            self.scheduler.arm(Task::Snapshot);
        } else {
            self.scheduler.cancel_all();
        }
    }
}
