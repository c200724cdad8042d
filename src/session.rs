use crate::question::Question;
use crate::scoring::{score, Points};
use chrono::{DateTime, Local};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum, strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Practice,
    Mock,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Phase {
    NotStarted,
    InProgress,
    Finished,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub mock_question_count: usize,
    pub mock_duration_secs: u64,
    /// Practice wraps back to the first question until this many are answered
    pub practice_finish_threshold: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            mock_question_count: 65,
            mock_duration_secs: 5400,
            practice_finish_threshold: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedAnswer {
    pub selected: BTreeSet<String>,
    pub points: Points,
    pub fully_correct: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConfirmOutcome {
    Recorded(RecordedAnswer),
    /// Nothing selected; the prompt flag is raised and nothing else changes
    NeedsSelection,
    /// Already confirmed, or no attempt in progress
    Locked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Idle,
    Running(u64),
    /// Emitted once, on the tick that forced the finish
    Expired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum GridStatus {
    Unattempted,
    Correct,
    Incorrect,
    Attempted,
}

/// Recoverable progress of an in-flight mock exam
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MockSnapshot {
    pub question_ids: Vec<String>,
    pub time_left: u64,
    pub current_index: usize,
    pub selections: BTreeSet<String>,
    pub recorded_answers: BTreeMap<usize, RecordedAnswer>,
    pub marked_questions: BTreeSet<String>,
    pub score: f64,
    pub saved_at: DateTime<Local>,
}

/// One quiz attempt and everything that mutates during it
#[derive(Debug)]
pub struct QuizSession {
    config: SessionConfig,
    mode: Mode,
    phase: Phase,
    pool: Vec<Question>,
    sequence: Vec<Question>,
    current: usize,
    selection: BTreeSet<String>,
    confirmed: bool,
    answers: BTreeMap<usize, RecordedAnswer>,
    marked: BTreeSet<String>,
    score: f64,
    time_left: Option<u64>,
    needs_selection: bool,
    rng: StdRng,
}

impl QuizSession {
    pub fn new(config: SessionConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    pub fn with_rng(config: SessionConfig, rng: StdRng) -> Self {
        Self {
            config,
            mode: Mode::Practice,
            phase: Phase::NotStarted,
            pool: Vec::new(),
            sequence: Vec::new(),
            current: 0,
            selection: BTreeSet::new(),
            confirmed: false,
            answers: BTreeMap::new(),
            marked: BTreeSet::new(),
            score: 0.0,
            time_left: None,
            needs_selection: false,
            rng,
        }
    }

    pub fn seeded(config: SessionConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    /// Draws this attempt's sequence from `pool`. An empty pool leaves the
    /// session untouched.
    pub fn start(&mut self, mode: Mode, pool: &[Question]) {
        if pool.is_empty() {
            tracing::warn!(%mode, "refusing to start a session from an empty question pool");
            return;
        }
        self.mode = mode;
        self.pool = pool.to_vec();
        self.reset_attempt();
    }

    /// Moves a prepared mock exam past its instructions gate
    pub fn begin(&mut self) -> bool {
        if self.phase != Phase::NotStarted || self.sequence.is_empty() {
            return false;
        }
        self.phase = Phase::InProgress;
        tracing::info!(mode = %self.mode, questions = self.sequence.len(), "session started");
        true
    }

    pub fn restart(&mut self) {
        if self.pool.is_empty() {
            return;
        }
        self.reset_attempt();
    }

    fn reset_attempt(&mut self) {
        let mut sequence = self.pool.clone();
        sequence.shuffle(&mut self.rng);
        if self.mode == Mode::Mock {
            sequence.truncate(self.config.mock_question_count);
        }

        self.sequence = sequence;
        self.current = 0;
        self.selection.clear();
        self.confirmed = false;
        self.answers.clear();
        self.score = 0.0;
        self.needs_selection = false;

        match self.mode {
            Mode::Practice => {
                self.time_left = None;
                self.phase = Phase::InProgress;
            }
            Mode::Mock => {
                self.time_left = Some(self.config.mock_duration_secs);
                self.phase = Phase::NotStarted;
            }
        }
        tracing::info!(
            mode = %self.mode,
            questions = self.sequence.len(),
            pool = self.pool.len(),
            "attempt prepared"
        );
    }

    fn is_editable(&self) -> bool {
        self.phase == Phase::InProgress && !self.confirmed && self.current_question().is_some()
    }

    pub fn select_option(&mut self, choice: &str) {
        if !self.is_editable() {
            return;
        }
        let Some(question) = self.sequence.get(self.current) else {
            return;
        };
        if !question.options.iter().any(|o| o == choice) {
            return;
        }

        if question.is_multi() {
            if !self.selection.remove(choice) {
                self.selection.insert(choice.to_string());
            }
        } else {
            self.selection.clear();
            self.selection.insert(choice.to_string());
        }
        self.needs_selection = false;
    }

    pub fn clear_selection(&mut self) {
        if !self.is_editable() {
            return;
        }
        self.selection.clear();
        self.needs_selection = false;
    }

    pub fn confirm_answer(&mut self) -> ConfirmOutcome {
        if !self.is_editable() {
            return ConfirmOutcome::Locked;
        }
        if self.selection.is_empty() {
            self.needs_selection = true;
            return ConfirmOutcome::NeedsSelection;
        }
        let Some(question) = self.sequence.get(self.current) else {
            return ConfirmOutcome::Locked;
        };

        let points = score(&self.selection, &question.answer);
        let record = RecordedAnswer {
            selected: self.selection.clone(),
            points,
            fully_correct: points.is_full(),
        };
        tracing::debug!(id = %question.id, ?points, "answer confirmed");

        if let Some(previous) = self.answers.insert(self.current, record.clone()) {
            self.score -= previous.points.value();
        }
        self.score += points.value();
        self.confirmed = true;
        self.needs_selection = false;

        if self.mode == Mode::Mock {
            self.advance();
        }
        ConfirmOutcome::Recorded(record)
    }

    /// Lets a practice answer be resubmitted; the next confirm replaces it
    pub fn reopen(&mut self) -> bool {
        if self.mode != Mode::Practice || self.phase != Phase::InProgress || !self.confirmed {
            return false;
        }
        self.confirmed = false;
        true
    }

    pub fn advance(&mut self) {
        if self.phase != Phase::InProgress {
            return;
        }
        if self.current + 1 < self.sequence.len() {
            self.land_on(self.current + 1);
            return;
        }
        match self.mode {
            Mode::Mock => {
                self.finish();
            }
            Mode::Practice if self.answered_count() < self.config.practice_finish_threshold => {
                self.land_on(0);
            }
            Mode::Practice => {
                self.finish();
            }
        }
    }

    pub fn retreat(&mut self) {
        if self.phase != Phase::InProgress || self.current == 0 {
            return;
        }
        self.land_on(self.current - 1);
    }

    pub fn jump_to(&mut self, index: usize) {
        if self.phase != Phase::InProgress || index >= self.sequence.len() {
            return;
        }
        self.land_on(index);
    }

    fn land_on(&mut self, index: usize) {
        self.current = index;
        match self.answers.get(&index) {
            Some(record) => {
                self.selection = record.selected.clone();
                self.confirmed = true;
            }
            None => {
                self.selection.clear();
                self.confirmed = false;
            }
        }
        self.needs_selection = false;
    }

    pub fn toggle_mark(&mut self, question_id: &str) {
        if !self.marked.remove(question_id) {
            self.marked.insert(question_id.to_string());
        }
    }

    /// Returns true only on the call that actually ended the attempt
    pub fn finish(&mut self) -> bool {
        if self.phase != Phase::InProgress {
            return false;
        }
        self.phase = Phase::Finished;
        self.needs_selection = false;
        tracing::info!(
            mode = %self.mode,
            score = self.score,
            answered = self.answered_count(),
            total = self.sequence.len(),
            "session finished"
        );
        true
    }

    /// One elapsed second of the mock countdown
    pub fn tick(&mut self) -> TickOutcome {
        if self.mode != Mode::Mock || self.phase != Phase::InProgress {
            return TickOutcome::Idle;
        }
        let remaining = self.time_left.unwrap_or(0).saturating_sub(1);
        self.time_left = Some(remaining);

        if remaining == 0 {
            tracing::info!("mock exam time expired");
            self.finish();
            TickOutcome::Expired
        } else {
            TickOutcome::Running(remaining)
        }
    }

    pub fn snapshot(&self) -> Option<MockSnapshot> {
        if self.mode != Mode::Mock || self.phase != Phase::InProgress {
            return None;
        }
        Some(MockSnapshot {
            question_ids: self.sequence.iter().map(|q| q.id.clone()).collect(),
            time_left: self.time_left.unwrap_or(0),
            current_index: self.current,
            selections: self.selection.clone(),
            recorded_answers: self.answers.clone(),
            marked_questions: self.marked.clone(),
            score: self.score,
            saved_at: Local::now(),
        })
    }

    /// Rehydrates a mock exam in progress. Snapshots that do not line up
    /// with `pool` are rejected and leave the session untouched.
    pub fn restore(&mut self, snapshot: MockSnapshot, pool: &[Question]) -> bool {
        let sequence: Option<Vec<Question>> = snapshot
            .question_ids
            .iter()
            .map(|id| pool.iter().find(|q| &q.id == id).cloned())
            .collect();
        let Some(sequence) = sequence else {
            tracing::warn!("mock snapshot references unknown questions");
            return false;
        };
        if sequence.is_empty()
            || snapshot.current_index >= sequence.len()
            || snapshot.time_left == 0
            || snapshot.recorded_answers.keys().any(|&i| i >= sequence.len())
        {
            tracing::warn!("mock snapshot is inconsistent");
            return false;
        }

        // Points are recomputed; only the selections are taken from the blob
        let mut answers = BTreeMap::new();
        for (index, stored) in snapshot.recorded_answers {
            let question = &sequence[index];
            if stored.selected.is_empty()
                || !stored.selected.iter().all(|s| question.options.contains(s))
            {
                tracing::warn!(id = %question.id, "mock snapshot holds an invalid answer");
                return false;
            }
            let points = score(&stored.selected, &question.answer);
            answers.insert(
                index,
                RecordedAnswer {
                    selected: stored.selected,
                    points,
                    fully_correct: points.is_full(),
                },
            );
        }

        self.mode = Mode::Mock;
        self.pool = pool.to_vec();
        self.sequence = sequence;
        self.answers = answers;
        self.score = self.answers.values().map(|r| r.points.value()).sum();
        self.marked = snapshot.marked_questions;
        self.time_left = Some(snapshot.time_left);
        self.phase = Phase::InProgress;
        self.land_on(snapshot.current_index);
        if !self.confirmed {
            self.selection = snapshot.selections;
        }
        tracing::info!(
            time_left = snapshot.time_left,
            answered = self.answers.len(),
            "mock exam restored"
        );
        true
    }

    pub fn set_marked(&mut self, marked: BTreeSet<String>) {
        self.marked = marked;
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Finished
    }

    pub fn sequence(&self) -> &[Question] {
        &self.sequence
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.sequence.get(self.current)
    }

    pub fn selection(&self) -> &BTreeSet<String> {
        &self.selection
    }

    pub fn is_confirmed(&self) -> bool {
        self.confirmed
    }

    pub fn needs_selection(&self) -> bool {
        self.needs_selection
    }

    pub fn answers(&self) -> &BTreeMap<usize, RecordedAnswer> {
        &self.answers
    }

    pub fn recorded(&self, index: usize) -> Option<&RecordedAnswer> {
        self.answers.get(&index)
    }

    pub fn answered_count(&self) -> usize {
        self.answers.len()
    }

    pub fn marked(&self) -> &BTreeSet<String> {
        &self.marked
    }

    pub fn is_marked(&self, question_id: &str) -> bool {
        self.marked.contains(question_id)
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    pub fn max_score(&self) -> usize {
        self.sequence.len()
    }

    pub fn time_left(&self) -> Option<u64> {
        self.time_left
    }

    pub fn grid_status(&self, index: usize) -> GridStatus {
        match (self.answers.get(&index), self.mode) {
            (None, _) => GridStatus::Unattempted,
            (Some(_), Mode::Mock) => GridStatus::Attempted,
            (Some(r), Mode::Practice) if r.fully_correct => GridStatus::Correct,
            (Some(_), Mode::Practice) => GridStatus::Incorrect,
        }
    }
}
