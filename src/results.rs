use crate::scoring::Points;
use crate::session::{Mode, QuizSession};

#[derive(Debug, Clone, PartialEq)]
pub struct IncorrectEntry {
    pub index: usize,
    pub question_id: String,
    pub question: String,
    pub your_answer: Vec<String>,
    pub correct_answer: Vec<String>,
    pub points: Points,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarkedEntry {
    pub index: usize,
    pub question_id: String,
    pub question: String,
    pub your_answer: Option<Vec<String>>,
    pub correct_answer: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnattemptedEntry {
    pub index: usize,
    pub question_id: String,
    pub question: String,
}

/// Post-session analytics
#[derive(Debug, Clone, PartialEq)]
pub struct ResultsSummary {
    pub mode: Mode,
    pub total: usize,
    pub answered: usize,
    pub score: f64,
    pub max_score: usize,
    pub percentage: f64,
    /// Only mock exams carry a verdict
    pub passed: Option<bool>,
    pub incorrect: Vec<IncorrectEntry>,
    pub marked: Vec<MarkedEntry>,
    pub unattempted: Vec<UnattemptedEntry>,
}

impl ResultsSummary {
    pub fn from_session(session: &QuizSession, pass_percentage: f64) -> Self {
        let total = session.sequence().len();
        let score = session.score();
        let percentage = if total == 0 {
            0.0
        } else {
            (score / total as f64 * 1000.0).round() / 10.0
        };
        let passed = (session.mode() == Mode::Mock).then_some(percentage >= pass_percentage);

        let mut incorrect = Vec::new();
        let mut marked = Vec::new();
        let mut unattempted = Vec::new();

        for (index, q) in session.sequence().iter().enumerate() {
            let record = session.recorded(index);
            let correct_answer: Vec<String> = q.answer.iter().cloned().collect();

            match record {
                Some(r) if !r.fully_correct => incorrect.push(IncorrectEntry {
                    index,
                    question_id: q.id.clone(),
                    question: q.question.clone(),
                    your_answer: r.selected.iter().cloned().collect(),
                    correct_answer: correct_answer.clone(),
                    points: r.points,
                }),
                Some(_) => {}
                None => unattempted.push(UnattemptedEntry {
                    index,
                    question_id: q.id.clone(),
                    question: q.question.clone(),
                }),
            }

            if session.is_marked(&q.id) {
                marked.push(MarkedEntry {
                    index,
                    question_id: q.id.clone(),
                    question: q.question.clone(),
                    your_answer: record.map(|r| r.selected.iter().cloned().collect()),
                    correct_answer,
                });
            }
        }

        Self {
            mode: session.mode(),
            total,
            answered: session.answered_count(),
            score,
            max_score: total,
            percentage,
            passed,
            incorrect,
            marked,
            unattempted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::question::{Answer, Question, QuestionKind};
    use crate::session::SessionConfig;

    fn bank() -> Vec<Question> {
        (0..3)
            .map(|i| Question {
                id: format!("q{i}"),
                question: format!("question {i}"),
                options: vec!["A".into(), "B".into(), "C".into()],
                kind: QuestionKind::Multi,
                answer: Answer::Many(["A".to_string(), "B".to_string()].into_iter().collect()),
            })
            .collect()
    }

    #[test]
    fn summarises_practice_attempt() {
        let mut session = QuizSession::seeded(SessionConfig::default(), 5);
        session.start(Mode::Practice, &bank());

        session.select_option("A");
        session.select_option("B");
        session.confirm_answer();
        session.advance();
        session.select_option("A");
        session.confirm_answer();
        let marked_id = session.sequence()[2].id.clone();
        session.toggle_mark(&marked_id);
        session.finish();

        let summary = ResultsSummary::from_session(&session, 70.0);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.score, 1.5);
        assert_eq!(summary.percentage, 50.0);
        assert_eq!(summary.passed, None);
        assert_eq!(summary.incorrect.len(), 1);
        assert_eq!(summary.incorrect[0].points, Points::Half);
        assert_eq!(summary.incorrect[0].your_answer, vec!["A".to_string()]);
        assert_eq!(summary.unattempted.len(), 1);
        assert_eq!(summary.marked.len(), 1);
        assert_eq!(summary.marked[0].your_answer, None);
    }

    #[test]
    fn mock_verdict_uses_pass_threshold() {
        let mut session = QuizSession::seeded(SessionConfig::default(), 5);
        session.start(Mode::Mock, &bank());
        session.begin();
        for _ in 0..2 {
            session.select_option("A");
            session.select_option("B");
            session.confirm_answer();
        }
        session.finish();

        let summary = ResultsSummary::from_session(&session, 70.0);
        assert_eq!(summary.percentage, 66.7);
        assert_eq!(summary.passed, Some(false));
        assert_eq!(
            ResultsSummary::from_session(&session, 60.0).passed,
            Some(true)
        );
    }

    #[test]
    fn empty_session_has_zero_percentage() {
        let session = QuizSession::seeded(SessionConfig::default(), 5);
        let summary = ResultsSummary::from_session(&session, 70.0);
        assert_eq!(summary.total, 0);
        assert_eq!(summary.percentage, 0.0);
    }
}
