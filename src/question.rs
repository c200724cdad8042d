use include_dir::{include_dir, Dir};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

static QUESTION_DIR: Dir = include_dir!("questions");

/// File name of the bank bundled into the binary
pub const DEFAULT_BANK_FILE: &str = "questions.json";

#[derive(Debug, Error)]
pub enum QuestionError {
    #[error("unable to read question bank {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("question bank is not well-formed: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("question {id} is invalid: {reason}")]
    Invalid { id: String, reason: String },

    #[error("duplicate question id {0}")]
    DuplicateId(String),

    #[error("bundled question bank {0} is missing")]
    MissingBundle(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display)]
#[serde(rename_all = "lowercase")]
pub enum QuestionKind {
    #[strum(serialize = "single")]
    Single,
    #[strum(serialize = "multi")]
    Multi,
}

/// Canonical answer: one option for single-choice, a set for multi-select
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Answer {
    One(String),
    Many(BTreeSet<String>),
}

impl Answer {
    pub fn contains(&self, option: &str) -> bool {
        match self {
            Answer::One(a) => a == option,
            Answer::Many(set) => set.contains(option),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Answer::One(_) => 1,
            Answer::Many(set) => set.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> Box<dyn Iterator<Item = &String> + '_> {
        match self {
            Answer::One(a) => Box::new(std::iter::once(a)),
            Answer::Many(set) => Box::new(set.iter()),
        }
    }

    /// Comma separated; multi-select answers come out sorted
    pub fn display(&self) -> String {
        self.iter().join(", ")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    #[serde(alias = "text")]
    pub question: String,
    pub options: Vec<String>,
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    pub answer: Answer,
}

impl Question {
    pub fn is_multi(&self) -> bool {
        self.kind == QuestionKind::Multi
    }

    pub fn is_correct_option(&self, option: &str) -> bool {
        self.answer.contains(option)
    }

    fn validate(&self) -> Result<(), QuestionError> {
        let invalid = |reason: &str| QuestionError::Invalid {
            id: self.id.clone(),
            reason: reason.to_string(),
        };

        if self.id.trim().is_empty() {
            return Err(invalid("empty id"));
        }
        if self.options.len() < 2 {
            return Err(invalid("needs at least two options"));
        }
        if self.options.iter().any(|o| o.trim().is_empty()) {
            return Err(invalid("empty option"));
        }
        if self.options.iter().collect::<HashSet<_>>().len() != self.options.len() {
            return Err(invalid("options are not distinct"));
        }
        match (&self.kind, &self.answer) {
            (QuestionKind::Single, Answer::One(_)) => {}
            (QuestionKind::Single, Answer::Many(_)) => {
                return Err(invalid("single-choice answer must be one string"))
            }
            (QuestionKind::Multi, Answer::Many(set)) if set.len() >= 2 => {}
            (QuestionKind::Multi, _) => {
                return Err(invalid("multi-select answer needs at least two entries"))
            }
        }
        if let Some(stray) = self.answer.iter().find(|a| !self.options.contains(a)) {
            return Err(invalid(&format!("answer '{stray}' is not an option")));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct BankDocument {
    questions: Vec<Question>,
}

/// The read-only collection every session draws from
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionBank {
    questions: Vec<Question>,
}

impl QuestionBank {
    pub fn new(questions: Vec<Question>) -> Result<Self, QuestionError> {
        let mut seen = HashSet::new();
        for q in &questions {
            q.validate()?;
            if !seen.insert(q.id.as_str()) {
                return Err(QuestionError::DuplicateId(q.id.clone()));
            }
        }
        Ok(Self { questions })
    }

    pub fn from_json_str(json: &str) -> Result<Self, QuestionError> {
        let doc: BankDocument = serde_json::from_str(json)?;
        Self::new(doc.questions)
    }

    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, QuestionError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| QuestionError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let bank = Self::from_json_str(&json)?;
        tracing::info!(path = %path.display(), count = bank.len(), "loaded question bank");
        Ok(bank)
    }

    /// The bank compiled into the binary
    pub fn bundled() -> Result<Self, QuestionError> {
        let json = QUESTION_DIR
            .get_file(DEFAULT_BANK_FILE)
            .and_then(|f| f.contents_utf8())
            .ok_or_else(|| QuestionError::MissingBundle(DEFAULT_BANK_FILE.to_string()))?;
        Self::from_json_str(json)
    }

    /// Loads from `path` when given, otherwise the bundled bank
    pub fn load(path: Option<&Path>) -> Result<Self, QuestionError> {
        match path {
            Some(p) => Self::load_from_path(p),
            None => Self::bundled(),
        }
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn count_by_kind(&self, kind: QuestionKind) -> usize {
        self.questions.iter().filter(|q| q.kind == kind).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = r#"
    {
        "questions": [
            {
                "id": "q1",
                "question": "Which service stores objects?",
                "options": ["EC2", "S3", "RDS"],
                "type": "single",
                "answer": "S3"
            },
            {
                "id": "q2",
                "question": "Pick the managed databases.",
                "options": ["RDS", "DynamoDB", "EC2", "S3"],
                "type": "multi",
                "answer": ["RDS", "DynamoDB"]
            }
        ]
    }
    "#;

    #[test]
    fn parses_single_and_multi_questions() {
        let bank = QuestionBank::from_json_str(SAMPLE).unwrap();

        assert_eq!(bank.len(), 2);
        assert_eq!(bank.questions()[0].answer, Answer::One("S3".into()));
        assert!(bank.questions()[1].is_multi());
        assert_eq!(bank.questions()[1].answer.len(), 2);
        assert_eq!(bank.count_by_kind(QuestionKind::Multi), 1);
    }

    #[test]
    fn rejects_answer_outside_options() {
        let json = r#"{"questions":[{"id":"x","question":"?","options":["A","B"],"type":"single","answer":"C"}]}"#;
        assert_matches!(
            QuestionBank::from_json_str(json),
            Err(QuestionError::Invalid { id, .. }) if id == "x"
        );
    }

    #[test]
    fn rejects_multi_with_single_answer() {
        let json = r#"{"questions":[{"id":"m","question":"?","options":["A","B","C"],"type":"multi","answer":["A"]}]}"#;
        assert_matches!(
            QuestionBank::from_json_str(json),
            Err(QuestionError::Invalid { .. })
        );
    }

    #[test]
    fn rejects_duplicate_options_and_ids() {
        let dup_opts = r#"{"questions":[{"id":"d","question":"?","options":["A","A"],"type":"single","answer":"A"}]}"#;
        assert_matches!(
            QuestionBank::from_json_str(dup_opts),
            Err(QuestionError::Invalid { .. })
        );

        let dup_ids = r#"{"questions":[
            {"id":"d","question":"?","options":["A","B"],"type":"single","answer":"A"},
            {"id":"d","question":"?","options":["A","B"],"type":"single","answer":"B"}]}"#;
        assert_matches!(
            QuestionBank::from_json_str(dup_ids),
            Err(QuestionError::DuplicateId(id)) if id == "d"
        );
    }

    #[test]
    fn malformed_payload_is_a_parse_error() {
        assert_matches!(
            QuestionBank::from_json_str("{\"questions\": 3}"),
            Err(QuestionError::Parse(_))
        );
    }

    #[test]
    fn missing_file_is_an_io_error() {
        assert_matches!(
            QuestionBank::load_from_path("/definitely/not/here.json"),
            Err(QuestionError::Io { .. })
        );
    }

    #[test]
    fn loads_from_disk() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let bank = QuestionBank::load(Some(file.path())).unwrap();
        assert_eq!(bank.len(), 2);
    }

    #[test]
    fn bundled_bank_is_valid() {
        let bank = QuestionBank::bundled().unwrap();
        assert!(!bank.is_empty());
        assert!(bank.count_by_kind(QuestionKind::Multi) > 0);
        assert!(bank.count_by_kind(QuestionKind::Single) > 0);
    }

    #[test]
    fn accepts_text_alias() {
        let json = r#"{"questions":[{"id":"t","text":"?","options":["A","B"],"type":"single","answer":"B"}]}"#;
        let bank = QuestionBank::from_json_str(json).unwrap();
        assert_eq!(bank.questions()[0].question, "?");
    }

    #[test]
    fn answer_display_joins_entries() {
        let answer = Answer::Many(["B".to_string(), "C".to_string()].into_iter().collect());
        assert_eq!(answer.display(), "B, C");
        assert_eq!(Answer::One("A".into()).display(), "A");
    }
}
