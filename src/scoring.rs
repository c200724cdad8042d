use crate::question::Answer;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Points a single confirmed answer can earn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Points {
    Zero,
    Half,
    Full,
}

impl Points {
    pub fn value(self) -> f64 {
        match self {
            Points::Zero => 0.0,
            Points::Half => 0.5,
            Points::Full => 1.0,
        }
    }

    pub fn is_full(self) -> bool {
        self == Points::Full
    }
}

/// Scores a submitted selection against the canonical answer.
///
/// Single-choice earns full points only for the exact option. Multi-select
/// earns full points for the exact set, half for a non-empty subset with no
/// wrong picks, and nothing otherwise.
pub fn score(selected: &BTreeSet<String>, answer: &Answer) -> Points {
    match answer {
        Answer::One(expected) => {
            if selected.len() == 1 && selected.contains(expected) {
                Points::Full
            } else {
                Points::Zero
            }
        }
        Answer::Many(expected) => {
            let correct = selected.iter().filter(|s| expected.contains(*s)).count();
            let incorrect = selected.len() - correct;

            match (correct, incorrect) {
                (c, 0) if c == expected.len() && c > 0 => Points::Full,
                (c, 0) if c > 0 => Points::Half,
                _ => Points::Zero,
            }
        }
    }
}
