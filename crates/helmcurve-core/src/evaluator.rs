//! Per-task correctness evaluation.
//!
//! Each HELM scenario judges completions its own way. The mapping from task
//! name to evaluator is a fixed table ([`TASK_EVALUATORS`]); tasks not listed
//! fall back to choice matching when their responses carry an output mapping,
//! and to exact matching otherwise.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::model::Response;

/// The matching strategy used to score a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Evaluator {
    /// Trimmed completion equals the expected answer.
    ExactMatch,
    /// Completion is a choice letter mapped through the output mapping.
    ChoiceMatch,
    /// Exact match up to a consistent relabeling of the symbols X, Y and Z.
    SymbolPermutation,
    /// Compare the contents of `boxed{...}`.
    BoxedExpression,
    /// Compare the text following "The answer is ".
    AnswerPhrase,
}

/// Tasks whose evaluator is fixed by name.
pub const TASK_EVALUATORS: &[(&str, Evaluator)] = &[
    ("synthetic_reasoning_induction", Evaluator::SymbolPermutation),
    ("math_cot", Evaluator::BoxedExpression),
    ("gsm8k", Evaluator::AnswerPhrase),
];

const SYMBOLS: [char; 3] = ['X', 'Y', 'Z'];

const SYMBOL_PERMUTATIONS: [[char; 3]; 6] = [
    ['X', 'Y', 'Z'],
    ['X', 'Z', 'Y'],
    ['Y', 'X', 'Z'],
    ['Y', 'Z', 'X'],
    ['Z', 'X', 'Y'],
    ['Z', 'Y', 'X'],
];

const BOXED_MARKER: &str = "boxed{...}";
const ANSWER_MARKER: &str = "\"The answer is ...\"";

fn boxed_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"boxed\{(.*?)\}").expect("boxed pattern is valid"))
}

fn answer_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"The answer is (.*)\.").expect("answer pattern is valid"))
}

/// Outcome of scoring a single response.
#[derive(Debug, Clone, PartialEq)]
pub struct Scored {
    pub is_correct: bool,
    /// Expected answer as compared.
    pub expected: String,
    /// Completion as compared; `None` when extraction found nothing.
    pub actual: Option<String>,
}

impl Evaluator {
    /// Look up the evaluator fixed by task name, if any.
    pub fn for_task_name(task_name: &str) -> Option<Evaluator> {
        TASK_EVALUATORS
            .iter()
            .find(|(name, _)| *name == task_name)
            .map(|(_, evaluator)| *evaluator)
    }

    /// Select the evaluator for a task given its responses.
    ///
    /// The output-mapping check looks at the first response only, so a task
    /// is treated uniformly.
    pub fn for_task(task_name: &str, responses: &[Response]) -> Evaluator {
        if let Some(evaluator) = Self::for_task_name(task_name) {
            return evaluator;
        }
        match responses.first() {
            Some(first) if first.output_mapping.is_some() => Evaluator::ChoiceMatch,
            _ => Evaluator::ExactMatch,
        }
    }

    /// Score one response.
    pub fn score(self, response: &Response) -> Result<Scored> {
        let (expected, completion) = expected_and_completion(response)?;
        match self {
            Evaluator::ExactMatch => Ok(Scored {
                is_correct: expected == completion,
                expected,
                actual: Some(completion),
            }),
            Evaluator::ChoiceMatch => {
                let prediction = response
                    .output_mapping
                    .as_ref()
                    .and_then(|mapping| mapping.get(&completion))
                    .map(|p| p.trim())
                    .unwrap_or("");
                Ok(Scored {
                    is_correct: expected == prediction,
                    expected,
                    actual: Some(completion),
                })
            }
            Evaluator::SymbolPermutation => Ok(Scored {
                is_correct: matches_up_to_symbol_permutation(&expected, &completion),
                expected,
                actual: Some(completion),
            }),
            Evaluator::BoxedExpression => {
                extracted_match(&expected, &completion, boxed_regex(), BOXED_MARKER)
            }
            Evaluator::AnswerPhrase => {
                extracted_match(&expected, &completion, answer_regex(), ANSWER_MARKER)
            }
        }
    }
}

/// Extract the single correct reference and the single completion, trimmed.
pub fn expected_and_completion(response: &Response) -> Result<(String, String)> {
    let instance_id = &response.instance.id;

    let correct: Vec<_> = response
        .instance
        .references
        .iter()
        .filter(|r| r.is_correct())
        .collect();
    let [reference] = correct.as_slice() else {
        return Err(CoreError::integrity(
            instance_id,
            format!("expected exactly one correct reference, found {}", correct.len()),
        ));
    };

    let [completion] = response.result.completions.as_slice() else {
        return Err(CoreError::integrity(
            instance_id,
            format!(
                "expected exactly one completion, found {}",
                response.result.completions.len()
            ),
        ));
    };

    Ok((
        reference.output.trim().to_string(),
        completion.text.trim().to_string(),
    ))
}

/// True if some permutation of X/Y/Z applied to `completion` yields `expected`.
pub fn matches_up_to_symbol_permutation(expected: &str, completion: &str) -> bool {
    SYMBOL_PERMUTATIONS.iter().any(|permutation| {
        let relabeled: String = completion
            .chars()
            .map(|c| match SYMBOLS.iter().position(|&s| s == c) {
                Some(i) => permutation[i],
                None => c,
            })
            .collect();
        relabeled == expected
    })
}

fn capture(re: &Regex, text: &str) -> Option<String> {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

fn extracted_match(
    expected: &str,
    completion: &str,
    re: &Regex,
    marker: &'static str,
) -> Result<Scored> {
    let expected = capture(re, expected).ok_or_else(|| CoreError::Parse {
        expected: expected.to_string(),
        marker,
    })?;
    let actual = capture(re, completion);
    Ok(Scored {
        is_correct: actual.as_deref() == Some(expected.as_str()),
        expected,
        actual,
    })
}
