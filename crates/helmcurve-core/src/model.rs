//! Core data model types for helmcurve.
//!
//! Responses mirror the `request_states` entries of a HELM
//! `scenario_state_slim.json` file; the remaining types are derived from them
//! and never persisted by the core.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The top-level shape of one `{task}/{model}.json` result file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioState {
    /// One entry per (instance, trial) pair.
    #[serde(default)]
    pub request_states: Vec<Response>,
}

/// One model-generated completion for one (instance, trial) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    /// The evaluation instance this response answers.
    pub instance: Instance,
    /// Index of the few-shot resampling trial.
    #[serde(default)]
    pub train_trial_index: u32,
    /// Letter-to-text mapping for multiple-choice scenarios.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_mapping: Option<HashMap<String, String>>,
    /// What the model produced.
    pub result: RequestResult,
}

impl Response {
    /// Composite identifier `{instance_id}_{trial}` used as the join key
    /// between accuracy and difficulty computations.
    pub fn composite_id(&self) -> String {
        composite_id(&self.instance.id, self.train_trial_index)
    }
}

/// Build the composite `{instance_id}_{trial}` key.
pub fn composite_id(instance_id: &str, trial: u32) -> String {
    format!("{instance_id}_{trial}")
}

/// A single evaluation example.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instance {
    pub id: String,
    #[serde(default)]
    pub split: Option<Split>,
    #[serde(default)]
    pub references: Vec<Reference>,
}

/// A reference answer; the correct one carries the `"correct"` tag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reference {
    pub output: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Reference {
    pub fn is_correct(&self) -> bool {
        self.tags.iter().any(|t| t == "correct")
    }
}

/// The model output attached to a response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestResult {
    #[serde(default)]
    pub completions: Vec<Completion>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Completion {
    pub text: String,
}

/// Data partition an instance belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Split {
    Train,
    Valid,
    Test,
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Split::Train => write!(f, "train"),
            Split::Valid => write!(f, "valid"),
            Split::Test => write!(f, "test"),
        }
    }
}

impl FromStr for Split {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "train" => Ok(Split::Train),
            "valid" | "validation" => Ok(Split::Valid),
            "test" => Ok(Split::Test),
            other => Err(format!("unknown split: {other}")),
        }
    }
}

/// Correctness of one response, derived by an evaluator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceResult {
    /// Composite `{instance_id}_{trial}` identifier.
    pub id: String,
    /// Trial index.
    pub trial: u32,
    /// Whether the completion was judged correct.
    pub is_correct: bool,
    /// The expected answer as compared (after extraction, if any).
    pub expected: String,
    /// The completion as compared; `None` when extraction found nothing.
    pub actual: Option<String>,
}

/// All instance results for one model on one task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelAccuracy {
    pub model: String,
    pub results: Vec<InstanceResult>,
}

impl ModelAccuracy {
    /// Fraction of correct results, or `None` when there are no results.
    pub fn mean_accuracy(&self) -> Option<f64> {
        if self.results.is_empty() {
            return None;
        }
        let correct = self.results.iter().filter(|r| r.is_correct).count();
        Some(correct as f64 / self.results.len() as f64)
    }

    /// Map composite id to correctness.
    pub fn correctness_by_id(&self) -> HashMap<String, bool> {
        self.results
            .iter()
            .map(|r| (r.id.clone(), r.is_correct))
            .collect()
    }
}

/// Per-model results in the order the models were supplied.
pub type ModelAccuracies = Vec<ModelAccuracy>;

/// One model's verdict on one composite instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelOutcome {
    pub model: String,
    pub is_correct: bool,
}

/// Every model's verdict on one composite instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialOutcomes {
    pub id: String,
    pub outcomes: Vec<ModelOutcome>,
}

/// Difficulty of one composite instance; higher means fewer models solve it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceDifficulty {
    pub id: String,
    pub difficulty: f64,
}
