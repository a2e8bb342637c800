//! The HELM task catalog (`tasks.json`).
//!
//! Each task names the HELM run it comes from and the models evaluated on
//! it. The built-in catalog covers the reasoning, QA, math and data-wrangling
//! scenarios of HELM v1.0.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::DataError;

/// Models evaluated on every default task.
pub const DEFAULT_MODELS: &[&str] = &[
    "ai21_j1-jumbo",
    "ai21_j1-large",
    "ai21_j1-grande",
    "together_bloom",
    "together_t0pp",
    "anthropic_stanford-online-all-v4-s3",
    "cohere_xlarge-20220609",
    "cohere_large-20220720",
    "cohere_medium-20220720",
    "cohere_small-20220720",
    "together_gpt-j-6b",
    "together_gpt-neox-20b",
    "together_t5-11b",
    "together_ul2",
    "together_opt-175b",
    "together_opt-66b",
    "microsoft_TNLGv2_530B",
    "microsoft_TNLGv2_7B",
    "openai_davinci",
    "openai_curie",
    "openai_babbage",
    "openai_ada",
    "openai_text-davinci-002",
    "openai_text-curie-001",
    "openai_text-babbage-001",
    "openai_text-ada-001",
    "openai_code-davinci-002",
    "openai_code-cushman-001",
    "together_glm",
    "together_yalm",
];

/// Code models without runs on the data-wrangling scenarios.
pub const CODE_MODELS: &[&str] = &["openai_code-davinci-002", "openai_code-cushman-001"];

/// Extra run arguments some models need.
pub const DEFAULT_URL_EXTRAS: &[(&str, &str)] = &[
    ("together_t0pp", "stop=hash"),
    ("together_t5-11b", "stop=hash"),
    ("together_ul2", "stop=hash,global_prefix=nlg"),
    ("together_glm", "stop=hash"),
];

/// (task name, run prefix, excludes code models)
const DEFAULT_TASKS: &[(&str, &str, bool)] = &[
    ("synthetic_reasoning_pattern_match", "synthetic_reasoning:mode=pattern_match,", false),
    ("synthetic_reasoning_variable_substitution", "synthetic_reasoning:mode=variable_substitution,", false),
    ("synthetic_reasoning_induction", "synthetic_reasoning:mode=induction,", false),
    ("synthetic_reasoning_natural_easy", "synthetic_reasoning_natural:difficulty=easy,", false),
    ("synthetic_reasoning_natural_hard", "synthetic_reasoning_natural:difficulty=hard,", false),
    ("babi_qa_all", "babi_qa:task=all,", false),
    ("babi_qa_3", "babi_qa:task=3,", false),
    ("babi_qa_15", "babi_qa:task=15,", false),
    ("babi_qa_19", "babi_qa:task=19,", false),
    ("dyck", "dyck_language_np=3:", false),
    ("gsm8k", "gsm:", false),
    ("math", "math:subject=all,level=1,use_official_examples=True,use_chain_of_thought=False,", false),
    ("math_cot", "math:subject=all,level=1,use_official_examples=False,use_chain_of_thought=True,", false),
    ("lsat_qa", "lsat_qa:task=all,method=multiple_choice_joint,", false),
    ("legal_support", "legal_support,method=multiple_choice_joint:", false),
    ("data_imputation_buy", "entity_data_imputation:dataset=Buy,", true),
    ("data_imputation_restaurant", "entity_data_imputation:dataset=Restaurant,", true),
    ("entity_matching_beer", "entity_matching:dataset=Beer,", true),
    ("entity_matching_abt_buy", "entity_matching:dataset=Abt_Buy,", true),
    ("entity_matching_dirty_itunes_amazon", "entity_matching:dataset=Dirty_iTunes_Amazon,", true),
];

/// One task entry of `tasks.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskSpec {
    /// Run name prefix, up to and including the separator before `model=`.
    #[serde(default)]
    pub url_param: String,
    /// Models with results for this task.
    pub models: Vec<String>,
    /// Extra run arguments keyed by model.
    #[serde(default)]
    pub url_extras: HashMap<String, String>,
}

impl TaskSpec {
    /// HELM run name for `model`, e.g. `gsm:model=openai_ada`.
    pub fn run_name(&self, model: &str) -> String {
        let mut insert = format!("model={model}");
        if let Some(extra) = self.url_extras.get(model) {
            insert.push(',');
            insert.push_str(extra);
        }
        format!("{}{}", self.url_param, insert)
    }

    /// Download URL for `model` under a `{run}` template.
    pub fn run_url(&self, base_url: &str, model: &str) -> String {
        base_url.replace("{run}", &self.run_name(model))
    }
}

/// All tasks, keyed by task name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskCatalog {
    pub tasks: BTreeMap<String, TaskSpec>,
}

impl TaskCatalog {
    /// Look up a task.
    pub fn task(&self, name: &str) -> Result<&TaskSpec, DataError> {
        self.tasks
            .get(name)
            .ok_or_else(|| DataError::UnknownTask(name.to_string()))
    }

    /// Task names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tasks.keys().map(String::as_str)
    }

    /// Read a catalog from a `tasks.json` file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read task catalog: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("failed to parse task catalog: {}", path.display()))
    }

    /// Write the catalog as `tasks.json`.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).context("failed to serialize task catalog")?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write task catalog to {}", path.display()))
    }
}

/// The built-in HELM v1.0 catalog.
pub fn default_catalog() -> TaskCatalog {
    let extras: HashMap<String, String> = DEFAULT_URL_EXTRAS
        .iter()
        .map(|(m, e)| (m.to_string(), e.to_string()))
        .collect();

    let tasks = DEFAULT_TASKS
        .iter()
        .map(|(name, url_param, no_code_models)| {
            let models = DEFAULT_MODELS
                .iter()
                .filter(|m| !(*no_code_models && CODE_MODELS.contains(m)))
                .map(|m| m.to_string())
                .collect();
            (
                name.to_string(),
                TaskSpec {
                    url_param: url_param.to_string(),
                    models,
                    url_extras: extras.clone(),
                },
            )
        })
        .collect();

    TaskCatalog { tasks }
}
