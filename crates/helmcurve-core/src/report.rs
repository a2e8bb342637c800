//! Difficulty report types with JSON persistence.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::discretize::DifficultyAxis;
use crate::model::Split;

/// Which chart the report carries besides the AUC summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlotKind {
    /// Fitted logistic agent-characteristic curves.
    Logistic,
    /// Mean correctness per difficulty bucket.
    Binned,
}

impl fmt::Display for PlotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlotKind::Logistic => write!(f, "logistic"),
            PlotKind::Binned => write!(f, "binned"),
        }
    }
}

impl FromStr for PlotKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "logistic" | "logistic-fit" => Ok(PlotKind::Logistic),
            "binned" => Ok(PlotKind::Binned),
            other => Err(format!("unknown plot type: {other}")),
        }
    }
}

/// Knobs an analysis was run with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisSettings {
    /// Models plotted; these are also excluded from the difficulty estimate.
    pub models: Vec<String>,
    pub plot: PlotKind,
    pub axis: DifficultyAxis,
    /// Bucket count for the binned plot.
    pub num_bins: usize,
    /// Chance-correction option count, if any.
    #[serde(default)]
    pub num_options: Option<usize>,
    /// Restrict to one data split.
    #[serde(default)]
    pub split: Option<Split>,
    /// Seed of the quantile jitter, when reproducible.
    #[serde(default)]
    pub seed: Option<u64>,
}

/// A complete difficulty analysis of one task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DifficultyReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    /// Task (scenario) name.
    pub task: String,
    pub settings: AnalysisSettings,
    /// Number of composite instances with a difficulty.
    pub instance_count: usize,
    /// Mean accuracy of every model on the task.
    pub models: Vec<ModelSummary>,
    /// Filled when `settings.plot` is logistic.
    #[serde(default)]
    pub logistic: Vec<LogisticSeries>,
    /// Filled when `settings.plot` is binned.
    #[serde(default)]
    pub binned: Vec<BinnedSeries>,
    /// Area under each selected model's characteristic curve.
    pub auc: Vec<AucPoint>,
}

/// Overall accuracy of one model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSummary {
    pub model: String,
    pub instances: usize,
    pub accuracy: Option<f64>,
}

/// A fitted agent-characteristic curve for one model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticSeries {
    pub model: String,
    pub xs: Vec<f64>,
    /// P(correct) at each x.
    pub ys: Vec<f64>,
    pub intercept: f64,
    pub slope: f64,
}

/// Binned accuracy for one model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BinnedSeries {
    pub model: String,
    pub points: Vec<BinnedPoint>,
}

/// Mean correctness in one difficulty bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinnedPoint {
    /// Bucket value on the report's axis.
    pub bucket: f64,
    pub count: usize,
    pub mean: f64,
    /// Lower end of a 95% confidence band.
    pub ci_low: f64,
    /// Upper end of a 95% confidence band.
    pub ci_high: f64,
}

/// AUC of one model, paired with its size when known.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AucPoint {
    pub model: String,
    pub auc: f64,
    /// log10 of the parameter count.
    #[serde(default)]
    pub log_params: Option<f64>,
}

impl DifficultyReport {
    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: DifficultyReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }
}
