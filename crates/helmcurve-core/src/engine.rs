//! Difficulty analysis orchestrator.
//!
//! Composes accuracy aggregation, difficulty estimation, discretization and
//! curve fitting into a [`DifficultyReport`] for a set of selected models.
//! The selected models are always excluded from the difficulty estimate.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::Utc;
use rand::Rng;
use uuid::Uuid;

use crate::accuracy::accuracy_per_trial;
use crate::characteristic::{auc, logistic_characteristic, CharacteristicCurve};
use crate::difficulty::difficulty_per_trial;
use crate::discretize::{discretize, DifficultyAxis};
use crate::error::{CoreError, Result};
use crate::model::{InstanceDifficulty, ModelAccuracy, Split};
use crate::report::{
    AnalysisSettings, AucPoint, BinnedPoint, BinnedSeries, DifficultyReport, LogisticSeries,
    ModelSummary, PlotKind,
};

/// z-score of a two-sided 95% interval.
const Z_95: f64 = 1.96;

/// Configuration for the analysis engine.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// Plot type.
    pub plot: PlotKind,
    /// X-axis of the plot and of the AUC fit.
    pub axis: DifficultyAxis,
    /// Buckets for the binned plot.
    pub num_bins: usize,
    /// Chance-correct difficulty for tasks with this many options.
    pub num_options: Option<usize>,
    /// Split the accuracies were restricted to (recorded in the report).
    pub split: Option<Split>,
    /// Jitter seed (recorded in the report).
    pub seed: Option<u64>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            plot: PlotKind::Logistic,
            axis: DifficultyAxis::Quantile,
            num_bins: 5,
            num_options: None,
            split: None,
            seed: None,
        }
    }
}

/// The analysis engine.
pub struct AnalysisEngine {
    config: AnalysisConfig,
}

impl AnalysisEngine {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Analyze `selected` models of `task` against every model's accuracies.
    ///
    /// `params` maps model names to parameter counts for the AUC-vs-size
    /// series; models without an entry get no `log_params`.
    pub fn run<R: Rng + ?Sized>(
        &self,
        task: &str,
        per_model: &[ModelAccuracy],
        selected: &[String],
        params: &HashMap<String, f64>,
        rng: &mut R,
    ) -> Result<DifficultyReport> {
        if selected.is_empty() {
            return Err(CoreError::InvalidArgument(
                "select at least one model to analyze".into(),
            ));
        }
        let by_name: HashMap<&str, &ModelAccuracy> =
            per_model.iter().map(|m| (m.model.as_str(), m)).collect();
        let selected_accuracies = selected
            .iter()
            .map(|name| {
                by_name.get(name.as_str()).copied().ok_or_else(|| {
                    CoreError::InvalidArgument(format!("model {name} has no results for {task}"))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let exclude: HashSet<String> = selected.iter().cloned().collect();
        let per_trial = accuracy_per_trial(per_model);
        let difficulties = difficulty_per_trial(&per_trial, &exclude, self.config.num_options)?;

        let mut logistic = Vec::new();
        let mut binned = Vec::new();
        let mut auc_points = Vec::new();

        let buckets = match self.config.plot {
            PlotKind::Binned => Some(discretize(
                &difficulties,
                self.config.axis,
                self.config.num_bins,
                rng,
            )?),
            PlotKind::Logistic => None,
        };

        for accuracy in selected_accuracies {
            let correctness = accuracy.correctness_by_id();
            let curve = logistic_characteristic(&difficulties, &correctness, self.config.axis, rng)?;

            if let Some(buckets) = &buckets {
                binned.push(BinnedSeries {
                    model: accuracy.model.clone(),
                    points: binned_points(&difficulties, buckets, &correctness),
                });
            } else {
                logistic.push(logistic_series(&accuracy.model, &curve));
            }

            auc_points.push(AucPoint {
                model: accuracy.model.clone(),
                auc: auc(&curve.xs, &curve.ys)?,
                log_params: params
                    .get(&accuracy.model)
                    .filter(|p| **p > 0.0)
                    .map(|p| p.log10()),
            });
        }

        Ok(DifficultyReport {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            task: task.to_string(),
            settings: AnalysisSettings {
                models: selected.to_vec(),
                plot: self.config.plot,
                axis: self.config.axis,
                num_bins: self.config.num_bins,
                num_options: self.config.num_options,
                split: self.config.split,
                seed: self.config.seed,
            },
            instance_count: difficulties.len(),
            models: per_model
                .iter()
                .map(|m| ModelSummary {
                    model: m.model.clone(),
                    instances: m.results.len(),
                    accuracy: m.mean_accuracy(),
                })
                .collect(),
            logistic,
            binned,
            auc: auc_points,
        })
    }
}

fn logistic_series(model: &str, curve: &CharacteristicCurve) -> LogisticSeries {
    LogisticSeries {
        model: model.to_string(),
        xs: curve.xs.clone(),
        ys: curve.ys.clone(),
        intercept: curve.fit.intercept,
        slope: curve.fit.slope,
    }
}

/// Mean correctness per bucket, with a normal-approximation 95% band.
///
/// Only instances the model answered contribute. Buckets are sorted by
/// value.
pub fn binned_points(
    difficulties: &[InstanceDifficulty],
    buckets: &[f64],
    correctness: &HashMap<String, bool>,
) -> Vec<BinnedPoint> {
    // Keyed by bit pattern; bucket values are exact edges or scaled indices.
    let mut tallies: BTreeMap<u64, (f64, usize, usize)> = BTreeMap::new();
    for (d, &bucket) in difficulties.iter().zip(buckets) {
        let Some(&correct) = correctness.get(&d.id) else {
            continue;
        };
        let entry = tallies
            .entry(bucket_key(bucket))
            .or_insert((bucket, 0, 0));
        entry.1 += 1;
        entry.2 += usize::from(correct);
    }

    let mut points: Vec<BinnedPoint> = tallies
        .into_values()
        .map(|(bucket, count, correct)| {
            let mean = correct as f64 / count as f64;
            let half_width = Z_95 * (mean * (1.0 - mean) / count as f64).sqrt();
            BinnedPoint {
                bucket,
                count,
                mean,
                ci_low: (mean - half_width).max(0.0),
                ci_high: (mean + half_width).min(1.0),
            }
        })
        .collect();
    points.sort_by(|a, b| a.bucket.total_cmp(&b.bucket));
    points
}

fn bucket_key(bucket: f64) -> u64 {
    // Normalize -0.0 so it shares a bucket with 0.0.
    (bucket + 0.0).to_bits()
}
