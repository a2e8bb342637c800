//! Empirical instance difficulty.
//!
//! Difficulty of an instance is `1 - accuracy`, where accuracy is the mean
//! correctness over every model not in the exclusion set. Excluding the models
//! being plotted keeps their own answers out of the difficulty they are
//! measured against.

use std::collections::HashSet;

use crate::accuracy::try_normalize_accuracy;
use crate::error::{CoreError, Result};
use crate::model::{InstanceDifficulty, TrialOutcomes};

/// Compute a difficulty for every composite instance.
///
/// With `num_options` set, accuracy is chance-corrected before inverting.
/// Fails with [`CoreError::InsufficientData`] if excluding models leaves an
/// instance with no outcomes.
pub fn difficulty_per_trial(
    per_trial: &[TrialOutcomes],
    exclude_models: &HashSet<String>,
    num_options: Option<usize>,
) -> Result<Vec<InstanceDifficulty>> {
    per_trial
        .iter()
        .map(|trial| {
            let (correct, total) = trial
                .outcomes
                .iter()
                .filter(|o| !exclude_models.contains(&o.model))
                .fold((0usize, 0usize), |(c, n), o| (c + usize::from(o.is_correct), n + 1));

            if total == 0 {
                return Err(CoreError::InsufficientData(format!(
                    "no models left to estimate difficulty of {} after excluding {} model(s)",
                    trial.id,
                    exclude_models.len()
                )));
            }

            let mut accuracy = correct as f64 / total as f64;
            if let Some(n) = num_options {
                accuracy = try_normalize_accuracy(accuracy, n)?;
            }

            Ok(InstanceDifficulty {
                id: trial.id.clone(),
                difficulty: 1.0 - accuracy,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accuracy::accuracy_per_trial;
    use crate::model::{InstanceResult, ModelAccuracy, ModelOutcome};

    fn trial(id: &str, outcomes: &[(&str, bool)]) -> TrialOutcomes {
        TrialOutcomes {
            id: id.into(),
            outcomes: outcomes
                .iter()
                .map(|(m, c)| ModelOutcome {
                    model: (*m).into(),
                    is_correct: *c,
                })
                .collect(),
        }
    }

    fn excluded(models: &[&str]) -> HashSet<String> {
        models.iter().map(|m| m.to_string()).collect()
    }

    #[test]
    fn mean_over_all_models() {
        let trials = vec![trial("i_0", &[("A", true), ("B", false), ("C", true)])];
        let d = difficulty_per_trial(&trials, &HashSet::new(), None).unwrap();
        assert_eq!(d[0].id, "i_0");
        assert!((d[0].difficulty - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn excluding_a_model_changes_difficulty() {
        let trials = vec![trial("i_0", &[("A", true), ("B", false), ("C", true)])];
        let d = difficulty_per_trial(&trials, &excluded(&["B"]), None).unwrap();
        assert_eq!(d[0].difficulty, 0.0);
    }

    #[test]
    fn excluding_every_model_fails() {
        let trials = vec![trial("i_0", &[("A", true), ("B", false)])];
        let err = difficulty_per_trial(&trials, &excluded(&["A", "B"]), None).unwrap_err();
        assert!(matches!(err, CoreError::InsufficientData(_)));
    }

    #[test]
    fn chance_correction() {
        let trials = vec![trial(
            "i_0",
            &[("A", true), ("B", false), ("C", false), ("D", false)],
        )];
        let d = difficulty_per_trial(&trials, &HashSet::new(), Some(4)).unwrap();
        assert!((d[0].difficulty - 1.0).abs() < 1e-12);
        assert!(difficulty_per_trial(&trials, &HashSet::new(), Some(0)).is_err());
    }

    #[test]
    fn excluded_model_never_influences_its_own_difficulty() {
        let result = |id: &str, is_correct| InstanceResult {
            id: id.into(),
            trial: 0,
            is_correct,
            expected: String::new(),
            actual: None,
        };
        let per_model = vec![
            ModelAccuracy {
                model: "self".into(),
                results: vec![result("a_0", true), result("b_0", true)],
            },
            ModelAccuracy {
                model: "other".into(),
                results: vec![result("a_0", false), result("b_0", true)],
            },
        ];
        let per_trial = accuracy_per_trial(&per_model);
        let d = difficulty_per_trial(&per_trial, &excluded(&["self"]), None).unwrap();
        assert_eq!(d[0].difficulty, 1.0);
        assert_eq!(d[1].difficulty, 0.0);
    }
}
