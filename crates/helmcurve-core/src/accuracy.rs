//! Per-instance accuracy aggregation.

use std::collections::HashMap;

use crate::error::{CoreError, Result};
use crate::evaluator::Evaluator;
use crate::model::{
    InstanceResult, ModelAccuracies, ModelAccuracy, ModelOutcome, Response, Split, TrialOutcomes,
};

/// Score every response of one model on one task.
///
/// When `split` is given, results for instances from other splits are
/// dropped. Output order follows input order.
pub fn instance_accuracy(
    responses: &[Response],
    task_name: &str,
    split: Option<Split>,
) -> Result<Vec<InstanceResult>> {
    let evaluator = Evaluator::for_task(task_name, responses);

    let mut results = Vec::with_capacity(responses.len());
    for response in responses {
        let scored = evaluator.score(response)?;
        if let Some(wanted) = split {
            if response.instance.split != Some(wanted) {
                continue;
            }
        }
        results.push(InstanceResult {
            id: response.composite_id(),
            trial: response.train_trial_index,
            is_correct: scored.is_correct,
            expected: scored.expected,
            actual: scored.actual,
        });
    }
    Ok(results)
}

/// Score every model on one task.
pub fn accuracy_per_model<'a, I>(
    per_model_responses: I,
    task_name: &str,
    split: Option<Split>,
) -> Result<ModelAccuracies>
where
    I: IntoIterator<Item = (&'a str, &'a [Response])>,
{
    per_model_responses
        .into_iter()
        .map(|(model, responses)| {
            Ok(ModelAccuracy {
                model: model.to_string(),
                results: instance_accuracy(responses, task_name, split)?,
            })
        })
        .collect()
}

/// Regroup per-model results by composite instance id.
///
/// Groups appear in order of first occurrence; within a group, outcomes
/// follow the model order of the input.
pub fn accuracy_per_trial(per_model: &[ModelAccuracy]) -> Vec<TrialOutcomes> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut grouped: Vec<TrialOutcomes> = Vec::new();

    for model in per_model {
        for result in &model.results {
            let slot = *index.entry(result.id.as_str()).or_insert_with(|| {
                grouped.push(TrialOutcomes {
                    id: result.id.clone(),
                    outcomes: Vec::new(),
                });
                grouped.len() - 1
            });
            grouped[slot].outcomes.push(ModelOutcome {
                model: model.model.clone(),
                is_correct: result.is_correct,
            });
        }
    }

    grouped
}

/// Rescale accuracy so that uniform guessing among `num_options` choices
/// scores zero: `(accuracy - 1/n) * n`. Below-chance values go negative.
pub fn normalize_accuracy(accuracy: f64, num_options: usize) -> f64 {
    let n = num_options as f64;
    (accuracy - 1.0 / n) * n
}

/// Checked variant of [`normalize_accuracy`] rejecting `num_options == 0`.
pub fn try_normalize_accuracy(accuracy: f64, num_options: usize) -> Result<f64> {
    if num_options == 0 {
        return Err(CoreError::InvalidArgument(
            "num_options must be at least 1".into(),
        ));
    }
    Ok(normalize_accuracy(accuracy, num_options))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::tests::response;

    fn result(id: &str, is_correct: bool) -> InstanceResult {
        InstanceResult {
            id: id.into(),
            trial: 0,
            is_correct,
            expected: String::new(),
            actual: None,
        }
    }

    #[test]
    fn instance_accuracy_builds_composite_ids() {
        let mut second = response("q2", "b", "nope");
        second.train_trial_index = 1;
        let responses = vec![response("q1", "a", "a"), second];

        let results = instance_accuracy(&responses, "dyck", None).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].id, "q1_0");
        assert!(results[0].is_correct);
        assert_eq!(results[1].id, "q2_1");
        assert_eq!(results[1].trial, 1);
        assert!(!results[1].is_correct);
    }

    #[test]
    fn instance_accuracy_filters_split() {
        let mut valid = response("q2", "b", "b");
        valid.instance.split = Some(Split::Valid);
        let responses = vec![response("q1", "a", "a"), valid];

        let test_only = instance_accuracy(&responses, "dyck", Some(Split::Test)).unwrap();
        assert_eq!(test_only.len(), 1);
        assert_eq!(test_only[0].id, "q1_0");

        let valid_only = instance_accuracy(&responses, "dyck", Some(Split::Valid)).unwrap();
        assert_eq!(valid_only.len(), 1);
        assert_eq!(valid_only[0].id, "q2_0");
    }

    #[test]
    fn instance_accuracy_propagates_integrity_errors() {
        let mut bad = response("q1", "a", "a");
        bad.result.completions.clear();
        let err = instance_accuracy(&[bad], "dyck", None).unwrap_err();
        assert!(matches!(err, CoreError::DataIntegrity { .. }));
    }

    #[test]
    fn per_trial_regroups_models() {
        let per_model = vec![
            ModelAccuracy {
                model: "A".into(),
                results: vec![result("x_0", true), result("y_0", false)],
            },
            ModelAccuracy {
                model: "B".into(),
                results: vec![result("y_0", true), result("x_0", false)],
            },
        ];
        let grouped = accuracy_per_trial(&per_model);
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[0].id, "x_0");
        assert_eq!(
            grouped[0].outcomes,
            vec![
                ModelOutcome { model: "A".into(), is_correct: true },
                ModelOutcome { model: "B".into(), is_correct: false },
            ]
        );
        assert_eq!(grouped[1].id, "y_0");
        assert_eq!(grouped[1].outcomes.len(), 2);
    }

    #[test]
    fn normalize_accuracy_values() {
        assert!((normalize_accuracy(0.25, 4) - 0.0).abs() < 1e-12);
        assert!((normalize_accuracy(1.0, 4) - 3.0).abs() < 1e-12);
        assert!((normalize_accuracy(0.0, 2) - -1.0).abs() < 1e-12);
        assert!(try_normalize_accuracy(0.5, 0).is_err());
    }
}
