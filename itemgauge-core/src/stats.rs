//! Aggregate quality statistics over ensemble score tensors
//!
//! Three batch-level scalars, each one a different lens on item quality:
//!
//! - **Unanswerability** — expected predictive entropy of the assessment
//!   cohort. Entropy is computed per model and then averaged ("average of
//!   entropies"), not computed on an averaged distribution: the entropy of
//!   an averaged distribution mixes in ensemble disagreement, while the
//!   expected entropy measures mean per-model uncertainty.
//! - **Ensemble agreement** — fraction of records where the assessment and
//!   prediction cohorts pick the same option from their group-mean logits.
//!   A proxy for answerability, not ground-truth correctness.
//! - **Complexity** — expected value of a fixed ordinal weighting over the
//!   ensemble-mean difficulty distribution.
//!
//! All three require the full tensor up front; there is no streaming form.
//! Shape and emptiness are enforced when the tensors are built
//! ([`crate::ensemble`]), so these functions are total over their inputs.

use ndarray::{Array1, ArrayView1, Axis};

use crate::ensemble::{ComplexityEnsemble, ModelGroup, QaEnsemble, NUM_COMPLEXITY_CLASSES};

/// Smoothing constant guarding `ln(0)` in the entropy sum. Not a
/// probability-mass adjustment: the distribution is never renormalized.
pub const ENTROPY_EPSILON: f64 = 1e-10;

/// Ordinal value of each difficulty bucket. With these weights the
/// complexity score is bounded to `[0, 1]`.
pub const ORDINAL_WEIGHTS: [f64; NUM_COMPLEXITY_CLASSES] = [0.0, 0.5, 1.0];

/// Numerically stable softmax over one logit row.
fn softmax(row: ArrayView1<f64>) -> Array1<f64> {
    let max = row.fold(f64::NEG_INFINITY, |acc, &v| acc.max(v));
    let exps = row.mapv(|v| (v - max).exp());
    let sum = exps.sum();
    exps / sum
}

/// Shannon entropy of one probability row, in nats.
fn entropy(probs: &Array1<f64>) -> f64 {
    -probs
        .iter()
        .map(|&p| p * (p + ENTROPY_EPSILON).ln())
        .sum::<f64>()
}

/// First index of the row maximum (ties break toward the lower index).
fn argmax(row: ArrayView1<f64>) -> usize {
    let mut best = 0;
    let mut best_value = row[0];
    for (i, &v) in row.iter().enumerate().skip(1) {
        if v > best_value {
            best = i;
            best_value = v;
        }
    }
    best
}

/// Mean expected entropy of the assessment cohort across the batch.
///
/// Per assessment model and record: softmax the four option logits and take
/// the Shannon entropy. Average over the cohort per record, then over
/// records. Bounded to `[0, ln 4]` per record; higher means the cohort
/// found items harder to answer confidently.
pub fn unanswerability(ensemble: &QaEnsemble) -> f64 {
    let members = ensemble.group_members(ModelGroup::Assessment);
    let records = ensemble.num_records();

    let mut entropy_sums = vec![0.0; records];
    for &model in &members {
        let per_model = ensemble.logits().index_axis(Axis(0), model);
        for (record, row) in per_model.axis_iter(Axis(0)).enumerate() {
            let probs = softmax(row);
            entropy_sums[record] += entropy(&probs);
        }
    }

    let per_record_mean = members.len() as f64;
    let total: f64 = entropy_sums.iter().map(|h| h / per_record_mean).sum();
    total / records as f64
}

/// Fraction of records where the assessment and prediction cohorts agree on
/// the argmax option of their group-mean logits.
pub fn ensemble_agreement(ensemble: &QaEnsemble) -> f64 {
    let assess = ensemble.group_mean_logits(ModelGroup::Assessment);
    let predict = ensemble.group_mean_logits(ModelGroup::Prediction);
    let records = ensemble.num_records();

    let mut agreeing = 0usize;
    for record in 0..records {
        if argmax(assess.row(record)) == argmax(predict.row(record)) {
            agreeing += 1;
        }
    }
    agreeing as f64 / records as f64
}

/// Batch-mean expected ordinal difficulty.
///
/// Softmax each model's three-class logits, average the probabilities over
/// the cohort per record, weight by [`ORDINAL_WEIGHTS`], and average the
/// per-record expectations.
pub fn complexity(ensemble: &ComplexityEnsemble) -> f64 {
    let models = ensemble.num_models();
    let records = ensemble.num_records();

    let mut total = 0.0;
    for record in 0..records {
        let mut mean_probs = Array1::<f64>::zeros(NUM_COMPLEXITY_CLASSES);
        for model in 0..models {
            let per_model = ensemble.logits().index_axis(Axis(0), model);
            mean_probs += &softmax(per_model.row(record));
        }
        mean_probs /= models as f64;

        let expected: f64 = mean_probs
            .iter()
            .zip(ORDINAL_WEIGHTS)
            .map(|(&p, weight)| p * weight)
            .sum();
        total += expected;
    }
    total / records as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ensemble::conventional_groups;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    /// Six QA models, every row peaked at `peak` with the given margin.
    fn peaked_qa(records: usize, peak: usize, margin: f64) -> QaEnsemble {
        let mut row = vec![0.0; 4];
        row[peak] = margin;
        let nested = vec![vec![row; records]; 6];
        QaEnsemble::from_nested(&nested, conventional_groups(6, 3).unwrap()).unwrap()
    }

    #[test]
    fn uniform_logits_hit_maximum_entropy() {
        let ensemble = peaked_qa(3, 0, 0.0);
        let score = unanswerability(&ensemble);
        assert_abs_diff_eq!(score, (4.0_f64).ln(), epsilon = 1e-6);
    }

    #[test]
    fn confident_logits_hit_near_zero_entropy() {
        let ensemble = peaked_qa(3, 2, 50.0);
        let score = unanswerability(&ensemble);
        assert_abs_diff_eq!(score, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn entropy_stays_within_bounds_for_arbitrary_logits() {
        let nested: Vec<Vec<Vec<f64>>> = (0..6)
            .map(|m| {
                (0..5)
                    .map(|r| {
                        (0..4)
                            .map(|c| ((m * 31 + r * 7 + c * 3) % 13) as f64 - 6.0)
                            .collect()
                    })
                    .collect()
            })
            .collect();
        let ensemble =
            QaEnsemble::from_nested(&nested, conventional_groups(6, 3).unwrap()).unwrap();
        let score = unanswerability(&ensemble);
        assert!(score >= 0.0);
        assert!(score <= (4.0_f64).ln() + 1e-9);
    }

    #[test]
    fn entropy_averages_per_model_before_records() {
        // One certain assessment model and one uniform assessment model: the
        // expected entropy is the mean of ~0 and ln 4, not the entropy of
        // the mixed (averaged) distribution.
        let nested = vec![
            vec![vec![50.0, 0.0, 0.0, 0.0]; 2],
            vec![vec![0.0, 0.0, 0.0, 0.0]; 2],
            vec![vec![1.0, 1.0, 1.0, 1.0]; 2],
        ];
        let groups = vec![
            ModelGroup::Assessment,
            ModelGroup::Assessment,
            ModelGroup::Prediction,
        ];
        let ensemble = QaEnsemble::from_nested(&nested, groups).unwrap();
        let expected = (0.0 + (4.0_f64).ln()) / 2.0;
        assert_abs_diff_eq!(unanswerability(&ensemble), expected, epsilon = 1e-6);
    }

    #[test]
    fn agreement_is_one_when_cohorts_match_everywhere() {
        let ensemble = peaked_qa(7, 2, 10.0);
        assert_eq!(ensemble_agreement(&ensemble), 1.0);
    }

    #[test]
    fn agreement_is_zero_when_cohorts_disagree_everywhere() {
        let records = 4;
        let mut nested = Vec::new();
        for model in 0..6 {
            let peak = if model < 3 { 1 } else { 3 };
            let mut row = vec![0.0; 4];
            row[peak] = 10.0;
            nested.push(vec![row; records]);
        }
        let ensemble =
            QaEnsemble::from_nested(&nested, conventional_groups(6, 3).unwrap()).unwrap();
        assert_eq!(ensemble_agreement(&ensemble), 0.0);
    }

    #[test]
    fn agreement_counts_partial_matches() {
        // Record 0: both cohorts peak at 0. Record 1: assessment peaks at 0,
        // prediction at 1.
        let assess_rows = vec![vec![5.0, 0.0, 0.0, 0.0], vec![5.0, 0.0, 0.0, 0.0]];
        let predict_rows = vec![vec![5.0, 0.0, 0.0, 0.0], vec![0.0, 5.0, 0.0, 0.0]];
        let nested = vec![
            assess_rows.clone(),
            assess_rows.clone(),
            assess_rows,
            predict_rows.clone(),
            predict_rows.clone(),
            predict_rows,
        ];
        let ensemble =
            QaEnsemble::from_nested(&nested, conventional_groups(6, 3).unwrap()).unwrap();
        assert_abs_diff_eq!(ensemble_agreement(&ensemble), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn complexity_matches_the_ordinal_extremes() {
        let cases = [
            (vec![50.0, 0.0, 0.0], 0.0),
            (vec![0.0, 50.0, 0.0], 0.5),
            (vec![0.0, 0.0, 50.0], 1.0),
        ];
        for (row, expected) in cases {
            let nested = vec![vec![row; 4]; 3];
            let ensemble = ComplexityEnsemble::from_nested(&nested).unwrap();
            assert_abs_diff_eq!(complexity(&ensemble), expected, epsilon = 1e-6);
        }
    }

    #[test]
    fn complexity_averages_model_probabilities_before_weighting() {
        // One model certain of class 0, one certain of class 2: the mean
        // distribution is [0.5, 0, 0.5], giving an expectation of 0.5.
        let nested = vec![
            vec![vec![50.0, 0.0, 0.0]; 2],
            vec![vec![0.0, 0.0, 50.0]; 2],
        ];
        let ensemble = ComplexityEnsemble::from_nested(&nested).unwrap();
        assert_abs_diff_eq!(complexity(&ensemble), 0.5, epsilon = 1e-6);
    }

    #[test]
    fn softmax_is_stable_for_large_logits() {
        let probs = softmax(array![1000.0, 999.0, 998.0, 997.0].view());
        assert!(probs.iter().all(|p| p.is_finite()));
        assert_abs_diff_eq!(probs.sum(), 1.0, epsilon = 1e-12);
        assert!(probs[0] > probs[1]);
    }

    #[test]
    fn argmax_breaks_ties_toward_the_lower_index() {
        assert_eq!(argmax(array![1.0, 3.0, 3.0, 0.0].view()), 1);
    }
}
