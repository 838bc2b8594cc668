//! Stepwise feature selection on AIC.
//!
//! Bidirectional greedy search:
//! 1. Start from the intercept-only model with `best = +∞`.
//! 2. Each round scores every forward move (add one remaining column) and
//!    every backward move (drop one selected column).
//! 3. The lowest AIC wins; ties go to the earlier move in scan order, forward
//!    moves before backward moves.
//! 4. The move is applied only if it strictly improves on `best`; otherwise the
//!    search stops.
//!
//! A dropped column returns to the end of the remaining pool and may be added
//! back later. Candidates whose fit is singular are skipped for that round.

use log::{debug, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::domain::SelectorOptions;
use crate::error::ModelError;
use crate::fit::fitter::{FeatureFrame, fit_features};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepAction {
    Add,
    Remove,
}

/// One accepted move of the search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionStep {
    pub action: StepAction,
    pub feature: String,
    pub aic: f64,
}

/// Output of a selection run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    /// Selected features in the order they were (last) added.
    pub features: Vec<String>,
    /// AIC of the accepted model; `None` when no move was ever accepted.
    pub aic: Option<f64>,
    pub steps: Vec<SelectionStep>,
    /// True when the search hit `max_steps` before converging.
    pub truncated: bool,
}

#[derive(Debug, Clone)]
struct Move {
    action: StepAction,
    feature: String,
    aic: f64,
}

/// Run the stepwise search for response `y` over `candidates` drawn from `frame`.
///
/// Only candidates with more than one distinct value in the frame enter the
/// pool.
pub fn stepwise_select(
    frame: &FeatureFrame,
    y: &[f64],
    candidates: &[String],
    opts: &SelectorOptions,
) -> Selection {
    let mut selected: Vec<String> = Vec::new();
    let mut remaining: Vec<String> = candidates
        .iter()
        .filter(|c| frame.varies(c))
        .cloned()
        .collect();
    let mut best_score = f64::INFINITY;
    let mut steps = Vec::new();
    let mut truncated = false;

    loop {
        let forward = score_forward(frame, y, &selected, &remaining);
        let backward = score_backward(frame, y, &selected);

        let Some(best_move) = pick_best(forward, backward) else {
            break;
        };
        if best_move.aic >= best_score {
            break;
        }
        if steps.len() >= opts.max_steps {
            warn!(
                "Stepwise search stopped after {} moves without converging.",
                opts.max_steps
            );
            truncated = true;
            break;
        }

        match best_move.action {
            StepAction::Add => {
                remaining.retain(|c| c != &best_move.feature);
                selected.push(best_move.feature.clone());
            }
            StepAction::Remove => {
                selected.retain(|c| c != &best_move.feature);
                remaining.push(best_move.feature.clone());
            }
        }
        debug!(
            "stepwise {:?} '{}' -> AIC {:.4}",
            best_move.action, best_move.feature, best_move.aic
        );

        best_score = best_move.aic;
        steps.push(SelectionStep {
            action: best_move.action,
            feature: best_move.feature,
            aic: best_move.aic,
        });
    }

    Selection {
        features: selected,
        aic: best_score.is_finite().then_some(best_score),
        steps,
        truncated,
    }
}

/// Score `selected ∪ {c}` for every remaining column, in pool order.
fn score_forward(frame: &FeatureFrame, y: &[f64], selected: &[String], remaining: &[String]) -> Vec<Move> {
    remaining
        .par_iter()
        .filter_map(|candidate| {
            let mut features = selected.to_vec();
            features.push(candidate.clone());
            trial_aic(frame, y, &features).map(|aic| Move {
                action: StepAction::Add,
                feature: candidate.clone(),
                aic,
            })
        })
        .collect()
}

/// Score `selected − {c}` for every selected column, in selection order.
fn score_backward(frame: &FeatureFrame, y: &[f64], selected: &[String]) -> Vec<Move> {
    selected
        .par_iter()
        .filter_map(|candidate| {
            let features: Vec<String> = selected.iter().filter(|f| *f != candidate).cloned().collect();
            trial_aic(frame, y, &features).map(|aic| Move {
                action: StepAction::Remove,
                feature: candidate.clone(),
                aic,
            })
        })
        .collect()
}

fn trial_aic(frame: &FeatureFrame, y: &[f64], features: &[String]) -> Option<f64> {
    match fit_features(frame, y, features) {
        Ok(model) => Some(model.aic),
        Err(ModelError::SingularFit { .. }) => None,
        Err(err) => {
            // Anything else means the frame and the candidate list disagree.
            warn!("Skipping trial fit: {err}");
            None
        }
    }
}

/// Lowest AIC across forward then backward moves; first wins on ties.
fn pick_best(forward: Vec<Move>, backward: Vec<Move>) -> Option<Move> {
    let mut best: Option<Move> = None;
    for m in forward.into_iter().chain(backward) {
        let better = match &best {
            None => true,
            Some(b) => m.aic < b.aic,
        };
        if better {
            best = Some(m);
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(columns: Vec<(&str, Vec<f64>)>) -> FeatureFrame {
        let n = columns[0].1.len();
        FeatureFrame::from_columns(
            n,
            columns.into_iter().map(|(k, v)| (k.to_string(), v)).collect(),
        )
        .unwrap()
    }

    fn names(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn selects_the_informative_column() {
        let x = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
        let noise = vec![0.3, -0.1, 0.4, 0.0, -0.2, 0.1, 0.5, -0.3];
        let y: Vec<f64> = x.iter().zip(&noise).map(|(a, e)| 3.0 * a + 1.0 + 0.01 * e).collect();
        let f = frame(vec![("noise", noise), ("x", x)]);

        let sel = stepwise_select(&f, &y, &names(&["noise", "x"]), &SelectorOptions::default());
        assert!(sel.features.contains(&"x".to_string()));
        assert!(!sel.truncated);
        assert_eq!(sel.steps[0].feature, "x");
        assert_eq!(sel.steps[0].action, StepAction::Add);
    }

    #[test]
    fn accepted_aic_strictly_decreases() {
        let a = vec![1.0, 3.0, 2.0, 5.0, 4.0, 6.0, 8.0, 7.0, 9.0, 10.0];
        let b = vec![2.0, 1.0, 4.0, 3.0, 6.0, 5.0, 7.0, 9.0, 8.0, 11.0];
        let c = vec![0.5, 0.1, 0.9, 0.3, 0.7, 0.2, 0.8, 0.4, 0.6, 0.0];
        let y: Vec<f64> = (0..10).map(|i| 2.0 * a[i] - b[i] + 0.3 * c[i]).collect();
        let f = frame(vec![("a", a), ("b", b), ("c", c)]);

        let sel = stepwise_select(&f, &y, &names(&["a", "b", "c"]), &SelectorOptions::default());
        for pair in sel.steps.windows(2) {
            assert!(pair[1].aic < pair[0].aic);
        }
        assert_eq!(sel.aic, sel.steps.last().map(|s| s.aic));
    }

    #[test]
    fn constant_candidates_give_empty_selection() {
        let f = frame(vec![("flat", vec![2.0, 2.0, 2.0]), ("zero", vec![0.0, 0.0, 0.0])]);
        let sel = stepwise_select(&f, &[1.0, 2.0, 3.0], &names(&["flat", "zero"]), &SelectorOptions::default());
        assert!(sel.features.is_empty());
        assert!(sel.steps.is_empty());
        assert_eq!(sel.aic, None);
    }

    #[test]
    fn collinear_candidate_is_skipped_not_fatal() {
        let x = vec![1.0, 2.0, 3.0, 4.0, 5.0, 7.0];
        let twice: Vec<f64> = x.iter().map(|v| v * 2.0).collect();
        let y: Vec<f64> = x.iter().map(|v| 4.0 * v - 2.0).collect();
        let f = frame(vec![("x", x), ("twice", twice)]);

        let sel = stepwise_select(&f, &y, &names(&["x", "twice"]), &SelectorOptions::default());
        assert_eq!(sel.features.len(), 1);
    }

    #[test]
    fn ties_go_to_the_first_forward_candidate() {
        let x = vec![1.0, 2.0, 3.0, 4.0, 6.0];
        let y = vec![2.0, 3.5, 6.5, 8.0, 12.5];
        let f = frame(vec![("first", x.clone()), ("second", x)]);

        let sel = stepwise_select(&f, &y, &names(&["first", "second"]), &SelectorOptions::default());
        assert_eq!(sel.steps[0].feature, "first");
    }

    #[test]
    fn max_steps_truncates() {
        let x = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let y = vec![1.1, 2.3, 2.9, 4.2, 5.0];
        let f = frame(vec![("x", x)]);

        let sel = stepwise_select(&f, &y, &names(&["x"]), &SelectorOptions { max_steps: 0 });
        assert!(sel.truncated);
        assert!(sel.features.is_empty());
    }

    #[test]
    fn backward_step_drops_a_superseded_column() {
        // y = b + c exactly; `a` is a noisy stand-in for `b` that enters first.
        let a = vec![2.0, 1.1, 3.8, 3.35, 4.0, 6.85, 6.3, 8.6];
        let b = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
        let c = vec![1.0, -1.0, 1.0, -1.0, -1.0, 1.0, -1.0, 1.0];
        let y: Vec<f64> = b.iter().zip(&c).map(|(b, c)| b + c).collect();
        let f = frame(vec![("a", a), ("b", b), ("c", c)]);

        let sel = stepwise_select(&f, &y, &names(&["a", "b", "c"]), &SelectorOptions::default());
        let moves: Vec<(StepAction, &str)> = sel.steps.iter().map(|s| (s.action, s.feature.as_str())).collect();
        assert_eq!(
            moves,
            vec![
                (StepAction::Add, "a"),
                (StepAction::Add, "c"),
                (StepAction::Add, "b"),
                (StepAction::Remove, "a"),
            ]
        );
        assert_eq!(sel.features, names(&["c", "b"]));
        assert!(!sel.truncated);
        // Both exact fits sit on the floor, so dropping `a` saves one parameter.
        assert!((sel.steps[2].aic - sel.steps[3].aic - 2.0).abs() < 1e-6);
    }

    #[test]
    fn selection_is_deterministic() {
        let a = vec![3.0, 1.0, 4.0, 1.5, 5.0, 9.0, 2.0, 6.0];
        let b = vec![2.0, 7.0, 1.0, 8.0, 2.5, 8.5, 1.0, 8.0];
        let y: Vec<f64> = (0..8).map(|i| a[i] + 0.5 * b[i] + (i as f64 * 0.37).sin()).collect();
        let f = frame(vec![("a", a), ("b", b)]);
        let cands = names(&["a", "b"]);

        let first = stepwise_select(&f, &y, &cands, &SelectorOptions::default());
        let second = stepwise_select(&f, &y, &cands, &SelectorOptions::default());
        assert_eq!(first, second);
    }
}
