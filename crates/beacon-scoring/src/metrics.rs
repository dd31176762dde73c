//! Validation metrics.

use serde::{Deserialize, Serialize};

/// Decision threshold for turning a probability into a predicted class.
pub const CLASSIFICATION_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegressionMetrics {
    pub mae: f64,
    pub rmse: f64,
    pub r2: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassificationMetrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub roc_auc: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Scores {
    Regression(RegressionMetrics),
    Classification(ClassificationMetrics),
}

impl Scores {
    /// One-line form for progress output.
    pub fn summary(&self) -> String {
        match self {
            Self::Regression(m) => format!("r2={:.3} mae={:.2} rmse={:.2}", m.r2, m.mae, m.rmse),
            Self::Classification(m) => format!(
                "accuracy={:.3} f1={:.3} roc_auc={:.3}",
                m.accuracy, m.f1, m.roc_auc
            ),
        }
    }
}

/// Metrics recorded with every artifact.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrainingMetrics {
    pub train_examples: usize,
    pub validation_examples: usize,
    #[serde(flatten)]
    pub scores: Scores,
}

impl TrainingMetrics {
    /// Validation R² for regression kinds.
    pub fn r2(&self) -> Option<f64> {
        match self.scores {
            Scores::Regression(m) => Some(m.r2),
            Scores::Classification(_) => None,
        }
    }
}

/// `None` when the actual values have zero variance (R² undefined).
pub fn regression(actual: &[f64], predicted: &[f64]) -> Option<RegressionMetrics> {
    let n = actual.len();
    if n == 0 || n != predicted.len() {
        return None;
    }
    let mean = actual.iter().sum::<f64>() / n as f64;
    let ss_tot: f64 = actual.iter().map(|a| (a - mean).powi(2)).sum();
    if ss_tot <= f64::EPSILON {
        return None;
    }
    let ss_res: f64 = actual.iter().zip(predicted).map(|(a, p)| (a - p).powi(2)).sum();
    let mae = actual.iter().zip(predicted).map(|(a, p)| (a - p).abs()).sum::<f64>() / n as f64;

    Some(RegressionMetrics { mae, rmse: (ss_res / n as f64).sqrt(), r2: 1.0 - ss_res / ss_tot })
}

/// `None` unless both classes are present (precision/recall/AUC undefined).
pub fn classification(actual: &[bool], probabilities: &[f64]) -> Option<ClassificationMetrics> {
    let n = actual.len();
    if n == 0 || n != probabilities.len() {
        return None;
    }
    let positives = actual.iter().filter(|&&a| a).count();
    if positives == 0 || positives == n {
        return None;
    }

    let (mut tp, mut fp, mut tn, mut fn_) = (0usize, 0usize, 0usize, 0usize);
    for (&a, &p) in actual.iter().zip(probabilities) {
        match (a, p >= CLASSIFICATION_THRESHOLD) {
            (true, true) => tp += 1,
            (false, true) => fp += 1,
            (false, false) => tn += 1,
            (true, false) => fn_ += 1,
        }
    }

    let ratio = |num: usize, den: usize| if den == 0 { 0.0 } else { num as f64 / den as f64 };
    let precision = ratio(tp, tp + fp);
    let recall = ratio(tp, tp + fn_);
    let f1 = if precision + recall == 0.0 { 0.0 } else { 2.0 * precision * recall / (precision + recall) };

    Some(ClassificationMetrics {
        accuracy: ratio(tp + tn, n),
        precision,
        recall,
        f1,
        roc_auc: roc_auc(actual, probabilities, positives),
    })
}

/// Mann-Whitney rank statistic; tied scores share their average rank.
fn roc_auc(actual: &[bool], scores: &[f64], positives: usize) -> f64 {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[a].total_cmp(&scores[b]));

    let mut ranks = vec![0.0; scores.len()];
    let mut i = 0;
    while i < order.len() {
        let mut j = i;
        while j + 1 < order.len() && scores[order[j + 1]] == scores[order[i]] {
            j += 1;
        }
        let avg_rank = (i + j) as f64 / 2.0 + 1.0;
        for &idx in &order[i..=j] {
            ranks[idx] = avg_rank;
        }
        i = j + 1;
    }

    let negatives = actual.len() - positives;
    let positive_rank_sum: f64 = actual.iter().zip(&ranks).filter(|(a, _)| **a).map(|(_, r)| r).sum();
    let p = positives as f64;
    (positive_rank_sum - p * (p + 1.0) / 2.0) / (p * negatives as f64)
}
