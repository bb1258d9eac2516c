//! Data-driven attribution: a logistic regression on journey features whose
//! coefficient magnitudes become channel credit.
//!
//! Features per journey: one-hot channel presence (channels sorted by tag),
//! touchpoint count, duration in days. Columns are z-scored before fitting
//! so coefficient magnitudes are comparable.

use insight_core::{CampaignId, Channel};
use ndarray::{Array1, Array2, Axis};
use std::collections::{BTreeMap, BTreeSet};

use crate::journey::CustomerJourney;

const EPOCHS: usize = 1_000;
const LEARNING_RATE: f64 = 0.5;
/// Ridge strength, `1 / C` with `C = 1.0`.
const L2_PENALTY: f64 = 1.0;

pub(crate) struct FeatureMatrix {
    pub x: Array2<f64>,
    pub y: Array1<f64>,
    pub channels: Vec<Channel>,
}

pub(crate) fn prepare_features(journeys: &[CustomerJourney]) -> FeatureMatrix {
    let channels: Vec<Channel> = journeys
        .iter()
        .flat_map(|j| j.unique_channels())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let cols = channels.len() + 2;
    let mut x = Array2::<f64>::zeros((journeys.len(), cols));
    let mut y = Array1::<f64>::zeros(journeys.len());

    for (row, journey) in journeys.iter().enumerate() {
        let present = journey.unique_channels();
        for (col, channel) in channels.iter().enumerate() {
            if present.contains(channel) {
                x[[row, col]] = 1.0;
            }
        }
        x[[row, channels.len()]] = journey.touchpoint_count() as f64;
        x[[row, channels.len() + 1]] = journey.duration_days() as f64;
        y[row] = if journey.is_converted() { 1.0 } else { 0.0 };
    }

    FeatureMatrix { x, y, channels }
}

/// Z-score every column; constant columns become all zeros.
fn standardize(x: &Array2<f64>) -> Array2<f64> {
    let mut out = x.clone();
    let means = x.mean_axis(Axis(0)).unwrap_or_else(|| Array1::zeros(x.ncols()));
    let stds = x.std_axis(Axis(0), 0.0);
    for (col, mut column) in out.axis_iter_mut(Axis(1)).enumerate() {
        let std = stds[col];
        if std > 0.0 {
            column.mapv_inplace(|v| (v - means[col]) / std);
        } else {
            column.fill(0.0);
        }
    }
    out
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

/// L2-regularized binary logistic regression fitted by batch gradient descent.
#[derive(Debug, Clone)]
pub struct LogisticRegression {
    weights: Array1<f64>,
    bias: f64,
}

impl LogisticRegression {
    pub fn fit(x: &Array2<f64>, y: &Array1<f64>) -> Self {
        let n = x.nrows().max(1) as f64;
        let mut weights = Array1::<f64>::zeros(x.ncols());
        let mut bias = 0.0;

        for _ in 0..EPOCHS {
            let predictions = (x.dot(&weights) + bias).mapv(sigmoid);
            let residual = &predictions - y;
            let grad_w = x.t().dot(&residual) / n + &weights * (L2_PENALTY / n);
            let grad_b = residual.sum() / n;
            weights.scaled_add(-LEARNING_RATE, &grad_w);
            bias -= LEARNING_RATE * grad_b;
        }

        Self { weights, bias }
    }

    pub fn predict_proba(&self, x: &Array2<f64>) -> Array1<f64> {
        (x.dot(&self.weights) + self.bias).mapv(sigmoid)
    }

    /// Fraction of rows classified correctly at the 0.5 cut-off.
    pub fn accuracy(&self, x: &Array2<f64>, y: &Array1<f64>) -> f64 {
        if y.is_empty() {
            return 0.0;
        }
        let correct = self
            .predict_proba(x)
            .iter()
            .zip(y.iter())
            .filter(|(p, label)| (**p >= 0.5) == (**label >= 0.5))
            .count();
        correct as f64 / y.len() as f64
    }

    pub fn coefficients(&self) -> &Array1<f64> {
        &self.weights
    }
}

pub(crate) struct DataDrivenFit {
    /// Unnormalized `|coefficient|` per channel.
    pub channel_importance: BTreeMap<Channel, f64>,
    /// Equal weight per campaign seen anywhere in the data.
    pub campaign_weights: BTreeMap<CampaignId, f64>,
    pub training_accuracy: f64,
}

/// Fit the model, or `None` when the labels are all one class or no
/// channel features exist.
pub(crate) fn fit(journeys: &[CustomerJourney]) -> Option<DataDrivenFit> {
    let features = prepare_features(journeys);
    let positives = features.y.iter().filter(|v| **v > 0.5).count();
    if features.channels.is_empty() || positives == 0 || positives == features.y.len() {
        return None;
    }

    let x = standardize(&features.x);
    let model = LogisticRegression::fit(&x, &features.y);
    let training_accuracy = model.accuracy(&x, &features.y);

    let mut channel_importance: BTreeMap<Channel, f64> = features
        .channels
        .iter()
        .enumerate()
        .map(|(i, channel)| (*channel, model.coefficients()[i].abs()))
        .collect();
    if channel_importance.values().sum::<f64>() <= 0.0 {
        channel_importance.values_mut().for_each(|v| *v = 1.0);
    }

    let campaign_weights = journeys
        .iter()
        .flat_map(|j| j.touchpoints().iter().map(|tp| (tp.campaign.clone(), 1.0)))
        .collect();

    Some(DataDrivenFit {
        channel_importance,
        campaign_weights,
        training_accuracy,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::journey::Touchpoint;
    use chrono::{Duration, Utc};

    fn journeys() -> Vec<CustomerJourney> {
        let now = Utc::now();
        (0..120)
            .map(|i| {
                let mut tps = vec![Touchpoint::new(now - Duration::days(10), Channel::Display, "d", 1.0, "c")];
                // Email strongly predicts conversion in this data set.
                let converted = i % 2 == 0;
                if converted {
                    tps.push(Touchpoint::new(now - Duration::days(2), Channel::Email, "e", 1.0, "c"));
                    CustomerJourney::converted(format!("c{i}"), tps, 50.0, now).unwrap()
                } else {
                    if i % 3 == 0 {
                        tps.push(Touchpoint::new(now - Duration::days(2), Channel::Email, "e", 1.0, "c"));
                    }
                    CustomerJourney::unconverted(format!("c{i}"), tps)
                }
            })
            .collect()
    }

    #[test]
    fn test_feature_layout() {
        let features = prepare_features(&journeys());
        assert_eq!(features.channels, vec![Channel::Email, Channel::Display]);
        assert_eq!(features.x.ncols(), 4);
        assert_eq!(features.x.nrows(), 120);
        assert_eq!(features.x[[0, 0]], 1.0);
        assert_eq!(features.y[0], 1.0);
        assert_eq!(features.y[1], 0.0);
    }

    #[test]
    fn test_predictive_channel_gets_more_credit() {
        let fit = fit(&journeys()).unwrap();
        assert!(fit.channel_importance[&Channel::Email] > fit.channel_importance[&Channel::Display]);
        assert!(fit.training_accuracy > 0.6);
    }

    #[test]
    fn test_single_class_does_not_fit() {
        let only_unconverted: Vec<_> = journeys().into_iter().filter(|j| !j.is_converted()).collect();
        assert!(fit(&only_unconverted).is_none());
    }
}
