//! Reputation scoring of flights relative to the flights they compete with.
//!
//! A score is not intrinsic to a flight: each attribute is rescaled against
//! the range spanned by the current cohort, so the same flight scores
//! differently once competitors drop out.

use crate::domain::model::ReputationInputs;
use serde::{Deserialize, Serialize};

pub const REPUTATION_FLOOR: f64 = 1.0;
pub const REPUTATION_CEILING: f64 = 2.0;

const DEGENERATE_RANGE: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReputationWeights {
    pub service_quality: f64,
    pub seat_comfort: f64,
}

impl Default for ReputationWeights {
    fn default() -> Self {
        Self {
            service_quality: 0.1,
            seat_comfort: 0.9,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ReputationModel {
    weights: ReputationWeights,
}

impl ReputationModel {
    pub fn new(weights: ReputationWeights) -> Self {
        Self { weights }
    }

    /// Scores `inputs` against `cohort`. The scored flight always counts as
    /// part of the range, whether or not the cohort contains it.
    pub fn score(&self, inputs: &ReputationInputs, cohort: &[ReputationInputs]) -> f64 {
        let service = Range::spanning(inputs.service_quality, cohort.iter().map(|c| c.service_quality));
        let comfort = Range::spanning(inputs.seat_comfort, cohort.iter().map(|c| c.seat_comfort));

        let score = self.weights.service_quality * service.rescale(inputs.service_quality)
            + self.weights.seat_comfort * comfort.rescale(inputs.seat_comfort);
        score.clamp(REPUTATION_FLOOR, REPUTATION_CEILING)
    }

    /// Scores every member of the cohort against the cohort itself.
    pub fn score_cohort(&self, cohort: &[ReputationInputs]) -> Vec<f64> {
        cohort.iter().map(|inputs| self.score(inputs, cohort)).collect()
    }
}

struct Range {
    min: f64,
    max: f64,
}

impl Range {
    fn spanning(value: f64, others: impl Iterator<Item = f64>) -> Self {
        others.fold(Range { min: value, max: value }, |range, v| Range {
            min: range.min.min(v),
            max: range.max.max(v),
        })
    }

    fn rescale(&self, value: f64) -> f64 {
        let span = self.max - self.min;
        if span <= DEGENERATE_RANGE {
            return (REPUTATION_FLOOR + REPUTATION_CEILING) / 2.0;
        }
        REPUTATION_FLOOR + (value - self.min) / span * (REPUTATION_CEILING - REPUTATION_FLOOR)
    }
}
