//! Market-level allocation: places dollar demand on every compatible flight
//! between a pair of markets, whichever route it belongs to.
//!
//! Each bucket is offered in turn to the flights that still have seats. Within
//! a bucket, allocation advances from one sell-out to the next: the flight
//! that needs the fewest dollars (at its current fair share) to sell out is
//! filled, every other candidate sells the same fraction of its fair share,
//! and reputations are recomputed for the survivors before the next step.

use crate::core::reputation::ReputationModel;
use crate::domain::model::{DemandBucket, FlightCapacity, ReputationInputs};
use crate::utils::rounding::has_dollars_left;

pub struct MarketAllocator<'a> {
    model: &'a ReputationModel,
    capacities: Vec<FlightCapacity>,
    buckets: Vec<DemandBucket>,
}

impl<'a> MarketAllocator<'a> {
    pub fn new(
        model: &'a ReputationModel,
        capacities: Vec<FlightCapacity>,
        buckets: Vec<DemandBucket>,
    ) -> Self {
        Self {
            model,
            capacities,
            buckets,
        }
    }

    /// Places every bucket, in the order given, and returns all capacity
    /// records (in input order) with their final `available_seats`.
    pub fn allocate_route_dollars(mut self) -> Vec<FlightCapacity> {
        for bucket in &self.buckets {
            if bucket.is_inert() {
                continue;
            }
            let unserved = place_bucket(self.model, &mut self.capacities, bucket);
            if has_dollars_left(unserved) {
                tracing::debug!(
                    origin = %bucket.origin_key,
                    destination = %bucket.destination_key,
                    unserved,
                    "demand left unserved after all compatible flights sold out"
                );
            }
        }
        self.capacities
    }
}

fn is_candidate(capacity: &FlightCapacity, bucket: &DemandBucket) -> bool {
    !capacity.is_full() && capacity.frequencies > 0 && capacity.fare > 0.0 && bucket.matches(capacity)
}

/// Returns the dollars of `bucket` that no flight could absorb.
fn place_bucket(model: &ReputationModel, capacities: &mut [FlightCapacity], bucket: &DemandBucket) -> f64 {
    let mut candidates: Vec<usize> = capacities
        .iter()
        .enumerate()
        .filter(|(_, capacity)| is_candidate(capacity, bucket))
        .map(|(index, _)| index)
        .collect();
    let mut remaining_dollars = bucket.dollars;

    while has_dollars_left(remaining_dollars) && !candidates.is_empty() {
        // Standing is relative to whoever is still selling, so never reuse last round's scores.
        let cohort: Vec<ReputationInputs> = candidates
            .iter()
            .map(|&index| capacities[index].reputation_inputs)
            .collect();
        let reputations = model.score_cohort(&cohort);

        let total_reputation: f64 = candidates
            .iter()
            .zip(&reputations)
            .map(|(&index, reputation)| reputation * f64::from(capacities[index].frequencies))
            .sum();

        let dollars_to_fill: Vec<f64> = candidates
            .iter()
            .zip(&reputations)
            .map(|(&index, reputation)| {
                let capacity = &capacities[index];
                let share = f64::from(capacity.frequencies) * reputation / total_reputation;
                capacity.available_seats * capacity.fare / share
            })
            .collect();

        let next_exhaustion = dollars_to_fill
            .iter()
            .copied()
            .fold(remaining_dollars, f64::min);

        let mut still_selling = Vec::with_capacity(candidates.len());
        for (&index, &to_fill) in candidates.iter().zip(&dollars_to_fill) {
            let capacity = &mut capacities[index];
            if to_fill <= next_exhaustion {
                capacity.available_seats = 0.0;
            } else {
                capacity.available_seats *= 1.0 - next_exhaustion / to_fill;
                still_selling.push(index);
            }
        }
        candidates = still_selling;

        if next_exhaustion == remaining_dollars {
            remaining_dollars = 0.0;
        } else {
            remaining_dollars -= next_exhaustion;
        }
    }

    remaining_dollars.max(0.0)
}
