use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::ops::Range;
use tracing::warn;

use crate::data::types::Record;

/// Draw that leaves a record's base value unchanged.
pub const NEUTRAL_DRAW: Draw = Draw { offset: 0, multiplier: 1 };

/// Additive offset range for the adjusted value.
pub const OFFSET_RANGE: Range<u32> = 0..100;
/// Multiplier range for the depletion value.
pub const MULTIPLIER_RANGE: Range<u32> = 1..5;

/// One record's share of a tick's random draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Draw {
    pub offset: u32,
    pub multiplier: u32,
}

/// Source of per-tick perturbations.
///
/// `draw_batch` is called exactly once per tick and must return `len` draws,
/// one per record, with `offset` in [`OFFSET_RANGE`] and `multiplier` in
/// [`MULTIPLIER_RANGE`].
pub trait VariationSource: Send {
    fn draw_batch(&mut self, len: usize) -> Vec<Draw>;
}

/// Production source backed by a `rand` generator.
pub struct RngVariation<R = StdRng> {
    rng: R,
}

impl RngVariation<StdRng> {
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl<R: Rng + Send> VariationSource for RngVariation<R> {
    fn draw_batch(&mut self, len: usize) -> Vec<Draw> {
        // Column-wise: all offsets first, then all multipliers
        let offsets: Vec<u32> = (0..len).map(|_| self.rng.gen_range(OFFSET_RANGE)).collect();
        let multipliers: Vec<u32> = (0..len).map(|_| self.rng.gen_range(MULTIPLIER_RANGE)).collect();

        offsets
            .into_iter()
            .zip(multipliers)
            .map(|(offset, multiplier)| Draw { offset, multiplier })
            .collect()
    }
}

/// Replays a fixed sequence of draws, cycling when exhausted.
#[derive(Debug, Clone)]
pub struct FixedVariation {
    draws: Vec<Draw>,
    cursor: usize,
}

impl FixedVariation {
    pub fn new(draws: Vec<Draw>) -> Self {
        Self { draws, cursor: 0 }
    }

    /// Every record gets the same draw on every tick.
    pub fn constant(offset: u32, multiplier: u32) -> Self {
        Self::new(vec![Draw { offset, multiplier }])
    }
}

impl VariationSource for FixedVariation {
    fn draw_batch(&mut self, len: usize) -> Vec<Draw> {
        if self.draws.is_empty() {
            return vec![NEUTRAL_DRAW; len];
        }
        (0..len)
            .map(|_| {
                let draw = self.draws[self.cursor % self.draws.len()];
                self.cursor += 1;
                draw
            })
            .collect()
    }
}

/// A record with this tick's derived fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariedRecord {
    #[serde(flatten)]
    pub record: Record,
    #[serde(rename = "Adjusted Savings")]
    pub adjusted: f64,
    #[serde(rename = "Natural Resources Depletion")]
    pub depletion: f64,
}

/// Apply one batched draw to every record.
pub fn vary(records: &[Record], source: &mut dyn VariationSource) -> Vec<VariedRecord> {
    let mut draws = source.draw_batch(records.len());
    if draws.len() != records.len() {
        warn!(
            "Variation source returned {} draws for {} records; padding with neutral draws",
            draws.len(),
            records.len()
        );
        draws.resize(records.len(), NEUTRAL_DRAW);
    }

    records
        .iter()
        .zip(draws)
        .map(|(record, draw)| VariedRecord {
            adjusted: record.value + f64::from(draw.offset),
            depletion: record.value * f64::from(draw.multiplier),
            record: record.clone(),
        })
        .collect()
}
