//! Per-empire, per-turn accumulation of end-game graph curves.
//!
//! The host rebuilds one statistic's curves at a time. Each rebuild is merged
//! into a sparse table keyed by empire index and truncated turn, so that once
//! every statistic has been reloaded the table holds one record per
//! (empire, turn) with every metric filled in.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::constants::{NO_LEADER_INDEX, NO_LEADER_SCORE};
use crate::metric::{CurvePoint, MetricKind, StatisticType};
use crate::numbers::truncate_turn;

/// Metrics recorded for a single (empire, turn) cell.
///
/// A metric stays `None` until its curve has been merged for this turn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TurnSample {
    values: [Option<f32>; MetricKind::COUNT],
}

impl TurnSample {
    #[must_use]
    pub const fn get(&self, kind: MetricKind) -> Option<f32> {
        self.values[kind.index()]
    }

    pub const fn set(&mut self, kind: MetricKind, value: f32) {
        self.values[kind.index()] = Some(value);
    }

    /// Metric value with absent or non-finite metrics reported as zero.
    #[must_use]
    pub fn value_or_zero(&self, kind: MetricKind) -> f32 {
        self.get(kind).filter(|value| value.is_finite()).unwrap_or(0.0)
    }

    #[must_use]
    pub fn defined_count(&self) -> usize {
        self.values.iter().filter(|value| value.is_some()).count()
    }
}

/// Empire holding the best score at a given turn.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Leader {
    pub empire_index: i32,
    pub score: f32,
}

impl Leader {
    /// Sentinel returned when no empire has a score at the requested turn.
    pub const NONE: Self = Self {
        empire_index: NO_LEADER_INDEX,
        score: NO_LEADER_SCORE,
    };

    #[must_use]
    pub fn is_none(&self) -> bool {
        self.empire_index == NO_LEADER_INDEX
    }
}

/// Accumulates sparse curve samples for one game session.
#[derive(Debug, Clone, Default)]
pub struct TurnSampleAggregator {
    by_empire: BTreeMap<usize, BTreeMap<i32, TurnSample>>,
}

impl TurnSampleAggregator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one statistic's curves for every empire.
    ///
    /// Later writes for the same metric and turn replace earlier ones.
    /// Statistics that do not map to a tracked metric are ignored.
    pub fn merge_curve<C>(&mut self, stat: StatisticType, curves_per_empire: &[Option<C>])
    where
        C: AsRef<[CurvePoint]>,
    {
        let Some(kind) = stat.metric() else {
            log::debug!("ignoring curves for untracked statistic {stat:?}");
            return;
        };

        for (empire_index, curve) in curves_per_empire.iter().enumerate() {
            let Some(curve) = curve else {
                continue;
            };
            let per_turn = self.by_empire.entry(empire_index).or_default();
            for point in curve.as_ref() {
                let Some(turn) = truncate_turn(point.turn) else {
                    log::debug!(
                        "skipping {kind} point with non-finite turn for empire {empire_index}"
                    );
                    continue;
                };
                if !point.value.is_finite() {
                    log::debug!(
                        "skipping non-finite {kind} value at turn {turn} for empire {empire_index}"
                    );
                    continue;
                }
                per_turn.entry(turn).or_default().set(kind, point.value);
            }
        }
    }

    /// Greatest turn seen across all empires and metrics, or 0 if empty.
    #[must_use]
    pub fn max_recorded_turn(&self) -> i32 {
        self.by_empire
            .values()
            .filter_map(|per_turn| per_turn.keys().next_back().copied())
            .fold(0, i32::max)
    }

    /// Empire with the greatest defined score at `turn`.
    ///
    /// Ties keep the lowest empire index.
    #[must_use]
    pub fn leader_at(&self, turn: i32) -> Leader {
        let mut leader = Leader::NONE;
        for (&empire_index, per_turn) in &self.by_empire {
            let Some(score) = per_turn
                .get(&turn)
                .and_then(|sample| sample.get(MetricKind::Score))
                .filter(|score| score.is_finite())
            else {
                continue;
            };
            if leader.is_none() || score > leader.score {
                leader = Leader {
                    empire_index: i32::try_from(empire_index).unwrap_or(i32::MAX),
                    score,
                };
            }
        }
        leader
    }

    /// Samples recorded for one empire, ordered by turn ascending.
    #[must_use]
    pub fn samples_for(&self, empire_index: usize) -> Vec<(i32, TurnSample)> {
        self.by_empire
            .get(&empire_index)
            .map(|per_turn| {
                per_turn
                    .iter()
                    .map(|(&turn, &sample)| (turn, sample))
                    .collect()
            })
            .unwrap_or_default()
    }

    #[must_use]
    pub fn sample(&self, empire_index: usize, turn: i32) -> Option<&TurnSample> {
        self.by_empire.get(&empire_index)?.get(&turn)
    }

    pub fn empire_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.by_empire.keys().copied()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_empire.is_empty()
    }

    /// Drop everything merged so far.
    pub fn clear(&mut self) {
        self.by_empire.clear();
    }
}
