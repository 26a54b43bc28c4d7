//! Era progression cleanup.
//!
//! The host reports the first turn each era was reached, but stale or
//! placeholder values are common (eras reported before the game started,
//! after it ended, or out of order). [`EraProgress::from_raw`] keeps only a
//! strictly increasing chain of plausible turns.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::constants::{FALLBACK_FIRST_ERA_TURN, UNREACHED_ERA_TURN};

/// Denoised per-era first-turn data for one empire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EraProgress {
    pub final_era_index: usize,
    /// First turn per era; `0` marks an era that was never (plausibly) reached.
    /// `None` when the host supplied no era data at all.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_turn_per_era: Option<SmallVec<[i32; 8]>>,
}

impl EraProgress {
    #[must_use]
    pub fn from_raw(raw_turns: &[i32], max_turn: i32) -> Self {
        if raw_turns.is_empty() {
            return Self::default();
        }

        let mut cleaned: SmallVec<[i32; 8]> = SmallVec::with_capacity(raw_turns.len());
        let mut final_era_index = 0;
        let mut last_accepted = 0;

        for (era, &raw) in raw_turns.iter().enumerate() {
            let plausible = raw > 0 && raw <= max_turn;
            if era == 0 {
                let first = if plausible { raw } else { FALLBACK_FIRST_ERA_TURN };
                last_accepted = first;
                cleaned.push(first);
            } else if plausible && raw > last_accepted {
                final_era_index = era;
                last_accepted = raw;
                cleaned.push(raw);
            } else {
                cleaned.push(UNREACHED_ERA_TURN);
            }
        }

        Self {
            final_era_index,
            first_turn_per_era: Some(cleaned),
        }
    }

    #[must_use]
    pub fn reached(&self, era: usize) -> bool {
        self.first_turn_per_era
            .as_ref()
            .and_then(|turns| turns.get(era))
            .is_some_and(|&turn| turn != UNREACHED_ERA_TURN)
    }
}
