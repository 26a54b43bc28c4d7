//! Technology naming and the cross-empire unlock timeline.

use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::HashMap;

use crate::host::{EmpireStatistics, Localizer};
use crate::numbers::count_to_i32;
use crate::text::strip_markup;

/// Display-name lookup for technology keys, cached per instance.
#[derive(Debug, Default)]
pub struct TechNameResolver {
    cache: RefCell<HashMap<String, String>>,
}

impl TechNameResolver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Localized title of `key` without markup; the raw key when unavailable.
    pub fn display_name<L>(&self, localizer: &L, key: &str) -> String
    where
        L: Localizer + ?Sized,
    {
        if key.is_empty() {
            return String::new();
        }
        if let Some(cached) = self.cache.borrow().get(key) {
            return cached.clone();
        }

        let resolved = match localizer.title_and_description(key) {
            Ok(Some(tooltip)) if !tooltip.title.is_empty() => strip_markup(&tooltip.title),
            Ok(_) => key.to_string(),
            Err(err) => {
                log::warn!("resolving tech title for '{key}' failed: {err}");
                key.to_string()
            }
        };
        self.cache
            .borrow_mut()
            .insert(key.to_string(), resolved.clone());
        resolved
    }

    #[must_use]
    pub fn cached_len(&self) -> usize {
        self.cache.borrow().len()
    }

    pub fn clear(&self) {
        self.cache.borrow_mut().clear();
    }
}

/// One technology unlock on the global timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TechUnlockEvent {
    pub empire_index: i32,
    pub turn: i32,
    pub technology_definition_name: String,
    pub technology_display_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TechOrder {
    pub empire_count: i32,
    pub entry_count: i32,
    pub entries: Vec<TechUnlockEvent>,
}

/// Sort by turn, then empire index. The sort is stable so unlocks within one
/// empire and turn keep their recorded order.
pub fn sort_timeline(events: &mut [TechUnlockEvent]) {
    events.sort_by_key(|event| (event.turn, event.empire_index));
}

/// Every empire's unlocks as one timeline; `None` when there are no empires.
pub fn build_tech_order<L>(
    localizer: &L,
    names: &TechNameResolver,
    statistics: &[EmpireStatistics],
) -> Option<TechOrder>
where
    L: Localizer + ?Sized,
{
    if statistics.is_empty() {
        return None;
    }

    let mut entries: Vec<TechUnlockEvent> = statistics
        .iter()
        .enumerate()
        .flat_map(|(empire_index, stats)| {
            stats
                .technologies_unlocked
                .iter()
                .map(move |unlock| (empire_index, unlock))
        })
        .map(|(empire_index, unlock)| TechUnlockEvent {
            empire_index: count_to_i32(empire_index),
            turn: unlock.turn,
            technology_definition_name: unlock.technology_name.clone(),
            technology_display_name: names.display_name(localizer, &unlock.technology_name),
        })
        .collect();
    sort_timeline(&mut entries);

    Some(TechOrder {
        empire_count: count_to_i32(statistics.len()),
        entry_count: count_to_i32(entries.len()),
        entries,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HostError;
    use crate::host::{TitleAndDescription, UnlockedTechnology};
    use std::cell::Cell;

    #[derive(Default)]
    struct Tooltips {
        calls: Cell<usize>,
    }

    impl Localizer for Tooltips {
        fn localized_title(&self, _key: &str) -> Result<Option<String>, HostError> {
            Ok(None)
        }

        fn title_and_description(
            &self,
            key: &str,
        ) -> Result<Option<TitleAndDescription>, HostError> {
            self.calls.set(self.calls.get() + 1);
            match key {
                "Technology_Masonry" => Ok(Some(TitleAndDescription {
                    title: "<a=Technology_Masonry>Masonry</a>".to_string(),
                    description: String::new(),
                })),
                "Technology_Broken" => Err(HostError::Read("mapper".into())),
                _ => Ok(None),
            }
        }
    }

    fn unlock(turn: i32, name: &str) -> UnlockedTechnology {
        UnlockedTechnology {
            turn,
            technology_name: name.to_string(),
        }
    }

    #[test]
    fn display_names_are_cleaned_and_cached() {
        let tooltips = Tooltips::default();
        let names = TechNameResolver::new();
        assert_eq!(names.display_name(&tooltips, "Technology_Masonry"), "Masonry");
        assert_eq!(names.display_name(&tooltips, "Technology_Masonry"), "Masonry");
        assert_eq!(tooltips.calls.get(), 1);
        assert_eq!(
            names.display_name(&tooltips, "Technology_Broken"),
            "Technology_Broken"
        );
        assert_eq!(names.display_name(&tooltips, "Technology_Other"), "Technology_Other");
        assert_eq!(names.display_name(&tooltips, ""), "");
        assert_eq!(names.cached_len(), 3);
        names.clear();
        assert_eq!(names.cached_len(), 0);
    }

    #[test]
    fn timeline_sorts_by_turn_then_empire() {
        let statistics = vec![
            EmpireStatistics {
                technologies_unlocked: vec![unlock(5, "B"), unlock(3, "C")],
                ..EmpireStatistics::default()
            },
            EmpireStatistics {
                technologies_unlocked: vec![unlock(5, "A")],
                ..EmpireStatistics::default()
            },
        ];
        let order = build_tech_order(&Tooltips::default(), &TechNameResolver::new(), &statistics)
            .unwrap();
        let flat: Vec<(i32, i32, &str)> = order
            .entries
            .iter()
            .map(|event| {
                (
                    event.empire_index,
                    event.turn,
                    event.technology_definition_name.as_str(),
                )
            })
            .collect();
        assert_eq!(flat, vec![(0, 3, "C"), (0, 5, "B"), (1, 5, "A")]);
        assert_eq!(order.empire_count, 2);
        assert_eq!(order.entry_count, 3);
    }

    #[test]
    fn no_empires_means_no_timeline() {
        assert!(build_tech_order(&Tooltips::default(), &TechNameResolver::new(), &[]).is_none());
    }
}
