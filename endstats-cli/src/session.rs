//! Recorded end-game session replayed as a live host.

use anyhow::{Context, Result};
use endstats_core::{
    EmpireCurves, EmpireDirectory, EmpireStatistics, Frame, GraphHost, HostError, Localizer,
    MetadataKey, MetricKind, Record, SessionMetadata, Settlement, SettlementSource, StatisticType,
    TechnologyInfo, TechnologySource, TitleAndDescription, VictorySnapshot, VictorySource,
};
use serde::Deserialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// Everything the game exposed when the end-game window was opened.
///
/// Loosely-typed host records (`empireInfos`, `legacyEmpires`,
/// `territoryDefenses`) keep the tagged JSON encoding understood by
/// [`endstats_core::record`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReplaySession {
    pub empire_statistics: Vec<EmpireStatistics>,
    /// Host statistic codes in the order the player opened the graphs.
    pub statistic_codes: Vec<i32>,
    pub graphs: BTreeMap<MetricKind, EmpireCurves>,
    pub empire_infos: Vec<Value>,
    pub legacy_empires: Vec<Value>,
    pub settlements: Vec<Settlement>,
    pub territory_defenses: Option<Value>,
    pub technologies: Vec<TechnologyInfo>,
    pub metadata: HashMap<MetadataKey, String>,
    pub titles: HashMap<String, String>,
    pub descriptions: HashMap<String, String>,
    pub victory: Option<VictorySnapshot>,
    /// Host-formatted victory summary; absent means the host call fails.
    pub condition_activation: Option<String>,

    #[serde(skip)]
    reloads: Vec<StatisticType>,
}

impl ReplaySession {
    /// # Errors
    ///
    /// Returns an error if the JSON does not describe a session.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("parsing replay session")
    }

    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("reading session {}", path.display()))?;
        Self::from_json(&json).with_context(|| format!("loading session {}", path.display()))
    }

    /// Statistics the replay opens, falling back to the final one.
    #[must_use]
    pub fn callbacks(&self) -> Vec<StatisticType> {
        if self.statistic_codes.is_empty() {
            return vec![StatisticType::FINAL];
        }
        self.statistic_codes
            .iter()
            .map(|&code| StatisticType::from_code(code))
            .collect()
    }

    /// Curves the host shows for `stat`, if any were recorded.
    #[must_use]
    pub fn curves(&self, stat: StatisticType) -> EmpireCurves {
        stat.metric()
            .and_then(|kind| self.graphs.get(&kind).cloned())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn reloads(&self) -> &[StatisticType] {
        &self.reloads
    }
}

impl Localizer for ReplaySession {
    fn localized_title(&self, key: &str) -> Result<Option<String>, HostError> {
        Ok(self.titles.get(key).cloned())
    }

    fn title_and_description(&self, key: &str) -> Result<Option<TitleAndDescription>, HostError> {
        let title = self.titles.get(key);
        let description = self.descriptions.get(key);
        if title.is_none() && description.is_none() {
            return Ok(None);
        }
        Ok(Some(TitleAndDescription {
            title: title.cloned().unwrap_or_default(),
            description: description.cloned().unwrap_or_default(),
        }))
    }
}

impl SessionMetadata for ReplaySession {
    fn metadata(&self, key: MetadataKey) -> Result<Option<String>, HostError> {
        Ok(self.metadata.get(&key).cloned())
    }
}

impl VictorySource for ReplaySession {
    fn victory_snapshot(&self) -> Result<Option<VictorySnapshot>, HostError> {
        Ok(self.victory.clone())
    }

    fn end_game_condition_activation(&self) -> Result<Option<String>, HostError> {
        self.condition_activation
            .clone()
            .map(Some)
            .ok_or(HostError::Unavailable {
                source_name: "condition activation",
            })
    }
}

impl EmpireDirectory for ReplaySession {
    fn empire_info(&self, empire_index: usize) -> Result<Option<&dyn Record>, HostError> {
        Ok(self
            .empire_infos
            .get(empire_index)
            .map(|info| info as &dyn Record))
    }

    fn legacy_major_empire(&self, empire_index: usize) -> Result<Option<&dyn Record>, HostError> {
        if self.legacy_empires.is_empty() {
            return Err(HostError::Unavailable {
                source_name: "major empire registry",
            });
        }
        self.legacy_empires
            .get(empire_index)
            .map(|empire| Some(empire as &dyn Record))
            .ok_or(HostError::OutOfRange {
                source_name: "major empire registry",
                index: empire_index,
                len: self.legacy_empires.len(),
            })
    }
}

impl SettlementSource for ReplaySession {
    fn settlements(&self) -> Result<Vec<Settlement>, HostError> {
        Ok(self.settlements.clone())
    }

    fn territory_defenses(&self) -> Result<Option<&dyn Frame>, HostError> {
        Ok(self
            .territory_defenses
            .as_ref()
            .map(|frame| frame as &dyn Frame))
    }
}

impl TechnologySource for ReplaySession {
    fn technologies(&self) -> Result<Vec<TechnologyInfo>, HostError> {
        Ok(self.technologies.clone())
    }
}

impl GraphHost for ReplaySession {
    fn empire_statistics(&self) -> &[EmpireStatistics] {
        &self.empire_statistics
    }

    fn reload_graph(&mut self, stat: StatisticType) -> Result<Option<EmpireCurves>, HostError> {
        self.reloads.push(stat);
        Ok(stat
            .metric()
            .and_then(|kind| self.graphs.get(&kind).cloned()))
    }
}
