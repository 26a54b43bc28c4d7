//! Boundary between the export core and the running game.
//!
//! The host integration layer implements these traits, translating the game's
//! native data into the plain input types below (or, for data whose shape is
//! not stable across game versions, into [`Record`]/[`Frame`] views).

use serde::{Deserialize, Serialize};

use crate::error::HostError;
use crate::metric::{EmpireCurves, StatisticType};
use crate::record::{Frame, Record};

/// One technology unlock as recorded by the host's empire statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnlockedTechnology {
    pub turn: i32,
    pub technology_name: String,
}

/// Raw end-game statistics for one empire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmpireStatistics {
    #[serde(default)]
    pub technologies_unlocked: Vec<UnlockedTechnology>,
    #[serde(default)]
    pub first_turn_per_era: Vec<i32>,
}

/// Session metadata entries read for the game settings section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MetadataKey {
    GameDifficulty,
    WorldSize,
    GameSpeed,
}

/// One configured victory condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndGameConditionInfo {
    pub condition_type: String,
    pub is_enabled: bool,
}

/// Victory window state at the end of the game.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VictorySnapshot {
    #[serde(default)]
    pub end_game_definition_name: String,
    #[serde(default)]
    pub end_game_condition_type: String,
    #[serde(default)]
    pub conditions: Vec<EndGameConditionInfo>,
}

/// Lifecycle status of a settlement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SettlementStatus {
    City,
    Outpost,
    Camp,
    #[default]
    #[serde(other)]
    Other,
}

/// Settlement row from the game snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settlement {
    pub simulation_entity_guid: u64,
    pub empire_index: u8,
    pub entity_name: String,
    pub status: SettlementStatus,
    pub is_capital: bool,
    pub territory_indices: Vec<i32>,
    pub main_territory_index: i32,
    pub territory_count: i32,
    pub extension_districts_count: i32,
    pub population: i32,
    pub max_population: i32,
    pub food_stock: f64,
    pub max_food_stock: f64,
    pub food_gain_in_percent: f64,
    pub turn_before_growth: f64,
    pub growing_population_name: String,
    pub approval_net_in_percent: f64,
    pub settlement_approval_definition_name: String,
    pub production_net: f64,
    pub current_constructible_name: String,
    pub is_besieged: bool,
    pub is_mutinous: bool,
    pub distance_with_capital: i32,
}

/// Operator of a faction-trait prerequisite on a technology.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrerequisiteOperator {
    #[default]
    Any,
    None,
    All,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FactionTraitPrerequisite {
    pub operator: PrerequisiteOperator,
    pub faction_trait: String,
}

/// One unlock granted by a technology.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UnlockInfo {
    pub unlock_type: String,
    pub unlock_category: String,
    pub amount: f64,
    pub unlock_element_name: String,
    pub ui_mapper_override_name: String,
}

/// Technology as listed by the technology screen.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TechnologyInfo {
    pub technology_definition_name: String,
    pub era_index: i32,
    pub research_cost: f64,
    pub unlocks: Vec<UnlockInfo>,
    /// `None` when the definition database could not be read for this tech.
    pub faction_trait_prerequisites: Option<Vec<FactionTraitPrerequisite>>,
}

/// Localized tooltip text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleAndDescription {
    pub title: String,
    pub description: String,
}

/// Localization lookups keyed by opaque host identifiers.
pub trait Localizer {
    /// Localized UI title for `key`, possibly containing markup.
    ///
    /// # Errors
    ///
    /// Returns an error if the localization service fails.
    fn localized_title(&self, key: &str) -> Result<Option<String>, HostError>;

    /// Tooltip title and description for `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the tooltip mapper fails.
    fn title_and_description(&self, key: &str) -> Result<Option<TitleAndDescription>, HostError>;
}

pub trait SessionMetadata {
    /// Raw metadata value for `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the session service is unavailable.
    fn metadata(&self, key: MetadataKey) -> Result<Option<String>, HostError>;
}

pub trait VictorySource {
    /// # Errors
    ///
    /// Returns an error if the victory window snapshot cannot be read.
    fn victory_snapshot(&self) -> Result<Option<VictorySnapshot>, HostError>;

    /// Pre-formatted summary of enabled victory conditions.
    ///
    /// # Errors
    ///
    /// Returns an error if the host cannot produce the summary.
    fn end_game_condition_activation(&self) -> Result<Option<String>, HostError>;
}

/// Per-empire identity records.
pub trait EmpireDirectory {
    /// Current empire info record from the game snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be read.
    fn empire_info(&self, empire_index: usize) -> Result<Option<&dyn Record>, HostError>;

    /// Entry of the legacy major-empire registry.
    ///
    /// # Errors
    ///
    /// Returns an error if the registry cannot be reached.
    fn legacy_major_empire(&self, empire_index: usize) -> Result<Option<&dyn Record>, HostError>;
}

pub trait SettlementSource {
    /// # Errors
    ///
    /// Returns an error if the settlement list cannot be read.
    fn settlements(&self) -> Result<Vec<Settlement>, HostError>;

    /// Territory defense frame; each record may carry nested militia units.
    ///
    /// # Errors
    ///
    /// Returns an error if the frame cannot be read.
    fn territory_defenses(&self) -> Result<Option<&dyn Frame>, HostError>;
}

pub trait TechnologySource {
    /// # Errors
    ///
    /// Returns an error if the technology screen snapshot cannot be read.
    fn technologies(&self) -> Result<Vec<TechnologyInfo>, HostError>;
}

/// Everything the export reads from the game once the session has ended.
pub trait GameSnapshot:
    Localizer + SessionMetadata + VictorySource + EmpireDirectory + SettlementSource + TechnologySource
{
}

impl<T> GameSnapshot for T where
    T: Localizer
        + SessionMetadata
        + VictorySource
        + EmpireDirectory
        + SettlementSource
        + TechnologySource
        + ?Sized
{
}

/// The end-game graph window.
pub trait GraphHost {
    /// Statistics array the graph window was opened with.
    fn empire_statistics(&self) -> &[EmpireStatistics];

    /// Recompute one statistic's curves for every empire.
    ///
    /// # Errors
    ///
    /// Returns an error if the host fails to rebuild the graph.
    fn reload_graph(&mut self, stat: StatisticType) -> Result<Option<EmpireCurves>, HostError>;
}
