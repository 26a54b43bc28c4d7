//! End-game document assembly and writing.
//!
//! Each section is built independently. A section whose source is missing is
//! left out of the document, and a section whose builder fails is logged and
//! left out the same way; only a failure outside the section builders
//! abandons the export.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::aggregator::{Leader, TurnSample, TurnSampleAggregator};
use crate::city::{CityBreakdown, build_city_breakdown};
use crate::config::ExportConfig;
use crate::constants::{END_GAME_FILE_TAG, EXPORT_VERSION, FILE_TIMESTAMP_FORMAT};
use crate::era::EraProgress;
use crate::error::ExportError;
use crate::host::{EmpireDirectory, EmpireStatistics, GameSnapshot};
use crate::metadata::{GameSettings, VictorySettings, read_game_settings, read_victory_settings};
use crate::metric::MetricKind;
use crate::numbers::count_to_i32;
use crate::resolver::FactionResolver;
use crate::tech::{TechNameResolver, TechOrder, build_tech_order};
use crate::tech_db::dump_tech_database;

/// One per-turn row; metrics never merged for the turn read as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnStatsEntry {
    pub turn: i32,
    pub food: f32,
    pub industry: f32,
    pub dust: f32,
    pub science: f32,
    pub influence: f32,
    pub approval: f32,
    pub populations: f32,
    pub technologies: f32,
    pub units: f32,
    pub cities: f32,
    pub territories: f32,
    pub score: f32,
}

impl TurnStatsEntry {
    #[must_use]
    pub fn from_sample(turn: i32, sample: &TurnSample) -> Self {
        Self {
            turn,
            food: sample.value_or_zero(MetricKind::Food),
            industry: sample.value_or_zero(MetricKind::Industry),
            dust: sample.value_or_zero(MetricKind::Dust),
            science: sample.value_or_zero(MetricKind::Science),
            influence: sample.value_or_zero(MetricKind::Influence),
            approval: sample.value_or_zero(MetricKind::Approval),
            populations: sample.value_or_zero(MetricKind::Populations),
            technologies: sample.value_or_zero(MetricKind::Technologies),
            units: sample.value_or_zero(MetricKind::Units),
            cities: sample.value_or_zero(MetricKind::Cities),
            territories: sample.value_or_zero(MetricKind::Territories),
            score: sample.value_or_zero(MetricKind::Score),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmpireRecord {
    pub empire_index: i32,
    pub faction_key: String,
    pub faction_display_name: String,
    pub tech_count: i32,
    #[serde(flatten)]
    pub era: EraProgress,
    pub per_turn: Vec<TurnStatsEntry>,
}

/// Root of the end-game JSON file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub version: String,
    pub generated_at_utc: String,
    pub game_id: String,
    pub empire_count: i32,
    pub max_turn: i32,
    /// Top score at `max_turn`; the no-leader sentinel when nobody scored.
    pub leader: Leader,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game: Option<GameSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub victory: Option<VictorySettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub empires: Option<Vec<EmpireRecord>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tech_order: Option<TechOrder>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city_breakdown: Option<CityBreakdown>,
}

/// Session identity derived from the export time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportStamp {
    pub generated_at: DateTime<Utc>,
    pub timestamp: String,
    pub game_id: String,
}

impl ExportStamp {
    #[must_use]
    pub fn new(prefix: &str, generated_at: DateTime<Utc>) -> Self {
        let timestamp = generated_at.format(FILE_TIMESTAMP_FORMAT).to_string();
        Self {
            generated_at,
            game_id: format!("{prefix}_{timestamp}"),
            timestamp,
        }
    }

    #[must_use]
    pub fn file_name(&self, prefix: &str) -> String {
        format!("{prefix}_{END_GAME_FILE_TAG}_{}.json", self.timestamp)
    }
}

/// Run one section builder, turning a failure into an omitted section.
fn isolated<T>(section: &str, build: impl FnOnce() -> Result<Option<T>, ExportError>) -> Option<T> {
    match build() {
        Ok(value) => value,
        Err(err) => {
            log::warn!("omitting {section} section: {err}");
            None
        }
    }
}

/// Empire records with faction identity, era progress and per-turn rows.
pub fn build_empire_records<D>(
    directory: &D,
    factions: &FactionResolver,
    aggregator: &TurnSampleAggregator,
    statistics: &[EmpireStatistics],
    max_turn: i32,
) -> Vec<EmpireRecord>
where
    D: EmpireDirectory,
{
    statistics
        .iter()
        .enumerate()
        .map(|(empire_index, stats)| {
            let identity = factions.resolve_identity(directory, empire_index);
            EmpireRecord {
                empire_index: count_to_i32(empire_index),
                faction_key: identity.key,
                faction_display_name: identity.display_name,
                tech_count: count_to_i32(stats.technologies_unlocked.len()),
                era: EraProgress::from_raw(&stats.first_turn_per_era, max_turn),
                per_turn: aggregator
                    .samples_for(empire_index)
                    .iter()
                    .map(|(turn, sample)| TurnStatsEntry::from_sample(*turn, sample))
                    .collect(),
            }
        })
        .collect()
}

/// Builds and writes end-game artifacts.
pub struct Exporter {
    config: ExportConfig,
    factions: FactionResolver,
    tech_names: TechNameResolver,
}

impl Exporter {
    #[must_use]
    pub fn new(config: ExportConfig) -> Self {
        Self::with_resolver(config, FactionResolver::default())
    }

    #[must_use]
    pub fn with_resolver(config: ExportConfig, factions: FactionResolver) -> Self {
        Self {
            config,
            factions,
            tech_names: TechNameResolver::new(),
        }
    }

    #[must_use]
    pub const fn config(&self) -> &ExportConfig {
        &self.config
    }

    #[must_use]
    pub const fn tech_names(&self) -> &TechNameResolver {
        &self.tech_names
    }

    /// Forget localized names cached during the previous session.
    pub fn clear_caches(&self) {
        self.tech_names.clear();
    }

    /// Merge every section into one document.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::NoEmpireStatistics`] when `statistics` is empty.
    pub fn assemble<S>(
        &self,
        aggregator: &TurnSampleAggregator,
        statistics: &[EmpireStatistics],
        snapshot: &S,
        stamp: &ExportStamp,
    ) -> Result<ExportDocument, ExportError>
    where
        S: GameSnapshot,
    {
        if statistics.is_empty() {
            return Err(ExportError::NoEmpireStatistics);
        }

        let max_turn = aggregator.max_recorded_turn();
        let leader = aggregator.leader_at(max_turn);

        // These builders degrade per field or per empire and never fail.
        let game = Some(read_game_settings(snapshot));
        let victory = Some(read_victory_settings(snapshot));
        let empires = Some(build_empire_records(
            snapshot,
            &self.factions,
            aggregator,
            statistics,
            max_turn,
        ));
        let tech_order = build_tech_order(snapshot, &self.tech_names, statistics);
        let city_breakdown = isolated("cityBreakdown", || build_city_breakdown(snapshot));

        Ok(ExportDocument {
            version: EXPORT_VERSION.to_string(),
            generated_at_utc: stamp
                .generated_at
                .to_rfc3339_opts(SecondsFormat::Millis, true),
            game_id: stamp.game_id.clone(),
            empire_count: count_to_i32(statistics.len()),
            max_turn,
            leader,
            game,
            victory,
            empires,
            tech_order,
            city_breakdown,
        })
    }

    /// Serialize a document according to the configured formatting.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn render(&self, document: &ExportDocument) -> Result<Vec<u8>, ExportError> {
        let bytes = if self.config.pretty {
            serde_json::to_vec_pretty(document)?
        } else {
            serde_json::to_vec(document)?
        };
        Ok(bytes)
    }

    /// Assemble, serialize and write the end-game file, returning its path.
    ///
    /// The document is fully serialized before the file is created, so a
    /// failure never leaves a partial file behind.
    ///
    /// # Errors
    ///
    /// Returns an error if there are no empire statistics or the file cannot
    /// be written.
    pub fn export<S>(
        &self,
        aggregator: &TurnSampleAggregator,
        statistics: &[EmpireStatistics],
        snapshot: &S,
        generated_at: DateTime<Utc>,
    ) -> Result<PathBuf, ExportError>
    where
        S: GameSnapshot,
    {
        let stamp = ExportStamp::new(&self.config.file_prefix, generated_at);
        let document = self.assemble(aggregator, statistics, snapshot, &stamp)?;
        let bytes = self.render(&document)?;

        let dir = &self.config.output_dir;
        std::fs::create_dir_all(dir).map_err(|err| ExportError::io(dir, err))?;
        let path = dir.join(stamp.file_name(&self.config.file_prefix));
        std::fs::write(&path, bytes).map_err(|err| ExportError::io(&path, err))?;
        log::info!("saved end-game export to {}", path.display());
        Ok(path)
    }

    /// Write the technology database CSV when enabled.
    ///
    /// # Errors
    ///
    /// Returns an error if the technology list cannot be read or written.
    pub fn dump_tech_database<S>(
        &self,
        snapshot: &S,
        generated_at: DateTime<Utc>,
    ) -> Result<Option<PathBuf>, ExportError>
    where
        S: GameSnapshot,
    {
        if !self.config.dump_tech_database {
            return Ok(None);
        }
        dump_tech_database(snapshot, &self.tech_names, &self.config, generated_at)
    }
}
