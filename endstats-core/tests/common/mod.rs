#![allow(dead_code)]

use endstats_core::{
    Curve, CurvePoint, EmpireCurves, EmpireDirectory, EmpireStatistics, EndGameConditionInfo,
    Frame, GraphHost, HostError, Localizer, MetadataKey, MetricKind, Record, SessionMetadata,
    Settlement, SettlementSource, SettlementStatus, StatisticType, TechnologyInfo,
    TechnologySource, TitleAndDescription, UnlockedTechnology, VictorySnapshot, VictorySource,
};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::path::PathBuf;

/// In-memory stand-in for the running game.
pub struct FakeGame {
    pub statistics: Vec<EmpireStatistics>,
    pub empire_infos: Vec<Value>,
    pub legacy_empires: Vec<Value>,
    pub settlements: Result<Vec<Settlement>, HostError>,
    pub defenses: Option<Value>,
    pub technologies: Vec<TechnologyInfo>,
    pub metadata: HashMap<MetadataKey, String>,
    pub titles: HashMap<String, String>,
    pub victory: Option<VictorySnapshot>,
    pub turns: i32,
    pub fail_reload: Option<MetricKind>,
    pub reload_calls: Vec<StatisticType>,
}

/// Value of `kind` for `empire` at `turn`; empire 1 always leads on score.
pub fn curve_value(kind: MetricKind, empire: usize, turn: i32) -> f32 {
    let empire_bonus = if kind == MetricKind::Score && empire == 1 { 100.0 } else { 0.0 };
    let base = f32::from(u8::try_from(kind.index()).unwrap() + 1);
    base * turn as f32 + empire as f32 + empire_bonus
}

pub fn curves_for(kind: MetricKind, empires: usize, turns: i32) -> EmpireCurves {
    (0..empires)
        .map(|empire| {
            let curve: Curve = (1..=turns)
                .map(|turn| CurvePoint::new(turn as f32, curve_value(kind, empire, turn)))
                .collect();
            Some(curve)
        })
        .collect()
}

fn unlock(turn: i32, name: &str) -> UnlockedTechnology {
    UnlockedTechnology {
        turn,
        technology_name: name.to_string(),
    }
}

impl FakeGame {
    pub fn new() -> Self {
        let statistics = vec![
            EmpireStatistics {
                technologies_unlocked: vec![unlock(5, "Technology_B"), unlock(3, "Technology_C")],
                first_turn_per_era: vec![1, 6, 4],
            },
            EmpireStatistics {
                technologies_unlocked: vec![unlock(5, "Technology_A")],
                first_turn_per_era: vec![0, 5, 9],
            },
        ];
        let settlements = vec![
            Settlement {
                simulation_entity_guid: 11,
                empire_index: 0,
                entity_name: "Ashen Hold".to_string(),
                status: SettlementStatus::City,
                is_capital: true,
                territory_indices: vec![3, 4],
                main_territory_index: 3,
                population: 7,
                ..Settlement::default()
            },
            Settlement {
                simulation_entity_guid: 12,
                empire_index: 1,
                status: SettlementStatus::Outpost,
                ..Settlement::default()
            },
        ];
        Self {
            statistics,
            empire_infos: vec![
                json!({ "FactionDefinitionName": { "id": "Faction_Necrophage" } }),
                json!({ "Label": "none" }),
            ],
            legacy_empires: vec![
                json!({}),
                json!({ "MajorFactionDefinition": { "Name": { "id": "Faction_LastLord" } } }),
            ],
            settlements: Ok(settlements),
            defenses: Some(json!({
                "data": [
                    { "TerritoryIndex": 3, "Fortification": { "fixed": 50 << 16 },
                      "FortificationLevel": 2,
                      "MilitiaUnits": [{ "IsPresent": true, "PowerEstimation": 8 }] },
                    { "TerritoryIndex": 4, "Fortification": 10,
                      "MilitiaUnits": [{ "IsPresent": true, "PowerEstimation": 2 }] }
                ],
                "length": 2
            })),
            technologies: vec![TechnologyInfo {
                technology_definition_name: "Technology_A".to_string(),
                era_index: 1,
                research_cost: 120.0,
                ..TechnologyInfo::default()
            }],
            metadata: HashMap::from([
                (MetadataKey::GameDifficulty, "Difficulty_Hard".to_string()),
                (MetadataKey::WorldSize, "WorldSize_Small".to_string()),
            ]),
            titles: HashMap::from([
                ("Difficulty_Hard".to_string(), "Hard".to_string()),
                ("Technology_A".to_string(), "<b>Agriculture</b>".to_string()),
            ]),
            victory: Some(VictorySnapshot {
                end_game_definition_name: "EndGame_Standard".to_string(),
                end_game_condition_type: "Score".to_string(),
                conditions: vec![EndGameConditionInfo {
                    condition_type: "Score".to_string(),
                    is_enabled: true,
                }],
            }),
            turns: 12,
            fail_reload: None,
            reload_calls: Vec::new(),
        }
    }
}

impl Localizer for FakeGame {
    fn localized_title(&self, key: &str) -> Result<Option<String>, HostError> {
        Ok(self.titles.get(key).cloned())
    }

    fn title_and_description(&self, key: &str) -> Result<Option<TitleAndDescription>, HostError> {
        Ok(self.titles.get(key).map(|title| TitleAndDescription {
            title: title.clone(),
            description: String::new(),
        }))
    }
}

impl SessionMetadata for FakeGame {
    fn metadata(&self, key: MetadataKey) -> Result<Option<String>, HostError> {
        Ok(self.metadata.get(&key).cloned())
    }
}

impl VictorySource for FakeGame {
    fn victory_snapshot(&self) -> Result<Option<VictorySnapshot>, HostError> {
        Ok(self.victory.clone())
    }

    fn end_game_condition_activation(&self) -> Result<Option<String>, HostError> {
        Err(HostError::Unavailable {
            source_name: "analytics",
        })
    }
}

impl EmpireDirectory for FakeGame {
    fn empire_info(&self, empire_index: usize) -> Result<Option<&dyn Record>, HostError> {
        Ok(self
            .empire_infos
            .get(empire_index)
            .map(|info| info as &dyn Record))
    }

    fn legacy_major_empire(&self, empire_index: usize) -> Result<Option<&dyn Record>, HostError> {
        Ok(self
            .legacy_empires
            .get(empire_index)
            .map(|empire| empire as &dyn Record))
    }
}

impl SettlementSource for FakeGame {
    fn settlements(&self) -> Result<Vec<Settlement>, HostError> {
        self.settlements.clone()
    }

    fn territory_defenses(&self) -> Result<Option<&dyn Frame>, HostError> {
        Ok(self.defenses.as_ref().map(|frame| frame as &dyn Frame))
    }
}

impl TechnologySource for FakeGame {
    fn technologies(&self) -> Result<Vec<TechnologyInfo>, HostError> {
        Ok(self.technologies.clone())
    }
}

impl GraphHost for FakeGame {
    fn empire_statistics(&self) -> &[EmpireStatistics] {
        &self.statistics
    }

    fn reload_graph(&mut self, stat: StatisticType) -> Result<Option<EmpireCurves>, HostError> {
        self.reload_calls.push(stat);
        let Some(kind) = stat.metric() else {
            return Ok(None);
        };
        if self.fail_reload == Some(kind) {
            return Err(HostError::Read(format!("graph for {kind} unavailable")));
        }
        Ok(Some(curves_for(kind, self.statistics.len(), self.turns)))
    }
}

/// Fresh scratch directory under the system temp dir.
pub fn scratch_dir(label: &str) -> PathBuf {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos())
        .unwrap_or_default();
    let dir = std::env::temp_dir().join(format!("endstats-{label}-{nanos}"));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}
