//! Game and victory settings read from the session snapshot.
//!
//! Every field defaults to `Unknown`; a failed read degrades the field and
//! never the section.

use serde::{Deserialize, Serialize};

use crate::constants::UNKNOWN;
use crate::host::{EndGameConditionInfo, Localizer, MetadataKey, SessionMetadata, VictorySource};
use crate::text::localize_or_raw;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSettings {
    pub difficulty: String,
    pub map_size: String,
    pub game_speed: String,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            difficulty: UNKNOWN.to_string(),
            map_size: UNKNOWN.to_string(),
            game_speed: UNKNOWN.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VictorySettings {
    pub victory_preset: String,
    pub actual_victory_condition: String,
    pub victory_conditions_enabled: String,
}

impl Default for VictorySettings {
    fn default() -> Self {
        Self {
            victory_preset: UNKNOWN.to_string(),
            actual_victory_condition: UNKNOWN.to_string(),
            victory_conditions_enabled: UNKNOWN.to_string(),
        }
    }
}

fn read_setting<S>(snapshot: &S, key: MetadataKey) -> String
where
    S: SessionMetadata + Localizer + ?Sized,
{
    match snapshot.metadata(key) {
        Ok(Some(value)) => localize_or_raw(snapshot, &value).unwrap_or_else(|| UNKNOWN.to_string()),
        Ok(None) => UNKNOWN.to_string(),
        Err(err) => {
            log::warn!("reading {key:?} metadata failed: {err}");
            UNKNOWN.to_string()
        }
    }
}

#[must_use]
pub fn read_game_settings<S>(snapshot: &S) -> GameSettings
where
    S: SessionMetadata + Localizer + ?Sized,
{
    GameSettings {
        difficulty: read_setting(snapshot, MetadataKey::GameDifficulty),
        map_size: read_setting(snapshot, MetadataKey::WorldSize),
        game_speed: read_setting(snapshot, MetadataKey::GameSpeed),
    }
}

/// `Type:True;Type:False` summary of the configured victory conditions.
#[must_use]
pub fn summarize_conditions(conditions: &[EndGameConditionInfo]) -> String {
    conditions
        .iter()
        .map(|info| {
            let enabled = if info.is_enabled { "True" } else { "False" };
            format!("{}:{enabled}", info.condition_type)
        })
        .collect::<Vec<_>>()
        .join(";")
}

#[must_use]
pub fn read_victory_settings<S>(snapshot: &S) -> VictorySettings
where
    S: VictorySource + ?Sized,
{
    let mut victory = VictorySettings::default();
    let data = match snapshot.victory_snapshot() {
        Ok(Some(data)) => data,
        Ok(None) => return victory,
        Err(err) => {
            log::warn!("reading victory settings failed: {err}");
            return victory;
        }
    };

    if !data.end_game_definition_name.is_empty() {
        victory.victory_preset = data.end_game_definition_name;
    }
    victory.actual_victory_condition = data.end_game_condition_type;

    match snapshot.end_game_condition_activation() {
        Ok(Some(detail)) if !detail.is_empty() => victory.victory_conditions_enabled = detail,
        Ok(_) => {}
        Err(err) => {
            log::debug!("condition activation summary unavailable, rebuilding: {err}");
            if !data.conditions.is_empty() {
                victory.victory_conditions_enabled = summarize_conditions(&data.conditions);
            }
        }
    }
    victory
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HostError;
    use crate::host::{TitleAndDescription, VictorySnapshot};

    #[derive(Default)]
    struct Session {
        broken: bool,
        activation: Option<Result<Option<String>, HostError>>,
        victory: Option<VictorySnapshot>,
    }

    impl Localizer for Session {
        fn localized_title(&self, key: &str) -> Result<Option<String>, HostError> {
            Ok((key == "Difficulty_Hard").then(|| "Hard".to_string()))
        }

        fn title_and_description(
            &self,
            _key: &str,
        ) -> Result<Option<TitleAndDescription>, HostError> {
            Ok(None)
        }
    }

    impl SessionMetadata for Session {
        fn metadata(&self, key: MetadataKey) -> Result<Option<String>, HostError> {
            if self.broken {
                return Err(HostError::Unavailable {
                    source_name: "session",
                });
            }
            Ok(match key {
                MetadataKey::GameDifficulty => Some("Difficulty_Hard".to_string()),
                MetadataKey::WorldSize => Some("WorldSize_Large".to_string()),
                MetadataKey::GameSpeed => None,
            })
        }
    }

    impl VictorySource for Session {
        fn victory_snapshot(&self) -> Result<Option<VictorySnapshot>, HostError> {
            Ok(self.victory.clone())
        }

        fn end_game_condition_activation(&self) -> Result<Option<String>, HostError> {
            self.activation.clone().unwrap_or(Ok(None))
        }
    }

    fn snapshot() -> VictorySnapshot {
        VictorySnapshot {
            end_game_definition_name: "EndGame_Standard".to_string(),
            end_game_condition_type: "ScoreVictory".to_string(),
            conditions: vec![
                EndGameConditionInfo {
                    condition_type: "Score".to_string(),
                    is_enabled: true,
                },
                EndGameConditionInfo {
                    condition_type: "Conquest".to_string(),
                    is_enabled: false,
                },
            ],
        }
    }

    #[test]
    fn game_settings_localize_or_keep_raw() {
        let settings = read_game_settings(&Session::default());
        assert_eq!(settings.difficulty, "Hard");
        assert_eq!(settings.map_size, "WorldSize_Large");
        assert_eq!(settings.game_speed, "Unknown");
    }

    #[test]
    fn game_settings_degrade_on_failure() {
        let session = Session {
            broken: true,
            ..Session::default()
        };
        assert_eq!(read_game_settings(&session), GameSettings::default());
    }

    #[test]
    fn victory_prefers_host_summary() {
        let session = Session {
            victory: Some(snapshot()),
            activation: Some(Ok(Some("Score:On".to_string()))),
            ..Session::default()
        };
        let victory = read_victory_settings(&session);
        assert_eq!(victory.victory_preset, "EndGame_Standard");
        assert_eq!(victory.actual_victory_condition, "ScoreVictory");
        assert_eq!(victory.victory_conditions_enabled, "Score:On");
    }

    #[test]
    fn victory_summary_rebuilt_when_host_fails() {
        let session = Session {
            victory: Some(snapshot()),
            activation: Some(Err(HostError::Read("analytics".into()))),
            ..Session::default()
        };
        let victory = read_victory_settings(&session);
        assert_eq!(victory.victory_conditions_enabled, "Score:True;Conquest:False");
    }

    #[test]
    fn missing_snapshot_keeps_defaults() {
        assert_eq!(
            read_victory_settings(&Session::default()),
            VictorySettings::default()
        );
    }
}
