//! Flattening of the territory defense frame.
//!
//! The frame holds one record per territory, each optionally carrying a nested
//! frame of militia units. Fields are looked up by name because the host may
//! rename or add them; a missing field reads as zero, and a record that fails
//! to read is skipped without aborting the walk.

use serde::{Deserialize, Serialize};

use crate::constants::{
    FIELD_FORTIFICATION, FIELD_FORTIFICATION_LEVEL, FIELD_MAX_FORTIFICATION, FIELD_MILITIA_UNITS,
    FIELD_TERRITORY_INDEX, FIELD_UNIT_DEFINITION, FIELD_UNIT_HEALTH, FIELD_UNIT_POWER,
    FIELD_UNIT_PRESENT,
};
use crate::error::RecordError;
use crate::numbers::{clamp_f64_to_f32, count_to_i32, round_f64_to_i32, saturate_i64_to_i32};
use crate::record::{Frame, Record, lookup, lookup_bool, lookup_f64, lookup_i64, lookup_string};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MilitiaUnit {
    pub unit_definition_name: String,
    pub is_present: bool,
    pub health_ratio: f32,
    pub power_estimation: f32,
}

/// Defensive state of one territory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TerritoryDefense {
    pub territory_index: i32,
    pub fortification: i32,
    pub max_fortification: i32,
    pub fortification_level: i32,
    pub militia_units: Vec<MilitiaUnit>,
    pub present_militia_count: i32,
    pub militia_power: f32,
}

/// Defense totals for one city.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CityDefense {
    pub territories: Vec<TerritoryDefense>,
    pub present_militia_count: i32,
    pub militia_power: f32,
    /// Headline values from the city's main territory; zero when it had no record.
    pub fortification: i32,
    pub fortification_level: i32,
}

fn read_militia_unit(record: &dyn Record) -> Result<MilitiaUnit, RecordError> {
    Ok(MilitiaUnit {
        unit_definition_name: lookup_string(record, FIELD_UNIT_DEFINITION)?,
        is_present: lookup_bool(record, FIELD_UNIT_PRESENT)?,
        health_ratio: clamp_f64_to_f32(lookup_f64(record, FIELD_UNIT_HEALTH)?),
        power_estimation: clamp_f64_to_f32(lookup_f64(record, FIELD_UNIT_POWER)?),
    })
}

fn read_militia_units(frame: &dyn Frame) -> Vec<MilitiaUnit> {
    let mut units = Vec::with_capacity(frame.len());
    for index in 0..frame.len() {
        match frame.record(index).and_then(|slot| slot.map(read_militia_unit).transpose()) {
            Ok(Some(unit)) => units.push(unit),
            Ok(None) => {}
            Err(err) => log::debug!("skipping militia unit {index}: {err}"),
        }
    }
    units
}

fn read_territory(record: &dyn Record) -> Result<TerritoryDefense, RecordError> {
    let militia_units = lookup(record, FIELD_MILITIA_UNITS)?
        .and_then(|value| value.as_frame())
        .map(read_militia_units)
        .unwrap_or_default();
    let present = militia_units.iter().filter(|unit| unit.is_present);
    let present_militia_count = count_to_i32(present.clone().count());
    let militia_power = present.map(|unit| unit.power_estimation).sum();

    Ok(TerritoryDefense {
        territory_index: saturate_i64_to_i32(lookup_i64(record, FIELD_TERRITORY_INDEX)?),
        fortification: round_f64_to_i32(lookup_f64(record, FIELD_FORTIFICATION)?),
        max_fortification: round_f64_to_i32(lookup_f64(record, FIELD_MAX_FORTIFICATION)?),
        fortification_level: saturate_i64_to_i32(lookup_i64(record, FIELD_FORTIFICATION_LEVEL)?),
        militia_units,
        present_militia_count,
        militia_power,
    })
}

/// Every readable territory record in `frame`.
#[must_use]
pub fn walk_territories(frame: &dyn Frame) -> Vec<TerritoryDefense> {
    let mut territories = Vec::with_capacity(frame.len());
    for index in 0..frame.len() {
        match frame.record(index).and_then(|slot| slot.map(read_territory).transpose()) {
            Ok(Some(territory)) => territories.push(territory),
            Ok(None) => {}
            Err(err) => log::debug!("skipping territory record {index}: {err}"),
        }
    }
    territories
}

/// Defense summary for a city owning `territory_indices`.
///
/// Territories come back in frame order. When several records share an index
/// the first one sets the headline fortification.
#[must_use]
pub fn city_defense(
    territories: &[TerritoryDefense],
    territory_indices: &[i32],
    main_territory_index: i32,
) -> CityDefense {
    let mut defense = CityDefense::default();
    let mut headline_set = false;
    for territory in territories
        .iter()
        .filter(|territory| territory_indices.contains(&territory.territory_index))
    {
        defense.present_militia_count = defense
            .present_militia_count
            .saturating_add(territory.present_militia_count);
        defense.militia_power += territory.militia_power;
        if !headline_set && territory.territory_index == main_territory_index {
            defense.fortification = territory.fortification;
            defense.fortification_level = territory.fortification_level;
            headline_set = true;
        }
        defense.territories.push(territory.clone());
    }
    defense
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn frame() -> serde_json::Value {
        json!({
            "data": [
                {
                    "TerritoryIndex": 4,
                    "Fortification": { "fixed": 120 << 16 },
                    "MaxFortification": 200,
                    "FortificationLevel": 2,
                    "MilitiaUnits": [
                        { "UnitDefinitionName": { "id": "Unit_Militia" }, "IsPresent": true,
                          "HealthRatio": 0.5, "PowerEstimation": { "fixed": "30.5" } },
                        { "UnitDefinitionName": { "id": "Unit_Militia" }, "IsPresent": false,
                          "PowerEstimation": 99 },
                        "corrupt"
                    ]
                },
                "not a record",
                { "Territory": 7, "FortificationValue": "15", "Militia": { "data": [
                    { "Present": true, "MilitaryPower": 10 }
                ], "length": 1 } },
                null,
                { "TerritoryIndex": 9 }
            ],
            "length": 4
        })
    }

    #[test]
    fn walk_reads_renamed_fields_and_skips_bad_records() {
        let territories = walk_territories(&frame());
        assert_eq!(territories.len(), 2);

        let first = &territories[0];
        assert_eq!(first.territory_index, 4);
        assert_eq!(first.fortification, 120);
        assert_eq!(first.max_fortification, 200);
        assert_eq!(first.fortification_level, 2);
        assert_eq!(first.militia_units.len(), 2);
        assert_eq!(first.militia_units[0].unit_definition_name, "Unit_Militia");
        assert_eq!(first.present_militia_count, 1);
        assert!((first.militia_power - 30.5).abs() < f32::EPSILON);

        let second = &territories[1];
        assert_eq!(second.territory_index, 7);
        assert_eq!(second.fortification, 15);
        assert_eq!(second.max_fortification, 0);
        assert_eq!(second.present_militia_count, 1);
    }

    #[test]
    fn city_defense_sums_matching_territories() {
        let territories = walk_territories(&frame());
        let defense = city_defense(&territories, &[4, 7], 4);
        assert_eq!(defense.territories.len(), 2);
        assert_eq!(defense.present_militia_count, 2);
        assert!((defense.militia_power - 40.5).abs() < f32::EPSILON);
        assert_eq!(defense.fortification, 120);
        assert_eq!(defense.fortification_level, 2);
    }

    #[test]
    fn city_without_matches_gets_zero_defense() {
        let territories = walk_territories(&frame());
        let defense = city_defense(&territories, &[11], 11);
        assert!(defense.territories.is_empty());
        assert_eq!(defense.present_militia_count, 0);
        assert_eq!(defense.fortification, 0);
        assert!(defense.militia_power.abs() < f32::EPSILON);
    }

    #[test]
    fn main_territory_outside_frame_keeps_zero_headline() {
        let territories = walk_territories(&frame());
        let defense = city_defense(&territories, &[7], 4);
        assert_eq!(defense.territories.len(), 1);
        assert_eq!(defense.fortification, 0);
        assert_eq!(defense.present_militia_count, 1);
    }
}
