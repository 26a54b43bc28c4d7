//! City breakdown section.

use serde::{Deserialize, Serialize};

use crate::error::ExportError;
use crate::host::{Localizer, Settlement, SettlementSource, SettlementStatus};
use crate::numbers::{clamp_f64_to_f32, count_to_i32};
use crate::text::{localize_or_raw, localized_title};
use crate::walker::{TerritoryDefense, city_defense, walk_territories};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CitySummary {
    pub empire_index: u8,
    pub name: String,
    pub is_capital: bool,

    pub territory_count: i32,
    pub extension_districts_count: i32,
    pub population: i32,
    pub max_population: i32,

    pub food_stock: f32,
    pub max_food_stock: f32,
    pub food_gain_in_percent: f32,
    pub turn_before_growth: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub growing_population_name: Option<String>,

    pub approval_net_in_percent: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settlement_approval_display_name: Option<String>,

    pub production_net: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_constructible_display_name: Option<String>,

    pub fortification: i32,
    pub fortification_level: i32,
    pub number_of_present_militia_units: i32,
    pub militia_power: f32,
    pub territories: Vec<TerritoryDefense>,
    pub is_besieged: bool,
    pub is_mutinous: bool,

    pub distance_with_capital: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CityBreakdown {
    pub city_count: i32,
    pub cities: Vec<CitySummary>,
}

/// Full cities only: outposts, camps and empty slots are dropped.
#[must_use]
pub fn is_full_city(settlement: &Settlement) -> bool {
    settlement.simulation_entity_guid != 0 && settlement.status == SettlementStatus::City
}

fn settlement_name(settlement: &Settlement) -> String {
    if settlement.entity_name.is_empty() {
        format!("Settlement {}", settlement.simulation_entity_guid)
    } else {
        settlement.entity_name.clone()
    }
}

fn summarize<L>(
    localizer: &L,
    settlement: &Settlement,
    territories: &[TerritoryDefense],
) -> CitySummary
where
    L: Localizer + ?Sized,
{
    let defense = city_defense(
        territories,
        &settlement.territory_indices,
        settlement.main_territory_index,
    );
    CitySummary {
        empire_index: settlement.empire_index,
        name: settlement_name(settlement),
        is_capital: settlement.is_capital,
        territory_count: settlement.territory_count,
        extension_districts_count: settlement.extension_districts_count,
        population: settlement.population,
        max_population: settlement.max_population,
        food_stock: clamp_f64_to_f32(settlement.food_stock),
        max_food_stock: clamp_f64_to_f32(settlement.max_food_stock),
        food_gain_in_percent: clamp_f64_to_f32(settlement.food_gain_in_percent),
        turn_before_growth: clamp_f64_to_f32(settlement.turn_before_growth),
        growing_population_name: localize_or_raw(localizer, &settlement.growing_population_name),
        approval_net_in_percent: clamp_f64_to_f32(settlement.approval_net_in_percent),
        settlement_approval_display_name: localized_title(
            localizer,
            &settlement.settlement_approval_definition_name,
        ),
        production_net: clamp_f64_to_f32(settlement.production_net),
        current_constructible_display_name: localized_title(
            localizer,
            &settlement.current_constructible_name,
        ),
        fortification: defense.fortification,
        fortification_level: defense.fortification_level,
        number_of_present_militia_units: defense.present_militia_count,
        militia_power: defense.militia_power,
        territories: defense.territories,
        is_besieged: settlement.is_besieged,
        is_mutinous: settlement.is_mutinous,
        distance_with_capital: settlement.distance_with_capital,
    }
}

/// Build the city breakdown; `Ok(None)` when there are no full cities.
///
/// A missing or unreadable defense frame leaves every city with zero defense
/// values rather than failing the section.
///
/// # Errors
///
/// Returns an error if the settlement list cannot be read.
pub fn build_city_breakdown<S>(snapshot: &S) -> Result<Option<CityBreakdown>, ExportError>
where
    S: SettlementSource + Localizer + ?Sized,
{
    let settlements = snapshot.settlements()?;
    if settlements.is_empty() {
        return Ok(None);
    }

    let territories = match snapshot.territory_defenses() {
        Ok(Some(frame)) => walk_territories(frame),
        Ok(None) => Vec::new(),
        Err(err) => {
            log::debug!("territory defense frame unavailable: {err}");
            Vec::new()
        }
    };

    let cities: Vec<CitySummary> = settlements
        .iter()
        .filter(|settlement| is_full_city(settlement))
        .map(|settlement| summarize(snapshot, settlement, &territories))
        .collect();

    if cities.is_empty() {
        return Ok(None);
    }
    Ok(Some(CityBreakdown {
        city_count: count_to_i32(cities.len()),
        cities,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HostError;
    use crate::host::TitleAndDescription;
    use crate::record::Frame;
    use serde_json::{Value, json};

    struct Snapshot {
        settlements: Vec<Settlement>,
        defenses: Option<Value>,
    }

    impl Localizer for Snapshot {
        fn localized_title(&self, key: &str) -> Result<Option<String>, HostError> {
            Ok(match key {
                "Approval_Content" => Some("<b>Content</b>".to_string()),
                "Population_Human" => Some("Humans".to_string()),
                _ => None,
            })
        }

        fn title_and_description(
            &self,
            _key: &str,
        ) -> Result<Option<TitleAndDescription>, HostError> {
            Ok(None)
        }
    }

    impl SettlementSource for Snapshot {
        fn settlements(&self) -> Result<Vec<Settlement>, HostError> {
            Ok(self.settlements.clone())
        }

        fn territory_defenses(&self) -> Result<Option<&dyn Frame>, HostError> {
            Ok(self.defenses.as_ref().map(|frame| frame as &dyn Frame))
        }
    }

    fn city(guid: u64, name: &str, territories: Vec<i32>) -> Settlement {
        Settlement {
            simulation_entity_guid: guid,
            entity_name: name.to_string(),
            status: SettlementStatus::City,
            main_territory_index: territories.first().copied().unwrap_or(-1),
            territory_indices: territories,
            ..Settlement::default()
        }
    }

    #[test]
    fn only_full_cities_are_kept() {
        let mut outpost = city(3, "Outpost", vec![]);
        outpost.status = SettlementStatus::Outpost;
        let snapshot = Snapshot {
            settlements: vec![city(1, "Ashen", vec![]), city(0, "Empty", vec![]), outpost],
            defenses: None,
        };
        let breakdown = build_city_breakdown(&snapshot).unwrap().unwrap();
        assert_eq!(breakdown.city_count, 1);
        assert_eq!(breakdown.cities[0].name, "Ashen");
    }

    #[test]
    fn names_and_labels_fall_back() {
        let mut settlement = city(42, "", vec![]);
        settlement.growing_population_name = "Population_Rodent".to_string();
        settlement.settlement_approval_definition_name = "Approval_Content".to_string();
        let snapshot = Snapshot {
            settlements: vec![settlement],
            defenses: None,
        };
        let breakdown = build_city_breakdown(&snapshot).unwrap().unwrap();
        let summary = &breakdown.cities[0];
        assert_eq!(summary.name, "Settlement 42");
        assert_eq!(summary.growing_population_name.as_deref(), Some("Population_Rodent"));
        assert_eq!(summary.settlement_approval_display_name.as_deref(), Some("Content"));
        assert_eq!(summary.current_constructible_display_name, None);
    }

    #[test]
    fn defense_comes_from_main_territory() {
        let snapshot = Snapshot {
            settlements: vec![city(1, "Ashen", vec![2, 5])],
            defenses: Some(json!([
                { "TerritoryIndex": 2, "Fortification": 80, "FortificationLevel": 1,
                  "MilitiaUnits": [{ "IsPresent": true, "PowerEstimation": 12 }] },
                { "TerritoryIndex": 5, "Fortification": 40,
                  "MilitiaUnits": [{ "IsPresent": true, "PowerEstimation": 3 }] },
                { "TerritoryIndex": 9, "Fortification": 999 }
            ])),
        };
        let breakdown = build_city_breakdown(&snapshot).unwrap().unwrap();
        let summary = &breakdown.cities[0];
        assert_eq!(summary.fortification, 80);
        assert_eq!(summary.fortification_level, 1);
        assert_eq!(summary.number_of_present_militia_units, 2);
        assert!((summary.militia_power - 15.0).abs() < f32::EPSILON);
        assert_eq!(summary.territories.len(), 2);
    }

    #[test]
    fn no_cities_means_no_section() {
        let snapshot = Snapshot {
            settlements: Vec::new(),
            defenses: None,
        };
        assert!(build_city_breakdown(&snapshot).unwrap().is_none());
    }
}
