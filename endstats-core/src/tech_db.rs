//! Technology database CSV dump.
//!
//! One row per (technology, unlock) pair with a fixed column order. The whole
//! file is rendered in memory and written once.

use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::io::Write;
use std::path::PathBuf;

use crate::config::ExportConfig;
use crate::constants::{
    FACTION_AFFINITY_PREFIX, FACTION_TRAIT_PREFIX, NO_UNLOCK_INDEX, NO_UNLOCK_LABEL,
    NO_UNLOCK_TITLE, TECH_DATABASE_COLUMNS, TECH_DATABASE_FILE_TAG, TECH_DATABASE_VERSION, UNKNOWN,
};
use crate::error::ExportError;
use crate::host::{
    FactionTraitPrerequisite, Localizer, PrerequisiteOperator, TechnologyInfo, TechnologySource,
    UnlockInfo,
};
use crate::numbers::{clamp_f64_to_f32, count_to_i32};
use crate::tech::TechNameResolver;
use crate::text::flatten_lines;

/// `FactionAffinity_Aspect` → `Aspect`, `FactionTrait_LastLord_Units` → `LastLord`.
#[must_use]
pub fn clean_major_faction_key(raw: &str) -> &str {
    if let Some(rest) = raw.strip_prefix(FACTION_AFFINITY_PREFIX) {
        return rest;
    }
    if let Some(rest) = raw.strip_prefix(FACTION_TRAIT_PREFIX) {
        return match rest.find('_') {
            Some(end) if end > 0 => &rest[..end],
            _ => rest,
        };
    }
    raw
}

/// Faction of the first `Any` prerequisite naming a trait.
#[must_use]
pub fn resolve_major_faction(prerequisites: &[FactionTraitPrerequisite]) -> &str {
    prerequisites
        .iter()
        .filter(|prerequisite| prerequisite.operator == PrerequisiteOperator::Any)
        .find(|prerequisite| !prerequisite.faction_trait.is_empty())
        .map_or("", |prerequisite| {
            clean_major_faction_key(&prerequisite.faction_trait)
        })
}

/// Map internal faction names onto their player-facing plural.
#[must_use]
pub fn normalize_major_faction(raw: &str) -> &str {
    match raw {
        "Aspect" | "Aspects" => "Aspects",
        "LastLord" => "Lords",
        "Mukag" => "Tahuks",
        "Necrophage" => "Necrophages",
        "KinOfSheredyn" => "Kin",
        other => other,
    }
}

const FACTION_UNLOCK_PREFIXES: [&str; 5] = [
    "Necrophage_",
    "LastLord_",
    "Mukag_",
    "KinOfSheredyn_",
    "Aspect_",
];

/// Coarse category of an unlock derived from its key prefix.
#[must_use]
pub fn derive_unlock_kind(unlock_key: &str) -> &'static str {
    if unlock_key.is_empty() {
        ""
    } else if unlock_key.starts_with("Unit_") {
        "UnitSpecialization"
    } else if unlock_key.starts_with("DistrictImprovement_") {
        "DistrictImprovement"
    } else if FACTION_UNLOCK_PREFIXES
        .iter()
        .any(|prefix| unlock_key.starts_with(prefix))
    {
        "FactionUnlock"
    } else if unlock_key.starts_with("ArmyActionType") {
        "ArmyAction"
    } else if unlock_key.starts_with("Converter_") {
        "Converter"
    } else {
        "Other"
    }
}

fn strip_suffix_ignore_case<'a>(value: &'a str, suffix: &str) -> Option<&'a str> {
    let split = value.len().checked_sub(suffix.len())?;
    let tail = value.get(split..)?;
    tail.eq_ignore_ascii_case(suffix).then(|| &value[..split])
}

fn clean_percent_title(raw: &str) -> String {
    let value = raw.strip_prefix('%').unwrap_or(raw);
    let value = strip_suffix_ignore_case(value, "Title")
        .or_else(|| strip_suffix_ignore_case(value, "Description"))
        .unwrap_or(value);
    value.replace('_', " ").trim().to_string()
}

fn anchor_inner_text(raw: &str) -> Option<&str> {
    let open = raw.find('<')?;
    let start = open + raw[open..].find('>')? + 1;
    let lower = raw.to_ascii_lowercase();
    let close = start + lower.get(start..)?.find("</a>")?;
    Some(raw[start..close].trim())
}

/// Readable effect title: `%Some_Key_Title` → `Some Key`, `<a=K>Text</a>` → `Text`.
#[must_use]
pub fn clean_effect_title(raw: &str) -> String {
    let raw = raw.trim();
    if raw.starts_with('%') {
        return clean_percent_title(raw);
    }
    if raw.to_ascii_lowercase().contains("<a=") {
        if let Some(inner) = anchor_inner_text(raw).filter(|inner| !inner.is_empty()) {
            return inner.to_string();
        }
    }
    raw.to_string()
}

/// Title and description shown for one unlock.
#[must_use]
pub fn effect_text<L>(localizer: &L, unlock: &UnlockInfo) -> (String, String)
where
    L: Localizer + ?Sized,
{
    let mapper = if unlock.ui_mapper_override_name.is_empty() {
        unlock.unlock_element_name.as_str()
    } else {
        unlock.ui_mapper_override_name.as_str()
    };
    if mapper.is_empty() {
        return (UNKNOWN.to_string(), String::new());
    }

    match localizer.title_and_description(mapper) {
        Ok(tooltip) => {
            let tooltip = tooltip.unwrap_or_default();
            let title = if tooltip.title.is_empty() {
                mapper
            } else {
                tooltip.title.as_str()
            };
            (clean_effect_title(title), flatten_lines(&tooltip.description))
        }
        Err(err) => (
            clean_effect_title(mapper),
            format!("Failed to resolve UI mapper: {err}"),
        ),
    }
}

/// Keep a value inside its CSV cell.
#[must_use]
pub fn sanitize_field(value: &str) -> String {
    value.replace(['\r', '\n'], " ").replace(',', ";").trim().to_string()
}

#[derive(Debug, Clone, PartialEq)]
pub struct TechDatabaseRow {
    pub tech_name: String,
    pub era_index: i32,
    pub research_cost: f32,
    pub major_faction: String,
    pub unlock_index: i32,
    pub unlock_type: String,
    pub unlock_category: String,
    pub amount: f32,
    pub unlock_key: String,
    pub unlock_kind: String,
    pub effect_title: String,
    pub effect_description: String,
}

impl TechDatabaseRow {
    /// # Errors
    ///
    /// Returns an error if the writer fails.
    pub fn write_csv<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        writeln!(
            writer,
            "{},{},{},{},{},{},{},{},{},{},{},{}",
            sanitize_field(&self.tech_name),
            self.era_index,
            self.research_cost,
            sanitize_field(&self.major_faction),
            self.unlock_index,
            sanitize_field(&self.unlock_type),
            sanitize_field(&self.unlock_category),
            self.amount,
            sanitize_field(&self.unlock_key),
            sanitize_field(&self.unlock_kind),
            sanitize_field(&self.effect_title),
            sanitize_field(&self.effect_description),
        )
    }
}

fn technology_rows<L>(
    localizer: &L,
    names: &TechNameResolver,
    info: &TechnologyInfo,
) -> Vec<TechDatabaseRow>
where
    L: Localizer + ?Sized,
{
    let tech_name = names.display_name(localizer, &info.technology_definition_name);
    let research_cost = clamp_f64_to_f32(info.research_cost);
    let major_faction = info
        .faction_trait_prerequisites
        .as_deref()
        .map(resolve_major_faction)
        .map_or_else(String::new, |raw| normalize_major_faction(raw).to_string());

    if info.unlocks.is_empty() {
        return vec![TechDatabaseRow {
            tech_name,
            era_index: info.era_index,
            research_cost,
            major_faction,
            unlock_index: NO_UNLOCK_INDEX,
            unlock_type: NO_UNLOCK_LABEL.to_string(),
            unlock_category: NO_UNLOCK_LABEL.to_string(),
            amount: 0.0,
            unlock_key: String::new(),
            unlock_kind: String::new(),
            effect_title: NO_UNLOCK_TITLE.to_string(),
            effect_description: String::new(),
        }];
    }

    info.unlocks
        .iter()
        .enumerate()
        .map(|(index, unlock)| {
            let (effect_title, effect_description) = effect_text(localizer, unlock);
            TechDatabaseRow {
                tech_name: tech_name.clone(),
                era_index: info.era_index,
                research_cost,
                major_faction: major_faction.clone(),
                unlock_index: count_to_i32(index),
                unlock_type: unlock.unlock_type.clone(),
                unlock_category: unlock.unlock_category.clone(),
                amount: clamp_f64_to_f32(unlock.amount),
                unlock_key: unlock.unlock_element_name.clone(),
                unlock_kind: derive_unlock_kind(&unlock.unlock_element_name).to_string(),
                effect_title,
                effect_description,
            }
        })
        .collect()
}

/// Rows for every distinct technology key, in listing order.
pub fn build_rows<L>(
    localizer: &L,
    names: &TechNameResolver,
    technologies: &[TechnologyInfo],
) -> Vec<TechDatabaseRow>
where
    L: Localizer + ?Sized,
{
    let mut seen = HashSet::new();
    technologies
        .iter()
        .filter(|info| seen.insert(info.technology_definition_name.as_str()))
        .flat_map(|info| technology_rows(localizer, names, info))
        .collect()
}

/// Comment preamble, header and rows.
///
/// # Errors
///
/// Returns an error if the writer fails.
pub fn write_tech_database<W: Write>(
    writer: &mut W,
    rows: &[TechDatabaseRow],
    tech_count: usize,
    generated_at: DateTime<Utc>,
) -> std::io::Result<()> {
    writeln!(writer, "# EL2 Technology Database Dump")?;
    writeln!(writer, "# ExportVersion={TECH_DATABASE_VERSION}")?;
    writeln!(writer, "# GeneratedAt={}", generated_at.to_rfc3339())?;
    writeln!(writer, "# TechCountApprox={tech_count}")?;
    writeln!(writer, "{}", TECH_DATABASE_COLUMNS.join(","))?;
    for row in rows {
        row.write_csv(writer)?;
    }
    Ok(())
}

/// File name for a dump taken at `timestamp`.
#[must_use]
pub fn tech_database_file_name(prefix: &str, timestamp: &str) -> String {
    format!("{prefix}_{TECH_DATABASE_FILE_TAG}_{timestamp}.csv")
}

/// Dump the technology database next to the end-game export.
///
/// Returns `Ok(None)` when the host lists no technologies.
///
/// # Errors
///
/// Returns an error if the technology list cannot be read or the file cannot
/// be written.
pub fn dump_tech_database<S>(
    snapshot: &S,
    names: &TechNameResolver,
    config: &ExportConfig,
    generated_at: DateTime<Utc>,
) -> Result<Option<PathBuf>, ExportError>
where
    S: TechnologySource + Localizer + ?Sized,
{
    let technologies = snapshot.technologies()?;
    if technologies.is_empty() {
        log::warn!("no technologies listed; skipping tech database dump");
        return Ok(None);
    }

    let rows = build_rows(snapshot, names, &technologies);
    let mut buffer = Vec::new();
    write_tech_database(&mut buffer, &rows, technologies.len(), generated_at)
        .map_err(|err| ExportError::io(&config.output_dir, err))?;

    std::fs::create_dir_all(&config.output_dir)
        .map_err(|err| ExportError::io(&config.output_dir, err))?;
    let timestamp = generated_at
        .format(crate::constants::FILE_TIMESTAMP_FORMAT)
        .to_string();
    let path = config
        .output_dir
        .join(tech_database_file_name(&config.file_prefix, &timestamp));
    std::fs::write(&path, buffer).map_err(|err| ExportError::io(&path, err))?;
    log::info!("saved tech database dump to {}", path.display());
    Ok(Some(path))
}
