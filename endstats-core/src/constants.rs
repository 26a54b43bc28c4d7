//! Centralized keys, prefixes and sentinels for the end-game export.
//!
//! These values define the on-disk shape of every artifact.

// Document versions --------------------------------------------------------
pub const EXPORT_VERSION: &str = "1.0";
pub const TECH_DATABASE_VERSION: u32 = 6;

// Sentinels ----------------------------------------------------------------
pub const UNKNOWN: &str = "Unknown";
pub const NO_LEADER_INDEX: i32 = -1;
pub const NO_LEADER_SCORE: f32 = f32::MIN;
pub const UNREACHED_ERA_TURN: i32 = 0;
pub const FALLBACK_FIRST_ERA_TURN: i32 = 1;

// Key prefixes -------------------------------------------------------------
pub const FACTION_PREFIX: &str = "Faction_";
pub const FACTION_AFFINITY_PREFIX: &str = "FactionAffinity_";
pub const FACTION_TRAIT_PREFIX: &str = "FactionTrait_";

// File naming --------------------------------------------------------------
pub const DEFAULT_FILE_PREFIX: &str = "EL2";
pub const END_GAME_FILE_TAG: &str = "EndGame";
pub const TECH_DATABASE_FILE_TAG: &str = "TechDatabase";
pub const FILE_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

// Host record field names ----------------------------------------------------
// Each list is tried in order; later entries cover renamed fields.
pub(crate) const FIELD_TERRITORY_INDEX: &[&str] = &["TerritoryIndex", "Territory"];
pub(crate) const FIELD_FORTIFICATION: &[&str] = &["Fortification", "FortificationValue"];
pub(crate) const FIELD_MAX_FORTIFICATION: &[&str] = &["MaxFortification", "FortificationMax"];
pub(crate) const FIELD_FORTIFICATION_LEVEL: &[&str] = &["FortificationLevel", "DefenseLevel"];
pub(crate) const FIELD_MILITIA_UNITS: &[&str] = &["MilitiaUnits", "MilitiaUnitInfo", "Militia"];
pub(crate) const FIELD_UNIT_DEFINITION: &[&str] = &["UnitDefinitionName", "UnitDefinition"];
pub(crate) const FIELD_UNIT_PRESENT: &[&str] = &["IsPresent", "Present"];
pub(crate) const FIELD_UNIT_HEALTH: &[&str] = &["HealthRatio", "Health"];
pub(crate) const FIELD_UNIT_POWER: &[&str] = &["PowerEstimation", "MilitaryPower"];
pub(crate) const FIELD_MAJOR_FACTION_DEFINITION: &str = "MajorFactionDefinition";
pub(crate) const FIELD_NAME: &str = "Name";

// Name patterns ------------------------------------------------------------
pub(crate) const PATTERN_FACTION: &str = "faction";
pub(crate) const PATTERN_EMPIRE: &str = "empire";

// CSV ----------------------------------------------------------------------
pub const TECH_DATABASE_COLUMNS: [&str; 12] = [
    "TechName",
    "EraIndex",
    "ResearchCost",
    "MajorFaction",
    "UnlockIndex",
    "UnlockType",
    "UnlockCategory",
    "Amount",
    "UnlockKey",
    "UnlockKind",
    "EffectTitle",
    "EffectDescription",
];
pub(crate) const NO_UNLOCK_INDEX: i32 = -1;
pub(crate) const NO_UNLOCK_LABEL: &str = "None";
pub(crate) const NO_UNLOCK_TITLE: &str = "No unlock info";
