//! Best-effort empire faction resolution.
//!
//! Faction keys live in host records whose layout is not guaranteed, so the
//! resolver runs an ordered chain of strategies. Each strategy either finds a
//! non-empty key, finds nothing, or fails; failures are logged and the chain
//! moves on. When every strategy comes up empty the result is `Unknown`.

use crate::constants::{
    FACTION_PREFIX, FIELD_MAJOR_FACTION_DEFINITION, FIELD_NAME, PATTERN_EMPIRE, PATTERN_FACTION,
    UNKNOWN,
};
use crate::error::{HostError, RecordError};
use crate::host::EmpireDirectory;
use crate::record::{FieldValue, Record};
use crate::text::prettify;

/// Why a strategy could not produce a key.
#[derive(Debug, thiserror::Error)]
pub enum StrategyError {
    #[error(transparent)]
    Host(#[from] HostError),
    #[error(transparent)]
    Record(#[from] RecordError),
}

/// One way of finding an empire's faction key.
pub trait FactionStrategy {
    fn name(&self) -> &'static str;

    /// # Errors
    ///
    /// Returns an error if the underlying host data cannot be read.
    fn resolve(
        &self,
        directory: &dyn EmpireDirectory,
        empire_index: usize,
    ) -> Result<Option<String>, StrategyError>;
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_ascii_lowercase().contains(needle)
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

/// Scan `record` for the first field accepted by `matches` holding a non-empty key.
fn scan_fields(
    record: &dyn Record,
    matches: impl Fn(&str, &FieldValue<'_>) -> bool,
) -> Result<Option<String>, RecordError> {
    for name in record.field_names() {
        let Some(value) = record.field(&name)? else {
            continue;
        };
        if !matches(name.as_ref(), &value) {
            continue;
        }
        if let Some(key) = value.as_str().and_then(non_empty) {
            return Ok(Some(key));
        }
    }
    Ok(None)
}

/// Identifier-typed field of the current empire info whose name mentions "faction".
#[derive(Debug, Clone, Copy, Default)]
pub struct DeclaredFactionField;

impl FactionStrategy for DeclaredFactionField {
    fn name(&self) -> &'static str {
        "empire-info identifier"
    }

    fn resolve(
        &self,
        directory: &dyn EmpireDirectory,
        empire_index: usize,
    ) -> Result<Option<String>, StrategyError> {
        let Some(info) = directory.empire_info(empire_index)? else {
            return Ok(None);
        };
        Ok(scan_fields(info, |name, value| {
            matches!(value, FieldValue::Identifier(_)) && contains_ignore_case(name, PATTERN_FACTION)
        })?)
    }
}

/// Plain string field of the current empire info naming a faction or empire.
#[derive(Debug, Clone, Copy, Default)]
pub struct FactionLikeField;

impl FactionStrategy for FactionLikeField {
    fn name(&self) -> &'static str {
        "empire-info text"
    }

    fn resolve(
        &self,
        directory: &dyn EmpireDirectory,
        empire_index: usize,
    ) -> Result<Option<String>, StrategyError> {
        let Some(info) = directory.empire_info(empire_index)? else {
            return Ok(None);
        };
        Ok(scan_fields(info, |name, value| {
            matches!(value, FieldValue::Text(_))
                && (contains_ignore_case(name, PATTERN_FACTION)
                    || contains_ignore_case(name, PATTERN_EMPIRE))
        })?)
    }
}

/// Legacy registry: major empire → faction definition → name.
#[derive(Debug, Clone, Copy, Default)]
pub struct LegacyRegistry;

impl FactionStrategy for LegacyRegistry {
    fn name(&self) -> &'static str {
        "legacy registry"
    }

    fn resolve(
        &self,
        directory: &dyn EmpireDirectory,
        empire_index: usize,
    ) -> Result<Option<String>, StrategyError> {
        let Some(empire) = directory.legacy_major_empire(empire_index)? else {
            return Ok(None);
        };
        let Some(definition) = empire
            .field(FIELD_MAJOR_FACTION_DEFINITION)?
            .and_then(|value| value.as_record())
        else {
            return Ok(None);
        };
        Ok(definition
            .field(FIELD_NAME)?
            .and_then(|value| value.as_str().and_then(non_empty)))
    }
}

/// Ordered chain of faction strategies.
pub struct FactionResolver {
    strategies: Vec<Box<dyn FactionStrategy>>,
}

impl Default for FactionResolver {
    fn default() -> Self {
        Self::new(vec![
            Box::new(DeclaredFactionField),
            Box::new(FactionLikeField),
            Box::new(LegacyRegistry),
        ])
    }
}

impl FactionResolver {
    #[must_use]
    pub fn new(strategies: Vec<Box<dyn FactionStrategy>>) -> Self {
        Self { strategies }
    }

    /// Faction key for `empire_index`, or `Unknown`. Never fails.
    pub fn resolve_faction_key<D>(&self, directory: &D, empire_index: usize) -> String
    where
        D: EmpireDirectory,
    {
        for strategy in &self.strategies {
            match strategy.resolve(directory, empire_index) {
                Ok(Some(key)) => return key,
                Ok(None) => {}
                Err(err) => log::debug!(
                    "faction strategy '{}' failed for empire {empire_index}: {err}",
                    strategy.name()
                ),
            }
        }
        UNKNOWN.to_string()
    }

    /// Faction key paired with its display name.
    pub fn resolve_identity<D>(&self, directory: &D, empire_index: usize) -> FactionIdentity
    where
        D: EmpireDirectory,
    {
        let key = self.resolve_faction_key(directory, empire_index);
        let display_name = prettify(&key, Some(FACTION_PREFIX));
        FactionIdentity { key, display_name }
    }
}

/// Resolved faction key and its human-readable form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactionIdentity {
    pub key: String,
    pub display_name: String,
}
