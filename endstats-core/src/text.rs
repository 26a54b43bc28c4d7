//! Text cleanup for host keys and localized strings.
use regex::Regex;
use std::sync::OnceLock;

use crate::constants::UNKNOWN;
use crate::host::Localizer;

fn markup_tag() -> Option<&'static Regex> {
    static TAG: OnceLock<Option<Regex>> = OnceLock::new();
    TAG.get_or_init(|| Regex::new("<[^>]*>").ok()).as_ref()
}

/// Turn a raw key such as `Faction_Necrophage` into `Necrophage`.
///
/// Strips `prefix` (case-insensitive) when present, replaces underscores with
/// spaces and title-cases each word. Empty input and the `Unknown` sentinel
/// come back as `Unknown`.
#[must_use]
pub fn prettify(raw: &str, prefix: Option<&str>) -> String {
    if raw.is_empty() || raw.eq_ignore_ascii_case(UNKNOWN) {
        return UNKNOWN.to_string();
    }

    let stripped = prefix
        .filter(|prefix| !prefix.is_empty())
        .and_then(|prefix| strip_prefix_ignore_case(raw, prefix))
        .unwrap_or(raw);

    let mut pretty = String::with_capacity(stripped.len());
    let mut new_word = true;
    for ch in stripped.replace('_', " ").chars() {
        if ch.is_whitespace() {
            new_word = true;
            pretty.push(ch);
        } else if new_word {
            pretty.extend(ch.to_uppercase());
            new_word = false;
        } else {
            pretty.extend(ch.to_lowercase());
        }
    }
    pretty
}

fn strip_prefix_ignore_case<'a>(raw: &'a str, prefix: &str) -> Option<&'a str> {
    let head = raw.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &raw[prefix.len()..])
}

/// Remove `<...>` UI markup, trimming the result when anything was removed.
#[must_use]
pub fn strip_markup(input: &str) -> String {
    if !input.contains('<') {
        return input.to_string();
    }
    markup_tag().map_or_else(
        || input.trim().to_string(),
        |tag| tag.replace_all(input, "").trim().to_string(),
    )
}

/// Localized title for `key` with markup removed; `None` when unavailable.
pub fn localized_title<L>(localizer: &L, key: &str) -> Option<String>
where
    L: Localizer + ?Sized,
{
    if key.is_empty() {
        return None;
    }
    match localizer.localized_title(key) {
        Ok(title) => title
            .map(|title| strip_markup(&title))
            .filter(|title| !title.is_empty()),
        Err(err) => {
            log::debug!("localization of {key} failed: {err}");
            None
        }
    }
}

/// Localized title, or the raw value when no localization exists.
pub fn localize_or_raw<L>(localizer: &L, value: &str) -> Option<String>
where
    L: Localizer + ?Sized,
{
    if value.is_empty() {
        return None;
    }
    Some(localized_title(localizer, value).unwrap_or_else(|| value.to_string()))
}

/// Localized title, else a prettified key, else the sentinel.
pub fn localize_or_prettify<L>(localizer: &L, value: &str) -> String
where
    L: Localizer + ?Sized,
{
    if value.is_empty() {
        return UNKNOWN.to_string();
    }
    localized_title(localizer, value).unwrap_or_else(|| prettify(value, None))
}

/// Replace line breaks with spaces and trim.
#[must_use]
pub fn flatten_lines(raw: &str) -> String {
    raw.replace(['\r', '\n'], " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HostError;
    use crate::host::TitleAndDescription;
    use std::collections::HashMap;

    struct Table(HashMap<&'static str, &'static str>);

    impl Localizer for Table {
        fn localized_title(&self, key: &str) -> Result<Option<String>, HostError> {
            if key == "Broken" {
                return Err(HostError::Read("bad key".into()));
            }
            Ok(self.0.get(key).map(|title| (*title).to_string()))
        }

        fn title_and_description(
            &self,
            _key: &str,
        ) -> Result<Option<TitleAndDescription>, HostError> {
            Ok(None)
        }
    }

    fn table() -> Table {
        Table(HashMap::from([
            ("WorldSize_Large", "<c=FFF>Large</c> "),
            ("Difficulty_Hard", "Hard"),
        ]))
    }

    #[test]
    fn prettify_strips_prefix_and_title_cases() {
        assert_eq!(prettify("Faction_Necrophage", Some("Faction_")), "Necrophage");
        assert_eq!(prettify("faction_last_lord", Some("Faction_")), "Last Lord");
        assert_eq!(prettify("WORLD_SIZE_LARGE", None), "World Size Large");
    }

    #[test]
    fn prettify_returns_sentinel_for_empty_input() {
        assert_eq!(prettify("", Some("Faction_")), "Unknown");
        assert_eq!(prettify("unknown", None), "Unknown");
    }

    #[test]
    fn prettify_keeps_text_shorter_than_prefix() {
        assert_eq!(prettify("Fac", Some("Faction_")), "Fac");
    }

    #[test]
    fn strip_markup_removes_tags() {
        assert_eq!(strip_markup("<a=Tech_Key>Scavenging</a>"), "Scavenging");
        assert_eq!(strip_markup(" plain "), " plain ");
    }

    #[test]
    fn localization_helpers_fall_back() {
        let table = table();
        assert_eq!(localized_title(&table, "WorldSize_Large").as_deref(), Some("Large"));
        assert_eq!(localized_title(&table, "Broken"), None);
        assert_eq!(
            localize_or_raw(&table, "GameSpeed_Fast").as_deref(),
            Some("GameSpeed_Fast")
        );
        assert_eq!(localize_or_raw(&table, ""), None);
        assert_eq!(localize_or_prettify(&table, "GameSpeed_Fast"), "Gamespeed Fast");
        assert_eq!(localize_or_prettify(&table, "Difficulty_Hard"), "Hard");
        assert_eq!(localize_or_prettify(&table, ""), "Unknown");
    }

    #[test]
    fn flatten_lines_joins_text() {
        assert_eq!(flatten_lines(" a\r\nb\n"), "a  b");
    }
}
