//! Weapon keyword normalisation and glossary lookup.
//!
//! Weapon rows carry parameterised keywords ("Sustained Hits 1", "Anti-Infantry 4+");
//! the glossary is keyed by the bare ability name.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::data::tables::Tables;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeywordEntry {
    pub name: String,
    pub description: String,
}

/// Reduce a weapon keyword to its glossary name.
pub fn normalize_keyword(raw: &str) -> String {
    let stripped: String = raw.chars().filter(|c| !c.is_ascii_digit()).collect();
    let keyword = stripped.trim();
    let lower = keyword.to_lowercase();

    if lower.contains("anti") {
        return "Anti".to_string();
    }
    if lower.ends_with('x') || lower.ends_with('+') {
        let mut words: Vec<&str> = keyword.split(' ').collect();
        words.pop();
        return words.join(" ").trim().to_string();
    }
    keyword.to_string()
}

impl Tables {
    pub fn keyword_definition(&self, name: &str) -> Option<&str> {
        self.keywords
            .iter()
            .find(|k| k.name == name)
            .or_else(|| {
                self.keywords
                    .iter()
                    .find(|k| k.name.eq_ignore_ascii_case(name))
            })
            .map(|k| k.description.as_str())
    }

    /// Glossary entries for the requested names; unknown names are skipped.
    pub fn keyword_definitions(&self, names: &[&str]) -> Vec<KeywordEntry> {
        names
            .iter()
            .filter_map(|name| {
                self.keyword_definition(name).map(|description| KeywordEntry {
                    name: (*name).to_string(),
                    description: description.to_string(),
                })
            })
            .collect()
    }

    /// Distinct normalised keywords used by the given units' weapons, sorted.
    pub fn keyword_names_for_units(&self, unit_names: &[&str]) -> BTreeSet<String> {
        self.weapons_for_units(unit_names)
            .into_iter()
            .flat_map(|w| w.keyword_list())
            .map(normalize_keyword)
            .filter(|kw| !kw.is_empty() && !kw.eq_ignore_ascii_case("none"))
            .collect()
    }

    /// Keywords used by the given units, with their glossary text.
    pub fn keywords_for_units(&self, unit_names: &[&str]) -> Vec<KeywordEntry> {
        let names = self.keyword_names_for_units(unit_names);
        let mut entries = Vec::with_capacity(names.len());
        for name in &names {
            match self.keyword_definition(name) {
                Some(description) => entries.push(KeywordEntry {
                    name: name.clone(),
                    description: description.to_string(),
                }),
                None => log::debug!("(keywords_for_units) no glossary entry for '{name}'"),
            }
        }
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::tables::{KeywordRecord, WeaponRecord};

    #[test]
    fn strips_numeric_parameters() {
        assert_eq!(normalize_keyword("Sustained Hits 1"), "Sustained Hits");
        assert_eq!(normalize_keyword(" Rapid Fire 2 "), "Rapid Fire");
        assert_eq!(normalize_keyword("Melta 2"), "Melta");
        assert_eq!(normalize_keyword("Blast"), "Blast");
    }

    #[test]
    fn anti_keywords_collapse() {
        assert_eq!(normalize_keyword("Anti-Infantry 4+"), "Anti");
        assert_eq!(normalize_keyword("anti-vehicle 2+"), "Anti");
    }

    #[test]
    fn trailing_roll_words_are_dropped() {
        assert_eq!(normalize_keyword("Feel No Pain 5+"), "Feel No Pain");
        assert_eq!(normalize_keyword("Deadly Demise Dx"), "Deadly Demise");
    }

    fn weapon(unit: &str, keywords: &str) -> WeaponRecord {
        WeaponRecord {
            name: format!("{unit} gun"),
            unit: unit.to_string(),
            range: "24\"".to_string(),
            attacks: "1".to_string(),
            ballistic_skill: "3".to_string(),
            strength: "4".to_string(),
            armour_penetration: "-1".to_string(),
            damage: "1".to_string(),
            keywords: keywords.to_string(),
        }
    }

    #[test]
    fn unit_keywords_are_deduped_and_joined_to_glossary() {
        let tables = Tables {
            weapons: vec![
                weapon("A", "Rapid Fire 1, Heavy"),
                weapon("A", "none"),
                weapon("B", "Rapid Fire 2,Assault"),
                weapon("C", "Torrent"),
            ],
            keywords: vec![
                KeywordRecord {
                    name: "Rapid Fire".to_string(),
                    description: "Extra attacks at half range.".to_string(),
                },
                KeywordRecord {
                    name: "Heavy".to_string(),
                    description: "+1 to hit if stationary.".to_string(),
                },
            ],
            ..Tables::default()
        };

        let names: Vec<String> = tables.keyword_names_for_units(&["A", "B"]).into_iter().collect();
        assert_eq!(names, vec!["Assault", "Heavy", "Rapid Fire"]);

        let entries = tables.keywords_for_units(&["A", "B"]);
        let with_text: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(with_text, vec!["Heavy", "Rapid Fire"]);

        let picked = tables.keyword_definitions(&["heavy", "Torrent"]);
        assert_eq!(picked.len(), 1);
        assert_eq!(picked[0].description, "+1 to hit if stationary.");
    }
}
