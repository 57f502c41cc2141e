//! Row types for the units, weapons, keywords and images tables.
//! Column names follow the upper-case headers of the exported CSV files.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitRecord {
    #[serde(rename = "NAME")]
    pub name: String,
    #[serde(rename = "RACE")]
    pub faction: String,
    #[serde(rename = "M")]
    pub movement: String,
    #[serde(rename = "T")]
    pub toughness: u32,
    #[serde(rename = "SV")]
    pub save: String,
    #[serde(rename = "W")]
    pub wounds: u32,
    #[serde(rename = "LD")]
    pub leadership: String,
    #[serde(rename = "OC")]
    pub objective_control: u32,
    #[serde(rename = "INV_SV", default)]
    pub invulnerable_save: Option<String>,
    #[serde(rename = "ABILITIES", default)]
    pub abilities: Option<String>,
}

/// One weapon profile. `A` and `BS` stay as table text; the calculator parses them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeaponRecord {
    #[serde(rename = "WEAPONS")]
    pub name: String,
    #[serde(rename = "UNITS")]
    pub unit: String,
    #[serde(rename = "RANGE")]
    pub range: String,
    #[serde(rename = "A")]
    pub attacks: String,
    #[serde(rename = "BS")]
    pub ballistic_skill: String,
    #[serde(rename = "S")]
    pub strength: String,
    #[serde(rename = "AP")]
    pub armour_penetration: String,
    #[serde(rename = "D")]
    pub damage: String,
    #[serde(rename = "KEYWORDS", default)]
    pub keywords: String,
}

impl WeaponRecord {
    /// Raw comma-separated keyword cells, trimmed, empties dropped.
    pub fn keyword_list(&self) -> impl Iterator<Item = &str> {
        self.keywords
            .split(',')
            .map(str::trim)
            .filter(|kw| !kw.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordRecord {
    #[serde(rename = "ABILITY")]
    pub name: String,
    #[serde(rename = "DESCRIPTION")]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRecord {
    /// "<unit> (<page>)"
    #[serde(rename = "NAME")]
    pub name: String,
    #[serde(rename = "IMAGE_ENCODED")]
    pub encoded: String,
}

#[derive(Debug, Clone, Default)]
pub struct Tables {
    pub units: Vec<UnitRecord>,
    pub weapons: Vec<WeaponRecord>,
    pub keywords: Vec<KeywordRecord>,
    pub images: Vec<ImageRecord>,
}
