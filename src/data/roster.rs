//! Faction and unit queries over the loaded tables.

use serde::Serialize;

use crate::data::loader::normalize_lookup;
use crate::data::tables::{Tables, UnitRecord, WeaponRecord};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericStat {
    pub label: &'static str,
    pub value: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextStat {
    pub label: &'static str,
    pub value: String,
}

/// A unit row split into numeric and text stats for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Datasheet {
    pub name: String,
    pub faction: String,
    pub numeric: Vec<NumericStat>,
    pub text: Vec<TextStat>,
}

impl UnitRecord {
    pub fn datasheet(&self) -> Datasheet {
        let numeric = vec![
            NumericStat { label: "T", value: self.toughness },
            NumericStat { label: "W", value: self.wounds },
            NumericStat { label: "OC", value: self.objective_control },
        ];
        let mut text = vec![
            TextStat { label: "M", value: self.movement.clone() },
            TextStat { label: "SV", value: self.save.clone() },
            TextStat { label: "LD", value: self.leadership.clone() },
        ];
        if let Some(inv) = self.invulnerable_save.as_ref().filter(|v| !v.trim().is_empty()) {
            text.push(TextStat { label: "INV_SV", value: inv.clone() });
        }
        if let Some(abilities) = self.abilities.as_ref().filter(|v| !v.trim().is_empty()) {
            text.push(TextStat { label: "ABILITIES", value: abilities.clone() });
        }
        Datasheet {
            name: self.name.clone(),
            faction: self.faction.clone(),
            numeric,
            text,
        }
    }
}

impl Tables {
    /// Distinct factions in the order they first appear.
    pub fn factions(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for unit in &self.units {
            if !seen.iter().any(|f| *f == unit.faction) {
                seen.push(&unit.faction);
            }
        }
        seen
    }

    pub fn units_in_faction(&self, faction: &str) -> Vec<&UnitRecord> {
        let wanted = normalize_lookup(faction);
        let mut units: Vec<&UnitRecord> = Vec::new();
        for unit in &self.units {
            if normalize_lookup(&unit.faction) == wanted
                && !units.iter().any(|u| u.name == unit.name)
            {
                units.push(unit);
            }
        }
        units
    }

    /// Exact name first, then a case/separator-insensitive match.
    pub fn unit(&self, name: &str) -> Option<&UnitRecord> {
        if let Some(unit) = self.units.iter().find(|u| u.name == name) {
            return Some(unit);
        }
        let normalized = normalize_lookup(name);
        self.units
            .iter()
            .find(|u| normalize_lookup(&u.name) == normalized)
    }

    pub fn weapons_for_unit(&self, unit_name: &str) -> Vec<&WeaponRecord> {
        self.weapons.iter().filter(|w| w.unit == unit_name).collect()
    }

    pub fn weapons_for_units(&self, unit_names: &[&str]) -> Vec<&WeaponRecord> {
        self.weapons
            .iter()
            .filter(|w| unit_names.contains(&w.unit.as_str()))
            .collect()
    }
}
