use std::collections::HashSet;
use std::fmt;

use crate::calc::{AttackCount, BallisticSkill};
use crate::data::images::{decode_image, image_key};
use crate::data::keywords::normalize_keyword;
use crate::data::tables::Tables;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ValidationSeverity {
    Error,
    Warning,
    Info,
}

impl ValidationSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

impl fmt::Display for ValidationSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationDiagnostic {
    pub severity: ValidationSeverity,
    pub context: String,
    pub message: String,
}

impl fmt::Display for ValidationDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.context, self.message)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub diagnostics: Vec<ValidationDiagnostic>,
}

impl ValidationReport {
    pub fn push(
        &mut self,
        severity: ValidationSeverity,
        context: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.diagnostics.push(ValidationDiagnostic {
            severity,
            context: context.into(),
            message: message.into(),
        });
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|diag| diag.severity == ValidationSeverity::Error)
    }

    pub fn count(&self, severity: ValidationSeverity) -> usize {
        self.diagnostics
            .iter()
            .filter(|diag| diag.severity == severity)
            .count()
    }
}

pub fn validate_tables(tables: &Tables) -> ValidationReport {
    let mut report = ValidationReport::default();

    let mut seen_units = HashSet::new();
    for (index, unit) in tables.units.iter().enumerate() {
        let context = format!("units[{index}]");
        if unit.name.trim().is_empty() {
            report.push(ValidationSeverity::Error, &context, "NAME is empty");
            continue;
        }
        if unit.faction.trim().is_empty() {
            report.push(
                ValidationSeverity::Error,
                &context,
                format!("RACE is empty for '{}'", unit.name),
            );
        }
        if !seen_units.insert(unit.name.as_str()) {
            report.push(
                ValidationSeverity::Error,
                &context,
                format!("duplicate unit '{}'", unit.name),
            );
        }
    }

    let glossary: HashSet<String> = tables
        .keywords
        .iter()
        .map(|k| k.name.to_lowercase())
        .collect();
    let mut reported_keywords = HashSet::new();

    for (index, weapon) in tables.weapons.iter().enumerate() {
        let context = format!("weapons[{index}] '{}'", weapon.name);
        if !seen_units.contains(weapon.unit.as_str()) {
            report.push(
                ValidationSeverity::Warning,
                &context,
                format!("references unknown unit '{}'", weapon.unit),
            );
        }
        if let Err(err) = weapon.attacks.parse::<AttackCount>() {
            report.push(ValidationSeverity::Error, &context, err.to_string());
        }
        if let Err(err) = weapon.ballistic_skill.parse::<BallisticSkill>() {
            report.push(ValidationSeverity::Error, &context, err.to_string());
        }
        for raw in weapon.keyword_list() {
            let keyword = normalize_keyword(raw);
            if keyword.is_empty() || keyword.eq_ignore_ascii_case("none") {
                continue;
            }
            if !glossary.contains(&keyword.to_lowercase())
                && reported_keywords.insert(keyword.clone())
            {
                report.push(
                    ValidationSeverity::Info,
                    &context,
                    format!("keyword '{keyword}' has no glossary entry"),
                );
            }
        }
    }

    for (index, image) in tables.images.iter().enumerate() {
        if let Err(err) = decode_image(&image.name, &image.encoded) {
            report.push(
                ValidationSeverity::Error,
                format!("images[{index}]"),
                err.to_string(),
            );
        }
    }

    let image_names: HashSet<&str> = tables.images.iter().map(|i| i.name.as_str()).collect();
    for unit in &tables.units {
        if !image_names.contains(image_key(&unit.name, 1).as_str()) {
            report.push(
                ValidationSeverity::Info,
                format!("unit '{}'", unit.name),
                "no datasheet image",
            );
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::tables::{ImageRecord, UnitRecord, WeaponRecord};

    fn unit(name: &str) -> UnitRecord {
        UnitRecord {
            name: name.to_string(),
            faction: "orks".to_string(),
            movement: "6\"".to_string(),
            toughness: 5,
            save: "5+".to_string(),
            wounds: 1,
            leadership: "7+".to_string(),
            objective_control: 2,
            invulnerable_save: None,
            abilities: None,
        }
    }

    fn weapon(unit: &str, attacks: &str, bs: &str) -> WeaponRecord {
        WeaponRecord {
            name: "slugga".to_string(),
            unit: unit.to_string(),
            range: "12\"".to_string(),
            attacks: attacks.to_string(),
            ballistic_skill: bs.to_string(),
            strength: "4".to_string(),
            armour_penetration: "0".to_string(),
            damage: "1".to_string(),
            keywords: "Pistol".to_string(),
        }
    }

    #[test]
    fn clean_tables_have_no_errors() {
        let tables = Tables {
            units: vec![unit("Boyz")],
            weapons: vec![weapon("Boyz", "1", "5+")],
            images: vec![ImageRecord {
                name: "Boyz (1)".to_string(),
                encoded: "aGVsbG8=".to_string(),
            }],
            ..Tables::default()
        };
        let report = validate_tables(&tables);
        assert!(!report.has_errors(), "{:?}", report.diagnostics);
        assert_eq!(report.count(ValidationSeverity::Info), 1);
    }

    #[test]
    fn flags_duplicates_bad_stats_and_orphans() {
        let tables = Tables {
            units: vec![unit("Boyz"), unit("Boyz")],
            weapons: vec![weapon("Boyz", "many", "5+"), weapon("Grots", "1", "X")],
            ..Tables::default()
        };
        let report = validate_tables(&tables);
        assert!(report.has_errors());
        assert_eq!(report.count(ValidationSeverity::Error), 3);
        assert_eq!(report.count(ValidationSeverity::Warning), 1);
    }
}
