use std::fmt;

use serde::{Deserialize, Serialize};

use crate::calc::unit::{HIT_MODIFIER_RANGE, SAVE_ROLL_RANGE};
use crate::calc::{
    calculate_expected_hits, calculate_unit_hits, AttackCount, BallisticSkill, CalcError,
    ExpectedHits, WeaponHits,
};
use crate::dashboard::Dashboard;
use crate::data::{
    datasheet_image, image_key, Datasheet, DatasheetImage, ImageError, KeywordEntry,
    WeaponRecord,
};

#[derive(Debug, Clone, Serialize)]
pub struct ValidationIssue {
    pub field: &'static str,
    pub messages: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationErrorResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub errors: Vec<ValidationIssue>,
}

impl ValidationErrorResponse {
    fn new(errors: Vec<ValidationIssue>) -> Self {
        Self {
            status: "error",
            message: "Validation failed",
            errors,
        }
    }
}

#[derive(Debug)]
pub enum CalcPayloadError {
    Parse(serde_json::Error),
    Validation(ValidationErrorResponse),
    UnknownUnit(String),
    Serialize(serde_json::Error),
}

impl fmt::Display for CalcPayloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "{err}"),
            Self::Validation(_) => write!(f, "invalid calculation request"),
            Self::UnknownUnit(name) => write!(f, "unknown unit '{name}'"),
            Self::Serialize(err) => write!(f, "failed to encode response: {err}"),
        }
    }
}

impl std::error::Error for CalcPayloadError {}

#[derive(Debug)]
pub enum LookupError {
    MissingParam(&'static str),
    NotFound(String),
    Image(ImageError),
    Serialize(serde_json::Error),
}

impl fmt::Display for LookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingParam(name) => write!(f, "query parameter '{name}' is required"),
            Self::NotFound(what) => write!(f, "{what} not found"),
            Self::Image(err) => write!(f, "{err}"),
            Self::Serialize(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for LookupError {}

impl From<serde_json::Error> for LookupError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialize(err)
    }
}

/// Value of `key` in the query string of `path`, percent-decoded.
pub fn query_param(path: &str, key: &str) -> Option<String> {
    let query = path.split_once('?').map(|(_, q)| q)?;
    query.split('&').find_map(|pair| {
        let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
        if name.trim() != key {
            return None;
        }
        decode_component(value)
    })
}

pub fn decode_component(raw: &str) -> Option<String> {
    urlencoding::decode(&raw.replace('+', " "))
        .ok()
        .map(|value| value.into_owned())
}

pub fn health_payload(dashboard: &Dashboard) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&serde_json::json!({
        "status": "ok",
        "service": "datasheets",
        "version": env!("CARGO_PKG_VERSION"),
        "loaded_at": dashboard.loaded_at,
    }))
}

pub fn factions_payload(dashboard: &Dashboard) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&serde_json::json!({ "factions": dashboard.tables.factions() }))
}

pub fn units_payload(dashboard: &Dashboard, path: &str) -> Result<String, LookupError> {
    let faction = query_param(path, "faction")
        .filter(|f| !f.trim().is_empty())
        .ok_or(LookupError::MissingParam("faction"))?;
    let units: Vec<&str> = dashboard
        .tables
        .units_in_faction(&faction)
        .into_iter()
        .map(|u| u.name.as_str())
        .collect();
    Ok(serde_json::to_string_pretty(&serde_json::json!({
        "faction": faction,
        "units": units,
    }))?)
}

#[derive(Debug, Serialize)]
struct UnitResponse<'a> {
    datasheet: Datasheet,
    weapons: Vec<&'a WeaponRecord>,
    images: Vec<u32>,
}

pub fn unit_payload(dashboard: &Dashboard, name: &str) -> Result<String, LookupError> {
    let tables = &dashboard.tables;
    let unit = tables
        .unit(name)
        .ok_or_else(|| LookupError::NotFound(format!("unit '{name}'")))?;
    let images = [1, 2]
        .into_iter()
        .filter(|page| {
            let key = image_key(&unit.name, *page);
            tables.images.iter().any(|img| img.name == key)
        })
        .collect();
    let response = UnitResponse {
        datasheet: unit.datasheet(),
        weapons: tables.weapons_for_unit(&unit.name),
        images,
    };
    Ok(serde_json::to_string_pretty(&response)?)
}

/// Whole glossary, or only the keywords used by `?units=A,B` when given.
pub fn keywords_payload(dashboard: &Dashboard, path: &str) -> Result<String, serde_json::Error> {
    let tables = &dashboard.tables;
    let entries: Vec<KeywordEntry> = match query_param(path, "units") {
        Some(units) => {
            let names: Vec<&str> = units
                .split(',')
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .collect();
            tables.keywords_for_units(&names)
        }
        None => tables
            .keywords
            .iter()
            .map(|k| KeywordEntry {
                name: k.name.clone(),
                description: k.description.clone(),
            })
            .collect(),
    };
    serde_json::to_string_pretty(&serde_json::json!({ "keywords": entries }))
}

pub fn image_payload(
    dashboard: &Dashboard,
    unit: &str,
    page: &str,
) -> Result<DatasheetImage, LookupError> {
    let page: u32 = page
        .parse()
        .map_err(|_| LookupError::NotFound(format!("page '{page}'")))?;
    let unit_name = dashboard
        .tables
        .unit(unit)
        .map(|u| u.name.as_str())
        .unwrap_or(unit);
    datasheet_image(&dashboard.tables, unit_name, page)
        .map_err(LookupError::Image)?
        .ok_or_else(|| LookupError::NotFound(format!("image '{unit_name} ({page})'")))
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum StatInput {
    Number(i64),
    Text(String),
}

impl StatInput {
    fn as_text(&self) -> String {
        match self {
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CalcRequest {
    pub attacks: StatInput,
    #[serde(default)]
    pub ballistic_skill: Option<StatInput>,
    pub hit_modifier: Option<i32>,
    pub save_roll: Option<i32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CalcResponse {
    pub status: &'static str,
    pub attacks: String,
    pub expected_attacks: f64,
    pub effective_hit_roll: i32,
    pub hit_modifier: i32,
    pub save_roll: i32,
    pub expected_hits: ExpectedHits,
}

fn calc_issue(err: &CalcError) -> ValidationIssue {
    let field = match err {
        CalcError::Parse { field, .. } => *field,
        CalcError::Domain { what, .. } => *what,
    };
    ValidationIssue {
        field,
        messages: vec![err.to_string()],
    }
}

fn range_issue(field: &'static str, value: i32, range: (i32, i32)) -> Option<ValidationIssue> {
    if (range.0..=range.1).contains(&value) {
        return None;
    }
    Some(ValidationIssue {
        field,
        messages: vec![format!("must be between {} and {}", range.0, range.1)],
    })
}

pub fn calc_payload(dashboard: &Dashboard, body: &str) -> Result<String, CalcPayloadError> {
    let request: CalcRequest = serde_json::from_str(body).map_err(CalcPayloadError::Parse)?;
    let config = &dashboard.config;
    let hit_modifier = request.hit_modifier.unwrap_or(config.default_hit_modifier);
    let save_roll = request.save_roll.unwrap_or(config.default_save_roll);

    let mut errors: Vec<ValidationIssue> = Vec::new();
    errors.extend(range_issue("hit_modifier", hit_modifier, HIT_MODIFIER_RANGE));
    errors.extend(range_issue("save_roll", save_roll, SAVE_ROLL_RANGE));

    let attacks_text = request.attacks.as_text();
    let attacks = attacks_text
        .parse::<AttackCount>()
        .map_err(|err| errors.push(calc_issue(&err)))
        .ok();
    let ballistic_skill = match &request.ballistic_skill {
        Some(raw) => raw
            .as_text()
            .parse::<BallisticSkill>()
            .map_err(|err| errors.push(calc_issue(&err)))
            .ok(),
        None => Some(BallisticSkill::NotApplicable),
    };

    let (Some(attacks), Some(ballistic_skill), true) = (attacks, ballistic_skill, errors.is_empty())
    else {
        return Err(CalcPayloadError::Validation(ValidationErrorResponse::new(errors)));
    };

    let expected_attacks = attacks.expected(config.dice_average);
    let expected_hits =
        calculate_expected_hits(expected_attacks, ballistic_skill, hit_modifier, save_roll)
            .map_err(|err| {
                CalcPayloadError::Validation(ValidationErrorResponse::new(vec![calc_issue(&err)]))
            })?;

    let response = CalcResponse {
        status: "ok",
        attacks: attacks.to_string(),
        expected_attacks,
        effective_hit_roll: ballistic_skill.effective_roll(hit_modifier),
        hit_modifier,
        save_roll,
        expected_hits,
    };
    serde_json::to_string_pretty(&response).map_err(CalcPayloadError::Serialize)
}

#[derive(Debug, Clone, Deserialize)]
pub struct UnitCalcRequest {
    pub unit: String,
    pub hit_modifier: Option<i32>,
    pub save_roll: Option<i32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UnitCalcResponse {
    pub status: &'static str,
    pub unit: String,
    pub hit_modifier: i32,
    pub save_roll: i32,
    pub weapons: Vec<WeaponHits>,
}

/// Expected hits for every weapon of a unit. Inputs are clamped, not rejected.
pub fn unit_calc_payload(dashboard: &Dashboard, body: &str) -> Result<String, CalcPayloadError> {
    let request: UnitCalcRequest = serde_json::from_str(body).map_err(CalcPayloadError::Parse)?;
    if request.unit.trim().is_empty() {
        return Err(CalcPayloadError::Validation(ValidationErrorResponse::new(vec![
            ValidationIssue {
                field: "unit",
                messages: vec!["must not be empty".to_string()],
            },
        ])));
    }
    let unit = dashboard
        .tables
        .unit(&request.unit)
        .ok_or_else(|| CalcPayloadError::UnknownUnit(request.unit.clone()))?;

    let settings = dashboard
        .config
        .calc_settings(request.hit_modifier, request.save_roll);
    let weapons: Vec<WeaponRecord> = dashboard
        .tables
        .weapons_for_unit(&unit.name)
        .into_iter()
        .cloned()
        .collect();
    let results = calculate_unit_hits(&weapons, settings, dashboard.pool());

    let response = UnitCalcResponse {
        status: "ok",
        unit: unit.name.clone(),
        hit_modifier: settings.hit_modifier,
        save_roll: settings.save_roll,
        weapons: results,
    };
    serde_json::to_string_pretty(&response).map_err(CalcPayloadError::Serialize)
}
