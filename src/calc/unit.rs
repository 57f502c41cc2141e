//! Expected hits for every weapon a unit carries.

use rayon::prelude::*;
use serde::Serialize;

use super::expected::{calculate_from_tokens, DiceAverage, ExpectedHits};
use crate::data::WeaponRecord;
use crate::parallel::WorkerPool;

pub const HIT_MODIFIER_RANGE: (i32, i32) = (-1, 1);
pub const SAVE_ROLL_RANGE: (i32, i32) = (2, 6);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalcSettings {
    pub hit_modifier: i32,
    pub save_roll: i32,
    pub dice_average: DiceAverage,
}

impl CalcSettings {
    /// Pulls dashboard inputs back into the ranges the input widgets allow.
    pub fn clamped(hit_modifier: i32, save_roll: i32, dice_average: DiceAverage) -> Self {
        Self {
            hit_modifier: hit_modifier.clamp(HIT_MODIFIER_RANGE.0, HIT_MODIFIER_RANGE.1),
            save_roll: save_roll.clamp(SAVE_ROLL_RANGE.0, SAVE_ROLL_RANGE.1),
            dice_average,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WeaponHits {
    pub weapon: String,
    pub attacks: String,
    pub ballistic_skill: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_hits: Option<ExpectedHits>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn weapon_hits(weapon: &WeaponRecord, settings: CalcSettings) -> WeaponHits {
    let outcome = calculate_from_tokens(
        &weapon.attacks,
        &weapon.ballistic_skill,
        settings.hit_modifier,
        settings.save_roll,
        settings.dice_average,
    );
    let (expected_hits, error) = match outcome {
        Ok(hits) => (Some(hits), None),
        Err(err) => {
            log::debug!("(weapon_hits) skipping '{}': {err}", weapon.name);
            (None, Some(err.to_string()))
        }
    };
    WeaponHits {
        weapon: weapon.name.clone(),
        attacks: weapon.attacks.clone(),
        ballistic_skill: weapon.ballistic_skill.clone(),
        expected_hits,
        error,
    }
}

/// Runs the calculator for each weapon on the pool. Output keeps input order;
/// a weapon that fails carries its error instead of hits.
pub fn calculate_unit_hits(
    weapons: &[WeaponRecord],
    settings: CalcSettings,
    pool: &WorkerPool,
) -> Vec<WeaponHits> {
    pool.install(|| {
        weapons
            .par_iter()
            .map(|weapon| weapon_hits(weapon, settings))
            .collect()
    })
}
