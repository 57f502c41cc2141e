//! Closed-form expected unsaved hits for one weapon profile.
//!
//! For every wound threshold 1+..6+ the result is
//! `attacks * p(hit) * p(wound) * p(save fails)`, rounded to two decimals.

use std::fmt;
use std::str::FromStr;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use super::dice::{success_probability, DIE_FACES};
use super::CalcError;

/// How a `D<n>` attack count is averaged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiceAverage {
    /// `n / 2`. Matches the numbers the dashboard has always shown.
    #[default]
    HalfFaces,
    /// `(n + 1) / 2`, the mean of a fair 1..=n die.
    UniformMean,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttackCount {
    Fixed(u32),
    /// Random attack count written as `D<n>`.
    DieAverage(u32),
}

impl AttackCount {
    pub fn expected(&self, average: DiceAverage) -> f64 {
        match (*self, average) {
            (Self::Fixed(n), _) => f64::from(n),
            (Self::DieAverage(n), DiceAverage::HalfFaces) => f64::from(n) / 2.0,
            (Self::DieAverage(n), DiceAverage::UniformMean) => (f64::from(n) + 1.0) / 2.0,
        }
    }
}

impl FromStr for AttackCount {
    type Err = CalcError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let token = raw.trim();
        let parse_error = || CalcError::Parse {
            field: "attacks",
            value: raw.to_string(),
        };

        if let Some(n) = parse_digits(token) {
            return Ok(Self::Fixed(n));
        }
        let faces = token
            .strip_prefix('D')
            .or_else(|| token.strip_prefix('d'))
            .ok_or_else(parse_error)?;
        match parse_digits(faces) {
            Some(n) if n > 0 => Ok(Self::DieAverage(n)),
            _ => Err(parse_error()),
        }
    }
}

/// Plain decimal digits only; `str::parse` would also take a leading sign.
fn parse_digits(token: &str) -> Option<u32> {
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    token.parse().ok()
}

impl fmt::Display for AttackCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(n) => write!(f, "{n}"),
            Self::DieAverage(n) => write!(f, "D{n}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BallisticSkill {
    Roll(i32),
    /// Weapon has no ranged profile; treated as hitting automatically.
    NotApplicable,
}

const NOT_APPLICABLE_TOKENS: &[&str] = &["", "-", "n/a", "na", "none"];

impl BallisticSkill {
    /// Roll the attacker needs after the hit modifier is applied.
    pub fn effective_roll(&self, hit_modifier: i32) -> i32 {
        match self {
            Self::Roll(skill) => skill - hit_modifier,
            Self::NotApplicable => 1,
        }
    }
}

impl FromStr for BallisticSkill {
    type Err = CalcError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let token = raw.trim();
        if NOT_APPLICABLE_TOKENS
            .iter()
            .any(|sentinel| token.eq_ignore_ascii_case(sentinel))
        {
            return Ok(Self::NotApplicable);
        }
        parse_digits(token.strip_suffix('+').unwrap_or(token).trim())
            .and_then(|n| i32::try_from(n).ok())
            .map(Self::Roll)
            .ok_or_else(|| CalcError::Parse {
                field: "ballistic_skill",
                value: raw.to_string(),
            })
    }
}

/// Roll needed to wound, shown as "4+".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WoundThreshold(pub u8);

impl WoundThreshold {
    pub fn all() -> impl Iterator<Item = WoundThreshold> {
        (1..=DIE_FACES).map(WoundThreshold)
    }

    pub fn label(&self) -> String {
        format!("{}+", self.0)
    }
}

impl fmt::Display for WoundThreshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}+", self.0)
    }
}

/// Expected unsaved hits for each wound threshold, 1+ through 6+.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExpectedHits {
    values: [f64; DIE_FACES as usize],
}

impl ExpectedHits {
    pub fn get(&self, threshold: WoundThreshold) -> Option<f64> {
        let index = usize::from(threshold.0).checked_sub(1)?;
        self.values.get(index).copied()
    }

    pub fn by_label(&self, label: &str) -> Option<f64> {
        let roll = label.trim().strip_suffix('+')?.parse::<u8>().ok()?;
        self.get(WoundThreshold(roll))
    }

    pub fn iter(&self) -> impl Iterator<Item = (WoundThreshold, f64)> + '_ {
        WoundThreshold::all().zip(self.values.iter().copied())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Serialize for ExpectedHits {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (threshold, value) in self.iter() {
            map.serialize_entry(&threshold.label(), &value)?;
        }
        map.end()
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn calculate_expected_hits(
    attacks: f64,
    ballistic_skill: BallisticSkill,
    hit_modifier: i32,
    save_roll: i32,
) -> Result<ExpectedHits, CalcError> {
    let effective_hit_roll = ballistic_skill.effective_roll(hit_modifier);
    let p_hit = success_probability(effective_hit_roll, "effective_hit_roll")?;
    let p_unsaved = 1.0 - success_probability(save_roll, "save_roll")?;

    let mut values = [0.0; DIE_FACES as usize];
    for (slot, threshold) in values.iter_mut().zip(WoundThreshold::all()) {
        let p_wound = success_probability(i32::from(threshold.0), "wound_threshold")?;
        *slot = round2(attacks * p_hit * p_wound * p_unsaved);
    }
    Ok(ExpectedHits { values })
}

/// Parses the raw `A` and `BS` cells of a weapon row, then calculates.
pub fn calculate_from_tokens(
    attacks: &str,
    ballistic_skill: &str,
    hit_modifier: i32,
    save_roll: i32,
    average: DiceAverage,
) -> Result<ExpectedHits, CalcError> {
    let attacks: AttackCount = attacks.parse()?;
    let ballistic_skill: BallisticSkill = ballistic_skill.parse()?;
    calculate_expected_hits(
        attacks.expected(average),
        ballistic_skill,
        hit_modifier,
        save_roll,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attack_tokens_parse_as_fixed_or_die() {
        assert_eq!("10".parse::<AttackCount>(), Ok(AttackCount::Fixed(10)));
        assert_eq!(" D6 ".parse::<AttackCount>(), Ok(AttackCount::DieAverage(6)));
        assert_eq!("d3".parse::<AttackCount>(), Ok(AttackCount::DieAverage(3)));
        assert!("N/A".parse::<AttackCount>().is_err());
        assert!("D".parse::<AttackCount>().is_err());
        assert!("D0".parse::<AttackCount>().is_err());
        assert!("2D6".parse::<AttackCount>().is_err());
        assert!("D+3".parse::<AttackCount>().is_err());
        assert!("d+6".parse::<AttackCount>().is_err());
        assert!("+5".parse::<AttackCount>().is_err());
        assert!("-2".parse::<AttackCount>().is_err());
    }

    #[test]
    fn die_average_policy_changes_the_mean() {
        let d3 = AttackCount::DieAverage(3);
        assert_eq!(d3.expected(DiceAverage::HalfFaces), 1.5);
        assert_eq!(d3.expected(DiceAverage::UniformMean), 2.0);
        assert_eq!(AttackCount::Fixed(4).expected(DiceAverage::UniformMean), 4.0);
    }

    #[test]
    fn ballistic_skill_accepts_plus_suffix_and_sentinels() {
        assert_eq!("3+".parse::<BallisticSkill>(), Ok(BallisticSkill::Roll(3)));
        assert_eq!("4".parse::<BallisticSkill>(), Ok(BallisticSkill::Roll(4)));
        assert_eq!("N/A".parse::<BallisticSkill>(), Ok(BallisticSkill::NotApplicable));
        assert_eq!("".parse::<BallisticSkill>(), Ok(BallisticSkill::NotApplicable));
        assert!("three".parse::<BallisticSkill>().is_err());
        assert!("+3".parse::<BallisticSkill>().is_err());
        assert!("+3+".parse::<BallisticSkill>().is_err());
    }

    #[test]
    fn not_applicable_skill_ignores_the_modifier() {
        assert_eq!(BallisticSkill::NotApplicable.effective_roll(-1), 1);
        assert_eq!(BallisticSkill::Roll(4).effective_roll(1), 3);
    }

    #[test]
    fn wound_labels_run_one_through_six() {
        let labels: Vec<String> = WoundThreshold::all().map(|t| t.label()).collect();
        assert_eq!(labels, vec!["1+", "2+", "3+", "4+", "5+", "6+"]);
    }

    #[test]
    fn serialises_as_ordered_label_map() {
        let hits = calculate_expected_hits(6.0, BallisticSkill::NotApplicable, 0, 4).unwrap();
        let json = serde_json::to_string(&hits).unwrap();
        assert!(json.starts_with("{\"1+\":3.0"), "{json}");
        assert!(json.ends_with("\"6+\":0.5}"), "{json}");
    }
}
