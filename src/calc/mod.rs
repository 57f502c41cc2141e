//! Expected-hits model for a weapon profile against an assumed save.

use std::fmt;

pub mod dice;
pub mod expected;
pub mod unit;

pub use dice::{faces_meeting, success_probability, DIE_FACES, SUCCESS_FACES};
pub use expected::{
    calculate_expected_hits, calculate_from_tokens, AttackCount, BallisticSkill, DiceAverage,
    ExpectedHits, WoundThreshold,
};
pub use unit::{calculate_unit_hits, CalcSettings, WeaponHits};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CalcError {
    /// A stat token that is neither a number nor a recognised dice expression.
    Parse { field: &'static str, value: String },
    /// A roll threshold that falls outside the faces of a d6.
    Domain { what: &'static str, value: i32 },
}

impl fmt::Display for CalcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse { field, value } => write!(f, "cannot parse {field} '{value}'"),
            Self::Domain { what, value } => {
                write!(f, "{what} {value} is outside the 1-6 range of a d6")
            }
        }
    }
}

impl std::error::Error for CalcError {}
