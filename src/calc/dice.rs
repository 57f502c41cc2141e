//! Six-sided die success table.
//!
//! Maps a roll threshold ("3+") to the number of faces that meet or exceed it.
//! The table is total over 1..=6; anything outside is a domain error.

use super::CalcError;

pub const DIE_FACES: u8 = 6;

/// Faces meeting each threshold, indexed by `threshold - 1`.
pub const SUCCESS_FACES: [u8; DIE_FACES as usize] = [6, 5, 4, 3, 2, 1];

pub const MIN_THRESHOLD: i32 = 1;
pub const MAX_THRESHOLD: i32 = DIE_FACES as i32;

/// Number of faces of a d6 that roll `threshold` or higher.
pub fn faces_meeting(threshold: i32, what: &'static str) -> Result<u8, CalcError> {
    if !(MIN_THRESHOLD..=MAX_THRESHOLD).contains(&threshold) {
        return Err(CalcError::Domain {
            what,
            value: threshold,
        });
    }
    Ok(SUCCESS_FACES[(threshold - MIN_THRESHOLD) as usize])
}

/// Chance of rolling `threshold` or higher on one d6.
pub fn success_probability(threshold: i32, what: &'static str) -> Result<f64, CalcError> {
    faces_meeting(threshold, what).map(|faces| f64::from(faces) / f64::from(DIE_FACES))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_counts_faces_at_or_above_threshold() {
        assert_eq!(faces_meeting(1, "t").unwrap(), 6);
        assert_eq!(faces_meeting(2, "t").unwrap(), 5);
        assert_eq!(faces_meeting(4, "t").unwrap(), 3);
        assert_eq!(faces_meeting(6, "t").unwrap(), 1);
    }

    #[test]
    fn probability_is_faces_over_six() {
        assert!((success_probability(3, "t").unwrap() - 4.0 / 6.0).abs() < 1e-12);
        assert!((success_probability(1, "t").unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn thresholds_outside_the_die_are_rejected() {
        assert_eq!(
            faces_meeting(0, "save_roll"),
            Err(CalcError::Domain {
                what: "save_roll",
                value: 0
            })
        );
        assert!(faces_meeting(7, "effective_hit_roll").is_err());
        assert!(faces_meeting(-3, "effective_hit_roll").is_err());
    }
}
