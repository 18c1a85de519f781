//! Scoring module - line clear points, level progression and gravity speed
//!
//! - A clear is worth `rows * 50 * (level + 1)` plus `combo * 10 * (level + 1)`,
//!   where `combo` counts the consecutive clearing locks before this one.
//! - Leaving level `n` takes `3 * (n + 1)` more rows; a single large clear can
//!   skip several levels at once.
//! - Gravity interpolates linearly from 1200ms at level 0 to 150ms at level 10.

use crate::types::{COMBO_SCORE, MAX_DELAY_MS, MIN_DELAY_LEVEL, MIN_DELAY_MS, ROW_SCORE};

/// Points awarded for clearing `rows` rows
pub fn line_clear_score(rows: u32, level: u32, combo: u32) -> u32 {
    if rows == 0 {
        return 0;
    }
    let multiplier = level + 1;
    rows * ROW_SCORE * multiplier + combo * COMBO_SCORE * multiplier
}

/// Step interval in milliseconds for a level
pub fn step_for_level(level: u32) -> u32 {
    let lvl = level.min(MIN_DELAY_LEVEL);
    (MAX_DELAY_MS - MIN_DELAY_MS) * (MIN_DELAY_LEVEL - lvl) / MIN_DELAY_LEVEL + MIN_DELAY_MS
}

/// Subtract cleared rows from the level budget, returning the new level
///
/// Loops so that a clear larger than the remaining budget advances as many
/// levels as it pays for.
pub fn advance_level(level: u32, rows_to_next_level: &mut i32, rows: u32) -> u32 {
    let mut level = level;
    *rows_to_next_level -= rows as i32;
    while *rows_to_next_level <= 0 {
        level += 1;
        *rows_to_next_level += (level * 3) as i32;
    }
    level
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_clear_score() {
        assert_eq!(line_clear_score(0, 5, 3), 0);
        assert_eq!(line_clear_score(1, 0, 0), 50);
        assert_eq!(line_clear_score(4, 0, 0), 200);
        // level 2, combo 1, two rows
        assert_eq!(line_clear_score(2, 2, 1), 330);
    }

    #[test]
    fn test_step_for_level() {
        assert_eq!(step_for_level(0), 1200);
        assert_eq!(step_for_level(1), 1095);
        assert_eq!(step_for_level(5), 675);
        assert_eq!(step_for_level(10), 150);
        assert_eq!(step_for_level(25), 150);
    }

    #[test]
    fn test_advance_level_single() {
        let mut budget = 2;
        let level = advance_level(0, &mut budget, 1);
        assert_eq!(level, 0);
        assert_eq!(budget, 1);

        let level = advance_level(level, &mut budget, 1);
        assert_eq!(level, 1);
        assert_eq!(budget, 3);
    }

    #[test]
    fn test_advance_level_multiple_in_one_clear() {
        let mut budget = 2;
        // 2 - 5 = -3 -> level 1 (+3) = 0 -> level 2 (+6) = 6
        let level = advance_level(0, &mut budget, 5);
        assert_eq!(level, 2);
        assert_eq!(budget, 6);
    }
}
