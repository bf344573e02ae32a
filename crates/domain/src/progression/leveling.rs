//! Experience-to-level conversion.
//!
//! The threshold grows with the level, so xp is normalized with a loop that
//! spends the *current* level's threshold on each step. A closed form would
//! give different level counts for large deltas.

use crate::{LevelUpOutcome, User};

pub const XP_PER_LEVEL: i64 = 100;
pub const ABILITY_POINTS_PER_LEVEL: i64 = 2;
pub const MAX_HP_PER_LEVEL: i64 = 10;
pub const MAX_MP_PER_LEVEL: i64 = 5;

/// Xp needed to advance past `level`.
pub fn xp_for_level(level: u32) -> i64 {
    i64::from(level) * XP_PER_LEVEL
}

/// Add `amount` xp to the user and normalize.
///
/// Each level gained grants ability points and max HP/MP, and restores HP and
/// MP to the new maxima.
pub fn apply_xp(user: &mut User, amount: i64) -> LevelUpOutcome {
    // level 0 would make the threshold 0 and the loop endless
    user.level = user.level.max(1);
    let old_level = user.level;

    user.xp = user.xp.saturating_add(amount).max(0);
    let mut levels_gained = 0u32;
    while user.xp >= xp_for_level(user.level) {
        user.xp -= xp_for_level(user.level);
        user.level += 1;
        levels_gained += 1;
    }

    if levels_gained > 0 {
        let gained = i64::from(levels_gained);
        user.ability_points += gained * ABILITY_POINTS_PER_LEVEL;
        user.max_hp += gained * MAX_HP_PER_LEVEL;
        user.max_mp += gained * MAX_MP_PER_LEVEL;
        user.hp = user.max_hp;
        user.mp = user.max_mp;
    }

    LevelUpOutcome {
        old_level,
        new_level: user.level,
        levels_gained,
    }
}
