//! Progression rules.
//!
//! Every rule takes the current records by reference and returns the records
//! it wants written. Nothing here touches storage, so a rejected operation
//! leaves no partial state behind.

pub mod attributes;
pub mod consumption;
pub mod demerits;
pub mod evolution;
pub mod leveling;
pub mod power_leveling;
pub mod purchase;
pub mod quest_completion;
pub mod repeat_reset;

pub use attributes::{apply_attribute_demerits, apply_attribute_rewards};
pub use consumption::{consume_item, Consumption};
pub use demerits::{assess_deadlines, FailureAssessment};
pub use evolution::{link_evolution, unlink_evolution, EvolutionLink};
pub use leveling::{
    apply_xp, xp_for_level, ABILITY_POINTS_PER_LEVEL, MAX_HP_PER_LEVEL, MAX_MP_PER_LEVEL,
    XP_PER_LEVEL,
};
pub use power_leveling::{level_up_power, PowerLevelUp};
pub use purchase::{purchase_item, Purchase};
pub use quest_completion::{complete_quest, QuestCompletion};
pub use repeat_reset::reset_if_due;
