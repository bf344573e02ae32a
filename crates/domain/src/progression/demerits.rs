//! Missed-deadline accounting.

use chrono::{DateTime, Utc};

use super::attributes::apply_attribute_demerits;
use super::repeat_reset::reset_if_due;
use crate::{CustomStat, FailureReport, Quest, QuestDemerit, RepeatFrequency, User};

/// Next-state records produced by a deadline check.
#[derive(Debug, Clone)]
pub struct FailureAssessment {
    /// Quests that were reset or newly failed
    pub quests: Vec<Quest>,
    pub user: User,
    /// Only the custom stats a demerit touched
    pub custom_stats: Vec<CustomStat>,
    pub report: FailureReport,
}

impl FailureAssessment {
    pub fn has_changes(&self) -> bool {
        !self.quests.is_empty()
    }
}

/// Fail every open quest whose deadline for today has passed and charge its
/// rewards back as demerits.
///
/// Periodic quests get their repeat reset first. Already-failed quests are
/// skipped, so running the check twice charges nothing the second time.
pub fn assess_deadlines(
    quests: &[Quest],
    user: &User,
    custom_stats: &[CustomStat],
    now: DateTime<Utc>,
) -> FailureAssessment {
    let mut user = user.clone();
    let mut report = FailureReport::default();
    let mut changed = Vec::new();

    for quest in quests.iter().filter(|q| q.user_id == user.id) {
        let mut quest = quest.clone();
        let reset = reset_if_due(&mut quest, now);

        if missed_deadline(&quest, now) {
            quest.failed = true;
            quest.failed_at = Some(now);
            let demerit = QuestDemerit {
                id: quest.id,
                title: quest.title.clone(),
                xp_demerit: quest.xp_reward,
                gold_demerit: quest.gold_reward,
                ap_demerit: quest.ap_reward,
                attribute_demerits: quest.attribute_rewards.clone(),
            };
            report.total_demerits.add(&demerit);
            report.failed_quests.push(demerit);
            changed.push(quest);
        } else if reset {
            changed.push(quest);
        }
    }

    let totals = &report.total_demerits;
    user.xp = user.xp.saturating_sub(totals.xp).max(0);
    user.gold = user.gold.saturating_sub(totals.gold).max(0);
    user.ability_points = user.ability_points.saturating_sub(totals.ap).max(0);

    let mut stats = custom_stats.to_vec();
    apply_attribute_demerits(&mut user, &mut stats, &totals.attributes);
    let touched = stats
        .into_iter()
        .zip(custom_stats)
        .filter(|(after, before)| after != *before)
        .map(|(after, _)| after)
        .collect();

    FailureAssessment {
        quests: changed,
        user,
        custom_stats: touched,
        report,
    }
}

fn missed_deadline(quest: &Quest, now: DateTime<Utc>) -> bool {
    if quest.completed || quest.failed || quest.repeat_frequency == RepeatFrequency::Limitless {
        return false;
    }
    match quest.deadline_on(now) {
        Some(deadline) => now > deadline && quest.created_at < deadline,
        None => false,
    }
}
