//! Deadline check: fail overdue quests and charge their rewards back.

use std::sync::Arc;

use questbound_domain::{progression::assess_deadlines, FailureReport, UserId};

use crate::entities::{CustomStats, Quests, Users};
use crate::infrastructure::ports::{ClockPort, WriteBatch};
use crate::infrastructure::user_locks::UserLocks;

use super::QuestError;

pub struct CheckFailures {
    quests: Arc<Quests>,
    users: Arc<Users>,
    custom_stats: Arc<CustomStats>,
    locks: Arc<UserLocks>,
    clock: Arc<dyn ClockPort>,
}

impl CheckFailures {
    pub fn new(
        quests: Arc<Quests>,
        users: Arc<Users>,
        custom_stats: Arc<CustomStats>,
        locks: Arc<UserLocks>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            quests,
            users,
            custom_stats,
            locks,
            clock,
        }
    }

    pub async fn execute(&self, user_id: UserId) -> Result<FailureReport, QuestError> {
        let _guard = self.locks.lock(user_id).await;

        let user = self.users.require(user_id).await?;
        let quests = self.quests.list_for_user(user_id).await?;
        let stats = self.custom_stats.list_for_user(user_id).await?;

        let assessment = assess_deadlines(&quests, &user, &stats, self.clock.now());
        if !assessment.has_changes() {
            return Ok(assessment.report);
        }

        let mut batch = WriteBatch::new();
        for quest in &assessment.quests {
            Quests::stage(&mut batch, quest)?;
        }
        for stat in &assessment.custom_stats {
            CustomStats::stage(&mut batch, stat)?;
        }
        if assessment.user != user {
            Users::stage_guarded(&mut batch, &assessment.user)?;
        }
        self.quests.commit(batch).await?;

        let report = assessment.report;
        if !report.failed_quests.is_empty() {
            tracing::info!(
                user_id = %user_id,
                failed = report.failed_quests.len(),
                xp_demerit = report.total_demerits.xp,
                gold_demerit = report.total_demerits.gold,
                "Charged demerits for missed deadlines"
            );
        }
        Ok(report)
    }
}
