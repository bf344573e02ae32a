//! Calendar-window resets for daily/weekly/monthly quests.
//!
//! Purely query-time driven: nothing is scheduled, a quest resets the first
//! time it is looked at after its window has elapsed.

use chrono::{DateTime, Datelike, Duration, Utc};

use crate::{Quest, RepeatFrequency};

/// Reopen a completed or failed periodic quest whose window has elapsed.
///
/// The window is anchored on `last_completed` for completed quests and on
/// `failed_at` for failed ones. Returns whether the quest changed.
pub fn reset_if_due(quest: &mut Quest, now: DateTime<Utc>) -> bool {
    if !quest.repeat_frequency.is_periodic() {
        return false;
    }
    let anchor = if quest.completed {
        quest.last_completed
    } else if quest.failed {
        quest.failed_at
    } else {
        return false;
    };
    let Some(anchor) = anchor else {
        return false;
    };

    if !window_elapsed(quest.repeat_frequency, anchor, now) {
        return false;
    }
    quest.completed = false;
    quest.failed = false;
    true
}

fn window_elapsed(frequency: RepeatFrequency, anchor: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    match frequency {
        RepeatFrequency::Daily => anchor.date_naive() < now.date_naive(),
        RepeatFrequency::Weekly => now - anchor >= Duration::days(7),
        RepeatFrequency::Monthly => (anchor.year(), anchor.month()) != (now.year(), now.month()),
        RepeatFrequency::None | RepeatFrequency::Limitless => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{NewQuest, UserId};
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    fn completed(frequency: RepeatFrequency, when: DateTime<Utc>) -> Quest {
        let mut quest = NewQuest {
            user_id: UserId::new(),
            title: "Water plants".to_string(),
            repeat_frequency: Some(frequency),
            ..Default::default()
        }
        .into_quest(when)
        .unwrap();
        quest.completed = true;
        quest.last_completed = Some(when);
        quest
    }

    #[test]
    fn daily_resets_after_utc_midnight() {
        let mut quest = completed(RepeatFrequency::Daily, at(2024, 5, 1, 23));
        assert!(!reset_if_due(&mut quest, at(2024, 5, 1, 23)));
        assert!(quest.completed);
        assert!(reset_if_due(&mut quest, at(2024, 5, 2, 0)));
        assert!(!quest.completed);
    }

    #[test]
    fn weekly_needs_seven_full_days() {
        let mut quest = completed(RepeatFrequency::Weekly, at(2024, 5, 1, 12));
        assert!(!reset_if_due(&mut quest, at(2024, 5, 8, 11)));
        assert!(reset_if_due(&mut quest, at(2024, 5, 8, 12)));
    }

    #[test]
    fn monthly_resets_on_calendar_month_change() {
        let mut quest = completed(RepeatFrequency::Monthly, at(2024, 5, 31, 12));
        assert!(!reset_if_due(&mut quest, at(2024, 5, 31, 23)));
        assert!(reset_if_due(&mut quest, at(2024, 6, 1, 0)));

        let mut quest = completed(RepeatFrequency::Monthly, at(2023, 6, 15, 12));
        assert!(reset_if_due(&mut quest, at(2024, 6, 15, 12)));
    }

    #[test]
    fn failed_daily_quest_reopens_next_day() {
        let mut quest = completed(RepeatFrequency::Daily, at(2024, 5, 1, 8));
        quest.completed = false;
        quest.last_completed = None;
        quest.failed = true;
        quest.failed_at = Some(at(2024, 5, 1, 10));

        assert!(reset_if_due(&mut quest, at(2024, 5, 2, 9)));
        assert!(!quest.failed);
    }

    #[test]
    fn one_off_and_limitless_quests_never_reset() {
        let mut quest = completed(RepeatFrequency::None, at(2024, 1, 1, 0));
        assert!(!reset_if_due(&mut quest, at(2025, 1, 1, 0)));
        assert!(quest.completed);

        let mut quest = completed(RepeatFrequency::Limitless, at(2024, 1, 1, 0));
        assert!(!reset_if_due(&mut quest, at(2025, 1, 1, 0)));
    }

    #[test]
    fn reset_is_idempotent() {
        let mut quest = completed(RepeatFrequency::Daily, at(2024, 5, 1, 8));
        let now = at(2024, 5, 3, 8);
        assert!(reset_if_due(&mut quest, now));
        assert!(!reset_if_due(&mut quest, now));
    }
}
