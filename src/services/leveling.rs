use crate::models::watch::WatchStatus;

/// User level/experience after an award has been applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelSnapshot {
    pub level: i32,
    pub exp: i32,
}

/// Experience required to move past `level`.
#[must_use]
pub const fn next_level_threshold(level: i32) -> i32 {
    level * 1000
}

/// Derives the stored status from the caller-supplied one: when the total is
/// known and positive and the reported episode count has reached it, the
/// status escalates to completed no matter what was requested.
#[must_use]
pub fn effective_status(
    requested: WatchStatus,
    episodes_watched: i32,
    total_episodes: Option<i32>,
) -> WatchStatus {
    match total_episodes {
        Some(total) if total > 0 && episodes_watched >= total => WatchStatus::Completed,
        _ => requested,
    }
}

/// Whether a progress upsert triggers the history/experience cascade:
/// the pair newly transitioned to completed, OR the reported episode count
/// grew past the stored one. Inclusive OR; a row that never existed counts
/// as zero episodes watched.
#[must_use]
pub fn should_cascade(
    old_status: Option<&str>,
    new_status: WatchStatus,
    old_episodes: i32,
    new_episodes: i32,
) -> bool {
    let newly_completed = new_status == WatchStatus::Completed
        && old_status != Some(WatchStatus::Completed.as_str());
    newly_completed || new_episodes > old_episodes
}

/// Award variant used on the progress cascade and on achievement unlock:
/// the level rises by at most one, and exp keeps the raw accumulated sum
/// even when it clears the threshold. Divergent from `award_with_rollover`
/// on purpose; the two paths have always behaved differently and callers
/// depend on the stored numbers.
#[must_use]
pub const fn award_single_step(level: i32, exp: i32, award: i32) -> LevelSnapshot {
    let total = exp + award;
    if total >= next_level_threshold(level) {
        LevelSnapshot {
            level: level + 1,
            exp: total,
        }
    } else {
        LevelSnapshot { level, exp: total }
    }
}

/// Award variant used on the watch-episode action: exp rolls over across as
/// many level-ups as the award covers, subtracting each level's threshold
/// in turn.
#[must_use]
pub const fn award_with_rollover(level: i32, exp: i32, award: i32) -> LevelSnapshot {
    let mut level = level;
    let mut exp = exp + award;
    while exp >= next_level_threshold(level) {
        exp -= next_level_threshold(level);
        level += 1;
    }
    LevelSnapshot { level, exp }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_forced_to_completed_when_total_reached() {
        let status = effective_status(WatchStatus::Watching, 12, Some(12));
        assert_eq!(status, WatchStatus::Completed);

        let status = effective_status(WatchStatus::Planned, 26, Some(24));
        assert_eq!(status, WatchStatus::Completed);
    }

    #[test]
    fn status_kept_when_total_unknown_or_unreached() {
        assert_eq!(
            effective_status(WatchStatus::Watching, 12, None),
            WatchStatus::Watching
        );
        assert_eq!(
            effective_status(WatchStatus::Watching, 12, Some(0)),
            WatchStatus::Watching
        );
        assert_eq!(
            effective_status(WatchStatus::Dropped, 3, Some(12)),
            WatchStatus::Dropped
        );
    }

    #[test]
    fn cascade_fires_on_new_completion() {
        assert!(should_cascade(
            Some("watching"),
            WatchStatus::Completed,
            12,
            12
        ));
        assert!(should_cascade(None, WatchStatus::Completed, 0, 0));
    }

    #[test]
    fn cascade_fires_on_episode_growth() {
        assert!(should_cascade(Some("watching"), WatchStatus::Watching, 3, 4));
        // Absent row counts as zero previously watched.
        assert!(should_cascade(None, WatchStatus::Watching, 0, 1));
    }

    #[test]
    fn cascade_skipped_on_identical_repeat() {
        assert!(!should_cascade(
            Some("completed"),
            WatchStatus::Completed,
            12,
            12
        ));
        assert!(!should_cascade(
            Some("watching"),
            WatchStatus::Watching,
            5,
            5
        ));
    }

    #[test]
    fn single_step_keeps_raw_sum_past_threshold() {
        // 950 + 100 clears the level-1 threshold: level rises, exp does
        // not lose the 1000.
        let snapshot = award_single_step(1, 950, 100);
        assert_eq!(snapshot, LevelSnapshot { level: 2, exp: 1050 });
    }

    #[test]
    fn single_step_below_threshold_only_accumulates() {
        let snapshot = award_single_step(1, 0, 100);
        assert_eq!(snapshot, LevelSnapshot { level: 1, exp: 100 });
    }

    #[test]
    fn single_step_never_rises_more_than_one_level() {
        // A large reward still only grants one level under this variant.
        let snapshot = award_single_step(1, 0, 5000);
        assert_eq!(snapshot, LevelSnapshot { level: 2, exp: 5000 });
    }

    #[test]
    fn rollover_subtracts_each_threshold() {
        let snapshot = award_with_rollover(1, 950, 100);
        assert_eq!(snapshot, LevelSnapshot { level: 2, exp: 50 });
    }

    #[test]
    fn rollover_crosses_multiple_levels() {
        // 3300 total: -1000 (level 2), -2000 (level 3), 300 left.
        let snapshot = award_with_rollover(1, 0, 3300);
        assert_eq!(snapshot, LevelSnapshot { level: 3, exp: 300 });
    }

    #[test]
    fn threshold_scales_with_level() {
        assert_eq!(next_level_threshold(1), 1000);
        assert_eq!(next_level_threshold(7), 7000);
    }
}
