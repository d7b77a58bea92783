//! Streak counter arithmetic.
//!
//! Counters are maintained incrementally: recording a check-in mutates them
//! in O(1) instead of replaying the ledger. `recompute` rebuilds them from
//! the full history when the incremental state needs repair.

use time::Date;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Counters {
    pub streak: i32,
    pub longest_streak: i32,
    pub total_completions: i32,
}

impl Counters {
    /// Fold a newly recorded check-in into the counters.
    ///
    /// A completed check-in extends the streak and pushes the high-water
    /// mark; an explicit miss resets the streak and touches nothing else.
    pub fn apply(&mut self, completed: bool) {
        if completed {
            self.streak += 1;
            self.total_completions += 1;
            if self.streak > self.longest_streak {
                self.longest_streak = self.streak;
            }
        } else {
            self.streak = 0;
        }
    }

    /// Undo one completed check-in being deleted from the ledger.
    ///
    /// `longest_streak` is a permanent high-water mark and never decreases.
    pub fn reverse(&mut self) {
        self.streak = (self.streak - 1).max(0);
        self.total_completions = (self.total_completions - 1).max(0);
    }
}

/// Rebuild counters from ledger entries, one `(date, completed)` pair per
/// calendar day, ordered by date ascending.
///
/// The streak is the length of the consecutive-day run ending at the most
/// recent completed entry, forced to zero when the most recent entry of all
/// is an explicit miss. The high-water mark keeps whichever is larger:
/// the longest historical run or the previously stored value.
pub fn recompute(entries: &[(Date, bool)], prior_longest: i32) -> Counters {
    let mut total = 0;
    let mut run = 0;
    let mut longest_run = 0;
    let mut prev: Option<Date> = None;

    for &(date, completed) in entries {
        if !completed {
            continue;
        }
        run = if prev.and_then(|p| p.next_day()) == Some(date) {
            run + 1
        } else {
            1
        };
        if run > longest_run {
            longest_run = run;
        }
        prev = Some(date);
        total += 1;
    }

    let streak = match entries.last() {
        Some(&(_, false)) => 0,
        _ => run,
    };

    Counters {
        streak,
        longest_streak: longest_run.max(prior_longest),
        total_completions: total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    const ZERO: Counters = Counters {
        streak: 0,
        longest_streak: 0,
        total_completions: 0,
    };

    #[test]
    fn completed_check_in_extends_streak() {
        let mut c = ZERO;
        c.apply(true);
        assert_eq!(
            c,
            Counters {
                streak: 1,
                longest_streak: 1,
                total_completions: 1
            }
        );
    }

    #[test]
    fn miss_resets_streak_but_keeps_totals() {
        let mut c = Counters {
            streak: 4,
            longest_streak: 6,
            total_completions: 10,
        };
        c.apply(false);
        assert_eq!(c.streak, 0);
        assert_eq!(c.longest_streak, 6);
        assert_eq!(c.total_completions, 10);
    }

    #[test]
    fn high_water_mark_follows_new_records_only() {
        let mut c = Counters {
            streak: 6,
            longest_streak: 6,
            total_completions: 6,
        };
        c.apply(true);
        assert_eq!(c.longest_streak, 7);

        let mut c = Counters {
            streak: 2,
            longest_streak: 9,
            total_completions: 12,
        };
        c.apply(true);
        assert_eq!(c.longest_streak, 9);
    }

    #[test]
    fn reverse_clamps_at_zero() {
        let mut c = ZERO;
        c.reverse();
        assert_eq!(c, ZERO);
    }

    #[test]
    fn reverse_never_lowers_high_water_mark() {
        let mut c = Counters {
            streak: 3,
            longest_streak: 3,
            total_completions: 3,
        };
        c.reverse();
        assert_eq!(c.streak, 2);
        assert_eq!(c.longest_streak, 3);
        assert_eq!(c.total_completions, 2);
    }

    // First check-in on a fresh habit, duplicate rejected upstream, then the
    // check-in is deleted again.
    #[test]
    fn first_check_in_then_deletion() {
        let mut c = ZERO;
        c.apply(true);
        assert_eq!(
            c,
            Counters {
                streak: 1,
                longest_streak: 1,
                total_completions: 1
            }
        );
        c.reverse();
        assert_eq!(c.streak, 0);
        assert_eq!(c.total_completions, 0);
        assert_eq!(c.longest_streak, 1);
    }

    #[test]
    fn counters_stay_non_negative_under_arbitrary_sequences() {
        let mut c = ZERO;
        for step in [true, true, false, true, false, false, true, true] {
            c.apply(step);
            assert!(c.streak >= 0);
            assert!(c.total_completions >= 0);
            assert!(c.longest_streak >= c.streak);
        }
        for _ in 0..10 {
            c.reverse();
            assert!(c.streak >= 0);
            assert!(c.total_completions >= 0);
        }
    }

    #[test]
    fn recompute_of_empty_ledger_is_zero() {
        assert_eq!(recompute(&[], 0), ZERO);
    }

    #[test]
    fn recompute_counts_consecutive_run_ending_at_latest_entry() {
        let entries = [
            (date!(2026 - 02 - 01), true),
            (date!(2026 - 02 - 02), true),
            // gap on the 3rd
            (date!(2026 - 02 - 04), true),
            (date!(2026 - 02 - 05), true),
            (date!(2026 - 02 - 06), true),
        ];
        let c = recompute(&entries, 0);
        assert_eq!(c.streak, 3);
        assert_eq!(c.longest_streak, 3);
        assert_eq!(c.total_completions, 5);
    }

    #[test]
    fn recompute_earlier_run_can_be_the_longest() {
        let entries = [
            (date!(2026 - 01 - 01), true),
            (date!(2026 - 01 - 02), true),
            (date!(2026 - 01 - 03), true),
            (date!(2026 - 01 - 04), true),
            (date!(2026 - 01 - 10), true),
        ];
        let c = recompute(&entries, 0);
        assert_eq!(c.streak, 1);
        assert_eq!(c.longest_streak, 4);
        assert_eq!(c.total_completions, 5);
    }

    #[test]
    fn recompute_trailing_miss_zeroes_streak() {
        let entries = [
            (date!(2026 - 03 - 01), true),
            (date!(2026 - 03 - 02), true),
            (date!(2026 - 03 - 03), false),
        ];
        let c = recompute(&entries, 0);
        assert_eq!(c.streak, 0);
        assert_eq!(c.longest_streak, 2);
        assert_eq!(c.total_completions, 2);
    }

    #[test]
    fn recompute_miss_in_the_middle_breaks_the_run() {
        let entries = [
            (date!(2026 - 03 - 01), true),
            (date!(2026 - 03 - 02), false),
            (date!(2026 - 03 - 03), true),
            (date!(2026 - 03 - 04), true),
        ];
        let c = recompute(&entries, 0);
        assert_eq!(c.streak, 2);
        assert_eq!(c.longest_streak, 2);
        assert_eq!(c.total_completions, 3);
    }

    #[test]
    fn recompute_preserves_stored_high_water_mark() {
        let entries = [(date!(2026 - 04 - 01), true)];
        let c = recompute(&entries, 8);
        assert_eq!(c.streak, 1);
        assert_eq!(c.longest_streak, 8);
        assert_eq!(c.total_completions, 1);
    }

    #[test]
    fn recompute_crosses_month_boundary() {
        let entries = [
            (date!(2026 - 01 - 31), true),
            (date!(2026 - 02 - 01), true),
        ];
        let c = recompute(&entries, 0);
        assert_eq!(c.streak, 2);
    }
}
