use serde::Serialize;

use super::repo::Habit;

/// Cross-habit summary, recomputed from the active habit set on every call.
#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct HabitStats {
    pub total_habits: i64,
    pub total_streak: i64,
    pub average_streak: i64,
    pub longest_streak: i32,
}

pub fn compute(habits: &[Habit]) -> HabitStats {
    let total_habits = habits.len() as i64;
    let total_streak: i64 = habits.iter().map(|h| i64::from(h.streak)).sum();
    let average_streak = if total_habits > 0 {
        (total_streak as f64 / total_habits as f64).round() as i64
    } else {
        0
    };
    let longest_streak = habits.iter().map(|h| h.longest_streak).max().unwrap_or(0);

    HabitStats {
        total_habits,
        total_streak,
        average_streak,
        longest_streak,
    }
}

#[cfg(test)]
mod tests {
    use super::super::repo::{Category, Frequency};
    use super::*;
    use time::OffsetDateTime;
    use uuid::Uuid;

    fn habit(streak: i32, longest_streak: i32) -> Habit {
        let now = OffsetDateTime::now_utc();
        Habit {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: "Drink water".into(),
            description: None,
            category: Category::Health,
            frequency: Frequency::Daily,
            is_active: true,
            streak,
            longest_streak,
            total_completions: 0,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn no_habits_yields_all_zeros() {
        let stats = compute(&[]);
        assert_eq!(
            stats,
            HabitStats {
                total_habits: 0,
                total_streak: 0,
                average_streak: 0,
                longest_streak: 0,
            }
        );
    }

    #[test]
    fn sums_and_averages_streaks() {
        let stats = compute(&[habit(3, 5), habit(4, 4), habit(2, 9)]);
        assert_eq!(stats.total_habits, 3);
        assert_eq!(stats.total_streak, 9);
        assert_eq!(stats.average_streak, 3);
        assert_eq!(stats.longest_streak, 9);
    }

    #[test]
    fn average_rounds_to_nearest() {
        // 3 + 4 = 7 over 2 habits -> 3.5 rounds up
        let stats = compute(&[habit(3, 3), habit(4, 4)]);
        assert_eq!(stats.average_streak, 4);

        // 1 + 2 = 3 over 2 habits -> 1.5 rounds up
        let stats = compute(&[habit(1, 1), habit(2, 2)]);
        assert_eq!(stats.average_streak, 2);

        // 1 + 1 + 2 = 4 over 3 habits -> 1.33 rounds down
        let stats = compute(&[habit(1, 1), habit(1, 1), habit(2, 2)]);
        assert_eq!(stats.average_streak, 1);
    }

    #[test]
    fn single_fresh_habit() {
        let stats = compute(&[habit(0, 0)]);
        assert_eq!(stats.total_habits, 1);
        assert_eq!(stats.total_streak, 0);
        assert_eq!(stats.average_streak, 0);
        assert_eq!(stats.longest_streak, 0);
    }
}
