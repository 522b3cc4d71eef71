use chrono::{DateTime, Utc};
use serde::Serialize;

use super::data::{Badge, Category, DailyProgress, League, ProgressionState};
use super::league::{promotion_for, streak_badge_for};
use crate::internal_error::{AppError, AppResult};
use crate::tasks::data::Task;

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct CompletionOutcome {
    pub points_earned: f64,
    pub category: Category,
    pub streak_day: bool,
    pub current_streak: u32,
    pub promoted_to: Option<League>,
    pub badges_awarded: Vec<Badge>,
}

/// Applies one task completion to the user's state, the task and today's record.
///
/// Nothing is mutated when the task was already completed on `now`'s calendar
/// date. `today` must be the record for that date, fresh or previously stored.
pub fn complete_task(
    state: &mut ProgressionState,
    task: &mut Task,
    today: &mut DailyProgress,
    now: DateTime<Utc>,
) -> AppResult<CompletionOutcome> {
    debug_assert_eq!(today.date, now.date_naive());

    if task.completed_on(now.date_naive()) {
        return Err(AppError::AlreadyCompletedToday);
    }

    task.mark_completed(now);

    let points_earned = state.league.multipliers().points;
    *state.points.get_mut(task.category) += points_earned;
    state.last_task_completion = Some(now);

    let was_streak_day = today.all_categories_completed();
    today.record(task.category, points_earned);

    let mut outcome = CompletionOutcome {
        points_earned,
        category: task.category,
        streak_day: today.streak_day,
        current_streak: state.current_streak,
        promoted_to: None,
        badges_awarded: vec![],
    };

    // A day only extends the streak once, on the completion that fills it.
    if today.streak_day && !was_streak_day {
        advance_streak(state, &mut outcome);
    }

    Ok(outcome)
}

fn advance_streak(state: &mut ProgressionState, outcome: &mut CompletionOutcome) {
    state.current_streak += 1;
    state.best_streak = state.best_streak.max(state.current_streak);
    outcome.current_streak = state.current_streak;

    if let Some(promotion) = promotion_for(state.current_streak, state.league) {
        state.league = promotion.to;
        outcome.promoted_to = Some(promotion.to);
        if state.award_badge(promotion.trophy) {
            outcome.badges_awarded.push(promotion.trophy);
        }
    }

    if let Some(badge) = streak_badge_for(state.current_streak) {
        if state.award_badge(badge) {
            outcome.badges_awarded.push(badge);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, day, hour, 0, 0).unwrap()
    }

    fn task_in(category: Category) -> Task {
        Task::new(
            "user".to_string(),
            category,
            format!("{} task", category),
            None,
            at(1, 0),
        )
    }

    fn complete_all(state: &mut ProgressionState, now: DateTime<Utc>) -> Vec<CompletionOutcome> {
        let mut today = DailyProgress::new(now.date_naive());
        Category::ALL
            .iter()
            .map(|category| {
                complete_task(state, &mut task_in(*category), &mut today, now).unwrap()
            })
            .collect()
    }

    #[test]
    fn completion_earns_league_points_in_its_category() {
        let mut state = ProgressionState::default();
        let mut task = task_in(Category::Physical);
        let mut today = DailyProgress::new(at(2, 9).date_naive());

        let outcome = complete_task(&mut state, &mut task, &mut today, at(2, 9)).unwrap();

        assert_eq!(outcome.points_earned, 2.0);
        assert_eq!(outcome.category, Category::Physical);
        assert!(!outcome.streak_day);
        assert_eq!(outcome.current_streak, 0);
        assert_eq!(state.points.physical, 2.0);
        assert_eq!(state.points.total(), 2.0);
        assert_eq!(state.last_task_completion, Some(at(2, 9)));
        assert_eq!(today.completed_categories, vec![Category::Physical]);
        assert_eq!(today.points_earned.physical, 2.0);
        assert_eq!(task.completion_dates, vec![at(2, 9)]);
    }

    #[test]
    fn same_task_twice_in_one_day_is_rejected_without_changes() {
        let mut state = ProgressionState::default();
        let mut task = task_in(Category::Social);
        let mut today = DailyProgress::new(at(2, 0).date_naive());

        complete_task(&mut state, &mut task, &mut today, at(2, 8)).unwrap();
        let (state_before, task_before, today_before) =
            (state.clone(), task.clone(), today.clone());

        let err = complete_task(&mut state, &mut task, &mut today, at(2, 22)).unwrap_err();
        assert!(matches!(err, AppError::AlreadyCompletedToday));
        assert_eq!(state, state_before);
        assert_eq!(task, task_before);
        assert_eq!(today, today_before);

        let mut tomorrow = DailyProgress::new(at(3, 0).date_naive());
        assert!(complete_task(&mut state, &mut task, &mut tomorrow, at(3, 8)).is_ok());
        assert_eq!(task.completion_dates.len(), 2);
    }

    #[test]
    fn all_five_categories_extend_streak_exactly_once() {
        let mut state = ProgressionState::default();
        let outcomes = complete_all(&mut state, at(2, 10));

        assert_eq!(
            outcomes.iter().filter(|o| o.streak_day).count(),
            1,
            "only the last completion fills the day"
        );
        assert!(outcomes[4].streak_day);
        assert_eq!(outcomes[4].current_streak, 1);
        assert_eq!(state.current_streak, 1);
        assert_eq!(state.best_streak, 1);
    }

    #[test]
    fn extra_completions_on_a_full_day_do_not_extend_streak() {
        let mut state = ProgressionState::default();
        let now = at(2, 10);
        let mut today = DailyProgress::new(now.date_naive());

        for category in Category::ALL.iter().rev() {
            complete_task(&mut state, &mut task_in(*category), &mut today, now).unwrap();
        }
        let second_social =
            complete_task(&mut state, &mut task_in(Category::Social), &mut today, now).unwrap();

        assert!(second_social.streak_day);
        assert_eq!(second_social.current_streak, 1);
        assert_eq!(state.current_streak, 1);
        assert_eq!(today.points_earned.social, 4.0);
    }

    #[test]
    fn streak_badges_arrive_at_milestones() {
        let mut state = ProgressionState {
            current_streak: 2,
            best_streak: 2,
            ..ProgressionState::default()
        };

        let outcomes = complete_all(&mut state, at(5, 10));

        assert_eq!(outcomes[4].badges_awarded, vec![Badge::Beginner]);
        assert_eq!(state.badges, vec![Badge::Beginner]);
    }

    #[test]
    fn streak_badge_is_not_awarded_twice() {
        let mut state = ProgressionState {
            current_streak: 6,
            best_streak: 9,
            badges: vec![Badge::Beginner, Badge::Disciplined],
            ..ProgressionState::default()
        };

        let outcomes = complete_all(&mut state, at(5, 10));

        assert_eq!(state.current_streak, 7);
        assert_eq!(state.best_streak, 9);
        assert!(outcomes[4].badges_awarded.is_empty());
        assert_eq!(state.badges.len(), 2);
    }

    #[test]
    fn reaching_twenty_five_in_normal_promotes_to_novice() {
        let mut state = ProgressionState {
            current_streak: 24,
            best_streak: 24,
            ..ProgressionState::default()
        };

        let outcomes = complete_all(&mut state, at(5, 10));

        assert_eq!(state.league, League::Novice);
        assert_eq!(outcomes[4].promoted_to, Some(League::Novice));
        assert!(state.has_badge(Badge::BronzeTrophy));

        // points were earned at the pre-promotion rate
        assert_eq!(state.points.total(), 10.0);

        let tomorrow = complete_all(&mut state, at(6, 10));
        assert_eq!(tomorrow[0].points_earned, 1.5);
    }

    #[test]
    fn milestone_in_the_wrong_league_does_not_promote() {
        let mut state = ProgressionState {
            current_streak: 49,
            best_streak: 49,
            ..ProgressionState::default()
        };

        let outcomes = complete_all(&mut state, at(5, 10));

        assert_eq!(state.current_streak, 50);
        assert_eq!(state.league, League::Normal);
        assert_eq!(outcomes[4].promoted_to, None);
        assert!(!state.has_badge(Badge::SilverTrophy));
    }

    #[test]
    fn promotion_and_streak_badge_can_coincide() {
        let mut state = ProgressionState {
            league: League::Normal,
            current_streak: 29,
            best_streak: 29,
            ..ProgressionState::default()
        };
        complete_all(&mut state, at(5, 10));
        assert!(state.has_badge(Badge::Master));
        assert_eq!(state.league, League::Normal);

        let mut state = ProgressionState {
            league: League::Advanced,
            current_streak: 99,
            best_streak: 120,
            ..ProgressionState::default()
        };
        let outcomes = complete_all(&mut state, at(5, 10));
        assert_eq!(state.league, League::Master);
        assert_eq!(outcomes[4].badges_awarded, vec![Badge::GoldenTrophy]);
        assert_eq!(state.best_streak, 120);
    }

    #[test]
    fn consecutive_days_keep_best_streak_ahead() {
        let mut state = ProgressionState::default();
        let start = at(1, 12);

        for offset in 0..10 {
            complete_all(&mut state, start + Duration::days(offset));
            assert!(state.best_streak >= state.current_streak);
        }

        assert_eq!(state.current_streak, 10);
        assert_eq!(state.badges, vec![Badge::Beginner, Badge::Disciplined]);
    }
}
