//! Tests for the goal tracking service.

use std::sync::Arc;

use mockall::predicate::eq;
use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::{MockGoalRepository, MonthActivity};
use crate::domain::test_fixtures::{fixture_clock, fixture_now, tag};
use crate::domain::{CategoryGoal, CategoryGoalId, CategoryTarget, ErrorCode};

const USER: UserId = UserId::new(2);

#[fixture]
fn june() -> GoalPeriod {
    GoalPeriod::new(6, 2025).expect("valid period")
}

fn goal(period: GoalPeriod, product_goal: i32, video_goal: i32) -> Goal {
    Goal {
        id: GoalId::new(11),
        user_id: USER,
        period,
        product_goal,
        video_goal,
        category_goals: vec![CategoryGoal {
            id: CategoryGoalId::new(1),
            tag: tag(4, "shoes"),
            product_goal: 2,
        }],
    }
}

fn service(repo: MockGoalRepository) -> GoalService<MockGoalRepository> {
    GoalService::new(Arc::new(repo), fixture_clock())
}

#[rstest]
#[tokio::test]
async fn stats_without_goal_is_not_found(june: GoalPeriod) {
    let mut repo = MockGoalRepository::new();
    repo.expect_find_for_period()
        .with(eq(USER), eq(june))
        .times(1)
        .return_once(|_, _| Ok(None));
    repo.expect_month_activity().never();

    let error = service(repo)
        .goal_stats(USER, june)
        .await
        .expect_err("no goal");
    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn stats_combine_goal_with_activity(june: GoalPeriod) {
    let mut repo = MockGoalRepository::new();
    repo.expect_find_for_period()
        .times(1)
        .return_once(move |_, period| Ok(Some(goal(period, 4, 20))));
    repo.expect_month_activity()
        .withf(|user, _, tag_ids| *user == USER && tag_ids == [TagId::new(4)])
        .times(1)
        .return_once(|_, _, _| {
            Ok(MonthActivity {
                products_purchased: 3,
                videos_logged: 5,
                category_purchases: vec![(TagId::new(4), 1)],
            })
        });

    let stats = service(repo)
        .goal_stats(USER, june)
        .await
        .expect("stats succeed");
    assert_eq!(stats.actual.products_purchased, 3);
    assert_eq!(stats.actual.videos_logged, 5);
    assert!((stats.progress.product_progress - 75.0).abs() < f64::EPSILON);
    assert!((stats.progress.video_progress - 25.0).abs() < f64::EPSILON);
    let shoes = stats.actual.categories.first().expect("one category");
    assert!((shoes.progress - 50.0).abs() < f64::EPSILON);
}

#[rstest]
#[tokio::test]
async fn zero_targets_never_divide_by_zero(june: GoalPeriod) {
    let mut repo = MockGoalRepository::new();
    repo.expect_find_for_period()
        .times(1)
        .return_once(move |_, period| Ok(Some(goal(period, 0, 0))));
    repo.expect_month_activity().times(1).return_once(|_, _, _| {
        Ok(MonthActivity {
            products_purchased: 2,
            videos_logged: 9,
            category_purchases: Vec::new(),
        })
    });

    let stats = service(repo)
        .goal_stats(USER, june)
        .await
        .expect("stats succeed");
    assert_eq!(stats.progress.product_progress, 0.0);
    assert_eq!(stats.progress.video_progress, 0.0);
}

#[rstest]
#[tokio::test]
async fn upsert_forwards_draft_and_returns_reloaded_goal(june: GoalPeriod) {
    let draft = GoalDraft::new(
        None,
        june,
        4,
        20,
        vec![CategoryTarget::new("shoes", 2).expect("valid category")],
    )
    .expect("valid draft");
    let expected = draft.clone();
    let mut repo = MockGoalRepository::new();
    repo.expect_upsert()
        .withf(move |user, draft, now| {
            *user == USER && *draft == expected && *now == fixture_now()
        })
        .times(1)
        .return_once(move |_, draft, _| Ok(goal(draft.period(), draft.product_goal(), draft.video_goal())));

    let saved = service(repo)
        .create_or_update_goal(USER, draft)
        .await
        .expect("upsert succeeds");
    assert_eq!(saved.product_goal, 4);
    assert_eq!(saved.category_goals.len(), 1);
}

#[rstest]
#[tokio::test]
async fn upsert_clash_is_reported_as_already_exists(june: GoalPeriod) {
    let draft = GoalDraft::new(Some(GoalId::new(11)), june, 1, 1, Vec::new()).expect("valid draft");
    let mut repo = MockGoalRepository::new();
    repo.expect_upsert()
        .times(1)
        .return_once(|_, _, _| Err(GoalRepositoryError::period_taken(6_u32, 2025)));

    let error = service(repo)
        .create_or_update_goal(USER, draft)
        .await
        .expect_err("clash");
    assert_eq!(error.code(), ErrorCode::InvalidRequest);
    assert_eq!(
        error.details().and_then(|details| details["code"].as_str()),
        Some("already_exists")
    );
}

#[rstest]
#[tokio::test]
async fn deleting_unknown_goal_is_not_found() {
    let mut repo = MockGoalRepository::new();
    repo.expect_delete().times(1).return_once(|_, _| Ok(false));

    let error = service(repo)
        .delete_goal(USER, GoalId::new(99))
        .await
        .expect_err("missing goal");
    assert_eq!(error.code(), ErrorCode::NotFound);
}
