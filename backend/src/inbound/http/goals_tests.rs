//! Tests for goal HTTP handlers.

use super::*;
use crate::domain::test_fixtures::tag;
use crate::domain::{CategoryGoalId, Error, TagId, UserId};
use crate::inbound::http::error::configure_extractors;
use crate::inbound::http::test_utils::{MockPorts, TEST_TOKEN, TEST_USER, bearer};
use actix_web::http::StatusCode;
use actix_web::{App, test as actix_test};
use mockall::predicate::eq;
use rstest::rstest;
use serde_json::{Value, json};

fn test_app(
    ports: MockPorts,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(ports.into_state()))
        .configure(configure_extractors)
        .service(web::scope("/api").configure(configure))
}

fn june() -> GoalPeriod {
    GoalPeriod::new(6, 2025).expect("valid period")
}

fn stored_goal() -> Goal {
    Goal {
        id: GoalId::new(2),
        user_id: TEST_USER,
        period: june(),
        product_goal: 10,
        video_goal: 0,
        category_goals: vec![CategoryGoal {
            id: CategoryGoalId::new(1),
            tag: tag(4, "shoes"),
            product_goal: 2,
        }],
    }
}

#[actix_web::test]
async fn upsert_builds_draft_from_body() {
    let mut ports = MockPorts::default();
    let expected = GoalDraft::new(
        None,
        june(),
        10,
        0,
        vec![CategoryTarget::new("shoes", 2).expect("valid category")],
    )
    .expect("valid draft");
    ports
        .goals
        .expect_create_or_update_goal()
        .with(eq(TEST_USER), eq(expected))
        .times(1)
        .returning(|_, _| Ok(stored_goal()));

    let app = actix_test::init_service(test_app(ports)).await;
    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/goals")
            .insert_header(bearer(TEST_TOKEN))
            .set_json(json!({
                "month": 6,
                "year": 2025,
                "product_goal": 10,
                "category_goals": [{"tag_name": " shoes ", "product_goal": 2}]
            }))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(
        body,
        json!({
            "id": 2,
            "month": 6,
            "year": 2025,
            "product_goal": 10,
            "video_goal": 0,
            "category_goals": [
                {"tag_id": 4, "tag_name": "shoes", "tag_color": "#3B82F6", "product_goal": 2}
            ]
        })
    );
}

#[actix_web::test]
async fn upsert_accepts_numeric_strings_from_form_inputs() {
    let mut ports = MockPorts::default();
    let expected = GoalDraft::new(
        Some(GoalId::new(2)),
        june(),
        10,
        0,
        vec![CategoryTarget::new("shoes", 2).expect("valid category")],
    )
    .expect("valid draft");
    ports
        .goals
        .expect_create_or_update_goal()
        .with(eq(TEST_USER), eq(expected))
        .times(1)
        .returning(|_, _| Ok(stored_goal()));

    let app = actix_test::init_service(test_app(ports)).await;
    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/goals")
            .insert_header(bearer(TEST_TOKEN))
            .set_json(json!({
                "id": "2",
                "month": "6",
                "year": "2025",
                "product_goal": "10",
                "video_goal": "",
                "category_goals": [{"tag_name": "shoes", "product_goal": "2"}]
            }))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
}

#[rstest]
#[case::month_out_of_range(json!({"month": 13, "year": 2025}), "month")]
#[case::missing_year(json!({"month": 6}), "year")]
#[case::negative_target(json!({"month": 6, "year": 2025, "video_goal": -5}), "video_goal")]
#[case::duplicate_category(
    json!({"month": 6, "year": 2025, "category_goals": [
        {"tag_name": "shoes", "product_goal": 1},
        {"tag_name": "shoes", "product_goal": 2}
    ]}),
    "category_goals"
)]
#[actix_web::test]
async fn upsert_rejects_invalid_bodies(#[case] payload: Value, #[case] field: &str) {
    let mut ports = MockPorts::default();
    ports.goals.expect_create_or_update_goal().never();

    let app = actix_test::init_service(test_app(ports)).await;
    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/goals")
            .insert_header(bearer(TEST_TOKEN))
            .set_json(payload)
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["details"]["field"], field);
}

#[actix_web::test]
async fn period_clash_surfaces_already_exists() {
    let mut ports = MockPorts::default();
    ports
        .goals
        .expect_create_or_update_goal()
        .times(1)
        .returning(|_, _| Err(Error::already_exists("a goal for 6/2025 already exists")));

    let app = actix_test::init_service(test_app(ports)).await;
    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/goals")
            .insert_header(bearer(TEST_TOKEN))
            .set_json(json!({"id": 9, "month": 6, "year": 2025}))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["details"]["code"], "already_exists");
}

#[actix_web::test]
async fn stats_returns_progress_envelope() {
    let mut ports = MockPorts::default();
    ports
        .goals
        .expect_goal_stats()
        .with(eq(TEST_USER), eq(june()))
        .times(1)
        .returning(|_: UserId, _| {
            Ok(GoalStats::compute(
                stored_goal(),
                5,
                12,
                &[(TagId::new(4), 1)],
            ))
        });

    let app = actix_test::init_service(test_app(ports)).await;
    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/goals/stats?month=6&year=2025")
            .insert_header(bearer(TEST_TOKEN))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["goal"]["id"], 2);
    assert_eq!(body["actual"]["products_purchased"], 5);
    assert_eq!(body["actual"]["videos_logged"], 12);
    assert_eq!(body["actual"]["categories"][0]["products_purchased"], 1);
    assert_eq!(body["progress"]["product_progress"], 50.0);
    assert_eq!(body["progress"]["video_progress"], 0.0);
}

#[actix_web::test]
async fn stats_without_goal_is_not_found() {
    let mut ports = MockPorts::default();
    ports
        .goals
        .expect_goal_stats()
        .times(1)
        .returning(|_, _| Err(Error::not_found("no goal for 6/2025")));

    let app = actix_test::init_service(test_app(ports)).await;
    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/goals/stats?month=6&year=2025")
            .insert_header(bearer(TEST_TOKEN))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn stats_requires_month_and_year() {
    let app = actix_test::init_service(test_app(MockPorts::default())).await;
    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/goals/stats?month=6")
            .insert_header(bearer(TEST_TOKEN))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["details"]["field"], "year");
}

#[actix_web::test]
async fn delete_goal_answers_no_content() {
    let mut ports = MockPorts::default();
    ports
        .goals
        .expect_delete_goal()
        .with(eq(TEST_USER), eq(GoalId::new(2)))
        .times(1)
        .returning(|_, _| Ok(()));

    let app = actix_test::init_service(test_app(ports)).await;
    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::delete()
            .uri("/api/goals/2")
            .insert_header(bearer(TEST_TOKEN))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}
