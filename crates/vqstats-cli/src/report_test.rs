use serde_json::json;
use vqstats_core::{parse_teams, DayAnchor};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::*;

// 2024-06-15T12:00:00Z
const NEXT_RUN_MS: i64 = 1_718_452_800_000;
// 2024-06-14T11:58:00Z
const JOB_1158_MS: i64 = 1_718_366_280_000;
// 2024-06-14T15:00:00Z
const JOB_1500_MS: i64 = 1_718_377_200_000;

fn options(journey_details: bool) -> ReportOptions {
    ReportOptions {
        policy: MatchPolicy::PreviousDay {
            anchor: DayAnchor::Midday,
        },
        limits: PageLimits::default(),
        tz: FixedOffset::east_opt(0).unwrap(),
        journey_details,
    }
}

fn test_client(server: &MockServer) -> VirtuosoClient {
    VirtuosoClient::with_base_url(&server.uri(), "test-token", 30, "vqstats-test")
        .expect("client construction should not fail")
}

fn journeys(n: i64) -> serde_json::Value {
    let map: serde_json::Map<String, serde_json::Value> = (1..=n)
        .map(|i| (i.to_string(), json!({ "journey": { "id": i, "title": format!("J{i}") } })))
        .collect();
    serde_json::Value::Object(map)
}

async fn mount_planner(server: &MockServer, planner_id: i64, name: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/plans/executions/{planner_id}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "item": { "name": name, "nextScheduleExecution": NEXT_RUN_MS }
        })))
        .mount(server)
        .await;
}

async fn mount_alpha(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/testsuites/latest_status"))
        .and(query_param("goalId", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(journeys(5)))
        .mount(server)
        .await;

    mount_planner(server, 100, "Nightly").await;

    Mock::given(method("GET"))
        .and(path("/projects/1/jobs"))
        .and(query_param("planIds[]", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "501": {
                "submitDate": JOB_1158_MS,
                "goalId": 10,
                "planId": 100,
                "totalTestExecutions": 12,
                "successfulTestExecutions": 9,
                "snapshotId": 42
            },
            "502": {
                "submitDate": JOB_1500_MS,
                "goalId": 10,
                "planId": 100,
                "totalTestExecutions": 3,
                "successfulTestExecutions": 3,
                "snapshotId": 43
            }
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/goals/10"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "item": { "name": "Checkout" } })),
        )
        .mount(server)
        .await;
}

const ALPHA: &str = r#"[{
    "team_name": "Alpha",
    "projects": [{ "project_id": 1, "goal_ids": [10], "planner_id": [100] }]
}]"#;

#[tokio::test]
async fn previous_day_midday_selects_closest_job() {
    let server = MockServer::start().await;
    mount_alpha(&server).await;

    let teams = parse_teams(ALPHA).unwrap();
    let report = build_report(&test_client(&server), &teams, &options(false)).await;

    assert_eq!(report.summaries.len(), 1);
    let alpha = &report.summaries[0];
    assert_eq!(alpha.team_name, "Alpha");
    assert_eq!(alpha.journeys_created, 5);
    assert_eq!(alpha.tc_executed, 12);
    assert_eq!(alpha.tc_passed, 9);
    assert_eq!(alpha.tc_failed, 3);

    assert_eq!(report.details.len(), 1);
    let row = &report.details[0];
    assert_eq!(row.planner_name, "Nightly");
    assert_eq!(row.goal_name, "Checkout");
    assert_eq!(row.executed, 12);
    assert!(row.passed_journeys.is_empty());
}

#[tokio::test]
async fn journey_details_read_snapshot_of_selected_job() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/testsuites/latest_status"))
        .and(query_param("snapshotId", "42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "1": { "journey": { "id": 1, "title": "Login" },
                   "lastExecution": { "statistics": { "outcome": "PASS" } } },
            "2": { "journey": { "id": 2, "title": "Pay" },
                   "lastExecution": { "statistics": { "outcome": "ERROR" } } }
        })))
        .with_priority(1)
        .mount(&server)
        .await;
    mount_alpha(&server).await;

    let teams = parse_teams(ALPHA).unwrap();
    let report = build_report(&test_client(&server), &teams, &options(true)).await;

    let row = &report.details[0];
    assert_eq!(row.passed_journeys, vec!["Login".to_string()]);
    assert_eq!(row.failed_journeys, vec!["Pay".to_string()]);
}

#[tokio::test]
async fn failing_goal_and_planner_do_not_abort_the_team() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/testsuites/latest_status"))
        .and(query_param("goalId", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(journeys(2)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/testsuites/latest_status"))
        .and(query_param("goalId", "11"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/plans/executions/100"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    mount_planner(&server, 101, "Smoke").await;

    Mock::given(method("GET"))
        .and(path("/projects/1/jobs"))
        .and(query_param("planIds[]", "101"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "7": {
                "submitDate": JOB_1158_MS,
                "goalId": 11,
                "totalTestExecutions": 4,
                "successfulTestExecutions": 1
            }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/goals/11"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let teams = parse_teams(
        r#"[{
            "team_name": "Beta",
            "projects": [{ "project_id": 1, "goal_ids": [10, 11], "planner_id": [100, 101] }]
        }]"#,
    )
    .unwrap();
    let report = build_report(&test_client(&server), &teams, &options(false)).await;

    let beta = &report.summaries[0];
    assert_eq!(beta.journeys_created, 2);
    assert_eq!(beta.tc_executed, 4);
    assert_eq!(beta.tc_failed, 3);

    assert_eq!(report.details.len(), 1);
    assert_eq!(report.details[0].planner_name, "Smoke");
    assert_eq!(report.details[0].goal_name, "Goal 11");
}

#[tokio::test]
async fn team_without_projects_reports_zeros() {
    let server = MockServer::start().await;
    let teams = parse_teams(r#"[{ "team_name": "Empty" }]"#).unwrap();

    let report = build_report(&test_client(&server), &teams, &options(false)).await;

    assert_eq!(report.summaries.len(), 1);
    assert_eq!(report.summaries[0].journeys_created, 0);
    assert_eq!(report.summaries[0].tc_executed, 0);
    assert!(report.details.is_empty());
}

#[tokio::test]
async fn journey_counts_sum_across_projects() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/testsuites/latest_status"))
        .and(query_param("goalId", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(journeys(5)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/testsuites/latest_status"))
        .and(query_param("goalId", "20"))
        .respond_with(ResponseTemplate::new(200).set_body_json(journeys(3)))
        .mount(&server)
        .await;

    let teams = parse_teams(
        r#"[{
            "team_name": "Alpha",
            "projects": [
                { "project_id": 1, "goal_ids": [10] },
                { "project_id": 2, "goal_ids": [20] }
            ]
        }]"#,
    )
    .unwrap();
    let counts = journey_counts(&test_client(&server), &teams).await;

    assert_eq!(counts, vec![("Alpha".to_string(), 8)]);
}
