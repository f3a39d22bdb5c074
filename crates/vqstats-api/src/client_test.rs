use super::*;

fn test_client(base_url: &str) -> VirtuosoClient {
    VirtuosoClient::with_base_url(base_url, "test-token", 30, "vqstats-test")
        .expect("client construction should not fail")
}

#[test]
fn build_url_appends_path_to_base_path() {
    let client = test_client("https://api.virtuoso.qa/api");
    let url = client.build_url("goals/42", &[]).unwrap();
    assert_eq!(url.as_str(), "https://api.virtuoso.qa/api/goals/42");
}

#[test]
fn build_url_strips_extra_trailing_slashes() {
    let client = test_client("https://api.virtuoso.qa/api//");
    let url = client
        .build_url("testsuites/latest_status", &[("goalId", "7"), ("envelope", "false")])
        .unwrap();
    assert_eq!(
        url.as_str(),
        "https://api.virtuoso.qa/api/testsuites/latest_status?goalId=7&envelope=false"
    );
}

#[test]
fn build_url_without_query_has_no_question_mark() {
    let client = test_client("https://api.virtuoso.qa/api");
    let url = client.build_url("projects/3/executions", &[]).unwrap();
    assert!(url.query().is_none(), "unexpected query in {url}");
}

#[test]
fn build_url_encodes_bracketed_keys() {
    let client = test_client("https://api.virtuoso.qa/api");
    let url = client
        .build_url("projects/3/jobs", &[("planIds[]", "100")])
        .unwrap();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    assert_eq!(pairs, vec![("planIds[]".to_string(), "100".to_string())]);
}

#[test]
fn with_base_url_rejects_non_http_scheme() {
    let result = VirtuosoClient::with_base_url("ftp://example.com", "t", 30, "ua");
    assert!(matches!(result, Err(ApiError::InvalidBaseUrl { .. })));
}

#[test]
fn with_base_url_rejects_garbage() {
    let result = VirtuosoClient::with_base_url("not a url", "t", 30, "ua");
    assert!(matches!(result, Err(ApiError::InvalidBaseUrl { .. })));
}

#[test]
fn planner_display_name_falls_back_to_id() {
    let info = PlannerInfo {
        planner_id: 9,
        name: None,
        next_execution: None,
    };
    assert_eq!(info.display_name(), "Planner 9");
    assert!(info.scheduled().is_none());
}
