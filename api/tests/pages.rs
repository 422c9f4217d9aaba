mod helpers;

use chrono::NaiveDate;
use helpers::COOKIE;
use reqwest::Url;
use serde_json::json;
use sotd_api::{
    client::ApiClient,
    profile_page::{Load, ProfileLoader},
    recap::DEFAULT_VIBE,
    select_sotd::{SelectError, SelectSotd},
};
use std::time::Duration;
use wiremock::{
    matchers::{body_json, header, method, path},
    Mock, MockServer, ResponseTemplate,
};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
}

fn client(gateway: &MockServer) -> ApiClient {
    ApiClient::new(Url::parse(&gateway.uri()).unwrap(), Some(COOKIE.to_string()))
}

async fn answer(gateway: &MockServer, route: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(route))
        .and(header("cookie", COOKIE))
        .respond_with(response)
        .mount(gateway)
        .await;
}

fn profile() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({"id": "42", "name": "John Doe"}))
}

#[tokio::test]
async fn profile_without_pick_offers_to_pick() {
    let gateway = MockServer::start().await;
    answer(&gateway, "/api/user/42", profile()).await;
    answer(
        &gateway,
        "/api/user/42/statistics/weekly",
        ResponseTemplate::new(200).set_body_json(json!([
            {"weekStart": "2025-02-17", "totalTracks": 10, "vibe": "older"},
            {"weekStart": "2025-02-24", "totalTracks": 42, "topArtists": ["Slowdive"]}
        ])),
    )
    .await;
    answer(
        &gateway,
        "/api/user/42/sotds/2025-03-01",
        ResponseTemplate::new(404).set_body_json(json!({"error": "No SOTD found for this date"})),
    )
    .await;
    let client = client(&gateway);

    let page = ProfileLoader::new(&client).load("42", today()).await;

    assert!(page.is_loaded());
    assert_eq!(page.profile.ready().map(|p| p.name.as_str()), Some("John Doe"));
    let recap = page.recap.ready().unwrap();
    assert_eq!(recap.total_tracks, 42);
    assert_eq!(recap.vibe, DEFAULT_VIBE);
    assert_eq!(recap.items(), ["Slowdive".to_string()]);
    assert!(page.needs_sotd());
    assert!(!page.sotd_failed());
}

#[tokio::test]
async fn failing_recap_leaves_other_slots_alone() {
    let gateway = MockServer::start().await;
    answer(&gateway, "/api/user/42", profile()).await;
    answer(
        &gateway,
        "/api/user/42/statistics/weekly",
        ResponseTemplate::new(500).set_body_json(json!({"error": "Failed to fetch statistics"})),
    )
    .await;
    answer(
        &gateway,
        "/api/user/42/sotds/2025-03-01",
        ResponseTemplate::new(200).set_body_json(json!({
            "track_id": "a",
            "note": "on repeat",
            "mood": "Calm",
            "track": {"id": "a", "name": "Alison", "artists": [{"name": "Slowdive"}]}
        })),
    )
    .await;
    let client = client(&gateway);

    let page = ProfileLoader::new(&client).load("42", today()).await;

    assert!(page.profile.ready().is_some());
    assert!(matches!(&page.recap, Load::Failed(e) if e.contains("Failed to fetch statistics")));
    assert!(page.has_sotd());
    assert_eq!(page.today.ready().map(|e| e.mood.as_str()), Some("Calm"));
}

#[tokio::test]
async fn empty_statistics_mean_no_recap_yet() {
    let gateway = MockServer::start().await;
    answer(&gateway, "/api/user/42", profile()).await;
    answer(
        &gateway,
        "/api/user/42/statistics/weekly",
        ResponseTemplate::new(200).set_body_json(json!([])),
    )
    .await;
    answer(&gateway, "/api/user/42/sotds/2025-03-01", ResponseTemplate::new(404)).await;
    let client = client(&gateway);

    let page = ProfileLoader::new(&client).load("42", today()).await;
    assert_eq!(page.recap, Load::Missing);
}

#[tokio::test]
async fn slow_pick_times_out_as_failure() {
    let gateway = MockServer::start().await;
    answer(&gateway, "/api/user/42", profile()).await;
    answer(
        &gateway,
        "/api/user/42/statistics/weekly",
        ResponseTemplate::new(200).set_body_json(json!([])),
    )
    .await;
    answer(
        &gateway,
        "/api/user/42/sotds/2025-03-01",
        ResponseTemplate::new(200)
            .set_body_json(json!({"track_id": "a"}))
            .set_delay(Duration::from_secs(5)),
    )
    .await;
    let client = client(&gateway);

    let mut observed = 0;
    let page = ProfileLoader::new(&client)
        .with_sotd_timeout(Duration::from_millis(200))
        .load_observed("42", today(), |_| observed += 1)
        .await;

    // initial state plus one update per resource
    assert_eq!(observed, 4);
    assert!(page.is_loaded());
    assert!(page.sotd_failed());
    assert!(!page.needs_sotd());
    assert_eq!(page.today, Load::Failed("request timed out".to_string()));
}

#[tokio::test]
async fn picking_a_recommendation_submits_and_returns_to_profile() {
    let gateway = MockServer::start().await;
    answer(
        &gateway,
        "/api/user/42/sotds/recommended",
        ResponseTemplate::new(200).set_body_json(json!({
            "tracks": [
                {"id": "a", "name": "Alison", "artists": [{"name": "Slowdive"}]},
                null,
                {"id": "b", "name": "Sometimes", "artists": [{"name": "My Bloody Valentine"}]}
            ]
        })),
    )
    .await;
    Mock::given(method("POST"))
        .and(path("/api/user/42/sotds"))
        .and(header("cookie", COOKIE))
        .and(body_json(json!({"track_id": "b", "note": "rainy day", "mood": "Calm"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&gateway)
        .await;
    let client = client(&gateway);

    let mut flow = SelectSotd::new("42");
    flow.load(&client).await;
    assert_eq!(flow.recommendations().len(), 2);

    flow.select("b").unwrap();
    flow.set_note("rainy day");
    flow.set_mood("Calm");

    assert_eq!(flow.submit(&client).await.unwrap(), "/profile/42");
    assert!(!flow.is_submitting());
    assert!(flow.error().is_none());
}

#[tokio::test]
async fn failed_submit_keeps_the_selection() {
    let gateway = MockServer::start().await;
    answer(
        &gateway,
        "/api/user/42/sotds/recommended",
        ResponseTemplate::new(200).set_body_json(json!([{"id": "a", "name": "Alison"}])),
    )
    .await;
    Mock::given(method("POST"))
        .and(path("/api/user/42/sotds"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({"error": "Failed to create SOTD"})),
        )
        .mount(&gateway)
        .await;
    let client = client(&gateway);

    let mut flow = SelectSotd::new("42");
    flow.load(&client).await;
    flow.select("a").unwrap();

    assert!(matches!(flow.submit(&client).await, Err(SelectError::Submit(_))));
    assert_eq!(flow.error(), Some("Failed to submit SOTD"));
    assert_eq!(flow.selected().map(|t| t.id.as_str()), Some("a"));
    assert!(flow.can_submit());
}

#[tokio::test]
async fn failed_recommendations_load() {
    let gateway = MockServer::start().await;
    answer(
        &gateway,
        "/api/user/42/sotds/recommended",
        ResponseTemplate::new(502).set_body_json(json!({"error": "API error: Bad Gateway"})),
    )
    .await;
    let client = client(&gateway);

    let mut flow = SelectSotd::new("42");
    flow.load(&client).await;

    assert_eq!(
        flow.tracks,
        Load::Failed("Failed to fetch recommended tracks".to_string())
    );
    assert!(flow.recommendations().is_empty());
}

#[tokio::test]
async fn empty_recommendations_placeholder_reads_as_no_tracks() {
    let gateway = MockServer::start().await;
    answer(
        &gateway,
        "/api/user/42/sotds/recommended",
        ResponseTemplate::new(200).set_body_json(json!({"items": []})),
    )
    .await;
    let client = client(&gateway);

    let mut flow = SelectSotd::new("42");
    flow.load(&client).await;

    assert_eq!(flow.tracks, Load::Ready(Vec::new()));
}
