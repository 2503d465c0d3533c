//! End-to-end controller scenarios against a mock OpenWeather server:
//! submit, granularity change, not-found, and the missing-credential path.

use citycast_core::{
    Error, Granularity, Metric, OpenWeatherClient, ViewState, fetch_now, run_fetch,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> OpenWeatherClient {
    OpenWeatherClient::with_base_urls("TESTKEY".to_string(), server.uri(), server.uri())
        .expect("client builds")
}

async fn mount_geocode(server: &MockServer, lat: f64, lon: f64) {
    Mock::given(method("GET"))
        .and(path("/geo/1.0/direct"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            { "name": "Kyiv", "lat": lat, "lon": lon, "country": "UA" }
        ])))
        .mount(server)
        .await;
}

async fn mount_forecast(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/data/2.5/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "list": [
                {
                    "dt_txt": "2024-01-01 03:00:00",
                    "main": { "temp": 20.0, "pressure": 1010.0, "humidity": 60.0 },
                    "wind": { "speed": 4.0 }
                },
                {
                    "dt_txt": "2024-01-01 00:00:00",
                    "main": { "temp": 10.0, "pressure": 1000.0, "humidity": 50.0 },
                    "wind": { "speed": 2.0 }
                }
            ]
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn submit_replaces_series_with_sorted_points() {
    let server = MockServer::start().await;
    mount_geocode(&server, 50.45, 30.52).await;
    mount_forecast(&server).await;

    let client = client(&server);
    let mut state = ViewState::new();
    state.city_input = "Kyiv".to_string();

    assert!(fetch_now(&mut state, Some(&client)).await);

    let series = state.series.as_ref().expect("series held after success");
    assert_eq!(series.city_name, "Kyiv");
    assert_eq!(series.points.len(), 2);
    assert_eq!(series.points[0].timestamp, "2024-01-01 00:00:00");
    assert_eq!(series.points[1].timestamp, "2024-01-01 03:00:00");
    assert!(!state.loading);
    assert!(state.error.is_none());
}

#[tokio::test]
async fn granularity_change_refetches_and_aggregates() {
    let server = MockServer::start().await;
    mount_geocode(&server, 50.45, 30.52).await;
    mount_forecast(&server).await;

    let client = client(&server);
    let mut state = ViewState::new();
    state.city_input = "Kyiv".to_string();
    assert!(fetch_now(&mut state, Some(&client)).await);

    // second, independent trigger path: the selector, not the form
    let request = state
        .change_granularity(Granularity::Daily)
        .expect("entered city refetches");
    assert!(state.loading);
    let outcome = run_fetch(&client, &request).await;
    state.apply_outcome(request.seq, outcome);

    let series = state.series.as_ref().expect("series held");
    assert_eq!(series.points.len(), 1);
    assert_eq!(series.points[0].timestamp, "2024-01-01");
    assert_eq!(series.points[0].temperature, 15.0);
    assert_eq!(series.points[0].pressure, 1005.0);
    assert_eq!(series.points[0].humidity, 55.0);
    assert_eq!(series.points[0].wind_speed, 3.0);
    assert!(!state.loading);
}

#[tokio::test]
async fn city_not_found_keeps_previous_series() {
    let server = MockServer::start().await;
    mount_geocode(&server, 50.45, 30.52).await;
    mount_forecast(&server).await;

    let client = client(&server);
    let mut state = ViewState::new();
    state.city_input = "Kyiv".to_string();
    assert!(fetch_now(&mut state, Some(&client)).await);
    let held = state.series.clone();

    // swap the geocoder for one that finds nothing
    let empty = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/geo/1.0/direct"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&empty)
        .await;
    let not_found_client =
        OpenWeatherClient::with_base_urls("TESTKEY".to_string(), empty.uri(), empty.uri())
            .expect("client builds");

    state.city_input = "Nowhereville".to_string();
    assert!(!fetch_now(&mut state, Some(&not_found_client)).await);

    assert_eq!(state.error.as_deref(), Some("City not found"));
    assert_eq!(state.series, held, "stale series stays visible on error");
    assert!(!state.loading);
}

#[tokio::test]
async fn missing_credential_fails_before_any_network_call() {
    // a server that must never be hit
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut state = ViewState::new();
    state.city_input = "Kyiv".to_string();

    assert!(!fetch_now::<OpenWeatherClient>(&mut state, None).await);

    assert_eq!(state.error.as_deref(), Some("API key is not configured"));
    assert!(state.series.is_none());
    assert!(!state.loading);

    server.verify().await;
}

#[tokio::test]
async fn metric_change_makes_no_network_call() {
    let server = MockServer::start().await;
    mount_geocode(&server, 50.45, 30.52).await;
    mount_forecast(&server).await;

    let client = client(&server);
    let mut state = ViewState::new();
    state.city_input = "Kyiv".to_string();
    assert!(fetch_now(&mut state, Some(&client)).await);
    let held = state.series.clone();

    // only requests so far: one geocode, one forecast
    let issued = server.received_requests().await.expect("recording enabled").len();
    assert_eq!(issued, 2);

    state.change_metric(Metric::WindSpeed);

    assert_eq!(state.metric, Metric::WindSpeed);
    assert_eq!(state.series, held);
    let after = server.received_requests().await.expect("recording enabled").len();
    assert_eq!(after, issued, "metric switch must not fetch");
}

#[tokio::test]
async fn transport_failure_surfaces_as_error_message() {
    // no server listening on this port once it drops
    let server = MockServer::start().await;
    let uri = server.uri();
    drop(server);

    let client = OpenWeatherClient::with_base_urls("TESTKEY".to_string(), uri.clone(), uri)
        .expect("client builds");
    let mut state = ViewState::new();
    state.city_input = "Kyiv".to_string();

    assert!(!fetch_now(&mut state, Some(&client)).await);

    let msg = state.error.as_deref().expect("error surfaced");
    assert!(msg.starts_with("Request failed"), "got: {msg}");
    assert!(!state.loading);
}

#[tokio::test]
async fn upstream_error_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/geo/1.0/direct"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    let mut state = ViewState::new();
    state.city_input = "Kyiv".to_string();

    assert!(!fetch_now(&mut state, Some(&client)).await);
    assert!(matches!(
        state.error.as_deref(),
        Some(msg) if msg.contains("503")
    ));

    server.verify().await;
}

#[tokio::test]
async fn run_fetch_propagates_city_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/geo/1.0/direct"))
        .and(query_param("q", "Atlantis"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&server)
        .await;

    let client = client(&server);
    let mut state = ViewState::new();
    state.city_input = "Atlantis".to_string();
    let request = state.submit_city().expect("fetch issued");

    let err = run_fetch(&client, &request).await.unwrap_err();
    assert!(matches!(err, Error::CityNotFound));
}
