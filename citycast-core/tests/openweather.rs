//! Integration tests for OpenWeatherClient using wiremock.
//!
//! These tests verify request shape and error mapping against a mock HTTP
//! server standing in for both OpenWeather endpoints.

use citycast_core::{Coordinate, Error, ForecastProvider, OpenWeatherClient};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> OpenWeatherClient {
    OpenWeatherClient::with_base_urls("TESTKEY".to_string(), server.uri(), server.uri())
        .expect("client builds")
}

fn forecast_entry(ts: &str, temp: f64, pressure: f64, humidity: f64, wind: f64) -> serde_json::Value {
    serde_json::json!({
        "dt_txt": ts,
        "main": { "temp": temp, "pressure": pressure, "humidity": humidity },
        "wind": { "speed": wind }
    })
}

#[tokio::test]
async fn geocode_uses_first_match() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/geo/1.0/direct"))
        .and(query_param("q", "Kyiv"))
        .and(query_param("limit", "1"))
        .and(query_param("appid", "TESTKEY"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            { "name": "Kyiv", "lat": 50.45, "lon": 30.52, "country": "UA" }
        ])))
        .mount(&server)
        .await;

    let coord = client(&server).geocode("Kyiv").await.expect("geocode succeeds");

    assert_eq!(coord.latitude, 50.45);
    assert_eq!(coord.longitude, 30.52);
}

#[tokio::test]
async fn geocode_empty_list_is_city_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/geo/1.0/direct"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&server)
        .await;

    let err = client(&server).geocode("Nowhereville").await.unwrap_err();

    assert!(matches!(err, Error::CityNotFound));
    assert_eq!(err.to_string(), "City not found");
}

#[tokio::test]
async fn geocode_non_success_status_maps_to_upstream_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/geo/1.0/direct"))
        .respond_with(ResponseTemplate::new(401).set_body_string(r#"{"message":"bad key"}"#))
        .mount(&server)
        .await;

    let err = client(&server).geocode("Kyiv").await.unwrap_err();

    match err {
        Error::Upstream { status, body } => {
            assert_eq!(status.as_u16(), 401);
            assert!(body.contains("bad key"));
        }
        other => panic!("expected Upstream, got {other:?}"),
    }
}

#[tokio::test]
async fn observations_map_every_list_entry_in_order() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/forecast"))
        .and(query_param("units", "metric"))
        .and(query_param("appid", "TESTKEY"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "list": [
                forecast_entry("2024-01-01 03:00:00", 20.0, 1010.0, 60.0, 4.0),
                forecast_entry("2024-01-01 00:00:00", 10.0, 1000.0, 50.0, 2.0),
            ]
        })))
        .mount(&server)
        .await;

    let obs = client(&server)
        .observations(Coordinate {
            latitude: 50.45,
            longitude: 30.52,
        })
        .await
        .expect("forecast succeeds");

    // upstream order preserved; sorting is the pipeline's job
    assert_eq!(obs.len(), 2);
    assert_eq!(obs[0].timestamp, "2024-01-01 03:00:00");
    assert_eq!(obs[0].temperature, 20.0);
    assert_eq!(obs[0].pressure, 1010.0);
    assert_eq!(obs[0].humidity, 60.0);
    assert_eq!(obs[0].wind_speed, 4.0);
    assert_eq!(obs[1].timestamp, "2024-01-01 00:00:00");
}

#[tokio::test]
async fn observations_500_maps_to_upstream_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/forecast"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream broke"))
        .mount(&server)
        .await;

    let err = client(&server)
        .observations(Coordinate {
            latitude: 0.0,
            longitude: 0.0,
        })
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Upstream { .. }));
}

#[tokio::test]
async fn observations_malformed_payload_is_a_decode_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"list": "not-a-list"}"#))
        .mount(&server)
        .await;

    let err = client(&server)
        .observations(Coordinate {
            latitude: 0.0,
            longitude: 0.0,
        })
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Decode(_)));
}
