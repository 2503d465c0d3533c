use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::{
    error::{Error, Result},
    model::{Coordinate, RawObservation},
};

use super::ForecastProvider;

const GEO_BASE: &str = "https://api.openweathermap.org";
const FORECAST_BASE: &str = "https://api.openweathermap.org";
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Client for OpenWeather's direct-geocoding and 5-day/3-hour forecast
/// endpoints. Cheap to clone; the inner reqwest client is shared.
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    api_key: String,
    http: Client,
    geo_base: String,
    forecast_base: String,
}

impl OpenWeatherClient {
    pub fn new(api_key: String) -> Result<Self> {
        Self::with_base_urls(api_key, GEO_BASE, FORECAST_BASE)
    }

    /// Point both endpoints somewhere else. Used by tests against a mock
    /// server.
    pub fn with_base_urls(
        api_key: String,
        geo_base: impl Into<String>,
        forecast_base: impl Into<String>,
    ) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            api_key,
            http,
            geo_base: geo_base.into(),
            forecast_base: forecast_base.into(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct OwGeoMatch {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    pressure: f64,
    humidity: f64,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt_txt: String,
    main: OwMain,
    wind: OwWind,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    list: Vec<OwForecastEntry>,
}

#[async_trait]
impl ForecastProvider for OpenWeatherClient {
    async fn geocode(&self, city: &str) -> Result<Coordinate> {
        let url = format!("{}/geo/1.0/direct", self.geo_base);

        let res = self
            .http
            .get(&url)
            .query(&[("q", city), ("limit", "1"), ("appid", self.api_key.as_str())])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(Error::Upstream {
                status,
                body: truncate_body(&body),
            });
        }

        let matches: Vec<OwGeoMatch> = serde_json::from_str(&body)?;

        let first = matches.first().ok_or(Error::CityNotFound)?;
        tracing::debug!(city, lat = first.lat, lon = first.lon, "geocoded");

        Ok(Coordinate {
            latitude: first.lat,
            longitude: first.lon,
        })
    }

    async fn observations(&self, coordinate: Coordinate) -> Result<Vec<RawObservation>> {
        let url = format!("{}/data/2.5/forecast", self.forecast_base);

        let res = self
            .http
            .get(&url)
            .query(&[
                ("lat", coordinate.latitude.to_string()),
                ("lon", coordinate.longitude.to_string()),
                ("appid", self.api_key.clone()),
                ("units", "metric".to_string()),
            ])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(Error::Upstream {
                status,
                body: truncate_body(&body),
            });
        }

        let parsed: OwForecastResponse = serde_json::from_str(&body)?;
        tracing::debug!(samples = parsed.list.len(), "forecast fetched");

        Ok(parsed
            .list
            .into_iter()
            .map(|entry| RawObservation {
                timestamp: entry.dt_txt,
                temperature: entry.main.temp,
                pressure: entry.main.pressure,
                humidity: entry.main.humidity,
                wind_speed: entry.wind.speed,
            })
            .collect())
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        format!("{}...", &body[..MAX])
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_body_leaves_short_bodies_alone() {
        assert_eq!(truncate_body("{}"), "{}");
    }

    #[test]
    fn truncate_body_cuts_long_bodies() {
        let long = "x".repeat(500);
        let cut = truncate_body(&long);
        assert_eq!(cut.len(), 203);
        assert!(cut.ends_with("..."));
    }

    #[test]
    fn forecast_entry_deserializes_from_upstream_shape() {
        let json = r#"{
            "list": [
                {
                    "dt_txt": "2024-01-01 00:00:00",
                    "main": { "temp": 10.0, "pressure": 1000, "humidity": 50 },
                    "wind": { "speed": 2.0 }
                }
            ]
        }"#;

        let parsed: OwForecastResponse = serde_json::from_str(json).expect("shape matches");
        assert_eq!(parsed.list.len(), 1);
        assert_eq!(parsed.list[0].dt_txt, "2024-01-01 00:00:00");
        assert_eq!(parsed.list[0].main.pressure, 1000.0);
        assert_eq!(parsed.list[0].wind.speed, 2.0);
    }
}
