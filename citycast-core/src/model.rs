use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Result of a successful geocode. Lives only long enough to issue the
/// forecast request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

/// One forecast sample as delivered by the upstream list, already flattened
/// out of its nested shape. `timestamp` is "YYYY-MM-DD HH:MM:SS" and sorts
/// correctly as a plain string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawObservation {
    pub timestamp: String,
    pub temperature: f64,
    pub pressure: f64,
    pub humidity: f64,
    pub wind_speed: f64,
}

/// A point after normalization. Same shape as [`RawObservation`]; after daily
/// aggregation the timestamp is date-only and the numeric fields are means.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedPoint {
    pub timestamp: String,
    pub temperature: f64,
    pub pressure: f64,
    pub humidity: f64,
    pub wind_speed: f64,
}

impl From<RawObservation> for NormalizedPoint {
    fn from(o: RawObservation) -> Self {
        Self {
            timestamp: o.timestamp,
            temperature: o.temperature,
            pressure: o.pressure,
            humidity: o.humidity,
            wind_speed: o.wind_speed,
        }
    }
}

/// The one in-memory query result. A new fetch always replaces it wholesale;
/// there is no merging and no multi-city overlay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CitySeries {
    pub city_name: String,
    pub points: Vec<NormalizedPoint>,
    pub fetched_at: DateTime<Utc>,
}

/// Which numeric field the chart reads. Switching it is presentation-only
/// and never triggers a fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Metric {
    #[default]
    Temperature,
    Pressure,
    Humidity,
    WindSpeed,
}

impl Metric {
    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Temperature => "temperature",
            Metric::Pressure => "pressure",
            Metric::Humidity => "humidity",
            Metric::WindSpeed => "wind",
        }
    }

    /// Axis label including the metric unit.
    pub fn label(&self) -> &'static str {
        match self {
            Metric::Temperature => "Temperature (°C)",
            Metric::Pressure => "Pressure (hPa)",
            Metric::Humidity => "Humidity (%)",
            Metric::WindSpeed => "Wind speed (m/s)",
        }
    }

    pub fn value_of(&self, point: &NormalizedPoint) -> f64 {
        match self {
            Metric::Temperature => point.temperature,
            Metric::Pressure => point.pressure,
            Metric::Humidity => point.humidity,
            Metric::WindSpeed => point.wind_speed,
        }
    }

    pub const fn all() -> &'static [Metric] {
        &[
            Metric::Temperature,
            Metric::Pressure,
            Metric::Humidity,
            Metric::WindSpeed,
        ]
    }

    /// The option after `self`, wrapping around. Used by the selector.
    pub fn next(self) -> Self {
        let all = Self::all();
        let i = all.iter().position(|m| *m == self).unwrap_or(0);
        all[(i + 1) % all.len()]
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Metric {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "temperature" | "temp" => Ok(Metric::Temperature),
            "pressure" => Ok(Metric::Pressure),
            "humidity" => Ok(Metric::Humidity),
            "wind" | "windspeed" | "wind_speed" => Ok(Metric::WindSpeed),
            _ => Err(Error::UnknownMetric(value.to_string())),
        }
    }
}

/// Sampling granularity of the displayed series. A closed set of exactly two
/// values; there is deliberately no catch-all path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Granularity {
    /// Upstream's native 3-hour slots, passed through unchanged.
    #[default]
    ThreeHourly,
    /// One point per calendar day, fields averaged over the day.
    Daily,
}

impl Granularity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Granularity::ThreeHourly => "3h",
            Granularity::Daily => "day",
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            Granularity::ThreeHourly => Granularity::Daily,
            Granularity::Daily => Granularity::ThreeHourly,
        }
    }
}

impl std::fmt::Display for Granularity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Granularity {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "3h" => Ok(Granularity::ThreeHourly),
            "day" | "daily" => Ok(Granularity::Daily),
            _ => Err(Error::UnknownGranularity(value.to_string())),
        }
    }
}
