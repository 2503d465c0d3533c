use thiserror::Error;

/// Everything that can go wrong between "user submitted a city" and
/// "a series is on screen". The controller converts these to display
/// strings at the fetch boundary; nothing past it sees the variants.
#[derive(Debug, Error)]
pub enum Error {
    /// No credential resolved at startup. Checked before any network call.
    #[error("API key is not configured")]
    MissingApiKey,

    /// Geocoding returned zero matches for the entered name.
    #[error("City not found")]
    CityNotFound,

    /// Transport-level failure from either endpoint.
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx from either endpoint. 4xx and 5xx are not distinguished.
    #[error("Upstream request failed with status {status}: {body}")]
    Upstream {
        status: reqwest::StatusCode,
        body: String,
    },

    /// Upstream answered 2xx but the payload did not match the schema.
    #[error("Failed to decode upstream response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Config file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    ConfigEncode(#[from] toml::ser::Error),

    #[error("Could not determine platform config directory")]
    NoConfigDir,

    #[error("Unknown metric '{0}'. Supported metrics: temperature, pressure, humidity, wind.")]
    UnknownMetric(String),

    #[error("Unknown granularity '{0}'. Supported granularities: 3h, day.")]
    UnknownGranularity(String),
}

pub type Result<T> = std::result::Result<T, Error>;
