//! Core library for the `citycast` forecast chart.
//!
//! This crate defines:
//! - Configuration & credential handling
//! - The OpenWeather geocoding + forecast client behind a provider seam
//! - The forecast-normalization pipeline
//! - View state and fetch orchestration
//!
//! It is used by `citycast-cli`, but can also be reused by other binaries or
//! services.

pub mod app;
pub mod config;
pub mod error;
pub mod model;
pub mod provider;
pub mod series;

pub use app::{FetchRequest, ViewState, fetch_now, run_fetch};
pub use config::Config;
pub use error::{Error, Result};
pub use model::{CitySeries, Coordinate, Granularity, Metric, NormalizedPoint, RawObservation};
pub use provider::{ForecastProvider, OpenWeatherClient};
pub use series::normalize;
