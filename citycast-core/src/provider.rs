use async_trait::async_trait;
use std::fmt::Debug;

use crate::{
    error::Result,
    model::{Coordinate, RawObservation},
};

pub mod openweather;

pub use openweather::OpenWeatherClient;

/// The two upstream calls the fetch pipeline makes, behind a seam so the
/// controller can be exercised against a mock server.
#[async_trait]
pub trait ForecastProvider: Send + Sync + Debug {
    /// Resolve a free-text city name to its first matching coordinate pair.
    ///
    /// Fails with [`crate::Error::CityNotFound`] when the lookup returns
    /// zero matches.
    async fn geocode(&self, city: &str) -> Result<Coordinate>;

    /// Fetch the forward forecast window for a coordinate pair, in metric
    /// units. The returned list follows upstream order and is not
    /// guaranteed sorted.
    async fn observations(&self, coordinate: Coordinate) -> Result<Vec<RawObservation>>;
}
