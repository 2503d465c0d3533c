//! View state and fetch orchestration.
//!
//! All upstream errors die here: the controller converts them to display
//! strings, so the presentation layer only ever sees `error: Option<String>`.
//! Fetches carry a monotonic sequence token; only the outcome of the most
//! recently issued request is applied, so a granularity change racing an
//! earlier submit cannot clobber fresher data.

use chrono::Utc;

use crate::{
    error::{Error, Result},
    model::{CitySeries, Granularity, Metric},
    provider::ForecastProvider,
    series::normalize,
};

/// A fetch the controller has issued but not yet resolved. Hand it to
/// [`run_fetch`] (inline or on a spawned task) and feed the outcome back
/// through [`ViewState::apply_outcome`] with the same token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub seq: u64,
    pub city: String,
    pub granularity: Granularity,
}

/// Everything the presentation layer renders from.
#[derive(Debug, Default)]
pub struct ViewState {
    /// Draft city name bound to the text input.
    pub city_input: String,
    /// The held query result. Replaced wholesale on success, kept as-is on
    /// failure so the last good chart stays visible under the error banner.
    pub series: Option<CitySeries>,
    pub metric: Metric,
    pub granularity: Granularity,
    pub loading: bool,
    pub error: Option<String>,

    next_seq: u64,
    inflight: Option<u64>,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Submit the current city input. A name that trims to empty is a
    /// no-op: no fetch, no flag changes.
    pub fn submit_city(&mut self) -> Option<FetchRequest> {
        let city = self.city_input.trim();
        if city.is_empty() {
            return None;
        }
        let city = city.to_string();
        Some(self.begin_fetch(city))
    }

    /// Select a new granularity. If a city name is entered this immediately
    /// re-triggers the full fetch+normalize cycle for it.
    pub fn change_granularity(&mut self, granularity: Granularity) -> Option<FetchRequest> {
        self.granularity = granularity;
        let city = self.city_input.trim();
        if city.is_empty() {
            return None;
        }
        let city = city.to_string();
        Some(self.begin_fetch(city))
    }

    /// Select which field the chart reads. Presentation-only: the held
    /// series is untouched and nothing is fetched.
    pub fn change_metric(&mut self, metric: Metric) {
        self.metric = metric;
    }

    fn begin_fetch(&mut self, city: String) -> FetchRequest {
        self.next_seq += 1;
        let seq = self.next_seq;
        self.inflight = Some(seq);
        self.loading = true;
        self.error = None;

        tracing::debug!(seq, city = %city, granularity = %self.granularity, "fetch issued");

        FetchRequest {
            seq,
            city,
            granularity: self.granularity,
        }
    }

    /// Apply a finished fetch. Outcomes whose token no longer matches the
    /// latest issued request are stale and dropped without touching state.
    pub fn apply_outcome(&mut self, seq: u64, outcome: Result<CitySeries>) {
        if self.inflight != Some(seq) {
            tracing::debug!(seq, "stale fetch outcome discarded");
            return;
        }
        self.inflight = None;
        self.loading = false;

        match outcome {
            Ok(series) => {
                self.series = Some(series);
                self.error = None;
            }
            Err(err) => {
                // stale series stays visible under the banner
                self.error = Some(err.to_string());
            }
        }
    }
}

/// The suspension chain for one request: geocode, fetch, normalize. Pure
/// orchestration over the provider seam; the caller applies the outcome.
pub async fn run_fetch<P: ForecastProvider + ?Sized>(
    provider: &P,
    request: &FetchRequest,
) -> Result<CitySeries> {
    let coordinate = provider.geocode(&request.city).await?;
    let raw = provider.observations(coordinate).await?;
    let points = normalize(raw, request.granularity);

    Ok(CitySeries {
        city_name: request.city.clone(),
        points,
        fetched_at: Utc::now(),
    })
}

/// One-shot convenience for callers without their own event loop: issue,
/// run and apply in a single await. The credential check happens before any
/// network call.
pub async fn fetch_now<P: ForecastProvider + ?Sized>(
    state: &mut ViewState,
    provider: Option<&P>,
) -> bool {
    let Some(request) = state.submit_city() else {
        return false;
    };
    let outcome = match provider {
        Some(provider) => run_fetch(provider, &request).await,
        None => Err(Error::MissingApiKey),
    };
    let ok = outcome.is_ok();
    state.apply_outcome(request.seq, outcome);
    ok
}
