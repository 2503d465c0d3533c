//! The normalization pipeline: raw forecast samples in, a uniform
//! chart-ready series out. Pure functions, no I/O.

use crate::model::{Granularity, NormalizedPoint, RawObservation};

/// Transform raw observations into the series the chart plots.
///
/// Observations are sorted ascending by timestamp first (the "YYYY-MM-DD
/// HH:MM:SS" format sorts correctly as a string; the sort is stable, so
/// equal timestamps keep their input order). At [`Granularity::ThreeHourly`]
/// the sorted list is the output. At [`Granularity::Daily`] observations are
/// grouped by calendar day, in the day order the sort produced, and each
/// group collapses to one point carrying the arithmetic mean of every field.
///
/// Days cut short by the forecast window average over whatever samples they
/// have; a one-sample day yields that sample's own values.
pub fn normalize(
    mut observations: Vec<RawObservation>,
    granularity: Granularity,
) -> Vec<NormalizedPoint> {
    observations.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));

    match granularity {
        Granularity::ThreeHourly => observations.into_iter().map(NormalizedPoint::from).collect(),
        Granularity::Daily => aggregate_by_day(&observations),
    }
}

/// Date portion of a "YYYY-MM-DD HH:MM:SS" timestamp. Timestamps without a
/// time component are already date-only and pass through whole.
fn day_of(timestamp: &str) -> &str {
    timestamp.split_whitespace().next().unwrap_or(timestamp)
}

fn aggregate_by_day(sorted: &[RawObservation]) -> Vec<NormalizedPoint> {
    let mut out: Vec<NormalizedPoint> = Vec::new();
    let mut group_sizes: Vec<usize> = Vec::new();

    for obs in sorted {
        let day = day_of(&obs.timestamp);
        match out.last_mut() {
            Some(acc) if acc.timestamp == day => {
                acc.temperature += obs.temperature;
                acc.pressure += obs.pressure;
                acc.humidity += obs.humidity;
                acc.wind_speed += obs.wind_speed;
                // input is sorted, so each day's samples are contiguous
                if let Some(n) = group_sizes.last_mut() {
                    *n += 1;
                }
            }
            _ => {
                out.push(NormalizedPoint {
                    timestamp: day.to_string(),
                    temperature: obs.temperature,
                    pressure: obs.pressure,
                    humidity: obs.humidity,
                    wind_speed: obs.wind_speed,
                });
                group_sizes.push(1);
            }
        }
    }

    for (point, n) in out.iter_mut().zip(group_sizes) {
        let n = n as f64;
        point.temperature /= n;
        point.pressure /= n;
        point.humidity /= n;
        point.wind_speed /= n;
    }

    out
}
