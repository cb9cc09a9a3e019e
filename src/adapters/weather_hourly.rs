//! "Weather hourly array" adapter (spec §4.1): Open-Meteo-style wind
//! source with `hourly.time[]`, `hourly.wind_speed_10m[]`,
//! `hourly.wind_direction_10m[]`. Same current-hour slicing rule as the
//! marine adapter.

use chrono::{DateTime, Utc};
use tracing::warn;

use super::{fold_direction, round2};
use crate::error::AdapterError;
use crate::models::PartialConditions;

pub fn parse(body: &serde_json::Value, now: DateTime<Utc>) -> Result<PartialConditions, AdapterError> {
    let hourly = body.get("hourly").ok_or_else(|| AdapterError::FetchFailed {
        reason: "missing `hourly` object".to_string(),
    })?;

    let times = hourly
        .get("time")
        .and_then(|v| v.as_array())
        .ok_or_else(|| AdapterError::FetchFailed {
            reason: "missing `hourly.time` array".to_string(),
        })?;

    let index = current_hour_index(times, now).unwrap_or_else(|| {
        warn!("weather hourly array has no entry for the current hour, using index 0");
        0
    });

    let wind_speed_mps = hourly
        .get("wind_speed_10m")
        .and_then(|v| v.as_array())
        .and_then(|a| a.get(index))
        .and_then(|v| v.as_f64())
        .map(round2);

    let wind_direction_deg = hourly
        .get("wind_direction_10m")
        .and_then(|v| v.as_array())
        .and_then(|a| a.get(index))
        .and_then(|v| v.as_f64())
        .map(fold_direction);

    Ok(PartialConditions {
        wave_height_m: None,
        wave_period_s: None,
        wind_speed_mps,
        wind_direction_deg,
    })
}

fn current_hour_index(times: &[serde_json::Value], now: DateTime<Utc>) -> Option<usize> {
    let target = now.format("%Y-%m-%dT%H:00").to_string();
    times.iter().position(|v| v.as_str() == Some(target.as_str()))
}
