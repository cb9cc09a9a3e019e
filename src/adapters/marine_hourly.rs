//! "Marine hourly array" adapter (spec §4.1): Open-Meteo-marine-style
//! responses with `hourly.time[]`, `hourly.wave_height[]`,
//! `hourly.wave_period[]`. Picks the array entry matching the current
//! UTC hour; falls back to index 0 with a warning if no exact match.

use chrono::{DateTime, Utc};
use tracing::warn;

use super::round2;
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
        warn!("marine hourly array has no entry for the current hour, using index 0");
        0
    });

    let wave_height_m = hourly
        .get("wave_height")
        .and_then(|v| v.as_array())
        .and_then(|a| a.get(index))
        .and_then(|v| v.as_f64())
        .map(round2);

    let wave_period_s = hourly
        .get("wave_period")
        .and_then(|v| v.as_array())
        .and_then(|a| a.get(index))
        .and_then(|v| v.as_f64())
        .map(round2);

    Ok(PartialConditions {
        wave_height_m,
        wave_period_s,
        wind_speed_mps: None,
        wind_direction_deg: None,
    })
}

/// Find the hourly array index whose ISO-8601 timestamp matches the
/// current UTC hour (truncated to the hour, matching Open-Meteo's
/// "YYYY-MM-DDTHH:00" hourly time labels).
fn current_hour_index(times: &[serde_json::Value], now: DateTime<Utc>) -> Option<usize> {
    let target = now.format("%Y-%m-%dT%H:00").to_string();
    times.iter().position(|v| v.as_str() == Some(target.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn picks_matching_hour_index() {
        let now = Utc.with_ymd_and_hms(2026, 7, 28, 14, 0, 0).unwrap();
        let body = serde_json::json!({
            "hourly": {
                "time": ["2026-07-28T13:00", "2026-07-28T14:00", "2026-07-28T15:00"],
                "wave_height": [1.2, 1.5, 1.8],
                "wave_period": [7.5, 8.0, 8.5],
            }
        });
        let partial = parse(&body, now).unwrap();
        assert_eq!(partial.wave_height_m, Some(1.5));
        assert_eq!(partial.wave_period_s, Some(8.0));
    }

    #[test]
    fn falls_back_to_index_zero_when_hour_missing() {
        let now = Utc.with_ymd_and_hms(2026, 7, 28, 23, 0, 0).unwrap();
        let body = serde_json::json!({
            "hourly": {
                "time": ["2026-07-28T00:00"],
                "wave_height": [1.0],
                "wave_period": [6.0],
            }
        });
        let partial = parse(&body, now).unwrap();
        assert_eq!(partial.wave_height_m, Some(1.0));
    }

    #[test]
    fn tolerates_missing_optional_field() {
        let now = Utc.with_ymd_and_hms(2026, 7, 28, 14, 0, 0).unwrap();
        let body = serde_json::json!({
            "hourly": {
                "time": ["2026-07-28T14:00"],
                "wave_height": [1.5],
            }
        });
        let partial = parse(&body, now).unwrap();
        assert_eq!(partial.wave_height_m, Some(1.5));
        assert_eq!(partial.wave_period_s, None);
    }

    #[test]
    fn missing_hourly_object_is_fetch_failed() {
        let body = serde_json::json!({});
        let err = parse(&body, Utc::now()).unwrap_err();
        assert!(matches!(err, AdapterError::FetchFailed { .. }));
    }
}
