//! Provider Adapters (spec §4.1): one parser per upstream JSON shape,
//! selected by matching the URL's hostname against a compiled table.
//! Each adapter tolerates missing optional fields and never fails the
//! whole record for one absent value — only a genuinely malformed body
//! (wrong shape entirely) becomes an `AdapterError`.

mod isramar;
mod marine_hourly;
mod owm_current;
mod weather_hourly;

use chrono::{DateTime, Utc};
use url::Host;

use crate::error::AdapterError;
use crate::models::PartialConditions;

/// Round a float to two decimals, the rounding rule spec §4.1 requires
/// for wave height/period and wind speed.
pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Fold a direction into [0, 359], rounding to the nearest integer
/// degree; 360 folds to 0 (spec §8 invariant 10).
pub fn fold_direction(deg: f64) -> i32 {
    let rounded = deg.round() as i64;
    (rounded.rem_euclid(360)) as i32
}

/// Parse one upstream JSON body into a partial normalized record, after
/// matching `url`'s host against the compiled adapter table (spec §4.1).
pub fn parse(url: &str, body: &serde_json::Value, now: DateTime<Utc>) -> Result<PartialConditions, AdapterError> {
    let host = extract_host(url).ok_or_else(|| AdapterError::UnknownAdapter(url.to_string()))?;

    if host.ends_with("marine-api.open-meteo.com") {
        marine_hourly::parse(body, now)
    } else if host.ends_with("api.open-meteo.com") {
        weather_hourly::parse(body, now)
    } else if host.ends_with("api.openweathermap.org") {
        owm_current::parse(body)
    } else if host.ends_with("isramar.ocean.org.il") {
        isramar::parse(body)
    } else {
        Err(AdapterError::UnknownAdapter(host))
    }
}

fn extract_host(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    match parsed.host()? {
        Host::Domain(d) => Some(d.to_string()),
        Host::Ipv4(ip) => Some(ip.to_string()),
        Host::Ipv6(ip) => Some(ip.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_host_yields_unknown_adapter() {
        let body = serde_json::json!({});
        let err = parse("https://unknown.example.com/data", &body, Utc::now()).unwrap_err();
        assert!(matches!(err, AdapterError::UnknownAdapter(_)));
    }

    #[test]
    fn fold_direction_wraps_360_to_0() {
        assert_eq!(fold_direction(360.0), 0);
        assert_eq!(fold_direction(359.6), 0);
        assert_eq!(fold_direction(-1.0), 359);
    }

    #[test]
    fn round2_matches_spec_precision() {
        assert!((round2(1.505) - 1.51).abs() < 1e-9);
        assert!((round2(1.0) - 1.0).abs() < 1e-9);
    }
}
