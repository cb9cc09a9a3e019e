//! "Isramar-style" regional feed adapter (spec §4.1): a single JSON
//! object with scalar current-sample fields, as published by Israel's
//! coastal monitoring buoys. Values are already metric; no unit
//! conversion is required.

use crate::error::AdapterError;
use crate::models::PartialConditions;

pub fn parse(body: &serde_json::Value) -> Result<PartialConditions, AdapterError> {
    let wave_height_m = body.get("wave_height_m").and_then(|v| v.as_f64());
    let wave_period_s = body.get("wave_period_sec").and_then(|v| v.as_f64());

    if wave_height_m.is_none() && wave_period_s.is_none() {
        return Err(AdapterError::FetchFailed {
            reason: "no recognized scalar fields in isramar sample".to_string(),
        });
    }

    Ok(PartialConditions {
        wave_height_m,
        wave_period_s,
        wind_speed_mps: None,
        wind_direction_deg: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_scalar_wave_fields() {
        let body = serde_json::json!({ "wave_height_m": 1.3, "wave_period_sec": 7.2 });
        let partial = parse(&body).unwrap();
        assert_eq!(partial.wave_height_m, Some(1.3));
        assert_eq!(partial.wave_period_s, Some(7.2));
    }

    #[test]
    fn empty_sample_is_fetch_failed() {
        let body = serde_json::json!({ "station": "Hadera" });
        assert!(parse(&body).is_err());
    }
}
