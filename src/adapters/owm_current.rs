//! "OpenWeatherMap current" adapter (spec §4.1): flat-field extraction
//! from the `/data/2.5/weather` shape. Wind speed is already m/s in this
//! API's default units, so no conversion is needed; direction comes
//! straight through as whole degrees.

use super::fold_direction;
use crate::error::AdapterError;
use crate::models::PartialConditions;

pub fn parse(body: &serde_json::Value) -> Result<PartialConditions, AdapterError> {
    let wind = body.get("wind");

    let wind_speed_mps = wind.and_then(|w| w.get("speed")).and_then(|v| v.as_f64());
    let wind_direction_deg = wind
        .and_then(|w| w.get("deg"))
        .and_then(|v| v.as_f64())
        .map(fold_direction);

    if wind.is_none() {
        return Err(AdapterError::FetchFailed {
            reason: "missing `wind` object".to_string(),
        });
    }

    Ok(PartialConditions {
        wave_height_m: None,
        wave_period_s: None,
        wind_speed_mps,
        wind_direction_deg,
    })
}
