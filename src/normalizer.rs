//! Normalizer (spec §4.3): merges an ordered list of adapter results for
//! one location into a single `LocationConditions`, or reports that the
//! cycle doesn't have enough data to write a row.

use chrono::Utc;

use crate::error::NormalizationError;
use crate::models::{LocationConditions, PartialConditions};

/// Merge prioritized partial records into one `LocationConditions`.
///
/// For each field, the first source (by priority, i.e. list order) that
/// supplies a non-null value wins. `wave_height_m` and `wind_speed_mps`
/// are required; if either is absent from every source, the caller must
/// keep the prior row instead of writing (spec §4.3, §8 invariant 8/9).
pub fn normalize(partials: &[PartialConditions]) -> Result<LocationConditions, NormalizationError> {
    let wave_height_m = first_some(partials, |p| p.wave_height_m);
    let wave_period_s = first_some(partials, |p| p.wave_period_s);
    let wind_speed_mps = first_some(partials, |p| p.wind_speed_mps);
    let wind_direction_deg = first_some(partials, |p| p.wind_direction_deg);

    let wave_height_m = wave_height_m.ok_or_else(|| {
        NormalizationError("no source supplied wave_height_m".to_string())
    })?;
    let wind_speed_mps = wind_speed_mps.ok_or_else(|| {
        NormalizationError("no source supplied wind_speed_mps".to_string())
    })?;

    // wind_direction_deg is only required when wind is actually blowing;
    // a calm reading defaults to 0 rather than failing the cycle.
    let wind_direction_deg = if wind_speed_mps > 0.0 {
        wind_direction_deg.unwrap_or(0)
    } else {
        0
    };

    Ok(LocationConditions {
        wave_height_m,
        wave_period_s: wave_period_s.unwrap_or(0.0),
        wind_speed_mps,
        wind_direction_deg,
        last_updated: Utc::now(),
    })
}

fn first_some<T: Copy>(partials: &[PartialConditions], f: impl Fn(&PartialConditions) -> Option<T>) -> Option<T> {
    partials.iter().find_map(|p| f(p))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn partial(wave_h: Option<f64>, wave_p: Option<f64>, wind_s: Option<f64>, wind_d: Option<i32>) -> PartialConditions {
        PartialConditions {
            wave_height_m: wave_h,
            wave_period_s: wave_p,
            wind_speed_mps: wind_s,
            wind_direction_deg: wind_d,
        }
    }

    #[test]
    fn merges_first_nonnull_per_field_in_priority_order() {
        let partials = vec![
            partial(None, Some(8.0), None, None),
            partial(Some(1.5), None, Some(5.0), Some(180)),
        ];
        let conditions = normalize(&partials).unwrap();
        assert_eq!(conditions.wave_height_m, 1.5);
        assert_eq!(conditions.wave_period_s, 8.0);
        assert_eq!(conditions.wind_speed_mps, 5.0);
        assert_eq!(conditions.wind_direction_deg, 180);
    }

    #[test]
    fn missing_wave_height_from_every_source_is_insufficient() {
        let partials = vec![partial(None, None, Some(5.0), Some(180))];
        assert!(normalize(&partials).is_err());
    }

    #[test]
    fn missing_wind_speed_from_every_source_is_insufficient() {
        let partials = vec![partial(Some(1.0), Some(8.0), None, None)];
        assert!(normalize(&partials).is_err());
    }

    #[test]
    fn calm_wind_defaults_direction_to_zero() {
        let partials = vec![partial(Some(1.0), Some(8.0), Some(0.0), None)];
        let conditions = normalize(&partials).unwrap();
        assert_eq!(conditions.wind_direction_deg, 0);
    }

    #[test]
    fn fallback_source_supplies_missing_field() {
        let partials = vec![
            partial(None, None, None, None),
            partial(Some(2.0), Some(9.0), Some(4.1), Some(90)),
        ];
        let conditions = normalize(&partials).unwrap();
        assert_eq!(conditions.wave_height_m, 2.0);
        assert_eq!(conditions.wind_speed_mps, 4.1);
    }
}
