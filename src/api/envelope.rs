//! The exact JSON envelope the Device Read API returns (spec §4.7).
//! Field names and presence here are bit-for-bit firmware contract: the
//! legacy and v2 routes share every field except the four called out in
//! spec §4.7 (legacy keeps `sunset_animation`/`day_of_year`; v2 replaces
//! them with `latitude`/`longitude`/`tz_offset`).

use chrono::{DateTime, Datelike, Offset, Timelike, Utc};
use serde::Serialize;

use crate::models::{DeviceView, LocationConditions};
use crate::policy;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeVersion {
    Legacy,
    V2,
}

#[derive(Debug, Serialize)]
pub struct DeviceEnvelope {
    pub wave_height_cm: i64,
    pub wave_period_s: f64,
    pub wind_speed_mps: i64,
    pub wind_direction_deg: i32,
    pub wave_threshold_cm: i32,
    pub wind_speed_threshold_knots: i32,
    pub quiet_hours_active: bool,
    pub off_hours_active: bool,
    pub brightness_multiplier: f64,
    pub led_theme: String,
    pub last_updated: String,
    pub data_available: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sunset_animation: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day_of_year: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tz_offset: Option<i32>,
}

/// Build the envelope for one device read. `now_utc` is threaded in
/// (rather than read internally) so the same instant drives both the
/// `Date` response header and the envelope's policy computations.
pub fn build(view: &DeviceView, now_utc: DateTime<Utc>, version: EnvelopeVersion) -> DeviceEnvelope {
    let now_local = now_utc.with_timezone(&view.location.tz);
    let now_local_time = now_local.time();

    let data_available = view.conditions.is_some();
    let conditions = view.conditions.unwrap_or(LocationConditions {
        wave_height_m: 0.0,
        wave_period_s: 0.0,
        wind_speed_mps: 0.0,
        wind_direction_deg: 0,
        last_updated: DateTime::<Utc>::UNIX_EPOCH,
    });

    let wave_threshold_cm = policy::effective_wave_threshold_cm(
        conditions.wave_height_m,
        Some(view.user.wave_threshold_m),
        view.user.wave_threshold_max_m,
    );
    let wind_speed_threshold_knots = policy::effective_wind_threshold_knots(
        conditions.wind_speed_mps,
        Some(view.user.wind_threshold_knots),
        view.user.wind_threshold_max_knots,
    );

    let off_hours = policy::off_hours_active(now_local_time, &view.user);
    let quiet_hours = policy::quiet_hours_active(now_local_time, &view.user);
    let brightness = policy::brightness_multiplier(&view.user);

    let tz_offset_hours = now_local.offset().fix().local_minus_utc() / 3600;

    let (sunset_animation, day_of_year, latitude, longitude, tz_offset) = match version {
        EnvelopeVersion::Legacy => {
            let hour = now_local_time.hour();
            let sunset_window = (18..20).contains(&hour);
            (Some(sunset_window && !off_hours), Some(now_local.ordinal()), None, None, None)
        }
        EnvelopeVersion::V2 => (
            None,
            None,
            Some(view.location.latitude),
            Some(view.location.longitude),
            Some(tz_offset_hours),
        ),
    };

    DeviceEnvelope {
        wave_height_cm: (conditions.wave_height_m * 100.0).round() as i64,
        wave_period_s: conditions.wave_period_s,
        wind_speed_mps: conditions.wind_speed_mps.round() as i64,
        wind_direction_deg: conditions.wind_direction_deg,
        wave_threshold_cm,
        wind_speed_threshold_knots,
        quiet_hours_active: quiet_hours,
        off_hours_active: off_hours,
        brightness_multiplier: brightness,
        led_theme: view.user.theme.clone(),
        last_updated: conditions.last_updated.to_rfc3339(),
        data_available,
        sunset_animation,
        day_of_year,
        latitude,
        longitude,
        tz_offset,
    }
}

/// Safe-fallback envelope for when an internal error (a database hiccup,
/// say) strikes before a `DeviceView` can even be assembled — still a
/// valid, fully-typed body with every numeric field zeroed, per spec §7:
/// "converts all internal errors into a valid envelope with
/// data_available=false... unless the device itself is unknown (404)."
pub fn build_unavailable(version: EnvelopeVersion) -> DeviceEnvelope {
    let (sunset_animation, day_of_year, latitude, longitude, tz_offset) = match version {
        EnvelopeVersion::Legacy => (Some(false), Some(0), None, None, None),
        EnvelopeVersion::V2 => (None, None, Some(0.0), Some(0.0), Some(0)),
    };

    DeviceEnvelope {
        wave_height_cm: 0,
        wave_period_s: 0.0,
        wind_speed_mps: 0,
        wind_direction_deg: 0,
        wave_threshold_cm: policy::NEVER_ALERT_CM,
        wind_speed_threshold_knots: policy::NEVER_ALERT_CM,
        quiet_hours_active: false,
        off_hours_active: false,
        brightness_multiplier: 0.6,
        led_theme: "default".to_string(),
        last_updated: DateTime::<Utc>::UNIX_EPOCH.to_rfc3339(),
        data_available: false,
        sunset_animation,
        day_of_year,
        latitude,
        longitude,
        tz_offset,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Device, Location, User};
    use chrono::{NaiveTime, TimeZone};

    fn sample_view(conditions: Option<LocationConditions>) -> DeviceView {
        DeviceView {
            device: Device {
                device_id: 4433,
                user_id: 6,
                location: "Hadera, Israel".to_string(),
                last_poll_time: None,
            },
            user: User {
                user_id: 6,
                location: "Hadera, Israel".to_string(),
                wave_threshold_m: 1.0,
                wind_threshold_knots: 10.0,
                wave_threshold_max_m: Some(2.0),
                wind_threshold_max_knots: None,
                brightness_level: 0.6,
                theme: "ocean".to_string(),
                off_hours_enabled: false,
                off_hours_start: NaiveTime::from_hms_opt(22, 0, 0).unwrap(),
                off_hours_end: NaiveTime::from_hms_opt(6, 0, 0).unwrap(),
                quiet_hours_enabled: false,
                quiet_hours_start: NaiveTime::from_hms_opt(21, 0, 0).unwrap(),
                quiet_hours_end: NaiveTime::from_hms_opt(7, 0, 0).unwrap(),
            },
            location: Location {
                name: "Hadera, Israel".to_string(),
                wave_urls: vec![],
                wind_urls: vec![],
                latitude: 32.4365,
                longitude: 34.9196,
                tz: chrono_tz::Asia::Jerusalem,
            },
            conditions,
        }
    }

    #[test]
    fn s1_one_location_two_devices_primary_fetch_succeeds() {
        let conditions = LocationConditions {
            wave_height_m: 1.50,
            wave_period_s: 8.0,
            wind_speed_mps: 5.0,
            wind_direction_deg: 180,
            last_updated: Utc::now(),
        };
        let view = sample_view(Some(conditions));
        let envelope = build(&view, Utc::now(), EnvelopeVersion::Legacy);
        assert_eq!(envelope.wave_height_cm, 150);
        assert_eq!(envelope.wave_period_s, 8.0);
        assert_eq!(envelope.wind_speed_mps, 5);
        assert_eq!(envelope.wind_direction_deg, 180);
        assert!(envelope.data_available);
    }

    #[test]
    fn s2_range_alert_shim_waves_exceed_max() {
        let conditions = LocationConditions {
            wave_height_m: 2.5,
            wave_period_s: 9.0,
            wind_speed_mps: 3.0,
            wind_direction_deg: 90,
            last_updated: Utc::now(),
        };
        let view = sample_view(Some(conditions));
        let envelope = build(&view, Utc::now(), EnvelopeVersion::Legacy);
        assert_eq!(envelope.wave_threshold_cm, 9999);
    }

    #[test]
    fn s4_total_failure_no_prior_row_yields_unavailable_zeroed() {
        let view = sample_view(None);
        let envelope = build(&view, Utc::now(), EnvelopeVersion::Legacy);
        assert!(!envelope.data_available);
        assert_eq!(envelope.wave_height_cm, 0);
    }

    #[test]
    fn s6_v2_includes_location_metadata_and_tz_offset() {
        let conditions = LocationConditions {
            wave_height_m: 1.5,
            wave_period_s: 8.0,
            wind_speed_mps: 5.0,
            wind_direction_deg: 180,
            last_updated: Utc::now(),
        };
        let view = sample_view(Some(conditions));
        // Israel Standard Time is UTC+2; DST (IDT, UTC+3) runs roughly
        // late March to late October, so a July instant is +3.
        let july_instant = Utc.with_ymd_and_hms(2026, 7, 28, 12, 0, 0).unwrap();
        let envelope = build(&view, july_instant, EnvelopeVersion::V2);
        assert_eq!(envelope.latitude, Some(32.4365));
        assert_eq!(envelope.longitude, Some(34.9196));
        assert_eq!(envelope.tz_offset, Some(3));
        assert!(envelope.sunset_animation.is_none());
        assert!(envelope.day_of_year.is_none());
    }

    #[test]
    fn legacy_omits_v2_fields_and_includes_legacy_fields() {
        let view = sample_view(None);
        let envelope = build(&view, Utc::now(), EnvelopeVersion::Legacy);
        assert!(envelope.latitude.is_none());
        assert!(envelope.sunset_animation.is_some());
        assert!(envelope.day_of_year.is_some());
    }

    #[test]
    fn build_unavailable_is_always_zeroed_and_unavailable() {
        let envelope = build_unavailable(EnvelopeVersion::Legacy);
        assert!(!envelope.data_available);
        assert_eq!(envelope.wave_height_cm, 0);
        assert_eq!(envelope.wave_threshold_cm, policy::NEVER_ALERT_CM);

        let v2 = build_unavailable(EnvelopeVersion::V2);
        assert_eq!(v2.latitude, Some(0.0));
        assert_eq!(v2.tz_offset, Some(0));
    }
}
