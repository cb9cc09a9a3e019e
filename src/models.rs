//! Domain types shared across the ingestion and device-read paths.

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// One surf spot, as carried in the compiled Registry (spec §3, §4.4).
#[derive(Debug, Clone)]
pub struct Location {
    pub name: String,
    pub wave_urls: Vec<String>,
    pub wind_urls: Vec<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub tz: chrono_tz::Tz,
}

impl Location {
    /// Used when a device's assigned location is absent from the
    /// Registry (a config/data inconsistency, not a missing device) so
    /// the Device Read API can still shape a safe-fallback envelope
    /// instead of failing the whole response (spec §7).
    pub fn fallback() -> Self {
        Self {
            name: String::new(),
            wave_urls: Vec::new(),
            wind_urls: Vec::new(),
            latitude: 0.0,
            longitude: 0.0,
            tz: chrono_tz::UTC,
        }
    }
}

/// A single normalized reading for one location (spec §3).
///
/// Invariant: at most one row per location, written only by the
/// Scheduler, and readable by anyone via the Repository.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::FromRow)]
pub struct LocationConditions {
    pub wave_height_m: f64,
    pub wave_period_s: f64,
    pub wind_speed_mps: f64,
    pub wind_direction_deg: i32,
    pub last_updated: DateTime<Utc>,
}

/// Partial record produced by a single Provider Adapter (spec §4.1).
/// `None` means "this source didn't supply the field", not an error.
#[derive(Debug, Clone, Copy, Default)]
pub struct PartialConditions {
    pub wave_height_m: Option<f64>,
    pub wave_period_s: Option<f64>,
    pub wind_speed_mps: Option<f64>,
    pub wind_direction_deg: Option<i32>,
}

impl PartialConditions {
    pub fn is_empty(&self) -> bool {
        self.wave_height_m.is_none()
            && self.wave_period_s.is_none()
            && self.wind_speed_mps.is_none()
            && self.wind_direction_deg.is_none()
    }
}

/// A network-attached client identified by `device_id` (spec §3).
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Device {
    pub device_id: i64,
    pub user_id: i64,
    pub location: String,
    pub last_poll_time: Option<DateTime<Utc>>,
}

/// User preferences the core reads but never writes (spec §3).
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub user_id: i64,
    pub location: String,
    pub wave_threshold_m: f64,
    pub wind_threshold_knots: f64,
    pub wave_threshold_max_m: Option<f64>,
    pub wind_threshold_max_knots: Option<f64>,
    pub brightness_level: f64,
    pub theme: String,
    pub off_hours_enabled: bool,
    pub off_hours_start: NaiveTime,
    pub off_hours_end: NaiveTime,
    pub quiet_hours_enabled: bool,
    pub quiet_hours_start: NaiveTime,
    pub quiet_hours_end: NaiveTime,
}

/// Result of the Repository's single joined query backing a device read
/// (spec §4.5 `readDeviceView`).
#[derive(Debug, Clone)]
pub struct DeviceView {
    pub device: Device,
    pub user: User,
    pub location: Location,
    pub conditions: Option<LocationConditions>,
}
