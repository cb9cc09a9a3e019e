//! Policy Engine (spec §4.8): pure functions, no I/O. These implement the
//! "range alert shim" and the off-hours/quiet-hours time-of-day windows
//! that change device behavior without changing device firmware.

use chrono::NaiveTime;

use crate::models::User;

/// Sentinel the firmware reads as "never alert", because its comparison
/// is a fixed `current >= threshold` (spec §4.8, §9 "Rate-limit
/// shimming via 9999 sentinel").
pub const NEVER_ALERT_CM: i32 = 9999;
const MPS_TO_KNOTS: f64 = 1.94384;

/// The effective wave-height threshold sent to the device, in cm.
///
/// - only `min_m` set: alert threshold is just `min_m`.
/// - both set, `current` inside `[min, max]`: alert should fire, so the
///   effective threshold is still `min_m` (i.e. "on").
/// - both set, `current < min_m`: not yet in range, threshold is `min_m`.
/// - both set, `current > max_m`: out of range on the high side, return
///   the sentinel to suppress the blink.
/// - neither set: sentinel (never alert).
pub fn effective_wave_threshold_cm(current_m: f64, min_m: Option<f64>, max_m: Option<f64>) -> i32 {
    match (min_m, max_m) {
        (Some(min_m), None) => (min_m * 100.0).round() as i32,
        (Some(min_m), Some(max_m)) => {
            if current_m > max_m {
                NEVER_ALERT_CM
            } else {
                (min_m * 100.0).round() as i32
            }
        }
        (None, _) => NEVER_ALERT_CM,
    }
}

/// The effective wind-speed threshold sent to the device, in knots.
/// Same range-alert shape as the wave threshold; inputs given in m/s are
/// converted to knots where needed.
pub fn effective_wind_threshold_knots(current_mps: f64, min_knots: Option<f64>, max_knots: Option<f64>) -> i32 {
    let current_knots = current_mps * MPS_TO_KNOTS;
    match (min_knots, max_knots) {
        (Some(min_knots), None) => min_knots.round() as i32,
        (Some(min_knots), Some(max_knots)) => {
            if current_knots > max_knots {
                NEVER_ALERT_CM
            } else {
                min_knots.round() as i32
            }
        }
        (None, _) => NEVER_ALERT_CM,
    }
}

/// True iff `now_local` falls inside `[start, end)`, supporting windows
/// that wrap across midnight (e.g. 22:00–06:00).
fn in_window(now_local: NaiveTime, start: NaiveTime, end: NaiveTime) -> bool {
    if start <= end {
        now_local >= start && now_local < end
    } else {
        now_local >= start || now_local < end
    }
}

pub fn off_hours_active(now_local: NaiveTime, user: &User) -> bool {
    user.off_hours_enabled && in_window(now_local, user.off_hours_start, user.off_hours_end)
}

/// Independent of off-hours; both booleans are reported separately even
/// when both are true, and the device itself decides that off-hours wins
/// (spec §4.8, §8 invariant 5).
pub fn quiet_hours_active(now_local: NaiveTime, user: &User) -> bool {
    user.quiet_hours_enabled && in_window(now_local, user.quiet_hours_start, user.quiet_hours_end)
}

pub fn brightness_multiplier(user: &User) -> f64 {
    if !(0.0..=1.0).contains(&user.brightness_level) {
        return 0.6;
    }
    user.brightness_level
}
