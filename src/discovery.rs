//! Discovery Document (spec §4.9, §6): a deploy artifact, not a route
//! this service serves. `build` just gives the deploy pipeline a typed
//! way to produce the exact JSON shape devices expect; writing it to the
//! CDN/host that actually serves it over HTTPS is outside this binary.

use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct Endpoints {
    pub arduino_data: String,
    pub status: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Discovery {
    pub api_server: String,
    pub backup_servers: Vec<String>,
    pub version: String,
    pub timestamp: i64,
    pub endpoints: Endpoints,
    pub update_interval_hours: u32,
}

pub fn build(api_server: impl Into<String>, backup_servers: Vec<String>, now_epoch_secs: i64) -> Discovery {
    Discovery {
        api_server: api_server.into(),
        backup_servers,
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: now_epoch_secs,
        endpoints: Endpoints {
            arduino_data: "/api/arduino/{arduino_id}/data".to_string(),
            status: "/api/arduino/status".to_string(),
        },
        update_interval_hours: 24,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_expected_shape() {
        let doc = build("api.example.com", vec!["backup.example.com".to_string()], 1_700_000_000);
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["api_server"], "api.example.com");
        assert_eq!(json["endpoints"]["arduino_data"], "/api/arduino/{arduino_id}/data");
        assert_eq!(json["update_interval_hours"], 24);
    }
}
