//! Location Registry (spec §4.4): a compiled mapping from location name
//! to ordered upstream URL lists. Editable only by code change — there is
//! deliberately no admin endpoint or hot-reload path here, which removes
//! a whole class of consistency bugs the source language's config
//! modules used to be open to (spec §9).

use std::collections::HashMap;

use crate::models::Location;

pub struct Registry {
    locations: HashMap<String, Location>,
}

impl Registry {
    pub fn new(locations: Vec<Location>) -> Self {
        let locations = locations
            .into_iter()
            .map(|loc| (loc.name.clone(), loc))
            .collect();
        Self { locations }
    }

    /// The deploy's compiled-in set of surf spots. Real deployments would
    /// extend this table; adding a location is a code change, not a
    /// runtime operation.
    pub fn default_locations() -> Vec<Location> {
        vec![Location {
            name: "Hadera, Israel".to_string(),
            wave_urls: vec![
                "https://marine-api.open-meteo.com/v1/marine?latitude=32.4365&longitude=34.9196&hourly=wave_height,wave_period,wave_direction".to_string(),
            ],
            wind_urls: vec![
                "https://api.open-meteo.com/v1/forecast?latitude=32.4365&longitude=34.9196&hourly=wind_speed_10m,wind_direction_10m".to_string(),
            ],
            latitude: 32.4365,
            longitude: 34.9196,
            tz: chrono_tz::Asia::Jerusalem,
        }]
    }

    pub fn get(&self, name: &str) -> Option<&Location> {
        self.locations.get(name)
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    /// Locations currently referenced by at least one device, intersected
    /// with the compiled table (spec §4.4 `activeLocations`).
    pub fn active_locations(&self, in_use: &[String]) -> Vec<&Location> {
        in_use
            .iter()
            .filter_map(|name| self.locations.get(name))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn active_locations_intersects_in_use_with_compiled_table() {
        let registry = Registry::new(Registry::default_locations());
        let in_use = vec!["Hadera, Israel".to_string(), "Nowhere".to_string()];
        let active = registry.active_locations(&in_use);
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].name, "Hadera, Israel");
    }

    #[test]
    fn unknown_location_is_not_active() {
        let registry = Registry::new(Registry::default_locations());
        assert!(registry.get("Atlantis").is_none());
    }
}
