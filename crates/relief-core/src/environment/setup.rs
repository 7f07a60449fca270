//! Default monitored locations.

use relief_events::Location;

/// The five regional stations monitored when no configuration overrides them.
pub fn default_locations() -> Vec<Location> {
    vec![
        Location::new("Accra", 34.0522, -118.2437),
        Location::new("Kumasi", 40.7128, -74.0060),
        Location::new("Ada", 41.8781, -87.6298),
        Location::new("Cape Coast", 29.7604, -95.3698),
        Location::new("Tarkwa", 33.4484, -112.0740),
    ]
}
