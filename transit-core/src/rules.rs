use serde::Deserialize;

/// Operational tuning values, injected immutably into each engine at
/// construction. Loaded from layered config files/env by the store crate.
#[derive(Debug, Deserialize, Clone)]
pub struct TransitRules {
    /// Geofence radius used for stop/arrival detection, in kilometers.
    #[serde(default = "default_point_cover_radius_km")]
    pub point_cover_radius_km: f64,
    /// Wider radius used for the end-of-trip destination confirmation.
    #[serde(default = "default_destination_radius_km")]
    pub destination_radius_km: f64,
    /// Time window (± minutes from now) for the implicit schedule match.
    #[serde(default = "default_minute_coverage_schedule")]
    pub minute_coverage_schedule: i64,
    /// Ad-hoc fare rate per kilometer.
    #[serde(default)]
    pub per_km_charge: f64,
    /// Prefix prepended to the ticket id to form the PNR.
    #[serde(default = "default_pnr_prefix")]
    pub pnr_prefix: String,
    /// Stop announcement template; `$x`/`$X` is replaced with the place name.
    #[serde(default)]
    pub announcement_template: Option<String>,
}

fn default_point_cover_radius_km() -> f64 {
    0.5
}

fn default_destination_radius_km() -> f64 {
    1.5
}

fn default_minute_coverage_schedule() -> i64 {
    60
}

fn default_pnr_prefix() -> String {
    "EYS".to_string()
}

impl Default for TransitRules {
    fn default() -> Self {
        Self {
            point_cover_radius_km: default_point_cover_radius_km(),
            destination_radius_km: default_destination_radius_km(),
            minute_coverage_schedule: default_minute_coverage_schedule(),
            per_km_charge: 0.0,
            pnr_prefix: default_pnr_prefix(),
            announcement_template: None,
        }
    }
}
