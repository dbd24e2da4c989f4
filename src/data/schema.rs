//! Column-name constants for the wildfire log.
//! Single source of truth for the loader, the aggregations and the charts.

// ── Source header (as written in the raw log) ───────────────────────────────
pub mod source {
    pub const YEAR: &str = "Année";
    pub const NUMBER: &str = "Numéro";
    pub const TYPE_OF_FIRE: &str = "Type de feu";
    pub const DEPARTMENT: &str = "Département";
    pub const INSEE_CODE: &str = "Code INSEE";
    pub const CITIES: &str = "Commune";
    pub const LOCATION: &str = "Lieu-dit";
    pub const DFCI_CODE: &str = "Code du carreau DFCI";
    pub const ALERT: &str = "Alerte";
    pub const ALERT_ORIGINE: &str = "Origine de l'alerte";
    pub const SURFACE: &str = "Surface parcourue (m2)";
}

// ── Canonical columns ───────────────────────────────────────────────────────
pub mod fire {
    pub const YEAR: &str = "year";
    pub const NUMBER: &str = "number";
    pub const TYPE_OF_FIRE: &str = "type_of_fire";
    pub const DEPARTMENT: &str = "department";
    pub const INSEE_CODE: &str = "INSEE_code";
    pub const CITIES: &str = "cities";
    pub const LOCATION: &str = "location";
    pub const DFCI_CODE: &str = "DFCI_code";
    pub const ALERT: &str = "alert";
    pub const ALERT_ORIGINE: &str = "alert_origine";
    pub const SURFACE: &str = "surface";

    // Derived during normalization
    pub const SURFACE_HA: &str = "surface_ha";
    pub const DATE: &str = "date";
    pub const TIME: &str = "time";

    pub const DERIVED: [&str; 3] = [SURFACE_HA, DATE, TIME];
}

// ── Aggregation output columns ──────────────────────────────────────────────
pub mod aggregate {
    pub const FIRE_COUNT: &str = "FireCount";
    pub const TOTAL_BURNT_AREA: &str = "TotalBurntArea";
    pub const MEAN: &str = "mean";
    pub const MEDIAN: &str = "median";
    pub const Q1: &str = "Q1";
    pub const Q3: &str = "Q3";
}

/// Source header → canonical name, for every column the loader requires.
pub const RENAMES: [(&str, &str); 11] = [
    (source::YEAR, fire::YEAR),
    (source::NUMBER, fire::NUMBER),
    (source::TYPE_OF_FIRE, fire::TYPE_OF_FIRE),
    (source::DEPARTMENT, fire::DEPARTMENT),
    (source::INSEE_CODE, fire::INSEE_CODE),
    (source::CITIES, fire::CITIES),
    (source::LOCATION, fire::LOCATION),
    (source::DFCI_CODE, fire::DFCI_CODE),
    (source::ALERT, fire::ALERT),
    (source::ALERT_ORIGINE, fire::ALERT_ORIGINE),
    (source::SURFACE, fire::SURFACE),
];

/// Square meters per hectare.
pub const M2_PER_HECTARE: f64 = 10_000.0;
