//! Tiers Data

/// New or updated per-venue tier configuration.
#[derive(Debug, Clone)]
pub struct NewVenueTierConfig {
    /// Slug of the global tier being configured (e.g. "loyalty").
    pub tier_slug: String,
    pub visits_required: i64,
    pub window_days: i32,
    pub wet_discount: f64,
    pub dry_discount: f64,
}
