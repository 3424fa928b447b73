//! Point tables for the additive risk rubric.
//!
//! Lookups are case-insensitive on trimmed values. Unrecognised data types and
//! vendor tiers fall back to a middle-of-the-road weight rather than zero, so an
//! unfamiliar label never makes a tool look safer than a known one.

pub const DATA_TYPE_FALLBACK: f64 = 20.0;
pub const VENDOR_TIER_FALLBACK: f64 = 15.0;

/// Upper bound on the usage contribution.
pub const USAGE_CEILING: f64 = 20.0;
/// Usage count at which the usage contribution saturates.
pub const USAGE_SATURATION: u64 = 10_000;

/// Points added when no governance controls are inferred, subtracted when they are.
pub const CONTROLS_ADJUSTMENT: f64 = 10.0;

pub fn data_type_points(data_type: &str) -> f64 {
    match normalise(data_type).as_str() {
        "public" => 5.0,
        "metadata" => 10.0,
        "internal" | "other" => 20.0,
        "personal" => 30.0,
        "confidential" => 40.0,
        "sensitive" => 45.0,
        "regulated" => 60.0,
        _ => DATA_TYPE_FALLBACK,
    }
}

pub fn vendor_tier_points(vendor_tier: &str) -> f64 {
    match normalise(vendor_tier).as_str() {
        "enterprise" | "tier 1" => 0.0,
        "tier 2" => 10.0,
        "unknown" => 15.0,
        "tier 3" => 20.0,
        "unverified" => 25.0,
        _ => VENDOR_TIER_FALLBACK,
    }
}

/// Log-scaled usage contribution in `[0, USAGE_CEILING]`.
pub fn usage_points(usage_count: u64) -> f64 {
    let capped = usage_count.min(USAGE_SATURATION) as f64;
    USAGE_CEILING * (1.0 + capped).ln() / (1.0 + USAGE_SATURATION as f64).ln()
}

pub fn is_enterprise_vendor(vendor_tier: &str) -> bool {
    matches!(normalise(vendor_tier).as_str(), "enterprise" | "tier 1")
}

pub fn is_regulated(data_type: &str) -> bool {
    normalise(data_type) == "regulated"
}

fn normalise(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}
