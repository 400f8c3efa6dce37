//! Candidate strike enumeration for the daily 0DTE chain.

/// Integer candidate strikes in `[base * (1 + lower), base * (1 + upper)]`,
/// inclusive, with the bounds truncated toward zero.
///
/// `lower` is normally negative and `upper` positive (a percentage band
/// around the day's base price). Returns an empty vector if the band is
/// inverted or the base is non-positive.
pub fn strike_band(base: f64, lower: f64, upper: f64) -> Vec<i64> {
    if base <= 0.0 {
        return Vec::new();
    }
    let lo = (base * (1.0 + lower)).floor() as i64;
    let hi = (base * (1.0 + upper)).floor() as i64;
    if lo > hi {
        return Vec::new();
    }
    (lo..=hi).collect()
}
