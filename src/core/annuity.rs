use super::types::MONTHS_PER_YEAR;

/// Converts an annual nominal percentage into a monthly fraction.
pub fn monthly_rate(annual_rate_pct: f64) -> f64 {
    annual_rate_pct / (f64::from(MONTHS_PER_YEAR) * 100.0)
}

/// Future-value factor of an annuity-due: contributions land at the start of
/// each period, so every payment earns one extra period of growth.
///
/// A zero rate degenerates to plain accumulation, `periods`.
pub fn annuity_due_factor(rate: f64, periods: u32) -> f64 {
    if periods == 0 {
        return 0.0;
    }
    if rate == 0.0 {
        return f64::from(periods);
    }
    let growth = (1.0 + rate).powf(f64::from(periods));
    (growth - 1.0) / rate * (1.0 + rate)
}

/// Compounds `amount` at `rate_pct` percent per year for `years` years.
pub fn inflate(amount: f64, rate_pct: f64, years: i64) -> f64 {
    amount * (1.0 + rate_pct / 100.0).powf(years as f64)
}
