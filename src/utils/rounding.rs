//! Fixed-precision rounding shared by the allocators and the revenue records.

/// Decimal places kept for money amounts.
pub const MONEY_PRECISION: i32 = 2;

/// Decimal places kept for passenger counts, which accumulate over many periods.
pub const PAX_PRECISION: i32 = 7;

pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

pub fn round_money(value: f64) -> f64 {
    round_to(value, MONEY_PRECISION)
}

pub fn round_pax(value: f64) -> f64 {
    round_to(value, PAX_PRECISION)
}

/// True while an amount of dollars is still worth allocating.
pub fn has_dollars_left(dollars: f64) -> bool {
    round_money(dollars) > 0.0
}
