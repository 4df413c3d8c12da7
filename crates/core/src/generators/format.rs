//! Number rendering for question text.
//!
//! Amounts are shown the way a calculator would: a value rounded to two
//! decimals drops trailing zeros (`20`, `7.5`), while distractors that are
//! deliberately shown with a fixed width keep it (`13.80`).

/// Standard overcurrent device ratings (240.6), in amps.
pub const STANDARD_OCPD_SIZES: [u32; 18] = [
    15, 20, 25, 30, 35, 40, 45, 50, 60, 70, 80, 90, 100, 110, 125, 150, 175, 200,
];

/// Smallest standard OCPD rating that is at least `amps`; clamps to 200.
#[must_use]
pub fn next_standard_ocpd(amps: f64) -> u32 {
    STANDARD_OCPD_SIZES
        .into_iter()
        .find(|&size| amps <= f64::from(size))
        .unwrap_or(200)
}

/// Round half up to two decimals.
#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Fixed-width decimal text.
#[must_use]
pub fn fixed(value: f64, digits: usize) -> String {
    format!("{value:.digits$}")
}

/// Shortest decimal text for an already-rounded value (`20`, `7.5`, `72.17`).
#[must_use]
pub fn amount(value: f64) -> String {
    format!("{value}")
}

/// Whole volt-amperes with thousands separators, e.g. `5,625 VA`.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn va(value: f64) -> String {
    format!("{} VA", group_thousands(value.round() as i64))
}

fn group_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ocpd_picks_next_size_and_clamps() {
        assert_eq!(next_standard_ocpd(20.0), 20);
        assert_eq!(next_standard_ocpd(20.01), 25);
        assert_eq!(next_standard_ocpd(10.0), 15);
        assert_eq!(next_standard_ocpd(112.5), 125);
        assert_eq!(next_standard_ocpd(250.0), 200);
    }

    #[test]
    fn amount_drops_trailing_zeros() {
        assert_eq!(amount(round2(16.0 * 1.25)), "20");
        assert_eq!(amount(round2(6.0 * 1.25)), "7.5");
        assert_eq!(amount(round2(30_000.0 / (3_f64.sqrt() * 240.0))), "72.17");
    }

    #[test]
    fn fixed_keeps_width() {
        assert_eq!(fixed(12.0 * 1.15, 2), "13.80");
        assert_eq!(fixed(5.0 * 1.1, 1), "5.5");
    }

    #[test]
    fn va_groups_thousands() {
        assert_eq!(va(5_625.0), "5,625 VA");
        assert_eq!(va(999.4), "999 VA");
        assert_eq!(va(1_234_567.0), "1,234,567 VA");
        assert_eq!(va(3_000.0), "3,000 VA");
    }
}
