//! Display helpers for amounts and months.

use rust_decimal::{Decimal, RoundingStrategy};

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Formats `amount` as `<symbol> 1,234.56`. Negative values keep the sign
/// after the symbol (`R$ -10.00`).
pub fn format_amount(amount: Decimal, symbol: &str) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let text = format!("{:.2}", rounded.abs());
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), "00"));
    let grouped = group_thousands(int_part);
    let sign = if negative { "-" } else { "" };
    if symbol.is_empty() {
        format!("{sign}{grouped}.{frac_part}")
    } else {
        format!("{symbol} {sign}{grouped}.{frac_part}")
    }
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// English month name for `month` (1-12).
pub fn month_name(month: u32) -> &'static str {
    month
        .checked_sub(1)
        .and_then(|idx| MONTH_NAMES.get(idx as usize))
        .copied()
        .unwrap_or("Unknown")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn groups_thousands_and_pads_cents() {
        assert_eq!(format_amount(dec!(1234567.5), "R$"), "R$ 1,234,567.50");
        assert_eq!(format_amount(dec!(0), "R$"), "R$ 0.00");
        assert_eq!(format_amount(dec!(999.999), "R$"), "R$ 1,000.00");
        assert_eq!(format_amount(dec!(100), ""), "100.00");
    }

    #[test]
    fn negative_sign_follows_symbol() {
        assert_eq!(format_amount(dec!(-10), "R$"), "R$ -10.00");
        assert_eq!(format_amount(dec!(-0.001), "R$"), "R$ 0.00");
    }

    #[test]
    fn month_names() {
        assert_eq!(month_name(1), "January");
        assert_eq!(month_name(12), "December");
        assert_eq!(month_name(0), "Unknown");
        assert_eq!(month_name(13), "Unknown");
    }
}
