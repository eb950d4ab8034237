//! Monetary amount type
//!
//! All prices travel as integer minor currency units. The store bills
//! in Vietnamese dong, which has no subunit, so an [`Amount`] is a
//! whole number of dong. Fractions only appear transiently inside the
//! pricing math and are rounded away before an `Amount` is produced.

/// Monetary amount in minor currency units (whole dong).
pub type Amount = i64;

/// Format an amount for display, e.g. `1250000` -> `"1.250.000 ₫"`.
///
/// Vietnamese convention groups thousands with dots. Negative amounts
/// keep a leading minus sign; they show up in refund views.
pub fn format_vnd(amount: Amount) -> String {
    let negative = amount < 0;
    let digits = amount.unsigned_abs().to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 4);
    let offset = digits.len() % 3;
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (i + 3 - offset) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    if negative {
        format!("-{grouped} ₫")
    } else {
        format!("{grouped} ₫")
    }
}
