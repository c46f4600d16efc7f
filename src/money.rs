//! Price parsing and totals.
//!
//! Prices arrive as free text from form fields ("$10.00", "9.99", or junk).
//! The policy for financial display fields is to degrade gracefully: a
//! malformed string contributes zero to a total instead of failing the whole
//! aggregation. All arithmetic is done on [`Decimal`] so values like 9.99
//! and 15.50 are represented exactly.

use rust_decimal::Decimal;

use crate::models::TaskItem;

/// Parses a price or quantity string into an exact decimal amount.
///
/// A single leading "$" is stripped if present. Anything that does not then
/// parse as a base-10 decimal (empty string, stray letters, two decimal
/// points) yields [`Decimal::ZERO`]. This function never fails.
///
/// No grouping separators or locale handling: "1,000" is malformed and
/// parses to zero.
pub fn parse_amount(text: &str) -> Decimal {
    let digits = text.strip_prefix('$').unwrap_or(text);
    digits.parse::<Decimal>().unwrap_or(Decimal::ZERO)
}

/// Quantity × unit price for one line.
///
/// Either operand failing to parse zeroes the product; a malformed quantity
/// silently removes that item's contribution rather than aborting the sum.
pub fn line_total(quantity: &str, unit_price: &str) -> Decimal {
    parse_amount(quantity) * parse_amount(unit_price)
}

/// Sums line totals over whatever items the caller passes in.
///
/// Scope (all items vs one task's items) is entirely the caller's choice,
/// and `was_purchased` is deliberately not consulted. Empty input sums to
/// zero.
pub fn grand_total<'a, I>(items: I) -> Decimal
where
    I: IntoIterator<Item = &'a TaskItem>,
{
    items
        .into_iter()
        .map(|item| line_total(&item.quantity, &item.unit_price))
        .sum()
}

/// Renders an amount for display: "$" prefix, fixed two decimal places.
///
/// Display-only; keep summing the `Decimal`, not the string.
pub fn format_currency(amount: Decimal) -> String {
    format!("${:.2}", amount.round_dp(2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn parse_amount_strips_currency_symbol() {
        assert_eq!(parse_amount("$10.00"), dec("10.00"));
        assert_eq!(parse_amount("10.00"), dec("10.00"));
    }

    #[test]
    fn parse_amount_malformed_yields_zero() {
        assert_eq!(parse_amount("Invalid"), Decimal::ZERO);
        assert_eq!(parse_amount(""), Decimal::ZERO);
        assert_eq!(parse_amount("$"), Decimal::ZERO);
        assert_eq!(parse_amount("1.2.3"), Decimal::ZERO);
    }

    #[test]
    fn parse_amount_no_grouping_separators() {
        assert_eq!(parse_amount("1,000"), Decimal::ZERO);
    }

    #[test]
    fn line_total_multiplies_quantity_and_price() {
        assert_eq!(line_total("2", "$10.00"), dec("20.00"));
        assert_eq!(line_total("3", "$5.00"), dec("15.00"));
    }

    #[test]
    fn line_total_malformed_operand_yields_zero() {
        assert_eq!(line_total("abc", "$5.00"), Decimal::ZERO);
        assert_eq!(line_total("2", "five dollars"), Decimal::ZERO);
    }

    #[test]
    fn grand_total_empty_is_zero() {
        let none: Vec<TaskItem> = Vec::new();
        assert_eq!(grand_total(&none), Decimal::ZERO);
    }

    #[test]
    fn grand_total_is_exact_across_fractional_prices() {
        // 1 x 9.99 + 2 x 15.50 = 40.99, exactly, with no float drift.
        let mut a = TaskItem::draft(uuid::Uuid::new_v4());
        a.quantity = "1".into();
        a.unit_price = "$9.99".into();
        let mut b = TaskItem::draft(a.task_id);
        b.quantity = "2".into();
        b.unit_price = "$15.50".into();

        assert_eq!(grand_total([&a, &b]), dec("40.99"));
    }

    #[test]
    fn format_currency_fixed_two_places() {
        assert_eq!(format_currency(dec("20")), "$20.00");
        assert_eq!(format_currency(dec("9.9")), "$9.90");
        assert_eq!(format_currency(Decimal::ZERO), "$0.00");
    }
}
