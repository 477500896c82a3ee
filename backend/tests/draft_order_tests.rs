//! Draft order and totals tests
//!
//! The draft builder is the caller-owned accumulator that replaces any
//! session-held cart; its preview totals must match what the workflows store.

use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;
use uuid::Uuid;

use shared::draft::{order_totals, DraftLine, DraftOrder};

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn line(quantity: i32, unit_price: &str, discount: &str) -> DraftLine {
    DraftLine {
        product_id: Uuid::new_v4(),
        quantity,
        unit_price: dec(unit_price),
        discount: dec(discount),
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[test]
fn test_line_subtotal_with_discount() {
    assert_eq!(line(3, "10.00", "2.50").subtotal(), dec("27.50"));
}

#[test]
fn test_totals_match_register_arithmetic() {
    // 2 x 50.00 = 100.00; global discount 10; IGV 18%
    let lines = vec![line(2, "50.00", "0")];
    let totals = order_totals(&lines, dec("10.00"), dec("0.18")).rounded();

    assert_eq!(totals.subtotal, dec("100.00"));
    assert_eq!(totals.discount, dec("10.00"));
    assert_eq!(totals.tax, dec("16.20"));
    assert_eq!(totals.total, dec("106.20"));
}

#[test]
fn test_totals_accumulate_exactly_before_rounding() {
    // Three lines of 0.333 each would drift if rounded per line
    let lines = vec![
        line(1, "0.333", "0"),
        line(1, "0.333", "0"),
        line(1, "0.333", "0"),
    ];
    let totals = order_totals(&lines, Decimal::ZERO, Decimal::ZERO);

    assert_eq!(totals.subtotal, dec("0.999"));
    assert_eq!(totals.rounded().subtotal, dec("1.00"));
}

#[test]
fn test_zero_tax_rate() {
    let lines = vec![line(4, "2.50", "0")];
    let totals = order_totals(&lines, Decimal::ZERO, Decimal::ZERO);

    assert_eq!(totals.tax, Decimal::ZERO);
    assert_eq!(totals.total, dec("10.00"));
}

#[test]
fn test_draft_accumulates_same_product() {
    let mut draft = DraftOrder::new(dec("0.18"));
    let product = Uuid::new_v4();

    draft.add_line(product, 2, dec("5.00"), Decimal::ZERO);
    draft.add_line(product, 1, dec("5.00"), Decimal::ZERO);
    draft.add_line(Uuid::new_v4(), 1, dec("3.00"), Decimal::ZERO);

    assert_eq!(draft.lines().len(), 2);
    assert_eq!(draft.lines()[0].quantity, 3);
    assert_eq!(draft.totals().subtotal, dec("18.00"));
}

#[test]
fn test_draft_preview_equals_submission_totals() {
    let mut draft = DraftOrder::new(dec("0.18"));
    draft.add_line(Uuid::new_v4(), 2, dec("7.90"), dec("0.80"));
    draft.add_line(Uuid::new_v4(), 5, dec("1.20"), Decimal::ZERO);
    draft.global_discount = dec("1.00");

    let preview = draft.totals();
    let lines = draft.clone().into_lines();
    let submitted = order_totals(&lines, dec("1.00"), dec("0.18"));

    assert_eq!(preview, submitted);
}

#[test]
fn test_empty_draft() {
    let draft = DraftOrder::new(dec("0.18"));
    assert!(draft.is_empty());
    assert_eq!(draft.totals().total, Decimal::ZERO);
}

// ============================================================================
// Property-Based Tests
// ============================================================================

fn quantity_strategy() -> impl Strategy<Value = i32> {
    1i32..=1000
}

fn price_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..=100_000).prop_map(|n| Decimal::new(n, 2)) // 0.01 to 1000.00
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Subtotal equals the sum of line subtotals
    #[test]
    fn prop_subtotal_is_sum_of_lines(
        inputs in prop::collection::vec((quantity_strategy(), price_strategy()), 1..10)
    ) {
        let lines: Vec<DraftLine> = inputs
            .iter()
            .map(|(q, p)| DraftLine {
                product_id: Uuid::new_v4(),
                quantity: *q,
                unit_price: *p,
                discount: Decimal::ZERO,
            })
            .collect();

        let expected: Decimal = lines.iter().map(DraftLine::subtotal).sum();
        let totals = order_totals(&lines, Decimal::ZERO, Decimal::ZERO);

        prop_assert_eq!(totals.subtotal, expected);
    }

    /// total = (subtotal - discount) * (1 + rate), exactly
    #[test]
    fn prop_total_formula(
        quantity in quantity_strategy(),
        price in price_strategy(),
        rate_percent in 0i64..=30
    ) {
        let rate = Decimal::new(rate_percent, 2);
        let lines = vec![DraftLine {
            product_id: Uuid::new_v4(),
            quantity,
            unit_price: price,
            discount: Decimal::ZERO,
        }];

        let totals = order_totals(&lines, Decimal::ZERO, rate);
        let expected = totals.subtotal * (Decimal::ONE + rate);

        prop_assert_eq!(totals.total, expected);
        prop_assert_eq!(totals.tax, totals.subtotal * rate);
    }

    /// Rounding happens only at the boundary and is stable
    #[test]
    fn prop_rounded_is_idempotent(
        inputs in prop::collection::vec((quantity_strategy(), price_strategy()), 1..10)
    ) {
        let lines: Vec<DraftLine> = inputs
            .iter()
            .map(|(q, p)| DraftLine {
                product_id: Uuid::new_v4(),
                quantity: *q,
                unit_price: *p,
                discount: Decimal::ZERO,
            })
            .collect();

        let rounded = order_totals(&lines, Decimal::ZERO, Decimal::new(18, 2)).rounded();

        prop_assert_eq!(rounded.total.scale() <= 2, true);
        prop_assert_eq!(rounded.clone().rounded(), rounded);
    }
}
