//! Draft order builder
//!
//! A caller-owned accumulator for order lines: the presentation layer builds a
//! [`DraftOrder`] while the operator scans products, then hands its lines to
//! the backend in a single submission. The backend itself keeps no state
//! between calls.
//!
//! Total computation lives here so that the preview shown at the register and
//! the totals stored by the sale workflow come from the same arithmetic.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One line in a draft order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftLine {
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub discount: Decimal,
}

impl DraftLine {
    /// Line subtotal: quantity x unit price - line discount
    pub fn subtotal(&self) -> Decimal {
        Decimal::from(self.quantity) * self.unit_price - self.discount
    }
}

/// Money fields of an order, kept exact until stored
///
/// Intermediate accumulation never rounds; call [`OrderTotals::rounded`] at
/// the storage or presentation boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderTotals {
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

impl OrderTotals {
    /// Round every field to 2 decimal places
    pub fn rounded(&self) -> OrderTotals {
        OrderTotals {
            subtotal: self.subtotal.round_dp(2),
            discount: self.discount.round_dp(2),
            tax: self.tax.round_dp(2),
            total: self.total.round_dp(2),
        }
    }
}

/// Compute order totals from lines, a global discount, and a tax rate
///
/// subtotal = sum of line subtotals; tax = (subtotal - discount) x rate;
/// total = (subtotal - discount) + tax.
pub fn order_totals(lines: &[DraftLine], global_discount: Decimal, tax_rate: Decimal) -> OrderTotals {
    let subtotal: Decimal = lines.iter().map(DraftLine::subtotal).sum();
    let taxable = subtotal - global_discount;
    let tax = taxable * tax_rate;
    OrderTotals {
        subtotal,
        discount: global_discount,
        tax,
        total: taxable + tax,
    }
}

/// A draft order being assembled by the caller
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DraftOrder {
    lines: Vec<DraftLine>,
    pub global_discount: Decimal,
    pub tax_rate: Decimal,
}

impl DraftOrder {
    pub fn new(tax_rate: Decimal) -> Self {
        Self {
            lines: Vec::new(),
            global_discount: Decimal::ZERO,
            tax_rate,
        }
    }

    /// Add a line; lines for the same product accumulate quantity
    pub fn add_line(&mut self, product_id: Uuid, quantity: i32, unit_price: Decimal, discount: Decimal) {
        if let Some(existing) = self
            .lines
            .iter_mut()
            .find(|l| l.product_id == product_id && l.unit_price == unit_price)
        {
            existing.quantity += quantity;
            existing.discount += discount;
        } else {
            self.lines.push(DraftLine {
                product_id,
                quantity,
                unit_price,
                discount,
            });
        }
    }

    /// Remove the line at `index`; out-of-range indexes are ignored
    pub fn remove_line(&mut self, index: usize) {
        if index < self.lines.len() {
            self.lines.remove(index);
        }
    }

    pub fn lines(&self) -> &[DraftLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Preview totals for the current content
    pub fn totals(&self) -> OrderTotals {
        order_totals(&self.lines, self.global_discount, self.tax_rate)
    }

    /// Consume the draft, yielding the lines for submission
    pub fn into_lines(self) -> Vec<DraftLine> {
        self.lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_line_subtotal() {
        let line = DraftLine {
            product_id: Uuid::new_v4(),
            quantity: 3,
            unit_price: dec("2.50"),
            discount: dec("0.50"),
        };
        assert_eq!(line.subtotal(), dec("7.00"));
    }

    #[test]
    fn test_totals_with_tax() {
        let lines = vec![DraftLine {
            product_id: Uuid::new_v4(),
            quantity: 2,
            unit_price: dec("50.00"),
            discount: Decimal::ZERO,
        }];
        let totals = order_totals(&lines, dec("10.00"), dec("0.18"));
        assert_eq!(totals.subtotal, dec("100.00"));
        assert_eq!(totals.tax, dec("16.2000"));
        assert_eq!(totals.total, dec("106.2000"));
        assert_eq!(totals.rounded().tax, dec("16.20"));
    }

    #[test]
    fn test_add_line_merges_same_product() {
        let mut draft = DraftOrder::new(dec("0.18"));
        let product = Uuid::new_v4();
        draft.add_line(product, 1, dec("4.00"), Decimal::ZERO);
        draft.add_line(product, 2, dec("4.00"), Decimal::ZERO);
        assert_eq!(draft.lines().len(), 1);
        assert_eq!(draft.lines()[0].quantity, 3);
    }

    #[test]
    fn test_remove_line_out_of_range() {
        let mut draft = DraftOrder::new(Decimal::ZERO);
        draft.add_line(Uuid::new_v4(), 1, dec("1.00"), Decimal::ZERO);
        draft.remove_line(5);
        assert_eq!(draft.lines().len(), 1);
        draft.remove_line(0);
        assert!(draft.is_empty());
    }
}
