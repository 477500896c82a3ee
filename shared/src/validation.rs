//! Validation utilities for the Tienda POS platform

use rust_decimal::Decimal;

use crate::draft::DraftLine;
use crate::types::MovementDirection;

// ============================================================================
// Order Validations
// ============================================================================

/// Validate a set of order lines before submission
pub fn validate_order_lines(lines: &[DraftLine]) -> Result<(), &'static str> {
    if lines.is_empty() {
        return Err("At least one line is required");
    }
    for line in lines {
        if line.quantity <= 0 {
            return Err("Quantity must be greater than zero");
        }
        if line.unit_price <= Decimal::ZERO {
            return Err("Unit price must be greater than zero");
        }
        if line.discount < Decimal::ZERO {
            return Err("Line discount cannot be negative");
        }
        if line.subtotal() < Decimal::ZERO {
            return Err("Line discount cannot exceed the line amount");
        }
    }
    Ok(())
}

/// Validate that a sale price is not below the purchase price
pub fn validate_price_coherence(purchase_price: Decimal, sale_price: Decimal) -> Result<(), &'static str> {
    if purchase_price <= Decimal::ZERO {
        return Err("Purchase price must be greater than zero");
    }
    if sale_price <= Decimal::ZERO {
        return Err("Sale price must be greater than zero");
    }
    if sale_price < purchase_price {
        return Err("Sale price cannot be below the purchase price");
    }
    Ok(())
}

/// Validate a product code (non-empty, no surrounding whitespace)
pub fn validate_product_code(code: &str) -> Result<(), &'static str> {
    if code.trim().is_empty() {
        return Err("Code cannot be empty");
    }
    if code.trim() != code {
        return Err("Code cannot have leading or trailing whitespace");
    }
    Ok(())
}

/// Validate a product search term (at least 2 characters after trimming)
pub fn validate_search_term(term: &str) -> Result<(), &'static str> {
    if term.trim().len() < 2 {
        return Err("Search term must have at least 2 characters");
    }
    Ok(())
}

// ============================================================================
// Movement Validations
// ============================================================================

/// Check the snapshot arithmetic of a movement record
///
/// `in` adds the quantity, `out` subtracts it, and `adjustment` records the
/// absolute difference between the snapshots.
pub fn movement_is_consistent(
    direction: MovementDirection,
    quantity: i32,
    stock_before: i32,
    stock_after: i32,
) -> bool {
    if quantity < 0 || stock_before < 0 || stock_after < 0 {
        return false;
    }
    match direction {
        MovementDirection::In => stock_after == stock_before + quantity,
        MovementDirection::Out => stock_after == stock_before - quantity,
        MovementDirection::Adjustment => (stock_after - stock_before).abs() == quantity,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use uuid::Uuid;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn line(quantity: i32, price: &str, discount: &str) -> DraftLine {
        DraftLine {
            product_id: Uuid::new_v4(),
            quantity,
            unit_price: dec(price),
            discount: dec(discount),
        }
    }

    #[test]
    fn test_validate_order_lines_valid() {
        assert!(validate_order_lines(&[line(2, "3.50", "0"), line(1, "10.00", "1.00")]).is_ok());
    }

    #[test]
    fn test_validate_order_lines_empty() {
        assert!(validate_order_lines(&[]).is_err());
    }

    #[test]
    fn test_validate_order_lines_bad_quantity() {
        assert!(validate_order_lines(&[line(0, "3.50", "0")]).is_err());
        assert!(validate_order_lines(&[line(-1, "3.50", "0")]).is_err());
    }

    #[test]
    fn test_validate_order_lines_discount_exceeds_amount() {
        assert!(validate_order_lines(&[line(1, "3.00", "5.00")]).is_err());
    }

    #[test]
    fn test_price_coherence() {
        assert!(validate_price_coherence(dec("10.00"), dec("15.00")).is_ok());
        assert!(validate_price_coherence(dec("10.00"), dec("10.00")).is_ok());
        assert!(validate_price_coherence(dec("10.00"), dec("9.99")).is_err());
        assert!(validate_price_coherence(dec("0"), dec("9.99")).is_err());
    }

    #[test]
    fn test_validate_product_code() {
        assert!(validate_product_code("P001").is_ok());
        assert!(validate_product_code("").is_err());
        assert!(validate_product_code("  ").is_err());
        assert!(validate_product_code(" P001").is_err());
    }

    #[test]
    fn test_validate_search_term() {
        assert!(validate_search_term("ar").is_ok());
        assert!(validate_search_term(" a ").is_err());
    }

    #[test]
    fn test_movement_consistency() {
        assert!(movement_is_consistent(MovementDirection::In, 5, 10, 15));
        assert!(movement_is_consistent(MovementDirection::Out, 3, 5, 2));
        assert!(movement_is_consistent(MovementDirection::Adjustment, 2, 2, 0));
        assert!(movement_is_consistent(MovementDirection::Adjustment, 2, 0, 2));
        assert!(!movement_is_consistent(MovementDirection::In, 5, 10, 14));
        assert!(!movement_is_consistent(MovementDirection::Out, 3, 2, -1));
    }
}
