//! Sale workflow rule tests
//!
//! Covers the validation rules and state transitions of the sale workflow:
//! line validation, document types, payment methods, and the one-way
//! annulment transition.

use rust_decimal::Decimal;
use std::str::FromStr;
use uuid::Uuid;

use shared::draft::{order_totals, DraftLine};
use shared::types::{DocumentType, PaymentMethod, SaleStatus};
use shared::validation::validate_order_lines;

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
// Line validation
// ============================================================================

#[test]
fn test_empty_line_list_rejected() {
    assert!(validate_order_lines(&[]).is_err());
}

#[test]
fn test_non_positive_quantity_rejected() {
    assert!(validate_order_lines(&[line(0, "5.00", "0")]).is_err());
    assert!(validate_order_lines(&[line(-2, "5.00", "0")]).is_err());
}

#[test]
fn test_non_positive_price_rejected() {
    assert!(validate_order_lines(&[line(1, "0.00", "0")]).is_err());
    assert!(validate_order_lines(&[line(1, "-3.00", "0")]).is_err());
}

#[test]
fn test_valid_lines_accepted() {
    let lines = vec![line(2, "3.50", "0"), line(1, "12.90", "1.00")];
    assert!(validate_order_lines(&lines).is_ok());
}

// ============================================================================
// Document types and payment methods
// ============================================================================

#[test]
fn test_document_types_parse() {
    assert_eq!(DocumentType::from_str("boleta"), Some(DocumentType::Boleta));
    assert_eq!(DocumentType::from_str("factura"), Some(DocumentType::Factura));
    assert_eq!(DocumentType::from_str("ticket"), Some(DocumentType::Ticket));
    assert_eq!(DocumentType::from_str("nota"), None);
}

#[test]
fn test_payment_methods_parse() {
    assert_eq!(PaymentMethod::from_str("efectivo"), Some(PaymentMethod::Efectivo));
    assert_eq!(PaymentMethod::from_str("tarjeta"), Some(PaymentMethod::Tarjeta));
    assert_eq!(
        PaymentMethod::from_str("transferencia"),
        Some(PaymentMethod::Transferencia)
    );
    assert_eq!(PaymentMethod::from_str("cheque"), None);
}

#[test]
fn test_enum_round_trip() {
    for doc in [DocumentType::Boleta, DocumentType::Factura, DocumentType::Ticket] {
        assert_eq!(DocumentType::from_str(doc.as_str()), Some(doc));
    }
    for method in [
        PaymentMethod::Efectivo,
        PaymentMethod::Tarjeta,
        PaymentMethod::Transferencia,
    ] {
        assert_eq!(PaymentMethod::from_str(method.as_str()), Some(method));
    }
}

// ============================================================================
// Sale state machine
// ============================================================================

#[test]
fn test_sale_states_parse() {
    assert_eq!(SaleStatus::from_str("completada"), Some(SaleStatus::Completada));
    assert_eq!(SaleStatus::from_str("anulada"), Some(SaleStatus::Anulada));
    assert_eq!(SaleStatus::from_str("pendiente"), None);
}

#[test]
fn test_annulment_is_one_way() {
    // The only legal transition is completada -> anulada; an annulled sale
    // cannot be annulled again (the workflow rejects it as InvalidState).
    let can_annul = |status: SaleStatus| status == SaleStatus::Completada;

    assert!(can_annul(SaleStatus::Completada));
    assert!(!can_annul(SaleStatus::Anulada));
}

// ============================================================================
// Totals scenario
// ============================================================================

#[test]
fn test_register_sale_totals_scenario() {
    // Two products, one with a line discount, global discount 5.00, IGV 18%:
    //   3 x 4.50 - 0.50 = 13.00
    //   2 x 12.00       = 24.00
    //   subtotal 37.00; taxable 32.00; tax 5.76; total 37.76
    let lines = vec![line(3, "4.50", "0.50"), line(2, "12.00", "0")];

    let totals = order_totals(&lines, dec("5.00"), dec("0.18")).rounded();

    assert_eq!(totals.subtotal, dec("37.00"));
    assert_eq!(totals.discount, dec("5.00"));
    assert_eq!(totals.tax, dec("5.76"));
    assert_eq!(totals.total, dec("37.76"));
}

#[test]
fn test_line_discount_cannot_exceed_line_amount() {
    assert!(validate_order_lines(&[line(1, "3.00", "4.00")]).is_err());
}
