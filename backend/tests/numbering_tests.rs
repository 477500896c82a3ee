//! Order numbering tests
//!
//! Numbers follow {PREFIX}-{YYYY}-{SEQ}: strictly increasing and gap-free
//! within a prefix and year, resetting to 1 at the year boundary.

use proptest::prelude::*;

use shared::numbering::{
    format_order_number, next_order_number, parse_sequence, PURCHASE_PREFIX,
    PURCHASE_SEQUENCE_WIDTH, SALE_SEQUENCE_WIDTH,
};
use shared::types::DocumentType;

// ============================================================================
// Unit Tests
// ============================================================================

#[test]
fn test_document_type_prefixes() {
    assert_eq!(DocumentType::Boleta.number_prefix(), "BOL");
    assert_eq!(DocumentType::Factura.number_prefix(), "FAC");
    assert_eq!(DocumentType::Ticket.number_prefix(), "TIC");
    assert_eq!(PURCHASE_PREFIX, "COM");
}

#[test]
fn test_first_number_of_year() {
    assert_eq!(
        next_order_number("BOL", 2024, SALE_SEQUENCE_WIDTH, None),
        "BOL-2024-0001"
    );
    assert_eq!(
        next_order_number(PURCHASE_PREFIX, 2024, PURCHASE_SEQUENCE_WIDTH, None),
        "COM-2024-001"
    );
}

#[test]
fn test_increment_from_last() {
    assert_eq!(
        next_order_number("FAC", 2024, SALE_SEQUENCE_WIDTH, Some("FAC-2024-0041")),
        "FAC-2024-0042"
    );
}

#[test]
fn test_year_boundary_resets_sequence() {
    // The generator only ever sees numbers of its own prefix+year; a new year
    // starts with no previous number and restarts at 1.
    let december = next_order_number("BOL", 2024, SALE_SEQUENCE_WIDTH, Some("BOL-2024-0387"));
    assert_eq!(december, "BOL-2024-0388");

    let january = next_order_number("BOL", 2025, SALE_SEQUENCE_WIDTH, None);
    assert_eq!(january, "BOL-2025-0001");
}

#[test]
fn test_sequence_survives_pad_overflow() {
    assert_eq!(
        next_order_number(PURCHASE_PREFIX, 2024, PURCHASE_SEQUENCE_WIDTH, Some("COM-2024-999")),
        "COM-2024-1000"
    );
    assert_eq!(
        next_order_number(PURCHASE_PREFIX, 2024, PURCHASE_SEQUENCE_WIDTH, Some("COM-2024-1000")),
        "COM-2024-1001"
    );
}

#[test]
fn test_parse_sequence_rejects_garbage() {
    assert_eq!(parse_sequence("BOL-2024-0042"), Some(42));
    assert_eq!(parse_sequence("BOL-2024-"), None);
    assert_eq!(parse_sequence("no-dashes-here-x"), None);
}

#[test]
fn test_gap_free_series() {
    let mut last: Option<String> = None;
    for expected in 1..=25u32 {
        let number = next_order_number("TIC", 2024, SALE_SEQUENCE_WIDTH, last.as_deref());
        assert_eq!(parse_sequence(&number), Some(expected));
        last = Some(number);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Format/parse round-trip preserves the sequence value
    #[test]
    fn prop_format_parse_round_trip(sequence in 1u32..1_000_000, year in 2000i32..2100) {
        let number = format_order_number("BOL", year, sequence, SALE_SEQUENCE_WIDTH);
        prop_assert_eq!(parse_sequence(&number), Some(sequence));
    }

    /// Generated numbers are strictly increasing
    #[test]
    fn prop_next_is_strictly_increasing(sequence in 1u32..1_000_000) {
        let last = format_order_number("COM", 2024, sequence, PURCHASE_SEQUENCE_WIDTH);
        let next = next_order_number("COM", 2024, PURCHASE_SEQUENCE_WIDTH, Some(&last));
        prop_assert_eq!(parse_sequence(&next), Some(sequence + 1));
    }

    /// Padding never truncates and keeps prefix and year intact
    #[test]
    fn prop_number_shape(sequence in 1u32..100_000, year in 2000i32..2100) {
        let number = format_order_number("FAC", year, sequence, SALE_SEQUENCE_WIDTH);
        let mut parts = number.split('-');
        prop_assert_eq!(parts.next(), Some("FAC"));
        let year_str = year.to_string();
        prop_assert_eq!(parts.next(), Some(year_str.as_str()));
        let seq_part = parts.next().unwrap();
        prop_assert!(seq_part.len() >= SALE_SEQUENCE_WIDTH);
        prop_assert_eq!(seq_part.parse::<u32>().ok(), Some(sequence));
    }
}
