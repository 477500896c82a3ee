//! Human-readable order numbers
//!
//! Numbers follow `{PREFIX}-{YYYY}-{SEQ}`: the sequence is zero-padded,
//! starts at 1 each calendar year, and is derived from the highest number
//! already issued for the same prefix and year. Sales use a 4-digit pad,
//! purchases a 3-digit pad; sequences past the pad width keep incrementing
//! without truncation.

/// Pad width of the sale sequence segment (`BOL-2024-0001`)
pub const SALE_SEQUENCE_WIDTH: usize = 4;

/// Pad width of the purchase sequence segment (`COM-2024-001`)
pub const PURCHASE_SEQUENCE_WIDTH: usize = 3;

/// Prefix of purchase numbers
pub const PURCHASE_PREFIX: &str = "COM";

/// Format an order number from its parts
pub fn format_order_number(prefix: &str, year: i32, sequence: u32, width: usize) -> String {
    format!("{}-{}-{:0width$}", prefix, year, sequence, width = width)
}

/// Extract the sequence value from an order number
///
/// Returns `None` when the last `-` segment is not a number.
pub fn parse_sequence(number: &str) -> Option<u32> {
    number.rsplit('-').next()?.parse().ok()
}

/// Next number in a prefix+year series given the highest existing number
///
/// `last` is the most recently issued number for that prefix and year, or
/// `None` at the start of a year (the series then restarts at 1).
pub fn next_order_number(prefix: &str, year: i32, width: usize, last: Option<&str>) -> String {
    let sequence = last
        .and_then(parse_sequence)
        .map(|n| n + 1)
        .unwrap_or(1);
    format_order_number(prefix, year, sequence, width)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_pads_sequence() {
        assert_eq!(format_order_number("BOL", 2024, 1, 4), "BOL-2024-0001");
        assert_eq!(format_order_number("COM", 2024, 12, 3), "COM-2024-012");
    }

    #[test]
    fn test_format_does_not_truncate_wide_sequences() {
        assert_eq!(format_order_number("COM", 2024, 1234, 3), "COM-2024-1234");
    }

    #[test]
    fn test_parse_sequence() {
        assert_eq!(parse_sequence("FAC-2024-0042"), Some(42));
        assert_eq!(parse_sequence("COM-2024-999"), Some(999));
        assert_eq!(parse_sequence("garbage"), None);
    }

    #[test]
    fn test_next_starts_at_one() {
        assert_eq!(next_order_number("BOL", 2025, 4, None), "BOL-2025-0001");
    }

    #[test]
    fn test_next_increments_last() {
        assert_eq!(
            next_order_number("BOL", 2024, 4, Some("BOL-2024-0009")),
            "BOL-2024-0010"
        );
        assert_eq!(
            next_order_number("COM", 2024, 3, Some("COM-2024-099")),
            "COM-2024-100"
        );
    }
}
