//! Inventory invariant tests
//!
//! Exercises the rules the stock ledger and movement log must uphold:
//! stock never goes negative, every movement's snapshots reconcile with its
//! direction and quantity, and a failed order leaves nothing behind.

use proptest::prelude::*;
use std::collections::HashMap;
use uuid::Uuid;

use shared::types::MovementDirection;
use shared::validation::movement_is_consistent;

// ============================================================================
// Ledger simulation helpers
// ============================================================================

/// A recorded movement snapshot pair
#[derive(Debug, Clone, Copy)]
struct Snapshot {
    direction: MovementDirection,
    quantity: i32,
    stock_before: i32,
    stock_after: i32,
}

/// Apply one delta to a stock level the way the ledger does
fn apply_delta(
    current: i32,
    direction: MovementDirection,
    quantity: i32,
) -> Result<Snapshot, &'static str> {
    if quantity < 0 {
        return Err("Quantity cannot be negative");
    }

    let stock_after = match direction {
        MovementDirection::In => current + quantity,
        MovementDirection::Out => {
            if current < quantity {
                return Err("Insufficient stock");
            }
            current - quantity
        }
        MovementDirection::Adjustment => quantity, // absolute set
    };

    Ok(Snapshot {
        direction,
        quantity: match direction {
            MovementDirection::Adjustment => (quantity - current).abs(),
            _ => quantity,
        },
        stock_before: current,
        stock_after,
    })
}

/// Apply a multi-line out order atomically: validate every line first, then
/// apply; any failure leaves the ledger untouched
fn apply_sale(
    stocks: &mut HashMap<Uuid, i32>,
    lines: &[(Uuid, i32)],
) -> Result<Vec<Snapshot>, &'static str> {
    // Validation pass
    for (product, quantity) in lines {
        let available = stocks.get(product).ok_or("Product not found")?;
        if *quantity <= 0 {
            return Err("Quantity must be positive");
        }
        if available < quantity {
            return Err("Insufficient stock");
        }
    }

    // Apply pass
    let mut movements = Vec::with_capacity(lines.len());
    for (product, quantity) in lines {
        let current = stocks[product];
        let snapshot = apply_delta(current, MovementDirection::Out, *quantity)?;
        stocks.insert(*product, snapshot.stock_after);
        movements.push(snapshot);
    }

    Ok(movements)
}

// ============================================================================
// Unit Tests
// ============================================================================

#[test]
fn test_sale_decrements_stock() {
    // Product with stock 5, minimum 2: selling 3 leaves 2
    let snapshot = apply_delta(5, MovementDirection::Out, 3).unwrap();

    assert_eq!(snapshot.stock_before, 5);
    assert_eq!(snapshot.stock_after, 2);
    assert!(movement_is_consistent(
        snapshot.direction,
        snapshot.quantity,
        snapshot.stock_before,
        snapshot.stock_after,
    ));
}

#[test]
fn test_sale_rejected_when_stock_short() {
    // Stock 2, requesting 3: rejected, stock unchanged
    let result = apply_delta(2, MovementDirection::Out, 3);
    assert!(result.is_err());
}

#[test]
fn test_receipt_increments_stock() {
    let snapshot = apply_delta(10, MovementDirection::In, 25).unwrap();

    assert_eq!(snapshot.stock_after, 35);
    assert!(movement_is_consistent(
        snapshot.direction,
        snapshot.quantity,
        snapshot.stock_before,
        snapshot.stock_after,
    ));
}

#[test]
fn test_adjustment_to_zero_records_difference() {
    // Stock 2 adjusted to 0 ("merma"): one adjustment movement of quantity 2
    let snapshot = apply_delta(2, MovementDirection::Adjustment, 0).unwrap();

    assert_eq!(snapshot.quantity, 2);
    assert_eq!(snapshot.stock_before, 2);
    assert_eq!(snapshot.stock_after, 0);
    assert!(movement_is_consistent(
        MovementDirection::Adjustment,
        snapshot.quantity,
        snapshot.stock_before,
        snapshot.stock_after,
    ));
}

#[test]
fn test_adjustment_upward() {
    let snapshot = apply_delta(3, MovementDirection::Adjustment, 10).unwrap();

    assert_eq!(snapshot.quantity, 7);
    assert_eq!(snapshot.stock_after, 10);
}

#[test]
fn test_failed_line_aborts_whole_sale() {
    let a = Uuid::new_v4();
    let b = Uuid::new_v4();
    let c = Uuid::new_v4();

    let mut stocks = HashMap::from([(a, 10), (b, 1), (c, 10)]);

    // Line 2 asks for more than available: nothing may change
    let result = apply_sale(&mut stocks, &[(a, 5), (b, 3), (c, 2)]);

    assert!(result.is_err());
    assert_eq!(stocks[&a], 10);
    assert_eq!(stocks[&b], 1);
    assert_eq!(stocks[&c], 10);
}

#[test]
fn test_sale_then_annulment_round_trip() {
    let a = Uuid::new_v4();
    let b = Uuid::new_v4();

    let mut stocks = HashMap::from([(a, 8), (b, 5)]);
    let lines = [(a, 3), (b, 2)];

    let out_movements = apply_sale(&mut stocks, &lines).unwrap();
    assert_eq!(stocks[&a], 5);
    assert_eq!(stocks[&b], 3);

    // Annulment returns every line quantity with an `in` movement
    let mut in_movements = Vec::new();
    for (product, quantity) in &lines {
        let snapshot = apply_delta(stocks[product], MovementDirection::In, *quantity).unwrap();
        stocks.insert(*product, snapshot.stock_after);
        in_movements.push(snapshot);
    }

    assert_eq!(stocks[&a], 8);
    assert_eq!(stocks[&b], 5);
    assert_eq!(out_movements.len(), lines.len());
    assert_eq!(in_movements.len(), lines.len());
}

#[test]
fn test_movement_consistency_rejects_bad_snapshots() {
    assert!(!movement_is_consistent(MovementDirection::In, 5, 10, 14));
    assert!(!movement_is_consistent(MovementDirection::Out, 5, 10, 6));
    assert!(!movement_is_consistent(MovementDirection::Out, 5, 3, -2));
    assert!(!movement_is_consistent(MovementDirection::Adjustment, 3, 2, 0));
}

// ============================================================================
// Property-Based Tests
// ============================================================================

fn direction_strategy() -> impl Strategy<Value = MovementDirection> {
    prop_oneof![
        Just(MovementDirection::In),
        Just(MovementDirection::Out),
        Just(MovementDirection::Adjustment),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Stock never goes negative through the ledger
    #[test]
    fn prop_stock_stays_non_negative(
        initial in 0i32..1000,
        deltas in prop::collection::vec((direction_strategy(), 0i32..200), 1..30)
    ) {
        let mut stock = initial;
        for (direction, quantity) in deltas {
            if let Ok(snapshot) = apply_delta(stock, direction, quantity) {
                prop_assert!(snapshot.stock_after >= 0);
                stock = snapshot.stock_after;
            }
        }
        prop_assert!(stock >= 0);
    }

    /// Every accepted movement reconciles its snapshots
    #[test]
    fn prop_accepted_movements_are_consistent(
        initial in 0i32..1000,
        direction in direction_strategy(),
        quantity in 0i32..500
    ) {
        if let Ok(snapshot) = apply_delta(initial, direction, quantity) {
            prop_assert!(movement_is_consistent(
                snapshot.direction,
                snapshot.quantity,
                snapshot.stock_before,
                snapshot.stock_after,
            ));
        }
    }

    /// An out followed by an equal in restores the starting stock
    #[test]
    fn prop_out_in_round_trip(initial in 0i32..1000, quantity in 0i32..500) {
        if let Ok(out) = apply_delta(initial, MovementDirection::Out, quantity) {
            let back = apply_delta(out.stock_after, MovementDirection::In, quantity).unwrap();
            prop_assert_eq!(back.stock_after, initial);
        }
    }
}
