//! Cart and catalog consistency rules.
//!
//! Every store applies these functions instead of re-deriving the decisions
//! inline, so the behaviour is identical across cart and catalog writes:
//!
//! - **Merge-on-add**: adding a product already in the cart increments its
//!   quantity; `product_id` is the uniqueness key within a user's cart.
//! - **Decrement-before-delete**: removal only deletes the row at the
//!   quantity-1 boundary, so a stored quantity is never zero or negative.
//! - **Id-match-on-update**: a path id and body id must agree.
//! - **Single-row writes**: keyed writes must touch exactly one row.
//!
//! Existence-before-traversal is enforced by the stores themselves since it
//! needs a read, but it reports through the same [`RuleViolation`] kinds.

use thiserror::Error;

/// Quantity given to a product the first time it enters a cart.
pub const INITIAL_QUANTITY: i32 = 1;

/// A violated consistency rule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleViolation {
    /// The id in the request path differs from the id in the body.
    #[error("id mismatch: path id {path} does not match body id {body}")]
    IdMismatch { path: i32, body: i32 },

    /// A keyed write matched no row.
    #[error("no row matched")]
    NoRowAffected,

    /// A keyed write matched more than one row.
    #[error("expected exactly one row, {0} were affected")]
    UnexpectedRowCount(u64),

    /// Removal was requested for a product that is not in the cart.
    #[error("product is not in the cart")]
    LineAbsent,

    /// Incrementing the line would exceed the largest storable quantity.
    #[error("quantity {0} cannot be incremented further")]
    QuantityOverflow(i32),
}

/// The write a cart operation must perform on a single `(user, product)` row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineChange {
    /// No row exists yet; insert one with the given quantity.
    Insert { quantity: i32 },
    /// Overwrite the row's quantity.
    SetQuantity(i32),
    /// Remove the row.
    Delete,
}

/// Decide the write for an add, given the row's current quantity (if any).
///
/// # Errors
///
/// Returns [`RuleViolation::QuantityOverflow`] when the line is already at
/// `i32::MAX`.
pub const fn on_add(current: Option<i32>) -> Result<LineChange, RuleViolation> {
    match current {
        None => Ok(LineChange::Insert {
            quantity: INITIAL_QUANTITY,
        }),
        Some(quantity) => match quantity.checked_add(1) {
            Some(next) => Ok(LineChange::SetQuantity(next)),
            None => Err(RuleViolation::QuantityOverflow(quantity)),
        },
    }
}

/// Decide the write for a single-unit removal.
///
/// # Errors
///
/// Returns [`RuleViolation::LineAbsent`] when there is no row to decrement.
pub const fn on_remove(current: Option<i32>) -> Result<LineChange, RuleViolation> {
    match current {
        None => Err(RuleViolation::LineAbsent),
        Some(quantity) if quantity <= 1 => Ok(LineChange::Delete),
        Some(quantity) => Ok(LineChange::SetQuantity(quantity - 1)),
    }
}

/// Reject an update whose body id does not match the path id.
///
/// # Errors
///
/// Returns [`RuleViolation::IdMismatch`] carrying both ids.
pub fn ensure_ids_match<T>(path: T, body: T) -> Result<(), RuleViolation>
where
    T: Copy + PartialEq + Into<i32>,
{
    if path == body {
        Ok(())
    } else {
        Err(RuleViolation::IdMismatch {
            path: path.into(),
            body: body.into(),
        })
    }
}

/// Check the affected-row count of a keyed write.
///
/// # Errors
///
/// Returns [`RuleViolation::NoRowAffected`] for zero rows and
/// [`RuleViolation::UnexpectedRowCount`] for more than one.
pub const fn expect_single_row(affected: u64) -> Result<(), RuleViolation> {
    match affected {
        1 => Ok(()),
        0 => Err(RuleViolation::NoRowAffected),
        n => Err(RuleViolation::UnexpectedRowCount(n)),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::{CategoryId, ProductId};

    #[test]
    fn test_add_to_absent_line_inserts_one() {
        assert_eq!(on_add(None), Ok(LineChange::Insert { quantity: 1 }));
    }

    #[test]
    fn test_add_to_present_line_increments() {
        assert_eq!(on_add(Some(1)), Ok(LineChange::SetQuantity(2)));
        assert_eq!(on_add(Some(41)), Ok(LineChange::SetQuantity(42)));
    }

    #[test]
    fn test_add_at_max_quantity_overflows() {
        assert_eq!(
            on_add(Some(i32::MAX - 1)),
            Ok(LineChange::SetQuantity(i32::MAX))
        );
        assert_eq!(
            on_add(Some(i32::MAX)),
            Err(RuleViolation::QuantityOverflow(i32::MAX))
        );
    }

    #[test]
    fn test_repeated_adds_accumulate() {
        let mut quantity = None;
        for _ in 0..5 {
            quantity = Some(match on_add(quantity).unwrap() {
                LineChange::Insert { quantity } | LineChange::SetQuantity(quantity) => quantity,
                LineChange::Delete => unreachable!("add never deletes"),
            });
        }
        assert_eq!(quantity, Some(5));
    }

    #[test]
    fn test_remove_absent_line() {
        assert_eq!(on_remove(None), Err(RuleViolation::LineAbsent));
    }

    #[test]
    fn test_remove_at_boundary_deletes() {
        assert_eq!(on_remove(Some(1)), Ok(LineChange::Delete));
        // A corrupt zero or negative quantity is cleaned up rather than decremented further
        assert_eq!(on_remove(Some(0)), Ok(LineChange::Delete));
        assert_eq!(on_remove(Some(-3)), Ok(LineChange::Delete));
    }

    #[test]
    fn test_remove_above_boundary_decrements() {
        assert_eq!(on_remove(Some(3)), Ok(LineChange::SetQuantity(2)));
        assert_eq!(on_remove(Some(2)), Ok(LineChange::SetQuantity(1)));
    }

    #[test]
    fn test_remove_never_produces_non_positive_quantity() {
        for quantity in -2..50 {
            if let Ok(LineChange::SetQuantity(next)) = on_remove(Some(quantity)) {
                assert!(next >= 1, "quantity {quantity} decremented to {next}");
            }
        }
    }

    #[test]
    fn test_ids_match() {
        assert!(ensure_ids_match(CategoryId::new(1), CategoryId::new(1)).is_ok());
    }

    #[test]
    fn test_ids_mismatch() {
        let err = ensure_ids_match(ProductId::new(1), ProductId::new(2)).unwrap_err();
        assert_eq!(err, RuleViolation::IdMismatch { path: 1, body: 2 });
        assert_eq!(
            err.to_string(),
            "id mismatch: path id 1 does not match body id 2"
        );
    }

    #[test]
    fn test_expect_single_row() {
        assert!(expect_single_row(1).is_ok());
        assert_eq!(expect_single_row(0), Err(RuleViolation::NoRowAffected));
        assert_eq!(
            expect_single_row(3),
            Err(RuleViolation::UnexpectedRowCount(3))
        );
    }
}
