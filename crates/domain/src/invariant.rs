//! Named invariants over container state
//!
//! An invariant is a pure predicate that must hold after every committed
//! mutation. Containers are configured with a static list of invariants;
//! the list runs in order against every proposed state, and the first
//! failure aborts the commit.

use crate::error::DomainError;

/// A named business rule checked against a state shape.
///
/// The check is a plain function pointer so invariant lists can live in
/// `const` tables next to the container definition:
///
/// ```
/// use hexkit_domain::Invariant;
///
/// struct OrderState { amount: f64 }
///
/// const INVARIANTS: &[Invariant<OrderState>] = &[Invariant::new(
///     "amount-not-negative",
///     |state| {
///         if state.amount < 0.0 {
///             Err(format!("amount {} is negative", state.amount))
///         } else {
///             Ok(())
///         }
///     },
/// )];
///
/// assert!(INVARIANTS[0].enforce(&OrderState { amount: 10.0 }).is_ok());
/// ```
pub struct Invariant<S> {
    name: &'static str,
    check: fn(&S) -> Result<(), String>,
}

impl<S> Invariant<S> {
    /// Creates a named invariant from a check function.
    pub const fn new(name: &'static str, check: fn(&S) -> Result<(), String>) -> Self {
        Self { name, check }
    }

    /// Returns the invariant's name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Runs the check, mapping a failure to
    /// [`DomainError::InvariantViolation`] carrying the invariant's name.
    pub fn enforce(&self, state: &S) -> Result<(), DomainError> {
        (self.check)(state).map_err(|message| DomainError::InvariantViolation {
            name: self.name,
            message,
        })
    }
}

impl<S> Clone for Invariant<S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S> Copy for Invariant<S> {}

impl<S> std::fmt::Debug for Invariant<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Invariant").field("name", &self.name).finish()
    }
}

/// Runs every invariant in order; the first violation wins.
pub fn check_all<S>(invariants: &[Invariant<S>], state: &S) -> Result<(), DomainError> {
    for invariant in invariants {
        invariant.enforce(state)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Balance {
        cents: i64,
    }

    const NOT_OVERDRAWN: Invariant<Balance> = Invariant::new("not-overdrawn", |b| {
        if b.cents < 0 {
            Err(format!("balance is {} cents", b.cents))
        } else {
            Ok(())
        }
    });

    #[test]
    fn enforce_passes_on_valid_state() {
        assert!(NOT_OVERDRAWN.enforce(&Balance { cents: 100 }).is_ok());
    }

    #[test]
    fn enforce_names_the_failed_rule() {
        let err = NOT_OVERDRAWN
            .enforce(&Balance { cents: -5 })
            .expect_err("must fail");
        match err {
            DomainError::InvariantViolation { name, message } => {
                assert_eq!(name, "not-overdrawn");
                assert!(message.contains("-5"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn check_all_reports_first_violation() {
        const RULES: &[Invariant<Balance>] = &[
            Invariant::new("first", |_| Err("first fails".to_string())),
            Invariant::new("second", |_| Err("second fails".to_string())),
        ];
        let err = check_all(RULES, &Balance { cents: 0 }).expect_err("must fail");
        assert!(matches!(
            err,
            DomainError::InvariantViolation { name: "first", .. }
        ));
    }

    #[test]
    fn check_all_accepts_empty_list() {
        assert!(check_all(&[], &Balance { cents: 0 }).is_ok());
    }
}
