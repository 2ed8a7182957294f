//! Value object container - immutable, compared by value
//!
//! A value object has no identity and no actions: it is created valid and
//! replaced rather than mutated. Two value objects are equal iff their
//! full attribute sets are equal.
//!
//! Simple single-field value objects are often better served by a plain
//! validated newtype with a `new()` constructor; this container earns its
//! keep for multi-field shapes that want the same schema-plus-invariants
//! creation path as aggregates and entities.

use serde::de::{DeserializeOwned, Error as DeError};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use validator::{Validate, ValidationErrors};

use crate::error::DomainError;
use crate::invariant::{check_all, Invariant};

/// Configuration of a value object: its state shape and invariants.
pub trait ValueObjectType: Sized + 'static {
    /// The state shape. `PartialEq` drives structural equality.
    type State: Clone + PartialEq + Serialize + DeserializeOwned + Validate;

    /// Invariants checked at creation. May be empty.
    fn invariants() -> &'static [Invariant<Self::State>] {
        &[]
    }
}

/// An immutable container compared by its full attribute set.
pub struct ValueObject<V: ValueObjectType> {
    state: V::State,
}

impl<V: ValueObjectType> ValueObject<V> {
    /// Creates a value object from raw input (deserialize, field rules,
    /// invariants - any failure propagates, no instance is produced).
    pub fn create(raw: serde_json::Value) -> Result<Self, DomainError> {
        let state: V::State = serde_json::from_value(raw)?;
        Self::try_from_state(state)
    }

    /// Creates a value object from an already-typed state value.
    pub fn try_from_state(state: V::State) -> Result<Self, DomainError> {
        state.validate()?;
        check_all(V::invariants(), &state)?;
        Ok(Self { state })
    }

    /// Returns a read-only view of the value.
    #[inline]
    pub fn state(&self) -> &V::State {
        &self.state
    }

    /// Consumes the container, returning the inner state.
    pub fn into_inner(self) -> V::State {
        self.state
    }
}

impl<V: ValueObjectType> Clone for ValueObject<V> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
        }
    }
}

/// Structural equality over the full attribute set.
impl<V: ValueObjectType> PartialEq for ValueObject<V> {
    fn eq(&self, other: &Self) -> bool {
        self.state == other.state
    }
}

impl<V: ValueObjectType> Eq for ValueObject<V> where V::State: Eq {}

impl<V: ValueObjectType> std::fmt::Debug for ValueObject<V>
where
    V::State: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValueObject")
            .field("state", &self.state)
            .finish()
    }
}

impl<V: ValueObjectType> Serialize for ValueObject<V> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.state.serialize(serializer)
    }
}

impl<'de, V: ValueObjectType> Deserialize<'de> for ValueObject<V> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let state = V::State::deserialize(deserializer)?;
        Self::try_from_state(state).map_err(DeError::custom)
    }
}

impl<V: ValueObjectType> Validate for ValueObject<V> {
    fn validate(&self) -> Result<(), ValidationErrors> {
        self.state.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
    struct MoneyState {
        #[validate(length(equal = 3))]
        currency: String,
        cents: u64,
    }

    struct Money;

    impl ValueObjectType for Money {
        type State = MoneyState;
    }

    #[test]
    fn create_validates_field_rules() {
        let err = ValueObject::<Money>::create(json!({ "currency": "EURO", "cents": 100 }))
            .expect_err("must reject");
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn equality_is_structural() {
        let a = ValueObject::<Money>::create(json!({ "currency": "EUR", "cents": 100 }))
            .expect("valid");
        let b = ValueObject::<Money>::create(json!({ "currency": "EUR", "cents": 100 }))
            .expect("valid");
        let c = ValueObject::<Money>::create(json!({ "currency": "EUR", "cents": 250 }))
            .expect("valid");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn into_inner_returns_the_state() {
        let money = ValueObject::<Money>::create(json!({ "currency": "GBP", "cents": 42 }))
            .expect("valid");
        let state = money.into_inner();
        assert_eq!(state.currency, "GBP");
        assert_eq!(state.cents, 42);
    }
}
