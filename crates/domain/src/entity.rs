//! Entity container - invariant-checked state without event emission
//!
//! Entities follow the same propose/verify/commit protocol as aggregates
//! but never queue events. They are typically embedded inside an
//! aggregate's state: the serde impls hydrate an entity from its bare
//! state shape (running validation and invariants) and dehydrate it back,
//! so a persisted aggregate never contains live container wrappers.

use serde::de::{DeserializeOwned, Error as DeError};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use validator::{Validate, ValidationErrors};

use crate::error::DomainError;
use crate::ids::Identifiable;
use crate::invariant::{check_all, Invariant};

/// Configuration of an entity: its state shape, command set, and invariants.
///
/// Like [`AggregateType`](crate::AggregateType) minus the event set -
/// entities never emit.
pub trait EntityType: Sized + 'static {
    /// The state shape. Its serde and `Validate` derives are the schema.
    type State: Clone + Serialize + DeserializeOwned + Validate + Identifiable;

    /// The closed set of actions, as a tagged enum.
    type Command;

    /// Invariants checked at creation and after every action. May be empty.
    fn invariants() -> &'static [Invariant<Self::State>] {
        &[]
    }

    /// Applies a command to a draft of the state.
    fn execute(state: &mut Self::State, command: Self::Command) -> Result<(), DomainError>;
}

/// Identity type of an entity's state.
pub type EntityId<E> = <<E as EntityType>::State as Identifiable>::Id;

/// An identity-bearing state container without event emission.
pub struct Entity<E: EntityType> {
    state: E::State,
}

impl<E: EntityType> Entity<E> {
    /// Creates an entity from raw input.
    ///
    /// Same checks as [`Aggregate::create`](crate::Aggregate::create):
    /// deserialize, field rules, invariants. Any failure propagates and no
    /// instance is produced.
    pub fn create(raw: serde_json::Value) -> Result<Self, DomainError> {
        let state: E::State = serde_json::from_value(raw)?;
        Self::try_from_state(state)
    }

    /// Creates an entity from an already-typed state value.
    pub fn try_from_state(state: E::State) -> Result<Self, DomainError> {
        state.validate()?;
        check_all(E::invariants(), &state)?;
        Ok(Self { state })
    }

    /// Returns the entity's identity.
    #[inline]
    pub fn id(&self) -> EntityId<E> {
        self.state.id()
    }

    /// Returns a read-only view of the committed state.
    #[inline]
    pub fn state(&self) -> &E::State {
        &self.state
    }

    /// Runs an action through the propose/verify/commit protocol.
    ///
    /// When the entity is nested inside an aggregate, this runs at the
    /// moment the outer action touches the entity; the outer aggregate's
    /// own invariants re-run over the whole draft afterwards.
    ///
    /// # Errors
    ///
    /// Same contract as [`Aggregate::handle`](crate::Aggregate::handle):
    /// on any error the committed state is untouched.
    pub fn handle(&mut self, command: E::Command) -> Result<(), DomainError> {
        let mut draft = self.state.clone();
        E::execute(&mut draft, command)?;
        check_all(E::invariants(), &draft)?;
        if draft.id() != self.state.id() {
            return Err(DomainError::identity_changed(format!(
                "{:?} cannot become {:?}",
                self.state.id(),
                draft.id()
            )));
        }
        self.state = draft;
        Ok(())
    }
}

impl<E: EntityType> Clone for Entity<E> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
        }
    }
}

/// Entities of the same type are equal iff they carry the same identity.
impl<E: EntityType> PartialEq for Entity<E> {
    fn eq(&self, other: &Self) -> bool {
        self.state.id() == other.state.id()
    }
}

impl<E: EntityType> Eq for Entity<E> where EntityId<E>: Eq {}

impl<E: EntityType> std::fmt::Debug for Entity<E>
where
    E::State: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Entity").field("state", &self.state).finish()
    }
}

// ============================================================================
// Serde / Validate Implementations (hydration and dehydration)
// ============================================================================

/// Dehydration: an embedded entity serializes as its bare state shape.
impl<E: EntityType> Serialize for Entity<E> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.state.serialize(serializer)
    }
}

/// Hydration: deserializing re-enters the creation path, so nested
/// validation and nested invariants can fail the outer deserialization.
impl<'de, E: EntityType> Deserialize<'de> for Entity<E> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let state = E::State::deserialize(deserializer)?;
        Self::try_from_state(state).map_err(DeError::custom)
    }
}

/// Delegation so `#[validate(nested)]` works on embedded entity fields.
impl<E: EntityType> Validate for Entity<E> {
    fn validate(&self) -> Result<(), ValidationErrors> {
        self.state.validate()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::define_id;
    use serde_json::json;

    define_id!(SeatId);

    #[derive(Debug, Clone, Serialize, Deserialize, Validate)]
    struct SeatState {
        id: SeatId,
        #[validate(length(min = 1, max = 8))]
        row: String,
        occupied: bool,
    }

    impl Identifiable for SeatState {
        type Id = SeatId;
        fn id(&self) -> SeatId {
            self.id
        }
    }

    enum SeatCommand {
        Occupy,
        Release,
    }

    struct Seat;

    impl EntityType for Seat {
        type State = SeatState;
        type Command = SeatCommand;

        fn execute(state: &mut SeatState, command: SeatCommand) -> Result<(), DomainError> {
            match command {
                SeatCommand::Occupy => {
                    if state.occupied {
                        return Err(DomainError::invalid_state_transition(
                            "Seat is already occupied",
                        ));
                    }
                    state.occupied = true;
                    Ok(())
                }
                SeatCommand::Release => {
                    state.occupied = false;
                    Ok(())
                }
            }
        }
    }

    fn create_seat() -> Entity<Seat> {
        Entity::create(json!({ "id": SeatId::new(), "row": "A", "occupied": false }))
            .expect("valid seat")
    }

    #[test]
    fn create_rejects_field_rule_failures() {
        let err = Entity::<Seat>::create(
            json!({ "id": SeatId::new(), "row": "", "occupied": false }),
        )
        .expect_err("must reject");
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn rejected_action_leaves_state_untouched() {
        let mut seat = create_seat();
        seat.handle(SeatCommand::Occupy).expect("commit");
        let err = seat.handle(SeatCommand::Occupy).expect_err("must reject");
        assert!(matches!(err, DomainError::InvalidStateTransition(_)));
        assert!(seat.state().occupied);
    }

    #[test]
    fn identity_is_stable_across_actions() {
        let mut seat = create_seat();
        let id = seat.id();
        seat.handle(SeatCommand::Occupy).expect("commit");
        seat.handle(SeatCommand::Release).expect("commit");
        assert_eq!(seat.id(), id);
    }

    #[test]
    fn serde_round_trip_revalidates() {
        let seat = create_seat();
        let value = serde_json::to_value(&seat).expect("serialize");
        assert_eq!(value["row"], "A");

        let mut tampered = value;
        tampered["row"] = json!("");
        assert!(serde_json::from_value::<Entity<Seat>>(tampered).is_err());
    }

    #[test]
    fn equality_is_by_identity() {
        let id = SeatId::new();
        let a = Entity::<Seat>::create(json!({ "id": id, "row": "A", "occupied": false }))
            .expect("valid");
        let b = Entity::<Seat>::create(json!({ "id": id, "row": "B", "occupied": true }))
            .expect("valid");
        assert_eq!(a, b);
        assert_ne!(a, create_seat());
    }
}
