//! Aggregate container - invariant-checked state with event collection
//!
//! # Rustic DDD Design
//!
//! An aggregate follows the same principles as the rest of the crate:
//! - **Private state**: the committed state is never exposed mutably;
//!   reads go through a shared borrow
//! - **Valid by construction**: [`Aggregate::create`] validates raw input
//!   before an instance exists, so an invalid aggregate cannot be observed
//! - **Commit or discard**: every action runs against a draft copy of the
//!   state; the draft replaces the committed state only after every
//!   configured invariant holds
//!
//! # Three-phase mutation protocol
//!
//! [`Aggregate::handle`] drives each action through three phases:
//!
//! 1. **Propose** - clone the committed state and let the action mutate
//!    the draft freely; the action may reject outright (a business error)
//!    and may return an event payload
//! 2. **Verify** - run every invariant against the draft and confirm the
//!    identity field is unchanged
//! 3. **Commit** - swap the draft in and queue the event, or drop the
//!    draft and surface the error with the committed state untouched
//!
//! There is no partially-applied state: callers observe either the state
//! before the action or the fully verified state after it.

use serde::de::{DeserializeOwned, Error as DeError};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use validator::Validate;

use crate::error::DomainError;
use crate::events::EventEnvelope;
use crate::ids::Identifiable;
use crate::invariant::{check_all, Invariant};

/// Configuration of an aggregate: its state shape, command set, event set,
/// and invariants.
///
/// The `State` associated type is the schema: its `Deserialize` shape plus
/// its `Validate` rules define what raw input is acceptable. Commands are a
/// plain enum matched inside [`execute`](Self::execute), which keeps the
/// action table closed and argument types checked at compile time.
///
/// # Example
///
/// ```
/// use hexkit_domain::{define_id, AggregateType, DomainError, Identifiable, Invariant};
/// use serde::{Deserialize, Serialize};
/// use validator::Validate;
///
/// define_id!(TallyId);
///
/// #[derive(Debug, Clone, Serialize, Deserialize, Validate)]
/// pub struct TallyState {
///     pub id: TallyId,
///     pub count: i64,
/// }
///
/// impl Identifiable for TallyState {
///     type Id = TallyId;
///     fn id(&self) -> TallyId {
///         self.id
///     }
/// }
///
/// pub enum TallyCommand {
///     Add(i64),
/// }
///
/// #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// pub enum TallyEvent {
///     Added { amount: i64 },
/// }
///
/// pub struct Tally;
///
/// impl AggregateType for Tally {
///     type State = TallyState;
///     type Command = TallyCommand;
///     type Event = TallyEvent;
///
///     fn invariants() -> &'static [Invariant<TallyState>] {
///         const RULES: &[Invariant<TallyState>] = &[Invariant::new(
///             "count-not-negative",
///             |s| {
///                 if s.count < 0 {
///                     Err(format!("count is {}", s.count))
///                 } else {
///                     Ok(())
///                 }
///             },
///         )];
///         RULES
///     }
///
///     fn execute(
///         state: &mut TallyState,
///         command: TallyCommand,
///     ) -> Result<Option<TallyEvent>, DomainError> {
///         match command {
///             TallyCommand::Add(amount) => {
///                 state.count += amount;
///                 Ok(Some(TallyEvent::Added { amount }))
///             }
///         }
///     }
/// }
/// ```
pub trait AggregateType: Sized + 'static {
    /// The state shape. Its serde and `Validate` derives are the schema.
    type State: Clone + Serialize + DeserializeOwned + Validate + Identifiable;

    /// The closed set of actions, as a tagged enum.
    type Command;

    /// The events this aggregate can emit.
    type Event;

    /// Invariants checked at creation and after every action. May be empty.
    fn invariants() -> &'static [Invariant<Self::State>] {
        &[]
    }

    /// Applies a command to a draft of the state.
    ///
    /// The draft may be mutated freely; nothing is committed until the
    /// invariants pass. Returning an event payload queues it on commit.
    /// Returning an error rejects the action with the committed state
    /// untouched.
    fn execute(
        state: &mut Self::State,
        command: Self::Command,
    ) -> Result<Option<Self::Event>, DomainError>;
}

/// Identity type of an aggregate's state.
pub type AggregateId<A> = <<A as AggregateType>::State as Identifiable>::Id;

/// Event envelope type produced by an aggregate.
pub type AggregateEvent<A> = EventEnvelope<AggregateId<A>, <A as AggregateType>::Event>;

/// An identity-bearing state container with invariants and event emission.
///
/// Instances exist only in a valid state: creation validates, and every
/// action commits atomically or not at all. Emitted events queue on the
/// instance until drained with [`take_events`](Self::take_events).
pub struct Aggregate<A: AggregateType> {
    state: A::State,
    pending_events: Vec<AggregateEvent<A>>,
}

impl<A: AggregateType> Aggregate<A> {
    // =========================================================================
    // Construction
    // =========================================================================

    /// Creates an aggregate from raw input.
    ///
    /// Deserializes into the state shape (hydrating any embedded
    /// [`Entity`](crate::Entity) fields, whose own validation and
    /// invariants run during hydration), runs the schema's field rules,
    /// then runs this aggregate's invariants. Any failure propagates and
    /// no instance is produced.
    ///
    /// # Errors
    ///
    /// - [`DomainError::Malformed`] if the input does not deserialize
    /// - [`DomainError::Validation`] if a field rule fails
    /// - [`DomainError::InvariantViolation`] if an invariant fails
    pub fn create(raw: serde_json::Value) -> Result<Self, DomainError> {
        let state: A::State = serde_json::from_value(raw)?;
        Self::try_from_state(state)
    }

    /// Creates an aggregate from an already-typed state value.
    ///
    /// Runs the same field rules and invariants as [`create`](Self::create).
    pub fn try_from_state(state: A::State) -> Result<Self, DomainError> {
        state.validate()?;
        check_all(A::invariants(), &state)?;
        Ok(Self {
            state,
            pending_events: Vec::new(),
        })
    }

    // =========================================================================
    // Read Accessors
    // =========================================================================

    /// Returns the aggregate's identity.
    #[inline]
    pub fn id(&self) -> AggregateId<A> {
        self.state.id()
    }

    /// Returns a read-only view of the committed state.
    ///
    /// The borrow is immutable by construction; computed properties are
    /// inherent methods on the state type and are recomputed per call.
    #[inline]
    pub fn state(&self) -> &A::State {
        &self.state
    }

    // =========================================================================
    // Actions
    // =========================================================================

    /// Runs an action through the propose/verify/commit protocol.
    ///
    /// On any error the committed state is untouched - the draft the action
    /// mutated is dropped, and no event is queued.
    ///
    /// # Errors
    ///
    /// - whatever the action itself rejects with (typically
    ///   [`DomainError::InvalidStateTransition`])
    /// - [`DomainError::InvariantViolation`] if the proposed state breaks a rule
    /// - [`DomainError::IdentityChanged`] if the action rewrote the id field
    pub fn handle(&mut self, command: A::Command) -> Result<(), DomainError> {
        let mut draft = self.state.clone();
        let event = A::execute(&mut draft, command)?;
        check_all(A::invariants(), &draft)?;
        if draft.id() != self.state.id() {
            return Err(DomainError::identity_changed(format!(
                "{:?} cannot become {:?}",
                self.state.id(),
                draft.id()
            )));
        }
        self.state = draft;
        if let Some(payload) = event {
            self.pending_events
                .push(EventEnvelope::new(self.state.id(), payload));
        }
        Ok(())
    }

    // =========================================================================
    // Events
    // =========================================================================

    /// Returns the queued events without draining them.
    #[inline]
    pub fn pending_events(&self) -> &[AggregateEvent<A>] {
        &self.pending_events
    }

    /// Drains the queued events: returns them and leaves the queue empty.
    pub fn take_events(&mut self) -> Vec<AggregateEvent<A>> {
        std::mem::take(&mut self.pending_events)
    }

    /// Discards queued events without returning them.
    ///
    /// Used when the caller decides not to dispatch, e.g. after an external
    /// transaction aborts.
    pub fn clear_events(&mut self) {
        self.pending_events.clear();
    }
}

/// Aggregates of the same type are equal iff they carry the same identity.
impl<A: AggregateType> PartialEq for Aggregate<A> {
    fn eq(&self, other: &Self) -> bool {
        self.state.id() == other.state.id()
    }
}

impl<A: AggregateType> Eq for Aggregate<A> where AggregateId<A>: Eq {}

impl<A: AggregateType> std::fmt::Debug for Aggregate<A>
where
    A::State: std::fmt::Debug,
    A::Event: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Aggregate")
            .field("state", &self.state)
            .field("pending_events", &self.pending_events)
            .finish()
    }
}

// ============================================================================
// Serde Implementation
// ============================================================================

/// Serializes as the bare state shape. Pending events are transient and
/// are not persisted; drain them before storing the aggregate.
impl<A: AggregateType> Serialize for Aggregate<A> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.state.serialize(serializer)
    }
}

/// Deserializing re-enters the creation path, so an invalid aggregate can
/// never be revived from storage.
impl<'de, A: AggregateType> Deserialize<'de> for Aggregate<A> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let state = A::State::deserialize(deserializer)?;
        Self::try_from_state(state).map_err(DeError::custom)
    }
}

// ============================================================================
// Tests
// ============================================================================
