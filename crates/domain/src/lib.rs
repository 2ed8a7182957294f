//! Hexkit Domain - building blocks for invariant-checked domain models
//!
//! This crate provides the state-container half of hexkit: generic
//! aggregate, entity, and value object containers whose instances are
//! valid by construction and mutate through an atomic
//! propose/verify/commit protocol.
//!
//! - [`Aggregate`]: identity, invariants, and domain-event collection
//! - [`Entity`]: identity and invariants, no events; nestable inside an
//!   aggregate's state with hydration/dehydration via serde
//! - [`ValueObject`]: no identity, compared structurally
//! - [`Invariant`]: named business rules re-checked after every mutation;
//!   a failed check discards the proposed state entirely
//! - [`define_id!`]: branded UUID-backed identifier newtypes
//!
//! A container's schema is its state type's `Deserialize` shape plus its
//! `validator::Validate` rules; creation rejects raw input that fails
//! either, so an invalid instance never exists.
//!
//! # Concurrency
//!
//! Containers are plain single-owner values with no interior mutability.
//! Share one across threads only behind external synchronization.
//!
//! The port-registry half of hexkit lives in `hexkit-ports`; the two
//! crates are composed by application code and never call each other.

pub mod aggregate;
pub mod entity;
pub mod error;
pub mod events;
pub mod ids;
pub mod invariant;
pub mod value_object;

pub use aggregate::{Aggregate, AggregateEvent, AggregateId, AggregateType};
pub use entity::{Entity, EntityId, EntityType};
pub use error::DomainError;
pub use events::EventEnvelope;
pub use ids::Identifiable;
pub use invariant::{check_all, Invariant};
pub use value_object::{ValueObject, ValueObjectType};

// Re-exported for the define_id! macro expansion.
pub use uuid::Uuid;
