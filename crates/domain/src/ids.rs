//! Branded identifier types
//!
//! [`define_id!`] mints a UUID-backed newtype per entity kind so that ids
//! for different containers are never interchangeable. [`Identifiable`]
//! ties a state shape to its id type; aggregates and entities require it.

use std::fmt;

/// Defines a branded, UUID-backed identifier newtype.
///
/// The generated type is `Copy`, hashable, serde-enabled, and parseable
/// from its string form (parse failures map to
/// [`DomainError::InvalidId`](crate::DomainError::InvalidId)).
///
/// Callers must have `serde` and `uuid` available as dependencies.
///
/// # Examples
///
/// ```
/// use hexkit_domain::define_id;
///
/// define_id!(OrderId);
///
/// let id = OrderId::new();
/// let parsed: OrderId = id.to_string().parse().unwrap();
/// assert_eq!(id, parsed);
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize,
        )]
        pub struct $name($crate::Uuid);

        impl $name {
            pub fn new() -> Self {
                Self($crate::Uuid::new_v4())
            }

            pub fn from_uuid(uuid: $crate::Uuid) -> Self {
                Self(uuid)
            }

            pub fn as_uuid(&self) -> &$crate::Uuid {
                &self.0
            }

            pub fn to_uuid(self) -> $crate::Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = $crate::DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.parse::<$crate::Uuid>()
                    .map(Self)
                    .map_err(|e| $crate::DomainError::invalid_id(format!("{s}: {e}")))
            }
        }

        impl From<$crate::Uuid> for $name {
            fn from(value: $crate::Uuid) -> Self {
                Self(value)
            }
        }

        impl From<$name> for $crate::Uuid {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

/// A state shape with a stable identity.
///
/// Implemented by aggregate and entity state types. The id value is fixed
/// at creation; any action that produces a draft with a different id is
/// rejected at commit time.
pub trait Identifiable {
    /// The identity type, typically a [`define_id!`] newtype.
    type Id: Clone + PartialEq + fmt::Debug;

    /// Returns the identity value.
    fn id(&self) -> Self::Id;
}
