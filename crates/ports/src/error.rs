//! Registry error types
//!
//! Registry failures are programming errors (a miswired composition root),
//! kept distinct from the business errors of `hexkit-domain` so calling
//! code can branch on kind rather than message text.

use thiserror::Error;

use crate::registry::PortId;

/// Errors raised by [`PortRegistry`](crate::PortRegistry) operations.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PortError {
    /// The handle's identifier was never declared on this registry, or a
    /// reset invalidated it.
    #[error("invalid or unregistered port: {0}")]
    Unregistered(PortId),

    /// The port is declared but nothing is bound to it. Surfaces at first
    /// use, pointing at a missing binding in the composition root.
    #[error("no adapter bound for port {0}, did you forget to bind one?")]
    Unbound(PortId),

    /// The bound adapter does not match the requested type. Unreachable
    /// through the typed `Port<T>` API; reported instead of panicking.
    #[error("adapter bound for port {0} does not match the requested type")]
    AdapterTypeMismatch(PortId),
}
