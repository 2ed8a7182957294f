//! Typed port handles and the adapter registry
//!
//! A port is a declared capability contract; an adapter is the one
//! implementation currently bound to it. The registry owns the bindings:
//! the composition root declares ports and binds adapters at startup, and
//! use-case code resolves handles to `Arc<dyn Trait>` implementations on
//! demand. Binding is last-writer-wins; resolution never mutates except to
//! force a deferred factory exactly once.

use std::any::{type_name, Any};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::PortError;

/// Process-unique identifier allocated when a port is declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PortId(Uuid);

impl PortId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for PortId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A typed handle to a declared port.
///
/// The type parameter is the adapter's trait-object type (e.g.
/// `dyn Greeter`); it has no runtime representation and exists so that
/// binding and resolving the same handle agree on the adapter type at
/// compile time. Handles are `Copy` and remain valid until the registry
/// that declared them is reset.
pub struct Port<T: ?Sized> {
    id: PortId,
    _adapter: PhantomData<fn() -> T>,
}

impl<T: ?Sized> Port<T> {
    /// Returns the handle's identifier.
    pub fn id(&self) -> PortId {
        self.id
    }
}

impl<T: ?Sized> Clone for Port<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: ?Sized> Copy for Port<T> {}

impl<T: ?Sized> fmt::Debug for Port<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Port")
            .field("id", &self.id)
            .field("adapter", &type_name::<T>())
            .finish()
    }
}

/// Type-erased slot holding an `Arc<T>`.
type AdapterSlot = Box<dyn Any + Send + Sync>;

type BoxedFactory = Box<dyn FnOnce() -> AdapterSlot + Send>;

enum Binding {
    /// Adapter available immediately.
    Ready(AdapterSlot),
    /// Zero-argument factory, forced on the first resolve and then cached
    /// for the lifetime of the binding. The slot is emptied while the
    /// factory runs outside the registry locks; an empty slot marks the
    /// forcing as in flight. The mutex restores `Sync` for the boxed
    /// `FnOnce`; it is only ever accessed through the outer write lock.
    Deferred(Mutex<Option<BoxedFactory>>),
}

#[derive(Default)]
struct Inner {
    declared: HashSet<PortId>,
    bindings: HashMap<PortId, Binding>,
}

/// Registry of declared ports and their adapter bindings.
///
/// An explicit object rather than process-global state: create one at the
/// composition root and pass it (usually as `Arc<PortRegistry>`) to
/// whatever wires adapters. Internally lock-guarded, so a shared registry
/// is safe to declare/bind/resolve from multiple threads; bindings remain
/// last-writer-wins.
///
/// # Example
///
/// ```
/// # fn main() -> Result<(), hexkit_ports::PortError> {
/// use std::sync::Arc;
/// use hexkit_ports::PortRegistry;
///
/// trait Greeter: Send + Sync {
///     fn greet(&self, name: &str) -> String;
/// }
///
/// struct English;
/// impl Greeter for English {
///     fn greet(&self, name: &str) -> String {
///         format!("Hello, {name}!")
///     }
/// }
///
/// let registry = PortRegistry::new();
/// let greeter_port = registry.declare::<dyn Greeter>();
/// registry.bind(greeter_port, Arc::new(English) as Arc<dyn Greeter>)?;
///
/// let greeter = registry.resolve(greeter_port)?;
/// assert_eq!(greeter.greet("World"), "Hello, World!");
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct PortRegistry {
    inner: RwLock<Inner>,
}

impl PortRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a new port, returning its handle.
    ///
    /// Allocates a fresh identifier and records it; never fails. The
    /// handle is the only way to bind or resolve the port.
    pub fn declare<T: ?Sized + 'static>(&self) -> Port<T> {
        let id = PortId::new();
        self.inner.write().declared.insert(id);
        debug!(port = %id, adapter = type_name::<T>(), "declared port");
        Port {
            id,
            _adapter: PhantomData,
        }
    }

    /// Binds an adapter to a declared port, replacing any prior binding.
    ///
    /// # Errors
    ///
    /// [`PortError::Unregistered`] if the handle's identifier is not
    /// declared on this registry (never declared, or reset since).
    pub fn bind<T>(&self, port: Port<T>, adapter: Arc<T>) -> Result<(), PortError>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let mut inner = self.inner.write();
        if !inner.declared.contains(&port.id) {
            warn!(port = %port.id, "bind on unregistered port");
            return Err(PortError::Unregistered(port.id));
        }
        inner.bindings.insert(port.id, Binding::Ready(Box::new(adapter)));
        debug!(port = %port.id, adapter = type_name::<T>(), "bound adapter");
        Ok(())
    }

    /// Binds a deferred adapter factory to a declared port.
    ///
    /// For adapters whose construction depends on other ports: the factory
    /// runs on the first [`resolve`](Self::resolve) of this binding, after
    /// which the produced adapter is cached for the lifetime of the
    /// binding (re-binding replaces the cache). The factory is invoked at
    /// most once.
    ///
    /// # Errors
    ///
    /// [`PortError::Unregistered`] as for [`bind`](Self::bind).
    pub fn bind_with<T, F>(&self, port: Port<T>, factory: F) -> Result<(), PortError>
    where
        T: ?Sized + Send + Sync + 'static,
        F: FnOnce() -> Arc<T> + Send + 'static,
    {
        let mut inner = self.inner.write();
        if !inner.declared.contains(&port.id) {
            warn!(port = %port.id, "bind on unregistered port");
            return Err(PortError::Unregistered(port.id));
        }
        inner.bindings.insert(
            port.id,
            Binding::Deferred(Mutex::new(Some(Box::new(move || {
                Box::new(factory()) as AdapterSlot
            })))),
        );
        debug!(port = %port.id, adapter = type_name::<T>(), "bound deferred adapter");
        Ok(())
    }

    /// Resolves a port to its bound adapter.
    ///
    /// A deferred factory is forced with no registry lock held, so it may
    /// resolve other ports on this same registry. It must not resolve its
    /// own port - that cycle can never complete. If the binding is
    /// replaced (or the registry reset) while the factory runs, the newer
    /// binding wins; the caller still receives the adapter its factory
    /// produced. Should two threads race the first resolve, one forces the
    /// factory and the other waits for the cached result.
    ///
    /// # Errors
    ///
    /// - [`PortError::Unregistered`] if the identifier is not declared
    /// - [`PortError::Unbound`] if declared but nothing is bound
    pub fn resolve<T>(&self, port: Port<T>) -> Result<Arc<T>, PortError>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        loop {
            {
                let inner = self.inner.read();
                if !inner.declared.contains(&port.id) {
                    warn!(port = %port.id, "resolve on unregistered port");
                    return Err(PortError::Unregistered(port.id));
                }
                match inner.bindings.get(&port.id) {
                    Some(Binding::Ready(slot)) => return downcast::<T>(slot, port.id),
                    Some(Binding::Deferred(_)) => {} // claim below, under the write lock
                    None => {
                        warn!(port = %port.id, "resolve on unbound port");
                        return Err(PortError::Unbound(port.id));
                    }
                }
            }

            // Claim the factory, leaving the emptied slot in place as an
            // in-flight marker for concurrent resolvers.
            let claimed = {
                let mut inner = self.inner.write();
                if !inner.declared.contains(&port.id) {
                    return Err(PortError::Unregistered(port.id));
                }
                match inner.bindings.get_mut(&port.id) {
                    Some(Binding::Ready(slot)) => return downcast::<T>(slot, port.id),
                    Some(Binding::Deferred(cell)) => cell.get_mut().take(),
                    None => return Err(PortError::Unbound(port.id)),
                }
            };

            let Some(factory) = claimed else {
                // Another thread is forcing this binding; wait for its result.
                std::thread::yield_now();
                continue;
            };

            // No lock held here: the factory may re-enter the registry.
            let slot = factory();
            debug!(port = %port.id, "forced deferred adapter");
            let adapter = downcast::<T>(&slot, port.id);

            // Cache the result only if the emptied slot is still in place;
            // a re-bind or reset that happened meanwhile wins.
            let mut inner = self.inner.write();
            let mut still_claimed = false;
            if let Some(Binding::Deferred(cell)) = inner.bindings.get_mut(&port.id) {
                still_claimed = cell.get_mut().is_none();
            }
            if still_claimed {
                inner.bindings.insert(port.id, Binding::Ready(slot));
            }
            return adapter;
        }
    }

    /// Whether the identifier is currently declared.
    pub fn is_declared(&self, id: PortId) -> bool {
        self.inner.read().declared.contains(&id)
    }

    /// Clears all bindings and all declarations.
    ///
    /// Handles obtained before the reset become invalid: resolving them
    /// afterwards reports [`PortError::Unregistered`]. Safe to call on an
    /// empty registry. Intended for test isolation.
    pub fn reset(&self) {
        let mut inner = self.inner.write();
        let dropped = inner.declared.len();
        inner.declared.clear();
        inner.bindings.clear();
        debug!(ports = dropped, "registry reset");
    }
}

impl fmt::Debug for PortRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.read();
        f.debug_struct("PortRegistry")
            .field("declared", &inner.declared.len())
            .field("bound", &inner.bindings.len())
            .finish()
    }
}

fn downcast<T>(slot: &AdapterSlot, id: PortId) -> Result<Arc<T>, PortError>
where
    T: ?Sized + Send + Sync + 'static,
{
    slot.downcast_ref::<Arc<T>>()
        .cloned()
        .ok_or(PortError::AdapterTypeMismatch(id))
}

// ============================================================================
// Tests
// ============================================================================
