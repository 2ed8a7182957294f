//! Hexkit Ports - typed port handles and an adapter registry
//!
//! The dependency-injection half of hexkit. A **port** is a declared
//! capability contract (a trait); an **adapter** is the concrete
//! implementation bound to it. Use-case code depends on `Port<dyn Trait>`
//! handles and resolves them through the registry, never on concrete
//! adapter types.
//!
//! ## Architecture Role
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │ COMPOSITION ROOT (process start)                         │
//! │   let registry = Arc::new(PortRegistry::new());          │
//! │   let clock = registry.declare::<dyn Clock>();           │
//! │   registry.bind(clock, Arc::new(SystemClock))?;          │
//! └──────────────────────────┬───────────────────────────────┘
//!                            │ handles + Arc<PortRegistry>
//! ┌──────────────────────────▼───────────────────────────────┐
//! │ USE CASES (later, on demand)                             │
//! │   let clock = registry.resolve(clock)?;                  │
//! │   clock.now()                                            │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! All operations are synchronous and in-memory; adapters that perform
//! I/O keep that concern entirely on their side of the trait.
//!
//! ## Concurrency
//!
//! The registry is internally lock-guarded (`Send + Sync`); declare, bind,
//! and resolve are safe from multiple threads, with last-writer-wins
//! binding semantics. Deferred factories run at most once per binding.
//!
//! ## Failure semantics
//!
//! Every fallible operation returns a [`PortError`] synchronously; nothing
//! is retried or deferred. An [`Unbound`](PortError::Unbound) resolve is a
//! composition-root bug surfaced at first use.

pub mod error;
pub mod registry;

pub use error::PortError;
pub use registry::{Port, PortId, PortRegistry};
