//! Wiring a small composition root: adapters that depend on other ports,
//! resolved through a shared registry.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use hexkit_ports::{PortError, PortRegistry};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("hexkit_ports=debug")
        .with_test_writer()
        .try_init();
}

trait Clock: Send + Sync {
    fn now(&self) -> u64;
}

trait Greeter: Send + Sync {
    fn greet(&self, name: &str) -> String;
}

struct FixedClock(u64);

impl Clock for FixedClock {
    fn now(&self) -> u64 {
        self.0
    }
}

/// Adapter that itself depends on another port.
struct TimestampedGreeter {
    clock: Arc<dyn Clock>,
}

impl Greeter for TimestampedGreeter {
    fn greet(&self, name: &str) -> String {
        format!("Hello, {name}! (at {})", self.clock.now())
    }
}

#[test]
fn adapters_can_depend_on_other_ports_via_deferred_binding() {
    init_tracing();
    let registry = Arc::new(PortRegistry::new());

    let clock_port = registry.declare::<dyn Clock>();
    let greeter_port = registry.declare::<dyn Greeter>();

    // Bind the greeter first: the deferred factory resolves its own
    // dependency only when the greeter is first used, so binding order
    // does not matter at the composition root.
    let wiring = Arc::clone(&registry);
    registry
        .bind_with(greeter_port, move || {
            let clock = wiring
                .resolve(clock_port)
                .expect("clock is bound before the greeter is first resolved");
            Arc::new(TimestampedGreeter { clock }) as Arc<dyn Greeter>
        })
        .expect("bind greeter");

    registry
        .bind(clock_port, Arc::new(FixedClock(42)) as Arc<dyn Clock>)
        .expect("bind clock");

    let greeter = registry.resolve(greeter_port).expect("resolve greeter");
    assert_eq!(greeter.greet("World"), "Hello, World! (at 42)");
}

#[test]
fn deferred_factories_run_once_even_when_shared_across_threads() {
    init_tracing();
    static CALLS: AtomicUsize = AtomicUsize::new(0);

    let registry = Arc::new(PortRegistry::new());
    let clock_port = registry.declare::<dyn Clock>();
    registry
        .bind_with(clock_port, || {
            CALLS.fetch_add(1, Ordering::SeqCst);
            Arc::new(FixedClock(7)) as Arc<dyn Clock>
        })
        .expect("bind clock");

    let mut handles = Vec::new();
    for _ in 0..8 {
        let registry = Arc::clone(&registry);
        handles.push(std::thread::spawn(move || {
            registry.resolve(clock_port).expect("resolve").now()
        }));
    }
    for handle in handles {
        assert_eq!(handle.join().expect("thread"), 7);
    }

    assert_eq!(CALLS.load(Ordering::SeqCst), 1);
}

#[test]
fn reset_isolates_test_cases_from_one_another() {
    init_tracing();
    let registry = PortRegistry::new();

    // "Test case one" wires and uses a port.
    let port = registry.declare::<dyn Clock>();
    registry
        .bind(port, Arc::new(FixedClock(1)) as Arc<dyn Clock>)
        .expect("bind");
    assert_eq!(registry.resolve(port).expect("resolve").now(), 1);

    // Isolation boundary.
    registry.reset();

    // The stale handle is invalid, not silently rebindable.
    assert!(matches!(
        registry.resolve(port),
        Err(PortError::Unregistered(_))
    ));
    assert!(matches!(
        registry.bind(port, Arc::new(FixedClock(2)) as Arc<dyn Clock>),
        Err(PortError::Unregistered(_))
    ));

    // "Test case two" starts clean.
    let fresh = registry.declare::<dyn Clock>();
    registry
        .bind(fresh, Arc::new(FixedClock(2)) as Arc<dyn Clock>)
        .expect("bind");
    assert_eq!(registry.resolve(fresh).expect("resolve").now(), 2);
}
