//! Phase registry
//!
//! Holds the three ordered sequences of registered functions. Insertion
//! order is execution order and entries are never deduplicated.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;
use std::sync::Once;

use super::console::Console;
use super::outcome::{IntoOutcome, Outcome};

/// Phase a function is registered for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhaseKind {
    Setup,
    Test,
    Teardown,
}

impl PhaseKind {
    /// Human-readable verb used on the start line
    pub fn verb(self) -> &'static str {
        match self {
            PhaseKind::Setup => "Running setup",
            PhaseKind::Test => "Running test",
            PhaseKind::Teardown => "Running teardown",
        }
    }
}

impl fmt::Display for PhaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhaseKind::Setup => write!(f, "setup"),
            PhaseKind::Test => write!(f, "test"),
            PhaseKind::Teardown => write!(f, "teardown"),
        }
    }
}

type Procedure = Box<dyn Fn() -> Outcome>;

struct Entry {
    kind: PhaseKind,
    name: String,
    procedure: Procedure,
}

/// Handle to a registered function
///
/// Cloning the handle does not register the function again. Invoking it
/// runs the function standalone with the same reporting as a phase run.
#[derive(Clone)]
pub struct Registered {
    entry: Rc<Entry>,
    console: Rc<RefCell<Console>>,
}

impl Registered {
    pub fn kind(&self) -> PhaseKind {
        self.entry.kind
    }

    pub fn name(&self) -> &str {
        &self.entry.name
    }

    /// Invoke the function, print its status and return the outcome
    ///
    /// Panics inside the function are caught and reported as failures.
    pub fn invoke(&self) -> Outcome {
        let entry = &self.entry;
        self.console.borrow_mut().start(entry.kind, &entry.name);
        tracing::debug!(phase = %entry.kind, name = %entry.name, "invoking");

        let outcome = match catch_quietly(|| (entry.procedure)()) {
            Ok(outcome) => outcome,
            Err(payload) => Outcome::from_panic(payload.as_ref()),
        };

        tracing::debug!(phase = %entry.kind, name = %entry.name, %outcome, "finished");
        self.console.borrow_mut().finish(&outcome);
        outcome
    }
}

impl fmt::Debug for Registered {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registered")
            .field("kind", &self.entry.kind)
            .field("name", &self.entry.name)
            .finish()
    }
}

/// Three ordered sequences of registered functions
pub struct Registry {
    console: Rc<RefCell<Console>>,
    setups: Vec<Registered>,
    tests: Vec<Registered>,
    teardowns: Vec<Registered>,
}

impl Registry {
    pub fn new(console: Rc<RefCell<Console>>) -> Self {
        Self {
            console,
            setups: Vec::new(),
            tests: Vec::new(),
            teardowns: Vec::new(),
        }
    }

    /// Append a function to the sequence of `kind`
    ///
    /// Without a name the function's own identifier is displayed.
    pub fn register<F, R>(&mut self, kind: PhaseKind, name: Option<&str>, function: F) -> Registered
    where
        F: Fn() -> R + 'static,
        R: IntoOutcome,
    {
        let name = match name {
            Some(name) => name.to_string(),
            None => identifier_of::<F>(),
        };
        let handle = Registered {
            entry: Rc::new(Entry {
                kind,
                name,
                procedure: Box::new(move || function().into_outcome()),
            }),
            console: Rc::clone(&self.console),
        };
        tracing::trace!(phase = %kind, name = %handle.name(), "registered");
        self.sequence_mut(kind).push(handle.clone());
        handle
    }

    /// Registered functions of one phase in execution order
    pub fn sequence(&self, kind: PhaseKind) -> &[Registered] {
        match kind {
            PhaseKind::Setup => &self.setups,
            PhaseKind::Test => &self.tests,
            PhaseKind::Teardown => &self.teardowns,
        }
    }

    fn sequence_mut(&mut self, kind: PhaseKind) -> &mut Vec<Registered> {
        match kind {
            PhaseKind::Setup => &mut self.setups,
            PhaseKind::Test => &mut self.tests,
            PhaseKind::Teardown => &mut self.teardowns,
        }
    }
}

thread_local! {
    static CAPTURING: Cell<bool> = const { Cell::new(false) };
}

static QUIET_HOOK: Once = Once::new();

/// Run `f`, catching a panic without the default hook printing it
///
/// Panics on other threads, or outside an invocation, still reach the
/// previously installed hook.
fn catch_quietly<R>(f: impl FnOnce() -> R) -> std::thread::Result<R> {
    QUIET_HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if CAPTURING.with(Cell::get) {
                tracing::debug!(%info, "registered function panicked");
            } else {
                previous(info);
            }
        }));
    });

    let outer = CAPTURING.with(|capturing| capturing.replace(true));
    let result = panic::catch_unwind(AssertUnwindSafe(f));
    CAPTURING.with(|capturing| capturing.set(outer));
    result
}

/// Last meaningful path segment of a callable's type name
///
/// `my_crate::checks::env_is_set` becomes `env_is_set`; closures are named
/// after the function that defines them.
fn identifier_of<F>() -> String {
    let full = std::any::type_name::<F>();
    let path = full.split('<').next().unwrap_or(full);
    path.split("::")
        .filter(|segment| !segment.is_empty() && !segment.starts_with("{{"))
        .last()
        .unwrap_or(full)
        .to_string()
}
