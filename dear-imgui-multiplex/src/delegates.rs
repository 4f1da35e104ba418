//! Multicast callbacks with failure isolation
//!
//! A [`MulticastDelegate`] is an ordered list of listeners. Broadcasting calls
//! each of them in registration order; a listener that panics is logged and
//! skipped so the others still run and the frame still completes.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};

/// Identity of one registered listener, unique across all delegates
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, PartialOrd, Ord)]
pub struct DelegateId(u64);

impl DelegateId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        DelegateId(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    #[inline]
    pub const fn id(self) -> u64 {
        self.0
    }
}

/// Which delegate a handle was registered with
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq)]
pub enum DelegateCategory {
    /// Per-context draw delegate
    Default,
    /// Draw delegate shared by every context
    MultiContext,
    /// Module event fired before contexts are ticked
    PreUpdate,
    /// Module event fired after contexts are ticked
    PostUpdate,
}

/// Handle returned when registering through the module facade
///
/// Removal is routed by category, and for per-context delegates by context
/// name, so handles from different delegates never collide.
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub struct DelegateHandle {
    id: DelegateId,
    category: DelegateCategory,
    context: Option<String>,
}

impl DelegateHandle {
    pub(crate) fn new(id: DelegateId, category: DelegateCategory, context: Option<String>) -> Self {
        Self {
            id,
            category,
            context,
        }
    }

    pub fn id(&self) -> DelegateId {
        self.id
    }

    pub fn category(&self) -> DelegateCategory {
        self.category
    }

    /// Context name for per-context handles
    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }
}

type Listener<A> = Box<dyn FnMut(&mut A)>;

/// Ordered list of listeners receiving `&mut A`
pub struct MulticastDelegate<A: ?Sized> {
    listeners: Vec<(DelegateId, Listener<A>)>,
}

impl<A: ?Sized> Default for MulticastDelegate<A> {
    fn default() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }
}

impl<A: ?Sized> fmt::Debug for MulticastDelegate<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MulticastDelegate")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl<A: ?Sized> MulticastDelegate<A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener; it runs after every listener added before it
    pub fn add<F>(&mut self, listener: F) -> DelegateId
    where
        F: FnMut(&mut A) + 'static,
    {
        let id = DelegateId::next();
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener; returns whether it was registered here
    pub fn remove(&mut self, id: DelegateId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    pub fn contains(&self, id: DelegateId) -> bool {
        self.listeners.iter().any(|(listener_id, _)| *listener_id == id)
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    pub fn clear(&mut self) {
        self.listeners.clear();
    }

    /// Call every listener in order, isolating panics
    ///
    /// `origin` names the caller in the log when a listener fails. Returns the
    /// number of listeners that failed.
    pub fn broadcast(&mut self, origin: &str, arg: &mut A) -> usize {
        let mut failures = 0;
        for (id, listener) in &mut self.listeners {
            let result = panic::catch_unwind(AssertUnwindSafe(|| listener(&mut *arg)));
            if let Err(payload) = result {
                failures += 1;
                let message = panic_message(payload.as_ref());
                crate::multiplex_error!(
                    "Listener {:?} failed in '{}': {}",
                    id,
                    origin,
                    message
                );
                #[cfg(not(feature = "tracing"))]
                let _ = (id, origin, message);
            }
        }
        failures
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "<non-string panic payload>".to_owned()
    }
}
