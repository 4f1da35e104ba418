//! Thread-current context tracking
//!
//! The GUI library keeps one "current" context per thread. Every proxy owns a
//! [`ContextToken`]; making a proxy current swaps the token stored here and the
//! library's own pointer together, so code can check which proxy is active
//! before touching a widget tree.

use std::cell::Cell;
use std::num::NonZeroU64;
use std::sync::atomic::{AtomicU64, Ordering};

/// Identity of one GUI context
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq)]
pub struct ContextToken(NonZeroU64);

impl ContextToken {
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        let id = NEXT.fetch_add(1, Ordering::Relaxed);
        // The counter starts at one and a u64 will not wrap in practice
        ContextToken(NonZeroU64::new(id).unwrap_or(NonZeroU64::MIN))
    }

    #[inline]
    pub fn id(self) -> u64 {
        self.0.get()
    }
}

thread_local! {
    static CURRENT: Cell<Option<ContextToken>> = const { Cell::new(None) };
}

/// Token of the context that is current on this thread
pub fn current() -> Option<ContextToken> {
    CURRENT.with(Cell::get)
}

/// Whether `token` is the current context on this thread
#[inline]
pub fn is_current(token: ContextToken) -> bool {
    current() == Some(token)
}

/// Replace the current context, returning the previous one
pub(crate) fn set_current(token: Option<ContextToken>) -> Option<ContextToken> {
    CURRENT.with(|current| current.replace(token))
}

/// Debug-build check that `token` is current before touching its widget tree
#[inline]
pub(crate) fn debug_assert_current(token: ContextToken) {
    debug_assert!(
        is_current(token),
        "context {:?} is not current on this thread (current: {:?})",
        token,
        current()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_are_unique() {
        let a = ContextToken::next();
        let b = ContextToken::next();
        assert_ne!(a, b);
    }

    #[test]
    fn test_set_current_swaps() {
        let a = ContextToken::next();
        let b = ContextToken::next();

        let before = set_current(Some(a));
        assert!(is_current(a));

        assert_eq!(set_current(Some(b)), Some(a));
        assert!(is_current(b));
        assert!(!is_current(a));

        set_current(before);
    }

    #[test]
    fn test_current_is_per_thread() {
        let a = ContextToken::next();
        let before = set_current(Some(a));
        let other = std::thread::spawn(current).join().unwrap();
        assert_eq!(other, None);
        set_current(before);
    }
}
