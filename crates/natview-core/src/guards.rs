//! # RAII Depth Guards
//!
//! Formatting and `ExpandedItem` expansion can re-enter themselves through
//! user-authored rules (`{*this}`, `<ExpandedItem>*this</ExpandedItem>`). The
//! guard here bumps a per-session counter on entry and restores it on drop, so
//! every exit path (early return, `?`, panic unwinding) releases its level.
//!
//! ```rust,ignore
//! let Some(_guard) = DepthGuard::enter(&self.display_depth, MAX_DISPLAY_DEPTH) else {
//!     return raw;
//! };
//! // formatting work; nested calls see depth + 1
//! ```

use std::cell::Cell;

/// Holds one level of a recursion counter until dropped.
#[derive(Debug)]
pub(crate) struct DepthGuard<'a>
{
    counter: &'a Cell<usize>,
}

impl<'a> DepthGuard<'a>
{
    /// Take one level, or `None` if `limit` levels are already held.
    pub(crate) fn enter(counter: &'a Cell<usize>, limit: usize) -> Option<Self>
    {
        let depth = counter.get();
        if depth >= limit {
            return None;
        }
        counter.set(depth + 1);
        Some(Self { counter })
    }
}

impl Drop for DepthGuard<'_>
{
    fn drop(&mut self)
    {
        self.counter.set(self.counter.get().saturating_sub(1));
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_guard_restores_counter()
    {
        let counter = Cell::new(0);
        {
            let _outer = DepthGuard::enter(&counter, 2).unwrap();
            let _inner = DepthGuard::enter(&counter, 2).unwrap();
            assert_eq!(counter.get(), 2);
            assert!(DepthGuard::enter(&counter, 2).is_none());
        }
        assert_eq!(counter.get(), 0);
    }
}
