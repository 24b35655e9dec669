//! Static bounds on visualization work.
//!
//! Nothing in the engine can be cancelled from the outside, so every recursive
//! or iterative path is capped by one of these constants. Hitting a cap
//! truncates silently.

/// Maximum number of children synthesized by one expansion.
pub const MAX_EXPAND_CHILDREN: usize = 50;

/// Maximum nesting of display-string formatting (and of `ExpandedItem` recursion).
pub const MAX_DISPLAY_DEPTH: usize = 10;

/// Maximum number of alias hops followed while resolving one type name.
pub const MAX_ALIAS_CHAIN: usize = 10;
