//! # Types
//!
//! Value types shared by every part of the engine: addresses read back from
//! pointer expressions, and structured type names used for rule matching.

pub mod address;
pub mod typename;

// Re-export all public types
pub use address::Address;
pub use typename::{QualifiedName, TypeName};
