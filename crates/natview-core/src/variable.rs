//! # Variable Accessor
//!
//! The engine never reads target memory itself. Everything it knows about a
//! live value comes through the [`Variable`] trait, which the host debugger
//! implements on top of its own expression evaluator.
//!
//! ## Why a trait?
//!
//! - The same rules drive GDB/LLDB backends, core-dump readers and test doubles
//! - The engine stays free of any process-control or symbol-reading code
//!
//! Values are shared as [`VariableRef`] (`Rc<dyn Variable>`): one host request
//! runs on one thread, and wrappers produced by the engine hold a reference to
//! the value they decorate rather than owning it.

use std::rc::Rc;

use thiserror::Error;

use crate::types::Address;
use crate::view::ViewWrapper;

/// Shared handle to a live value.
pub type VariableRef = Rc<dyn Variable>;

/// Failure reported by the variable accessor.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EvalError
{
    /// The evaluator rejected or could not compute an expression
    #[error("cannot evaluate `{expression}`: {reason}")]
    Failed
    {
        /// Expression as handed to the evaluator
        expression: String,
        /// Evaluator's explanation
        reason: String,
    },

    /// A value has no member with the requested name
    #[error("no member named `{0}`")]
    NoMember(String),
}

/// A live value in the debuggee, as seen by the visualization engine.
///
/// Data-bearing accessors (`value`, `children`, `address`, ...) describe the
/// value itself; identity accessors (`name`, `full_name`, `is_visualized`) are
/// the ones [`ViewWrapper`] overrides to present alternate views.
pub trait Variable
{
    /// Display name shown in the host's variable tree (`size`, `[0]`).
    fn name(&self) -> String;

    /// Fully qualified expression that re-evaluates to this value (`list.head->next`).
    fn full_name(&self) -> String;

    /// Native display text (`3`, `0x1000`, `{...}`).
    fn value(&self) -> String;

    /// Runtime type name as reported by the debugger.
    fn type_name(&self) -> String;

    /// Address of the value in target memory.
    fn address(&self) -> Address;

    /// Size of the value in bytes.
    fn size(&self) -> u64;

    /// Whether the value is an evaluation error placeholder.
    fn is_error(&self) -> bool;

    /// Thread the value was read on, if the host tracks it.
    fn thread_id(&self) -> Option<u64>
    {
        None
    }

    /// Whether the host forbids editing the value.
    fn is_read_only(&self) -> bool
    {
        false
    }

    /// Direct (native) children.
    fn children(&self) -> Vec<VariableRef>;

    /// Direct child with the given display name.
    fn find_child(&self, name: &str) -> Option<VariableRef>
    {
        self.children().into_iter().find(|child| child.name() == name)
    }

    /// Immediate base-class sub-object, if the type has one.
    fn base_class(&self) -> Option<VariableRef>
    {
        None
    }

    /// Evaluate an expression synchronously in the context of this value.
    ///
    /// ## Errors
    ///
    /// Returns an [`EvalError`] if the host evaluator rejects the expression.
    fn evaluate(&self, expression: &str) -> Result<VariableRef, EvalError>;

    /// Whether the value should be presented through its visualizer.
    fn is_visualized(&self) -> bool
    {
        false
    }

    /// Whether the host already rendered this value's display text.
    fn is_pre_rendered(&self) -> bool
    {
        false
    }

    /// Downcast to the engine's view wrapper.
    fn as_view(&self) -> Option<&ViewWrapper>
    {
        None
    }
}

/// Identity key for a shared value (pointer identity, not structural equality).
pub(crate) fn identity(value: &VariableRef) -> usize
{
    Rc::as_ptr(value).cast::<()>() as usize
}

/// Address a pointer-valued variable points at, read from its display text.
///
/// Unreadable text counts as null so traversal stops instead of wandering.
pub(crate) fn pointee_address(value: &VariableRef) -> Address
{
    Address::parse_leading(&value.value()).unwrap_or(Address::ZERO)
}
