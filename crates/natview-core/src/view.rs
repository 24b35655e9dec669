//! # View Wrappers
//!
//! Synthetic nodes that present an existing value under another identity.
//!
//! A wrapper forwards every data accessor (value text, children, address,
//! size, error flag, thread, access flags, evaluation) to the value it wraps
//! and overrides only the identity side:
//!
//! | Kind | Name | Full name | Visualized |
//! |---|---|---|---|
//! | Named | rule-provided (`[0]`, `count`) | inner | inner |
//! | Visualizer, rendered | `[Visualizer View]` | inner + `,viz` | yes |
//! | Visualizer, raw | `[Raw View]` | inner | no |
//!
//! Wrapping a wrapper wraps its inner value instead, so views never stack.

use std::rc::Rc;
use std::sync::Arc;

use crate::resolver::VisualizerBinding;
use crate::types::Address;
use crate::variable::{EvalError, Variable, VariableRef};

/// Display name of the synthetic rule-driven child.
pub const VISUALIZER_VIEW_NAME: &str = "[Visualizer View]";

/// Display name of the synthetic native-children child.
pub const RAW_VIEW_NAME: &str = "[Raw View]";

/// Suffix the host's evaluator understands as "show through the visualizer".
const RENDERED_SUFFIX: &str = ",viz";

/// Presentation of a visualizer view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode
{
    /// Children and summary come from the visualizer.
    Rendered,
    /// Native children only.
    Raw,
}

#[derive(Debug)]
enum ViewKind
{
    Named,
    Visualizer
    {
        binding: Option<Arc<VisualizerBinding>>,
        mode: ViewMode,
    },
}

/// A value shown under a different identity.
pub struct ViewWrapper
{
    inner: VariableRef,
    name: String,
    kind: ViewKind,
}

impl std::fmt::Debug for ViewWrapper
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result
    {
        f.debug_struct("ViewWrapper")
            .field("name", &self.name)
            .field("inner", &self.inner.full_name())
            .field("kind", &self.kind)
            .finish()
    }
}

impl ViewWrapper
{
    /// Present `value` under a rule-provided name.
    pub fn named(value: &VariableRef, name: impl Into<String>) -> VariableRef
    {
        Self::wrap(value, name.into(), ViewKind::Named)
    }

    /// The `[Visualizer View]` child of `value`.
    pub fn visualizer_view(value: &VariableRef, binding: Option<Arc<VisualizerBinding>>) -> VariableRef
    {
        Self::wrap(
            value,
            VISUALIZER_VIEW_NAME.to_string(),
            ViewKind::Visualizer {
                binding,
                mode: ViewMode::Rendered,
            },
        )
    }

    /// The `[Raw View]` child of `value`.
    pub fn raw_view(value: &VariableRef) -> VariableRef
    {
        Self::wrap(
            value,
            RAW_VIEW_NAME.to_string(),
            ViewKind::Visualizer {
                binding: None,
                mode: ViewMode::Raw,
            },
        )
    }

    fn wrap(value: &VariableRef, name: String, kind: ViewKind) -> VariableRef
    {
        let inner = match value.as_view() {
            Some(view) => VariableRef::clone(&view.inner),
            None => VariableRef::clone(value),
        };
        Rc::new(Self { inner, name, kind })
    }

    /// The wrapped value.
    pub fn inner(&self) -> &VariableRef
    {
        &self.inner
    }

    /// Binding carried by a rendered visualizer view.
    pub fn binding(&self) -> Option<&Arc<VisualizerBinding>>
    {
        match &self.kind {
            ViewKind::Visualizer { binding, .. } => binding.as_ref(),
            ViewKind::Named => None,
        }
    }

    /// Mode of a visualizer view; `None` for named wrappers.
    pub fn mode(&self) -> Option<ViewMode>
    {
        match self.kind {
            ViewKind::Visualizer { mode, .. } => Some(mode),
            ViewKind::Named => None,
        }
    }

    /// Whether this is a `[Visualizer View]` or `[Raw View]` node.
    pub fn is_synthetic(&self) -> bool
    {
        matches!(self.kind, ViewKind::Visualizer { .. })
    }
}

impl Variable for ViewWrapper
{
    fn name(&self) -> String
    {
        self.name.clone()
    }

    fn full_name(&self) -> String
    {
        let full_name = self.inner.full_name();
        match self.mode() {
            Some(ViewMode::Rendered) => format!("{full_name}{RENDERED_SUFFIX}"),
            _ => full_name,
        }
    }

    fn value(&self) -> String
    {
        self.inner.value()
    }

    fn type_name(&self) -> String
    {
        match self.binding() {
            Some(binding) => binding.type_name().to_string(),
            None => self.inner.type_name(),
        }
    }

    fn address(&self) -> Address
    {
        self.inner.address()
    }

    fn size(&self) -> u64
    {
        self.inner.size()
    }

    fn is_error(&self) -> bool
    {
        self.inner.is_error()
    }

    fn thread_id(&self) -> Option<u64>
    {
        self.inner.thread_id()
    }

    fn is_read_only(&self) -> bool
    {
        self.inner.is_read_only()
    }

    fn children(&self) -> Vec<VariableRef>
    {
        self.inner.children()
    }

    fn find_child(&self, name: &str) -> Option<VariableRef>
    {
        self.inner.find_child(name)
    }

    fn base_class(&self) -> Option<VariableRef>
    {
        self.inner.base_class()
    }

    fn evaluate(&self, expression: &str) -> Result<VariableRef, EvalError>
    {
        self.inner.evaluate(expression)
    }

    fn is_visualized(&self) -> bool
    {
        match self.mode() {
            Some(ViewMode::Rendered) => true,
            Some(ViewMode::Raw) => false,
            None => self.inner.is_visualized(),
        }
    }

    fn is_pre_rendered(&self) -> bool
    {
        self.inner.is_pre_rendered()
    }

    fn as_view(&self) -> Option<&ViewWrapper>
    {
        Some(self)
    }
}
