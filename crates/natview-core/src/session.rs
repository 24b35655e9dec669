//! # Visualizer Session
//!
//! Per-debug-session state and the host-facing entry points.
//!
//! A session owns everything that is only valid while one debuggee is being
//! inspected: the type-name to binding cache, the set of values whose display
//! text came from a rule, and the recursion counters. Drop the session when the
//! debug session ends; the shared [`VisualizerRegistry`] can outlive it.
//!
//! ## Entry points
//!
//! | Host request | Method |
//! |---|---|
//! | Which rule applies? | [`VisualizerSession::resolve`] |
//! | One-line summary | [`VisualizerSession::format_display`] |
//! | Child list | [`VisualizerSession::expand`] |
//! | UI visualizer label | [`VisualizerSession::ui_visualizer_name`] |
//!
//! None of them fail: errors inside are logged and the value is presented
//! natively instead.
//!
//! ## Thread Safety
//!
//! A session is used from the thread serving host requests and is not `Sync`.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::sync::Arc;

use crate::config::SessionConfig;
use crate::error::VisualizerResult;
use crate::registry::VisualizerRegistry;
use crate::resolver::VisualizerBinding;
use crate::substitute::substitute;
use crate::variable::{identity, VariableRef};

/// State for one debug session.
pub struct VisualizerSession
{
    pub(crate) registry: Arc<VisualizerRegistry>,
    pub(crate) config: SessionConfig,
    pub(crate) bindings: RefCell<HashMap<String, Arc<VisualizerBinding>>>,
    visualized: RefCell<HashMap<usize, VariableRef>>,
    pub(crate) display_depth: Cell<usize>,
    pub(crate) expand_depth: Cell<usize>,
}

impl std::fmt::Debug for VisualizerSession
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result
    {
        f.debug_struct("VisualizerSession")
            .field("config", &self.config)
            .field("cached_bindings", &self.bindings.borrow().len())
            .field("visualized", &self.visualized.borrow().len())
            .field("display_depth", &self.display_depth.get())
            .finish_non_exhaustive()
    }
}

impl VisualizerSession
{
    /// Start a session over a registry.
    #[must_use]
    pub fn new(registry: Arc<VisualizerRegistry>, config: SessionConfig) -> Self
    {
        Self {
            registry,
            config,
            bindings: RefCell::new(HashMap::new()),
            visualized: RefCell::new(HashMap::new()),
            display_depth: Cell::new(0),
            expand_depth: Cell::new(0),
        }
    }

    /// The registry this session resolves against.
    pub fn registry(&self) -> &Arc<VisualizerRegistry>
    {
        &self.registry
    }

    /// The session's configuration.
    pub fn config(&self) -> SessionConfig
    {
        self.config
    }

    /// Menu label of a registered UI visualizer (scans all loaded documents).
    pub fn ui_visualizer_name(&self, service_id: &str, id: u32) -> Option<String>
    {
        self.registry.ui_visualizer_name(service_id, id)
    }

    /// Whether `value`'s display text was produced by a rule in this session.
    pub fn is_tracked(&self, value: &VariableRef) -> bool
    {
        self.visualized.borrow().contains_key(&identity(value))
    }

    pub(crate) fn track(&self, value: &VariableRef)
    {
        self.visualized
            .borrow_mut()
            .entry(identity(value))
            .or_insert_with(|| VariableRef::clone(value));
    }

    /// Rewrite a rule template into an expression for `value` (no evaluation).
    pub fn get_expression(&self, template: &str, value: &VariableRef, binding: Option<&VisualizerBinding>) -> String
    {
        substitute(template, value, binding)
    }

    /// Rewrite a rule template and evaluate it in the context of `value`.
    ///
    /// ## Errors
    ///
    /// Returns [`crate::VisualizerError::Evaluation`] if the accessor rejects
    /// the rewritten expression.
    pub fn evaluate_expression(
        &self,
        template: &str,
        value: &VariableRef,
        binding: Option<&VisualizerBinding>,
    ) -> VisualizerResult<VariableRef>
    {
        let expression = substitute(template, value, binding);
        Ok(value.evaluate(&expression)?)
    }

    /// Rewrite, evaluate, and return the result's (possibly rule-formatted) text.
    ///
    /// ## Errors
    ///
    /// Returns [`crate::VisualizerError::Evaluation`] if the accessor rejects
    /// the rewritten expression.
    pub fn get_expression_value(
        &self,
        template: &str,
        value: &VariableRef,
        binding: Option<&VisualizerBinding>,
    ) -> VisualizerResult<String>
    {
        let result = self.evaluate_expression(template, value, binding)?;
        Ok(self.format_display(&result).text)
    }

    /// Evaluate a rule guard; an absent guard passes.
    ///
    /// A guard passes if its result reads as `true` or as an integer greater
    /// than zero. Evaluation failures count as a failed guard.
    pub(crate) fn guard_passes(
        &self,
        condition: Option<&str>,
        value: &VariableRef,
        binding: Option<&VisualizerBinding>,
    ) -> bool
    {
        let Some(condition) = condition.filter(|condition| !condition.trim().is_empty()) else {
            return true;
        };
        match self.evaluate_expression(condition, value, binding) {
            Ok(result) => is_truthy(&result.value()),
            Err(err) => {
                tracing::trace!(condition, error = %err, "guard evaluation failed");
                false
            }
        }
    }
}

/// Guard semantics: `true` (any case) or an integer greater than zero.
pub(crate) fn is_truthy(text: &str) -> bool
{
    let text = text.trim();
    if text.eq_ignore_ascii_case("true") {
        return true;
    }
    parse_integer(text).is_some_and(|number| number > 0)
}

/// Parse the leading token of a value's text as a signed integer.
pub(crate) fn parse_integer(text: &str) -> Option<i128>
{
    let token = text.split_whitespace().next()?;
    if let Some(hex) = token.strip_prefix("0x").or_else(|| token.strip_prefix("0X")) {
        return i128::from_str_radix(hex, 16).ok();
    }
    token.parse::<i128>().ok()
}

/// Parse the leading token of a value's text as an unsigned count.
pub(crate) fn parse_unsigned(text: &str) -> Option<u64>
{
    parse_integer(text).and_then(|number| u64::try_from(number).ok())
}
