//! # Visualizer Resolution
//!
//! Maps a value's runtime type name to the visualizer that applies to it.
//!
//! ## Algorithm
//!
//! For a parsed type name, repeated for at most `MAX_ALIAS_CHAIN` alias hops:
//!
//! 1. First visualizer (load order, then declaration order) whose pattern matches.
//! 2. If the name ends in `*` or `&`, the same search with one marker stripped.
//! 3. First alias whose pattern matches: its target, with `$T1..$Tn` replaced
//!    by the name's template arguments, is parsed and becomes the new name.
//!
//! If the chain is exhausted without a match, the value's immediate base class
//! is tried the same way, then its base, and so on.
//!
//! Successful resolutions are cached per session under the value's own type
//! name string. Values that are visualizer views carry their binding and skip
//! the search entirely.

use std::sync::Arc;

use tracing::{debug, trace};

use crate::definitions::VisualizerDefinition;
use crate::limits::MAX_ALIAS_CHAIN;
use crate::session::VisualizerSession;
use crate::substitute::{placeholder_index, replace_type_params};
use crate::types::TypeName;
use crate::variable::VariableRef;

/// Outcome of a successful resolution.
#[derive(Debug)]
pub struct VisualizerBinding
{
    visualizer: Arc<VisualizerDefinition>,
    type_name: String,
    type_args: Vec<String>,
}

impl VisualizerBinding
{
    fn new(visualizer: Arc<VisualizerDefinition>, matched: &TypeName) -> Self
    {
        Self {
            visualizer,
            type_name: matched.to_string(),
            type_args: matched.template_args(),
        }
    }

    /// The matched visualizer.
    pub fn visualizer(&self) -> &VisualizerDefinition
    {
        &self.visualizer
    }

    /// The type name the visualizer matched (after alias rewriting and pointer stripping).
    pub fn type_name(&self) -> &str
    {
        &self.type_name
    }

    /// Concrete template arguments, `$T1` first.
    pub fn type_args(&self) -> &[String]
    {
        &self.type_args
    }

    /// Concrete text bound to a `$T<n>` placeholder.
    pub fn type_param(&self, placeholder: &str) -> Option<&str>
    {
        placeholder_index(placeholder)
            .and_then(|index| self.type_args.get(index))
            .map(String::as_str)
    }
}

impl VisualizerSession
{
    /// Find the visualizer binding for a value.
    ///
    /// Returns `None` when no rule applies; that is not an error.
    pub fn resolve(&self, value: &VariableRef) -> Option<Arc<VisualizerBinding>>
    {
        if let Some(binding) = value.as_view().and_then(|view| view.binding()) {
            return Some(Arc::clone(binding));
        }

        let original = value.type_name();
        if let Some(binding) = self.cached(&original) {
            return Some(binding);
        }

        let mut current = Some(VariableRef::clone(value));
        while let Some(candidate) = current {
            let type_name = candidate.type_name();
            if let Some(binding) = self.resolve_type_name(&type_name) {
                if type_name != original {
                    trace!(type_name = %original, base = %type_name, "resolved through base class");
                    self.bindings.borrow_mut().insert(original, Arc::clone(&binding));
                }
                return Some(binding);
            }
            current = candidate.base_class();
        }

        trace!(type_name = %original, "no visualizer");
        None
    }

    /// Find the visualizer binding for a bare type name.
    ///
    /// This follows pointer stripping and aliases but, having no value, cannot
    /// fall back to base classes.
    pub fn resolve_type_name(&self, type_name: &str) -> Option<Arc<VisualizerBinding>>
    {
        if let Some(binding) = self.cached(type_name) {
            return Some(binding);
        }

        let Some(parsed) = TypeName::parse(type_name) else {
            debug!(type_name, "unparsable type name");
            return None;
        };
        let binding = Arc::new(self.search(parsed)?);
        self.bindings
            .borrow_mut()
            .insert(type_name.to_string(), Arc::clone(&binding));
        Some(binding)
    }

    fn cached(&self, type_name: &str) -> Option<Arc<VisualizerBinding>>
    {
        self.bindings.borrow().get(type_name).cloned()
    }

    fn search(&self, mut name: TypeName) -> Option<VisualizerBinding>
    {
        for hop in 0..=MAX_ALIAS_CHAIN {
            if let Some(visualizer) = self.registry.find_visualizer(&name) {
                return Some(VisualizerBinding::new(visualizer, &name));
            }
            if let Some(stripped) = name.strip_pointer() {
                if let Some(visualizer) = self.registry.find_visualizer(&stripped) {
                    return Some(VisualizerBinding::new(visualizer, &stripped));
                }
            }

            let target = self.registry.find_alias(&name)?;
            let rewritten = replace_type_params(&target, &name.template_args());
            trace!(hop, from = %name, to = %rewritten, "following alias");
            name = TypeName::parse(&rewritten)?;
        }

        debug!(limit = MAX_ALIAS_CHAIN, last = %name, "alias chain too long");
        None
    }
}
