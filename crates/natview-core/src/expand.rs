//! # Expansion Engine
//!
//! Builds the child list a host shows under a value.
//!
//! ## Entry
//!
//! | Value | Children |
//! |---|---|
//! | visualized (or immediate mode), with `Expand` rules | rule children, then `[Raw View]` |
//! | not visualized, with `Expand` rules | `[Visualizer View]`, then native children |
//! | no `Expand` rules | native children |
//!
//! View nodes never get another `[Visualizer View]` or `[Raw View]` child, and
//! `HideRawView` drops the trailing raw view. If the rules produce nothing the
//! native children are shown instead.
//!
//! ## Rule kinds
//!
//! Rules run in document order and their children are concatenated, up to
//! [`MAX_EXPAND_CHILDREN`] in total. An `ArrayItems` whose size does not parse
//! is dropped on its own; `TreeItems`, `LinkedListItems` and `IndexListItems`
//! read an unparsable size as zero. Any other failure abandons the rule
//! children and the native children are returned.

use std::sync::Arc;

use tracing::{debug, trace, warn};

use crate::config::ExpansionMode;
use crate::definitions::{
    ArrayItemsRule, ExpandRule, ExpandRules, ExpandedItemRule, IndexListItemsRule, ItemRule, LinkedListItemsRule,
    TreeItemsRule,
};
use crate::error::{VisualizerError, VisualizerResult};
use crate::guards::DepthGuard;
use crate::limits::{MAX_DISPLAY_DEPTH, MAX_EXPAND_CHILDREN};
use crate::resolver::VisualizerBinding;
use crate::session::{parse_unsigned, VisualizerSession};
use crate::substitute::replace_index;
use crate::traverse::{walk_list, walk_tree, NodeStep};
use crate::variable::{pointee_address, EvalError, VariableRef};
use crate::view::{ViewMode, ViewWrapper};

/// How to turn a tree or list node into the value shown for it.
///
/// Chosen once from the head node, then applied to every node.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ValueAccessor
{
    /// The node itself.
    This,
    /// A direct field of the node.
    Child(String),
    /// An expression evaluated against the node.
    Expression(String),
}

impl ValueAccessor
{
    fn select(template: &str, head: &VariableRef) -> Self
    {
        let template = template.trim();
        if template == "this" {
            Self::This
        } else if head.find_child(template).is_some() {
            Self::Child(template.to_string())
        } else {
            Self::Expression(template.to_string())
        }
    }

    fn read(
        &self,
        session: &VisualizerSession,
        node: &VariableRef,
        binding: &VisualizerBinding,
    ) -> VisualizerResult<VariableRef>
    {
        match self {
            Self::This => Ok(VariableRef::clone(node)),
            Self::Child(name) => Ok(node
                .find_child(name)
                .ok_or_else(|| EvalError::NoMember(name.clone()))?),
            Self::Expression(template) => session.evaluate_expression(template, node, Some(binding)),
        }
    }
}

impl VisualizerSession
{
    /// Children to show under `value`.
    ///
    /// Never fails: on any error the value's native children are returned.
    pub fn expand(&self, value: &VariableRef) -> Vec<VariableRef>
    {
        match self.try_expand(value) {
            Ok(children) => children,
            Err(err) => {
                warn!(name = %value.full_name(), error = %err, "expansion fell back to native children");
                value.children()
            }
        }
    }

    fn try_expand(&self, value: &VariableRef) -> VisualizerResult<Vec<VariableRef>>
    {
        let view_mode = value.as_view().and_then(ViewWrapper::mode);
        let immediate = self.config.expansion == ExpansionMode::Immediate && view_mode != Some(ViewMode::Raw);

        let Some(binding) = self.resolve(value) else {
            return Ok(value.children());
        };
        let Some(rules) = binding.visualizer().expand.as_ref() else {
            return Ok(value.children());
        };

        if value.is_visualized() || immediate {
            let mut children = self.rule_children(&unwrapped(value), &binding, rules)?;
            if children.is_empty() {
                return Ok(value.children());
            }
            if view_mode.is_none() && !rules.hide_raw_view {
                children.push(ViewWrapper::raw_view(value));
            }
            return Ok(children);
        }

        if view_mode.is_some() {
            return Ok(value.children());
        }
        let mut children = vec![ViewWrapper::visualizer_view(value, Some(Arc::clone(&binding)))];
        children.extend(value.children());
        Ok(children)
    }

    fn rule_children(
        &self,
        target: &VariableRef,
        binding: &VisualizerBinding,
        rules: &ExpandRules,
    ) -> VisualizerResult<Vec<VariableRef>>
    {
        let mut children = Vec::new();
        for rule in &rules.items {
            if children.len() >= MAX_EXPAND_CHILDREN {
                break;
            }
            let produced = match rule {
                ExpandRule::Item(item) => self.expand_item(item, target, binding),
                ExpandRule::ArrayItems(items) => self.expand_array(items, target, binding),
                ExpandRule::TreeItems(items) => self.expand_tree(items, target, binding),
                ExpandRule::LinkedListItems(items) => self.expand_list(items, target, binding),
                ExpandRule::IndexListItems(items) => self.expand_index_list(items, target, binding),
                ExpandRule::ExpandedItem(item) => self.expand_expanded_item(item, target, binding),
            };
            match produced {
                Ok(produced) => children.extend(produced),
                Err(VisualizerError::InvalidSize(reason)) => {
                    debug!(kind = rule.kind(), %reason, "skipping expand item");
                }
                Err(err) => return Err(err),
            }
        }
        children.truncate(MAX_EXPAND_CHILDREN);
        Ok(children)
    }

    fn passes(&self, condition: Option<&String>, target: &VariableRef, binding: &VisualizerBinding) -> bool
    {
        self.guard_passes(condition.map(String::as_str), target, Some(binding))
    }

    fn expand_item(
        &self,
        item: &ItemRule,
        target: &VariableRef,
        binding: &VisualizerBinding,
    ) -> VisualizerResult<Vec<VariableRef>>
    {
        if !self.passes(item.condition.as_ref(), target, binding) {
            return Ok(Vec::new());
        }
        let result = self.evaluate_expression(&item.expression, target, Some(binding))?;
        let name = item.name.as_deref().unwrap_or(item.expression.trim());
        Ok(vec![ViewWrapper::named(&result, name)])
    }

    fn expand_array(
        &self,
        items: &ArrayItemsRule,
        target: &VariableRef,
        binding: &VisualizerBinding,
    ) -> VisualizerResult<Vec<VariableRef>>
    {
        if !self.passes(items.condition.as_ref(), target, binding) {
            return Ok(Vec::new());
        }
        let Some(size) = items
            .sizes
            .iter()
            .find(|size| self.passes(size.condition.as_ref(), target, binding))
        else {
            return Ok(Vec::new());
        };
        let size_text = self.evaluate_expression(&size.expression, target, Some(binding))?.value();
        let count = parse_unsigned(&size_text)
            .map(clamp)
            .ok_or_else(|| VisualizerError::InvalidSize(format!("`{}` evaluated to \"{size_text}\"", size.expression)))?;
        if count == 0 {
            return Ok(Vec::new());
        }

        for candidate in &items.value_pointers {
            if !self.passes(candidate.condition.as_ref(), target, binding) {
                continue;
            }
            let pointer_expression = self.get_expression(&candidate.expression, target, Some(binding));
            let pointer = match target.evaluate(&pointer_expression) {
                Ok(pointer) => pointer,
                Err(err) => {
                    trace!(expression = %pointer_expression, error = %err, "value pointer candidate failed");
                    continue;
                }
            };
            let pointer_type = pointer.type_name();
            let Some(element_type) = element_type(&pointer_type) else {
                trace!(expression = %pointer_expression, "value pointer has no element type");
                continue;
            };

            let array_expression = format!("({element_type}[{count}])*({pointer_expression})");
            match target.evaluate(&array_expression) {
                Ok(array) => return Ok(array.children().into_iter().take(count).collect()),
                Err(err) => trace!(expression = %array_expression, error = %err, "array view failed"),
            }
        }
        Ok(Vec::new())
    }

    fn expand_tree(
        &self,
        items: &TreeItemsRule,
        target: &VariableRef,
        binding: &VisualizerBinding,
    ) -> VisualizerResult<Vec<VariableRef>>
    {
        if !self.passes(items.condition.as_ref(), target, binding) {
            return Ok(Vec::new());
        }
        let size = self.read_count(&items.size, target, binding)?;
        let head = self.evaluate_expression(&items.head_pointer, target, Some(binding))?;
        if size == 0 || pointee_address(&head).is_null() {
            return Ok(Vec::new());
        }

        let left = NodeStep::select(&items.left_pointer, &head)?;
        let right = NodeStep::select(&items.right_pointer, &head)?;
        let accessor = ValueAccessor::select(&items.value_node, &head);
        let nodes = walk_tree(&head, size, &left, &right)?;
        self.node_children(&nodes, &accessor, binding)
    }

    fn expand_list(
        &self,
        items: &LinkedListItemsRule,
        target: &VariableRef,
        binding: &VisualizerBinding,
    ) -> VisualizerResult<Vec<VariableRef>>
    {
        if !self.passes(items.condition.as_ref(), target, binding) {
            return Ok(Vec::new());
        }
        let bound = match &items.size {
            Some(size) => self.read_count(size, target, binding)?,
            None => MAX_EXPAND_CHILDREN,
        };
        let head = self.evaluate_expression(&items.head_pointer, target, Some(binding))?;
        if bound == 0 || pointee_address(&head).is_null() {
            return Ok(Vec::new());
        }

        let next = NodeStep::select(&items.next_pointer, &head)?;
        let accessor = ValueAccessor::select(&items.value_node, &head);
        let nodes = walk_list(&head, bound, &next, items.no_value_in_head)?;
        self.node_children(&nodes, &accessor, binding)
    }

    fn expand_index_list(
        &self,
        items: &IndexListItemsRule,
        target: &VariableRef,
        binding: &VisualizerBinding,
    ) -> VisualizerResult<Vec<VariableRef>>
    {
        if !self.passes(items.condition.as_ref(), target, binding) {
            return Ok(Vec::new());
        }
        let Some(size) = items
            .sizes
            .iter()
            .find(|size| self.passes(size.condition.as_ref(), target, binding))
        else {
            return Ok(Vec::new());
        };
        let count = self.read_count(&size.expression, target, binding)?;
        let Some(value_node) = items
            .value_nodes
            .iter()
            .find(|node| self.passes(node.condition.as_ref(), target, binding))
        else {
            return Ok(Vec::new());
        };

        let template = self.get_expression(&value_node.expression, target, Some(binding));
        (0..count)
            .map(|index| {
                let element = target.evaluate(&replace_index(&template, index))?;
                Ok(ViewWrapper::named(&element, format!("[{index}]")))
            })
            .collect()
    }

    fn expand_expanded_item(
        &self,
        item: &ExpandedItemRule,
        target: &VariableRef,
        binding: &VisualizerBinding,
    ) -> VisualizerResult<Vec<VariableRef>>
    {
        if !self.passes(item.condition.as_ref(), target, binding) {
            return Ok(Vec::new());
        }
        let Some(_depth) = DepthGuard::enter(&self.expand_depth, MAX_DISPLAY_DEPTH) else {
            debug!(expression = %item.expression, "expanded item depth limit reached");
            return Ok(Vec::new());
        };

        let result = self.evaluate_expression(&item.expression, target, Some(binding))?;
        let Some(inner) = self.resolve(&result) else {
            return Ok(result.children());
        };
        let Some(rules) = inner.visualizer().expand.as_ref() else {
            return Ok(result.children());
        };
        let children = self.rule_children(&unwrapped(&result), &inner, rules)?;
        if children.is_empty() {
            return Ok(result.children());
        }
        Ok(children)
    }

    /// Evaluate a size expression; unparsable text counts as zero.
    fn read_count(&self, expression: &str, target: &VariableRef, binding: &VisualizerBinding) -> VisualizerResult<usize>
    {
        let text = self.evaluate_expression(expression, target, Some(binding))?.value();
        Ok(parse_unsigned(&text).map_or(0, clamp))
    }

    fn node_children(
        &self,
        nodes: &[VariableRef],
        accessor: &ValueAccessor,
        binding: &VisualizerBinding,
    ) -> VisualizerResult<Vec<VariableRef>>
    {
        nodes
            .iter()
            .enumerate()
            .map(|(index, node)| {
                let value = accessor.read(self, node, binding)?;
                Ok(ViewWrapper::named(&value, format!("[{index}]")))
            })
            .collect()
    }
}

fn unwrapped(value: &VariableRef) -> VariableRef
{
    match value.as_view() {
        Some(view) => VariableRef::clone(view.inner()),
        None => VariableRef::clone(value),
    }
}

fn clamp(count: u64) -> usize
{
    usize::try_from(count).map_or(MAX_EXPAND_CHILDREN, |count| count.min(MAX_EXPAND_CHILDREN))
}

/// Element type of a pointer type (`Foo *` gives `Foo`).
fn element_type(pointer_type: &str) -> Option<&str>
{
    pointer_type
        .trim_end()
        .strip_suffix('*')
        .map(str::trim_end)
        .filter(|element| !element.is_empty())
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_clamp()
    {
        assert_eq!(clamp(0), 0);
        assert_eq!(clamp(7), 7);
        assert_eq!(clamp(5000), MAX_EXPAND_CHILDREN);
    }

    #[test]
    fn test_element_type()
    {
        assert_eq!(element_type("int *"), Some("int"));
        assert_eq!(element_type("Node<int>**"), Some("Node<int>*"));
        assert_eq!(element_type("*"), None);
        assert_eq!(element_type("int"), None);
    }
}
