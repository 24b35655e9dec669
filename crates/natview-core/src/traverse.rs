//! # Tree and List Traversal
//!
//! Node walkers behind `TreeItems` and `LinkedListItems`.
//!
//! Both walkers work on pointer-valued nodes: a node whose text reads as a
//! null address is the end of a branch. How to get from one node to the next
//! is chosen once per rule ([`NodeStep::select`]) and then applied uniformly.
//!
//! The walkers return the visited nodes in emission order; the caller decides
//! what to show for each one.

use tracing::trace;

use crate::error::VisualizerResult;
use crate::variable::{pointee_address, EvalError, VariableRef};

/// How to follow a link field from one node to the next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum NodeStep
{
    /// The link has the node's own type: read the field.
    Field(String),
    /// The link is typed differently (base node, `void*`): read it and cast
    /// it to the node type.
    Cast
    {
        field: String,
        node_type: String,
    },
}

impl NodeStep
{
    /// Choose the step form by comparing the link field's type on `head`
    /// with `head`'s own type.
    pub(crate) fn select(field: &str, head: &VariableRef) -> VisualizerResult<Self>
    {
        let field = field.trim();
        let link = head
            .find_child(field)
            .ok_or_else(|| EvalError::NoMember(field.to_string()))?;
        let node_type = head.type_name();
        if same_type(&link.type_name(), &node_type) {
            Ok(Self::Field(field.to_string()))
        } else {
            trace!(field, link_type = %link.type_name(), %node_type, "link needs a cast");
            Ok(Self::Cast {
                field: field.to_string(),
                node_type,
            })
        }
    }

    /// Follow the link from `node`.
    pub(crate) fn next(&self, node: &VariableRef) -> VisualizerResult<VariableRef>
    {
        match self {
            Self::Field(field) => Ok(node
                .find_child(field)
                .ok_or_else(|| EvalError::NoMember(field.clone()))?),
            Self::Cast { field, node_type } => {
                let link = node
                    .find_child(field)
                    .ok_or_else(|| EvalError::NoMember(field.clone()))?;
                let expression = format!("({node_type})({})", link.full_name());
                Ok(node.evaluate(&expression)?)
            }
        }
    }

    fn non_null(&self, node: &VariableRef) -> VisualizerResult<Option<VariableRef>>
    {
        let next = self.next(node)?;
        Ok((!pointee_address(&next).is_null()).then_some(next))
    }
}

fn same_type(left: &str, right: &str) -> bool
{
    let compact = |text: &str| text.chars().filter(|c| !c.is_whitespace()).collect::<String>();
    compact(left) == compact(right)
}

/// Where a tree node is in its in-order visit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase
{
    DescendLeft,
    EmitValue,
    DescendRight,
}

/// In-order walk of a binary tree, stopping after `bound` nodes.
///
/// There is no visited set: a cycle through left links that never reaches an
/// emit keeps walking.
pub(crate) fn walk_tree(
    head: &VariableRef,
    bound: usize,
    left: &NodeStep,
    right: &NodeStep,
) -> VisualizerResult<Vec<VariableRef>>
{
    let mut emitted = Vec::new();
    if bound == 0 || pointee_address(head).is_null() {
        return Ok(emitted);
    }

    let mut stack = vec![(VariableRef::clone(head), Phase::DescendLeft)];
    while let Some((node, phase)) = stack.pop() {
        match phase {
            Phase::DescendLeft => {
                let child = left.non_null(&node)?;
                stack.push((node, Phase::EmitValue));
                if let Some(child) = child {
                    stack.push((child, Phase::DescendLeft));
                }
            }
            Phase::EmitValue => {
                emitted.push(VariableRef::clone(&node));
                if emitted.len() >= bound {
                    break;
                }
                stack.push((node, Phase::DescendRight));
            }
            Phase::DescendRight => {
                if let Some(child) = right.non_null(&node)? {
                    stack.push((child, Phase::DescendLeft));
                }
            }
        }
    }
    Ok(emitted)
}

/// Forward walk of a singly linked list.
///
/// Stops after `bound` emitted nodes, at a null link, or when a link leads
/// back to the head. With `skip_head` the head node is walked but not emitted.
pub(crate) fn walk_list(
    head: &VariableRef,
    bound: usize,
    next: &NodeStep,
    skip_head: bool,
) -> VisualizerResult<Vec<VariableRef>>
{
    let head_address = pointee_address(head);
    let mut emitted = Vec::new();
    let mut current = VariableRef::clone(head);
    let mut at_head = true;

    while emitted.len() < bound && !pointee_address(&current).is_null() {
        if !(at_head && skip_head) {
            emitted.push(VariableRef::clone(&current));
        }
        let following = next.next(&current)?;
        if pointee_address(&following) == head_address {
            break;
        }
        current = following;
        at_head = false;
    }
    Ok(emitted)
}
