//! Rule document model.
//!
//! A loaded natvis document becomes one [`DefinitionFile`]: its visualizers,
//! aliases and UI-visualizer registrations in declaration order. Everything
//! here is immutable after load; the registry shares definitions through `Arc`.

pub mod parser;

use std::sync::Arc;

pub use parser::parse_document;

use crate::types::TypeName;

/// One loaded rule document.
#[derive(Debug, Clone, Default)]
pub struct DefinitionFile
{
    /// Where the document came from (path or label), for diagnostics.
    pub origin: String,
    /// `Type` elements, in declaration order.
    pub visualizers: Vec<Arc<VisualizerDefinition>>,
    /// `Alias` elements, in declaration order.
    pub aliases: Vec<AliasDefinition>,
    /// Top-level `UIVisualizer` registrations.
    pub ui_visualizers: Vec<UiVisualizer>,
}

/// A type-pattern-scoped rule set (`<Type Name="...">`).
#[derive(Debug, Clone)]
pub struct VisualizerDefinition
{
    /// Pattern from the `Name` attribute.
    pub pattern: TypeName,
    /// Patterns from `AlternativeType` children, sharing this rule set.
    pub alternatives: Vec<TypeName>,
    /// `DisplayString` items, in declaration order.
    pub display_strings: Vec<DisplayStringRule>,
    /// `StringView` items, kept for hosts that offer a text view.
    pub string_views: Vec<DisplayStringRule>,
    /// The `Expand` block, if any.
    pub expand: Option<ExpandRules>,
    /// `UIVisualizer` references attached to this type.
    pub ui_visualizers: Vec<UiVisualizerRef>,
}

impl VisualizerDefinition
{
    /// Whether `name` matches the primary pattern or any alternative.
    pub fn matches(&self, name: &TypeName) -> bool
    {
        name.matches(&self.pattern) || self.alternatives.iter().any(|alternative| name.matches(alternative))
    }
}

/// A pattern-to-pattern rewrite (`<Alias Name="..." Value="..."/>`).
#[derive(Debug, Clone)]
pub struct AliasDefinition
{
    /// Pattern the alias applies to.
    pub pattern: TypeName,
    /// Replacement type text; may reference `$T1..$Tn`.
    pub target: String,
}

/// A `DisplayString` (or `StringView`) template with its guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayStringRule
{
    /// Template text with `{expr}` spans.
    pub template: String,
    /// `Condition` attribute.
    pub condition: Option<String>,
}

/// An expression paired with an optional guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Guarded
{
    /// Expression text.
    pub expression: String,
    /// `Condition` attribute.
    pub condition: Option<String>,
}

/// The `Expand` block of a visualizer.
#[derive(Debug, Clone, Default)]
pub struct ExpandRules
{
    /// `HideRawView="true"` suppresses the trailing raw view child.
    pub hide_raw_view: bool,
    /// Expand rules in document order.
    pub items: Vec<ExpandRule>,
}

/// One expand rule; a closed set of kinds.
#[derive(Debug, Clone)]
pub enum ExpandRule
{
    /// `<Item>`: one named child.
    Item(ItemRule),
    /// `<ArrayItems>`: contiguous elements behind a pointer.
    ArrayItems(ArrayItemsRule),
    /// `<TreeItems>`: in-order walk of a binary tree.
    TreeItems(TreeItemsRule),
    /// `<LinkedListItems>`: forward walk of a singly linked list.
    LinkedListItems(LinkedListItemsRule),
    /// `<IndexListItems>`: one child per index, from a `$i` template.
    IndexListItems(IndexListItemsRule),
    /// `<ExpandedItem>`: splice in another value's children.
    ExpandedItem(ExpandedItemRule),
}

impl ExpandRule
{
    /// Element name of the rule kind, for diagnostics.
    pub fn kind(&self) -> &'static str
    {
        match self {
            Self::Item(_) => "Item",
            Self::ArrayItems(_) => "ArrayItems",
            Self::TreeItems(_) => "TreeItems",
            Self::LinkedListItems(_) => "LinkedListItems",
            Self::IndexListItems(_) => "IndexListItems",
            Self::ExpandedItem(_) => "ExpandedItem",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRule
{
    /// Child name; defaults to the expression text.
    pub name: Option<String>,
    pub expression: String,
    pub condition: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayItemsRule
{
    pub condition: Option<String>,
    /// `Size` alternatives; the first whose guard passes is used.
    pub sizes: Vec<Guarded>,
    /// `ValuePointer` candidates; the first whose guard passes and yields a typed pointer is used.
    pub value_pointers: Vec<Guarded>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeItemsRule
{
    pub condition: Option<String>,
    pub size: String,
    pub head_pointer: String,
    pub left_pointer: String,
    pub right_pointer: String,
    pub value_node: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkedListItemsRule
{
    pub condition: Option<String>,
    /// Optional; the walk is bounded by the child limit when absent.
    pub size: Option<String>,
    pub head_pointer: String,
    pub next_pointer: String,
    pub value_node: String,
    /// The head node is a sentinel whose value is not shown.
    pub no_value_in_head: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexListItemsRule
{
    pub condition: Option<String>,
    pub sizes: Vec<Guarded>,
    /// Value templates using the `$i` placeholder.
    pub value_nodes: Vec<Guarded>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpandedItemRule
{
    pub expression: String,
    pub condition: Option<String>,
}

/// A top-level UI visualizer registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiVisualizer
{
    pub service_id: String,
    pub id: u32,
    pub menu_name: String,
}

/// A type's reference to a registered UI visualizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiVisualizerRef
{
    pub service_id: String,
    pub id: u32,
}
