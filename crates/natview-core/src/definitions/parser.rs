//! natvis document parsing.
//!
//! Documents are read with `quick-xml` into a small element tree first, then
//! interpreted element by element. Interpretation is forgiving in the way the
//! format's consumers expect:
//!
//! - A document that is not well-formed XML, or whose root is not
//!   `AutoVisualizer`, is rejected as a whole.
//! - A `Type`, `Alias`, `UIVisualizer` or expand rule that is missing a required
//!   attribute/child (or has an unparsable type pattern) is skipped with a
//!   warning; the rest of the document still loads.
//! - Unknown elements and attributes are ignored.
//!
//! Element and attribute names are matched by local name, so the usual
//! `xmlns="http://schemas.microsoft.com/vstudio/debugger/natvis/2010"` default
//! namespace and prefixed variants both work.

use std::sync::Arc;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use tracing::{debug, warn};

use super::{
    AliasDefinition, ArrayItemsRule, DefinitionFile, DisplayStringRule, ExpandRule, ExpandRules, ExpandedItemRule, Guarded,
    IndexListItemsRule, ItemRule, LinkedListItemsRule, TreeItemsRule, UiVisualizer, UiVisualizerRef, VisualizerDefinition,
};
use crate::error::{VisualizerError, VisualizerResult};
use crate::types::TypeName;

/// Root element every rule document must have.
const ROOT_ELEMENT: &str = "AutoVisualizer";

/// Parse one natvis document.
///
/// ## Errors
///
/// Returns [`VisualizerError::InvalidDocument`] if the text is not well-formed
/// XML or the root element is wrong. Malformed individual items are skipped,
/// not reported as errors.
pub fn parse_document(origin: &str, text: &str) -> VisualizerResult<DefinitionFile>
{
    let invalid = |reason: String| VisualizerError::InvalidDocument {
        origin: origin.to_string(),
        reason,
    };

    let root = read_tree(text).map_err(invalid)?;
    if root.name != ROOT_ELEMENT {
        return Err(invalid(format!("expected <{ROOT_ELEMENT}> root, found <{}>", root.name)));
    }

    let mut file = DefinitionFile {
        origin: origin.to_string(),
        ..DefinitionFile::default()
    };

    for element in &root.children {
        match element.name.as_str() {
            "Type" => match parse_visualizer(origin, element) {
                Ok(visualizer) => file.visualizers.push(Arc::new(visualizer)),
                Err(err) => warn!(origin, error = %err, "skipping <Type>"),
            },
            "Alias" => match parse_alias(element) {
                Ok(alias) => file.aliases.push(alias),
                Err(err) => warn!(origin, error = %err, "skipping <Alias>"),
            },
            "UIVisualizer" => match parse_ui_visualizer(element) {
                Ok(registration) => file.ui_visualizers.push(registration),
                Err(err) => warn!(origin, error = %err, "skipping <UIVisualizer>"),
            },
            other => debug!(origin, element = other, "ignoring unknown element"),
        }
    }

    debug!(
        origin,
        visualizers = file.visualizers.len(),
        aliases = file.aliases.len(),
        ui_visualizers = file.ui_visualizers.len(),
        "parsed rule document"
    );
    Ok(file)
}

fn parse_pattern(text: &str) -> VisualizerResult<TypeName>
{
    TypeName::parse(text).ok_or_else(|| VisualizerError::InvalidTypeName(text.to_string()))
}

fn parse_visualizer(origin: &str, element: &Element) -> VisualizerResult<VisualizerDefinition>
{
    let name = element.required_attr("Name")?;
    let mut visualizer = VisualizerDefinition {
        pattern: parse_pattern(name)?,
        alternatives: Vec::new(),
        display_strings: Vec::new(),
        string_views: Vec::new(),
        expand: None,
        ui_visualizers: Vec::new(),
    };

    for child in &element.children {
        match child.name.as_str() {
            "AlternativeType" => match child.required_attr("Name").and_then(parse_pattern) {
                Ok(pattern) => visualizer.alternatives.push(pattern),
                Err(err) => warn!(origin, visualizer = name, error = %err, "skipping <AlternativeType>"),
            },
            "DisplayString" => visualizer.display_strings.push(DisplayStringRule {
                template: child.text(),
                condition: child.condition(),
            }),
            "StringView" => visualizer.string_views.push(DisplayStringRule {
                template: child.text(),
                condition: child.condition(),
            }),
            "UIVisualizer" => match parse_ui_visualizer_ref(child) {
                Ok(reference) => visualizer.ui_visualizers.push(reference),
                Err(err) => warn!(origin, visualizer = name, error = %err, "skipping <UIVisualizer> reference"),
            },
            "Expand" => visualizer.expand = Some(parse_expand(origin, name, child)),
            _ => {}
        }
    }

    Ok(visualizer)
}

fn parse_expand(origin: &str, visualizer: &str, element: &Element) -> ExpandRules
{
    let mut rules = ExpandRules {
        hide_raw_view: element.flag("HideRawView"),
        items: Vec::new(),
    };

    for child in &element.children {
        let parsed = match child.name.as_str() {
            "Item" => parse_item(child).map(ExpandRule::Item),
            "ArrayItems" => parse_array_items(child).map(ExpandRule::ArrayItems),
            "TreeItems" => parse_tree_items(child).map(ExpandRule::TreeItems),
            "LinkedListItems" => parse_linked_list_items(child).map(ExpandRule::LinkedListItems),
            "IndexListItems" => parse_index_list_items(child).map(ExpandRule::IndexListItems),
            "ExpandedItem" => parse_expanded_item(child).map(ExpandRule::ExpandedItem),
            other => {
                debug!(origin, visualizer, element = other, "ignoring unsupported expand rule");
                continue;
            }
        };
        match parsed {
            Ok(rule) => rules.items.push(rule),
            Err(err) => warn!(origin, visualizer, error = %err, "skipping expand rule"),
        }
    }

    rules
}

fn parse_item(element: &Element) -> VisualizerResult<ItemRule>
{
    Ok(ItemRule {
        name: element.attr("Name").map(str::to_string),
        expression: element.required_text()?,
        condition: element.condition(),
    })
}

fn parse_array_items(element: &Element) -> VisualizerResult<ArrayItemsRule>
{
    Ok(ArrayItemsRule {
        condition: element.condition(),
        sizes: element.required_guarded("Size")?,
        value_pointers: element.required_guarded("ValuePointer")?,
    })
}

fn parse_tree_items(element: &Element) -> VisualizerResult<TreeItemsRule>
{
    Ok(TreeItemsRule {
        condition: element.condition(),
        size: element.required_child_text("Size")?,
        head_pointer: element.required_child_text("HeadPointer")?,
        left_pointer: element.required_child_text("LeftPointer")?,
        right_pointer: element.required_child_text("RightPointer")?,
        value_node: element.required_child_text("ValueNode")?,
    })
}

fn parse_linked_list_items(element: &Element) -> VisualizerResult<LinkedListItemsRule>
{
    Ok(LinkedListItemsRule {
        condition: element.condition(),
        size: element.child_text("Size"),
        head_pointer: element.required_child_text("HeadPointer")?,
        next_pointer: element.required_child_text("NextPointer")?,
        value_node: element.required_child_text("ValueNode")?,
        no_value_in_head: element.flag("NoValueInHead"),
    })
}

fn parse_index_list_items(element: &Element) -> VisualizerResult<IndexListItemsRule>
{
    Ok(IndexListItemsRule {
        condition: element.condition(),
        sizes: element.required_guarded("Size")?,
        value_nodes: element.required_guarded("ValueNode")?,
    })
}

fn parse_expanded_item(element: &Element) -> VisualizerResult<ExpandedItemRule>
{
    Ok(ExpandedItemRule {
        expression: element.required_text()?,
        condition: element.condition(),
    })
}

fn parse_alias(element: &Element) -> VisualizerResult<AliasDefinition>
{
    Ok(AliasDefinition {
        pattern: parse_pattern(element.required_attr("Name")?)?,
        target: element.required_attr("Value")?.to_string(),
    })
}

fn parse_ui_visualizer(element: &Element) -> VisualizerResult<UiVisualizer>
{
    let reference = parse_ui_visualizer_ref(element)?;
    Ok(UiVisualizer {
        service_id: reference.service_id,
        id: reference.id,
        menu_name: element.required_attr("MenuName")?.to_string(),
    })
}

fn parse_ui_visualizer_ref(element: &Element) -> VisualizerResult<UiVisualizerRef>
{
    let raw_id = element.required_attr("Id")?;
    let id = raw_id.trim().parse::<u32>().map_err(|_| VisualizerError::InvalidAttribute {
        element: element.name.clone(),
        attribute: "Id".to_string(),
        value: raw_id.to_string(),
    })?;
    Ok(UiVisualizerRef {
        service_id: element.required_attr("ServiceId")?.to_string(),
        id,
    })
}

/// Minimal XML element tree; attribute and element names are local names.
#[derive(Debug, Default)]
struct Element
{
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Element>,
    text: String,
}

impl Element
{
    fn attr(&self, name: &str) -> Option<&str>
    {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    fn required_attr(&self, name: &str) -> VisualizerResult<&str>
    {
        self.attr(name)
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| self.missing(name))
    }

    fn condition(&self) -> Option<String>
    {
        self.attr("Condition")
            .map(str::trim)
            .filter(|condition| !condition.is_empty())
            .map(str::to_string)
    }

    fn flag(&self, name: &str) -> bool
    {
        self.attr(name).is_some_and(|value| value.trim().eq_ignore_ascii_case("true"))
    }

    fn text(&self) -> String
    {
        self.text.trim().to_string()
    }

    fn required_text(&self) -> VisualizerResult<String>
    {
        let text = self.text();
        if text.is_empty() {
            return Err(self.missing("expression"));
        }
        Ok(text)
    }

    fn child_text(&self, name: &str) -> Option<String>
    {
        self.children
            .iter()
            .find(|child| child.name == name)
            .map(Element::text)
            .filter(|text| !text.is_empty())
    }

    fn required_child_text(&self, name: &str) -> VisualizerResult<String>
    {
        self.child_text(name).ok_or_else(|| self.missing(name))
    }

    fn required_guarded(&self, name: &str) -> VisualizerResult<Vec<Guarded>>
    {
        let guarded: Vec<Guarded> = self
            .children
            .iter()
            .filter(|child| child.name == name)
            .filter_map(|child| {
                let expression = child.text();
                (!expression.is_empty()).then(|| Guarded {
                    expression,
                    condition: child.condition(),
                })
            })
            .collect();
        if guarded.is_empty() {
            return Err(self.missing(name));
        }
        Ok(guarded)
    }

    fn missing(&self, field: &str) -> VisualizerError
    {
        VisualizerError::MissingField {
            element: self.name.clone(),
            field: field.to_string(),
        }
    }
}

fn read_tree(text: &str) -> Result<Element, String>
{
    let mut reader = Reader::from_str(text);
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(start)) => stack.push(element_from(&start)?),
            Ok(Event::Empty(start)) => {
                let element = element_from(&start)?;
                attach(&mut stack, &mut root, element)?;
            }
            Ok(Event::End(_)) => {
                let element = stack.pop().ok_or_else(|| "unexpected closing tag".to_string())?;
                attach(&mut stack, &mut root, element)?;
            }
            Ok(Event::Text(text)) => {
                if let Some(current) = stack.last_mut() {
                    let unescaped = text.unescape().map_err(|err| err.to_string())?;
                    current.text.push_str(&unescaped);
                }
            }
            Ok(Event::CData(data)) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&String::from_utf8_lossy(&data));
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(err) => return Err(format!("at byte {}: {err}", reader.buffer_position())),
        }
    }

    if let Some(unclosed) = stack.last() {
        return Err(format!("unclosed <{}>", unclosed.name));
    }
    root.ok_or_else(|| "empty document".to_string())
}

fn element_from(start: &BytesStart<'_>) -> Result<Element, String>
{
    let mut element = Element {
        name: String::from_utf8_lossy(start.local_name().as_ref()).into_owned(),
        ..Element::default()
    };
    for attribute in start.attributes() {
        let attribute = attribute.map_err(|err| err.to_string())?;
        let key = String::from_utf8_lossy(attribute.key.local_name().as_ref()).into_owned();
        let value = attribute.unescape_value().map_err(|err| err.to_string())?.into_owned();
        element.attributes.push((key, value));
    }
    Ok(element)
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) -> Result<(), String>
{
    if let Some(parent) = stack.last_mut() {
        parent.children.push(element);
        return Ok(());
    }
    if root.is_some() {
        return Err(format!("second root element <{}>", element.name));
    }
    *root = Some(element);
    Ok(())
}
