//! Tests for child synthesis

mod common;

use std::rc::Rc;

use common::{names, session_with, session_with_config, values, MockProcess, MockVariable};
use natview_core::limits::MAX_EXPAND_CHILDREN;
use natview_core::view::{RAW_VIEW_NAME, VISUALIZER_VIEW_NAME};
use natview_core::{ExpansionMode, SessionConfig, VariableRef};

const PAIR: &str = r#"
<Type Name="Pair">
  <Expand>
    <Item Name="first">a</Item>
    <Item Name="second">b</Item>
    <Item Name="extra" Condition="has_extra">b</Item>
  </Expand>
</Type>"#;

fn pair(process: &Rc<MockProcess>, name: &str) -> Rc<MockVariable>
{
    let value = process.node(name, name, "Pair", "{...}");
    value.field("a", "int", "1");
    value.field("b", "int", "2");
    value.field("has_extra", "bool", "false");
    value
}

fn visualized(value: &Rc<MockVariable>) -> VariableRef
{
    value.mark_visualized();
    value.clone()
}

#[test]
fn test_value_without_rules_keeps_native_children()
{
    let session = session_with(PAIR);
    let process = MockProcess::new();
    let other = process.node("o", "o", "Other", "{...}");
    other.field("x", "int", "1");
    let other: VariableRef = other;

    assert_eq!(names(&session.expand(&other)), ["x"]);
}

#[test]
fn test_on_demand_offers_visualizer_view_first()
{
    let session = session_with(PAIR);
    let process = MockProcess::new();
    let value: VariableRef = pair(&process, "p");

    let children = session.expand(&value);
    assert_eq!(names(&children), [VISUALIZER_VIEW_NAME, "a", "b", "has_extra"]);

    let view = &children[0];
    assert!(view.is_visualized());
    assert_eq!(view.full_name(), "p,viz");
    assert_eq!(names(&session.expand(view)), ["first", "second"]);
}

#[test]
fn test_visualized_value_gets_rule_children_and_raw_view()
{
    let session = session_with(PAIR);
    let process = MockProcess::new();
    let value = visualized(&pair(&process, "p"));

    let children = session.expand(&value);
    assert_eq!(names(&children), ["first", "second", RAW_VIEW_NAME]);
    assert_eq!(values(&children[..2]), ["1", "2"]);

    let raw = &children[2];
    assert!(!raw.is_visualized());
    assert_eq!(raw.full_name(), "p");
    assert_eq!(names(&session.expand(raw)), ["a", "b", "has_extra"]);
}

#[test]
fn test_visualized_value_never_nests_visualizer_views()
{
    let session = session_with(PAIR);
    let process = MockProcess::new();
    let value = visualized(&pair(&process, "p"));

    let children = session.expand(&value);
    assert!(!names(&children).contains(&VISUALIZER_VIEW_NAME.to_string()));
    for child in &children {
        assert!(!names(&session.expand(child)).contains(&VISUALIZER_VIEW_NAME.to_string()));
    }
}

#[test]
fn test_hide_raw_view()
{
    let session = session_with(r#"<Type Name="Pair"><Expand HideRawView="true"><Item Name="first">a</Item></Expand></Type>"#);
    let process = MockProcess::new();
    let value = visualized(&pair(&process, "p"));

    assert_eq!(names(&session.expand(&value)), ["first"]);
}

#[test]
fn test_immediate_mode_expands_through_rules()
{
    let config = SessionConfig {
        expansion: ExpansionMode::Immediate,
        ..SessionConfig::default()
    };
    let session = session_with_config(PAIR, config);
    let process = MockProcess::new();
    let value: VariableRef = pair(&process, "p");

    let children = session.expand(&value);
    assert_eq!(names(&children), ["first", "second", RAW_VIEW_NAME]);
    assert_eq!(names(&session.expand(&children[2])), ["a", "b", "has_extra"]);
}

#[test]
fn test_evaluation_failure_falls_back_to_native_children()
{
    let session = session_with(r#"<Type Name="Pair"><Expand><Item Name="gone">missing</Item></Expand></Type>"#);
    let process = MockProcess::new();
    let value = visualized(&pair(&process, "p"));

    assert_eq!(names(&session.expand(&value)), ["a", "b", "has_extra"]);
}

#[test]
fn test_array_items_clamp_to_limit()
{
    let session = session_with(
        r#"<Type Name="Vec">
             <Expand>
               <ArrayItems>
                 <Size>len</Size>
                 <ValuePointer Condition="small">buf</ValuePointer>
                 <ValuePointer>heap</ValuePointer>
               </ArrayItems>
             </Expand>
           </Type>"#,
    );
    let process = MockProcess::new();
    let vec = process.node("v", "v", "Vec", "{...}");
    vec.field("len", "unsigned long", "100");
    vec.field("small", "bool", "false");
    vec.field("buf", "int *", "0x2000");
    vec.field("heap", "int *", "0x1000");

    let array = process.node("array", "(int[50])*(v.heap)", "int[50]", "{...}");
    for index in 0..60 {
        array.field(&format!("[{index}]"), "int", &index.to_string());
    }

    let children = session.expand(&visualized(&vec));
    assert_eq!(children.len(), MAX_EXPAND_CHILDREN + 1);
    assert_eq!(children[0].name(), "[0]");
    assert_eq!(children[49].value(), "49");
    assert_eq!(children[50].name(), RAW_VIEW_NAME);
    assert!(!process.evaluated().iter().any(|expression| expression.contains("v.buf")));
}

#[test]
fn test_unparsable_array_size_skips_only_that_item()
{
    let session = session_with(
        r#"<Type Name="Vec">
             <Expand>
               <ArrayItems><Size>len</Size><ValuePointer>heap</ValuePointer></ArrayItems>
               <Item Name="length">len</Item>
             </Expand>
           </Type>"#,
    );
    let process = MockProcess::new();
    let vec = process.node("v", "v", "Vec", "{...}");
    vec.field("len", "unsigned long", "lots");
    vec.field("heap", "int *", "0x1000");

    assert_eq!(names(&session.expand(&visualized(&vec))), ["length", RAW_VIEW_NAME]);
}

const LIST: &str = r#"
<Type Name="List">
  <Expand>
    <LinkedListItems>
      <HeadPointer>head</HeadPointer>
      <NextPointer>next</NextPointer>
      <ValueNode>value</ValueNode>
    </LinkedListItems>
  </Expand>
</Type>"#;

/// `l.head` -> 1 -> 2 -> 3 -> back to the head.
fn circular_list(process: &Rc<MockProcess>) -> Rc<MockVariable>
{
    let list = process.node("l", "l", "List", "{...}");
    list.field("count", "int", "2");
    let head = list.field("head", "Node *", "0x100");
    head.field("value", "int", "1");
    let second = head.field("next", "Node *", "0x200");
    second.field("value", "int", "2");
    let third = second.field("next", "Node *", "0x300");
    third.field("value", "int", "3");
    third.field("next", "Node *", "0x100");
    list
}

#[test]
fn test_linked_list_stops_when_cycle_returns_to_head()
{
    let session = session_with(LIST);
    let process = MockProcess::new();
    let list = visualized(&circular_list(&process));

    let children = session.expand(&list);
    assert_eq!(names(&children), ["[0]", "[1]", "[2]", RAW_VIEW_NAME]);
    assert_eq!(values(&children[..3]), ["1", "2", "3"]);
}

#[test]
fn test_linked_list_no_value_in_head()
{
    let session = session_with(&LIST.replace("<LinkedListItems>", r#"<LinkedListItems NoValueInHead="true">"#));
    let process = MockProcess::new();
    let list = visualized(&circular_list(&process));

    let children = session.expand(&list);
    assert_eq!(values(&children[..2]), ["2", "3"]);
    assert_eq!(names(&children), ["[0]", "[1]", RAW_VIEW_NAME]);
}

#[test]
fn test_linked_list_size_bounds_walk()
{
    let session = session_with(&LIST.replace("<HeadPointer>", "<Size>count</Size><HeadPointer>"));
    let process = MockProcess::new();
    let list = visualized(&circular_list(&process));

    assert_eq!(values(&session.expand(&list)[..2]), ["1", "2"]);
    assert_eq!(session.expand(&list).len(), 3);
}

#[test]
fn test_linked_list_casts_untyped_links()
{
    let session = session_with(LIST);
    let process = MockProcess::new();
    let list = process.node("l", "l", "List", "{...}");
    let head = list.field("head", "Node *", "0x100");
    head.field("value", "int", "1");
    head.field("next", "void *", "0x200");

    let second = process.node("next", "(Node *)(l.head->next)", "Node *", "0x200");
    second.field("value", "int", "2");
    second.field("next", "void *", "0x0");
    process.scalar("(Node *)((Node *)(l.head->next)->next)", "Node *", "0x0");

    let children = session.expand(&visualized(&list));
    assert_eq!(values(&children[..2]), ["1", "2"]);
    assert_eq!(children.len(), 3);
}

fn tree_node(parent: &MockVariable, field: &str, address: &str, key: &str) -> Rc<MockVariable>
{
    let node = parent.field(field, "TreeNode *", address);
    node.field("key", "int", key);
    node
}

fn leaf(parent: &MockVariable, field: &str, address: &str, key: &str)
{
    let node = tree_node(parent, field, address, key);
    node.field("left", "TreeNode *", "0x0");
    node.field("right", "TreeNode *", "0x0");
}

#[test]
fn test_tree_items_walk_in_order()
{
    let session = session_with(
        r#"<Type Name="Tree">
             <Expand>
               <TreeItems>
                 <Size>size</Size>
                 <HeadPointer>root</HeadPointer>
                 <LeftPointer>left</LeftPointer>
                 <RightPointer>right</RightPointer>
                 <ValueNode>key</ValueNode>
               </TreeItems>
             </Expand>
           </Type>"#,
    );
    let process = MockProcess::new();
    let tree = process.node("t", "t", "Tree", "{...}");
    tree.field("size", "int", "4");
    let root = tree_node(&tree, "root", "0x10", "20");
    let left = tree_node(&root, "left", "0x20", "10");
    leaf(&left, "left", "0x40", "5");
    left.field("right", "TreeNode *", "0x0");
    leaf(&root, "right", "0x30", "30");

    let children = session.expand(&visualized(&tree));
    assert_eq!(values(&children[..4]), ["5", "10", "20", "30"]);
    assert_eq!(names(&children[..4]), ["[0]", "[1]", "[2]", "[3]"]);
}

#[test]
fn test_tree_items_respect_size()
{
    let session = session_with(
        r#"<Type Name="Tree">
             <Expand>
               <TreeItems>
                 <Size>size</Size>
                 <HeadPointer>root</HeadPointer>
                 <LeftPointer>left</LeftPointer>
                 <RightPointer>right</RightPointer>
                 <ValueNode>this</ValueNode>
               </TreeItems>
             </Expand>
           </Type>"#,
    );
    let process = MockProcess::new();
    let tree = process.node("t", "t", "Tree", "{...}");
    tree.field("size", "int", "2");
    let root = tree_node(&tree, "root", "0x10", "20");
    leaf(&root, "left", "0x20", "10");
    leaf(&root, "right", "0x30", "30");

    let children = session.expand(&visualized(&tree));
    assert_eq!(values(&children), ["0x20", "0x10", "{...}"]);
}

const KEYED_TREE: &str = r#"
<Type Name="Tree">
  <Expand>
    <TreeItems>
      <Size>size</Size>
      <HeadPointer>root</HeadPointer>
      <LeftPointer>left</LeftPointer>
      <RightPointer>right</RightPointer>
      <ValueNode>key</ValueNode>
    </TreeItems>
  </Expand>
</Type>"#;

/// Register the node reached by casting `link` to `TreeNode *`, with null links.
fn cast_leaf(process: &Rc<MockProcess>, link: &str, address: &str, key: &str)
{
    let full_name = format!("(TreeNode *)({link})");
    let node = process.node("node", &full_name, "TreeNode *", address);
    node.field("key", "int", key);
    node.field("left", "BaseNode *", "0x0");
    node.field("right", "BaseNode *", "0x0");
    process.scalar(&format!("(TreeNode *)({full_name}->left)"), "TreeNode *", "0x0");
    process.scalar(&format!("(TreeNode *)({full_name}->right)"), "TreeNode *", "0x0");
}

#[test]
fn test_tree_items_cast_base_typed_links()
{
    let session = session_with(KEYED_TREE);
    let process = MockProcess::new();
    let tree = process.node("t", "t", "Tree", "{...}");
    tree.field("size", "int", "3");
    let root = tree.field("root", "TreeNode *", "0x10");
    root.field("key", "int", "2");
    root.field("left", "BaseNode *", "0x20");
    root.field("right", "BaseNode *", "0x30");
    cast_leaf(&process, "t.root->left", "0x20", "1");
    cast_leaf(&process, "t.root->right", "0x30", "3");

    let children = session.expand(&visualized(&tree));
    assert_eq!(values(&children), ["1", "2", "3", "{...}"]);
    assert!(process.evaluated().contains(&"(TreeNode *)(t.root->left)".to_string()));
}

#[test]
fn test_tree_items_unparsable_or_zero_size_shows_native_children()
{
    for size in ["many", "0"] {
        let session = session_with(KEYED_TREE);
        let process = MockProcess::new();
        let tree = process.node("t", "t", "Tree", "{...}");
        tree.field("size", "int", size);
        let root = tree_node(&tree, "root", "0x10", "20");
        root.field("left", "TreeNode *", "0x0");
        root.field("right", "TreeNode *", "0x0");

        let children = session.expand(&visualized(&tree));
        assert_eq!(names(&children), ["size", "root"], "size {size}");
    }
}

#[test]
fn test_tree_items_null_head_shows_native_children()
{
    let session = session_with(KEYED_TREE);
    let process = MockProcess::new();
    let tree = process.node("t", "t", "Tree", "{...}");
    tree.field("size", "int", "3");
    tree.field("root", "TreeNode *", "0x0");

    let children = session.expand(&visualized(&tree));
    assert_eq!(names(&children), ["size", "root"]);
}

#[test]
fn test_index_list_items_replace_index()
{
    let session = session_with(
        r#"<Type Name="Ring">
             <Expand>
               <IndexListItems>
                 <Size Condition="wrapped">capacity</Size>
                 <Size>count</Size>
                 <ValueNode>*(arr[$i])</ValueNode>
               </IndexListItems>
             </Expand>
           </Type>"#,
    );
    let process = MockProcess::new();
    let ring = process.node("r", "r", "Ring", "{...}");
    ring.field("wrapped", "bool", "false");
    ring.field("capacity", "int", "8");
    ring.field("count", "int", "3");
    ring.field("arr", "int *", "0x1000");
    for (index, value) in ["10", "20", "30"].iter().enumerate() {
        process.scalar(&format!("*(r.arr[{index}])"), "int", value);
    }

    let children = session.expand(&visualized(&ring));
    assert_eq!(names(&children), ["[0]", "[1]", "[2]", RAW_VIEW_NAME]);
    assert_eq!(values(&children[..3]), ["10", "20", "30"]);
}

#[test]
fn test_expanded_item_splices_rule_children()
{
    let body = format!(r#"{PAIR}<Type Name="Handle"><Expand><ExpandedItem>ptr</ExpandedItem></Expand></Type>"#);
    let session = session_with(&body);
    let process = MockProcess::new();
    let handle = process.node("h", "h", "Handle", "{...}");
    let inner = handle.field("ptr", "Pair", "{...}");
    inner.field("a", "int", "1");
    inner.field("b", "int", "2");
    inner.field("has_extra", "bool", "false");

    assert_eq!(names(&session.expand(&visualized(&handle))), ["first", "second", RAW_VIEW_NAME]);
}

#[test]
fn test_self_expanding_item_terminates()
{
    let session = session_with(r#"<Type Name="Echo"><Expand><ExpandedItem>*this</ExpandedItem></Expand></Type>"#);
    let process = MockProcess::new();
    let echo = process.node("e", "e", "Echo", "{...}");
    echo.field("x", "int", "1");
    let echo = visualized(&echo);
    process.define("*(&(e))", &echo);

    assert_eq!(names(&session.expand(&echo)), ["x", RAW_VIEW_NAME]);
}
