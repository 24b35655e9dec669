//! In-memory stand-in for a debuggee.
//!
//! A [`MockProcess`] is a table from expression text to value. Every
//! [`MockVariable`] created through it is registered under its full name, so a
//! substituted field access like `v.size` resolves without extra setup; other
//! expressions (casts, comparisons, array views) are registered explicitly.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;

use natview_core::{
    Address, EvalError, SessionConfig, Variable, VariableRef, VisualizerRegistry, VisualizerSession,
};

#[derive(Default)]
pub struct MockProcess
{
    expressions: RefCell<HashMap<String, VariableRef>>,
    evaluated: RefCell<Vec<String>>,
}

impl MockProcess
{
    pub fn new() -> Rc<Self>
    {
        Rc::new(Self::default())
    }

    /// Make `expression` evaluate to `value`.
    pub fn define(&self, expression: &str, value: &VariableRef)
    {
        self.expressions
            .borrow_mut()
            .insert(expression.to_string(), VariableRef::clone(value));
    }

    /// Register a scalar result for `expression`.
    pub fn scalar(self: &Rc<Self>, expression: &str, type_name: &str, value: &str) -> VariableRef
    {
        let result = self.variable(expression, expression, type_name, value);
        self.define(expression, &result);
        result
    }

    /// Create a variable and register it under its full name.
    pub fn variable(self: &Rc<Self>, name: &str, full_name: &str, type_name: &str, value: &str) -> VariableRef
    {
        self.node(name, full_name, type_name, value)
    }

    /// Like [`MockProcess::variable`], keeping the concrete type for wiring children.
    pub fn node(self: &Rc<Self>, name: &str, full_name: &str, type_name: &str, value: &str) -> Rc<MockVariable>
    {
        let variable = Rc::new(MockVariable {
            process: Rc::clone(self),
            name: name.to_string(),
            full_name: full_name.to_string(),
            type_name: type_name.to_string(),
            value: value.to_string(),
            children: RefCell::new(Vec::new()),
            base: RefCell::new(None),
            visualized: Cell::new(false),
        });
        let as_ref: VariableRef = variable.clone();
        self.define(full_name, &as_ref);
        variable
    }

    /// Expressions handed to the evaluator so far, in order.
    pub fn evaluated(&self) -> Vec<String>
    {
        self.evaluated.borrow().clone()
    }

    fn evaluate(&self, expression: &str) -> Result<VariableRef, EvalError>
    {
        self.evaluated.borrow_mut().push(expression.to_string());
        self.expressions
            .borrow()
            .get(expression)
            .cloned()
            .ok_or_else(|| EvalError::Failed {
                expression: expression.to_string(),
                reason: "unknown expression".to_string(),
            })
    }
}

pub struct MockVariable
{
    process: Rc<MockProcess>,
    name: String,
    full_name: String,
    type_name: String,
    value: String,
    children: RefCell<Vec<VariableRef>>,
    base: RefCell<Option<VariableRef>>,
    visualized: Cell<bool>,
}

impl MockVariable
{
    pub fn add_child(&self, child: &VariableRef)
    {
        self.children.borrow_mut().push(VariableRef::clone(child));
    }

    /// Create a child named `name` with full name `<parent>.<name>` (or `->` for pointers).
    pub fn field(&self, name: &str, type_name: &str, value: &str) -> Rc<MockVariable>
    {
        let separator = if self.type_name.trim_end().ends_with('*') { "->" } else { "." };
        let full_name = format!("{}{separator}{name}", self.full_name);
        let child = self.process.node(name, &full_name, type_name, value);
        let as_ref: VariableRef = child.clone();
        self.add_child(&as_ref);
        child
    }

    pub fn set_base(&self, base: &VariableRef)
    {
        *self.base.borrow_mut() = Some(VariableRef::clone(base));
    }

    pub fn mark_visualized(&self)
    {
        self.visualized.set(true);
    }
}

impl Variable for MockVariable
{
    fn name(&self) -> String
    {
        self.name.clone()
    }

    fn full_name(&self) -> String
    {
        self.full_name.clone()
    }

    fn value(&self) -> String
    {
        self.value.clone()
    }

    fn type_name(&self) -> String
    {
        self.type_name.clone()
    }

    fn address(&self) -> Address
    {
        Address::parse_leading(&self.value).unwrap_or(Address::ZERO)
    }

    fn size(&self) -> u64
    {
        8
    }

    fn is_error(&self) -> bool
    {
        false
    }

    fn children(&self) -> Vec<VariableRef>
    {
        self.children.borrow().clone()
    }

    fn base_class(&self) -> Option<VariableRef>
    {
        self.base.borrow().clone()
    }

    fn evaluate(&self, expression: &str) -> Result<VariableRef, EvalError>
    {
        self.process.evaluate(expression)
    }

    fn is_visualized(&self) -> bool
    {
        self.visualized.get()
    }
}

/// Wrap type definitions in an `AutoVisualizer` document.
pub fn natvis(body: &str) -> String
{
    format!(r#"<?xml version="1.0" encoding="utf-8"?>
<AutoVisualizer xmlns="http://schemas.microsoft.com/vstudio/debugger/natvis/2010">
{body}
</AutoVisualizer>"#)
}

/// A session over a registry loaded with one document.
pub fn session_with(body: &str) -> VisualizerSession
{
    session_with_config(body, SessionConfig::default())
}

pub fn session_with_config(body: &str, config: SessionConfig) -> VisualizerSession
{
    let registry = Arc::new(VisualizerRegistry::new());
    registry.load("test.natvis", &natvis(body)).unwrap();
    VisualizerSession::new(registry, config)
}

pub fn names(children: &[VariableRef]) -> Vec<String>
{
    children.iter().map(|child| child.name()).collect()
}

pub fn values(children: &[VariableRef]) -> Vec<String>
{
    children.iter().map(|child| child.value()).collect()
}
