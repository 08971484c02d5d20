//! Node and property-value model for repository content.
//!
//! A [`Node`] mirrors the shape of authored configuration content: a name,
//! a primary node type, a set of typed properties and an ordered list of
//! children. Source trees are authored out-of-band and read as owned copies;
//! target trees are produced by the materializer.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::PN_LOOP;
use crate::path::Path;

/// A typed property value stored on a [`Node`].
///
/// `Value` implements `PartialEq` against primitives for ergonomic
/// assertions:
///
/// ```
/// # use foliate::node::Value;
/// assert!(Value::Text("hello".to_string()) == "hello");
/// assert!(Value::Int(42) == 42);
/// assert!(Value::Bool(true) == true);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// UTF-8 text string value
    Text(String),
    /// Boolean value
    Bool(bool),
    /// 64-bit signed integer value
    Int(i64),
    /// Multi-valued text property
    TextList(Vec<String>),
}

impl Value {
    /// Returns the text content if this is a `Text` value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<Vec<String>> for Value {
    fn from(list: Vec<String>) -> Self {
        Value::TextList(list)
    }
}

impl PartialEq<&str> for Value {
    fn eq(&self, other: &&str) -> bool {
        matches!(self, Value::Text(s) if s == other)
    }
}

impl PartialEq<Value> for &str {
    fn eq(&self, other: &Value) -> bool {
        other == self
    }
}

impl PartialEq<i64> for Value {
    fn eq(&self, other: &i64) -> bool {
        matches!(self, Value::Int(i) if i == other)
    }
}

impl PartialEq<bool> for Value {
    fn eq(&self, other: &bool) -> bool {
        matches!(self, Value::Bool(b) if b == other)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => write!(f, "{s}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::TextList(list) => write!(f, "[{}]", list.join(", ")),
        }
    }
}

/// A node in a configuration tree.
///
/// Properties iterate in deterministic (sorted) order; children keep the
/// order they were authored or created in, which is the order the
/// materializer walks them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    name: String,
    primary_type: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    properties: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    children: Vec<Node>,
}

impl Node {
    /// Creates an empty node with the given name and primary type.
    pub fn new(name: impl Into<String>, primary_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            primary_type: primary_type.into(),
            properties: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    /// The node's own name (last path segment).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The node's primary type.
    pub fn primary_type(&self) -> &str {
        &self.primary_type
    }

    /// Looks up a property by name.
    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    /// Returns `true` if the property is present, whatever its value.
    pub fn has_property(&self, name: &str) -> bool {
        self.properties.contains_key(name)
    }

    /// Sets a property, replacing any previous value.
    pub fn set_property(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.properties.insert(name.into(), value.into());
    }

    /// Iterates over properties in deterministic order.
    pub fn properties(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.properties.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of properties on this node.
    pub fn property_count(&self) -> usize {
        self.properties.len()
    }

    /// Children in authored order.
    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Looks up a child by name.
    pub fn child(&self, name: &str) -> Option<&Node> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Looks up a child by name, mutably.
    pub fn child_mut(&mut self, name: &str) -> Option<&mut Node> {
        self.children.iter_mut().find(|c| c.name == name)
    }

    /// Returns `true` if a same-named child exists.
    pub fn has_child(&self, name: &str) -> bool {
        self.child(name).is_some()
    }

    /// Appends a child, keeping authored order.
    pub fn push_child(&mut self, child: Node) -> &mut Node {
        self.children.push(child);
        self.children.last_mut().unwrap()
    }

    /// Returns the same-named child, creating it at the end of the child
    /// list when absent. An existing child keeps its type and content.
    pub fn ensure_child(&mut self, name: &str, primary_type: &str) -> &mut Node {
        if let Some(idx) = self.children.iter().position(|c| c.name == name) {
            &mut self.children[idx]
        } else {
            self.push_child(Node::new(name, primary_type))
        }
    }

    /// Removes a same-named child and its whole subtree.
    ///
    /// Returns `true` if a child was removed.
    pub fn remove_child(&mut self, name: &str) -> bool {
        let before = self.children.len();
        self.children.retain(|c| c.name != name);
        self.children.len() != before
    }

    /// Walks `path` relative to this node, treating this node as the root.
    pub fn node_at(&self, path: &Path) -> Option<&Node> {
        let mut current = self;
        for component in path.components() {
            current = current.child(component)?;
        }
        Some(current)
    }

    /// Mutable counterpart of [`Node::node_at`].
    pub fn node_at_mut(&mut self, path: &Path) -> Option<&mut Node> {
        let mut current = self;
        for component in path.components() {
            current = current.child_mut(component)?;
        }
        Some(current)
    }

    /// Whether this node is flagged for per-breakpoint expansion.
    pub fn is_breakpoint_loop(&self) -> bool {
        self.has_property(PN_LOOP)
    }
}
