//! # JSON shape
//!
//! Plain-data representation of the model, keyed by `object`:
//!
//! ```json
//! {
//!   "object": "value",
//!   "document": {
//!     "object": "document",
//!     "nodes": [
//!       { "object": "block", "type": "paragraph", "nodes": [
//!         { "object": "text", "leaves": [{ "text": "Hello", "marks": [{ "type": "bold" }] }] }
//!       ] }
//!     ]
//!   }
//! }
//! ```
//!
//! Construction fills defaults (`key` generated, `data` = `{}`, `isVoid` =
//! false, an element without `nodes` gets one empty text) and checks
//! child kinds. Serialization emits the default-filled shape and omits keys
//! and selection unless [`SerializeOptions`] asks for them.

use crate::document::Document;
use crate::error::{ModelError, ModelResult};
use crate::key_generator::KeyGenerator;
use crate::leaf::{Leaf, Leaves};
use crate::mark::Data;
use crate::node::{validate_tree, Element, Node, NodeKind};
use crate::range::Range;
use crate::text::Text;
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SerializeOptions {
    pub preserve_keys: bool,
    pub preserve_selection: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "object", rename_all = "lowercase")]
pub enum NodeJson {
    Block(ElementJson),
    Inline(ElementJson),
    Text(TextJson),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementJson {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default)]
    pub is_void: bool,
    #[serde(default)]
    pub data: Data,
    #[serde(default)]
    pub nodes: Vec<NodeJson>,
}

/// A text node; `text` is a shorthand for a single unmarked run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextJson {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leaves: Option<Vec<Leaf>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentTag {
    #[default]
    Document,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentJson {
    #[serde(default)]
    pub object: DocumentTag,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default)]
    pub data: Data,
    #[serde(default)]
    pub nodes: Vec<NodeJson>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueTag {
    #[default]
    Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueJson {
    #[serde(default)]
    pub object: ValueTag,
    pub document: DocumentJson,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selection: Option<Range>,
}

// ----------------------------------------------------------------------------
// Construction
// ----------------------------------------------------------------------------

fn build_node(json: NodeJson, keys: &KeyGenerator) -> ModelResult<Node> {
    match json {
        NodeJson::Block(element) => Ok(Node::block(build_element(NodeKind::Block, element, keys)?)),
        NodeJson::Inline(element) => Ok(Node::inline(build_element(NodeKind::Inline, element, keys)?)),
        NodeJson::Text(text) => Ok(Node::text(build_text(text, keys)?)),
    }
}

fn build_element(kind: NodeKind, json: ElementJson, keys: &KeyGenerator) -> ModelResult<Element> {
    if json.node_type.is_empty() {
        return Err(ModelError::invalid_shape(format!("{} `type` must not be empty", kind.name())));
    }
    let key = json.key.unwrap_or_else(|| keys.next_key());
    let mut element = Element::new(key, json.node_type).with_void(json.is_void);
    for (k, v) in json.data {
        element = element.with_data(k, v);
    }
    if json.nodes.is_empty() {
        return Ok(element.with_child(Node::text(Text::empty(keys.next_key()))));
    }
    for child in json.nodes {
        let child = build_node(child, keys)?;
        if !kind.can_contain(child.kind()) {
            return Err(ModelError::invalid_shape(format!(
                "a {} cannot contain a {}",
                kind.name(),
                child.kind().name()
            )));
        }
        element = element.with_child(child);
    }
    Ok(element)
}

fn build_text(json: TextJson, keys: &KeyGenerator) -> ModelResult<Text> {
    let key = json.key.unwrap_or_else(|| keys.next_key());
    let leaves = match (json.leaves, json.text) {
        (Some(_), Some(_)) => {
            return Err(ModelError::invalid_shape("text has both `leaves` and `text`"));
        }
        (Some(leaves), None) => Leaves::new(leaves),
        (None, Some(text)) => Leaves::plain(text),
        (None, None) => Leaves::empty(),
    };
    Ok(Text::new(key, leaves))
}

fn build_document(json: DocumentJson, keys: &KeyGenerator) -> ModelResult<Document> {
    let key = json.key.unwrap_or_else(|| keys.next_key());
    let nodes = json
        .nodes
        .into_iter()
        .map(|n| build_node(n, keys))
        .collect::<ModelResult<Vec<_>>>()?;
    Ok(Document::new(key, nodes)?.with_data(json.data))
}

fn check_unique(node: &Node) -> ModelResult<()> {
    let mut seen = HashSet::from([node.key().to_string()]);
    validate_tree(node.kind(), node.nodes(), &mut seen).map_err(|e| match e {
        ModelError::DuplicateKey(k) => ModelError::invalid_shape(format!("duplicate key `{k}`")),
        other => other,
    })
}

/// Input accepted by [`Node::create`]
#[derive(Debug, Clone)]
pub enum NodeInput {
    /// A type tag; produces an element with one empty text
    Tag(String),
    /// Plain data in the JSON shape
    Shape(serde_json::Value),
    /// An existing node, returned as is
    Node(Node),
}

impl From<&str> for NodeInput {
    fn from(tag: &str) -> Self {
        NodeInput::Tag(tag.to_string())
    }
}

impl From<String> for NodeInput {
    fn from(tag: String) -> Self {
        NodeInput::Tag(tag)
    }
}

impl From<serde_json::Value> for NodeInput {
    fn from(shape: serde_json::Value) -> Self {
        NodeInput::Shape(shape)
    }
}

impl From<Node> for NodeInput {
    fn from(node: Node) -> Self {
        NodeInput::Node(node)
    }
}

impl Node {
    /// Create a node from a shape carrying its own `object`, or from an
    /// existing node. A bare tag creates a block.
    pub fn create(input: impl Into<NodeInput>) -> ModelResult<Node> {
        Self::create_as(NodeKind::Block, input.into(), KeyGenerator::global(), false)
    }

    pub fn create_block(input: impl Into<NodeInput>) -> ModelResult<Node> {
        Self::create_as(NodeKind::Block, input.into(), KeyGenerator::global(), true)
    }

    pub fn create_inline(input: impl Into<NodeInput>) -> ModelResult<Node> {
        Self::create_as(NodeKind::Inline, input.into(), KeyGenerator::global(), true)
    }

    /// Create with an explicit key generator
    pub fn create_with(input: impl Into<NodeInput>, keys: &KeyGenerator) -> ModelResult<Node> {
        Self::create_as(NodeKind::Block, input.into(), keys, false)
    }

    fn create_as(kind: NodeKind, input: NodeInput, keys: &KeyGenerator, default_object: bool) -> ModelResult<Node> {
        match input {
            NodeInput::Node(node) => Ok(node),
            NodeInput::Tag(tag) => {
                let json = ElementJson {
                    key: None,
                    node_type: tag,
                    is_void: false,
                    data: Data::new(),
                    nodes: Vec::new(),
                };
                let element = build_element(kind, json, keys)?;
                Ok(match kind {
                    NodeKind::Inline => Node::inline(element),
                    _ => Node::block(element),
                })
            }
            NodeInput::Shape(mut shape) => {
                if default_object {
                    if let Some(map) = shape.as_object_mut() {
                        map.entry("object")
                            .or_insert_with(|| serde_json::Value::from(kind.name()));
                    }
                }
                let json: NodeJson = serde_json::from_value(shape)?;
                let node = build_node(json, keys)?;
                check_unique(&node)?;
                Ok(node)
            }
        }
    }

    pub fn from_json(json: NodeJson) -> ModelResult<Node> {
        let node = build_node(json, KeyGenerator::global())?;
        check_unique(&node)?;
        Ok(node)
    }

    pub fn to_json(&self, options: SerializeOptions) -> NodeJson {
        let key = options.preserve_keys.then(|| self.key().to_string());
        match self {
            Node::Block(e) => NodeJson::Block(element_json(e, key, options)),
            Node::Inline(e) => NodeJson::Inline(element_json(e, key, options)),
            Node::Text(t) => NodeJson::Text(TextJson {
                key,
                leaves: Some(t.leaves().as_slice().to_vec()),
                text: None,
            }),
        }
    }
}

fn element_json(element: &Element, key: Option<String>, options: SerializeOptions) -> ElementJson {
    ElementJson {
        key,
        node_type: element.node_type().to_string(),
        is_void: element.is_void(),
        data: element.data().clone(),
        nodes: element.nodes().iter().map(|n| n.to_json(options)).collect(),
    }
}

impl TryFrom<NodeJson> for Node {
    type Error = ModelError;

    fn try_from(json: NodeJson) -> ModelResult<Node> {
        Node::from_json(json)
    }
}

impl From<Node> for NodeJson {
    fn from(node: Node) -> Self {
        node.to_json(SerializeOptions {
            preserve_keys: true,
            preserve_selection: false,
        })
    }
}

impl Serialize for Node {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        NodeJson::from(self.clone()).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let json = NodeJson::deserialize(deserializer)?;
        Node::try_from(json).map_err(serde::de::Error::custom)
    }
}

impl Document {
    pub fn from_json(json: DocumentJson) -> ModelResult<Document> {
        build_document(json, KeyGenerator::global())
    }

    pub fn from_json_with(json: DocumentJson, keys: &KeyGenerator) -> ModelResult<Document> {
        build_document(json, keys)
    }

    pub fn to_json(&self, options: SerializeOptions) -> DocumentJson {
        DocumentJson {
            object: DocumentTag::Document,
            key: options.preserve_keys.then(|| self.key().to_string()),
            data: self.data().clone(),
            nodes: self.nodes().iter().map(|n| n.to_json(options)).collect(),
        }
    }
}

impl Value {
    /// Build a value; a missing or unresolvable selection becomes a cursor at
    /// the document start
    pub fn from_json(json: ValueJson) -> ModelResult<Value> {
        Self::from_json_with(json, KeyGenerator::global())
    }

    pub fn from_json_with(json: ValueJson, keys: &KeyGenerator) -> ModelResult<Value> {
        let document = build_document(json.document, keys)?;
        let value = Value::new(document);
        match json.selection {
            Some(selection) if selection.normalize(value.document()).is_some() => {
                Ok(value.with_selection(Some(selection)))
            }
            _ => Ok(value),
        }
    }

    pub fn from_json_str(input: &str) -> ModelResult<Value> {
        Self::from_json(serde_json::from_str(input)?)
    }

    pub fn to_json(&self, options: SerializeOptions) -> ValueJson {
        ValueJson {
            object: ValueTag::Value,
            document: self.document().to_json(options),
            selection: if options.preserve_selection {
                self.selection().cloned()
            } else {
                None
            },
        }
    }

    pub fn to_json_value(&self, options: SerializeOptions) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self.to_json(options))
    }
}
