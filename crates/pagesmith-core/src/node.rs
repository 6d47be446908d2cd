//! Block tree definitions for the page builder.
//!
//! A page is a forest of [`Node`]s. Nodes are pure data: a kind tag, an
//! opaque property map and an ordered list of exclusively owned children.
//! Children are held behind [`Arc`] so that a new tree produced by the
//! mutation engine can share every subtree it did not touch with the tree
//! it was derived from.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Open key/value map used for `props` and `style`.
pub type Props = Map<String, Value>;

/// Shared handle to an immutable node.
pub type NodeRef = Arc<Node>;

/// Prop key holding a grid child's placement.
pub const GRID_CELL_KEY: &str = "gridCell";
/// Prop key holding a column node's fractional sizes.
pub const COLUMN_SIZES_KEY: &str = "columnSizes";

/// Unique identifier for a node.
///
/// Ids are opaque strings: imported documents keep whatever ids they were
/// saved with, freshly created nodes get `comp-<uuid>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Generate a fresh, never reused id.
    pub fn generate() -> Self {
        Self(format!("comp-{}", Uuid::new_v4().simple()))
    }

    /// Wrap an existing id string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Kind of block a node renders as.
///
/// Unknown tags found in loaded documents are kept as [`BlockKind::Custom`]
/// so they survive a load/save cycle untouched.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BlockKind {
    Heading,
    Text,
    Button,
    Image,
    Section,
    Container,
    Spacer,
    Divider,
    Card,
    Grid,
    Column,
    Video,
    Form,
    ProductsGrid,
    FeaturedProducts,
    ProductSearch,
    ContactForm,
    Newsletter,
    Dropdown,
    Select,
    Slider,
    Banner,
    Testimonials,
    Faq,
    CodeBlock,
    Alert,
    SocialIcons,
    Custom(String),
}

impl BlockKind {
    /// Every built-in kind, in palette order.
    pub const BUILTIN: [BlockKind; 27] = [
        BlockKind::Heading,
        BlockKind::Text,
        BlockKind::Button,
        BlockKind::Image,
        BlockKind::Section,
        BlockKind::Container,
        BlockKind::Spacer,
        BlockKind::Divider,
        BlockKind::Card,
        BlockKind::Grid,
        BlockKind::Column,
        BlockKind::Video,
        BlockKind::Form,
        BlockKind::ProductsGrid,
        BlockKind::FeaturedProducts,
        BlockKind::ProductSearch,
        BlockKind::ContactForm,
        BlockKind::Newsletter,
        BlockKind::Dropdown,
        BlockKind::Select,
        BlockKind::Slider,
        BlockKind::Banner,
        BlockKind::Testimonials,
        BlockKind::Faq,
        BlockKind::CodeBlock,
        BlockKind::Alert,
        BlockKind::SocialIcons,
    ];

    /// The wire tag of this kind.
    pub fn as_str(&self) -> &str {
        match self {
            BlockKind::Heading => "heading",
            BlockKind::Text => "text",
            BlockKind::Button => "button",
            BlockKind::Image => "image",
            BlockKind::Section => "section",
            BlockKind::Container => "container",
            BlockKind::Spacer => "spacer",
            BlockKind::Divider => "divider",
            BlockKind::Card => "card",
            BlockKind::Grid => "grid",
            BlockKind::Column => "column",
            BlockKind::Video => "video",
            BlockKind::Form => "form",
            BlockKind::ProductsGrid => "products-grid",
            BlockKind::FeaturedProducts => "featured-products",
            BlockKind::ProductSearch => "product-search",
            BlockKind::ContactForm => "contact-form",
            BlockKind::Newsletter => "newsletter",
            BlockKind::Dropdown => "dropdown",
            BlockKind::Select => "select",
            BlockKind::Slider => "slider",
            BlockKind::Banner => "banner",
            BlockKind::Testimonials => "testimonials",
            BlockKind::Faq => "faq",
            BlockKind::CodeBlock => "code-block",
            BlockKind::Alert => "alert",
            BlockKind::SocialIcons => "social-icons",
            BlockKind::Custom(tag) => tag,
        }
    }

    /// Check if blocks of this kind hold child blocks.
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            BlockKind::Section
                | BlockKind::Container
                | BlockKind::Card
                | BlockKind::Grid
                | BlockKind::Column
                | BlockKind::Slider
        )
    }
}

impl From<String> for BlockKind {
    fn from(tag: String) -> Self {
        BlockKind::BUILTIN
            .iter()
            .find(|kind| kind.as_str() == tag)
            .cloned()
            .unwrap_or(BlockKind::Custom(tag))
    }
}

impl From<&str> for BlockKind {
    fn from(tag: &str) -> Self {
        BlockKind::from(tag.to_string())
    }
}

impl From<BlockKind> for String {
    fn from(kind: BlockKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single block in the page tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    #[serde(rename = "type")]
    pub kind: BlockKind,
    /// Plain-text body for text-like blocks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default)]
    pub props: Props,
    /// Child blocks in render order.
    #[serde(default)]
    pub children: Vec<NodeRef>,
    /// Presentation overrides merged over props by the renderer.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub style: Props,
    #[serde(rename = "className", default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
}

impl Node {
    /// Create an empty node of the given kind with a fresh id.
    pub fn new(kind: BlockKind) -> Self {
        Self::with_id(NodeId::generate(), kind)
    }

    /// Create an empty node with a specific id.
    pub fn with_id(id: NodeId, kind: BlockKind) -> Self {
        Self {
            id,
            kind,
            content: None,
            props: Props::new(),
            children: Vec::new(),
            style: Props::new(),
            class_name: None,
        }
    }

    /// Builder: set props.
    pub fn with_props(mut self, props: Props) -> Self {
        self.props = props;
        self
    }

    /// Builder: set children.
    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children.into_iter().map(Arc::new).collect();
        self
    }

    /// Builder: set text content.
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Get a prop value.
    pub fn prop(&self, key: &str) -> Option<&Value> {
        self.props.get(key)
    }

    /// Get a prop as an unsigned integer, accepting numeric strings.
    pub fn prop_u32(&self, key: &str) -> Option<u32> {
        match self.props.get(key)? {
            Value::Number(n) => n
                .as_u64()
                .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
                .map(|n| n.min(u32::MAX as u64) as u32),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Get a prop as a string slice.
    pub fn prop_str(&self, key: &str) -> Option<&str> {
        self.props.get(key).and_then(Value::as_str)
    }

    /// Set a prop value.
    pub fn set_prop(&mut self, key: impl Into<String>, value: Value) {
        self.props.insert(key.into(), value);
    }

    /// Number of nodes in this subtree, including this node.
    pub fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(|c| c.subtree_len()).sum::<usize>()
    }

    /// Visit every id in this subtree, depth-first, parents first.
    pub fn visit_ids<'a>(&'a self, f: &mut impl FnMut(&'a NodeId)) {
        f(&self.id);
        for child in &self.children {
            child.visit_ids(f);
        }
    }

    /// Check if `id` names this node or any descendant.
    pub fn contains(&self, id: &NodeId) -> bool {
        self.id == *id || self.children.iter().any(|c| c.contains(id))
    }
}

/// Build a props map from a JSON object literal.
///
/// Non-object values yield an empty map.
pub fn props(value: Value) -> Props {
    match value {
        Value::Object(map) => map,
        _ => Props::new(),
    }
}
