//! Compiled schema representation.
//!
//! A compiled schema is a flat arena of [`SchemaNode`]s addressed by
//! [`NodeId`]. Parent links are indices into the same arena, so a node can
//! walk upward to its enclosing document without holding a reference to it.
//! `$ref` strings stay unresolved here; the validator resolves them on demand
//! because a reference may point into another compiled schema.

use std::collections::HashMap;

use regex::Regex;
use serde_json::{Number, Value};
use url::Url;

use crate::types::{Draft, TypeMask};

/// Index of a node inside its [`CompiledSchema`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// The root node of every compiled schema.
    pub const ROOT: NodeId = NodeId(0);

    pub fn index(self) -> usize {
        self.0
    }
}

/// Key under which a schema document is registered: host followed by path,
/// without scheme or fragment (`example.com/schemas/point.json`).
pub fn document_key(url: &Url) -> String {
    format!("{}{}", url.host_str().unwrap_or_default(), url.path())
}

/// A `pattern` or `patternProperties` regular expression, compiled once when
/// the schema is built.
#[derive(Debug, Clone)]
pub enum Pattern {
    Compiled(Regex),
    /// The expression did not compile; the owning sub-schema rejects
    /// strings it would have been applied to.
    Invalid { source: String, error: String },
}

impl Pattern {
    pub fn new(source: &str) -> Self {
        match Regex::new(source) {
            Ok(regex) => Pattern::Compiled(regex),
            Err(err) => Pattern::Invalid {
                source: source.to_string(),
                error: err.to_string(),
            },
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Pattern::Compiled(regex) => regex.as_str(),
            Pattern::Invalid { source, .. } => source,
        }
    }

    /// Unanchored search. Returns the compile error for invalid expressions.
    pub fn is_match(&self, text: &str) -> Result<bool, &str> {
        match self {
            Pattern::Compiled(regex) => Ok(regex.is_match(text)),
            Pattern::Invalid { error, .. } => Err(error),
        }
    }
}

/// Policy for values not covered by the primary keyword: `additionalProperties`,
/// `unevaluatedProperties`, `additionalItems` and `unevaluatedItems`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Applicator {
    /// Keyword absent or `true`.
    #[default]
    Allow,
    /// Keyword is `false`.
    Deny,
    /// Keyword holds a schema the value must satisfy.
    Schema(NodeId),
}

/// The `items` keyword: one schema for every item, or one per position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Items {
    Single(NodeId),
    Tuple(Vec<NodeId>),
}

/// A numeric bound as written in the schema.
///
/// `exact` holds the value as a 64-bit integer when the bound is integral,
/// so integer data can be compared without going through doubles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bound {
    pub value: f64,
    pub exact: Option<i64>,
}

impl Bound {
    pub fn from_number(number: &Number) -> Option<Self> {
        if let Some(i) = number.as_i64() {
            return Some(Bound {
                value: i as f64,
                exact: Some(i),
            });
        }
        let value = number.as_f64()?;
        let exact = if value.fract() == 0.0 && value >= i64::MIN as f64 && value < i64::MAX as f64
        {
            Some(value as i64)
        } else {
            None
        };
        Some(Bound { value, exact })
    }
}

/// Identity metadata of a node.
#[derive(Debug, Clone, Default)]
pub struct Identity {
    /// `$id` (or legacy `id`) exactly as written.
    pub id: Option<String>,
    /// Absolute base URI derived from `$id`, when it could be resolved.
    pub base: Option<Url>,
    /// Key in the document id table, see [`document_key`].
    pub key: Option<String>,
    pub anchor: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ObjectConstraints {
    pub required: Vec<String>,
    pub properties: HashMap<String, NodeId>,
    /// In document order; the first matching expression wins.
    pub pattern_properties: Vec<(Pattern, NodeId)>,
    pub additional_properties: Applicator,
    pub unevaluated_properties: Applicator,
    pub dependent_required: Vec<(String, Vec<String>)>,
    pub min_properties: Option<u64>,
    pub max_properties: Option<u64>,
}

#[derive(Debug, Clone, Default)]
pub struct ArrayConstraints {
    pub items: Option<Items>,
    pub additional_items: Applicator,
    pub unevaluated_items: Applicator,
    pub contains: Option<NodeId>,
    pub min_contains: Option<u64>,
    pub max_contains: Option<u64>,
    pub unique_items: bool,
    pub min_items: Option<u64>,
    pub max_items: Option<u64>,
}

#[derive(Debug, Clone, Default)]
pub struct StringConstraints {
    pub min_length: Option<u64>,
    pub max_length: Option<u64>,
    pub pattern: Option<Pattern>,
}

#[derive(Debug, Clone, Default)]
pub struct NumberConstraints {
    pub minimum: Option<Bound>,
    pub maximum: Option<Bound>,
    pub exclusive_minimum: Option<Bound>,
    pub exclusive_maximum: Option<Bound>,
    pub multiple_of: Option<Bound>,
}

/// The compiled form of one sub-schema.
#[derive(Debug, Clone)]
pub struct SchemaNode {
    pub(crate) parent: Option<NodeId>,
    /// Set for the boolean schemas `true` and `false`.
    pub(crate) boolean: Option<bool>,
    pub(crate) types: TypeMask,
    pub(crate) identity: Identity,
    pub(crate) const_value: Option<Value>,
    pub(crate) enum_values: Option<Vec<Value>>,
    pub(crate) all_of: Option<Vec<NodeId>>,
    pub(crate) any_of: Option<Vec<NodeId>>,
    pub(crate) one_of: Option<Vec<NodeId>>,
    pub(crate) not: Option<NodeId>,
    pub(crate) reference: Option<String>,
    /// `$defs` and `definitions` declared on this node.
    pub(crate) defs: HashMap<String, NodeId>,
    pub(crate) object: ObjectConstraints,
    pub(crate) array: ArrayConstraints,
    pub(crate) string: StringConstraints,
    pub(crate) number: NumberConstraints,
    /// Only populated on nodes that start a document (carry `$id`, or the root).
    pub(crate) anchors: HashMap<String, NodeId>,
    /// Only populated on the root.
    pub(crate) ids: HashMap<String, NodeId>,
}

impl SchemaNode {
    pub(crate) fn new(parent: Option<NodeId>) -> Self {
        Self {
            parent,
            boolean: None,
            types: TypeMask::ALL,
            identity: Identity::default(),
            const_value: None,
            enum_values: None,
            all_of: None,
            any_of: None,
            one_of: None,
            not: None,
            reference: None,
            defs: HashMap::new(),
            object: ObjectConstraints::default(),
            array: ArrayConstraints::default(),
            string: StringConstraints::default(),
            number: NumberConstraints::default(),
            anchors: HashMap::new(),
            ids: HashMap::new(),
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn types(&self) -> TypeMask {
        self.types
    }

    pub fn id(&self) -> Option<&str> {
        self.identity.id.as_deref()
    }

    pub fn base_uri(&self) -> Option<&Url> {
        self.identity.base.as_ref()
    }

    pub fn anchor(&self) -> Option<&str> {
        self.identity.anchor.as_deref()
    }

    pub fn title(&self) -> Option<&str> {
        self.identity.title.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.identity.description.as_deref()
    }

    pub fn reference(&self) -> Option<&str> {
        self.reference.as_deref()
    }

    pub fn boolean(&self) -> Option<bool> {
        self.boolean
    }

    /// Named sub-schema declared in this node's `$defs`.
    pub fn definition(&self, name: &str) -> Option<NodeId> {
        self.defs.get(name).copied()
    }

    pub fn const_value(&self) -> Option<&Value> {
        self.const_value.as_ref()
    }

    pub fn enum_values(&self) -> Option<&[Value]> {
        self.enum_values.as_deref()
    }

    pub fn all_of(&self) -> Option<&[NodeId]> {
        self.all_of.as_deref()
    }

    pub fn any_of(&self) -> Option<&[NodeId]> {
        self.any_of.as_deref()
    }

    pub fn one_of(&self) -> Option<&[NodeId]> {
        self.one_of.as_deref()
    }

    pub fn not(&self) -> Option<NodeId> {
        self.not
    }

    pub fn object(&self) -> &ObjectConstraints {
        &self.object
    }

    pub fn array(&self) -> &ArrayConstraints {
        &self.array
    }

    pub fn string(&self) -> &StringConstraints {
        &self.string
    }

    pub fn number(&self) -> &NumberConstraints {
        &self.number
    }

    fn has_composition(&self) -> bool {
        self.all_of.is_some() || self.any_of.is_some() || self.one_of.is_some() || self.not.is_some()
    }
}

/// A compiled schema document.
///
/// Immutable once built, so it can be shared across threads and reused for
/// any number of validation runs.
#[derive(Debug, Clone)]
pub struct CompiledSchema {
    pub(crate) nodes: Vec<SchemaNode>,
    pub(crate) draft: Draft,
}

impl CompiledSchema {
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Node for an id produced by this schema.
    pub fn node(&self, id: NodeId) -> &SchemaNode {
        &self.nodes[id.0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn draft(&self) -> Draft {
        self.draft
    }

    /// `$id` of the root node.
    pub fn id(&self) -> Option<&str> {
        self.node(self.root()).id()
    }

    /// Id table keys (see [`document_key`]) of every document in this schema.
    pub fn document_keys(&self) -> impl Iterator<Item = &str> {
        self.node(self.root()).ids.keys().map(String::as_str)
    }

    /// Number of anchors declared across all documents.
    pub fn anchor_count(&self) -> usize {
        self.nodes.iter().map(|node| node.anchors.len()).sum()
    }

    /// Nearest node, starting at `id` itself, that carries an `$id`.
    /// Falls back to the outermost ancestor.
    pub fn nearest_identified(&self, id: NodeId) -> NodeId {
        let mut current = id;
        loop {
            let node = self.node(current);
            if node.identity.key.is_some() {
                return current;
            }
            match node.parent {
                Some(parent) => current = parent,
                None => return current,
            }
        }
    }

    /// Outermost ancestor of `id` (the root for every node of this schema).
    pub fn outermost(&self, id: NodeId) -> NodeId {
        let mut current = id;
        while let Some(parent) = self.node(current).parent {
            current = parent;
        }
        current
    }

    /// Look up an anchor in the anchor table of document `document`.
    pub fn anchor(&self, document: NodeId, name: &str) -> Option<NodeId> {
        self.node(document).anchors.get(name).copied()
    }

    /// Look up a document by its id table key.
    pub fn lookup_document(&self, key: &str) -> Option<NodeId> {
        self.node(self.root()).ids.get(key).copied()
    }

    pub(crate) fn has_composition(&self, id: NodeId) -> bool {
        self.node(id).has_composition()
    }
}

/// A node together with the compiled schema that owns it.
#[derive(Debug, Clone, Copy)]
pub struct NodeRef<'s> {
    pub schema: &'s CompiledSchema,
    pub id: NodeId,
}

impl<'s> NodeRef<'s> {
    pub fn new(schema: &'s CompiledSchema, id: NodeId) -> Self {
        Self { schema, id }
    }

    pub fn root(schema: &'s CompiledSchema) -> Self {
        Self::new(schema, schema.root())
    }

    pub fn node(&self) -> &'s SchemaNode {
        self.schema.node(self.id)
    }

    /// Another node of the same schema.
    pub fn with(&self, id: NodeId) -> Self {
        Self::new(self.schema, id)
    }

    /// Identity of the node across schemas, usable as a map key.
    pub(crate) fn key(&self) -> (usize, NodeId) {
        (self.schema as *const CompiledSchema as usize, self.id)
    }
}

impl PartialEq for NodeRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for NodeRef<'_> {}
