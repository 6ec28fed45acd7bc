//! `$ref` resolution.
//!
//! References are resolved lazily, the first time validation reaches a node
//! that carries one, because forward and cross-document references are legal
//! at compile time. Recognized shapes, in the order they are tried:
//!
//! | Shape | Looked up in |
//! |-------|--------------|
//! | `#/$defs/<name>` (or `#/definitions/<name>`) | `$defs` of the document enclosing the referencing node |
//! | `http(s)://host/path[#fragment]` | document registered under `host/path`, in the current schema then the others |
//! | `/path[#fragment]` | same, with host taken from the current document's `$id` |
//! | `#<anchor>` | anchor table of the current document (`#` alone is the document itself) |

use std::collections::{HashMap, HashSet};

use tracing::trace;
use url::Url;

use crate::diagnostics::unescape_token;
use crate::error::ResolutionError;
use crate::schema::{document_key, CompiledSchema, NodeId, NodeRef};

/// Resolve one `$ref` step.
///
/// The returned node may itself carry a `$ref`; use [`resolve_chain`] to
/// follow references until a concrete node is reached.
///
/// # Errors
///
/// Returns `ResolutionError` for unsupported shapes and for any lookup miss.
pub fn resolve<'s>(
    reference: &str,
    context: NodeRef<'s>,
    others: &[&'s CompiledSchema],
) -> Result<NodeRef<'s>, ResolutionError> {
    let schema = context.schema;
    let document = schema.nearest_identified(context.id);

    if reference == "#" {
        return Ok(context.with(document));
    }
    if let Some(pointer) = reference.strip_prefix("#/") {
        return definitions(reference, pointer, context, document);
    }
    if let Some(anchor) = reference.strip_prefix('#') {
        return schema
            .anchor(document, anchor)
            .map(|id| context.with(id))
            .ok_or_else(|| ResolutionError::AnchorNotFound {
                reference: reference.to_string(),
                anchor: anchor.to_string(),
            });
    }
    if reference.starts_with("http://") || reference.starts_with("https://") {
        let url = Url::parse(reference).map_err(|_| ResolutionError::Unsupported {
            reference: reference.to_string(),
        })?;
        return external(reference, &url, schema, others);
    }
    if reference.starts_with('/') {
        let base = schema
            .node(document)
            .base_uri()
            .filter(|base| base.has_host())
            .ok_or_else(|| ResolutionError::NoBaseUri {
                reference: reference.to_string(),
            })?;
        let url = base.join(reference).map_err(|_| ResolutionError::Unsupported {
            reference: reference.to_string(),
        })?;
        return external(reference, &url, schema, others);
    }

    Err(ResolutionError::Unsupported {
        reference: reference.to_string(),
    })
}

/// Follow `$ref` from `start` until a node without one is reached.
///
/// # Errors
///
/// Fails on the first unresolvable step, or with `ResolutionError::Cycle`
/// if the chain revisits a node.
pub fn resolve_chain<'s>(
    start: NodeRef<'s>,
    others: &[&'s CompiledSchema],
) -> Result<NodeRef<'s>, ResolutionError> {
    let mut visited = HashSet::new();
    let mut current = start;
    while let Some(reference) = current.node().reference() {
        if !visited.insert(current.key()) {
            return Err(ResolutionError::Cycle {
                reference: reference.to_string(),
            });
        }
        let target = resolve(reference, current, others)?;
        trace!(reference, target = target.id.index(), "resolved $ref");
        current = target;
    }
    Ok(current)
}

/// Per-run resolution cache, keyed by the node carrying the `$ref`.
#[derive(Debug)]
pub(crate) struct Resolver<'s> {
    others: Vec<&'s CompiledSchema>,
    cache: HashMap<(usize, NodeId), Result<NodeRef<'s>, ResolutionError>>,
}

impl<'s> Resolver<'s> {
    pub fn new(others: &[&'s CompiledSchema]) -> Self {
        Self {
            others: others.to_vec(),
            cache: HashMap::new(),
        }
    }

    pub fn follow(&mut self, start: NodeRef<'s>) -> Result<NodeRef<'s>, ResolutionError> {
        if start.node().reference().is_none() {
            return Ok(start);
        }
        if let Some(cached) = self.cache.get(&start.key()) {
            return cached.clone();
        }
        let result = resolve_chain(start, &self.others);
        self.cache.insert(start.key(), result.clone());
        result
    }

    /// Number of distinct `$ref` nodes resolved so far.
    pub fn len(&self) -> usize {
        self.cache.len()
    }
}

/// `#/$defs/a` or `#/$defs/a/$defs/b`, walked from the document root like a
/// JSON pointer. Later names must be nested inside the previous target.
fn definitions<'s>(
    reference: &str,
    pointer: &str,
    context: NodeRef<'s>,
    document: NodeId,
) -> Result<NodeRef<'s>, ResolutionError> {
    let schema = context.schema;
    let unsupported = || ResolutionError::Unsupported {
        reference: reference.to_string(),
    };
    let not_found = || ResolutionError::DefinitionNotFound {
        reference: reference.to_string(),
    };

    let segments: Vec<String> = pointer.split('/').map(unescape_token).collect();
    let mut pairs = segments.chunks(2);

    let Some([keyword, name]) = pairs.next() else {
        return Err(unsupported());
    };
    if keyword != "$defs" && keyword != "definitions" {
        return Err(unsupported());
    }

    let root = schema.node(document);
    if root.defs.is_empty() {
        return Err(ResolutionError::MissingDefinitions {
            reference: reference.to_string(),
            document: root.id().unwrap_or("<anonymous>").to_string(),
        });
    }
    let mut target = root.definition(name).ok_or_else(not_found)?;

    for pair in pairs {
        let [keyword, name] = pair else {
            return Err(unsupported());
        };
        if keyword != "$defs" && keyword != "definitions" {
            return Err(unsupported());
        }
        target = schema.node(target).definition(name).ok_or_else(not_found)?;
    }
    Ok(context.with(target))
}

/// Look up an absolute URL, first in `schema`'s own id table, then in each
/// auxiliary schema in order, and apply the fragment.
fn external<'s>(
    reference: &str,
    url: &Url,
    schema: &'s CompiledSchema,
    others: &[&'s CompiledSchema],
) -> Result<NodeRef<'s>, ResolutionError> {
    let key = document_key(url);
    let document = std::iter::once(schema)
        .chain(others.iter().copied())
        .find_map(|candidate| {
            candidate
                .lookup_document(&key)
                .map(|id| NodeRef::new(candidate, id))
        })
        .ok_or_else(|| ResolutionError::UnknownDocument {
            reference: reference.to_string(),
            document: key.clone(),
        })?;

    match url.fragment() {
        None | Some("") => Ok(document),
        Some(fragment) if fragment.starts_with('/') => {
            definitions(reference, &fragment[1..], document, document.id)
        }
        Some(anchor) => document
            .schema
            .anchor(document.id, anchor)
            .map(|id| document.with(id))
            .ok_or_else(|| ResolutionError::AnchorNotFound {
                reference: reference.to_string(),
                anchor: anchor.to_string(),
            }),
    }
}
