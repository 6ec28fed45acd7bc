//! Schema compiler: turns a parsed schema document into a [`CompiledSchema`].
//!
//! The builder walks the document once, allocating one [`SchemaNode`] per
//! sub-schema and linking it to its parent. Anchor and id tables are
//! collected on the side and installed on their owning document nodes when
//! the walk finishes, so a failed compile never yields a partial schema.

use std::collections::HashMap;

use serde_json::{Map, Value};
use tracing::{debug, trace, warn};
use url::Url;

use crate::diagnostics::escape_token;
use crate::error::CompileError;
use crate::schema::{
    document_key, Applicator, Bound, CompiledSchema, Items, NodeId, Pattern, SchemaNode,
};
use crate::types::{json_type_name, Draft, JsonType, TypeMask};

/// Compile a schema document.
///
/// The top level must be a JSON object.
///
/// # Errors
///
/// Returns `CompileError` for the first malformed keyword found; no partial
/// schema is produced.
pub fn compile_schema(document: &Value) -> Result<CompiledSchema, CompileError> {
    let Some(root) = document.as_object() else {
        return Err(CompileError::NotAnObject {
            path: "#".to_string(),
            actual: json_type_name(document).to_string(),
        });
    };

    let draft = match root.get("$schema") {
        None => Draft::default(),
        Some(Value::String(uri)) => {
            Draft::from_uri(uri).ok_or_else(|| CompileError::UnsupportedVersion { uri: uri.clone() })?
        }
        Some(other) => {
            return Err(CompileError::WrongType {
                path: "#".to_string(),
                keyword: "$schema".to_string(),
                expected: "a string",
                actual: json_type_name(other).to_string(),
            })
        }
    };

    let mut builder = Builder::default();
    let context = Context {
        document: NodeId::ROOT,
        base: None,
    };
    builder.build(document, None, &context)?;
    let schema = builder.finish(draft);

    debug!(
        nodes = schema.len(),
        anchors = schema.anchor_count(),
        draft = %draft,
        id = schema.id().unwrap_or("<anonymous>"),
        "compiled schema"
    );
    Ok(schema)
}

/// Where anchors go and what relative ids resolve against.
#[derive(Debug, Clone)]
struct Context {
    document: NodeId,
    base: Option<Url>,
}

#[derive(Default)]
struct Builder {
    nodes: Vec<SchemaNode>,
    /// Location in the schema document, for error messages.
    path: Vec<String>,
    anchors: HashMap<NodeId, HashMap<String, NodeId>>,
    ids: HashMap<String, NodeId>,
}

impl Builder {
    fn finish(mut self, draft: Draft) -> CompiledSchema {
        for (document, anchors) in self.anchors {
            self.nodes[document.0].anchors = anchors;
        }
        if let Some(root) = self.nodes.first_mut() {
            root.ids = self.ids;
        }
        CompiledSchema {
            nodes: self.nodes,
            draft,
        }
    }

    fn location(&self) -> String {
        let mut location = String::from("#");
        for segment in &self.path {
            location.push('/');
            location.push_str(&escape_token(segment));
        }
        location
    }

    fn wrong_type(&self, keyword: &str, expected: &'static str, actual: &Value) -> CompileError {
        CompileError::WrongType {
            path: self.location(),
            keyword: keyword.to_string(),
            expected,
            actual: json_type_name(actual).to_string(),
        }
    }

    fn alloc(&mut self, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(SchemaNode::new(parent));
        id
    }

    /// Build a sub-schema nested under `segments`.
    fn build_at(
        &mut self,
        segments: &[&str],
        value: &Value,
        parent: NodeId,
        context: &Context,
    ) -> Result<NodeId, CompileError> {
        for segment in segments {
            self.path.push((*segment).to_string());
        }
        let id = self.build(value, Some(parent), context)?;
        for _ in segments {
            self.path.pop();
        }
        Ok(id)
    }

    fn build(
        &mut self,
        value: &Value,
        parent: Option<NodeId>,
        context: &Context,
    ) -> Result<NodeId, CompileError> {
        let object = match value {
            Value::Object(object) => object,
            Value::Bool(b) if parent.is_some() => {
                let id = self.alloc(parent);
                self.nodes[id.0].boolean = Some(*b);
                return Ok(id);
            }
            other => {
                return Err(CompileError::NotAnObject {
                    path: self.location(),
                    actual: json_type_name(other).to_string(),
                })
            }
        };

        let id = self.alloc(parent);
        let mut node = SchemaNode::new(parent);

        // identity --
        let context = self.identify(object, id, &mut node, context)?;
        node.identity.title = self.string(object, "title")?.map(String::from);
        node.identity.description = self.string(object, "description")?.map(String::from);

        // Definitions are containers, so they are kept even next to $ref.
        node.defs = self.definitions(object, id, &context)?;

        // $ref --
        if let Some(reference) = self.string(object, "$ref")? {
            node.reference = Some(reference.to_string());
            self.nodes[id.0] = node;
            return Ok(id);
        }

        node.types = self.types(object)?;

        // const / enum --
        match (object.get("const"), object.get("enum")) {
            (Some(_), Some(_)) => {
                return Err(CompileError::ConstAndEnum {
                    path: self.location(),
                })
            }
            (Some(value), None) => node.const_value = Some(value.clone()),
            (None, Some(Value::Array(values))) => node.enum_values = Some(values.clone()),
            (None, Some(other)) => return Err(self.wrong_type("enum", "an array", other)),
            (None, None) => {}
        }

        // composition --
        node.all_of = self.schema_list(object, "allOf", id, &context)?;
        node.any_of = self.schema_list(object, "anyOf", id, &context)?;
        node.one_of = self.schema_list(object, "oneOf", id, &context)?;
        node.not = self.schema(object, "not", id, &context)?;

        self.object_constraints(object, id, &mut node, &context)?;
        self.array_constraints(object, id, &mut node, &context)?;
        self.string_constraints(object, &mut node)?;
        self.number_constraints(object, &mut node)?;

        self.nodes[id.0] = node;
        Ok(id)
    }

    /// Read `$id`/`id` and `$anchor`, registering them in the id and anchor
    /// tables. Returns the context for the node's children.
    fn identify(
        &mut self,
        object: &Map<String, Value>,
        id: NodeId,
        node: &mut SchemaNode,
        context: &Context,
    ) -> Result<Context, CompileError> {
        let mut inner = context.clone();

        let raw_id = match self.string(object, "$id")? {
            Some(raw) => Some(raw),
            None => self.string(object, "id")?,
        };
        let mut fragment_anchor = None;

        if let Some(raw) = raw_id {
            node.identity.id = Some(raw.to_string());
            if let Some(anchor) = raw.strip_prefix('#') {
                // Draft-07 style: an id that is only a fragment is an anchor.
                if !anchor.is_empty() {
                    fragment_anchor = Some(anchor.to_string());
                }
            } else {
                let resolved = match &context.base {
                    Some(base) => base.join(raw).ok(),
                    None => Url::parse(raw).ok(),
                };
                let key = match &resolved {
                    Some(url) => document_key(url),
                    None => raw.trim_end_matches('#').to_string(),
                };
                node.identity.base = resolved.map(|mut url| {
                    url.set_fragment(None);
                    url
                });
                node.identity.key = Some(key.clone());
                self.ids.insert(key, id);
                inner.document = id;
                inner.base = node.identity.base.clone().or_else(|| context.base.clone());
            }
        }

        let anchor = match self.string(object, "$anchor")? {
            Some(anchor) => Some(anchor.to_string()),
            None => fragment_anchor,
        };
        if let Some(anchor) = anchor {
            let table = self.anchors.entry(inner.document).or_default();
            if table.insert(anchor.clone(), id).is_some() {
                return Err(CompileError::DuplicateAnchor {
                    path: self.location(),
                    anchor,
                });
            }
            node.identity.anchor = Some(anchor);
        }
        Ok(inner)
    }

    fn definitions(
        &mut self,
        object: &Map<String, Value>,
        id: NodeId,
        context: &Context,
    ) -> Result<HashMap<String, NodeId>, CompileError> {
        let mut defs = HashMap::new();
        for keyword in ["definitions", "$defs"] {
            let Some(entries) = self.object(object, keyword)? else {
                continue;
            };
            for (name, sub_schema) in entries {
                let child = self.build_at(&[keyword, name], sub_schema, id, context)?;
                defs.insert(name.clone(), child);
            }
        }
        Ok(defs)
    }

    fn types(&self, object: &Map<String, Value>) -> Result<TypeMask, CompileError> {
        let names: Vec<&str> = match object.get("type") {
            None => {
                trace!(path = %self.location(), "untyped schema, all types permitted");
                return Ok(TypeMask::ALL);
            }
            Some(Value::String(name)) => vec![name.as_str()],
            Some(Value::Array(entries)) => entries
                .iter()
                .map(|entry| {
                    entry.as_str().ok_or_else(|| {
                        self.wrong_type("type", "a string or an array of strings", entry)
                    })
                })
                .collect::<Result<_, _>>()?,
            Some(other) => {
                return Err(self.wrong_type("type", "a string or an array of strings", other))
            }
        };

        let mut mask = TypeMask::EMPTY;
        for name in names {
            let ty = JsonType::parse(name).ok_or_else(|| CompileError::UnknownType {
                path: self.location(),
                name: name.to_string(),
            })?;
            mask.insert(ty);
        }
        Ok(mask)
    }

    fn object_constraints(
        &mut self,
        object: &Map<String, Value>,
        id: NodeId,
        node: &mut SchemaNode,
        context: &Context,
    ) -> Result<(), CompileError> {
        let constraints = &mut node.object;
        constraints.required = self.string_array(object, "required")?.unwrap_or_default();
        constraints.min_properties = self.count(object, "minProperties")?;
        constraints.max_properties = self.count(object, "maxProperties")?;

        if let Some(properties) = self.object(object, "properties")? {
            for (name, sub_schema) in properties {
                let child = self.build_at(&["properties", name], sub_schema, id, context)?;
                constraints.properties.insert(name.clone(), child);
            }
        }

        if let Some(patterns) = self.object(object, "patternProperties")? {
            for (source, sub_schema) in patterns {
                let pattern = self.pattern(source);
                let child =
                    self.build_at(&["patternProperties", source], sub_schema, id, context)?;
                constraints.pattern_properties.push((pattern, child));
            }
        }

        constraints.additional_properties =
            self.applicator(object, "additionalProperties", id, context)?;
        constraints.unevaluated_properties =
            self.applicator(object, "unevaluatedProperties", id, context)?;

        if let Some(dependencies) = self.object(object, "dependentRequired")? {
            for (name, entry) in dependencies {
                let Value::Array(entries) = entry else {
                    return Err(self.wrong_type("dependentRequired", "an array of strings", entry));
                };
                let names = self.strings(entries, "dependentRequired")?;
                constraints.dependent_required.push((name.clone(), names));
            }
        }
        Ok(())
    }

    fn array_constraints(
        &mut self,
        object: &Map<String, Value>,
        id: NodeId,
        node: &mut SchemaNode,
        context: &Context,
    ) -> Result<(), CompileError> {
        let constraints = &mut node.array;
        constraints.min_items = self.count(object, "minItems")?;
        constraints.max_items = self.count(object, "maxItems")?;
        constraints.min_contains = self.count(object, "minContains")?;
        constraints.max_contains = self.count(object, "maxContains")?;
        constraints.unique_items = self.boolean(object, "uniqueItems")?.unwrap_or(false);

        constraints.items = match object.get("items") {
            None => None,
            Some(Value::Array(entries)) => {
                let mut positional = Vec::with_capacity(entries.len());
                for (index, entry) in entries.iter().enumerate() {
                    let index = index.to_string();
                    positional.push(self.build_at(&["items", &index], entry, id, context)?);
                }
                Some(Items::Tuple(positional))
            }
            Some(entry) if entry.is_object() || entry.is_boolean() => {
                Some(Items::Single(self.build_at(&["items"], entry, id, context)?))
            }
            Some(other) => {
                return Err(self.wrong_type("items", "a schema or an array of schemas", other))
            }
        };
        constraints.additional_items = self.applicator(object, "additionalItems", id, context)?;
        constraints.unevaluated_items = self.applicator(object, "unevaluatedItems", id, context)?;
        constraints.contains = self.schema(object, "contains", id, context)?;
        Ok(())
    }

    fn string_constraints(
        &self,
        object: &Map<String, Value>,
        node: &mut SchemaNode,
    ) -> Result<(), CompileError> {
        node.string.min_length = self.count(object, "minLength")?;
        node.string.max_length = self.count(object, "maxLength")?;
        node.string.pattern = self.string(object, "pattern")?.map(|source| self.pattern(source));
        Ok(())
    }

    fn number_constraints(
        &self,
        object: &Map<String, Value>,
        node: &mut SchemaNode,
    ) -> Result<(), CompileError> {
        let constraints = &mut node.number;
        constraints.minimum = self.bound(object, "minimum")?;
        constraints.maximum = self.bound(object, "maximum")?;

        // Draft 4 spells exclusivity as a flag on minimum/maximum; later
        // drafts give the exclusive bound directly.
        match object.get("exclusiveMinimum") {
            None | Some(Value::Bool(false)) => {}
            Some(Value::Bool(true)) => constraints.exclusive_minimum = constraints.minimum.take(),
            Some(_) => constraints.exclusive_minimum = self.bound(object, "exclusiveMinimum")?,
        }
        match object.get("exclusiveMaximum") {
            None | Some(Value::Bool(false)) => {}
            Some(Value::Bool(true)) => constraints.exclusive_maximum = constraints.maximum.take(),
            Some(_) => constraints.exclusive_maximum = self.bound(object, "exclusiveMaximum")?,
        }

        if let Some(multiple_of) = self.bound(object, "multipleOf")? {
            if multiple_of.value <= 0.0 {
                return Err(CompileError::NonPositiveMultipleOf {
                    path: self.location(),
                    value: multiple_of.value,
                });
            }
            constraints.multiple_of = Some(multiple_of);
        }
        Ok(())
    }

    // --- keyword readers ---

    fn pattern(&self, source: &str) -> Pattern {
        let pattern = Pattern::new(source);
        if let Pattern::Invalid { error, .. } = &pattern {
            warn!(
                path = %self.location(),
                pattern = source,
                error = %error,
                "pattern failed to compile; strings checked against it will be rejected"
            );
        }
        pattern
    }

    fn string<'a>(
        &self,
        object: &'a Map<String, Value>,
        keyword: &str,
    ) -> Result<Option<&'a str>, CompileError> {
        match object.get(keyword) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s)),
            Some(other) => Err(self.wrong_type(keyword, "a string", other)),
        }
    }

    fn boolean(&self, object: &Map<String, Value>, keyword: &str) -> Result<Option<bool>, CompileError> {
        match object.get(keyword) {
            None => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(other) => Err(self.wrong_type(keyword, "a boolean", other)),
        }
    }

    fn object<'a>(
        &self,
        object: &'a Map<String, Value>,
        keyword: &str,
    ) -> Result<Option<&'a Map<String, Value>>, CompileError> {
        match object.get(keyword) {
            None => Ok(None),
            Some(Value::Object(map)) => Ok(Some(map)),
            Some(other) => Err(self.wrong_type(keyword, "an object", other)),
        }
    }

    /// Non-negative integer keyword such as `minLength` or `maxItems`.
    fn count(&self, object: &Map<String, Value>, keyword: &str) -> Result<Option<u64>, CompileError> {
        let Some(value) = object.get(keyword) else {
            return Ok(None);
        };
        let Value::Number(number) = value else {
            return Err(self.wrong_type(keyword, "an integer", value));
        };
        let negative = |value: i64| CompileError::Negative {
            path: self.location(),
            keyword: keyword.to_string(),
            value,
        };
        if let Some(n) = number.as_u64() {
            return Ok(Some(n));
        }
        if let Some(n) = number.as_i64() {
            return Err(negative(n));
        }
        match number.as_f64() {
            Some(f) if f.fract() == 0.0 && f >= 0.0 => Ok(Some(f as u64)),
            Some(f) if f.fract() == 0.0 => Err(negative(f as i64)),
            _ => Err(self.wrong_type(keyword, "an integer", value)),
        }
    }

    fn bound(&self, object: &Map<String, Value>, keyword: &str) -> Result<Option<Bound>, CompileError> {
        let Some(value) = object.get(keyword) else {
            return Ok(None);
        };
        match value {
            Value::Number(number) => Bound::from_number(number)
                .map(Some)
                .ok_or_else(|| self.wrong_type(keyword, "a finite number", value)),
            other => Err(self.wrong_type(keyword, "a number", other)),
        }
    }

    fn strings(&self, entries: &[Value], keyword: &str) -> Result<Vec<String>, CompileError> {
        entries
            .iter()
            .map(|entry| match entry {
                Value::String(s) => Ok(s.clone()),
                other => Err(self.wrong_type(keyword, "an array of strings", other)),
            })
            .collect()
    }

    fn string_array(
        &self,
        object: &Map<String, Value>,
        keyword: &str,
    ) -> Result<Option<Vec<String>>, CompileError> {
        match object.get(keyword) {
            None => Ok(None),
            Some(Value::Array(entries)) => self.strings(entries, keyword).map(Some),
            Some(other) => Err(self.wrong_type(keyword, "an array of strings", other)),
        }
    }

    fn schema(
        &mut self,
        object: &Map<String, Value>,
        keyword: &str,
        parent: NodeId,
        context: &Context,
    ) -> Result<Option<NodeId>, CompileError> {
        match object.get(keyword) {
            None => Ok(None),
            Some(value) => self.build_at(&[keyword], value, parent, context).map(Some),
        }
    }

    fn schema_list(
        &mut self,
        object: &Map<String, Value>,
        keyword: &str,
        parent: NodeId,
        context: &Context,
    ) -> Result<Option<Vec<NodeId>>, CompileError> {
        let entries = match object.get(keyword) {
            None => return Ok(None),
            Some(Value::Array(entries)) => entries,
            Some(other) => return Err(self.wrong_type(keyword, "an array of schemas", other)),
        };
        if entries.is_empty() {
            return Err(self.wrong_type(keyword, "a non-empty array of schemas", &object[keyword]));
        }
        let mut branches = Vec::with_capacity(entries.len());
        for (index, entry) in entries.iter().enumerate() {
            let index = index.to_string();
            branches.push(self.build_at(&[keyword, &index], entry, parent, context)?);
        }
        Ok(Some(branches))
    }

    fn applicator(
        &mut self,
        object: &Map<String, Value>,
        keyword: &str,
        parent: NodeId,
        context: &Context,
    ) -> Result<Applicator, CompileError> {
        match object.get(keyword) {
            None | Some(Value::Bool(true)) => Ok(Applicator::Allow),
            Some(Value::Bool(false)) => Ok(Applicator::Deny),
            Some(value) if value.is_object() => Ok(Applicator::Schema(
                self.build_at(&[keyword], value, parent, context)?,
            )),
            Some(other) => Err(self.wrong_type(keyword, "a boolean or a schema", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn top_level_must_be_object() {
        let result = compile_schema(&json!(true));
        assert!(matches!(result, Err(CompileError::NotAnObject { .. })));
        let result = compile_schema(&json!([{"type": "string"}]));
        assert!(matches!(result, Err(CompileError::NotAnObject { .. })));
    }

    #[test]
    fn absent_type_permits_everything() {
        let schema = compile_schema(&json!({})).unwrap();
        assert!(schema.node(schema.root()).types().is_all());
        assert_eq!(schema.len(), 1);
    }

    #[test]
    fn type_array_builds_mask() {
        let schema = compile_schema(&json!({"type": ["string", "number"]})).unwrap();
        let types = schema.node(schema.root()).types();
        assert!(types.contains(JsonType::String));
        assert!(types.contains(JsonType::Number));
        assert!(types.contains(JsonType::Integer));
        assert!(!types.contains(JsonType::Null));
    }

    #[test]
    fn unknown_type_name_errors() {
        let result = compile_schema(&json!({"type": "float"}));
        assert!(matches!(
            result,
            Err(CompileError::UnknownType { name, .. }) if name == "float"
        ));
    }

    #[test]
    fn type_of_wrong_shape_errors() {
        let result = compile_schema(&json!({"type": 7}));
        assert!(matches!(result, Err(CompileError::WrongType { keyword, .. }) if keyword == "type"));
    }

    #[test]
    fn required_must_be_string_array() {
        let result = compile_schema(&json!({"required": ["a", 1]}));
        assert!(matches!(
            result,
            Err(CompileError::WrongType { keyword, .. }) if keyword == "required"
        ));
        let result = compile_schema(&json!({"required": "a"}));
        assert!(matches!(result, Err(CompileError::WrongType { .. })));
    }

    #[test]
    fn const_and_enum_conflict() {
        let result = compile_schema(&json!({"const": 1, "enum": [1, 2]}));
        assert!(matches!(result, Err(CompileError::ConstAndEnum { .. })));
    }

    #[test]
    fn negative_bounds_rejected() {
        for keyword in ["minLength", "maxItems", "minProperties", "maxContains"] {
            let result = compile_schema(&json!({ keyword: -1 }));
            assert!(
                matches!(&result, Err(CompileError::Negative { keyword: k, value: -1, .. }) if k == keyword),
                "{keyword}: {result:?}"
            );
        }
    }

    #[test]
    fn fractional_count_rejected() {
        let result = compile_schema(&json!({"minLength": 1.5}));
        assert!(matches!(result, Err(CompileError::WrongType { .. })));
        let schema = compile_schema(&json!({"minLength": 2.0})).unwrap();
        assert_eq!(schema.node(schema.root()).string.min_length, Some(2));
    }

    #[test]
    fn non_positive_multiple_of_rejected() {
        let result = compile_schema(&json!({"multipleOf": 0}));
        assert!(matches!(result, Err(CompileError::NonPositiveMultipleOf { .. })));
        let result = compile_schema(&json!({"multipleOf": -2.5}));
        assert!(matches!(result, Err(CompileError::NonPositiveMultipleOf { .. })));
    }

    #[test]
    fn error_path_points_into_schema() {
        let result = compile_schema(&json!({
            "properties": {
                "a/b": { "properties": { "x": { "minLength": -3 } } }
            }
        }));
        match result {
            Err(CompileError::Negative { path, .. }) => {
                assert_eq!(path, "#/properties/a~1b/properties/x");
            }
            other => panic!("expected Negative error, got {other:?}"),
        }
    }

    #[test]
    fn unsupported_schema_version() {
        let result = compile_schema(&json!({"$schema": "https://example.com/dialect"}));
        assert!(matches!(result, Err(CompileError::UnsupportedVersion { .. })));
        let schema =
            compile_schema(&json!({"$schema": "http://json-schema.org/draft-04/schema#"})).unwrap();
        assert_eq!(schema.draft(), Draft::Draft4);
    }

    #[test]
    fn children_link_to_parent() {
        let schema = compile_schema(&json!({
            "properties": { "a": { "items": { "type": "string" } } }
        }))
        .unwrap();
        let root = schema.node(schema.root());
        assert_eq!(root.parent(), None);
        let a = root.object.properties["a"];
        assert_eq!(schema.node(a).parent(), Some(schema.root()));
        let Some(Items::Single(items)) = schema.node(a).array.items.clone() else {
            panic!("expected single items schema");
        };
        assert_eq!(schema.node(items).parent(), Some(a));
        for index in 1..schema.len() {
            assert!(schema.node(NodeId(index)).parent().is_some());
        }
    }

    #[test]
    fn ref_ignores_sibling_keywords_but_keeps_defs() {
        let schema = compile_schema(&json!({
            "$ref": "#/$defs/point",
            "type": "string",
            "$defs": { "point": { "type": "object" } }
        }))
        .unwrap();
        let root = schema.node(schema.root());
        assert_eq!(root.reference(), Some("#/$defs/point"));
        assert!(root.types().is_all());
        assert!(root.definition("point").is_some());
    }

    #[test]
    fn legacy_definitions_share_table() {
        let schema = compile_schema(&json!({
            "definitions": { "a": {} },
            "$defs": { "b": {} }
        }))
        .unwrap();
        let root = schema.node(schema.root());
        assert!(root.definition("a").is_some());
        assert!(root.definition("b").is_some());
    }

    #[test]
    fn anchors_scoped_to_nearest_id() {
        let schema = compile_schema(&json!({
            "$id": "https://example.com/root.json",
            "$defs": {
                "top": { "$anchor": "top" },
                "inner": {
                    "$id": "inner.json",
                    "$defs": { "deep": { "$anchor": "deep" } }
                }
            }
        }))
        .unwrap();
        let root = schema.root();
        assert!(schema.anchor(root, "top").is_some());
        assert!(schema.anchor(root, "deep").is_none());

        let inner = schema
            .lookup_document("example.com/inner.json")
            .expect("inner document registered");
        assert!(schema.anchor(inner, "deep").is_some());
        assert_eq!(
            schema.node(inner).base_uri().map(Url::as_str),
            Some("https://example.com/inner.json")
        );
        assert_eq!(schema.lookup_document("example.com/root.json"), Some(root));
    }

    #[test]
    fn legacy_id_and_fragment_anchor() {
        let schema = compile_schema(&json!({
            "id": "http://example.com/legacy.json",
            "definitions": { "item": { "id": "#item" } }
        }))
        .unwrap();
        assert_eq!(schema.id(), Some("http://example.com/legacy.json"));
        assert!(schema.anchor(schema.root(), "item").is_some());
    }

    #[test]
    fn duplicate_anchor_rejected() {
        let result = compile_schema(&json!({
            "$defs": {
                "a": { "$anchor": "same" },
                "b": { "$anchor": "same" }
            }
        }));
        assert!(matches!(result, Err(CompileError::DuplicateAnchor { anchor, .. }) if anchor == "same"));
    }

    #[test]
    fn draft4_exclusive_flags() {
        let schema = compile_schema(&json!({"maximum": 10, "exclusiveMaximum": true})).unwrap();
        let number = &schema.node(schema.root()).number;
        assert!(number.maximum.is_none());
        assert_eq!(number.exclusive_maximum.map(|b| b.value), Some(10.0));
    }

    #[test]
    fn invalid_pattern_is_not_fatal() {
        let schema = compile_schema(&json!({"pattern": "(unclosed"})).unwrap();
        assert!(matches!(
            schema.node(schema.root()).string.pattern,
            Some(Pattern::Invalid { .. })
        ));
    }

    #[test]
    fn boolean_sub_schemas() {
        let schema = compile_schema(&json!({
            "properties": { "never": false, "always": true }
        }))
        .unwrap();
        let root = schema.node(schema.root());
        assert_eq!(schema.node(root.object.properties["never"]).boolean(), Some(false));
        assert_eq!(schema.node(root.object.properties["always"]).boolean(), Some(true));
    }

    #[test]
    fn applicators_accept_booleans_and_schemas() {
        let schema = compile_schema(&json!({
            "additionalProperties": false,
            "unevaluatedProperties": { "type": "string" }
        }))
        .unwrap();
        let object = &schema.node(schema.root()).object;
        assert_eq!(object.additional_properties, Applicator::Deny);
        assert!(matches!(object.unevaluated_properties, Applicator::Schema(_)));

        let result = compile_schema(&json!({"additionalProperties": "no"}));
        assert!(matches!(result, Err(CompileError::WrongType { .. })));
    }

    #[test]
    fn empty_composition_rejected() {
        let result = compile_schema(&json!({"anyOf": []}));
        assert!(matches!(result, Err(CompileError::WrongType { keyword, .. }) if keyword == "anyOf"));
    }

    #[test]
    fn compile_is_deterministic() {
        let document = json!({
            "properties": { "a": { "type": "string" }, "b": { "$ref": "#/$defs/b" } },
            "$defs": { "b": { "type": "integer" } }
        });
        let first = compile_schema(&document).unwrap();
        let second = compile_schema(&document).unwrap();
        assert_eq!(first.len(), second.len());
    }
}
