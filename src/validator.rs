//! Validation engine.
//!
//! A run walks the data tree and the compiled schema together. Each
//! sub-schema evaluation returns a [`ValidationResult`]: a point in a small
//! lattice of (valid, gather) bits plus the diagnostics explaining any
//! failure. Results are combined with [`ValidationResult::meet`], which is
//! valid only when both sides are and keeps gathering only when both sides
//! may.
//!
//! Per node the order is: follow `$ref`, boolean schema, `const`/`enum`
//! (terminal), composition keywords, then the type check and type-specific
//! constraints. Compositions run before the type-specific checks so that
//! `unevaluatedProperties`/`unevaluatedItems` see what the branches
//! evaluated.

use std::cmp::Ordering;
use std::collections::HashMap;

use serde_json::{Map, Number, Value};
use tracing::{debug, warn};

use crate::diagnostics::{AccessPath, Diagnostic};
use crate::resolver::Resolver;
use crate::schema::{Applicator, Bound, CompiledSchema, Items, NodeId, NodeRef};
use crate::scope::EvaluationScopes;
use crate::types::{JsonType, ValidateOptions};

/// Relative tolerance when checking `multipleOf` against non-integral values.
const MULTIPLE_OF_EPSILON: f64 = 1e-9;

/// Result of validating a value against a compiled schema.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationOutcome {
    Valid,
    Invalid(Diagnostic),
}

impl ValidationOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationOutcome::Valid)
    }

    /// The diagnostics tree of an invalid outcome.
    pub fn diagnostics(&self) -> Option<&Diagnostic> {
        match self {
            ValidationOutcome::Valid => None,
            ValidationOutcome::Invalid(diagnostic) => Some(diagnostic),
        }
    }

    /// True when the failure involves a broken schema (unresolvable `$ref`,
    /// invalid pattern, depth limit) rather than only bad data.
    pub fn has_internal_errors(&self) -> bool {
        self.diagnostics()
            .map(Diagnostic::has_internal_errors)
            .unwrap_or(false)
    }
}

/// Validate `value` against `schema`.
///
/// `others` are auxiliary compiled schemas that absolute `$ref`s may point
/// into; they are searched in order after `schema`'s own documents.
pub fn validate(
    value: &Value,
    schema: &CompiledSchema,
    others: &[&CompiledSchema],
) -> ValidationOutcome {
    validate_with_options(value, schema, others, &ValidateOptions::default())
}

/// Validate with explicit options.
pub fn validate_with_options(
    value: &Value,
    schema: &CompiledSchema,
    others: &[&CompiledSchema],
    options: &ValidateOptions,
) -> ValidationOutcome {
    let mut run = Run::new(others, options);
    let result = run.validate_node(value, NodeRef::root(schema));
    debug!(
        valid = result.valid,
        resolved_refs = run.resolver_cache_len(),
        "validation finished"
    );
    if result.valid {
        ValidationOutcome::Valid
    } else {
        ValidationOutcome::Invalid(result.into_diagnostic(""))
    }
}

impl CompiledSchema {
    /// Validate `value` against this schema alone.
    pub fn validate(&self, value: &Value) -> ValidationOutcome {
        validate(value, self, &[])
    }

    pub fn is_valid(&self, value: &Value) -> bool {
        self.validate(value).is_valid()
    }
}

/// Outcome of one sub-schema evaluation.
///
/// `gather` says whether the caller may keep evaluating sibling constraints
/// after a failure. Valid results never carry diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ValidationResult {
    pub valid: bool,
    pub gather: bool,
    pub diagnostics: Vec<Diagnostic>,
}

impl ValidationResult {
    pub fn valid() -> Self {
        Self {
            valid: true,
            gather: true,
            diagnostics: Vec::new(),
        }
    }

    /// Failure that stops further checks on the same value.
    pub fn invalid(diagnostic: Diagnostic) -> Self {
        Self {
            valid: false,
            gather: false,
            diagnostics: vec![diagnostic],
        }
    }

    /// True when a diagnostic came from a broken schema rather than the value.
    pub fn has_internal_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::has_internal_errors)
    }

    /// Failure after which sibling constraints are still worth reporting.
    pub fn invalid_continue(diagnostic: Diagnostic) -> Self {
        Self {
            valid: false,
            gather: true,
            diagnostics: vec![diagnostic],
        }
    }

    pub fn meet(mut self, other: ValidationResult) -> Self {
        self.valid &= other.valid;
        self.gather &= other.gather;
        self.diagnostics.extend(other.diagnostics);
        self
    }

    /// Stop signal: invalid and not gathering.
    fn stops(&self) -> bool {
        !self.valid && !self.gather
    }

    /// Collapse the diagnostics of a failure under one composite node.
    fn wrap(self, path: &str, message: &str) -> Self {
        if self.valid {
            return self;
        }
        let diagnostic = Diagnostic::new(path, message).with_children(self.diagnostics);
        Self {
            diagnostics: vec![diagnostic],
            ..self
        }
    }

    fn into_diagnostic(mut self, path: &str) -> Diagnostic {
        if self.diagnostics.len() == 1 {
            if let Some(diagnostic) = self.diagnostics.pop() {
                return diagnostic;
            }
        }
        Diagnostic::new(path, "invalid value").with_children(self.diagnostics)
    }
}

/// State of one validation run.
struct Run<'v, 's> {
    path: AccessPath<'v>,
    scopes: EvaluationScopes<'v>,
    resolver: Resolver<'s>,
    max_depth: usize,
}

impl<'v, 's> Run<'v, 's> {
    fn new(others: &[&'s CompiledSchema], options: &ValidateOptions) -> Self {
        Self {
            path: AccessPath::new(),
            scopes: EvaluationScopes::new(),
            resolver: Resolver::new(others),
            max_depth: options.max_depth,
        }
    }

    fn resolver_cache_len(&self) -> usize {
        self.resolver.len()
    }

    fn location(&self) -> String {
        self.path.to_string()
    }

    /// Evaluate one sub-schema inside its own evaluation scope.
    fn validate_node(&mut self, value: &'v Value, node: NodeRef<'s>) -> ValidationResult {
        self.scopes.push();
        let result = if self.scopes.depth() > self.max_depth {
            ValidationResult::invalid(Diagnostic::internal(
                self.location(),
                format!("maximum validation depth of {} exceeded", self.max_depth),
            ))
        } else {
            self.evaluate(value, node)
        };
        self.scopes.pop(result.valid);
        result
    }

    fn evaluate(&mut self, value: &'v Value, node: NodeRef<'s>) -> ValidationResult {
        let node = match self.resolver.follow(node) {
            Ok(target) => target,
            Err(err) => {
                return ValidationResult::invalid(Diagnostic::internal(
                    self.location(),
                    err.to_string(),
                ))
            }
        };
        let schema = node.node();

        match schema.boolean() {
            Some(true) => return ValidationResult::valid(),
            Some(false) => {
                return ValidationResult::invalid(Diagnostic::new(
                    self.location(),
                    "no value is permitted here",
                ))
            }
            None => {}
        }

        // const and enum decide the node on their own.
        if let Some(expected) = &schema.const_value {
            return if values_equal(value, expected) {
                ValidationResult::valid()
            } else {
                ValidationResult::invalid(Diagnostic::new(
                    self.location(),
                    format!("value {value} does not match const {expected}"),
                ))
            };
        }
        if let Some(allowed) = &schema.enum_values {
            return if allowed.iter().any(|candidate| values_equal(value, candidate)) {
                ValidationResult::valid()
            } else {
                let listed: Vec<String> = allowed.iter().map(Value::to_string).collect();
                ValidationResult::invalid(Diagnostic::new(
                    self.location(),
                    format!("value {value} is not one of [{}]", listed.join(", ")),
                ))
            };
        }

        if !node.schema.has_composition(node.id) {
            return self.simple(value, node);
        }

        let composed = self
            .all_of(value, node)
            .meet(self.any_of(value, node))
            .meet(self.one_of(value, node))
            .meet(self.not(value, node));
        let result = composed.meet(self.simple(value, node));
        let location = self.location();
        result.wrap(&location, "invalid value")
    }

    // --- composition ---

    fn all_of(&mut self, value: &'v Value, node: NodeRef<'s>) -> ValidationResult {
        let Some(branches) = &node.node().all_of else {
            return ValidationResult::valid();
        };
        let mut result = ValidationResult::valid();
        for &branch in branches {
            let outcome = self.validate_node(value, node.with(branch));
            let stop = outcome.stops();
            result = result.meet(outcome);
            if stop {
                break;
            }
        }
        let location = self.location();
        result.wrap(&location, "value does not satisfy allOf")
    }

    fn any_of(&mut self, value: &'v Value, node: NodeRef<'s>) -> ValidationResult {
        let Some(branches) = &node.node().any_of else {
            return ValidationResult::valid();
        };
        let mut failures = ValidationResult::valid();
        for &branch in branches {
            let outcome = self.validate_node(value, node.with(branch));
            if outcome.valid {
                if failures.has_internal_errors() {
                    warn!(
                        path = %self.location(),
                        "anyOf matched after a branch failed with an internal error"
                    );
                }
                return ValidationResult::valid();
            }
            failures = failures.meet(outcome);
        }
        let location = self.location();
        failures.wrap(&location, "value does not match any anyOf branch")
    }

    fn one_of(&mut self, value: &'v Value, node: NodeRef<'s>) -> ValidationResult {
        let Some(branches) = &node.node().one_of else {
            return ValidationResult::valid();
        };
        let mut matched = Vec::new();
        let mut failures = ValidationResult::valid();
        for (index, &branch) in branches.iter().enumerate() {
            let outcome = self.validate_node(value, node.with(branch));
            if outcome.valid {
                matched.push(index);
            } else {
                failures = failures.meet(outcome);
            }
        }
        let location = self.location();
        match matched.as_slice() {
            [_] => ValidationResult::valid(),
            [] => failures.wrap(&location, "value does not match any oneOf branch"),
            [first, second, ..] => ValidationResult::invalid(Diagnostic::new(
                location,
                format!("value matches more than one oneOf branch ({first} and {second})"),
            )),
        }
    }

    fn not(&mut self, value: &'v Value, node: NodeRef<'s>) -> ValidationResult {
        let Some(negated) = node.node().not else {
            return ValidationResult::valid();
        };
        let outcome = self.validate_node(value, node.with(negated));
        if outcome.valid {
            return ValidationResult::invalid(Diagnostic::new(
                self.location(),
                "value must not match the 'not' schema",
            ));
        }
        if outcome.has_internal_errors() {
            warn!(
                path = %self.location(),
                "'not' accepted a value because its schema failed with an internal error"
            );
        }
        ValidationResult::valid()
    }

    // --- type-specific checks ---

    fn simple(&mut self, value: &'v Value, node: NodeRef<'s>) -> ValidationResult {
        let types = node.node().types();
        let actual = JsonType::of(value);
        if !types.contains(actual) {
            return ValidationResult::invalid(Diagnostic::new(
                self.location(),
                format!("type {actual} not permitted, expected {types}"),
            ));
        }
        match value {
            Value::Object(object) => self.object(object, node),
            Value::Array(array) => self.array(array, node),
            Value::String(string) => self.string(string, node),
            Value::Number(number) => self.number(number, node),
            Value::Null | Value::Bool(_) => ValidationResult::valid(),
        }
    }

    fn object(&mut self, object: &'v Map<String, Value>, node: NodeRef<'s>) -> ValidationResult {
        let constraints = &node.node().object;
        let location = self.location();
        let mut result = ValidationResult::valid();

        for name in &constraints.required {
            if !object.contains_key(name) {
                result = result.meet(ValidationResult::invalid_continue(Diagnostic::new(
                    location.as_str(),
                    format!("missing required property '{name}'"),
                )));
            }
        }

        for (trigger, names) in &constraints.dependent_required {
            if !object.contains_key(trigger) {
                continue;
            }
            for name in names {
                if !object.contains_key(name) {
                    result = result.meet(ValidationResult::invalid_continue(Diagnostic::new(
                        location.as_str(),
                        format!("property '{name}' is required when '{trigger}' is present"),
                    )));
                }
            }
        }

        let count = object.len() as u64;
        if let Some(max) = constraints.max_properties {
            if count > max {
                result = result.meet(ValidationResult::invalid(Diagnostic::new(
                    location.as_str(),
                    format!("too many properties, {count} > MAX={max}"),
                )));
            }
        }
        if let Some(min) = constraints.min_properties {
            if count < min {
                result = result.meet(ValidationResult::invalid(Diagnostic::new(
                    location.as_str(),
                    format!("too few properties, {count} < MIN={min}"),
                )));
            }
        }

        for (name, property) in object {
            self.path.push_name(name);
            let outcome = self.property(object, name, property, node);
            self.path.pop();
            result = result.meet(outcome);
        }

        result.wrap(&location, "invalid object")
    }

    /// Validate one property: `properties`, then the first matching
    /// `patternProperties` entry, then `additionalProperties`, and finally
    /// `unevaluatedProperties` against what this call has evaluated so far.
    fn property(
        &mut self,
        object: &'v Map<String, Value>,
        name: &'v str,
        value: &'v Value,
        node: NodeRef<'s>,
    ) -> ValidationResult {
        let constraints = &node.node().object;

        if let Some(&schema) = constraints.properties.get(name) {
            return self.evaluate_property(object, name, value, node.with(schema));
        }
        for (pattern, schema) in &constraints.pattern_properties {
            match pattern.is_match(name) {
                Ok(true) => return self.evaluate_property(object, name, value, node.with(*schema)),
                Ok(false) => {}
                Err(error) => {
                    return ValidationResult::invalid(Diagnostic::internal(
                        self.location(),
                        format!("pattern '{}' is invalid: {error}", pattern.as_str()),
                    ))
                }
            }
        }

        match constraints.additional_properties {
            Applicator::Deny => {
                return ValidationResult::invalid(Diagnostic::new(
                    self.location(),
                    format!("additional property '{name}' is not permitted"),
                ))
            }
            Applicator::Schema(schema) => {
                return self.evaluate_property(object, name, value, node.with(schema))
            }
            // An explicit `true` permits the property without evaluating it.
            Applicator::Allow => {}
        }

        if self.scopes.is_property_evaluated(object, name) {
            return ValidationResult::valid();
        }
        match constraints.unevaluated_properties {
            Applicator::Allow => ValidationResult::valid(),
            Applicator::Deny => ValidationResult::invalid(Diagnostic::new(
                self.location(),
                format!("property '{name}' is not evaluated by any subschema"),
            )),
            Applicator::Schema(schema) => {
                self.evaluate_property(object, name, value, node.with(schema))
            }
        }
    }

    fn evaluate_property(
        &mut self,
        object: &'v Map<String, Value>,
        name: &'v str,
        value: &'v Value,
        schema: NodeRef<'s>,
    ) -> ValidationResult {
        let outcome = self.validate_node(value, schema);
        if outcome.valid {
            self.scopes.mark_property(object, name);
        }
        outcome
    }

    fn array(&mut self, array: &'v [Value], node: NodeRef<'s>) -> ValidationResult {
        let constraints = &node.node().array;
        let location = self.location();
        let mut result = ValidationResult::valid();

        let count = array.len() as u64;
        if let Some(max) = constraints.max_items {
            if count > max {
                result = result.meet(ValidationResult::invalid(Diagnostic::new(
                    location.as_str(),
                    format!("too many array items, {count} > MAX={max}"),
                )));
            }
        }
        if let Some(min) = constraints.min_items {
            if count < min {
                result = result.meet(ValidationResult::invalid(Diagnostic::new(
                    location.as_str(),
                    format!("too few array items, {count} < MIN={min}"),
                )));
            }
        }

        for (index, item) in array.iter().enumerate() {
            let schema = match &constraints.items {
                Some(Items::Single(schema)) => Some(*schema),
                Some(Items::Tuple(positional)) => match positional.get(index) {
                    Some(schema) => Some(*schema),
                    None => match constraints.additional_items {
                        Applicator::Allow => None,
                        Applicator::Schema(schema) => Some(schema),
                        Applicator::Deny => {
                            self.path.push_index(index);
                            result = result.meet(ValidationResult::invalid(Diagnostic::new(
                                self.location(),
                                format!("additional item at index {index} is not permitted"),
                            )));
                            self.path.pop();
                            continue;
                        }
                    },
                },
                None => None,
            };
            if let Some(schema) = schema {
                self.path.push_index(index);
                let outcome = self.evaluate_item(array, index, item, node.with(schema));
                self.path.pop();
                result = result.meet(outcome);
            }
        }

        if let Some(contains) = constraints.contains {
            result = result.meet(self.contains(array, node, contains));
        }

        if constraints.unique_items {
            let mut seen: HashMap<ScalarKey<'v>, Vec<usize>> = HashMap::new();
            for (index, item) in array.iter().enumerate() {
                let Some(key) = ScalarKey::of(item) else {
                    continue;
                };
                let bucket = seen.entry(key).or_default();
                let duplicate = bucket
                    .iter()
                    .copied()
                    .find(|&earlier| values_equal(&array[earlier], item));
                match duplicate {
                    Some(first) => {
                        self.path.push_index(index);
                        result = result.meet(ValidationResult::invalid(Diagnostic::new(
                            self.location(),
                            format!(
                                "array uniqueItems violation, item {index} duplicates item {first}"
                            ),
                        )));
                        self.path.pop();
                    }
                    None => bucket.push(index),
                }
            }
        }

        if constraints.unevaluated_items != Applicator::Allow {
            for (index, item) in array.iter().enumerate() {
                if self.scopes.is_item_evaluated(array, index) {
                    continue;
                }
                self.path.push_index(index);
                let outcome = match constraints.unevaluated_items {
                    Applicator::Schema(schema) => {
                        self.evaluate_item(array, index, item, node.with(schema))
                    }
                    _ => ValidationResult::invalid(Diagnostic::new(
                        self.location(),
                        format!("item {index} is not evaluated by any subschema"),
                    )),
                };
                self.path.pop();
                result = result.meet(outcome);
            }
        }

        result.wrap(&location, "invalid array")
    }

    /// `contains` with `minContains` (default 1) and `maxContains`.
    /// Matching items count as evaluated.
    fn contains(&mut self, array: &'v [Value], node: NodeRef<'s>, contains: NodeId) -> ValidationResult {
        let constraints = &node.node().array;
        let mut matches = 0u64;
        for (index, item) in array.iter().enumerate() {
            self.path.push_index(index);
            if self.evaluate_item(array, index, item, node.with(contains)).valid {
                matches += 1;
            }
            self.path.pop();
        }

        let min = constraints.min_contains.unwrap_or(1);
        if matches < min {
            return ValidationResult::invalid(Diagnostic::new(
                self.location(),
                format!("array contains {matches} matching items, fewer than {min}"),
            ));
        }
        if let Some(max) = constraints.max_contains {
            if matches > max {
                return ValidationResult::invalid(Diagnostic::new(
                    self.location(),
                    format!("array contains {matches} matching items, more than {max}"),
                ));
            }
        }
        ValidationResult::valid()
    }

    fn evaluate_item(
        &mut self,
        array: &'v [Value],
        index: usize,
        item: &'v Value,
        schema: NodeRef<'s>,
    ) -> ValidationResult {
        let outcome = self.validate_node(item, schema);
        if outcome.valid {
            self.scopes.mark_item(array, index);
        }
        outcome
    }

    fn string(&mut self, string: &str, node: NodeRef<'s>) -> ValidationResult {
        let constraints = &node.node().string;
        let location = self.location();
        let mut result = ValidationResult::valid();

        let length = string.chars().count() as u64;
        if let Some(max) = constraints.max_length {
            if length > max {
                result = result.meet(ValidationResult::invalid(Diagnostic::new(
                    location.as_str(),
                    format!("string too long, {length} > MAX={max}"),
                )));
            }
        }
        if let Some(min) = constraints.min_length {
            if length < min {
                result = result.meet(ValidationResult::invalid(Diagnostic::new(
                    location.as_str(),
                    format!("string too short, {length} < MIN={min}"),
                )));
            }
        }
        if let Some(pattern) = &constraints.pattern {
            match pattern.is_match(string) {
                Ok(true) => {}
                Ok(false) => {
                    result = result.meet(ValidationResult::invalid(Diagnostic::new(
                        location.as_str(),
                        format!(
                            "string '{string}' does not match pattern '{}'",
                            pattern.as_str()
                        ),
                    )))
                }
                Err(error) => {
                    result = result.meet(ValidationResult::invalid(Diagnostic::internal(
                        location.as_str(),
                        format!("pattern '{}' is invalid: {error}", pattern.as_str()),
                    )))
                }
            }
        }
        leaf_result(result, &location)
    }

    fn number(&mut self, number: &Number, node: NodeRef<'s>) -> ValidationResult {
        let constraints = &node.node().number;
        let location = self.location();
        let mut result = ValidationResult::valid();
        let mut fail = |message: String| {
            result = std::mem::replace(&mut result, ValidationResult::valid())
                .meet(ValidationResult::invalid(Diagnostic::new(location.as_str(), message)));
        };

        if let Some(max) = &constraints.maximum {
            if compare(number, max) == Some(Ordering::Greater) {
                fail(format!("value too large, {number} > MAX={}", bound_text(max)));
            }
        }
        if let Some(max) = &constraints.exclusive_maximum {
            if compare(number, max) != Some(Ordering::Less) {
                fail(format!("value too large, {number} >= MAX={}", bound_text(max)));
            }
        }
        if let Some(min) = &constraints.minimum {
            if compare(number, min) == Some(Ordering::Less) {
                fail(format!("value too small, {number} < MIN={}", bound_text(min)));
            }
        }
        if let Some(min) = &constraints.exclusive_minimum {
            if compare(number, min) != Some(Ordering::Greater) {
                fail(format!("value too small, {number} <= MIN={}", bound_text(min)));
            }
        }
        if let Some(divisor) = &constraints.multiple_of {
            if !is_multiple_of(number, divisor) {
                fail(format!(
                    "value {number} is not a multiple of {}",
                    bound_text(divisor)
                ));
            }
        }
        leaf_result(result, &location)
    }
}

/// Scalars report a single failure directly; several are grouped.
fn leaf_result(result: ValidationResult, location: &str) -> ValidationResult {
    if result.diagnostics.len() > 1 {
        result.wrap(location, "invalid value")
    } else {
        result
    }
}

/// Integer view of a JSON number, when it holds an integral value that
/// fits in 64 bits.
fn integral(number: &Number) -> Option<i64> {
    if let Some(i) = number.as_i64() {
        return Some(i);
    }
    let f = number.as_f64()?;
    if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

/// Integral values against integral bounds compare as i64; everything
/// else as f64.
fn compare(number: &Number, bound: &Bound) -> Option<Ordering> {
    if let (Some(value), Some(exact)) = (integral(number), bound.exact) {
        return Some(value.cmp(&exact));
    }
    number.as_f64()?.partial_cmp(&bound.value)
}

fn is_multiple_of(number: &Number, divisor: &Bound) -> bool {
    if let (Some(value), Some(exact)) = (integral(number), divisor.exact) {
        if exact != 0 {
            return value % exact == 0;
        }
    }
    let Some(value) = number.as_f64() else {
        return false;
    };
    let quotient = value / divisor.value;
    if !quotient.is_finite() {
        return false;
    }
    (quotient - quotient.round()).abs() <= MULTIPLE_OF_EPSILON * quotient.abs().max(1.0)
}

fn bound_text(bound: &Bound) -> String {
    match bound.exact {
        Some(exact) => exact.to_string(),
        None => bound.value.to_string(),
    }
}

fn numbers_equal(a: &Number, b: &Number) -> bool {
    if let (Some(a), Some(b)) = (a.as_i64(), b.as_i64()) {
        return a == b;
    }
    if let (Some(a), Some(b)) = (a.as_u64(), b.as_u64()) {
        return a == b;
    }
    match (a.as_f64(), b.as_f64()) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

/// Equality used by `const` and `enum`. Only scalars can be equal; objects
/// and arrays never compare equal to anything, themselves included.
fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Number(a), Value::Number(b)) => numbers_equal(a, b),
        _ => false,
    }
}

/// Hash bucket for `uniqueItems`. Values that [`values_equal`] considers
/// equal always share a key; numbers outside the i64 range bucket by their
/// f64 bits, so members of a bucket still need a `values_equal` check.
#[derive(Debug, PartialEq, Eq, Hash)]
enum ScalarKey<'v> {
    Null,
    Bool(bool),
    Int(i64),
    Float(u64),
    Str(&'v str),
}

impl<'v> ScalarKey<'v> {
    fn of(value: &'v Value) -> Option<Self> {
        match value {
            Value::Null => Some(ScalarKey::Null),
            Value::Bool(b) => Some(ScalarKey::Bool(*b)),
            Value::String(s) => Some(ScalarKey::Str(s)),
            Value::Number(n) => {
                if let Some(i) = integral(n) {
                    Some(ScalarKey::Int(i))
                } else {
                    n.as_f64().map(|f| ScalarKey::Float(f.to_bits()))
                }
            }
            Value::Array(_) | Value::Object(_) => None,
        }
    }
}
