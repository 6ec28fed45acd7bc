//! Evaluation-scope tracking for `unevaluatedProperties` and `unevaluatedItems`.
//!
//! Every validation call pushes a scope, so the number of live scopes always
//! equals the recursion depth. A successful evaluation marks the property (or
//! array index) in the innermost scope; when a call returns valid its marks
//! are promoted into the enclosing scope, and when it returns invalid they are
//! dropped. A property validated deep inside an `allOf` branch therefore
//! counts as evaluated at the level of the object that owns it, while a
//! failing `anyOf` branch or a `not` leaves nothing behind.
//!
//! Objects and arrays are identified by address. The data tree is borrowed
//! immutably for the whole run, so addresses are stable.

use std::collections::{HashMap, HashSet};

use serde_json::{Map, Value};

fn object_identity(object: &Map<String, Value>) -> usize {
    object as *const Map<String, Value> as usize
}

fn array_identity(array: &[Value]) -> usize {
    array.as_ptr() as usize
}

#[derive(Debug, Default)]
struct Scope<'v> {
    properties: HashMap<usize, HashSet<&'v str>>,
    items: HashMap<usize, HashSet<usize>>,
}

impl<'v> Scope<'v> {
    fn absorb(&mut self, other: Scope<'v>) {
        for (object, names) in other.properties {
            self.properties.entry(object).or_default().extend(names);
        }
        for (array, indices) in other.items {
            self.items.entry(array).or_default().extend(indices);
        }
    }
}

/// Stack of evaluation scopes threaded through one validation run.
#[derive(Debug, Default)]
pub(crate) struct EvaluationScopes<'v> {
    scopes: Vec<Scope<'v>>,
}

impl<'v> EvaluationScopes<'v> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live scopes, equal to the current call depth.
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    pub fn push(&mut self) {
        self.scopes.push(Scope::default());
    }

    /// Close the innermost scope, promoting its marks when `keep` is set.
    pub fn pop(&mut self, keep: bool) {
        let Some(scope) = self.scopes.pop() else {
            return;
        };
        if keep {
            if let Some(parent) = self.scopes.last_mut() {
                parent.absorb(scope);
            }
        }
    }

    pub fn mark_property(&mut self, object: &Map<String, Value>, name: &'v str) {
        if let Some(scope) = self.scopes.last_mut() {
            scope
                .properties
                .entry(object_identity(object))
                .or_default()
                .insert(name);
        }
    }

    /// Whether `name` was evaluated in the innermost scope, i.e. by the call
    /// currently processing `object` or anything it invoked successfully.
    pub fn is_property_evaluated(&self, object: &Map<String, Value>, name: &str) -> bool {
        self.scopes
            .last()
            .and_then(|scope| scope.properties.get(&object_identity(object)))
            .map(|names| names.contains(name))
            .unwrap_or(false)
    }

    pub fn mark_item(&mut self, array: &[Value], index: usize) {
        if let Some(scope) = self.scopes.last_mut() {
            scope
                .items
                .entry(array_identity(array))
                .or_default()
                .insert(index);
        }
    }

    pub fn is_item_evaluated(&self, array: &[Value], index: usize) -> bool {
        self.scopes
            .last()
            .and_then(|scope| scope.items.get(&array_identity(array)))
            .map(|indices| indices.contains(&index))
            .unwrap_or(false)
    }
}
