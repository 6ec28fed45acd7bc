//! Schemata
//!
//! Compile JSON Schema documents once, then validate any number of JSON or
//! YAML values against them.
//!
//! The engine follows draft 2019-09 semantics for the keywords it supports:
//! type unions, `$ref`/`$anchor`/`$defs` resolution within and across schema
//! documents, `allOf`/`anyOf`/`oneOf`/`not`, and
//! `unevaluatedProperties`/`unevaluatedItems`. A failed validation yields a
//! [`Diagnostic`] tree with one node per schema location that rejected the
//! value.
//!
//! # Example
//!
//! ```
//! use schemata::{compile_schema, validate};
//! use serde_json::json;
//!
//! let schema = compile_schema(&json!({
//!     "type": "object",
//!     "required": ["name"],
//!     "properties": {
//!         "name": { "type": "string" },
//!         "port": { "$ref": "#/$defs/port" }
//!     },
//!     "$defs": {
//!         "port": { "type": "integer", "minimum": 1, "maximum": 65535 }
//!     }
//! }))
//! .unwrap();
//!
//! assert!(validate(&json!({"name": "api", "port": 8080}), &schema, &[]).is_valid());
//!
//! let outcome = validate(&json!({"port": 0}), &schema, &[]);
//! let diagnostics = outcome.diagnostics().unwrap();
//! assert_eq!(
//!     diagnostics.to_string(),
//!     "(root): invalid object\n  (root): missing required property 'name'\n  /port: value too small, 0 < MIN=1"
//! );
//! ```
//!
//! # Error Classes
//!
//! | Class | Surfaced as |
//! |-------|-------------|
//! | Malformed schema | [`CompileError`] from [`compile_schema`] |
//! | Non-conforming data | [`ValidationOutcome::Invalid`] |
//! | Broken schema found while validating (`$ref` miss, bad pattern, depth limit) | [`DiagnosticKind::Internal`] nodes, see [`ValidationOutcome::has_internal_errors`] |

mod compiler;
mod diagnostics;
mod error;
mod loader;
mod resolver;
mod schema;
mod scope;
mod types;
mod validator;

pub use compiler::compile_schema;
pub use diagnostics::{AccessPath, Diagnostic, DiagnosticKind};
pub use error::{CompileError, LoadError, ResolutionError};
pub use loader::{is_url, load_document, load_document_auto, load_document_str, Format};
pub use resolver::{resolve, resolve_chain};
pub use schema::{
    document_key, Applicator, ArrayConstraints, Bound, CompiledSchema, Identity, Items, NodeId,
    NodeRef, NumberConstraints, ObjectConstraints, Pattern, SchemaNode, StringConstraints,
};
pub use types::{json_type_name, Draft, JsonType, TypeMask, ValidateOptions, DEFAULT_MAX_DEPTH};
pub use validator::{validate, validate_with_options, ValidationOutcome};

#[cfg(feature = "remote")]
pub use loader::load_document_url;
