//! CLI integration tests for the schemata binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("schemata"))
}

// Helper to create a temp file
fn write_temp_file(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

const PERSON_SCHEMA: &str = r#"{
    "type": "object",
    "required": ["name"],
    "additionalProperties": false,
    "properties": {
        "name": { "type": "string", "minLength": 1 },
        "age": { "type": "integer", "minimum": 0 }
    }
}"#;

mod validate_command {
    use super::*;

    #[test]
    fn validate_valid_instance() {
        let dir = TempDir::new().unwrap();
        let schema = write_temp_file(&dir, "schema.json", PERSON_SCHEMA);
        let instance = write_temp_file(&dir, "person.json", r#"{"name": "Ada", "age": 36}"#);

        cmd()
            .args([
                "validate",
                instance.to_str().unwrap(),
                "--schema",
                schema.to_str().unwrap(),
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains("Valid"));
    }

    #[test]
    fn validate_yaml_instance() {
        let dir = TempDir::new().unwrap();
        let schema = write_temp_file(&dir, "schema.json", PERSON_SCHEMA);
        let instance = write_temp_file(&dir, "person.yaml", "name: Ada\nage: 36\n");

        cmd()
            .args([
                "validate",
                instance.to_str().unwrap(),
                "--schema",
                schema.to_str().unwrap(),
            ])
            .assert()
            .success();
    }

    #[test]
    fn validate_missing_required_field() {
        let dir = TempDir::new().unwrap();
        let schema = write_temp_file(&dir, "schema.json", PERSON_SCHEMA);
        let instance = write_temp_file(&dir, "person.json", r#"{"age": 3}"#);

        cmd()
            .args([
                "validate",
                instance.to_str().unwrap(),
                "--schema",
                schema.to_str().unwrap(),
            ])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("Validation failed"))
            .stderr(predicate::str::contains("missing required property 'name'"));
    }

    #[test]
    fn validate_reports_nested_paths() {
        let dir = TempDir::new().unwrap();
        let schema = write_temp_file(&dir, "schema.json", PERSON_SCHEMA);
        let instance = write_temp_file(&dir, "person.json", r#"{"name": "Ada", "age": -1}"#);

        cmd()
            .args([
                "validate",
                instance.to_str().unwrap(),
                "--schema",
                schema.to_str().unwrap(),
            ])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("/age: value too small, -1 < MIN=0"));
    }

    #[test]
    fn validate_additional_property_rejected() {
        let dir = TempDir::new().unwrap();
        let schema = write_temp_file(&dir, "schema.json", PERSON_SCHEMA);
        let instance = write_temp_file(&dir, "person.json", r#"{"name": "Ada", "id": "123"}"#);

        cmd()
            .args([
                "validate",
                instance.to_str().unwrap(),
                "--schema",
                schema.to_str().unwrap(),
            ])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("additional property 'id'"));
    }

    #[test]
    fn validate_with_other_schema() {
        let dir = TempDir::new().unwrap();
        let common = write_temp_file(
            &dir,
            "common.json",
            r#"{
                "$id": "https://example.com/common.json",
                "$defs": { "port": { "$anchor": "port", "type": "integer", "maximum": 65535 } }
            }"#,
        );
        let schema = write_temp_file(
            &dir,
            "schema.json",
            r#"{
                "$id": "https://example.com/server.json",
                "properties": { "port": { "$ref": "/common.json#port" } }
            }"#,
        );
        let good = write_temp_file(&dir, "good.json", r#"{"port": 8080}"#);
        let bad = write_temp_file(&dir, "bad.json", r#"{"port": 70000}"#);

        cmd()
            .args([
                "validate",
                good.to_str().unwrap(),
                "--schema",
                schema.to_str().unwrap(),
                "--other",
                common.to_str().unwrap(),
            ])
            .assert()
            .success();

        cmd()
            .args([
                "validate",
                bad.to_str().unwrap(),
                "--schema",
                schema.to_str().unwrap(),
                "--other",
                common.to_str().unwrap(),
            ])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("value too large"));
    }

    #[test]
    fn validate_json_output_valid() {
        let dir = TempDir::new().unwrap();
        let schema = write_temp_file(&dir, "schema.json", PERSON_SCHEMA);
        let instance = write_temp_file(&dir, "person.json", r#"{"name": "Ada"}"#);

        cmd()
            .args([
                "validate",
                instance.to_str().unwrap(),
                "--schema",
                schema.to_str().unwrap(),
                "--json",
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains(r#"{"valid":true}"#));
    }

    #[test]
    fn validate_json_output_invalid() {
        let dir = TempDir::new().unwrap();
        let schema = write_temp_file(&dir, "schema.json", PERSON_SCHEMA);
        let instance = write_temp_file(&dir, "person.json", r#"{}"#);

        cmd()
            .args([
                "validate",
                instance.to_str().unwrap(),
                "--schema",
                schema.to_str().unwrap(),
                "--json",
            ])
            .assert()
            .code(1)
            .stdout(predicate::str::contains(r#""valid":false"#))
            .stdout(predicate::str::contains(r#""internal_error":false"#))
            .stdout(predicate::str::contains(r#""diagnostics":"#));
    }

    #[test]
    fn validate_json_output_internal_error() {
        let dir = TempDir::new().unwrap();
        let schema = write_temp_file(&dir, "schema.json", r##"{"$ref": "#/$defs/nowhere"}"##);
        let instance = write_temp_file(&dir, "value.json", "1");

        cmd()
            .args([
                "validate",
                instance.to_str().unwrap(),
                "--schema",
                schema.to_str().unwrap(),
                "--json",
            ])
            .assert()
            .code(1)
            .stdout(predicate::str::contains(r#""internal_error":true"#))
            .stdout(predicate::str::contains(r#""kind":"internal""#));
    }

    #[test]
    fn validate_json_output_file_error() {
        let dir = TempDir::new().unwrap();
        let instance = write_temp_file(&dir, "person.json", r#"{}"#);

        cmd()
            .args([
                "validate",
                instance.to_str().unwrap(),
                "--schema",
                "/nonexistent/schema.json",
                "--json",
            ])
            .assert()
            .code(3)
            .stdout(predicate::str::contains(r#""valid":false"#))
            .stdout(predicate::str::contains(r#""error":"#));
    }

    #[test]
    fn validate_max_depth() {
        let dir = TempDir::new().unwrap();
        let schema = write_temp_file(
            &dir,
            "schema.json",
            r##"{"properties": {"next": {"$ref": "#"}}}"##,
        );
        let instance = write_temp_file(&dir, "chain.json", r#"{"next": {"next": {"next": {}}}}"#);

        cmd()
            .args([
                "validate",
                instance.to_str().unwrap(),
                "--schema",
                schema.to_str().unwrap(),
            ])
            .assert()
            .success();

        cmd()
            .args([
                "validate",
                instance.to_str().unwrap(),
                "--schema",
                schema.to_str().unwrap(),
                "--max-depth",
                "2",
            ])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("maximum validation depth of 2 exceeded"));
    }
}

mod compile_command {
    use super::*;

    #[test]
    fn compile_summary() {
        let dir = TempDir::new().unwrap();
        let schema = write_temp_file(
            &dir,
            "schema.json",
            r#"{
                "$schema": "http://json-schema.org/draft-07/schema#",
                "$id": "https://example.com/root.json",
                "$defs": { "a": { "$anchor": "a" } }
            }"#,
        );

        cmd()
            .args(["compile", schema.to_str().unwrap()])
            .assert()
            .success()
            .stdout(predicate::str::contains("draft:     draft-07"))
            .stdout(predicate::str::contains("nodes:     2"))
            .stdout(predicate::str::contains("example.com/root.json"));
    }

    #[test]
    fn compile_json_summary() {
        let dir = TempDir::new().unwrap();
        let schema = write_temp_file(&dir, "schema.json", r#"{"type": "string"}"#);

        cmd()
            .args(["compile", schema.to_str().unwrap(), "--json"])
            .assert()
            .success()
            .stdout(predicate::str::contains(r#""draft":"2019-09""#))
            .stdout(predicate::str::contains(r#""nodes":1"#));
    }
}

mod error_handling {
    use super::*;

    #[test]
    fn file_not_found() {
        cmd()
            .args(["compile", "/nonexistent/schema.json"])
            .assert()
            .code(3)
            .stderr(
                predicate::str::contains("not found").or(predicate::str::contains("No such file")),
            );
    }

    #[test]
    fn invalid_json_schema() {
        let dir = TempDir::new().unwrap();
        let schema = write_temp_file(&dir, "bad.json", r#"{ not valid json"#);

        cmd()
            .args(["compile", schema.to_str().unwrap()])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("invalid JSON"));
    }

    #[test]
    fn malformed_schema_keyword() {
        let dir = TempDir::new().unwrap();
        let schema = write_temp_file(&dir, "schema.json", r#"{"minLength": -1}"#);

        cmd()
            .args(["compile", schema.to_str().unwrap()])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("must be non-negative"));
    }

    #[test]
    fn const_and_enum_conflict() {
        let dir = TempDir::new().unwrap();
        let schema = write_temp_file(&dir, "schema.json", r#"{"const": 1, "enum": [1]}"#);
        let instance = write_temp_file(&dir, "value.json", "1");

        cmd()
            .args([
                "validate",
                instance.to_str().unwrap(),
                "--schema",
                schema.to_str().unwrap(),
            ])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("both 'const' and 'enum'"));
    }

    #[test]
    fn unsupported_schema_version() {
        let dir = TempDir::new().unwrap();
        let schema = write_temp_file(
            &dir,
            "schema.json",
            r#"{"$schema": "https://example.com/custom-dialect"}"#,
        );

        cmd()
            .args(["compile", schema.to_str().unwrap()])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("unsupported $schema version"));
    }

    #[test]
    fn invalid_yaml_instance() {
        let dir = TempDir::new().unwrap();
        let schema = write_temp_file(&dir, "schema.json", PERSON_SCHEMA);
        let instance = write_temp_file(&dir, "person.yml", "name: [unclosed");

        cmd()
            .args([
                "validate",
                instance.to_str().unwrap(),
                "--schema",
                schema.to_str().unwrap(),
            ])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("invalid YAML"));
    }
}

mod required_args {
    use super::*;

    #[test]
    fn missing_schema_flag() {
        cmd()
            .args(["validate", "instance.json"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("--schema"));
    }

    #[test]
    fn missing_instance() {
        cmd()
            .args(["validate", "--schema", "schema.json"])
            .assert()
            .failure();
    }

    #[test]
    fn missing_schema_path() {
        cmd().args(["compile"]).assert().failure();
    }
}

mod help_and_version {
    use super::*;

    #[test]
    fn help_flag() {
        cmd()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("Compile JSON Schemas"));
    }

    #[test]
    fn version_flag() {
        cmd()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("schemata"));
    }

    #[test]
    fn validate_help() {
        cmd()
            .args(["validate", "--help"])
            .assert()
            .success()
            .stdout(predicate::str::contains("--schema"))
            .stdout(predicate::str::contains("--other"))
            .stdout(predicate::str::contains("--max-depth"));
    }
}
