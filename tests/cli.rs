use assert_cmd::prelude::*;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use tempfile::tempdir;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn oaslint() -> Command {
    Command::cargo_bin("oaslint").unwrap()
}

#[test]
fn validate_clean_document_succeeds() {
    oaslint()
        .arg("validate")
        .arg(fixture("petstore.yaml"))
        .assert()
        .success()
        .stdout(predicate::str::contains("No issues found"));
}

#[test]
fn validate_reports_findings_and_fails_on_errors() {
    oaslint()
        .arg("validate")
        .arg(fixture("findings.yaml"))
        .assert()
        .failure()
        .stdout(predicate::str::contains("paths./users/{id}.get.parameters"))
        .stdout(predicate::str::contains(
            "Security scheme 'OAuth' is not defined in components.securitySchemes.",
        ))
        .stdout(predicate::str::contains("1 error(s), 1 warning(s)"));
}

#[test]
fn validate_with_ruleset_passes_without_errors() {
    oaslint()
        .arg("validate")
        .arg(fixture("findings.yaml"))
        .arg("--ruleset")
        .arg(fixture("ruleset.yaml"))
        .assert()
        .success()
        .stdout(predicate::str::contains("valid-security-references").not());
}

#[test]
fn validate_json_output() -> Result<(), Box<dyn std::error::Error>> {
    let output = oaslint()
        .arg("validate")
        .arg(fixture("findings.yaml"))
        .args(["--format", "json"])
        .assert()
        .failure()
        .get_output()
        .stdout
        .clone();

    let json: Value = serde_json::from_slice(&output)?;
    let findings = json["findings"].as_array().unwrap();
    assert_eq!(findings.len(), 2);
    assert_eq!(findings[0]["rule"], "path-parameters");
    assert_eq!(findings[0]["severity"], "warning");
    assert_eq!(findings[1]["path"], "paths./users/{id}.get.security.0.OAuth");
    Ok(())
}

#[test]
fn validate_unknown_rule_in_ruleset() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let ruleset = dir.path().join("ruleset.yaml");
    fs::write(&ruleset, "rules:\n  no-such-rule: {}\n")?;

    oaslint()
        .arg("validate")
        .arg(fixture("petstore.yaml"))
        .arg("--ruleset")
        .arg(&ruleset)
        .assert()
        .failure()
        .stderr(predicate::str::contains("no-such-rule"));
    Ok(())
}

#[test]
fn validate_broken_reference_fails() {
    oaslint()
        .arg("validate")
        .arg(fixture("missing-ref.yaml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("#/components/schemas/Thing"));
}

#[test]
fn validate_structure_check_can_be_skipped() {
    oaslint()
        .arg("validate")
        .arg(fixture("no-info.yaml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("info"));

    oaslint()
        .arg("validate")
        .arg(fixture("no-info.yaml"))
        .arg("--no-structure-check")
        .assert()
        .failure()
        .stdout(predicate::str::contains(
            "Missing required field 'info' - API metadata must be provided",
        ));
}

#[test]
fn dereference_prints_self_contained_document() -> Result<(), Box<dyn std::error::Error>> {
    let output = oaslint()
        .arg("dereference")
        .arg(fixture("petstore.yaml"))
        .args(["--output-format", "json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let json: Value = serde_json::from_slice(&output)?;
    assert!(!String::from_utf8(output)?.contains("$ref"));
    assert_eq!(
        json.pointer("/paths/~1pets/get/responses/default/description"),
        Some(&Value::from("Unexpected error"))
    );
    Ok(())
}

#[test]
fn dereference_strict_cycles_fails() {
    oaslint()
        .arg("dereference")
        .arg(fixture("tree.yaml"))
        .assert()
        .success()
        .stdout(predicate::str::contains("$ref"));

    oaslint()
        .arg("dereference")
        .arg(fixture("tree.yaml"))
        .arg("--strict-cycles")
        .assert()
        .failure()
        .stderr(predicate::str::contains("circular"));
}

#[test]
fn rules_lists_registry() {
    oaslint()
        .arg("rules")
        .assert()
        .success()
        .stdout(predicate::str::contains("required-fields"))
        .stdout(predicate::str::contains("path-parameters"))
        .stdout(predicate::str::contains("response-codes"))
        .stdout(predicate::str::contains("valid-security-references"));
}

#[test]
fn rules_with_ruleset_shows_effective_settings() {
    oaslint()
        .arg("rules")
        .arg("--ruleset")
        .arg(fixture("ruleset.yaml"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Placeholders are advisory in this API"))
        .stdout(predicate::str::contains("required-fields"))
        .stdout(predicate::str::contains("valid-security-references").not());
}

#[test]
fn validate_checks_definitions_from_other_files() {
    oaslint()
        .arg("validate")
        .arg(fixture("split/api.yaml"))
        .assert()
        .success()
        .stdout(predicate::str::contains("No issues found"));
}

#[test]
fn cycles_lists_recursive_schemas() {
    oaslint()
        .arg("cycles")
        .arg(fixture("tree.yaml"))
        .assert()
        .success()
        .stdout(predicate::str::contains("tree.yaml#/components/schemas/Node"));

    oaslint()
        .arg("cycles")
        .arg(fixture("petstore.yaml"))
        .assert()
        .success()
        .stdout(predicate::str::contains("No reference cycles"));
}
