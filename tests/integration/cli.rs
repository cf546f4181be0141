use predicates::prelude::*;

use crate::common::TestProject;

#[test]
fn test_no_arguments_is_usage_error() {
    let project = TestProject::new().unwrap();
    project.dephash().assert().code(1).stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_help_and_version_succeed() {
    let project = TestProject::new().unwrap();

    project
        .dephash()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("gen"))
        .stdout(predicate::str::contains("outdated"));

    project
        .dephash()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_gen_arity() {
    let project = TestProject::new().unwrap();
    project.write_file("a-dev.txt", "six\n").unwrap();
    project.write_file("b-dev.txt", "six\n").unwrap();

    project.dephash().arg("gen").assert().code(1);
    project.dephash().args(["gen", "a-dev.txt", "b-dev.txt"]).assert().code(1);

    // rejected before any tool runs
    assert!(project.calls().is_empty());
    assert!(project.scratch_is_empty());
}

#[test]
fn test_output_flags_conflict() {
    let project = TestProject::new().unwrap();
    project.write_file("requirements-dev.txt", "six\n").unwrap();

    project
        .dephash()
        .args(["gen", "-o", "prod.txt", "-d", "requirements-dev.txt"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn test_unknown_algorithm() {
    let project = TestProject::new().unwrap();
    project.write_file("requirements-dev.txt", "six\n").unwrap();

    project.dephash().args(["gen", "-a", "md5", "requirements-dev.txt"]).assert().code(1);
}

#[test]
fn test_missing_config_file() {
    let project = TestProject::new().unwrap();
    project.write_file("requirements-dev.txt", "six\n").unwrap();

    project
        .dephash()
        .env("DEPHASH_CONFIG", project.project_path().join("missing.toml"))
        .args(["gen", "requirements-dev.txt"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Configuration error"));
}

#[test]
fn test_unknown_config_key() {
    let project = TestProject::new().unwrap();
    project.write_file("requirements-dev.txt", "six\n").unwrap();
    let config = project.write_file("bad.toml", "virtualenvs = \"x\"\n").unwrap();

    project
        .dephash()
        .arg("-c")
        .arg(&config)
        .args(["gen", "requirements-dev.txt"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("virtualenvs"));
}
