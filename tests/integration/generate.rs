use predicates::prelude::*;
use sha2::{Digest, Sha256};

use crate::common::TestProject;

const FREEZE: &str = "six==1.10.0\npython-dateutil==2.5.3\n";
const ARTIFACTS: &[&str] = &[
    "python_dateutil-2.5.3-py2.py3-none-any.whl",
    "six-1.10.0-py2.py3-none-any.whl",
    "setuptools_scm-1.15.0.tar.gz",
];

fn project() -> TestProject {
    let project = TestProject::new().unwrap();
    project.write_file("requirements-dev.txt", "six\npython-dateutil\n").unwrap();
    project.set_freeze(FREEZE).unwrap();
    project.set_artifacts(ARTIFACTS).unwrap();
    project
}

fn pin_lines(output: &str) -> Vec<String> {
    output.lines().skip(1).map(str::to_string).collect()
}

/// Default run writes the production file to stdout and nothing else.
#[test]
fn test_gen_to_stdout() {
    let project = project();

    let assert = project.dephash().args(["gen", "requirements-dev.txt"]).assert().success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();

    assert!(stdout.starts_with("# Generated from dephash\n"), "{stdout}");
    let pins = pin_lines(&stdout);
    assert_eq!(pins.len(), 2);
    assert!(pins[0].starts_with("python-dateutil==2.5.3 --hash=sha512:"));
    assert!(pins[1].starts_with("six==1.10.0 --hash=sha512:"));
    assert!(!project.project_path().join("requirements-prod.txt").exists());
    assert!(project.scratch_is_empty());
}

#[test]
fn test_gen_to_explicit_file() {
    let project = project();

    project
        .dephash()
        .args(["gen", "-o", "out/prod.txt", "requirements-dev.txt"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let written = project.read_file("out/prod.txt").unwrap();
    assert_eq!(pin_lines(&written).len(), 2);
}

#[test]
fn test_gen_to_derived_file() {
    let project = project();
    project.write_file("deps/requirements-dev.txt", "six\n").unwrap();

    project.dephash().args(["gen", "-d", "deps/requirements-dev.txt"]).assert().success();

    let written = project.read_file("deps/requirements-prod.txt").unwrap();
    assert!(written.starts_with("# Generated from dephash\n"));
}

#[test]
fn test_gen_derived_fallback_name() {
    let project = project();
    project.write_file("requirements.txt", "six\n").unwrap();

    project.dephash().args(["gen", "--derive-output", "requirements.txt"]).assert().success();

    assert!(project.project_path().join("reqhash.out").exists());
}

/// Output is stable across runs against the same tool outputs.
#[test]
fn test_gen_is_idempotent() {
    let project = project();

    project.dephash().args(["gen", "-o", "first.txt", "requirements-dev.txt"]).assert().success();
    project.dephash().args(["gen", "-o", "second.txt", "requirements-dev.txt"]).assert().success();

    assert_eq!(project.read_file("first.txt").unwrap(), project.read_file("second.txt").unwrap());
}

#[test]
fn test_gen_passes_isolated_and_algorithm() {
    let project = project();

    project.dephash().args(["gen", "-a", "sha256", "requirements-dev.txt"]).assert().success();

    let calls = project.calls();
    assert!(calls.iter().any(|c| c.starts_with("virtualenv ")));
    assert!(calls.iter().any(|c| c.starts_with("pip --isolated install -r requirements-dev.txt")));
    assert!(calls.iter().any(|c| c.starts_with("pip --isolated download -r requirements-dev.txt -d ")));
    assert!(calls.iter().any(|c| c == "pip --isolated freeze"));
    assert!(calls.iter().any(|c| c.starts_with("pip --isolated hash -a sha256 ")));
    assert!(!calls.iter().any(|c| c.contains("--version")));
}

/// The built-in hasher digests the downloaded files without calling `pip hash`.
#[test]
fn test_gen_builtin_hasher() {
    let project = project();

    let assert = project
        .dephash()
        .args(["gen", "--hasher", "builtin", "-a", "sha256", "requirements-dev.txt"])
        .assert()
        .success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();

    // the fake download writes each file name as the file's content
    let expected = hex::encode(Sha256::digest(b"six-1.10.0-py2.py3-none-any.whl"));
    assert!(stdout.contains(&format!("six==1.10.0 --hash=sha256:{expected}\n")), "{stdout}");
    assert!(!project.calls().iter().any(|c| c.contains(" hash ")));
}

/// A pinned installer is queried for its version and added to the output.
#[test]
fn test_gen_records_pinned_installer() {
    let project = project();
    project.write_file("requirements-dev.txt", "pip==9.0.1\nsix\n").unwrap();
    let mut artifacts = ARTIFACTS.to_vec();
    artifacts.push("pip-9.0.1-py2.py3-none-any.whl");
    project.set_artifacts(&artifacts).unwrap();

    project
        .dephash()
        .args(["gen", "requirements-dev.txt"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\npip==9.0.1 --hash=sha512:"));

    assert!(project.calls().iter().any(|c| c == "pip --isolated --version"));
}

/// Every package without an artifact is named, and nothing is written.
#[test]
fn test_gen_missing_hashes() {
    let project = project();
    project.set_freeze("six==1.10.0\nclick==6.7\nattrs==17.2.0\n").unwrap();

    project
        .dephash()
        .args(["gen", "-o", "prod.txt", "requirements-dev.txt"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Missing hashes for attrs, click"));

    assert!(!project.project_path().join("prod.txt").exists());
    assert!(project.scratch_is_empty());
}

#[test]
fn test_gen_command_failure_cleans_up() {
    for step in ["virtualenv", "install", "download", "freeze", "hash"] {
        let project = project();
        project.fail_at(step).unwrap();

        project
            .dephash()
            .args(["gen", "-o", "prod.txt", "requirements-dev.txt"])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("failed with exit code"));

        assert!(project.scratch_is_empty(), "{step} left scratch directories behind");
        assert!(!project.project_path().join("prod.txt").exists(), "{step} wrote output");
    }
}

#[test]
fn test_gen_malformed_freeze() {
    let project = project();
    project.set_freeze("six==1.10.0\nnot a pin\n").unwrap();

    project
        .dephash()
        .args(["gen", "requirements-dev.txt"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Malformed freeze output on line 2"));

    assert!(project.scratch_is_empty());
}

#[test]
fn test_gen_missing_requirements_file() {
    let project = project();

    project
        .dephash()
        .args(["gen", "absent-dev.txt"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("absent-dev.txt"));

    assert!(project.calls().is_empty());
}

#[test]
fn test_gen_missing_virtualenv() {
    let project = project();

    project
        .dephash()
        .args(["gen", "--virtualenv", "dephash-no-such-virtualenv", "requirements-dev.txt"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Command not found: dephash-no-such-virtualenv"));

    assert!(project.scratch_is_empty());
}

/// Log records go to stderr so stdout is only the generated file.
#[test]
fn test_gen_verbose_logs_to_stderr() {
    let project = project();

    let assert =
        project.dephash().args(["-v", "gen", "requirements-dev.txt"]).assert().success();
    let output = assert.get_output();
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert_eq!(stdout.lines().count(), 3);
    assert!(stderr.contains("freeze"), "{stderr}");
}

#[test]
fn test_gen_log_file() {
    let project = project();

    project
        .dephash()
        .args(["-v", "--log-file", "dephash.log", "gen", "requirements-dev.txt"])
        .assert()
        .success();

    let log = project.read_file("dephash.log").unwrap();
    assert!(log.contains("Wrote 2 pinned packages to stdout"), "{log}");
}

#[test]
fn test_gen_header_from_config() {
    let project = project();
    let mut config = std::fs::read_to_string(project.config_path()).unwrap();
    config.push_str("header = \"acme-build\"\n");
    let config_path = project.write_file("custom.toml", &config).unwrap();

    project
        .dephash()
        .arg("--config")
        .arg(&config_path)
        .args(["gen", "requirements-dev.txt"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("# Generated from acme-build\n"));
}
