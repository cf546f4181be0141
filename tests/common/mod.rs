//! Shared harness for driving the dephash binary against fake tools.
//!
//! `virtualenv` and `pip` are replaced by small shell scripts. Their
//! behaviour comes from files in a data directory, and every invocation is
//! appended to `calls.log`, so tests can script tool output and inspect
//! exactly what dephash ran.

#![allow(dead_code)]

use anyhow::{Context, Result};
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const FAKE_VIRTUALENV: &str = r#"#!/bin/sh
DATA="@DATA@"
echo "virtualenv $*" >> "$DATA/calls.log"
if [ "$(cat "$DATA/fail" 2>/dev/null)" = "virtualenv" ]; then
    echo "virtualenv: cannot create $1" >&2
    exit 3
fi
mkdir -p "$1/bin"
cp "$DATA/pip" "$1/bin/pip"
chmod +x "$1/bin/pip"
echo "created virtual environment in $1"
"#;

const FAKE_PIP: &str = r#"#!/bin/sh
DATA="@DATA@"
echo "pip $*" >> "$DATA/calls.log"
if [ "$1" = "--isolated" ]; then
    shift
fi
if [ "$(cat "$DATA/fail" 2>/dev/null)" = "$1" ]; then
    echo "pip $1: simulated failure" >&2
    exit 1
fi
case "$1" in
    --version)
        cat "$DATA/version.txt"
        ;;
    install)
        echo "Successfully installed everything"
        ;;
    freeze)
        cat "$DATA/freeze.txt"
        ;;
    download)
        while read -r name; do
            if [ -n "$name" ]; then
                printf '%s' "$name" > "$5/$name"
            fi
        done < "$DATA/artifacts.txt"
        ;;
    hash)
        alg="$3"
        shift 3
        for f in "$@"; do
            if [ ! -f "$f" ]; then
                echo "no such file: $f" >&2
                exit 1
            fi
            sum=$(cksum < "$f" | cut -d' ' -f1)
            echo "$f:"
            echo "--hash=$alg:$sum"
        done
        ;;
    list)
        cat "$DATA/outdated.txt" 2>/dev/null
        ;;
    *)
        echo "unexpected pip invocation: $*" >&2
        exit 2
        ;;
esac
"#;

/// A temporary project with fake tools, a config file pointing at them and
/// a private scratch directory.
pub struct TestProject {
    _temp_dir: TempDir, // Keep alive for RAII cleanup
    project_dir: PathBuf,
    data_dir: PathBuf,
    scratch_dir: PathBuf,
    config_path: PathBuf,
}

impl TestProject {
    /// Create a project whose fake `pip` reports version 9.0.1 and has no
    /// packages, artifacts or outdated listing yet.
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let project_dir = temp_dir.path().join("project");
        let data_dir = temp_dir.path().join("tools");
        let scratch_dir = temp_dir.path().join("scratch");
        fs::create_dir_all(&project_dir)?;
        fs::create_dir_all(&data_dir)?;
        fs::create_dir_all(&scratch_dir)?;

        let data = data_dir.display().to_string();
        write_script(&data_dir.join("virtualenv"), &FAKE_VIRTUALENV.replace("@DATA@", &data))?;
        write_script(&data_dir.join("pip"), &FAKE_PIP.replace("@DATA@", &data))?;

        let config_path = temp_dir.path().join("dephash.toml");
        fs::write(
            &config_path,
            format!(
                "virtualenv = {:?}\nscratch_dir = {:?}\n",
                data_dir.join("virtualenv").display().to_string(),
                scratch_dir.display().to_string()
            ),
        )?;

        let project = Self {
            _temp_dir: temp_dir,
            project_dir,
            data_dir,
            scratch_dir,
            config_path,
        };
        project.set_version("pip 9.0.1 from /fake/lib/python3.6/site-packages (python 3.6)\n")?;
        project.set_freeze("")?;
        project.set_outdated("")?;
        project.set_artifacts(&[])?;
        Ok(project)
    }

    pub fn project_path(&self) -> &Path {
        &self.project_dir
    }

    pub fn scratch_path(&self) -> &Path {
        &self.scratch_dir
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Write a file in the project directory and return its path.
    pub fn write_file(&self, name: &str, content: &str) -> Result<PathBuf> {
        let path = self.project_dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, content).with_context(|| format!("writing {}", path.display()))?;
        Ok(path)
    }

    pub fn read_file(&self, name: &str) -> Result<String> {
        Ok(fs::read_to_string(self.project_dir.join(name))?)
    }

    pub fn set_freeze(&self, output: &str) -> Result<()> {
        Ok(fs::write(self.data_dir.join("freeze.txt"), output)?)
    }

    pub fn set_version(&self, output: &str) -> Result<()> {
        Ok(fs::write(self.data_dir.join("version.txt"), output)?)
    }

    pub fn set_outdated(&self, output: &str) -> Result<()> {
        Ok(fs::write(self.data_dir.join("outdated.txt"), output)?)
    }

    /// Artifact files the fake `pip download` creates.
    pub fn set_artifacts(&self, names: &[&str]) -> Result<()> {
        let mut listing = names.join("\n");
        listing.push('\n');
        Ok(fs::write(self.data_dir.join("artifacts.txt"), listing)?)
    }

    /// Make the named step (`virtualenv`, `install`, `freeze`, `download`,
    /// `hash`, `list`, `--version`) exit non-zero.
    pub fn fail_at(&self, step: &str) -> Result<()> {
        Ok(fs::write(self.data_dir.join("fail"), step)?)
    }

    /// Every fake tool invocation so far, one per line.
    pub fn calls(&self) -> Vec<String> {
        fs::read_to_string(self.data_dir.join("calls.log"))
            .map(|log| log.lines().map(str::to_string).collect())
            .unwrap_or_default()
    }

    /// An environment directory that already contains the fake `pip`.
    pub fn create_venv(&self, name: &str) -> Result<PathBuf> {
        let venv = self.project_dir.join(name);
        fs::create_dir_all(venv.join("bin"))?;
        fs::copy(self.data_dir.join("pip"), venv.join("bin").join("pip"))?;
        fs::set_permissions(venv.join("bin").join("pip"), fs::Permissions::from_mode(0o755))?;
        Ok(venv)
    }

    /// Whether the scratch directory holds nothing.
    pub fn scratch_is_empty(&self) -> bool {
        fs::read_dir(&self.scratch_dir).map(|mut entries| entries.next().is_none()).unwrap_or(true)
    }

    /// The dephash binary, run in the project directory with this project's
    /// configuration.
    pub fn dephash(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::Command::new(env!("CARGO_BIN_EXE_dephash"));
        cmd.current_dir(&self.project_dir)
            .env("DEPHASH_CONFIG", &self.config_path)
            .env("NO_COLOR", "1")
            .env_remove("RUST_LOG");
        cmd
    }
}

fn write_script(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content)?;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))?;
    Ok(())
}
