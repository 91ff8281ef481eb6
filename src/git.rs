// SPDX-FileCopyrightText: © 2025 TTKB, LLC
// SPDX-License-Identifier: BSD-3-CLAUSE

//! A thin wrapper around the `git` executable.

use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use anyhow::{bail, Context, Result};
use tracing::debug;

use crate::path::template_path;

/// Object modes reported by `git ls-files -s`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileMode {
    File,
    Executable,
    Submodule,
    Symlink,
    Other(u32),
}

impl From<u32> for FileMode {
    fn from(mode: u32) -> Self {
        match mode {
            0o100644 => Self::File,
            0o100755 => Self::Executable,
            0o160000 => Self::Submodule,
            0o120000 => Self::Symlink,
            other => Self::Other(other),
        }
    }
}

/// An entry of the index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LsFile {
    pub mode: FileMode,
    pub object: String,
    /// Path relative to the repository top level.
    pub name: String,
}

/// Parses one line of `git ls-files -s`:
/// `<mode> <object> <stage>\t<name>`.
pub fn parse_ls_file(line: &str) -> Option<LsFile> {
    let (info, name) = line.split_once('\t')?;
    let mut fields = info.split_whitespace();
    let mode = u32::from_str_radix(fields.next()?, 8).ok()?;
    let object = fields.next()?.to_string();
    Some(LsFile {
        mode: mode.into(),
        object,
        name: name.to_string(),
    })
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GitOptions {
    /// Create a repository unless the directory already is the top level
    /// of one.
    pub init: bool,
    /// Read the index of the repository.
    pub ls_files: bool,
}

#[derive(Debug, Clone)]
pub struct Git {
    cwd: PathBuf,
    top_level: Option<PathBuf>,
    files: Vec<LsFile>,
}

fn run<I, S>(cwd: &Path, args: I) -> Result<Output>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut command = Command::new("git");
    command.args(args).current_dir(cwd);
    debug!("running {command:?}");
    command
        .output()
        .with_context(|| format!("could not run git in {}", cwd.display()))
}

fn run_checked<I, S>(cwd: &Path, args: I) -> Result<Output>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let output = run(cwd, args)?;
    if !output.status.success() {
        bail!(
            "git failed in {}: {}",
            cwd.display(),
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }
    Ok(output)
}

fn stdout_line(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

fn top_level(cwd: &Path) -> Result<Option<PathBuf>> {
    let output = run(cwd, ["rev-parse", "--show-toplevel"])?;
    let line = stdout_line(&output);
    if !output.status.success() || line.is_empty() {
        return Ok(None);
    }
    Ok(Some(PathBuf::from(line)))
}

fn same_dir(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

impl Git {
    pub fn open(cwd: &Path, options: GitOptions) -> Result<Self> {
        let mut top = top_level(cwd)?;
        if options.init && !top.as_deref().is_some_and(|top| same_dir(top, cwd)) {
            run_checked(cwd, ["init", "--quiet"])?;
            top = top_level(cwd)?;
        }

        let files = match (&top, options.ls_files) {
            (Some(top), true) => {
                let output = run_checked(top, ["ls-files", "-s", "-z"])?;
                String::from_utf8_lossy(&output.stdout)
                    .split('\0')
                    .filter_map(parse_ls_file)
                    .collect()
            }
            _ => Vec::new(),
        };
        debug!(
            "{}: top level {:?}, {} indexed file(s)",
            cwd.display(),
            top,
            files.len()
        );

        Ok(Self {
            cwd: cwd.to_path_buf(),
            top_level: top,
            files,
        })
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Indexed names with the given mode, relative to the working
    /// directory. Entries outside of it are left out.
    pub fn files_with_mode(&self, mode: FileMode) -> Vec<String> {
        let Some(top) = &self.top_level else {
            return Vec::new();
        };
        let (Ok(top), Ok(cwd)) = (fs::canonicalize(top), fs::canonicalize(&self.cwd)) else {
            return Vec::new();
        };
        self.files
            .iter()
            .filter(|file| file.mode == mode)
            .filter_map(|file| template_path(&cwd, &top.join(&file.name)))
            .collect()
    }

    pub fn executable_files(&self) -> Vec<String> {
        self.files_with_mode(FileMode::Executable)
    }

    pub fn submodules(&self) -> Vec<String> {
        self.files_with_mode(FileMode::Submodule)
    }

    /// Stages `paths`, marking them executable in the index if asked to.
    /// Paths are staged even when the repository's own ignore rules match
    /// them, e.g. a `.gitignore` containing `*`.
    pub fn add(&self, paths: &[String], executable: bool) -> Result<()> {
        if paths.is_empty() {
            return Ok(());
        }
        let mut args = vec!["add", "--force"];
        if executable {
            args.push("--chmod=+x");
        }
        args.push("--");
        args.extend(paths.iter().map(String::as_str));
        let output = run_checked(&self.cwd, args)?;
        let out = stdout_line(&output);
        if !out.is_empty() {
            println!("{out}");
        }
        Ok(())
    }

    fn config(&self, key: &str) -> Result<Option<String>> {
        let output = run(&self.cwd, ["config", key])?;
        let value = stdout_line(&output);
        Ok((output.status.success() && !value.is_empty()).then_some(value))
    }

    pub fn user_name(&self) -> Result<Option<String>> {
        self.config("user.name")
    }

    pub fn user_email(&self) -> Result<Option<String>> {
        self.config("user.email")
    }
}
