// SPDX-FileCopyrightText: © 2025 TTKB, LLC
// SPDX-License-Identifier: BSD-3-CLAUSE

//! Writing a template directory into a new repository.

use std::collections::{BTreeSet, HashSet};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Datelike, Local};
use tracing::{debug, info};

use crate::git::Git;
use crate::path::posix_path;
use crate::report::{LsColors, Report, ReportedFile};
use crate::template::{output_name, read_templates, Chunk, Template, TemplateKind};
use crate::variables::{Variable, Variables};

const FILE_MODE: u32 = 0o644;
const EXEC_MODE: u32 = 0o755;

/// The outcome of [TemplateWriter::copy_templates].
#[derive(Debug, Clone, Default)]
pub struct Summary {
    pub report: Report,
    /// Placeholders that had no value, sorted.
    pub missing: BTreeSet<String>,
}

/// Copies templates into the working directory of `repo`.
pub struct TemplateWriter<'a> {
    repo: &'a Git,
    execs: HashSet<String>,
    vars: Variables,
    colors: Option<LsColors>,
    /// Name, target and whether the link is executable.
    symlinks: Vec<(String, String, bool)>,
    files_to_add: Vec<String>,
    exec_files_to_add: Vec<String>,
    summary: Summary,
}

impl<'a> TemplateWriter<'a> {
    /// `execs` names the templates (relative to the template directory)
    /// that should be executable. Variables without a value are ignored.
    pub fn new<I, K, V>(repo: &'a Git, execs: HashSet<String>, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, Option<V>)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut variables = Variables::with_builtins();
        variables.add(Variable::text("YEAR", Local::now().year().to_string()));
        for (key, value) in vars {
            if let Some(value) = value {
                variables.add(Variable::text(key, value));
            }
        }

        Self {
            repo,
            execs,
            vars: variables,
            colors: None,
            symlinks: Vec::new(),
            files_to_add: Vec::new(),
            exec_files_to_add: Vec::new(),
            summary: Summary::default(),
        }
    }

    /// Colors the printed listing.
    pub fn with_colors(mut self, colors: Option<LsColors>) -> Self {
        self.colors = colors;
        self
    }

    /// Copies every template of `dir` except the `excludes` (paths relative
    /// to `dir`), stages the results and prints a listing of them.
    pub fn copy_templates(&mut self, dir: &Path, excludes: &[String]) -> Result<Summary> {
        self.symlinks.clear();
        self.files_to_add.clear();
        self.exec_files_to_add.clear();
        self.summary = Summary::default();

        read_templates(dir, excludes, |template| self.on_file(template))?;

        // links last, so their targets exist
        for (filename, target, is_exec) in std::mem::take(&mut self.symlinks) {
            self.link_file(&filename, &target, is_exec)?;
        }

        print!("{}", self.summary.report.render(self.colors.as_ref()));

        self.repo.add(&self.files_to_add, false)?;
        self.repo.add(&self.exec_files_to_add, true)?;
        #[cfg(unix)]
        for filename in &self.exec_files_to_add {
            use std::os::unix::fs::PermissionsExt;

            let path = self.repo.cwd().join(filename);
            if fs::symlink_metadata(&path)?.file_type().is_symlink() {
                continue;
            }
            fs::set_permissions(&path, fs::Permissions::from_mode(EXEC_MODE))
                .with_context(|| format!("making {} executable", path.display()))?;
        }

        info!(
            "wrote {} file(s), {} unset variable(s)",
            self.summary.report.len(),
            self.summary.missing.len()
        );
        Ok(std::mem::take(&mut self.summary))
    }

    fn destination(&self, filename: &str) -> PathBuf {
        self.repo.cwd().join(filename)
    }

    fn display_name(&self, filename: &str) -> String {
        posix_path(&self.destination(filename))
    }

    fn on_file(&mut self, template: Template) -> Result<()> {
        let is_exec = template.executable || self.execs.contains(&template.filename);
        let filename = output_name(&template.filename).to_string();
        if is_exec {
            self.exec_files_to_add.push(filename.clone());
        } else {
            self.files_to_add.push(filename.clone());
        }

        let size = match template.kind {
            TemplateKind::Symlink(target) => {
                self.symlinks.push((filename, target, is_exec));
                return Ok(());
            }
            TemplateKind::File(content) => self.copy_file(
                &filename,
                &[Chunk {
                    prefix: content,
                    var: None,
                }],
            )?,
            TemplateKind::Variable(chunks) => self.copy_file(&filename, &chunks)?,
        };

        let mode = if is_exec { EXEC_MODE } else { FILE_MODE };
        let name = self.display_name(&filename);
        self.summary
            .report
            .push(ReportedFile::new(name, mode, size, None));
        Ok(())
    }

    fn copy_file(&mut self, filename: &str, chunks: &[Chunk]) -> Result<u64> {
        let path = self.destination(filename);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating directory {}", parent.display()))?;
        }
        debug!("writing {}", path.display());

        let file = File::create(&path).with_context(|| format!("creating {}", path.display()))?;
        let mut output = BufWriter::new(file);
        let mut length = 0;
        for chunk in chunks {
            output.write_all(&chunk.prefix)?;
            length += chunk.prefix.len();
            if let Some(var) = &chunk.var {
                match self.vars.encoded(var) {
                    Some(value) => {
                        output.write_all(&value)?;
                        length += value.len();
                    }
                    None => {
                        self.summary.missing.insert(var.clone());
                    }
                }
            }
        }
        output
            .flush()
            .with_context(|| format!("writing {}", path.display()))?;
        Ok(length as u64)
    }

    fn link_file(&mut self, filename: &str, target: &str, is_exec: bool) -> Result<()> {
        let path = self.destination(filename);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        symlink(target, &path)
            .with_context(|| format!("linking {} to {target}", path.display()))?;

        let mode = if is_exec { EXEC_MODE } else { FILE_MODE };
        let name = self.display_name(filename);
        self.summary.report.push(ReportedFile::new(
            name,
            mode,
            target.len() as u64,
            Some(target.to_string()),
        ));
        Ok(())
    }
}

#[cfg(unix)]
fn symlink(target: &str, path: &Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(target, path)
}

#[cfg(windows)]
fn symlink(target: &str, path: &Path) -> std::io::Result<()> {
    let resolved = path.parent().unwrap_or(Path::new(".")).join(target);
    if resolved.is_dir() {
        std::os::windows::fs::symlink_dir(target, path)
    } else {
        std::os::windows::fs::symlink_file(target, path)
    }
}
