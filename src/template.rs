// SPDX-FileCopyrightText: © 2025 TTKB, LLC
// SPDX-License-Identifier: BSD-3-CLAUSE

//! Reading template directories.
//!
//! Every file in a template directory becomes a [Template]. Files containing
//! placeholders of the form `@NAME@` are split into [Chunk]s so the writer
//! can substitute variable values while copying.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, trace};

use crate::ignore::{self, IgnoreFile};
use crate::path::{posix_path, template_path};

/// A run of literal bytes, optionally followed by a placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub prefix: Vec<u8>,
    pub var: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateKind {
    /// Copied verbatim.
    File(Vec<u8>),
    /// A symbolic link and its target.
    Symlink(String),
    /// Text with placeholders; the last chunk never has a variable.
    Variable(Vec<Chunk>),
}

/// A single entry of a template directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    /// Path relative to the template directory, `/` separated.
    pub filename: String,
    pub kind: TemplateKind,
    /// The file has an executable bit set on disk.
    pub executable: bool,
}

/// Templates named `<name>.seed` are written as `<name>`. A template
/// directory that ships inside a Rust package names its manifest
/// `Cargo.toml.seed`, since cargo leaves out directories holding a
/// `Cargo.toml`.
pub const SEED_SUFFIX: &str = ".seed";

/// The name a template is written under.
pub fn output_name(filename: &str) -> &str {
    match filename.strip_suffix(SEED_SUFFIX) {
        Some(name) if !name.is_empty() && !name.ends_with('/') => name,
        _ => filename,
    }
}

#[cfg(unix)]
fn is_executable(metadata: &fs::Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;

    metadata.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn is_executable(_metadata: &fs::Metadata) -> bool {
    false
}

fn valid_name(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'_'
}

fn find_at(content: &[u8], from: usize) -> Option<usize> {
    content[from..]
        .iter()
        .position(|&c| c == b'@')
        .map(|i| i + from)
}

/// Splits `content` at its `@NAME@` placeholders.
///
/// A pair of `@` only forms a placeholder when the text between them is a
/// non-empty run of ASCII letters, digits and underscores. Otherwise the
/// closing `@` is treated as the opening of the next candidate, so
/// `user@example.com uses @APP_NAME@` has a single placeholder.
///
/// ```
/// use seedling::template::{parse_template, Chunk, TemplateKind};
///
/// let kind = parse_template(b"name = \"@APP_NAME@\"\n".to_vec());
/// assert_eq!(
///     TemplateKind::Variable(vec![
///         Chunk { prefix: b"name = \"".to_vec(), var: Some("APP_NAME".into()) },
///         Chunk { prefix: b"\"\n".to_vec(), var: None },
///     ]),
///     kind
/// );
/// ```
pub fn parse_template(content: Vec<u8>) -> TemplateKind {
    let mut chunks = Vec::new();
    let mut chunk_start = 0;
    let mut index = find_at(&content, 0);

    while let Some(open) = index {
        let name_start = open + 1;
        index = find_at(&content, name_start);
        let Some(close) = index else {
            break;
        };
        if close == name_start || !content[name_start..close].iter().all(|&c| valid_name(c)) {
            continue;
        }

        chunks.push(Chunk {
            prefix: content[chunk_start..open].to_vec(),
            var: Some(String::from_utf8_lossy(&content[name_start..close]).into_owned()),
        });
        chunk_start = close + 1;
        index = find_at(&content, chunk_start);
    }

    if chunks.is_empty() {
        return TemplateKind::File(content);
    }
    chunks.push(Chunk {
        prefix: content[chunk_start..].to_vec(),
        var: None,
    });
    TemplateKind::Variable(chunks)
}

/// Reads the file at `path` and splits it at its placeholders.
pub fn read_template(path: &Path) -> Result<TemplateKind> {
    let content = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    Ok(parse_template(content))
}

/// Walks `dir` and hands every template to `on_template`, in path order.
///
/// `.git` and each entry of `excludes` (paths relative to `dir`, usually
/// submodules) are skipped, as is anything matched by a `.gitignore` found
/// along the way. The `.gitignore` files themselves are copied verbatim.
/// Symbolic links are never followed.
pub fn read_templates<F>(dir: &Path, excludes: &[String], mut on_template: F) -> Result<()>
where
    F: FnMut(Template) -> Result<()>,
{
    let mut root = IgnoreFile::new("");
    root.excludes.push(ignore::compile(".git/")?);
    for exclude in excludes {
        let rule = format!("/{}", exclude.trim_start_matches('/'));
        root.excludes.push(ignore::compile(&rule)?);
    }

    let mut ignores = vec![root];
    walk(dir, dir, &mut ignores, &mut on_template)
}

/// Collects the templates of `dir` into a list.
pub fn collect_templates(dir: &Path, excludes: &[String]) -> Result<Vec<Template>> {
    let mut templates = Vec::new();
    read_templates(dir, excludes, |template| {
        templates.push(template);
        Ok(())
    })?;
    Ok(templates)
}

fn walk<F>(root: &Path, dir: &Path, ignores: &mut Vec<IgnoreFile>, on_template: &mut F) -> Result<()>
where
    F: FnMut(Template) -> Result<()>,
{
    let mut entries = fs::read_dir(dir)
        .with_context(|| format!("reading directory {}", dir.display()))?
        .collect::<std::io::Result<Vec<_>>>()?;
    entries.sort_by_key(|entry| entry.file_name());

    // rules of a .gitignore apply to its siblings too
    let depth = ignores.len();
    if let Some(entry) = entries.iter().find(|entry| entry.file_name() == ".gitignore") {
        let path = entry.path();
        let filename = template_path(root, &path).unwrap_or_else(|| posix_path(&path));
        if !ignore::is_excluded(&filename, ignores) {
            let (rules, content) = ignore::read_ignore(&path, root)?;
            debug!(
                "{filename}: {} exclude(s), {} include(s)",
                rules.excludes.len(),
                rules.includes.len()
            );
            if !rules.is_empty() {
                ignores.push(rules);
            }
            on_template(Template {
                filename,
                kind: TemplateKind::File(content),
                executable: false,
            })?;
        }
    }

    for entry in entries {
        let path = entry.path();
        let Some(filename) = template_path(root, &path) else {
            continue;
        };
        if entry.file_name() == ".gitignore" {
            continue;
        }
        if ignore::is_excluded(&filename, ignores) {
            trace!("skipping {filename}");
            continue;
        }

        let file_type = entry
            .file_type()
            .with_context(|| format!("reading {}", path.display()))?;
        if file_type.is_symlink() {
            let target = fs::read_link(&path)
                .with_context(|| format!("reading link {}", path.display()))?;
            on_template(Template {
                filename,
                kind: TemplateKind::Symlink(posix_path(&target)),
                executable: false,
            })?;
        } else if file_type.is_dir() {
            walk(root, &path, ignores, on_template)?;
        } else {
            let metadata = entry
                .metadata()
                .with_context(|| format!("reading {}", path.display()))?;
            on_template(Template {
                filename,
                kind: read_template(&path)?,
                executable: is_executable(&metadata),
            })?;
        }
    }

    ignores.truncate(depth);
    Ok(())
}
