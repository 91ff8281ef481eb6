// SPDX-FileCopyrightText: © 2025 TTKB, LLC
// SPDX-License-Identifier: BSD-3-CLAUSE

//! Creating a project: preparing the destination repository and copying a
//! template directory into it.

use std::collections::HashSet;
use std::fs;
use std::path::{absolute, Path, PathBuf};

use anyhow::{bail, Context, Result};
use colored::Colorize;
use tracing::{debug, warn};

use crate::git::{Git, GitOptions};
use crate::report::LsColors;
use crate::variables::quote_string;
use crate::writer::{Summary, TemplateWriter};

/// Template location under an installation prefix.
const INSTALLED_TEMPLATE: &str = "share/seedling/template";
/// The bundled template of the source tree this binary was built from.
const SOURCE_TEMPLATE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/template");

/// Variable values in the order they are shown; `None` is unset.
pub type Vars = Vec<(String, Option<String>)>;

/// `my-tool` becomes `MY_TOOL`.
pub fn default_prefix(name: &str) -> String {
    name.to_uppercase().replace('-', "_")
}

/// Parses a `KEY=VALUE` definition. Keys are limited to the characters
/// allowed in placeholders.
pub fn parse_define(definition: &str) -> Result<(String, String)> {
    let Some((key, value)) = definition.split_once('=') else {
        bail!("expected KEY=VALUE, got {definition:?}");
    };
    if key.is_empty() || !key.bytes().all(|c| c.is_ascii_alphanumeric() || c == b'_') {
        bail!("invalid variable name {key:?}");
    }
    Ok((key.to_string(), value.to_string()))
}

/// Default template directories, most preferred first. An executable
/// installed as `<prefix>/bin/seedling` looks in
/// `<prefix>/share/seedling/template` before the source tree.
pub fn template_candidates(exe: Option<&Path>) -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    if let Some(prefix) = exe.and_then(Path::parent).and_then(Path::parent) {
        candidates.push(prefix.join(INSTALLED_TEMPLATE));
    }
    candidates.push(PathBuf::from(SOURCE_TEMPLATE));
    candidates
}

/// The first of `candidates` that is a directory.
pub fn find_template(candidates: &[PathBuf]) -> Result<PathBuf> {
    if let Some(dir) = candidates.iter().find(|dir| dir.is_dir()) {
        return Ok(dir.clone());
    }
    let tried: Vec<String> = candidates
        .iter()
        .map(|dir| dir.display().to_string())
        .collect();
    bail!("no template directory found (tried {})", tried.join(", "))
}

/// Locates the template used when none is given.
pub fn default_template() -> Result<PathBuf> {
    let exe = std::env::current_exe().ok();
    let template = find_template(&template_candidates(exe.as_deref()))?;
    debug!("default template {}", template.display());
    Ok(template)
}

/// Fails if one of the directories contains the other.
pub fn check_overlap(template: &Path, output: &Path) -> Result<()> {
    let template = absolute(template)?;
    let output = absolute(output)?;
    if output.starts_with(&template) || template.starts_with(&output) {
        bail!(
            "output directory {} overlaps the template directory {}",
            output.display(),
            template.display()
        );
    }
    Ok(())
}

/// Makes sure `dir` exists and is empty. An existing non-empty `dir` is
/// only removed when `force` is set.
pub fn prepare_destination(dir: &Path, force: bool) -> Result<()> {
    match fs::symlink_metadata(dir) {
        Ok(metadata) if metadata.is_dir() => {
            let empty = fs::read_dir(dir)?.next().is_none();
            if !empty {
                if !force {
                    bail!(
                        "{} already exists and is not empty (use --force to replace it)",
                        dir.display()
                    );
                }
                warn!("removing {}", dir.display());
                fs::remove_dir_all(dir)
                    .with_context(|| format!("removing {}", dir.display()))?;
            }
        }
        Ok(_) => {
            if !force {
                bail!("{} already exists and is not a directory", dir.display());
            }
            fs::remove_file(dir).with_context(|| format!("removing {}", dir.display()))?;
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(e).with_context(|| format!("reading {}", dir.display())),
    }
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))
}

/// Prepares `dir` and initializes a git repository in it.
pub fn open_destination(dir: &Path, force: bool) -> Result<Git> {
    prepare_destination(dir, force)?;
    Git::open(
        dir,
        GitOptions {
            init: true,
            ls_files: false,
        },
    )
}

/// Copies the template directory `input` into `repo`. Executable bits
/// recorded in the template's repository are kept and its submodules are
/// left out.
pub fn copy_templates(
    repo: &Git,
    input: &Path,
    vars: Vars,
    colors: Option<LsColors>,
) -> Result<Summary> {
    let source = Git::open(
        input,
        GitOptions {
            init: false,
            ls_files: true,
        },
    )?;
    let execs: HashSet<String> = source.executable_files().into_iter().collect();
    let excluded = source.submodules();
    debug!(
        "{} executable(s), {} submodule(s) in {}",
        execs.len(),
        excluded.len(),
        input.display()
    );

    TemplateWriter::new(repo, execs, vars)
        .with_colors(colors)
        .copy_templates(input, &excluded)
}

/// Lists the variables that have a value, one ` @KEY@: value` per line.
pub fn format_vars(vars: &Vars) -> String {
    vars.iter()
        .filter_map(|(key, value)| {
            let value = quote_string(value.as_ref()?);
            Some(format!(" {}: {}", format!("@{key}@").yellow(), value.green()))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// The warning printed for placeholders without a value.
pub fn missing_warning<'a>(missing: impl IntoIterator<Item = &'a String>) -> Option<String> {
    let lines: Vec<String> = missing.into_iter().map(|name| format!("  - {name}")).collect();
    if lines.is_empty() {
        return None;
    }
    Some(format!(
        "Some used variables were not set:\n{}",
        lines.join("\n")
    ))
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    #[test]
    fn test_default_prefix() {
        assert_eq!("UNKNOWN_PROJECT", default_prefix("unknown-project"));
        assert_eq!("HELLO", default_prefix("hello"));
        assert_eq!("MY_NEW_TOOL", default_prefix("my-new-tool"));
    }

    #[test]
    fn test_parse_define() {
        assert_eq!(
            ("LICENSE".to_string(), "MIT".to_string()),
            parse_define("LICENSE=MIT").unwrap()
        );
        assert_eq!(
            ("EQ".to_string(), "a=b".to_string()),
            parse_define("EQ=a=b").unwrap()
        );
        assert_eq!(("EMPTY".to_string(), String::new()), parse_define("EMPTY=").unwrap());
        assert!(parse_define("NOVALUE").is_err());
        assert!(parse_define("=value").is_err());
        assert!(parse_define("BAD-KEY=value").is_err());
    }

    #[test]
    fn test_format_vars() {
        let vars: Vars = vec![
            ("APP_NAME".into(), Some("hello".into())),
            ("APP_DESCRIPTION".into(), None),
            ("APP_AUTHOR".into(), Some("A \"B\" C".into())),
        ];

        // the override is process wide, so both modes are checked here
        colored::control::set_override(true);
        let text = format_vars(&vars);
        assert!(text.contains("\x1b[33m@APP_NAME@\x1b[0m"));
        assert!(text.contains("\x1b[32mhello\x1b[0m"));

        colored::control::set_override(false);
        assert_eq!(
            " @APP_NAME@: hello\n @APP_AUTHOR@: A \\\"B\\\" C",
            format_vars(&vars)
        );
        assert_eq!("", format_vars(&vec![]));
        colored::control::unset_override();
    }

    #[test]
    fn test_missing_warning() {
        let none: BTreeSet<String> = BTreeSet::new();
        assert_eq!(None, missing_warning(&none));

        let missing: BTreeSet<String> = ["B".to_string(), "A".to_string()].into();
        assert_eq!(
            Some("Some used variables were not set:\n  - A\n  - B".to_string()),
            missing_warning(&missing)
        );
    }

    #[test]
    fn test_prepare_destination() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("new").join("project");
        prepare_destination(&out, false).unwrap();
        assert!(out.is_dir());

        // empty directories are reused
        prepare_destination(&out, false).unwrap();

        fs::write(out.join("keep.txt"), "data").unwrap();
        let error = prepare_destination(&out, false).unwrap_err();
        assert!(error.to_string().contains("--force"));
        assert!(out.join("keep.txt").exists());

        prepare_destination(&out, true).unwrap();
        assert!(out.is_dir());
        assert!(!out.join("keep.txt").exists());

        let file = dir.path().join("file");
        fs::write(&file, "data").unwrap();
        assert!(prepare_destination(&file, false).is_err());
        prepare_destination(&file, true).unwrap();
        assert!(file.is_dir());
    }

    #[test]
    fn test_template_candidates() {
        let dir = tempfile::tempdir().unwrap();
        let exe = dir.path().join("bin").join("seedling");
        let installed = dir.path().join("share/seedling/template");

        let candidates = template_candidates(Some(&exe));
        assert_eq!(vec![installed.clone(), PathBuf::from(SOURCE_TEMPLATE)], candidates);
        assert_eq!(
            vec![PathBuf::from(SOURCE_TEMPLATE)],
            template_candidates(None)
        );

        // nothing installed yet, the source tree wins
        assert_eq!(
            PathBuf::from(SOURCE_TEMPLATE),
            find_template(&candidates).unwrap()
        );

        fs::create_dir_all(&installed).unwrap();
        assert_eq!(installed, find_template(&candidates).unwrap());

        let error = find_template(&[dir.path().join("missing")]).unwrap_err();
        assert!(error.to_string().contains("missing"));
    }

    #[test]
    fn test_check_overlap() {
        let dir = tempfile::tempdir().unwrap();
        let template = dir.path().join("template");
        assert!(check_overlap(&template, &template.join("out")).is_err());
        assert!(check_overlap(&template, dir.path()).is_err());
        assert!(check_overlap(&template, &dir.path().join("out")).is_ok());
    }
}
