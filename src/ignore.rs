// SPDX-FileCopyrightText: © 2025 TTKB, LLC
// SPDX-License-Identifier: BSD-3-CLAUSE

//! `.gitignore` rules for template directories.
//!
//! Only the subset of gitignore syntax that templates need is supported:
//!
//! ```text
//! build/              # a file or directory named `build`, at any depth
//! *.pyc               # any file whose name ends in `.pyc`
//! /external/json      # `external/json` next to the .gitignore only
//! docs/**/*.html      # patterns containing `/` match from the .gitignore's directory
//! !build/version.h    # re-include something excluded earlier
//! ```
//!
//! A path is matched along with each of its parent directories, so a
//! pattern that names a directory excludes everything beneath it.

use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use regex::Regex;
use winnow::combinator::{alt, delimited, opt, preceded, repeat};
use winnow::token::{any, one_of, take_while};
use winnow::ModalResult;
use winnow::Parser;

use crate::path::{basename, parent, template_path};

/// What part of a path a rule is compared with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    /// The last path component (`*.o`, `build/`).
    Basename,
    /// The whole path relative to the ignore file (`dir/subdir`).
    Relative,
    /// Like [Anchor::Relative], written with a leading `/`.
    Root,
}

#[derive(Debug, Clone)]
pub struct IgnoreRule {
    pattern: Regex,
    anchor: Anchor,
}

impl IgnoreRule {
    pub fn anchor(&self) -> Anchor {
        self.anchor
    }
}

/// The rules of one `.gitignore`.
#[derive(Debug, Clone, Default)]
pub struct IgnoreFile {
    /// Directory of the ignore file relative to the template root,
    /// with a trailing `/`. Empty for the root.
    pub prefix: String,
    pub excludes: Vec<IgnoreRule>,
    /// Rules written with a leading `!`.
    pub includes: Vec<IgnoreRule>,
}

impl IgnoreFile {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.excludes.is_empty() && self.includes.is_empty()
    }

    fn relative<'a>(&self, filename: &'a str) -> Option<&'a str> {
        if self.prefix.is_empty() {
            return Some(filename);
        }
        let rest = filename.strip_prefix(self.prefix.as_str())?;
        if self.prefix.ends_with('/') || rest.is_empty() {
            Some(rest)
        } else {
            rest.strip_prefix('/')
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Literal(char),
    /// `?`
    AnyChar,
    /// `*`
    AnyRun,
    /// `**`
    AnyPath,
    /// `[abc]`, `[!a-z]`
    Class { negated: bool, set: String },
}

fn parse_class(input: &mut &str) -> ModalResult<Token> {
    delimited(
        '[',
        (opt(one_of(['!', '^'])), take_while(1.., |c| c != ']')),
        ']',
    )
    .map(|(negated, set): (Option<char>, &str)| Token::Class {
        negated: negated.is_some(),
        set: set.to_string(),
    })
    .parse_next(input)
}

fn parse_token(input: &mut &str) -> ModalResult<Token> {
    alt((
        "**".value(Token::AnyPath),
        '*'.value(Token::AnyRun),
        '?'.value(Token::AnyChar),
        parse_class,
        preceded('\\', any).map(Token::Literal),
        any.map(Token::Literal),
    ))
    .parse_next(input)
}

fn parse_glob(input: &mut &str) -> ModalResult<Vec<Token>> {
    repeat(0.., parse_token).parse_next(input)
}

fn to_regex(tokens: &[Token]) -> String {
    let mut re = String::from("^");
    let mut i = 0;
    while i < tokens.len() {
        match &tokens[i] {
            Token::AnyPath => {
                // `**/` also matches no directory at all
                if matches!(tokens.get(i + 1), Some(Token::Literal('/'))) {
                    re.push_str("(?:.*/)?");
                    i += 1;
                } else {
                    re.push_str(".*");
                }
            }
            Token::AnyRun => re.push_str("[^/]*"),
            Token::AnyChar => re.push_str("[^/]"),
            Token::Class { negated, set } => {
                re.push('[');
                if *negated {
                    re.push_str("^/");
                }
                for c in set.chars() {
                    if matches!(c, '\\' | '[' | ']' | '^' | '&' | '~') {
                        re.push('\\');
                    }
                    re.push(c);
                }
                re.push(']');
            }
            Token::Literal(c) => re.push_str(&regex::escape(c.encode_utf8(&mut [0; 4]))),
        }
        i += 1;
    }
    re.push_str("/*$");
    re
}

/// Compiles a single gitignore line (without a leading `!`).
pub fn compile(line: &str) -> Result<IgnoreRule> {
    let relative = line
        .char_indices()
        .any(|(i, c)| c == '/' && i + 1 < line.len());
    let anchor = match (relative, line.starts_with('/')) {
        (false, _) => Anchor::Basename,
        (true, false) => Anchor::Relative,
        (true, true) => Anchor::Root,
    };

    let mut body = line.strip_suffix('/').unwrap_or(line);
    if anchor == Anchor::Root {
        body = &body[1..];
    }

    let mut input = body;
    let tokens = parse_glob(&mut input).map_err(|e| anyhow!("invalid pattern {line:?}: {e:?}"))?;
    let pattern = Regex::new(&to_regex(&tokens))
        .with_context(|| format!("invalid pattern {line:?}"))?;

    Ok(IgnoreRule {
        pattern,
        anchor,
    })
}

/// Whether `filename`, or any of its parent directories, matches `rule`.
pub fn matches(filename: &str, rule: &IgnoreRule) -> bool {
    let mut candidate = filename;
    loop {
        let subject = match rule.anchor {
            Anchor::Basename => basename(candidate),
            Anchor::Relative | Anchor::Root => candidate,
        };
        if rule.pattern.is_match(subject) {
            return true;
        }
        let up = parent(candidate);
        if up.is_empty() || up == candidate {
            return false;
        }
        candidate = up;
    }
}

/// Applies `files` in order. An ignore file only has a say over paths
/// under its own directory, and a path excluded by one file may be
/// re-included by the `!` rules of the same or a later file.
pub fn is_excluded(filename: &str, files: &[IgnoreFile]) -> bool {
    let mut excluded = false;
    for file in files {
        let Some(relative) = file.relative(filename) else {
            continue;
        };
        if !excluded {
            excluded = file.excludes.iter().any(|rule| matches(relative, rule));
        }
        if !excluded {
            continue;
        }
        excluded = !file.includes.iter().any(|rule| matches(relative, rule));
    }
    excluded
}

/// Parses the contents of an ignore file.
pub fn parse_ignore(prefix: impl Into<String>, content: &str) -> Result<IgnoreFile> {
    let mut file = IgnoreFile::new(prefix);
    for raw in content.lines() {
        let line = raw.split('#').next().unwrap_or_default().trim();
        if line.is_empty() {
            continue;
        }
        match line.strip_prefix('!') {
            Some(include) => file.includes.push(compile(include)?),
            None => file.excludes.push(compile(line)?),
        }
    }
    Ok(file)
}

/// Reads the ignore file at `path`. Its rules are scoped to its directory
/// relative to `root`. The raw contents are returned as well so the file
/// itself can be copied.
pub fn read_ignore(path: &Path, root: &Path) -> Result<(IgnoreFile, Vec<u8>)> {
    let data = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let dir = path.parent().unwrap_or(root);
    let prefix = match template_path(root, dir) {
        Some(relative) if !relative.is_empty() => format!("{relative}/"),
        _ => String::new(),
    };
    let file = parse_ignore(prefix, &String::from_utf8_lossy(&data))
        .with_context(|| format!("parsing {}", path.display()))?;
    Ok((file, data))
}
