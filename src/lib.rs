// SPDX-FileCopyrightText: © 2025 TTKB, LLC
// SPDX-License-Identifier: BSD-3-CLAUSE

//! Project Templates
//!
//! This crate creates new projects by copying a template directory into a
//! fresh git repository, filling in placeholders along the way.
//!
//! # Overview
//!
//! A template is an ordinary directory tree. Any file may contain
//! placeholders written as `@NAME@`:
//!
//! ```text
//! // Copyright (c) @YEAR@ @APP_AUTHOR@
//! [package]
//! name = "@APP_NAME@"
//! description = "@QUOTABLE_APP_DESCRIPTION@"
//! ```
//!
//! When a project is created:
//!
//! - every file is copied, with placeholders replaced by variable values
//!   (see [variables]);
//! - `.gitignore` files in the template are honored and copied, `.git` and
//!   submodules are skipped (see [ignore]);
//! - symbolic links are recreated and executable files stay executable;
//! - the new files are staged in a newly initialized repository
//!   (see [git]);
//! - an `ls -l` style listing of the new files is printed (see [report]).
//!
//! # Quick Start
//!
//! ```no_run
//! use std::path::Path;
//! use seedling::project;
//! use anyhow::Result;
//!
//! fn main() -> Result<()> {
//!     let repo = project::open_destination(Path::new("my-tool"), false)?;
//!     let vars = vec![
//!         ("APP_NAME".to_string(), Some("my-tool".to_string())),
//!         ("APP_AUTHOR".to_string(), repo.user_name()?),
//!     ];
//!     let summary = project::copy_templates(&repo, Path::new("template"), vars, None)?;
//!     for name in &summary.missing {
//!         eprintln!("unset: {name}");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Variables
//!
//! | Variable           | Source                                   |
//! |--------------------|------------------------------------------|
//! | `YEAR`             | the current year                         |
//! | `APP_NAME`         | `--name`                                 |
//! | `APP_PREFIX`       | `--prefix`, or the name in upper case    |
//! | `APP_DESCRIPTION`  | `--description`                          |
//! | `APP_AUTHOR`       | `--author`, or `git config user.name`    |
//! | `APP_AUTHOR_EMAIL` | `--email`, or `git config user.email`    |
//!
//! Placeholders without a value are replaced with nothing and reported.

pub mod git;
pub mod ignore;
pub mod logging;
pub mod path;
pub mod project;
pub mod report;
pub mod template;
pub mod variables;
pub mod writer;
