// SPDX-FileCopyrightText: © 2025 TTKB, LLC
// SPDX-License-Identifier: BSD-3-CLAUSE

#![allow(dead_code)]

use std::fs;
use std::path::Path;
use std::process::Command;

/// Whether a usable `git` is on the path. Tests that need one return early
/// without it.
pub fn git_available() -> bool {
    let available = Command::new("git")
        .arg("--version")
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false);
    if !available {
        eprintln!("git not found, skipping");
    }
    available
}

pub fn write(root: &Path, name: &str, content: &str) {
    let path = root.join(name);
    fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
    fs::write(path, content).expect("write");
}

/// A small template exercising placeholders, ignore files and symlinks.
pub fn sample_template(root: &Path) {
    write(
        root,
        "Cargo.toml",
        "[package]\nname = \"@APP_NAME@\"\ndescription = @QUOTED_APP_DESCRIPTION@\n",
    );
    write(
        root,
        "src/main.rs",
        "// Copyright (c) @YEAR@ @APP_AUTHOR@\nfn main() {}\n",
    );
    write(root, "README.md", "# @APP_NAME@\n\nuses @UNDEFINED_THING@\n");
    write(root, "docs/notes.txt", "contact: someone@example.com\n");
    write(root, ".gitignore", "/target\n*.log\n!keep.log\n");
    write(root, "target/debug/hello", "binary");
    write(root, "logs/debug.log", "noise");
    write(root, "logs/keep.log", "@APP_PREFIX@\n");
    write(root, "build/.gitignore", "*\n");
    write(root, "build/out.o", "object");
    write(root, "scripts/run.sh", "#!/bin/sh\necho @APP_NAME@\n");

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        let script = root.join("scripts/run.sh");
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).expect("chmod");
        std::os::unix::fs::symlink("scripts/run.sh", root.join("run")).expect("symlink");
    }
}
