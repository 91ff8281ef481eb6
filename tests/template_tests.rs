// SPDX-FileCopyrightText: © 2025 TTKB, LLC
// SPDX-License-Identifier: BSD-3-CLAUSE

mod common;

use std::path::Path;

use seedling::template::{collect_templates, Template, TemplateKind};

fn names(templates: &[Template]) -> Vec<&str> {
    templates.iter().map(|t| t.filename.as_str()).collect()
}

fn find<'a>(templates: &'a [Template], name: &str) -> &'a Template {
    templates
        .iter()
        .find(|t| t.filename == name)
        .unwrap_or_else(|| panic!("{name} not found in {:?}", names(templates)))
}

#[test]
fn test_read_sample_template() {
    let dir = tempfile::tempdir().unwrap();
    common::sample_template(dir.path());

    let templates = collect_templates(dir.path(), &[]).unwrap();
    let names = names(&templates);

    assert!(names.contains(&".gitignore"));
    assert!(names.contains(&"Cargo.toml"));
    assert!(names.contains(&"src/main.rs"));
    assert!(names.contains(&"logs/keep.log"));
    assert!(names.contains(&"build/.gitignore"));
    assert!(!names.contains(&"target/debug/hello"));
    assert!(!names.contains(&"logs/debug.log"));
    assert!(!names.contains(&"build/out.o"));

    // sorted, the .gitignore of a directory first
    assert_eq!(".gitignore", names[0]);

    assert!(matches!(
        find(&templates, ".gitignore").kind,
        TemplateKind::File(_)
    ));
    assert!(matches!(
        find(&templates, "docs/notes.txt").kind,
        TemplateKind::File(_)
    ));
    let TemplateKind::Variable(chunks) = &find(&templates, "src/main.rs").kind else {
        panic!("src/main.rs should have placeholders");
    };
    let vars: Vec<_> = chunks.iter().filter_map(|c| c.var.as_deref()).collect();
    assert_eq!(vec!["YEAR", "APP_AUTHOR"], vars);
}

#[cfg(unix)]
#[test]
fn test_read_symlinks_and_executables() {
    let dir = tempfile::tempdir().unwrap();
    common::sample_template(dir.path());

    let templates = collect_templates(dir.path(), &[]).unwrap();
    assert_eq!(
        TemplateKind::Symlink("scripts/run.sh".to_string()),
        find(&templates, "run").kind
    );
    assert!(find(&templates, "scripts/run.sh").executable);
    assert!(!find(&templates, "Cargo.toml").executable);
}

#[test]
fn test_excludes_and_git_dir() {
    let dir = tempfile::tempdir().unwrap();
    common::write(dir.path(), "external/json/json.hpp", "//");
    common::write(dir.path(), "external/CMakeLists.txt", "add_subdirectory(json)");
    common::write(dir.path(), "side/external/json/a.txt", "a");
    common::write(dir.path(), ".git/config", "[core]");
    common::write(dir.path(), ".gits/config", "kept");

    let templates = collect_templates(dir.path(), &["external/json".to_string()]).unwrap();
    assert_eq!(
        vec![
            ".gits/config",
            "external/CMakeLists.txt",
            "side/external/json/a.txt"
        ],
        names(&templates)
    );
}

#[test]
fn test_nested_ignore_scope() {
    let dir = tempfile::tempdir().unwrap();
    common::write(dir.path(), "tools/.gitignore", "*.pyc\n");
    common::write(dir.path(), "tools/gen.py", "print()");
    common::write(dir.path(), "tools/gen.pyc", "");
    common::write(dir.path(), "app/gen.pyc", "");

    let templates = collect_templates(dir.path(), &[]).unwrap();
    assert_eq!(
        vec!["app/gen.pyc", "tools/.gitignore", "tools/gen.py"],
        names(&templates)
    );
}

#[test]
fn test_missing_directory() {
    let result = collect_templates(Path::new("does/not/exist"), &[]);
    assert!(result.is_err());
}

#[test]
fn test_bundled_template() {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("template");
    let templates = collect_templates(&dir, &[]).unwrap();

    let TemplateKind::Variable(chunks) = &find(&templates, "src/main.rs").kind else {
        panic!("src/main.rs should have placeholders");
    };
    let vars: Vec<_> = chunks.iter().filter_map(|c| c.var.as_deref()).collect();
    assert_eq!(vec!["YEAR", "APP_AUTHOR"], vars);

    let TemplateKind::Variable(chunks) = &find(&templates, "Cargo.toml.seed").kind else {
        panic!("Cargo.toml.seed should have placeholders");
    };
    assert!(chunks
        .iter()
        .any(|c| c.var.as_deref() == Some("APP_NAME")));
}
