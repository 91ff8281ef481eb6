// SPDX-FileCopyrightText: © 2025 TTKB, LLC
// SPDX-License-Identifier: BSD-3-CLAUSE

//! An `ls -l` style listing of generated files.

use std::collections::HashMap;
use std::fmt::{self, Display, Formatter};

use crate::path::{basename, normalize, parent};

/// Used when `LS_COLORS` is unset.
pub const FALLBACK_LS_COLORS: &str = "rs=0:ln=01;36:ex=01;32";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportedFile {
    pub filename: String,
    pub permissions: u32,
    pub size: u64,
    pub size_label: String,
    /// Target of a symbolic link.
    pub link: Option<String>,
}

impl ReportedFile {
    pub fn new(filename: String, permissions: u32, size: u64, link: Option<String>) -> Self {
        Self {
            filename,
            permissions,
            size,
            size_label: size_label(size),
            link,
        }
    }

    pub fn is_executable(&self) -> bool {
        self.permissions & 0o111 != 0
    }
}

/// A human readable size with at most one decimal, e.g. `512`, `1.5K`.
pub fn size_label(size: u64) -> String {
    let mut suffix = "";
    let mut tenths = size.saturating_mul(10);
    for next in ["K", "M", "G"] {
        if tenths <= 10240 {
            break;
        }
        suffix = next;
        tenths /= 1024;
    }
    let (whole, rem) = (tenths / 10, tenths % 10);
    if rem == 0 {
        format!("{whole}{suffix}")
    } else {
        format!("{whole}.{rem}{suffix}")
    }
}

fn triplet(bits: u32) -> [char; 3] {
    [
        if bits & 4 != 0 { 'r' } else { '-' },
        if bits & 2 != 0 { 'w' } else { '-' },
        if bits & 1 != 0 { 'x' } else { '-' },
    ]
}

/// `0o754` becomes `rwxr-xr--`.
pub fn permissions_string(mode: u32) -> String {
    [6, 3, 0]
        .iter()
        .flat_map(|shift| triplet((mode >> shift) & 7))
        .collect()
}

/// Colors parsed from an `LS_COLORS` style specification.
#[derive(Debug, Clone, Default)]
pub struct LsColors {
    categories: HashMap<String, String>,
    extensions: HashMap<String, String>,
}

impl LsColors {
    pub fn parse(spec: &str) -> Self {
        let mut colors = Self::default();
        for entry in spec.split(':').filter(|entry| !entry.is_empty()) {
            let Some((name, code)) = entry.split_once('=') else {
                continue;
            };
            match name.strip_prefix('*') {
                Some(ext) => colors.extensions.insert(ext.to_string(), code.to_string()),
                None => colors.categories.insert(name.to_string(), code.to_string()),
            };
        }
        colors
    }

    /// Reads `LS_COLORS`, falling back to [FALLBACK_LS_COLORS].
    pub fn from_env() -> Self {
        match std::env::var("LS_COLORS") {
            Ok(spec) if !spec.is_empty() => Self::parse(&spec),
            _ => Self::parse(FALLBACK_LS_COLORS),
        }
    }

    fn category(&self, name: &str) -> Option<&str> {
        self.categories.get(name).map(String::as_str)
    }

    /// The escape code to use for a file.
    pub fn color_for(&self, filename: &str, is_link: bool, is_exec: bool) -> Option<&str> {
        if is_link {
            if let Some(code) = self.category("ln") {
                return Some(code);
            }
        }
        if is_exec {
            if let Some(code) = self.category("ex") {
                return Some(code);
            }
        }
        let name = basename(filename);
        if let Some(code) = name
            .rfind('.')
            .filter(|&dot| dot > 0)
            .and_then(|dot| self.extensions.get(&name[dot..]))
        {
            return Some(code);
        }
        self.category("fi")
    }
}

/// The files written while generating a project.
#[derive(Debug, Clone, Default)]
pub struct Report {
    files: Vec<ReportedFile>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, file: ReportedFile) {
        self.files.push(file);
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Wraps the report for display. Without `colors` no escape codes are
    /// written.
    pub fn render<'a>(&'a self, colors: Option<&'a LsColors>) -> Rendered<'a> {
        Rendered {
            report: self,
            colors,
        }
    }
}

pub struct Rendered<'a> {
    report: &'a Report,
    colors: Option<&'a LsColors>,
}

impl Rendered<'_> {
    fn paint(&self, f: &mut Formatter<'_>, text: &str, code: Option<&str>) -> fmt::Result {
        match self.colors {
            Some(_) => write!(f, "\x1b[{}m{text}\x1b[m", code.unwrap_or_default()),
            None => f.write_str(text),
        }
    }
}

impl Display for Rendered<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut files: Vec<&ReportedFile> = self.report.files.iter().collect();
        files.sort_by(|a, b| a.filename.cmp(&b.filename));

        let codes: HashMap<&str, Option<&str>> = match self.colors {
            Some(colors) => files
                .iter()
                .map(|file| {
                    let code = colors.color_for(
                        &file.filename,
                        file.link.is_some(),
                        file.is_executable(),
                    );
                    (file.filename.as_str(), code)
                })
                .collect(),
            None => HashMap::new(),
        };

        let width = files
            .iter()
            .map(|file| file.size_label.len())
            .max()
            .unwrap_or(0);

        for file in files {
            let kind = if file.link.is_some() { 'l' } else { '-' };
            write!(
                f,
                "{kind}{} {:>width$} ",
                permissions_string(file.permissions),
                file.size_label
            )?;
            let code = codes.get(file.filename.as_str()).copied().flatten();
            self.paint(f, &file.filename, code)?;
            if let Some(link) = &file.link {
                let dir = parent(&file.filename);
                let target = if dir.is_empty() || link.starts_with('/') {
                    normalize(link)
                } else {
                    normalize(&format!("{dir}/{link}"))
                };
                let code = codes.get(target.as_str()).copied().flatten();
                f.write_str(" -> ")?;
                self.paint(f, link, code)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_label() {
        assert_eq!("0", size_label(0));
        assert_eq!("512", size_label(512));
        assert_eq!("1024", size_label(1024));
        assert_eq!("1K", size_label(1025));
        assert_eq!("1.4K", size_label(1500));
        assert_eq!("10K", size_label(10 * 1024));
        assert_eq!("2M", size_label(2 * 1024 * 1024));
        assert_eq!("3.5G", size_label(3 * 1024 * 1024 * 1024 + 512 * 1024 * 1024));
    }

    #[test]
    fn test_permissions_string() {
        assert_eq!("rw-r--r--", permissions_string(0o644));
        assert_eq!("rwxr-xr-x", permissions_string(0o755));
        assert_eq!("rwxr-xr--", permissions_string(0o754));
    }

    #[test]
    fn test_ls_colors() {
        let colors = LsColors::parse("rs=0:fi=00:ln=01;36:ex=01;32:*.rs=00;33::bogus");
        assert_eq!(Some("01;36"), colors.color_for("a/link.rs", true, true));
        assert_eq!(Some("01;32"), colors.color_for("a/run.sh", false, true));
        assert_eq!(Some("00;33"), colors.color_for("src/main.rs", false, false));
        assert_eq!(Some("00"), colors.color_for("README", false, false));
        assert_eq!(Some("00"), colors.color_for(".rs", false, false));

        let colors = LsColors::parse(FALLBACK_LS_COLORS);
        assert_eq!(None, colors.color_for("README.md", false, false));
    }

    #[test]
    fn test_render_plain() {
        let mut report = Report::new();
        report.push(ReportedFile::new("out/src/main.rs".into(), 0o644, 1500, None));
        report.push(ReportedFile::new("out/run.sh".into(), 0o755, 20, None));
        report.push(ReportedFile::new(
            "out/latest".into(),
            0o644,
            6,
            Some("run.sh".into()),
        ));

        let text = report.render(None).to_string();
        assert_eq!(
            "\
            lrw-r--r--    6 out/latest -> run.sh\n\
            -rwxr-xr-x   20 out/run.sh\n\
            -rw-r--r-- 1.4K out/src/main.rs\n",
            text
        );
    }

    #[test]
    fn test_render_colored() {
        let mut report = Report::new();
        report.push(ReportedFile::new("out/run.sh".into(), 0o755, 20, None));
        report.push(ReportedFile::new(
            "out/latest".into(),
            0o644,
            6,
            Some("run.sh".into()),
        ));

        let colors = LsColors::parse(FALLBACK_LS_COLORS);
        let text = report.render(Some(&colors)).to_string();
        assert!(text.contains("\x1b[01;36mout/latest\x1b[m -> \x1b[01;32mrun.sh\x1b[m"));
        assert!(text.contains("-rwxr-xr-x 20 \x1b[01;32mout/run.sh\x1b[m"));
    }

    #[test]
    fn test_render_colored_link_outside_dir() {
        let mut report = Report::new();
        report.push(ReportedFile::new("out/bin/run".into(), 0o755, 20, None));
        report.push(ReportedFile::new(
            "out/scripts/run".into(),
            0o644,
            10,
            Some("../bin/run".into()),
        ));
        report.push(ReportedFile::new(
            "out/here".into(),
            0o644,
            8,
            Some("./bin/run".into()),
        ));

        let colors = LsColors::parse(FALLBACK_LS_COLORS);
        let text = report.render(Some(&colors)).to_string();
        assert!(text.contains("out/scripts/run\x1b[m -> \x1b[01;32m../bin/run\x1b[m"));
        assert!(text.contains("out/here\x1b[m -> \x1b[01;32m./bin/run\x1b[m"));
    }
}
