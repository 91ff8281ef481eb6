// SPDX-FileCopyrightText: © 2025 TTKB, LLC
// SPDX-License-Identifier: BSD-3-CLAUSE

//! Values for template placeholders.
//!
//! Besides plain `KEY = value` pairs a few prefixed placeholders are
//! resolved on the fly:
//!
//! | placeholder        | value                                         |
//! |--------------------|-----------------------------------------------|
//! | `@QUOTABLE_NAME@`  | `NAME`, escaped for a double quoted string    |
//! | `@QUOTED_NAME@`    | `"` + `@QUOTABLE_NAME@` + `"`                 |
//! | `@PROJECT_NAME@`   | left as is, for build tools that use `@...@`  |

use std::fmt;

/// Resolves a placeholder name to a value.
pub type Resolver = fn(&str, &Variables) -> Option<String>;

#[derive(Clone)]
pub enum Value {
    Text(String),
    Dynamic(Resolver),
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Self::Dynamic(_) => f.write_str("Dynamic"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Variable {
    pub key: String,
    /// Matches any placeholder starting with `key`.
    pub is_prefix: bool,
    /// Escaped when used through `QUOTABLE_` or `QUOTED_`.
    pub is_quotable: bool,
    pub value: Value,
}

impl Variable {
    /// A quotable variable with a fixed value.
    pub fn text(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            is_prefix: false,
            is_quotable: true,
            value: Value::Text(value.into()),
        }
    }

    fn dynamic(key: &str, is_quotable: bool, resolver: Resolver) -> Self {
        Self {
            key: key.to_string(),
            is_prefix: true,
            is_quotable,
            value: Value::Dynamic(resolver),
        }
    }

    fn convert(&self, name: &str, vars: &Variables) -> Option<String> {
        let applies = if self.is_prefix {
            name.starts_with(&self.key)
        } else {
            name == self.key
        };
        if !applies {
            return None;
        }
        match &self.value {
            Value::Text(text) => Some(text.clone()),
            Value::Dynamic(resolver) => resolver(name, vars),
        }
    }
}

/// An ordered set of variables; the first one producing a value wins.
#[derive(Debug, Clone, Default)]
pub struct Variables {
    vars: Vec<Variable>,
}

const QUOTABLE: &str = "QUOTABLE_";
const QUOTED: &str = "QUOTED_";
const PROJECT: &str = "PROJECT_";

impl Variables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Variables with the `QUOTABLE_`, `QUOTED_` and `PROJECT_` prefixes
    /// already registered.
    pub fn with_builtins() -> Self {
        let mut vars = Self::new();
        vars.add(Variable::dynamic(QUOTABLE, true, quotable));
        vars.add(Variable::dynamic(QUOTED, true, quoted));
        vars.add(Variable::dynamic(PROJECT, false, reflect));
        vars
    }

    pub fn add(&mut self, variable: Variable) {
        self.vars.push(variable);
    }

    /// The value of `name` and the variable that produced it.
    pub fn convert_with(&self, name: &str) -> Option<(String, &Variable)> {
        self.vars
            .iter()
            .find_map(|variable| variable.convert(name, self).map(|value| (value, variable)))
    }

    pub fn convert(&self, name: &str) -> Option<String> {
        self.convert_with(name).map(|(value, _)| value)
    }

    /// The value of `name` as bytes to write into a file.
    pub fn encoded(&self, name: &str) -> Option<Vec<u8>> {
        self.convert(name).map(String::into_bytes)
    }
}

fn quotable(name: &str, vars: &Variables) -> Option<String> {
    let (value, variable) = vars.convert_with(&name[QUOTABLE.len()..])?;
    if variable.is_quotable {
        Some(quote_string(&value))
    } else {
        Some(value)
    }
}

fn quoted(name: &str, vars: &Variables) -> Option<String> {
    let value = vars.convert(&format!("{QUOTABLE}{}", &name[QUOTED.len()..]))?;
    Some(format!("\"{value}\""))
}

fn reflect(name: &str, _vars: &Variables) -> Option<String> {
    Some(format!("@{name}@"))
}

/// Escapes `value` for use inside a double quoted string.
pub fn quote_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\x0c' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\x0b' => out.push_str("\\v"),
            c => out.push(c),
        }
    }
    out
}
