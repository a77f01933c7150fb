//! Structural extractor - locates a named declaration and captures its body
//!
//! Two extraction modes are supported:
//!
//! - [`ExtractionMode::Balanced`] finds the declaration head with a regex and
//!   then walks the source with a brace counter that skips comments, string
//!   literals and char literals.
//! - [`ExtractionMode::SingleLevel`] uses one regex per declaration and
//!   tolerates no nesting in struct bodies and exactly one extra level in
//!   enum bodies. Deeper nesting truncates the captured body.

use log::debug;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("invalid declaration pattern for `{name}`: {source}")]
    Pattern { name: String, source: regex::Error },
}

/// Kind of declaration a pattern locates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeclKind {
    /// `pub struct Name { ... }`
    Struct,
    /// `pub enum Name { ... }`
    Enum,
    /// A named variant payload `Name { ... }` inside an enum body
    Payload,
}

impl DeclKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeclKind::Struct => "struct",
            DeclKind::Enum => "enum",
            DeclKind::Payload => "variant",
        }
    }
}

/// A type name plus the kind of declaration expected for it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StructuralPattern {
    pub name: &'static str,
    pub kind: DeclKind,
}

impl StructuralPattern {
    pub const fn record(name: &'static str) -> Self {
        Self {
            name,
            kind: DeclKind::Struct,
        }
    }

    pub const fn enumeration(name: &'static str) -> Self {
        Self {
            name,
            kind: DeclKind::Enum,
        }
    }

    pub const fn payload(name: &'static str) -> Self {
        Self {
            name,
            kind: DeclKind::Payload,
        }
    }

    /// Regex locating the declaration head
    fn head_regex(&self) -> String {
        let name = regex::escape(self.name);
        match self.kind {
            DeclKind::Struct => format!(r"\bpub\s+struct\s+{name}\b"),
            DeclKind::Enum => format!(r"\bpub\s+enum\s+{name}\b"),
            DeclKind::Payload => format!(r"\b{name}\s*\{{"),
        }
    }

    /// Single regex capturing the body in group 1
    fn single_level_regex(&self) -> String {
        let name = regex::escape(self.name);
        match self.kind {
            DeclKind::Struct => format!(r"pub struct {name}\s*\{{([^}}]*)\}}"),
            DeclKind::Enum => {
                format!(r"pub enum {name}\s*\{{([^{{}}]*(?:\{{[^}}]*\}}[^{{}}]*)*)\}}")
            }
            DeclKind::Payload => format!(r"\b{name}\s*\{{([^}}]*)\}}"),
        }
    }
}

impl fmt::Display for StructuralPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind.as_str(), self.name)
    }
}

/// How declaration bodies are delimited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExtractionMode {
    /// Brace-depth counting, aware of comments and literals
    #[default]
    Balanced,
    /// One-level regex matching; nested braces may truncate the body
    SingleLevel,
}

impl ExtractionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionMode::Balanced => "balanced",
            ExtractionMode::SingleLevel => "single-level",
        }
    }
}

impl FromStr for ExtractionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "balanced" => Ok(ExtractionMode::Balanced),
            "single-level" | "single_level" | "legacy" => Ok(ExtractionMode::SingleLevel),
            other => Err(format!("unknown extraction mode: {}", other)),
        }
    }
}

/// Locates declarations and their attribute prefixes in source text
#[derive(Debug, Clone, Copy, Default)]
pub struct Extractor {
    mode: ExtractionMode,
}

impl Extractor {
    pub fn new(mode: ExtractionMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> ExtractionMode {
        self.mode
    }

    /// Extract the body of the first declaration matching `pattern`.
    ///
    /// Returns `Ok(None)` when no declaration matches. An empty body is
    /// `Ok(Some(""))`.
    pub fn extract<'t>(
        &self,
        text: &'t str,
        pattern: &StructuralPattern,
    ) -> Result<Option<&'t str>, ExtractError> {
        let body = match self.mode {
            ExtractionMode::Balanced => extract_balanced(text, pattern)?,
            ExtractionMode::SingleLevel => extract_single_level(text, pattern)?,
        };
        if body.is_none() {
            debug!("{} not found ({} mode)", pattern, self.mode.as_str());
        }
        Ok(body)
    }

    /// Attribute prefix written directly above `pub struct|enum name`.
    ///
    /// In single-level mode this is the one `#[derive(...)]` immediately
    /// preceding the declaration (together with the declaration head). In
    /// balanced mode it is the whole run of attributes and comments above it.
    pub fn annotations<'t>(
        &self,
        text: &'t str,
        name: &str,
    ) -> Result<Option<&'t str>, ExtractError> {
        let escaped = regex::escape(name);
        match self.mode {
            ExtractionMode::SingleLevel => {
                let re = compile(
                    name,
                    &format!(r"#\[derive\([^\]]*\)\]\s*pub (?:struct|enum) {escaped}\b"),
                )?;
                Ok(re.find(text).map(|m| m.as_str()))
            }
            ExtractionMode::Balanced => {
                let re = compile(name, &format!(r"\bpub\s+(?:struct|enum)\s+{escaped}\b"))?;
                Ok(re.find(text).map(|m| {
                    let start = attribute_prefix_start(text, m.start());
                    &text[start..m.start()]
                }))
            }
        }
    }
}

fn compile(name: &str, pattern: &str) -> Result<Regex, ExtractError> {
    Regex::new(pattern).map_err(|source| ExtractError::Pattern {
        name: name.to_string(),
        source,
    })
}

fn extract_single_level<'t>(
    text: &'t str,
    pattern: &StructuralPattern,
) -> Result<Option<&'t str>, ExtractError> {
    let re = compile(pattern.name, &pattern.single_level_regex())?;
    Ok(re
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str()))
}

fn extract_balanced<'t>(
    text: &'t str,
    pattern: &StructuralPattern,
) -> Result<Option<&'t str>, ExtractError> {
    let re = compile(pattern.name, &pattern.head_regex())?;

    for head in re.find_iter(text) {
        let open = match pattern.kind {
            DeclKind::Payload => Some(head.end() - 1),
            DeclKind::Struct | DeclKind::Enum => open_brace_after(text, head.end()),
        };
        // Tuple and unit declarations have no braced body
        let Some(open) = open else { continue };

        if let Some(close) = matching_close(text, open) {
            return Ok(Some(&text[open + 1..close]));
        }
        debug!("{} has an unterminated body", pattern);
        return Ok(None);
    }

    Ok(None)
}

/// Position of the `{` opening a declaration body, stopping at `;`
fn open_brace_after(text: &str, from: usize) -> Option<usize> {
    for (offset, byte) in text.as_bytes()[from..].iter().enumerate() {
        match byte {
            b'{' => return Some(from + offset),
            b';' => return None,
            _ => {}
        }
    }
    None
}

/// Index of the `}` closing the brace at `open`
fn matching_close(text: &str, open: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut i = open;

    while i < bytes.len() {
        match bytes[i] {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                i = text[i..].find('\n').map_or(bytes.len(), |n| i + n);
                continue;
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i = skip_block_comment(bytes, i);
                continue;
            }
            b'"' => {
                i = skip_string(bytes, i);
                continue;
            }
            b'r' => {
                if let Some(end) = skip_raw_string(text, i) {
                    i = end;
                    continue;
                }
            }
            b'\'' => {
                i = skip_char_literal(text, i);
                continue;
            }
            _ => {}
        }
        i += 1;
    }

    None
}

fn skip_block_comment(bytes: &[u8], start: usize) -> usize {
    let mut depth = 0usize;
    let mut i = start;
    while i + 1 < bytes.len() {
        if bytes[i] == b'/' && bytes[i + 1] == b'*' {
            depth += 1;
            i += 2;
        } else if bytes[i] == b'*' && bytes[i + 1] == b'/' {
            depth -= 1;
            i += 2;
            if depth == 0 {
                return i;
            }
        } else {
            i += 1;
        }
    }
    bytes.len()
}

fn skip_string(bytes: &[u8], start: usize) -> usize {
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'"' => return i + 1,
            _ => i += 1,
        }
    }
    bytes.len()
}

/// `r"..."` / `r#"..."#`; `None` when `r` does not start a raw string
fn skip_raw_string(text: &str, start: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    if start > 0 && is_ident_byte(bytes[start - 1]) {
        return None;
    }

    let mut i = start + 1;
    let mut hashes = 0;
    while bytes.get(i) == Some(&b'#') {
        hashes += 1;
        i += 1;
    }
    if bytes.get(i) != Some(&b'"') {
        return None;
    }

    let closing = format!("\"{}", "#".repeat(hashes));
    let body_start = i + 1;
    Some(
        text[body_start..]
            .find(&closing)
            .map_or(bytes.len(), |n| body_start + n + closing.len()),
    )
}

/// Skip a char literal, or just the quote of a lifetime
fn skip_char_literal(text: &str, start: usize) -> usize {
    let rest = &text[start + 1..];
    match rest.chars().next() {
        Some('\\') => match rest.get(2..).and_then(|r| r.find('\'')) {
            Some(n) => start + 3 + n + 1,
            None => text.len(),
        },
        Some(c) => {
            let after = start + 1 + c.len_utf8();
            if text[after..].starts_with('\'') {
                after + 1
            } else {
                start + 1
            }
        }
        None => start + 1,
    }
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Start of the run of attributes and comment lines directly above `decl_start`
fn attribute_prefix_start(text: &str, decl_start: usize) -> usize {
    let mut start = decl_start;

    loop {
        let before = text[..start].trim_end();
        if before.is_empty() {
            break;
        }

        if before.ends_with(']') {
            match attribute_open(before) {
                Some(open) => {
                    start = open;
                    continue;
                }
                None => break,
            }
        }

        let line_start = before.rfind('\n').map_or(0, |n| n + 1);
        if before[line_start..].trim_start().starts_with("//") {
            start = line_start;
            continue;
        }

        break;
    }

    start
}

/// Index of the `#` opening the attribute that ends `before`
fn attribute_open(before: &str) -> Option<usize> {
    let bytes = before.as_bytes();
    let mut depth = 0usize;
    let mut i = bytes.len();

    while i > 0 {
        i -= 1;
        match bytes[i] {
            b'"' => i = string_open(bytes, i)?,
            b']' => depth += 1,
            b'[' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return (i > 0 && bytes[i - 1] == b'#').then(|| i - 1);
                }
            }
            _ => {}
        }
    }

    None
}

/// Opening quote of the string literal whose closing quote is at `close`
fn string_open(bytes: &[u8], close: usize) -> Option<usize> {
    (0..close)
        .rev()
        .find(|&j| bytes[j] == b'"' && !is_escaped(bytes, j))
}

fn is_escaped(bytes: &[u8], at: usize) -> bool {
    let backslashes = bytes[..at].iter().rev().take_while(|&&b| b == b'\\').count();
    backslashes % 2 == 1
}
