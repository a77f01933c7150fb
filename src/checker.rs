//! Field and attribute requirements checked against an extracted body

use serde::Serialize;
use std::fmt;

/// A piece of declaration text that must appear inside a body.
///
/// Requirements are literal: a type shape like `[u8; 32]` is matched as
/// written, never as a pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FieldRequirement {
    /// `name: ty`
    Field {
        name: &'static str,
        ty: &'static str,
    },
    /// `Tag = value` inside an enum
    Discriminant { tag: &'static str, value: i64 },
    /// Free-form marker such as `pub fn new(`
    Marker { text: &'static str },
    /// Derive macro name, matched as a whole identifier
    Derive { name: &'static str },
}

impl FieldRequirement {
    pub const fn field(name: &'static str, ty: &'static str) -> Self {
        FieldRequirement::Field { name, ty }
    }

    pub const fn discriminant(tag: &'static str, value: i64) -> Self {
        FieldRequirement::Discriminant { tag, value }
    }

    pub const fn marker(text: &'static str) -> Self {
        FieldRequirement::Marker { text }
    }

    pub const fn derive(name: &'static str) -> Self {
        FieldRequirement::Derive { name }
    }

    /// Plural noun for a list of requirements of this kind
    pub fn noun(&self) -> &'static str {
        match self {
            FieldRequirement::Field { .. } => "fields",
            FieldRequirement::Discriminant { .. } => "variants",
            FieldRequirement::Marker { .. } => "markers",
            FieldRequirement::Derive { .. } => "derives",
        }
    }

    /// Whether the literal declaration text occurs in `body`
    pub fn is_satisfied_by(&self, body: &str) -> bool {
        match self {
            FieldRequirement::Marker { text } => body.contains(text),
            FieldRequirement::Derive { name } => contains_identifier(body, name),
            other => body.contains(other.to_string().as_str()),
        }
    }
}

/// `ident` occurs in `text` with no identifier characters on either side
fn contains_identifier(text: &str, ident: &str) -> bool {
    let is_ident = |c: char| c.is_alphanumeric() || c == '_';
    text.match_indices(ident).any(|(start, _)| {
        let before = text[..start].chars().next_back();
        let after = text[start + ident.len()..].chars().next();
        !before.is_some_and(is_ident) && !after.is_some_and(is_ident)
    })
}

impl fmt::Display for FieldRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldRequirement::Field { name, ty } => write!(f, "{}: {}", name, ty),
            FieldRequirement::Discriminant { tag, value } => write!(f, "{} = {}", tag, value),
            FieldRequirement::Marker { text } => f.write_str(text),
            FieldRequirement::Derive { name } => f.write_str(name),
        }
    }
}

/// Every requirement absent from `body`, in list order
pub fn check_fields(body: &str, requirements: &[FieldRequirement]) -> Vec<FieldRequirement> {
    requirements
        .iter()
        .filter(|req| !req.is_satisfied_by(body))
        .copied()
        .collect()
}

/// Render a miss list as `["a: u8", "b: u16"]`
pub fn format_missing(missing: &[FieldRequirement]) -> String {
    let items: Vec<String> = missing.iter().map(|m| format!("\"{}\"", m)).collect();
    format!("[{}]", items.join(", "))
}
