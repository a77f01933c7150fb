//! Compliance rules
//!
//! Each [`Rule`] is an independent, named check. A rule reloads the checked
//! source on every run, extracts the declarations it cares about and stops at
//! the first failure it finds.

mod annotations;
mod documentation;
mod structures;

pub use annotations::{REQUIRED_DERIVES, SERIALIZED_STRUCTURES};
pub use documentation::REQUIRED_DOCS;

use crate::checker::{check_fields, format_missing, FieldRequirement};
use crate::extractor::{ExtractError, ExtractionMode, Extractor, StructuralPattern};
use crate::loader::{SourceLoader, SHARED_TYPES_PATH};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Unexpected fault raised while evaluating a rule
#[derive(Error, Debug)]
pub enum RuleError {
    #[error(transparent)]
    Extract(#[from] ExtractError),
    #[error("rule panicked: {0}")]
    Panicked(String),
}

/// Expected, locally handled reason a rule did not pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Failure {
    /// A checked file does not exist or cannot be read
    MissingArtifact { path: String },
    /// A required declaration did not match anywhere
    StructureNotFound { structure: String },
    /// The declaration exists but required items are absent
    FieldsMissing {
        structure: String,
        missing: Vec<FieldRequirement>,
    },
    /// The declaration exists but required derives are absent
    AnnotationMissing {
        structure: String,
        missing: Vec<FieldRequirement>,
    },
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Failure::MissingArtifact { path } => write!(f, "Could not find {}", path),
            Failure::StructureNotFound { structure } => write!(f, "{} not found", structure),
            Failure::FieldsMissing { structure, missing } => {
                let noun = missing.first().map_or("fields", FieldRequirement::noun);
                write!(f, "Missing {} {}: {}", structure, noun, format_missing(missing))
            }
            Failure::AnnotationMissing { structure, missing } => {
                write!(f, "{} missing derives: {}", structure, format_missing(missing))
            }
        }
    }
}

/// Result of a rule that ran to completion
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleOutcome {
    Pass(String),
    Fail(Failure),
}

impl RuleOutcome {
    pub fn passed(&self) -> bool {
        matches!(self, RuleOutcome::Pass(_))
    }
}

pub type CheckFn = fn(&RuleContext) -> Result<RuleOutcome, RuleError>;

/// A named compliance check
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    /// Stable identifier used by `--rule` / `--skip`
    pub id: &'static str,
    /// Subject shown in progress output, e.g. "BlockHeader structure"
    pub name: &'static str,
    pub description: &'static str,
    check: CheckFn,
}

impl Rule {
    pub const fn new(
        id: &'static str,
        name: &'static str,
        description: &'static str,
        check: CheckFn,
    ) -> Self {
        Self {
            id,
            name,
            description,
            check,
        }
    }

    pub fn run(&self, ctx: &RuleContext) -> Result<RuleOutcome, RuleError> {
        (self.check)(ctx)
    }
}

/// Every rule, in execution order
pub fn default_rules() -> Vec<Rule> {
    vec![
        structures::BLOCK_HEADER_RULE,
        structures::BLOCK_RULE,
        structures::TICKET_VOTE_RULE,
        structures::TRANSACTION_RULE,
        structures::TX_OUTPUT_RULE,
        structures::TX_INPUT_RULE,
        annotations::SERIALIZATION_RULE,
        documentation::DOCUMENTATION_RULE,
    ]
}

/// Invalid rule selection
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SelectionError {
    #[error("unknown rule id: {0} (see --list-rules)")]
    UnknownRule(String),
    #[error("rule selection leaves no rules to run")]
    NoRules,
}

/// Narrow a rule list to `select` (when non-empty) minus `skip`, keeping order.
///
/// Every id must name a rule, and at least one rule must remain.
pub fn filter_rules(
    rules: Vec<Rule>,
    select: &[String],
    skip: &[String],
) -> Result<Vec<Rule>, SelectionError> {
    if let Some(id) = select
        .iter()
        .chain(skip)
        .find(|id| !rules.iter().any(|r| r.id == id.as_str()))
    {
        return Err(SelectionError::UnknownRule(id.to_string()));
    }

    let selected: Vec<Rule> = rules
        .into_iter()
        .filter(|r| select.is_empty() || select.iter().any(|id| id == r.id))
        .filter(|r| !skip.iter().any(|id| id == r.id))
        .collect();

    if selected.is_empty() {
        return Err(SelectionError::NoRules);
    }
    Ok(selected)
}

/// Everything a rule needs to run: where to read from and how to extract
#[derive(Debug, Clone)]
pub struct RuleContext {
    loader: SourceLoader,
    extractor: Extractor,
    source_path: String,
}

impl RuleContext {
    pub fn new(loader: SourceLoader, mode: ExtractionMode) -> Self {
        Self {
            loader,
            extractor: Extractor::new(mode),
            source_path: SHARED_TYPES_PATH.to_string(),
        }
    }

    pub fn with_source_path(mut self, path: impl Into<String>) -> Self {
        self.source_path = path.into();
        self
    }

    pub fn loader(&self) -> &SourceLoader {
        &self.loader
    }

    pub fn extractor(&self) -> &Extractor {
        &self.extractor
    }

    pub fn source_path(&self) -> &str {
        &self.source_path
    }

    /// Read the checked source afresh
    fn source(&self) -> Step<String> {
        self.loader.load(&self.source_path).ok_or_else(|| {
            Halt::Fail(Failure::MissingArtifact {
                path: self.source_path.clone(),
            })
        })
    }

    /// Body of `pattern` in `text`, failing with `StructureNotFound`
    fn body<'t>(&self, text: &'t str, pattern: &StructuralPattern) -> Step<&'t str> {
        self.extractor.extract(text, pattern)?.ok_or_else(|| {
            Halt::Fail(Failure::StructureNotFound {
                structure: format!("{} {}", pattern.name, pattern.kind.as_str()),
            })
        })
    }
}

/// Fail with `FieldsMissing` unless every requirement occurs in `body`
fn require(structure: &str, body: &str, requirements: &[FieldRequirement]) -> Step<()> {
    let missing = check_fields(body, requirements);
    if missing.is_empty() {
        Ok(())
    } else {
        Err(Halt::Fail(Failure::FieldsMissing {
            structure: structure.to_string(),
            missing,
        }))
    }
}

/// Early exit from a rule body
enum Halt {
    Fail(Failure),
    Error(RuleError),
}

impl From<RuleError> for Halt {
    fn from(e: RuleError) -> Self {
        Halt::Error(e)
    }
}

impl From<ExtractError> for Halt {
    fn from(e: ExtractError) -> Self {
        Halt::Error(e.into())
    }
}

type Step<T> = Result<T, Halt>;

/// Turn a rule body into an outcome; the body yields its pass message
fn conclude(body: impl FnOnce() -> Step<String>) -> Result<RuleOutcome, RuleError> {
    match body() {
        Ok(message) => Ok(RuleOutcome::Pass(message)),
        Err(Halt::Fail(failure)) => Ok(RuleOutcome::Fail(failure)),
        Err(Halt::Error(e)) => Err(e),
    }
}
