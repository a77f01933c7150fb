//! consensus-check: static compliance checks for consensus data structures
//!
//! This library reads the shared consensus type definitions of a repository,
//! locates the required structures by text pattern and verifies that each one
//! declares its required fields, variants and serialization derives. It also
//! verifies that the compliance and P2P documentation is present.

pub mod checker;
pub mod config;
pub mod extractor;
pub mod loader;
pub mod output;
pub mod report;
pub mod rules;

#[cfg(test)]
mod testing;

pub use checker::{check_fields, FieldRequirement};
pub use config::{CliOptions, Config, ConfigError};
pub use extractor::{DeclKind, ExtractError, ExtractionMode, Extractor, StructuralPattern};
pub use loader::{SourceLoader, SHARED_TYPES_PATH};
pub use output::TextReporter;
pub use report::{run_rules, ComplianceReport, Reporter, RuleReport, RuleStatus, SilentReporter};
pub use rules::{
    default_rules, filter_rules, Failure, Rule, RuleContext, RuleError, RuleOutcome,
    SelectionError,
};
