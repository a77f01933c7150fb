//! Presence of the compliance and P2P documentation

use super::{Failure, Rule, RuleContext, RuleError, RuleOutcome};

/// Documents that must exist, relative to the repository root
pub const REQUIRED_DOCS: &[&str] = &[
    "docs/compliance/consensus_structures_audit.md",
    "docs/p2p/protocol_design.md",
    "docs/p2p/compliance_checklist.md",
    "docs/p2p/api_reference.md",
    "docs/p2p/README.md",
];

pub(super) const DOCUMENTATION_RULE: Rule = Rule::new(
    "documentation",
    "documentation",
    "Compliance audit and P2P documents are present",
    check_documentation,
);

fn check_documentation(ctx: &RuleContext) -> Result<RuleOutcome, RuleError> {
    let missing = REQUIRED_DOCS.iter().find(|doc| !ctx.loader().exists(doc));

    Ok(match missing {
        Some(doc) => RuleOutcome::Fail(Failure::MissingArtifact {
            path: doc.to_string(),
        }),
        None => RuleOutcome::Pass("Documentation is compliant".to_string()),
    })
}
