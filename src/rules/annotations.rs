//! Serialization derives on every checked structure

use super::{conclude, Failure, Halt, Rule, RuleContext, RuleError, RuleOutcome};
use crate::checker::{check_fields, FieldRequirement};

/// Structures that must carry the serialization derives
pub const SERIALIZED_STRUCTURES: &[&str] = &[
    "BlockHeader",
    "Block",
    "TicketVote",
    "Transaction",
    "TxOutput",
    "TxInput",
];

/// Derives each serialized structure must declare
pub const REQUIRED_DERIVES: &[FieldRequirement] = &[
    FieldRequirement::derive("Serialize"),
    FieldRequirement::derive("Deserialize"),
    FieldRequirement::derive("Encode"),
    FieldRequirement::derive("Decode"),
];

pub(super) const SERIALIZATION_RULE: Rule = Rule::new(
    "serialization",
    "serialization support",
    "Each consensus structure derives serde and bincode traits",
    check_serialization,
);

fn check_serialization(ctx: &RuleContext) -> Result<RuleOutcome, RuleError> {
    conclude(|| {
        let text = ctx.source()?;

        for name in SERIALIZED_STRUCTURES {
            let Some(prefix) = ctx.extractor().annotations(&text, name)? else {
                return Err(Halt::Fail(Failure::StructureNotFound {
                    structure: format!("{} derive attributes", name),
                }));
            };

            let missing = check_fields(prefix, REQUIRED_DERIVES);
            if !missing.is_empty() {
                return Err(Halt::Fail(Failure::AnnotationMissing {
                    structure: name.to_string(),
                    missing,
                }));
            }
        }

        Ok("Serialization support is compliant".to_string())
    })
}
