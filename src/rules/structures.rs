//! One rule per consensus structure

use super::{conclude, require, Rule, RuleContext, RuleError, RuleOutcome};
use crate::checker::FieldRequirement;
use crate::extractor::StructuralPattern;

const BLOCK_HEADER: StructuralPattern = StructuralPattern::record("BlockHeader");
const BLOCK: StructuralPattern = StructuralPattern::record("Block");
const TICKET_VOTE: StructuralPattern = StructuralPattern::record("TicketVote");
const VOTE_TYPE: StructuralPattern = StructuralPattern::enumeration("VoteType");
const TRANSACTION: StructuralPattern = StructuralPattern::enumeration("Transaction");
const STANDARD: StructuralPattern = StructuralPattern::payload("Standard");
const TX_OUTPUT: StructuralPattern = StructuralPattern::record("TxOutput");
const TX_INPUT: StructuralPattern = StructuralPattern::record("TxInput");
const OUT_POINT: StructuralPattern = StructuralPattern::record("OutPoint");

const BLOCK_HEADER_FIELDS: &[FieldRequirement] = &[
    FieldRequirement::field("version", "u32"),
    FieldRequirement::field("previous_block_hash", "[u8; 32]"),
    FieldRequirement::field("merkle_root", "[u8; 32]"),
    FieldRequirement::field("timestamp", "u64"),
    FieldRequirement::field("nonce", "u64"),
    FieldRequirement::field("difficulty_target", "u32"),
    FieldRequirement::field("height", "u64"),
    FieldRequirement::field("state_root", "[u8; 32]"),
];

const BLOCK_FIELDS: &[FieldRequirement] = &[
    FieldRequirement::field("header", "BlockHeader"),
    FieldRequirement::field("ticket_votes", "Vec<TicketVote>"),
    FieldRequirement::field("transactions", "Vec<Transaction>"),
];

const TICKET_VOTE_FIELDS: &[FieldRequirement] = &[
    FieldRequirement::field("ticket_id", "[u8; 32]"),
    FieldRequirement::field("block_hash", "[u8; 32]"),
    FieldRequirement::field("vote", "VoteType"),
    FieldRequirement::field("signature", "TransactionSignature"),
];

const VOTE_TYPE_VARIANTS: &[FieldRequirement] = &[
    FieldRequirement::discriminant("Yes", 0),
    FieldRequirement::discriminant("No", 1),
    FieldRequirement::discriminant("Abstain", 2),
];

const STANDARD_FIELDS: &[FieldRequirement] = &[
    FieldRequirement::field("version", "u32"),
    FieldRequirement::field("inputs", "Vec<TxInput>"),
    FieldRequirement::field("outputs", "Vec<TxOutput>"),
    FieldRequirement::field("lock_time", "u32"),
    FieldRequirement::field("fee", "u64"),
    FieldRequirement::field("witness", "Vec<Vec<u8>>"),
];

const TX_OUTPUT_FIELDS: &[FieldRequirement] = &[
    FieldRequirement::field("value", "u64"),
    FieldRequirement::field("script_pubkey", "Vec<u8>"),
    FieldRequirement::field("memo", "Option<Vec<u8>>"),
];

// Searched in the whole source, not just the struct body
const TX_OUTPUT_CONSTRUCTORS: &[FieldRequirement] = &[
    FieldRequirement::marker("pub fn new("),
    FieldRequirement::marker("pub fn new_with_memo("),
];

const TX_INPUT_FIELDS: &[FieldRequirement] = &[
    FieldRequirement::field("previous_output", "OutPoint"),
    FieldRequirement::field("script_sig", "Vec<u8>"),
    FieldRequirement::field("sequence", "u32"),
];

const OUT_POINT_FIELDS: &[FieldRequirement] = &[
    FieldRequirement::field("txid", "[u8; 32]"),
    FieldRequirement::field("vout", "u32"),
];

pub(super) const BLOCK_HEADER_RULE: Rule = Rule::new(
    "block-header",
    "BlockHeader structure",
    "BlockHeader declares the eight consensus header fields",
    check_block_header,
);

pub(super) const BLOCK_RULE: Rule = Rule::new(
    "block",
    "Block structure",
    "Block carries a header, ticket votes and transactions",
    check_block,
);

pub(super) const TICKET_VOTE_RULE: Rule = Rule::new(
    "ticket-vote",
    "TicketVote structure",
    "TicketVote fields and explicit VoteType discriminants",
    check_ticket_vote,
);

pub(super) const TRANSACTION_RULE: Rule = Rule::new(
    "transaction",
    "Transaction structure",
    "Transaction enum with a Standard variant carrying the standard field set",
    check_transaction,
);

pub(super) const TX_OUTPUT_RULE: Rule = Rule::new(
    "tx-output",
    "TxOutput structure",
    "TxOutput fields plus new and new_with_memo constructors",
    check_tx_output,
);

pub(super) const TX_INPUT_RULE: Rule = Rule::new(
    "tx-input",
    "TxInput structure",
    "TxInput fields and the referenced OutPoint record",
    check_tx_input,
);

fn check_block_header(ctx: &RuleContext) -> Result<RuleOutcome, RuleError> {
    conclude(|| {
        let text = ctx.source()?;
        let body = ctx.body(&text, &BLOCK_HEADER)?;
        require(BLOCK_HEADER.name, body, BLOCK_HEADER_FIELDS)?;
        Ok("BlockHeader structure is compliant".to_string())
    })
}

fn check_block(ctx: &RuleContext) -> Result<RuleOutcome, RuleError> {
    conclude(|| {
        let text = ctx.source()?;
        let body = ctx.body(&text, &BLOCK)?;
        require(BLOCK.name, body, BLOCK_FIELDS)?;
        Ok("Block structure is compliant".to_string())
    })
}

fn check_ticket_vote(ctx: &RuleContext) -> Result<RuleOutcome, RuleError> {
    conclude(|| {
        let text = ctx.source()?;
        let body = ctx.body(&text, &TICKET_VOTE)?;
        require(TICKET_VOTE.name, body, TICKET_VOTE_FIELDS)?;

        let variants = ctx.body(&text, &VOTE_TYPE)?;
        require(VOTE_TYPE.name, variants, VOTE_TYPE_VARIANTS)?;
        Ok("TicketVote structure is compliant".to_string())
    })
}

fn check_transaction(ctx: &RuleContext) -> Result<RuleOutcome, RuleError> {
    conclude(|| {
        let text = ctx.source()?;
        let variants = ctx.body(&text, &TRANSACTION)?;
        let standard = ctx.body(variants, &STANDARD)?;
        require("Standard transaction", standard, STANDARD_FIELDS)?;
        Ok("Transaction structure is compliant".to_string())
    })
}

fn check_tx_output(ctx: &RuleContext) -> Result<RuleOutcome, RuleError> {
    conclude(|| {
        let text = ctx.source()?;
        let body = ctx.body(&text, &TX_OUTPUT)?;
        require(TX_OUTPUT.name, body, TX_OUTPUT_FIELDS)?;
        require(TX_OUTPUT.name, &text, TX_OUTPUT_CONSTRUCTORS)?;
        Ok("TxOutput structure is compliant".to_string())
    })
}

fn check_tx_input(ctx: &RuleContext) -> Result<RuleOutcome, RuleError> {
    conclude(|| {
        let text = ctx.source()?;
        let body = ctx.body(&text, &TX_INPUT)?;
        require(TX_INPUT.name, body, TX_INPUT_FIELDS)?;

        let outpoint = ctx.body(&text, &OUT_POINT)?;
        require(OUT_POINT.name, outpoint, OUT_POINT_FIELDS)?;
        Ok("TxInput structure is compliant".to_string())
    })
}
