use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize};

/// Reference to a specific transaction output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct OutPoint {
    pub txid: [u8; 32],
    pub vout: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct TxInput {
    pub previous_output: OutPoint,
    pub script_sig: Vec<u8>,
    pub sequence: u32,
    pub witness: Vec<Vec<u8>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct TxOutput {
    pub value: u64,
    pub script_pubkey: Vec<u8>,
    pub memo: Option<Vec<u8>>,
}

impl TxOutput {
    pub fn new(value: u64, script_pubkey: Vec<u8>) -> Self {
        TxOutput { value, script_pubkey, memo: None }
    }

    pub fn new_with_memo(value: u64, script_pubkey: Vec<u8>, memo: Option<Vec<u8>>) -> Self {
        TxOutput { value, script_pubkey, memo }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub enum Transaction {
    Standard {
        version: u32,
        inputs: Vec<TxInput>,
        outputs: Vec<TxOutput>,
        lock_time: u32,
        fee: u64,
        witness: Vec<Vec<u8>>,
    },
    Coinbase {
        version: u32,
        inputs: Vec<TxInput>,
        outputs: Vec<TxOutput>,
        lock_time: u32,
        witness: Vec<Vec<u8>>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct BlockHeader {
    pub version: u32,
    pub previous_block_hash: [u8; 32],
    pub merkle_root: [u8; 32],
    pub timestamp: u64,
    pub nonce: u64,
    pub difficulty_target: u32,
    pub height: u64,
    pub state_root: [u8; 32],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct Block {
    pub header: BlockHeader,
    pub ticket_votes: Vec<TicketVote>,
    pub transactions: Vec<Transaction>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct TicketVote {
    pub ticket_id: [u8; 32],
    pub block_hash: [u8; 32],
    pub vote: VoteType,
    pub signature: TransactionSignature,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
#[repr(u8)]
pub enum VoteType {
    Yes = 0,
    No = 1,
    Abstain = 2,
}
