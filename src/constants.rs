//! Program id, seed tags, discriminators and size constants matching the
//! on-chain tote program exactly.

use solana_sdk::pubkey::Pubkey;

/// Canonical mainnet deployment of the tote program. Every derivation and
/// instruction builder takes the program id as a parameter so devnet forks
/// can substitute their own.
pub const PROGRAM_ID: Pubkey =
    solana_sdk::pubkey!("3gyMkUx2UfejHu87wDGdX19B8knHyTpCKijRm1pVjgrc");

// ---------- PDA seed tags ----------

pub const CONFIG_SEED: &[u8] = b"protocol_config";
pub const MARKET_SEED: &[u8] = b"market";
pub const VAULT_SEED: &[u8] = b"vault";
pub const VAULT_AUTHORITY_SEED: &[u8] = b"vault_authority";
pub const POSITION_SEED: &[u8] = b"position";
pub const MULTISIG_SEED: &[u8] = b"multisig";
pub const PROPOSAL_SEED: &[u8] = b"proposal";

// ---------- Account discriminators (sha256("account:<Name>")[..8]) ----------

pub const MARKET_DISCRIMINATOR: [u8; 8] = [0xdb, 0xbe, 0xd5, 0x37, 0x00, 0xe3, 0xc6, 0x9a];
pub const USER_POSITION_DISCRIMINATOR: [u8; 8] = [0xfb, 0xf8, 0xd1, 0xf5, 0x53, 0xea, 0x11, 0x1b];
pub const PROTOCOL_CONFIG_DISCRIMINATOR: [u8; 8] = [0xcf, 0x5b, 0xfa, 0x1c, 0x98, 0xb3, 0xd7, 0xd1];
pub const MULTISIG_AUTHORITY_DISCRIMINATOR: [u8; 8] =
    [0xbb, 0xb4, 0x38, 0x05, 0x5f, 0x36, 0x1f, 0xf3];
pub const MULTISIG_PROPOSAL_DISCRIMINATOR: [u8; 8] =
    [0x0d, 0x0f, 0x90, 0x37, 0xfc, 0xa4, 0x53, 0xd0];

// ---------- Capacities ----------

/// Pool slots and label slots physically present in every market account.
pub const MAX_OUTCOMES: usize = 10;
/// A pari-mutuel pool needs at least two sides.
pub const MIN_OUTCOMES: usize = 2;
/// Signer slots physically present in every multisig account.
pub const MAX_SIGNERS: usize = 11;

pub const TITLE_CAPACITY: usize = 128;
pub const DESCRIPTION_CAPACITY: usize = 512;
pub const LABEL_CAPACITY: usize = 64;

// ---------- Account sizes ----------

/// Market account size under the current layout (creator block present).
pub const MARKET_LEN: usize = 1548;
/// Market accounts written before the creator block was introduced.
pub const MARKET_LEGACY_LEN: usize = MARKET_LEN - 34;
/// Offset of the creator block; in legacy accounts the title region starts
/// here instead. The layout probe in the Market decoder pivots on this.
pub const MARKET_CREATOR_OFFSET: usize = 210;

pub const USER_POSITION_LEN: usize = 90;
pub const PROTOCOL_CONFIG_LEN: usize = 91;
pub const MULTISIG_AUTHORITY_LEN: usize = 378;
/// Upper bound: the governance action payload is variable (1 tag byte plus
/// at most 32 bytes of fields).
pub const MULTISIG_PROPOSAL_MAX_LEN: usize = 157;

// ---------- Instruction opcodes ----------

/// Single-byte instruction opcodes. Never reorder or reuse a value; append
/// new instructions at the end.
pub mod opcode {
    pub const INITIALIZE_PROTOCOL: u8 = 0;
    pub const CREATE_MARKET: u8 = 1;
    pub const PLACE_BET: u8 = 2;
    pub const RESOLVE_MARKET: u8 = 3;
    pub const DISPUTE_RESOLUTION: u8 = 4;
    pub const FINALIZE_MARKET: u8 = 5;
    pub const CLAIM_WINNINGS: u8 = 6;
    pub const VOID_MARKET: u8 = 7;
    pub const CLAIM_REFUND: u8 = 8;
    pub const UPDATE_PROTOCOL_CONFIG: u8 = 9;
    pub const CREATE_MULTISIG: u8 = 10;
    pub const CREATE_PROPOSAL: u8 = 11;
    pub const APPROVE_PROPOSAL: u8 = 12;
    pub const EXECUTE_PROPOSAL: u8 = 13;
    pub const HARVEST_WITHHELD_FEES: u8 = 14;
}
