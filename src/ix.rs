//! Instruction builders for the tote program.
//!
//! Each builder writes the single opcode byte and the argument fields, then
//! pairs the payload with the operation's fixed account template. Account
//! order is part of the wire contract; the program indexes into the list
//! positionally. Operations that move value exist in two shapes: the native
//! path, and the token path selected by passing [`TokenInfo`], which appends
//! a fixed suffix of token accounts without disturbing the common prefix.
//!
//! All range checks happen before any byte is written; a builder either
//! returns a complete [`Instruction`] or a [`ProtocolError`].

use solana_sdk::instruction::{AccountMeta, Instruction};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::system_program;
use spl_associated_token_account::get_associated_token_address_with_program_id;

use crate::action::GovernanceAction;
use crate::codec::Writer;
use crate::constants::{
    opcode, DESCRIPTION_CAPACITY, LABEL_CAPACITY, MAX_OUTCOMES, MAX_SIGNERS, MIN_OUTCOMES,
    TITLE_CAPACITY,
};
use crate::error::{ProtocolError, Result};
use crate::pda;

/// Mint and token program for a token-denominated market. `token_program`
/// is `spl_token::id()` or `spl_token_2022::id()`; user-side token accounts
/// are derived as ATAs of that pair.
#[derive(Debug, Clone, Copy)]
pub struct TokenInfo {
    pub mint: Pubkey,
    pub token_program: Pubkey,
}

impl TokenInfo {
    fn ata(&self, wallet: &Pubkey) -> Pubkey {
        get_associated_token_address_with_program_id(wallet, &self.mint, &self.token_program)
    }
}

fn check_limit(field: &'static str, value: u64, limit: u64) -> Result<()> {
    if value > limit {
        return Err(ProtocolError::RangeViolation {
            field,
            value,
            limit,
        });
    }
    Ok(())
}

fn check_str(field: &'static str, s: &str, capacity: usize) -> Result<()> {
    check_limit(field, s.len() as u64, capacity as u64)
}

fn check_outcome_index(outcome_index: u8) -> Result<()> {
    check_limit(
        "outcome_index",
        outcome_index as u64,
        MAX_OUTCOMES as u64 - 1,
    )
}

// ---------- Protocol administration ----------

/// Creates the singleton protocol config.
///
/// Accounts:
/// 0. `[writable]` Config PDA
/// 1. `[signer, writable]` Admin (payer)
/// 2. `[]` System program
pub fn initialize_protocol(program_id: &Pubkey, admin: &Pubkey, fee_bps: u16) -> Result<Instruction> {
    let (config, _) = pda::config_address(program_id)?;
    let mut w = Writer::new();
    w.write_u8(opcode::INITIALIZE_PROTOCOL);
    w.write_u16(fee_bps);
    Ok(Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(config, false),
            AccountMeta::new(*admin, true),
            AccountMeta::new_readonly(system_program::id(), false),
        ],
        data: w.finish(),
    })
}

/// Updates config fields; absent options leave the field untouched.
///
/// Accounts:
/// 0. `[writable]` Config PDA
/// 1. `[signer]` Admin
pub fn update_protocol_config(
    program_id: &Pubkey,
    admin: &Pubkey,
    new_fee_bps: Option<u16>,
    new_treasury: Option<Pubkey>,
    paused: Option<bool>,
) -> Result<Instruction> {
    let (config, _) = pda::config_address(program_id)?;
    let mut w = Writer::new();
    w.write_u8(opcode::UPDATE_PROTOCOL_CONFIG);
    w.write_option(new_fee_bps.as_ref(), |w, v| {
        w.write_u16(*v);
        Ok(())
    })?;
    w.write_option(new_treasury.as_ref(), |w, v| {
        w.write_pubkey(v);
        Ok(())
    })?;
    w.write_option(paused.as_ref(), |w, v| {
        w.write_bool(*v);
        Ok(())
    })?;
    Ok(Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(config, false),
            AccountMeta::new_readonly(*admin, true),
        ],
        data: w.finish(),
    })
}

// ---------- Market lifecycle ----------

pub struct CreateMarketArgs {
    pub title: String,
    pub description: String,
    pub outcome_labels: Vec<String>,
    pub resolution_deadline: i64,
    pub creator_fee_bps: u16,
    /// Overrides the protocol default fee for this market when present.
    pub fee_override: Option<u16>,
}

/// Creates a market; the program assigns `market_id` from the config
/// counter, so the caller passes the id it read (or reserved) to derive the
/// market PDA.
///
/// Accounts:
/// 0. `[writable]` Config PDA
/// 1. `[writable]` Market PDA
/// 2. `[writable]` Vault PDA
/// 3. `[signer, writable]` Authority (payer, market creator)
/// 4. `[]` System program
///
/// Token path appends:
/// 5. `[]` Mint
/// 6. `[]` Vault authority PDA
/// 7. `[]` Token program
pub fn create_market(
    program_id: &Pubkey,
    authority: &Pubkey,
    market_id: u64,
    args: &CreateMarketArgs,
    token: Option<&TokenInfo>,
) -> Result<Instruction> {
    check_str("title", &args.title, TITLE_CAPACITY)?;
    check_str("description", &args.description, DESCRIPTION_CAPACITY)?;
    check_limit(
        "outcome count",
        args.outcome_labels.len() as u64,
        MAX_OUTCOMES as u64,
    )?;
    if args.outcome_labels.len() < MIN_OUTCOMES {
        return Err(ProtocolError::RangeViolation {
            field: "outcome count",
            value: args.outcome_labels.len() as u64,
            limit: MIN_OUTCOMES as u64,
        });
    }
    for label in &args.outcome_labels {
        check_str("outcome label", label, LABEL_CAPACITY)?;
    }

    let (config, _) = pda::config_address(program_id)?;
    let (market, _) = pda::market_address(program_id, authority, market_id)?;
    let (vault, _) = pda::vault_address(program_id, &market)?;

    let mut w = Writer::new();
    w.write_u8(opcode::CREATE_MARKET);
    w.write_str(&args.title)?;
    w.write_str(&args.description)?;
    w.write_seq(&args.outcome_labels, |w, label| w.write_str(label))?;
    w.write_i64(args.resolution_deadline);
    w.write_u16(args.creator_fee_bps);
    w.write_option(args.fee_override.as_ref(), |w, v| {
        w.write_u16(*v);
        Ok(())
    })?;

    let mut accounts = vec![
        AccountMeta::new(config, false),
        AccountMeta::new(market, false),
        AccountMeta::new(vault, false),
        AccountMeta::new(*authority, true),
        AccountMeta::new_readonly(system_program::id(), false),
    ];
    if let Some(token) = token {
        let (vault_authority, _) = pda::vault_authority_address(program_id, &market)?;
        accounts.push(AccountMeta::new_readonly(token.mint, false));
        accounts.push(AccountMeta::new_readonly(vault_authority, false));
        accounts.push(AccountMeta::new_readonly(token.token_program, false));
    }
    Ok(Instruction {
        program_id: *program_id,
        accounts,
        data: w.finish(),
    })
}

/// Stakes `amount` on one outcome. Repeat bets on the same (market, owner,
/// outcome) accumulate into the same position account.
///
/// Accounts:
/// 0. `[writable]` Market PDA
/// 1. `[writable]` Position PDA
/// 2. `[signer, writable]` Bettor (payer, stake source on the native path)
/// 3. `[writable]` Vault PDA
/// 4. `[]` System program
///
/// Token path appends:
/// 5. `[]` Mint
/// 6. `[writable]` Bettor token account (ATA)
/// 7. `[]` Token program
pub fn place_bet(
    program_id: &Pubkey,
    market: &Pubkey,
    bettor: &Pubkey,
    outcome_index: u8,
    amount: u64,
    token: Option<&TokenInfo>,
) -> Result<Instruction> {
    check_outcome_index(outcome_index)?;
    let (position, _) = pda::position_address(program_id, market, bettor, outcome_index)?;
    let (vault, _) = pda::vault_address(program_id, market)?;

    let mut w = Writer::new();
    w.write_u8(opcode::PLACE_BET);
    w.write_u8(outcome_index);
    w.write_u64(amount);

    let mut accounts = vec![
        AccountMeta::new(*market, false),
        AccountMeta::new(position, false),
        AccountMeta::new(*bettor, true),
        AccountMeta::new(vault, false),
        AccountMeta::new_readonly(system_program::id(), false),
    ];
    if let Some(token) = token {
        accounts.push(AccountMeta::new_readonly(token.mint, false));
        accounts.push(AccountMeta::new(token.ata(bettor), false));
        accounts.push(AccountMeta::new_readonly(token.token_program, false));
    }
    Ok(Instruction {
        program_id: *program_id,
        accounts,
        data: w.finish(),
    })
}

/// Resolves an open market to `winning_outcome`. Starts the dispute window.
///
/// Accounts:
/// 0. `[writable]` Market PDA
/// 1. `[signer]` Authority
pub fn resolve_market(
    program_id: &Pubkey,
    market: &Pubkey,
    authority: &Pubkey,
    winning_outcome: u8,
) -> Result<Instruction> {
    check_outcome_index(winning_outcome)?;
    let mut w = Writer::new();
    w.write_u8(opcode::RESOLVE_MARKET);
    w.write_u8(winning_outcome);
    Ok(Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(*market, false),
            AccountMeta::new_readonly(*authority, true),
        ],
        data: w.finish(),
    })
}

/// Overrides the resolved outcome while the dispute window is open.
///
/// Accounts:
/// 0. `[writable]` Market PDA
/// 1. `[signer]` Authority
pub fn dispute_resolution(
    program_id: &Pubkey,
    market: &Pubkey,
    authority: &Pubkey,
    winning_outcome: u8,
) -> Result<Instruction> {
    check_outcome_index(winning_outcome)?;
    let mut w = Writer::new();
    w.write_u8(opcode::DISPUTE_RESOLUTION);
    w.write_u8(winning_outcome);
    Ok(Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(*market, false),
            AccountMeta::new_readonly(*authority, true),
        ],
        data: w.finish(),
    })
}

/// Closes the dispute window and pays the protocol and creator fee splits.
/// Permissionless crank.
///
/// Accounts:
/// 0. `[]` Config PDA
/// 1. `[writable]` Market PDA
/// 2. `[writable]` Vault PDA
/// 3. `[writable]` Treasury
/// 4. `[writable]` Creator
///
/// Token path appends:
/// 5. `[]` Mint
/// 6. `[]` Vault authority PDA
/// 7. `[writable]` Treasury token account (ATA)
/// 8. `[writable]` Creator token account (ATA)
/// 9. `[]` Token program
pub fn finalize_market(
    program_id: &Pubkey,
    market: &Pubkey,
    treasury: &Pubkey,
    creator: &Pubkey,
    token: Option<&TokenInfo>,
) -> Result<Instruction> {
    let (config, _) = pda::config_address(program_id)?;
    let (vault, _) = pda::vault_address(program_id, market)?;

    let mut w = Writer::new();
    w.write_u8(opcode::FINALIZE_MARKET);

    let mut accounts = vec![
        AccountMeta::new_readonly(config, false),
        AccountMeta::new(*market, false),
        AccountMeta::new(vault, false),
        AccountMeta::new(*treasury, false),
        AccountMeta::new(*creator, false),
    ];
    if let Some(token) = token {
        let (vault_authority, _) = pda::vault_authority_address(program_id, market)?;
        accounts.push(AccountMeta::new_readonly(token.mint, false));
        accounts.push(AccountMeta::new_readonly(vault_authority, false));
        accounts.push(AccountMeta::new(token.ata(treasury), false));
        accounts.push(AccountMeta::new(token.ata(creator), false));
        accounts.push(AccountMeta::new_readonly(token.token_program, false));
    }
    Ok(Instruction {
        program_id: *program_id,
        accounts,
        data: w.finish(),
    })
}

fn claim(
    op: u8,
    program_id: &Pubkey,
    market: &Pubkey,
    owner: &Pubkey,
    outcome_index: u8,
    token: Option<&TokenInfo>,
) -> Result<Instruction> {
    check_outcome_index(outcome_index)?;
    let (position, _) = pda::position_address(program_id, market, owner, outcome_index)?;
    let (vault, _) = pda::vault_address(program_id, market)?;
    let (vault_authority, _) = pda::vault_authority_address(program_id, market)?;

    let mut w = Writer::new();
    w.write_u8(op);

    let mut accounts = vec![
        AccountMeta::new(*market, false),
        AccountMeta::new(position, false),
        AccountMeta::new(*owner, true),
        AccountMeta::new(vault, false),
        AccountMeta::new_readonly(vault_authority, false),
        AccountMeta::new_readonly(system_program::id(), false),
    ];
    if let Some(token) = token {
        accounts.push(AccountMeta::new_readonly(token.mint, false));
        accounts.push(AccountMeta::new(token.ata(owner), false));
        accounts.push(AccountMeta::new_readonly(token.token_program, false));
    }
    Ok(Instruction {
        program_id: *program_id,
        accounts,
        data: w.finish(),
    })
}

/// Pays out a winning position after finalization and marks it claimed.
///
/// Accounts:
/// 0. `[writable]` Market PDA
/// 1. `[writable]` Position PDA
/// 2. `[signer, writable]` Owner
/// 3. `[writable]` Vault PDA
/// 4. `[]` Vault authority PDA
/// 5. `[]` System program
///
/// Token path appends:
/// 6. `[]` Mint
/// 7. `[writable]` Owner token account (ATA)
/// 8. `[]` Token program
pub fn claim_winnings(
    program_id: &Pubkey,
    market: &Pubkey,
    owner: &Pubkey,
    outcome_index: u8,
    token: Option<&TokenInfo>,
) -> Result<Instruction> {
    claim(
        opcode::CLAIM_WINNINGS,
        program_id,
        market,
        owner,
        outcome_index,
        token,
    )
}

/// Returns the original stake from a voided market. Same template as
/// [`claim_winnings`].
pub fn claim_refund(
    program_id: &Pubkey,
    market: &Pubkey,
    owner: &Pubkey,
    outcome_index: u8,
    token: Option<&TokenInfo>,
) -> Result<Instruction> {
    claim(
        opcode::CLAIM_REFUND,
        program_id,
        market,
        owner,
        outcome_index,
        token,
    )
}

/// Voids a market; all stakes become refundable.
///
/// Accounts:
/// 0. `[writable]` Market PDA
/// 1. `[signer]` Authority
pub fn void_market(program_id: &Pubkey, market: &Pubkey, authority: &Pubkey) -> Result<Instruction> {
    let mut w = Writer::new();
    w.write_u8(opcode::VOID_MARKET);
    Ok(Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(*market, false),
            AccountMeta::new_readonly(*authority, true),
        ],
        data: w.finish(),
    })
}

// ---------- Multisig governance ----------

/// Creates a multisig authority.
///
/// Accounts:
/// 0. `[writable]` Multisig PDA
/// 1. `[signer, writable]` Creator (payer)
/// 2. `[]` System program
pub fn create_multisig(
    program_id: &Pubkey,
    creator: &Pubkey,
    nonce: u64,
    threshold: u8,
    signers: &[Pubkey],
) -> Result<Instruction> {
    check_limit("signer count", signers.len() as u64, MAX_SIGNERS as u64)?;
    if signers.is_empty() {
        return Err(ProtocolError::RangeViolation {
            field: "signer count",
            value: 0,
            limit: 1,
        });
    }
    if threshold == 0 || threshold as usize > signers.len() {
        return Err(ProtocolError::RangeViolation {
            field: "threshold",
            value: threshold as u64,
            limit: signers.len() as u64,
        });
    }
    let (multisig, _) = pda::multisig_address(program_id, creator, nonce)?;

    let mut w = Writer::new();
    w.write_u8(opcode::CREATE_MULTISIG);
    w.write_u64(nonce);
    w.write_u8(threshold);
    w.write_seq(signers, |w, key| {
        w.write_pubkey(key);
        Ok(())
    })?;
    Ok(Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(multisig, false),
            AccountMeta::new(*creator, true),
            AccountMeta::new_readonly(system_program::id(), false),
        ],
        data: w.finish(),
    })
}

/// Opens a proposal carrying a governance action. `proposal_id` is the
/// multisig's current `proposal_count`.
///
/// Accounts:
/// 0. `[writable]` Multisig PDA
/// 1. `[writable]` Proposal PDA
/// 2. `[]` Market PDA
/// 3. `[signer, writable]` Proposer (payer, must be a signer slot)
/// 4. `[]` System program
pub fn create_proposal(
    program_id: &Pubkey,
    multisig: &Pubkey,
    market: &Pubkey,
    proposer: &Pubkey,
    proposal_id: u64,
    action: &GovernanceAction,
) -> Result<Instruction> {
    match action {
        GovernanceAction::ResolveMarket { winning_outcome } => {
            check_outcome_index(*winning_outcome)?
        }
        GovernanceAction::ChangeThreshold { new_threshold } => {
            check_limit("threshold", *new_threshold as u64, MAX_SIGNERS as u64)?
        }
        _ => {}
    }
    let (proposal, _) = pda::proposal_address(program_id, multisig, proposal_id)?;

    let mut w = Writer::new();
    w.write_u8(opcode::CREATE_PROPOSAL);
    action.encode(&mut w);
    Ok(Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(*multisig, false),
            AccountMeta::new(proposal, false),
            AccountMeta::new_readonly(*market, false),
            AccountMeta::new(*proposer, true),
            AccountMeta::new_readonly(system_program::id(), false),
        ],
        data: w.finish(),
    })
}

/// Records one signer's approval.
///
/// Accounts:
/// 0. `[]` Multisig PDA
/// 1. `[writable]` Proposal PDA
/// 2. `[signer]` Approving signer
pub fn approve_proposal(
    program_id: &Pubkey,
    multisig: &Pubkey,
    proposal: &Pubkey,
    signer: &Pubkey,
) -> Result<Instruction> {
    let mut w = Writer::new();
    w.write_u8(opcode::APPROVE_PROPOSAL);
    Ok(Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new_readonly(*multisig, false),
            AccountMeta::new(*proposal, false),
            AccountMeta::new_readonly(*signer, true),
        ],
        data: w.finish(),
    })
}

/// Executes a proposal once approvals reach the threshold.
///
/// Accounts:
/// 0. `[writable]` Multisig PDA
/// 1. `[writable]` Proposal PDA
/// 2. `[writable]` Market PDA
/// 3. `[signer]` Executor
pub fn execute_proposal(
    program_id: &Pubkey,
    multisig: &Pubkey,
    proposal: &Pubkey,
    market: &Pubkey,
    executor: &Pubkey,
) -> Result<Instruction> {
    let mut w = Writer::new();
    w.write_u8(opcode::EXECUTE_PROPOSAL);
    Ok(Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(*multisig, false),
            AccountMeta::new(*proposal, false),
            AccountMeta::new(*market, false),
            AccountMeta::new_readonly(*executor, true),
        ],
        data: w.finish(),
    })
}

// ---------- Token-2022 housekeeping ----------

/// Moves withheld transfer fees from the market vault back to the mint so
/// the mint authority can withdraw them. Token-2022 markets only;
/// permissionless.
///
/// Accounts:
/// 0. `[]` Market PDA
/// 1. `[writable]` Mint
/// 2. `[writable]` Vault token account
/// 3. `[]` Token-2022 program
pub fn harvest_withheld_fees(
    program_id: &Pubkey,
    market: &Pubkey,
    mint: &Pubkey,
) -> Result<Instruction> {
    let (vault, _) = pda::vault_address(program_id, market)?;
    let mut w = Writer::new();
    w.write_u8(opcode::HARVEST_WITHHELD_FEES);
    Ok(Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new_readonly(*market, false),
            AccountMeta::new(*mint, false),
            AccountMeta::new(vault, false),
            AccountMeta::new_readonly(spl_token_2022::id(), false),
        ],
        data: w.finish(),
    })
}
