//! Deterministic program-derived addresses for every account the tote
//! program owns.
//!
//! Each recipe below must match the on-chain seeds byte for byte: ASCII tag,
//! then the domain identifiers in order, numeric ids as little-endian.
//! Derivation walks the bump seed down from 255 and accepts the first
//! off-curve result, so the same inputs always yield the same `(address,
//! bump)` pair; the addresses are cacheable but never authoritative.

use solana_sdk::pubkey::Pubkey;

use crate::constants::{
    CONFIG_SEED, MARKET_SEED, MULTISIG_SEED, POSITION_SEED, PROPOSAL_SEED, VAULT_AUTHORITY_SEED,
    VAULT_SEED,
};
use crate::error::{ProtocolError, Result};

fn derive(seeds: &[&[u8]], program_id: &Pubkey) -> Result<(Pubkey, u8)> {
    Pubkey::try_find_program_address(seeds, program_id)
        .ok_or(ProtocolError::DerivationExhausted)
}

/// Singleton protocol config: `["protocol_config"]`.
pub fn config_address(program_id: &Pubkey) -> Result<(Pubkey, u8)> {
    derive(&[CONFIG_SEED], program_id)
}

/// `["market", authority, market_id le]`.
pub fn market_address(
    program_id: &Pubkey,
    authority: &Pubkey,
    market_id: u64,
) -> Result<(Pubkey, u8)> {
    derive(
        &[MARKET_SEED, authority.as_ref(), &market_id.to_le_bytes()],
        program_id,
    )
}

/// `["vault", market]`: holds the pooled stake (lamports for native
/// markets, the token account for SPL markets).
pub fn vault_address(program_id: &Pubkey, market: &Pubkey) -> Result<(Pubkey, u8)> {
    derive(&[VAULT_SEED, market.as_ref()], program_id)
}

/// `["vault_authority", market]`: signs token transfers out of the vault.
pub fn vault_authority_address(program_id: &Pubkey, market: &Pubkey) -> Result<(Pubkey, u8)> {
    derive(&[VAULT_AUTHORITY_SEED, market.as_ref()], program_id)
}

/// `["position", market, owner, outcome_index]`: one logical position per
/// (market, owner, outcome) triple; uniqueness is enforced by this address,
/// not by the codec.
pub fn position_address(
    program_id: &Pubkey,
    market: &Pubkey,
    owner: &Pubkey,
    outcome_index: u8,
) -> Result<(Pubkey, u8)> {
    derive(
        &[
            POSITION_SEED,
            market.as_ref(),
            owner.as_ref(),
            &[outcome_index],
        ],
        program_id,
    )
}

/// `["multisig", creator, nonce le]`.
pub fn multisig_address(
    program_id: &Pubkey,
    creator: &Pubkey,
    nonce: u64,
) -> Result<(Pubkey, u8)> {
    derive(
        &[MULTISIG_SEED, creator.as_ref(), &nonce.to_le_bytes()],
        program_id,
    )
}

/// `["proposal", multisig, proposal_id le]`.
pub fn proposal_address(
    program_id: &Pubkey,
    multisig: &Pubkey,
    proposal_id: u64,
) -> Result<(Pubkey, u8)> {
    derive(
        &[PROPOSAL_SEED, multisig.as_ref(), &proposal_id.to_le_bytes()],
        program_id,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::PROGRAM_ID;

    #[test]
    fn derivation_is_deterministic() {
        let authority = Pubkey::new_unique();
        let a = market_address(&PROGRAM_ID, &authority, 7).unwrap();
        let b = market_address(&PROGRAM_ID, &authority, 7).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn any_seed_change_moves_the_address() {
        let authority = Pubkey::new_unique();
        let base = market_address(&PROGRAM_ID, &authority, 7).unwrap().0;
        assert_ne!(
            base,
            market_address(&PROGRAM_ID, &authority, 8).unwrap().0
        );
        assert_ne!(
            base,
            market_address(&PROGRAM_ID, &Pubkey::new_unique(), 7).unwrap().0
        );
        assert_ne!(
            base,
            market_address(&Pubkey::new_unique(), &authority, 7).unwrap().0
        );
    }

    #[test]
    fn position_addresses_separate_outcomes() {
        let market = Pubkey::new_unique();
        let owner = Pubkey::new_unique();
        let a = position_address(&PROGRAM_ID, &market, &owner, 0).unwrap().0;
        let b = position_address(&PROGRAM_ID, &market, &owner, 1).unwrap().0;
        assert_ne!(a, b);
    }

    #[test]
    fn recipes_do_not_collide() {
        let market = Pubkey::new_unique();
        let vault = vault_address(&PROGRAM_ID, &market).unwrap().0;
        let vault_auth = vault_authority_address(&PROGRAM_ID, &market).unwrap().0;
        assert_ne!(vault, vault_auth);
    }
}
