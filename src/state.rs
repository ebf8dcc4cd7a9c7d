//! Typed views over raw account bytes owned by the tote program.
//!
//! Every decode call produces a fresh snapshot; nothing here is cached or
//! written back. The program creates, mutates and closes these accounts;
//! the client only reads them, so layout drift on either side silently
//! corrupts pool balances and payouts. Offsets are documented field by field
//! in SPEC_FULL.md and pinned by the size constants in [`crate::constants`].

use serde::Serialize;
use solana_sdk::pubkey::Pubkey;
use tracing::debug;

use crate::action::GovernanceAction;
use crate::codec::Reader;
use crate::constants::{
    DESCRIPTION_CAPACITY, LABEL_CAPACITY, MARKET_DISCRIMINATOR, MAX_OUTCOMES, MAX_SIGNERS,
    MULTISIG_AUTHORITY_DISCRIMINATOR, MULTISIG_PROPOSAL_DISCRIMINATOR,
    PROTOCOL_CONFIG_DISCRIMINATOR, TITLE_CAPACITY, USER_POSITION_DISCRIMINATOR,
};
use crate::error::{ProtocolError, Result};

/// An account type persisted by the program: an 8-byte discriminator plus a
/// fixed field layout behind it.
pub trait ProgramAccount: Sized {
    const DISCRIMINATOR: [u8; 8];

    /// Decodes a full snapshot from raw account data. Trailing bytes beyond
    /// the last field are ignored (accounts may be allocated oversize).
    fn decode(data: &[u8]) -> Result<Self>;

    /// Cheap prefix test for bulk scans: foreign account types are skipped,
    /// not decoded and not errors.
    fn matches(data: &[u8]) -> bool {
        data.len() >= 8 && data[..8] == Self::DISCRIMINATOR
    }
}

fn expect_discriminator(r: &mut Reader<'_>, expected: [u8; 8]) -> Result<()> {
    let found: [u8; 8] = r.read_bytes(8)?.try_into().unwrap();
    if found != expected {
        return Err(ProtocolError::DiscriminatorMismatch { expected, found });
    }
    Ok(())
}

/// Fixed-capacity persisted string: `capacity` bytes of region followed by a
/// u16 length. A length past the capacity means the record is corrupt and
/// the decode fails rather than clamping.
fn read_fixed_str(r: &mut Reader<'_>, capacity: usize, field: &'static str) -> Result<String> {
    let region = r.read_bytes(capacity)?;
    let len = r.read_u16()? as usize;
    fixed_str(region, len, capacity, field)
}

fn fixed_str(region: &[u8], len: usize, capacity: usize, field: &'static str) -> Result<String> {
    if len > capacity {
        return Err(ProtocolError::RangeViolation {
            field,
            value: len as u64,
            limit: capacity as u64,
        });
    }
    String::from_utf8(region[..len].to_vec()).map_err(|_| ProtocolError::InvalidUtf8 { field })
}

// ---------- Market ----------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MarketStatus {
    Open,
    Resolved,
    Finalized,
    Voided,
}

impl MarketStatus {
    pub fn from_tag(tag: u8) -> Result<Self> {
        match tag {
            0 => Ok(MarketStatus::Open),
            1 => Ok(MarketStatus::Resolved),
            2 => Ok(MarketStatus::Finalized),
            3 => Ok(MarketStatus::Voided),
            tag => Err(ProtocolError::UnknownTag {
                kind: "market status",
                tag,
            }),
        }
    }

    /// Finalized and Voided markets never change state again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, MarketStatus::Finalized | MarketStatus::Voided)
    }
}

/// What the pools are denominated in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Denomination {
    /// Native lamports held directly in the vault PDA.
    Native,
    SplToken,
    Token2022,
}

impl Denomination {
    pub fn from_tag(tag: u8) -> Result<Self> {
        match tag {
            0 => Ok(Denomination::Native),
            1 => Ok(Denomination::SplToken),
            2 => Ok(Denomination::Token2022),
            tag => Err(ProtocolError::UnknownTag {
                kind: "denomination",
                tag,
            }),
        }
    }

    pub fn token_program(&self) -> Option<Pubkey> {
        match self {
            Denomination::Native => None,
            Denomination::SplToken => Some(spl_token::id()),
            Denomination::Token2022 => Some(spl_token_2022::id()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Market {
    pub market_id: u64,
    /// Resolution authority: a plain signer, or a multisig account when
    /// `authority_is_multisig` is set.
    pub authority: Pubkey,
    pub authority_is_multisig: bool,
    pub status: MarketStatus,
    pub resolution_deadline: i64,
    /// Unix timestamp of resolution, 0 while still open.
    pub resolved_at: i64,
    /// Meaningful only once the market has resolved.
    pub winning_outcome: u8,
    pub fee_bps: u16,
    pub fees_collected: u64,
    pub num_outcomes: u8,
    /// One pool per outcome, truncated to `num_outcomes`.
    pub outcome_pools: Vec<u64>,
    pub total_pool: u64,
    pub position_count: u64,
    pub denomination: Denomination,
    /// Zero for native-denominated markets.
    pub mint: Pubkey,
    pub mint_decimals: u8,
    /// Token-2022 transfer fee on the mint, if any, in basis points.
    pub transfer_fee_bps: u16,
    /// Zero address on markets written before the creator block existed.
    pub creator: Pubkey,
    pub creator_fee_bps: u16,
    pub title: String,
    pub description: String,
    pub outcome_labels: Vec<String>,
}

impl Market {
    pub fn outcome_pool(&self, outcome_index: u8) -> Option<u64> {
        self.outcome_pools.get(outcome_index as usize).copied()
    }

    pub fn is_betting_open(&self, now: i64) -> bool {
        self.status == MarketStatus::Open && now < self.resolution_deadline
    }
}

impl ProgramAccount for Market {
    const DISCRIMINATOR: [u8; 8] = MARKET_DISCRIMINATOR;

    fn decode(data: &[u8]) -> Result<Self> {
        let mut r = Reader::new(data);
        expect_discriminator(&mut r, Self::DISCRIMINATOR)?;

        let market_id = r.read_u64()?;
        let authority = r.read_pubkey()?;
        let authority_is_multisig = r.read_bool()?;
        let status = MarketStatus::from_tag(r.read_u8()?)?;
        let resolution_deadline = r.read_i64()?;
        let resolved_at = r.read_i64()?;
        let winning_outcome = r.read_u8()?;
        let fee_bps = r.read_u16()?;
        let fees_collected = r.read_u64()?;

        let num_outcomes = r.read_u8()?;
        if num_outcomes as usize > MAX_OUTCOMES {
            return Err(ProtocolError::RangeViolation {
                field: "num_outcomes",
                value: num_outcomes as u64,
                limit: MAX_OUTCOMES as u64,
            });
        }
        let mut outcome_pools = Vec::with_capacity(MAX_OUTCOMES);
        for _ in 0..MAX_OUTCOMES {
            outcome_pools.push(r.read_u64()?);
        }
        outcome_pools.truncate(num_outcomes as usize);

        let total_pool = r.read_u64()?;
        let position_count = r.read_u64()?;
        let denomination = Denomination::from_tag(r.read_u8()?)?;
        let mint = r.read_pubkey()?;
        let mint_decimals = r.read_u8()?;
        let transfer_fee_bps = r.read_u16()?;

        // Two historical layouts diverge here. The current one carries a
        // creator block (32 + 2 bytes) before the title; accounts written
        // before that deploy start the title region at this offset instead.
        // Probe: read the current layout; a zero title length with a
        // plausible length sitting at the legacy position means a legacy
        // account, so rewind and reread without the creator block.
        let pre_creator = r.position();
        let mut creator = r.read_pubkey()?;
        let mut creator_fee_bps = r.read_u16()?;
        let mut title_region = r.read_bytes(TITLE_CAPACITY)?;
        let mut title_len = r.read_u16()? as usize;
        if title_len == 0 {
            let after_current_title = r.position();
            r.seek(pre_creator + TITLE_CAPACITY)?;
            let legacy_len = r.read_u16()? as usize;
            if legacy_len != 0 && legacy_len <= TITLE_CAPACITY {
                debug!(market_id, "market account uses the pre-creator layout");
                r.seek(pre_creator)?;
                creator = Pubkey::default();
                creator_fee_bps = 0;
                title_region = r.read_bytes(TITLE_CAPACITY)?;
                title_len = r.read_u16()? as usize;
            } else {
                r.seek(after_current_title)?;
            }
        }
        let title = fixed_str(title_region, title_len, TITLE_CAPACITY, "title")?;

        let description = read_fixed_str(&mut r, DESCRIPTION_CAPACITY, "description")?;
        let mut outcome_labels = Vec::with_capacity(MAX_OUTCOMES);
        for _ in 0..MAX_OUTCOMES {
            outcome_labels.push(read_fixed_str(&mut r, LABEL_CAPACITY, "outcome label")?);
        }
        outcome_labels.truncate(num_outcomes as usize);

        Ok(Market {
            market_id,
            authority,
            authority_is_multisig,
            status,
            resolution_deadline,
            resolved_at,
            winning_outcome,
            fee_bps,
            fees_collected,
            num_outcomes,
            outcome_pools,
            total_pool,
            position_count,
            denomination,
            mint,
            mint_decimals,
            transfer_fee_bps,
            creator,
            creator_fee_bps,
            title,
            description,
            outcome_labels,
        })
    }
}

// ---------- UserPosition ----------

/// One stake on one outcome. Uniqueness per (market, owner, outcome) comes
/// from the position PDA, so repeated bets accumulate into `amount`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserPosition {
    pub market: Pubkey,
    pub owner: Pubkey,
    pub outcome_index: u8,
    pub amount: u64,
    pub claimed: bool,
    pub deposited_at: i64,
}

impl ProgramAccount for UserPosition {
    const DISCRIMINATOR: [u8; 8] = USER_POSITION_DISCRIMINATOR;

    fn decode(data: &[u8]) -> Result<Self> {
        let mut r = Reader::new(data);
        expect_discriminator(&mut r, Self::DISCRIMINATOR)?;
        Ok(UserPosition {
            market: r.read_pubkey()?,
            owner: r.read_pubkey()?,
            outcome_index: r.read_u8()?,
            amount: r.read_u64()?,
            claimed: r.read_bool()?,
            deposited_at: r.read_i64()?,
        })
    }
}

// ---------- ProtocolConfig ----------

/// Singleton at the `"protocol_config"` PDA.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProtocolConfig {
    pub admin: Pubkey,
    /// Default market fee; individual markets may override at creation.
    pub fee_bps: u16,
    pub treasury: Pubkey,
    pub paused: bool,
    pub markets_created: u64,
    pub total_volume: u64,
}

impl ProgramAccount for ProtocolConfig {
    const DISCRIMINATOR: [u8; 8] = PROTOCOL_CONFIG_DISCRIMINATOR;

    fn decode(data: &[u8]) -> Result<Self> {
        let mut r = Reader::new(data);
        expect_discriminator(&mut r, Self::DISCRIMINATOR)?;
        Ok(ProtocolConfig {
            admin: r.read_pubkey()?,
            fee_bps: r.read_u16()?,
            treasury: r.read_pubkey()?,
            paused: r.read_bool()?,
            markets_created: r.read_u64()?,
            total_volume: r.read_u64()?,
        })
    }
}

// ---------- MultisigAuthority ----------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MultisigAuthority {
    pub nonce: u64,
    pub threshold: u8,
    pub num_signers: u8,
    /// Active signers, truncated from the 11 physical slots.
    pub signers: Vec<Pubkey>,
    /// Monotonic; the next proposal takes this value as its id.
    pub proposal_count: u64,
}

impl ProgramAccount for MultisigAuthority {
    const DISCRIMINATOR: [u8; 8] = MULTISIG_AUTHORITY_DISCRIMINATOR;

    fn decode(data: &[u8]) -> Result<Self> {
        let mut r = Reader::new(data);
        expect_discriminator(&mut r, Self::DISCRIMINATOR)?;
        let nonce = r.read_u64()?;
        let threshold = r.read_u8()?;
        let num_signers = r.read_u8()?;
        if num_signers as usize > MAX_SIGNERS {
            return Err(ProtocolError::RangeViolation {
                field: "num_signers",
                value: num_signers as u64,
                limit: MAX_SIGNERS as u64,
            });
        }
        let mut signers = Vec::with_capacity(MAX_SIGNERS);
        for _ in 0..MAX_SIGNERS {
            signers.push(r.read_pubkey()?);
        }
        signers.truncate(num_signers as usize);
        let proposal_count = r.read_u64()?;
        Ok(MultisigAuthority {
            nonce,
            threshold,
            num_signers,
            signers,
            proposal_count,
        })
    }
}

// ---------- MultisigProposal ----------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MultisigProposal {
    pub multisig: Pubkey,
    pub market: Pubkey,
    pub proposal_id: u64,
    pub action: GovernanceAction,
    pub proposer: Pubkey,
    /// Bit i set means signer slot i has approved.
    pub approval_bitmap: u16,
    pub approval_count: u8,
    pub executed: bool,
    pub created_at: i64,
}

impl MultisigProposal {
    pub fn approved_by_slot(&self, slot: u8) -> bool {
        slot < MAX_SIGNERS as u8 && self.approval_bitmap & (1 << slot) != 0
    }
}

impl ProgramAccount for MultisigProposal {
    const DISCRIMINATOR: [u8; 8] = MULTISIG_PROPOSAL_DISCRIMINATOR;

    fn decode(data: &[u8]) -> Result<Self> {
        let mut r = Reader::new(data);
        expect_discriminator(&mut r, Self::DISCRIMINATOR)?;
        Ok(MultisigProposal {
            multisig: r.read_pubkey()?,
            market: r.read_pubkey()?,
            proposal_id: r.read_u64()?,
            // an unknown action tag is fatal here, not a skip: the account
            // already matched our discriminator
            action: GovernanceAction::decode(&mut r)?,
            proposer: r.read_pubkey()?,
            approval_bitmap: r.read_u16()?,
            approval_count: r.read_u8()?,
            executed: r.read_bool()?,
            created_at: r.read_i64()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_tags_are_closed() {
        assert_eq!(MarketStatus::from_tag(0).unwrap(), MarketStatus::Open);
        assert_eq!(MarketStatus::from_tag(3).unwrap(), MarketStatus::Voided);
        assert!(matches!(
            MarketStatus::from_tag(4),
            Err(ProtocolError::UnknownTag {
                kind: "market status",
                ..
            })
        ));
    }

    #[test]
    fn denomination_maps_to_token_programs() {
        assert_eq!(Denomination::Native.token_program(), None);
        assert_eq!(
            Denomination::SplToken.token_program(),
            Some(spl_token::id())
        );
        assert_eq!(
            Denomination::Token2022.token_program(),
            Some(spl_token_2022::id())
        );
        assert!(Denomination::from_tag(3).is_err());
    }
}
