//! Governance actions carried inside multisig proposals.
//!
//! Closed set: the tag byte selects both the variant and its field layout.
//! Adding a variant means appending a tag, updating both `encode` and
//! `decode`, and deploying the program first; the decoder treats any tag
//! past the known range as corruption, never as a default.

use serde::Serialize;
use solana_sdk::pubkey::Pubkey;

use crate::codec::{Reader, Writer};
use crate::error::{ProtocolError, Result};

pub const ACTION_TAG_RESOLVE_MARKET: u8 = 0;
pub const ACTION_TAG_VOID_MARKET: u8 = 1;
pub const ACTION_TAG_UPDATE_DEADLINE: u8 = 2;
pub const ACTION_TAG_UPDATE_FEE_BPS: u8 = 3;
pub const ACTION_TAG_ADD_SIGNER: u8 = 4;
pub const ACTION_TAG_REMOVE_SIGNER: u8 = 5;
pub const ACTION_TAG_CHANGE_THRESHOLD: u8 = 6;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum GovernanceAction {
    ResolveMarket { winning_outcome: u8 },
    VoidMarket,
    UpdateDeadline { new_deadline: i64 },
    UpdateFeeBps { new_fee_bps: u16 },
    AddSigner { new_signer: Pubkey },
    RemoveSigner { signer: Pubkey },
    ChangeThreshold { new_threshold: u8 },
}

impl GovernanceAction {
    pub fn tag(&self) -> u8 {
        match self {
            GovernanceAction::ResolveMarket { .. } => ACTION_TAG_RESOLVE_MARKET,
            GovernanceAction::VoidMarket => ACTION_TAG_VOID_MARKET,
            GovernanceAction::UpdateDeadline { .. } => ACTION_TAG_UPDATE_DEADLINE,
            GovernanceAction::UpdateFeeBps { .. } => ACTION_TAG_UPDATE_FEE_BPS,
            GovernanceAction::AddSigner { .. } => ACTION_TAG_ADD_SIGNER,
            GovernanceAction::RemoveSigner { .. } => ACTION_TAG_REMOVE_SIGNER,
            GovernanceAction::ChangeThreshold { .. } => ACTION_TAG_CHANGE_THRESHOLD,
        }
    }

    pub fn encode(&self, w: &mut Writer) {
        w.write_u8(self.tag());
        match self {
            GovernanceAction::ResolveMarket { winning_outcome } => w.write_u8(*winning_outcome),
            GovernanceAction::VoidMarket => {}
            GovernanceAction::UpdateDeadline { new_deadline } => w.write_i64(*new_deadline),
            GovernanceAction::UpdateFeeBps { new_fee_bps } => w.write_u16(*new_fee_bps),
            GovernanceAction::AddSigner { new_signer } => w.write_pubkey(new_signer),
            GovernanceAction::RemoveSigner { signer } => w.write_pubkey(signer),
            GovernanceAction::ChangeThreshold { new_threshold } => w.write_u8(*new_threshold),
        }
    }

    pub fn decode(r: &mut Reader<'_>) -> Result<Self> {
        let tag = r.read_u8()?;
        match tag {
            ACTION_TAG_RESOLVE_MARKET => Ok(GovernanceAction::ResolveMarket {
                winning_outcome: r.read_u8()?,
            }),
            ACTION_TAG_VOID_MARKET => Ok(GovernanceAction::VoidMarket),
            ACTION_TAG_UPDATE_DEADLINE => Ok(GovernanceAction::UpdateDeadline {
                new_deadline: r.read_i64()?,
            }),
            ACTION_TAG_UPDATE_FEE_BPS => Ok(GovernanceAction::UpdateFeeBps {
                new_fee_bps: r.read_u16()?,
            }),
            ACTION_TAG_ADD_SIGNER => Ok(GovernanceAction::AddSigner {
                new_signer: r.read_pubkey()?,
            }),
            ACTION_TAG_REMOVE_SIGNER => Ok(GovernanceAction::RemoveSigner {
                signer: r.read_pubkey()?,
            }),
            ACTION_TAG_CHANGE_THRESHOLD => Ok(GovernanceAction::ChangeThreshold {
                new_threshold: r.read_u8()?,
            }),
            tag => Err(ProtocolError::UnknownTag {
                kind: "governance action",
                tag,
            }),
        }
    }
}
