//! Binary protocol layer for the Tote pari-mutuel prediction-market
//! program: address derivation, the wire codec, account decoders and
//! instruction builders.
//!
//! This crate is the byte-level contract with the on-chain program and
//! nothing else. It performs no I/O: callers fetch account bytes and submit
//! transactions through their own RPC stack, feed raw data in, and get typed
//! records or ready-to-send [`solana_sdk::instruction::Instruction`]s out.
//! Everything here is a pure function of its inputs, so concurrent use needs
//! no synchronization.

pub mod action;
pub mod codec;
pub mod constants;
pub mod error;
pub mod ix;
pub mod pda;
pub mod state;

pub use action::GovernanceAction;
pub use constants::PROGRAM_ID;
pub use error::{ProtocolError, Result};
pub use state::{
    Denomination, Market, MarketStatus, MultisigAuthority, MultisigProposal, ProgramAccount,
    ProtocolConfig, UserPosition,
};
