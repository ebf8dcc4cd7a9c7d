//! Account decoding against wire images built byte by byte, the way the
//! on-chain program lays them out.

#[cfg(test)]
mod tests {
    use solana_sdk::pubkey::Pubkey;

    use tote_protocol::constants::{
        MARKET_CREATOR_OFFSET, MARKET_DISCRIMINATOR, MARKET_LEGACY_LEN, MARKET_LEN, MAX_SIGNERS,
        MULTISIG_AUTHORITY_DISCRIMINATOR, MULTISIG_AUTHORITY_LEN,
        MULTISIG_PROPOSAL_DISCRIMINATOR, PROTOCOL_CONFIG_DISCRIMINATOR, PROTOCOL_CONFIG_LEN,
        USER_POSITION_DISCRIMINATOR, USER_POSITION_LEN,
    };
    use tote_protocol::{
        Denomination, GovernanceAction, Market, MarketStatus, MultisigAuthority,
        MultisigProposal, ProgramAccount, ProtocolConfig, ProtocolError, UserPosition,
    };

    fn push_u16(buf: &mut Vec<u8>, v: u16) {
        buf.extend_from_slice(&v.to_le_bytes());
    }
    fn push_u64(buf: &mut Vec<u8>, v: u64) {
        buf.extend_from_slice(&v.to_le_bytes());
    }
    fn push_i64(buf: &mut Vec<u8>, v: i64) {
        buf.extend_from_slice(&v.to_le_bytes());
    }
    fn push_pubkey(buf: &mut Vec<u8>, key: &Pubkey) {
        buf.extend_from_slice(key.as_ref());
    }
    /// Fixed region followed by the u16 length, as persisted strings are
    /// stored.
    fn push_fixed_str(buf: &mut Vec<u8>, s: &str, capacity: usize) {
        let mut region = vec![0u8; capacity];
        region[..s.len()].copy_from_slice(s.as_bytes());
        buf.extend_from_slice(&region);
        push_u16(buf, s.len() as u16);
    }

    fn authority() -> Pubkey {
        Pubkey::new_from_array([7u8; 32])
    }
    fn mint() -> Pubkey {
        Pubkey::new_from_array([9u8; 32])
    }
    fn creator() -> Pubkey {
        Pubkey::new_from_array([11u8; 32])
    }

    /// Everything up to the point where the two market layouts diverge.
    fn market_prefix() -> Vec<u8> {
        let mut b = Vec::new();
        b.extend_from_slice(&MARKET_DISCRIMINATOR);
        push_u64(&mut b, 42); // market_id
        push_pubkey(&mut b, &authority());
        b.push(0); // authority_is_multisig
        b.push(1); // status = Resolved
        push_i64(&mut b, 1_900_000_000); // resolution_deadline
        push_i64(&mut b, 1_899_000_000); // resolved_at
        b.push(1); // winning_outcome
        push_u16(&mut b, 300); // fee_bps
        push_u64(&mut b, 1_250); // fees_collected
        b.push(3); // num_outcomes
        for pool in [5u64, 10, 15, 0, 0, 0, 0, 0, 0, 0] {
            push_u64(&mut b, pool);
        }
        push_u64(&mut b, 30); // total_pool
        push_u64(&mut b, 4); // position_count
        b.push(1); // denomination = SplToken
        push_pubkey(&mut b, &mint());
        b.push(6); // mint_decimals
        push_u16(&mut b, 25); // transfer_fee_bps
        assert_eq!(b.len(), MARKET_CREATOR_OFFSET);
        b
    }

    fn push_market_strings(b: &mut Vec<u8>, title: &str, description: &str) {
        push_fixed_str(b, title, 128);
        push_fixed_str(b, description, 512);
        for label in ["YES", "NO", "DRAW", "", "", "", "", "", "", ""] {
            push_fixed_str(b, label, 64);
        }
    }

    fn current_market_bytes(title: &str) -> Vec<u8> {
        let mut b = market_prefix();
        push_pubkey(&mut b, &creator());
        push_u16(&mut b, 150); // creator_fee_bps
        push_market_strings(&mut b, title, "Settles at the final whistle");
        assert_eq!(b.len(), MARKET_LEN);
        b
    }

    fn legacy_market_bytes(title: &str, description: &str) -> Vec<u8> {
        let mut b = market_prefix();
        push_market_strings(&mut b, title, description);
        assert_eq!(b.len(), MARKET_LEGACY_LEN);
        b
    }

    #[test]
    fn market_current_layout_decodes() {
        let market = Market::decode(&current_market_bytes("World Cup winner")).unwrap();
        assert_eq!(market.market_id, 42);
        assert_eq!(market.authority, authority());
        assert!(!market.authority_is_multisig);
        assert_eq!(market.status, MarketStatus::Resolved);
        assert_eq!(market.winning_outcome, 1);
        assert_eq!(market.fee_bps, 300);
        assert_eq!(market.num_outcomes, 3);
        assert_eq!(market.outcome_pools, vec![5, 10, 15]);
        assert_eq!(market.total_pool, 30);
        assert_eq!(market.denomination, Denomination::SplToken);
        assert_eq!(market.mint, mint());
        assert_eq!(market.mint_decimals, 6);
        assert_eq!(market.transfer_fee_bps, 25);
        assert_eq!(market.creator, creator());
        assert_eq!(market.creator_fee_bps, 150);
        assert_eq!(market.title, "World Cup winner");
        assert_eq!(market.description, "Settles at the final whistle");
        assert_eq!(market.outcome_labels, vec!["YES", "NO", "DRAW"]);
    }

    #[test]
    fn market_legacy_layout_falls_back() {
        // legacy account: no creator block, title populated at the legacy
        // offset; the current-layout probe position reads zero because the
        // short description leaves those bytes blank
        let data = legacy_market_bytes("World Cup winner", "Final whistle");
        let market = Market::decode(&data).unwrap();
        assert_eq!(market.creator, Pubkey::default());
        assert_eq!(market.creator_fee_bps, 0);
        assert_eq!(market.title, "World Cup winner");
        assert_eq!(market.description, "Final whistle");
        assert_eq!(market.outcome_labels, vec!["YES", "NO", "DRAW"]);
        // fields before the divergence point decode identically
        assert_eq!(market.market_id, 42);
        assert_eq!(market.outcome_pools, vec![5, 10, 15]);
    }

    #[test]
    fn market_pools_and_labels_truncate_to_num_outcomes() {
        let market = Market::decode(&current_market_bytes("t")).unwrap();
        assert_eq!(market.outcome_pools.len(), 3);
        assert_eq!(market.outcome_labels.len(), 3);
        assert_eq!(market.outcome_pool(2), Some(15));
        assert_eq!(market.outcome_pool(3), None);
    }

    #[test]
    fn market_num_outcomes_over_capacity_fails() {
        let mut data = current_market_bytes("t");
        data[77] = 11;
        assert!(matches!(
            Market::decode(&data),
            Err(ProtocolError::RangeViolation {
                field: "num_outcomes",
                value: 11,
                ..
            })
        ));
    }

    #[test]
    fn market_unknown_status_fails() {
        let mut data = current_market_bytes("t");
        data[49] = 9;
        assert!(matches!(
            Market::decode(&data),
            Err(ProtocolError::UnknownTag {
                kind: "market status",
                tag: 9
            })
        ));
    }

    #[test]
    fn market_title_length_over_capacity_fails() {
        let mut data = current_market_bytes("t");
        // corrupt the current-layout title length field
        let off = MARKET_CREATOR_OFFSET + 34 + 128;
        data[off..off + 2].copy_from_slice(&200u16.to_le_bytes());
        assert!(matches!(
            Market::decode(&data),
            Err(ProtocolError::RangeViolation { field: "title", .. })
        ));
    }

    #[test]
    fn discriminator_is_enforced() {
        let mut data = current_market_bytes("t");
        data[0] ^= 0xff;
        let err = Market::decode(&data).unwrap_err();
        assert!(err.is_foreign_account());
        assert!(!Market::matches(&data));

        // the right discriminator on the wrong decoder is also a mismatch
        let data = current_market_bytes("t");
        assert!(matches!(
            UserPosition::decode(&data),
            Err(ProtocolError::DiscriminatorMismatch { .. })
        ));
        assert!(!UserPosition::matches(&data));
        assert!(Market::matches(&data));
    }

    #[test]
    fn truncated_market_is_underrun() {
        let data = current_market_bytes("t");
        assert!(matches!(
            Market::decode(&data[..200]),
            Err(ProtocolError::BufferUnderrun { .. })
        ));
    }

    #[test]
    fn trailing_bytes_are_tolerated() {
        let mut data = current_market_bytes("World Cup winner");
        data.extend_from_slice(&[0u8; 64]);
        assert!(Market::decode(&data).is_ok());
    }

    #[test]
    fn user_position_round_trip() {
        let market = Pubkey::new_unique();
        let owner = Pubkey::new_unique();
        let mut b = Vec::new();
        b.extend_from_slice(&USER_POSITION_DISCRIMINATOR);
        push_pubkey(&mut b, &market);
        push_pubkey(&mut b, &owner);
        b.push(2); // outcome_index
        push_u64(&mut b, 1_000_000);
        b.push(0); // claimed
        push_i64(&mut b, 1_890_000_000);
        assert_eq!(b.len(), USER_POSITION_LEN);

        let position = UserPosition::decode(&b).unwrap();
        assert_eq!(position.market, market);
        assert_eq!(position.owner, owner);
        assert_eq!(position.outcome_index, 2);
        assert_eq!(position.amount, 1_000_000);
        assert!(!position.claimed);
        assert_eq!(position.deposited_at, 1_890_000_000);
    }

    #[test]
    fn protocol_config_round_trip() {
        let admin = Pubkey::new_unique();
        let treasury = Pubkey::new_unique();
        let mut b = Vec::new();
        b.extend_from_slice(&PROTOCOL_CONFIG_DISCRIMINATOR);
        push_pubkey(&mut b, &admin);
        push_u16(&mut b, 250);
        push_pubkey(&mut b, &treasury);
        b.push(1); // paused
        push_u64(&mut b, 17);
        push_u64(&mut b, 9_999_999);
        assert_eq!(b.len(), PROTOCOL_CONFIG_LEN);

        let config = ProtocolConfig::decode(&b).unwrap();
        assert_eq!(config.admin, admin);
        assert_eq!(config.fee_bps, 250);
        assert_eq!(config.treasury, treasury);
        assert!(config.paused);
        assert_eq!(config.markets_created, 17);
        assert_eq!(config.total_volume, 9_999_999);
    }

    #[test]
    fn multisig_authority_truncates_signers() {
        let signers: Vec<Pubkey> = (0..4).map(|_| Pubkey::new_unique()).collect();
        let mut b = Vec::new();
        b.extend_from_slice(&MULTISIG_AUTHORITY_DISCRIMINATOR);
        push_u64(&mut b, 3); // nonce
        b.push(2); // threshold
        b.push(4); // num_signers
        for i in 0..MAX_SIGNERS {
            push_pubkey(&mut b, signers.get(i).unwrap_or(&Pubkey::default()));
        }
        push_u64(&mut b, 12); // proposal_count
        assert_eq!(b.len(), MULTISIG_AUTHORITY_LEN);

        let multisig = MultisigAuthority::decode(&b).unwrap();
        assert_eq!(multisig.nonce, 3);
        assert_eq!(multisig.threshold, 2);
        assert_eq!(multisig.num_signers, 4);
        assert_eq!(multisig.signers, signers);
        assert_eq!(multisig.proposal_count, 12);
    }

    #[test]
    fn multisig_authority_signer_count_over_capacity_fails() {
        let mut b = Vec::new();
        b.extend_from_slice(&MULTISIG_AUTHORITY_DISCRIMINATOR);
        push_u64(&mut b, 0);
        b.push(1);
        b.push(12); // num_signers over the 11 slots
        for _ in 0..MAX_SIGNERS {
            push_pubkey(&mut b, &Pubkey::default());
        }
        push_u64(&mut b, 0);
        assert!(matches!(
            MultisigAuthority::decode(&b),
            Err(ProtocolError::RangeViolation {
                field: "num_signers",
                value: 12,
                ..
            })
        ));
    }

    fn proposal_bytes(action_bytes: &[u8]) -> (Vec<u8>, Pubkey, Pubkey, Pubkey) {
        let multisig = Pubkey::new_unique();
        let market = Pubkey::new_unique();
        let proposer = Pubkey::new_unique();
        let mut b = Vec::new();
        b.extend_from_slice(&MULTISIG_PROPOSAL_DISCRIMINATOR);
        push_pubkey(&mut b, &multisig);
        push_pubkey(&mut b, &market);
        push_u64(&mut b, 5); // proposal_id
        b.extend_from_slice(action_bytes);
        push_pubkey(&mut b, &proposer);
        push_u16(&mut b, 0b0000_0101); // approval_bitmap: slots 0 and 2
        b.push(2); // approval_count
        b.push(0); // executed
        push_i64(&mut b, 1_880_000_000);
        (b, multisig, market, proposer)
    }

    #[test]
    fn multisig_proposal_decodes_action() {
        let (b, multisig, market, proposer) = proposal_bytes(&[2, 0, 202, 154, 59, 0, 0, 0, 0]);
        let proposal = MultisigProposal::decode(&b).unwrap();
        assert_eq!(proposal.multisig, multisig);
        assert_eq!(proposal.market, market);
        assert_eq!(proposal.proposal_id, 5);
        assert_eq!(
            proposal.action,
            GovernanceAction::UpdateDeadline {
                new_deadline: 1_000_000_000
            }
        );
        assert_eq!(proposal.proposer, proposer);
        assert_eq!(proposal.approval_count, 2);
        assert!(proposal.approved_by_slot(0));
        assert!(!proposal.approved_by_slot(1));
        assert!(proposal.approved_by_slot(2));
        assert!(!proposal.executed);
        assert_eq!(proposal.created_at, 1_880_000_000);
    }

    #[test]
    fn multisig_proposal_unknown_action_tag_is_fatal() {
        let (b, ..) = proposal_bytes(&[9, 0, 0, 0, 0, 0, 0, 0, 0]);
        assert!(matches!(
            MultisigProposal::decode(&b),
            Err(ProtocolError::UnknownTag {
                kind: "governance action",
                tag: 9
            })
        ));
    }
}
