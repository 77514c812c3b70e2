//! # Properties
//!
//! Golden values and invariants that hold for any input.

#[cfg(test)]
mod tests {
    use cosigner_core::domain::digest::transaction_digest;
    use cosigner_core::domain::entities::SafeAccount;
    use cosigner_core::domain::signature::{aggregate, synthetic_approval};
    use cosigner_core::errors::SignatureError;
    use cosigner_types::{Address, Bytes, Hash, SafeTransaction, U256};
    use proptest::prelude::*;

    #[test]
    fn test_digest_golden_value() {
        let account = SafeAccount::new(1, Address::new([0xbb; 20]));
        let tx = SafeTransaction::call(Address::new([0xaa; 20]), Bytes::new()).with_nonce(U256::from(5));
        let expected: Hash = "0x8073b5e52fb8db5dfb7f7a08e25d86bee1ccb804a6b02869eaf053041c9016c8"
            .parse()
            .unwrap();
        assert_eq!(transaction_digest(&account, &tx), expected);
    }

    #[test]
    fn test_duplicate_signer_is_rejected() {
        let owner = Address::new([0x0b; 20]);
        let err = aggregate([
            (owner, synthetic_approval(owner)),
            (owner, synthetic_approval(owner)),
        ])
        .unwrap_err();
        assert_eq!(err, SignatureError::DuplicateSigner(owner));
    }

    proptest! {
        #[test]
        fn prop_digest_binds_network_and_nonce(chain_id in 1u64.., nonce in any::<u64>()) {
            let account = SafeAccount::new(chain_id, Address::new([0xbb; 20]));
            let tx = SafeTransaction::call(Address::new([0xaa; 20]), Bytes::new())
                .with_nonce(U256::from(nonce));
            let digest = transaction_digest(&account, &tx);

            prop_assert_eq!(digest, transaction_digest(&account, &tx));
            let next = tx.clone().with_nonce(U256::from(nonce) + U256::one());
            prop_assert_ne!(digest, transaction_digest(&account, &next));
            let other = SafeAccount::new(chain_id.wrapping_add(1).max(1), account.address);
            if other.chain_id != chain_id {
                prop_assert_ne!(digest, transaction_digest(&other, &tx));
            }
        }
    }
}
