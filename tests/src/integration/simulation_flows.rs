//! # Simulation Flows
//!
//! Runs against the 2-of-3 account with synthetic approvals.

#[cfg(test)]
mod tests {
    use crate::fixtures::{
        owner_a, Counter, Harness, COUNTER, OWNER_B, OWNER_C, REVERTER, SAFE, STRANGER,
    };
    use cosigner_core::domain::entities::{RunResult, SimulationOutcome, TransactionRequest};
    use cosigner_core::domain::layout::approved_hash_slot;
    use cosigner_core::domain::revert::RevertReason;
    use cosigner_core::errors::{ConfigError, OrchestratorError};
    use cosigner_core::ports::inbound::OrchestratorApi;
    use cosigner_core::config::RunToggles;
    use cosigner_types::{Bytes, Operation, U256};

    fn bump() -> TransactionRequest {
        TransactionRequest::call(COUNTER, Bytes::from(vec![0x01]))
    }

    // =========================================================================
    // THRESHOLD
    // =========================================================================

    #[tokio::test]
    async fn test_two_of_three_succeeds() {
        let mut harness = Harness::simulation();
        harness.bind(&[owner_a(), OWNER_B]);

        let result = harness.client.run(bump()).await.unwrap();

        assert!(result.outcome().unwrap().is_success());
        assert_eq!(result.nonce(), U256::zero());
        assert_eq!(Counter::count(&harness.chain, COUNTER), U256::one());
        assert_eq!(Counter::last_caller(&harness.chain, COUNTER), SAFE);
        assert_eq!(harness.nonce(), U256::one());
    }

    #[tokio::test]
    async fn test_approval_records_do_not_outlive_the_attempt() {
        let mut harness = Harness::simulation();
        harness.bind(&[OWNER_C, OWNER_B]);

        let result = harness.client.run(bump()).await.unwrap();

        for owner in [OWNER_B, OWNER_C] {
            assert!(harness
                .chain
                .storage_at(SAFE, approved_hash_slot(owner, result.digest()))
                .is_zero());
        }
    }

    #[tokio::test]
    async fn test_single_signer_below_threshold_is_rejected() {
        let mut harness = Harness::simulation();
        harness.bind(&[owner_a()]);

        let result = harness.client.run(bump()).await.unwrap();

        assert_eq!(
            result.outcome(),
            Some(&SimulationOutcome::VerifierRejected {
                code: "GS020".into()
            })
        );
        assert_eq!(Counter::count(&harness.chain, COUNTER), U256::zero());
        assert_eq!(harness.nonce(), U256::zero());
    }

    #[tokio::test]
    async fn test_non_owner_is_rejected() {
        let mut harness = Harness::simulation();
        harness.bind(&[OWNER_B, STRANGER]);

        let result = harness.client.run(bump()).await.unwrap();

        assert_eq!(
            result.outcome(),
            Some(&SimulationOutcome::VerifierRejected {
                code: "GS026".into()
            })
        );
    }

    // =========================================================================
    // NONCES
    // =========================================================================

    #[tokio::test]
    async fn test_consecutive_simulations_follow_on_chain_nonce() {
        let mut harness = Harness::simulation();
        harness.bind(&[OWNER_B, OWNER_C]);

        let first = harness.client.run(bump()).await.unwrap();
        let second = harness.client.run(bump()).await.unwrap();

        assert_eq!(first.nonce(), U256::zero());
        assert_eq!(second.nonce(), U256::one());
        assert_ne!(first.digest(), second.digest());
        assert_eq!(Counter::count(&harness.chain, COUNTER), U256::from(2));
        assert_eq!(harness.client.instance().unwrap().attempts(), 2);
    }

    // =========================================================================
    // REVERTS
    // =========================================================================

    #[tokio::test]
    async fn test_inner_failure_surfaces_account_code() {
        let mut harness = Harness::simulation();
        harness.bind(&[OWNER_B, OWNER_C]);

        let result = harness
            .client
            .run(TransactionRequest::call(REVERTER, Bytes::new()))
            .await
            .unwrap();

        let Some(SimulationOutcome::Reverted { reason }) = result.outcome() else {
            panic!("expected a revert, got {result:?}");
        };
        assert_eq!(reason, &RevertReason::Error("GS013".into()));
        assert!(reason.hint().is_some());
        assert_eq!(harness.nonce(), U256::zero());
    }

    #[tokio::test]
    async fn test_debug_bypass_surfaces_target_reason() {
        let mut harness = Harness::simulation_with_bypass();
        harness.bind(&[OWNER_B, OWNER_C]);

        let result = harness
            .client
            .run(TransactionRequest::call(REVERTER, Bytes::new()))
            .await
            .unwrap();

        assert_eq!(
            result.outcome(),
            Some(&SimulationOutcome::Reverted {
                reason: RevertReason::Error("boom".into())
            })
        );
        let calls = harness.chain.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].caller, SAFE);
    }

    // =========================================================================
    // BATCHES
    // =========================================================================

    #[tokio::test]
    async fn test_batch_preserves_account_as_caller() {
        let mut harness = Harness::simulation();
        harness.bind(&[OWNER_B, OWNER_C]);

        let result = harness
            .client
            .propose_transactions(
                vec![COUNTER, COUNTER, COUNTER],
                vec![Bytes::new(), Bytes::from(vec![1]), Bytes::from(vec![2])],
            )
            .await
            .unwrap();

        assert!(matches!(
            result,
            RunResult::Simulated {
                outcome: SimulationOutcome::Success { .. },
                ..
            }
        ));
        assert_eq!(Counter::count(&harness.chain, COUNTER), U256::from(3));
        assert_eq!(Counter::last_caller(&harness.chain, COUNTER), SAFE);
    }

    #[tokio::test]
    async fn test_batch_with_failing_call_reverts_everything() {
        let mut harness = Harness::simulation();
        harness.bind(&[OWNER_B, OWNER_C]);

        let result = harness
            .client
            .propose_transactions(vec![COUNTER, REVERTER], vec![Bytes::new(), Bytes::new()])
            .await
            .unwrap();

        assert!(!result.outcome().unwrap().is_success());
        assert_eq!(Counter::count(&harness.chain, COUNTER), U256::zero());
    }

    #[tokio::test]
    async fn test_bypass_ignored_for_batches() {
        let mut harness = Harness::simulation_with_bypass();
        harness.bind(&[OWNER_B, OWNER_C]);

        let result = harness
            .client
            .propose_transactions(vec![COUNTER], vec![Bytes::new()])
            .await
            .unwrap();

        assert!(result.outcome().unwrap().is_success());
        assert_eq!(harness.chain.calls()[0].to, SAFE);
    }

    #[tokio::test]
    async fn test_delegate_call_to_unknown_code_fails() {
        let mut harness = Harness::simulation();
        harness.bind(&[OWNER_B, OWNER_C]);

        let result = harness
            .client
            .propose_transaction(COUNTER, U256::zero(), Bytes::new(), Operation::DelegateCall)
            .await
            .unwrap();

        assert_eq!(
            result.outcome(),
            Some(&SimulationOutcome::Reverted {
                reason: RevertReason::Error("GS013".into())
            })
        );
    }

    // =========================================================================
    // MODE
    // =========================================================================

    #[tokio::test]
    async fn test_undetermined_mode_is_fatal() {
        let mut harness = Harness::with_toggles(RunToggles::default());
        harness.bind(&[OWNER_B]);

        let err = harness.client.run(bump()).await.unwrap_err();
        assert!(matches!(
            err,
            OrchestratorError::Config(ConfigError::ModeUndetermined { .. })
        ));
        assert_eq!(harness.client.instance().unwrap().attempts(), 0);
    }
}
