//! # Proposal Flows
//!
//! Real signatures posted to the coordination service stand-in.

#[cfg(test)]
mod tests {
    use crate::fixtures::{
        owner_a, owner_key, DeviceRequest, Harness, KeyDevice, RecordingTransport, COUNTER,
        OWNER_B, SAFE, SERVICE_URL,
    };
    use cosigner_core::config::{DeviceProtocol, SignerConfig};
    use cosigner_core::domain::batch::{decode_batch, MULTI_SEND_CALL_ONLY};
    use cosigner_core::domain::entities::{RunResult, SafeAccount, SignerSet, TransactionRequest};
    use cosigner_core::domain::signature::recover_owner;
    use cosigner_core::errors::{ConfigError, OrchestratorError};
    use cosigner_core::ports::inbound::OrchestratorApi;
    use cosigner_core::service::DeviceSigner;
    use cosigner_types::{BatchCall, Bytes, EcdsaSignature, Hash};
    use serde_json::Value;

    fn bump() -> TransactionRequest {
        TransactionRequest::call(COUNTER, Bytes::from(vec![0x01]))
    }

    fn signature_of(body: &Value) -> EcdsaSignature {
        let hex_sig = body["signature"].as_str().unwrap().trim_start_matches("0x");
        EcdsaSignature::from_slice(&hex::decode(hex_sig).unwrap()).unwrap()
    }

    fn digest_of(body: &Value) -> Hash {
        body["contractTransactionHash"].as_str().unwrap().parse().unwrap()
    }

    // =========================================================================
    // LOCAL KEY
    // =========================================================================

    #[tokio::test]
    async fn test_local_key_proposal_is_posted() {
        let mut harness = Harness::proposal(Box::new(owner_key()), RecordingTransport::accepting());
        harness.bind(&[owner_a()]);

        let result = harness.client.run(bump()).await.unwrap();

        let posted = harness.transport.posted();
        assert_eq!(posted.len(), 1);
        assert_eq!(
            posted[0].url,
            format!(
                "{SERVICE_URL}/api/v1/safes/{}/multisig-transactions/",
                SAFE.to_checksum()
            )
        );
        let body = &posted[0].body;
        assert_eq!(body["to"], COUNTER.to_checksum());
        assert_eq!(body["data"], "0x01");
        assert_eq!(body["operation"], 0);
        assert_eq!(body["nonce"], "0");
        assert_eq!(body["safeTxGas"], 0);
        assert_eq!(body["baseGas"], 0);
        assert_eq!(body["gasPrice"], 0);
        assert_eq!(body["sender"], owner_a().to_checksum());
        assert_eq!(digest_of(body), result.digest());

        let signature = signature_of(body);
        assert!(matches!(signature.v, 27 | 28));
        assert_eq!(recover_owner(result.digest(), &signature).unwrap(), owner_a());
    }

    #[tokio::test]
    async fn test_proposal_does_not_touch_chain_state() {
        let mut harness = Harness::proposal(Box::new(owner_key()), RecordingTransport::accepting());
        harness.bind(&[owner_a()]);

        harness.client.run(bump()).await.unwrap();

        assert_eq!(harness.chain.call_count(), 0);
        assert!(harness.nonce().is_zero());
    }

    #[tokio::test]
    async fn test_multi_signer_set_proposes_as_primary() {
        let mut harness = Harness::proposal(Box::new(owner_key()), RecordingTransport::accepting());
        harness.bind(&[owner_a(), OWNER_B]);

        let result = harness.client.run(bump()).await.unwrap();

        assert!(matches!(result, RunResult::Proposed { sender, .. } if sender == owner_a()));
        assert_eq!(harness.transport.posted().len(), 1);
    }

    // =========================================================================
    // REJECTION AND NONCES
    // =========================================================================

    #[tokio::test]
    async fn test_rejected_proposal_is_fatal_and_counted_once() {
        let mut harness = Harness::proposal(
            Box::new(owner_key()),
            RecordingTransport::answering(400, "{\"nonce\":[\"already used\"]}"),
        );
        harness.bind(&[owner_a()]);

        let err = harness.client.run(bump()).await.unwrap_err();

        match err {
            OrchestratorError::ProposalRejected { status, body } => {
                assert_eq!(status, 400);
                assert!(body.contains("already used"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        let instance = harness.client.instance().unwrap();
        assert_eq!(instance.attempts(), 1);
        assert_eq!(instance.pending_request().unwrap().nonce, "0");
        assert_eq!(harness.transport.posted().len(), 1);
    }

    #[tokio::test]
    async fn test_proposal_nonces_advance_per_attempt() {
        let mut harness = Harness::proposal(
            Box::new(owner_key()),
            RecordingTransport::answering(422, "rejected"),
        );
        harness.bind(&[owner_a()]);

        assert!(harness.client.run(bump()).await.is_err());
        assert!(harness.client.run(bump()).await.is_err());

        let nonces: Vec<Value> = harness
            .transport
            .posted()
            .into_iter()
            .map(|p| p.body["nonce"].clone())
            .collect();
        assert_eq!(nonces, vec![Value::from("0"), Value::from("1")]);
        assert_eq!(harness.client.instance().unwrap().attempts(), 2);
    }

    #[tokio::test]
    async fn test_unknown_network_is_a_configuration_error() {
        let mut harness = Harness::proposal(Box::new(owner_key()), RecordingTransport::accepting());
        harness
            .client
            .init(SafeAccount::new(31_337, SAFE), SignerSet::single(owner_a()));

        let err = harness.client.run(bump()).await.unwrap_err();

        assert!(matches!(
            err,
            OrchestratorError::Config(ConfigError::UnknownNetwork(31_337))
        ));
        assert!(harness.transport.posted().is_empty());
        assert_eq!(harness.client.instance().unwrap().attempts(), 0);

        let err = harness
            .client
            .propose_transactions(vec![COUNTER], vec![Bytes::new()])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            OrchestratorError::Config(ConfigError::UnknownNetwork(31_337))
        ));
        assert_eq!(harness.client.instance().unwrap().attempts(), 0);
    }

    // =========================================================================
    // DEVICE SIGNING
    // =========================================================================

    #[tokio::test]
    async fn test_device_raw_hash_shifts_v() {
        let device = KeyDevice::with_scalar(1);
        let log = device.request_log();
        let signer = DeviceSigner::new(device, SignerConfig::default()).unwrap();
        let mut harness = Harness::proposal(Box::new(signer), RecordingTransport::accepting());
        harness.bind(&[owner_a()]);

        let result = harness.client.run(bump()).await.unwrap();

        assert_eq!(*log.lock(), vec![DeviceRequest::Hash(result.digest())]);
        let signature = signature_of(&harness.transport.posted()[0].body);
        assert!(matches!(signature.v, 31 | 32));
        assert_eq!(recover_owner(result.digest(), &signature).unwrap(), owner_a());
    }

    #[tokio::test]
    async fn test_device_typed_data_keeps_v() {
        let device = KeyDevice::with_scalar(1);
        let log = device.request_log();
        let config = SignerConfig {
            protocol: DeviceProtocol::TypedData,
            ..SignerConfig::default()
        };
        let signer = DeviceSigner::new(device, config).unwrap();
        let mut harness = Harness::proposal(Box::new(signer), RecordingTransport::accepting());
        harness.bind(&[owner_a()]);

        let result = harness.client.run(bump()).await.unwrap();

        let requests = log.lock().clone();
        assert_eq!(requests.len(), 1);
        let DeviceRequest::TypedData(document) = &requests[0] else {
            panic!("expected a typed-data request");
        };
        assert_eq!(document["primaryType"], "SafeTx");
        assert_eq!(document["message"]["to"], COUNTER.to_checksum());

        let signature = signature_of(&harness.transport.posted()[0].body);
        assert!(matches!(signature.v, 27 | 28));
        assert_eq!(recover_owner(result.digest(), &signature).unwrap(), owner_a());
    }

    #[tokio::test]
    async fn test_device_for_wrong_owner_is_caught_before_posting() {
        let signer = DeviceSigner::new(KeyDevice::with_scalar(2), SignerConfig::default()).unwrap();
        let mut harness = Harness::proposal(Box::new(signer), RecordingTransport::accepting());
        harness.bind(&[owner_a()]);

        let err = harness.client.run(bump()).await.unwrap_err();

        assert!(matches!(err, OrchestratorError::Signature(_)));
        assert!(harness.transport.posted().is_empty());
    }

    // =========================================================================
    // BATCHES
    // =========================================================================

    #[tokio::test]
    async fn test_batch_proposal_targets_executor() {
        let mut harness = Harness::proposal(Box::new(owner_key()), RecordingTransport::accepting());
        harness.bind(&[owner_a()]);

        harness
            .client
            .propose_transactions(
                vec![COUNTER, SAFE],
                vec![Bytes::from(vec![0xaa]), Bytes::from(vec![0xbb, 0xcc])],
            )
            .await
            .unwrap();

        let body = harness.transport.posted()[0].body.clone();
        assert_eq!(body["to"], MULTI_SEND_CALL_ONLY.to_checksum());
        assert_eq!(body["operation"], 1);
        assert_eq!(body["value"], "0");
        let data = hex::decode(body["data"].as_str().unwrap().trim_start_matches("0x")).unwrap();
        assert_eq!(
            decode_batch(&data).unwrap(),
            vec![
                BatchCall::new(COUNTER, Bytes::from(vec![0xaa])),
                BatchCall::new(SAFE, Bytes::from(vec![0xbb, 0xcc])),
            ]
        );
    }
}
