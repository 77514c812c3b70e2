//! # Account Emulator
//!
//! Executes `execTransaction` against the in-memory host with the verifier's
//! rules: threshold-many signatures, strictly ascending owners, approved
//! hashes for `v = 1`, personal-message recovery for `v > 30`, and `GS013`
//! when the inner call fails with zero gas parameters.

use cosigner_core::adapters::{ContractHandler, InMemoryChain};
use cosigner_core::domain::abi::{
    decode, encode_call, u64_word, ParamKind, Token, ERROR_SELECTOR, EXEC_TRANSACTION_SELECTOR,
    MULTI_SEND_SELECTOR,
};
use cosigner_core::domain::abi::strip_selector;
use cosigner_core::domain::batch::decode_batch;
use cosigner_core::domain::digest::transaction_digest;
use cosigner_core::domain::entities::SafeAccount;
use cosigner_core::domain::layout::{
    approved_hash_slot, owner_slot, StorageKey, StorageValue, NONCE_SLOT, OWNER_COUNT_SLOT,
    SENTINEL_OWNER, THRESHOLD_SLOT,
};
use cosigner_core::domain::signature::recover_owner;
use cosigner_core::ports::outbound::{CallOutcome, CallRequest};
use cosigner_types::{
    Address, Bytes, EcdsaSignature, Operation, SafeTransaction, U256, SIGNATURE_LENGTH,
};

const EXEC_PARAMS: [ParamKind; 10] = [
    ParamKind::Address,
    ParamKind::Uint,
    ParamKind::Bytes,
    ParamKind::Uint,
    ParamKind::Uint,
    ParamKind::Uint,
    ParamKind::Uint,
    ParamKind::Address,
    ParamKind::Address,
    ParamKind::Bytes,
];

/// Revert data carrying `Error(message)`.
pub fn error_data(message: &str) -> Bytes {
    Bytes::from(encode_call(ERROR_SELECTOR, &[Token::String(message.to_string())]))
}

/// ABI-encoded `bool`.
pub fn bool_word(value: bool) -> Bytes {
    Bytes::from(u64_word(u64::from(value)).to_vec())
}

/// Multisig account living in an [`InMemoryChain`].
pub struct SafeEmulator {
    account: SafeAccount,
}

impl SafeEmulator {
    /// Writes owners, threshold and a zero nonce, then installs the account.
    pub fn deploy(chain: &InMemoryChain, account: SafeAccount, owners: &[Address], threshold: u64) {
        let address = account.address;
        let mut previous = SENTINEL_OWNER;
        for owner in owners {
            chain.set_storage_at(address, owner_slot(previous), StorageValue::from_address(*owner));
            previous = *owner;
        }
        chain.set_storage_at(
            address,
            owner_slot(previous),
            StorageValue::from_address(SENTINEL_OWNER),
        );
        chain.set_storage_at(
            address,
            StorageKey::at(OWNER_COUNT_SLOT),
            StorageValue::from_u256(U256::from(owners.len())),
        );
        chain.set_storage_at(
            address,
            StorageKey::at(THRESHOLD_SLOT),
            StorageValue::from_u256(U256::from(threshold)),
        );
        chain.install(address, Self { account });
    }

    /// Owners in linked-list order.
    pub fn owners(chain: &InMemoryChain, account: Address) -> Vec<Address> {
        let mut owners = Vec::new();
        let mut current = chain.storage_at(account, owner_slot(SENTINEL_OWNER)).to_address();
        while current != SENTINEL_OWNER && !current.is_zero() {
            owners.push(current);
            current = chain.storage_at(account, owner_slot(current)).to_address();
        }
        owners
    }

    fn is_owner(&self, chain: &InMemoryChain, owner: Address) -> bool {
        owner != SENTINEL_OWNER
            && !chain
                .storage_at(self.account.address, owner_slot(owner))
                .is_zero()
    }

    fn exec(&self, chain: &InMemoryChain, request: &CallRequest) -> Result<(), &'static str> {
        let address = self.account.address;
        let args = strip_selector(EXEC_TRANSACTION_SELECTOR, request.data.as_slice())
            .map_err(|_| "unknown selector")?;
        let mut tokens = decode(&EXEC_PARAMS, args)
            .map_err(|_| "malformed call")?
            .into_iter();
        let mut next = || tokens.next().ok_or("malformed call");

        let to = next()?.into_address().ok_or("malformed call")?;
        let value = next()?.into_uint().ok_or("malformed call")?;
        let data = Bytes::from(next()?.into_bytes().ok_or("malformed call")?);
        let operation = next()?
            .into_uint()
            .and_then(|op| u8::try_from(op.low_u64()).ok())
            .and_then(|op| Operation::from_u8(op).ok())
            .ok_or("malformed call")?;
        for _ in 0..3 {
            if !next()?.into_uint().ok_or("malformed call")?.is_zero() {
                return Err("gas parameters unsupported");
            }
        }
        next()?;
        next()?;
        let signatures = next()?.into_bytes().ok_or("malformed call")?;

        let nonce = chain.storage_at(address, StorageKey::at(NONCE_SLOT)).to_u256();
        let tx = SafeTransaction {
            to,
            value,
            data,
            operation,
            nonce,
        };
        let digest = transaction_digest(&self.account, &tx);
        chain.set_storage_at(
            address,
            StorageKey::at(NONCE_SLOT),
            StorageValue::from_u256(nonce + U256::one()),
        );

        let threshold = chain
            .storage_at(address, StorageKey::at(THRESHOLD_SLOT))
            .to_u256()
            .low_u64();
        if threshold == 0 {
            return Err("GS001");
        }
        let required = usize::try_from(threshold).map_err(|_| "GS020")? * SIGNATURE_LENGTH;
        if signatures.len() < required {
            return Err("GS020");
        }

        let mut last_owner = Address::ZERO;
        for chunk in signatures[..required].chunks_exact(SIGNATURE_LENGTH) {
            let signature = EcdsaSignature::from_slice(chunk).map_err(|_| "GS020")?;
            let owner = match signature.v {
                0 => return Err("GS021"),
                1 => {
                    let owner = Address::from_word(&signature.r);
                    if request.caller != owner
                        && chain
                            .storage_at(address, approved_hash_slot(owner, digest))
                            .is_zero()
                    {
                        return Err("GS025");
                    }
                    owner
                }
                _ => recover_owner(digest, &signature).map_err(|_| "GS026")?,
            };
            if owner <= last_owner || !self.is_owner(chain, owner) {
                return Err("GS026");
            }
            last_owner = owner;
        }

        let success = match operation {
            Operation::Call => chain
                .execute(&CallRequest {
                    caller: address,
                    to: tx.to,
                    value: tx.value,
                    data: tx.data.clone(),
                })
                .is_success(),
            Operation::DelegateCall => self.delegate(chain, &tx),
        };
        if !success {
            return Err("GS013");
        }
        Ok(())
    }

    /// Runs delegate-called code in the account's context. Only the batch
    /// executor is understood.
    fn delegate(&self, chain: &InMemoryChain, tx: &SafeTransaction) -> bool {
        if tx.data.selector() != Some(MULTI_SEND_SELECTOR) {
            return false;
        }
        let Ok(calls) = decode_batch(tx.data.as_slice()) else {
            return false;
        };
        calls.into_iter().all(|call| {
            chain
                .execute(&CallRequest {
                    caller: self.account.address,
                    to: call.to,
                    value: call.value,
                    data: call.data,
                })
                .is_success()
        })
    }
}

impl ContractHandler for SafeEmulator {
    fn handle(&self, chain: &InMemoryChain, request: &CallRequest) -> CallOutcome {
        match self.exec(chain, request) {
            Ok(()) => CallOutcome::Returned(bool_word(true)),
            Err(code) => CallOutcome::Reverted(error_data(code)),
        }
    }
}
