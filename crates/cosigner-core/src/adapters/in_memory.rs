//! # In-Memory Chain Host
//!
//! A mutable state snapshot for simulation and tests. Contracts are modelled
//! as [`ContractHandler`]s registered at an address; everything else behaves
//! like an account without code.
//!
//! Calls are atomic: if a handler reverts, every storage and code write made
//! during that call (including nested calls) is rolled back.

use crate::domain::layout::{StorageKey, StorageValue};
use crate::errors::HostError;
use crate::ports::outbound::{CallHost, CallOutcome, CallRequest, StateStore};
use async_trait::async_trait;
use cosigner_types::{Address, Bytes};
use parking_lot::{Mutex, RwLock};
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::Arc;

/// Behaviour of a contract living in an [`InMemoryChain`].
pub trait ContractHandler: Send + Sync {
    /// Handles a call addressed to this contract. Nested calls go through
    /// [`InMemoryChain::execute`].
    fn handle(&self, chain: &InMemoryChain, request: &CallRequest) -> CallOutcome;
}

impl<F> ContractHandler for F
where
    F: Fn(&InMemoryChain, &CallRequest) -> CallOutcome + Send + Sync,
{
    fn handle(&self, chain: &InMemoryChain, request: &CallRequest) -> CallOutcome {
        self(chain, request)
    }
}

type Storage = HashMap<(Address, StorageKey), StorageValue>;

/// Most recent calls kept in the call log; older entries are dropped.
pub const CALL_LOG_CAPACITY: usize = 1024;

/// In-memory state for simulation and testing.
#[derive(Default)]
pub struct InMemoryChain {
    /// Storage slots.
    storage: RwLock<Storage>,
    /// Contract code.
    code: RwLock<HashMap<Address, Bytes>>,
    /// Contract behaviour.
    handlers: RwLock<HashMap<Address, Arc<dyn ContractHandler>>>,
    /// Recent calls, outermost first, at most [`CALL_LOG_CAPACITY`].
    calls: Mutex<VecDeque<CallRequest>>,
}

impl fmt::Debug for InMemoryChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryChain")
            .field("slots", &self.storage.read().len())
            .field("contracts", &self.code.read().len())
            .field("calls", &self.calls.lock().len())
            .finish()
    }
}

impl InMemoryChain {
    /// Create a new empty state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set code for an address.
    pub fn set_code(&self, address: Address, code: Bytes) {
        self.code.write().insert(address, code);
    }

    /// Registers a contract: placeholder code plus its behaviour.
    pub fn install<H: ContractHandler + 'static>(&self, address: Address, handler: H) {
        let mut code = self.code.write();
        code.entry(address)
            .or_insert_with(|| Bytes::from(vec![0xfe]));
        self.handlers.write().insert(address, Arc::new(handler));
    }

    /// Code at `address` (empty for none).
    #[must_use]
    pub fn code_at(&self, address: Address) -> Bytes {
        self.code.read().get(&address).cloned().unwrap_or_default()
    }

    /// Storage value at `slot`.
    #[must_use]
    pub fn storage_at(&self, address: Address, slot: StorageKey) -> StorageValue {
        self.storage
            .read()
            .get(&(address, slot))
            .copied()
            .unwrap_or(StorageValue::ZERO)
    }

    /// Set storage value. Zero values remove the slot.
    pub fn set_storage_at(&self, address: Address, slot: StorageKey, value: StorageValue) {
        let mut storage = self.storage.write();
        if value.is_zero() {
            storage.remove(&(address, slot));
        } else {
            storage.insert((address, slot), value);
        }
    }

    /// Number of non-zero slots of `address`.
    #[must_use]
    pub fn slot_count(&self, address: Address) -> usize {
        self.storage
            .read()
            .keys()
            .filter(|(owner, _)| *owner == address)
            .count()
    }

    /// Executes one call synchronously, rolling back state on revert.
    pub fn execute(&self, request: &CallRequest) -> CallOutcome {
        {
            let mut calls = self.calls.lock();
            if calls.len() == CALL_LOG_CAPACITY {
                calls.pop_front();
            }
            calls.push_back(request.clone());
        }

        let handler = self.handlers.read().get(&request.to).cloned();
        let Some(handler) = handler else {
            return CallOutcome::Returned(Bytes::new());
        };

        let storage_snapshot = self.storage.read().clone();
        let code_snapshot = self.code.read().clone();

        let outcome = handler.handle(self, request);
        if !outcome.is_success() {
            *self.storage.write() = storage_snapshot;
            *self.code.write() = code_snapshot;
        }
        outcome
    }

    /// Logged calls, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<CallRequest> {
        self.calls.lock().iter().cloned().collect()
    }

    /// Empties the call log, returning its entries in order.
    pub fn drain_calls(&self) -> Vec<CallRequest> {
        self.calls.lock().drain(..).collect()
    }

    /// Number of logged calls.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl StateStore for InMemoryChain {
    async fn storage(&self, address: Address, slot: StorageKey) -> Result<StorageValue, HostError> {
        Ok(self.storage_at(address, slot))
    }

    async fn set_storage(
        &self,
        address: Address,
        slot: StorageKey,
        value: StorageValue,
    ) -> Result<(), HostError> {
        self.set_storage_at(address, slot, value);
        Ok(())
    }

    async fn code(&self, address: Address) -> Result<Bytes, HostError> {
        Ok(self.code_at(address))
    }
}

#[async_trait]
impl CallHost for InMemoryChain {
    async fn call_as(&self, request: CallRequest) -> Result<CallOutcome, HostError> {
        Ok(self.execute(&request))
    }
}

// =============================================================================
// TESTS
// =============================================================================
