//! The state/chain view the pool consults during admission, injected so
//! tests can supply fakes instead of a real trie — see `spec.md` §9's
//! "Global test doubles" design note.

use alloy_primitives::{Address, U256};

/// The subset of an account's state the pool cares about.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Account {
    /// The account's next expected transaction nonce.
    pub nonce: u64,
    /// The account's spendable balance.
    pub balance: U256,
}

/// Read-only chain context the pool consults on admission and ordering.
/// Implementations back this with a real state trie; tests back it with an
/// in-memory map.
pub trait StateProvider: Send + Sync + 'static {
    /// Returns the current on-chain state of `sender`, or the zero account
    /// if it has never been seen.
    fn account(&self, sender: Address) -> Account;

    /// The current block's base fee, or `None` pre-EIP-1559.
    fn base_fee(&self) -> Option<u64>;

    /// The gas limit of the block currently being built against.
    fn block_gas_limit(&self) -> u64;
}

/// An in-memory [`StateProvider`] for tests.
#[derive(Debug, Default)]
pub struct TestStateProvider {
    accounts: parking_lot::RwLock<rustc_hash::FxHashMap<Address, Account>>,
    base_fee: parking_lot::RwLock<Option<u64>>,
    block_gas_limit: parking_lot::RwLock<u64>,
}

impl TestStateProvider {
    /// Creates a provider with a default block gas limit of 30M and no base
    /// fee set.
    pub fn new() -> Self {
        Self { block_gas_limit: parking_lot::RwLock::new(30_000_000), ..Default::default() }
    }

    /// Sets `sender`'s on-chain nonce/balance.
    pub fn set_account(&self, sender: Address, account: Account) {
        self.accounts.write().insert(sender, account);
    }

    /// Sets the current block's base fee.
    pub fn set_base_fee(&self, base_fee: u64) {
        *self.base_fee.write() = Some(base_fee);
    }

    /// Sets the current block gas limit.
    pub fn set_block_gas_limit(&self, limit: u64) {
        *self.block_gas_limit.write() = limit;
    }
}

impl StateProvider for TestStateProvider {
    fn account(&self, sender: Address) -> Account {
        self.accounts.read().get(&sender).copied().unwrap_or_default()
    }

    fn base_fee(&self) -> Option<u64> {
        *self.base_fee.read()
    }

    fn block_gas_limit(&self) -> u64 {
        *self.block_gas_limit.read()
    }
}
