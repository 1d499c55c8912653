//! The EIP-2929 cold/warm journal gas handlers read and mutate.
//!
//! `spec.md` §3 describes `RunState` as carrying `accessedAddresses: set` and
//! `accessedStorage: map address -> set<32-byte-key>` directly; `SPEC_FULL.md`
//! §4.D turns that into a trait so the gas crate doesn't own the journal
//! (the embedding interpreter does, and must revert it on sub-call failure).

use std::collections::{HashMap, HashSet};

use revm_primitives::Address;

/// Read/write access to the per-message cold/warm sets.
///
/// Implementations must warm the transaction's sender and destination (and,
/// post-Shanghai, the `COINBASE`) before the first opcode runs; this crate
/// only charges for touches, it does not perform that pre-warming.
pub trait AccessListJournal {
    /// Marks `address` as accessed, returning `true` if it was already warm.
    fn warm_address(&mut self, address: Address) -> bool;

    /// Marks `(address, key)` as accessed, returning `true` if it was
    /// already warm. Implicitly warms `address` too, matching EIP-2929's
    /// requirement that an `SLOAD`/`SSTORE` warms both the slot and the
    /// account.
    fn warm_storage(&mut self, address: Address, key: revm_primitives::U256) -> bool;
}

/// A straightforward in-memory [`AccessListJournal`], suitable for a single
/// EVM message call. Callers reset or snapshot/restore this across sub-calls
/// per `spec.md` §5's "Shared-resource policy".
#[derive(Debug, Clone, Default)]
pub struct AccessList {
    addresses: HashSet<Address>,
    storage: HashMap<Address, HashSet<revm_primitives::U256>>,
}

impl AccessListJournal for AccessList {
    fn warm_address(&mut self, address: Address) -> bool {
        !self.addresses.insert(address)
    }

    fn warm_storage(&mut self, address: Address, key: revm_primitives::U256) -> bool {
        self.addresses.insert(address);
        let slots = self.storage.entry(address).or_default();
        !slots.insert(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use revm_primitives::U256;

    #[test]
    fn first_touch_is_cold_subsequent_are_warm() {
        let mut journal = AccessList::default();
        let addr = Address::ZERO;
        assert!(!journal.warm_address(addr), "first touch must be cold");
        assert!(journal.warm_address(addr), "second touch must be warm");

        let key = U256::from(1);
        assert!(!journal.warm_storage(addr, key));
        assert!(journal.warm_storage(addr, key));
        // a different key on the same address is still cold
        assert!(!journal.warm_storage(addr, U256::from(2)));
    }
}
