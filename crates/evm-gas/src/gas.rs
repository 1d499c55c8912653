//! Running gas totals for one EVM message call.
//!
//! Grounded on `revm-interpreter`'s `gas::Gas` struct: a limit, a running
//! used total, a separate memory-expansion total (so `memory_gas` can be
//! recomputed idempotently), and a signed refund counter.

use crate::error::{GasError, GasResult};

/// Tracks gas consumption for a single call frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gas {
    /// The gas limit for this call frame.
    limit: u64,
    /// Total gas used so far, memory expansion included.
    used: u64,
    /// Gas spent on memory expansion alone, tracked separately so
    /// `record_memory` can charge only the marginal cost of growing further.
    memory: u64,
    /// Accumulated refund (EIP-3529 clamps this to `used / 5` at the end of
    /// the transaction; that clamp is the caller's responsibility).
    refunded: i64,
}

impl Gas {
    /// Creates a fresh tracker with `limit` gas available and nothing spent.
    pub const fn new(limit: u64) -> Self {
        Self {
            limit,
            used: 0,
            memory: 0,
            refunded: 0,
        }
    }

    /// The frame's gas limit.
    pub const fn limit(&self) -> u64 {
        self.limit
    }

    /// Total gas used, including memory expansion.
    pub const fn used(&self) -> u64 {
        self.used
    }

    /// Gas used for memory expansion alone.
    pub const fn memory(&self) -> u64 {
        self.memory
    }

    /// Gas remaining in this frame.
    pub const fn remaining(&self) -> u64 {
        self.limit - self.used
    }

    /// Current refund counter; may be spent down by `SSTORE` clearing a
    /// previously set refund (EIP-3529 callers handle that at the call site).
    pub const fn refunded(&self) -> i64 {
        self.refunded
    }

    /// Charges `cost` against the remaining budget, returning
    /// [`GasError::OutOfGas`] if it would exceed `limit`.
    pub fn record_cost(&mut self, cost: u64) -> GasResult<()> {
        let new_used = self.used.checked_add(cost).ok_or(GasError::OutOfGas)?;
        if new_used > self.limit {
            return Err(GasError::OutOfGas);
        }
        self.used = new_used;
        Ok(())
    }

    /// Charges the marginal memory-expansion cost `new_memory_cost -
    /// self.memory`, recording the new total so the next call only charges
    /// the delta. `new_memory_cost` must be monotone non-decreasing across
    /// calls within a frame (callers compute it from `memCost(w)`).
    pub fn record_memory(&mut self, new_memory_cost: u64) -> GasResult<()> {
        if new_memory_cost <= self.memory {
            return Ok(());
        }
        let delta = new_memory_cost - self.memory;
        self.record_cost(delta)?;
        self.memory = new_memory_cost;
        Ok(())
    }

    /// Adds to the refund counter (may be negative, e.g. EIP-3529 clawing
    /// back a previously granted `SSTORE` refund).
    pub fn record_refund(&mut self, refund: i64) {
        self.refunded += refund;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_cost_rejects_overspend() {
        let mut gas = Gas::new(100);
        assert!(gas.record_cost(60).is_ok());
        assert_eq!(gas.remaining(), 40);
        assert_eq!(gas.record_cost(41), Err(GasError::OutOfGas));
        assert_eq!(gas.remaining(), 40);
    }

    #[test]
    fn record_memory_only_charges_the_delta() {
        let mut gas = Gas::new(1_000);
        gas.record_memory(10).unwrap();
        assert_eq!(gas.used(), 10);
        gas.record_memory(25).unwrap();
        assert_eq!(gas.used(), 25);
        // shrinking cost (never happens in practice) charges nothing more
        gas.record_memory(20).unwrap();
        assert_eq!(gas.used(), 25);
    }
}
