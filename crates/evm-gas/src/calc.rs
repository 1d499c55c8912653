//! Per-opcode dynamic cost functions.
//!
//! Grounded on `revm-interpreter`'s `gas::calc` module (`memory_gas`,
//! `sstore_cost`, `call_cost`, `log_cost`, `keccak256_cost`,
//! `extcodecopy_cost`, `initcode_cost`, `exp_cost`, `create2_cost`,
//! `selfdestruct_cost`, `validate_initial_tx_gas`) and on
//! `rust-ethereum-evm`'s `GasometerState` for the running-total bookkeeping
//! idiom consumed by [`crate::Gas`]. Every function here is a pure
//! computation over `u64`s; callers are responsible for charging the result
//! through a [`crate::Gas`] tracker.

use revm_primitives::hardfork::SpecId;

use crate::{constants::*, error::GasResult, GasError};

/// Rounds `len` up to the next multiple of 32 and returns the word count.
const fn words(len: u64) -> u64 {
    len.div_ceil(32)
}

/// `memCost(w) = 3w + w^2/512`, the total (not marginal) cost of expanding
/// memory to `words` 32-byte words.
pub fn memory_gas(words: u64) -> GasResult<u64> {
    let linear = words.checked_mul(MEMORY).ok_or(GasError::OutOfGas)?;
    let quadratic = words
        .checked_mul(words)
        .ok_or(GasError::OutOfGas)?
        .checked_div(512)
        .expect("divisor is a nonzero constant");
    linear.checked_add(quadratic).ok_or(GasError::OutOfGas)
}

/// The word count implied by accessing `length` bytes starting at `offset`,
/// or `0` if `length` is zero (zero-length accesses never expand memory).
pub fn memory_words_for_range(offset: u64, length: u64) -> GasResult<u64> {
    if length == 0 {
        return Ok(0);
    }
    let end = offset.checked_add(length).ok_or(GasError::OutOfRange)?;
    Ok(words(end))
}

/// `ceil(length/32) * per_word`, the shared shape of copy/hashing fees.
fn cost_per_word(length: u64, per_word: u64) -> GasResult<u64> {
    if length == 0 {
        return Ok(0);
    }
    words(length)
        .checked_mul(per_word)
        .ok_or(GasError::OutOfGas)
}

/// `SHA3`/`CREATE2` hashing cost over `length` bytes of input.
pub fn keccak256_cost(length: u64) -> GasResult<u64> {
    let word_cost = cost_per_word(length, KECCAK256WORD)?;
    KECCAK256.checked_add(word_cost).ok_or(GasError::OutOfGas)
}

/// `CALLDATACOPY`/`CODECOPY`/`RETURNDATACOPY` copy fee over `length` bytes.
pub fn copy_cost(length: u64) -> GasResult<u64> {
    cost_per_word(length, COPY)
}

/// EIP-3860 init-code cost, charged in addition to [`keccak256_cost`] for
/// `CREATE`/`CREATE2` when `length` bytes of init code are supplied.
pub fn initcode_cost(length: u64) -> GasResult<u64> {
    cost_per_word(length, INITCODE_WORD_COST)
}

/// `CREATE2`'s hashing surcharge over the init-code region, on top of the
/// base `CREATE` cost and memory expansion.
pub fn create2_cost(spec: SpecId, initcode_len: u64) -> GasResult<u64> {
    let mut cost = keccak256_cost(initcode_len)?;
    if spec.is_enabled_in(SpecId::SHANGHAI) {
        cost = cost
            .checked_add(initcode_cost(initcode_len)?)
            .ok_or(GasError::OutOfGas)?;
    }
    Ok(cost)
}

/// `LOG0..LOG4` cost for `topic_count` topics over `data_len` bytes.
pub fn log_cost(topic_count: u8, data_len: u64) -> GasResult<u64> {
    let topics = u64::from(topic_count)
        .checked_mul(LOGTOPIC)
        .ok_or(GasError::OutOfGas)?;
    let data = data_len.checked_mul(LOGDATA).ok_or(GasError::OutOfGas)?;
    LOG.checked_add(topics)
        .and_then(|c| c.checked_add(data))
        .ok_or(GasError::OutOfGas)
}

/// `EXP`'s per-byte-of-exponent surcharge, rate depending on hardfork
/// (EIP-160 raised it from 10 to 50 gas per byte).
pub fn exp_cost(spec: SpecId, exponent: revm_primitives::U256) -> GasResult<u64> {
    if exponent.is_zero() {
        return Ok(EXP);
    }
    let byte_cost = if spec.is_enabled_in(SpecId::SPURIOUS_DRAGON) {
        EXP_BYTE_EIP160
    } else {
        EXP_BYTE_FRONTIER
    };
    let significant_bytes = (exponent.bit_len() as u64).div_ceil(8);
    EXP.checked_add(
        significant_bytes
            .checked_mul(byte_cost)
            .ok_or(GasError::OutOfGas)?,
    )
    .ok_or(GasError::OutOfGas)
}

/// `EXTCODECOPY`'s base cost, hardfork-dispatched like `sload_cost`.
pub fn extcodecopy_cost(spec: SpecId, is_cold: bool) -> u64 {
    if spec.is_enabled_in(SpecId::BERLIN) {
        warm_cold_cost(is_cold)
    } else if spec.is_enabled_in(SpecId::TANGERINE) {
        700
    } else {
        20
    }
}

/// `SLOAD`'s base cost before considering EIP-2929 warmth.
pub fn sload_cost(spec: SpecId, is_cold: bool) -> u64 {
    if spec.is_enabled_in(SpecId::BERLIN) {
        warm_cold_cost(is_cold)
    } else if spec.is_enabled_in(SpecId::ISTANBUL) {
        ISTANBUL_SLOAD_GAS
    } else {
        SLOAD
    }
}

/// EIP-2929 cold/warm toggle, shared by `SLOAD`, `BALANCE`, `EXTCODE*`, and
/// the address-access component of `CALL`/`AUTHCALL`.
pub const fn warm_cold_cost(is_cold: bool) -> u64 {
    if is_cold {
        COLD_ACCOUNT_ACCESS_COST
    } else {
        WARM_STORAGE_READ_COST
    }
}

/// `SSTORE`'s gas cost and refund delta, dispatched by hardfork per
/// `spec.md` §4.D: pre-Constantinople `updateSstoreGas`, Constantinople
/// exactly (and Petersburg is excluded from this crate's scope since only
/// Istanbul-and-later is a supported target) uses EIP-1283, Istanbul+ uses
/// EIP-2200. Returns `(gas_cost, refund_delta)`; the EIP-2929 access-list fee
/// is layered on separately by the caller, *after* the EIP-2200 sentry check.
pub fn sstore_cost(
    spec: SpecId,
    current: revm_primitives::U256,
    original: revm_primitives::U256,
    new: revm_primitives::U256,
    remaining_gas: u64,
) -> GasResult<(u64, i64)> {
    if spec.is_enabled_in(SpecId::ISTANBUL) {
        // EIP-2200 sentry: forbid SSTORE when less than the stipend remains.
        if remaining_gas <= CALL_STIPEND {
            return Err(GasError::OutOfGas);
        }
        Ok(istanbul_sstore_cost(current, original, new))
    } else if spec.is_enabled_in(SpecId::PETERSBURG) {
        Ok(istanbul_sstore_cost(current, original, new))
    } else {
        Ok((frontier_sstore_cost(current, new), 0))
    }
}

fn frontier_sstore_cost(current: revm_primitives::U256, new: revm_primitives::U256) -> u64 {
    if current.is_zero() && !new.is_zero() {
        SSTORE_SET
    } else {
        SSTORE_RESET
    }
}

/// EIP-1283/EIP-2200 net-metered `SSTORE` cost and refund.
fn istanbul_sstore_cost(
    current: revm_primitives::U256,
    original: revm_primitives::U256,
    new: revm_primitives::U256,
) -> (u64, i64) {
    if current == new {
        return (WARM_STORAGE_READ_COST, 0);
    }
    if original == current {
        if original.is_zero() {
            return (SSTORE_SET, 0);
        }
        let refund = if new.is_zero() {
            REFUND_SSTORE_CLEARS
        } else {
            0
        };
        return (SSTORE_RESET, refund);
    }

    let mut refund = 0i64;
    if !original.is_zero() {
        if current.is_zero() {
            refund -= REFUND_SSTORE_CLEARS;
        }
        if new.is_zero() {
            refund += REFUND_SSTORE_CLEARS;
        }
    }
    if original == new {
        refund += if original.is_zero() {
            SSTORE_SET as i64 - WARM_STORAGE_READ_COST as i64
        } else {
            SSTORE_RESET as i64 - WARM_STORAGE_READ_COST as i64
        };
    }
    (WARM_STORAGE_READ_COST, refund)
}

/// `SELFDESTRUCT`'s base + new-account-surcharge cost.
pub fn selfdestruct_cost(spec: SpecId, target_exists: bool, transfers_value: bool) -> u64 {
    let base = if spec.is_enabled_in(SpecId::TANGERINE) {
        SELFDESTRUCT_EIP150
    } else {
        SELFDESTRUCT
    };
    let new_account_surcharge = if spec.is_enabled_in(SpecId::SPURIOUS_DRAGON) {
        !target_exists && transfers_value
    } else {
        !target_exists
    };
    if new_account_surcharge && spec.is_enabled_in(SpecId::TANGERINE) {
        base + NEWACCOUNT
    } else {
        base
    }
}

/// Gas forwarded to a callee, applying EIP-150's 63/64 rule from Tangerine
/// Whistle onward (pre-150, the full `requested` amount is unchanged), plus
/// the `callStipend` added on top for a value-transferring `CALL`.
pub fn max_call_gas(spec: SpecId, requested: u64, remaining: u64, transfers_value: bool) -> u64 {
    let capped = if spec.is_enabled_in(SpecId::TANGERINE) {
        requested.min(remaining - remaining / 64)
    } else {
        requested
    };
    if transfers_value {
        capped + CALL_STIPEND
    } else {
        capped
    }
}

/// `CALL`/`CALLCODE`/`DELEGATECALL`/`STATICCALL` cost: account access
/// (cold/warm), value-transfer surcharge, and new-account surcharge.
/// `transfers_value` is always `false` for `DELEGATECALL`/`STATICCALL`.
pub fn call_cost(
    spec: SpecId,
    is_cold: bool,
    transfers_value: bool,
    target_exists: bool,
) -> u64 {
    let mut cost = if spec.is_enabled_in(SpecId::BERLIN) {
        warm_cold_cost(is_cold)
    } else if spec.is_enabled_in(SpecId::TANGERINE) {
        700
    } else {
        40
    };
    if transfers_value {
        cost += CALLVALUE;
    }
    let new_account_surcharge = if spec.is_enabled_in(SpecId::SPURIOUS_DRAGON) {
        !target_exists && transfers_value
    } else {
        !target_exists
    };
    if new_account_surcharge {
        cost += NEWACCOUNT;
    }
    cost
}

/// Intrinsic gas charged before execution begins: the base transaction cost
/// plus per-byte calldata and access-list costs, mirroring
/// `transaction_intrinsic_gas`'s zero/non-zero byte counting.
pub fn intrinsic_gas(
    spec: SpecId,
    is_create: bool,
    data: &[u8],
    access_list_addresses: u64,
    access_list_storage_keys: u64,
) -> GasResult<u64> {
    let mut gas = 21_000u64;

    let zero_bytes = data.iter().filter(|b| **b == 0).count() as u64;
    let non_zero_bytes = data.len() as u64 - zero_bytes;
    let non_zero_cost = if spec.is_enabled_in(SpecId::ISTANBUL) { 16 } else { 68 };
    gas = gas
        .checked_add(zero_bytes.checked_mul(4).ok_or(GasError::OutOfGas)?)
        .and_then(|g| g.checked_add(non_zero_bytes.checked_mul(non_zero_cost)?))
        .ok_or(GasError::OutOfGas)?;

    if is_create {
        gas = gas.checked_add(CREATE).ok_or(GasError::OutOfGas)?;
        if spec.is_enabled_in(SpecId::SHANGHAI) {
            gas = gas
                .checked_add(initcode_cost(data.len() as u64)?)
                .ok_or(GasError::OutOfGas)?;
        }
    }

    if spec.is_enabled_in(SpecId::BERLIN) {
        gas = gas
            .checked_add(
                access_list_addresses
                    .checked_mul(2_400)
                    .ok_or(GasError::OutOfGas)?,
            )
            .and_then(|g| {
                g.checked_add(access_list_storage_keys.checked_mul(1_900)?)
            })
            .ok_or(GasError::OutOfGas)?;
    }

    Ok(gas)
}

#[cfg(test)]
mod tests {
    use super::*;
    use revm_primitives::U256;

    #[test]
    fn memory_gas_is_monotone_non_decreasing() {
        let mut prev = memory_gas(0).unwrap();
        for w in 1..2_000u64 {
            let cur = memory_gas(w).unwrap();
            assert!(cur >= prev, "memCost must never decrease with more words");
            prev = cur;
        }
    }

    #[test]
    fn frontier_sstore_matches_set_vs_reset() {
        assert_eq!(frontier_sstore_cost(U256::ZERO, U256::from(1)), SSTORE_SET);
        assert_eq!(
            frontier_sstore_cost(U256::from(1), U256::from(2)),
            SSTORE_RESET
        );
    }

    #[test]
    fn istanbul_sstore_no_op_is_warm_read() {
        let (cost, refund) = istanbul_sstore_cost(U256::from(1), U256::from(1), U256::from(1));
        assert_eq!(cost, WARM_STORAGE_READ_COST);
        assert_eq!(refund, 0);
    }

    #[test]
    fn call_cost_charges_new_account_surcharge_post_spurious_dragon() {
        let cost = call_cost(SpecId::SPURIOUS_DRAGON, false, true, false);
        assert_eq!(cost, 700 + CALLVALUE + NEWACCOUNT);
        // no value transferred: no new-account surcharge post-Spurious-Dragon
        let cost = call_cost(SpecId::SPURIOUS_DRAGON, false, false, false);
        assert_eq!(cost, 700);
    }

    #[test]
    fn max_call_gas_applies_63_64_rule() {
        assert_eq!(max_call_gas(SpecId::ISTANBUL, 1_000_000, 640, false), 630);
        assert_eq!(max_call_gas(SpecId::FRONTIER, 1_000_000, 640, false), 1_000_000);
    }

    #[test]
    fn max_call_gas_adds_stipend_for_value_transfer() {
        assert_eq!(
            max_call_gas(SpecId::ISTANBUL, 1_000_000, 640, true),
            630 + CALL_STIPEND
        );
        assert_eq!(max_call_gas(SpecId::ISTANBUL, 1_000_000, 640, false), 630);
    }
}
