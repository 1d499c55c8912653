//! The acceptance pipeline (`spec.md` §4.E, steps 1-9; steps 10-11 are
//! applied by [`crate::pool::TxPool::insert`] once the sender's existing
//! entries are visible).

use alloy_consensus::Transaction as _;
use alloy_primitives::Address;
use reth_primitives::{SignedTransaction, TransactionError, TransactionSigned};

use crate::{config::PoolConfig, error::PoolError, state::StateProvider};

/// A transaction that has passed steps 1-9 of the acceptance pipeline and is
/// ready to be slotted into (or replace within) its sender's queue.
pub struct ValidatedTransaction {
    /// The recovered sender.
    pub sender: Address,
    /// The transaction itself.
    pub transaction: TransactionSigned,
    /// `effectiveGasPrice(tx, baseFee)`, cached for ordering and replacement
    /// comparisons.
    pub effective_price: u128,
}

/// Runs steps 1, 5-9 of the acceptance pipeline (steps 2-4 and 10-11 need
/// visibility into the pool's existing contents and are applied by the
/// caller). Returns the recovered sender and cached effective price on
/// success.
pub fn validate_transaction(
    tx: TransactionSigned,
    provider: &dyn StateProvider,
    config: &PoolConfig,
) -> Result<ValidatedTransaction, PoolError> {
    let sender = tx.recover_signer().map_err(|_| PoolError::NotSigned)?;

    if tx.input().len() > config.max_data_bytes {
        return Err(PoolError::DataTooLarge);
    }

    if let Some(max_priority_fee_per_gas) = tx.max_priority_fee_per_gas() {
        let max_fee_per_gas = tx.max_fee_per_gas();
        if max_priority_fee_per_gas > max_fee_per_gas {
            return Err(TransactionError::TipAboveFeeCap { max_fee_per_gas, max_priority_fee_per_gas }.into());
        }
    }

    let account = provider.account(sender);
    if tx.nonce() < account.nonce {
        return Err(PoolError::NonceTooLow { tx_nonce: tx.nonce(), account_nonce: account.nonce });
    }

    let upfront = tx.upfront_cost(provider.base_fee().unwrap_or_default());
    if account.balance < upfront {
        return Err(PoolError::InsufficientFunds(sender));
    }

    if tx.gas_limit() > provider.block_gas_limit() {
        return Err(PoolError::GasLimitTooHigh(tx.gas_limit()));
    }

    let effective_price = tx.effective_gas_price(provider.base_fee());
    if effective_price < config.min_gas_price {
        return Err(PoolError::GasPriceTooLow);
    }

    Ok(ValidatedTransaction { sender, transaction: tx, effective_price })
}
