//! Rejection reasons for the acceptance pipeline, per `spec.md` §4.E.

use alloy_primitives::{Address, B256};
use thiserror::Error;

/// Why a candidate transaction was refused admission, or why a lifecycle
/// operation failed.
#[derive(Debug, Clone, Error)]
pub enum PoolError {
    /// Step 1: the transaction's signature did not recover to an address.
    #[error("transaction is not signed")]
    NotSigned,
    /// Step 2: `bySender(sender).len() >= MAX_PER_SENDER`.
    #[error("sender {0} has too many queued transactions")]
    SenderTransactionsFull(Address),
    /// Step 3: the pool is at `POOL_MAX_SIZE`.
    #[error("pool is full")]
    PoolFull,
    /// Step 4: a transaction with this hash is already present.
    #[error("transaction {0} already known")]
    AlreadyKnown(B256),
    /// Step 5: `tx.data.len() > MAX_DATA_BYTES`.
    #[error("transaction data exceeds the size limit")]
    DataTooLarge,
    /// `maxFeePerGas < maxPriorityFeePerGas` on a dynamic-fee transaction.
    #[error(transparent)]
    InvalidTransaction(#[from] reth_primitives::TransactionError),
    /// Step 6: `tx.nonce < account.nonce`.
    #[error("nonce {tx_nonce} is below account nonce {account_nonce}")]
    NonceTooLow {
        /// The transaction's nonce.
        tx_nonce: u64,
        /// The sender's current on-chain nonce.
        account_nonce: u64,
    },
    /// Step 7: `account.balance < upfrontCost`.
    #[error("sender {0} has insufficient balance for the upfront cost")]
    InsufficientFunds(Address),
    /// Step 8: `tx.gasLimit > currentBlockGasLimit`.
    #[error("gas limit {0} exceeds the block gas limit")]
    GasLimitTooHigh(u64),
    /// Step 9: effective price below the configured floor.
    #[error("gas price is below the minimum accepted price")]
    GasPriceTooLow,
    /// Step 10: replacement at the same `(sender, nonce)` did not clear the
    /// required bump.
    #[error("replacement gas too low")]
    ReplacementUnderpriced,
    /// The pool has been `close`d and rejects further mutation.
    #[error("pool is closed")]
    PoolClosed,
}
