/// Errors raised while constructing or inspecting a [`crate::Transaction`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TransactionError {
    /// `maxFeePerGas` was lower than `maxPriorityFeePerGas`.
    #[error("max fee per gas {max_fee_per_gas} is less than max priority fee per gas {max_priority_fee_per_gas}")]
    TipAboveFeeCap {
        /// The offending `maxFeePerGas`.
        max_fee_per_gas: u128,
        /// The offending `maxPriorityFeePerGas`.
        max_priority_fee_per_gas: u128,
    },
}
