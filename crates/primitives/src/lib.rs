//! Transaction data model shared by the RLPx wire layer, the transaction
//! pool, and the gas-accounting library.
//!
//! This crate intentionally wraps `alloy-consensus`'s transaction envelope
//! types rather than re-implementing RLP encoding or ECDSA recovery: signing
//! primitives, hashing, and the RLP codec are assumed available per the
//! scope of this design.

mod crypto;
mod error;
mod transaction;

pub use crypto::RecoveryError;
pub use error::TransactionError;
pub use transaction::{
    signed::{SignedTransaction, TransactionSigned},
    Transaction,
};

pub use alloy_consensus::{TxEip1559, TxEip2930, TxLegacy, TxType};
pub use alloy_primitives::{Address, Signature, TxHash, B256, U256};
