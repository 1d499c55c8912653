//! Dynamic per-opcode gas accounting for an EVM interpreter.
//!
//! This crate is a library consumed by an interpreter loop that is out of
//! scope here (`spec.md` §1): it computes costs and mutates the
//! [`access_list::AccessListJournal`] the embedding interpreter supplies, but
//! owns neither the stack nor the bytecode dispatch loop. Grounded on
//! `revm-interpreter`'s `gas` module and on `rust-ethereum-evm`'s
//! `GasometerState`, per `DESIGN.md`.

pub mod access_list;
pub mod calc;
pub mod constants;
mod error;
mod gas;
mod guard;

pub use access_list::{AccessList, AccessListJournal};
pub use error::{GasError, GasResult};
pub use gas::Gas;
pub use guard::{guard_static_state, Opcode};

pub use revm_primitives::hardfork::SpecId;
