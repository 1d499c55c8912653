/// Traps raised by a gas handler, unwinding the current EVM call frame.
///
/// Named after the taxonomy `spec.md` §7 gives for the gas layer: these are
/// not transport or pool errors, they are interpreter control flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum GasError {
    /// A state-mutating opcode ran while `RunState.is_static` was set.
    #[error("state-changing opcode executed in a static call")]
    StaticStateChange,
    /// The computed cost exceeded the gas remaining in the current frame.
    #[error("out of gas")]
    OutOfGas,
    /// A memory offset/length or access-list argument overflowed `u64`.
    #[error("gas or memory argument out of range")]
    OutOfRange,
    /// `AUTHCALL` executed without a prior successful `AUTH` in the same
    /// frame.
    #[error("authcall executed without a prior successful auth")]
    AuthCallUnset,
    /// `AUTHCALL`'s `valueExt` argument was non-zero.
    #[error("authcall value-ext must be zero")]
    AuthCallNonzeroValueExt,
}

/// Convenience alias used throughout this crate's cost functions.
pub type GasResult<T> = Result<T, GasError>;
