//! Static-call guard, `AUTHCALL` validation, and the opcode dispatch shape
//! `spec.md` §9's "Dynamic per-opcode dispatch" design note calls for.

use revm_primitives::U256;

use crate::error::{GasError, GasResult};

/// The opcodes `spec.md` §4.D names as having a dynamic gas component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum Opcode {
    Sha3,
    Balance,
    CallDataCopy,
    CodeCopy,
    ExtCodeSize,
    ExtCodeCopy,
    ReturnDataCopy,
    ExtCodeHash,
    MLoad,
    MStore,
    MStore8,
    SLoad,
    SStore,
    Log0,
    Log1,
    Log2,
    Log3,
    Log4,
    Create,
    Call,
    CallCode,
    Return,
    DelegateCall,
    Create2,
    Auth,
    AuthCall,
    StaticCall,
    Revert,
    SelfDestruct,
}

impl Opcode {
    /// Whether this opcode reads chain/account state and therefore must be
    /// treated as an asynchronous gas handler (`spec.md` §5: "Gas handlers
    /// that consult storage ... are asynchronous; other gas handlers are
    /// synchronous").
    pub const fn is_async(self) -> bool {
        matches!(
            self,
            Self::Balance
                | Self::ExtCodeSize
                | Self::ExtCodeCopy
                | Self::ExtCodeHash
                | Self::SLoad
                | Self::SStore
                | Self::Call
                | Self::CallCode
                | Self::DelegateCall
                | Self::StaticCall
                | Self::AuthCall
                | Self::SelfDestruct
        )
    }

    /// Whether executing this opcode while `RunState.is_static` is set must
    /// trap with [`GasError::StaticStateChange`]. `CALL` is only guarded
    /// when it transfers value; the caller passes that separately.
    const fn is_unconditionally_static_guarded(self) -> bool {
        matches!(
            self,
            Self::SStore
                | Self::Log0
                | Self::Log1
                | Self::Log2
                | Self::Log3
                | Self::Log4
                | Self::Create
                | Self::Create2
                | Self::SelfDestruct
        )
    }
}

/// A dynamic-gas handler is either synchronous (pure function of already
/// in-memory state) or asynchronous (needs a storage/account read). Modeled
/// as a sum type rather than a trait object so the dispatch table stays a
/// flat, branch-free array as the Design Notes ask.
pub enum GasHandler<S, A> {
    /// A handler requiring no suspension point.
    Sync(S),
    /// A handler that awaits a `StateView` lookup before it can compute cost.
    Async(A),
}

/// Rejects opcodes that mutate state while executing inside a static call
/// (`STATICCALL` or nested within one). `call_value` is `None` for opcodes
/// other than `CALL`, which is only guarded when it transfers value.
pub fn guard_static_state(
    opcode: Opcode,
    is_static: bool,
    call_value: Option<U256>,
) -> GasResult<()> {
    if !is_static {
        return Ok(());
    }
    let violates = opcode.is_unconditionally_static_guarded()
        || matches!(opcode, Opcode::Call if call_value.is_some_and(|v| !v.is_zero()));
    if violates {
        return Err(GasError::StaticStateChange);
    }
    Ok(())
}

/// Validates an `AUTHCALL` against the authorization state left by a prior
/// `AUTH` in the same frame, per `spec.md` §4.D.
pub fn validate_authcall(auth_set: bool, value_ext: U256) -> GasResult<()> {
    if !auth_set {
        return Err(GasError::AuthCallUnset);
    }
    if !value_ext.is_zero() {
        return Err(GasError::AuthCallNonzeroValueExt);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sstore_in_static_call_traps() {
        assert_eq!(
            guard_static_state(Opcode::SStore, true, None),
            Err(GasError::StaticStateChange)
        );
        assert_eq!(guard_static_state(Opcode::SStore, false, None), Ok(()));
    }

    #[test]
    fn call_is_only_guarded_when_it_carries_value() {
        assert_eq!(
            guard_static_state(Opcode::Call, true, Some(U256::from(1))),
            Err(GasError::StaticStateChange)
        );
        assert_eq!(
            guard_static_state(Opcode::Call, true, Some(U256::ZERO)),
            Ok(())
        );
        assert_eq!(guard_static_state(Opcode::Call, true, None), Ok(()));
    }

    #[test]
    fn authcall_requires_prior_auth_and_zero_value_ext() {
        assert_eq!(
            validate_authcall(false, U256::ZERO),
            Err(GasError::AuthCallUnset)
        );
        assert_eq!(
            validate_authcall(true, U256::from(1)),
            Err(GasError::AuthCallNonzeroValueExt)
        );
        assert_eq!(validate_authcall(true, U256::ZERO), Ok(()));
    }
}
