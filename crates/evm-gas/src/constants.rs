//! Static gas costs named in the yellow paper and its EIPs.
//!
//! Grounded on `revm-interpreter`'s `gas::constants` module; values are
//! copied verbatim where the opcode set overlaps with `SPEC_FULL.md` §4.D.

/// `Gzero`
pub const ZERO: u64 = 0;
/// `Gbase`
pub const BASE: u64 = 2;
/// `Gverylow`
pub const VERYLOW: u64 = 3;
/// `Glow`
pub const LOW: u64 = 5;
/// `Gmid`
pub const MID: u64 = 8;
/// `Ghigh`
pub const HIGH: u64 = 10;
/// `Gjumpdest`
pub const JUMPDEST: u64 = 1;

/// Pre-Tangerine-Whistle `SELFDESTRUCT` cost.
pub const SELFDESTRUCT: u64 = 0;
/// EIP-150 `SELFDESTRUCT` cost.
pub const SELFDESTRUCT_EIP150: u64 = 5000;

/// `Gcreate`
pub const CREATE: u64 = 32000;

/// `Gcallvalue`
pub const CALLVALUE: u64 = 9000;
/// `Gnewaccount`
pub const NEWACCOUNT: u64 = 25000;

/// `Gexp`
pub const EXP: u64 = 10;
/// `Gexpbyte` pre-Spurious-Dragon.
pub const EXP_BYTE_FRONTIER: u64 = 10;
/// `Gexpbyte` from EIP-160.
pub const EXP_BYTE_EIP160: u64 = 50;

/// `Gmemory`, the linear term of `memCost`.
pub const MEMORY: u64 = 3;

/// `Glog`
pub const LOG: u64 = 375;
/// `Glogdata`
pub const LOGDATA: u64 = 8;
/// `Glogtopic`
pub const LOGTOPIC: u64 = 375;

/// `Gkeccak256`
pub const KECCAK256: u64 = 30;
/// `Gkeccak256word`
pub const KECCAK256WORD: u64 = 6;

/// `Gcopy`, per 32-byte word copied.
pub const COPY: u64 = 3;

/// `Gblockhash`
pub const BLOCKHASH: u64 = 20;

/// `Gcodedeposit`, per byte of deployed code.
pub const CODEDEPOSIT: u64 = 200;

/// Istanbul `SLOAD` cost (EIP-1884), used before EIP-2929 makes access
/// cold/warm-dependent.
pub const ISTANBUL_SLOAD_GAS: u64 = 800;
/// Pre-Istanbul `SLOAD` cost.
pub const SLOAD: u64 = 50;

/// `SSTORE` setting a zero slot to non-zero.
pub const SSTORE_SET: u64 = 20000;
/// `SSTORE` changing a non-zero slot to another non-zero value.
pub const SSTORE_RESET: u64 = 5000;
/// Refund for clearing a slot to zero, pre-EIP-3529.
pub const REFUND_SSTORE_CLEARS: i64 = 15000;

/// EIP-2929: base cost of the first access to an address in a transaction.
pub const COLD_ACCOUNT_ACCESS_COST: u64 = 2600;
/// EIP-2929: base cost of the first access to a storage slot.
pub const COLD_SLOAD_COST: u64 = 2100;
/// EIP-2929: cost of any subsequent access to an already-warmed address/slot.
pub const WARM_STORAGE_READ_COST: u64 = 100;
/// EIP-2929: `SSTORE_RESET` minus `COLD_SLOAD_COST`, since a cold slot access
/// already paid `COLD_SLOAD_COST` once.
pub const WARM_SSTORE_RESET: u64 = SSTORE_RESET - COLD_SLOAD_COST;

/// EIP-3860: cost per 32-byte word of init code.
pub const INITCODE_WORD_COST: u64 = 2;

/// Stipend passed to a `CALL` with non-zero value so the callee can emit
/// minimal events even at the edge of its gas budget.
pub const CALL_STIPEND: u64 = 2300;
/// Minimum gas that must remain for a callee per EIP-150's 63/64 rule.
pub const MIN_CALLEE_GAS: u64 = CALL_STIPEND;
