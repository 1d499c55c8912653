//! The pool's core data structures: per-sender nonce-ordered queues, the
//! pending/queued split, and the steps of `spec.md` §4.E that need
//! visibility into the pool's existing contents (duplicate/size checks,
//! replace-by-fee, block reconciliation, eviction).

mod ordering;

use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
    time::Instant,
};

use alloy_primitives::{Address, B256};
use reth_primitives::{SignedTransaction, TransactionSigned};

use crate::{
    config::PoolConfig,
    error::PoolError,
    state::StateProvider,
    validate::{validate_transaction, ValidatedTransaction},
};

/// Whether a pooled transaction is immediately executable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubPool {
    /// Contiguous with the sender's on-chain nonce: eligible for block
    /// building.
    Pending,
    /// A nonce gap separates this transaction from the chain tip.
    Queued,
}

/// What [`TxPool::insert`] did with the candidate: a fresh slot, or a
/// fee-replacement of an existing entry at the same `(sender, nonce)`.
#[derive(Debug, Clone, Copy)]
pub enum InsertOutcome {
    /// Landed in a previously empty `(sender, nonce)` slot.
    Inserted {
        /// The recovered sender.
        sender: Address,
    },
    /// Replaced an incumbent at the same `(sender, nonce)`.
    Replaced {
        /// The recovered sender.
        sender: Address,
        /// The hash of the transaction it displaced.
        old_hash: B256,
    },
}

impl InsertOutcome {
    /// The recovered sender, regardless of which case occurred.
    pub fn sender(&self) -> Address {
        match *self {
            Self::Inserted { sender } | Self::Replaced { sender, .. } => sender,
        }
    }
}

/// A transaction held in the pool together with its pool-local bookkeeping.
#[derive(Debug, Clone)]
pub struct PooledTransaction {
    /// The transaction itself.
    pub transaction: Arc<TransactionSigned>,
    /// Its recovered sender.
    pub sender: Address,
    /// `effectiveGasPrice(tx, baseFee)` at admission time.
    pub effective_price: u128,
    /// When this entry was inserted (or last replaced).
    pub added_at: Instant,
    /// Whether this entry is contiguous with the sender's on-chain nonce.
    pub subpool: SubPool,
}

#[derive(Debug, Default)]
struct SenderQueue {
    by_nonce: BTreeMap<u64, PooledTransaction>,
}

/// Re-tags every entry in `queue` from `account_nonce`: the run of nonces
/// contiguous with the chain tip is `Pending`, everything after the first
/// gap is `Queued`. `by_nonce`'s ascending iteration order makes this a
/// single pass.
fn retag_subpool(queue: &mut SenderQueue, account_nonce: u64) {
    let mut expected = account_nonce;
    for (&nonce, entry) in queue.by_nonce.iter_mut() {
        if nonce == expected {
            entry.subpool = SubPool::Pending;
            expected = expected.saturating_add(1);
        } else {
            entry.subpool = SubPool::Queued;
        }
    }
}

/// The transaction pool: nonce-ordered per-sender queues, a `handled` hash
/// ledger, and the operations of `spec.md` §4.E.
#[derive(Debug, Default)]
pub struct TxPool {
    by_sender: HashMap<Address, SenderQueue>,
    by_hash: HashMap<B256, Address>,
    handled: HashMap<B256, Instant>,
    total: usize,
    config: PoolConfig,
}

impl TxPool {
    /// Creates an empty pool governed by `config`.
    pub fn new(config: PoolConfig) -> Self {
        Self { config, ..Default::default() }
    }

    /// Total number of transactions across all senders.
    pub fn len(&self) -> usize {
        self.total
    }

    /// Whether the pool holds no transactions.
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Number of transactions queued for `sender`.
    pub fn sender_len(&self, sender: Address) -> usize {
        self.by_sender.get(&sender).map_or(0, |q| q.by_nonce.len())
    }

    /// Whether `hash` has ever been admitted (and not yet cleaned up).
    pub fn is_handled(&self, hash: &B256) -> bool {
        self.handled.contains_key(hash)
    }

    /// Looks up a pooled transaction by hash.
    pub fn get(&self, hash: &B256) -> Option<&PooledTransaction> {
        let sender = self.by_hash.get(hash)?;
        self.by_sender.get(sender)?.by_nonce.values().find(|t| t.transaction.hash() == hash)
    }

    /// Runs the full admission pipeline (`spec.md` §4.E steps 1-11) against
    /// `tx`, inserting it (or replacing an incumbent at the same
    /// `(sender, nonce)`) on success.
    pub fn insert(
        &mut self,
        tx: TransactionSigned,
        provider: &dyn StateProvider,
    ) -> Result<InsertOutcome, PoolError> {
        let hash = *tx.hash();

        // Step 4: duplicate hash.
        if self.handled.contains_key(&hash) {
            return Err(PoolError::AlreadyKnown(hash));
        }

        // Steps 1, 5-9.
        let ValidatedTransaction { sender, transaction, effective_price } =
            validate_transaction(tx, provider, &self.config)?;

        let existing_for_sender = self.sender_len(sender);
        let nonce = transaction.nonce();
        let replaces_existing =
            self.by_sender.get(&sender).is_some_and(|q| q.by_nonce.contains_key(&nonce));

        // Step 2: per-sender cap (replacements don't grow the sender's set).
        if !replaces_existing && existing_for_sender >= self.config.max_per_sender {
            return Err(PoolError::SenderTransactionsFull(sender));
        }

        // Step 3: whole-pool cap (replacements don't grow the pool).
        if !replaces_existing && self.total >= self.config.max_pool_size {
            return Err(PoolError::PoolFull);
        }

        let entry = PooledTransaction {
            transaction: Arc::new(transaction),
            sender,
            effective_price,
            added_at: Instant::now(),
            subpool: SubPool::Queued,
        };

        let queue = self.by_sender.entry(sender).or_default();
        let outcome = if let Some(incumbent) = queue.by_nonce.get(&nonce) {
            // Step 10: replace-by-fee.
            let required = incumbent.effective_price
                + (incumbent.effective_price * self.config.replacement_bump_percent) / 100;
            if entry.effective_price < required {
                return Err(PoolError::ReplacementUnderpriced);
            }
            let old_hash = *incumbent.transaction.hash();
            self.by_hash.remove(&old_hash);
            self.by_hash.insert(hash, sender);
            queue.by_nonce.insert(nonce, entry);
            InsertOutcome::Replaced { sender, old_hash }
        } else {
            // Step 11: fresh insertion, ascending-nonce order maintained by
            // `BTreeMap`.
            self.by_hash.insert(hash, sender);
            queue.by_nonce.insert(nonce, entry);
            self.total += 1;
            InsertOutcome::Inserted { sender }
        };
        retag_subpool(queue, provider.account(sender).nonce);

        self.handled.insert(hash, Instant::now());
        Ok(outcome)
    }

    /// Drops a matching `(sender, nonce)` entry for every transaction in
    /// `mined`. Removing a sender's last entry removes the sender key.
    /// `provider` supplies the post-mining account nonce so the survivors'
    /// `SubPool` tags stay accurate. Returns the hashes actually removed.
    pub fn remove_mined(&mut self, mined: &[(Address, u64)], provider: &dyn StateProvider) -> Vec<B256> {
        let mut removed_hashes = Vec::new();
        for &(sender, nonce) in mined {
            let Some(queue) = self.by_sender.get_mut(&sender) else { continue };
            if let Some(removed) = queue.by_nonce.remove(&nonce) {
                let removed_hash = *removed.transaction.hash();
                self.by_hash.remove(&removed_hash);
                self.total -= 1;
                removed_hashes.push(removed_hash);
            }
            if queue.by_nonce.is_empty() {
                self.by_sender.remove(&sender);
            } else {
                retag_subpool(queue, provider.account(sender).nonce);
            }
        }
        removed_hashes
    }

    /// Evicts pool entries older than `max_age` (`POOLED_STORAGE_TIME_LIMIT`)
    /// and `handled` entries older than `handled_max_age`
    /// (`HANDLED_CLEANUP_TIME_LIMIT`). Returns the number of pool entries
    /// evicted.
    pub fn sweep_expired(
        &mut self,
        max_age: std::time::Duration,
        handled_max_age: std::time::Duration,
        provider: &dyn StateProvider,
    ) -> usize {
        let now = Instant::now();
        let mut evicted = 0;
        self.by_sender.retain(|sender, queue| {
            queue.by_nonce.retain(|_, tx| {
                let keep = now.duration_since(tx.added_at) <= max_age;
                if !keep {
                    self.by_hash.remove(tx.transaction.hash());
                    evicted += 1;
                }
                keep
            });
            if queue.by_nonce.is_empty() {
                return false;
            }
            retag_subpool(queue, provider.account(*sender).nonce);
            true
        });
        self.total -= evicted;
        self.handled.retain(|_, added_at| now.duration_since(*added_at) <= handled_max_age);
        evicted
    }

    /// Builds the deterministic block-building sequence, per `spec.md`
    /// §4.E's `getOrderedTransactions`: only `SubPool::Pending` entries are
    /// eligible, since a gapped nonce is not chain-executable.
    pub fn ordered_transactions(&self, base_fee: Option<u64>) -> Vec<Arc<TransactionSigned>> {
        ordering::get_ordered_transactions(&self.by_sender, base_fee)
    }

    /// Clears all pool state (used by the `close` lifecycle transition).
    pub fn clear(&mut self) {
        self.by_sender.clear();
        self.by_hash.clear();
        self.handled.clear();
        self.total = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        state::{Account, TestStateProvider},
        test_fixtures::{signed_fee_market_tx, test_key},
    };
    use alloy_consensus::Transaction as _;
    use alloy_primitives::U256;

    fn funded_provider() -> TestStateProvider {
        let provider = TestStateProvider::new();
        for seed in 0..60u8 {
            let (_, addr) = test_key(seed);
            provider.set_account(addr, Account { nonce: 0, balance: U256::MAX });
        }
        provider
    }

    #[test]
    fn replace_by_fee_matches_published_scenario() {
        let provider = funded_provider();
        let mut pool = TxPool::new(PoolConfig::default());
        let (key, sender) = test_key(1);

        let base = 1_000_000_000u128;
        let tx_a = signed_fee_market_tx(&key, 0, base, 21_000);
        pool.insert(tx_a, &provider).unwrap();
        assert_eq!(pool.len(), 1);

        // 1.09x: below the 10% bump, rejected.
        let tx_a_prime = signed_fee_market_tx(&key, 0, base + base / 100 * 9, 21_000);
        let err = pool.insert(tx_a_prime, &provider).unwrap_err();
        assert!(matches!(err, PoolError::ReplacementUnderpriced));
        assert_eq!(pool.len(), 1);

        // Exactly 1.10x: accepted, replaces the incumbent.
        let tx_a_double_prime = signed_fee_market_tx(&key, 0, base + base / 10, 21_000);
        let hash = *tx_a_double_prime.hash();
        pool.insert(tx_a_double_prime, &provider).unwrap();
        assert_eq!(pool.len(), 1);
        assert_eq!(pool.get(&hash).map(|t| *t.transaction.hash()), Some(hash));
        assert_eq!(sender, test_key(1).1);
    }

    #[test]
    fn pool_overflow_rejects_the_5001st_transaction() {
        let provider = funded_provider();
        let mut config = PoolConfig::default();
        config.max_pool_size = 5000;
        let mut pool = TxPool::new(config);

        let mut inserted = 0;
        'senders: for seed in 0..51u8 {
            let (key, _) = test_key(seed);
            let per_sender = if seed == 50 { 1 } else { 100 };
            for nonce in 0..per_sender {
                let tx = signed_fee_market_tx(&key, nonce, 1_000_000_000, 21_000);
                match pool.insert(tx, &provider) {
                    Ok(_) => inserted += 1,
                    Err(PoolError::PoolFull) => break 'senders,
                    Err(other) => panic!("unexpected rejection: {other:?}"),
                }
                if inserted == 5000 {
                    break 'senders;
                }
            }
        }

        assert_eq!(pool.len(), 5000);

        let (overflow_key, _) = test_key(55);
        let overflow_tx = signed_fee_market_tx(&overflow_key, 0, 1_000_000_000, 21_000);
        let err = pool.insert(overflow_tx, &provider).unwrap_err();
        assert!(matches!(err, PoolError::PoolFull));
        assert_eq!(pool.len(), 5000);
    }

    #[test]
    fn block_reconciliation_drops_mined_nonces_and_empty_senders() {
        let provider = funded_provider();
        let mut pool = TxPool::new(PoolConfig::default());
        let (key, sender) = test_key(2);

        pool.insert(signed_fee_market_tx(&key, 0, 1_000_000_000, 21_000), &provider).unwrap();
        pool.insert(signed_fee_market_tx(&key, 1, 1_000_000_000, 21_000), &provider).unwrap();
        assert_eq!(pool.sender_len(sender), 2);

        pool.remove_mined(&[(sender, 0)], &provider);
        assert_eq!(pool.sender_len(sender), 1);
        assert!(pool.by_sender.contains_key(&sender));

        pool.remove_mined(&[(sender, 1)], &provider);
        assert_eq!(pool.sender_len(sender), 0);
        assert!(!pool.by_sender.contains_key(&sender));
    }

    #[test]
    fn gapped_nonce_is_tagged_queued_and_excluded_from_ordering() {
        let provider = funded_provider();
        let mut pool = TxPool::new(PoolConfig::default());
        let (key, sender) = test_key(20);

        // Account nonce is 0, but the only submitted transaction is nonce 5:
        // legal admission per step 6 (only `tx.nonce < account.nonce` is
        // rejected), yet it isn't chain-executable.
        pool.insert(signed_fee_market_tx(&key, 5, 1_000_000_000, 21_000), &provider).unwrap();
        assert_eq!(pool.by_sender[&sender].by_nonce[&5].subpool, SubPool::Queued);
        assert!(pool.ordered_transactions(None).is_empty());

        // Filling the gap promotes both nonces to `Pending`.
        pool.insert(signed_fee_market_tx(&key, 0, 1_000_000_000, 21_000), &provider).unwrap();
        for nonce in 1..5 {
            pool.insert(signed_fee_market_tx(&key, nonce, 1_000_000_000, 21_000), &provider).unwrap();
        }
        assert_eq!(pool.by_sender[&sender].by_nonce[&5].subpool, SubPool::Pending);
        let ordered = pool.ordered_transactions(None);
        assert_eq!(ordered.len(), 6);
        assert!(ordered.iter().all(|tx| tx.recover_signer().unwrap() == sender));
    }

    #[test]
    fn ordered_transactions_picks_highest_price_head_first() {
        let provider = funded_provider();
        let mut pool = TxPool::new(PoolConfig::default());
        let (key_a, sender_a) = test_key(10);
        let (key_b, sender_b) = test_key(11);

        pool.insert(signed_fee_market_tx(&key_a, 0, 1_000, 21_000), &provider).unwrap();
        pool.insert(signed_fee_market_tx(&key_b, 0, 2_000, 21_000), &provider).unwrap();
        pool.insert(signed_fee_market_tx(&key_a, 1, 3_000, 21_000), &provider).unwrap();

        let ordered = pool.ordered_transactions(None);
        assert_eq!(ordered.len(), 3);
        // sender_b's single (higher-priced) head goes first, then sender_a's
        // nonce-0 head (now the highest remaining), then its nonce-1 tail.
        assert_eq!(ordered[0].recover_signer().unwrap(), sender_b);
        assert_eq!(ordered[1].recover_signer().unwrap(), sender_a);
        assert_eq!(ordered[2].recover_signer().unwrap(), sender_a);
        assert_eq!(ordered[1].nonce(), 0);
        assert_eq!(ordered[2].nonce(), 1);
    }
}
