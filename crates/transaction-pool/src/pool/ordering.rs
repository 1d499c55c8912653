//! `getOrderedTransactions`, per `spec.md` §4.E: repeatedly pick the
//! sender whose next executable transaction has the highest effective
//! price, breaking ties by sender address.

use std::{collections::HashMap, sync::Arc};

use alloy_consensus::Transaction as _;
use alloy_primitives::Address;
use reth_primitives::TransactionSigned;

use super::{SenderQueue, SubPool};

/// Builds the deterministic block-building sequence: only `SubPool::Pending`
/// entries are ever eligible, matching the pending/queued split `spec.md`
/// §9 calls for. A sender's `Pending` run (if any) always starts at its
/// lowest stored nonce, since `retag_subpool` tags everything from the
/// first gap onward `Queued`.
pub(super) fn get_ordered_transactions(
    by_sender: &HashMap<Address, SenderQueue>,
    base_fee: Option<u64>,
) -> Vec<Arc<TransactionSigned>> {
    // A cursor per sender: the next nonce expected to become eligible,
    // seeded at the lowest nonce only if it's tagged `Pending`.
    let mut cursors: HashMap<Address, u64> = by_sender
        .iter()
        .filter_map(|(sender, queue)| {
            let (&nonce, head) = queue.by_nonce.iter().next()?;
            (head.subpool == SubPool::Pending).then_some((*sender, nonce))
        })
        .collect();

    let mut out = Vec::new();
    loop {
        let mut best: Option<(Address, u128)> = None;
        for (&sender, &nonce) in &cursors {
            let Some(queue) = by_sender.get(&sender) else { continue };
            let Some(candidate) = queue.by_nonce.get(&nonce) else { continue };
            let price = candidate.transaction.effective_gas_price(base_fee);
            best = Some(match best {
                Some((best_sender, best_price))
                    if price > best_price || (price == best_price && sender < best_sender) =>
                {
                    (sender, price)
                }
                Some(current) => current,
                None => (sender, price),
            });
        }

        let Some((sender, _)) = best else { break };
        let nonce = cursors[&sender];
        let queue = &by_sender[&sender];
        out.push(queue.by_nonce[&nonce].transaction.clone());

        match queue.by_nonce.range((nonce + 1)..).next() {
            Some((&next_nonce, next)) if next_nonce == nonce + 1 && next.subpool == SubPool::Pending => {
                cursors.insert(sender, next_nonce);
            }
            _ => {
                cursors.remove(&sender);
            }
        }
    }

    out
}
