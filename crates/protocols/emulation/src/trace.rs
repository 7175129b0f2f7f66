//! Structural trace statistics
//!
//! Counts emulated transactions and trace depth, and flags outbound
//! messages that no emulated transaction consumed. Orphans are diagnostics
//! only: external-out messages and messages past the emulation horizon are
//! expected to show up here.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::state::{EmulationResult, TraceNode};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceStats {
    /// Nodes visited in the trace tree
    pub transaction_count: usize,
    /// Longest root-to-node edge count
    pub max_depth: usize,
    /// Outbound messages with no consuming transaction
    pub orphan_outbound_count: usize,
}

impl TraceStats {
    pub fn collect(result: &EmulationResult) -> Self {
        let (transaction_count, max_depth) = walk(&result.trace);
        Self {
            transaction_count,
            max_depth,
            orphan_outbound_count: count_orphans(result),
        }
    }
}

/// Depth-first walk returning (node count, max depth)
fn walk(root: &TraceNode) -> (usize, usize) {
    let mut count = 0;
    let mut max_depth = 0;
    let mut stack = vec![(root, 0usize)];
    while let Some((node, depth)) = stack.pop() {
        count += 1;
        max_depth = max_depth.max(depth);
        for child in node.children.iter().rev() {
            stack.push((child, depth + 1));
        }
    }
    (count, max_depth)
}

fn count_orphans(result: &EmulationResult) -> usize {
    let in_msg_to_tx: HashMap<&str, &str> = result
        .transactions
        .iter()
        .filter_map(|(tx_hash, tx)| {
            tx.in_msg
                .as_ref()
                .map(|m| (m.hash.as_str(), tx_hash.as_str()))
        })
        .collect();

    let mut orphans = 0;
    for (tx_hash, tx) in &result.transactions {
        for out_msg in &tx.out_msgs {
            if !in_msg_to_tx.contains_key(out_msg.hash.as_str()) {
                tracing::warn!(
                    "Outbound message {} of transaction {} has no consuming transaction",
                    out_msg.hash,
                    tx_hash
                );
                orphans += 1;
            }
        }
    }

    if orphans > 0 {
        tracing::debug!(
            "Trace {} has {} orphaned outbound messages",
            result.trace.tx_hash,
            orphans
        );
    }
    orphans
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const ACCOUNT: &str = "0:0F3E0376E4E421DC43AAAADD2FFC246649CC5AFBFBA55709B934448DD433B881";

    fn tx(in_hash: &str, out_hashes: &[&str]) -> serde_json::Value {
        let out: Vec<_> = out_hashes.iter().map(|h| json!({ "hash": h })).collect();
        json!({
            "account": ACCOUNT,
            "lt": "1",
            "account_state_before": { "balance": "1" },
            "account_state_after": { "balance": "1" },
            "in_msg": { "hash": in_hash },
            "out_msgs": out
        })
    }

    fn result(transactions: serde_json::Value, trace: serde_json::Value) -> EmulationResult {
        EmulationResult::from_value(json!({
            "transactions": transactions,
            "trace": trace,
            "actions": []
        }))
        .unwrap()
    }

    #[test]
    fn test_three_level_tree() {
        let r = result(
            json!({
                "root": tx("ext", &["m1", "m2"]),
                "a": tx("m1", &["m3"]),
                "b": tx("m2", &[]),
                "c": tx("m3", &[])
            }),
            json!({
                "tx_hash": "root",
                "children": [
                    { "tx_hash": "a", "children": [ { "tx_hash": "c", "children": [] } ] },
                    { "tx_hash": "b", "children": [] }
                ]
            }),
        );
        let stats = TraceStats::collect(&r);
        assert_eq!(stats.transaction_count, 4);
        assert_eq!(stats.max_depth, 2);
        assert_eq!(stats.orphan_outbound_count, 0);
    }

    #[test]
    fn test_single_node() {
        let r = result(json!({ "root": tx("ext", &[]) }), json!({ "tx_hash": "root" }));
        let stats = TraceStats::collect(&r);
        assert_eq!(stats.transaction_count, 1);
        assert_eq!(stats.max_depth, 0);
    }

    #[test]
    fn test_orphan_outbound_counted() {
        let r = result(
            json!({
                "root": tx("ext", &["m1", "lost"]),
                "a": tx("m1", &["log"])
            }),
            json!({ "tx_hash": "root", "children": [ { "tx_hash": "a" } ] }),
        );
        let stats = TraceStats::collect(&r);
        assert_eq!(stats.orphan_outbound_count, 2);
        assert_eq!(stats.transaction_count, 2);
    }
}
