use std::collections::{HashMap, HashSet};

use crate::transaction::TransactionID;

/// Directed graph of blocked transactions. An edge `a -> b` records that
/// `a` is suspended waiting for a lock `b` holds (or that `b` queued
/// behind `a` on the same page and will hold it next). Mutated only under
/// the buffer pool's monitor, at the same points that mutate the lock
/// table.
pub(crate) struct WaitForGraph {
    // key: transaction id, value: the transactions that the key transaction is waiting for
    graph: HashMap<TransactionID, HashSet<TransactionID>>,
}

impl WaitForGraph {
    pub(crate) fn new() -> Self {
        Self {
            graph: HashMap::new(),
        }
    }

    pub(crate) fn add_edge(&mut self, from: TransactionID, to: TransactionID) {
        self.graph
            .entry(from)
            .or_insert_with(HashSet::new)
            .insert(to);
    }

    pub(crate) fn remove_edge(&mut self, from: TransactionID, to: TransactionID) {
        if let Some(transactions) = self.graph.get_mut(&from) {
            transactions.remove(&to);
        }
    }

    /// Drop every edge originating from `tid`.
    pub(crate) fn remove_waiter(&mut self, tid: TransactionID) {
        self.graph.remove(&tid);
    }

    /// Drop `tid` as a node entirely: its outgoing edges and its
    /// appearance in every other transaction's edge set.
    pub(crate) fn remove_all_mentions(&mut self, tid: TransactionID) {
        self.graph.remove(&tid);
        for transactions in self.graph.values_mut() {
            transactions.remove(&tid);
        }
    }

    /// Whether a cycle is reachable from `start`. Depth-first search with
    /// a visited set and a recursion stack; a back-edge into the stack is
    /// a cycle.
    pub(crate) fn has_cycle_from(&self, start: TransactionID) -> bool {
        let mut visited = HashSet::new();
        let mut rec_stack = HashSet::new();
        self.is_cyclic(start, &mut visited, &mut rec_stack)
    }

    fn is_cyclic(
        &self,
        tid: TransactionID,
        visited: &mut HashSet<TransactionID>,
        rec_stack: &mut HashSet<TransactionID>,
    ) -> bool {
        if !visited.contains(&tid) {
            visited.insert(tid);
            rec_stack.insert(tid);

            if let Some(transactions) = self.graph.get(&tid) {
                for &t in transactions {
                    if !visited.contains(&t) && self.is_cyclic(t, visited, rec_stack) {
                        return true;
                    } else if rec_stack.contains(&t) {
                        return true;
                    }
                }
            }
        }

        rec_stack.remove(&tid);
        false
    }
}
