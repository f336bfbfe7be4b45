//! Parent/child forest construction and flattening for display.
//!
//! Records are kept in an arena indexed by position; parent links are PIDs
//! resolved through a map, so no record owns another.

use ahash::AHashMap as HashMap;

use crate::process::record::ProcessRecord;
use crate::process::sort::{sort_processes, SortColumn};

/// A record placed in display order with its tree depth.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub record: ProcessRecord,
    pub depth: usize,
}

/// Flat display: sorted records, all at depth 0.
pub fn flat_rows(mut records: Vec<ProcessRecord>, column: SortColumn) -> Vec<Row> {
    sort_processes(&mut records, column);
    records
        .into_iter()
        .map(|record| Row { record, depth: 0 })
        .collect()
}

/// Builds the forest and returns its pre-order traversal.
///
/// A record whose parent is not in `records` becomes a root. Siblings and
/// roots are ordered by `column`. Every record appears exactly once, even
/// if the parent links form a cycle.
pub fn flatten_tree(mut records: Vec<ProcessRecord>, column: SortColumn) -> Vec<Row> {
    // sorting first makes every child list come out in sibling order
    sort_processes(&mut records, column);

    let index_by_pid: HashMap<u32, usize> = records
        .iter()
        .enumerate()
        .map(|(idx, r)| (r.pid, idx))
        .collect();

    let mut children: Vec<Vec<usize>> = vec![Vec::new(); records.len()];
    let mut roots = Vec::new();
    for (idx, record) in records.iter().enumerate() {
        let parent = record
            .parent_pid
            .filter(|&ppid| ppid != record.pid)
            .and_then(|ppid| index_by_pid.get(&ppid).copied());
        match parent {
            Some(parent_idx) => children[parent_idx].push(idx),
            None => roots.push(idx),
        }
    }

    let mut order: Vec<(usize, usize)> = Vec::with_capacity(records.len());
    let mut visited = vec![false; records.len()];
    for root in roots {
        walk(root, &children, &mut visited, &mut order);
    }

    // members of a parent cycle are never reached from a root; promote them
    for idx in 0..records.len() {
        if !visited[idx] {
            walk(idx, &children, &mut visited, &mut order);
        }
    }

    let mut slots: Vec<Option<ProcessRecord>> = records.into_iter().map(Some).collect();
    order
        .into_iter()
        .filter_map(|(idx, depth)| slots[idx].take().map(|record| Row { record, depth }))
        .collect()
}

/// Iterative pre-order walk from `start`, appending `(index, depth)` pairs.
fn walk(
    start: usize,
    children: &[Vec<usize>],
    visited: &mut [bool],
    order: &mut Vec<(usize, usize)>,
) {
    let mut stack = vec![(start, 0usize)];
    while let Some((idx, depth)) = stack.pop() {
        if visited[idx] {
            continue;
        }
        visited[idx] = true;
        order.push((idx, depth));
        // reversed so the first sibling is popped first
        for &child in children[idx].iter().rev() {
            if !visited[child] {
                stack.push((child, depth + 1));
            }
        }
    }
}
