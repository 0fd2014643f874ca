//! Bounded chain walks over single-successor links.
//!
//! Both prerequisite chains and replacement chains are functional graphs: each
//! node points at zero or one successor. A walk follows successors until it
//! runs out, revisits a node, or steps off the known set.

use std::collections::HashSet;
use std::hash::Hash;

/// How a walk ended. Every variant carries the path walked, start first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Walk<I> {
    /// The last node has no successor
    End(Vec<I>),
    /// The last element repeats an earlier node
    Cycle(Vec<I>),
    /// The last node points at an id the caller does not know
    Dangling { path: Vec<I>, missing: I },
}

/// Follow successors from `start`.
///
/// `bound` is the size of the node set; a walk longer than that must have
/// looped, so it is reported as a cycle even if the visited set missed it.
pub(crate) fn walk<I, N, C>(start: I, bound: usize, mut next: N, contains: C) -> Walk<I>
where
    I: Copy + Eq + Hash,
    N: FnMut(I) -> Option<I>,
    C: Fn(I) -> bool,
{
    let mut visited = HashSet::new();
    let mut path = vec![start];
    visited.insert(start);
    let mut current = start;

    loop {
        let Some(successor) = next(current) else {
            return Walk::End(path);
        };
        if !contains(successor) {
            return Walk::Dangling {
                path,
                missing: successor,
            };
        }
        path.push(successor);
        if !visited.insert(successor) || path.len() > bound + 1 {
            return Walk::Cycle(path);
        }
        current = successor;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn links(pairs: &[(u32, u32)]) -> HashMap<u32, u32> {
        pairs.iter().copied().collect()
    }

    fn run(map: &HashMap<u32, u32>, nodes: &[u32], start: u32) -> Walk<u32> {
        walk(
            start,
            nodes.len(),
            |n| map.get(&n).copied(),
            |n| nodes.contains(&n),
        )
    }

    #[test]
    fn walks_to_the_end() {
        let map = links(&[(1, 2), (2, 3)]);
        assert_eq!(run(&map, &[1, 2, 3], 1), Walk::End(vec![1, 2, 3]));
    }

    #[test]
    fn detects_cycle() {
        let map = links(&[(1, 2), (2, 1)]);
        assert_eq!(run(&map, &[1, 2], 1), Walk::Cycle(vec![1, 2, 1]));
    }

    #[test]
    fn detects_self_loop() {
        let map = links(&[(1, 1)]);
        assert_eq!(run(&map, &[1], 1), Walk::Cycle(vec![1, 1]));
    }

    #[test]
    fn detects_dangling() {
        let map = links(&[(1, 9)]);
        assert_eq!(
            run(&map, &[1], 1),
            Walk::Dangling {
                path: vec![1],
                missing: 9
            }
        );
    }

    #[test]
    fn cycle_reachable_from_tail() {
        let map = links(&[(1, 2), (2, 3), (3, 2)]);
        assert_eq!(run(&map, &[1, 2, 3], 1), Walk::Cycle(vec![1, 2, 3, 2]));
    }
}
