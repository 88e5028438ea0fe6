//! Generic cycle detection over directed edges
//!
//! Strongly connected components come from Tarjan's algorithm; each
//! component is then reduced to one representative elementary loop through
//! its smallest member, which keeps reported cycles stable across runs.

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, VecDeque};

/// Controls for cycle detection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleConfig {
    /// Whether a node holding itself counts as a cycle
    #[serde(default = "default_include_self_loops")]
    pub include_self_loops: bool,
    /// Cap on reported cycles, applied after canonical sorting
    #[serde(default)]
    pub max_cycles: Option<usize>,
}

fn default_include_self_loops() -> bool {
    true
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            include_self_loops: true,
            max_cycles: None,
        }
    }
}

/// One detected cycle.
///
/// `members` is the loop node sequence, canonically rotated to start at the
/// lexicographically smallest name; `edges` chain accordingly, ending with
/// the edge back to the start.
#[derive(Debug, Clone, PartialEq)]
pub struct Cycle<E> {
    pub edges: Vec<E>,
    pub members: Vec<String>,
}

impl<E> Cycle<E> {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Member names, ascending
    pub fn sorted_members(&self) -> Vec<String> {
        let mut m = self.members.clone();
        m.sort();
        m
    }
}

/// Find cycles among `edges`, reported in a stable order: sorted by the
/// smallest member name, one representative loop per strongly connected
/// component.
pub fn detect_cycles<E, FS, FT>(
    nodes: &[String],
    edges: &[E],
    source: FS,
    target: FT,
    config: &CycleConfig,
) -> Vec<Cycle<E>>
where
    E: Clone,
    FS: Fn(&E) -> &str,
    FT: Fn(&E) -> &str,
{
    let mut names: BTreeSet<&str> = nodes.iter().map(String::as_str).collect();
    for e in edges {
        names.insert(source(e));
        names.insert(target(e));
    }

    let mut graph: DiGraph<&str, usize> = DiGraph::new();
    let mut index: BTreeMap<&str, NodeIndex> = BTreeMap::new();
    for name in &names {
        let ix = graph.add_node(name);
        index.insert(name, ix);
    }
    for (i, e) in edges.iter().enumerate() {
        graph.add_edge(index[source(e)], index[target(e)], i);
    }

    // Adjacency sorted by (target, edge index) makes every walk deterministic
    let mut adjacency: BTreeMap<&str, Vec<(&str, usize)>> = BTreeMap::new();
    for (i, e) in edges.iter().enumerate() {
        adjacency.entry(source(e)).or_default().push((target(e), i));
    }
    for targets in adjacency.values_mut() {
        targets.sort();
    }

    let mut cycles: Vec<Cycle<E>> = Vec::new();
    for scc in tarjan_scc(&graph) {
        let mut members: Vec<&str> = scc.iter().map(|&ix| graph[ix]).collect();
        members.sort();

        if members.len() == 1 {
            if !config.include_self_loops {
                continue;
            }
            let node = members[0];
            let self_edge = adjacency
                .get(node)
                .and_then(|ts| ts.iter().find(|(t, _)| *t == node));
            if let Some(&(_, i)) = self_edge {
                cycles.push(Cycle {
                    edges: vec![edges[i].clone()],
                    members: vec![node.to_string()],
                });
            }
            continue;
        }

        let member_set: BTreeSet<&str> = members.iter().copied().collect();
        if let Some(cycle) = shortest_loop(members[0], &member_set, &adjacency, edges) {
            cycles.push(cycle);
        }
    }

    cycles.sort_by(|a, b| a.members.cmp(&b.members));
    if let Some(max) = config.max_cycles {
        cycles.truncate(max);
    }
    cycles
}

/// BFS for the shortest elementary loop through `start` inside one strongly
/// connected component
fn shortest_loop<'a, E: Clone>(
    start: &'a str,
    scc: &BTreeSet<&'a str>,
    adjacency: &BTreeMap<&'a str, Vec<(&'a str, usize)>>,
    edges: &[E],
) -> Option<Cycle<E>> {
    let mut parent: BTreeMap<&str, (&str, usize)> = BTreeMap::new();
    let mut queue: VecDeque<&str> = VecDeque::new();

    if let Some(neighbors) = adjacency.get(start) {
        for &(t, i) in neighbors {
            if t != start && scc.contains(t) && !parent.contains_key(t) {
                parent.insert(t, (start, i));
                queue.push_back(t);
            }
        }
    }

    while let Some(u) = queue.pop_front() {
        let Some(neighbors) = adjacency.get(u) else {
            continue;
        };
        for &(t, i) in neighbors {
            if !scc.contains(t) {
                continue;
            }
            if t == start {
                return Some(reconstruct(start, u, i, &parent, edges));
            }
            if !parent.contains_key(t) {
                parent.insert(t, (u, i));
                queue.push_back(t);
            }
        }
    }
    None
}

fn reconstruct<E: Clone>(
    start: &str,
    last: &str,
    closing_edge: usize,
    parent: &BTreeMap<&str, (&str, usize)>,
    edges: &[E],
) -> Cycle<E> {
    let mut rev_members: Vec<String> = Vec::new();
    let mut rev_edges: Vec<usize> = Vec::new();
    let mut current = last;
    while current != start {
        rev_members.push(current.to_string());
        let (prev, i) = parent[current];
        rev_edges.push(i);
        current = prev;
    }

    let mut members = vec![start.to_string()];
    members.extend(rev_members.into_iter().rev());

    let mut edge_list: Vec<E> = rev_edges.into_iter().rev().map(|i| edges[i].clone()).collect();
    edge_list.push(edges[closing_edge].clone());

    Cycle {
        edges: edge_list,
        members,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type E = (String, String);

    fn edge(from: &str, to: &str) -> E {
        (from.to_string(), to.to_string())
    }

    fn run(edges: &[E], config: &CycleConfig) -> Vec<Cycle<E>> {
        detect_cycles(&[], edges, |e| e.0.as_str(), |e| e.1.as_str(), config)
    }

    #[test]
    fn three_node_cycle_is_reported_once_starting_at_smallest() {
        let edges = vec![edge("B", "C"), edge("C", "A"), edge("A", "B")];
        let cycles = run(&edges, &CycleConfig::default());

        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0].members, vec!["A", "B", "C"]);
        assert_eq!(cycles[0].edges.len(), 3);
        assert_eq!(cycles[0].edges[0], edge("A", "B"));
        assert_eq!(cycles[0].edges[2], edge("C", "A"));
    }

    #[test]
    fn acyclic_graphs_report_nothing() {
        let diamond = vec![
            edge("A", "B"),
            edge("A", "C"),
            edge("B", "D"),
            edge("C", "D"),
        ];
        assert!(run(&diamond, &CycleConfig::default()).is_empty());
    }

    #[test]
    fn separate_cycles_sort_by_smallest_member() {
        let edges = vec![
            edge("X", "Y"),
            edge("Y", "X"),
            edge("A", "B"),
            edge("B", "A"),
        ];
        let cycles = run(&edges, &CycleConfig::default());
        assert_eq!(cycles.len(), 2);
        assert_eq!(cycles[0].members, vec!["A", "B"]);
        assert_eq!(cycles[1].members, vec!["X", "Y"]);
    }

    #[test]
    fn self_loops_follow_the_config() {
        let edges = vec![edge("A", "A")];

        let with = run(&edges, &CycleConfig::default());
        assert_eq!(with.len(), 1);
        assert_eq!(with[0].members, vec!["A"]);
        assert_eq!(with[0].edges.len(), 1);

        let without = run(
            &edges,
            &CycleConfig {
                include_self_loops: false,
                max_cycles: None,
            },
        );
        assert!(without.is_empty());
    }

    #[test]
    fn max_cycles_caps_after_sorting() {
        let edges = vec![
            edge("X", "Y"),
            edge("Y", "X"),
            edge("A", "B"),
            edge("B", "A"),
        ];
        let cycles = run(
            &edges,
            &CycleConfig {
                include_self_loops: true,
                max_cycles: Some(1),
            },
        );
        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0].members, vec!["A", "B"]);
    }

    #[test]
    fn result_is_independent_of_edge_order() {
        let forward = vec![edge("A", "B"), edge("B", "C"), edge("C", "A")];
        let shuffled = vec![edge("C", "A"), edge("A", "B"), edge("B", "C")];
        let a = run(&forward, &CycleConfig::default());
        let b = run(&shuffled, &CycleConfig::default());
        assert_eq!(a, b);
    }

    #[test]
    fn nested_sccs_yield_one_representative_loop() {
        // Two overlapping loops through B; a single component
        let edges = vec![
            edge("A", "B"),
            edge("B", "A"),
            edge("B", "C"),
            edge("C", "A"),
        ];
        let cycles = run(&edges, &CycleConfig::default());
        assert_eq!(cycles.len(), 1);
        // Shortest loop through the smallest member
        assert_eq!(cycles[0].members, vec!["A", "B"]);
    }
}
