//! File-level import graph and cycle detection.

use std::collections::{BTreeSet, HashMap};

use petgraph::graph::{DiGraph, NodeIndex};
use serde::Serialize;

use crate::index::import_resolver::{HeuristicResolver, ImportResolver, KnownFiles};
use crate::index::models::{ImportRef, RepoMap};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyEdge {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DependencyGraph {
    pub nodes: Vec<String>,
    pub edges: Vec<DependencyEdge>,
}

/// An import statement together with the file it resolved to.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedImport<'a> {
    pub from: &'a str,
    pub to: &'a str,
    pub import: &'a ImportRef,
}

/// Every import statement of `map` that resolves to another known file,
/// in map order.
pub fn resolve_imports<'a>(
    map: &'a RepoMap,
    resolver: &dyn ImportResolver,
) -> Vec<ResolvedImport<'a>> {
    let known = KnownFiles::from_map(map);
    let mut resolved = Vec::new();
    for (file, entry) in &map.files {
        for import in &entry.imports {
            let Some(target) = resolver.resolve(file, &import.source, &known) else {
                continue;
            };
            // Borrow the map's own key so edges outlive the resolver's String
            let Some((to, _)) = map.files.get_key_value(&target) else {
                continue;
            };
            if to == file {
                continue;
            }
            resolved.push(ResolvedImport {
                from: file,
                to,
                import,
            });
        }
    }
    resolved
}

pub fn get_dependency_graph(map: &RepoMap) -> DependencyGraph {
    get_dependency_graph_with(map, &HeuristicResolver::new())
}

/// Nodes are all file keys, sorted; one edge per resolvable import
/// statement, so two statements importing the same file give two edges.
pub fn get_dependency_graph_with(map: &RepoMap, resolver: &dyn ImportResolver) -> DependencyGraph {
    DependencyGraph {
        nodes: map.paths().map(String::from).collect(),
        edges: resolve_imports(map, resolver)
            .into_iter()
            .map(|r| DependencyEdge {
                from: r.from.to_string(),
                to: r.to.to_string(),
            })
            .collect(),
    }
}

pub fn find_circular_dependencies(map: &RepoMap) -> Vec<Vec<String>> {
    find_circular_dependencies_with(map, &HeuristicResolver::new())
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Color {
    White,
    Gray,
    Black,
}

/// Cycles found as back-edges of a depth-first search, each rotated to
/// start at its smallest path and reported once. Acyclic maps give `[]`.
///
/// Not every elementary cycle is reported. A cycle that is only reachable
/// through a node the search has already finished produces no back-edge:
/// with `a -> b -> c -> a` and `a -> c`, only `[a, b, c]` comes back.
pub fn find_circular_dependencies_with(
    map: &RepoMap,
    resolver: &dyn ImportResolver,
) -> Vec<Vec<String>> {
    let graph = build_graph(map, resolver);

    // Sorted, de-duplicated successor lists keep the traversal deterministic
    let successors: Vec<Vec<NodeIndex>> = graph
        .node_indices()
        .map(|node| {
            let targets: BTreeSet<NodeIndex> = graph.neighbors(node).collect();
            targets.into_iter().collect()
        })
        .collect();

    let mut color = vec![Color::White; graph.node_count()];
    let mut seen: BTreeSet<Vec<String>> = BTreeSet::new();
    let mut cycles = Vec::new();

    for start in graph.node_indices() {
        if color[start.index()] != Color::White {
            continue;
        }

        // (node, index of the next successor to visit)
        let mut stack: Vec<(NodeIndex, usize)> = vec![(start, 0)];
        let mut path: Vec<NodeIndex> = vec![start];
        color[start.index()] = Color::Gray;

        while let Some(&(node, next)) = stack.last() {
            let Some(&child) = successors[node.index()].get(next) else {
                color[node.index()] = Color::Black;
                stack.pop();
                path.pop();
                continue;
            };
            if let Some(top) = stack.last_mut() {
                top.1 += 1;
            }

            match color[child.index()] {
                Color::White => {
                    color[child.index()] = Color::Gray;
                    stack.push((child, 0));
                    path.push(child);
                }
                Color::Gray => {
                    if let Some(pos) = path.iter().position(|n| *n == child) {
                        let cycle: Vec<String> =
                            path[pos..].iter().map(|n| graph[*n].clone()).collect();
                        let cycle = rotate_to_smallest(cycle);
                        if seen.insert(cycle.clone()) {
                            cycles.push(cycle);
                        }
                    }
                }
                Color::Black => {}
            }
        }
    }

    cycles
}

fn build_graph(map: &RepoMap, resolver: &dyn ImportResolver) -> DiGraph<String, ()> {
    let mut graph = DiGraph::new();
    let mut index: HashMap<&str, NodeIndex> = HashMap::new();
    for path in map.paths() {
        index.insert(path, graph.add_node(path.to_string()));
    }
    for edge in resolve_imports(map, resolver) {
        if let (Some(&from), Some(&to)) = (index.get(edge.from), index.get(edge.to)) {
            graph.add_edge(from, to, ());
        }
    }
    graph
}

fn rotate_to_smallest(mut cycle: Vec<String>) -> Vec<String> {
    if let Some(min) = cycle
        .iter()
        .enumerate()
        .min_by(|a, b| a.1.cmp(b.1))
        .map(|(i, _)| i)
    {
        cycle.rotate_left(min);
    }
    cycle
}
