use petgraph::algo::{is_cyclic_directed, kosaraju_scc};
use petgraph::graph::{DiGraph, NodeIndex};
use serde_json::Value;
use std::collections::{HashMap, VecDeque};

use super::{ReferenceResolver, Target};
use crate::document::{Document, JsonPointer, reference_of};
use crate::error::ReferenceError;

/// Directed graph of reference targets: an edge `A -> B` means the subtree
/// at `A` contains a reference to `B`
pub struct ReferenceGraph {
    graph: DiGraph<String, ()>,
    node_map: HashMap<String, NodeIndex>,
}

impl ReferenceGraph {
    /// Build the graph for `document` in a fresh resolution session
    pub fn build(document: &Document) -> Result<Self, ReferenceError> {
        let mut resolver = ReferenceResolver::new(document);
        Self::from_resolver(&mut resolver)
    }

    pub fn from_resolver(resolver: &mut ReferenceResolver) -> Result<Self, ReferenceError> {
        let mut graph = DiGraph::new();
        let mut node_map = HashMap::new();

        let root = Target::root_of(resolver.root_source().clone());
        let root_id = root.id();
        node_map.insert(root_id.clone(), graph.add_node(root_id));

        let mut queue = VecDeque::from([root]);
        while let Some(target) = queue.pop_front() {
            let from = node_map[&target.id()];
            let occurrences = resolver
                .node(&target)
                .map(|node| collect_references(node, &target.pointer))
                .unwrap_or_default();

            for (raw, at) in occurrences {
                let next = resolver
                    .locate_direct(&raw, &target.source)
                    .map_err(|kind| ReferenceError {
                        reference: raw.clone(),
                        at: format!("{}#{at}", target.source),
                        kind,
                    })?;
                let id = next.id();
                let to = match node_map.get(&id) {
                    Some(&index) => index,
                    None => {
                        let index = graph.add_node(id.clone());
                        node_map.insert(id, index);
                        queue.push_back(next);
                        index
                    }
                };
                graph.update_edge(from, to, ());
            }
        }

        Ok(Self { graph, node_map })
    }

    pub fn has_cycles(&self) -> bool {
        is_cyclic_directed(&self.graph)
    }

    /// Every reference cycle as the sorted ids of its members, sorted
    pub fn cycles(&self) -> Vec<Vec<String>> {
        let mut cycles: Vec<Vec<String>> = kosaraju_scc(&self.graph)
            .into_iter()
            .filter(|scc| scc.len() > 1 || self.graph.contains_edge(scc[0], scc[0]))
            .map(|scc| {
                let mut ids: Vec<String> = scc.iter().map(|n| self.graph[*n].clone()).collect();
                ids.sort();
                ids
            })
            .collect();
        cycles.sort();
        cycles
    }

    /// Targets referenced directly from the subtree at `id`
    pub fn references_from(&self, id: &str) -> Vec<String> {
        let Some(&node) = self.node_map.get(id) else {
            return Vec::new();
        };
        let mut targets: Vec<String> = self
            .graph
            .neighbors(node)
            .map(|n| self.graph[n].clone())
            .collect();
        targets.sort();
        targets
    }

    /// Number of distinct targets, the document root included
    pub fn target_count(&self) -> usize {
        self.graph.node_count()
    }
}

/// `(reference, pointer)` for every reference object below `node`, without
/// descending into the references themselves
fn collect_references(node: &Value, base: &JsonPointer) -> Vec<(String, JsonPointer)> {
    let mut found = Vec::new();
    let mut stack = vec![(node, base.clone())];

    while let Some((value, pointer)) = stack.pop() {
        if let Some(reference) = reference_of(value) {
            found.push((reference.to_string(), pointer));
            continue;
        }
        match value {
            Value::Object(map) => {
                for (key, child) in map.iter().rev() {
                    stack.push((child, pointer.child(key.clone())));
                }
            }
            Value::Array(items) => {
                for (index, child) in items.iter().enumerate().rev() {
                    stack.push((child, pointer.child(index.to_string())));
                }
            }
            _ => {}
        }
    }
    found
}
