use std::collections::BTreeSet;

use crate::taxonomy::TaxonomyGraph;

/// Traversal state shared across all DFS roots of one graph.
#[derive(Debug, Default)]
struct Traversal<'a> {
    visited: BTreeSet<&'a str>,
    on_stack: BTreeSet<&'a str>,
    path: Vec<&'a str>,
    frames: Vec<Frame<'a>>,
}

#[derive(Debug)]
struct Frame<'a> {
    parents: Vec<&'a str>,
    next: usize,
}

impl<'a> Traversal<'a> {
    fn enter(&mut self, graph: &'a TaxonomyGraph, node: &'a str) {
        self.visited.insert(node);
        self.on_stack.insert(node);
        self.path.push(node);
        self.frames.push(Frame {
            parents: graph
                .parents(node)
                .into_iter()
                .flatten()
                .map(String::as_str)
                .collect(),
            next: 0,
        });
    }

    fn leave(&mut self) {
        self.frames.pop();
        if let Some(node) = self.path.pop() {
            self.on_stack.remove(node);
        }
    }

    fn next_parent(&mut self) -> Option<Option<&'a str>> {
        let frame = self.frames.last_mut()?;
        let parent = frame.parents.get(frame.next).copied();
        frame.next += 1;
        Some(parent)
    }
}

/// Finds cycles along child-to-parent edges with an explicit-stack DFS.
///
/// Each cycle is the path segment from the re-entered node back to itself, so
/// `A -> B -> C -> A` comes out as `["A", "B", "C", "A"]`. Fully visited subtrees are
/// never re-explored, which keeps the walk O(V + E) and reports each cycle once.
pub fn find_cycles(graph: &TaxonomyGraph) -> Vec<Vec<String>> {
    let mut traversal = Traversal::default();
    let mut cycles = Vec::new();

    for start in graph.terms() {
        if traversal.visited.contains(start) {
            continue;
        }
        traversal.enter(graph, start);

        while let Some(step) = traversal.next_parent() {
            let Some(parent) = step else {
                traversal.leave();
                continue;
            };

            if traversal.on_stack.contains(parent) {
                let from = traversal
                    .path
                    .iter()
                    .position(|node| *node == parent)
                    .unwrap_or(0);
                let mut cycle = traversal.path[from..]
                    .iter()
                    .map(|node| node.to_string())
                    .collect::<Vec<_>>();
                cycle.push(parent.to_string());
                cycles.push(cycle);
            } else if !traversal.visited.contains(parent) {
                traversal.enter(graph, parent);
            }
        }
    }

    cycles
}
