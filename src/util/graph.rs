//
//  Copyright (C) 2022-2024  Chase Ruskin
//
//  This program is free software: you can redistribute it and/or modify
//  it under the terms of the GNU General Public License as published by
//  the Free Software Foundation, either version 3 of the License, or
//  (at your option) any later version.
//
//  This program is distributed in the hope that it will be useful,
//  but WITHOUT ANY WARRANTY; without even the implied warranty of
//  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
//  GNU General Public License for more details.
//
//  You should have received a copy of the GNU General Public License
//  along with this program.  If not, see <http://www.gnu.org/licenses/>.
//

//! Basic directed graph stored as index-linked vertex and edge lists.
//!
//! An edge `source -> target` reads as "`source` must be processed before
//! `target`", so a topological sort lists every node after its predecessors.

pub type NodeIndex = usize;

type EdgeIndex = usize;

#[derive(Debug, PartialEq)]
struct NodeData<V> {
    node: V,
    first_outgoing_edge: Option<EdgeIndex>,
    first_incoming_edge: Option<EdgeIndex>,
}

#[derive(Debug, PartialEq)]
struct EdgeData<E> {
    edge: E,
    source: NodeIndex,
    target: NodeIndex,
    next_outgoing_edge: Option<EdgeIndex>,
    next_incoming_edge: Option<EdgeIndex>,
}

#[derive(Debug, PartialEq)]
pub struct Graph<V, E> {
    vertices: Vec<NodeData<V>>,
    edges: Vec<EdgeData<E>>,
}

#[derive(Debug, PartialEq)]
pub enum EdgeStatus {
    MissingSource,
    MissingTarget,
    SelfLoop,
    AlreadyExists,
    Success,
}

impl<V, E> Graph<V, E> {
    /// Creates an empty `Graph` struct.
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            edges: Vec::new(),
        }
    }

    /// Adds a new node to the graph.
    ///
    /// Returns the `NodeIndex` to remember the node.
    pub fn add_node(&mut self, node: V) -> NodeIndex {
        let index = self.vertices.len();
        self.vertices.push(NodeData {
            node: node,
            first_outgoing_edge: None,
            first_incoming_edge: None,
        });
        index
    }

    /// Checks if a given `source` node is in the graph.
    pub fn has_node(&self, source: NodeIndex) -> bool {
        source < self.node_count()
    }

    /// Checks if a given `source` node is connected to the given `target` node.
    pub fn has_edge(&self, source: NodeIndex, target: NodeIndex) -> bool {
        self.has_node(source) && self.successors(source).any(|f| f == target)
    }

    pub fn node_count(&self) -> usize {
        self.vertices.len()
    }

    /// Accesses the node data label behind the `node` index.
    pub fn get_node(&self, node: NodeIndex) -> Option<&V> {
        Some(&self.vertices.get(node)?.node)
    }

    /// Adds a new edge to the graph from `source` to `target`.
    ///
    /// Duplicate edges and self-loops are rejected and leave the graph untouched.
    pub fn add_edge(&mut self, source: NodeIndex, target: NodeIndex, cost: E) -> EdgeStatus {
        if self.has_node(source) == false {
            return EdgeStatus::MissingSource;
        }
        if self.has_node(target) == false {
            return EdgeStatus::MissingTarget;
        }
        if source == target {
            return EdgeStatus::SelfLoop;
        }
        if self.has_edge(source, target) == true {
            return EdgeStatus::AlreadyExists;
        }
        let edge_index = self.edges.len();
        let next_outgoing_edge = self.vertices[source].first_outgoing_edge;
        let next_incoming_edge = self.vertices[target].first_incoming_edge;
        self.edges.push(EdgeData {
            edge: cost,
            source: source,
            target: target,
            next_outgoing_edge: next_outgoing_edge,
            next_incoming_edge: next_incoming_edge,
        });
        self.vertices[source].first_outgoing_edge = Some(edge_index);
        self.vertices[target].first_incoming_edge = Some(edge_index);
        EdgeStatus::Success
    }

    /// Returns the number of predecessors to the `target` node.
    pub fn in_degree(&self, target: NodeIndex) -> usize {
        self.predecessors(target).count()
    }

    /// Creates an iterator over the incoming nodes to the `target` node.
    pub fn predecessors(&self, target: NodeIndex) -> Predecessors<V, E> {
        Predecessors {
            graph: self,
            current_edge_index: self.vertices.get(target).and_then(|n| n.first_incoming_edge),
        }
    }

    /// Creates an iterator over the outgoing nodes from the `source` node.
    pub fn successors(&self, source: NodeIndex) -> Successors<V, E> {
        Successors {
            graph: self,
            current_edge_index: self.vertices.get(source).and_then(|n| n.first_outgoing_edge),
        }
    }

    /// Orders the nodes so that every node appears after all of its predecessors.
    ///
    /// Ties are broken by the lowest node index, so the order is deterministic
    /// for a given insertion sequence. Errors with the nodes left unordered when
    /// the graph contains a cycle.
    pub fn topological_sort(&self) -> Result<Vec<NodeIndex>, Vec<NodeIndex>> {
        let mut order = Vec::with_capacity(self.node_count());
        // number of unfinished predecessors per node (`None` once the node is ordered)
        let mut remaining: Vec<Option<usize>> =
            (0..self.node_count()).map(|i| Some(self.in_degree(i))).collect();

        while let Some(current) = remaining.iter().position(|r| r == &Some(0)) {
            remaining[current] = None;
            for next in self.successors(current) {
                if let Some(Some(count)) = remaining.get_mut(next) {
                    *count -= 1;
                }
            }
            order.push(current);
        }

        match order.len() == self.node_count() {
            true => Ok(order),
            false => Err(remaining
                .iter()
                .enumerate()
                .filter_map(|(i, r)| r.map(|_| i))
                .collect()),
        }
    }
}

pub struct Predecessors<'graph, V, E> {
    graph: &'graph Graph<V, E>,
    current_edge_index: Option<EdgeIndex>,
}

impl<'graph, V, E> Iterator for Predecessors<'graph, V, E> {
    type Item = NodeIndex;

    fn next(&mut self) -> Option<Self::Item> {
        let edge = &self.graph.edges[self.current_edge_index?];
        self.current_edge_index = edge.next_incoming_edge;
        Some(edge.source)
    }
}

pub struct Successors<'graph, V, E> {
    graph: &'graph Graph<V, E>,
    current_edge_index: Option<EdgeIndex>,
}

impl<'graph, V, E> Iterator for Successors<'graph, V, E> {
    type Item = NodeIndex;

    fn next(&mut self) -> Option<Self::Item> {
        let edge = &self.graph.edges[self.current_edge_index?];
        self.current_edge_index = edge.next_outgoing_edge;
        Some(edge.target)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    /// Builds the diamond `0 -> 1 -> 3`, `0 -> 2 -> 3`.
    fn diamond() -> Graph<(), ()> {
        let mut g = Graph::new();
        for _ in 0..4 {
            g.add_node(());
        }
        g.add_edge(0, 1, ());
        g.add_edge(0, 2, ());
        g.add_edge(1, 3, ());
        g.add_edge(2, 3, ());
        g
    }

    #[test]
    fn rejects_bad_edges() {
        let mut g = diamond();
        assert_eq!(g.add_edge(0, 1, ()), EdgeStatus::AlreadyExists);
        assert_eq!(g.add_edge(2, 2, ()), EdgeStatus::SelfLoop);
        assert_eq!(g.add_edge(9, 2, ()), EdgeStatus::MissingSource);
        assert_eq!(g.add_edge(2, 9, ()), EdgeStatus::MissingTarget);
        assert_eq!(g.has_edge(1, 3), true);
        assert_eq!(g.has_edge(3, 1), false);
    }

    #[test]
    fn degrees() {
        let g = diamond();
        assert_eq!(g.in_degree(0), 0);
        assert_eq!(g.in_degree(3), 2);
        assert_eq!(g.successors(0).count(), 2);
        let mut preds: Vec<NodeIndex> = g.predecessors(3).collect();
        preds.sort();
        assert_eq!(preds, vec![1, 2]);
    }

    #[test]
    fn topological_sort() {
        let g = diamond();
        assert_eq!(g.topological_sort(), Ok(vec![0, 1, 2, 3]));

        let mut g = Graph::<&str, ()>::new();
        let a = g.add_node("a");
        let b = g.add_node("b");
        let c = g.add_node("c");
        // c before a before b
        g.add_edge(c, a, ());
        g.add_edge(a, b, ());
        assert_eq!(g.topological_sort(), Ok(vec![c, a, b]));
    }

    #[test]
    fn topological_sort_cycle() {
        let mut g = diamond();
        g.add_edge(3, 0, ());
        assert_eq!(g.topological_sort(), Err(vec![0, 1, 2, 3]));

        let mut g = Graph::<(), ()>::new();
        let free = g.add_node(());
        let x = g.add_node(());
        let y = g.add_node(());
        g.add_edge(x, y, ());
        g.add_edge(y, x, ());
        assert_eq!(g.topological_sort(), Err(vec![x, y]));
        assert_eq!(g.has_node(free), true);
    }
}
