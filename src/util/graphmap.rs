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

use super::graph::{EdgeStatus, Graph, NodeIndex};
use std::collections::HashMap;
use std::hash::Hash;

/// A [Graph] whose nodes are addressed by a unique key and carry a value.
#[derive(Debug, PartialEq)]
pub struct GraphMap<K: Eq + Hash + Clone, V, E> {
    graph: Graph<K, E>,
    map: HashMap<K, Node<V>>,
}

#[derive(Debug, PartialEq)]
pub struct Node<V>(V, NodeIndex);

impl<V> Node<V> {
    pub fn index(&self) -> NodeIndex {
        self.1
    }

    pub fn as_ref(&self) -> &V {
        &self.0
    }
}

impl<K: Eq + Hash + Clone, V, E> GraphMap<K, V, E> {
    pub fn new() -> Self {
        Self {
            graph: Graph::new(),
            map: HashMap::new(),
        }
    }

    /// Inserts a node under `key`.
    ///
    /// Returns the existing node's index without modification if the key is
    /// already taken.
    pub fn add_node(&mut self, key: K, value: V) -> NodeIndex {
        if let Some(existing) = self.map.get(&key) {
            return existing.index();
        }
        let index = self.graph.add_node(key.clone());
        self.map.insert(key, Node(value, index));
        index
    }

    pub fn add_edge_by_key(&mut self, source: &K, target: &K, cost: E) -> EdgeStatus {
        let source = match self.map.get(source) {
            Some(n) => n.index(),
            None => return EdgeStatus::MissingSource,
        };
        let target = match self.map.get(target) {
            Some(n) => n.index(),
            None => return EdgeStatus::MissingTarget,
        };
        self.graph.add_edge(source, target, cost)
    }

    pub fn get_node_by_index(&self, index: NodeIndex) -> Option<&Node<V>> {
        self.map.get(self.graph.get_node(index)?)
    }

    pub fn get_key_by_index(&self, index: NodeIndex) -> Option<&K> {
        self.graph.get_node(index)
    }

    /// Lists the keys of the nodes directly after `key` in the graph.
    pub fn successors_by_key(&self, key: &K) -> Vec<&K> {
        match self.map.get(key) {
            Some(n) => self
                .graph
                .successors(n.index())
                .filter_map(|i| self.graph.get_node(i))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Lists the keys of the nodes directly before `key` in the graph.
    pub fn predecessors_by_key(&self, key: &K) -> Vec<&K> {
        match self.map.get(key) {
            Some(n) => self
                .graph
                .predecessors(n.index())
                .filter_map(|i| self.graph.get_node(i))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Orders the node values so each appears after all of its predecessors.
    ///
    /// Errors with the keys caught in (or behind) a cycle.
    pub fn topological_values(&self) -> Result<Vec<&V>, Vec<&K>> {
        match self.graph.topological_sort() {
            Ok(order) => Ok(order
                .into_iter()
                .filter_map(|i| self.get_node_by_index(i).map(|n| n.as_ref()))
                .collect()),
            Err(stuck) => Err(stuck
                .into_iter()
                .filter_map(|i| self.get_key_by_index(i))
                .collect()),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn keyed_edges() {
        let mut g = GraphMap::<String, u8, ()>::new();
        g.add_node("ieee".to_string(), 0);
        g.add_node("osvvm".to_string(), 1);
        g.add_node("work".to_string(), 2);
        assert_eq!(g.add_node("work".to_string(), 99), 2);

        assert_eq!(g.add_edge_by_key(&"ieee".to_string(), &"osvvm".to_string(), ()), EdgeStatus::Success);
        assert_eq!(g.add_edge_by_key(&"osvvm".to_string(), &"work".to_string(), ()), EdgeStatus::Success);
        assert_eq!(g.add_edge_by_key(&"uvvm".to_string(), &"work".to_string(), ()), EdgeStatus::MissingSource);
        assert_eq!(g.add_edge_by_key(&"work".to_string(), &"uvvm".to_string(), ()), EdgeStatus::MissingTarget);

        assert_eq!(g.successors_by_key(&"ieee".to_string()), vec![&"osvvm".to_string()]);
        assert_eq!(g.predecessors_by_key(&"work".to_string()), vec![&"osvvm".to_string()]);
        assert_eq!(g.topological_values(), Ok(vec![&0, &1, &2]));
    }

    #[test]
    fn keyed_cycle() {
        let mut g = GraphMap::<&str, (), ()>::new();
        g.add_node("a", ());
        g.add_node("b", ());
        g.add_edge_by_key(&"a", &"b", ());
        g.add_edge_by_key(&"b", &"a", ());
        assert_eq!(g.topological_values(), Err(vec![&"a", &"b"]));
    }
}
