//! Graph builder.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::error::{GraphError, ParleyError};

use super::compiled::{CompiledStateGraph, Edge, Router};
use super::node::Node;
use super::{END, START};

/// Mutable graph under construction. Generic over the state type `S`.
///
/// Builder calls never fail; problems are collected and reported by
/// [`StateGraph::compile`].
pub struct StateGraph<S> {
    nodes: HashMap<String, Box<dyn Node<S>>>,
    edges: Vec<(String, Edge<S>)>,
    errors: Vec<GraphError>,
}

impl<S> Default for StateGraph<S>
where
    S: Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<S> StateGraph<S>
where
    S: Send + 'static,
{
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            edges: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Adds a node under a unique id.
    pub fn add_node(&mut self, id: impl Into<String>, node: Box<dyn Node<S>>) -> &mut Self {
        let id = id.into();
        if id == START || id == END || self.nodes.contains_key(&id) {
            self.errors.push(GraphError::DuplicateNode(id));
            return self;
        }
        self.nodes.insert(id, node);
        self
    }

    /// Adds an unconditional edge. `from` may be [`START`]; `to` may be [`END`].
    pub fn add_edge(&mut self, from: impl Into<String>, to: impl Into<String>) -> &mut Self {
        self.edges.push((from.into(), Edge::Direct(to.into())));
        self
    }

    /// Adds a conditional edge: after `from` runs, `router` picks a key and
    /// `mapping` turns that key into the next node id.
    pub fn add_conditional_edges<R, K, T>(
        &mut self,
        from: impl Into<String>,
        router: R,
        mapping: impl IntoIterator<Item = (K, T)>,
    ) -> &mut Self
    where
        R: Fn(&S) -> String + Send + Sync + 'static,
        K: Into<String>,
        T: Into<String>,
    {
        let router: Router<S> = Arc::new(router);
        let mapping = mapping
            .into_iter()
            .map(|(k, t)| (k.into(), t.into()))
            .collect();
        self.edges
            .push((from.into(), Edge::Conditional { router, mapping }));
        self
    }

    /// Validates the graph and freezes it.
    pub fn compile(mut self) -> Result<CompiledStateGraph<S>, ParleyError> {
        if let Some(err) = self.errors.drain(..).next() {
            return Err(err.into());
        }

        let entry_count = self.edges.iter().filter(|(from, _)| from == START).count();
        if entry_count != 1 {
            return Err(GraphError::EntryPoint(entry_count).into());
        }

        let mut seen = HashSet::new();
        for (from, edge) in &self.edges {
            if from != START && !self.nodes.contains_key(from) {
                return Err(GraphError::NodeNotFound(from.clone()).into());
            }
            if !seen.insert(from.as_str()) {
                return Err(GraphError::FanOut(from.clone()).into());
            }
            for target in edge.targets() {
                if target != END && !self.nodes.contains_key(target) {
                    return Err(GraphError::NodeNotFound(target.to_string()).into());
                }
            }
        }

        let mut ids: Vec<&String> = self.nodes.keys().collect();
        ids.sort();
        if let Some(dead) = ids.into_iter().find(|id| !seen.contains(id.as_str())) {
            return Err(GraphError::DeadEnd(dead.clone()).into());
        }

        Ok(CompiledStateGraph::new(
            self.nodes,
            self.edges.into_iter().collect(),
        ))
    }
}
