//! Compiled state graph: immutable, supports invoke only.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::error::{GraphError, ParleyError};

use super::node::Node;
use super::{END, MAX_STEPS, START};

pub(super) type Router<S> = Arc<dyn Fn(&S) -> String + Send + Sync>;

pub(super) enum Edge<S> {
    Direct(String),
    Conditional {
        router: Router<S>,
        mapping: HashMap<String, String>,
    },
}

impl<S> Edge<S> {
    pub(super) fn targets(&self) -> Vec<&str> {
        match self {
            Self::Direct(to) => vec![to.as_str()],
            Self::Conditional { mapping, .. } => mapping.values().map(String::as_str).collect(),
        }
    }
}

/// Compiled graph. Built by [`super::StateGraph::compile`].
pub struct CompiledStateGraph<S> {
    nodes: HashMap<String, Box<dyn Node<S>>>,
    edges: HashMap<String, Edge<S>>,
}

impl<S> CompiledStateGraph<S>
where
    S: Send + 'static,
{
    pub(super) fn new(
        nodes: HashMap<String, Box<dyn Node<S>>>,
        edges: HashMap<String, Edge<S>>,
    ) -> Self {
        Self { nodes, edges }
    }

    /// Runs the graph from `START` until `END` and returns the final state.
    pub async fn invoke(&self, state: S) -> Result<S, ParleyError> {
        self.invoke_observed(state, |_| {}).await
    }

    /// Like [`invoke`](Self::invoke), calling `on_step` with each node id
    /// just before that node runs.
    pub async fn invoke_observed<F>(&self, mut state: S, mut on_step: F) -> Result<S, ParleyError>
    where
        F: FnMut(&str) + Send,
    {
        let mut current = self.next_after(START, &state)?;
        let mut steps = 0usize;

        while current != END {
            steps += 1;
            if steps > MAX_STEPS {
                return Err(GraphError::StepLimit(MAX_STEPS).into());
            }

            let node = self
                .nodes
                .get(&current)
                .ok_or_else(|| GraphError::NodeNotFound(current.clone()))?;
            debug!(node = %current, step = steps, "graph step");
            on_step(&current);
            state = node.run(state).await?;
            current = self.next_after(&current, &state)?;
        }

        Ok(state)
    }

    fn next_after(&self, from: &str, state: &S) -> Result<String, GraphError> {
        match self.edges.get(from) {
            Some(Edge::Direct(to)) => Ok(to.clone()),
            Some(Edge::Conditional { router, mapping }) => {
                let branch = router(state);
                mapping
                    .get(&branch)
                    .cloned()
                    .ok_or_else(|| GraphError::UnmappedBranch {
                        node: from.to_string(),
                        branch,
                    })
            }
            None => Err(GraphError::DeadEnd(from.to_string())),
        }
    }
}
