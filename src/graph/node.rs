//! Graph node trait: one step in a StateGraph.

use std::future::Future;
use std::marker::PhantomData;
use std::pin::Pin;

use async_trait::async_trait;

use crate::error::ParleyError;

/// One step in a graph: state in, state out.
///
/// Routing is not the node's concern; the graph's edges decide what runs next.
#[async_trait]
pub trait Node<S>: Send + Sync
where
    S: Send + 'static,
{
    async fn run(&self, state: S) -> Result<S, ParleyError>;
}

type NodeFuture<S> = Pin<Box<dyn Future<Output = Result<S, ParleyError>> + Send>>;

/// Closure-backed node for small synchronous or async steps.
pub struct FnNode<S, F> {
    f: F,
    _state: PhantomData<fn(S) -> S>,
}

impl<S, F, Fut> FnNode<S, F>
where
    F: Fn(S) -> Fut + Send + Sync,
    Fut: Future<Output = Result<S, ParleyError>> + Send + 'static,
{
    pub fn new(f: F) -> Self {
        Self {
            f,
            _state: PhantomData,
        }
    }
}

#[async_trait]
impl<S, F, Fut> Node<S> for FnNode<S, F>
where
    S: Send + 'static,
    F: Fn(S) -> Fut + Send + Sync,
    Fut: Future<Output = Result<S, ParleyError>> + Send + 'static,
{
    async fn run(&self, state: S) -> Result<S, ParleyError> {
        let fut: NodeFuture<S> = Box::pin((self.f)(state));
        fut.await
    }
}
