//! Validated workflow graph.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use petgraph::Direction;
use petgraph::algo::{has_path_connecting, is_cyclic_directed};
use petgraph::graph::{DiGraph, NodeIndex};

use super::{Node, NodeId, NodeKind, WorkflowDefinition, WorkflowMetadata};
use crate::error::{MalformedGraph, ValidationError, WorkflowResult};

/// A workflow definition in graph form.
///
/// Nodes are inserted in declaration order, so a node's petgraph index is
/// also its declaration index. Internally uses petgraph's `DiGraph`.
#[derive(Debug, Clone)]
pub struct WorkflowGraph {
    /// The underlying directed graph.
    graph: DiGraph<Node, ()>,
    /// Mapping from node id to petgraph's NodeIndex.
    node_indices: HashMap<NodeId, NodeIndex>,
    /// Workflow metadata.
    metadata: WorkflowMetadata,
}

impl WorkflowGraph {
    /// Validates a definition and builds its graph.
    ///
    /// Checks run in a fixed order and the first failure is returned:
    /// required kinds (`UserQuery`, then `Output`), duplicate node ids,
    /// dangling edge endpoints, and finally cycles.
    pub fn validated(definition: &WorkflowDefinition) -> WorkflowResult<Self> {
        for required in [NodeKind::UserQuery, NodeKind::Output] {
            if !definition.nodes.iter().any(|node| node.kind == required) {
                return Err(ValidationError::MissingNodeKind(required).into());
            }
        }

        let graph = Self::from_definition(definition)?;
        if graph.is_cyclic() {
            tracing::debug!(
                target: super::TRACING_TARGET,
                node_count = graph.node_count(),
                "Rejected cyclic workflow"
            );
            return Err(ValidationError::CyclicGraph.into());
        }

        Ok(graph)
    }

    /// Builds the graph without checking kinds or cycles.
    pub fn from_definition(definition: &WorkflowDefinition) -> Result<Self, ValidationError> {
        let mut graph = DiGraph::with_capacity(definition.nodes.len(), definition.edges.len());
        let mut node_indices = HashMap::with_capacity(definition.nodes.len());

        for node in &definition.nodes {
            if node_indices.contains_key(&node.id) {
                return Err(MalformedGraph::DuplicateNodeId(node.id.clone()).into());
            }
            let index = graph.add_node(node.clone());
            node_indices.insert(node.id.clone(), index);
        }

        for edge in &definition.edges {
            let lookup = |id: &NodeId| {
                node_indices
                    .get(id)
                    .copied()
                    .ok_or_else(|| MalformedGraph::UnknownEdgeEndpoint {
                        from: edge.source.clone(),
                        to: edge.target.clone(),
                        missing: id.clone(),
                    })
            };
            let from = lookup(&edge.source)?;
            let to = lookup(&edge.target)?;
            graph.add_edge(from, to, ());
        }

        Ok(Self {
            graph,
            node_indices,
            metadata: definition.metadata.clone(),
        })
    }

    /// Returns the number of nodes in the graph.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns the number of edges in the graph.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Returns the workflow metadata.
    pub fn metadata(&self) -> &WorkflowMetadata {
        &self.metadata
    }

    /// Returns a node by id.
    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        let index = self.node_indices.get(id)?;
        self.graph.node_weight(*index)
    }

    /// Returns an iterator over nodes in declaration order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.graph.node_weights()
    }

    /// Returns the first declared node of the given kind.
    pub fn first_of_kind(&self, kind: &NodeKind) -> Option<&Node> {
        self.nodes().find(|node| &node.kind == kind)
    }

    /// Returns whether the graph contains a cycle, including self-loops.
    pub fn is_cyclic(&self) -> bool {
        is_cyclic_directed(&self.graph)
    }

    /// Returns whether `ancestor` reaches `node` along edges.
    ///
    /// A node counts as its own ancestor.
    pub fn is_ancestor(&self, ancestor: &NodeId, node: &NodeId) -> bool {
        match (self.node_indices.get(ancestor), self.node_indices.get(node)) {
            (Some(&from), Some(&to)) => has_path_connecting(&self.graph, from, to, None),
            _ => false,
        }
    }

    /// Returns node ids in execution order.
    ///
    /// Kahn's algorithm; among ready nodes the one declared first runs
    /// first, so the order is stable for a given definition.
    pub fn topological_order(&self) -> WorkflowResult<Vec<NodeId>> {
        let mut in_degree: Vec<usize> = self
            .graph
            .node_indices()
            .map(|index| {
                self.graph
                    .neighbors_directed(index, Direction::Incoming)
                    .count()
            })
            .collect();

        let mut ready: BinaryHeap<Reverse<NodeIndex>> = self
            .graph
            .node_indices()
            .filter(|index| in_degree[index.index()] == 0)
            .map(Reverse)
            .collect();

        let mut order = Vec::with_capacity(self.graph.node_count());
        while let Some(Reverse(index)) = ready.pop() {
            order.push(self.graph[index].id.clone());
            for next in self.graph.neighbors_directed(index, Direction::Outgoing) {
                let degree = &mut in_degree[next.index()];
                *degree -= 1;
                if *degree == 0 {
                    ready.push(Reverse(next));
                }
            }
        }

        if order.len() != self.graph.node_count() {
            return Err(ValidationError::CyclicGraph.into());
        }

        Ok(order)
    }
}
