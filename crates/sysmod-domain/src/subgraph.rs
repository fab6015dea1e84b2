//! Filtered views of the model handed to diagram renderers

use crate::{FlowRole, ModelContext, ModelError, ModelResult, ObjectId, ObjectKind};

/// A node of a subgraph
#[derive(Debug, Clone, PartialEq)]
pub struct SubgraphNode {
    /// Object id
    pub id: ObjectId,
    /// Display name
    pub name: String,
    /// Object kind
    pub kind: ObjectKind,
}

/// How two subgraph nodes are related
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeRelation {
    /// Parent contains child
    Composition,
    /// Holder realizes or selects the object
    Allocation,
    /// Element presents the interface
    Exposure,
    /// Data moves from one node to another
    Flow,
}

/// An edge of a subgraph
#[derive(Debug, Clone, PartialEq)]
pub struct SubgraphEdge {
    /// Source node
    pub from: ObjectId,
    /// Target node
    pub to: ObjectId,
    /// Relation
    pub relation: EdgeRelation,
    /// Optional label (data name for flows)
    pub label: Option<String>,
}

/// An object with its children, allocated items, interfaces and flows
#[derive(Debug, Clone, PartialEq)]
pub struct Subgraph {
    /// The object the subgraph is centered on
    pub root: SubgraphNode,
    /// Every other node
    pub nodes: Vec<SubgraphNode>,
    /// Edges between nodes (root included)
    pub edges: Vec<SubgraphEdge>,
}

impl Subgraph {
    /// Gather the subgraph around `id`, following derived pointers
    pub fn of(ctx: &ModelContext, id: ObjectId) -> ModelResult<Self> {
        let root = node(ctx, id).ok_or_else(|| ModelError::Resolution(format!("object {}", id)))?;
        let mut graph = Subgraph {
            root,
            nodes: Vec::new(),
            edges: Vec::new(),
        };

        let children = ctx.effective_children(id);
        for child in &children {
            graph.add_node(ctx, *child);
            graph.edges.push(SubgraphEdge {
                from: id,
                to: *child,
                relation: EdgeRelation::Composition,
                label: None,
            });
        }

        if let Some(allocated) = ctx.get(id).and_then(|o| o.allocated()) {
            for item in allocated {
                graph.add_node(ctx, *item);
                graph.edges.push(SubgraphEdge {
                    from: id,
                    to: *item,
                    relation: EdgeRelation::Allocation,
                    label: None,
                });
            }
        }

        for interface in ctx.effective_exposed(id) {
            graph.add_node(ctx, interface);
            graph.edges.push(SubgraphEdge {
                from: id,
                to: interface,
                relation: EdgeRelation::Exposure,
                label: None,
            });
        }

        if ctx.kind_of(id) == Some(ObjectKind::Function) {
            graph.add_function_flows(ctx, id, &children);
        }

        Ok(graph)
    }

    fn add_node(&mut self, ctx: &ModelContext, id: ObjectId) {
        if id == self.root.id || self.nodes.iter().any(|n| n.id == id) {
            return;
        }
        if let Some(n) = node(ctx, id) {
            self.nodes.push(n);
        }
    }

    fn add_function_flows(&mut self, ctx: &ModelContext, id: ObjectId, children: &[ObjectId]) {
        // Internal exchanges between children
        for producer in children {
            for data in ctx.effective_flows(*producer, FlowRole::Producer) {
                for consumer in children {
                    if consumer != producer
                        && ctx.effective_flows(*consumer, FlowRole::Consumer).contains(&data)
                    {
                        self.edges.push(SubgraphEdge {
                            from: *producer,
                            to: *consumer,
                            relation: EdgeRelation::Flow,
                            label: Some(ctx.name_of(data)),
                        });
                    }
                }
            }
        }

        // Boundary flows of the root
        for data in ctx.effective_flows(id, FlowRole::Consumer) {
            self.add_node(ctx, data);
            self.edges.push(SubgraphEdge {
                from: data,
                to: id,
                relation: EdgeRelation::Flow,
                label: None,
            });
        }
        for data in ctx.effective_flows(id, FlowRole::Producer) {
            self.add_node(ctx, data);
            self.edges.push(SubgraphEdge {
                from: id,
                to: data,
                relation: EdgeRelation::Flow,
                label: None,
            });
        }
    }

    /// Look up a node (root included) by id
    pub fn node(&self, id: ObjectId) -> Option<&SubgraphNode> {
        if self.root.id == id {
            return Some(&self.root);
        }
        self.nodes.iter().find(|n| n.id == id)
    }
}

fn node(ctx: &ModelContext, id: ObjectId) -> Option<SubgraphNode> {
    ctx.get(id).map(|o| SubgraphNode {
        id,
        name: o.name().to_string(),
        kind: o.kind(),
    })
}
