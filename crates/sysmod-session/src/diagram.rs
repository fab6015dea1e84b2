//! PlantUML rendering of subgraphs

use std::fmt::Write;
use sysmod_domain::traits::DiagramRenderer;
use sysmod_domain::{EdgeRelation, ObjectId, ObjectKind, Subgraph, SubgraphNode};

/// Renders a [`Subgraph`] as a PlantUML component diagram
#[derive(Debug, Clone, Copy, Default)]
pub struct PlantUmlRenderer;

impl PlantUmlRenderer {
    /// Create a renderer
    pub fn new() -> Self {
        Self
    }
}

impl DiagramRenderer for PlantUmlRenderer {
    fn render(&self, graph: &Subgraph) -> String {
        let mut out = String::from("@startuml\n");
        let _ = writeln!(out, "title {} ({})", graph.root.name, graph.root.kind);

        for node in std::iter::once(&graph.root).chain(graph.nodes.iter()) {
            let _ = writeln!(
                out,
                "{} \"{}\" as {}",
                keyword(node.kind),
                escape(&node.name),
                alias(node)
            );
        }

        for edge in &graph.edges {
            let (Some(from), Some(to)) = (graph.node(edge.from), graph.node(edge.to)) else {
                continue;
            };
            let (arrow, default_label) = match edge.relation {
                EdgeRelation::Composition => ("*--", None),
                EdgeRelation::Allocation => ("..>", Some("allocates")),
                EdgeRelation::Exposure => ("--()", None),
                EdgeRelation::Flow => ("-->", None),
            };
            let label = edge.label.as_deref().or(default_label);
            match label {
                Some(label) => {
                    let _ = writeln!(out, "{} {} {} : {}", alias(from), arrow, alias(to), escape(label));
                }
                None => {
                    let _ = writeln!(out, "{} {} {}", alias(from), arrow, alias(to));
                }
            }
        }

        out.push_str("@enduml\n");
        out
    }
}

fn keyword(kind: ObjectKind) -> &'static str {
    match kind {
        ObjectKind::Function | ObjectKind::Activity => "rectangle",
        ObjectKind::Data => "card",
        ObjectKind::State | ObjectKind::Transition => "usecase",
        ObjectKind::FunctionalElement => "component",
        ObjectKind::PhysicalElement => "node",
        ObjectKind::FunctionalInterface | ObjectKind::PhysicalInterface => "interface",
        ObjectKind::Attribute => "label",
        ObjectKind::Requirement | ObjectKind::Goal => "file",
        ObjectKind::Type => "folder",
        ObjectKind::View => "frame",
    }
}

fn alias(node: &SubgraphNode) -> String {
    node_alias(node.id)
}

fn node_alias(id: ObjectId) -> String {
    format!("N{:032x}", id.value())
}

fn escape(text: &str) -> String {
    text.replace('"', "'")
}
