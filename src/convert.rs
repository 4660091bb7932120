//! Applies a syntax tree to a graph model.
//!
//! The converter only issues calls against [`Cluster`]; what a cluster does
//! with defaults, repeated node ids or repeated subgraph ids is up to the
//! implementation. [`crate::model`] provides the stock one.

use crate::ast::{self, AttributeStatement, AttributesKind, ClusterStatement, Literal, Quoting};
use crate::error::ConvertError;
use crate::model::{self, AttributeMap, EdgeTarget, NodeRef, RootGraph};

/// A graph or subgraph that statements can be applied to.
pub trait Cluster {
    type Subgraph: Cluster;

    /// Graph-level `key=value` statement.
    fn set_attribute(&mut self, key: String, value: String);
    fn add_node(&mut self, id: String, attributes: AttributeMap);
    fn add_edge(&mut self, targets: Vec<EdgeTarget>, attributes: AttributeMap);
    /// `graph|node|edge [...]` statement.
    fn set_defaults(&mut self, kind: AttributesKind, attributes: AttributeMap);
    /// Subgraph to apply a nested body to; `None` asks for an anonymous one.
    fn add_subgraph(&mut self, id: Option<String>) -> &mut Self::Subgraph;
}

pub trait Root: Cluster + Sized {
    fn new_root(id: Option<String>, directed: bool, strict: bool) -> Self;
}

/// Conversion of one kind of syntax node into its model object.
pub trait Convert {
    type Output;

    fn convert(&self) -> Result<Self::Output, ConvertError>;
}

impl Convert for ast::Dot {
    type Output = RootGraph;

    fn convert(&self) -> Result<RootGraph, ConvertError> {
        self.graph().ok_or(ConvertError::MissingGraph)?.convert()
    }
}

impl Convert for ast::Graph {
    type Output = RootGraph;

    fn convert(&self) -> Result<RootGraph, ConvertError> {
        convert_into(self)
    }
}

impl Convert for ast::Subgraph {
    type Output = model::Subgraph;

    fn convert(&self) -> Result<model::Subgraph, ConvertError> {
        let mut subgraph = model::Subgraph::new(self.id.as_ref().map(model_value));
        apply_statements(&mut subgraph, &self.body)?;
        Ok(subgraph)
    }
}

impl Convert for ast::Node {
    type Output = model::Node;

    fn convert(&self) -> Result<model::Node, ConvertError> {
        Ok(model::Node {
            id: model_value(&self.id),
            attributes: attribute_map(&self.body),
        })
    }
}

impl Convert for ast::Edge {
    type Output = model::Edge;

    fn convert(&self) -> Result<model::Edge, ConvertError> {
        Ok(model::Edge {
            targets: edge_targets(self)?,
            attributes: attribute_map(&self.body),
        })
    }
}

/// Builds any [`Root`] implementation from a graph.
pub fn convert_into<R: Root>(graph: &ast::Graph) -> Result<R, ConvertError> {
    log::debug!(
        "converting {}{} with {} statements",
        if graph.strict { "strict " } else { "" },
        if graph.directed { "digraph" } else { "graph" },
        graph.body.len()
    );
    let mut root = R::new_root(graph.id.as_ref().map(model_value), graph.directed, graph.strict);
    apply_statements(&mut root, &graph.body)?;
    Ok(root)
}

/// Applies `body` to `cluster` in order.
pub fn apply_statements<C: Cluster>(
    cluster: &mut C,
    body: &[ClusterStatement],
) -> Result<(), ConvertError> {
    for stmt in body {
        match stmt {
            ClusterStatement::Subgraph(subgraph) => {
                let id = subgraph.id.as_ref().map(model_value);
                log::trace!("subgraph {id:?}");
                let child = cluster.add_subgraph(id);
                apply_statements(child, &subgraph.body)?;
            }
            ClusterStatement::Attribute(attr) => {
                log::trace!("attribute {}", attr.key.value);
                cluster.set_attribute(model_value(&attr.key), model_value(&attr.value));
            }
            ClusterStatement::Node(node) => {
                log::trace!("node {}", node.id.value);
                cluster.add_node(model_value(&node.id), attribute_map(&node.body));
            }
            ClusterStatement::Edge(edge) => {
                log::trace!("edge with {} targets", edge.targets.len());
                cluster.add_edge(edge_targets(edge)?, attribute_map(&edge.body));
            }
            ClusterStatement::Attributes(attrs) => {
                log::trace!("{} defaults", attrs.kind);
                cluster.set_defaults(attrs.kind, attribute_map(&attrs.body));
            }
            ClusterStatement::Comment(_) => {}
        }
    }
    Ok(())
}

/// Model string for a literal. HTML strings keep their angle brackets so the
/// model can tell them apart from text.
pub fn model_value(literal: &Literal) -> String {
    match literal.quoted {
        Quoting::Plain | Quoting::Quoted => literal.value.clone(),
        Quoting::Html => format!("<{}>", literal.value),
    }
}

/// Later keys overwrite earlier ones; comments are ignored.
fn attribute_map(body: &[AttributeStatement]) -> AttributeMap {
    ast::attributes(body)
        .map(|attr| (model_value(&attr.key), model_value(&attr.value)))
        .collect()
}

fn edge_targets(edge: &ast::Edge) -> Result<Vec<EdgeTarget>, ConvertError> {
    if edge.targets.len() < 2 {
        return Err(ConvertError::EdgeArity {
            found: edge.targets.len(),
        });
    }
    Ok(edge
        .targets
        .iter()
        .map(|target| match target {
            ast::EdgeTarget::NodeRef(r) => EdgeTarget::Node(node_ref(r)),
            ast::EdgeTarget::NodeRefGroup(group) => {
                EdgeTarget::Group(group.body.iter().map(node_ref).collect())
            }
        })
        .collect())
}

fn node_ref(r: &ast::NodeRef) -> NodeRef {
    NodeRef {
        id: model_value(&r.id),
        port: r.port.as_ref().map(model_value),
        compass: r.compass,
    }
}
