//! In-memory graph model built by the converter.
//!
//! A cluster (the root graph or a subgraph) keeps its own `key=value`
//! attributes, the three default buckets, and its nodes, edges and subgraphs in
//! first-declaration order.

use std::collections::BTreeMap;

use crate::ast::{self, AttributesKind, Compass, Literal};
use crate::convert::{Cluster, Root};
use crate::parser::{is_id_char, is_id_start, is_keyword};
use crate::stringify::{StringifyOptions, stringify};

pub type AttributeMap = BTreeMap<String, String>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Defaults {
    pub graph: AttributeMap,
    pub node: AttributeMap,
    pub edge: AttributeMap,
}

impl Defaults {
    pub fn get(&self, kind: AttributesKind) -> &AttributeMap {
        match kind {
            AttributesKind::Graph => &self.graph,
            AttributesKind::Node => &self.node,
            AttributesKind::Edge => &self.edge,
        }
    }

    fn get_mut(&mut self, kind: AttributesKind) -> &mut AttributeMap {
        match kind {
            AttributesKind::Graph => &mut self.graph,
            AttributesKind::Node => &mut self.node,
            AttributesKind::Edge => &mut self.edge,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeRef {
    pub id: String,
    pub port: Option<String>,
    pub compass: Option<Compass>,
}

impl NodeRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            port: None,
            compass: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EdgeTarget {
    Node(NodeRef),
    Group(Vec<NodeRef>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub id: String,
    pub attributes: AttributeMap,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub targets: Vec<EdgeTarget>,
    pub attributes: AttributeMap,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClusterBody {
    pub attributes: AttributeMap,
    pub defaults: Defaults,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub subgraphs: Vec<Subgraph>,
}

impl ClusterBody {
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn subgraph(&self, id: &str) -> Option<&Subgraph> {
        self.subgraphs.iter().find(|s| s.id.as_deref() == Some(id))
    }

    fn to_statements(&self) -> Vec<ast::ClusterStatement> {
        let mut body = Vec::new();
        for (key, value) in &self.attributes {
            body.push(ast::ClusterStatement::Attribute(ast::Attribute::new(
                literal(key),
                literal(value),
            )));
        }
        for kind in [AttributesKind::Graph, AttributesKind::Node, AttributesKind::Edge] {
            let defaults = self.defaults.get(kind);
            if !defaults.is_empty() {
                body.push(ast::ClusterStatement::Attributes(ast::Attributes {
                    kind,
                    body: attribute_statements(defaults),
                }));
            }
        }
        body.extend(self.nodes.iter().map(|n| ast::ClusterStatement::Node(n.to_ast())));
        body.extend(
            self.subgraphs
                .iter()
                .map(|s| ast::ClusterStatement::Subgraph(s.to_ast())),
        );
        body.extend(self.edges.iter().map(|e| ast::ClusterStatement::Edge(e.to_ast())));
        body
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subgraph {
    pub id: Option<String>,
    pub cluster: ClusterBody,
}

impl Subgraph {
    pub fn new(id: Option<String>) -> Self {
        Self {
            id,
            cluster: ClusterBody::default(),
        }
    }

    pub fn to_ast(&self) -> ast::Subgraph {
        ast::Subgraph {
            id: self.id.as_deref().map(literal),
            body: self.cluster.to_statements(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootGraph {
    pub id: Option<String>,
    pub directed: bool,
    pub strict: bool,
    pub cluster: ClusterBody,
}

impl RootGraph {
    pub fn new(id: Option<String>, directed: bool, strict: bool) -> Self {
        Self {
            id,
            directed,
            strict,
            cluster: ClusterBody::default(),
        }
    }

    pub fn to_ast(&self) -> ast::Dot {
        ast::Dot {
            body: vec![ast::DotStatement::Graph(ast::Graph {
                directed: self.directed,
                strict: self.strict,
                id: self.id.as_deref().map(literal),
                body: self.cluster.to_statements(),
            })],
        }
    }
}

impl Node {
    pub fn to_ast(&self) -> ast::Node {
        ast::Node {
            id: literal(&self.id),
            body: attribute_statements(&self.attributes),
        }
    }
}

impl Edge {
    pub fn to_ast(&self) -> ast::Edge {
        ast::Edge {
            targets: self
                .targets
                .iter()
                .map(|t| match t {
                    EdgeTarget::Node(r) => ast::EdgeTarget::NodeRef(node_ref_to_ast(r)),
                    EdgeTarget::Group(refs) => ast::EdgeTarget::NodeRefGroup(ast::NodeRefGroup {
                        body: refs.iter().map(node_ref_to_ast).collect(),
                    }),
                })
                .collect(),
            body: attribute_statements(&self.attributes),
        }
    }
}

fn node_ref_to_ast(r: &NodeRef) -> ast::NodeRef {
    ast::NodeRef {
        id: literal(&r.id),
        port: r.port.as_deref().map(literal),
        compass: r.compass,
    }
}

fn attribute_statements(attributes: &AttributeMap) -> Vec<ast::AttributeStatement> {
    attributes
        .iter()
        .map(|(k, v)| ast::AttributeStatement::Attribute(ast::Attribute::new(literal(k), literal(v))))
        .collect()
}

/// Picks the quoting a model string needs to be emitted as DOT.
pub fn literal(value: &str) -> Literal {
    if let Some(inner) = value.strip_prefix('<').and_then(|v| v.strip_suffix('>')) {
        return Literal::html(inner);
    }
    if is_plain(value) {
        return Literal::plain(value);
    }
    Literal::quoted(escape_quotes(value))
}

fn is_plain(value: &str) -> bool {
    let is_word = value.chars().next().is_some_and(is_id_start) && value.chars().all(is_id_char);
    (is_word && !is_keyword(value)) || is_numeral(value)
}

fn is_numeral(value: &str) -> bool {
    let digits = value.strip_prefix('-').unwrap_or(value);
    let (int, frac) = match digits.split_once('.') {
        Some((int, frac)) => (int, Some(frac)),
        None => (digits, None),
    };
    let all_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    match frac {
        None => !int.is_empty() && all_digits(int),
        Some(frac) => (!int.is_empty() || !frac.is_empty()) && all_digits(int) && all_digits(frac),
    }
}

/// Escapes `"` that is not already escaped.
fn escape_quotes(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut escaped = false;
    for ch in value.chars() {
        if ch == '"' && !escaped {
            out.push('\\');
        }
        escaped = ch == '\\' && !escaped;
        out.push(ch);
    }
    out
}

/// Serializes a model graph through its syntax tree.
pub fn to_dot(root: &RootGraph, options: &StringifyOptions) -> String {
    stringify(&ast::AstNode::Dot(root.to_ast()), options)
}

impl Cluster for ClusterBody {
    type Subgraph = Subgraph;

    fn set_attribute(&mut self, key: String, value: String) {
        self.attributes.insert(key, value);
    }

    fn add_node(&mut self, id: String, attributes: AttributeMap) {
        match self.nodes.iter_mut().find(|n| n.id == id) {
            Some(node) => node.attributes.extend(attributes),
            None => self.nodes.push(Node { id, attributes }),
        }
    }

    fn add_edge(&mut self, targets: Vec<EdgeTarget>, attributes: AttributeMap) {
        self.edges.push(Edge {
            targets,
            attributes,
        });
    }

    fn set_defaults(&mut self, kind: AttributesKind, attributes: AttributeMap) {
        self.defaults.get_mut(kind).extend(attributes);
    }

    fn add_subgraph(&mut self, id: Option<String>) -> &mut Subgraph {
        let existing = id
            .as_deref()
            .and_then(|id| self.subgraphs.iter().position(|s| s.id.as_deref() == Some(id)));
        let index = match existing {
            Some(index) => index,
            None => {
                self.subgraphs.push(Subgraph::new(id));
                self.subgraphs.len() - 1
            }
        };
        &mut self.subgraphs[index]
    }
}

macro_rules! delegate_cluster {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Cluster for $ty {
                type Subgraph = Subgraph;

                fn set_attribute(&mut self, key: String, value: String) {
                    self.cluster.set_attribute(key, value);
                }

                fn add_node(&mut self, id: String, attributes: AttributeMap) {
                    self.cluster.add_node(id, attributes);
                }

                fn add_edge(&mut self, targets: Vec<EdgeTarget>, attributes: AttributeMap) {
                    self.cluster.add_edge(targets, attributes);
                }

                fn set_defaults(&mut self, kind: AttributesKind, attributes: AttributeMap) {
                    self.cluster.set_defaults(kind, attributes);
                }

                fn add_subgraph(&mut self, id: Option<String>) -> &mut Subgraph {
                    self.cluster.add_subgraph(id)
                }
            }
        )*
    };
}

delegate_cluster!(Subgraph, RootGraph);

impl Root for RootGraph {
    fn new_root(id: Option<String>, directed: bool, strict: bool) -> Self {
        RootGraph::new(id, directed, strict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn attrs(pairs: &[(&str, &str)]) -> AttributeMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn add_node_merges_attributes() {
        let mut body = ClusterBody::default();
        body.add_node("a".into(), attrs(&[("color", "red"), ("shape", "box")]));
        body.add_node("a".into(), attrs(&[("color", "blue")]));
        assert_eq!(body.nodes.len(), 1);
        assert_eq!(
            body.node("a").unwrap().attributes,
            attrs(&[("color", "blue"), ("shape", "box")])
        );
    }

    #[test]
    fn nodes_keep_declaration_order() {
        let mut body = ClusterBody::default();
        for id in ["z", "a", "m", "a"] {
            body.add_node(id.into(), AttributeMap::new());
        }
        let ids: Vec<&str> = body.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["z", "a", "m"]);
    }

    #[test]
    fn named_subgraph_is_reused() {
        let mut body = ClusterBody::default();
        body.add_subgraph(Some("s".into()))
            .add_node("a".into(), AttributeMap::new());
        body.add_subgraph(Some("s".into()))
            .add_node("b".into(), AttributeMap::new());
        assert_eq!(body.subgraphs.len(), 1);
        assert_eq!(body.subgraph("s").unwrap().cluster.nodes.len(), 2);
    }

    #[test]
    fn anonymous_subgraphs_are_distinct() {
        let mut body = ClusterBody::default();
        body.add_subgraph(None);
        body.add_subgraph(None);
        assert_eq!(body.subgraphs.len(), 2);
    }

    #[test]
    fn defaults_merge_per_bucket() {
        let mut body = ClusterBody::default();
        body.set_defaults(AttributesKind::Node, attrs(&[("shape", "box")]));
        body.set_defaults(AttributesKind::Node, attrs(&[("color", "red")]));
        body.set_defaults(AttributesKind::Edge, attrs(&[("style", "dashed")]));
        assert_eq!(
            body.defaults.get(AttributesKind::Node),
            &attrs(&[("color", "red"), ("shape", "box")])
        );
        assert_eq!(body.defaults.get(AttributesKind::Edge).len(), 1);
        assert!(body.defaults.get(AttributesKind::Graph).is_empty());
    }

    #[test]
    fn literal_picks_quoting() {
        assert_eq!(literal("abc_1"), Literal::plain("abc_1"));
        assert_eq!(literal("-1.5"), Literal::plain("-1.5"));
        assert_eq!(literal("hello world"), Literal::quoted("hello world"));
        assert_eq!(literal("node"), Literal::quoted("node"));
        assert_eq!(literal("1a"), Literal::quoted("1a"));
        assert_eq!(literal(""), Literal::quoted(""));
        assert_eq!(literal("<<b>x</b>>"), Literal::html("<b>x</b>"));
    }

    #[test]
    fn literal_escapes_bare_quotes_only() {
        assert_eq!(literal("say \"hi\""), Literal::quoted("say \\\"hi\\\""));
        assert_eq!(literal("say \\\"hi\\\""), Literal::quoted("say \\\"hi\\\""));
    }

    #[test]
    fn to_dot_orders_defaults_before_entities() {
        let mut root = RootGraph::new(Some("G".into()), true, false);
        root.add_edge(
            vec![
                EdgeTarget::Node(NodeRef::new("a")),
                EdgeTarget::Node(NodeRef::new("b")),
            ],
            AttributeMap::new(),
        );
        root.add_node("a".into(), attrs(&[("label", "A node")]));
        root.set_defaults(AttributesKind::Node, attrs(&[("shape", "box")]));
        root.set_attribute("rankdir".into(), "LR".into());
        let expected = "\
digraph G {
  rankdir = LR;
  node [
    shape = box;
  ];
  a [
    label = \"A node\";
  ];
  a -> b;
}";
        assert_eq!(to_dot(&root, &StringifyOptions::default()), expected);
    }

    #[test]
    fn to_dot_undirected_group() {
        let mut root = RootGraph::new(None, false, true);
        root.add_edge(
            vec![
                EdgeTarget::Node(NodeRef::new("a")),
                EdgeTarget::Group(vec![NodeRef::new("b"), NodeRef::new("c")]),
            ],
            AttributeMap::new(),
        );
        assert_eq!(
            to_dot(&root, &StringifyOptions::default()),
            "strict graph {\n  a -- {b c};\n}"
        );
    }
}
