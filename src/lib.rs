pub mod ast;
pub mod convert;
pub mod display_width;
pub mod error;
pub mod model;
pub mod parser;
pub mod stringify;

use ast::{AstNode, Rule};
use convert::Convert;
use error::ConvertError;

pub use error::{Error, SyntaxError};
pub use model::{RootGraph, to_dot};
pub use stringify::{StringifyOptions, stringify};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// Grammar entry point; `Rule::Graph` parses a whole document.
    pub rule: Rule,
}

impl ParseOptions {
    pub fn rule(rule: Rule) -> Self {
        Self { rule }
    }
}

/// Result of parsing and converting in one step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Model {
    Root(RootGraph),
    Subgraph(model::Subgraph),
    Node(model::Node),
    Edge(model::Edge),
}

impl Convert for AstNode {
    type Output = Model;

    fn convert(&self) -> Result<Model, ConvertError> {
        match self {
            AstNode::Dot(dot) => dot.convert().map(Model::Root),
            AstNode::Graph(graph) => graph.convert().map(Model::Root),
            AstNode::Subgraph(subgraph) => subgraph.convert().map(Model::Subgraph),
            AstNode::Node(node) => node.convert().map(Model::Node),
            AstNode::Edge(edge) => edge.convert().map(Model::Edge),
            AstNode::Attribute(_) => Err(ConvertError::Standalone { kind: "attribute" }),
            AstNode::Attributes(_) => Err(ConvertError::Standalone { kind: "attributes" }),
            AstNode::NodeRef(_) => Err(ConvertError::Standalone { kind: "node reference" }),
            AstNode::NodeRefGroup(_) => Err(ConvertError::Standalone { kind: "node group" }),
            AstNode::Literal(_) => Err(ConvertError::Standalone { kind: "literal" }),
            AstNode::Comment(_) => Err(ConvertError::Standalone { kind: "comment" }),
        }
    }
}

/// Parses DOT text without converting it.
pub fn parse_ast(input: &str, options: &ParseOptions) -> Result<AstNode, SyntaxError> {
    parser::parse(input, options.rule)
}

/// Parses DOT text and converts the result to a model object.
pub fn parse(input: &str, options: &ParseOptions) -> Result<Model, Error> {
    let ast = parse_ast(input, options)?;
    match ast {
        AstNode::Attribute(_) | AstNode::Attributes(_) => {
            Err(Error::UnsupportedFragment(options.rule))
        }
        _ => Ok(ast.convert()?),
    }
}

pub fn convert<T: Convert>(node: &T) -> Result<T::Output, ConvertError> {
    node.convert()
}

pub fn parse_graph(input: &str) -> Result<RootGraph, Error> {
    match parse(input, &ParseOptions::rule(Rule::Graph))? {
        Model::Root(root) => Ok(root),
        _ => Err(Error::UnsupportedFragment(Rule::Graph)),
    }
}

pub fn parse_subgraph(input: &str) -> Result<model::Subgraph, Error> {
    match parse(input, &ParseOptions::rule(Rule::Subgraph))? {
        Model::Subgraph(subgraph) => Ok(subgraph),
        _ => Err(Error::UnsupportedFragment(Rule::Subgraph)),
    }
}

pub fn parse_node(input: &str) -> Result<model::Node, Error> {
    match parse(input, &ParseOptions::rule(Rule::Node))? {
        Model::Node(node) => Ok(node),
        _ => Err(Error::UnsupportedFragment(Rule::Node)),
    }
}

pub fn parse_edge(input: &str) -> Result<model::Edge, Error> {
    match parse(input, &ParseOptions::rule(Rule::Edge))? {
        Model::Edge(edge) => Ok(edge),
        _ => Err(Error::UnsupportedFragment(Rule::Edge)),
    }
}

/// Parses a document and prints it back with the given layout.
pub fn reformat(input: &str, rule: Rule, options: &StringifyOptions) -> Result<String, Error> {
    let ast = parse_ast(input, &ParseOptions::rule(rule))?;
    Ok(stringify(&ast, options))
}

/// Parses a document into the model and prints the model, which drops
/// comments and merges repeated declarations.
pub fn normalize(input: &str, options: &StringifyOptions) -> Result<String, Error> {
    let root = parse_graph(input)?;
    Ok(to_dot(&root, options))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parse_returns_root_for_documents() {
        let model = parse("digraph G { a -> b }", &ParseOptions::default()).unwrap();
        match model {
            Model::Root(root) => {
                assert_eq!(root.id.as_deref(), Some("G"));
                assert!(root.directed);
                assert_eq!(root.cluster.edges.len(), 1);
            }
            other => panic!("expected root graph, got {other:?}"),
        }
    }

    #[test]
    fn parse_rejects_attribute_fragment() {
        let err = parse("color=red", &ParseOptions::rule(Rule::Attribute)).unwrap_err();
        assert_eq!(err, Error::UnsupportedFragment(Rule::Attribute));
    }

    #[test]
    fn parse_rejects_attributes_fragment() {
        let err = parse("node [shape=box]", &ParseOptions::rule(Rule::Attributes)).unwrap_err();
        assert_eq!(err, Error::UnsupportedFragment(Rule::Attributes));
    }

    #[test]
    fn parse_node_fragment() {
        let node = parse_node("a [color=red, color=blue]").unwrap();
        assert_eq!(node.id, "a");
        assert_eq!(node.attributes.get("color").map(String::as_str), Some("blue"));
    }

    #[test]
    fn parse_edge_fragment_keeps_chain() {
        let edge = parse_edge("a -> b -> c").unwrap();
        assert_eq!(edge.targets.len(), 3);
    }

    #[test]
    fn parse_subgraph_fragment() {
        let subgraph = parse_subgraph("subgraph cluster_0 { a; b }").unwrap();
        assert_eq!(subgraph.id.as_deref(), Some("cluster_0"));
        assert_eq!(subgraph.cluster.nodes.len(), 2);
    }

    #[test]
    fn syntax_errors_surface_through_parse() {
        let err = parse_graph("digraph {").unwrap_err();
        assert!(matches!(err, Error::Syntax(_)), "got: {err:?}");
    }

    #[test]
    fn standalone_literal_does_not_convert() {
        let err = convert(&AstNode::Literal(ast::Literal::plain("a"))).unwrap_err();
        assert_eq!(err, ConvertError::Standalone { kind: "literal" });
    }

    #[test]
    fn reformat_compacts_bare_nodes() {
        let out = reformat("graph{a;b[]}", Rule::Graph, &StringifyOptions::default()).unwrap();
        assert_eq!(out, "graph {\n  a;\n  b;\n}");
    }

    #[test]
    fn normalize_merges_repeated_nodes() {
        let out = normalize(
            "digraph { a [color=red]; a [color=blue] // gone\n }",
            &StringifyOptions::default(),
        )
        .unwrap();
        assert_eq!(out, "digraph {\n  a [\n    color = blue;\n  ];\n}");
    }
}
