//! Syntax tree for the DOT language.
//!
//! Nodes are plain owned values: the parser builds them, the converter and the
//! stringifier only read them. Every `body` keeps source order.

use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quoting {
    /// Bare identifier or numeral.
    Plain,
    /// `"..."`
    Quoted,
    /// `<...>`
    Html,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Literal {
    pub value: String,
    pub quoted: Quoting,
}

impl Literal {
    pub fn plain(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            quoted: Quoting::Plain,
        }
    }

    pub fn quoted(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            quoted: Quoting::Quoted,
        }
    }

    pub fn html(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            quoted: Quoting::Html,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentKind {
    /// `/* ... */`
    Block,
    /// `// ...`
    Slash,
    /// `# ...`
    Macro,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub kind: CommentKind,
    /// Comment text without markers; may span several lines.
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub key: Literal,
    pub value: Literal,
}

impl Attribute {
    pub fn new(key: Literal, value: Literal) -> Self {
        Self { key, value }
    }
}

/// An entry of a `[...]` attribute list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeStatement {
    Attribute(Attribute),
    Comment(Comment),
}

/// Iterates the attributes of an attribute-list body, skipping comments.
pub fn attributes(body: &[AttributeStatement]) -> impl Iterator<Item = &Attribute> {
    body.iter().filter_map(|stmt| match stmt {
        AttributeStatement::Attribute(attr) => Some(attr),
        AttributeStatement::Comment(_) => None,
    })
}

/// Target bucket of an `graph|node|edge [...]` statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AttributesKind {
    Graph,
    Node,
    Edge,
}

impl AttributesKind {
    pub fn keyword(self) -> &'static str {
        match self {
            AttributesKind::Graph => "graph",
            AttributesKind::Node => "node",
            AttributesKind::Edge => "edge",
        }
    }
}

impl fmt::Display for AttributesKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attributes {
    pub kind: AttributesKind,
    pub body: Vec<AttributeStatement>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub id: Literal,
    pub body: Vec<AttributeStatement>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compass {
    N,
    NE,
    E,
    SE,
    S,
    SW,
    W,
    NW,
    C,
    /// `_`, any side.
    Auto,
}

impl Compass {
    pub fn as_str(self) -> &'static str {
        match self {
            Compass::N => "n",
            Compass::NE => "ne",
            Compass::E => "e",
            Compass::SE => "se",
            Compass::S => "s",
            Compass::SW => "sw",
            Compass::W => "w",
            Compass::NW => "nw",
            Compass::C => "c",
            Compass::Auto => "_",
        }
    }
}

impl fmt::Display for Compass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Compass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "n" => Ok(Compass::N),
            "ne" => Ok(Compass::NE),
            "e" => Ok(Compass::E),
            "se" => Ok(Compass::SE),
            "s" => Ok(Compass::S),
            "sw" => Ok(Compass::SW),
            "w" => Ok(Compass::W),
            "nw" => Ok(Compass::NW),
            "c" => Ok(Compass::C),
            "_" => Ok(Compass::Auto),
            _ => Err(format!("unknown compass point: {s}")),
        }
    }
}

/// `id[:port][:compass]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeRef {
    pub id: Literal,
    pub port: Option<Literal>,
    pub compass: Option<Compass>,
}

impl NodeRef {
    pub fn new(id: Literal) -> Self {
        Self {
            id,
            port: None,
            compass: None,
        }
    }
}

/// `{a b c}` used as a single edge endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeRefGroup {
    pub body: Vec<NodeRef>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EdgeTarget {
    NodeRef(NodeRef),
    NodeRefGroup(NodeRefGroup),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    /// At least two endpoints when produced by the parser.
    pub targets: Vec<EdgeTarget>,
    pub body: Vec<AttributeStatement>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subgraph {
    pub id: Option<Literal>,
    pub body: Vec<ClusterStatement>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClusterStatement {
    Subgraph(Subgraph),
    Attribute(Attribute),
    Node(Node),
    Edge(Edge),
    Attributes(Attributes),
    Comment(Comment),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Graph {
    pub directed: bool,
    pub strict: bool,
    pub id: Option<Literal>,
    pub body: Vec<ClusterStatement>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DotStatement {
    Graph(Graph),
    Comment(Comment),
}

/// Root of a parsed document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dot {
    pub body: Vec<DotStatement>,
}

impl Dot {
    /// The first graph of the document, if any.
    pub fn graph(&self) -> Option<&Graph> {
        self.body.iter().find_map(|stmt| match stmt {
            DotStatement::Graph(graph) => Some(graph),
            DotStatement::Comment(_) => None,
        })
    }
}

/// Any node of the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AstNode {
    Dot(Dot),
    Graph(Graph),
    Subgraph(Subgraph),
    Attribute(Attribute),
    Attributes(Attributes),
    Node(Node),
    Edge(Edge),
    NodeRef(NodeRef),
    NodeRefGroup(NodeRefGroup),
    Literal(Literal),
    Comment(Comment),
}

macro_rules! ast_node_from {
    ($($variant:ident),* $(,)?) => {
        $(
            impl From<$variant> for AstNode {
                fn from(node: $variant) -> Self {
                    AstNode::$variant(node)
                }
            }
        )*
    };
}

ast_node_from!(
    Dot,
    Graph,
    Subgraph,
    Attribute,
    Attributes,
    Node,
    Edge,
    NodeRef,
    NodeRefGroup,
    Literal,
    Comment,
);

impl From<ClusterStatement> for AstNode {
    fn from(stmt: ClusterStatement) -> Self {
        match stmt {
            ClusterStatement::Subgraph(s) => AstNode::Subgraph(s),
            ClusterStatement::Attribute(a) => AstNode::Attribute(a),
            ClusterStatement::Node(n) => AstNode::Node(n),
            ClusterStatement::Edge(e) => AstNode::Edge(e),
            ClusterStatement::Attributes(a) => AstNode::Attributes(a),
            ClusterStatement::Comment(c) => AstNode::Comment(c),
        }
    }
}

/// Grammar entry point selected when parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rule {
    #[default]
    Graph,
    Subgraph,
    Node,
    Edge,
    Attribute,
    Attributes,
}

impl Rule {
    pub fn name(self) -> &'static str {
        match self {
            Rule::Graph => "graph",
            Rule::Subgraph => "subgraph",
            Rule::Node => "node",
            Rule::Edge => "edge",
            Rule::Attribute => "attribute",
            Rule::Attributes => "attributes",
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Rule {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "graph" => Ok(Rule::Graph),
            "subgraph" => Ok(Rule::Subgraph),
            "node" => Ok(Rule::Node),
            "edge" => Ok(Rule::Edge),
            "attribute" => Ok(Rule::Attribute),
            "attributes" => Ok(Rule::Attributes),
            _ => Err(format!("unknown rule: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn attributes_skips_comments() {
        let body = vec![
            AttributeStatement::Attribute(Attribute::new(
                Literal::plain("color"),
                Literal::plain("red"),
            )),
            AttributeStatement::Comment(Comment {
                kind: CommentKind::Slash,
                value: "note".to_string(),
            }),
            AttributeStatement::Attribute(Attribute::new(
                Literal::plain("shape"),
                Literal::plain("box"),
            )),
        ];
        let keys: Vec<&str> = attributes(&body).map(|a| a.key.value.as_str()).collect();
        assert_eq!(keys, vec!["color", "shape"]);
    }

    #[test]
    fn dot_graph_skips_leading_comments() {
        let dot = Dot {
            body: vec![
                DotStatement::Comment(Comment {
                    kind: CommentKind::Macro,
                    value: "header".to_string(),
                }),
                DotStatement::Graph(Graph {
                    directed: true,
                    strict: false,
                    id: Some(Literal::plain("G")),
                    body: vec![],
                }),
            ],
        };
        assert_eq!(dot.graph().and_then(|g| g.id.clone()), Some(Literal::plain("G")));
    }

    #[test]
    fn compass_parses_case_insensitively() {
        assert_eq!("NE".parse::<Compass>().unwrap(), Compass::NE);
        assert_eq!("c".parse::<Compass>().unwrap(), Compass::C);
        assert_eq!("_".parse::<Compass>().unwrap(), Compass::Auto);
        assert!("north".parse::<Compass>().is_err());
    }

    #[test]
    fn rule_round_trips_through_its_name() {
        for rule in [
            Rule::Graph,
            Rule::Subgraph,
            Rule::Node,
            Rule::Edge,
            Rule::Attribute,
            Rule::Attributes,
        ] {
            assert_eq!(rule.name().parse::<Rule>().unwrap(), rule);
        }
        assert_eq!(Rule::default(), Rule::Graph);
    }
}
