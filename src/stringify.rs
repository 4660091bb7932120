use crate::ast::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StringifyOptions {
    /// Edge operator used until a `Graph` node says otherwise.
    pub directed: bool,
    /// Spaces per nesting level.
    pub indent_size: usize,
}

impl Default for StringifyOptions {
    fn default() -> Self {
        Self {
            directed: true,
            indent_size: 2,
        }
    }
}

/// Settings in effect for the subtree being printed.
#[derive(Debug, Clone, Copy)]
struct Context {
    directed: bool,
    indent_size: usize,
}

impl Context {
    fn edge_op(self) -> &'static str {
        if self.directed { " -> " } else { " -- " }
    }

    /// Pads the start of each printed line. A line may hold a literal with
    /// embedded newlines; the text after those newlines is left alone.
    fn indent(self, lines: Vec<String>) -> Vec<String> {
        let pad = " ".repeat(self.indent_size);
        lines
            .into_iter()
            .map(|line| {
                if line.is_empty() {
                    line
                } else {
                    format!("{pad}{line}")
                }
            })
            .collect()
    }
}

/// Formats any syntax node as DOT text.
pub fn stringify(ast: &AstNode, options: &StringifyOptions) -> String {
    let ctx = Context {
        directed: options.directed,
        indent_size: options.indent_size,
    };
    let lines = match ast {
        AstNode::Dot(dot) => dot_lines(dot, ctx),
        AstNode::Graph(graph) => graph_lines(graph, ctx),
        AstNode::Subgraph(subgraph) => subgraph_lines(subgraph, ctx),
        AstNode::Attribute(attr) => vec![attribute_text(attr)],
        AstNode::Attributes(attrs) => attributes_lines(attrs, ctx),
        AstNode::Node(node) => node_lines(node, ctx),
        AstNode::Edge(edge) => edge_lines(edge, ctx),
        AstNode::NodeRef(r) => vec![node_ref_text(r)],
        AstNode::NodeRefGroup(group) => vec![group_text(group)],
        AstNode::Literal(literal) => vec![literal_text(literal)],
        AstNode::Comment(comment) => comment_lines(comment),
    };
    lines.join("\n")
}

fn literal_text(literal: &Literal) -> String {
    match literal.quoted {
        Quoting::Plain => literal.value.clone(),
        Quoting::Quoted => format!("\"{}\"", literal.value),
        Quoting::Html => format!("<{}>", literal.value),
    }
}

fn comment_lines(comment: &Comment) -> Vec<String> {
    let prefixed = |marker: &str| {
        comment
            .value
            .split('\n')
            .map(|line| format!("{marker} {line}").trim_end().to_string())
            .collect::<Vec<_>>()
    };
    match comment.kind {
        CommentKind::Block => {
            let mut lines = vec!["/**".to_string()];
            lines.extend(prefixed(" *"));
            lines.push(" */".to_string());
            lines
        }
        CommentKind::Slash => prefixed("//"),
        CommentKind::Macro => prefixed("#"),
    }
}

fn attribute_text(attr: &Attribute) -> String {
    format!("{} = {};", literal_text(&attr.key), literal_text(&attr.value))
}

fn attribute_statement_lines(stmt: &AttributeStatement) -> Vec<String> {
    match stmt {
        AttributeStatement::Attribute(attr) => vec![attribute_text(attr)],
        AttributeStatement::Comment(comment) => comment_lines(comment),
    }
}

/// `head;` or `head [ ... ];` depending on whether there is anything to list.
fn with_attr_list(head: String, body: &[AttributeStatement], ctx: Context) -> Vec<String> {
    if body.is_empty() {
        return vec![format!("{head};")];
    }
    let entries: Vec<String> = body.iter().flat_map(attribute_statement_lines).collect();
    let mut lines = vec![format!("{head} [")];
    lines.extend(ctx.indent(entries));
    lines.push("];".to_string());
    lines
}

fn attributes_lines(attrs: &Attributes, ctx: Context) -> Vec<String> {
    with_attr_list(attrs.kind.keyword().to_string(), &attrs.body, ctx)
}

fn node_lines(node: &Node, ctx: Context) -> Vec<String> {
    with_attr_list(literal_text(&node.id), &node.body, ctx)
}

fn node_ref_text(r: &NodeRef) -> String {
    let mut text = literal_text(&r.id);
    if let Some(port) = &r.port {
        text.push(':');
        text.push_str(&literal_text(port));
    }
    if let Some(compass) = r.compass {
        text.push(':');
        text.push_str(compass.as_str());
    }
    text
}

fn group_text(group: &NodeRefGroup) -> String {
    let refs: Vec<String> = group.body.iter().map(node_ref_text).collect();
    format!("{{{}}}", refs.join(" "))
}

fn edge_lines(edge: &Edge, ctx: Context) -> Vec<String> {
    let targets: Vec<String> = edge
        .targets
        .iter()
        .map(|target| match target {
            EdgeTarget::NodeRef(r) => node_ref_text(r),
            EdgeTarget::NodeRefGroup(group) => group_text(group),
        })
        .collect();
    with_attr_list(targets.join(ctx.edge_op()), &edge.body, ctx)
}

fn cluster_statement_lines(stmt: &ClusterStatement, ctx: Context) -> Vec<String> {
    match stmt {
        ClusterStatement::Subgraph(subgraph) => subgraph_lines(subgraph, ctx),
        ClusterStatement::Attribute(attr) => vec![attribute_text(attr)],
        ClusterStatement::Node(node) => node_lines(node, ctx),
        ClusterStatement::Edge(edge) => edge_lines(edge, ctx),
        ClusterStatement::Attributes(attrs) => attributes_lines(attrs, ctx),
        ClusterStatement::Comment(comment) => comment_lines(comment),
    }
}

/// `head {}` or a brace block with one statement per line.
fn with_block(head: String, body: &[ClusterStatement], ctx: Context) -> Vec<String> {
    if body.is_empty() {
        return vec![format!("{head} {{}}")];
    }
    let stmts: Vec<String> = body
        .iter()
        .flat_map(|stmt| cluster_statement_lines(stmt, ctx))
        .collect();
    let mut lines = vec![format!("{head} {{")];
    lines.extend(ctx.indent(stmts));
    lines.push("}".to_string());
    lines
}

fn subgraph_lines(subgraph: &Subgraph, ctx: Context) -> Vec<String> {
    let mut head = "subgraph".to_string();
    if let Some(id) = &subgraph.id {
        head.push(' ');
        head.push_str(&literal_text(id));
    }
    with_block(head, &subgraph.body, ctx)
}

fn graph_lines(graph: &Graph, ctx: Context) -> Vec<String> {
    let ctx = Context {
        directed: graph.directed,
        ..ctx
    };
    let mut head = String::new();
    if graph.strict {
        head.push_str("strict ");
    }
    head.push_str(if graph.directed { "digraph" } else { "graph" });
    if let Some(id) = &graph.id {
        head.push(' ');
        head.push_str(&literal_text(id));
    }
    with_block(head, &graph.body, ctx)
}

fn dot_lines(dot: &Dot, ctx: Context) -> Vec<String> {
    dot.body
        .iter()
        .flat_map(|stmt| match stmt {
            DotStatement::Graph(graph) => graph_lines(graph, ctx),
            DotStatement::Comment(comment) => comment_lines(comment),
        })
        .collect()
}
