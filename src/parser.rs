use winnow::prelude::*;
use winnow::ascii::{digit0, digit1, line_ending, space0, till_line_ending};
use winnow::combinator::{alt, cut_err, delimited, eof, opt, peek, preceded, repeat, terminated};
use winnow::error::{ContextError, ErrMode, ParseError, StrContext, StrContextValue};
use winnow::token::{any, one_of, take_till, take_until, take_while};

use crate::ast::*;
use crate::error::{Location, Position, SyntaxError};

const KEYWORDS: [&str; 6] = ["strict", "graph", "digraph", "subgraph", "node", "edge"];

/// Parses `source` starting at `rule`. The whole input must match.
pub fn parse(source: &str, rule: Rule) -> Result<AstNode, SyntaxError> {
    log::debug!("parsing {} bytes of DOT as `{rule}`", source.len());
    let result = match rule {
        Rule::Graph => dot.parse(source).map(AstNode::Dot),
        Rule::Subgraph => fragment(subgraph).parse(source).map(AstNode::Subgraph),
        Rule::Node => fragment(node).parse(source).map(AstNode::Node),
        Rule::Edge => fragment(edge).parse(source).map(AstNode::Edge),
        Rule::Attribute => fragment(graph_attribute).parse(source).map(AstNode::Attribute),
        Rule::Attributes => fragment(attributes_stmt).parse(source).map(AstNode::Attributes),
    };
    result.map_err(|e| syntax_error(source, &e))
}

fn syntax_error(source: &str, err: &ParseError<&str, ContextError>) -> SyntaxError {
    let offset = err.offset();
    let rest = source.get(offset..).unwrap_or("");
    let token_len = match rest.find(|c: char| c.is_whitespace() || "{}[];,=".contains(c)) {
        Some(0) => rest.chars().next().map_or(0, char::len_utf8),
        Some(n) => n,
        None => rest.len(),
    };
    let found = if rest.is_empty() {
        "end of input".to_string()
    } else {
        format!("`{}`", &rest[..token_len])
    };
    let context = err.inner().to_string().replace('\n', ", ");
    let message = if context.is_empty() {
        format!("unexpected {found}")
    } else {
        format!("{context}, found {found}")
    };
    SyntaxError {
        message,
        location: Location {
            start: Position::locate(source, offset),
            end: Position::locate(source, offset + token_len),
        },
    }
}

fn expected(what: &'static str) -> StrContext {
    StrContext::Expected(StrContextValue::Description(what))
}

fn expected_char(c: char) -> StrContext {
    StrContext::Expected(StrContextValue::CharLiteral(c))
}

fn fragment<'s, O>(
    inner: impl Parser<&'s str, O, ErrMode<ContextError>>,
) -> impl Parser<&'s str, O, ErrMode<ContextError>> {
    delimited(ws, terminated(inner, opt(preceded(ws, ';'))), ws)
}

// ---------------------------------------------------------------------------
// Whitespace and comments
// ---------------------------------------------------------------------------

fn blank(input: &mut &str) -> ModalResult<()> {
    take_while(0.., |c: char| c.is_whitespace())
        .void()
        .parse_next(input)
}

/// Whitespace plus stray `;` between statements.
fn separators(input: &mut &str) -> ModalResult<()> {
    take_while(0.., |c: char| c.is_whitespace() || c == ';')
        .void()
        .parse_next(input)
}

/// Skips whitespace and comments between tokens.
fn ws(input: &mut &str) -> ModalResult<()> {
    repeat(
        0..,
        alt((
            take_while(1.., |c: char| c.is_whitespace()).void(),
            comment.void(),
        )),
    )
    .parse_next(input)
}

fn comment(input: &mut &str) -> ModalResult<Comment> {
    alt((block_comment, slash_comment, macro_comment)).parse_next(input)
}

fn block_comment(input: &mut &str) -> ModalResult<Comment> {
    "/*".parse_next(input)?;
    let inner = cut_err(terminated(take_until(0.., "*/"), "*/"))
        .context(expected("`*/` closing the comment"))
        .parse_next(input)?;
    Ok(Comment {
        kind: CommentKind::Block,
        value: block_comment_value(inner),
    })
}

fn block_comment_value(inner: &str) -> String {
    let lines: Vec<&str> = match inner.strip_prefix('*') {
        Some(decorated) => decorated
            .lines()
            .map(|l| {
                let l = l.trim();
                match l.strip_prefix('*') {
                    Some(rest) => rest.strip_prefix(' ').unwrap_or(rest).trim_end(),
                    None => l,
                }
            })
            .collect(),
        None => inner.lines().map(str::trim).collect(),
    };
    let first = lines.iter().position(|l| !l.is_empty());
    let last = lines.iter().rposition(|l| !l.is_empty());
    match (first, last) {
        (Some(first), Some(last)) => lines[first..=last].join("\n"),
        _ => String::new(),
    }
}

fn comment_line<'s>(marker: &'static str) -> impl FnMut(&mut &'s str) -> ModalResult<&'s str> {
    move |input: &mut &'s str| {
        preceded(marker, till_line_ending)
            .map(|text: &'s str| text.strip_prefix(' ').unwrap_or(text).trim_end())
            .parse_next(input)
    }
}

/// Consecutive marker lines are merged into one comment.
fn comment_lines<'s>(marker: &'static str, input: &mut &'s str) -> ModalResult<String> {
    let first = comment_line(marker).parse_next(input)?;
    let rest: Vec<&str> =
        repeat(0.., preceded((line_ending, space0), comment_line(marker))).parse_next(input)?;
    let mut value = first.to_string();
    for line in rest {
        value.push('\n');
        value.push_str(line);
    }
    Ok(value)
}

fn slash_comment(input: &mut &str) -> ModalResult<Comment> {
    let value = comment_lines("//", input)?;
    Ok(Comment {
        kind: CommentKind::Slash,
        value,
    })
}

fn macro_comment(input: &mut &str) -> ModalResult<Comment> {
    let value = comment_lines("#", input)?;
    Ok(Comment {
        kind: CommentKind::Macro,
        value,
    })
}

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

pub(crate) fn is_id_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || (!c.is_ascii() && !c.is_whitespace())
}

pub(crate) fn is_id_char(c: char) -> bool {
    is_id_start(c) || c.is_ascii_digit()
}

pub(crate) fn is_keyword(word: &str) -> bool {
    KEYWORDS.iter().any(|k| k.eq_ignore_ascii_case(word))
}

fn raw_plain_id<'s>(input: &mut &'s str) -> ModalResult<&'s str> {
    (one_of(is_id_start), take_while(0.., is_id_char))
        .take()
        .parse_next(input)
}

fn plain_id<'s>(input: &mut &'s str) -> ModalResult<&'s str> {
    raw_plain_id
        .verify(|id: &str| !is_keyword(id))
        .parse_next(input)
}

fn keyword<'s>(word: &'static str) -> impl FnMut(&mut &'s str) -> ModalResult<&'s str> {
    move |input: &mut &'s str| {
        raw_plain_id
            .verify(|id: &str| id.eq_ignore_ascii_case(word))
            .parse_next(input)
    }
}

fn numeral<'s>(input: &mut &'s str) -> ModalResult<&'s str> {
    (
        opt('-'),
        alt((('.', digit1).void(), (digit1, opt(('.', digit0))).void())),
    )
        .take()
        .parse_next(input)
}

fn quoted_part<'s>(input: &mut &'s str) -> ModalResult<&'s str> {
    '"'.parse_next(input)?;
    let body = repeat::<_, _, (), _, _>(
        0..,
        alt((('\\', any).void(), take_till(1.., ['"', '\\']).void())),
    )
    .take();
    cut_err(terminated(body, '"'))
        .context(expected("`\"` closing the string"))
        .parse_next(input)
}

/// `"a" + "b"` is joined into one literal.
fn quoted_string(input: &mut &str) -> ModalResult<String> {
    let first = quoted_part.parse_next(input)?;
    let rest: Vec<&str> = repeat(
        0..,
        preceded((ws, '+', ws), cut_err(quoted_part).context(expected("quoted string"))),
    )
    .parse_next(input)?;
    let mut value = first.to_string();
    for part in rest {
        value.push_str(part);
    }
    Ok(value)
}

fn html_body<'s>(input: &mut &'s str) -> ModalResult<&'s str> {
    repeat::<_, _, (), _, _>(
        0..,
        alt((
            take_till(1.., ['<', '>']).void(),
            ('<', html_body, '>').void(),
        )),
    )
    .take()
    .parse_next(input)
}

fn html_string<'s>(input: &mut &'s str) -> ModalResult<&'s str> {
    '<'.parse_next(input)?;
    cut_err(terminated(html_body, '>'))
        .context(expected("`>` closing the HTML string"))
        .parse_next(input)
}

fn id(input: &mut &str) -> ModalResult<Literal> {
    alt((
        quoted_string.map(Literal::quoted),
        html_string.map(Literal::html),
        numeral.map(Literal::plain),
        plain_id.map(Literal::plain),
    ))
    .context(expected("identifier"))
    .parse_next(input)
}

// ---------------------------------------------------------------------------
// Attributes
// ---------------------------------------------------------------------------

fn attribute(input: &mut &str) -> ModalResult<Attribute> {
    let key = id.parse_next(input)?;
    (ws, '=', ws).parse_next(input)?;
    let value = cut_err(id).parse_next(input)?;
    Ok(Attribute { key, value })
}

/// `ID = ID` as a statement of its own.
fn graph_attribute(input: &mut &str) -> ModalResult<Attribute> {
    attribute.parse_next(input)
}

fn attr_entry(input: &mut &str) -> ModalResult<AttributeStatement> {
    alt((
        comment.map(AttributeStatement::Comment),
        terminated(
            cut_attribute,
            opt(preceded(ws, one_of([';', ',']))),
        )
        .map(AttributeStatement::Attribute),
    ))
    .parse_next(input)
}

/// Inside `[...]` a key must be followed by `=`.
fn cut_attribute(input: &mut &str) -> ModalResult<Attribute> {
    let key = id.parse_next(input)?;
    cut_err((ws, '=', ws)).context(expected_char('=')).parse_next(input)?;
    let value = cut_err(id).parse_next(input)?;
    Ok(Attribute { key, value })
}

fn attr_list(input: &mut &str) -> ModalResult<Vec<AttributeStatement>> {
    '['.parse_next(input)?;
    let body: Vec<AttributeStatement> = repeat(0.., preceded(blank, attr_entry)).parse_next(input)?;
    preceded(blank, cut_err(']').context(expected_char(']'))).parse_next(input)?;
    Ok(body)
}

/// `[...][...]` flattened into one body.
fn attr_lists(input: &mut &str) -> ModalResult<Vec<AttributeStatement>> {
    let lists: Vec<Vec<AttributeStatement>> =
        repeat(0.., preceded(ws, attr_list)).parse_next(input)?;
    Ok(lists.into_iter().flatten().collect())
}

fn attributes_kind(input: &mut &str) -> ModalResult<AttributesKind> {
    alt((
        keyword("graph").value(AttributesKind::Graph),
        keyword("node").value(AttributesKind::Node),
        keyword("edge").value(AttributesKind::Edge),
    ))
    .parse_next(input)
}

/// `node [...]`, or a bare `node` ending the statement.
fn attributes_stmt(input: &mut &str) -> ModalResult<Attributes> {
    let kind = attributes_kind.parse_next(input)?;
    let lists: Vec<Vec<AttributeStatement>> =
        repeat(0.., preceded(ws, attr_list)).parse_next(input)?;
    if lists.is_empty() {
        peek(preceded(ws, alt((one_of([';', '}']).void(), eof.void())))).parse_next(input)?;
    }
    Ok(Attributes {
        kind,
        body: lists.into_iter().flatten().collect(),
    })
}

// ---------------------------------------------------------------------------
// Nodes and edges
// ---------------------------------------------------------------------------

fn compass(input: &mut &str) -> ModalResult<Compass> {
    raw_plain_id
        .verify_map(|s: &str| s.parse::<Compass>().ok())
        .context(expected("compass point"))
        .parse_next(input)
}

fn node_ref(input: &mut &str) -> ModalResult<NodeRef> {
    let id = id.parse_next(input)?;
    let port = opt(preceded((ws, ':', ws), cut_err(self::id))).parse_next(input)?;
    let compass = match port {
        Some(_) => opt(preceded((ws, ':', ws), cut_err(compass))).parse_next(input)?,
        None => None,
    };
    Ok(NodeRef { id, port, compass })
}

fn node_ref_group(input: &mut &str) -> ModalResult<NodeRefGroup> {
    '{'.parse_next(input)?;
    let body: Vec<NodeRef> = repeat(
        0..,
        delimited(ws, node_ref, opt(preceded(ws, one_of([';', ','])))),
    )
    .parse_next(input)?;
    (ws, '}').parse_next(input)?;
    Ok(NodeRefGroup { body })
}

fn edge_target(input: &mut &str) -> ModalResult<EdgeTarget> {
    alt((
        node_ref_group.map(EdgeTarget::NodeRefGroup),
        node_ref.map(EdgeTarget::NodeRef),
    ))
    .parse_next(input)
}

fn edge_op<'s>(input: &mut &'s str) -> ModalResult<&'s str> {
    alt(("->", "--")).parse_next(input)
}

fn edge(input: &mut &str) -> ModalResult<Edge> {
    let first = edge_target.parse_next(input)?;
    let rest: Vec<EdgeTarget> = repeat(
        1..,
        preceded(
            (ws, edge_op, ws),
            cut_err(edge_target).context(expected("edge target")),
        ),
    )
    .parse_next(input)?;
    let body = attr_lists.parse_next(input)?;
    let mut targets = Vec::with_capacity(rest.len() + 1);
    targets.push(first);
    targets.extend(rest);
    Ok(Edge { targets, body })
}

fn node(input: &mut &str) -> ModalResult<Node> {
    let node_ref = node_ref.parse_next(input)?;
    if let Some(port) = &node_ref.port {
        log::debug!(
            "dropping port `{}` of node statement `{}`",
            port.value,
            node_ref.id.value
        );
    }
    let body = attr_lists.parse_next(input)?;
    Ok(Node {
        id: node_ref.id,
        body,
    })
}

// ---------------------------------------------------------------------------
// Clusters
// ---------------------------------------------------------------------------

fn statement(input: &mut &str) -> ModalResult<ClusterStatement> {
    alt((
        attributes_stmt.map(ClusterStatement::Attributes),
        edge.map(ClusterStatement::Edge),
        subgraph.map(ClusterStatement::Subgraph),
        graph_attribute.map(ClusterStatement::Attribute),
        node.map(ClusterStatement::Node),
    ))
    .parse_next(input)
}

fn stmt_entry(input: &mut &str) -> ModalResult<Vec<ClusterStatement>> {
    alt((
        comment.map(|c| vec![ClusterStatement::Comment(c)]),
        terminated_statement,
    ))
    .parse_next(input)
}

/// A statement plus the comments sitting between it and its `;`, which are
/// kept as statements after it.
fn terminated_statement(input: &mut &str) -> ModalResult<Vec<ClusterStatement>> {
    let stmt = statement.parse_next(input)?;
    let before_semicolon: Option<Vec<Comment>> =
        opt(terminated(repeat(0.., preceded(blank, comment)), (blank, ';'))).parse_next(input)?;
    let mut body = vec![stmt];
    body.extend(
        before_semicolon
            .into_iter()
            .flatten()
            .map(ClusterStatement::Comment),
    );
    Ok(body)
}

fn block(input: &mut &str) -> ModalResult<Vec<ClusterStatement>> {
    '{'.parse_next(input)?;
    block_body.parse_next(input)
}

/// Statements up to and including the closing `}`.
fn block_body(input: &mut &str) -> ModalResult<Vec<ClusterStatement>> {
    let entries: Vec<Vec<ClusterStatement>> =
        repeat(0.., preceded(separators, stmt_entry)).parse_next(input)?;
    preceded(separators, cut_err('}').context(expected_char('}'))).parse_next(input)?;
    Ok(entries.into_iter().flatten().collect())
}

fn open_brace(input: &mut &str) -> ModalResult<()> {
    preceded(ws, cut_err('{').context(expected_char('{')))
        .void()
        .parse_next(input)
}

fn subgraph(input: &mut &str) -> ModalResult<Subgraph> {
    let header = opt(preceded(keyword("subgraph"), opt(preceded(ws, id)))).parse_next(input)?;
    let body = match header {
        Some(_) => {
            open_brace.parse_next(input)?;
            block_body.parse_next(input)?
        }
        None => block.parse_next(input)?,
    };
    Ok(Subgraph {
        id: header.flatten(),
        body,
    })
}

fn graph(input: &mut &str) -> ModalResult<Graph> {
    let strict = opt(terminated(keyword("strict"), ws)).parse_next(input)?.is_some();
    let directed = alt((
        keyword("digraph").value(true),
        keyword("graph").value(false),
    ))
    .context(expected("`graph` or `digraph`"))
    .parse_next(input)?;
    let id = opt(preceded(ws, id)).parse_next(input)?;
    open_brace.parse_next(input)?;
    let body = block_body.parse_next(input)?;
    Ok(Graph {
        directed,
        strict,
        id,
        body,
    })
}

fn dot(input: &mut &str) -> ModalResult<Dot> {
    let leading: Vec<Comment> = repeat(0.., preceded(blank, comment)).parse_next(input)?;
    let graph = preceded(blank, graph).parse_next(input)?;
    let trailing: Vec<Comment> = repeat(0.., preceded(blank, comment)).parse_next(input)?;
    blank.parse_next(input)?;

    let mut body: Vec<DotStatement> = leading.into_iter().map(DotStatement::Comment).collect();
    body.push(DotStatement::Graph(graph));
    body.extend(trailing.into_iter().map(DotStatement::Comment));
    Ok(Dot { body })
}
