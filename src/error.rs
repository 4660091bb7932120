use thiserror::Error;

use crate::ast::Rule;
use crate::display_width::{caret_line, source_line};

/// A point in the source text. `line` and `column` are 1-based, `column`
/// counts chars.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn locate(source: &str, offset: usize) -> Self {
        let mut offset = offset.min(source.len());
        while !source.is_char_boundary(offset) {
            offset -= 1;
        }
        let before = &source[..offset];
        let line = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map_or(0, |i| i + 1);
        let column = before[line_start..].chars().count() + 1;
        Self {
            offset,
            line,
            column,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub start: Position,
    pub end: Position,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("syntax error at {}:{}: {message}", .location.start.line, .location.start.column)]
pub struct SyntaxError {
    pub message: String,
    pub location: Location,
}

impl SyntaxError {
    /// The offending source line with a caret marker underneath.
    pub fn snippet(&self, source: &str) -> String {
        let start = self.location.start;
        let text = source_line(source, start.line);
        let span = if self.location.end.line == start.line {
            self.location.end.column.saturating_sub(start.column)
        } else {
            1
        };
        let gutter = start.line.to_string();
        format!(
            "{gutter} | {text}\n{} | {}",
            " ".repeat(gutter.len()),
            caret_line(text, start.column, span)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConvertError {
    #[error("no graph found in the document")]
    MissingGraph,
    #[error("an edge needs at least two targets, found {found}")]
    EdgeArity { found: usize },
    #[error("a standalone `{kind}` has no model representation")]
    Standalone { kind: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    #[error(transparent)]
    Convert(#[from] ConvertError),
    #[error("a `{0}` fragment has no standalone model representation")]
    UnsupportedFragment(Rule),
}
