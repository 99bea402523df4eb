use crate::position::{Position, Span};
use crate::text::{Text, TextChar};

/// Immutable, line-addressable text.
///
/// A model is either a root [`Document`] or a window view over another model.
/// Positions `(line, col)` are valid on a line (`col <= line_len(line)`) or at
/// the virtual post-document position `(line_count, 0)`; everything else is a
/// programmer error caught by [`assert_position`].
///
/// [`assert_position`]: TextModel::assert_position
pub trait TextModel {
    /// Number of addressable lines.
    fn line_count(&self) -> usize;

    /// The line at `line`.
    ///
    /// # Panics
    ///
    /// Panics if `line` is out of range.
    fn line_at(&self, line: usize) -> Text;

    /// Translate an internal coordinate to the outermost source coordinate.
    ///
    /// Identity for a root model; window views chain the translation through
    /// their underlying model.
    fn absolute(&self, line: usize, col: usize) -> Position;

    /// Length of the line at `line`.
    fn line_len(&self, line: usize) -> usize {
        self.line_at(line).len()
    }

    /// The character at `(line, col)`.
    ///
    /// # Panics
    ///
    /// Panics if the position is not on a character.
    fn char_at(&self, line: usize, col: usize) -> TextChar {
        self.line_at(line).char_at(col)
    }

    /// Whether `(line, col)` is on a line, at a line end, or at the
    /// post-document position.
    fn valid(&self, line: usize, col: usize) -> bool {
        if line < self.line_count() {
            col <= self.line_len(line)
        } else {
            line == self.line_count() && col == 0
        }
    }

    /// Panics unless `(line, col)` is valid.
    fn assert_position(&self, line: usize, col: usize) {
        if !self.valid(line, col) {
            panic!(
                "invalid position {line}:{col} in a model of {} lines",
                self.line_count()
            );
        }
    }

    /// The lines covered by `span`, trimmed to it.
    ///
    /// The first and last entries are partial lines; a span ending at the
    /// newline transition of the last line contributes no trailing entry.
    fn slice_lines(&self, span: Span) -> Vec<Text> {
        let Span { start, end } = span;
        if start.line == end.line {
            return vec![self.line_at(start.line).slice(start.column, end.column)];
        }
        let mut lines = vec![self.line_at(start.line).slice_from(start.column)];
        for line in start.line + 1..end.line {
            lines.push(self.line_at(line));
        }
        if end.line < self.line_count() || end.column > 0 {
            lines.push(self.line_at(end.line).slice_to(end.column));
        }
        lines
    }

    /// The text covered by `span`, lines joined with `\n`.
    fn slice(&self, span: Span) -> String {
        let lines = self.slice_lines(span);
        let mut out = String::new();
        for (i, line) in lines.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            out.push_str(&line.to_string());
        }
        out
    }
}

/// The root text model: a list of normalized lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    lines: Vec<Text>,
}

impl Document {
    /// Split `source` into lines on `\r\n`, `\n`, or `\r` and normalize each.
    ///
    /// A trailing line break yields a trailing empty line, the way string
    /// splitting does, so `"a\n"` has two lines.
    pub fn new(source: &str) -> Self {
        let mut lines = Vec::new();
        let mut current = String::new();
        let mut iter = source.chars().peekable();
        while let Some(c) = iter.next() {
            match c {
                '\n' => {
                    lines.push(Text::new(&current));
                    current.clear();
                }
                '\r' => {
                    if iter.peek() == Some(&'\n') {
                        iter.next();
                    }
                    lines.push(Text::new(&current));
                    current.clear();
                }
                _ => current.push(c),
            }
        }
        lines.push(Text::new(&current));
        Self { lines }
    }

    /// Build a document from prepared lines.
    pub fn from_lines(lines: Vec<Text>) -> Self {
        Self { lines }
    }
}

impl TextModel for Document {
    fn line_count(&self) -> usize {
        self.lines.len()
    }

    fn line_at(&self, line: usize) -> Text {
        self.lines[line].clone()
    }

    fn absolute(&self, line: usize, col: usize) -> Position {
        Position::new(line, col)
    }
}
