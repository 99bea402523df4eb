use crate::model::TextModel;
use crate::position::Position;
use crate::text::Text;

/// A column-skipping callback: the number of leading columns to drop from a
/// line starting at a column, or negative for "stop here".
pub type ColumnSkip<'a> = &'a dyn Fn(&Text, usize) -> isize;

/// Restricts a model to the lines of one indented section.
///
/// Keeps lines through the first non-indented line after `line`; columns and
/// line numbers are unchanged.
pub struct CutOff<'a> {
    source: &'a dyn TextModel,
    line_count: usize,
}

impl<'a> CutOff<'a> {
    pub fn new(source: &'a dyn TextModel, line: usize, is_indented: &dyn Fn(&Text) -> bool) -> Self {
        let total = source.line_count();
        let mut line_count = total;
        let mut i = line + 1;
        while i < total {
            if !is_indented(&source.line_at(i)) {
                line_count = i + 1;
                break;
            }
            i += 1;
        }
        Self { source, line_count }
    }
}

impl TextModel for CutOff<'_> {
    fn line_count(&self) -> usize {
        self.line_count
    }

    fn line_at(&self, line: usize) -> Text {
        assert!(line < self.line_count, "line {line} out of range");
        self.source.line_at(line)
    }

    fn absolute(&self, line: usize, col: usize) -> Position {
        self.source.absolute(line, col)
    }
}

#[derive(Debug, Clone, Copy)]
struct Row {
    line: usize,
    offset: usize,
}

/// A re-indentation window: a run of trimmed line suffixes with a fresh
/// origin, so an indented block parses as if it started at column zero.
///
/// Anchored at `(line, col)`: row 0 is the remainder of the anchor line after
/// `skip_first` columns (omitted entirely when `skip_first` is negative);
/// each following line contributes a row trimmed by `skip_rest` leading
/// columns, stopping at the first line where `skip_rest` is negative. The
/// empty variant (no rows) pins every coordinate to the anchor.
pub struct CutOut<'a> {
    source: &'a dyn TextModel,
    anchor: Position,
    rows: Vec<Row>,
}

impl<'a> CutOut<'a> {
    pub fn new(
        source: &'a dyn TextModel,
        line: usize,
        col: usize,
        skip_first: ColumnSkip<'_>,
        skip_rest: ColumnSkip<'_>,
    ) -> Self {
        let mut rows = Vec::new();
        if line < source.line_count() {
            let first = source.line_at(line);
            let skip = skip_first(&first, col);
            if skip >= 0 {
                rows.push(Row { line, offset: col + skip as usize });
            }
        }
        let mut i = line + 1;
        while i < source.line_count() {
            let skip = skip_rest(&source.line_at(i), 0);
            if skip < 0 {
                break;
            }
            rows.push(Row { line: i, offset: skip as usize });
            i += 1;
        }
        Self { source, anchor: Position::new(line, col), rows }
    }

    /// Translate a window coordinate back to a coordinate of the underlying
    /// model.
    ///
    /// The post-window position `(row_count, 0)` maps to the newline
    /// transition after the last row; in the empty variant every coordinate
    /// maps to the anchor.
    pub fn shift(&self, line: usize, col: usize) -> Position {
        if let Some(row) = self.rows.get(line) {
            return Position::new(row.line, row.offset + col);
        }
        match self.rows.last() {
            _ if line > self.rows.len() || col > 0 => {
                panic!("window position {line}:{col} out of range")
            }
            Some(row) => Position::new(row.line + 1, 0),
            None => self.anchor,
        }
    }
}

impl TextModel for CutOut<'_> {
    fn line_count(&self) -> usize {
        self.rows.len()
    }

    fn line_at(&self, line: usize) -> Text {
        let row = self.rows[line];
        self.source.line_at(row.line).slice_from(row.offset)
    }

    fn absolute(&self, line: usize, col: usize) -> Position {
        let pos = self.shift(line, col);
        self.source.absolute(pos.line, pos.column)
    }
}

/// Truncates a model at an end position.
///
/// Lines before `end.line` are unchanged, line `end.line` is cut to
/// `end.column` columns, and later lines disappear. Pass-through when the end
/// lies at or beyond the model's extent.
pub struct Until<'a> {
    source: &'a dyn TextModel,
    end: Position,
}

impl<'a> Until<'a> {
    pub fn new(source: &'a dyn TextModel, end: Position) -> Self {
        Self { source, end }
    }
}

impl TextModel for Until<'_> {
    fn line_count(&self) -> usize {
        if self.end.line >= self.source.line_count() {
            self.source.line_count()
        } else {
            self.end.line + 1
        }
    }

    fn line_at(&self, line: usize) -> Text {
        assert!(line < self.line_count(), "line {line} out of range");
        let text = self.source.line_at(line);
        if line == self.end.line && self.end.column < text.len() {
            text.slice_to(self.end.column)
        } else {
            text
        }
    }

    fn absolute(&self, line: usize, col: usize) -> Position {
        self.source.absolute(line, col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Document;
    use crate::text::TextChar;

    /// Columns of leading spaces, or negative when there are none.
    fn spaces(text: &Text, col: usize) -> isize {
        let mut n = 0;
        while text.get(col + n).map(TextChar::as_char) == Some(' ') {
            n += 1;
        }
        if n == 0 {
            -1
        } else {
            n as isize
        }
    }

    /// Exactly four leading spaces, or negative.
    fn indent4(text: &Text, col: usize) -> isize {
        match spaces(text, col) {
            4.. => 4,
            _ => -1,
        }
    }

    #[test]
    fn cutoff_stops_after_first_nonindented_line() {
        let doc = Document::new("- x\n  a\n  b\nend\ntail");
        let indented = |t: &Text| spaces(t, 0) > 0;
        let cutoff = CutOff::new(&doc, 0, &indented);
        assert_eq!(cutoff.line_count(), 4);
        assert_eq!(cutoff.line_at(3).to_string(), "end");
    }

    #[test]
    fn cutoff_without_nonindented_tail_keeps_everything() {
        let doc = Document::new("- x\n  a\n  b");
        let indented = |t: &Text| spaces(t, 0) > 0;
        let cutoff = CutOff::new(&doc, 0, &indented);
        assert_eq!(cutoff.line_count(), 3);
    }

    #[test]
    fn cutout_trims_indentation_and_shifts_back() {
        let doc = Document::new("- x\n    a\n    b\nend");
        let cutout = CutOut::new(&doc, 0, 3, &spaces, &indent4);
        // No continuation text after the bullet, so row 0 is omitted.
        assert_eq!(cutout.line_count(), 2);
        assert_eq!(cutout.line_at(0).to_string(), "a");
        assert_eq!(cutout.line_at(1).to_string(), "b");
        assert_eq!(cutout.shift(0, 0), Position::new(1, 4));
        assert_eq!(cutout.shift(1, 1), Position::new(2, 5));
        // Post-window position maps to the newline transition after row 1.
        assert_eq!(cutout.shift(2, 0), Position::new(3, 0));
    }

    #[test]
    fn cutout_keeps_a_first_row_with_continuation_text() {
        let doc = Document::new("- x  tail\n    a\nend");
        let cutout = CutOut::new(&doc, 0, 3, &spaces, &indent4);
        assert_eq!(cutout.line_count(), 2);
        assert_eq!(cutout.line_at(0).to_string(), "tail");
        assert_eq!(cutout.shift(0, 0), Position::new(0, 5));
        assert_eq!(cutout.shift(1, 0), Position::new(1, 4));
    }

    #[test]
    fn empty_cutout_is_anchored_to_one_position() {
        let doc = Document::new("- x\nend");
        let cutout = CutOut::new(&doc, 0, 3, &spaces, &indent4);
        assert_eq!(cutout.line_count(), 0);
        assert_eq!(cutout.shift(0, 0), Position::new(0, 3));
        assert!(cutout.valid(0, 0));
    }

    #[test]
    fn cutout_absolute_chains_through_the_source() {
        let doc = Document::new("- x\n    a\n        b\nend");
        let indented = |t: &Text| spaces(t, 0) > 0;
        let cutoff = CutOff::new(&doc, 0, &indented);
        let cutout = CutOut::new(&cutoff, 0, 3, &spaces, &indent4);
        assert_eq!(cutout.absolute(0, 1), Position::new(1, 5));
        assert_eq!(cutout.absolute(1, 0), Position::new(2, 4));
    }

    #[test]
    fn until_truncates_the_end_line() {
        let doc = Document::new("1+2+\nrest");
        let until = Until::new(&doc, Position::new(0, 3));
        assert_eq!(until.line_count(), 1);
        assert_eq!(until.line_at(0).to_string(), "1+2");
        assert!(until.valid(0, 3));
        assert!(!until.valid(0, 4));
    }

    #[test]
    fn until_past_the_extent_is_passthrough() {
        let doc = Document::new("ab\ncd");
        let until = Until::new(&doc, Position::new(5, 0));
        assert_eq!(until.line_count(), 2);
        assert_eq!(until.line_at(1).to_string(), "cd");
    }
}
