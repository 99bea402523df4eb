use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use unicode_normalization::UnicodeNormalization;

/// One NFC-normalized character of source text.
///
/// Constructed only through [`Text::new`], so every `TextChar` in a model has
/// been through the same normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TextChar(char);

impl TextChar {
    /// The underlying character.
    pub fn as_char(self) -> char {
        self.0
    }
}

impl fmt::Display for TextChar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One line of text.
///
/// Stored as a shared character buffer plus an offset range, so window views
/// slice lines in O(1) without copying. Must never contain a line break;
/// splitting into lines is [`Document::new`]'s job.
///
/// [`Document::new`]: crate::Document::new
#[derive(Clone)]
pub struct Text {
    chars: Rc<[TextChar]>,
    start: usize,
    end: usize,
}

impl Text {
    /// Build a line from a string, applying NFC normalization.
    pub fn new(line: &str) -> Self {
        debug_assert!(
            !line.contains(['\n', '\r']),
            "a Text is a single line and must not contain a line break"
        );
        let chars: Vec<TextChar> = line.nfc().map(TextChar).collect();
        let end = chars.len();
        Self { chars: chars.into(), start: 0, end }
    }

    /// The empty line.
    pub fn empty() -> Self {
        Self::new("")
    }

    /// Number of characters.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Whether the line has no characters.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// The character at `col`.
    ///
    /// # Panics
    ///
    /// Panics if `col` is out of range.
    pub fn char_at(&self, col: usize) -> TextChar {
        self.as_slice()[col]
    }

    /// The character at `col`, or `None` past the end of the line.
    pub fn get(&self, col: usize) -> Option<TextChar> {
        self.as_slice().get(col).copied()
    }

    /// The sub-line `[from, to[`. O(1); shares the underlying buffer.
    ///
    /// # Panics
    ///
    /// Panics if the range is out of order or out of bounds.
    pub fn slice(&self, from: usize, to: usize) -> Text {
        assert!(
            from <= to && to <= self.len(),
            "slice {from}..{to} out of range for line of length {}",
            self.len()
        );
        Text {
            chars: Rc::clone(&self.chars),
            start: self.start + from,
            end: self.start + to,
        }
    }

    /// The suffix of the line starting at `from`.
    pub fn slice_from(&self, from: usize) -> Text {
        self.slice(from, self.len())
    }

    /// The prefix of the line ending at `to`.
    pub fn slice_to(&self, to: usize) -> Text {
        self.slice(0, to)
    }

    /// Iterate over the characters.
    pub fn chars(&self) -> impl Iterator<Item = TextChar> + '_ {
        self.as_slice().iter().copied()
    }

    fn as_slice(&self) -> &[TextChar] {
        &self.chars[self.start..self.end]
    }
}

impl PartialEq for Text {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl Eq for Text {}

impl Hash for Text {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_slice().hash(state)
    }
}

impl fmt::Display for Text {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in self.chars() {
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Text {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.to_string())
    }
}
