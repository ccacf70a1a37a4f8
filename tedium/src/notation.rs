//! Bracket notation for trees: `f(d(a, c(b)), e)`.
//!
//! A tree is a label optionally followed by a parenthesized, comma-separated
//! list of child trees. Bare labels run until whitespace or one of `(),"`.
//! Anything else goes in double quotes, with `\` escaping the next character:
//! `"hello world"("a, b", "\"")`.
//!
//! A forest is a comma-separated list of trees; the empty string is the empty
//! forest.

use core::fmt;
use core::str::FromStr;

use facet::Facet;

use crate::tree::{Forest, Tree};

/// Why a bracket-notation string could not be parsed.
#[derive(Facet, Debug, Clone, PartialEq, Eq)]
#[facet(derive(Error))]
#[repr(u8)]
pub enum NotationError {
    /// unexpected end of input at byte {offset}
    UnexpectedEnd {
        /// Byte offset into the input
        offset: usize,
    },

    /// unexpected character {found} at byte {offset}
    UnexpectedChar {
        /// Byte offset into the input
        offset: usize,
        /// The character found there
        found: char,
    },

    /// expected a label at byte {offset}
    ExpectedLabel {
        /// Byte offset into the input
        offset: usize,
    },

    /// quoted label starting at byte {offset} is never closed
    UnterminatedQuote {
        /// Byte offset of the opening quote
        offset: usize,
    },

    /// trailing input after the tree at byte {offset}
    TrailingInput {
        /// Byte offset into the input
        offset: usize,
    },
}

fn is_delimiter(b: u8) -> bool {
    matches!(b, b'(' | b')' | b',' | b'"')
}

struct Cursor<'s> {
    input: &'s str,
    pos: usize,
}

impl<'s> Cursor<'s> {
    fn new(input: &'s str) -> Self {
        Self { input, pos: 0 }
    }

    fn peek(&self) -> Option<u8> {
        self.input.as_bytes().get(self.pos).copied()
    }

    fn at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    fn eat(&mut self, expected: u8) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn unexpected(&self) -> NotationError {
        match self.input[self.pos..].chars().next() {
            Some(found) => NotationError::UnexpectedChar {
                offset: self.pos,
                found,
            },
            None => NotationError::UnexpectedEnd { offset: self.pos },
        }
    }

    fn label(&mut self) -> Result<String, NotationError> {
        let start = self.pos;
        match self.peek() {
            None => Err(NotationError::UnexpectedEnd { offset: start }),
            Some(b'"') => self.quoted(),
            Some(b) if is_delimiter(b) => Err(NotationError::ExpectedLabel { offset: start }),
            Some(_) => {
                while self
                    .peek()
                    .is_some_and(|b| !is_delimiter(b) && !b.is_ascii_whitespace())
                {
                    self.pos += 1;
                }
                Ok(self.input[start..self.pos].to_string())
            }
        }
    }

    fn quoted(&mut self) -> Result<String, NotationError> {
        let start = self.pos;
        let body = start + 1;
        let mut label = String::new();
        let mut chars = self.input[body..].char_indices();
        while let Some((i, c)) = chars.next() {
            match c {
                '"' => {
                    self.pos = body + i + 1;
                    return Ok(label);
                }
                '\\' => match chars.next() {
                    Some((_, escaped)) => label.push(escaped),
                    None => break,
                },
                _ => label.push(c),
            }
        }
        Err(NotationError::UnterminatedQuote { offset: start })
    }
}

/// A node whose children are still being parsed.
struct Frame {
    label: String,
    children: Vec<Tree<String>>,
}

fn parse_trees(input: &str, many: bool) -> Result<Vec<Tree<String>>, NotationError> {
    let mut cursor = Cursor::new(input);
    let mut roots = Vec::new();
    let mut stack: Vec<Frame> = Vec::new();

    cursor.skip_ws();
    if many && cursor.at_end() {
        return Ok(roots);
    }

    'node: loop {
        cursor.skip_ws();
        let label = cursor.label()?;
        cursor.skip_ws();
        if cursor.eat(b'(') {
            stack.push(Frame {
                label,
                children: Vec::new(),
            });
            continue;
        }

        let mut done = Tree::leaf(label);
        loop {
            cursor.skip_ws();
            let Some(mut frame) = stack.pop() else {
                roots.push(done);
                if cursor.at_end() {
                    return Ok(roots);
                }
                if many && cursor.eat(b',') {
                    continue 'node;
                }
                return Err(if many {
                    cursor.unexpected()
                } else {
                    NotationError::TrailingInput { offset: cursor.pos }
                });
            };

            frame.children.push(done);
            if cursor.eat(b',') {
                stack.push(frame);
                continue 'node;
            }
            if cursor.eat(b')') {
                done = Tree::new(frame.label, frame.children);
                continue;
            }
            return Err(cursor.unexpected());
        }
    }
}

/// Parse a single tree.
///
/// ```
/// use tedium::{Tree, notation::parse};
///
/// let tree = parse("f(d(a, c(b)), e)").unwrap();
/// assert_eq!(tree.children().len(), 2);
/// assert_eq!(tree.to_string(), "f(d(a, c(b)), e)");
/// ```
pub fn parse(input: &str) -> Result<Tree<String>, NotationError> {
    let mut trees = parse_trees(input, false)?;
    // Single-tree mode stops at the first complete root.
    Ok(trees.remove(0))
}

/// Parse a comma-separated forest. Blank input is the empty forest.
pub fn parse_forest(input: &str) -> Result<Forest<String>, NotationError> {
    parse_trees(input, true).map(Forest::from)
}

impl FromStr for Tree<String> {
    type Err = NotationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}

impl FromStr for Forest<String> {
    type Err = NotationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_forest(s)
    }
}

fn write_label(f: &mut fmt::Formatter<'_>, label: &impl fmt::Display) -> fmt::Result {
    let text = label.to_string();
    let bare = !text.is_empty()
        && !text
            .bytes()
            .any(|b| is_delimiter(b) || b == b'\\' || b.is_ascii_whitespace());
    if bare {
        return f.write_str(&text);
    }

    f.write_str("\"")?;
    for c in text.chars() {
        if c == '"' || c == '\\' {
            f.write_str("\\")?;
        }
        write!(f, "{c}")?;
    }
    f.write_str("\"")
}

impl<T: fmt::Display> fmt::Display for Tree<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_label(f, self.label())?;
        if self.is_leaf() {
            return Ok(());
        }
        f.write_str("(")?;
        for (i, child) in self.children().iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            fmt::Display::fmt(child, f)?;
        }
        f.write_str(")")
    }
}

impl<T: fmt::Display> fmt::Display for Forest<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, tree) in self.trees().iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            fmt::Display::fmt(tree, f)?;
        }
        Ok(())
    }
}
