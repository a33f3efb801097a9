//! S-expression parser for KiCad files.
//!
//! Grammar:
//!   sexpr  = '(' atom_or_sexpr* ')'
//!   atom   = string | symbol
//!   string = '"' [^"]* '"'  (with escape handling)
//!   symbol = [^ \t\n\r()"]+
//!
//! Lists remember the byte range they occupy in the source so that the
//! writer can splice edits back into the original text.

use std::ops::Range;

pub type Span = Range<usize>;

#[derive(Debug, Clone, PartialEq)]
pub enum SExpr {
    List { items: Vec<SExpr>, span: Span },
    /// Bare symbol or number.
    Atom(String),
    /// Quoted string, unescaped.
    Str(String),
}

impl SExpr {
    /// Get the first atom in a list (the "tag" or "name").
    pub fn tag(&self) -> Option<&str> {
        self.items().first().and_then(|item| match item {
            SExpr::Atom(s) => Some(s.as_str()),
            _ => None,
        })
    }

    /// Get list children (everything after the tag).
    pub fn children(&self) -> &[SExpr] {
        match self.items() {
            [] => &[],
            items => &items[1..],
        }
    }

    /// Get all items including tag.
    pub fn items(&self) -> &[SExpr] {
        match self {
            SExpr::List { items, .. } => items,
            _ => &[],
        }
    }

    /// Byte range of a list in the source text.
    pub fn span(&self) -> Option<Span> {
        match self {
            SExpr::List { span, .. } => Some(span.clone()),
            _ => None,
        }
    }

    /// Find a child list with the given tag.
    pub fn find(&self, tag: &str) -> Option<&SExpr> {
        self.children().iter().find(|c| c.tag() == Some(tag))
    }

    /// Find all child lists with the given tag.
    pub fn find_all(&self, tag: &str) -> Vec<&SExpr> {
        self.children()
            .iter()
            .filter(|c| c.tag() == Some(tag))
            .collect()
    }

    /// Get the value of a simple (tag value) node.
    pub fn value(&self, tag: &str) -> Option<&str> {
        self.find(tag).and_then(|node| node.atom_at(0))
    }

    /// Get the text of an atom or string.
    pub fn as_atom(&self) -> Option<&str> {
        match self {
            SExpr::Atom(s) | SExpr::Str(s) => Some(s.as_str()),
            SExpr::List { .. } => None,
        }
    }

    /// Parse a float from a simple (tag value) node.
    pub fn value_f64(&self, tag: &str) -> Option<f64> {
        self.value(tag).and_then(|v| v.parse().ok())
    }

    /// Get the nth atom child (0-indexed from children, i.e., after the tag).
    pub fn atom_at(&self, index: usize) -> Option<&str> {
        self.children().get(index).and_then(|v| v.as_atom())
    }

    /// Get the nth child as f64.
    pub fn f64_at(&self, index: usize) -> Option<f64> {
        self.atom_at(index).and_then(|v| v.parse().ok())
    }
}

struct Parser<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a [u8]) -> Self {
        Self { input, pos: 0 }
    }

    fn skip_whitespace(&mut self) {
        while let Some(b' ' | b'\t' | b'\n' | b'\r') = self.peek() {
            self.pos += 1;
        }
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn parse_string(&mut self) -> Result<String, String> {
        let start = self.pos;
        // Skip opening quote
        self.pos += 1;
        let mut bytes = Vec::new();
        while let Some(b) = self.peek() {
            self.pos += 1;
            match b {
                b'"' => return Ok(String::from_utf8_lossy(&bytes).into_owned()),
                b'\\' => {
                    let escaped = self
                        .peek()
                        .ok_or_else(|| format!("unterminated escape at byte {}", self.pos))?;
                    self.pos += 1;
                    bytes.push(match escaped {
                        b'n' => b'\n',
                        b't' => b'\t',
                        b'r' => b'\r',
                        other => other,
                    });
                }
                _ => bytes.push(b),
            }
        }
        Err(format!("unterminated string starting at byte {start}"))
    }

    fn parse_symbol(&mut self) -> String {
        let start = self.pos;
        while let Some(b) = self.peek() {
            match b {
                b' ' | b'\t' | b'\n' | b'\r' | b'(' | b')' | b'"' => break,
                _ => self.pos += 1,
            }
        }
        String::from_utf8_lossy(&self.input[start..self.pos]).into_owned()
    }

    fn parse_sexpr(&mut self) -> Result<SExpr, String> {
        self.skip_whitespace();
        match self.peek() {
            Some(b'(') => {
                let start = self.pos;
                self.pos += 1;
                let mut items = Vec::new();
                loop {
                    self.skip_whitespace();
                    match self.peek() {
                        Some(b')') => {
                            self.pos += 1;
                            break;
                        }
                        None => return Err(format!("unclosed list starting at byte {start}")),
                        _ => items.push(self.parse_sexpr()?),
                    }
                }
                Ok(SExpr::List {
                    items,
                    span: start..self.pos,
                })
            }
            Some(b'"') => Ok(SExpr::Str(self.parse_string()?)),
            Some(b')') => Err(format!("unexpected ')' at byte {}", self.pos)),
            Some(_) => Ok(SExpr::Atom(self.parse_symbol())),
            None => Err("empty input".to_string()),
        }
    }
}

/// Parse an S-expression from bytes.
pub fn parse(input: &[u8]) -> Result<SExpr, String> {
    Parser::new(input).parse_sexpr()
}
