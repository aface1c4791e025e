//
// locator.rs
//
// Identifier locator: lazily extracts identifier tokens with their spans
//

use std::ops::Range;
use std::sync::OnceLock;

use regex::{CaptureMatches, Regex};
use ropey::Rope;
use tower_lsp::lsp_types::{Position, Range as LspRange};
use tree_sitter::{Node, Tree, TreeCursor};

use crate::language::Language;
use crate::utf16::byte_to_position;

/// One identifier token in a buffer snapshot.
///
/// Offsets are bytes into the snapshot text; `line` is 0-based and `column`
/// is counted in UTF-16 code units, matching LSP positions. An occurrence is
/// only meaningful for the snapshot it was computed from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Occurrence {
    pub name: String,
    pub start: usize,
    pub end: usize,
    pub line: u32,
    pub column: u32,
}

impl Occurrence {
    pub fn span(&self) -> Range<usize> {
        self.start..self.end
    }

    /// LSP range of the token. Identifiers never span lines.
    pub fn range(&self) -> LspRange {
        let width = self.name.encode_utf16().count() as u32;
        LspRange::new(
            Position::new(self.line, self.column),
            Position::new(self.line, self.column + width),
        )
    }

    /// Whether `range` lies within this token, touching either edge counts.
    pub fn touches(&self, range: &Range<usize>) -> bool {
        self.start <= range.start && range.end <= self.end
    }
}

/// Everything the locator needs from a document: its text, the rope used for
/// position math, and the syntax tree when the language has a grammar.
#[derive(Clone, Copy)]
pub struct Snapshot<'a> {
    pub text: &'a str,
    pub rope: &'a Rope,
    pub tree: Option<&'a Tree>,
    pub language: Language,
    pub include_members: bool,
}

impl<'a> Snapshot<'a> {
    /// Iterate over every identifier in document order.
    ///
    /// The iterator is lazy and holds no state beyond the walk itself;
    /// calling this again restarts the scan.
    pub fn identifiers(&self) -> Identifiers<'a> {
        let tokens = match self.tree {
            Some(tree) => Tokens::Tree(TreeWalk {
                cursor: tree.root_node().walk(),
                done: false,
            }),
            None => Tokens::Plain(plain_token_pattern().captures_iter(self.text)),
        };
        Identifiers {
            snapshot: *self,
            tokens,
        }
    }
}

pub struct Identifiers<'a> {
    snapshot: Snapshot<'a>,
    tokens: Tokens<'a>,
}

enum Tokens<'a> {
    Tree(TreeWalk<'a>),
    Plain(CaptureMatches<'static, 'a>),
}

impl<'a> Iterator for Identifiers<'a> {
    type Item = Occurrence;

    fn next(&mut self) -> Option<Occurrence> {
        let snapshot = self.snapshot;
        let span = match &mut self.tokens {
            Tokens::Tree(walk) => walk.find(|node| {
                node.start_byte() < node.end_byte()
                    && !node.is_missing()
                    && snapshot
                        .language
                        .is_identifier_node(*node, snapshot.include_members)
            })?
            .byte_range(),
            Tokens::Plain(matches) => matches
                .find_map(|caps| caps.name("ident"))?
                .range(),
        };
        Some(make_occurrence(snapshot, span))
    }
}

fn make_occurrence(snapshot: Snapshot<'_>, span: Range<usize>) -> Occurrence {
    let position = byte_to_position(snapshot.rope, span.start);
    Occurrence {
        name: snapshot.text[span.clone()].to_string(),
        start: span.start,
        end: span.end,
        line: position.line,
        column: position.character,
    }
}

/// Preorder walk over a syntax tree that never enters `ERROR` nodes.
struct TreeWalk<'t> {
    cursor: TreeCursor<'t>,
    done: bool,
}

impl<'t> Iterator for TreeWalk<'t> {
    type Item = Node<'t>;

    fn next(&mut self) -> Option<Node<'t>> {
        if self.done {
            return None;
        }
        let node = self.cursor.node();
        let descended = !node.is_error() && self.cursor.goto_first_child();
        if !descended {
            loop {
                if self.cursor.goto_next_sibling() {
                    break;
                }
                if !self.cursor.goto_parent() {
                    self.done = true;
                    break;
                }
            }
        }
        Some(node)
    }
}

/// Lexical approximation for languages without a grammar.
///
/// Alternatives are tried left to right, so string literals, comments and
/// numbers are consumed before a word can match inside them.
fn plain_token_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r#"(?s)"(?:[^"\\\n]|\\.)*"?|'(?:[^'\\\n]|\\.)*'?|`(?:[^`\\]|\\.)*`?|//[^\n]*|#[^\n]*|/\*.*?(?:\*/|\z)|[0-9][A-Za-z0-9_.]*|(?P<ident>[A-Za-z_][A-Za-z0-9_]*)"#,
        )
        .expect("plain token pattern is valid")
    })
}
