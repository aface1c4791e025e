//
// parser_pool.rs
//
// Thread-local parser pool for efficient parser reuse
//

use std::cell::RefCell;
use std::collections::HashMap;

use tree_sitter::{Parser, Tree};

use crate::language::Language;

thread_local! {
    static PARSERS: RefCell<HashMap<Language, Parser>> = RefCell::new(HashMap::new());
}

/// Execute a function with a thread-local parser configured for `language`.
/// Parsers are created on first use and reused across calls on the same thread.
///
/// Returns `None` for languages without a grammar, or if the grammar is
/// incompatible with the linked tree-sitter runtime.
pub fn with_parser<F, R>(language: Language, f: F) -> Option<R>
where
    F: FnOnce(&mut Parser) -> R,
{
    let grammar = language.grammar()?;
    PARSERS.with(|parsers| {
        let mut parsers = parsers.borrow_mut();
        if !parsers.contains_key(&language) {
            let mut parser = Parser::new();
            if let Err(err) = parser.set_language(&grammar) {
                log::error!("Failed to load {:?} grammar: {}", language, err);
                return None;
            }
            parsers.insert(language, parser);
        }
        parsers.get_mut(&language).map(f)
    })
}

/// Parse `text` as `language`. `PlainText` never produces a tree.
pub fn parse(language: Language, text: &str) -> Option<Tree> {
    with_parser(language, |parser| parser.parse(text, None)).flatten()
}
