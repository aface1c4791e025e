//
// language.rs
//
// Languages understood by the identifier locator
//

use tower_lsp::lsp_types::Url;
use tree_sitter::Node;

/// Source language of an open document.
///
/// Languages with a tree-sitter grammar get exact lexing (strings and
/// comments are never mistaken for code). Everything else falls back to
/// `PlainText`, which uses a C-family lexical approximation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    JavaScript,
    Python,
    Rust,
    PlainText,
}

impl Language {
    /// Resolve a language from the LSP `languageId`, falling back to the
    /// document's file extension when the id is unknown.
    pub fn detect(language_id: &str, uri: &Url) -> Self {
        Self::from_language_id(language_id).unwrap_or_else(|| Self::from_uri(uri))
    }

    pub fn from_language_id(language_id: &str) -> Option<Self> {
        match language_id {
            "javascript" | "javascriptreact" => Some(Self::JavaScript),
            "python" => Some(Self::Python),
            "rust" => Some(Self::Rust),
            "plaintext" => Some(Self::PlainText),
            _ => None,
        }
    }

    pub fn from_uri(uri: &Url) -> Self {
        let extension = uri
            .path()
            .rsplit('/')
            .next()
            .and_then(|file| file.rsplit_once('.'))
            .map(|(_, ext)| ext.to_ascii_lowercase());

        match extension.as_deref() {
            Some("js" | "mjs" | "cjs" | "jsx") => Self::JavaScript,
            Some("py" | "pyi") => Self::Python,
            Some("rs") => Self::Rust,
            _ => Self::PlainText,
        }
    }

    pub fn grammar(self) -> Option<tree_sitter::Language> {
        match self {
            Self::JavaScript => Some(tree_sitter_javascript::LANGUAGE.into()),
            Self::Python => Some(tree_sitter_python::LANGUAGE.into()),
            Self::Rust => Some(tree_sitter_rust::LANGUAGE.into()),
            Self::PlainText => None,
        }
    }

    /// Whether `node` is an identifier token in this language.
    ///
    /// Member names (`obj.value`, `self.field`) only count when
    /// `include_members` is set.
    pub fn is_identifier_node(self, node: Node, include_members: bool) -> bool {
        let kind = node.kind();
        match self {
            Self::JavaScript => match kind {
                // `{ x }` in an object literal also reads the variable `x`
                "identifier"
                | "shorthand_property_identifier"
                | "shorthand_property_identifier_pattern" => true,
                "property_identifier" | "private_property_identifier" => include_members,
                _ => false,
            },
            Self::Python => kind == "identifier" && (include_members || !is_python_attribute(node)),
            Self::Rust => match kind {
                "identifier" => !is_rust_lifetime_name(node),
                // `Person { age }` also reads the variable `age`
                "type_identifier" | "shorthand_field_identifier" => true,
                "field_identifier" => include_members,
                _ => false,
            },
            Self::PlainText => false,
        }
    }

    /// Whether `text` is a single well-formed identifier.
    ///
    /// Letters, digits and underscores, not starting with a digit. JavaScript
    /// additionally allows `$`.
    pub fn is_identifier(self, text: &str) -> bool {
        let allow_dollar = self == Self::JavaScript;
        let mut chars = text.chars();
        let Some(first) = chars.next() else {
            return false;
        };
        let is_start = |c: char| c == '_' || c.is_alphabetic() || (allow_dollar && c == '$');
        is_start(first) && chars.all(|c| is_start(c) || c.is_alphanumeric())
    }
}

fn is_python_attribute(node: Node) -> bool {
    node.parent()
        .filter(|parent| parent.kind() == "attribute")
        .and_then(|parent| parent.child_by_field_name("attribute"))
        .is_some_and(|attr| attr.id() == node.id())
}

/// The `a` of `'a`, which is a lifetime or loop label rather than a binding.
fn is_rust_lifetime_name(node: Node) -> bool {
    node.parent()
        .is_some_and(|parent| matches!(parent.kind(), "lifetime" | "label"))
}
