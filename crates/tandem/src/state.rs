//
// state.rs
//
// Open documents and the server's world state
//

use std::collections::HashMap;
use std::ops::Range;

use anyhow::{anyhow, bail};
use ropey::Rope;
use tower_lsp::lsp_types::{Range as LspRange, TextDocumentContentChangeEvent, Url};
use tree_sitter::Tree;

use crate::config::TandemConfig;
use crate::language::Language;
use crate::locator::{Occurrence, Snapshot};
use crate::occurrences::OccurrenceIndex;
use crate::parser_pool;
use crate::perf::TimingGuard;
use crate::session::HighlightSession;
use crate::utf16::position_to_byte;
use crate::watcher::{EditWatcher, WatchEvent};

/// A byte-level edit: `range` of the pre-edit buffer was replaced by
/// `new_len` bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferEdit {
    pub range: Range<usize>,
    pub new_len: usize,
}

impl BufferEdit {
    /// Span in the post-edit buffer covered by the inserted text.
    pub fn inserted(&self) -> Range<usize> {
        self.range.start..self.range.start + self.new_len
    }
}

/// Result of applying one content change.
#[derive(Debug, Clone)]
pub struct AppliedChange {
    pub edit: BufferEdit,
    /// Identifier of the pre-edit buffer that contained the edited range
    pub touched: Option<Occurrence>,
}

/// A parsed document
pub struct Document {
    pub contents: Rope,
    pub tree: Option<Tree>,
    pub language: Language,
    pub version: Option<i32>,
    pub revision: u64,
    pub index: OccurrenceIndex,
    include_members: bool,
}

impl Document {
    pub fn new(text: &str, language: Language, version: Option<i32>, include_members: bool) -> Self {
        let mut doc = Self {
            contents: Rope::from_str(text),
            tree: None,
            language,
            version,
            revision: 0,
            index: OccurrenceIndex::default(),
            include_members,
        };
        doc.reindex();
        doc
    }

    pub fn text(&self) -> String {
        self.contents.to_string()
    }

    /// Text of a byte range, or `None` when it is out of bounds or splits a
    /// character.
    pub fn slice(&self, range: Range<usize>) -> Option<String> {
        self.contents.get_byte_slice(range).map(|s| s.to_string())
    }

    /// Convert an LSP range into byte offsets of the current contents.
    pub fn resolve_range(&self, range: &LspRange) -> anyhow::Result<Range<usize>> {
        let start = position_to_byte(&self.contents, range.start)
            .ok_or_else(|| anyhow!("start position {:?} is outside the document", range.start))?;
        let end = position_to_byte(&self.contents, range.end)
            .ok_or_else(|| anyhow!("end position {:?} is outside the document", range.end))?;
        if end < start {
            bail!("range end {:?} precedes start {:?}", range.end, range.start);
        }
        Ok(start..end)
    }

    /// Apply one LSP content change.
    ///
    /// Ranged changes are applied as-is. Full-document changes are reduced
    /// to the smallest differing byte range so a single keystroke still
    /// looks like a single-token edit.
    pub fn apply_change(&mut self, change: TextDocumentContentChangeEvent) -> anyhow::Result<AppliedChange> {
        let (range, text) = match change.range {
            Some(range) => (self.resolve_range(&range)?, change.text),
            None => {
                let old = self.text();
                let (range, inserted) = minimal_edit(&old, &change.text);
                (range, change.text[inserted].to_string())
            }
        };

        let touched = self.index.occurrence_touching(&range).cloned();
        self.splice(range.clone(), &text)?;

        Ok(AppliedChange {
            edit: BufferEdit {
                range,
                new_len: text.len(),
            },
            touched,
        })
    }

    /// Replace a byte range with `text`, then reparse and reindex.
    pub fn splice(&mut self, range: Range<usize>, text: &str) -> anyhow::Result<()> {
        let start = self.byte_to_char_checked(range.start)?;
        let end = self.byte_to_char_checked(range.end)?;

        self.contents.remove(start..end);
        self.contents.insert(start, text);
        self.revision += 1;
        self.reindex();
        Ok(())
    }

    pub fn set_include_members(&mut self, include_members: bool) {
        if self.include_members != include_members {
            self.include_members = include_members;
            self.reindex();
        }
    }

    fn byte_to_char_checked(&self, byte: usize) -> anyhow::Result<usize> {
        if byte > self.contents.len_bytes() {
            bail!("byte offset {} is past the end of the document", byte);
        }
        let char_idx = self.contents.byte_to_char(byte);
        if self.contents.char_to_byte(char_idx) != byte {
            bail!("byte offset {} is not on a character boundary", byte);
        }
        Ok(char_idx)
    }

    fn reindex(&mut self) {
        let _guard = TimingGuard::new("document_reindex");
        let text = self.text();
        self.tree = parser_pool::parse(self.language, &text);
        self.index = OccurrenceIndex::build(Snapshot {
            text: &text,
            rope: &self.contents,
            tree: self.tree.as_ref(),
            language: self.language,
            include_members: self.include_members,
        });
    }
}

/// Common prefix and suffix diff of two buffers.
///
/// Returns the replaced byte range of `old` and the replacing byte range of
/// `new`; both are on character boundaries.
fn minimal_edit(old: &str, new: &str) -> (Range<usize>, Range<usize>) {
    let (old_bytes, new_bytes) = (old.as_bytes(), new.as_bytes());

    let mut prefix = old_bytes
        .iter()
        .zip(new_bytes)
        .take_while(|(a, b)| a == b)
        .count();
    while !old.is_char_boundary(prefix) || !new.is_char_boundary(prefix) {
        prefix -= 1;
    }

    let max_suffix = old.len().min(new.len()) - prefix;
    let mut suffix = old_bytes[prefix..]
        .iter()
        .rev()
        .zip(new_bytes[prefix..].iter().rev())
        .take(max_suffix)
        .take_while(|(a, b)| a == b)
        .count();
    while !old.is_char_boundary(old.len() - suffix) || !new.is_char_boundary(new.len() - suffix) {
        suffix -= 1;
    }

    (prefix..old.len() - suffix, prefix..new.len() - suffix)
}

/// Global state for the language server
pub struct WorldState {
    pub documents: HashMap<Url, Document>,
    pub config: TandemConfig,
    pub watcher: EditWatcher,
    pub session: HighlightSession,
    /// Whether the client accepts `window/showDocument`
    pub client_supports_show_document: bool,
}

impl WorldState {
    pub fn new(config: TandemConfig) -> Self {
        Self {
            documents: HashMap::new(),
            config,
            watcher: EditWatcher::default(),
            session: HighlightSession::default(),
            client_supports_show_document: false,
        }
    }

    pub fn open_document(&mut self, uri: Url, text: &str, language: Language, version: Option<i32>) {
        log::trace!("Opening {} as {:?}", uri, language);
        let doc = Document::new(text, language, version, self.config.include_member_names);
        self.documents.insert(uri, doc);
    }

    pub fn get_document(&self, uri: &Url) -> Option<&Document> {
        self.documents.get(uri)
    }

    /// Apply one content change and let the edit watcher react to it.
    pub fn apply_change(
        &mut self,
        uri: &Url,
        change: TextDocumentContentChangeEvent,
    ) -> anyhow::Result<WatchEvent> {
        let doc = self
            .documents
            .get_mut(uri)
            .ok_or_else(|| anyhow!("change for unopened document {}", uri))?;
        let applied = match doc.apply_change(change) {
            Ok(applied) => applied,
            Err(err) => {
                // The buffer may now disagree with the client; stop tracking.
                self.watcher.reset();
                return Err(err);
            }
        };

        if !self.config.enabled {
            return Ok(self.watcher.reset());
        }
        Ok(self.watcher.observe(uri, &applied, doc))
    }

    /// Forget a document. Tracking on it stops.
    pub fn close_document(&mut self, uri: &Url) -> WatchEvent {
        self.documents.remove(uri);
        let tracking = self.watcher.armed().is_some_and(|armed| &armed.uri == uri);
        if tracking || self.session.uri() == Some(uri) {
            self.watcher.reset();
            WatchEvent::Clear
        } else {
            WatchEvent::Unchanged
        }
    }

    /// Replace the configuration, reindexing documents when the definition
    /// of an identifier changed.
    pub fn apply_config(&mut self, config: TandemConfig) -> WatchEvent {
        let reindex = config.include_member_names != self.config.include_member_names;
        let stop = reindex || !config.enabled;
        self.config = config;

        if reindex {
            for doc in self.documents.values_mut() {
                doc.set_include_members(self.config.include_member_names);
            }
        }
        if stop && self.session.is_active() {
            self.watcher.reset();
            WatchEvent::Clear
        } else if stop {
            self.watcher.reset()
        } else {
            WatchEvent::Unchanged
        }
    }
}
