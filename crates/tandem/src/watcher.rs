//
// watcher.rs
//
// Edit watcher: detects identifier renames and tracks them keystroke by keystroke
//

use std::ops::Range;

use tower_lsp::lsp_types::Url;

use crate::occurrences::OccurrenceSet;
use crate::state::{AppliedChange, Document};

/// A rename in progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArmedRename {
    pub uri: Url,
    /// Name of the identifier before the user started editing it
    pub original: String,
    /// Bytes of the current buffer holding the identifier being edited
    pub span: Range<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum WatchState {
    #[default]
    Idle,
    ArmedOnEdit(ArmedRename),
}

/// Marks to show after an edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightUpdate {
    pub uri: Url,
    pub name: String,
    /// Start of the edited span, used as the navigation origin
    pub anchor: usize,
    pub occurrences: OccurrenceSet,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    /// Nothing to present
    Unchanged,
    /// Replace the marks
    Show(HighlightUpdate),
    /// Remove all marks
    Clear,
}

#[derive(Debug, Default)]
pub struct EditWatcher {
    state: WatchState,
}

impl EditWatcher {
    pub fn state(&self) -> &WatchState {
        &self.state
    }

    pub fn armed(&self) -> Option<&ArmedRename> {
        match &self.state {
            WatchState::ArmedOnEdit(armed) => Some(armed),
            WatchState::Idle => None,
        }
    }

    /// Return to `Idle`.
    pub fn reset(&mut self) -> WatchEvent {
        match std::mem::take(&mut self.state) {
            WatchState::ArmedOnEdit(armed) => {
                log::debug!("Stopped tracking rename of '{}'", armed.original);
                WatchEvent::Clear
            }
            WatchState::Idle => WatchEvent::Unchanged,
        }
    }

    /// React to one applied edit of `doc` (already updated).
    pub fn observe(&mut self, uri: &Url, change: &AppliedChange, doc: &Document) -> WatchEvent {
        let edit = &change.edit;
        let shrink = edit.range.len();

        let continued = self.armed().and_then(|armed| {
            let inside = &armed.uri == uri
                && armed.span.start <= edit.range.start
                && edit.range.end <= armed.span.end;
            inside.then(|| {
                (
                    armed.original.clone(),
                    armed.span.start..armed.span.end - shrink + edit.new_len,
                )
            })
        });
        let tracking = continued.is_some();
        let candidate = continued.or_else(|| {
            change
                .touched
                .as_ref()
                .map(|occ| (occ.name.clone(), occ.start..occ.end - shrink + edit.new_len))
        });

        let Some((original, span)) = candidate else {
            return self.reset();
        };

        let Some(current) = doc.slice(span.clone()) else {
            return self.reset();
        };
        if current == original {
            return self.reset();
        }
        // A rename in progress only needs lexically valid text: prefixes such
        // as `new` or `in` parse as keywords on the way to the final name.
        let valid = current.is_empty()
            || if tracking {
                doc.language.is_identifier(&current)
            } else {
                doc.index.occurrence_exact(&span).is_some()
            };
        if !valid {
            log::trace!("Edited span {:?} is no longer a single identifier", current);
            return self.reset();
        }

        let occurrences = doc.index.find_occurrences(&original).without(&span);
        if occurrences.is_empty() {
            return self.reset();
        }

        if self.armed().is_none() {
            log::debug!("Tracking rename of '{}' ({} other occurrences)", original, occurrences.len());
        }
        let update = HighlightUpdate {
            uri: uri.clone(),
            name: original.clone(),
            anchor: span.start,
            occurrences,
        };
        self.state = WatchState::ArmedOnEdit(ArmedRename {
            uri: uri.clone(),
            original,
            span,
        });
        WatchEvent::Show(update)
    }

    /// The text currently occupying the tracked span, when it is a complete
    /// identifier.
    pub fn replacement(&self, doc: &Document) -> Option<String> {
        let armed = self.armed()?;
        let text = doc.slice(armed.span.clone())?;
        doc.language.is_identifier(&text).then_some(text)
    }
}
