//
// handlers.rs
//
// Request and command handlers over the world state
//

use std::collections::HashMap;

use tower_lsp::lsp_types::*;

use crate::presenter::Presentation;
use crate::session::Direction;
use crate::state::WorldState;
use crate::utf16::position_to_byte;
use crate::watcher::WatchEvent;

pub const NEXT_OCCURRENCE: &str = "tandem.nextOccurrence";
pub const PREVIOUS_OCCURRENCE: &str = "tandem.previousOccurrence";
pub const CLEAR_HIGHLIGHTS: &str = "tandem.clearHighlights";

pub fn commands() -> Vec<String> {
    vec![
        NEXT_OCCURRENCE.to_string(),
        PREVIOUS_OCCURRENCE.to_string(),
        CLEAR_HIGHLIGHTS.to_string(),
    ]
}

// ============================================================================
// Session updates
// ============================================================================

/// Apply a watcher event to the session and return what the host must show.
///
/// Marks moving to another document first clear the old document's marks.
pub fn apply_watch_event(state: &mut WorldState, event: WatchEvent) -> Vec<Presentation> {
    let mut presentations = Vec::new();
    match event {
        WatchEvent::Unchanged => {}
        WatchEvent::Show(update) => {
            if state.session.uri().is_some_and(|uri| uri != &update.uri) {
                presentations.extend(state.session.clear().map(Presentation::cleared));
            }
            state.session.show(update);
            presentations.extend(Presentation::marks(&state.session, state.config.max_highlights));
        }
        WatchEvent::Clear => presentations.extend(state.session.clear().map(Presentation::cleared)),
    }
    presentations
}

/// Move the navigation cursor. `None` when there is nothing to navigate.
pub fn navigate(state: &mut WorldState, direction: Direction) -> Option<Presentation> {
    let target = state.session.step(direction)?;
    log::debug!("Focus moved {:?} to line {}", direction, target.line + 1);

    let max = state.config.max_highlights;
    if state.config.reveal_on_navigate && state.client_supports_show_document {
        Presentation::focus(&state.session, max)
    } else {
        Presentation::marks(&state.session, max)
    }
}

/// Stop tracking and remove every mark.
pub fn clear(state: &mut WorldState) -> Option<Presentation> {
    state.watcher.reset();
    state.session.clear().map(Presentation::cleared)
}

/// Location of the focused mark, returned to the client from navigation commands.
pub fn focused_location(state: &WorldState) -> Option<Location> {
    let uri = state.session.uri()?.clone();
    let occurrence = state.session.focused()?;
    Some(Location {
        uri,
        range: occurrence.range(),
    })
}

// ============================================================================
// Document Highlight
// ============================================================================

/// Active marks when the session belongs to `uri`, otherwise every
/// occurrence of the identifier under the cursor.
pub fn document_highlight(
    state: &WorldState,
    uri: &Url,
    position: Position,
) -> Option<Vec<DocumentHighlight>> {
    if state.session.uri() == Some(uri) {
        let focus = state.session.focus_index();
        let highlights = state
            .session
            .occurrences()?
            .iter()
            .enumerate()
            .map(|(i, occurrence)| DocumentHighlight {
                range: occurrence.range(),
                kind: Some(if Some(i) == focus {
                    DocumentHighlightKind::WRITE
                } else {
                    DocumentHighlightKind::TEXT
                }),
            })
            .collect();
        return Some(highlights);
    }

    let doc = state.get_document(uri)?;
    let offset = position_to_byte(&doc.contents, position)?;
    let name = &doc.index.occurrence_at(offset)?.name;
    let highlights = doc
        .index
        .find_occurrences(name)
        .iter()
        .map(|occurrence| DocumentHighlight {
            range: occurrence.range(),
            kind: Some(DocumentHighlightKind::TEXT),
        })
        .collect();
    Some(highlights)
}

// ============================================================================
// Code Actions
// ============================================================================

/// Offer to finish the rename in progress across the remaining marks.
pub fn code_actions(state: &WorldState, uri: &Url) -> Option<Vec<CodeActionOrCommand>> {
    let armed = state.watcher.armed()?;
    if &armed.uri != uri || state.session.uri() != Some(uri) {
        return None;
    }
    let doc = state.get_document(uri)?;
    let replacement = state.watcher.replacement(doc)?;

    let edits: Vec<TextEdit> = state
        .session
        .occurrences()?
        .iter()
        .map(|occurrence| TextEdit {
            range: occurrence.range(),
            new_text: replacement.clone(),
        })
        .collect();
    if edits.is_empty() {
        return None;
    }

    let title = format!("Rename remaining `{}` to `{}`", armed.original, replacement);
    let action = CodeAction {
        title,
        kind: Some(CodeActionKind::REFACTOR_REWRITE),
        edit: Some(WorkspaceEdit {
            changes: Some(HashMap::from([(uri.clone(), edits)])),
            ..Default::default()
        }),
        is_preferred: Some(true),
        ..Default::default()
    };
    Some(vec![CodeActionOrCommand::CodeAction(action)])
}
