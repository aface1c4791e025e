//
// session.rs
//
// Highlight session: the active marks and the navigation cursor over them
//

use tower_lsp::lsp_types::Url;

use crate::locator::Occurrence;
use crate::occurrences::OccurrenceSet;
use crate::watcher::HighlightUpdate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Next,
    Previous,
}

#[derive(Debug)]
struct ActiveHighlights {
    uri: Url,
    name: String,
    anchor: usize,
    occurrences: OccurrenceSet,
    focus: Option<usize>,
}

/// Process-wide highlight state. At most one set of marks is active.
#[derive(Debug, Default)]
pub struct HighlightSession {
    active: Option<ActiveHighlights>,
}

impl HighlightSession {
    /// Replace all marks.
    ///
    /// Focus survives when the update is for the same name and document and
    /// the number of marks did not change, which is the case for every
    /// keystroke inside the tracked identifier.
    pub fn show(&mut self, update: HighlightUpdate) {
        let focus = self.active.as_ref().and_then(|active| {
            let same = active.uri == update.uri
                && active.name == update.name
                && active.occurrences.len() == update.occurrences.len();
            if same {
                active.focus
            } else {
                None
            }
        });
        self.active = Some(ActiveHighlights {
            uri: update.uri,
            name: update.name,
            anchor: update.anchor,
            occurrences: update.occurrences,
            focus,
        });
    }

    /// Remove all marks. Returns the document that had them.
    pub fn clear(&mut self) -> Option<Url> {
        self.active.take().map(|active| active.uri)
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn uri(&self) -> Option<&Url> {
        self.active.as_ref().map(|active| &active.uri)
    }

    pub fn name(&self) -> Option<&str> {
        self.active.as_ref().map(|active| active.name.as_str())
    }

    pub fn occurrences(&self) -> Option<&OccurrenceSet> {
        self.active.as_ref().map(|active| &active.occurrences)
    }

    pub fn focus_index(&self) -> Option<usize> {
        self.active.as_ref().and_then(|active| active.focus)
    }

    pub fn focused(&self) -> Option<&Occurrence> {
        let active = self.active.as_ref()?;
        active.occurrences.get(active.focus?)
    }

    pub fn next(&mut self) -> Option<&Occurrence> {
        self.step(Direction::Next)
    }

    pub fn previous(&mut self) -> Option<&Occurrence> {
        self.step(Direction::Previous)
    }

    /// Move focus circularly. Without a focus yet, start from the edited
    /// span: `Next` picks the first mark after it, `Previous` the last mark
    /// before it. No-op on an empty or inactive session.
    pub fn step(&mut self, direction: Direction) -> Option<&Occurrence> {
        let active = self.active.as_mut()?;
        let len = active.occurrences.len();
        if len == 0 {
            return None;
        }

        let target = match (active.focus, direction) {
            (Some(i), Direction::Next) => (i + 1) % len,
            (Some(i), Direction::Previous) => (i + len - 1) % len,
            (None, Direction::Next) => active.occurrences.first_at_or_after(active.anchor) % len,
            (None, Direction::Previous) => {
                (active.occurrences.first_at_or_after(active.anchor) + len - 1) % len
            }
        };
        active.focus = Some(target);
        active.occurrences.get(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::Language;
    use crate::state::Document;
    use proptest::prelude::*;

    fn update(text: &str, name: &str, anchor: usize) -> HighlightUpdate {
        let doc = Document::new(text, Language::JavaScript, None, true);
        HighlightUpdate {
            uri: Url::parse("file:///w/a.js").unwrap(),
            name: name.to_string(),
            anchor,
            occurrences: doc.index.find_occurrences(name),
        }
    }

    // `a` on lines 0, 1, 3, 4; anchor sits on line 2.
    const TEXT: &str = "a;\na;\nb;\na;\na;\n";
    const ANCHOR: usize = 6;

    #[test]
    fn test_first_step_starts_from_anchor() {
        let mut session = HighlightSession::default();
        session.show(update(TEXT, "a", ANCHOR));
        assert_eq!(session.focus_index(), None);
        assert_eq!(session.next().map(|o| o.line), Some(3));

        let mut session = HighlightSession::default();
        session.show(update(TEXT, "a", ANCHOR));
        assert_eq!(session.previous().map(|o| o.line), Some(1));
    }

    #[test]
    fn test_navigation_wraps() {
        let mut session = HighlightSession::default();
        session.show(update(TEXT, "a", ANCHOR));

        let lines: Vec<u32> = (0..5).filter_map(|_| session.next().map(|o| o.line)).collect();
        assert_eq!(lines, vec![3, 4, 0, 1, 3]);

        let lines: Vec<u32> = (0..3).filter_map(|_| session.previous().map(|o| o.line)).collect();
        assert_eq!(lines, vec![1, 0, 4]);
    }

    #[test]
    fn test_anchor_past_last_wraps_to_first() {
        let mut session = HighlightSession::default();
        session.show(update(TEXT, "a", TEXT.len()));
        assert_eq!(session.next().map(|o| o.line), Some(0));
    }

    #[test]
    fn test_clear_then_navigate_is_noop() {
        let mut session = HighlightSession::default();
        session.show(update(TEXT, "a", ANCHOR));
        session.next();

        assert!(session.clear().is_some());
        assert!(session.next().is_none());
        assert!(session.previous().is_none());
        assert!(!session.is_active());
        assert!(session.clear().is_none());
    }

    #[test]
    fn test_empty_set_is_noop() {
        let mut session = HighlightSession::default();
        assert!(session.next().is_none());

        session.show(update(TEXT, "zzz", 0));
        assert!(session.next().is_none());
        assert!(session.previous().is_none());
        assert_eq!(session.focus_index(), None);
    }

    #[test]
    fn test_focus_kept_across_keystroke_updates() {
        let mut session = HighlightSession::default();
        session.show(update(TEXT, "a", ANCHOR));
        session.next();
        assert_eq!(session.focus_index(), Some(2));

        session.show(update("a;\na;\nbb;\na;\na;\n", "a", ANCHOR));
        assert_eq!(session.focus_index(), Some(2));
        assert_eq!(session.focused().map(|o| o.start), Some(10));

        session.show(update("a;\nbb;\na;\na;\n", "a", 3));
        assert_eq!(session.focus_index(), None);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        /// `next` followed by `previous` returns to the focused occurrence,
        /// and the reverse holds too.
        #[test]
        fn prop_next_previous_round_trip(count in 1usize..8, steps in 0usize..10, anchor in 0usize..40) {
            let text = "v;\n".repeat(count);
            let mut session = HighlightSession::default();
            session.show(update(&text, "v", anchor));
            for _ in 0..=steps {
                session.next();
            }
            let start = session.focus_index();
            prop_assert!(start.is_some());

            session.next();
            session.previous();
            prop_assert_eq!(session.focus_index(), start);

            session.previous();
            session.next();
            prop_assert_eq!(session.focus_index(), start);
        }

        /// After `clear`, navigation never produces a focus.
        #[test]
        fn prop_clear_disables_navigation(count in 0usize..6, moves in prop::collection::vec(any::<bool>(), 0..10)) {
            let text = "v;\n".repeat(count);
            let mut session = HighlightSession::default();
            session.show(update(&text, "v", 0));
            session.clear();
            for forward in moves {
                let moved = if forward { session.next().is_some() } else { session.previous().is_some() };
                prop_assert!(!moved);
            }
            prop_assert!(session.focused().is_none());
        }
    }
}
