//! End-to-end rename scenarios over the JavaScript, Python and Rust fixtures.
//!
//! Each test drives the world state the way the LSP backend does: open a
//! document, feed `didChange` events, apply the watcher's verdict to the
//! highlight session, then inspect the marks that would be sent to the client.
//! Line numbers in assertions are 1-based, as an editor displays them.

use tandem::config::TandemConfig;
use tandem::handlers;
use tandem::language::Language;
use tandem::presenter::Presentation;
use tandem::session::Direction;
use tandem::state::WorldState;
use tower_lsp::lsp_types::{Position, Range, TextDocumentContentChangeEvent, Url};

const ACCURACY: &str = include_str!("fixtures/accuracy.js");
const SIMPLE: &str = include_str!("fixtures/simple.js");
const GREETING: &str = include_str!("fixtures/greeting.py");
const NUMBERS: &str = include_str!("fixtures/numbers.rs");

fn uri() -> Url {
    Url::parse("file:///workspace/fixture.js").unwrap()
}

fn open(text: &str) -> WorldState {
    open_as(text, Language::JavaScript)
}

fn open_as(text: &str, language: Language) -> WorldState {
    let mut state = WorldState::new(TandemConfig::default());
    state.open_document(uri(), text, language, Some(1));
    state
}

fn edit(state: &mut WorldState, line: u32, start: u32, end: u32, text: &str) -> Vec<Presentation> {
    let change = TextDocumentContentChangeEvent {
        range: Some(Range::new(Position::new(line, start), Position::new(line, end))),
        range_length: None,
        text: text.to_string(),
    };
    let event = state.apply_change(&uri(), change).unwrap();
    handlers::apply_watch_event(state, event)
}

/// Replace the identifier at `(line, column)` (0-based) by typing `new_name`
/// one character at a time, the way an editor reports insert-mode edits.
fn type_rename(state: &mut WorldState, line: u32, column: u32, old_len: u32, new_name: &str) -> Vec<Presentation> {
    let mut presentations = edit(state, line, column, column + old_len, "");
    for (i, ch) in new_name.chars().enumerate() {
        let at = column + i as u32;
        presentations = edit(state, line, at, at, &ch.to_string());
    }
    presentations
}

/// Replace the `old_len` characters at `(line, column)` with the first
/// character of `new_name`, then type the rest of it.
fn retype(state: &mut WorldState, line: u32, column: u32, old_len: u32, new_name: &str) -> Vec<Presentation> {
    let (first, rest) = new_name.split_at(1);
    let mut presentations = edit(state, line, column, column + old_len, first);
    for (i, ch) in rest.chars().enumerate() {
        let at = column + 1 + i as u32;
        presentations = edit(state, line, at, at, &ch.to_string());
    }
    presentations
}

/// 1-based lines of the marks the client would display.
fn marked_lines(state: &WorldState) -> Vec<u32> {
    state
        .session
        .occurrences()
        .map(|set| set.lines().into_iter().map(|line| line + 1).collect())
        .unwrap_or_default()
}

#[test]
fn renaming_x_declaration_marks_its_uses() {
    let mut state = open(ACCURACY);

    // `let x = 4;` on line 2
    type_rename(&mut state, 1, 4, 1, "check");

    assert_eq!(marked_lines(&state), vec![3, 4, 6, 7]);
    assert_eq!(state.session.name(), Some("x"));
}

#[test]
fn renaming_my_var_marks_lines_12_and_13() {
    let mut state = open(ACCURACY);

    // `let myVar = 10;` on line 11
    let presentations = edit(&mut state, 10, 4, 9, "newName");

    assert_eq!(marked_lines(&state), vec![12, 13]);
    assert_eq!(presentations.len(), 1);
    assert_eq!(presentations[0].marks.ranges.len(), 2);
}

#[test]
fn renaming_obj_marks_its_single_use() {
    let mut state = open(ACCURACY);

    // `let obj = new MyClass(42);` on line 25
    edit(&mut state, 24, 4, 7, "instance");

    assert_eq!(marked_lines(&state), vec![26]);
}

#[test]
fn string_literal_text_is_never_marked() {
    let mut state = open(SIMPLE);

    // `function calculateSum(x, y) {` on line 2
    type_rename(&mut state, 1, 22, 1, "newVar");

    assert_eq!(marked_lines(&state), vec![3, 4, 8, 10]);

    // The only mark on line 4 is the argument after the "Sum of" literal.
    let line_four: Vec<Range> = state
        .session
        .occurrences()
        .unwrap()
        .ranges()
        .into_iter()
        .filter(|range| range.start.line == 3)
        .collect();
    assert_eq!(line_four.len(), 1);
    assert_eq!(line_four[0].start.character, 26);
}

#[test]
fn navigation_walks_marks_in_source_order() {
    let mut state = open(SIMPLE);
    type_rename(&mut state, 1, 22, 1, "newVar");

    let mut visited = Vec::new();
    for _ in 0..5 {
        handlers::navigate(&mut state, Direction::Next);
        visited.push(state.session.focused().unwrap().line + 1);
    }
    assert_eq!(visited, vec![3, 4, 8, 10, 3]);

    handlers::navigate(&mut state, Direction::Previous);
    assert_eq!(state.session.focused().unwrap().line + 1, 10);

    let cleared = handlers::clear(&mut state).unwrap();
    assert!(cleared.marks.ranges.is_empty());
    assert!(handlers::navigate(&mut state, Direction::Next).is_none());
    assert!(handlers::navigate(&mut state, Direction::Previous).is_none());
}

#[test]
fn typing_through_a_keyword_prefix_keeps_the_marks() {
    let mut state = open(SIMPLE);

    // `new` parses as a keyword before the name is complete.
    retype(&mut state, 1, 22, 1, "newVar");

    assert_eq!(marked_lines(&state), vec![3, 4, 8, 10]);
    let armed = state.watcher.armed().unwrap();
    assert_eq!(armed.original, "x");
    assert_eq!(armed.span.len(), "newVar".len());
}

#[test]
fn renaming_a_python_parameter_marks_the_fstring_use() {
    let mut state = open_as(GREETING, Language::Python);

    // `def greet(name: str) -> str:` on line 9
    retype(&mut state, 8, 10, 4, "person");

    assert_eq!(marked_lines(&state), vec![11, 27, 28]);
    let interpolated = &state.session.occurrences().unwrap().ranges()[0];
    assert_eq!((interpolated.start.line, interpolated.start.character), (10, 22));
}

#[test]
fn renaming_a_rust_parameter_marks_every_use() {
    let mut state = open_as(NUMBERS, Language::Rust);

    // `fn process_numbers(numbers: Vec<i32>)` on line 24
    retype(&mut state, 23, 19, 7, "values");

    assert_eq!(marked_lines(&state), vec![25, 29, 30, 38, 39]);
    assert_eq!(state.session.name(), Some("numbers"));
}

#[test]
fn full_document_sync_tracks_the_same_rename() {
    let mut state = open(ACCURACY);

    let renamed = ACCURACY.replacen("let myVar = 10;", "let myVa = 10;", 1);
    let change = TextDocumentContentChangeEvent {
        range: None,
        range_length: None,
        text: renamed,
    };
    let event = state.apply_change(&uri(), change).unwrap();
    handlers::apply_watch_event(&mut state, event);

    assert_eq!(marked_lines(&state), vec![12, 13]);
}

#[test]
fn finishing_the_rename_clears_the_marks() {
    let mut state = open(ACCURACY);
    edit(&mut state, 10, 4, 9, "newName");
    assert!(state.session.is_active());

    // Moving on to edit another statement ends the rename.
    let presentations = edit(&mut state, 14, 0, 0, "\n");
    assert_eq!(presentations.len(), 1);
    assert!(presentations[0].marks.ranges.is_empty());
    assert!(!state.session.is_active());
}

/// Renaming any occurrence of a repeated name marks exactly the other
/// occurrences that still read the old name.
#[test]
fn rename_marks_exactly_the_other_occurrences() {
    let fixtures = [ACCURACY, SIMPLE];
    for text in fixtures {
        let baseline = open(text);
        let doc = baseline.get_document(&uri()).unwrap();
        let names: Vec<String> = doc.index.names().map(String::from).collect();

        for name in names {
            let all = doc.index.find_occurrences(&name);
            if all.len() < 2 {
                continue;
            }
            for target in all.iter() {
                let replacement = "renamedZz";
                let delta = replacement.len() as i64 - name.len() as i64;

                let mut state = open(text);
                let end = target.column + name.len() as u32;
                edit(&mut state, target.line, target.column, end, replacement);

                let expected: Vec<(u32, u32)> = all
                    .iter()
                    .filter(|o| o.start != target.start)
                    .map(|o| {
                        let column = if o.line == target.line && o.column > target.column {
                            (o.column as i64 + delta) as u32
                        } else {
                            o.column
                        };
                        (o.line, column)
                    })
                    .collect();
                let actual: Vec<(u32, u32)> = state
                    .session
                    .occurrences()
                    .map(|set| set.iter().map(|o| (o.line, o.column)).collect())
                    .unwrap_or_default();

                assert_eq!(
                    actual, expected,
                    "renaming `{}` at line {} column {}",
                    name,
                    target.line + 1,
                    target.column
                );
            }
        }
    }
}
