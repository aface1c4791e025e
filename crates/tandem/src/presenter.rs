//
// presenter.rs
//
// Highlight presenter: turns session state into requests to the host editor
//

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tower_lsp::lsp_types::notification::Notification;
use tower_lsp::lsp_types::{Range, ShowDocumentParams, Url};
use tower_lsp::Client;

use crate::session::HighlightSession;

/// Parameters of the `tandem/highlights` notification.
///
/// An empty `ranges` list tells the client to remove every mark in `uri`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HighlightsParams {
    pub uri: Url,
    /// Identifier whose occurrences are marked
    pub name: Option<String>,
    pub ranges: Vec<Range>,
    /// Index into `ranges` of the focused mark
    pub active: Option<usize>,
}

pub enum HighlightsNotification {}

impl Notification for HighlightsNotification {
    type Params = HighlightsParams;
    const METHOD: &'static str = "tandem/highlights";
}

/// Decoration and cursor API of the host editor.
#[async_trait]
pub trait HighlightHost: Send + Sync {
    /// Replace the marks shown in `params.uri`.
    async fn render(&self, params: HighlightsParams);

    /// Scroll to and select `range`. Returns whether the host complied.
    async fn reveal(&self, uri: Url, range: Range) -> bool;
}

#[async_trait]
impl HighlightHost for Client {
    async fn render(&self, params: HighlightsParams) {
        self.send_notification::<HighlightsNotification>(params).await;
    }

    async fn reveal(&self, uri: Url, range: Range) -> bool {
        let params = ShowDocumentParams {
            uri,
            external: Some(false),
            take_focus: Some(true),
            selection: Some(range),
        };
        match self.show_document(params).await {
            Ok(shown) => shown,
            Err(err) => {
                log::warn!("window/showDocument failed: {}", err);
                false
            }
        }
    }
}

/// Everything to send to the host after a state change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Presentation {
    pub marks: HighlightsParams,
    pub reveal: Option<(Url, Range)>,
}

impl Presentation {
    /// Current marks of an active session, at most `max` of them.
    pub fn marks(session: &HighlightSession, max: usize) -> Option<Self> {
        let uri = session.uri()?.clone();
        let mut ranges = session.occurrences().map(|set| set.ranges()).unwrap_or_default();
        ranges.truncate(max);
        let active = session.focus_index().filter(|&i| i < ranges.len());
        Some(Self {
            marks: HighlightsParams {
                uri,
                name: session.name().map(String::from),
                ranges,
                active,
            },
            reveal: None,
        })
    }

    /// Marks for the active session plus a reveal of the focused one.
    pub fn focus(session: &HighlightSession, max: usize) -> Option<Self> {
        let mut presentation = Self::marks(session, max)?;
        let focused = session.focused()?;
        presentation.reveal = Some((presentation.marks.uri.clone(), focused.range()));
        Some(presentation)
    }

    pub fn cleared(uri: Url) -> Self {
        Self {
            marks: HighlightsParams {
                uri,
                name: None,
                ranges: Vec::new(),
                active: None,
            },
            reveal: None,
        }
    }
}

/// Send a presentation to the host.
pub async fn present<H: HighlightHost + ?Sized>(host: &H, presentation: Presentation) {
    log::trace!(
        "Presenting {} marks in {}",
        presentation.marks.ranges.len(),
        presentation.marks.uri
    );
    host.render(presentation.marks).await;
    if let Some((uri, range)) = presentation.reveal {
        if !host.reveal(uri.clone(), range).await {
            log::warn!("Client declined to reveal {:?} in {}", range, uri);
        }
    }
}
