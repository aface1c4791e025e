//
// config.rs
//
// Client-provided settings
//

/// Server behaviour controlled by the client's `tandem` settings section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TandemConfig {
    /// Master switch for rename tracking
    pub enabled: bool,
    /// Count property and field names (`obj.value`) as occurrences
    pub include_member_names: bool,
    /// Ask the client to move the cursor when navigating between marks
    pub reveal_on_navigate: bool,
    /// Upper bound on the number of marks sent to the client
    pub max_highlights: usize,
}

impl Default for TandemConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            include_member_names: true,
            reveal_on_navigate: true,
            max_highlights: 1000,
        }
    }
}

/// Parse Tandem configuration from LSP settings.
///
/// Reads the top-level `tandem` section of `settings`. Only fields present in
/// the JSON are applied; absent fields keep their defaults.
///
/// # Returns
///
/// `Some(TandemConfig)` when the `tandem` section is present, `None`
/// otherwise.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use tandem::config::parse_config;
///
/// let settings = json!({
///     "tandem": { "includeMemberNames": false, "maxHighlights": 50 }
/// });
/// let cfg = parse_config(&settings).unwrap();
/// assert!(cfg.enabled);
/// assert!(!cfg.include_member_names);
/// assert_eq!(cfg.max_highlights, 50);
/// ```
pub fn parse_config(settings: &serde_json::Value) -> Option<TandemConfig> {
    let section = settings.get("tandem")?;
    let mut config = TandemConfig::default();

    if let Some(v) = section.get("enabled").and_then(|v| v.as_bool()) {
        config.enabled = v;
    }
    if let Some(v) = section.get("includeMemberNames").and_then(|v| v.as_bool()) {
        config.include_member_names = v;
    }
    if let Some(v) = section.get("revealOnNavigate").and_then(|v| v.as_bool()) {
        config.reveal_on_navigate = v;
    }
    if let Some(v) = section.get("maxHighlights").and_then(|v| v.as_u64()) {
        config.max_highlights = v as usize;
    }

    log::info!("Parsed configuration: {:?}", config);
    Some(config)
}
