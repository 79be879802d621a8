use serde::{Deserialize, Serialize};

/// Shown in place of a filename when the url has nothing after its last `/`
pub const PLACEHOLDER: &str = "(página)";

/// Label of the hyperlink cell
pub const LINK_LABEL: &str = "🔗 Link";

/// Snippets stored in the history are cut to this many characters
pub const SNIPPET_MAX_CHARS: usize = 300;
pub const SNIPPET_ELLIPSIS: &str = "...";

/// One keyword hit as stored in the results file.
///
/// The on-disk field names (`data`, `trecho`) are kept so existing history
/// files keep loading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    // Field order is the on-disk key order
    pub url: String,
    #[serde(rename = "data")]
    pub timestamp: String, // Kept as written; parsed only for display
    #[serde(rename = "trecho")]
    pub snippet: String,
}

/// The four cells rendered for a single record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayRow {
    pub formatted_timestamp: String,
    pub link_url: String,
    pub display_name: String,
    pub escaped_snippet: String,
}

/// How text is pulled out of a fetched document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Html,
    Pdf,
}

impl DocumentKind {
    /// Urls ending in `.pdf` (any case) are PDFs; everything else is read as HTML
    pub fn for_url(url: &str) -> Self {
        if url.to_lowercase().ends_with(".pdf") {
            DocumentKind::Pdf
        } else {
            DocumentKind::Html
        }
    }
}
