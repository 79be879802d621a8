//! Document fetching over HTTP.
//!
//! Uses the curl crate (libcurl) for the GET, then pulls plain text out of the
//! body: visible text nodes for HTML pages, the text layer for PDFs.

use hitboard_core::domain::DocumentKind;
use hitboard_core::error::HitboardError;
use hitboard_core::ports::{DocumentFetcher, Result};
use scraper::Html;
use std::time::Duration;

/// curl-backed implementation of the DocumentFetcher trait
pub struct CurlDocumentFetcher {
    timeout: Duration,
}

impl CurlDocumentFetcher {
    /// `timeout` bounds the whole transfer, connection included
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Performs a GET and returns the body. Follows redirects; any non-2xx status is an error.
    fn get(&self, url: &str) -> Result<Vec<u8>> {
        let fetch_err = |reason: String| HitboardError::Fetch {
            url: url.to_string(),
            reason,
        };
        let curl_err = |e: curl::Error| fetch_err(e.to_string());

        let mut body = Vec::new();
        let mut easy = curl::easy::Easy::new();
        easy.url(url).map_err(curl_err)?;
        easy.follow_location(true).map_err(curl_err)?;
        easy.connect_timeout(self.timeout).map_err(curl_err)?;
        easy.timeout(self.timeout).map_err(curl_err)?;

        {
            let mut transfer = easy.transfer();
            transfer
                .write_function(|data| {
                    body.extend_from_slice(data);
                    Ok(data.len())
                })
                .map_err(curl_err)?;
            transfer.perform().map_err(curl_err)?;
        }

        let code = easy.response_code().map_err(curl_err)?;
        if !(200..300).contains(&code) {
            return Err(fetch_err(format!("HTTP {}", code)));
        }
        tracing::debug!(url, bytes = body.len(), "fetched");
        Ok(body)
    }
}

impl DocumentFetcher for CurlDocumentFetcher {
    fn fetch_text(&self, url: &str, kind: DocumentKind) -> Result<String> {
        let body = self.get(url)?;
        match kind {
            DocumentKind::Html => Ok(html_to_text(&String::from_utf8_lossy(&body))),
            DocumentKind::Pdf => pdf_to_text(&body).map_err(|reason| HitboardError::Fetch {
                url: url.to_string(),
                reason,
            }),
        }
    }
}

/// Text nodes of the document, each trimmed, joined by single spaces
pub fn html_to_text(html: &str) -> String {
    let document = Html::parse_document(html);
    document
        .root_element()
        .text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Text layer of every page, in page order
pub fn pdf_to_text(bytes: &[u8]) -> std::result::Result<String, String> {
    pdf_extract::extract_text_from_mem(bytes).map_err(|e| format!("PDF text extraction failed: {}", e))
}
