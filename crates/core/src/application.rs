use chrono::NaiveDateTime;

use crate::domain::{DisplayRow, DocumentKind, Record};
use crate::matcher::KeywordMatcher;
use crate::ports::{DocumentFetcher, RecordRepository, Result, RowWriter};
use crate::utils::{escape_html, extract_display_name, format_timestamp_to_local, truncate_snippet};

/// Timestamp layout used for new history entries
pub const RECORD_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// Derives the display cells for one record. Pure; no I/O.
pub fn format_record(record: &Record) -> DisplayRow {
    DisplayRow {
        formatted_timestamp: format_timestamp_to_local(&record.timestamp),
        link_url: record.url.clone(),
        display_name: extract_display_name(&record.url),
        escaped_snippet: escape_html(&record.snippet),
    }
}

/// Builds the history entry for text from `url` that matched at `at`
pub fn build_hit(url: &str, text: &str, at: NaiveDateTime) -> Record {
    Record {
        url: url.to_string(),
        timestamp: at.format(RECORD_TIMESTAMP_FORMAT).to_string(),
        snippet: truncate_snippet(text),
    }
}

/// Application service that renders the stored history
pub struct RenderServiceImpl {
    repository: Box<dyn RecordRepository>,
    row_writer: Box<dyn RowWriter>,
}

impl RenderServiceImpl {
    /// Creates a new RenderServiceImpl with the given dependencies
    pub fn new(repository: Box<dyn RecordRepository>, row_writer: Box<dyn RowWriter>) -> Self {
        Self {
            repository,
            row_writer,
        }
    }

    /// Fetches every record, formats it in input order and hands the rows to the writer.
    /// Returns how many rows were written.
    pub fn execute_render(&self) -> Result<usize> {
        let records = self.repository.fetch_all_records()?;
        let rows: Vec<DisplayRow> = records.iter().map(format_record).collect();
        self.row_writer.write(&rows)?;
        tracing::info!(rows = rows.len(), "rendered results");
        Ok(rows.len())
    }
}

/// Application service that turns keyword hits into history entries
pub struct RecordingServiceImpl {
    repository: Box<dyn RecordRepository>,
    matcher: KeywordMatcher,
}

impl RecordingServiceImpl {
    pub fn new(repository: Box<dyn RecordRepository>, matcher: KeywordMatcher) -> Self {
        Self {
            repository,
            matcher,
        }
    }

    /// Scans `text` fetched from `url`. On a hit, stores and returns the new record.
    pub fn record_hit(&self, url: &str, text: &str, at: NaiveDateTime) -> Result<Option<Record>> {
        let matched = self.matcher.matched_keywords(text);
        if matched.is_empty() {
            tracing::info!(url, "no keyword found");
            return Ok(None);
        }
        tracing::info!(url, keywords = ?matched, "keyword hit");

        let record = build_hit(url, text, at);
        self.repository.append_records(std::slice::from_ref(&record))?;
        Ok(Some(record))
    }
}

/// Outcome of one pass over the watched urls
#[derive(Debug, Default, PartialEq, Eq)]
pub struct CheckSummary {
    pub checked: usize,
    pub failed: Vec<String>,
    pub hits: Vec<Record>,
}

/// Application service that visits every watched url and stores the hits
pub struct SiteCheckServiceImpl {
    repository: Box<dyn RecordRepository>,
    fetcher: Box<dyn DocumentFetcher>,
    matcher: KeywordMatcher,
}

impl SiteCheckServiceImpl {
    pub fn new(
        repository: Box<dyn RecordRepository>,
        fetcher: Box<dyn DocumentFetcher>,
        matcher: KeywordMatcher,
    ) -> Self {
        Self {
            repository,
            fetcher,
            matcher,
        }
    }

    /// Checks each url in order. A url that cannot be fetched is logged and skipped.
    /// Every hit of the pass shares the timestamp `at` and is appended in one write.
    pub fn execute_check(&self, urls: &[String], at: NaiveDateTime) -> Result<CheckSummary> {
        let mut summary = CheckSummary::default();

        for url in urls {
            tracing::info!(url = url.as_str(), "checking");
            summary.checked += 1;

            let kind = DocumentKind::for_url(url);
            let text = match self.fetcher.fetch_text(url, kind) {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!(url = url.as_str(), ?kind, "{}", e);
                    summary.failed.push(url.clone());
                    continue;
                }
            };

            if self.matcher.is_match(&text) {
                tracing::info!(url = url.as_str(), "keyword hit");
                summary.hits.push(build_hit(url, &text, at));
            } else {
                tracing::debug!(url = url.as_str(), "no keyword found");
            }
        }

        if !summary.hits.is_empty() {
            self.repository.append_records(&summary.hits)?;
        }
        tracing::info!(
            checked = summary.checked,
            failed = summary.failed.len(),
            hits = summary.hits.len(),
            "check finished"
        );
        Ok(summary)
    }
}
