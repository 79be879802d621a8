use crate::domain::{DisplayRow, DocumentKind, Record};
use crate::error::HitboardError;

pub type Result<T> = std::result::Result<T, HitboardError>;

pub trait RecordRepository {
    // Records come back in stored order
    fn fetch_all_records(&self) -> Result<Vec<Record>>;

    /// Adds records to the stored history
    fn append_records(&self, records: &[Record]) -> Result<()>;
}

/// Trait for writing rendered rows
/// This is a port (interface) that defines how the core communicates with output adapters
pub trait RowWriter: Send + Sync {
    fn write(&self, rows: &[DisplayRow]) -> Result<()>;
}

/// Retrieves a published document and returns its plain text
pub trait DocumentFetcher {
    fn fetch_text(&self, url: &str, kind: DocumentKind) -> Result<String>;
}
