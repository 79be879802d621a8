use hitboard_core::domain::{DisplayRow, LINK_LABEL};
use hitboard_core::ports::{Result, RowWriter};
use hitboard_core::utils::escape_html;
use std::fs;
use std::path::PathBuf;

const COLUMN_HEADERS: [&str; 4] = ["Data", "Link", "Nome Arquivo", "Trecho"];

/// HTML page writer adapter implementation
pub struct HtmlWriterAdapter {
    output_file: PathBuf,
    page_title: String,
}

impl HtmlWriterAdapter {
    pub fn new(output_file: impl Into<PathBuf>, page_title: impl Into<String>) -> Self {
        Self {
            output_file: output_file.into(),
            page_title: page_title.into(),
        }
    }
}

/// Formats a single table row. The snippet cell is already escaped and goes in verbatim.
pub fn render_row(row: &DisplayRow) -> String {
    format!(
        "      <tr>\n        <td>{}</td>\n        <td><a href=\"{}\" target=\"_blank\">{}</a></td>\n        <td>{}</td>\n        <td>{}</td>\n      </tr>\n",
        escape_html(&row.formatted_timestamp),
        escape_html(&row.link_url),
        LINK_LABEL,
        escape_html(&row.display_name),
        row.escaped_snippet,
    )
}

/// Formats the whole page: one table, one row per display row in the given order
pub fn render_document(page_title: &str, rows: &[DisplayRow]) -> String {
    let title = escape_html(page_title);
    let mut output = String::new();
    output.push_str("<!DOCTYPE html>\n<html>\n<head>\n  <meta charset=\"utf-8\">\n");
    output.push_str(&format!("  <title>{}</title>\n", title));
    output.push_str("</head>\n<body>\n");
    output.push_str(&format!("  <h1>{}</h1>\n", title));
    output.push_str("  <table id=\"tabela\">\n    <thead>\n      <tr>\n");
    for header in COLUMN_HEADERS {
        output.push_str(&format!("        <th>{}</th>\n", header));
    }
    output.push_str("      </tr>\n    </thead>\n    <tbody>\n");

    for row in rows {
        output.push_str(&render_row(row));
    }

    output.push_str("    </tbody>\n  </table>\n</body>\n</html>\n");
    output
}

impl RowWriter for HtmlWriterAdapter {
    fn write(&self, rows: &[DisplayRow]) -> Result<()> {
        // Create output directory if it doesn't exist
        if let Some(parent) = self.output_file.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let document = render_document(&self.page_title, rows);
        fs::write(&self.output_file, document)?;
        tracing::debug!("wrote {} rows to {}", rows.len(), self.output_file.display());
        Ok(())
    }
}
