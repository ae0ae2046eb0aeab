use tera::{Context, Tera};

use crate::config::ReportFormat;
use crate::error::{GenerationError, GenerationResult};
use crate::report::{Document, REPORT_HEADERS};

const REPORT_TEMPLATE: &str = include_str!("report.html.tera");

pub fn render_html(document: &Document) -> GenerationResult<String> {
    let mut context = Context::new();
    context.insert("title", &document.title);
    context.insert("headers", &REPORT_HEADERS);
    context.insert("rows", &document.rows);
    context.insert("footer", &document.footer_caption());
    context.insert("theme", &document.theme);

    Ok(Tera::one_off(REPORT_TEMPLATE, &context, true)?)
}

/// Header row plus one line per report row; title and footer are omitted.
pub fn render_csv(document: &Document) -> GenerationResult<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(REPORT_HEADERS)?;
    for row in &document.rows {
        writer.write_record(row.cells())?;
    }
    writer
        .into_inner()
        .map_err(|e| GenerationError::Unexpected(format!("failed to flush csv: {}", e)))
}

pub fn render(document: &Document, format: ReportFormat) -> GenerationResult<Vec<u8>> {
    match format {
        ReportFormat::Html => render_html(document).map(String::into_bytes),
        ReportFormat::Csv => render_csv(document),
    }
}
