use crate::domain::model::Table;
use crate::utils::error::{EtlError, Result};
use csv::{QuoteStyle, Terminator, WriterBuilder};

/// Render a table as tab-separated bytes, `\n`-terminated, header first.
///
/// Fields are written verbatim: no quoting, no escaping. A field that still
/// contains a tab or newline after cleanup breaks the row layout.
pub fn render_table(table: &Table) -> Result<Vec<u8>> {
    let mut writer = WriterBuilder::new()
        .delimiter(b'\t')
        .quote_style(QuoteStyle::Never)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(table.headers)?;
    for row in &table.rows {
        writer.write_record(row)?;
    }

    writer.into_inner().map_err(|e| EtlError::ProcessingError {
        message: format!("Failed to flush {:?} table: {}", table.kind, e.error()),
    })
}
