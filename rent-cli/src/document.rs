//! Document renderers for exported quotes.

use std::path::{Path, PathBuf};

use rent_core::HistoryEntry;
use rent_core::export::{self, DocumentRenderer, EXPORT_TITLE, ExportError, ExportRow};
use rust_xlsxwriter::{Format, Workbook};
use tracing::info;

const HEADERS: [&str; 2] = ["Field", "Value"];

/// Single-sheet workbook: title in the first row, a `Field`/`Value` header,
/// then one row per value.
pub struct XlsxRenderer;

impl DocumentRenderer for XlsxRenderer {
    fn extension(&self) -> &'static str {
        "xlsx"
    }

    fn render(
        &self,
        title: &str,
        rows: &[ExportRow],
    ) -> Result<Vec<u8>, ExportError> {
        let xlsx_err = |what: &str, e: rust_xlsxwriter::XlsxError| {
            ExportError::Render(format!("{what}: {e}"))
        };

        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        let bold = Format::new().set_bold();

        worksheet
            .write_string_with_format(0, 0, title, &bold)
            .map_err(|e| xlsx_err("title", e))?;

        for (col, header) in HEADERS.iter().enumerate() {
            worksheet
                .write_string_with_format(2, col as u16, *header, &bold)
                .map_err(|e| xlsx_err("header", e))?;
        }

        for (i, row) in rows.iter().enumerate() {
            let r = (i + 3) as u32;
            worksheet
                .write_string(r, 0, row.label)
                .map_err(|e| xlsx_err(row.label, e))?;
            worksheet
                .write_string(r, 1, &row.value)
                .map_err(|e| xlsx_err(row.label, e))?;
        }

        worksheet
            .set_column_width(0, 26)
            .map_err(|e| xlsx_err("column width", e))?;
        worksheet
            .set_column_width(1, 22)
            .map_err(|e| xlsx_err("column width", e))?;

        workbook
            .save_to_buffer()
            .map_err(|e| xlsx_err("Failed to save workbook", e))
    }
}

/// Plain two-column CSV preceded by the title line.
pub struct CsvRenderer;

impl DocumentRenderer for CsvRenderer {
    fn extension(&self) -> &'static str {
        "csv"
    }

    fn render(
        &self,
        title: &str,
        rows: &[ExportRow],
    ) -> Result<Vec<u8>, ExportError> {
        let csv_err = |e: csv::Error| ExportError::Render(e.to_string());

        let mut writer = csv::WriterBuilder::new()
            .flexible(true)
            .from_writer(Vec::new());
        writer.write_record([title]).map_err(csv_err)?;
        writer.write_record(HEADERS).map_err(csv_err)?;
        for row in rows {
            writer
                .write_record([row.label, row.value.as_str()])
                .map_err(csv_err)?;
        }

        writer
            .into_inner()
            .map_err(|e| ExportError::Render(e.to_string()))
    }
}

/// Picks a renderer from the file extension.
pub fn renderer_for(path: &Path) -> Result<Box<dyn DocumentRenderer>, ExportError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    match ext.as_str() {
        "xlsx" => Ok(Box::new(XlsxRenderer)),
        "csv" => Ok(Box::new(CsvRenderer)),
        _ => Err(ExportError::UnsupportedFormat(ext)),
    }
}

/// Writes `entry` to `target` and returns the path written.
///
/// When `target` is a directory the workbook is written there under the
/// default file name.
pub fn export_entry(
    entry: &HistoryEntry,
    target: &Path,
) -> Result<PathBuf, ExportError> {
    let (path, renderer): (PathBuf, Box<dyn DocumentRenderer>) = if target.is_dir() {
        let renderer = XlsxRenderer;
        (target.join(renderer.default_file_name()), Box::new(renderer))
    } else {
        (target.to_path_buf(), renderer_for(target)?)
    };

    let rows = export::format(&entry.input, &entry.result);
    let bytes = renderer.render(EXPORT_TITLE, &rows)?;
    std::fs::write(&path, bytes)?;

    info!(path = %path.display(), "exported calculation");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn rows() -> Vec<ExportRow> {
        vec![
            ExportRow {
                label: "Client Name",
                value: "Jane Doe".to_string(),
            },
            ExportRow {
                label: "Monthly Installment",
                value: "R6,747.98".to_string(),
            },
        ]
    }

    #[test]
    fn csv_has_title_header_and_rows() {
        let bytes = CsvRenderer.render(EXPORT_TITLE, &rows()).unwrap();
        let text = String::from_utf8(bytes).unwrap();

        assert_eq!(
            text,
            "SmartRent Auto - Calculation Summary\n\
             Field,Value\n\
             Client Name,Jane Doe\n\
             Monthly Installment,\"R6,747.98\"\n"
        );
    }

    #[test]
    fn xlsx_is_a_zip_container() {
        let bytes = XlsxRenderer.render(EXPORT_TITLE, &rows()).unwrap();

        assert!(bytes.starts_with(b"PK"));
    }

    #[test]
    fn renderer_chosen_by_extension() {
        assert_eq!(renderer_for(Path::new("out.XLSX")).unwrap().extension(), "xlsx");
        assert_eq!(renderer_for(Path::new("out.csv")).unwrap().extension(), "csv");
        assert!(matches!(
            renderer_for(Path::new("out.pdf")),
            Err(ExportError::UnsupportedFormat(ext)) if ext == "pdf"
        ));
    }

    #[test]
    fn default_file_names() {
        assert_eq!(XlsxRenderer.default_file_name(), "SmartRentAuto_Calculation.xlsx");
        assert_eq!(CsvRenderer.default_file_name(), "SmartRentAuto_Calculation.csv");
    }
}
