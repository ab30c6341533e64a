//! Client-side export of the rows currently loaded in a table.

use rust_xlsxwriter::{Workbook, XlsxError};
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::info;

pub const XLSX_SHEET_NAME: &str = "Sheet1";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Xlsx,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 2] = [ExportFormat::Csv, ExportFormat::Xlsx];

    pub fn file_name(self) -> &'static str {
        match self {
            ExportFormat::Csv => "data.csv",
            ExportFormat::Xlsx => "data.xlsx",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv;charset=utf-8",
            ExportFormat::Xlsx => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ExportFormat::Csv => "CSV",
            ExportFormat::Xlsx => "Excel",
        }
    }
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("rows could not be serialized: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to build workbook: {0}")]
    Workbook(#[from] XlsxError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub file_name: &'static str,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

#[tracing::instrument(skip(rows), fields(rows = rows.len()))]
pub fn export_rows<R: Serialize>(rows: &[R], format: ExportFormat) -> Result<ExportFile, ExportError> {
    let table = Flattened::from_rows(rows)?;
    let bytes = match format {
        ExportFormat::Csv => table.to_csv().into_bytes(),
        ExportFormat::Xlsx => table.to_xlsx()?,
    };
    info!(?format, bytes = bytes.len(), "export ready");
    Ok(ExportFile {
        file_name: format.file_name(),
        mime_type: format.mime_type(),
        bytes,
    })
}

/// Rows flattened into dotted column names; the header is the union of keys
/// in first-seen order.
#[derive(Debug, Default, PartialEq)]
pub struct Flattened {
    pub header: Vec<String>,
    pub rows: Vec<Map<String, Value>>,
}

impl Flattened {
    pub fn from_rows<R: Serialize>(rows: &[R]) -> Result<Self, serde_json::Error> {
        let mut table = Flattened::default();
        for row in rows {
            let mut flat = Map::new();
            flatten("", serde_json::to_value(row)?, &mut flat);
            for key in flat.keys() {
                if !table.header.contains(key) {
                    table.header.push(key.clone());
                }
            }
            table.rows.push(flat);
        }
        Ok(table)
    }

    pub fn to_csv(&self) -> String {
        let mut out = String::new();
        push_csv_line(&mut out, self.header.iter().map(String::as_str));
        for row in &self.rows {
            let cells: Vec<String> = self
                .header
                .iter()
                .map(|key| row.get(key).map(cell_text).unwrap_or_default())
                .collect();
            push_csv_line(&mut out, cells.iter().map(String::as_str));
        }
        out
    }

    pub fn to_xlsx(&self) -> Result<Vec<u8>, XlsxError> {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.set_name(XLSX_SHEET_NAME)?;

        for (col, key) in self.header.iter().enumerate() {
            sheet.write_string(0, col as u16, key)?;
        }
        for (idx, row) in self.rows.iter().enumerate() {
            let line = idx as u32 + 1;
            for (col, key) in self.header.iter().enumerate() {
                let col = col as u16;
                match row.get(key) {
                    None | Some(Value::Null) => {}
                    Some(Value::Bool(flag)) => {
                        sheet.write_boolean(line, col, *flag)?;
                    }
                    Some(Value::Number(number)) => match number.as_f64() {
                        Some(n) => {
                            sheet.write_number(line, col, n)?;
                        }
                        None => {
                            sheet.write_string(line, col, number.to_string())?;
                        }
                    },
                    Some(other) => {
                        sheet.write_string(line, col, cell_text(other))?;
                    }
                }
            }
        }

        workbook.save_to_buffer()
    }
}

fn flatten(prefix: &str, value: Value, out: &mut Map<String, Value>) {
    match value {
        Value::Object(map) if !map.is_empty() => {
            for (key, inner) in map {
                let path = if prefix.is_empty() { key } else { format!("{prefix}.{key}") };
                flatten(&path, inner, out);
            }
        }
        other => {
            let key = if prefix.is_empty() { "value".to_string() } else { prefix.to_string() };
            out.insert(key, other);
        }
    }
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn push_csv_line<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>) {
    let line: Vec<String> = cells.map(csv_escape).collect();
    out.push_str(&line.join(","));
    out.push('\n');
}

fn csv_escape(cell: &str) -> String {
    if cell.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn csv_header_is_union_of_flattened_keys() {
        let rows = vec![
            json!({"id": "1", "title": "Plan, then ship", "meta": {"owner": "ana"}}),
            json!({"id": "2", "title": "Say \"hi\"", "status": "DONE"}),
        ];
        let csv = Flattened::from_rows(&rows).expect("flatten").to_csv();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "id,meta.owner,title,status");
        assert_eq!(lines[1], "1,ana,\"Plan, then ship\",");
        assert_eq!(lines[2], "2,,\"Say \"\"hi\"\"\",DONE");
    }

    #[test]
    fn xlsx_export_produces_a_zip_container() {
        let rows = vec![json!({"title": "a", "done": true, "points": 3})];
        let file = export_rows(&rows, ExportFormat::Xlsx).expect("export xlsx");
        assert_eq!(file.file_name, "data.xlsx");
        assert_eq!(&file.bytes[..2], b"PK");
    }

    #[test]
    fn empty_export_still_has_a_file() {
        let rows: Vec<Value> = Vec::new();
        let file = export_rows(&rows, ExportFormat::Csv).expect("export csv");
        assert_eq!(file.file_name, "data.csv");
        assert_eq!(file.bytes, b"\n".to_vec());
    }
}
