//! Local CSV-file record store.
//!
//! Offline/development stand-in for the remote sheet: same two operations,
//! same header-row-first shape, backed by a plain CSV file on disk.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::Result;
use crate::record::HEADER;
use crate::store::RecordStore;

pub struct CsvStore {
    path: PathBuf,
}

impl CsvStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn read_rows(&self) -> Result<Vec<Vec<String>>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        Ok(parse_csv(&fs::read_to_string(&self.path)?))
    }
}

#[async_trait]
impl RecordStore for CsvStore {
    async fn fetch_all(&self) -> Result<Vec<Vec<String>>> {
        self.read_rows()
    }

    async fn append_one(&self, row: Vec<String>) -> Result<()> {
        let needs_header = !self.path.exists() || self.read_rows()?.is_empty();
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        if needs_header {
            let header: Vec<String> = HEADER.iter().map(|s| s.to_string()).collect();
            writeln!(file, "{}", to_csv_line(&header))?;
        }
        writeln!(file, "{}", to_csv_line(&row))?;
        Ok(())
    }
}

/// Parse a whole CSV document, honoring quoted fields and doubled quotes.
///
/// Row breaks are decided here rather than by physical lines: a newline
/// inside an open quote belongs to the field, so multiline complaint text
/// survives a round trip through disk.
fn parse_csv(text: &str) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut row = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' => {
                if in_quotes && chars.peek() == Some(&'"') {
                    // Doubled quote inside a quoted field.
                    field.push('"');
                    chars.next();
                } else {
                    in_quotes = !in_quotes;
                }
            }
            ',' if !in_quotes => {
                row.push(std::mem::take(&mut field));
            }
            '\r' if !in_quotes => {}
            '\n' if !in_quotes => {
                row.push(std::mem::take(&mut field));
                // A bare newline between rows is not a row.
                if row.len() > 1 || !row[0].is_empty() {
                    rows.push(std::mem::take(&mut row));
                } else {
                    row.clear();
                }
            }
            _ => {
                field.push(c);
            }
        }
    }

    if !field.is_empty() || !row.is_empty() {
        row.push(field);
        rows.push(row);
    }
    rows
}

fn escape_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn to_csv_line(row: &[String]) -> String {
    row.iter()
        .map(|f| escape_field(f))
        .collect::<Vec<_>>()
        .join(",")
}
