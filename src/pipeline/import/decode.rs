//! Permissive decoding and delimiter detection for uploaded CSVs.
//!
//! Files come from spreadsheet exports on assorted machines: sometimes
//! UTF-8, often Latin-1, and sometimes "broken" — every data line wrapped
//! in quotes and separated by semicolons under a comma-separated header.

use super::ImportError;

/// Decode raw bytes without ever failing: valid UTF-8 is taken as-is,
/// anything else is read as Latin-1 (in which every byte is a character).
pub fn decode_text(raw: &[u8]) -> String {
    match std::str::from_utf8(raw) {
        Ok(s) => s.to_string(),
        Err(_) => raw.iter().map(|&b| b as char).collect(),
    }
}

/// Parsed CSV content: header names plus data rows padded/truncated to the
/// header width.
#[derive(Debug, Clone)]
pub struct CsvTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Parse CSV text, auto-detecting the comma/semicolon mess.
pub fn parse_table(text: &str) -> Result<CsvTable, ImportError> {
    let table = parse_with_delimiter(text, b',')?;

    // Header collapsed into one field full of semicolons: the whole file is
    // semicolon-separated (and usually quote-wrapped line by line).
    if table.headers.len() == 1 && table.headers[0].contains(';') {
        tracing::warn!("CSV header collapsed to one column; re-parsing as semicolon-separated");
        return parse_with_delimiter(&strip_line_quotes(text), b';');
    }

    // Comma header but semicolon data lines: rebuild the header on ';' and
    // clean each data line before re-parsing.
    if let Some(first_data) = text.lines().nth(1) {
        let semis = first_data.matches(';').count();
        let commas = first_data.matches(',').count();
        if semis > 0 && semis >= commas {
            tracing::warn!("CSV data lines use ';'; re-parsing as semicolon-separated");
            let mut lines = text.lines();
            let header = lines.next().unwrap_or_default();
            let header = header.split(',').collect::<Vec<_>>().join(";");
            let mut rebuilt = vec![header];
            for line in lines {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                rebuilt.push(line.trim_matches('"').to_string());
            }
            return parse_with_delimiter(&rebuilt.join("\n"), b';');
        }
    }

    Ok(table)
}

fn parse_with_delimiter(text: &str, delimiter: u8) -> Result<CsvTable, ImportError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let width = headers.len();
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let mut row: Vec<String> = record.iter().map(|f| f.trim().to_string()).collect();
        row.resize(width, String::new());
        if row.iter().all(|f| f.is_empty()) {
            continue;
        }
        rows.push(row);
    }

    Ok(CsvTable { headers, rows })
}

/// Remove surrounding quotes from every non-empty line.
fn strip_line_quotes(text: &str) -> String {
    text.lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.trim().trim_matches('"'))
        .collect::<Vec<_>>()
        .join("\n")
}
