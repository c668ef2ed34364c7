use anyhow::{Context, Result};
use csv::{ReaderBuilder, WriterBuilder};
use encoding_rs::mem::decode_latin1;
use std::{fs, io::Write, path::Path};

/// One source extract held fully in memory.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RawTable {
    /// Logical table name, taken from the file stem.
    pub name: String,
    /// Row 0 of the file, untouched.
    pub headers: Vec<String>,
    /// Every following row, one String per field. Rows may be ragged.
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Read a tab-delimited, Latin-1 encoded extract.
    pub fn load<P: AsRef<Path>>(name: &str, path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).with_context(|| format!("reading {:?}", path))?;
        let text = decode_latin1(&bytes);

        let mut rdr = ReaderBuilder::new()
            .has_headers(false)
            .delimiter(b'\t')
            .quote(b'"')
            .flexible(true)
            .from_reader(text.as_bytes());
        let mut records = rdr.records();

        // The reader drops blank lines, so put them back as empty rows.
        let mut lines: Vec<Vec<String>> = Vec::new();
        for (idx, line) in split_records(&text).into_iter().enumerate() {
            if line.is_empty() {
                lines.push(Vec::new());
                continue;
            }
            let record = records
                .next()
                .with_context(|| format!("{:?}: reader ran out at record {}", path, idx + 1))?
                .with_context(|| format!("CSV parse error in {:?} at record {}", path, idx + 1))?;
            lines.push(record.iter().map(str::to_string).collect());
        }

        let mut lines = lines.into_iter();
        let headers = lines.next().unwrap_or_default();
        let rows = lines.collect();

        Ok(Self {
            name: name.to_string(),
            headers,
            rows,
        })
    }

    /// Serialize header + rows as comma-separated values.
    ///
    /// Blank rows, including a blank header, are written as bare line breaks.
    pub fn write_csv<W: Write>(&self, mut out: W) -> Result<()> {
        if self.headers.is_empty() && self.rows.is_empty() {
            return Ok(());
        }
        write_rows(&mut out, std::slice::from_ref(&self.headers))?;
        write_rows(&mut out, &self.rows)
    }
}

/// The csv writer turns an empty record into `""`, so blank rows bypass it.
fn write_rows<W: Write>(out: &mut W, rows: &[Vec<String>]) -> Result<()> {
    for (idx, run) in rows.split(|row| row.is_empty()).enumerate() {
        if idx > 0 {
            out.write_all(b"\n")?;
        }
        if run.is_empty() {
            continue;
        }
        let mut wtr = WriterBuilder::new().flexible(true).from_writer(&mut *out);
        for row in run {
            wtr.write_record(row)?;
        }
        wtr.flush()?;
    }
    Ok(())
}

/// Split `text` into one slice per record, mirroring the reader's rules:
/// `\n`, `\r\n` and `\r` end a record outside quotes, and a quote only opens
/// a quoted field at the start of that field. Blank lines come back empty.
fn split_records(text: &str) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut out = Vec::new();
    let (mut start, mut in_quotes, mut field_start) = (0, false, true);
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'"' if in_quotes => {
                if bytes.get(i + 1) == Some(&b'"') {
                    i += 1;
                } else {
                    in_quotes = false;
                }
            }
            b'"' if field_start => {
                in_quotes = true;
                field_start = false;
            }
            b'\r' | b'\n' if !in_quotes => {
                out.push(&text[start..i]);
                if bytes[i] == b'\r' && bytes.get(i + 1) == Some(&b'\n') {
                    i += 1;
                }
                start = i + 1;
                field_start = true;
            }
            b'\t' if !in_quotes => field_start = true,
            _ if !in_quotes => field_start = false,
            _ => {}
        }
        i += 1;
    }
    if start < bytes.len() {
        out.push(&text[start..]);
    }
    out
}
