//! CSV serialization for document tables
//!
//! One `label,value` row per record, minimal quoting. Separator records come
//! out as a bare `,` line.

use std::io;

use serde::{Deserialize, Serialize};

use crate::error::{FormscanError, Result};
use crate::types::DocumentTable;

/// Line ending written after every row
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineTerminator {
    /// `\r\n` (default)
    #[default]
    CrLf,
    /// `\n`
    Lf,
}

impl LineTerminator {
    #[inline]
    #[must_use]
    pub const fn as_bytes(self) -> &'static [u8] {
        match self {
            Self::CrLf => b"\r\n",
            Self::Lf => b"\n",
        }
    }

    const fn to_csv(self) -> csv::Terminator {
        match self {
            Self::CrLf => csv::Terminator::CRLF,
            Self::Lf => csv::Terminator::Any(b'\n'),
        }
    }
}

impl std::str::FromStr for LineTerminator {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "crlf" | "\\r\\n" => Ok(Self::CrLf),
            "lf" | "\\n" => Ok(Self::Lf),
            _ => Err(format!(
                "Unknown line terminator '{s}'. Expected: crlf, lf"
            )),
        }
    }
}

/// Options for CSV serialization
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct CsvOptions {
    /// Row terminator (default: CRLF)
    pub line_terminator: LineTerminator,
    /// Write a `Label,Value` header row first (default: false)
    pub header_row: bool,
}

/// CSV serializer for document tables
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct CsvSerializer {
    options: CsvOptions,
}

impl CsvSerializer {
    #[inline]
    #[must_use = "creates serializer with default options"]
    pub fn new() -> Self {
        Self {
            options: CsvOptions::default(),
        }
    }

    #[inline]
    #[must_use = "creates serializer with custom options"]
    pub const fn with_options(options: CsvOptions) -> Self {
        Self { options }
    }

    #[inline]
    #[must_use]
    pub const fn options(&self) -> &CsvOptions {
        &self.options
    }

    fn writer<W: io::Write>(&self, out: W, flexible: bool) -> csv::Writer<W> {
        csv::WriterBuilder::new()
            .terminator(self.options.line_terminator.to_csv())
            .flexible(flexible)
            .from_writer(out)
    }

    /// Write the table to any writer
    ///
    /// # Errors
    /// Returns an error if the underlying writer fails
    pub fn write_table<W: io::Write>(&self, table: &DocumentTable, out: W) -> Result<()> {
        let mut writer = self.writer(out, false);
        if self.options.header_row {
            writer.write_record(["Label", "Value"])?;
        }
        for record in table {
            writer.write_record([record.label.as_str(), record.value.as_str()])?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Serialize the table to a CSV string
    ///
    /// # Errors
    /// Returns an error if CSV encoding fails
    #[must_use = "this function returns serialized CSV that should be used"]
    pub fn serialize_table(&self, table: &DocumentTable) -> Result<String> {
        let mut buf = Vec::new();
        self.write_table(table, &mut buf)?;
        into_string(buf)
    }

    /// Concatenate already tabulated per-page CSV into one document
    ///
    /// Each page is re-read without a header row and written back out with
    /// this serializer's line terminator. Rows may have any number of fields.
    /// Empty lines (table breaks in engine output) are kept as empty lines.
    ///
    /// # Errors
    /// Returns an error if a page is not valid CSV
    #[must_use = "this function returns serialized CSV that should be used"]
    pub fn concat_pages<S: AsRef<str>>(&self, pages: &[S]) -> Result<String> {
        let mut writer = self.writer(Vec::new(), true);
        let mut record = csv::ByteRecord::new();
        let mut rows = 0usize;
        for page in pages {
            let bytes = page.as_ref().as_bytes();
            let mut reader = csv::ReaderBuilder::new()
                .has_headers(false)
                .flexible(true)
                .from_reader(bytes);
            loop {
                // The reader skips empty lines silently, so count them from here
                let start = usize::try_from(reader.position().byte()).unwrap_or(bytes.len());
                let more = reader.read_byte_record(&mut record)?;

                let blanks = blank_lines_at(bytes, start);
                if blanks > 0 {
                    writer = self.write_blank_lines(writer, blanks)?;
                    rows += blanks;
                }
                if !more {
                    break;
                }
                writer.write_byte_record(&record)?;
                rows += 1;
            }
        }
        log::debug!("Concatenated {} pages into {rows} CSV rows", pages.len());

        let buf = writer
            .into_inner()
            .map_err(|e| FormscanError::Io(e.into_error()))?;
        into_string(buf)
    }

    /// Append bare terminators; the csv writer would emit `""` for an empty record
    fn write_blank_lines(&self, writer: csv::Writer<Vec<u8>>, count: usize) -> Result<csv::Writer<Vec<u8>>> {
        let mut buf = writer
            .into_inner()
            .map_err(|e| FormscanError::Io(e.into_error()))?;
        for _ in 0..count {
            buf.extend_from_slice(self.options.line_terminator.as_bytes());
        }
        Ok(self.writer(buf, true))
    }
}

/// Count the empty lines starting at `start`, up to the next record.
///
/// A `\r\n` pair is one line, including when the `\r` ended the previous record.
fn blank_lines_at(bytes: &[u8], start: usize) -> usize {
    let mut after_cr = start > 0 && bytes.get(start - 1) == Some(&b'\r');
    let mut count = 0;
    for &b in bytes.get(start..).unwrap_or_default() {
        match b {
            b'\n' if after_cr => after_cr = false,
            b'\n' => count += 1,
            b'\r' => {
                count += 1;
                after_cr = true;
            }
            _ => break,
        }
    }
    count
}

fn into_string(buf: Vec<u8>) -> Result<String> {
    String::from_utf8(buf).map_err(|e| FormscanError::Io(io::Error::new(io::ErrorKind::InvalidData, e)))
}
