//! Text series ingest.
//!
//! Accepts the plain formats clock data usually ships in:
//! - one value per line, or several columns separated by whitespace and/or
//!   commas (a single column is picked)
//! - `#` and `%` comment lines, blank lines
//! - optional gzip compression (`*.gz`)
//!
//! Bad rows are skipped and reported, never fatal; an input with no usable
//! value at all is.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use flate2::read::GzDecoder;
use tracing::{debug, warn};

use crate::error::AppError;

/// A row-level error encountered during ingest.
#[derive(Debug, Clone, PartialEq)]
pub struct RowError {
    /// 1-based line number.
    pub line: usize,
    pub message: String,
}

/// Ingest output: the values in file order plus what was skipped.
#[derive(Debug, Clone)]
pub struct LoadedSeries {
    pub values: Vec<f64>,
    pub row_errors: Vec<RowError>,
    /// Data lines seen (comments and blanks excluded).
    pub rows_read: usize,
}

impl LoadedSeries {
    pub fn rows_used(&self) -> usize {
        self.values.len()
    }
}

/// Load one column of numbers from a text file.
///
/// `column` is 1-based. Without it, a two-column file yields its last column
/// (the usual `time value` layout) and a one-column file its only column.
pub fn load_series(path: &Path, column: Option<usize>) -> Result<LoadedSeries, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open input '{}': {e}", path.display())))?;

    let gz = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("gz"));
    let reader: Box<dyn BufRead> = if gz {
        Box::new(BufReader::new(GzDecoder::new(file)))
    } else {
        Box::new(BufReader::new(file))
    };

    let loaded = read_series(reader, column)
        .map_err(|e| AppError::new(e.exit_code(), format!("{}: {e}", path.display())))?;
    debug!(
        path = %path.display(),
        gzip = gz,
        rows_read = loaded.rows_read,
        rows_used = loaded.rows_used(),
        "loaded series"
    );
    Ok(loaded)
}

/// Parse a series from any buffered reader.
pub fn read_series<R: BufRead>(reader: R, column: Option<usize>) -> Result<LoadedSeries, AppError> {
    if column == Some(0) {
        return Err(AppError::new(2, "Column numbers are 1-based."));
    }

    let mut values = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, line) in reader.lines().enumerate() {
        let line_no = idx + 1;
        let line = line.map_err(|e| AppError::new(2, format!("Failed to read line {line_no}: {e}")))?;
        let text = line.trim().trim_start_matches('\u{feff}');
        if text.is_empty() || text.starts_with('#') || text.starts_with('%') {
            continue;
        }
        rows_read += 1;

        match parse_row(text, column) {
            Ok(v) => values.push(v),
            Err(message) => row_errors.push(RowError { line: line_no, message }),
        }
    }

    if !row_errors.is_empty() {
        let first = &row_errors[0];
        warn!(
            skipped = row_errors.len(),
            first_line = first.line,
            first_error = %first.message,
            "skipped unparsable rows"
        );
    }

    if values.is_empty() {
        return Err(AppError::new(3, "No numeric values found in input."));
    }

    Ok(LoadedSeries {
        values,
        row_errors,
        rows_read,
    })
}

fn parse_row(text: &str, column: Option<usize>) -> Result<f64, String> {
    let fields: Vec<&str> = text
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|f| !f.is_empty())
        .collect();

    let idx = match column {
        Some(c) if c <= fields.len() => c - 1,
        Some(c) => return Err(format!("Missing column {c} (row has {} fields).", fields.len())),
        None => match fields.len() {
            1 | 2 => fields.len() - 1,
            n => return Err(format!("{n} fields; pick one with a column number.")),
        },
    };

    let raw = fields[idx];
    let v = raw
        .parse::<f64>()
        .map_err(|_| format!("Invalid number '{raw}'."))?;
    if v.is_finite() {
        Ok(v)
    } else {
        Err(format!("Non-finite value '{raw}'."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::io::Write;

    fn read(text: &str, column: Option<usize>) -> Result<LoadedSeries, AppError> {
        read_series(text.as_bytes(), column)
    }

    #[test]
    fn skips_comments_and_blank_lines() {
        let got = read("# header\n% matlab comment\n\n1.5e-9\n  -2.0e-9  \n3\n", None).unwrap();
        assert_eq!(got.values, vec![1.5e-9, -2.0e-9, 3.0]);
        assert_eq!(got.rows_read, 3);
        assert!(got.row_errors.is_empty());
    }

    #[test]
    fn two_columns_default_to_the_last() {
        let got = read("0 1.0\n1, 2.0\n2\t3.0\n", None).unwrap();
        assert_eq!(got.values, vec![1.0, 2.0, 3.0]);

        let first = read("0 1.0\n1, 2.0\n2\t3.0\n", Some(1)).unwrap();
        assert_eq!(first.values, vec![0.0, 1.0, 2.0]);
    }

    #[test]
    fn bad_rows_are_counted_and_skipped() {
        let got = read("1.0\nabc\n2.0\nnan\n1 2 3\n", None).unwrap();
        assert_eq!(got.values, vec![1.0, 2.0]);
        assert_eq!(got.rows_read, 5);
        let lines: Vec<usize> = got.row_errors.iter().map(|e| e.line).collect();
        assert_eq!(lines, vec![2, 4, 5]);
    }

    #[test]
    fn empty_input_is_a_data_error() {
        let err = read("# only comments\n\n", None).unwrap_err();
        assert_eq!(err.exit_code(), 3);
        assert_eq!(read("1.0\n", Some(0)).unwrap_err().exit_code(), 2);
    }

    #[test]
    fn loads_gzip_files() {
        let path = std::env::temp_dir().join(format!("stab-ingest-{}.txt.gz", std::process::id()));
        {
            let file = File::create(&path).unwrap();
            let mut enc = GzEncoder::new(file, Compression::default());
            enc.write_all(b"# phase\n0 1e-9\n1 2e-9\n2 4e-9\n").unwrap();
            enc.finish().unwrap();
        }
        let got = load_series(&path, None).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(got.values, vec![1e-9, 2e-9, 4e-9]);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = load_series(Path::new("/nonexistent/stab/input.txt"), None).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
