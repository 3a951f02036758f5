//! Percolator input (PIN) reader
//!
//! PIN files are tab-delimited with one peptide-spectrum match per row. The
//! trailing `Proteins` column may spill over several tab-separated fields, so
//! the file is split by hand and assembled into a [`DataFrame`].

use polars::prelude::*;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::info;

use crate::error::{ProcalError, Result};

/// Name of the optional direction row following the header
const DEFAULT_DIRECTION: &str = "defaultdirection";

/// Read a PIN file into a table
pub fn read_percolator(path: impl AsRef<Path>) -> Result<DataFrame> {
    let path = path.as_ref();
    let file = File::open(path)
        .map_err(|e| ProcalError::DataError(format!("{}: {}", path.display(), e)))?;
    let df = parse_percolator(BufReader::new(file))?;
    info!(
        path = %path.display(),
        psms = df.height(),
        columns = df.width(),
        "Read Percolator input"
    );
    Ok(df)
}

/// Parse PIN content from any buffered reader
pub fn parse_percolator<R: BufRead>(reader: R) -> Result<DataFrame> {
    let mut lines = reader.lines().enumerate();

    let header: Vec<String> = loop {
        match lines.next() {
            Some((_, line)) => {
                let line = line?;
                if !line.trim().is_empty() {
                    break line.trim_end_matches('\r').split('\t').map(str::to_string).collect();
                }
            }
            None => return Err(ProcalError::DataError("PIN file is empty".to_string())),
        }
    };
    let n_cols = header.len();
    let proteins_last = header
        .last()
        .is_some_and(|name| name.eq_ignore_ascii_case("proteins"));

    let mut cells: Vec<Vec<String>> = vec![Vec::new(); n_cols];
    for (idx, line) in lines {
        let line = line?;
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split('\t').collect();
        if fields[0].eq_ignore_ascii_case(DEFAULT_DIRECTION) {
            continue;
        }
        if fields.len() < n_cols {
            return Err(ProcalError::DataError(format!(
                "line {}: expected {} fields, found {}",
                idx + 1,
                n_cols,
                fields.len()
            )));
        }
        if fields.len() > n_cols && !proteins_last {
            return Err(ProcalError::DataError(format!(
                "line {}: {} fields for {} columns and no trailing Proteins column",
                idx + 1,
                fields.len(),
                n_cols
            )));
        }

        for (col, field) in fields[..n_cols - 1].iter().enumerate() {
            cells[col].push((*field).to_string());
        }
        cells[n_cols - 1].push(fields[n_cols - 1..].join("\t"));
    }

    let columns = header
        .iter()
        .zip(cells)
        .map(|(name, values)| typed_column(name, values))
        .collect::<Vec<_>>();

    Ok(DataFrame::new(columns)?)
}

/// Float column when every value parses as a number, string column otherwise
fn typed_column(name: &str, values: Vec<String>) -> Column {
    let parsed: Option<Vec<f64>> = values.iter().map(|v| v.trim().parse::<f64>().ok()).collect();
    match parsed {
        Some(numbers) if !values.is_empty() => Column::new(name.into(), numbers),
        _ => Column::new(name.into(), values),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};

    const PIN: &str = "SpecId\tLabel\tScanNr\tlnrSp\tPeptide\tProteins\n\
DefaultDirection\t-\t-\t0.5\t-\t-\n\
target_1\t1\t10\t2.5\tK.PEPTIDE.R\tsp|P1\tsp|P2\n\
decoy_1\t-1\t11\t0.7\tK.EDITPEP.R\tdecoy_sp|P1\n";

    #[test]
    fn test_parse_pin() {
        let df = parse_percolator(Cursor::new(PIN)).unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(df.width(), 6);

        let label = df.column("Label").unwrap();
        assert_eq!(label.dtype(), &DataType::Float64);

        let proteins = df.column("Proteins").unwrap().as_materialized_series().clone();
        let proteins: Vec<Option<&str>> = proteins.str().unwrap().into_iter().collect();
        assert_eq!(proteins, vec![Some("sp|P1\tsp|P2"), Some("decoy_sp|P1")]);
    }

    #[test]
    fn test_short_row_is_an_error() {
        let content = "SpecId\tLabel\tProteins\nonly_one_field\n";
        let err = parse_percolator(Cursor::new(content)).unwrap_err();
        assert!(err.to_string().contains("line 2"), "{}", err);
    }

    #[test]
    fn test_empty_file() {
        let result = parse_percolator(Cursor::new(""));
        assert!(matches!(result, Err(ProcalError::DataError(_))));
    }

    #[test]
    fn test_read_from_disk() {
        let mut file = tempfile::Builder::new().suffix(".pin").tempfile().unwrap();
        write!(file, "{}", PIN).unwrap();
        let df = read_percolator(file.path()).unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(
            df.column("SpecId").unwrap().dtype(),
            &DataType::String
        );
    }
}
